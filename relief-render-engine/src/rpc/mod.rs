//! JSON-RPC control surface for the hosting frontend.
//!
//! The configuration UI is an external collaborator: it owns every value in
//! `EffectState` and only hands the engine consistent snapshots through this
//! channel (postMessage on WASM, keyboard shortcuts stand in natively).

pub mod web_rpc;
