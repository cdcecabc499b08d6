use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

use crate::engine::camera::parallax_camera::ParallaxCamera;
use crate::engine::config::{DisplayMode, EffectState, ParticleDistortion};
use crate::engine::loading::catalog::SubjectCatalog;
use crate::engine::loading::subject_loader::SubjectLoader;
use constants::render_settings::MAX_GRADIENT_STOPS;

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Resource managing bidirectional RPC communication with the frontend.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the frontend without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the RPC layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("Failed to register message listener");
    }

    // Transfer closure ownership to JS so it survives this system.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping the thread-safe message queue filled by the listener.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing one incoming RPC message.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut state: ResMut<EffectState>,
    mut parallax: ResMut<ParallaxCamera>,
    mut loader: ResMut<SubjectLoader>,
    catalogs: Res<Assets<SubjectCatalog>>,
    asset_server: Res<AssetServer>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(
                    &request,
                    &mut state,
                    &mut parallax,
                    &mut loader,
                    &catalogs,
                    &asset_server,
                ) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Discarding unparseable RPC message: {parse_error}");
            }
        }
    }
}

/// Handle one RPC request and generate a response when the request has an id.
fn handle_rpc_request(
    request: &RpcRequest,
    state: &mut EffectState,
    parallax: &mut ParallaxCamera,
    loader: &mut SubjectLoader,
    catalogs: &Assets<SubjectCatalog>,
    asset_server: &AssetServer,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "set_effect_state" => handle_set_effect_state(&request.params, state),
        "set_subject" => handle_set_subject(&request.params, loader, catalogs, asset_server),
        "go_frontal_view" => {
            parallax.go_frontal_view();
            Ok(serde_json::json!({ "success": true }))
        }
        "go_diagonal_view" => {
            parallax.go_diagonal_view();
            Ok(serde_json::json!({ "success": true }))
        }
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({ "method": request.method })),
            })
        }
    };

    // Notifications carry no id and get no response.
    let id = request.id.clone()?;

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

/// Partial update of the effect state. Absent fields keep their values, so
/// the frontend can patch one slider at a time.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EffectStatePatch {
    mode: Option<String>,
    particle_distortion: Option<String>,
    grow_length: Option<f32>,
    background: Option<[f32; 3]>,
    duotone_dark: Option<[f32; 3]>,
    duotone_light: Option<[f32; 3]>,
    duotone_enabled: Option<bool>,
    duotone_crush: Option<f32>,
    gradient_stops: Option<Vec<[f32; 3]>>,
    gradient_enabled: Option<bool>,
    gradient_transparency: Option<bool>,
    noise_intensity: Option<f32>,
    scanline_intensity: Option<f32>,
    parallax_enabled: Option<bool>,
    parallax_responds_to_mouse: Option<bool>,
    parallax_intensity: Option<f32>,
    parallax_return_speed: Option<f32>,
    breathe_waviness: Option<f32>,
    breathe_speed: Option<f32>,
    breathe_whole_body_movement: Option<f32>,
    breathe_tall_point_exaggeration: Option<f32>,
    breathe_noise_speed: Option<f32>,
    breathe_noise_amount: Option<f32>,
}

fn handle_set_effect_state(
    params: &serde_json::Value,
    state: &mut EffectState,
) -> Result<serde_json::Value, RpcError> {
    let patch = serde_json::from_value::<EffectStatePatch>(params.clone())
        .map_err(|err| RpcError::invalid_params(&format!("Bad effect state patch: {err}")))?;

    if let Some(mode) = patch.mode {
        state.mode = match mode.as_str() {
            "surface" => DisplayMode::Surface,
            "particles" => DisplayMode::Particles,
            other => {
                return Err(RpcError::invalid_params(&format!("Unknown mode: {other}")));
            }
        };
    }
    if let Some(distortion) = patch.particle_distortion {
        state.particle_distortion = match distortion.as_str() {
            "noiseflow" => ParticleDistortion::NoiseFlow,
            "sphere" => ParticleDistortion::Sphere,
            "messycircle" => ParticleDistortion::MessyCircle,
            other => {
                return Err(RpcError::invalid_params(&format!(
                    "Unknown distortion: {other}"
                )));
            }
        };
    }
    if let Some(grow_length) = patch.grow_length {
        state.grow_length = grow_length;
    }
    if let Some([r, g, b]) = patch.background {
        state.background = Color::srgb(r, g, b);
    }
    if let Some(dark) = patch.duotone_dark {
        state.duotone_dark = Vec3::from_array(dark);
    }
    if let Some(light) = patch.duotone_light {
        state.duotone_light = Vec3::from_array(light);
    }
    if let Some(enabled) = patch.duotone_enabled {
        state.duotone_enabled = enabled;
    }
    if let Some(crush) = patch.duotone_crush {
        state.duotone_crush = crush;
    }
    if let Some(stops) = patch.gradient_stops {
        state.gradient_stops = stops
            .into_iter()
            .take(MAX_GRADIENT_STOPS)
            .map(Vec3::from_array)
            .collect();
    }
    if let Some(enabled) = patch.gradient_enabled {
        state.gradient_enabled = enabled;
    }
    if let Some(transparency) = patch.gradient_transparency {
        state.gradient_transparency = transparency;
    }
    if let Some(noise) = patch.noise_intensity {
        state.noise_intensity = noise;
    }
    if let Some(scanline) = patch.scanline_intensity {
        state.scanline_intensity = scanline;
    }
    if let Some(enabled) = patch.parallax_enabled {
        state.parallax_enabled = enabled;
    }
    if let Some(responds) = patch.parallax_responds_to_mouse {
        state.parallax_responds_to_mouse = responds;
    }
    if let Some(intensity) = patch.parallax_intensity {
        state.parallax_intensity = intensity;
    }
    if let Some(speed) = patch.parallax_return_speed {
        state.parallax_return_speed = speed;
    }
    if let Some(waviness) = patch.breathe_waviness {
        state.breathe.waviness = waviness;
    }
    if let Some(speed) = patch.breathe_speed {
        state.breathe.speed = speed;
    }
    if let Some(movement) = patch.breathe_whole_body_movement {
        state.breathe.whole_body_movement = movement;
    }
    if let Some(exaggeration) = patch.breathe_tall_point_exaggeration {
        state.breathe.tall_point_exaggeration = exaggeration;
    }
    if let Some(speed) = patch.breathe_noise_speed {
        state.breathe.noise_speed = speed;
    }
    if let Some(amount) = patch.breathe_noise_amount {
        state.breathe.noise_amount = amount;
    }

    Ok(serde_json::json!({ "success": true }))
}

fn handle_set_subject(
    params: &serde_json::Value,
    loader: &mut SubjectLoader,
    catalogs: &Assets<SubjectCatalog>,
    asset_server: &AssetServer,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetSubjectParams {
        name: String,
    }

    let subject_params = serde_json::from_value::<SetSubjectParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'name' parameter"))?;

    let path = catalogs
        .get(&loader.catalog)
        .and_then(|catalog| catalog.path_for(&subject_params.name))
        .ok_or_else(|| {
            RpcError::invalid_params(&format!("Unknown subject: {}", subject_params.name))
        })?
        .to_string();

    loader.request(asset_server, &path);

    Ok(serde_json::json!({
        "success": true,
        "subject": subject_params.name,
    }))
}

/// Send queued notifications and responses to the frontend.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send a serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_state_patch_applies_only_present_fields() {
        let mut state = EffectState::default();
        let params = serde_json::json!({
            "mode": "particles",
            "grow_length": 80.0,
            "gradient_enabled": true,
            "gradient_stops": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
        });
        handle_set_effect_state(&params, &mut state).unwrap();

        assert_eq!(state.mode, DisplayMode::Particles);
        assert_eq!(state.grow_length, 80.0);
        assert!(state.gradient_enabled);
        assert_eq!(state.gradient_stops.len(), 3);
        // Untouched fields keep their defaults.
        assert!(!state.duotone_enabled);
        assert_eq!(state.breathe.waviness, 2.2);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let mut state = EffectState::default();
        let params = serde_json::json!({ "mode": "hologram" });
        assert!(handle_set_effect_state(&params, &mut state).is_err());
    }

    #[test]
    fn gradient_stops_are_capped() {
        let mut state = EffectState::default();
        let stops: Vec<[f32; 3]> = (0..20).map(|i| [i as f32 / 20.0; 3]).collect();
        let params = serde_json::json!({ "gradient_stops": stops });
        handle_set_effect_state(&params, &mut state).unwrap();
        assert_eq!(state.gradient_stops.len(), MAX_GRADIENT_STOPS);
    }

    #[test]
    fn rpc_request_roundtrips_through_serde() {
        let raw = r#"{"jsonrpc":"2.0","method":"go_frontal_view","params":{},"id":7}"#;
        let request: RpcRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.method, "go_frontal_view");
        assert_eq!(request.id, Some(serde_json::json!(7)));
    }
}
