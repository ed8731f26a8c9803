use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use geminizer::gateway::{Gateway, HttpGateway};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub fn gateway(server: &MockServer) -> Arc<dyn Gateway> {
    Arc::new(
        HttpGateway::new(&server.uri(), Duration::from_secs(5), Duration::from_secs(2))
            .expect("mock server uri should be a valid base url"),
    )
}

pub fn generated(request_id: &str, image: &[u8]) -> Value {
    json!({
        "image_data": STANDARD.encode(image),
        "enriched_prompt": format!("professional rendering for {request_id}"),
        "request_id": request_id,
    })
}

pub fn history_entry(id: &str, prompt: &str) -> Value {
    json!({
        "id": id,
        "created_at": "2026-05-04T12:00:00Z",
        "prompt": prompt,
        "options": {"lighting": "golden hour"}
    })
}

pub fn safe_verdict() -> Value {
    json!({"is_safe": true, "issues": [], "recovery_suggestions": []})
}
