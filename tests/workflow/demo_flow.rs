use crate::support::gateway;
use geminizer::activity::{ActivitySimulator, StageDescriptor};
use geminizer::demo::{ExpertConsole, LiveDemo, PhysicsPreset, PoseLibrary};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_stages() -> Vec<StageDescriptor> {
    ["nlu", "quality", "render"]
        .iter()
        .zip([10_u64, 20, 30])
        .map(|(id, ms)| StageDescriptor {
            agent_id: (*id).to_string(),
            display_name: id.to_uppercase(),
            role_description: format!("{id} at work"),
            offset: Duration::from_millis(ms),
        })
        .collect()
}

#[tokio::test]
async fn live_demo_joins_activity_with_slow_sample() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/demo/sample"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "original_input": "woman standing in rain",
                    "enhanced_prompt": "rain-soaked editorial portrait, rim light",
                    "quality_score": 0.94,
                    "improvements": ["lighting", "fabric physics"],
                    "agents_used": 5,
                    "processing_time": "1.2s",
                    "confidence_score": 0.97
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let demo = LiveDemo::new(gateway(&server), ActivitySimulator::new(quick_stages()));

    let outcome = demo.run().await;

    let ids: Vec<&str> = outcome.activity.iter().map(|r| r.agent_id.as_str()).collect();
    assert_eq!(ids, vec!["nlu", "quality", "render"]);
    let sample = outcome.sample.unwrap();
    assert_eq!(sample.quality_uplift_percent(), 44);
    assert_eq!(sample.improvements.len(), 2);
    server.verify().await;
}

#[tokio::test]
async fn live_demo_reports_sample_failure_with_full_activity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/demo/sample"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let demo = LiveDemo::new(gateway(&server), ActivitySimulator::new(quick_stages()));

    let outcome = demo.run().await;

    assert_eq!(outcome.activity.len(), 3);
    assert_eq!(outcome.sample.unwrap_err().status(), Some(502));
}

#[tokio::test]
async fn pose_analysis_posts_library_sample() {
    let server = MockServer::start().await;
    let pose = PoseLibrary::find("power_walk_peek").unwrap();
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze/professional"))
        .and(body_json(json!({"prompt": pose.sample})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis": {
                "quality_score": 0.88,
                "detected_pose": "Power Walk Peek",
                "improvements": ["hard side light"]
            },
            "enhanced_prompt": "athletic power walk peek, low angle"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analysis = PoseLibrary::new(gateway(&server))
        .analyze("power_walk_peek")
        .await
        .unwrap();

    assert_eq!(analysis.analysis.detected_pose.as_deref(), Some("Power Walk Peek"));
    server.verify().await;
}

#[tokio::test]
async fn expert_preset_is_prefixed_and_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/expert/command"))
        .and(body_json(json!({
            "command": "EXPERT: Engage underwater rendering: fluid dynamics, light refraction, particle system"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Underwater rendering engaged",
            "suggestions": ["add caustics"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let console = ExpertConsole::new(gateway(&server), false, 10);

    let reply = console
        .apply_preset(&PhysicsPreset::Underwater)
        .await
        .unwrap();

    assert_eq!(reply.message, "Underwater rendering engaged");
    assert_eq!(console.recent(5).len(), 1);
    assert_eq!(console.suggestions(), vec!["add caustics".to_string()]);
    server.verify().await;
}
