use crate::support::gateway;
use geminizer::dashboard::{HealthBand, StatusDashboard};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn status_poll_accepts_snake_case_and_bands_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overall_health": 0.72,
            "average_performance": 0.81,
            "system_load": 0.4,
            "agents_used": 3,
            "total_agents": 5,
            "uptime": "4h12m",
            "agents": {
                "render": {
                    "name": "Render Engine",
                    "role": "image synthesis",
                    "health": 0.7,
                    "performance": 0.65,
                    "last_active": "2026-05-04T12:00:00Z",
                    "is_active": true
                }
            }
        })))
        .mount(&server)
        .await;

    let dashboard = StatusDashboard::new(gateway(&server), Duration::from_secs(10));

    let status = dashboard.fetch_once().await.unwrap();

    assert_eq!(status.agents_used, 3);
    assert!(status.agents["render"].is_active);
    assert_eq!(dashboard.view().health(), Some(HealthBand::Fair));
}

#[tokio::test]
async fn agent_details_hits_agent_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai/agents/curator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agent": {"name": "Prompt Curator", "health": 0.9},
            "timestamp": "2026-05-04T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = StatusDashboard::new(gateway(&server), Duration::from_secs(10));

    let details = dashboard.agent_details("curator").await.unwrap();

    assert_eq!(details.agent["name"], "Prompt Curator");
    assert!(details.timestamp.is_some());
    server.verify().await;
}

#[tokio::test]
async fn unreachable_service_leaves_view_without_status() {
    let dashboard = StatusDashboard::new(
        std::sync::Arc::new(
            geminizer::gateway::HttpGateway::new(
                "http://127.0.0.1:9",
                Duration::from_secs(2),
                Duration::from_secs(1),
            )
            .unwrap(),
        ),
        Duration::from_secs(10),
    );

    assert!(dashboard.fetch_once().await.is_err());

    let view = dashboard.view();
    assert!(view.status.is_none());
    assert!(view.last_error.is_some());
    assert_eq!(view.polls, 1);
}
