//! Showcase workflows built on the gateway and the activity simulator.

pub mod expert;
pub mod professional;

pub use expert::{CommandCategory, ExpertConsole, ExpertExchange, PhysicsPreset};
pub use professional::{PoseLibrary, ProfessionalPose};

use crate::activity::{ActivitySimulator, AgentActivityRecord};
use crate::error::ServiceError;
use crate::gateway::types::DemoSample;
use crate::gateway::{self, Endpoint, Gateway};
use std::sync::Arc;

#[derive(Debug)]
pub struct DemoOutcome {
    /// Activity records of the run; empty when the run was cancelled.
    pub activity: Vec<AgentActivityRecord>,
    pub sample: Result<DemoSample, ServiceError>,
}

/// Runs the staged activity log next to a fetch of the demo sample.
pub struct LiveDemo {
    gateway: Arc<dyn Gateway>,
    simulator: Arc<ActivitySimulator>,
}

impl LiveDemo {
    pub fn new(gateway: Arc<dyn Gateway>, simulator: Arc<ActivitySimulator>) -> Self {
        Self { gateway, simulator }
    }

    pub fn simulator(&self) -> &Arc<ActivitySimulator> {
        &self.simulator
    }

    /// Start both halves together and return once both are done. A failed
    /// fetch is reported in the outcome; the activity log is kept either way.
    pub async fn run(&self) -> DemoOutcome {
        let run = self.simulator.start();
        let (activity, sample) = tokio::join!(
            run.wait(),
            gateway::fetch::<DemoSample>(self.gateway.as_ref(), Endpoint::DemoSample)
        );

        if let Err(err) = &sample {
            tracing::warn!(error = %err, "demo.sample_failed");
        }
        DemoOutcome {
            activity: activity.unwrap_or_default(),
            sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::StageDescriptor;
    use crate::gateway::testing::ScriptedGateway;
    use serde_json::json;
    use std::time::Duration;

    fn simulator() -> Arc<ActivitySimulator> {
        ActivitySimulator::new(
            ["nlu", "render"]
                .iter()
                .enumerate()
                .map(|(i, id)| StageDescriptor {
                    agent_id: (*id).into(),
                    display_name: id.to_uppercase(),
                    role_description: String::new(),
                    offset: Duration::from_millis(100 * (i as u64 + 1)),
                })
                .collect(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn run_joins_activity_and_sample() {
        let gateway = ScriptedGateway::new(|_, _| {
            (
                Duration::from_secs(2),
                Ok(json!({
                    "original_input": "woman in rain",
                    "enhanced_prompt": "rain-soaked portrait, rim light",
                    "quality_score": 0.92,
                    "improvements": ["lighting"],
                    "agents_used": 5
                })),
            )
        });
        let demo = LiveDemo::new(gateway.clone(), simulator());

        let outcome = demo.run().await;

        assert_eq!(outcome.activity.len(), 2);
        let sample = outcome.sample.unwrap();
        assert_eq!(sample.quality_uplift_percent(), 42);
        assert_eq!(gateway.count(&Endpoint::DemoSample), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_sample_keeps_activity_log() {
        let gateway = ScriptedGateway::new(|_, _| {
            (
                Duration::ZERO,
                Err(ServiceError::Http {
                    status: 500,
                    body: "boom".into(),
                }),
            )
        });
        let demo = LiveDemo::new(gateway, simulator());

        let outcome = demo.run().await;

        assert_eq!(outcome.activity.len(), 2);
        assert_eq!(outcome.sample.unwrap_err().status(), Some(500));
        assert_eq!(demo.simulator().progress(), (2, 2));
    }
}
