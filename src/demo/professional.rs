use crate::error::DemoError;
use crate::gateway::types::{ProfessionalAnalysis, PromptRequest};
use crate::gateway::{self, Endpoint, Gateway};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfessionalPose {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub sample: &'static str,
}

const POSES: &[ProfessionalPose] = &[
    ProfessionalPose {
        key: "power_walk_peek",
        name: "Power Walk Peek",
        description: "Dynamic walking pose emphasizing athleticism and shoulder definition",
        sample: "Power Walk Peek shot to emphasize athleticism and defined shoulders. Model walking away then twisting back, low angle with hard directional side lighting.",
    },
    ProfessionalPose {
        key: "v_curve_lounge",
        name: "V-Curve Lounge",
        description: "Reclining pose creating elongated V-shape for flawless skin aesthetic",
        sample: "V-Curve Lounge for idealized skin. Model reclining with body arch, high angle with broad flat lighting to eliminate shadows.",
    },
    ProfessionalPose {
        key: "flirty_twist",
        name: "Flirty Twist",
        description: "Playful pose emphasizing S-curve and engaging connection",
        sample: "Flirty Twist emphasizing S-curve. Model with torso rotation and playful expression, eye-level angle with soft lighting.",
    },
];

/// Built-in professional poses and their analysis against the service.
pub struct PoseLibrary {
    gateway: Arc<dyn Gateway>,
}

impl PoseLibrary {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn poses() -> &'static [ProfessionalPose] {
        POSES
    }

    pub fn find(key: &str) -> Option<&'static ProfessionalPose> {
        let key = key.trim();
        POSES.iter().find(|pose| pose.key.eq_ignore_ascii_case(key))
    }

    /// Send the sample prompt of `key` for professional analysis.
    pub async fn analyze(&self, key: &str) -> Result<ProfessionalAnalysis, DemoError> {
        let pose = Self::find(key).ok_or_else(|| DemoError::UnknownPose(key.trim().to_string()))?;
        self.analyze_prompt(pose.sample).await
    }

    /// Analyze a free-form prompt.
    pub async fn analyze_prompt(&self, prompt: &str) -> Result<ProfessionalAnalysis, DemoError> {
        if prompt.trim().is_empty() {
            return Err(DemoError::EmptyPrompt);
        }
        let analysis: ProfessionalAnalysis = gateway::send(
            self.gateway.as_ref(),
            Endpoint::ProfessionalAnalyze,
            &PromptRequest {
                prompt: prompt.to_string(),
            },
        )
        .await?;
        tracing::info!(
            quality = analysis.analysis.quality_score,
            pose = analysis.analysis.detected_pose.as_deref().unwrap_or("custom"),
            "demo.analyzed"
        );
        Ok(analysis)
    }
}
