//! Wire records exchanged with the Geminizer service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit `null` list the same as a missing one.
fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Prompt-bearing requests ─────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpertCommandRequest {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub options: BTreeMap<String, String>,
}

// ── Safety ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    #[serde(default, deserialize_with = "nullable_list")]
    pub issues: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub recovery_suggestions: Vec<String>,
}

// ── Generation ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    /// Base64-encoded image bytes.
    pub image_data: String,
    pub enriched_prompt: String,
    pub request_id: String,
}

// ── History ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub enriched_prompt: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// The history listing arrives either bare or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryListing {
    Bare(Vec<HistoryEntry>),
    Wrapped { history: Vec<HistoryEntry> },
}

impl HistoryListing {
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        match self {
            Self::Bare(entries) | Self::Wrapped { history: entries } => entries,
        }
    }
}

// ── Demo / analysis / expert ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemoSample {
    pub original_input: String,
    pub enhanced_prompt: String,
    pub quality_score: f64,
    #[serde(default, deserialize_with = "nullable_list")]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub agents_used: Option<u32>,
    #[serde(default)]
    pub processing_time: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

impl DemoSample {
    /// Quality gain over the neutral 0.5 baseline, in whole percent.
    #[allow(clippy::cast_possible_truncation)]
    pub fn quality_uplift_percent(&self) -> i64 {
        ((self.quality_score - 0.5) * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisDetail {
    pub quality_score: f64,
    #[serde(default)]
    pub detected_pose: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfessionalAnalysis {
    pub analysis: AnalysisDetail,
    pub enhanced_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpertReply {
    pub message: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub suggestions: Vec<String>,
}

// ── AI status ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub health: f64,
    #[serde(default)]
    pub performance: f64,
    #[serde(default, alias = "last_active")]
    pub last_active: Option<String>,
    #[serde(default, alias = "is_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    #[serde(alias = "overall_health")]
    pub overall_health: f64,
    #[serde(alias = "average_performance")]
    pub average_performance: f64,
    #[serde(alias = "system_load")]
    pub system_load: f64,
    #[serde(default, alias = "agents_used")]
    pub agents_used: u32,
    #[serde(default, alias = "total_agents")]
    pub total_agents: u32,
    #[serde(default)]
    pub agents: BTreeMap<String, AgentStatus>,
    #[serde(default)]
    pub uptime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentDetails {
    pub agent: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
