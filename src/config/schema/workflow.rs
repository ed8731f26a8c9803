use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

// ── Safety screening ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Quiet period after the last draft edit before screening (default: 300)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Screen every prompt before generation (default: true)
    #[serde(default = "default_true")]
    pub gate_generation: bool,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl SafetyConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            gate_generation: true,
        }
    }
}

// ── Generation ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Option category → value sent with every generation unless overridden
    #[serde(default = "default_options")]
    pub default_options: BTreeMap<String, String>,
    /// Where exported images land (default: current directory)
    #[serde(default)]
    pub export_dir: Option<String>,
}

fn default_options() -> BTreeMap<String, String> {
    [
        ("archetype", "athletic"),
        ("material", "cotton"),
        ("lighting", "golden hour"),
        ("style", "photorealistic"),
        ("angle", "eye level"),
        ("quality", "8k"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_options: default_options(),
            export_dir: None,
        }
    }
}

// ── Staged activity ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Offset from the start of the run, in milliseconds
    pub offset_ms: u64,
}

impl StageConfig {
    fn new(id: &str, name: &str, role: &str, offset_ms: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            offset_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_stages")]
    pub stages: Vec<StageConfig>,
}

fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new("nlu", "NLU Engine", "Understanding your request...", 1_000),
        StageConfig::new(
            "quality",
            "Quality Inspector",
            "Assessing prompt quality...",
            3_000,
        ),
        StageConfig::new(
            "curator",
            "Prompt Curator",
            "Enhancing with professional terms...",
            6_000,
        ),
        StageConfig::new("error", "Error Detective", "Checking for issues...", 10_000),
        StageConfig::new(
            "render",
            "Render Engine",
            "Creating professional image...",
            15_000,
        ),
    ]
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
        }
    }
}

// ── Status dashboard ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Seconds between status polls (default: 10)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    10
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

// ── Expert console ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpertConfig {
    /// Send commands verbatim instead of prefixing `EXPERT: ` (default: false)
    #[serde(default)]
    pub expert_mode: bool,
    /// Commands kept in the console history (default: 50)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    50
}

impl Default for ExpertConfig {
    fn default() -> Self {
        Self {
            expert_mode: false,
            history_limit: default_history_limit(),
        }
    }
}
