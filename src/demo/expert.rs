use crate::error::DemoError;
use crate::gateway::types::{ExpertCommandRequest, ExpertReply};
use crate::gateway::{self, Endpoint, Gateway};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const EXPERT_PREFIX: &str = "EXPERT: ";

// ── Command library ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CommandCategory {
    Photography,
    Physics,
    Materials,
}

impl CommandCategory {
    pub const ALL: [Self; 3] = [Self::Photography, Self::Physics, Self::Materials];

    pub fn commands(self) -> &'static [&'static str] {
        match self {
            Self::Photography => &[
                "chiaroscuro lighting with high contrast",
                "shallow depth of field f/1.4",
                "golden hour warm natural lighting",
                "rim light backlit silhouette",
                "vignette edge darkening",
                "softbox diffused studio light",
            ],
            Self::Physics => &[
                "soaked fabric with water saturation",
                "underwater refraction and caustics",
                "flowing cloth with wind dynamics",
                "clinging wet material physics",
                "hair with water droplet simulation",
                "billowing fabric air resistance",
            ],
            Self::Materials => &[
                "silk with subsurface scattering",
                "wet cotton transparency effect",
                "leather with specular highlights",
                "denim with heavy texture",
                "chiffon semi-transparent drape",
                "satin lustrous reflective surface",
            ],
        }
    }
}

// ── Quick physics presets ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhysicsPreset {
    Wetness(String),
    Underwater,
    Flowing,
    Material(String),
}

impl PhysicsPreset {
    /// Parse `"<kind> [value]"`, e.g. `"wetness heavy"` or `"underwater"`.
    pub fn parse(input: &str) -> Result<Self, DemoError> {
        let input = input.trim();
        let (kind, value) = input
            .split_once(char::is_whitespace)
            .map_or((input, ""), |(kind, value)| (kind, value.trim()));
        let unknown = || DemoError::UnknownPreset(input.to_string());

        match kind.to_ascii_lowercase().as_str() {
            "wetness" if !value.is_empty() => Ok(Self::Wetness(value.to_string())),
            "material" if !value.is_empty() => Ok(Self::Material(value.to_string())),
            "underwater" => Ok(Self::Underwater),
            "flowing" => Ok(Self::Flowing),
            _ => Err(unknown()),
        }
    }

    pub fn command(&self) -> String {
        match self {
            Self::Wetness(level) => format!(
                "Apply {level} wetness physics: fabric saturation, transparency, drape alteration"
            ),
            Self::Underwater => {
                "Engage underwater rendering: fluid dynamics, light refraction, particle system"
                    .into()
            }
            Self::Flowing => {
                "Enable cloth physics: wind influence, natural folds, movement dynamics".into()
            }
            Self::Material(name) => format!(
                "Configure {name} material: subsurface scattering, texture detail, reflectivity"
            ),
        }
    }
}

// ── Console ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertExchange {
    /// Command as sent, including any prefix.
    pub command: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

struct ConsoleState {
    history: VecDeque<ExpertExchange>,
    suggestions: Vec<String>,
}

pub struct ExpertConsole {
    gateway: Arc<dyn Gateway>,
    expert_mode: AtomicBool,
    history_limit: usize,
    state: Mutex<ConsoleState>,
}

impl ExpertConsole {
    pub fn new(gateway: Arc<dyn Gateway>, expert_mode: bool, history_limit: usize) -> Self {
        Self {
            gateway,
            expert_mode: AtomicBool::new(expert_mode),
            history_limit: history_limit.max(1),
            state: Mutex::new(ConsoleState {
                history: VecDeque::new(),
                suggestions: Vec::new(),
            }),
        }
    }

    pub fn set_expert_mode(&self, enabled: bool) {
        self.expert_mode.store(enabled, Ordering::Relaxed);
    }

    pub fn expert_mode(&self) -> bool {
        self.expert_mode.load(Ordering::Relaxed)
    }

    /// Send `command` to the expert endpoint. Outside expert mode the text
    /// is marked with `EXPERT: ` first.
    pub async fn execute(&self, command: &str) -> Result<ExpertReply, DemoError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(DemoError::EmptyCommand);
        }
        let full_command = if self.expert_mode() {
            command.to_string()
        } else {
            format!("{EXPERT_PREFIX}{command}")
        };

        let reply: ExpertReply = gateway::send(
            self.gateway.as_ref(),
            Endpoint::ExpertCommand,
            &ExpertCommandRequest {
                command: full_command.clone(),
            },
        )
        .await
        .inspect_err(|err| tracing::warn!(error = %err, "expert.command_failed"))?;

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.history.push_back(ExpertExchange {
            command: full_command,
            response: reply.message.clone(),
            timestamp: Utc::now(),
        });
        while state.history.len() > self.history_limit {
            state.history.pop_front();
        }
        state.suggestions.clone_from(&reply.suggestions);
        tracing::debug!(suggestions = reply.suggestions.len(), "expert.command");
        Ok(reply)
    }

    pub async fn apply_preset(&self, preset: &PhysicsPreset) -> Result<ExpertReply, DemoError> {
        self.execute(&preset.command()).await
    }

    /// The last `n` exchanges, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ExpertExchange> {
        let state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let skip = state.history.len().saturating_sub(n);
        state.history.iter().skip(skip).cloned().collect()
    }

    /// Suggestions from the most recent successful command.
    pub fn suggestions(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .suggestions
            .clone()
    }
}
