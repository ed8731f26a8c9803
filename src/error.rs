use std::time::Duration;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the Geminizer client.
///
/// Each controller defines its own error type. Library callers can match on
/// these to decide how to present a failure; the application layer keeps
/// using `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GeminizerError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Remote service ──────────────────────────────────────────────────
    #[error("service: {0}")]
    Service(#[from] ServiceError),

    // ── Generation workflow ─────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── Session ─────────────────────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── History ─────────────────────────────────────────────────────────
    #[error("history: {0}")]
    History(#[from] HistoryError),

    // ── Demo workflows ──────────────────────────────────────────────────
    #[error("demo: {0}")]
    Demo(#[from] DemoError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Remote service errors ──────────────────────────────────────────────────

/// Coarse failure class of a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceErrorKind {
    Network,
    Http,
    Parse,
}

/// Every way an outbound call can fail. Gateways never panic or leak
/// transport errors; they return one of these.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service unreachable: {0}")]
    Network(String),

    #[error("service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed service response: {0}")]
    Parse(String),
}

impl ServiceError {
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            Self::Network(_) | Self::Timeout(_) => ServiceErrorKind::Network,
            Self::Http { .. } => ServiceErrorKind::Http,
            Self::Parse(_) => ServiceErrorKind::Parse,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ─── Generation workflow errors ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum GenerationErrorKind {
    InvalidInput,
    Unsafe,
    ServiceFailure,
    Superseded,
    NoResult,
    Export,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("prompt rejected by safety screening: {}", issues.join("; "))]
    Unsafe {
        issues: Vec<String>,
        suggestions: Vec<String>,
    },

    #[error("generation failed: {detail}")]
    ServiceFailure {
        detail: String,
        #[source]
        source: ServiceError,
    },

    #[error("superseded by a newer submission")]
    Superseded,

    #[error("no generation result to export")]
    NoResult,

    #[error("export failed: {0}")]
    Export(#[from] std::io::Error),
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::InvalidInput(_) => GenerationErrorKind::InvalidInput,
            Self::Unsafe { .. } => GenerationErrorKind::Unsafe,
            Self::ServiceFailure { .. } => GenerationErrorKind::ServiceFailure,
            Self::Superseded => GenerationErrorKind::Superseded,
            Self::NoResult => GenerationErrorKind::NoResult,
            Self::Export(_) => GenerationErrorKind::Export,
        }
    }

    pub(crate) fn service(source: ServiceError) -> Self {
        Self::ServiceFailure {
            detail: source.to_string(),
            source,
        }
    }
}

// ─── Session errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("identity must have a non-empty username")]
    InvalidIdentity,

    #[error("credential token must not be empty")]
    InvalidToken,

    #[error("store: {0}")]
    Store(String),
}

// ─── History errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history entry id must not be empty")]
    InvalidId,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

// ─── Demo workflow errors ───────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("unknown professional pose: {0}")]
    UnknownPose(String),

    #[error("command must not be empty")]
    EmptyCommand,

    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("unknown physics preset: {0}")]
    UnknownPreset(String),

    #[error("agent id must not be empty")]
    EmptyAgentId,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GeminizerError>;
