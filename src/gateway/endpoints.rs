use reqwest::Method;

/// Catalogue of the service endpoints the client consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    ExpertCommand,
    DemoSample,
    AiStatus,
    AgentDetails(String),
    ProfessionalAnalyze,
    SafetyCheck,
    Generate,
    HistoryList,
    HistoryDelete(String),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Self::DemoSample | Self::AiStatus | Self::AgentDetails(_) | Self::HistoryList => {
                Method::GET
            }
            Self::ExpertCommand | Self::ProfessionalAnalyze | Self::SafetyCheck | Self::Generate => {
                Method::POST
            }
            Self::HistoryDelete(_) => Method::DELETE,
        }
    }

    /// Path segments below the service base URL. Identifiers are returned
    /// raw; the HTTP gateway percent-encodes each segment.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::ExpertCommand => vec!["api", "v1", "expert", "command"],
            Self::DemoSample => vec!["api", "v1", "demo", "sample"],
            Self::AiStatus => vec!["api", "v1", "ai", "status"],
            Self::AgentDetails(id) => vec!["api", "v1", "ai", "agents", id.as_str()],
            Self::ProfessionalAnalyze => vec!["api", "v1", "analyze", "professional"],
            Self::SafetyCheck => vec!["api", "v1", "safety", "check"],
            Self::Generate => vec!["api", "v1", "generate"],
            Self::HistoryList => vec!["api", "v1", "history"],
            Self::HistoryDelete(id) => vec!["api", "v1", "history", id.as_str()],
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    /// Stable name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExpertCommand => "expert_command",
            Self::DemoSample => "demo_sample",
            Self::AiStatus => "ai_status",
            Self::AgentDetails(_) => "agent_details",
            Self::ProfessionalAnalyze => "professional_analyze",
            Self::SafetyCheck => "safety_check",
            Self::Generate => "generate",
            Self::HistoryList => "history_list",
            Self::HistoryDelete(_) => "history_delete",
        }
    }
}
