mod base;
mod service;
mod workflow;

pub use base::Config;
pub use service::ServiceConfig;
pub use workflow::{
    ActivityConfig, DashboardConfig, ExpertConfig, GenerationConfig, SafetyConfig, StageConfig,
};
