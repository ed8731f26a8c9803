pub mod schema;

pub use schema::{
    ActivityConfig, Config, DashboardConfig, ExpertConfig, GenerationConfig, SafetyConfig,
    ServiceConfig, StageConfig,
};
