#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod activity;
pub mod config;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod history;
pub mod safety;
pub mod session;
pub mod ui;

pub use config::Config;
pub use error::{GeminizerError, Result};
