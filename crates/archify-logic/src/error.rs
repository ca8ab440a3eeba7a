//! Errors at the crate's fallible edges.
//!
//! Generation itself never fails; only parsing inputs can.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid requirements JSON: {0}")]
    Requirements(#[source] serde_json::Error),

    #[error("invalid planner config JSON: {0}")]
    Config(#[source] serde_json::Error),

    #[error("planner config failed validation: {0:?}")]
    InvalidConfig(Vec<ConfigError>),
}
