//! # NCML Common Library
//!
//! Shared code for the no-code ML client crates:
//! - Error type
//! - Configuration loading (TOML + environment + CLI overrides)
//! - ML vocabulary (project type, task type, optimization metric)
//! - Training-service wire types
//! - Wizard event bus
//! - Session capability interface

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod ml;

pub use error::{Error, Result};
pub use ml::{OptimizationMetric, ProjectType, TaskType};
