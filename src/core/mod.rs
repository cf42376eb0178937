//! Core domain models for the extraction pipeline
//!
//! This module defines the validated step and pipeline configuration
//! values, the YAML specification format they are loaded from, and the
//! per-step execution results.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use config::{PipelineSpec, StepSpec};
pub use error::{ConfigError, ValidationError};
pub use pipeline::*;
pub use state::*;
pub use step::*;
