//! Pipeline module.
//!
//! This module provides the main analysis pipeline.

mod builder;

pub use builder::{Pipeline, PipelineBuilder, PipelineResult};
