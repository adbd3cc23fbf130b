//! # MuleFlow Core
//!
//! Core abstractions for the MuleFlow money-muling detection engine.
//!
//! This crate provides:
//! - Pipeline stage definitions
//! - Stage metadata for builders, classifiers, detectors, and scorers
//! - The analysis error taxonomy
//! - Configuration with TOML and environment loading
//! - Logging setup built on `tracing`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod detector;
pub mod error;
pub mod logging;
pub mod stage;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        AnalysisConfig, CycleConfig, DetectorWeights, FalsePositiveConfig, ScoringConfig,
        ShellChainConfig, SmurfingConfig, VizConfig,
    };
    pub use crate::detector::StageMetadata;
    pub use crate::error::{AnalysisError, Result};
    pub use crate::logging::{LogConfig, LogLevel};
    pub use crate::stage::Stage;
}
