//! # MuleFlow Detect
//!
//! Pattern detectors over the immutable transaction graph:
//! - `CycleDetector`: simple directed cycles of length 3 to 5
//! - `SmurfingDetector`: fan-in / fan-out bursts in a sliding window
//! - `ShellChainDetector`: layered paths through low-degree shells
//! - `FalsePositiveClassifier`: benign-pattern tagging (salary,
//!   merchant, payroll hub) that vetoes accounts at scoring time
//!
//! Detectors implement the [`Detector`](types::Detector) trait and emit
//! [`Finding`](types::Finding)s consumed by the scorer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod cycles;
pub mod shell;
pub mod smurfing;
pub mod stats;
pub mod types;

pub use classifier::{FalsePositiveClassifier, FpTag};
pub use cycles::CycleDetector;
pub use shell::ShellChainDetector;
pub use smurfing::SmurfingDetector;
pub use types::{Detection, Detector, Finding, PatternType, ScoreFamily};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::classifier::{FalsePositiveClassifier, FpTag};
    pub use crate::cycles::CycleDetector;
    pub use crate::shell::ShellChainDetector;
    pub use crate::smurfing::SmurfingDetector;
    pub use crate::types::{sort_findings, Detection, Detector, Finding, PatternType, ScoreFamily};
}
