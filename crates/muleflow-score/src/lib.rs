//! # MuleFlow Score
//!
//! Fuses detector findings into the final analysis report: per-account
//! composite suspicion scores, fraud-ring assembly, and the reduced
//! visualisation graph.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod rings;
pub mod scoring;
pub mod types;
pub mod viz;

pub use scoring::Scorer;
pub use types::{
    AnalysisReport, AnalysisSummary, FraudRing, SuspiciousAccount, VizEdge, VizGraph, VizNode,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::scoring::Scorer;
    pub use crate::types::{
        AnalysisReport, AnalysisSummary, FraudRing, SuspiciousAccount, VizEdge, VizGraph, VizNode,
    };
}
