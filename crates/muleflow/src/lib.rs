//! # MuleFlow
//!
//! Money-muling network detection over batch transaction data.
//!
//! Given a batch of transactions (sender, receiver, amount, timestamp),
//! MuleFlow builds a directed multigraph, runs three pattern detectors
//! and a false-positive classifier over it, and fuses the results into
//! per-account suspicion scores, fraud rings, and a reduced graph for
//! visualisation.
//!
//! ## Pipeline
//!
//! builder -> (classifier | cycle | smurfing | shell) -> scorer
//!
//! - **Graph builder**: aggregated directed multigraph with per-account
//!   and per-edge rollups
//! - **Cycle detector**: simple directed cycles of length 3 to 5
//! - **Smurfing detector**: fan-in/fan-out bursts in a 72-hour window
//! - **Shell-chain detector**: layered paths through low-degree shells
//! - **False-positive classifier**: salary / merchant / payroll-hub
//!   veto tags
//! - **Scorer**: weighted composite scores, ring assembly, report
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use muleflow::prelude::*;
//!
//! let config = AnalysisConfig::default();
//! let report = muleflow::analyze(&transactions, &config)?;
//! for account in &report.suspicious_accounts {
//!     println!("{} -> {}", account.account_id, account.suspicion_score);
//! }
//! ```
//!
//! One request, one analysis, one response: nothing is persisted between
//! invocations, and rerunning the same batch yields an identical report
//! (modulo processing time).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pipeline;

// Re-export the area crates.
pub use muleflow_core as core;
pub use muleflow_detect as detect;
pub use muleflow_graph as graph;
pub use muleflow_score as score;

pub use pipeline::{analyze, AnalysisPipeline};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::pipeline::{analyze, AnalysisPipeline};
    pub use muleflow_core::prelude::*;
    pub use muleflow_detect::prelude::*;
    pub use muleflow_graph::prelude::*;
    pub use muleflow_score::prelude::*;
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
