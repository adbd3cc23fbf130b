//! Pipeline stage definitions.
//!
//! An analysis run is a fixed pipeline: graph construction, false-positive
//! control and pattern detection over the shared immutable graph, then
//! scoring. Stages categorize components for metadata, logging context,
//! and saturation warnings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage a component belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Transaction ingestion and directed multigraph construction.
    GraphConstruction,
    /// Benign-pattern tagging that vetoes accounts at scoring time.
    FalsePositiveControl,
    /// Pattern detectors reading the immutable graph.
    PatternDetection,
    /// Score fusion, ring assembly, and report emission.
    Scoring,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: &'static [Stage] = &[
        Stage::GraphConstruction,
        Stage::FalsePositiveControl,
        Stage::PatternDetection,
        Stage::Scoring,
    ];

    /// Returns the stage name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::GraphConstruction => "graph",
            Stage::FalsePositiveControl => "classify",
            Stage::PatternDetection => "detect",
            Stage::Scoring => "score",
        }
    }

    /// Parse a stage from its string name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "graph" => Some(Stage::GraphConstruction),
            "classify" => Some(Stage::FalsePositiveControl),
            "detect" => Some(Stage::PatternDetection),
            "score" => Some(Stage::Scoring),
            _ => None,
        }
    }

    /// Returns true for the detection stage.
    #[must_use]
    pub const fn is_detection(&self) -> bool {
        matches!(self, Stage::PatternDetection)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip() {
        for &stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("unknown"), None);
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::ALL.len(), 4);
        assert_eq!(Stage::ALL[0], Stage::GraphConstruction);
        assert_eq!(Stage::ALL[3], Stage::Scoring);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::PatternDetection.to_string(), "detect");
        assert!(Stage::PatternDetection.is_detection());
        assert!(!Stage::Scoring.is_detection());
    }
}
