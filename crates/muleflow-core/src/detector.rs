//! Stage metadata for pipeline components.
//!
//! Every component (builder, classifier, detector, scorer) carries a
//! `StageMetadata` describing it for logging and introspection.

use crate::stage::Stage;
use serde::{Deserialize, Serialize};

/// Metadata describing one pipeline component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageMetadata {
    /// Unique component identifier (e.g., "detect/cycles").
    pub id: String,

    /// Pipeline stage the component belongs to.
    pub stage: Stage,

    /// Human-readable description.
    pub description: String,

    /// Contract-level cap on emitted results, if the component has one.
    ///
    /// Hitting the cap is not an error; it surfaces as a warning in the
    /// analysis summary.
    pub result_cap: Option<usize>,
}

impl StageMetadata {
    /// Create new metadata for a component.
    #[must_use]
    pub fn new(id: impl Into<String>, stage: Stage) -> Self {
        Self {
            id: id.into(),
            stage,
            description: String::new(),
            result_cap: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the result cap.
    #[must_use]
    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = Some(cap);
        self
    }
}
