//! Report types.
//!
//! The structured document returned to the transport collaborator. All
//! types serialize with serde; field names are the wire contract.

use serde::{Deserialize, Serialize};

// ============================================================================
// Suspicious Accounts and Rings
// ============================================================================

/// One flagged account in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    /// Account identifier.
    pub account_id: String,
    /// Composite suspicion score in `[10, 100]`.
    pub suspicion_score: u32,
    /// Wire names of the patterns that contributed.
    pub detected_patterns: Vec<String>,
    /// Ring the account belongs to, if any.
    pub ring_id: Option<String>,
}

/// A group of accounts participating in one shared illicit pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRing {
    /// Ring identifier (`RING-0001`, ...).
    pub ring_id: String,
    /// Member account identifiers, in pattern order.
    pub member_accounts: Vec<String>,
    /// Wire name of the dominant pattern.
    pub pattern_type: String,
    /// Ring risk score in `[0, 100]`.
    pub risk_score: u32,
}

/// Analysis summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Distinct accounts in the graph.
    pub total_accounts_analyzed: usize,
    /// Accounts in the suspicious output.
    pub suspicious_accounts_flagged: usize,
    /// Rings in the output.
    pub fraud_rings_detected: usize,
    /// Wall-clock processing time, stamped by the pipeline.
    pub processing_time_seconds: f64,
    /// Non-fatal notices, e.g. a detector hitting its result cap.
    pub warnings: Vec<String>,
}

// ============================================================================
// Visualisation Graph
// ============================================================================

/// One node of the reduced visualisation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizNode {
    /// Account identifier.
    pub id: String,
    /// Sum of outgoing amounts.
    pub total_sent: f64,
    /// Sum of incoming amounts.
    pub total_received: f64,
    /// Suspicion score; zero for non-flagged nodes.
    pub suspicion_score: u32,
    /// Whether the node is in the suspicious output.
    pub is_suspicious: bool,
}

/// One edge of the reduced visualisation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizEdge {
    /// Source account identifier.
    pub source: String,
    /// Target account identifier.
    pub target: String,
    /// Aggregated amount over the grouped transactions.
    pub amount: f64,
    /// Number of grouped transactions.
    pub count: usize,
}

/// The reduced graph shipped to the visualisation front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizGraph {
    /// Retained nodes, in account-id order.
    pub nodes: Vec<VizNode>,
    /// Edges with both endpoints retained.
    pub edges: Vec<VizEdge>,
}

// ============================================================================
// Report
// ============================================================================

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Flagged accounts, sorted by score descending then id.
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    /// Assembled fraud rings.
    pub fraud_rings: Vec<FraudRing>,
    /// Summary statistics.
    pub summary: AnalysisSummary,
    /// Reduced graph for visualisation.
    pub graph_data: VizGraph,
}

impl AnalysisReport {
    /// Serialize the report to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
