//! Transaction and graph types.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use muleflow_core::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Input Records
// ============================================================================

/// A normalised transaction record.
///
/// Parsing from external formats (CSV and the like) is the transport
/// collaborator's concern; the engine consumes records that already carry
/// typed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier.
    pub transaction_id: String,
    /// Sending account identifier.
    pub sender_id: String,
    /// Receiving account identifier.
    pub receiver_id: String,
    /// Transferred amount. Must be positive to be accepted.
    pub amount: f64,
    /// Transaction timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction record.
    #[must_use]
    pub fn new(
        transaction_id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            amount,
            timestamp,
        }
    }

    /// Create a transaction record from an epoch-seconds timestamp.
    #[must_use]
    pub fn from_epoch(
        transaction_id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
        epoch_secs: i64,
    ) -> Self {
        let timestamp =
            DateTime::from_timestamp(epoch_secs, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(transaction_id, sender_id, receiver_id, amount, timestamp)
    }
}

// ============================================================================
// Graph Nodes and Edges
// ============================================================================

/// One transaction event as seen from a participating account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxnEvent {
    /// Counterparty node index.
    pub counterparty: usize,
    /// Transferred amount.
    pub amount: f64,
    /// Epoch seconds.
    pub timestamp: i64,
}

/// An account with its aggregated activity.
#[derive(Debug, Clone)]
pub struct AccountNode {
    /// Account identifier.
    pub id: String,
    /// Sum of all outgoing amounts.
    pub total_sent: f64,
    /// Sum of all incoming amounts.
    pub total_received: f64,
    /// Outgoing events, sorted by `(timestamp, counterparty)`.
    pub sent_tx: Vec<TxnEvent>,
    /// Incoming events, sorted by `(timestamp, counterparty)`.
    pub recv_tx: Vec<TxnEvent>,
}

/// Aggregated directed edge for one ordered `(sender, receiver)` pair.
#[derive(Debug, Clone)]
pub struct EdgeAggregate {
    /// Source node index.
    pub source: usize,
    /// Target node index.
    pub target: usize,
    /// Sum of amounts over the grouped transactions.
    pub total_amount: f64,
    /// Number of grouped transactions.
    pub count: usize,
    /// Epoch-second timestamps, sorted ascending.
    pub timestamps: Vec<i64>,
}

impl EdgeAggregate {
    /// The earliest timestamp on this edge.
    #[must_use]
    pub fn first_timestamp(&self) -> i64 {
        self.timestamps.first().copied().unwrap_or(0)
    }

    /// The timestamp on this edge closest to `anchor`.
    ///
    /// Ties resolve to the earlier timestamp. The timestamp list is never
    /// empty for a constructed edge.
    #[must_use]
    pub fn closest_timestamp(&self, anchor: i64) -> i64 {
        let ts = &self.timestamps;
        match ts.binary_search(&anchor) {
            Ok(i) => ts[i],
            Err(i) => {
                if i == 0 {
                    ts[0]
                } else if i == ts.len() {
                    ts[ts.len() - 1]
                } else {
                    let before = ts[i - 1];
                    let after = ts[i];
                    if anchor - before <= after - anchor {
                        before
                    } else {
                        after
                    }
                }
            }
        }
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Summary statistics of a constructed graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Number of distinct accounts.
    pub total_accounts: usize,
    /// Number of aggregated edges.
    pub total_edges: usize,
    /// Number of accepted transactions.
    pub total_transactions: usize,
    /// Number of records discarded during validation.
    pub discarded_transactions: usize,
}

/// The immutable directed transaction multigraph.
///
/// Node indices are assigned in lexicographic account-id order, so index
/// order and id order coincide; adjacency lists are sorted by neighbor
/// index. Detectors rely on both for deterministic enumeration.
#[derive(Debug, Clone)]
pub struct TxnGraph {
    pub(crate) nodes: Vec<AccountNode>,
    pub(crate) edges: Vec<EdgeAggregate>,
    /// Per-node outgoing `(target, edge_index)`, sorted by target.
    pub(crate) out_adj: Vec<Vec<(usize, usize)>>,
    /// Per-node incoming `(source, edge_index)`, sorted by source.
    pub(crate) in_adj: Vec<Vec<(usize, usize)>>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) accepted: usize,
    pub(crate) discarded: usize,
}

impl TxnGraph {
    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of aggregated edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All nodes, in index (= lexicographic id) order.
    #[must_use]
    pub fn nodes(&self) -> &[AccountNode] {
        &self.nodes
    }

    /// All edges, in `(source, target)` index order.
    #[must_use]
    pub fn edges(&self) -> &[EdgeAggregate] {
        &self.edges
    }

    /// The node at `idx`.
    #[must_use]
    pub fn node(&self, idx: usize) -> &AccountNode {
        &self.nodes[idx]
    }

    /// Resolve an account id to its node index.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Outgoing `(target, edge_index)` pairs of `u`, sorted by target.
    #[must_use]
    pub fn out_neighbors(&self, u: usize) -> &[(usize, usize)] {
        &self.out_adj[u]
    }

    /// Incoming `(source, edge_index)` pairs of `v`, sorted by source.
    #[must_use]
    pub fn in_neighbors(&self, v: usize) -> &[(usize, usize)] {
        &self.in_adj[v]
    }

    /// The aggregated edge `u -> v`, if any.
    #[must_use]
    pub fn edge_between(&self, u: usize, v: usize) -> Option<&EdgeAggregate> {
        let adj = &self.out_adj[u];
        adj.binary_search_by_key(&v, |&(t, _)| t)
            .ok()
            .map(|i| &self.edges[adj[i].1])
    }

    /// Number of distinct receiving counterparties of `u`.
    #[must_use]
    pub fn out_degree(&self, u: usize) -> usize {
        self.out_adj[u].len()
    }

    /// Number of distinct sending counterparties of `v`.
    #[must_use]
    pub fn in_degree(&self, v: usize) -> usize {
        self.in_adj[v].len()
    }

    /// Total distinct-counterparty degree of `n`.
    #[must_use]
    pub fn total_degree(&self, n: usize) -> usize {
        self.out_degree(n) + self.in_degree(n)
    }

    /// Number of accepted transactions.
    #[must_use]
    pub fn accepted_transactions(&self) -> usize {
        self.accepted
    }

    /// Number of records discarded during validation.
    #[must_use]
    pub fn discarded_transactions(&self) -> usize {
        self.discarded
    }

    /// Summary statistics.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            total_accounts: self.node_count(),
            total_edges: self.edge_count(),
            total_transactions: self.accepted,
            discarded_transactions: self.discarded,
        }
    }

    /// Fail-fast structural invariant check.
    ///
    /// A violation indicates a construction bug and surfaces as
    /// `internal_error`, never as an input problem.
    pub fn validate(&self) -> Result<()> {
        let n = self.nodes.len();
        for edge in &self.edges {
            if edge.source >= n || edge.target >= n {
                return Err(AnalysisError::internal(format!(
                    "edge {} -> {} references a missing node",
                    edge.source, edge.target
                )));
            }
            if edge.count != edge.timestamps.len() || edge.count == 0 {
                return Err(AnalysisError::internal(format!(
                    "edge {} -> {} has inconsistent transaction count",
                    edge.source, edge.target
                )));
            }
        }

        let adjacency_edges: usize = self.out_adj.iter().map(Vec::len).sum();
        if adjacency_edges != self.edges.len() {
            return Err(AnalysisError::internal(
                "adjacency is out of sync with the edge arena",
            ));
        }

        let sent: f64 = self.nodes.iter().map(|node| node.total_sent).sum();
        let received: f64 = self.nodes.iter().map(|node| node.total_received).sum();
        let edge_total: f64 = self.edges.iter().map(|edge| edge.total_amount).sum();
        let scale = sent.abs().max(1.0);
        if (sent - received).abs() > 1e-6 * scale || (sent - edge_total).abs() > 1e-6 * scale {
            return Err(AnalysisError::internal(
                "flow conservation violated between nodes and edges",
            ));
        }

        Ok(())
    }
}
