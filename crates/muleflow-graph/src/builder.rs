//! Graph construction from a transaction batch.
//!
//! The builder is a pure function of its input: records are validated,
//! sorted by `(timestamp, transaction_id)`, grouped into aggregated edges
//! per ordered `(sender, receiver)` pair, and rolled up into per-account
//! aggregates. Invalid records are discarded deterministically and
//! counted; a batch with no surviving record fails with `empty_input`.

use crate::types::{AccountNode, EdgeAggregate, Transaction, TxnEvent, TxnGraph};
use hashbrown::HashMap;
use muleflow_core::{
    detector::StageMetadata,
    error::{AnalysisError, Result},
    stage::Stage,
};
use std::collections::{BTreeMap, BTreeSet};

/// Directed multigraph builder.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    metadata: StageMetadata,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: StageMetadata::new("graph/builder", Stage::GraphConstruction)
                .with_description("Directed multigraph construction with per-account aggregates"),
        }
    }

    /// Component metadata.
    #[must_use]
    pub fn metadata(&self) -> &StageMetadata {
        &self.metadata
    }

    /// Build the transaction graph.
    pub fn build(&self, transactions: &[Transaction]) -> Result<TxnGraph> {
        if transactions.is_empty() {
            return Err(AnalysisError::empty_input("no transactions provided"));
        }

        let mut accepted: Vec<&Transaction> = Vec::with_capacity(transactions.len());
        let mut discarded = 0usize;
        for tx in transactions {
            if Self::is_acceptable(tx) {
                accepted.push(tx);
            } else {
                discarded += 1;
            }
        }

        if accepted.is_empty() {
            return Err(AnalysisError::empty_input(
                "no valid transactions after validation",
            ));
        }
        if discarded > 0 {
            tracing::debug!(discarded, "discarded invalid transaction records");
        }

        // Deterministic processing order regardless of input order.
        accepted.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });

        // Node indices in lexicographic account-id order.
        let mut ids: BTreeSet<&str> = BTreeSet::new();
        for tx in &accepted {
            ids.insert(tx.sender_id.as_str());
            ids.insert(tx.receiver_id.as_str());
        }
        let mut index: HashMap<String, usize> = HashMap::with_capacity(ids.len());
        let mut nodes: Vec<AccountNode> = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            index.insert((*id).to_string(), i);
            nodes.push(AccountNode {
                id: (*id).to_string(),
                total_sent: 0.0,
                total_received: 0.0,
                sent_tx: Vec::new(),
                recv_tx: Vec::new(),
            });
        }

        // Group transactions into aggregated edges and roll up node totals.
        let mut edge_map: BTreeMap<(usize, usize), (f64, Vec<i64>)> = BTreeMap::new();
        for tx in &accepted {
            let u = index[tx.sender_id.as_str()];
            let v = index[tx.receiver_id.as_str()];
            let ts = tx.timestamp.timestamp();

            nodes[u].total_sent += tx.amount;
            nodes[u].sent_tx.push(TxnEvent {
                counterparty: v,
                amount: tx.amount,
                timestamp: ts,
            });
            nodes[v].total_received += tx.amount;
            nodes[v].recv_tx.push(TxnEvent {
                counterparty: u,
                amount: tx.amount,
                timestamp: ts,
            });

            let entry = edge_map.entry((u, v)).or_insert_with(|| (0.0, Vec::new()));
            entry.0 += tx.amount;
            entry.1.push(ts);
        }

        let mut edges: Vec<EdgeAggregate> = Vec::with_capacity(edge_map.len());
        let mut out_adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); nodes.len()];
        let mut in_adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); nodes.len()];
        for ((u, v), (total, mut timestamps)) in edge_map {
            timestamps.sort_unstable();
            let edge_idx = edges.len();
            edges.push(EdgeAggregate {
                source: u,
                target: v,
                total_amount: total,
                count: timestamps.len(),
                timestamps,
            });
            out_adj[u].push((v, edge_idx));
            in_adj[v].push((u, edge_idx));
        }
        // BTreeMap iteration left out_adj sorted by target; incoming lists
        // still need their per-node source order.
        for adj in &mut in_adj {
            adj.sort_unstable_by_key(|&(source, _)| source);
        }

        // Ties on equal timestamps resolve by counterparty id order, which
        // is counterparty index order by construction.
        for node in &mut nodes {
            node.sent_tx
                .sort_by_key(|e| (e.timestamp, e.counterparty));
            node.recv_tx
                .sort_by_key(|e| (e.timestamp, e.counterparty));
        }

        let graph = TxnGraph {
            accepted: accepted.len(),
            discarded,
            nodes,
            edges,
            out_adj,
            in_adj,
            index,
        };

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            transactions = graph.accepted_transactions(),
            discarded = graph.discarded_transactions(),
            "built transaction graph"
        );

        Ok(graph)
    }

    /// Record-level validation: non-empty ids, a positive finite amount,
    /// and no self-loop.
    fn is_acceptable(tx: &Transaction) -> bool {
        !tx.transaction_id.is_empty()
            && !tx.sender_id.is_empty()
            && !tx.receiver_id.is_empty()
            && tx.amount.is_finite()
            && tx.amount > 0.0
            && tx.sender_id != tx.receiver_id
    }
}
