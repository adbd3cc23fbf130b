//! Reduced visualisation graph.
//!
//! Keeps every suspicious account, then their 1-hop neighbours, then
//! remaining nodes, all in index order, up to the node budget. Padding is
//! deterministic so repeated runs serialise identically. Edges are
//! retained when both endpoints are.

use crate::types::{VizEdge, VizGraph, VizNode};
use hashbrown::HashMap;
use muleflow_graph::types::TxnGraph;
use std::collections::BTreeSet;

/// Build the reduced graph.
///
/// `scores` maps suspicious node indices to their reported scores.
/// Suspicious accounts are never evicted, even when they alone exceed
/// the budget.
#[must_use]
pub fn build(graph: &TxnGraph, scores: &HashMap<usize, u32>, max_nodes: usize) -> VizGraph {
    let mut keep: BTreeSet<usize> = scores.keys().copied().collect();

    // 1-hop neighbours of suspicious accounts, index order.
    let suspicious: Vec<usize> = keep.iter().copied().collect();
    'neighbours: for &node in &suspicious {
        for &(neighbor, _) in graph
            .out_neighbors(node)
            .iter()
            .chain(graph.in_neighbors(node).iter())
        {
            if keep.len() >= max_nodes && !keep.contains(&neighbor) {
                break 'neighbours;
            }
            keep.insert(neighbor);
        }
    }

    // Pad with remaining nodes while under budget.
    for node in 0..graph.node_count() {
        if keep.len() >= max_nodes {
            break;
        }
        keep.insert(node);
    }

    let nodes: Vec<VizNode> = keep
        .iter()
        .map(|&node| {
            let account = graph.node(node);
            VizNode {
                id: account.id.clone(),
                total_sent: account.total_sent,
                total_received: account.total_received,
                suspicion_score: scores.get(&node).copied().unwrap_or(0),
                is_suspicious: scores.contains_key(&node),
            }
        })
        .collect();

    let edges: Vec<VizEdge> = graph
        .edges()
        .iter()
        .filter(|edge| keep.contains(&edge.source) && keep.contains(&edge.target))
        .map(|edge| VizEdge {
            source: graph.node(edge.source).id.clone(),
            target: graph.node(edge.target).id.clone(),
            amount: edge.total_amount,
            count: edge.count,
        })
        .collect();

    VizGraph { nodes, edges }
}
