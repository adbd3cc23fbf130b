//! Shell-chain (layering) detection.
//!
//! Finds directed simple paths of at least `min_hops` hops in which every
//! intermediate node is a low-connectivity pass-through
//! (`in_degree + out_degree <= intermediate_degree_max`). Origin and
//! terminal nodes are unrestricted.
//!
//! Exploration is a bounded BFS from every node: origins in index order,
//! successors ascending, FIFO queue, so enumeration order is BFS order
//! with lexicographic ties. A global chain cap bounds the search.

use crate::types::{Detection, Detector, Finding, PatternType};
use muleflow_core::{config::ShellChainConfig, detector::StageMetadata, stage::Stage};
use muleflow_graph::types::TxnGraph;
use std::collections::VecDeque;

/// Amount at which the chain amount factor saturates.
const AMOUNT_SATURATION: f64 = 100_000.0;

/// Hop count at which the length factor saturates.
const LENGTH_SATURATION_HOPS: f64 = 6.0;

/// Layered shell-chain detector.
#[derive(Debug, Clone)]
pub struct ShellChainDetector {
    metadata: StageMetadata,
    config: ShellChainConfig,
}

impl Default for ShellChainDetector {
    fn default() -> Self {
        Self::new(ShellChainConfig::default())
    }
}

impl ShellChainDetector {
    /// Create a detector with the given configuration.
    #[must_use]
    pub fn new(config: ShellChainConfig) -> Self {
        Self {
            metadata: StageMetadata::new("detect/shell-chains", Stage::PatternDetection)
                .with_description("Layered path detection through low-degree intermediaries")
                .with_result_cap(config.max_chains),
            config,
        }
    }

    /// Score one chain. Edges exist by construction of the search.
    fn score_chain(&self, graph: &TxnGraph, path: &[usize]) -> Option<Finding> {
        let hops = path.len() - 1;

        let mut total = 0.0;
        let mut span_min = i64::MAX;
        let mut span_max = i64::MIN;
        for pair in path.windows(2) {
            let edge = graph.edge_between(pair[0], pair[1])?;
            total += edge.total_amount;
            span_min = span_min.min(*edge.timestamps.first()?);
            span_max = span_max.max(*edge.timestamps.last()?);
        }

        let span_secs = span_max - span_min;
        let span_hours = span_secs as f64 / 3_600.0;
        let compactness = 1.0 / (1.0 + span_hours / 24.0);
        let amount_factor = (total / AMOUNT_SATURATION).min(1.0);
        let length_factor = (hops as f64 / LENGTH_SATURATION_HOPS).min(1.0);
        let raw_score =
            (0.4 * compactness + 0.3 * amount_factor + 0.3 * length_factor).clamp(0.0, 1.0);

        Some(Finding {
            pattern: PatternType::ShellChain,
            accounts: path.to_vec(),
            amount: total,
            span_secs,
            raw_score,
        })
    }
}

impl Detector for ShellChainDetector {
    fn metadata(&self) -> &StageMetadata {
        &self.metadata
    }

    fn detect(&self, graph: &TxnGraph) -> Detection {
        let mut findings: Vec<Finding> = Vec::new();
        let mut truncated = false;

        'origins: for origin in 0..graph.node_count() {
            let mut queue: VecDeque<Vec<usize>> = VecDeque::new();
            queue.push_back(vec![origin]);

            while let Some(path) = queue.pop_front() {
                let current = *path.last().expect("paths are never empty");

                // Extending past a non-origin node makes it an
                // intermediate, so it must satisfy the degree bound.
                if path.len() > 1
                    && graph.total_degree(current) > self.config.intermediate_degree_max
                {
                    continue;
                }

                for &(next, _) in graph.out_neighbors(current) {
                    if path.contains(&next) {
                        continue;
                    }
                    let mut extended = path.clone();
                    extended.push(next);
                    let hops = extended.len() - 1;

                    if hops >= self.config.min_hops {
                        if let Some(finding) = self.score_chain(graph, &extended) {
                            findings.push(finding);
                            if findings.len() >= self.config.max_chains {
                                truncated = true;
                                break 'origins;
                            }
                        }
                    }
                    if hops < self.config.max_depth {
                        queue.push_back(extended);
                    }
                }
            }
        }

        tracing::debug!(
            detector = self.id(),
            chains = findings.len(),
            truncated,
            "shell-chain detection finished"
        );

        Detection {
            findings,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muleflow_graph::builder::GraphBuilder;
    use muleflow_graph::types::Transaction;

    const HOUR: i64 = 3_600;

    fn graph_of(specs: &[(&str, &str, f64, i64)]) -> TxnGraph {
        let txs: Vec<Transaction> = specs
            .iter()
            .enumerate()
            .map(|(i, &(from, to, amount, t))| {
                Transaction::from_epoch(format!("T{i:03}"), from, to, amount, t)
            })
            .collect();
        GraphBuilder::new().build(&txs).unwrap()
    }

    fn detect(graph: &TxnGraph) -> Detection {
        ShellChainDetector::default().detect(graph)
    }

    fn chain_specs() -> Vec<(&'static str, &'static str, f64, i64)> {
        vec![
            ("A", "B", 50_000.0, 0),
            ("B", "C", 49_000.0, 2 * HOUR),
            ("C", "D", 48_000.0, 4 * HOUR),
            ("D", "E", 47_000.0, 6 * HOUR),
        ]
    }

    #[test]
    fn test_layered_chain_and_subchains() {
        let graph = graph_of(&chain_specs());
        let detection = detect(&graph);

        // Full chain from A plus its qualifying sub-chains from A and B.
        let paths: Vec<Vec<&str>> = detection
            .findings
            .iter()
            .map(|f| {
                f.accounts
                    .iter()
                    .map(|&i| graph.node(i).id.as_str())
                    .collect()
            })
            .collect();
        assert!(paths.contains(&vec!["A", "B", "C", "D", "E"]));
        assert!(paths.contains(&vec!["A", "B", "C", "D"]));
        assert!(paths.contains(&vec!["B", "C", "D", "E"]));
        assert_eq!(detection.findings.len(), 3);
        assert!(!detection.truncated);
    }

    #[test]
    fn test_full_chain_scoring() {
        let graph = graph_of(&chain_specs());
        let detection = detect(&graph);
        let full = detection
            .findings
            .iter()
            .find(|f| f.accounts.len() == 5)
            .unwrap();

        assert!((full.amount - 194_000.0).abs() < 1e-6);
        assert_eq!(full.span_secs, 6 * HOUR);
        // 0.4 / (1 + 6/24) + 0.3 * 1.0 + 0.3 * (4/6)
        let expected = 0.4 * 0.8 + 0.3 + 0.3 * (4.0 / 6.0);
        assert!((full.raw_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_busy_intermediate_blocks_chain() {
        // C is a hub with extra counterparties: total degree 5 > 3.
        let mut specs = chain_specs();
        specs.push(("X", "C", 100.0, HOUR));
        specs.push(("Y", "C", 100.0, HOUR));
        specs.push(("C", "Z", 100.0, HOUR));
        let graph = graph_of(&specs);
        let detection = detect(&graph);

        for finding in &detection.findings {
            let intermediates = &finding.accounts[1..finding.accounts.len() - 1];
            for &node in intermediates {
                assert!(graph.total_degree(node) <= 3, "busy node used as shell");
            }
        }
        // The A->B->C->D->E chain must be gone.
        assert!(detection
            .findings
            .iter()
            .all(|f| !f.accounts.contains(&graph.index_of("C").unwrap())
                || f.accounts.first() == Some(&graph.index_of("C").unwrap())
                || f.accounts.last() == Some(&graph.index_of("C").unwrap())));
    }

    #[test]
    fn test_short_paths_not_reported() {
        let graph = graph_of(&[
            ("A", "B", 10_000.0, 0),
            ("B", "C", 10_000.0, HOUR),
        ]);
        assert!(detect(&graph).findings.is_empty());
    }

    #[test]
    fn test_depth_bound_limits_hops() {
        // A nine-node corridor: no recorded chain exceeds six hops.
        let ids: Vec<String> = (0..9).map(|i| format!("N{i}")).collect();
        let specs: Vec<(&str, &str, f64, i64)> = ids
            .windows(2)
            .enumerate()
            .map(|(i, w)| (w[0].as_str(), w[1].as_str(), 1_000.0, i as i64 * HOUR))
            .collect();
        let detection = detect(&graph_of(&specs));
        assert!(!detection.findings.is_empty());
        assert!(detection
            .findings
            .iter()
            .all(|f| f.accounts.len() - 1 <= 6));
    }

    #[test]
    fn test_chain_cap_truncates() {
        let ids: Vec<String> = (0..9).map(|i| format!("N{i}")).collect();
        let specs: Vec<(&str, &str, f64, i64)> = ids
            .windows(2)
            .enumerate()
            .map(|(i, w)| (w[0].as_str(), w[1].as_str(), 1_000.0, i as i64 * HOUR))
            .collect();
        let detector = ShellChainDetector::new(ShellChainConfig {
            max_chains: 2,
            ..ShellChainConfig::default()
        });
        let detection = detector.detect(&graph_of(&specs));
        assert_eq!(detection.findings.len(), 2);
        assert!(detection.truncated);
    }

    #[test]
    fn test_metadata() {
        let detector = ShellChainDetector::default();
        assert_eq!(detector.id(), "detect/shell-chains");
        assert_eq!(detector.metadata().result_cap, Some(200));
    }
}
