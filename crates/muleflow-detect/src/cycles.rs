//! Simple directed cycle detection.
//!
//! Enumerates simple cycles of length 3 to `length_bound` with a bounded
//! Johnson-style search: every cycle is discovered exactly once, rooted
//! at its smallest node index, with the search restricted to indices
//! at or above the root and neighbors visited in ascending order. The
//! search uses an explicit stack; the length bound prunes inside the
//! search, not as a post-filter.

use crate::types::{Detection, Detector, Finding, PatternType};
use muleflow_core::{config::CycleConfig, detector::StageMetadata, stage::Stage};
use muleflow_graph::types::TxnGraph;

/// Amount at which the cycle amount factor saturates.
const AMOUNT_SATURATION: f64 = 50_000.0;

/// Minimum reported cycle length. Reciprocal 2-cycles are excluded.
const MIN_CYCLE_LEN: usize = 3;

/// Simple directed cycle detector.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    metadata: StageMetadata,
    config: CycleConfig,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(CycleConfig::default())
    }
}

impl CycleDetector {
    /// Create a detector with the given configuration.
    #[must_use]
    pub fn new(config: CycleConfig) -> Self {
        Self {
            metadata: StageMetadata::new("detect/cycles", Stage::PatternDetection)
                .with_description("Simple directed cycle enumeration (length 3-5)")
                .with_result_cap(config.max_cycles),
            config,
        }
    }

    /// Enumerate simple cycles up to the configured bound and cap.
    ///
    /// Returns the cycles (as node-index lists starting at the smallest
    /// member) and whether the cap was hit.
    fn enumerate(&self, graph: &TxnGraph) -> (Vec<Vec<usize>>, bool) {
        let n = graph.node_count();
        let max_len = self.config.length_bound;
        let mut cycles: Vec<Vec<usize>> = Vec::new();
        let mut truncated = false;
        let mut on_path = vec![false; n];

        'roots: for root in 0..n {
            let mut path: Vec<usize> = vec![root];
            let mut cursors: Vec<usize> = vec![0];
            on_path[root] = true;

            while let Some(&cursor) = cursors.last() {
                let current = *path.last().expect("path tracks cursors");
                let neighbors = graph.out_neighbors(current);

                if cursor < neighbors.len() {
                    *cursors.last_mut().expect("checked non-empty") += 1;
                    let (next, _) = neighbors[cursor];

                    if next == root {
                        if path.len() >= MIN_CYCLE_LEN {
                            cycles.push(path.clone());
                            if cycles.len() >= self.config.max_cycles {
                                truncated = true;
                                for &v in &path {
                                    on_path[v] = false;
                                }
                                break 'roots;
                            }
                        }
                    } else if next > root && !on_path[next] && path.len() < max_len {
                        path.push(next);
                        cursors.push(0);
                        on_path[next] = true;
                    }
                } else {
                    cursors.pop();
                    let done = path.pop().expect("path tracks cursors");
                    on_path[done] = false;
                }
            }
        }

        (cycles, truncated)
    }

    /// Score one cycle. Returns `None` for cycles that must be discarded
    /// (a zero-total edge along the way).
    fn score_cycle(&self, graph: &TxnGraph, cycle: &[usize]) -> Option<Finding> {
        let k = cycle.len();

        // Anchor: the first edge's earliest timestamp. Each cycle edge
        // contributes its timestamp closest to the anchor.
        let anchor = graph
            .edge_between(cycle[0], cycle[1])?
            .first_timestamp();

        let mut total = 0.0;
        let mut span_min = i64::MAX;
        let mut span_max = i64::MIN;
        for i in 0..k {
            let edge = graph.edge_between(cycle[i], cycle[(i + 1) % k])?;
            if edge.total_amount <= 0.0 {
                return None;
            }
            total += edge.total_amount;
            let ts = edge.closest_timestamp(anchor);
            span_min = span_min.min(ts);
            span_max = span_max.max(ts);
        }

        let span_secs = span_max - span_min;
        let span_hours = span_secs as f64 / 3_600.0;
        let length_factor = (6.0 - k as f64) / 3.0;
        let amount_factor = (total / AMOUNT_SATURATION).min(1.0);
        let compactness = 1.0 / (1.0 + span_hours / 24.0);
        let raw_score =
            (0.4 * length_factor + 0.3 * amount_factor + 0.3 * compactness).clamp(0.0, 1.0);

        Some(Finding {
            pattern: PatternType::Cycle,
            accounts: cycle.to_vec(),
            amount: total,
            span_secs,
            raw_score,
        })
    }
}

impl Detector for CycleDetector {
    fn metadata(&self) -> &StageMetadata {
        &self.metadata
    }

    fn detect(&self, graph: &TxnGraph) -> Detection {
        let (cycles, truncated) = self.enumerate(graph);
        let findings: Vec<Finding> = cycles
            .iter()
            .filter_map(|cycle| self.score_cycle(graph, cycle))
            .collect();

        tracing::debug!(
            detector = self.id(),
            cycles = findings.len(),
            truncated,
            "cycle detection finished"
        );

        Detection {
            findings,
            truncated,
        }
    }
}
