//! Smurfing (structuring) detection.
//!
//! Two variants per account, each a two-pointer sliding window over the
//! timestamp-sorted event lists:
//! - fan-in: 10+ distinct senders into the account within 72 hours
//! - fan-out: the account into 10+ distinct receivers within 72 hours
//!
//! At most one finding per account per variant: the window maximising
//! the distinct counterparty count wins, ties resolve to the earliest
//! window start.

use crate::stats::coefficient_of_variation;
use crate::types::{Detection, Detector, Finding, PatternType};
use hashbrown::HashMap;
use muleflow_core::{config::SmurfingConfig, detector::StageMetadata, stage::Stage};
use muleflow_graph::types::{TxnEvent, TxnGraph};

/// Distinct-counterparty count at which the count factor saturates,
/// measured above the threshold.
const COUNT_SATURATION_SPAN: f64 = 20.0;

/// Best window found by the sliding scan.
#[derive(Debug, Clone, Copy)]
struct BestWindow {
    start: usize,
    end: usize,
    distinct: usize,
}

/// Fan-in / fan-out burst detector.
#[derive(Debug, Clone)]
pub struct SmurfingDetector {
    metadata: StageMetadata,
    config: SmurfingConfig,
}

impl Default for SmurfingDetector {
    fn default() -> Self {
        Self::new(SmurfingConfig::default())
    }
}

impl SmurfingDetector {
    /// Create a detector with the given configuration.
    #[must_use]
    pub fn new(config: SmurfingConfig) -> Self {
        Self {
            metadata: StageMetadata::new("detect/smurfing", Stage::PatternDetection)
                .with_description("Fan-in / fan-out burst detection over a sliding window"),
            config,
        }
    }

    /// Two-pointer scan over timestamp-sorted events.
    ///
    /// Returns the window with the most distinct counterparties; on ties
    /// the earliest window start wins (strict improvement required).
    fn best_window(events: &[TxnEvent], window_secs: i64) -> Option<BestWindow> {
        let n = events.len();
        let mut counts: HashMap<usize, usize> = HashMap::new();
        let mut best: Option<BestWindow> = None;
        let mut right = 0usize;

        for left in 0..n {
            while right < n && events[right].timestamp - events[left].timestamp <= window_secs {
                *counts.entry(events[right].counterparty).or_insert(0) += 1;
                right += 1;
            }

            let distinct = counts.len();
            if best.map_or(distinct > 0, |b| distinct > b.distinct) {
                best = Some(BestWindow {
                    start: left,
                    end: right,
                    distinct,
                });
            }

            if let Some(count) = counts.get_mut(&events[left].counterparty) {
                *count -= 1;
                if *count == 0 {
                    counts.remove(&events[left].counterparty);
                }
            }
        }

        best
    }

    /// Evaluate one variant for one account.
    fn variant_finding(
        &self,
        node: usize,
        events: &[TxnEvent],
        pattern: PatternType,
    ) -> Option<Finding> {
        if events.len() < self.config.min_counterparties {
            return None;
        }

        let window_secs = self.config.window_hours * 3_600;
        let best = Self::best_window(events, window_secs)?;
        if best.distinct < self.config.min_counterparties {
            return None;
        }

        let window = &events[best.start..best.end];
        let amounts: Vec<f64> = window.iter().map(|e| e.amount).collect();
        let total: f64 = amounts.iter().sum();
        let cv = coefficient_of_variation(&amounts).unwrap_or(1.0);
        let span_secs = window[window.len() - 1].timestamp - window[0].timestamp;

        let over_threshold = (best.distinct - self.config.min_counterparties) as f64;
        let count_factor = (over_threshold / COUNT_SATURATION_SPAN + 0.5).min(1.0);
        let raw_score = (0.5 * count_factor + 0.5 * (1.0 - cv.min(1.0))).clamp(0.0, 1.0);

        Some(Finding {
            pattern,
            accounts: vec![node],
            amount: total,
            span_secs,
            raw_score,
        })
    }
}

impl Detector for SmurfingDetector {
    fn metadata(&self) -> &StageMetadata {
        &self.metadata
    }

    fn detect(&self, graph: &TxnGraph) -> Detection {
        let mut findings = Vec::new();

        for node in 0..graph.node_count() {
            let account = graph.node(node);
            if let Some(finding) =
                self.variant_finding(node, &account.recv_tx, PatternType::SmurfingFanIn)
            {
                findings.push(finding);
            }
            if let Some(finding) =
                self.variant_finding(node, &account.sent_tx, PatternType::SmurfingFanOut)
            {
                findings.push(finding);
            }
        }

        tracing::debug!(
            detector = self.id(),
            findings = findings.len(),
            "smurfing detection finished"
        );

        Detection::complete(findings)
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

    fn fan_in_specs(senders: usize, spacing: i64) -> Vec<(String, String, f64, i64)> {
        (0..senders)
            .map(|i| {
                (
                    format!("S{i:02}"),
                    "R".to_string(),
                    1_000.0 + i as f64,
                    i as i64 * spacing,
                )
            })
            .collect()
    }

    fn detect(graph: &TxnGraph) -> Detection {
        SmurfingDetector::default().detect(graph)
    }

    #[test]
    fn test_fan_in_flags_receiver_only() {
        let specs = fan_in_specs(12, 4 * HOUR); // 12 senders inside 48 h
        let refs: Vec<(&str, &str, f64, i64)> = specs
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        let graph = graph_of(&refs);

        let detection = detect(&graph);
        assert_eq!(detection.findings.len(), 1);

        let finding = &detection.findings[0];
        assert_eq!(finding.pattern, PatternType::SmurfingFanIn);
        assert_eq!(finding.accounts, vec![graph.index_of("R").unwrap()]);
        // 12 distinct: count_factor = (12-10)/20 + 0.5 = 0.6; cv ~ 0.
        assert!(finding.raw_score > 0.75 && finding.raw_score < 0.85);
        assert!((finding.amount - (0..12).map(|i| 1_000.0 + i as f64).sum::<f64>()).abs() < 1e-6);
    }

    #[test]
    fn test_below_threshold_is_quiet() {
        let specs = fan_in_specs(9, HOUR);
        let refs: Vec<(&str, &str, f64, i64)> = specs
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        assert!(detect(&graph_of(&refs)).findings.is_empty());
    }

    #[test]
    fn test_spread_beyond_window_is_quiet() {
        // 12 senders, one every four days: no 72 h window holds ten.
        let specs = fan_in_specs(12, 96 * HOUR);
        let refs: Vec<(&str, &str, f64, i64)> = specs
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        assert!(detect(&graph_of(&refs)).findings.is_empty());
    }

    #[test]
    fn test_window_bound_is_inclusive() {
        // Ten senders with the first and last exactly 72 h apart.
        let specs: Vec<(String, String, f64, i64)> = (0..10)
            .map(|i| {
                (
                    format!("S{i:02}"),
                    "R".to_string(),
                    500.0,
                    i as i64 * 8 * HOUR,
                )
            })
            .collect();
        assert_eq!(specs[9].3 - specs[0].3, 72 * HOUR);
        let refs: Vec<(&str, &str, f64, i64)> = specs
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        let detection = detect(&graph_of(&refs));
        assert_eq!(detection.findings.len(), 1);
        assert_eq!(detection.findings[0].span_secs, 72 * HOUR);
    }

    #[test]
    fn test_fan_out_variant() {
        let specs: Vec<(String, String, f64, i64)> = (0..11)
            .map(|i| {
                (
                    "S".to_string(),
                    format!("R{i:02}"),
                    2_000.0,
                    i as i64 * HOUR,
                )
            })
            .collect();
        let refs: Vec<(&str, &str, f64, i64)> = specs
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        let graph = graph_of(&refs);
        let detection = detect(&graph);
        assert_eq!(detection.findings.len(), 1);
        assert_eq!(detection.findings[0].pattern, PatternType::SmurfingFanOut);
        assert_eq!(
            detection.findings[0].accounts,
            vec![graph.index_of("S").unwrap()]
        );
    }

    #[test]
    fn test_repeat_senders_do_not_inflate_distinct_count() {
        // Three senders hammering the account: distinct stays at three.
        let specs: Vec<(String, String, f64, i64)> = (0..30)
            .map(|i| {
                (
                    format!("S{:02}", i % 3),
                    "R".to_string(),
                    100.0,
                    i as i64 * 60,
                )
            })
            .collect();
        let refs: Vec<(&str, &str, f64, i64)> = specs
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        assert!(detect(&graph_of(&refs)).findings.is_empty());
    }

    #[test]
    fn test_similar_amounts_score_higher_than_dispersed() {
        let tight: Vec<(String, String, f64, i64)> = (0..10)
            .map(|i| (format!("S{i:02}"), "R".to_string(), 1_000.0, i as i64 * HOUR))
            .collect();
        let loose: Vec<(String, String, f64, i64)> = (0..10)
            .map(|i| {
                (
                    format!("S{i:02}"),
                    "R".to_string(),
                    500.0 + 900.0 * i as f64,
                    i as i64 * HOUR,
                )
            })
            .collect();
        let tight_refs: Vec<(&str, &str, f64, i64)> = tight
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        let tight_score = detect(&graph_of(&tight_refs)).findings[0].raw_score;

        let loose_refs: Vec<(&str, &str, f64, i64)> = loose
            .iter()
            .map(|(a, b, amt, t)| (a.as_str(), b.as_str(), *amt, *t))
            .collect();
        let loose_score = detect(&graph_of(&loose_refs)).findings[0].raw_score;

        assert!(tight_score > loose_score);
    }

    #[test]
    fn test_metadata() {
        let detector = SmurfingDetector::default();
        assert_eq!(detector.id(), "detect/smurfing");
        assert!(detector.metadata().result_cap.is_none());
    }
}
