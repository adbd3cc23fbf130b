//! Composite suspicion scoring.
//!
//! Fuses detector findings, the false-positive veto, and a velocity
//! signal computed directly from the graph into per-account scores, then
//! assembles the final report. Findings must arrive in canonical sorted
//! order (`sort_findings`); the result is then independent of detector
//! execution order.

use crate::rings;
use crate::types::{AnalysisReport, AnalysisSummary, SuspiciousAccount};
use crate::viz;
use hashbrown::{HashMap, HashSet};
use muleflow_core::{
    config::{ScoringConfig, VizConfig},
    detector::StageMetadata,
    stage::Stage,
};
use muleflow_detect::classifier::FpTag;
use muleflow_detect::types::{Finding, ScoreFamily};
use muleflow_graph::types::{AccountNode, TxnGraph};

/// Findings below this raw score do not contribute pattern tags.
const PATTERN_SCORE_FLOOR: f64 = 0.1;

/// Mean-gap thresholds (seconds) for the velocity tiers.
const VELOCITY_MINUTE: f64 = 60.0;
const VELOCITY_HOUR: f64 = 3_600.0;
const VELOCITY_DAY: f64 = 86_400.0;

/// Composite scorer and report assembler.
#[derive(Debug, Clone)]
pub struct Scorer {
    metadata: StageMetadata,
    config: ScoringConfig,
    viz: VizConfig,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default(), VizConfig::default())
    }
}

impl Scorer {
    /// Create a scorer with the given configuration.
    #[must_use]
    pub fn new(config: ScoringConfig, viz: VizConfig) -> Self {
        Self {
            metadata: StageMetadata::new("score/composite", Stage::Scoring)
                .with_description("Weighted composite scoring and ring assembly"),
            config,
            viz,
        }
    }

    /// Component metadata.
    #[must_use]
    pub fn metadata(&self) -> &StageMetadata {
        &self.metadata
    }

    /// Velocity abnormality from the merged per-account event stream.
    ///
    /// The mean gap between consecutive participating transactions maps
    /// onto fixed tiers; accounts with fewer than two events score zero.
    #[must_use]
    pub fn velocity(account: &AccountNode) -> f64 {
        let mut timestamps: Vec<i64> = account
            .sent_tx
            .iter()
            .chain(account.recv_tx.iter())
            .map(|e| e.timestamp)
            .collect();
        if timestamps.len() < 2 {
            return 0.0;
        }
        timestamps.sort_unstable();

        let span = (timestamps[timestamps.len() - 1] - timestamps[0]) as f64;
        let mean_gap = span / (timestamps.len() - 1) as f64;

        if mean_gap < VELOCITY_MINUTE {
            1.0
        } else if mean_gap < VELOCITY_HOUR {
            0.7
        } else if mean_gap < VELOCITY_DAY {
            0.3
        } else {
            0.0
        }
    }

    /// Score all accounts and assemble the report.
    ///
    /// `processing_time_seconds` is left at zero; the pipeline stamps it.
    #[must_use]
    pub fn score(
        &self,
        graph: &TxnGraph,
        findings: &[Finding],
        fp_tags: &[Vec<FpTag>],
        warnings: Vec<String>,
    ) -> AnalysisReport {
        let n = graph.node_count();

        // Per-account family maxima and contributing pattern names.
        // The max (not the sum) prevents repeat-counting overlapping
        // findings of one family.
        let mut family = vec![[0.0f64; 3]; n];
        let mut patterns: Vec<Vec<String>> = vec![Vec::new(); n];
        for finding in findings {
            let fam = match finding.pattern.family() {
                ScoreFamily::Cycle => 0,
                ScoreFamily::Smurfing => 1,
                ScoreFamily::Shell => 2,
            };
            for &node in &finding.accounts {
                if finding.raw_score > family[node][fam] {
                    family[node][fam] = finding.raw_score;
                }
                if finding.raw_score > PATTERN_SCORE_FLOOR {
                    let name = finding.pattern.as_str();
                    if !patterns[node].iter().any(|p| p == name) {
                        patterns[node].push(name.to_string());
                    }
                }
            }
        }

        let weights = &self.config.weights;
        let mut scores: HashMap<usize, u32> = HashMap::new();
        let mut vetoed = 0usize;
        for node in 0..n {
            let composite = family[node][0].min(1.0) * weights.cycle
                + family[node][1].min(1.0) * weights.smurfing
                + family[node][2].min(1.0) * weights.shell
                + Self::velocity(graph.node(node)) * weights.velocity;
            let final_score = composite.min(100.0).round() as u32;
            if final_score < self.config.report_min_score {
                continue;
            }
            if !fp_tags[node].is_empty() {
                vetoed += 1;
                continue;
            }
            scores.insert(node, final_score);
        }

        let reported: HashSet<usize> = scores.keys().copied().collect();
        let (fraud_rings, ring_map) = rings::assemble(
            graph,
            findings,
            &reported,
            self.config.ring_merge_jaccard,
        );

        let mut suspicious: Vec<SuspiciousAccount> = scores
            .iter()
            .map(|(&node, &score)| SuspiciousAccount {
                account_id: graph.node(node).id.clone(),
                suspicion_score: score,
                detected_patterns: patterns[node].clone(),
                ring_id: ring_map.get(&node).cloned(),
            })
            .collect();
        suspicious.sort_by(|a, b| {
            b.suspicion_score
                .cmp(&a.suspicion_score)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        let graph_data = viz::build(graph, &scores, self.viz.max_nodes);

        tracing::info!(
            scorer = self.metadata.id.as_str(),
            flagged = suspicious.len(),
            rings = fraud_rings.len(),
            vetoed,
            "scoring finished"
        );

        let summary = AnalysisSummary {
            total_accounts_analyzed: n,
            suspicious_accounts_flagged: suspicious.len(),
            fraud_rings_detected: fraud_rings.len(),
            processing_time_seconds: 0.0,
            warnings,
        };

        AnalysisReport {
            suspicious_accounts: suspicious,
            fraud_rings,
            summary,
            graph_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muleflow_detect::types::PatternType;
    use muleflow_graph::builder::GraphBuilder;
    use muleflow_graph::types::Transaction;

    fn line_graph(n: usize, step_secs: i64) -> TxnGraph {
        let txs: Vec<Transaction> = (0..n - 1)
            .map(|i| {
                Transaction::from_epoch(
                    format!("T{i}"),
                    format!("N{i}"),
                    format!("N{}", i + 1),
                    1_000.0,
                    i as i64 * step_secs,
                )
            })
            .collect();
        GraphBuilder::new().build(&txs).unwrap()
    }

    fn finding(pattern: PatternType, accounts: Vec<usize>, raw: f64) -> Finding {
        Finding {
            pattern,
            accounts,
            amount: 0.0,
            span_secs: 0,
            raw_score: raw,
        }
    }

    fn no_tags(graph: &TxnGraph) -> Vec<Vec<FpTag>> {
        vec![Vec::new(); graph.node_count()]
    }

    #[test]
    fn test_family_uses_max_not_sum() {
        // Slow graph so velocity contributes nothing.
        let graph = line_graph(4, 10 * 86_400);
        let findings = vec![
            finding(PatternType::Cycle, vec![0, 1, 2], 0.8),
            finding(PatternType::Cycle, vec![0, 1, 2], 0.6),
        ];
        let report = Scorer::default().score(&graph, &findings, &no_tags(&graph), vec![]);

        let n0 = report
            .suspicious_accounts
            .iter()
            .find(|a| a.account_id == "N0")
            .unwrap();
        // max(0.8, 0.6) * 40 = 32, not 56.
        assert_eq!(n0.suspicion_score, 32);
    }

    #[test]
    fn test_veto_removes_tagged_accounts() {
        let graph = line_graph(4, 10 * 86_400);
        let findings = vec![finding(PatternType::Cycle, vec![0, 1, 2], 0.9)];
        let mut tags = no_tags(&graph);
        tags[1].push(FpTag::SalaryRecipient);

        let report = Scorer::default().score(&graph, &findings, &tags, vec![]);
        let flagged: Vec<&str> = report
            .suspicious_accounts
            .iter()
            .map(|a| a.account_id.as_str())
            .collect();
        assert!(flagged.contains(&"N0"));
        assert!(!flagged.contains(&"N1"), "vetoed account must not appear");
        assert!(flagged.contains(&"N2"));
    }

    #[test]
    fn test_below_threshold_is_dropped() {
        let graph = line_graph(4, 10 * 86_400);
        // 0.2 * 40 = 8 < 10.
        let findings = vec![finding(PatternType::Cycle, vec![0, 1, 2], 0.2)];
        let report = Scorer::default().score(&graph, &findings, &no_tags(&graph), vec![]);
        assert!(report.suspicious_accounts.is_empty());
        assert!(report.fraud_rings.is_empty());
    }

    #[test]
    fn test_velocity_tiers() {
        // Gaps of 30 s / 30 min / 3 h / 3 days between two events.
        for (step, expected) in [
            (30, 1.0),
            (1_800, 0.7),
            (3 * 3_600, 0.3),
            (3 * 86_400, 0.0),
        ] {
            let graph = line_graph(3, step);
            let n1 = graph.index_of("N1").unwrap();
            assert_eq!(Scorer::velocity(graph.node(n1)), expected, "step {step}");
        }
    }

    #[test]
    fn test_single_event_has_zero_velocity() {
        let graph = line_graph(3, 60);
        let n0 = graph.index_of("N0").unwrap();
        assert_eq!(Scorer::velocity(graph.node(n0)), 0.0);
    }

    #[test]
    fn test_weak_findings_add_no_pattern_tags() {
        let graph = line_graph(4, 30);
        // Raw score at the floor: scores but does not tag. Velocity
        // (30 s gaps -> 1.0 -> 10 points) carries N1 over the threshold.
        let findings = vec![finding(PatternType::Cycle, vec![1], 0.1)];
        let report = Scorer::default().score(&graph, &findings, &no_tags(&graph), vec![]);
        let n1 = report
            .suspicious_accounts
            .iter()
            .find(|a| a.account_id == "N1")
            .unwrap();
        assert!(n1.detected_patterns.is_empty());
        assert_eq!(n1.suspicion_score, 14); // 0.1*40 + 1.0*10
    }

    #[test]
    fn test_output_sorted_by_score_then_id() {
        let graph = line_graph(5, 10 * 86_400);
        let findings = vec![
            finding(PatternType::Cycle, vec![0, 1, 2], 0.9),
            finding(PatternType::ShellChain, vec![0, 1, 2, 3], 0.9),
        ];
        let report = Scorer::default().score(&graph, &findings, &no_tags(&graph), vec![]);

        let scores: Vec<u32> = report
            .suspicious_accounts
            .iter()
            .map(|a| a.suspicion_score)
            .collect();
        let mut sorted = scores.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted);

        // Equal-score neighbours appear in id order.
        for pair in report.suspicious_accounts.windows(2) {
            if pair[0].suspicion_score == pair[1].suspicion_score {
                assert!(pair[0].account_id < pair[1].account_id);
            }
        }
    }

    #[test]
    fn test_warnings_pass_through() {
        let graph = line_graph(3, 60);
        let report = Scorer::default().score(
            &graph,
            &[],
            &no_tags(&graph),
            vec!["detect/cycles: result cap reached (500)".to_string()],
        );
        assert_eq!(report.summary.warnings.len(), 1);
    }

    #[test]
    fn test_ring_members_match_suspicious_output() {
        let graph = line_graph(4, 10 * 86_400);
        let findings = vec![finding(PatternType::Cycle, vec![0, 1, 2], 0.9)];
        let mut tags = no_tags(&graph);
        tags[2].push(FpTag::Merchant); // veto one ring member

        let report = Scorer::default().score(&graph, &findings, &tags, vec![]);
        assert_eq!(report.fraud_rings.len(), 1);
        let ring = &report.fraud_rings[0];
        assert_eq!(ring.member_accounts, vec!["N0", "N1"]);

        for member in &ring.member_accounts {
            let account = report
                .suspicious_accounts
                .iter()
                .find(|a| &a.account_id == member)
                .expect("ring member missing from suspicious output");
            assert_eq!(account.ring_id.as_ref(), Some(&ring.ring_id));
        }
    }
}
