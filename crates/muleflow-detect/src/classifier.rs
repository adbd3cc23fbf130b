//! False-positive control.
//!
//! Tags accounts whose behaviour matches benign patterns. Tags act as
//! veto flags at scoring time: a tagged account never enters the
//! suspicious output, whatever the detectors said.
//!
//! Three patterns:
//! - salary recipient: consistent amounts on a monthly cadence from one
//!   counterparty
//! - merchant: high in-degree with a low-entropy price distribution
//! - payroll hub: high out-degree with consistent amounts

use crate::stats::{binned_entropy_bits, coefficient_of_variation};
use hashbrown::HashMap;
use muleflow_core::{config::FalsePositiveConfig, detector::StageMetadata, stage::Stage};
use muleflow_graph::types::{AccountNode, TxnGraph};

const DAY_SECS: f64 = 86_400.0;

/// Benign-pattern tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FpTag {
    /// Regular fixed-amount monthly income from one counterparty.
    SalaryRecipient,
    /// Many payers, standardized pricing.
    Merchant,
    /// One account paying many recipients consistent amounts.
    PayrollHub,
}

impl FpTag {
    /// Wire name of the tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FpTag::SalaryRecipient => "salary_recipient",
            FpTag::Merchant => "merchant",
            FpTag::PayrollHub => "payroll_hub",
        }
    }
}

impl std::fmt::Display for FpTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Benign-pattern classifier.
#[derive(Debug, Clone)]
pub struct FalsePositiveClassifier {
    metadata: StageMetadata,
    config: FalsePositiveConfig,
}

impl Default for FalsePositiveClassifier {
    fn default() -> Self {
        Self::new(FalsePositiveConfig::default())
    }
}

impl FalsePositiveClassifier {
    /// Create a classifier with the given thresholds.
    #[must_use]
    pub fn new(config: FalsePositiveConfig) -> Self {
        Self {
            metadata: StageMetadata::new("classify/false-positives", Stage::FalsePositiveControl)
                .with_description("Benign-pattern tagging (salary, merchant, payroll hub)"),
            config,
        }
    }

    /// Component metadata.
    #[must_use]
    pub fn metadata(&self) -> &StageMetadata {
        &self.metadata
    }

    /// Compute tags for every account, indexed by node.
    ///
    /// All three tests run independently; a node can carry several tags.
    #[must_use]
    pub fn classify(&self, graph: &TxnGraph) -> Vec<Vec<FpTag>> {
        let mut tags: Vec<Vec<FpTag>> = vec![Vec::new(); graph.node_count()];

        for (node, slot) in tags.iter_mut().enumerate() {
            let account = graph.node(node);
            if self.is_salary_recipient(account) {
                slot.push(FpTag::SalaryRecipient);
            }
            if self.is_merchant(graph, node, account) {
                slot.push(FpTag::Merchant);
            }
            if self.is_payroll_hub(graph, node, account) {
                slot.push(FpTag::PayrollHub);
            }
        }

        let tagged = tags.iter().filter(|t| !t.is_empty()).count();
        tracing::debug!(
            classifier = self.metadata.id.as_str(),
            tagged,
            "false-positive classification finished"
        );

        tags
    }

    /// Salary test, evaluated per counterparty stream: a salaried account
    /// keeps its tag even when unrelated traffic floods the pooled
    /// receipt list.
    fn is_salary_recipient(&self, account: &AccountNode) -> bool {
        if account.recv_tx.len() < self.config.salary_min_payments {
            return false;
        }

        let mut streams: HashMap<usize, (Vec<f64>, Vec<i64>)> = HashMap::new();
        for event in &account.recv_tx {
            let stream = streams.entry(event.counterparty).or_default();
            stream.0.push(event.amount);
            stream.1.push(event.timestamp);
        }

        streams.values().any(|(amounts, timestamps)| {
            if amounts.len() < self.config.salary_min_payments {
                return false;
            }
            match coefficient_of_variation(amounts) {
                Some(cv) if cv <= self.config.salary_max_cv => {}
                _ => return false,
            }

            // recv_tx is globally timestamp-sorted, so each stream is too.
            let monthly = timestamps
                .windows(2)
                .filter(|w| {
                    let days = (w[1] - w[0]) as f64 / DAY_SECS;
                    days >= self.config.salary_gap_min_days
                        && days <= self.config.salary_gap_max_days
                })
                .count();
            let gaps = timestamps.len() - 1;
            gaps > 0 && monthly as f64 >= self.config.salary_monthly_ratio * gaps as f64
        })
    }

    fn is_merchant(&self, graph: &TxnGraph, node: usize, account: &AccountNode) -> bool {
        if graph.in_degree(node) < self.config.merchant_min_in_degree {
            return false;
        }
        let amounts: Vec<f64> = account.recv_tx.iter().map(|e| e.amount).collect();
        !amounts.is_empty() && binned_entropy_bits(&amounts) < self.config.merchant_entropy_bits
    }

    fn is_payroll_hub(&self, graph: &TxnGraph, node: usize, account: &AccountNode) -> bool {
        if graph.out_degree(node) < self.config.payroll_min_out_degree {
            return false;
        }
        let amounts: Vec<f64> = account.sent_tx.iter().map(|e| e.amount).collect();
        matches!(
            coefficient_of_variation(&amounts),
            Some(cv) if cv < self.config.payroll_max_cv
        )
    }
}
