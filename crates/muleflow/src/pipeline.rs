//! The analysis pipeline.
//!
//! Single-invocation, batch, in-memory: build the graph, tag benign
//! accounts, run the detectors over the shared immutable graph, sort the
//! findings into canonical order, score. Detector saturation surfaces as
//! summary warnings, never as an error. Either a complete report is
//! returned or a single structured error; there are no partial results
//! and no retries.

use muleflow_core::{config::AnalysisConfig, error::Result};
use muleflow_detect::prelude::{
    sort_findings, CycleDetector, Detector, FalsePositiveClassifier, ShellChainDetector,
    SmurfingDetector,
};
use muleflow_graph::builder::GraphBuilder;
use muleflow_graph::types::Transaction;
use muleflow_score::scoring::Scorer;
use muleflow_score::types::AnalysisReport;
use std::time::Instant;

/// The full detection pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AnalysisPipeline {
    /// Create a pipeline with the given configuration.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The pipeline configuration.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run one analysis over a transaction batch.
    pub fn run(&self, transactions: &[Transaction]) -> Result<AnalysisReport> {
        let started = Instant::now();
        self.config.validate()?;

        let graph = GraphBuilder::new().build(transactions)?;
        graph.validate()?;
        let graph_summary = graph.summary();
        tracing::debug!(
            accounts = graph_summary.total_accounts,
            edges = graph_summary.total_edges,
            transactions = graph_summary.total_transactions,
            discarded = graph_summary.discarded_transactions,
            "graph ready"
        );

        let fp_tags =
            FalsePositiveClassifier::new(self.config.false_positive.clone()).classify(&graph);

        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(CycleDetector::new(self.config.cycle.clone())),
            Box::new(SmurfingDetector::new(self.config.smurfing.clone())),
            Box::new(ShellChainDetector::new(self.config.shell.clone())),
        ];

        let mut findings = Vec::new();
        let mut warnings = Vec::new();
        for detector in &detectors {
            let detection = detector.detect(&graph);
            if detection.truncated {
                let cap = detector.metadata().result_cap.unwrap_or(0);
                warnings.push(format!("{}: result cap reached ({cap})", detector.id()));
            }
            findings.extend(detection.findings);
        }
        // Canonical order: the report must not depend on detector
        // execution order.
        sort_findings(&mut findings);

        let scorer = Scorer::new(self.config.scoring.clone(), self.config.viz.clone());
        let mut report = scorer.score(&graph, &findings, &fp_tags, warnings);

        let elapsed = started.elapsed().as_secs_f64();
        report.summary.processing_time_seconds = (elapsed * 1_000.0).round() / 1_000.0;

        tracing::info!(
            accounts = report.summary.total_accounts_analyzed,
            flagged = report.summary.suspicious_accounts_flagged,
            rings = report.summary.fraud_rings_detected,
            seconds = report.summary.processing_time_seconds,
            "analysis finished"
        );

        Ok(report)
    }
}

/// Run one analysis with the given configuration.
pub fn analyze(transactions: &[Transaction], config: &AnalysisConfig) -> Result<AnalysisReport> {
    AnalysisPipeline::new(config.clone()).run(transactions)
}
