//! Analysis configuration.
//!
//! All detector thresholds, caps, and scoring weights are tunable; the
//! defaults reproduce the contract values. Configuration can be loaded
//! from a TOML file or overridden through `MULEFLOW_*` environment
//! variables for the operational caps.
//!
//! # Example
//!
//! ```rust,ignore
//! use muleflow_core::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_env()?;
//! // or
//! let config = AnalysisConfig::from_file("config/analysis.toml")?;
//! config.validate()?;
//! ```

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cycle detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Maximum simple-cycle length enumerated (inclusive).
    pub length_bound: usize,
    /// Global cap on enumerated cycles.
    pub max_cycles: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            length_bound: 5,
            max_cycles: 500,
        }
    }
}

/// Smurfing detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmurfingConfig {
    /// Sliding window length in hours.
    pub window_hours: i64,
    /// Minimum distinct counterparties inside one window.
    pub min_counterparties: usize,
}

impl Default for SmurfingConfig {
    fn default() -> Self {
        Self {
            window_hours: 72,
            min_counterparties: 10,
        }
    }
}

/// Shell-chain detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellChainConfig {
    /// Maximum path depth in hops.
    pub max_depth: usize,
    /// Minimum path length in hops for a chain to be reported.
    pub min_hops: usize,
    /// Maximum total degree (in + out) for intermediate nodes.
    pub intermediate_degree_max: usize,
    /// Global cap on enumerated chains.
    pub max_chains: usize,
}

impl Default for ShellChainConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_hops: 3,
            intermediate_degree_max: 3,
            max_chains: 200,
        }
    }
}

/// False-positive classifier thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FalsePositiveConfig {
    /// Minimum receipts from one counterparty for the salary test.
    pub salary_min_payments: usize,
    /// Maximum coefficient of variation for salary amounts.
    pub salary_max_cv: f64,
    /// Fraction of gaps that must fall in the monthly band.
    pub salary_monthly_ratio: f64,
    /// Lower bound of the monthly gap band, in days.
    pub salary_gap_min_days: f64,
    /// Upper bound of the monthly gap band, in days.
    pub salary_gap_max_days: f64,
    /// Minimum in-degree for the merchant test.
    pub merchant_min_in_degree: usize,
    /// Entropy ceiling (bits) for the merchant amount distribution.
    pub merchant_entropy_bits: f64,
    /// Minimum out-degree for the payroll-hub test.
    pub payroll_min_out_degree: usize,
    /// Maximum coefficient of variation for payroll amounts.
    pub payroll_max_cv: f64,
}

impl Default for FalsePositiveConfig {
    fn default() -> Self {
        Self {
            salary_min_payments: 3,
            salary_max_cv: 0.05,
            salary_monthly_ratio: 0.7,
            salary_gap_min_days: 25.0,
            salary_gap_max_days: 35.0,
            merchant_min_in_degree: 50,
            merchant_entropy_bits: 2.5,
            payroll_min_out_degree: 20,
            payroll_max_cv: 0.15,
        }
    }
}

/// Weights of the composite suspicion score.
///
/// Each weight multiplies a per-family signal in `[0, 1]`; the composite
/// is capped at 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorWeights {
    /// Cycle participation weight.
    pub cycle: f64,
    /// Smurfing (fan-in/fan-out) weight.
    pub smurfing: f64,
    /// Shell layering weight.
    pub shell: f64,
    /// Velocity abnormality weight.
    pub velocity: f64,
}

impl Default for DetectorWeights {
    fn default() -> Self {
        Self {
            cycle: 40.0,
            smurfing: 30.0,
            shell: 20.0,
            velocity: 10.0,
        }
    }
}

/// Scoring and ring-assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Composite score weights.
    pub weights: DetectorWeights,
    /// Accounts below this score are omitted from the report.
    pub report_min_score: u32,
    /// Jaccard overlap above which two rings are merged.
    pub ring_merge_jaccard: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: DetectorWeights::default(),
            report_min_score: 10,
            ring_merge_jaccard: 0.5,
        }
    }
}

/// Visualisation graph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizConfig {
    /// Node budget of the reduced graph.
    pub max_nodes: usize,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self { max_nodes: 300 }
    }
}

/// Unified analysis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cycle detector configuration.
    pub cycle: CycleConfig,
    /// Smurfing detector configuration.
    pub smurfing: SmurfingConfig,
    /// Shell-chain detector configuration.
    pub shell: ShellChainConfig,
    /// False-positive classifier thresholds.
    pub false_positive: FalsePositiveConfig,
    /// Scoring and ring assembly.
    pub scoring: ScoringConfig,
    /// Visualisation graph budget.
    pub viz: VizConfig,
}

impl AnalysisConfig {
    /// Load configuration from the environment.
    ///
    /// Starts from defaults and applies `MULEFLOW_*` overrides for the
    /// operational caps.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MULEFLOW_MAX_CYCLES") {
            config.cycle.max_cycles = val
                .parse()
                .map_err(|_| AnalysisError::config(format!("bad MULEFLOW_MAX_CYCLES: {val}")))?;
        }
        if let Ok(val) = std::env::var("MULEFLOW_MAX_CHAINS") {
            config.shell.max_chains = val
                .parse()
                .map_err(|_| AnalysisError::config(format!("bad MULEFLOW_MAX_CHAINS: {val}")))?;
        }
        if let Ok(val) = std::env::var("MULEFLOW_REPORT_MIN_SCORE") {
            config.scoring.report_min_score = val.parse().map_err(|_| {
                AnalysisError::config(format!("bad MULEFLOW_REPORT_MIN_SCORE: {val}"))
            })?;
        }
        if let Ok(val) = std::env::var("MULEFLOW_VIZ_MAX_NODES") {
            config.viz.max_nodes = val
                .parse()
                .map_err(|_| AnalysisError::config(format!("bad MULEFLOW_VIZ_MAX_NODES: {val}")))?;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AnalysisError::config(format!("failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AnalysisError::config(format!("failed to parse config: {e}")))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AnalysisError::config(format!("failed to serialize config: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.cycle.length_bound < 3 {
            return Err(AnalysisError::config(
                "cycle.length_bound must be at least 3",
            ));
        }
        if self.cycle.max_cycles == 0 {
            return Err(AnalysisError::config("cycle.max_cycles must be positive"));
        }
        if self.smurfing.window_hours <= 0 {
            return Err(AnalysisError::config(
                "smurfing.window_hours must be positive",
            ));
        }
        if self.smurfing.min_counterparties < 2 {
            return Err(AnalysisError::config(
                "smurfing.min_counterparties must be at least 2",
            ));
        }
        if self.shell.min_hops == 0 {
            return Err(AnalysisError::config("shell.min_hops must be positive"));
        }
        if self.shell.max_depth < self.shell.min_hops {
            return Err(AnalysisError::config(
                "shell.max_depth must be at least shell.min_hops",
            ));
        }
        if self.shell.max_chains == 0 {
            return Err(AnalysisError::config("shell.max_chains must be positive"));
        }
        if !(self.scoring.ring_merge_jaccard > 0.0 && self.scoring.ring_merge_jaccard <= 1.0) {
            return Err(AnalysisError::config(
                "scoring.ring_merge_jaccard must be in (0, 1]",
            ));
        }
        let w = &self.scoring.weights;
        if w.cycle < 0.0 || w.smurfing < 0.0 || w.shell < 0.0 || w.velocity < 0.0 {
            return Err(AnalysisError::config("weights must be non-negative"));
        }
        if w.cycle + w.smurfing + w.shell + w.velocity <= 0.0 {
            return Err(AnalysisError::config("at least one weight must be positive"));
        }
        if self.scoring.report_min_score > 100 {
            return Err(AnalysisError::config(
                "scoring.report_min_score must not exceed 100",
            ));
        }
        if self.viz.max_nodes == 0 {
            return Err(AnalysisError::config("viz.max_nodes must be positive"));
        }
        Ok(())
    }

    /// Replace the cycle configuration.
    #[must_use]
    pub fn with_cycle(mut self, cycle: CycleConfig) -> Self {
        self.cycle = cycle;
        self
    }

    /// Replace the smurfing configuration.
    #[must_use]
    pub fn with_smurfing(mut self, smurfing: SmurfingConfig) -> Self {
        self.smurfing = smurfing;
        self
    }

    /// Replace the shell-chain configuration.
    #[must_use]
    pub fn with_shell(mut self, shell: ShellChainConfig) -> Self {
        self.shell = shell;
        self
    }

    /// Replace the false-positive thresholds.
    #[must_use]
    pub fn with_false_positive(mut self, fp: FalsePositiveConfig) -> Self {
        self.false_positive = fp;
        self
    }

    /// Replace the scoring configuration.
    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replace the visualisation configuration.
    #[must_use]
    pub fn with_viz(mut self, viz: VizConfig) -> Self {
        self.viz = viz;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contract() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cycle.length_bound, 5);
        assert_eq!(config.cycle.max_cycles, 500);
        assert_eq!(config.smurfing.window_hours, 72);
        assert_eq!(config.smurfing.min_counterparties, 10);
        assert_eq!(config.shell.max_depth, 6);
        assert_eq!(config.shell.min_hops, 3);
        assert_eq!(config.shell.intermediate_degree_max, 3);
        assert_eq!(config.shell.max_chains, 200);
        assert_eq!(config.scoring.report_min_score, 10);
        assert!((config.scoring.ring_merge_jaccard - 0.5).abs() < 1e-12);
        assert_eq!(config.viz.max_nodes, 300);
    }

    #[test]
    fn test_default_validates() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.cycle.length_bound = 2;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.scoring.ring_merge_jaccard = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.shell.max_depth = 1;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.scoring.weights.cycle = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AnalysisConfig::default();
        let toml = config.to_toml().unwrap();
        let back: AnalysisConfig = toml::from_str(&toml).unwrap();
        assert_eq!(back.cycle.max_cycles, config.cycle.max_cycles);
        assert_eq!(back.viz.max_nodes, config.viz.max_nodes);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AnalysisConfig = toml::from_str(
            r#"
            [cycle]
            length_bound = 4
            max_cycles = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.cycle.length_bound, 4);
        assert_eq!(config.cycle.max_cycles, 50);
        assert_eq!(config.smurfing.window_hours, 72);
    }

    #[test]
    fn test_with_methods() {
        let config = AnalysisConfig::default()
            .with_cycle(CycleConfig {
                length_bound: 4,
                max_cycles: 100,
            })
            .with_viz(VizConfig { max_nodes: 50 });
        assert_eq!(config.cycle.length_bound, 4);
        assert_eq!(config.viz.max_nodes, 50);
    }
}
