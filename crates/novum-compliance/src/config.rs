//! Compliance configuration.
//!
//! Every threshold the rules depend on lives here so deployments can
//! override it from the YAML config file.

use novum_core::expiry::{Urgency, UrgencyThresholds};
use novum_core::scoring::ScoringRules;
use serde::{Deserialize, Serialize};

/// Days an open task may sit untouched, per urgency, before it is
/// escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationSlas {
    pub critical_days: i64,
    pub high_days: i64,
    pub medium_days: i64,
    pub low_days: i64,
}

impl Default for EscalationSlas {
    fn default() -> Self {
        Self {
            critical_days: 3,
            high_days: 5,
            medium_days: 7,
            low_days: 14,
        }
    }
}

impl EscalationSlas {
    pub fn for_urgency(&self, urgency: Urgency) -> i64 {
        match urgency {
            Urgency::Critical => self.critical_days,
            Urgency::High => self.high_days,
            Urgency::Medium => self.medium_days,
            Urgency::Low => self.low_days,
        }
    }
}

/// Configuration for classification, scoring and the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub scoring: ScoringRules,
    pub urgency: UrgencyThresholds,
    pub escalation: EscalationSlas,
    /// Minimum classifier confidence (0-100) to file a document without
    /// manual review.
    pub auto_file_confidence: u8,
    /// Default look-ahead for expiring-item views, in days.
    pub expiring_horizon_days: i64,
    /// Expiring items included in a tenant summary.
    pub summary_top_n: usize,
    /// Let the workflow engine move people to the next stage once every
    /// requirement of their current stage is verified.
    pub auto_stage_progression: bool,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringRules::default(),
            urgency: UrgencyThresholds::default(),
            escalation: EscalationSlas::default(),
            auto_file_confidence: 70,
            expiring_horizon_days: 90,
            summary_top_n: 10,
            auto_stage_progression: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = ComplianceConfig::default();
        assert_eq!(config.scoring.document_warning_days, 30);
        assert_eq!(config.scoring.training_warning_days, 14);
        assert_eq!(config.urgency.critical_below, 14);
        assert_eq!(config.escalation.for_urgency(Urgency::Critical), 3);
        assert_eq!(config.auto_file_confidence, 70);
        assert_eq!(config.expiring_horizon_days, 90);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config: ComplianceConfig = serde_yaml::from_str(
            "auto_file_confidence: 80\nescalation:\n  critical_days: 1\n",
        )
        .unwrap();
        assert_eq!(config.auto_file_confidence, 80);
        assert_eq!(config.escalation.critical_days, 1);
        assert_eq!(config.escalation.high_days, 5);
        assert_eq!(config.scoring, ScoringRules::default());
    }
}
