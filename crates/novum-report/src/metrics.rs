//! Tenant-level metrics for the monthly report.

use novum_compliance::service::PersonScore;
use novum_core::scoring::ItemState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceMetrics {
    pub total_staff: usize,
    pub compliant_staff: usize,
    /// Percentage of staff that are CQC ready; 100 with no staff.
    pub compliance_rate: u8,
    pub dbs_valid: usize,
    pub dbs_expiring: usize,
    /// Expired or missing.
    pub dbs_expired: usize,
    pub rtw_valid: usize,
    pub rtw_expiring: usize,
    pub rtw_expired: usize,
    pub training_complete: usize,
    /// Expired or missing mandatory training.
    pub training_overdue: usize,
    pub average_score: u8,
    /// No DBS or right-to-work check expired or missing anywhere.
    pub cqc_ready: bool,
}

impl ComplianceMetrics {
    pub fn from_scores(scores: &[PersonScore]) -> Self {
        let mut m = ComplianceMetrics {
            total_staff: scores.len(),
            ..Default::default()
        };

        for s in scores {
            let groups = &s.score.groups;
            if s.score.cqc_ready {
                m.compliant_staff += 1;
            }
            match groups.dbs {
                Some(ItemState::Valid) => m.dbs_valid += 1,
                Some(ItemState::ExpiringSoon) => m.dbs_expiring += 1,
                Some(ItemState::Expired | ItemState::Missing) => m.dbs_expired += 1,
                None => {}
            }
            match groups.rtw {
                Some(ItemState::Valid) => m.rtw_valid += 1,
                Some(ItemState::ExpiringSoon) => m.rtw_expiring += 1,
                Some(ItemState::Expired | ItemState::Missing) => m.rtw_expired += 1,
                None => {}
            }
            match groups.training {
                Some(ItemState::Valid) => m.training_complete += 1,
                Some(ItemState::Expired | ItemState::Missing) => m.training_overdue += 1,
                Some(ItemState::ExpiringSoon) | None => {}
            }
        }

        m.compliance_rate = percentage(m.compliant_staff, m.total_staff);
        m.average_score = if scores.is_empty() {
            100
        } else {
            let total: u32 = scores.iter().map(|s| u32::from(s.score.score)).sum();
            (f64::from(total) / scores.len() as f64).round() as u8
        };
        m.cqc_ready = m.dbs_expired == 0 && m.rtw_expired == 0;
        m
    }

    /// DBS and right-to-work problems that put an inspection at risk.
    pub fn critical_issues(&self) -> usize {
        self.dbs_expired + self.rtw_expired
    }
}

fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 100;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_rounds_to_nearest_percent() {
        assert_eq!(percentage(0, 0), 100);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn empty_tenant_is_ready() {
        let m = ComplianceMetrics::from_scores(&[]);
        assert_eq!(m.total_staff, 0);
        assert_eq!(m.compliance_rate, 100);
        assert_eq!(m.average_score, 100);
        assert!(m.cqc_ready);
        assert_eq!(m.critical_issues(), 0);
    }
}
