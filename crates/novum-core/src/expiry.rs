//! Expiry arithmetic, urgency tiers, and the merged expiring-items view.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Urgency of a task, and severity of an expiring item.
///
/// Declaration order is most severe first, so the derived `Ord` sorts
/// critical before low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Urgency::Critical),
            "high" => Some(Urgency::High),
            "medium" => Some(Urgency::Medium),
            "low" => Some(Urgency::Low),
            _ => None,
        }
    }

    /// One tier more urgent. Critical stays critical.
    pub fn raised(&self) -> Urgency {
        match self {
            Urgency::Critical | Urgency::High => Urgency::Critical,
            Urgency::Medium => Urgency::High,
            Urgency::Low => Urgency::Medium,
        }
    }
}

/// Day boundaries for urgency tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyThresholds {
    /// Strictly fewer days than this is critical.
    pub critical_below: i64,
    /// Up to and including this many days is high.
    pub high_within: i64,
    /// Up to and including this many days is medium.
    pub medium_within: i64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            critical_below: 14,
            high_within: 30,
            medium_within: 60,
        }
    }
}

impl UrgencyThresholds {
    pub fn for_days(&self, days_until_expiry: i64) -> Urgency {
        if days_until_expiry < self.critical_below {
            Urgency::Critical
        } else if days_until_expiry <= self.high_within {
            Urgency::High
        } else if days_until_expiry <= self.medium_within {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }
}

/// Status of a dated item relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Valid,
    ExpiringSoon,
    Expired,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Valid => "valid",
            ExpiryStatus::ExpiringSoon => "expiring_soon",
            ExpiryStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "valid" => Some(ExpiryStatus::Valid),
            "expiring_soon" => Some(ExpiryStatus::ExpiringSoon),
            "expired" => Some(ExpiryStatus::Expired),
            _ => None,
        }
    }
}

/// Whole days from `today` to `expiry`; negative once expired.
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Classify an expiry date. The expiry day itself still counts as valid
/// for that day; the item is expired from the next day.
pub fn expiry_status(expiry: NaiveDate, today: NaiveDate, warning_days: i64) -> ExpiryStatus {
    let days = days_until_expiry(expiry, today);
    if days < 0 {
        ExpiryStatus::Expired
    } else if days <= warning_days {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Valid
    }
}

/// Add whole calendar months, clamping to the end of shorter months.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(chrono::Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

// -----------------------------------------------------------------------
// Expiring items
// -----------------------------------------------------------------------

/// Which backing table an expiring item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    Document,
    RightToWork,
    Training,
}

impl ItemSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSource::Document => "document",
            ItemSource::RightToWork => "right_to_work",
            ItemSource::Training => "training",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(ItemSource::Document),
            "right_to_work" => Some(ItemSource::RightToWork),
            "training" => Some(ItemSource::Training),
            _ => None,
        }
    }
}

/// One dated item from any of the monitored sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringItem {
    pub source: ItemSource,
    pub source_id: Uuid,
    pub person_id: Uuid,
    pub person_name: String,
    /// Document type id, course id, or `right_to_work_check`.
    pub item_type: String,
    pub item_name: String,
    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    pub severity: Urgency,
    pub status: ExpiryStatus,
}

/// Order by days until expiry, then by severity (critical first).
/// Remaining ties fall back to stable identifiers so repeated runs
/// produce identical output.
pub fn compare_expiring(a: &ExpiringItem, b: &ExpiringItem) -> Ordering {
    a.days_until_expiry
        .cmp(&b.days_until_expiry)
        .then(a.severity.cmp(&b.severity))
        .then_with(|| a.person_name.cmp(&b.person_name))
        .then_with(|| a.item_type.cmp(&b.item_type))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.source_id.cmp(&b.source_id))
}

pub fn sort_expiring(items: &mut [ExpiringItem]) {
    items.sort_by(compare_expiring);
}
