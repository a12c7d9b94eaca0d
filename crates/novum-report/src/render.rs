//! HTML body of the monthly compliance email.
//!
//! The markup lives in `templates/monthly_report.html`, a single
//! self-contained document with inline styles so it survives mail
//! clients that strip `<head>`. Tenant data is escaped by the template
//! engine.

use askama::Template;
use chrono::NaiveDate;
use novum_core::expiry::{ExpiringItem, ItemSource};

use crate::metrics::ComplianceMetrics;

const READY: &str = "#10B981";
const NOT_READY: &str = "#EF4444";

/// Everything the template needs for one tenant.
#[derive(Debug, Clone)]
pub struct ReportContent<'a> {
    pub tenant_name: &'a str,
    pub report_date: NaiveDate,
    pub metrics: &'a ComplianceMetrics,
    /// Sorted, most urgent first.
    pub items: &'a [ExpiringItem],
    pub overflow_limit: usize,
    pub horizon_days: i64,
    pub app_url: &'a str,
}

/// Short label shown next to each expiring item.
pub fn item_label(item: &ExpiringItem) -> &'static str {
    match item.source {
        ItemSource::Document if item.item_type == "dbs_certificate" => "DBS",
        ItemSource::Document => "Document",
        ItemSource::RightToWork => "RTW",
        ItemSource::Training => "Training",
    }
}

fn days_label(days: i64) -> String {
    match days {
        0 => "Today".into(),
        1 => "Tomorrow".into(),
        n => format!("{n} days"),
    }
}

fn tier_class(days: i64) -> &'static str {
    if days <= 14 {
        "critical"
    } else if days <= 30 {
        "warning"
    } else {
        ""
    }
}

struct AlertTag {
    count: usize,
    label: &'static str,
    background: &'static str,
    foreground: &'static str,
}

impl AlertTag {
    fn expiring(count: usize) -> Option<Self> {
        (count > 0).then_some(Self {
            count,
            label: "expiring",
            background: "#FEF3C7",
            foreground: "#92400E",
        })
    }

    fn danger(count: usize, label: &'static str) -> Option<Self> {
        (count > 0).then_some(Self {
            count,
            label,
            background: "#FEE2E2",
            foreground: "#991B1B",
        })
    }
}

struct MetricCard {
    value: usize,
    label: &'static str,
    tags: Vec<AlertTag>,
}

struct ExpiryRow {
    tier: &'static str,
    background: &'static str,
    days_color: &'static str,
    label: &'static str,
    person: String,
    item: String,
    date: String,
    days: String,
}

impl ExpiryRow {
    fn new(item: &ExpiringItem) -> Self {
        let tier = tier_class(item.days_until_expiry);
        let (background, days_color) = match tier {
            "critical" => ("#FEF2F2", "#DC2626"),
            "warning" => ("#FFFBEB", "#D97706"),
            _ => ("#FFFFFF", "#1F2937"),
        };
        Self {
            tier,
            background,
            days_color,
            label: item_label(item),
            person: item.person_name.clone(),
            item: item.item_name.clone(),
            date: item.expiry_date.format("%-d %b %Y").to_string(),
            days: days_label(item.days_until_expiry),
        }
    }
}

#[derive(Template)]
#[template(path = "monthly_report.html")]
struct MonthlyReportTemplate<'a> {
    tenant_name: &'a str,
    report_date: String,
    year: String,
    status_color: &'static str,
    status_text: &'static str,
    metrics: &'a ComplianceMetrics,
    cards: Vec<MetricCard>,
    critical_issues: usize,
    rows: Vec<ExpiryRow>,
    hidden: usize,
    horizon_days: i64,
    app_url: &'a str,
}

pub fn render_report(content: &ReportContent<'_>) -> Result<String, askama::Error> {
    let m = content.metrics;
    let (status_color, status_text) = if m.cqc_ready {
        (READY, "CQC Ready")
    } else {
        (NOT_READY, "Action Required")
    };

    let cards = vec![
        MetricCard {
            value: m.dbs_valid,
            label: "Valid DBS",
            tags: [AlertTag::expiring(m.dbs_expiring), AlertTag::danger(m.dbs_expired, "expired")]
                .into_iter()
                .flatten()
                .collect(),
        },
        MetricCard {
            value: m.rtw_valid,
            label: "RTW Verified",
            tags: [AlertTag::expiring(m.rtw_expiring), AlertTag::danger(m.rtw_expired, "expired")]
                .into_iter()
                .flatten()
                .collect(),
        },
        MetricCard {
            value: m.training_complete,
            label: "Training Complete",
            tags: AlertTag::danger(m.training_overdue, "overdue").into_iter().collect(),
        },
    ];

    MonthlyReportTemplate {
        tenant_name: content.tenant_name,
        report_date: content.report_date.format("%-d %B %Y").to_string(),
        year: content.report_date.format("%Y").to_string(),
        status_color,
        status_text,
        metrics: m,
        cards,
        critical_issues: m.critical_issues(),
        rows: content
            .items
            .iter()
            .take(content.overflow_limit)
            .map(ExpiryRow::new)
            .collect(),
        hidden: content.items.len().saturating_sub(content.overflow_limit),
        horizon_days: content.horizon_days,
        app_url: content.app_url,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use novum_core::expiry::{ExpiryStatus, Urgency};
    use uuid::Uuid;

    fn item(person: &str, days: i64) -> ExpiringItem {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        ExpiringItem {
            source: ItemSource::Document,
            source_id: Uuid::new_v4(),
            person_id: Uuid::new_v4(),
            person_name: person.into(),
            item_type: "dbs_certificate".into(),
            item_name: "DBS Certificate".into(),
            expiry_date: today + chrono::Duration::days(days),
            days_until_expiry: days,
            severity: Urgency::Critical,
            status: ExpiryStatus::ExpiringSoon,
        }
    }

    fn render(metrics: &ComplianceMetrics, items: &[ExpiringItem], tenant: &str) -> String {
        render_report(&ReportContent {
            tenant_name: tenant,
            report_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            metrics,
            items,
            overflow_limit: 10,
            horizon_days: 90,
            app_url: "https://example.test/compliance",
        })
        .unwrap()
    }

    #[test]
    fn tenant_and_person_names_are_escaped() {
        let metrics = ComplianceMetrics::from_scores(&[]);
        let html = render(&metrics, &[item("<script>x</script>", 3)], "Rose & Crown <Care>");
        assert!(html.contains("Rose &amp; Crown &lt;Care&gt;"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn quotes_in_item_names_cannot_break_out_of_markup() {
        let metrics = ComplianceMetrics::from_scores(&[]);
        let mut row = item("Ada", 20);
        row.item_name = r#"Fire "Safety" <b>"#.into();
        let html = render(&metrics, &[row], "Sunrise");
        assert!(html.contains("&quot;Safety&quot; &lt;b&gt;"));
        assert!(html.contains(r#"class="expiry-item warning""#));
    }

    #[test]
    fn ready_tenant_gets_all_clear_and_no_risk_notice() {
        let metrics = ComplianceMetrics::from_scores(&[]);
        let html = render(&metrics, &[], "Sunrise");
        assert!(html.contains("CQC Ready"));
        assert!(html.contains("All Clear!"));
        assert!(html.contains("next 90 days"));
        assert!(!html.contains("CQC Inspection Risk"));
    }

    #[test]
    fn overflow_line_counts_hidden_items() {
        let metrics = ComplianceMetrics {
            dbs_expired: 2,
            rtw_expired: 1,
            cqc_ready: false,
            ..Default::default()
        };
        let items: Vec<ExpiringItem> = (0..13).map(|d| item("Ada", d)).collect();
        let html = render(&metrics, &items, "Sunrise");

        assert!(html.contains("Action Required"));
        assert!(html.contains("3 critical compliance issues"));
        assert_eq!(html.matches(r#"class="expiry-item"#).count(), 10);
        assert!(html.contains("+ 3 more items"));
        assert!(html.contains("Today"));
        assert!(html.contains("Tomorrow"));
    }

    #[test]
    fn day_tiers() {
        assert_eq!(tier_class(14), "critical");
        assert_eq!(tier_class(15), "warning");
        assert_eq!(tier_class(30), "warning");
        assert_eq!(tier_class(31), "");
        assert_eq!(days_label(45), "45 days");
    }
}
