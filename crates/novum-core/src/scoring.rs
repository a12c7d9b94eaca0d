//! Compliance scoring.
//!
//! [`score_person`] is a pure function of the person's stage, their
//! current documents, training records, right-to-work checks, open tasks
//! and today's date. It performs no I/O.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::expiry::{ExpiryStatus, Urgency, days_until_expiry, expiry_status};
use crate::models::document::ComplianceDocument;
use crate::models::person::Person;
use crate::models::right_to_work::{RightToWorkCheck, RtwOutcome};
use crate::models::task::ComplianceTask;
use crate::models::training::TrainingRecord;
use crate::taxonomy::{
    self, Applicability, Authority, CriticalCategory, DocumentTypeSpec, Evidence, Stage,
};

/// Item type used for the right-to-work re-check requirement.
pub const RTW_RECHECK_ITEM: &str = "right_to_work_check";

/// Windows and partial credit applied while scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Documents expiring within this many days are "expiring soon".
    pub document_warning_days: i64,
    /// Mandatory training expiring within this many days is "expiring soon".
    pub training_warning_days: i64,
    /// Points (0..=1) awarded to an expiring-soon item.
    pub expiring_credit: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            document_warning_days: 30,
            training_warning_days: 14,
            expiring_credit: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    AtRisk,
    NonCompliant,
}

/// State of one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Valid,
    ExpiringSoon,
    Expired,
    Missing,
}

impl ItemState {
    fn rank(&self) -> u8 {
        match self {
            ItemState::Valid => 0,
            ItemState::ExpiringSoon => 1,
            ItemState::Expired => 2,
            ItemState::Missing => 3,
        }
    }

    /// The more serious of two states.
    pub fn worst(self, other: ItemState) -> ItemState {
        if other.rank() > self.rank() { other } else { self }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, ItemState::Expired | ItemState::Missing)
    }

    fn from_expiry(status: ExpiryStatus) -> Self {
        match status {
            ExpiryStatus::Valid => ItemState::Valid,
            ExpiryStatus::ExpiringSoon => ItemState::ExpiringSoon,
            ExpiryStatus::Expired => ItemState::Expired,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseScore {
    pub course_id: String,
    pub name: String,
    pub state: ItemState,
    pub points: f64,
    pub expiry_date: Option<NaiveDate>,
}

/// Score of one required category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub item_type: String,
    pub name: String,
    pub authority: Authority,
    pub critical: Option<CriticalCategory>,
    pub weight: f64,
    pub state: ItemState,
    /// 0.0 ..= 1.0
    pub points: f64,
    pub expiry_date: Option<NaiveDate>,
    pub days_until_expiry: Option<i64>,
    /// Per-course detail for the training category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub courses: Vec<CourseScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceGap {
    pub item_type: String,
    pub name: String,
    pub state: ItemState,
    pub critical: Option<CriticalCategory>,
    pub expiry_date: Option<NaiveDate>,
    pub days_until_expiry: Option<i64>,
}

/// Worst state per regulator group; `None` when nothing in the group
/// applies to the person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub rtw: Option<ItemState>,
    pub dbs: Option<ItemState>,
    pub training: Option<ItemState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceScore {
    /// 0 ..= 100
    pub score: u8,
    pub status: ComplianceStatus,
    pub cqc_ready: bool,
    /// No requirements applied at this stage; the score of 100 carries no
    /// evidence.
    pub vacuous: bool,
    pub breakdown: Vec<CategoryScore>,
    pub critical_gaps: Vec<ComplianceGap>,
    pub warnings: Vec<ComplianceGap>,
    /// Documents awaiting manual classification. Not counted as missing.
    pub unclassified_documents: usize,
    pub groups: GroupSummary,
}

/// Everything the scorer looks at for one person.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub stage: Stage,
    pub applicability: Applicability,
    pub documents: &'a [ComplianceDocument],
    pub training: &'a [TrainingRecord],
    pub rtw_checks: &'a [RightToWorkCheck],
    pub open_tasks: &'a [ComplianceTask],
    pub today: NaiveDate,
}

impl<'a> ScoringInput<'a> {
    pub fn for_person(
        person: &Person,
        documents: &'a [ComplianceDocument],
        training: &'a [TrainingRecord],
        rtw_checks: &'a [RightToWorkCheck],
        open_tasks: &'a [ComplianceTask],
        today: NaiveDate,
    ) -> Self {
        Self {
            stage: person.stage,
            applicability: person.applicability(),
            documents,
            training,
            rtw_checks,
            open_tasks,
            today,
        }
    }
}

/// Current, scorable document per type. Among several current versions
/// the highest version wins.
pub fn current_documents<'d>(
    documents: &'d [ComplianceDocument],
) -> HashMap<&'d str, &'d ComplianceDocument> {
    let mut current: HashMap<&str, &ComplianceDocument> = HashMap::new();
    for doc in documents.iter().filter(|d| d.counts_toward_compliance()) {
        let Some(type_id) = doc.document_type_id.as_deref() else {
            continue;
        };
        if current
            .get(type_id)
            .is_none_or(|existing| existing.version < doc.version)
        {
            current.insert(type_id, doc);
        }
    }
    current
}

/// Latest record per course, by completion date.
pub fn latest_training(records: &[TrainingRecord]) -> HashMap<&str, &TrainingRecord> {
    let mut latest: HashMap<&str, &TrainingRecord> = HashMap::new();
    for r in records {
        if latest
            .get(r.course_id.as_str())
            .is_none_or(|existing| existing.completed_on < r.completed_on)
        {
            latest.insert(r.course_id.as_str(), r);
        }
    }
    latest
}

/// The most recent right-to-work check, by check date.
pub fn latest_rtw_check(checks: &[RightToWorkCheck]) -> Option<&RightToWorkCheck> {
    checks
        .iter()
        .max_by(|a, b| a.checked_on.cmp(&b.checked_on).then(a.created_at.cmp(&b.created_at)))
}

/// State and points of a dated item.
fn dated_state(
    expiry: Option<NaiveDate>,
    today: NaiveDate,
    warning_days: i64,
    rules: &ScoringRules,
) -> (ItemState, f64) {
    match expiry {
        None => (ItemState::Valid, 1.0),
        Some(date) => {
            let state = ItemState::from_expiry(expiry_status(date, today, warning_days));
            (state, points_for(state, rules))
        }
    }
}

fn points_for(state: ItemState, rules: &ScoringRules) -> f64 {
    match state {
        ItemState::Valid => 1.0,
        ItemState::ExpiringSoon => rules.expiring_credit.clamp(0.0, 1.0),
        ItemState::Expired | ItemState::Missing => 0.0,
    }
}

fn score_document(
    spec: &DocumentTypeSpec,
    current: &HashMap<&str, &ComplianceDocument>,
    today: NaiveDate,
    rules: &ScoringRules,
) -> CategoryScore {
    let doc = current.get(spec.id);
    let expiry = doc.and_then(|d| if spec.has_expiry { d.expiry_date } else { None });
    let (state, points) = match doc {
        None => (ItemState::Missing, 0.0),
        Some(_) => dated_state(expiry, today, rules.document_warning_days, rules),
    };
    CategoryScore {
        item_type: spec.id.to_string(),
        name: spec.name.to_string(),
        authority: spec.authority,
        critical: spec.critical,
        weight: spec.weight,
        state,
        points,
        expiry_date: expiry,
        days_until_expiry: expiry.map(|e| days_until_expiry(e, today)),
        courses: Vec::new(),
    }
}

fn score_training(
    spec: &DocumentTypeSpec,
    training: &[TrainingRecord],
    today: NaiveDate,
    rules: &ScoringRules,
) -> CategoryScore {
    let latest = latest_training(training);
    let courses: Vec<CourseScore> = taxonomy::mandatory_courses()
        .map(|course| {
            let record = latest.get(course.id);
            let expiry = record.and_then(|r| r.effective_expiry());
            let (state, points) = match record {
                None => (ItemState::Missing, 0.0),
                Some(_) => dated_state(expiry, today, rules.training_warning_days, rules),
            };
            CourseScore {
                course_id: course.id.to_string(),
                name: course.name.to_string(),
                state,
                points,
                expiry_date: expiry,
            }
        })
        .collect();

    let (state, points) = if courses.is_empty() {
        (ItemState::Valid, 1.0)
    } else {
        let state = courses
            .iter()
            .fold(ItemState::Valid, |acc, c| acc.worst(c.state));
        let points = courses.iter().map(|c| c.points).sum::<f64>() / courses.len() as f64;
        (state, points)
    };
    let expiry_date = courses.iter().filter_map(|c| c.expiry_date).min();

    CategoryScore {
        item_type: spec.id.to_string(),
        name: spec.name.to_string(),
        authority: spec.authority,
        critical: spec.critical,
        weight: spec.weight,
        state,
        points,
        expiry_date,
        days_until_expiry: expiry_date.map(|e| days_until_expiry(e, today)),
        courses,
    }
}

fn score_rtw_recheck(
    check: &RightToWorkCheck,
    today: NaiveDate,
    rules: &ScoringRules,
) -> Option<CategoryScore> {
    let (state, points, expiry) = match (check.outcome, check.next_check_date) {
        (RtwOutcome::Failed, next) => (ItemState::Expired, 0.0, next),
        (_, Some(next)) => {
            let (state, points) =
                dated_state(Some(next), today, rules.document_warning_days, rules);
            (state, points, Some(next))
        }
        (_, None) => return None,
    };
    Some(CategoryScore {
        item_type: RTW_RECHECK_ITEM.to_string(),
        name: "Right to Work Re-check".to_string(),
        authority: Authority::HomeOffice,
        critical: Some(CriticalCategory::RightToWork),
        weight: 1.0,
        state,
        points,
        expiry_date: expiry,
        days_until_expiry: expiry.map(|e| days_until_expiry(e, today)),
        courses: Vec::new(),
    })
}

fn gap_of(cat: &CategoryScore) -> ComplianceGap {
    ComplianceGap {
        item_type: cat.item_type.clone(),
        name: cat.name.clone(),
        state: cat.state,
        critical: cat.critical,
        expiry_date: cat.expiry_date,
        days_until_expiry: cat.days_until_expiry,
    }
}

fn merge(slot: &mut Option<ItemState>, state: ItemState) {
    *slot = Some(slot.map_or(state, |s| s.worst(state)));
}

/// Compute a person's compliance score.
pub fn score_person(input: &ScoringInput<'_>, rules: &ScoringRules) -> ComplianceScore {
    let required = taxonomy::required_documents(input.stage, input.applicability);
    score_against(&required, input, rules)
}

fn score_against(
    required: &[&'static DocumentTypeSpec],
    input: &ScoringInput<'_>,
    rules: &ScoringRules,
) -> ComplianceScore {
    let current = current_documents(input.documents);
    let unclassified_documents = input
        .documents
        .iter()
        .filter(|d| d.is_current && d.document_type_id.is_none())
        .count();

    let mut breakdown: Vec<CategoryScore> = required
        .iter()
        .map(|spec| match spec.evidence {
            Evidence::Documents => score_document(spec, &current, input.today, rules),
            Evidence::TrainingRecords => score_training(spec, input.training, input.today, rules),
        })
        .collect();

    if let Some(recheck) = latest_rtw_check(input.rtw_checks)
        .and_then(|check| score_rtw_recheck(check, input.today, rules))
    {
        breakdown.push(recheck);
    }

    let total_weight: f64 = breakdown.iter().map(|c| c.weight).sum();
    let vacuous = breakdown.is_empty() || total_weight <= 0.0;
    let score = if vacuous {
        100
    } else {
        let earned: f64 = breakdown.iter().map(|c| c.weight * c.points).sum();
        (100.0 * earned / total_weight).round().clamp(0.0, 100.0) as u8
    };

    let critical_gaps: Vec<ComplianceGap> = breakdown
        .iter()
        .filter(|c| c.state.is_gap())
        .map(gap_of)
        .collect();
    let warnings: Vec<ComplianceGap> = breakdown
        .iter()
        .filter(|c| c.state == ItemState::ExpiringSoon)
        .map(gap_of)
        .collect();

    let critical_task_open = input
        .open_tasks
        .iter()
        .any(|t| t.is_open() && t.urgency == Urgency::Critical);

    let status = if !critical_gaps.is_empty() {
        ComplianceStatus::NonCompliant
    } else if !warnings.is_empty() || critical_task_open {
        ComplianceStatus::AtRisk
    } else {
        ComplianceStatus::Compliant
    };

    let mut groups = GroupSummary::default();
    for cat in &breakdown {
        match (cat.critical, cat.item_type.as_str()) {
            (Some(CriticalCategory::RightToWork), _) => merge(&mut groups.rtw, cat.state),
            (Some(CriticalCategory::Dbs), _) => merge(&mut groups.dbs, cat.state),
            (None, "mandatory_training") => merge(&mut groups.training, cat.state),
            _ => {}
        }
    }
    // Critical documents held beyond the stage's requirements still count
    // against their group once expired.
    for (type_id, doc) in &current {
        if breakdown.iter().any(|c| c.item_type == *type_id) {
            continue;
        }
        let Some(spec) = taxonomy::lookup(type_id) else {
            continue;
        };
        let Some(critical) = spec.critical else {
            continue;
        };
        let expiry = if spec.has_expiry { doc.expiry_date } else { None };
        let (state, _) = dated_state(expiry, input.today, rules.document_warning_days, rules);
        match critical {
            CriticalCategory::RightToWork => merge(&mut groups.rtw, state),
            CriticalCategory::Dbs => merge(&mut groups.dbs, state),
        }
    }

    let cqc_ready = !groups.rtw.is_some_and(|s| s.is_gap())
        && !groups.dbs.is_some_and(|s| s.is_gap());

    ComplianceScore {
        score,
        status,
        cqc_ready,
        vacuous,
        breakdown,
        critical_gaps,
        warnings,
        unclassified_documents,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::ItemSource;
    use crate::models::document::ReviewStatus;
    use crate::models::right_to_work::RtwCheckType;
    use crate::models::task::{TaskStatus, TaskType};
    use crate::models::user_profile::StaffRole;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn doc(type_id: &str, expiry_in: Option<i64>) -> ComplianceDocument {
        ComplianceDocument {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            person_id: Uuid::nil(),
            document_type_id: Some(type_id.into()),
            authority: taxonomy::lookup(type_id).map(|s| s.authority),
            suggested_type_id: None,
            file_name: format!("{type_id}.pdf"),
            file_path: None,
            issue_date: None,
            expiry_date: expiry_in.map(|d| today() + Duration::days(d)),
            review_status: ReviewStatus::Verified,
            expiry_status: None,
            confidence: None,
            version: 1,
            is_current: true,
            review_notes: None,
            metadata: serde_json::json!({}),
            uploaded_at: Utc::now(),
            verified_at: None,
        }
    }

    fn training(course_id: &str, expiry_in: i64) -> TrainingRecord {
        TrainingRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            person_id: Uuid::nil(),
            course_id: course_id.into(),
            completed_on: today() - Duration::days(30),
            expiry_date: Some(today() + Duration::days(expiry_in)),
            certificate_ref: None,
            created_at: Utc::now(),
        }
    }

    fn all_training(expiry_in: i64) -> Vec<TrainingRecord> {
        taxonomy::mandatory_courses()
            .map(|c| training(c.id, expiry_in))
            .collect()
    }

    fn ongoing_docs() -> Vec<ComplianceDocument> {
        vec![
            doc("dbs_certificate", Some(400)),
            doc("mandatory_training", None),
            doc("immunization_records", Some(400)),
        ]
    }

    fn input<'a>(
        stage: Stage,
        documents: &'a [ComplianceDocument],
        training: &'a [TrainingRecord],
        rtw: &'a [RightToWorkCheck],
        tasks: &'a [ComplianceTask],
    ) -> ScoringInput<'a> {
        ScoringInput {
            stage,
            applicability: Applicability::default(),
            documents,
            training,
            rtw_checks: rtw,
            open_tasks: tasks,
            today: today(),
        }
    }

    #[test]
    fn fully_valid_person_is_compliant() {
        let docs = ongoing_docs();
        let tr = all_training(200);
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &[]), &ScoringRules::default());
        assert_eq!(s.score, 100);
        assert_eq!(s.status, ComplianceStatus::Compliant);
        assert!(s.cqc_ready);
        assert!(!s.vacuous);
        assert!(s.critical_gaps.is_empty());
    }

    #[test]
    fn dbs_expiring_in_ten_days_is_a_warning() {
        let mut docs = ongoing_docs();
        docs[0] = doc("dbs_certificate", Some(10));
        let tr = all_training(200);
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &[]), &ScoringRules::default());
        let dbs = s.breakdown.iter().find(|c| c.item_type == "dbs_certificate").unwrap();
        assert_eq!(dbs.state, ItemState::ExpiringSoon);
        assert_eq!(dbs.points, 0.5);
        assert_eq!(s.status, ComplianceStatus::AtRisk);
        assert!(s.cqc_ready);
        // (1 + 1 + 0.5) / 3
        assert_eq!(s.score, 83);
    }

    #[test]
    fn no_training_records_means_missing_category() {
        let docs = ongoing_docs();
        let s = score_person(&input(Stage::Ongoing, &docs, &[], &[], &[]), &ScoringRules::default());
        let training = s
            .breakdown
            .iter()
            .find(|c| c.item_type == "mandatory_training")
            .unwrap();
        assert_eq!(training.state, ItemState::Missing);
        assert_eq!(training.points, 0.0);
        assert!(training.courses.iter().all(|c| c.state == ItemState::Missing));
        assert_eq!(s.status, ComplianceStatus::NonCompliant);
        assert_eq!(s.groups.training, Some(ItemState::Missing));
    }

    #[test]
    fn training_uses_its_own_window() {
        let docs = ongoing_docs();
        // 20 days out: outside the 14-day training window.
        let tr = all_training(20);
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &[]), &ScoringRules::default());
        assert_eq!(s.status, ComplianceStatus::Compliant);

        let tr = all_training(10);
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &[]), &ScoringRules::default());
        assert_eq!(s.groups.training, Some(ItemState::ExpiringSoon));
    }

    #[test]
    fn expired_dbs_blocks_cqc_ready() {
        let mut docs = ongoing_docs();
        docs[0] = doc("dbs_certificate", Some(-1));
        let tr = all_training(200);
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &[]), &ScoringRules::default());
        assert!(!s.cqc_ready);
        assert_eq!(s.status, ComplianceStatus::NonCompliant);
        assert_eq!(s.critical_gaps[0].item_type, "dbs_certificate");
    }

    #[test]
    fn expired_rtw_document_blocks_cqc_ready_even_when_not_required() {
        let mut docs = ongoing_docs();
        docs.push(doc("rtw_passport", Some(-30)));
        let tr = all_training(200);
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &[]), &ScoringRules::default());
        assert!(!s.cqc_ready);
        assert_eq!(s.groups.rtw, Some(ItemState::Expired));
        assert_eq!(s.score, 100);
    }

    #[test]
    fn superseded_rejected_and_unclassified_are_not_scored() {
        let mut old = doc("dbs_certificate", Some(400));
        old.is_current = false;
        let mut rejected = doc("immunization_records", Some(400));
        rejected.review_status = ReviewStatus::Rejected;
        let mut unclassified = doc("dbs_certificate", None);
        unclassified.document_type_id = None;
        unclassified.review_status = ReviewStatus::Unclassified;
        let docs = vec![old, rejected, unclassified, doc("mandatory_training", None)];
        let tr = all_training(200);
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &[]), &ScoringRules::default());
        assert_eq!(s.unclassified_documents, 1);
        let missing: Vec<_> = s.critical_gaps.iter().map(|g| g.item_type.as_str()).collect();
        assert!(missing.contains(&"dbs_certificate"));
        assert!(missing.contains(&"immunization_records"));
    }

    #[test]
    fn open_critical_task_marks_at_risk() {
        let docs = ongoing_docs();
        let tr = all_training(200);
        let task = ComplianceTask {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            person_id: Uuid::nil(),
            source: ItemSource::Document,
            source_id: Uuid::new_v4(),
            item_type: Some("dbs_certificate".into()),
            task_type: TaskType::DocumentExpiring,
            title: "Renew DBS".into(),
            description: None,
            urgency: Urgency::Critical,
            status: TaskStatus::Pending,
            assigned_role: StaffRole::HrManager,
            due_date: None,
            escalation_level: 0,
            last_escalated_at: None,
            closed_reason: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let tasks = [task];
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &[], &tasks), &ScoringRules::default());
        assert_eq!(s.status, ComplianceStatus::AtRisk);
        assert_eq!(s.score, 100);
    }

    #[test]
    fn rtw_recheck_joins_rtw_group() {
        let docs = ongoing_docs();
        let tr = all_training(200);
        let check = RightToWorkCheck {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            person_id: Uuid::nil(),
            check_type: RtwCheckType::Online,
            checked_on: today() - Duration::days(300),
            outcome: RtwOutcome::TimeLimited,
            next_check_date: Some(today() - Duration::days(2)),
            notes: None,
            created_at: Utc::now(),
        };
        let checks = [check];
        let s = score_person(&input(Stage::Ongoing, &docs, &tr, &checks, &[]), &ScoringRules::default());
        assert_eq!(s.groups.rtw, Some(ItemState::Expired));
        assert!(!s.cqc_ready);
        assert!(s.breakdown.iter().any(|c| c.item_type == RTW_RECHECK_ITEM));
    }

    #[test]
    fn offboarding_without_documents_scores_zero_not_vacuous() {
        let s = score_person(&input(Stage::Offboarding, &[], &[], &[], &[]), &ScoringRules::default());
        assert_eq!(s.score, 0);
        assert!(!s.vacuous);
    }

    #[test]
    fn score_is_bounded_for_any_mix() {
        let rules = ScoringRules::default();
        for stage in Stage::ALL {
            for expiry in [-10, 0, 5, 20, 100] {
                let docs: Vec<_> = taxonomy::DOCUMENT_TYPES
                    .iter()
                    .map(|spec| doc(spec.id, Some(expiry)))
                    .collect();
                let tr = all_training(expiry);
                let s = score_person(&input(stage, &docs, &tr, &[], &[]), &rules);
                assert!(s.score <= 100);
                if s.groups.rtw.is_some_and(|g| g.is_gap()) || s.groups.dbs.is_some_and(|g| g.is_gap()) {
                    assert!(!s.cqc_ready);
                } else {
                    assert!(s.cqc_ready);
                }
            }
        }
    }

    #[test]
    fn vacuous_when_no_requirements() {
        let s = score_against(
            &[],
            &input(Stage::Application, &[], &[], &[], &[]),
            &ScoringRules::default(),
        );
        assert_eq!(s.score, 100);
        assert!(s.vacuous);
        assert_eq!(s.status, ComplianceStatus::Compliant);
        assert!(s.cqc_ready);
        assert_eq!(s.groups, GroupSummary::default());
    }
}
