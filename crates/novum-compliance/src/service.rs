//! Compliance service: per-person and per-tenant compliance views, the
//! merged expiring-items list, and the document/task/stage write paths.
//!
//! Every call takes the tenant id explicitly and passes it to every
//! repository call; a person, document or task that belongs to another
//! tenant is reported as not found.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use novum_core::clock::Clock;
use novum_core::error::{NovumError, NovumResult};
use novum_core::expiry::{
    ExpiringItem, ItemSource, Urgency, days_until_expiry, expiry_status, sort_expiring,
};
use novum_core::models::audit::{ActorType, CreateAuditLogEntry};
use novum_core::models::document::{
    ComplianceDocument, CreateDocument, ReviewDocument, ReviewStatus,
};
use novum_core::models::folder::{ComplianceFolder, group_into_folders};
use novum_core::models::person::{Person, UpdatePerson};
use novum_core::models::right_to_work::RightToWorkCheck;
use novum_core::models::task::ComplianceTask;
use novum_core::models::training::TrainingRecord;
use novum_core::repository::{
    AuditLogRepository, ComplianceStore, DocumentRepository, PersonRepository,
    RightToWorkRepository, TaskRepository, TenantRepository, TrainingRepository,
};
use novum_core::scoring::{
    ComplianceScore, ComplianceStatus, RTW_RECHECK_ITEM, ScoringInput, ScoringRules,
    current_documents, latest_rtw_check, latest_training, score_person,
};
use novum_core::taxonomy::{self, Evidence, Stage};

use crate::classification::{
    Classification, ClassificationInput, Disposition, DocumentClassifier, TypeSuggestion,
};
use crate::config::ComplianceConfig;
use crate::error::ComplianceError;

// -----------------------------------------------------------------------
// Inputs and outputs
// -----------------------------------------------------------------------

/// A new document for a person. Only metadata: file bytes live in object
/// storage and are referenced by `file_path`.
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    pub file_name: String,
    pub file_path: Option<String>,
    /// Set when the uploader chose the type; otherwise the classifier decides.
    pub document_type_id: Option<String>,
    /// Text extracted from the file, if any.
    pub content: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub actor_id: Option<Uuid>,
}

/// Result of [`ComplianceService::record_document`].
#[derive(Debug, Clone, Serialize)]
pub struct RecordedDocument {
    pub document: ComplianceDocument,
    pub classification: Classification,
    /// Open tasks closed because this upload replaced their document.
    pub closed_tasks: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonCompliance {
    pub person: Person,
    pub compliance: ComplianceScore,
    pub open_tasks: Vec<ComplianceTask>,
    /// Dated items within the dashboard horizon, overdue included.
    pub expiring_items: Vec<ExpiringItem>,
    pub generated_on: NaiveDate,
}

/// Score of one person inside a tenant-wide evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct PersonScore {
    pub person: Person,
    pub score: ComplianceScore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub compliant: usize,
    pub at_risk: usize,
    pub non_compliant: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantComplianceSummary {
    pub tenant_id: Uuid,
    pub generated_on: NaiveDate,
    pub total_persons: usize,
    pub status_counts: StatusCounts,
    pub cqc_ready_persons: usize,
    /// Mean person score; 100 for a tenant with nobody in it.
    pub average_score: u8,
    pub unclassified_documents: usize,
    pub open_tasks: usize,
    /// Number of dated items within the horizon before truncation.
    pub total_expiring: usize,
    /// The most urgent items, at most `top` of them.
    pub expiring_items: Vec<ExpiringItem>,
}

// -----------------------------------------------------------------------
// Tenant snapshot
// -----------------------------------------------------------------------

/// Every row the compliance rules look at for a set of persons, grouped
/// by person. Loaded once per operation so scoring stays pure.
#[derive(Debug, Default)]
pub(crate) struct Snapshot {
    pub persons: Vec<Person>,
    pub documents: HashMap<Uuid, Vec<ComplianceDocument>>,
    pub training: HashMap<Uuid, Vec<TrainingRecord>>,
    pub rtw_checks: HashMap<Uuid, Vec<RightToWorkCheck>>,
    pub open_tasks: HashMap<Uuid, Vec<ComplianceTask>>,
}

fn group_by_person<T>(rows: Vec<T>, person_id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(person_id(&row)).or_default().push(row);
    }
    grouped
}

fn rows_of<'a, T>(map: &'a HashMap<Uuid, Vec<T>>, person_id: Uuid) -> &'a [T] {
    map.get(&person_id).map(Vec::as_slice).unwrap_or(&[])
}

impl Snapshot {
    pub(crate) async fn load<S: ComplianceStore>(store: &S, tenant_id: Uuid) -> NovumResult<Self> {
        let persons = store.persons().list_all(tenant_id).await?;
        let documents = store.documents().list_current(tenant_id).await?;
        let training = store.training().list_by_tenant(tenant_id).await?;
        let rtw_checks = store.right_to_work().list_by_tenant(tenant_id).await?;
        let open_tasks = store.tasks().list_open(tenant_id).await?;

        Ok(Self {
            persons,
            documents: group_by_person(documents, |d| d.person_id),
            training: group_by_person(training, |t| t.person_id),
            rtw_checks: group_by_person(rtw_checks, |r| r.person_id),
            open_tasks: group_by_person(open_tasks, |t| t.person_id),
        })
    }

    async fn load_person<S: ComplianceStore>(
        store: &S,
        tenant_id: Uuid,
        person: Person,
    ) -> NovumResult<Self> {
        let id = person.id;
        let documents = store.documents().list_for_person(tenant_id, id).await?;
        let training = store.training().list_for_person(tenant_id, id).await?;
        let rtw_checks = store.right_to_work().list_for_person(tenant_id, id).await?;
        let open_tasks = store.tasks().list_open_for_person(tenant_id, id).await?;

        Ok(Self {
            persons: vec![person],
            documents: HashMap::from([(id, documents)]),
            training: HashMap::from([(id, training)]),
            rtw_checks: HashMap::from([(id, rtw_checks)]),
            open_tasks: HashMap::from([(id, open_tasks)]),
        })
    }

    pub(crate) fn documents_of(&self, person_id: Uuid) -> &[ComplianceDocument] {
        rows_of(&self.documents, person_id)
    }

    pub(crate) fn training_of(&self, person_id: Uuid) -> &[TrainingRecord] {
        rows_of(&self.training, person_id)
    }

    pub(crate) fn rtw_checks_of(&self, person_id: Uuid) -> &[RightToWorkCheck] {
        rows_of(&self.rtw_checks, person_id)
    }

    fn open_tasks_of(&self, person_id: Uuid) -> &[ComplianceTask] {
        rows_of(&self.open_tasks, person_id)
    }

    fn score(&self, person: &Person, today: NaiveDate, rules: &ScoringRules) -> ComplianceScore {
        let input = ScoringInput::for_person(
            person,
            self.documents_of(person.id),
            self.training_of(person.id),
            self.rtw_checks_of(person.id),
            self.open_tasks_of(person.id),
            today,
        );
        score_person(&input, rules)
    }

    fn score_all(&self, today: NaiveDate, rules: &ScoringRules) -> Vec<PersonScore> {
        self.persons
            .iter()
            .map(|p| PersonScore {
                person: p.clone(),
                score: self.score(p, today, rules),
            })
            .collect()
    }

    /// Every monitored dated item, unfiltered and unsorted: current
    /// documents of an expiring type, each person's latest
    /// right-to-work re-check date, and the latest record of each
    /// mandatory course.
    pub(crate) fn dated_items(&self, today: NaiveDate, rules: &ScoringRules) -> Vec<ExpiringItem> {
        let mut items = Vec::new();

        for person in &self.persons {
            let name = person.full_name();
            let item = |source, source_id, item_type: &str, item_name: &str, expiry, severity, warning| {
                ExpiringItem {
                    source,
                    source_id,
                    person_id: person.id,
                    person_name: name.clone(),
                    item_type: item_type.to_string(),
                    item_name: item_name.to_string(),
                    expiry_date: expiry,
                    days_until_expiry: days_until_expiry(expiry, today),
                    severity,
                    status: expiry_status(expiry, today, warning),
                }
            };

            for (type_id, doc) in current_documents(self.documents_of(person.id)) {
                let Some(spec) = taxonomy::lookup(type_id)
                    .filter(|s| s.has_expiry && s.evidence == Evidence::Documents)
                else {
                    continue;
                };
                let Some(expiry) = doc.expiry_date else {
                    continue;
                };
                items.push(item(
                    ItemSource::Document,
                    doc.id,
                    spec.id,
                    spec.name,
                    expiry,
                    spec.severity(),
                    rules.document_warning_days,
                ));
            }

            if let Some(check) = latest_rtw_check(self.rtw_checks_of(person.id)) {
                if let Some(next) = check.next_check_date {
                    items.push(item(
                        ItemSource::RightToWork,
                        check.id,
                        RTW_RECHECK_ITEM,
                        "Right to work re-check",
                        next,
                        Urgency::Critical,
                        rules.document_warning_days,
                    ));
                }
            }

            let training_severity = taxonomy::lookup("mandatory_training")
                .map_or(Urgency::Medium, |s| s.severity());
            for (course_id, record) in latest_training(self.training_of(person.id)) {
                let Some(course) = taxonomy::training_course(course_id).filter(|c| c.mandatory)
                else {
                    continue;
                };
                let Some(expiry) = record.effective_expiry() else {
                    continue;
                };
                items.push(item(
                    ItemSource::Training,
                    record.id,
                    course.id,
                    course.name,
                    expiry,
                    training_severity,
                    rules.training_warning_days,
                ));
            }
        }

        items
    }
}

/// Items due within `within_days` (overdue included), most urgent first.
fn within_horizon(mut items: Vec<ExpiringItem>, within_days: i64) -> Vec<ExpiringItem> {
    items.retain(|i| i.days_until_expiry <= within_days);
    sort_expiring(&mut items);
    items
}

/// Requirements of the person's current stage that are not yet present,
/// verified and unexpired. Empty means the person may progress.
pub fn outstanding_requirements(
    person: &Person,
    documents: &[ComplianceDocument],
    training: &[TrainingRecord],
    today: NaiveDate,
) -> Vec<String> {
    let current = current_documents(documents);
    let latest = latest_training(training);
    let unexpired = |expiry: Option<NaiveDate>| expiry.is_none_or(|d| d >= today);

    taxonomy::required_documents(person.stage, person.applicability())
        .into_iter()
        .filter(|spec| match spec.evidence {
            Evidence::Documents => !current.get(spec.id).is_some_and(|doc| {
                doc.review_status == ReviewStatus::Verified
                    && (!spec.has_expiry || unexpired(doc.expiry_date))
            }),
            Evidence::TrainingRecords => !taxonomy::mandatory_courses().all(|course| {
                latest
                    .get(course.id)
                    .is_some_and(|r| unexpired(r.effective_expiry()))
            }),
        })
        .map(|spec| spec.id.to_string())
        .collect()
}

pub(crate) fn audit_entry(
    tenant_id: Uuid,
    actor_id: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: impl ToString,
    metadata: serde_json::Value,
) -> CreateAuditLogEntry {
    CreateAuditLogEntry {
        tenant_id,
        actor_id,
        actor_type: if actor_id.is_some() {
            ActorType::User
        } else {
            ActorType::System
        },
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id: Some(entity_id.to_string()),
        metadata: Some(metadata),
    }
}

/// Move a person to `next` and record it. Shared by the manual call and
/// the workflow's automatic pass.
pub(crate) async fn advance_stage<S: ComplianceStore>(
    store: &S,
    person: &Person,
    next: Stage,
    actor_id: Option<Uuid>,
) -> NovumResult<Person> {
    let updated = store
        .persons()
        .update(
            person.tenant_id,
            person.id,
            UpdatePerson {
                stage: Some(next),
                ..Default::default()
            },
        )
        .await?;

    store
        .audit()
        .append(audit_entry(
            person.tenant_id,
            actor_id,
            "person_stage_progressed",
            "compliance_person",
            person.id,
            json!({ "from": person.stage.as_str(), "to": next.as_str() }),
        ))
        .await?;

    info!(
        tenant_id = %person.tenant_id,
        person_id = %person.id,
        from = person.stage.as_str(),
        to = next.as_str(),
        "person progressed to next stage"
    );
    Ok(updated)
}

// -----------------------------------------------------------------------
// Service
// -----------------------------------------------------------------------

/// Compliance orchestration over a [`ComplianceStore`].
///
/// Constructed once per process and shared; the classifier's patterns
/// are compiled here.
pub struct ComplianceService<S: ComplianceStore> {
    store: Arc<S>,
    config: ComplianceConfig,
    clock: Arc<dyn Clock>,
    classifier: DocumentClassifier,
}

impl<S: ComplianceStore> ComplianceService<S> {
    pub fn new(
        store: Arc<S>,
        config: ComplianceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ComplianceError> {
        let classifier = DocumentClassifier::new(config.auto_file_confidence)?;
        Ok(Self {
            store,
            config,
            clock,
            classifier,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // -- Reads --------------------------------------------------------

    /// Score one person. Fails with `NotFound` when the person does not
    /// belong to the tenant.
    pub async fn get_person_compliance(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> NovumResult<PersonCompliance> {
        let today = self.today();
        let person = self.store.persons().get_by_id(tenant_id, person_id).await?;
        let snapshot = Snapshot::load_person(self.store.as_ref(), tenant_id, person.clone()).await?;

        let compliance = snapshot.score(&person, today, &self.config.scoring);
        let expiring_items = within_horizon(
            snapshot.dated_items(today, &self.config.scoring),
            self.config.expiring_horizon_days,
        );
        let open_tasks = snapshot.open_tasks_of(person_id).to_vec();

        debug!(
            tenant_id = %tenant_id,
            person_id = %person_id,
            score = compliance.score,
            "person compliance computed"
        );

        Ok(PersonCompliance {
            person,
            compliance,
            open_tasks,
            expiring_items,
            generated_on: today,
        })
    }

    /// Score every person of the tenant, ordered by name.
    pub async fn score_tenant(&self, tenant_id: Uuid) -> NovumResult<Vec<PersonScore>> {
        let snapshot = Snapshot::load(self.store.as_ref(), tenant_id).await?;
        Ok(snapshot.score_all(self.today(), &self.config.scoring))
    }

    /// Status counts across the tenant plus the `top` most urgent
    /// expiring items (configured default when `None`).
    pub async fn get_tenant_compliance_summary(
        &self,
        tenant_id: Uuid,
        top: Option<usize>,
    ) -> NovumResult<TenantComplianceSummary> {
        let today = self.today();
        self.store.tenants().get_by_id(tenant_id).await?;
        let snapshot = Snapshot::load(self.store.as_ref(), tenant_id).await?;
        let scores = snapshot.score_all(today, &self.config.scoring);

        let mut counts = StatusCounts::default();
        for s in &scores {
            match s.score.status {
                ComplianceStatus::Compliant => counts.compliant += 1,
                ComplianceStatus::AtRisk => counts.at_risk += 1,
                ComplianceStatus::NonCompliant => counts.non_compliant += 1,
            }
        }

        let average_score = if scores.is_empty() {
            100
        } else {
            let total: u32 = scores.iter().map(|s| u32::from(s.score.score)).sum();
            (f64::from(total) / scores.len() as f64).round() as u8
        };

        let mut expiring = within_horizon(
            snapshot.dated_items(today, &self.config.scoring),
            self.config.expiring_horizon_days,
        );
        let total_expiring = expiring.len();
        expiring.truncate(top.unwrap_or(self.config.summary_top_n));

        Ok(TenantComplianceSummary {
            tenant_id,
            generated_on: today,
            total_persons: scores.len(),
            status_counts: counts,
            cqc_ready_persons: scores.iter().filter(|s| s.score.cqc_ready).count(),
            average_score,
            unclassified_documents: scores.iter().map(|s| s.score.unclassified_documents).sum(),
            open_tasks: snapshot.open_tasks.values().map(Vec::len).sum(),
            total_expiring,
            expiring_items: expiring,
        })
    }

    /// Documents, right-to-work re-checks and mandatory training due
    /// within `within_days`, overdue items included, merged and sorted by
    /// days until expiry then severity.
    pub async fn list_expiring_items(
        &self,
        tenant_id: Uuid,
        within_days: i64,
    ) -> NovumResult<Vec<ExpiringItem>> {
        self.store.tenants().get_by_id(tenant_id).await?;
        let snapshot = Snapshot::load(self.store.as_ref(), tenant_id).await?;
        Ok(within_horizon(
            snapshot.dated_items(self.today(), &self.config.scoring),
            within_days,
        ))
    }

    /// Current documents of a person grouped into authority folders.
    pub async fn folders_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> NovumResult<Vec<ComplianceFolder>> {
        self.store.persons().get_by_id(tenant_id, person_id).await?;
        let documents = self
            .store
            .documents()
            .list_for_person(tenant_id, person_id)
            .await?;
        Ok(group_into_folders(&documents))
    }

    // -- Classification -----------------------------------------------

    pub fn classify(&self, input: &ClassificationInput) -> Classification {
        self.classifier.classify(input, self.today())
    }

    pub fn suggest_document_type(&self, file_name: &str) -> Option<TypeSuggestion> {
        self.classifier.suggest_from_file_name(file_name)
    }

    // -- Writes -------------------------------------------------------

    /// Store a new document for a person.
    ///
    /// Without an explicit type the classifier decides; a low-confidence
    /// result is stored as unclassified with the guess kept as a
    /// suggestion. A typed document supersedes the previous version and
    /// closes the person's open tasks for that type.
    pub async fn record_document(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
        upload: DocumentUpload,
    ) -> NovumResult<RecordedDocument> {
        let now = self.clock.now();

        // 1. Person must belong to the tenant.
        self.store.persons().get_by_id(tenant_id, person_id).await?;

        // 2. Classify, or validate the explicit type.
        if let Some(type_id) = upload.document_type_id.as_deref() {
            if taxonomy::lookup(type_id).is_none() {
                return Err(ComplianceError::UnknownDocumentType(type_id.to_string()).into());
            }
        }
        let classification = self.classify(&ClassificationInput {
            file_name: upload.file_name.clone(),
            content: upload.content.clone(),
            type_hint: upload.document_type_id.clone(),
        });

        // 3. Dates: explicit, then extracted, then derived from validity.
        let filed_type = match classification.disposition {
            Disposition::AutoFile => classification.document_type_id.clone(),
            Disposition::ManualReview => None,
        };
        let spec = filed_type.as_deref().and_then(taxonomy::lookup);
        let issue_date = upload.issue_date.or(classification.extracted.issue_date);
        let expiry_date = match spec {
            Some(spec) if !spec.has_expiry => None,
            _ => upload
                .expiry_date
                .or(classification.extracted.expiry_date)
                .or_else(|| {
                    let spec = spec?;
                    Some(issue_date? + Duration::days(i64::from(spec.default_validity_days?)))
                }),
        };

        // 4. Store.
        let document = self
            .store
            .documents()
            .create(CreateDocument {
                tenant_id,
                person_id,
                document_type_id: filed_type.clone(),
                suggested_type_id: match filed_type {
                    Some(_) => None,
                    None => classification.document_type_id.clone(),
                },
                file_name: upload.file_name,
                file_path: upload.file_path,
                issue_date,
                expiry_date,
                review_status: if filed_type.is_some() {
                    ReviewStatus::Uploaded
                } else {
                    ReviewStatus::Unclassified
                },
                confidence: Some(classification.confidence),
                metadata: Some(json!({
                    "extracted": classification.extracted,
                    "review_reasons": classification.review_reasons,
                    "suggestions": classification.suggestions,
                })),
            })
            .await?;

        // 5. A replacement closes the tasks raised for the old version.
        let closed_tasks = match filed_type.as_deref() {
            Some(type_id) => {
                self.store
                    .tasks()
                    .close_open_for_item(tenant_id, person_id, type_id, "replaced", now)
                    .await?
            }
            None => 0,
        };

        // 6. Audit.
        let action = if filed_type.is_some() {
            "document_uploaded"
        } else {
            "document_unclassified"
        };
        self.store
            .audit()
            .append(audit_entry(
                tenant_id,
                upload.actor_id,
                action,
                "compliance_document",
                document.id,
                json!({
                    "person_id": person_id,
                    "document_type_id": document.document_type_id,
                    "suggested_type_id": document.suggested_type_id,
                    "confidence": classification.confidence,
                    "version": document.version,
                    "closed_tasks": closed_tasks,
                }),
            ))
            .await?;

        info!(
            tenant_id = %tenant_id,
            person_id = %person_id,
            document_id = %document.id,
            document_type = document.document_type_id.as_deref().unwrap_or("unclassified"),
            confidence = classification.confidence,
            closed_tasks,
            "document recorded"
        );

        Ok(RecordedDocument {
            document,
            classification,
            closed_tasks,
        })
    }

    /// File an unclassified document under an explicit type.
    pub async fn resolve_unclassified(
        &self,
        tenant_id: Uuid,
        document_id: Uuid,
        document_type_id: &str,
        actor_id: Option<Uuid>,
    ) -> NovumResult<ComplianceDocument> {
        let now = self.clock.now();
        if taxonomy::lookup(document_type_id).is_none() {
            return Err(ComplianceError::UnknownDocumentType(document_type_id.to_string()).into());
        }

        let existing = self
            .store
            .documents()
            .get_by_id(tenant_id, document_id)
            .await?;
        if existing.review_status != ReviewStatus::Unclassified {
            return Err(ComplianceError::AlreadyClassified(document_id).into());
        }

        let document = self
            .store
            .documents()
            .file(tenant_id, document_id, document_type_id)
            .await?;
        let closed_tasks = self
            .store
            .tasks()
            .close_open_for_item(tenant_id, document.person_id, document_type_id, "replaced", now)
            .await?;

        self.store
            .audit()
            .append(audit_entry(
                tenant_id,
                actor_id,
                "document_classified",
                "compliance_document",
                document_id,
                json!({
                    "document_type_id": document_type_id,
                    "suggested_type_id": existing.suggested_type_id,
                    "version": document.version,
                    "closed_tasks": closed_tasks,
                }),
            ))
            .await?;

        info!(
            tenant_id = %tenant_id,
            document_id = %document_id,
            document_type = document_type_id,
            "unclassified document filed"
        );
        Ok(document)
    }

    pub async fn verify_document(
        &self,
        tenant_id: Uuid,
        document_id: Uuid,
        actor_id: Option<Uuid>,
        notes: Option<String>,
    ) -> NovumResult<ComplianceDocument> {
        self.review(tenant_id, document_id, ReviewStatus::Verified, actor_id, notes)
            .await
    }

    /// A rejected document stops counting toward compliance.
    pub async fn reject_document(
        &self,
        tenant_id: Uuid,
        document_id: Uuid,
        actor_id: Option<Uuid>,
        reason: String,
    ) -> NovumResult<ComplianceDocument> {
        if reason.trim().is_empty() {
            return Err(NovumError::validation(
                "a rejection reason is required",
            ));
        }
        self.review(
            tenant_id,
            document_id,
            ReviewStatus::Rejected,
            actor_id,
            Some(reason),
        )
        .await
    }

    async fn review(
        &self,
        tenant_id: Uuid,
        document_id: Uuid,
        status: ReviewStatus,
        actor_id: Option<Uuid>,
        notes: Option<String>,
    ) -> NovumResult<ComplianceDocument> {
        let existing = self
            .store
            .documents()
            .get_by_id(tenant_id, document_id)
            .await?;
        if existing.review_status == ReviewStatus::Unclassified {
            return Err(ComplianceError::NotClassified(document_id).into());
        }

        let document = self
            .store
            .documents()
            .review(
                tenant_id,
                document_id,
                ReviewDocument {
                    review_status: status,
                    review_notes: notes.clone(),
                },
                self.clock.now(),
            )
            .await?;

        self.store
            .audit()
            .append(audit_entry(
                tenant_id,
                actor_id,
                match status {
                    ReviewStatus::Rejected => "document_rejected",
                    _ => "document_verified",
                },
                "compliance_document",
                document_id,
                json!({ "previous_status": existing.review_status.as_str(), "notes": notes }),
            ))
            .await?;

        info!(
            tenant_id = %tenant_id,
            document_id = %document_id,
            status = status.as_str(),
            "document reviewed"
        );
        Ok(document)
    }

    /// Close an open task by hand.
    pub async fn complete_task(
        &self,
        tenant_id: Uuid,
        task_id: Uuid,
        actor_id: Option<Uuid>,
        reason: Option<String>,
    ) -> NovumResult<ComplianceTask> {
        let task = self.store.tasks().get_by_id(tenant_id, task_id).await?;
        if !task.is_open() {
            return Err(ComplianceError::TaskClosed(task_id).into());
        }

        let reason = reason.unwrap_or_else(|| "completed".to_string());
        let completed = self
            .store
            .tasks()
            .complete(tenant_id, task_id, Some(reason.clone()), self.clock.now())
            .await?;

        self.store
            .audit()
            .append(audit_entry(
                tenant_id,
                actor_id,
                "task_completed",
                "compliance_task",
                task_id,
                json!({ "person_id": task.person_id, "reason": reason }),
            ))
            .await?;

        info!(tenant_id = %tenant_id, task_id = %task_id, "task completed");
        Ok(completed)
    }

    /// Advance a person one stage. Every requirement of the current
    /// stage must be present, verified and unexpired.
    pub async fn progress_to_next_stage(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> NovumResult<Person> {
        let person = self.store.persons().get_by_id(tenant_id, person_id).await?;
        let next = person
            .stage
            .next()
            .ok_or(ComplianceError::FinalStage(person.stage))?;

        let documents = self
            .store
            .documents()
            .list_for_person(tenant_id, person_id)
            .await?;
        let training = self
            .store
            .training()
            .list_for_person(tenant_id, person_id)
            .await?;
        let outstanding = outstanding_requirements(&person, &documents, &training, self.today());
        if !outstanding.is_empty() {
            return Err(ComplianceError::StageIncomplete {
                stage: person.stage,
                outstanding,
            }
            .into());
        }

        advance_stage(self.store.as_ref(), &person, next, actor_id).await
    }
}
