//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories take
//! a `tenant_id` on every call and filter on it; an id that belongs to
//! another tenant is reported as not found.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::NovumResult;
use crate::expiry::{ExpiryStatus, ItemSource, Urgency};
use crate::models::{
    audit::{AuditLogEntry, AuditLogFilter, CreateAuditLogEntry},
    document::{ComplianceDocument, CreateDocument, ReviewDocument},
    notification::{CreateNotification, Notification},
    person::{CreatePerson, Person, UpdatePerson},
    right_to_work::{CreateRightToWorkCheck, RightToWorkCheck},
    task::{ComplianceTask, CreateTask, TaskType},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    training::{CreateTrainingRecord, TrainingRecord},
    user_profile::{CreateUserProfile, StaffRole, UserProfile},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = NovumResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NovumResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = NovumResult<Tenant>> + Send;
    /// Active tenants, oldest first.
    fn list_active(&self) -> impl Future<Output = NovumResult<Vec<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait PersonRepository: Send + Sync {
    fn create(&self, input: CreatePerson) -> impl Future<Output = NovumResult<Person>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = NovumResult<Person>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdatePerson,
    ) -> impl Future<Output = NovumResult<Person>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = NovumResult<PaginatedResult<Person>>> + Send;
    /// Every person in the tenant, ordered by last name then first name.
    fn list_all(&self, tenant_id: Uuid) -> impl Future<Output = NovumResult<Vec<Person>>> + Send;
}

pub trait DocumentRepository: Send + Sync {
    /// Store a document. When it carries a type, the previous current
    /// version of that (person, type) is superseded and the new row gets
    /// the next version number.
    fn create(
        &self,
        input: CreateDocument,
    ) -> impl Future<Output = NovumResult<ComplianceDocument>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = NovumResult<ComplianceDocument>> + Send;
    /// All versions for a person, newest first.
    fn list_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<ComplianceDocument>>> + Send;
    /// Current documents across the tenant.
    fn list_current(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<ComplianceDocument>>> + Send;
    /// File an unclassified document under `document_type_id`, with the
    /// same supersede rule as [`DocumentRepository::create`].
    fn file(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        document_type_id: &str,
    ) -> impl Future<Output = NovumResult<ComplianceDocument>> + Send;
    fn review(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: ReviewDocument,
        at: DateTime<Utc>,
    ) -> impl Future<Output = NovumResult<ComplianceDocument>> + Send;
    fn set_expiry_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: ExpiryStatus,
    ) -> impl Future<Output = NovumResult<()>> + Send;
}

pub trait TrainingRepository: Send + Sync {
    fn create(
        &self,
        input: CreateTrainingRecord,
    ) -> impl Future<Output = NovumResult<TrainingRecord>> + Send;
    fn list_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<TrainingRecord>>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<TrainingRecord>>> + Send;
}

pub trait RightToWorkRepository: Send + Sync {
    fn create(
        &self,
        input: CreateRightToWorkCheck,
    ) -> impl Future<Output = NovumResult<RightToWorkCheck>> + Send;
    fn list_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<RightToWorkCheck>>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<RightToWorkCheck>>> + Send;
}

pub trait TaskRepository: Send + Sync {
    fn create(&self, input: CreateTask) -> impl Future<Output = NovumResult<ComplianceTask>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = NovumResult<ComplianceTask>> + Send;
    /// The open task raised for a source item, if any.
    fn find_open_by_source(
        &self,
        tenant_id: Uuid,
        source: ItemSource,
        source_id: Uuid,
    ) -> impl Future<Output = NovumResult<Option<ComplianceTask>>> + Send;
    fn list_open(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<ComplianceTask>>> + Send;
    fn list_open_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<ComplianceTask>>> + Send;
    /// Change type and urgency of an open task without counting it as an
    /// escalation (e.g. expiring becomes expired).
    fn retier(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        task_type: TaskType,
        urgency: Urgency,
    ) -> impl Future<Output = NovumResult<ComplianceTask>> + Send;
    /// Raise urgency, bump the escalation level, and restart the SLA clock.
    fn escalate(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        urgency: Urgency,
        at: DateTime<Utc>,
    ) -> impl Future<Output = NovumResult<ComplianceTask>> + Send;
    fn complete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> impl Future<Output = NovumResult<ComplianceTask>> + Send;
    /// Close every open task of a person for an item type. Returns the
    /// number of tasks closed.
    fn close_open_for_item(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
        item_type: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = NovumResult<u64>> + Send;
}

pub trait NotificationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateNotification,
    ) -> impl Future<Output = NovumResult<Notification>> + Send;
    /// Newest first.
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = NovumResult<Vec<Notification>>> + Send;
}

pub trait UserProfileRepository: Send + Sync {
    fn create(
        &self,
        input: CreateUserProfile,
    ) -> impl Future<Output = NovumResult<UserProfile>> + Send;
    fn list_by_roles(
        &self,
        tenant_id: Uuid,
        roles: &[StaffRole],
    ) -> impl Future<Output = NovumResult<Vec<UserProfile>>> + Send;
}

pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit log entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditLogEntry,
    ) -> impl Future<Output = NovumResult<AuditLogEntry>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> impl Future<Output = NovumResult<PaginatedResult<AuditLogEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// Store bundle
// ---------------------------------------------------------------------------

/// One handle to every repository, so services take a single generic
/// parameter instead of one per table.
pub trait ComplianceStore: Send + Sync + 'static {
    type Tenants: TenantRepository;
    type Persons: PersonRepository;
    type Documents: DocumentRepository;
    type Training: TrainingRepository;
    type RightToWork: RightToWorkRepository;
    type Tasks: TaskRepository;
    type Notifications: NotificationRepository;
    type Profiles: UserProfileRepository;
    type Audit: AuditLogRepository;

    fn tenants(&self) -> &Self::Tenants;
    fn persons(&self) -> &Self::Persons;
    fn documents(&self) -> &Self::Documents;
    fn training(&self) -> &Self::Training;
    fn right_to_work(&self) -> &Self::RightToWork;
    fn tasks(&self) -> &Self::Tasks;
    fn notifications(&self) -> &Self::Notifications;
    fn profiles(&self) -> &Self::Profiles;
    fn audit(&self) -> &Self::Audit;
}
