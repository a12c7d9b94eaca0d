//! [`ComplianceStore`] backed by a single SurrealDB handle.

use novum_core::repository::ComplianceStore;
use surrealdb::{Connection, Surreal};

use crate::repository::{
    SurrealAuditLogRepository, SurrealDocumentRepository, SurrealNotificationRepository,
    SurrealPersonRepository, SurrealRightToWorkRepository, SurrealTaskRepository,
    SurrealTenantRepository, SurrealTrainingRepository, SurrealUserProfileRepository,
};

/// Every repository over one shared connection.
#[derive(Clone)]
pub struct SurrealStore<C: Connection> {
    tenants: SurrealTenantRepository<C>,
    persons: SurrealPersonRepository<C>,
    documents: SurrealDocumentRepository<C>,
    training: SurrealTrainingRepository<C>,
    right_to_work: SurrealRightToWorkRepository<C>,
    tasks: SurrealTaskRepository<C>,
    notifications: SurrealNotificationRepository<C>,
    profiles: SurrealUserProfileRepository<C>,
    audit: SurrealAuditLogRepository<C>,
}

impl<C: Connection> SurrealStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            tenants: SurrealTenantRepository::new(db.clone()),
            persons: SurrealPersonRepository::new(db.clone()),
            documents: SurrealDocumentRepository::new(db.clone()),
            training: SurrealTrainingRepository::new(db.clone()),
            right_to_work: SurrealRightToWorkRepository::new(db.clone()),
            tasks: SurrealTaskRepository::new(db.clone()),
            notifications: SurrealNotificationRepository::new(db.clone()),
            profiles: SurrealUserProfileRepository::new(db.clone()),
            audit: SurrealAuditLogRepository::new(db),
        }
    }
}

impl<C: Connection> ComplianceStore for SurrealStore<C> {
    type Tenants = SurrealTenantRepository<C>;
    type Persons = SurrealPersonRepository<C>;
    type Documents = SurrealDocumentRepository<C>;
    type Training = SurrealTrainingRepository<C>;
    type RightToWork = SurrealRightToWorkRepository<C>;
    type Tasks = SurrealTaskRepository<C>;
    type Notifications = SurrealNotificationRepository<C>;
    type Profiles = SurrealUserProfileRepository<C>;
    type Audit = SurrealAuditLogRepository<C>;

    fn tenants(&self) -> &Self::Tenants {
        &self.tenants
    }

    fn persons(&self) -> &Self::Persons {
        &self.persons
    }

    fn documents(&self) -> &Self::Documents {
        &self.documents
    }

    fn training(&self) -> &Self::Training {
        &self.training
    }

    fn right_to_work(&self) -> &Self::RightToWork {
        &self.right_to_work
    }

    fn tasks(&self) -> &Self::Tasks {
        &self.tasks
    }

    fn notifications(&self) -> &Self::Notifications {
        &self.notifications
    }

    fn profiles(&self) -> &Self::Profiles {
        &self.profiles
    }

    fn audit(&self) -> &Self::Audit {
        &self.audit
    }
}
