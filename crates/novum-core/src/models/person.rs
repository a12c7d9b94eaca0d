//! Person domain model (applicant, candidate, or employee).
//!
//! Compliance status is never stored on the person; it is recomputed
//! from documents, training, checks and tasks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::taxonomy::{Applicability, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Applicant,
    Candidate,
    NewHire,
    Employee,
    FormerEmployee,
}

impl PersonType {
    /// The person type implied by a lifecycle stage.
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Application => PersonType::Applicant,
            Stage::PreEmployment => PersonType::Candidate,
            Stage::Onboarding => PersonType::NewHire,
            Stage::Ongoing => PersonType::Employee,
            Stage::Offboarding => PersonType::FormerEmployee,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonType::Applicant => "applicant",
            PersonType::Candidate => "candidate",
            PersonType::NewHire => "new_hire",
            PersonType::Employee => "employee",
            PersonType::FormerEmployee => "former_employee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applicant" => Some(PersonType::Applicant),
            "candidate" => Some(PersonType::Candidate),
            "new_hire" => Some(PersonType::NewHire),
            "employee" => Some(PersonType::Employee),
            "former_employee" => Some(PersonType::FormerEmployee),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub person_type: PersonType,
    pub stage: Stage,
    pub nationality: Option<String>,
    /// Role requires Nursing & Midwifery Council registration.
    pub requires_nmc: bool,
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn applicability(&self) -> Applicability {
        Applicability::for_person(self.nationality.as_deref(), self.requires_nmc)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePerson {
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub job_title: Option<String>,
    /// Defaults to [`Stage::Application`].
    pub stage: Option<Stage>,
    pub nationality: Option<String>,
    pub requires_nmc: bool,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePerson {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub job_title: Option<String>,
    /// Setting the stage also sets the matching person type.
    pub stage: Option<Stage>,
    pub nationality: Option<String>,
    pub requires_nmc: Option<bool>,
    pub start_date: Option<NaiveDate>,
}
