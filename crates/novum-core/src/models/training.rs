//! Training record domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::add_months;
use crate::taxonomy::training_course;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    /// Catalogue course id (e.g., `fire_safety`).
    pub course_id: String,
    pub completed_on: NaiveDate,
    /// Explicit expiry; when absent it follows from the course's
    /// renewal period.
    pub expiry_date: Option<NaiveDate>,
    pub certificate_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TrainingRecord {
    pub fn effective_expiry(&self) -> Option<NaiveDate> {
        self.expiry_date.or_else(|| {
            training_course(&self.course_id)
                .map(|course| add_months(self.completed_on, course.renewal_months))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrainingRecord {
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    pub course_id: String,
    pub completed_on: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub certificate_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(course_id: &str, expiry_date: Option<NaiveDate>) -> TrainingRecord {
        TrainingRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            person_id: Uuid::new_v4(),
            course_id: course_id.into(),
            completed_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            expiry_date,
            certificate_ref: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expiry_derives_from_renewal_period() {
        let r = record("first_aid", None);
        assert_eq!(r.effective_expiry(), NaiveDate::from_ymd_opt(2027, 5, 1));
    }

    #[test]
    fn explicit_expiry_wins() {
        let explicit = NaiveDate::from_ymd_opt(2024, 12, 31);
        assert_eq!(record("fire_safety", explicit).effective_expiry(), explicit);
    }

    #[test]
    fn unknown_course_without_expiry_has_none() {
        assert_eq!(record("basket_weaving", None).effective_expiry(), None);
    }
}
