//! Static document taxonomy.
//!
//! Maps every compliance document type to its regulatory authority, the
//! lifecycle stages it applies to, and its validity rules. The registry is
//! immutable data; lookups never allocate and unknown ids yield `None`.

use serde::{Deserialize, Serialize};

use crate::expiry::Urgency;

/// Regulatory authority a document type answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    HomeOffice,
    Cqc,
    Shared,
    Internal,
}

impl Authority {
    pub const ALL: [Authority; 4] = [
        Authority::HomeOffice,
        Authority::Cqc,
        Authority::Shared,
        Authority::Internal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::HomeOffice => "home_office",
            Authority::Cqc => "cqc",
            Authority::Shared => "shared",
            Authority::Internal => "internal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

/// Employment lifecycle stage, in progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Application,
    PreEmployment,
    Onboarding,
    Ongoing,
    Offboarding,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Application,
        Stage::PreEmployment,
        Stage::Onboarding,
        Stage::Ongoing,
        Stage::Offboarding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Application => "application",
            Stage::PreEmployment => "pre_employment",
            Stage::Onboarding => "onboarding",
            Stage::Ongoing => "ongoing",
            Stage::Offboarding => "offboarding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    /// The stage a person progresses to. `Ongoing` is the last stage
    /// reachable by progression; offboarding is entered explicitly.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Application => Some(Stage::PreEmployment),
            Stage::PreEmployment => Some(Stage::Onboarding),
            Stage::Onboarding => Some(Stage::Ongoing),
            Stage::Ongoing | Stage::Offboarding => None,
        }
    }
}

/// Regulator-critical groups. A missing or expired item in either one
/// makes a person not CQC-ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalCategory {
    RightToWork,
    Dbs,
}

/// Where the evidence for a requirement comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    Documents,
    TrainingRecords,
}

/// One entry of the document registry.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentTypeSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub authority: Authority,
    pub stages: &'static [Stage],
    pub has_expiry: bool,
    /// Validity used to derive an expiry date from the issue date.
    pub default_validity_days: Option<u32>,
    pub weight: f64,
    pub verification_required: bool,
    pub accepted_formats: &'static [&'static str],
    pub max_size_mb: u32,
    pub critical: Option<CriticalCategory>,
    pub evidence: Evidence,
}

impl DocumentTypeSpec {
    /// Severity used to order expiring items and to seed task urgency
    /// for items that are missing rather than expiring.
    pub fn severity(&self) -> Urgency {
        if self.critical.is_some() {
            return Urgency::Critical;
        }
        match (self.evidence, self.authority) {
            (Evidence::TrainingRecords, _) => Urgency::Medium,
            (_, Authority::HomeOffice | Authority::Cqc) => Urgency::High,
            _ => Urgency::Low,
        }
    }

    pub fn applies_at(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn accepts_format(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.accepted_formats.iter().any(|f| *f == ext)
    }
}

const IMAGE_OR_PDF: &[&str] = &["pdf", "jpg", "jpeg", "png"];
const PDF_OR_WORD: &[&str] = &["pdf", "doc", "docx"];
const PDF_ONLY: &[&str] = &["pdf"];

const BASE: DocumentTypeSpec = DocumentTypeSpec {
    id: "",
    name: "",
    authority: Authority::Internal,
    stages: &[],
    has_expiry: false,
    default_validity_days: None,
    weight: 1.0,
    verification_required: true,
    accepted_formats: IMAGE_OR_PDF,
    max_size_mb: 10,
    critical: None,
    evidence: Evidence::Documents,
};

use Stage::{Application as App, Offboarding as Off, Onboarding as Onb, Ongoing as Ong, PreEmployment as Pre};

pub static DOCUMENT_TYPES: &[DocumentTypeSpec] = &[
    // Home Office
    DocumentTypeSpec {
        id: "rtw_passport",
        name: "Passport",
        authority: Authority::HomeOffice,
        stages: &[App, Pre],
        has_expiry: true,
        critical: Some(CriticalCategory::RightToWork),
        ..BASE
    },
    DocumentTypeSpec {
        id: "rtw_visa",
        name: "Visa / Immigration Status",
        authority: Authority::HomeOffice,
        stages: &[App, Pre, Ong],
        has_expiry: true,
        critical: Some(CriticalCategory::RightToWork),
        ..BASE
    },
    DocumentTypeSpec {
        id: "rtw_brp",
        name: "Biometric Residence Permit",
        authority: Authority::HomeOffice,
        stages: &[App, Pre, Ong],
        has_expiry: true,
        critical: Some(CriticalCategory::RightToWork),
        ..BASE
    },
    DocumentTypeSpec {
        id: "rtw_share_code",
        name: "Right to Work Share Code",
        authority: Authority::HomeOffice,
        stages: &[App, Pre],
        has_expiry: true,
        default_validity_days: Some(90),
        max_size_mb: 5,
        critical: Some(CriticalCategory::RightToWork),
        ..BASE
    },
    DocumentTypeSpec {
        id: "rtw_check_result",
        name: "Right to Work Check Result",
        authority: Authority::HomeOffice,
        stages: &[Pre],
        verification_required: false,
        accepted_formats: PDF_ONLY,
        max_size_mb: 5,
        critical: Some(CriticalCategory::RightToWork),
        ..BASE
    },
    DocumentTypeSpec {
        id: "national_insurance",
        name: "National Insurance Number",
        authority: Authority::HomeOffice,
        stages: &[Pre, Onb],
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "birth_certificate",
        name: "Birth Certificate",
        authority: Authority::HomeOffice,
        stages: &[App, Pre],
        ..BASE
    },
    // CQC
    DocumentTypeSpec {
        id: "dbs_certificate",
        name: "DBS Certificate (Enhanced)",
        authority: Authority::Cqc,
        stages: &[Pre, Ong],
        has_expiry: true,
        default_validity_days: Some(1095),
        critical: Some(CriticalCategory::Dbs),
        ..BASE
    },
    DocumentTypeSpec {
        id: "dbs_update_service",
        name: "DBS Update Service Registration",
        authority: Authority::Cqc,
        stages: &[Pre, Ong],
        has_expiry: true,
        default_validity_days: Some(365),
        max_size_mb: 5,
        critical: Some(CriticalCategory::Dbs),
        ..BASE
    },
    DocumentTypeSpec {
        id: "care_certificate",
        name: "Care Certificate",
        authority: Authority::Cqc,
        stages: &[Pre, Onb],
        ..BASE
    },
    DocumentTypeSpec {
        id: "nvq_qualification",
        name: "NVQ / QCF Qualification",
        authority: Authority::Cqc,
        stages: &[App, Ong],
        ..BASE
    },
    DocumentTypeSpec {
        id: "mandatory_training",
        name: "Mandatory Training",
        authority: Authority::Cqc,
        stages: &[Onb, Ong],
        has_expiry: true,
        default_validity_days: Some(365),
        max_size_mb: 20,
        evidence: Evidence::TrainingRecords,
        ..BASE
    },
    DocumentTypeSpec {
        id: "health_declaration",
        name: "Health Declaration",
        authority: Authority::Cqc,
        stages: &[Pre],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "occupational_health",
        name: "Occupational Health Clearance",
        authority: Authority::Cqc,
        stages: &[Pre],
        ..BASE
    },
    DocumentTypeSpec {
        id: "immunization_records",
        name: "Immunisation Records",
        authority: Authority::Cqc,
        stages: &[Pre, Ong],
        has_expiry: true,
        default_validity_days: Some(1095),
        ..BASE
    },
    DocumentTypeSpec {
        id: "nmc_pin",
        name: "NMC PIN Registration",
        authority: Authority::Cqc,
        stages: &[App, Pre, Ong],
        has_expiry: true,
        default_validity_days: Some(365),
        max_size_mb: 5,
        ..BASE
    },
    // Shared
    DocumentTypeSpec {
        id: "photo_id",
        name: "Photo Identification",
        authority: Authority::Shared,
        stages: &[App, Pre],
        has_expiry: true,
        ..BASE
    },
    DocumentTypeSpec {
        id: "proof_of_address",
        name: "Proof of Address",
        authority: Authority::Shared,
        stages: &[App, Pre],
        has_expiry: true,
        default_validity_days: Some(90),
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "employment_references",
        name: "Employment References",
        authority: Authority::Shared,
        stages: &[Pre],
        ..BASE
    },
    DocumentTypeSpec {
        id: "cv_resume",
        name: "CV / Resume",
        authority: Authority::Shared,
        stages: &[App],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "gaps_explanation",
        name: "Employment Gaps Explanation",
        authority: Authority::Shared,
        stages: &[Pre],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "signed_contract",
        name: "Signed Employment Contract",
        authority: Authority::Shared,
        stages: &[Pre, Onb],
        accepted_formats: PDF_ONLY,
        ..BASE
    },
    DocumentTypeSpec {
        id: "policy_acknowledgements",
        name: "Policy Acknowledgements",
        authority: Authority::Shared,
        stages: &[Onb],
        verification_required: false,
        accepted_formats: PDF_ONLY,
        ..BASE
    },
    // Internal
    DocumentTypeSpec {
        id: "application_form",
        name: "Application Form",
        stages: &[App],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "interview_notes",
        name: "Interview Notes",
        stages: &[App],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "offer_letter",
        name: "Offer Letter",
        stages: &[Pre],
        verification_required: false,
        accepted_formats: PDF_ONLY,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "payroll_details",
        name: "Payroll & Bank Details",
        stages: &[Onb],
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "emergency_contacts",
        name: "Emergency Contacts",
        stages: &[Onb],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 2,
        ..BASE
    },
    DocumentTypeSpec {
        id: "performance_reviews",
        name: "Performance Reviews",
        stages: &[Ong],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        ..BASE
    },
    DocumentTypeSpec {
        id: "disciplinary_records",
        name: "Disciplinary Records",
        stages: &[Ong],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        ..BASE
    },
    DocumentTypeSpec {
        id: "resignation_letter",
        name: "Resignation Letter",
        stages: &[Off],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
    DocumentTypeSpec {
        id: "exit_interview",
        name: "Exit Interview",
        stages: &[Off],
        verification_required: false,
        accepted_formats: PDF_OR_WORD,
        max_size_mb: 5,
        ..BASE
    },
];

/// Look up a document type by id.
pub fn lookup(id: &str) -> Option<&'static DocumentTypeSpec> {
    DOCUMENT_TYPES.iter().find(|d| d.id == id)
}

pub fn by_authority(authority: Authority) -> impl Iterator<Item = &'static DocumentTypeSpec> {
    DOCUMENT_TYPES.iter().filter(move |d| d.authority == authority)
}

// -----------------------------------------------------------------------
// Stage requirements
// -----------------------------------------------------------------------

/// When a conditional document becomes required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Holder is neither British nor Irish.
    NonUkNational,
    /// Holder's role requires NMC registration.
    RequiresNmc,
    /// Requested case by case; never required automatically.
    OnRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageRequirements {
    pub stage: Stage,
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub conditional: &'static [(&'static str, Condition)],
}

pub static STAGE_REQUIREMENTS: &[StageRequirements] = &[
    StageRequirements {
        stage: App,
        name: "Application Stage",
        required: &["cv_resume", "photo_id", "application_form"],
        optional: &["nvq_qualification", "nmc_pin", "rtw_passport", "birth_certificate"],
        conditional: &[],
    },
    StageRequirements {
        stage: Pre,
        name: "Pre-Employment Stage",
        required: &[
            "rtw_passport",
            "rtw_check_result",
            "national_insurance",
            "dbs_certificate",
            "health_declaration",
            "employment_references",
            "proof_of_address",
            "signed_contract",
            "offer_letter",
        ],
        optional: &[],
        conditional: &[
            ("rtw_visa", Condition::NonUkNational),
            ("rtw_share_code", Condition::NonUkNational),
            ("rtw_brp", Condition::OnRequest),
            ("occupational_health", Condition::OnRequest),
            ("gaps_explanation", Condition::OnRequest),
            ("nmc_pin", Condition::RequiresNmc),
        ],
    },
    StageRequirements {
        stage: Onb,
        name: "Onboarding Stage",
        required: &[
            "care_certificate",
            "mandatory_training",
            "immunization_records",
            "policy_acknowledgements",
            "payroll_details",
            "emergency_contacts",
        ],
        optional: &["dbs_update_service"],
        conditional: &[],
    },
    StageRequirements {
        stage: Ong,
        name: "Ongoing Employment",
        required: &["dbs_certificate", "mandatory_training", "immunization_records"],
        optional: &["dbs_update_service", "performance_reviews", "disciplinary_records"],
        conditional: &[
            ("rtw_visa", Condition::NonUkNational),
            ("rtw_brp", Condition::OnRequest),
            ("nmc_pin", Condition::RequiresNmc),
        ],
    },
    StageRequirements {
        stage: Off,
        name: "Offboarding Stage",
        required: &["resignation_letter"],
        optional: &["exit_interview"],
        conditional: &[],
    },
];

pub fn stage_requirements(stage: Stage) -> &'static StageRequirements {
    // Every stage has exactly one entry, in declaration order.
    &STAGE_REQUIREMENTS[stage as usize]
}

/// Person attributes that switch conditional documents on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applicability {
    pub non_uk_national: bool,
    pub requires_nmc: bool,
}

impl Applicability {
    /// An unknown nationality is treated as British/Irish: the visa and
    /// share code requirements only switch on for a recorded foreign
    /// nationality.
    pub fn for_person(nationality: Option<&str>, requires_nmc: bool) -> Self {
        Self {
            non_uk_national: nationality.is_some_and(|n| !is_uk_or_irish(n)),
            requires_nmc,
        }
    }

    fn satisfies(&self, condition: Condition) -> bool {
        match condition {
            Condition::NonUkNational => self.non_uk_national,
            Condition::RequiresNmc => self.requires_nmc,
            Condition::OnRequest => false,
        }
    }
}

pub fn is_uk_or_irish(nationality: &str) -> bool {
    const UK_OR_IRISH: &[&str] = &[
        "british",
        "irish",
        "uk",
        "gb",
        "united kingdom",
        "great britain",
        "ireland",
        "republic of ireland",
        "english",
        "scottish",
        "welsh",
        "northern irish",
    ];
    let n = nationality.trim().to_ascii_lowercase();
    UK_OR_IRISH.contains(&n.as_str())
}

/// Document types required of a person at `stage`, conditional entries
/// included when `applicability` switches them on.
pub fn required_documents(
    stage: Stage,
    applicability: Applicability,
) -> Vec<&'static DocumentTypeSpec> {
    let reqs = stage_requirements(stage);
    let conditional = reqs
        .conditional
        .iter()
        .filter(|(_, cond)| applicability.satisfies(*cond))
        .map(|(id, _)| *id);

    reqs.required
        .iter()
        .copied()
        .chain(conditional)
        .filter_map(lookup)
        .collect()
}

// -----------------------------------------------------------------------
// Training catalogue
// -----------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TrainingCourse {
    pub id: &'static str,
    pub name: &'static str,
    pub renewal_months: u32,
    pub mandatory: bool,
}

const fn course(id: &'static str, name: &'static str, renewal_months: u32, mandatory: bool) -> TrainingCourse {
    TrainingCourse {
        id,
        name,
        renewal_months,
        mandatory,
    }
}

pub static TRAINING_COURSES: &[TrainingCourse] = &[
    course("safeguarding_adults", "Safeguarding Adults", 12, true),
    course("safeguarding_children", "Safeguarding Children", 12, false),
    course("health_safety", "Health & Safety", 12, true),
    course("fire_safety", "Fire Safety", 12, true),
    course("first_aid", "First Aid", 36, true),
    course("manual_handling", "Manual Handling", 12, true),
    course("medication_admin", "Medication Administration", 12, false),
    course("infection_control", "Infection Control", 12, true),
    course("mental_capacity", "Mental Capacity Act", 12, false),
    course("deprivation_liberty", "DoLS", 12, false),
    course("food_hygiene", "Food Hygiene", 36, false),
    course("gdpr_data", "GDPR & Data Protection", 12, true),
    course("equality_diversity", "Equality & Diversity", 24, false),
    course("dementia_awareness", "Dementia Awareness", 12, false),
    course("end_of_life", "End of Life Care", 24, false),
];

pub fn training_course(id: &str) -> Option<&'static TrainingCourse> {
    TRAINING_COURSES.iter().find(|c| c.id == id)
}

pub fn mandatory_courses() -> impl Iterator<Item = &'static TrainingCourse> {
    TRAINING_COURSES.iter().filter(|c| c.mandatory)
}

// -----------------------------------------------------------------------
// Folder structure
// -----------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SubfolderSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub documents: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderSpec {
    pub authority: Authority,
    pub name: &'static str,
    pub subfolders: &'static [SubfolderSpec],
}

const fn sub(id: &'static str, name: &'static str, documents: &'static [&'static str]) -> SubfolderSpec {
    SubfolderSpec { id, name, documents }
}

pub static FOLDER_STRUCTURE: &[FolderSpec] = &[
    FolderSpec {
        authority: Authority::HomeOffice,
        name: "Home Office Compliance",
        subfolders: &[
            sub(
                "right_to_work",
                "Right to Work",
                &[
                    "rtw_passport",
                    "rtw_visa",
                    "rtw_brp",
                    "rtw_share_code",
                    "rtw_check_result",
                    "birth_certificate",
                ],
            ),
            sub("identity", "Identity Documents", &["national_insurance"]),
            sub(
                "sponsor_compliance",
                "Sponsor Compliance",
                &["signed_contract", "policy_acknowledgements"],
            ),
        ],
    },
    FolderSpec {
        authority: Authority::Cqc,
        name: "CQC Compliance",
        subfolders: &[
            sub(
                "dbs_safeguarding",
                "DBS & Safeguarding",
                &["dbs_certificate", "dbs_update_service"],
            ),
            sub(
                "qualifications",
                "Qualifications",
                &["care_certificate", "nvq_qualification", "nmc_pin"],
            ),
            sub("mandatory_training", "Mandatory Training", &["mandatory_training"]),
            sub(
                "health_fitness",
                "Health & Fitness",
                &["health_declaration", "occupational_health", "immunization_records"],
            ),
        ],
    },
    FolderSpec {
        authority: Authority::Shared,
        name: "Shared Compliance",
        subfolders: &[
            sub(
                "identity_verification",
                "Identity & Verification",
                &["photo_id", "proof_of_address"],
            ),
            sub(
                "references",
                "References & History",
                &["employment_references", "cv_resume", "gaps_explanation"],
            ),
            sub(
                "contracts",
                "Contracts & Policies",
                &["signed_contract", "policy_acknowledgements"],
            ),
        ],
    },
    FolderSpec {
        authority: Authority::Internal,
        name: "Internal HR Documents",
        subfolders: &[
            sub(
                "recruitment",
                "Recruitment",
                &["application_form", "interview_notes", "offer_letter"],
            ),
            sub("onboarding", "Onboarding", &["payroll_details", "emergency_contacts"]),
            sub(
                "employment",
                "Employment Records",
                &["performance_reviews", "disciplinary_records"],
            ),
            sub("offboarding", "Offboarding", &["resignation_letter", "exit_interview"]),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        let dbs = lookup("dbs_certificate").unwrap();
        assert_eq!(dbs.authority, Authority::Cqc);
        assert_eq!(dbs.critical, Some(CriticalCategory::Dbs));
        assert_eq!(dbs.default_validity_days, Some(1095));
        assert!(lookup("not_a_document").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = DOCUMENT_TYPES.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn stage_requirements_are_indexed_by_stage() {
        for stage in Stage::ALL {
            assert_eq!(stage_requirements(stage).stage, stage);
        }
    }

    #[test]
    fn every_referenced_document_exists() {
        for reqs in STAGE_REQUIREMENTS {
            let conditional = reqs.conditional.iter().map(|(id, _)| id);
            for id in reqs.required.iter().chain(reqs.optional).chain(conditional) {
                assert!(lookup(id).is_some(), "{id} missing from registry");
            }
        }
        for folder in FOLDER_STRUCTURE {
            for sub in folder.subfolders {
                for id in sub.documents {
                    assert!(lookup(id).is_some(), "{id} missing from registry");
                }
            }
        }
    }

    #[test]
    fn conditional_documents_follow_applicability() {
        let british = Applicability::for_person(Some("British"), false);
        let ids: Vec<_> = required_documents(Stage::PreEmployment, british)
            .iter()
            .map(|d| d.id)
            .collect();
        assert!(!ids.contains(&"rtw_visa"));
        assert!(!ids.contains(&"nmc_pin"));

        let foreign_nurse = Applicability::for_person(Some("Indian"), true);
        let ids: Vec<_> = required_documents(Stage::PreEmployment, foreign_nurse)
            .iter()
            .map(|d| d.id)
            .collect();
        assert!(ids.contains(&"rtw_visa"));
        assert!(ids.contains(&"rtw_share_code"));
        assert!(ids.contains(&"nmc_pin"));
        assert!(!ids.contains(&"occupational_health"));
    }

    #[test]
    fn unknown_nationality_is_not_foreign() {
        assert!(!Applicability::for_person(None, false).non_uk_national);
        assert!(is_uk_or_irish(" Irish "));
        assert!(!is_uk_or_irish("Polish"));
    }

    #[test]
    fn stage_progression_order() {
        assert_eq!(Stage::Application.next(), Some(Stage::PreEmployment));
        assert_eq!(Stage::Onboarding.next(), Some(Stage::Ongoing));
        assert_eq!(Stage::Ongoing.next(), None);
        assert_eq!(Stage::Offboarding.next(), None);
    }

    #[test]
    fn severity_tiers() {
        assert_eq!(lookup("rtw_visa").unwrap().severity(), Urgency::Critical);
        assert_eq!(lookup("nmc_pin").unwrap().severity(), Urgency::High);
        assert_eq!(lookup("mandatory_training").unwrap().severity(), Urgency::Medium);
        assert_eq!(lookup("photo_id").unwrap().severity(), Urgency::Low);
    }

    #[test]
    fn mandatory_courses_nonempty() {
        assert!(mandatory_courses().count() > 0);
        assert_eq!(training_course("first_aid").unwrap().renewal_months, 36);
    }

    #[test]
    fn parse_round_trips_names() {
        for stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        for a in Authority::ALL {
            assert_eq!(Authority::parse(a.as_str()), Some(a));
        }
    }
}
