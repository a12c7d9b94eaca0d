//! Document classification.
//!
//! Scores an upload against a keyword/regex pattern set per document
//! type, extracts the fields a reviewer needs (dates, numbers, names),
//! and decides whether the document can be filed automatically. Low
//! confidence never files silently: it yields [`Disposition::ManualReview`]
//! and the document is stored as unclassified, which is distinct from
//! missing.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use novum_core::expiry::days_until_expiry;
use novum_core::taxonomy::{self, Authority};

use crate::error::ComplianceError;

// -----------------------------------------------------------------------
// Public types
// -----------------------------------------------------------------------

/// What the classifier is given. File bytes never reach this layer; only
/// the name, any extracted text, and an optional explicit type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationInput {
    pub file_name: String,
    #[serde(default)]
    pub content: Option<String>,
    /// A document type id chosen by the uploader.
    #[serde(default)]
    pub type_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    AutoFile,
    ManualReview,
}

/// Fields pulled out of the document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub document_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub dbs_level: Option<String>,
    pub training_course: Option<String>,
    pub training_provider: Option<String>,
    pub qualification_level: Option<String>,
    pub visa_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// `None` when nothing matched at all.
    pub document_type_id: Option<String>,
    pub document_type_name: Option<String>,
    pub authority: Option<Authority>,
    /// 0 ..= 100
    pub confidence: u8,
    pub disposition: Disposition,
    pub extracted: ExtractedFields,
    /// Points a reviewer should check. Informational when auto-filed.
    pub review_reasons: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Quick guess from the file name alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSuggestion {
    pub type_id: String,
    pub type_name: String,
    pub confidence: u8,
}

// -----------------------------------------------------------------------
// Pattern table
// -----------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FullName,
    DocumentNumber,
    DateOfBirth,
    ExpiryDate,
    IssueDate,
    Nationality,
    VisaType,
    DbsLevel,
    TrainingCourse,
    TrainingProvider,
    QualificationLevel,
}

impl Field {
    fn as_str(&self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::DocumentNumber => "document_number",
            Field::DateOfBirth => "date_of_birth",
            Field::ExpiryDate => "expiry_date",
            Field::IssueDate => "issue_date",
            Field::Nationality => "nationality",
            Field::VisaType => "visa_type",
            Field::DbsLevel => "dbs_level",
            Field::TrainingCourse => "training_course",
            Field::TrainingProvider => "training_provider",
            Field::QualificationLevel => "qualification_level",
        }
    }

    fn present(&self, fields: &ExtractedFields) -> bool {
        match self {
            Field::FullName => fields.full_name.is_some(),
            Field::DocumentNumber => fields.document_number.is_some(),
            Field::DateOfBirth => fields.date_of_birth.is_some(),
            Field::ExpiryDate => fields.expiry_date.is_some(),
            Field::IssueDate => fields.issue_date.is_some(),
            Field::Nationality => fields.nationality.is_some(),
            Field::VisaType => fields.visa_type.is_some(),
            Field::DbsLevel => fields.dbs_level.is_some(),
            Field::TrainingCourse => fields.training_course.is_some(),
            Field::TrainingProvider => fields.training_provider.is_some(),
            Field::QualificationLevel => fields.qualification_level.is_some(),
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            Field::ExpiryDate => Some("Please ensure the expiry date is clearly visible"),
            Field::DocumentNumber => {
                Some("Ensure the document number is visible and not obscured")
            }
            Field::FullName => Some("The full name should be clearly visible"),
            _ => None,
        }
    }
}

struct PatternDef {
    type_id: &'static str,
    patterns: &'static [&'static str],
    keywords: &'static [&'static str],
    required: &'static [Field],
    /// Label preceding the expiry date, e.g. `expiry` or `valid until`.
    expiry_label: Option<&'static str>,
    /// Full regex whose first group is the document number.
    number: Option<&'static str>,
}

/// A day-month-year date in any of the supported spellings.
const DATE: &str =
    r"(\d{1,2}[\s/\-][a-z]{3,9}[\s/\-]\d{4}|\d{1,2}[\s/\-]\d{1,2}[\s/\-]\d{4}|\d{4}-\d{2}-\d{2})";

use Field::*;

static PATTERN_DEFS: &[PatternDef] = &[
    PatternDef {
        type_id: "rtw_passport",
        patterns: &[
            r"passport",
            r"travel\s*document",
            r"nationality.*british|british.*nationality",
        ],
        keywords: &[
            "passport",
            "travel document",
            "nationality",
            "place of birth",
            "date of issue",
            "date of expiry",
        ],
        required: &[FullName, DocumentNumber, DateOfBirth, ExpiryDate, Nationality],
        expiry_label: Some(r"(?:date\s*of\s*)?expiry"),
        number: Some(r"passport\s*(?:no\.?|number)[:\s]*([a-z0-9]{9})"),
    },
    PatternDef {
        type_id: "rtw_visa",
        patterns: &[
            r"visa",
            r"entry\s*clearance",
            r"leave\s*to\s*(?:enter|remain)",
            r"immigration.*status",
        ],
        keywords: &[
            "visa",
            "entry clearance",
            "leave to remain",
            "work permit",
            "skilled worker",
            "tier 2",
        ],
        required: &[VisaType, ExpiryDate],
        expiry_label: Some(r"valid\s*(?:until|to)|expir(?:y|es|ed)"),
        number: None,
    },
    PatternDef {
        type_id: "rtw_brp",
        patterns: &[
            r"biometric\s*residence\s*permit",
            r"\bbrp\b",
            r"residence\s*permit",
        ],
        keywords: &["biometric residence permit", "brp", "immigration", "home office"],
        required: &[DocumentNumber, ExpiryDate],
        expiry_label: Some(r"expiry"),
        number: Some(r"(?:brp|permit)\s*(?:no\.?|number)[:\s]*([a-z]{2}\d{7})"),
    },
    PatternDef {
        type_id: "rtw_share_code",
        patterns: &[
            r"share\s*code",
            r"right\s*to\s*work\s*share\s*code",
            r"gov\.uk.*share.*code",
        ],
        keywords: &["share code", "right to work", "immigration status", "view your status"],
        required: &[DocumentNumber, ExpiryDate],
        expiry_label: Some(r"valid\s*(?:until|to)|expir(?:y|es|ed)"),
        number: Some(r"share\s*code[:\s]*([a-z0-9]{9})"),
    },
    PatternDef {
        type_id: "national_insurance",
        patterns: &[
            r"national\s*insurance",
            r"\bni\s*number",
            r"hmrc.*national\s*insurance",
        ],
        keywords: &["national insurance", "ni number", "hmrc", "insurance number"],
        required: &[DocumentNumber],
        expiry_label: None,
        number: Some(r"(?:\bni|national\s*insurance)\s*(?:no\.?|number)?[:\s]*([a-z]{2}\d{6}[a-z])"),
    },
    PatternDef {
        type_id: "birth_certificate",
        patterns: &[
            r"birth\s*certificate",
            r"certified\s*copy.*birth",
            r"register\s*of\s*births",
        ],
        keywords: &["birth certificate", "register of births", "registration district"],
        required: &[FullName, DateOfBirth],
        expiry_label: None,
        number: None,
    },
    PatternDef {
        type_id: "dbs_certificate",
        patterns: &[
            r"\bdbs\b",
            r"disclosure.*barring",
            r"enhanced\s*(?:dbs|disclosure)",
            r"police\s*check",
        ],
        keywords: &[
            "dbs",
            "disclosure and barring",
            "enhanced check",
            "barred list",
            "police check",
        ],
        required: &[DocumentNumber, IssueDate, DbsLevel],
        expiry_label: None,
        number: Some(r"(?:dbs|certificate)\s*(?:no\.?|number)[:\s]*(\d{12})"),
    },
    PatternDef {
        type_id: "dbs_update_service",
        patterns: &[r"update\s*service", r"dbs\s*update", r"subscription.*dbs"],
        keywords: &["update service", "dbs online", "subscription", "annual fee"],
        required: &[DocumentNumber, ExpiryDate],
        expiry_label: Some(r"renewal|expir(?:y|es|ed)"),
        number: Some(r"(?:subscription|dbs)\s*(?:id|no\.?|number)[:\s]*([a-z0-9]{6,12})"),
    },
    PatternDef {
        type_id: "care_certificate",
        patterns: &[r"care\s*certificate", r"skills\s*for\s*care", r"15\s*standards"],
        keywords: &[
            "care certificate",
            "skills for care",
            "standards",
            "health and social care",
        ],
        required: &[IssueDate],
        expiry_label: None,
        number: None,
    },
    PatternDef {
        type_id: "nvq_qualification",
        patterns: &[
            r"\bnvq\b",
            r"\bqcf\b",
            r"level\s*[2-5].*health.*social\s*care",
            r"diploma.*health.*social\s*care",
        ],
        keywords: &[
            "nvq",
            "qcf",
            "diploma",
            "health and social care",
            "level 2",
            "level 3",
            "level 4",
            "level 5",
        ],
        required: &[QualificationLevel, IssueDate],
        expiry_label: None,
        number: None,
    },
    PatternDef {
        type_id: "nmc_pin",
        patterns: &[
            r"\bnmc\b",
            r"nursing.*midwifery\s*council",
            r"registered\s*nurse",
            r"pin\s*number",
        ],
        keywords: &[
            "nmc",
            "nursing and midwifery council",
            "registered nurse",
            "pin",
            "registration",
        ],
        required: &[DocumentNumber, ExpiryDate],
        expiry_label: Some(r"expiry|renewal"),
        number: Some(r"(?:nmc|pin)[:\s]*(\d{2}[a-z]\d{4}[a-z])"),
    },
    PatternDef {
        type_id: "mandatory_training",
        patterns: &[
            r"certificate.*training",
            r"training\s*certificate",
            r"safeguarding",
            r"manual\s*handling",
            r"first\s*aid",
            r"fire\s*safety",
            r"health.*safety",
            r"infection\s*control",
        ],
        keywords: &[
            "training certificate",
            "safeguarding",
            "manual handling",
            "first aid",
            "fire safety",
            "health and safety",
            "infection control",
            "food hygiene",
            "medication",
            "cpr",
        ],
        required: &[TrainingCourse, IssueDate, TrainingProvider],
        expiry_label: Some(r"valid\s*(?:until|to)|expir(?:y|es|ed)"),
        number: None,
    },
    PatternDef {
        type_id: "health_declaration",
        patterns: &[
            r"health\s*declaration",
            r"fitness\s*to\s*work",
            r"medical\s*declaration",
        ],
        keywords: &[
            "health declaration",
            "fitness to work",
            "medical condition",
            "disability",
        ],
        required: &[],
        expiry_label: None,
        number: None,
    },
    PatternDef {
        type_id: "immunization_records",
        patterns: &[
            r"immuni[sz]ation",
            r"vaccination",
            r"hepatitis\s*b",
            r"\btb\s*(?:test|screening)",
        ],
        keywords: &[
            "immunization",
            "vaccination",
            "hepatitis",
            "tuberculosis",
            "vaccine",
        ],
        required: &[],
        expiry_label: Some(r"next\s*dose|booster"),
        number: None,
    },
    PatternDef {
        type_id: "photo_id",
        patterns: &[r"driving\s*licen[cs]e", r"photo\s*id", r"identity\s*card"],
        keywords: &["driving licence", "photo id", "identity card", "dvla"],
        required: &[FullName, DocumentNumber],
        expiry_label: Some(r"valid\s*(?:until|to)|expir(?:y|es|ed)"),
        number: Some(r"licen[cs]e\s*(?:no\.?|number)[:\s]*([a-z0-9]{5,18})"),
    },
    PatternDef {
        type_id: "proof_of_address",
        patterns: &[
            r"utility\s*bill",
            r"bank\s*statement",
            r"council\s*tax",
            r"proof.*address",
        ],
        keywords: &[
            "utility bill",
            "bank statement",
            "council tax",
            "gas",
            "electric",
            "water",
            "address",
        ],
        required: &[IssueDate],
        expiry_label: None,
        number: None,
    },
    PatternDef {
        type_id: "cv_resume",
        patterns: &[
            r"curriculum\s*vitae",
            r"\bcv\b",
            r"resume",
            r"personal\s*statement",
        ],
        keywords: &[
            "cv",
            "curriculum vitae",
            "resume",
            "experience",
            "education",
            "employment history",
        ],
        required: &[],
        expiry_label: None,
        number: None,
    },
    PatternDef {
        type_id: "employment_references",
        patterns: &[r"reference", r"recommendation", r"employer.*reference"],
        keywords: &[
            "reference",
            "recommendation",
            "employer",
            "employment reference",
            "character reference",
        ],
        required: &[],
        expiry_label: None,
        number: None,
    },
    PatternDef {
        type_id: "signed_contract",
        patterns: &[
            r"employment\s*contract",
            r"contract\s*of\s*employment",
            r"terms.*conditions.*employment",
        ],
        keywords: &[
            "employment contract",
            "contract of employment",
            "terms and conditions",
            "salary",
            "hours",
        ],
        required: &[],
        expiry_label: None,
        number: None,
    },
];

/// Course detection for training certificates, in priority order.
static TRAINING_PATTERNS: &[(&str, &[&str])] = &[
    (
        "safeguarding_adults",
        &[r"safeguarding.*adult", r"adult.*safeguarding", r"protection.*vulnerable.*adult"],
    ),
    (
        "safeguarding_children",
        &[r"safeguarding.*child", r"child.*protection", r"children.*safeguarding"],
    ),
    ("health_safety", &[r"health.*safety", r"\bh\s*&\s*s\b", r"workplace\s*safety"]),
    (
        "fire_safety",
        &[r"fire\s*safety", r"fire\s*awareness", r"fire\s*marshal", r"fire\s*warden"],
    ),
    ("first_aid", &[r"first\s*aid"]),
    (
        "manual_handling",
        &[r"manual\s*handling", r"moving.*handling", r"people\s*handling"],
    ),
    (
        "medication_admin",
        &[r"medication", r"medicine.*management"],
    ),
    (
        "infection_control",
        &[r"infection\s*control", r"infection\s*prevention", r"hand\s*hygiene"],
    ),
    ("mental_capacity", &[r"mental\s*capacity", r"\bmca\b", r"capacity\s*act"]),
    ("deprivation_liberty", &[r"\bdols\b", r"deprivation.*liberty", r"liberty.*safeguards"]),
    ("food_hygiene", &[r"food\s*hygiene", r"food\s*safety", r"level\s*2\s*food"]),
    ("gdpr_data", &[r"\bgdpr\b", r"data\s*protection", r"information\s*governance"]),
    (
        "equality_diversity",
        &[r"equality", r"diversity", r"inclusion", r"\be\s*&\s*d\b"],
    ),
    ("dementia_awareness", &[r"dementia", r"alzheimer", r"memory.*care"]),
    ("end_of_life", &[r"end\s*of\s*life", r"palliative", r"\beolc\b"]),
];

const VISA_TYPES: &[(&str, &str)] = &[
    ("skilled worker", "Skilled Worker"),
    ("tier 2", "Tier 2"),
    ("student", "Student"),
    ("family", "Family"),
    ("settlement", "Settlement"),
    ("indefinite leave", "Indefinite Leave"),
];

// -----------------------------------------------------------------------
// Classifier
// -----------------------------------------------------------------------

struct CompiledPattern {
    def: &'static PatternDef,
    patterns: Vec<Regex>,
    expiry: Option<Regex>,
    number: Option<Regex>,
}

/// Extractors shared by every document type.
struct CommonExtractors {
    full_name: Regex,
    date_of_birth: Regex,
    nationality: Regex,
    issue_date: Regex,
    provider: Regex,
    qualification_level: Regex,
    barred_list: Regex,
}

/// Compiled pattern set. Build once and share.
pub struct DocumentClassifier {
    patterns: Vec<CompiledPattern>,
    training: Vec<(&'static str, Vec<Regex>)>,
    common: CommonExtractors,
    auto_file_confidence: u8,
}

impl std::fmt::Debug for DocumentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentClassifier")
            .field("patterns", &self.patterns.len())
            .field("auto_file_confidence", &self.auto_file_confidence)
            .finish()
    }
}

fn compile(type_id: &str, pattern: &str) -> Result<Regex, ComplianceError> {
    Regex::new(&format!("(?i){pattern}")).map_err(|e| ComplianceError::InvalidPattern {
        type_id: type_id.to_string(),
        reason: e.to_string(),
    })
}

fn compile_all(type_id: &str, patterns: &[&str]) -> Result<Vec<Regex>, ComplianceError> {
    patterns.iter().map(|p| compile(type_id, p)).collect()
}

/// Collapse runs of whitespace within each line and drop blank lines.
/// Line breaks survive so single-line captures stop at them.
fn normalize(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

impl DocumentClassifier {
    pub fn new(auto_file_confidence: u8) -> Result<Self, ComplianceError> {
        let patterns = PATTERN_DEFS
            .iter()
            .map(|def| -> Result<CompiledPattern, ComplianceError> {
                Ok(CompiledPattern {
                    def,
                    patterns: compile_all(def.type_id, def.patterns)?,
                    expiry: def
                        .expiry_label
                        .map(|label| compile(def.type_id, &format!(r"(?:{label})[:\s]*{DATE}")))
                        .transpose()?,
                    number: def.number.map(|n| compile(def.type_id, n)).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, ComplianceError>>()?;

        let training = TRAINING_PATTERNS
            .iter()
            .map(|(course, patterns)| compile_all(course, patterns).map(|res| (*course, res)))
            .collect::<Result<Vec<_>, ComplianceError>>()?;

        let common = CommonExtractors {
            full_name: Regex::new(r"(?i:full\s*name|name|holder)[:\s]+([A-Z][a-z]+(?: +[A-Z][a-z]+)+)")
                .map_err(|e| ComplianceError::InvalidPattern {
                    type_id: "full_name".into(),
                    reason: e.to_string(),
                })?,
            date_of_birth: compile("date_of_birth", &format!(r"(?:date\s*of\s*birth|dob|born)[:\s]*{DATE}"))?,
            nationality: compile("nationality", r"nationality[:\s]*([a-z]+)")?,
            issue_date: compile(
                "issue_date",
                &format!(r"(?:date\s*of\s*issue|issued\s*on|issued|issue\s*date)[:\s]*{DATE}"),
            )?,
            provider: compile(
                "training_provider",
                r"(?:provider|delivered\s*by|issued\s*by)[:\s]*([a-z][a-z ]*?)(?:[.,]|$)",
            )?,
            qualification_level: compile("qualification_level", r"level\s*(\d)")?,
            barred_list: compile("dbs_level", r"barred\s*list")?,
        };

        Ok(Self {
            patterns,
            training,
            common,
            auto_file_confidence,
        })
    }

    /// Classify an upload. `today` is used to flag expired or
    /// soon-expiring documents.
    pub fn classify(&self, input: &ClassificationInput, today: NaiveDate) -> Classification {
        let text = normalize(input.content.as_deref().unwrap_or_default());
        let lower = text.to_lowercase();
        let file_name = input.file_name.to_lowercase();

        if let Some(spec) = input.type_hint.as_deref().and_then(taxonomy::lookup) {
            let extracted = match self.pattern_for(spec.id) {
                Some(p) => self.extract(&text, &lower, p),
                None => self.extract_common(&text),
            };
            return self.finish(spec.id, 100, extracted, &[], &text, &input.file_name, today);
        }

        let mut best: Option<(&CompiledPattern, u32, ExtractedFields)> = None;
        let mut second = 0;
        for p in &self.patterns {
            let extracted = self.extract(&text, &lower, p);
            let score = self.match_score(&text, &lower, &file_name, p, &extracted);
            let leading = best.as_ref().map(|(_, s, _)| *s);
            match leading {
                Some(top) if score <= top => second = second.max(score),
                _ => {
                    second = second.max(leading.unwrap_or(0));
                    best = Some((p, score, extracted));
                }
            }
        }

        match best {
            Some((p, score, extracted)) if score > 0 => {
                let confidence = confidence(score, second);
                self.finish(
                    p.def.type_id,
                    confidence,
                    extracted,
                    p.def.required,
                    &text,
                    &input.file_name,
                    today,
                )
            }
            _ => Classification {
                document_type_id: None,
                document_type_name: None,
                authority: None,
                confidence: 0,
                disposition: Disposition::ManualReview,
                extracted: self.extract_common(&text),
                review_reasons: vec!["No document type matched".to_string()],
                suggestions: vec![
                    "Choose the document type manually or upload a clearer scan".to_string(),
                ],
            },
        }
    }

    /// Guess a type from the file name alone: 60 for a pattern match,
    /// 40 for a keyword match.
    pub fn suggest_from_file_name(&self, file_name: &str) -> Option<TypeSuggestion> {
        let name = file_name.to_lowercase();
        self.patterns.iter().find_map(|p| {
            let confidence = if p.patterns.iter().any(|re| re.is_match(&name)) {
                60
            } else if p
                .def
                .keywords
                .iter()
                .any(|k| name.contains(&k.replace(' ', "_")))
            {
                40
            } else {
                return None;
            };
            Some(TypeSuggestion {
                type_id: p.def.type_id.to_string(),
                type_name: taxonomy::lookup(p.def.type_id)
                    .map_or(p.def.type_id, |s| s.name)
                    .to_string(),
                confidence,
            })
        })
    }

    fn pattern_for(&self, type_id: &str) -> Option<&CompiledPattern> {
        self.patterns.iter().find(|p| p.def.type_id == type_id)
    }

    fn match_score(
        &self,
        text: &str,
        lower: &str,
        file_name: &str,
        p: &CompiledPattern,
        extracted: &ExtractedFields,
    ) -> u32 {
        let mut score = 0;
        for re in &p.patterns {
            if !text.is_empty() && re.is_match(text) {
                score += 20;
            }
            if re.is_match(file_name) {
                score += 15;
            }
        }
        for keyword in p.def.keywords {
            if !lower.is_empty() && lower.contains(keyword) {
                score += 10;
            }
            if file_name.contains(&keyword.replace(' ', "_")) {
                score += 5;
            }
        }
        let found = p.def.required.iter().filter(|f| f.present(extracted)).count() as u32;
        score + found * 15
    }

    fn extract_common(&self, text: &str) -> ExtractedFields {
        let c = &self.common;
        ExtractedFields {
            full_name: capture(&c.full_name, text),
            date_of_birth: capture(&c.date_of_birth, text).and_then(|s| parse_date(&s)),
            nationality: capture(&c.nationality, text).map(|n| title_case(&n)),
            issue_date: capture(&c.issue_date, text).and_then(|s| parse_date(&s)),
            ..Default::default()
        }
    }

    fn extract(&self, text: &str, lower: &str, p: &CompiledPattern) -> ExtractedFields {
        let mut fields = self.extract_common(text);

        fields.expiry_date = p
            .expiry
            .as_ref()
            .and_then(|re| capture(re, text))
            .and_then(|s| parse_date(&s));
        fields.document_number = p
            .number
            .as_ref()
            .and_then(|re| capture(re, text))
            .map(|n| n.to_uppercase());

        match p.def.type_id {
            "dbs_certificate" => {
                fields.dbs_level = if lower.contains("enhanced") {
                    Some(if self.common.barred_list.is_match(text) {
                        "Enhanced with Barred List".to_string()
                    } else {
                        "Enhanced".to_string()
                    })
                } else if lower.contains("standard") {
                    Some("Standard".to_string())
                } else if lower.contains("basic") {
                    Some("Basic".to_string())
                } else {
                    None
                };
            }
            "mandatory_training" => {
                fields.training_course = self
                    .training
                    .iter()
                    .find(|(_, res)| res.iter().any(|re| re.is_match(text)))
                    .map(|(course, _)| course.to_string());
                fields.training_provider = capture(&self.common.provider, text);
            }
            "nvq_qualification" => {
                fields.qualification_level =
                    capture(&self.common.qualification_level, text).map(|l| format!("Level {l}"));
            }
            "rtw_visa" => {
                fields.visa_type = VISA_TYPES
                    .iter()
                    .find(|(needle, _)| lower.contains(needle))
                    .map(|(_, label)| label.to_string());
            }
            _ => {}
        }

        fields
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        type_id: &'static str,
        confidence: u8,
        extracted: ExtractedFields,
        required: &[Field],
        text: &str,
        file_name: &str,
        today: NaiveDate,
    ) -> Classification {
        let spec = taxonomy::lookup(type_id);
        let mut reasons = Vec::new();
        let mut suggestions = Vec::new();

        let disposition = if confidence >= self.auto_file_confidence {
            Disposition::AutoFile
        } else {
            reasons.push(format!("Low classification confidence ({confidence}%)"));
            Disposition::ManualReview
        };

        let missing: Vec<&Field> = required.iter().filter(|f| !f.present(&extracted)).collect();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
            reasons.push(format!("Missing required fields: {}", names.join(", ")));
            suggestions.extend(missing.iter().filter_map(|f| f.suggestion()).map(String::from));
        }

        if let Some(spec) = spec {
            if let Some(ext) = file_name.rsplit_once('.').map(|(_, ext)| ext) {
                if !spec.accepts_format(ext) {
                    reasons.push(format!("File format .{ext} is not accepted for {}", spec.name));
                }
            }
        }

        if text.chars().count() < 100 {
            suggestions
                .push("Consider uploading a higher quality scan for better text extraction".into());
        }

        if let Some(expiry) = extracted.expiry_date {
            let days = days_until_expiry(expiry, today);
            if days < 0 {
                reasons.push("Document appears to be expired".into());
                suggestions
                    .push("This document appears to be expired. Please upload a current version.".into());
            } else if days < 30 {
                suggestions.push(format!(
                    "This document expires in {days} days. Consider renewing soon."
                ));
            }
        }

        Classification {
            document_type_id: Some(type_id.to_string()),
            document_type_name: spec.map(|s| s.name.to_string()),
            authority: spec.map(|s| s.authority),
            confidence,
            disposition,
            extracted,
            review_reasons: reasons,
            suggestions,
        }
    }
}

/// Confidence from the best score and the runner-up's.
fn confidence(best: u32, second: u32) -> u8 {
    if best == 0 {
        return 0;
    }
    let base = f64::from(best.min(100));
    let gap_bonus = (f64::from(best.saturating_sub(second)) / 2.0).min(20.0);
    (base * 0.7 + gap_bonus * 1.5).round().min(100.0) as u8
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let prefix = name.get(..3)?.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == prefix).map(|i| i as u32 + 1)
}

/// Parse `DD/MM/YYYY`, `DD-MM-YYYY`, `DD MMM YYYY` or `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw
        .split(|c: char| c == '/' || c == '-' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };

    if a.len() == 4 {
        return NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
    }

    let day: u32 = a.parse().ok()?;
    let month = b.parse::<u32>().ok().or_else(|| month_number(b))?;
    let year: i32 = c.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DocumentClassifier {
        DocumentClassifier::new(70).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn input(file_name: &str, content: &str) -> ClassificationInput {
        ClassificationInput {
            file_name: file_name.into(),
            content: Some(content.into()),
            type_hint: None,
        }
    }

    #[test]
    fn every_pattern_compiles_and_names_a_taxonomy_entry() {
        let c = classifier();
        assert_eq!(c.patterns.len(), PATTERN_DEFS.len());
        for def in PATTERN_DEFS {
            assert!(taxonomy::lookup(def.type_id).is_some(), "{}", def.type_id);
        }
        for (course, _) in TRAINING_PATTERNS {
            assert!(taxonomy::training_course(course).is_some(), "{course}");
        }
    }

    #[test]
    fn parses_supported_date_spellings() {
        assert_eq!(parse_date("05/03/2027"), Some(d(2027, 3, 5)));
        assert_eq!(parse_date("5-3-2027"), Some(d(2027, 3, 5)));
        assert_eq!(parse_date("05 Mar 2027"), Some(d(2027, 3, 5)));
        assert_eq!(parse_date("5 march 2027"), Some(d(2027, 3, 5)));
        assert_eq!(parse_date("2027-03-05"), Some(d(2027, 3, 5)));
        assert_eq!(parse_date("31/02/2027"), None);
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn passport_is_auto_filed_with_fields() {
        let text = "UNITED KINGDOM OF GREAT BRITAIN PASSPORT\n\
                    Passport No: 123456789\n\
                    Name: Jane Smith\n\
                    Nationality: British Citizen\n\
                    Date of birth: 01/02/1990\n\
                    Date of issue: 10 Jan 2020\n\
                    Date of expiry: 10 Jan 2030";
        let result = classifier().classify(&input("passport.jpg", text), d(2025, 6, 1));

        assert_eq!(result.document_type_id.as_deref(), Some("rtw_passport"));
        assert_eq!(result.authority, Some(Authority::HomeOffice));
        assert_eq!(result.disposition, Disposition::AutoFile);
        assert!(result.confidence >= 70);
        assert_eq!(result.extracted.document_number.as_deref(), Some("123456789"));
        assert_eq!(result.extracted.full_name.as_deref(), Some("Jane Smith"));
        assert_eq!(result.extracted.nationality.as_deref(), Some("British"));
        assert_eq!(result.extracted.date_of_birth, Some(d(1990, 2, 1)));
        assert_eq!(result.extracted.issue_date, Some(d(2020, 1, 10)));
        assert_eq!(result.extracted.expiry_date, Some(d(2030, 1, 10)));
    }

    #[test]
    fn enhanced_dbs_level_detected() {
        let text = "Disclosure and Barring Service. Enhanced Certificate. \
                    Certificate number: 001234567890. Date of issue: 01/03/2024. \
                    Barred list information: none recorded.";
        let result = classifier().classify(&input("scan.pdf", text), d(2025, 1, 1));

        assert_eq!(result.document_type_id.as_deref(), Some("dbs_certificate"));
        assert_eq!(
            result.extracted.dbs_level.as_deref(),
            Some("Enhanced with Barred List")
        );
        assert_eq!(result.extracted.document_number.as_deref(), Some("001234567890"));
    }

    #[test]
    fn training_course_and_provider_extracted() {
        let text = "Training Certificate. This certifies completion of Fire Safety Awareness. \
                    Delivered by Acme Training Ltd. Issued on 02/02/2025.";
        let result = classifier().classify(&input("cert.pdf", text), d(2025, 3, 1));

        assert_eq!(result.document_type_id.as_deref(), Some("mandatory_training"));
        assert_eq!(result.extracted.training_course.as_deref(), Some("fire_safety"));
        assert_eq!(
            result.extracted.training_provider.as_deref(),
            Some("Acme Training Ltd")
        );
    }

    #[test]
    fn weak_evidence_goes_to_manual_review() {
        let result = classifier().classify(&input("IMG_2231.jpg", "address"), d(2025, 1, 1));
        assert_eq!(result.disposition, Disposition::ManualReview);
        assert!(result.confidence < 70);
        assert!(
            result
                .review_reasons
                .iter()
                .any(|r| r.starts_with("Low classification confidence"))
        );
    }

    #[test]
    fn nothing_matched_is_unclassified_not_missing() {
        let result = classifier().classify(&input("IMG_0001.heic", ""), d(2025, 1, 1));
        assert_eq!(result.document_type_id, None);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.disposition, Disposition::ManualReview);
    }

    #[test]
    fn explicit_hint_wins() {
        let mut upload = input("whatever.pdf", "");
        upload.type_hint = Some("signed_contract".into());
        let result = classifier().classify(&upload, d(2025, 1, 1));
        assert_eq!(result.document_type_id.as_deref(), Some("signed_contract"));
        assert_eq!(result.confidence, 100);
        assert_eq!(result.disposition, Disposition::AutoFile);
    }

    #[test]
    fn expired_document_flagged_for_review() {
        let text = "Biometric Residence Permit. Permit number: ZU1234567. Expiry: 01 Jan 2024";
        let result = classifier().classify(&input("brp.png", text), d(2025, 1, 1));
        assert_eq!(result.document_type_id.as_deref(), Some("rtw_brp"));
        assert!(
            result
                .review_reasons
                .contains(&"Document appears to be expired".to_string())
        );
    }

    #[test]
    fn confidence_rewards_a_clear_winner() {
        assert_eq!(confidence(0, 0), 0);
        assert_eq!(confidence(100, 0), 100);
        assert_eq!(confidence(50, 50), 35);
        assert_eq!(confidence(60, 40), 57);
        assert!(confidence(400, 10) <= 100);
    }

    #[test]
    fn file_name_suggestions() {
        let c = classifier();
        let s = c.suggest_from_file_name("Jane DBS 2024.pdf").unwrap();
        assert_eq!(s.type_id, "dbs_certificate");
        assert_eq!(s.confidence, 60);

        let s = c.suggest_from_file_name("council_tax.pdf").unwrap();
        assert_eq!(s.type_id, "proof_of_address");
        assert_eq!(s.confidence, 40);

        assert!(c.suggest_from_file_name("IMG_0001.heic").is_none());
    }
}
