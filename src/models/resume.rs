use crate::core::layout::SectionKind;
use crate::Paragraph;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());

/// Why a section record was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("required field `{0}` is empty")]
    Missing(&'static str),

    #[error("field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A typed section record. Instances leave assembly only through
/// [`Record::checked`], so a record is either fully valid or absent.
pub trait Record: Sized {
    fn validate(&self) -> Result<(), ValidationError>;

    fn checked(self) -> Result<Self, ValidationError> {
        self.validate()?;
        Ok(self)
    }
}

/// Flatten a paragraph for storage: runs are joined with single spaces.
pub fn normalize(p: &Paragraph) -> String {
    match p {
        Paragraph::Single(s) => s.trim().to_string(),
        Paragraph::Parts(parts) => parts
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(())
    }
}

fn non_empty<T>(field: &'static str, items: &[T]) -> Result<(), ValidationError> {
    if items.is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::Invalid { field, reason: reason.into() }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct General {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<NaiveDateTime>,
}

impl Record for General {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require("name", name)?;
            if name.chars().any(|c| c.is_ascii_digit()) {
                return Err(invalid("name", format!("contains digits: {:?}", name)));
            }
        }
        if self == &General::default() {
            return Err(ValidationError::Missing("general"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contacts {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Record for Contacts {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.phones.is_empty() && self.emails.is_empty() && self.links.is_empty() {
            return Err(ValidationError::Missing("phones|emails|links"));
        }
        if let Some(bad) = self.emails.iter().find(|e| !EMAIL_RE.is_match(e)) {
            return Err(invalid("emails", format!("not an email: {:?}", bad)));
        }
        if let Some(bad) = self.links.iter().find(|l| !LINK_RE.is_match(l)) {
            return Err(invalid("links", format!("not a URL: {:?}", bad)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Position {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

impl Record for Position {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceItem {
    pub duration: String,
    pub total: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_info: Option<String>,
    pub position: String,
    pub other: String,
}

impl ExperienceItem {
    pub const FIELDS: [&'static str; 6] = [
        "duration",
        "total",
        "company",
        "company_info",
        "position",
        "other",
    ];
    pub const FIELDS_SHORT: [&'static str; 5] =
        ["duration", "total", "company", "position", "other"];

    /// Assign a chunk of paragraphs to fields by position. Only chunks of
    /// exactly [`Self::FIELDS`] or [`Self::FIELDS_SHORT`] length are accepted.
    pub fn from_slice(slice: &[Paragraph]) -> Result<Self, ValidationError> {
        let values: Vec<String> = slice.iter().map(normalize).collect();
        let item = match values.as_slice() {
            [duration, total, company, company_info, position, other] => ExperienceItem {
                duration: duration.clone(),
                total: total.clone(),
                company: company.clone(),
                company_info: Some(company_info.clone()),
                position: position.clone(),
                other: other.clone(),
            },
            [duration, total, company, position, other] => ExperienceItem {
                duration: duration.clone(),
                total: total.clone(),
                company: company.clone(),
                company_info: None,
                position: position.clone(),
                other: other.clone(),
            },
            _ => {
                return Err(invalid(
                    "items",
                    format!(
                        "{} lines, expected {} or {}",
                        values.len(),
                        Self::FIELDS.len(),
                        Self::FIELDS_SHORT.len()
                    ),
                ))
            }
        };
        item.checked()
    }
}

impl Record for ExperienceItem {
    fn validate(&self) -> Result<(), ValidationError> {
        require("duration", &self.duration)?;
        require("company", &self.company)?;
        require("position", &self.position)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Experience {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    pub items: Vec<ExperienceItem>,
}

impl Record for Experience {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.total.is_none() && self.items.is_empty() {
            return Err(ValidationError::Missing("total|items"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Skills {
    pub items: Vec<String>,
}

impl Record for Skills {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("items", &self.items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Driving {
    pub own_car: bool,
    pub categories: Vec<String>,
}

impl Record for Driving {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.own_car && self.categories.is_empty() {
            return Err(ValidationError::Missing("own_car|categories"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct About {
    pub text: String,
}

impl Record for About {
    fn validate(&self) -> Result<(), ValidationError> {
        require("text", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationItem {
    pub org: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub items: Vec<RecommendationItem>,
}

impl Record for Recommendations {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("items", &self.items)?;
        self.items.iter().try_for_each(|i| require("org", &i.org))
    }
}

/// One dated entry: a degree, a course, a test or a certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationItem {
    pub year: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

impl EducationItem {
    pub const FIELDS: [&'static str; 3] = ["year", "name", "other"];

    /// `year, name[, other…]`. Lines past the third are appended to `other`.
    pub fn from_slice(slice: &[Paragraph]) -> Result<Self, ValidationError> {
        let values: Vec<String> = slice.iter().map(normalize).collect();
        let item = match values.as_slice() {
            [year, name] => EducationItem {
                year: year.clone(),
                name: name.clone(),
                other: None,
            },
            [year, name, other @ ..] if !other.is_empty() => EducationItem {
                year: year.clone(),
                name: name.clone(),
                other: Some(other.join("\n")),
            },
            _ => {
                return Err(invalid(
                    "items",
                    format!(
                        "{} lines, expected at least 2 ({})",
                        values.len(),
                        Self::FIELDS.join(", ")
                    ),
                ))
            }
        };
        item.checked()
    }
}

impl Record for EducationItem {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.year.parse::<u32>().is_err() {
            return Err(invalid("year", format!("not a number: {:?}", self.year)));
        }
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Education {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    pub items: Vec<EducationItem>,
}

impl Record for Education {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("items", &self.items)
    }
}

/// Courses, tests and certificates share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdditionalEducation {
    pub items: Vec<EducationItem>,
}

impl Record for AdditionalEducation {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("items", &self.items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Languages {
    pub items: Vec<LanguageItem>,
}

impl Record for Languages {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("items", &self.items)?;
        self.items.iter().try_for_each(|i| require("name", &i.name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Citizenship {
    pub citizenship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commute: Option<String>,
}

impl Record for Citizenship {
    fn validate(&self) -> Result<(), ValidationError> {
        require("citizenship", &self.citizenship)
    }
}

/// One assembled section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionRecord {
    General(General),
    Contacts(Contacts),
    Position(Position),
    Experience(Experience),
    Skills(Skills),
    Driving(Driving),
    About(About),
    Recommendations(Recommendations),
    Education(Education),
    AdditionalEdu(AdditionalEducation),
    Languages(Languages),
    Tests(AdditionalEducation),
    Certificates(AdditionalEducation),
    Citizenship(Citizenship),
}

/// Section kind → record, for the kinds that were detected and assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Resume {
    sections: BTreeMap<SectionKind, SectionRecord>,
}

impl Resume {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: SectionKind, record: SectionRecord) {
        self.sections.insert(kind, record);
    }

    pub fn get(&self, kind: SectionKind) -> Option<&SectionRecord> {
        self.sections.get(&kind)
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    /// Detected kinds in template order.
    pub fn kinds(&self) -> impl Iterator<Item = SectionKind> + '_ {
        self.sections.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SectionKind, &SectionRecord)> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The plain nested-value shape handed to output converters.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
