use crate::locale::{Locale, Vocabulary};
use crate::models::resume::{normalize, Citizenship, EducationItem, ExperienceItem, LanguageItem};
use crate::Paragraph;
use chrono::NaiveDateTime;
use log::{error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d{1,3}\s?\(?\d{3}\)?\s?\d{2,3}[\s.-]\d{2,3}[\s.-]\d{2,3}").unwrap()
});
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s,;]+").unwrap());
static UPDATED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{4}\s\d{2}:\d{2}").unwrap());
static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}\b").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\b").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}+").unwrap());
static DEGREE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.*)\)").unwrap());
static LANG_SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+[—–]\s+").unwrap());

/// Salary lines carry more digits than this.
const SALARY_MIN_DIGITS: usize = 3;
/// Driving categories are short tokens such as `B`, `C1`, `BE`.
const CATEGORY_MAX_LEN: usize = 3;

/// Every extractor reachable through [`FieldsExtractor::extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Gender,
    Age,
    Birthday,
    Email,
    Phone,
    Link,
    Location,
    Updated,
    Salary,
    ExperienceTotal,
    ExperienceItems,
    EducationItems,
    AdditionalEduItems,
    LanguagesItems,
    OwnCar,
    DrivingCategories,
    Citizenship,
    Degree,
}

impl Field {
    /// Resolve `experience.total`-style names; dots and underscores are interchangeable.
    pub fn from_name(name: &str) -> Option<Field> {
        let field = match name.trim().replace('.', "_").as_str() {
            "gender" => Field::Gender,
            "age" => Field::Age,
            "birthday" => Field::Birthday,
            "email" => Field::Email,
            "phone" => Field::Phone,
            "link" => Field::Link,
            "location" => Field::Location,
            "updated" => Field::Updated,
            "salary" => Field::Salary,
            "experience_total" => Field::ExperienceTotal,
            "experience_items" => Field::ExperienceItems,
            "education_items" => Field::EducationItems,
            "additional_edu_items" => Field::AdditionalEduItems,
            "languages_items" => Field::LanguagesItems,
            "own_car" => Field::OwnCar,
            "driving_categories" => Field::DrivingCategories,
            "citizenship" => Field::Citizenship,
            "degree" => Field::Degree,
            _ => return None,
        };
        Some(field)
    }
}

/// Any value an extractor can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(u32),
    Timestamp(NaiveDateTime),
    Flag(bool),
    List(Vec<String>),
    Experience(Vec<ExperienceItem>),
    Education(Vec<EducationItem>),
    Languages(Vec<LanguageItem>),
    Citizenship(Citizenship),
}

/// Join wrapper for extractors that only need one flat string.
pub fn join_text(text: &[Paragraph]) -> String {
    text.iter().map(|p| p.text().into_owned()).collect::<Vec<_>>().join(" ")
}

/// Locale-aware field extraction rules. Every method returns `None` (or an
/// empty list) when nothing matches; absence is never an error here.
#[derive(Debug, Clone, Copy)]
pub struct FieldsExtractor {
    template_lang: Locale,
    doc_lang: Locale,
}

impl FieldsExtractor {
    pub fn new(template_lang: Locale, doc_lang: Locale) -> Self {
        Self { template_lang, doc_lang }
    }

    pub fn template_lang(&self) -> Locale {
        self.template_lang
    }

    pub fn doc_lang(&self) -> Locale {
        self.doc_lang
    }

    fn vocab(&self) -> &'static Vocabulary {
        self.template_lang.vocabulary()
    }

    /// Run an extractor by name. Unknown names are logged and yield `None`.
    pub fn extract(&self, field_name: &str, text: &[Paragraph]) -> Option<FieldValue> {
        let Some(field) = Field::from_name(field_name) else {
            error!("No extractor for <{}> field found", field_name);
            return None;
        };
        self.extract_field(field, text)
    }

    pub fn extract_field(&self, field: Field, text: &[Paragraph]) -> Option<FieldValue> {
        let flat = || join_text(text);
        match field {
            Field::Gender => self.extract_gender(&flat()).map(FieldValue::Text),
            Field::Age => self.extract_age(&flat()).map(FieldValue::Number),
            Field::Birthday => self.extract_birthday(&flat()).map(FieldValue::Text),
            Field::Email => self.extract_email(&flat()).map(FieldValue::Text),
            Field::Phone => self.extract_phone(&flat()).map(FieldValue::Text),
            Field::Link => self.extract_link(&flat()).map(FieldValue::Text),
            Field::Location => self.extract_location(&flat()).map(FieldValue::Text),
            Field::Updated => self.extract_updated(&flat()).map(FieldValue::Timestamp),
            Field::Salary => self.extract_salary(text).map(FieldValue::Text),
            Field::ExperienceTotal => self.extract_experience_total(&flat()).map(FieldValue::Text),
            Field::ExperienceItems => {
                Some(FieldValue::Experience(self.extract_experience_items(text)))
            }
            Field::EducationItems => {
                Some(FieldValue::Education(self.extract_education_items(text)))
            }
            Field::AdditionalEduItems => {
                Some(FieldValue::Education(self.extract_additional_edu_items(text)))
            }
            Field::LanguagesItems => {
                Some(FieldValue::Languages(self.extract_languages_items(text)))
            }
            Field::OwnCar => Some(FieldValue::Flag(self.extract_own_car(text))),
            Field::DrivingCategories => {
                Some(FieldValue::List(self.extract_driving_categories(text)))
            }
            Field::Citizenship => Some(FieldValue::Citizenship(self.extract_citizenship(text))),
            Field::Degree => self.extract_degree(&flat()).map(FieldValue::Text),
        }
    }

    pub fn extract_gender(&self, text: &str) -> Option<String> {
        self.vocab()
            .genders
            .iter()
            .find(|g| text.contains(*g))
            .map(|g| g.to_string())
    }

    pub fn extract_age(&self, text: &str) -> Option<u32> {
        self.vocab().years_months.iter().find_map(|unit| {
            let re = Regex::new(&format!(r"(?i)(\d+)\s+{}", regex::escape(unit))).ok()?;
            re.captures(text)?.get(1)?.as_str().parse().ok()
        })
    }

    /// `DD.MM.YYYY`, or whichever of day, month and year follow the
    /// "born on" marker, dot-joined.
    pub fn extract_birthday(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        let vocab = self.vocab();
        vocab.born_on.iter().find_map(|marker| {
            let start = lower.find(&marker.to_lowercase())? + marker.to_lowercase().len();
            let rest = &lower[start..];

            let day = DAY_RE.find(rest).and_then(|m| m.as_str().parse::<u32>().ok());
            let month = WORD_RE.find_iter(rest).find_map(|w| vocab.month_number(w.as_str()));
            let year = YEAR_RE.find(rest).map(|m| m.as_str().to_string());

            let parts: Vec<String> = [
                day.map(|d| format!("{:02}", d)),
                month.map(|m| format!("{:02}", m)),
                year,
            ]
            .into_iter()
            .flatten()
            .collect();
            (!parts.is_empty()).then(|| parts.join("."))
        })
    }

    pub fn extract_email(&self, text: &str) -> Option<String> {
        EMAIL_RE.find(text).map(|m| m.as_str().to_string())
    }

    pub fn extract_phone(&self, text: &str) -> Option<String> {
        PHONE_RE.find(text).map(|m| m.as_str().to_string())
    }

    pub fn extract_link(&self, text: &str) -> Option<String> {
        LINK_RE.find(text).map(|m| m.as_str().to_string())
    }

    /// Comma-separated segments before the "willing to relocate" marker.
    pub fn extract_location(&self, text: &str) -> Option<String> {
        let willing = self.vocab().willing;
        let mut location = Vec::new();
        for segment in text.split(',') {
            if segment.to_lowercase().contains(willing) {
                return (!location.is_empty()).then(|| location.join(", "));
            }
            let segment = segment.trim();
            if !segment.is_empty() {
                location.push(segment);
            }
        }
        None
    }

    /// `DD.MM.YYYY HH:MM`; impossible calendar dates yield `None`.
    pub fn extract_updated(&self, text: &str) -> Option<NaiveDateTime> {
        let m = UPDATED_RE.find(text)?;
        NaiveDateTime::parse_from_str(m.as_str(), "%d.%m.%Y %H:%M").ok()
    }

    /// First line with numeric content.
    pub fn extract_salary(&self, text: &[Paragraph]) -> Option<String> {
        text.iter()
            .map(normalize)
            .find(|line| line.chars().filter(|c| c.is_ascii_digit()).count() > SALARY_MIN_DIGITS)
    }

    pub fn extract_experience_total(&self, text: &str) -> Option<String> {
        let units = self
            .vocab()
            .years_months
            .iter()
            .map(|u| regex::escape(u))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&format!(r"(?i)\d+.+(?:{}).*", units)).ok()?;
        re.find(text).map(|m| m.as_str().trim().to_string())
    }

    /// An experience entry starts at every line holding a month name as a
    /// whole word (the duration line); "майнинг" is not "май". Chunks of
    /// unexpected length are logged and dropped.
    pub fn extract_experience_items(&self, text: &[Paragraph]) -> Vec<ExperienceItem> {
        let vocab = self.vocab();
        let starts: Vec<usize> = text
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let line = p.text();
                WORD_RE
                    .find_iter(&line)
                    .any(|w| vocab.month_number(w.as_str()).is_some())
            })
            .map(|(i, _)| i)
            .collect();

        chunks(text, &starts)
            .filter_map(|chunk| match ExperienceItem::from_slice(chunk) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Dropping experience item starting with {:?}: {}", chunk[0].text(), e);
                    None
                }
            })
            .collect()
    }

    /// Entries start at lines that are a bare year.
    pub fn extract_education_items(&self, text: &[Paragraph]) -> Vec<EducationItem> {
        let starts: Vec<usize> = text
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let line = p.text();
                let line = line.trim();
                !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
            })
            .map(|(i, _)| i)
            .collect();

        chunks(text, &starts)
            .filter_map(|chunk| match EducationItem::from_slice(chunk) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Dropping education item starting with {:?}: {}", chunk[0].text(), e);
                    None
                }
            })
            .collect()
    }

    pub fn extract_additional_edu_items(&self, text: &[Paragraph]) -> Vec<EducationItem> {
        self.extract_education_items(text)
    }

    /// `Name — level — level…` per line.
    pub fn extract_languages_items(&self, text: &[Paragraph]) -> Vec<LanguageItem> {
        text.iter()
            .map(normalize)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut pieces = LANG_SEP_RE.split(&line).map(str::trim).filter(|s| !s.is_empty());
                let name = pieces.next().unwrap_or_default().to_string();
                let level = pieces.collect::<Vec<_>>().join(", ");
                LanguageItem { name, level: (!level.is_empty()).then_some(level) }
            })
            .collect()
    }

    pub fn extract_own_car(&self, text: &[Paragraph]) -> bool {
        let own_car = self.vocab().own_car.to_lowercase();
        text.iter().any(|p| normalize(p).to_lowercase() == own_car)
    }

    pub fn extract_driving_categories(&self, text: &[Paragraph]) -> Vec<String> {
        let own_car = self.vocab().own_car.to_lowercase();
        text.iter()
            .map(normalize)
            .filter(|line| line.to_lowercase() != own_car)
            .flat_map(|line| {
                line.split_whitespace()
                    .map(|w| w.trim_end_matches(',').to_string())
                    .filter(|w| !w.is_empty() && w.chars().count() <= CATEGORY_MAX_LEN)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// `key: value` lines matched against the citizenship, work permit and
    /// commute keywords.
    pub fn extract_citizenship(&self, text: &[Paragraph]) -> Citizenship {
        let vocab = self.vocab();
        let mut result = Citizenship::default();
        for line in text.iter().map(normalize) {
            let Some((_, value)) = line.split_once(": ") else {
                continue;
            };
            let value = value.trim().to_string();
            let lower = line.to_lowercase();
            if lower.contains(&vocab.citizenship.to_lowercase()) {
                result.citizenship = value;
            } else if lower.contains(&vocab.permission.to_lowercase()) {
                result.permission = Some(value);
            } else if lower.contains(&vocab.commute.to_lowercase()) {
                result.commute = Some(value);
            }
        }
        result
    }

    /// The parenthesised qualifier if any, the whole line otherwise.
    pub fn extract_degree(&self, text: &str) -> Option<String> {
        let degree = DEGREE_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map_or(text, |m| m.as_str())
            .trim();
        (!degree.is_empty()).then(|| degree.to_string())
    }
}

/// Slice `text` at each start index; each chunk runs to the next start or the end.
fn chunks<'a>(
    text: &'a [Paragraph],
    starts: &'a [usize],
) -> impl Iterator<Item = &'a [Paragraph]> + 'a {
    starts.iter().enumerate().map(move |(i, &start)| {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        &text[start..end]
    })
}
