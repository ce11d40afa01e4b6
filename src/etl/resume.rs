use crate::config::ParserConfig;
use crate::core::language::LanguageDetector;
use crate::core::layout::{Section, SectionKind};
use crate::core::segmenter::Segmenter;
use crate::error::Result;
use crate::etl::blocks::NotionConverter;
use crate::etl::fields::{join_text, FieldsExtractor};
use crate::locale::Locale;
use crate::models::resume::{
    normalize, About, AdditionalEducation, Contacts, Driving, Education, Experience, General,
    Languages, Position, RecommendationItem, Recommendations, Record, Resume, SectionRecord,
    Skills, ValidationError,
};
use crate::Paragraph;
use log::{debug, error, info, warn};

type Built<T> = std::result::Result<T, ValidationError>;

/// One document run through detection and segmentation, ready for assembly.
#[derive(Debug, Clone)]
pub struct ResumeEtl {
    paragraphs: Vec<Paragraph>,
    sections: Vec<Section>,
    fields: FieldsExtractor,
}

impl ResumeEtl {
    /// Filter boilerplate, detect languages and segment. Fails only when the
    /// document language cannot be determined.
    pub fn new(paragraphs: Vec<Paragraph>, config: &ParserConfig) -> Result<Self> {
        let paragraphs = if config.filter_show_more {
            filter_show_more(paragraphs)
        } else {
            paragraphs
        };
        let detection = LanguageDetector::new(config).detect(&paragraphs)?;
        let segmenter = Segmenter::new(detection.template_lang, config.max_title_len);
        let sections = segmenter.populate(&paragraphs, &detection.titles);
        info!("Found {} sections in {} paragraphs", sections.len(), paragraphs.len());

        Ok(Self {
            paragraphs,
            sections,
            fields: FieldsExtractor::new(detection.template_lang, detection.doc_lang),
        })
    }

    /// Segment with known locales, skipping language detection.
    pub fn with_locales(
        paragraphs: Vec<Paragraph>,
        template_lang: Locale,
        doc_lang: Locale,
        config: &ParserConfig,
    ) -> Self {
        let paragraphs = if config.filter_show_more {
            filter_show_more(paragraphs)
        } else {
            paragraphs
        };
        let sections = Segmenter::new(template_lang, config.max_title_len).segment(&paragraphs);
        Self {
            paragraphs,
            sections,
            fields: FieldsExtractor::new(template_lang, doc_lang),
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn template_lang(&self) -> Locale {
        self.fields.template_lang()
    }

    pub fn doc_lang(&self) -> Locale {
        self.fields.doc_lang()
    }

    pub fn fields(&self) -> &FieldsExtractor {
        &self.fields
    }

    /// Assemble every detected section. Sections that fail validation are
    /// logged and left out; the rest of the document is unaffected.
    pub fn get_resume(&self) -> Resume {
        let mut resume = Resume::new();
        for section in &self.sections {
            let raw = section.raw(&self.paragraphs);
            let min_lines = section.kind.title_spec().min_lines;
            if raw.len() < min_lines {
                warn!(
                    "Section <{}> has {} lines, needs {}; skipped",
                    section.kind.name(),
                    raw.len(),
                    min_lines
                );
                continue;
            }
            if let Some(record) = self.get_section(section.kind, raw) {
                resume.insert(section.kind, record);
            }
        }
        debug!("Assembled {} of {} sections", resume.len(), self.sections.len());
        resume
    }

    /// The block document for the collaboration service.
    pub fn to_blocks(&self) -> serde_json::Value {
        NotionConverter::new(&self.get_resume(), self.template_lang()).convert_resume()
    }

    /// Assemble a section given by name; unknown names are logged and skipped.
    pub fn get_section_by_name(&self, name: &str, raw: &[Paragraph]) -> Option<SectionRecord> {
        match SectionKind::from_name(name) {
            Some(kind) => self.get_section(kind, raw),
            None => {
                error!("No getter for <{}> section found", name);
                None
            }
        }
    }

    pub fn get_section(&self, kind: SectionKind, raw: &[Paragraph]) -> Option<SectionRecord> {
        let record = match kind {
            SectionKind::General => self.get_general(raw).map(SectionRecord::General),
            SectionKind::Contacts => self.get_contacts(raw).map(SectionRecord::Contacts),
            SectionKind::Position => self.get_position(raw).map(SectionRecord::Position),
            SectionKind::Experience => self.get_experience(raw).map(SectionRecord::Experience),
            SectionKind::Skills => self.get_skills(raw).map(SectionRecord::Skills),
            SectionKind::Driving => self.get_driving(raw).map(SectionRecord::Driving),
            SectionKind::About => self.get_about(raw).map(SectionRecord::About),
            SectionKind::Recommendations => {
                self.get_recommendations(raw).map(SectionRecord::Recommendations)
            }
            SectionKind::Education => self.get_education(raw).map(SectionRecord::Education),
            SectionKind::AdditionalEdu => {
                self.get_course_list(raw).map(SectionRecord::AdditionalEdu)
            }
            SectionKind::Languages => self.get_languages(raw).map(SectionRecord::Languages),
            SectionKind::Tests => self.get_course_list(raw).map(SectionRecord::Tests),
            SectionKind::Certificates => {
                self.get_course_list(raw).map(SectionRecord::Certificates)
            }
            SectionKind::Citizenship => self
                .fields
                .extract_citizenship(body(raw))
                .checked()
                .map(SectionRecord::Citizenship),
        };
        match record {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Section <{}> dropped: {}", kind.name(), e);
                None
            }
        }
    }

    /// The lead-in has no title. A leading "resume updated" boilerplate line
    /// is dropped (keeping its timestamp), and when the next line already
    /// carries the gender token there is no name line.
    pub fn get_general(&self, raw: &[Paragraph]) -> Built<General> {
        let marker = self.template_lang().vocabulary().updated.to_lowercase();
        let mut rest = raw;
        let mut updated = None;

        if let Some(first) = rest.first() {
            let text = first.text();
            if text.trim_start().to_lowercase().starts_with(&marker) {
                updated = self.fields.extract_updated(&text);
                rest = &rest[1..];
            }
        }

        let mut name = None;
        if let Some(first) = rest.first() {
            if self.fields.extract_gender(&first.text()).is_none() {
                name = Some(normalize(first));
                rest = &rest[1..];
            }
        }

        let flat = join_text(rest);
        General {
            name,
            gender: self.fields.extract_gender(&flat),
            age: self.fields.extract_age(&flat),
            birthday: self.fields.extract_birthday(&flat),
            updated,
        }
        .checked()
    }

    pub fn get_contacts(&self, raw: &[Paragraph]) -> Built<Contacts> {
        let mut contacts = Contacts::default();
        for line in body(raw).iter().map(normalize) {
            contacts.phones.extend(self.fields.extract_phone(&line));
            contacts.emails.extend(self.fields.extract_email(&line));
            contacts.links.extend(self.fields.extract_link(&line));
            if contacts.location.is_none() {
                contacts.location = self.fields.extract_location(&line);
            }
        }
        contacts.checked()
    }

    pub fn get_position(&self, raw: &[Paragraph]) -> Built<Position> {
        let lines: Vec<String> = body(raw).iter().map(normalize).collect();
        let Some((name, rest)) = lines.split_first() else {
            return Err(ValidationError::Missing("name"));
        };
        let rest_paragraphs: Vec<Paragraph> =
            rest.iter().map(|l| Paragraph::from(l.as_str())).collect();
        let salary = self.fields.extract_salary(&rest_paragraphs);
        let other: Vec<&str> = rest
            .iter()
            .filter(|l| Some(*l) != salary.as_ref())
            .map(String::as_str)
            .collect();

        Position {
            name: name.clone(),
            salary,
            other: (!other.is_empty()).then(|| other.join("\n")),
        }
        .checked()
    }

    pub fn get_experience(&self, raw: &[Paragraph]) -> Built<Experience> {
        let total = raw
            .first()
            .and_then(|title| self.fields.extract_experience_total(&title.text()));
        Experience {
            total,
            items: self.fields.extract_experience_items(body(raw)),
        }
        .checked()
    }

    /// Each run of a skills paragraph is one skill.
    pub fn get_skills(&self, raw: &[Paragraph]) -> Built<Skills> {
        let items = body(raw)
            .iter()
            .flat_map(|p| p.parts())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Skills { items }.checked()
    }

    pub fn get_driving(&self, raw: &[Paragraph]) -> Built<Driving> {
        let lines = body(raw);
        Driving {
            own_car: self.fields.extract_own_car(lines),
            categories: self.fields.extract_driving_categories(lines),
        }
        .checked()
    }

    pub fn get_about(&self, raw: &[Paragraph]) -> Built<About> {
        let text = body(raw).iter().map(normalize).collect::<Vec<_>>().join("\n");
        About { text }.checked()
    }

    /// Organisation and contact person alternate line by line.
    pub fn get_recommendations(&self, raw: &[Paragraph]) -> Built<Recommendations> {
        let items = body(raw)
            .chunks(2)
            .map(|pair| RecommendationItem {
                org: normalize(&pair[0]),
                person: pair.get(1).map(normalize),
            })
            .collect();
        Recommendations { items }.checked()
    }

    /// An optional degree line precedes the year-keyed entries.
    pub fn get_education(&self, raw: &[Paragraph]) -> Built<Education> {
        let lines = body(raw);
        let degree = lines
            .first()
            .map(normalize)
            .filter(|l| !l.chars().all(|c| c.is_ascii_digit()))
            .and_then(|l| self.fields.extract_degree(&l));
        Education {
            degree,
            items: self.fields.extract_education_items(lines),
        }
        .checked()
    }

    fn get_course_list(&self, raw: &[Paragraph]) -> Built<AdditionalEducation> {
        AdditionalEducation {
            items: self.fields.extract_additional_edu_items(body(raw)),
        }
        .checked()
    }

    pub fn get_languages(&self, raw: &[Paragraph]) -> Built<Languages> {
        Languages {
            items: self.fields.extract_languages_items(body(raw)),
        }
        .checked()
    }
}

/// Section content without its title line.
fn body(raw: &[Paragraph]) -> &[Paragraph] {
    raw.get(1..).unwrap_or(&[])
}

/// Drop pagination markers ("show more") of every locale.
fn filter_show_more(paragraphs: Vec<Paragraph>) -> Vec<Paragraph> {
    let markers: Vec<String> = Locale::ALL
        .iter()
        .map(|l| l.vocabulary().show_more.to_lowercase())
        .collect();
    let before = paragraphs.len();
    let kept: Vec<Paragraph> = paragraphs
        .into_iter()
        .filter(|p| !markers.contains(&p.text().trim().to_lowercase()))
        .collect();
    if kept.len() != before {
        debug!("Filtered {} show-more markers", before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{EducationItem, LanguageItem};
    use chrono::NaiveDate;

    fn paras(lines: &[&str]) -> Vec<Paragraph> {
        lines.iter().map(|l| Paragraph::from(*l)).collect()
    }

    fn etl(lines: &[&str]) -> ResumeEtl {
        ResumeEtl::with_locales(paras(lines), Locale::Ru, Locale::Ru, &ParserConfig::default())
    }

    #[test]
    fn general_and_contacts_from_lead_in() {
        let etl = etl(&[
            "Иван Иванов",
            "Мужчина, 30 лет",
            "родился 15 марта 1994",
            "Контакты",
            "ivan@mail.ru",
            "+7 (912) 345-67-89",
        ]);
        let resume = etl.get_resume();

        assert_eq!(
            resume.get(SectionKind::General),
            Some(&SectionRecord::General(General {
                name: Some("Иван Иванов".into()),
                gender: Some("Мужчина".into()),
                age: Some(30),
                birthday: Some("15.03.1994".into()),
                updated: None,
            }))
        );
        assert_eq!(
            resume.get(SectionKind::Contacts),
            Some(&SectionRecord::Contacts(Contacts {
                phones: vec!["+7 (912) 345-67-89".into()],
                emails: vec!["ivan@mail.ru".into()],
                links: vec![],
                location: None,
            }))
        );
        assert_eq!(resume.len(), 2);
    }

    #[test]
    fn short_lead_in_through_language_detection() {
        let lines = paras(&[
            "Иван Иванов",
            "Мужчина, 30 лет",
            "родился 15 марта 1994",
            "Контакты",
            "ivan@mail.ru",
            "+7 (912) 345-67-89",
        ]);
        let etl = ResumeEtl::new(lines, &ParserConfig::default()).unwrap();
        assert_eq!(etl.template_lang(), Locale::Ru);
        assert_eq!(etl.doc_lang(), Locale::Ru);

        let resume = etl.get_resume();
        let Some(SectionRecord::General(general)) = resume.get(SectionKind::General) else {
            panic!("general section missing");
        };
        assert_eq!(general.name.as_deref(), Some("Иван Иванов"));
        assert_eq!(general.age, Some(30));
        assert_eq!(general.birthday.as_deref(), Some("15.03.1994"));
        let Some(SectionRecord::Contacts(contacts)) = resume.get(SectionKind::Contacts) else {
            panic!("contacts section missing");
        };
        assert_eq!(contacts.emails, vec!["ivan@mail.ru".to_string()]);
        assert_eq!(contacts.phones, vec!["+7 (912) 345-67-89".to_string()]);
    }

    #[test]
    fn boilerplate_line_and_missing_name() {
        let etl = etl(&[
            "Резюме обновлено 15.02.2021 10:30",
            "Женщина, 28 лет",
            "Контакты",
            "anna@mail.ru",
        ]);
        let resume = etl.get_resume();
        let Some(SectionRecord::General(general)) = resume.get(SectionKind::General).cloned() else {
            panic!("general section missing");
        };
        assert_eq!(general.name, None);
        assert_eq!(general.gender.as_deref(), Some("Женщина"));
        assert_eq!(general.age, Some(28));
        assert_eq!(
            general.updated,
            NaiveDate::from_ymd_opt(2021, 2, 15).unwrap().and_hms_opt(10, 30, 0)
        );
    }

    #[test]
    fn failing_section_does_not_affect_others() {
        // Name with digits invalidates only the general record.
        let etl = etl(&["R2D2", "Мужчина, 30 лет", "Контакты", "r2@mail.ru"]);
        let resume = etl.get_resume();
        assert!(!resume.contains(SectionKind::General));
        assert!(resume.contains(SectionKind::Contacts));
    }

    #[test]
    fn missing_sections_are_absent() {
        let resume = etl(&["Иван", "Мужчина", "Обо мне", "Люблю Rust"]).get_resume();
        let kinds: Vec<SectionKind> = resume.kinds().collect();
        assert_eq!(kinds, vec![SectionKind::General, SectionKind::About]);
    }

    #[test]
    fn title_without_content_is_skipped() {
        let resume = etl(&["Иван", "Навыки"]).get_resume();
        assert!(!resume.contains(SectionKind::Skills));
    }

    #[test]
    fn show_more_markers_are_filtered() {
        let etl = etl(&["Иван", "Показать еще", "Навыки", "Rust", "Show more"]);
        assert_eq!(etl.paragraphs().len(), 3);
    }

    #[test]
    fn position_and_experience() {
        let etl = etl(&[
            "Иван",
            "Желаемая должность и зарплата",
            "Python-разработчик",
            "Специализации: Программист",
            "200 000 руб.",
            "Опыт работы —3 года 1 месяц",
            "Январь 2021 — настоящее время",
            "3 года 1 месяц",
            "Рога и копыта",
            "Москва",
            "Ведущий разработчик",
            "Разработка бэкенда",
        ]);
        let resume = etl.get_resume();

        let Some(SectionRecord::Position(position)) = resume.get(SectionKind::Position) else {
            panic!("position missing");
        };
        assert_eq!(position.name, "Python-разработчик");
        assert_eq!(position.salary.as_deref(), Some("200 000 руб."));
        assert_eq!(position.other.as_deref(), Some("Специализации: Программист"));

        let Some(SectionRecord::Experience(experience)) = resume.get(SectionKind::Experience) else {
            panic!("experience missing");
        };
        assert_eq!(experience.total.as_deref(), Some("3 года 1 месяц"));
        assert_eq!(experience.items.len(), 1);
        assert_eq!(experience.items[0].company_info.as_deref(), Some("Москва"));
    }

    #[test]
    fn list_sections() {
        let mut lines = paras(&["Иван", "Навыки"]);
        lines.push(Paragraph::Parts(vec!["Python".into(), "SQL".into(), "Git".into()]));
        lines.extend(paras(&[
            "Опыт вождения",
            "Имеется собственный автомобиль",
            "Права категории B",
            "Обо мне",
            "Люблю писать код",
            "Рекомендации",
            "ООО Ромашка",
            "Петров Пётр, директор",
            "Образование",
            "Высшее образование (Бакалавр)",
            "2015",
            "МГУ",
            "Мехмат",
            "Знание языков",
            "Русский — Родной",
            "Гражданство, время в пути до работы",
            "Гражданство: Россия",
        ]));
        let etl = ResumeEtl::with_locales(lines, Locale::Ru, Locale::Ru, &ParserConfig::default());
        let resume = etl.get_resume();

        assert_eq!(
            resume.get(SectionKind::Skills),
            Some(&SectionRecord::Skills(Skills {
                items: vec!["Python".into(), "SQL".into(), "Git".into()]
            }))
        );
        assert_eq!(
            resume.get(SectionKind::Driving),
            Some(&SectionRecord::Driving(Driving { own_car: true, categories: vec!["B".into()] }))
        );
        assert_eq!(
            resume.get(SectionKind::Recommendations),
            Some(&SectionRecord::Recommendations(Recommendations {
                items: vec![RecommendationItem {
                    org: "ООО Ромашка".into(),
                    person: Some("Петров Пётр, директор".into()),
                }]
            }))
        );
        assert_eq!(
            resume.get(SectionKind::Education),
            Some(&SectionRecord::Education(Education {
                degree: Some("Бакалавр".into()),
                items: vec![EducationItem {
                    year: "2015".into(),
                    name: "МГУ".into(),
                    other: Some("Мехмат".into()),
                }],
            }))
        );
        assert_eq!(
            resume.get(SectionKind::Languages),
            Some(&SectionRecord::Languages(Languages {
                items: vec![LanguageItem { name: "Русский".into(), level: Some("Родной".into()) }]
            }))
        );
        assert!(resume.contains(SectionKind::About));
        assert!(resume.contains(SectionKind::Citizenship));
    }

    #[test]
    fn section_dispatch_by_name() {
        let etl = etl(&["Иван"]);
        let raw = paras(&["Обо мне", "Текст"]);
        assert!(matches!(etl.get_section_by_name("about", &raw), Some(SectionRecord::About(_))));
        assert_eq!(etl.get_section_by_name("hobbies", &raw), None);
    }

    #[test]
    fn assembly_is_repeatable() {
        let etl = etl(&["Иван", "Мужчина, 30 лет", "Навыки", "Rust"]);
        assert_eq!(etl.get_resume(), etl.get_resume());
    }
}
