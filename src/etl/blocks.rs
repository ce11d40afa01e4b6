use crate::core::layout::SectionKind;
use crate::locale::{Labels, Locale};
use crate::models::resume::{
    About, AdditionalEducation, Citizenship, Contacts, Driving, Education, Experience, General,
    Languages, Position, Recommendations, Resume, SectionRecord, Skills,
};
use serde_json::{json, Value};

const EMPTY: &str = "-";

/// Renders an assembled résumé as a page of typed blocks: a personal-info
/// header followed by one heading per section.
pub struct NotionConverter<'a> {
    resume: &'a Resume,
    locale: Locale,
}

impl<'a> NotionConverter<'a> {
    pub fn new(resume: &'a Resume, locale: Locale) -> Self {
        Self { resume, locale }
    }

    fn labels(&self) -> &'static Labels {
        &self.locale.vocabulary().labels
    }

    fn general(&self) -> Option<&General> {
        match self.resume.get(SectionKind::General) {
            Some(SectionRecord::General(g)) => Some(g),
            _ => None,
        }
    }

    fn contacts(&self) -> Option<&Contacts> {
        match self.resume.get(SectionKind::Contacts) {
            Some(SectionRecord::Contacts(c)) => Some(c),
            _ => None,
        }
    }

    fn position(&self) -> Option<&Position> {
        match self.resume.get(SectionKind::Position) {
            Some(SectionRecord::Position(p)) => Some(p),
            _ => None,
        }
    }

    pub fn convert_resume(&self) -> Value {
        let mut children = self.personal();
        for (kind, record) in self.resume.iter() {
            children.extend(self.convert_section(*kind, record));
        }
        json!({
            "properties": self.title(),
            "children": children,
        })
    }

    fn title(&self) -> Value {
        let name = self.general().and_then(|g| g.name.as_deref()).unwrap_or(EMPTY);
        let content = match self.position() {
            Some(p) => format!("{} {}", name, p.name),
            None => name.to_string(),
        };
        json!({ "title": { "title": [text(&content)] } })
    }

    fn personal(&self) -> Vec<Value> {
        let labels = self.labels();
        let birthday = self.general().and_then(|g| g.birthday.as_deref()).unwrap_or(EMPTY);
        let location = self.contacts().and_then(|c| c.location.as_deref()).unwrap_or(EMPTY);
        let contacts = self
            .contacts()
            .map(|c| {
                c.phones
                    .iter()
                    .chain(&c.emails)
                    .chain(&c.links)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        vec![
            block("heading_2", vec![text(labels.personal)]),
            labelled(labels.birthday, birthday),
            labelled(labels.location, location),
            labelled(labels.contacts, &contacts),
        ]
    }

    /// Heading plus content. General and contacts live in the header.
    fn convert_section(&self, kind: SectionKind, record: &SectionRecord) -> Vec<Value> {
        let content = match record {
            SectionRecord::General(_) | SectionRecord::Contacts(_) => return Vec::new(),
            SectionRecord::Position(s) => self.convert_position(s),
            SectionRecord::Experience(s) => self.convert_experience(s),
            SectionRecord::Skills(s) => convert_skills(s),
            SectionRecord::Driving(s) => self.convert_driving(s),
            SectionRecord::About(s) => convert_about(s),
            SectionRecord::Recommendations(s) => convert_recommendations(s),
            SectionRecord::Education(s) => convert_education(s),
            SectionRecord::AdditionalEdu(s)
            | SectionRecord::Tests(s)
            | SectionRecord::Certificates(s) => convert_courses(s),
            SectionRecord::Languages(s) => convert_languages(s),
            SectionRecord::Citizenship(s) => self.convert_citizenship(s),
        };
        let heading = kind.title_spec().pattern(self.locale).unwrap_or(kind.name());

        let mut blocks = vec![block("heading_1", vec![text(heading)])];
        blocks.extend(content);
        blocks
    }

    fn convert_position(&self, section: &Position) -> Vec<Value> {
        let mut blocks = vec![block("paragraph", vec![bold(&section.name)])];
        blocks.extend(section.salary.iter().map(|s| block("paragraph", vec![text(s)])));
        blocks.extend(section.other.iter().map(|s| block("paragraph", vec![text(s)])));
        blocks
    }

    fn convert_experience(&self, section: &Experience) -> Vec<Value> {
        let mut blocks = Vec::new();
        if let Some(total) = &section.total {
            let line = format!("{} {}", self.labels().total, total);
            blocks.push(block("paragraph", vec![bold(&line)]));
        }
        for item in &section.items {
            let mut heading = format!("{} - {}", item.duration, item.company);
            if let Some(info) = &item.company_info {
                heading.push_str(", ");
                heading.push_str(info);
            }
            blocks.push(block(
                "heading_3",
                vec![json!({
                    "type": "text",
                    "text": { "content": heading },
                    "annotations": { "bold": true, "color": "gray_background" },
                })],
            ));
            blocks.push(block("paragraph", vec![bold(&item.position)]));
            blocks.push(block("paragraph", vec![text(&item.other)]));
        }
        blocks
    }

    fn convert_driving(&self, section: &Driving) -> Vec<Value> {
        let labels = self.labels();
        let own_car = if section.own_car { "+" } else { "-" };
        vec![
            block("paragraph", vec![text(&format!("{}: {}", labels.own_car, own_car))]),
            block(
                "paragraph",
                vec![text(&format!("{}: {}", labels.categories, section.categories.join(", ")))],
            ),
        ]
    }

    fn convert_citizenship(&self, section: &Citizenship) -> Vec<Value> {
        let vocab = self.locale.vocabulary();
        let rows = [
            (vocab.citizenship, Some(&section.citizenship)),
            (vocab.permission, section.permission.as_ref()),
            (vocab.commute, section.commute.as_ref()),
        ];
        rows.into_iter()
            .map(|(label, value)| {
                let value = value.map_or(EMPTY, String::as_str);
                block("paragraph", vec![text(&format!("{}: {}", label, value))])
            })
            .collect()
    }
}

fn convert_skills(section: &Skills) -> Vec<Value> {
    section
        .items
        .iter()
        .map(|item| block("bulleted_list_item", vec![text(item)]))
        .collect()
}

fn convert_about(section: &About) -> Vec<Value> {
    section
        .text
        .lines()
        .map(|line| block("paragraph", vec![text(line)]))
        .collect()
}

fn convert_recommendations(section: &Recommendations) -> Vec<Value> {
    section
        .items
        .iter()
        .map(|item| {
            let line = match &item.person {
                Some(person) => format!("{}: {}", item.org, person),
                None => item.org.clone(),
            };
            block("bulleted_list_item", vec![text(&line)])
        })
        .collect()
}

fn convert_education(section: &Education) -> Vec<Value> {
    let mut blocks = Vec::new();
    if let Some(degree) = &section.degree {
        blocks.push(block("paragraph", vec![bold(degree)]));
    }
    for item in &section.items {
        blocks.push(block("heading_3", vec![bold(&format!("{} - {}", item.name, item.year))]));
        if let Some(other) = &item.other {
            blocks.push(block("paragraph", vec![text(other)]));
        }
    }
    blocks
}

fn convert_courses(section: &AdditionalEducation) -> Vec<Value> {
    section
        .items
        .iter()
        .map(|item| {
            let mut content = vec![bold(&format!("{} - {}. ", item.name, item.year))];
            content.extend(item.other.as_deref().map(text));
            block("bulleted_list_item", content)
        })
        .collect()
}

fn convert_languages(section: &Languages) -> Vec<Value> {
    section
        .items
        .iter()
        .map(|item| {
            let line = match &item.level {
                Some(level) => format!("{}: {}", item.name, level),
                None => item.name.clone(),
            };
            block("bulleted_list_item", vec![text(&line)])
        })
        .collect()
}

fn text(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

fn bold(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content }, "annotations": { "bold": true } })
}

fn block(kind: &str, content: Vec<Value>) -> Value {
    json!({ "object": "block", "type": kind, kind: { "text": content } })
}

fn labelled(label: &str, value: &str) -> Value {
    block("paragraph", vec![bold(&format!("{}: ", label)), text(value)])
}
