use crate::locale::Locale;
use crate::Paragraph;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Section kinds in canonical template order. The derived `Ord` is that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    General,
    Contacts,
    Position,
    Experience,
    Skills,
    Driving,
    About,
    Recommendations,
    Education,
    AdditionalEdu,
    Languages,
    Tests,
    Certificates,
    Citizenship,
}

impl SectionKind {
    pub const ALL: [SectionKind; 14] = [
        SectionKind::General,
        SectionKind::Contacts,
        SectionKind::Position,
        SectionKind::Experience,
        SectionKind::Skills,
        SectionKind::Driving,
        SectionKind::About,
        SectionKind::Recommendations,
        SectionKind::Education,
        SectionKind::AdditionalEdu,
        SectionKind::Languages,
        SectionKind::Tests,
        SectionKind::Certificates,
        SectionKind::Citizenship,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::General => "general",
            SectionKind::Contacts => "contacts",
            SectionKind::Position => "position",
            SectionKind::Experience => "experience",
            SectionKind::Skills => "skills",
            SectionKind::Driving => "driving",
            SectionKind::About => "about",
            SectionKind::Recommendations => "recommendations",
            SectionKind::Education => "education",
            SectionKind::AdditionalEdu => "additional_edu",
            SectionKind::Languages => "languages",
            SectionKind::Tests => "tests",
            SectionKind::Certificates => "certificates",
            SectionKind::Citizenship => "citizenship",
        }
    }

    pub fn from_name(name: &str) -> Option<SectionKind> {
        SectionKind::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn title_spec(&self) -> &'static TitleSpec {
        &TITLES[*self as usize]
    }
}

/// How a section's title is recognised. Static template data.
///
/// Each locale lists the headings the template has used for the section;
/// the first one is the display name.
#[derive(Debug)]
pub struct TitleSpec {
    pub ru: &'static [&'static str],
    pub en: &'static [&'static str],
    /// Whole-paragraph match when set, substring match otherwise.
    pub exact: bool,
    pub searchable: bool,
    /// Raw slices shorter than this (title included) are not assembled.
    pub min_lines: usize,
}

impl TitleSpec {
    /// Accepted headings for `locale`; empty for untitled sections.
    pub fn patterns(&self, locale: Locale) -> &'static [&'static str] {
        if !self.searchable {
            return &[];
        }
        match locale {
            Locale::Ru => self.ru,
            Locale::En => self.en,
        }
    }

    /// Display heading.
    pub fn pattern(&self, locale: Locale) -> Option<&'static str> {
        self.patterns(locale).first().copied()
    }

    /// Case-insensitive title test for an already flattened paragraph.
    pub fn matches(&self, locale: Locale, text: &str) -> bool {
        let text = text.trim().to_lowercase();
        self.patterns(locale).iter().any(|pattern| {
            let pattern = pattern.to_lowercase();
            if self.exact {
                text == pattern
            } else {
                text.contains(&pattern)
            }
        })
    }
}

const fn title(
    ru: &'static [&'static str],
    en: &'static [&'static str],
    exact: bool,
    min_lines: usize,
) -> TitleSpec {
    TitleSpec {
        ru,
        en,
        exact,
        searchable: true,
        min_lines,
    }
}

// Indexed by `SectionKind as usize`.
static TITLES: [TitleSpec; 14] = [
    TitleSpec {
        ru: &[],
        en: &[],
        exact: false,
        searchable: false,
        min_lines: 1,
    },
    title(&["Контакты"], &["Contacts"], true, 2),
    title(
        &["Желаемая должность и зарплата"],
        &["Desired position and salary"],
        true,
        2,
    ),
    title(&["Опыт работы"], &["Work experience"], false, 2),
    title(&["Ключевые навыки", "Навыки"], &["Key skills", "Skills"], true, 2),
    title(&["Опыт вождения"], &["Driving experience"], true, 2),
    title(&["Обо мне"], &["About me"], true, 2),
    title(&["Рекомендации"], &["References"], true, 2),
    title(
        &[
            "Высшее образование",
            "Неоконченное высшее образование",
            "Среднее специальное образование",
            "Среднее образование",
            "Образование",
        ],
        &[
            "Higher education",
            "Incomplete higher education",
            "Secondary special education",
            "Secondary education",
            "Education",
        ],
        true,
        2,
    ),
    title(
        &["Повышение квалификации, курсы"],
        &["Professional development, courses"],
        true,
        2,
    ),
    title(&["Знание языков"], &["Languages"], true, 2),
    title(&["Тесты, экзамены"], &["Tests, examinations"], true, 2),
    title(&["Электронные сертификаты"], &["Electronic certificates"], true, 2),
    title(
        &["Гражданство, время в пути до работы"],
        &["Citizenship, travel time to work"],
        true,
        2,
    ),
];

/// A detected section: its title paragraph and the paragraph range it owns.
///
/// `range` starts at the title paragraph itself, so the title is the first
/// element of [`Section::raw`]. The lead-in `general` section has no title and
/// starts at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub index: usize,
    pub range: Range<usize>,
}

impl Section {
    pub fn raw<'a>(&self, paragraphs: &'a [Paragraph]) -> &'a [Paragraph] {
        &paragraphs[self.range.clone()]
    }
}
