use crate::core::layout::{Section, SectionKind};
use crate::locale::Locale;
use crate::Paragraph;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where a section title was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleMatch {
    pub title: String,
    pub index: usize,
}

/// Splits a paragraph sequence into labelled sections for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    locale: Locale,
    max_title_len: usize,
}

impl Segmenter {
    pub fn new(locale: Locale, max_title_len: usize) -> Self {
        Self { locale, max_title_len }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Locate section titles in canonical order.
    ///
    /// Each kind takes its first match after the previously found title, so
    /// indices are strictly increasing and title words repeated inside body
    /// text of an earlier section never open a later one. The untitled
    /// `general` section is always present at index 0.
    pub fn fetch_sections(&self, paragraphs: &[Paragraph]) -> BTreeMap<SectionKind, TitleMatch> {
        let mut found = BTreeMap::new();
        found.insert(
            SectionKind::General,
            TitleMatch { title: String::new(), index: 0 },
        );

        let mut prev: Option<usize> = None;
        for kind in SectionKind::ALL {
            let spec = kind.title_spec();
            if spec.pattern(self.locale).is_none() {
                continue;
            }
            let start = prev.map_or(0, |p| p + 1);
            let hit = paragraphs.iter().enumerate().skip(start).find_map(|(i, p)| {
                let text = p.text();
                let is_title = text.chars().count() < self.max_title_len
                    && spec.matches(self.locale, &text);
                is_title.then(|| (i, text.trim().to_string()))
            });
            if let Some((index, title)) = hit {
                debug!("[{}] section '{}' at paragraph {}", self.locale, kind.name(), index);
                found.insert(kind, TitleMatch { title, index });
                prev = Some(index);
            }
        }
        found
    }

    /// Turn title positions into contiguous paragraph ranges. Every paragraph
    /// lands in exactly one section; the last one runs to the end.
    pub fn populate(
        &self,
        paragraphs: &[Paragraph],
        titles: &BTreeMap<SectionKind, TitleMatch>,
    ) -> Vec<Section> {
        let ordered: Vec<(SectionKind, &TitleMatch)> =
            titles.iter().map(|(k, t)| (*k, t)).collect();

        ordered
            .iter()
            .enumerate()
            .map(|(pos, (kind, title))| {
                let end = ordered
                    .get(pos + 1)
                    .map_or(paragraphs.len(), |(_, next)| next.index);
                Section {
                    kind: *kind,
                    title: title.title.clone(),
                    index: title.index,
                    range: title.index..end,
                }
            })
            .collect()
    }

    pub fn segment(&self, paragraphs: &[Paragraph]) -> Vec<Section> {
        let titles = self.fetch_sections(paragraphs);
        self.populate(paragraphs, &titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(lines: &[&str]) -> Vec<Paragraph> {
        lines.iter().map(|l| Paragraph::from(*l)).collect()
    }

    #[test]
    fn finds_titles_in_template_order() {
        let doc = paragraphs(&[
            "Иван Иванов",
            "Мужчина, 30 лет",
            "Контакты",
            "ivan@mail.ru",
            "Опыт работы —6 лет",
            "Май 2019 — настоящее время",
            "Обо мне",
            "Люблю писать код",
        ]);
        let titles = Segmenter::new(Locale::Ru, 60).fetch_sections(&doc);

        let found: Vec<(SectionKind, usize)> = titles.iter().map(|(k, t)| (*k, t.index)).collect();
        assert_eq!(
            found,
            vec![
                (SectionKind::General, 0),
                (SectionKind::Contacts, 2),
                (SectionKind::Experience, 4),
                (SectionKind::About, 6),
            ]
        );
        assert_eq!(titles[&SectionKind::Experience].title, "Опыт работы —6 лет");
    }

    #[test]
    fn title_before_previous_match_is_ignored() {
        // "Навыки" precedes "Опыт работы" here, so it cannot open Skills.
        let doc = paragraphs(&["Имя", "Навыки", "Опыт работы", "Май 2020", "Обо мне", "текст"]);
        let titles = Segmenter::new(Locale::Ru, 60).fetch_sections(&doc);
        assert!(!titles.contains_key(&SectionKind::Skills));
        assert_eq!(titles[&SectionKind::Experience].index, 2);
        assert_eq!(titles[&SectionKind::About].index, 4);
    }

    #[test]
    fn repeated_title_word_in_body_does_not_reopen() {
        let doc = paragraphs(&[
            "Имя",
            "Контакты",
            "a@b.ru",
            "Обо мне",
            "Контакты",
            "Знание языков",
            "Русский — Родной",
        ]);
        let sections = Segmenter::new(Locale::Ru, 60).segment(&doc);
        let kinds: Vec<SectionKind> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::General,
                SectionKind::Contacts,
                SectionKind::About,
                SectionKind::Languages,
            ]
        );
        let about = &sections[2];
        assert_eq!(about.range, 3..5);
    }

    #[test]
    fn long_paragraph_is_not_a_title() {
        let doc = paragraphs(&[
            "Имя",
            "Обо мне",
            "Опыт работы в крупных компаниях помог мне вырасти как специалисту",
        ]);
        let titles = Segmenter::new(Locale::Ru, 60).fetch_sections(&doc);
        assert!(!titles.contains_key(&SectionKind::Experience));
    }

    #[test]
    fn multi_run_titles_are_flattened() {
        let doc = vec![
            Paragraph::from("Имя"),
            Paragraph::Parts(vec!["Кон".into(), "такты".into()]),
            Paragraph::from("a@b.ru"),
        ];
        let titles = Segmenter::new(Locale::Ru, 60).fetch_sections(&doc);
        assert_eq!(titles[&SectionKind::Contacts].index, 1);
    }

    #[test]
    fn ranges_cover_every_paragraph_once() {
        let doc = paragraphs(&[
            "Иван",
            "Контакты",
            "a@b.ru",
            "+7 912 345-67-89",
            "Навыки",
            "Rust",
            "Знание языков",
            "Русский — Родной",
        ]);
        let sections = Segmenter::new(Locale::Ru, 60).segment(&doc);

        let mut covered = Vec::new();
        for s in &sections {
            covered.extend(s.range.clone());
        }
        assert_eq!(covered, (0..doc.len()).collect::<Vec<_>>());
        assert_eq!(sections[0].raw(&doc), &doc[0..1]);
        assert_eq!(sections[1].raw(&doc)[0], Paragraph::from("Контакты"));
    }

    #[test]
    fn template_headings_for_skills_and_education() {
        let doc = paragraphs(&[
            "Иван",
            "Опыт работы",
            "Май 2019",
            "Ключевые навыки",
            "Python",
            "Высшее образование",
            "2015",
            "МГУ",
        ]);
        let titles = Segmenter::new(Locale::Ru, 60).fetch_sections(&doc);
        let found: Vec<(SectionKind, usize)> = titles.iter().map(|(k, t)| (*k, t.index)).collect();
        assert_eq!(
            found,
            vec![
                (SectionKind::General, 0),
                (SectionKind::Experience, 1),
                (SectionKind::Skills, 3),
                (SectionKind::Education, 5),
            ]
        );

        let doc = paragraphs(&["John", "Key skills", "Rust", "Higher education", "2015", "MIT"]);
        let titles = Segmenter::new(Locale::En, 60).fetch_sections(&doc);
        assert_eq!(titles[&SectionKind::Skills].index, 1);
        assert_eq!(titles[&SectionKind::Education].index, 3);
    }

    #[test]
    fn other_locale_finds_nothing() {
        let doc = paragraphs(&["John", "Contacts", "a@b.com"]);
        let titles = Segmenter::new(Locale::Ru, 60).fetch_sections(&doc);
        assert_eq!(titles.len(), 1);
        let titles = Segmenter::new(Locale::En, 60).fetch_sections(&doc);
        assert_eq!(titles.len(), 2);
    }
}
