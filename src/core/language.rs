use crate::config::ParserConfig;
use crate::core::layout::SectionKind;
use crate::core::segmenter::{Segmenter, TitleMatch};
use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::Paragraph;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use whatlang::Detector;

/// Languages resolved for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Locale whose section-title vocabulary the document uses.
    pub template_lang: Locale,
    /// Natural language of the free text.
    pub doc_lang: Locale,
    /// Titles found under `template_lang`, reused by the pipeline.
    pub titles: BTreeMap<SectionKind, TitleMatch>,
}

pub struct LanguageDetector {
    supported: Vec<Locale>,
    default_locale: Locale,
    min_confidence: f64,
    foreign_confidence: f64,
    max_title_len: usize,
    restricted: Detector,
}

impl LanguageDetector {
    pub fn new(config: &ParserConfig) -> Self {
        let supported = if config.supported_locales.is_empty() {
            vec![config.default_locale]
        } else {
            config.supported_locales.clone()
        };
        let restricted = Detector::with_allowlist(supported.iter().map(Locale::whatlang).collect());
        Self {
            supported,
            default_locale: config.default_locale,
            min_confidence: config.min_confidence,
            foreign_confidence: config.foreign_confidence,
            max_title_len: config.max_title_len,
            restricted,
        }
    }

    pub fn detect(&self, paragraphs: &[Paragraph]) -> Result<Detection> {
        let (template_lang, titles) = self.template_lang(paragraphs);
        let body = body_text(paragraphs, &titles);
        let doc_lang = self.doc_lang(&body)?;
        info!("Template language: {}, document language: {}", template_lang, doc_lang);
        Ok(Detection {
            template_lang,
            doc_lang,
            titles,
        })
    }

    /// Run title matching once per locale; the locale with strictly more
    /// titles wins, ties go to the default locale.
    pub fn template_lang(
        &self,
        paragraphs: &[Paragraph],
    ) -> (Locale, BTreeMap<SectionKind, TitleMatch>) {
        let mut best = (
            self.default_locale,
            self.titles_for(self.default_locale, paragraphs),
        );
        for &locale in &self.supported {
            if locale == best.0 {
                continue;
            }
            let titles = self.titles_for(locale, paragraphs);
            debug!("[{}] {} section titles", locale, titles.len() - 1);
            if titles.len() > best.1.len() {
                best = (locale, titles);
            }
        }
        best
    }

    /// Detect the body language among the supported locales.
    ///
    /// Text that is confidently in some other language is rejected first.
    /// Anything less certain is ranked over the supported locales only, so
    /// short Russian text that scores close to a sibling language still
    /// resolves to Russian.
    pub fn doc_lang(&self, text: &str) -> Result<Locale> {
        let Some(global) = whatlang::detect(text) else {
            warn!("No language signal in {} chars of body text", text.chars().count());
            return Err(Error::LanguageUndetected);
        };
        debug!(
            "Unrestricted detection: {:?} (confidence {:.2})",
            global.lang(),
            global.confidence()
        );
        let foreign = self.locale_of(global.lang()).is_none();
        if foreign && global.confidence() >= self.foreign_confidence {
            warn!("Body text is {:?}, not a supported language", global.lang());
            return Err(Error::LanguageUndetected);
        }

        let info = self.restricted.detect(text).ok_or(Error::LanguageUndetected)?;
        debug!(
            "Restricted detection: {:?} (confidence {:.2})",
            info.lang(),
            info.confidence()
        );
        match self.locale_of(info.lang()) {
            Some(locale) if info.confidence() >= self.min_confidence => Ok(locale),
            _ => {
                warn!(
                    "Detected {:?} below confidence {:.2}",
                    info.lang(),
                    self.min_confidence
                );
                Err(Error::LanguageUndetected)
            }
        }
    }

    fn locale_of(&self, lang: whatlang::Lang) -> Option<Locale> {
        self.supported.iter().copied().find(|l| l.whatlang() == lang)
    }

    fn titles_for(
        &self,
        locale: Locale,
        paragraphs: &[Paragraph],
    ) -> BTreeMap<SectionKind, TitleMatch> {
        Segmenter::new(locale, self.max_title_len).fetch_sections(paragraphs)
    }
}

/// Paragraphs that are not section titles, joined with spaces, so title
/// vocabulary does not drown the body signal.
fn body_text(paragraphs: &[Paragraph], titles: &BTreeMap<SectionKind, TitleMatch>) -> String {
    let title_indices: HashSet<usize> = titles
        .iter()
        .filter(|(kind, _)| **kind != SectionKind::General)
        .map(|(_, t)| t.index)
        .collect();

    paragraphs
        .iter()
        .enumerate()
        .filter(|(i, _)| !title_indices.contains(i))
        .map(|(_, p)| p.text().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RU_TEXT: &str = "Я опытный разработчик, который любит писать быстрые \
        и надёжные программы. Мы вместе с командой создали систему для обработки \
        заказов, которой пользуются тысячи людей.";
    const EN_TEXT: &str = "I am a software engineer with ten years of experience \
        building distributed systems and web services for large companies around the world.";
    const DE_TEXT: &str = "Ich arbeite seit vielen Jahren als Softwareentwickler in einem großen \
        Unternehmen und schreibe jeden Tag Programme für unsere Kunden in ganz Deutschland. \
        Außerdem leite ich ein kleines Team und kümmere mich um die Ausbildung der neuen Kollegen, \
        die bei uns ihre ersten Schritte in der Entwicklung machen.";
    /// Body of a typical Russian lead-in: names, numbers and a few words.
    const RU_LEAD_IN: &str =
        "Иван Иванов Мужчина, 30 лет родился 15 марта 1994 ivan@mail.ru +7 (912) 345-67-89";

    fn detector() -> LanguageDetector {
        LanguageDetector::new(&ParserConfig::default())
    }

    fn paragraphs(lines: &[&str]) -> Vec<Paragraph> {
        lines.iter().map(|l| Paragraph::from(*l)).collect()
    }

    #[test]
    fn detects_supported_body_languages() {
        assert_eq!(detector().doc_lang(RU_TEXT).unwrap(), Locale::Ru);
        assert_eq!(detector().doc_lang(EN_TEXT).unwrap(), Locale::En);
    }

    #[test]
    fn unsupported_language_is_fatal() {
        assert!(matches!(detector().doc_lang(DE_TEXT), Err(Error::LanguageUndetected)));
        assert!(matches!(detector().doc_lang(""), Err(Error::LanguageUndetected)));
        assert!(matches!(detector().doc_lang("12345 67 89"), Err(Error::LanguageUndetected)));
    }

    #[test]
    fn short_russian_text_is_ranked_among_supported_locales() {
        assert_eq!(detector().doc_lang(RU_LEAD_IN).unwrap(), Locale::Ru);

        let doc = paragraphs(&[
            "Иван Иванов",
            "Мужчина, 30 лет",
            "родился 15 марта 1994",
            "Контакты",
            "ivan@mail.ru",
            "+7 (912) 345-67-89",
        ]);
        let detection = detector().detect(&doc).unwrap();
        assert_eq!(detection.template_lang, Locale::Ru);
        assert_eq!(detection.doc_lang, Locale::Ru);
    }

    #[test]
    fn foreign_confidence_bounds_the_fallback() {
        // Zero means any unsupported top candidate is fatal.
        let config = ParserConfig { foreign_confidence: 0.0, ..ParserConfig::default() };
        let strict = LanguageDetector::new(&config);
        assert!(matches!(strict.doc_lang(DE_TEXT), Err(Error::LanguageUndetected)));
        assert_eq!(strict.doc_lang(EN_TEXT).unwrap(), Locale::En);
    }

    #[test]
    fn mixed_text_resolves_to_dominant_script() {
        // The detector is deterministic: the script with more letters decides.
        let mixed = format!("{} Senior developer.", RU_TEXT);
        assert_eq!(detector().doc_lang(&mixed).unwrap(), Locale::Ru);
        let mixed = format!("{} Привет.", EN_TEXT);
        assert_eq!(detector().doc_lang(&mixed).unwrap(), Locale::En);
    }

    #[test]
    fn confidence_floor_rejects_weak_detection() {
        let config = ParserConfig { min_confidence: 1.5, ..ParserConfig::default() };
        let strict = LanguageDetector::new(&config);
        assert!(matches!(strict.doc_lang(EN_TEXT), Err(Error::LanguageUndetected)));
    }

    #[test]
    fn template_lang_prefers_more_titles() {
        let doc = paragraphs(&[
            "John Smith",
            "Contacts",
            "john@mail.com",
            "Skills",
            "Rust",
            "About me",
            EN_TEXT,
        ]);
        let (locale, titles) = detector().template_lang(&doc);
        assert_eq!(locale, Locale::En);
        assert_eq!(titles.len(), 4);
    }

    #[test]
    fn template_lang_tie_goes_to_default() {
        let doc = paragraphs(&["Name", EN_TEXT]);
        assert_eq!(detector().template_lang(&doc).0, Locale::Ru);

        let config = ParserConfig { default_locale: Locale::En, ..ParserConfig::default() };
        assert_eq!(LanguageDetector::new(&config).template_lang(&doc).0, Locale::En);
    }

    #[test]
    fn titles_are_excluded_from_body_text() {
        let doc = paragraphs(&["Иван", "Контакты", "ivan@mail.ru"]);
        let (_, titles) = detector().template_lang(&doc);
        assert_eq!(body_text(&doc, &titles), "Иван ivan@mail.ru");
    }

    #[test]
    fn english_template_with_russian_body() {
        let doc = paragraphs(&["Иван Иванов", "Contacts", "ivan@mail.ru", "About me", RU_TEXT]);
        let detection = detector().detect(&doc).unwrap();
        assert_eq!(detection.template_lang, Locale::En);
        assert_eq!(detection.doc_lang, Locale::Ru);
    }

    #[test]
    fn no_titles_and_foreign_body_is_fatal() {
        let doc = paragraphs(&["Hans Müller", DE_TEXT]);
        assert!(matches!(detector().detect(&doc), Err(Error::LanguageUndetected)));
    }
}
