use crate::error::{Error, Result};
use crate::Paragraph;
use log::debug;
use memmap2::Mmap;
use roxmltree::{Document, Node};
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_PART: &str = "word/document.xml";
const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

pub trait Parser {
    /// Parse a document at `path` and return its paragraphs in order.
    fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Paragraph>>;
}

/// DocxParser: extracts paragraph runs from `word/document.xml` using roxmltree.
/// Every other part of the container (styles, media, headers) is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory container.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<Paragraph>> {
        self.parse_archive(Cursor::new(bytes))
    }

    fn parse_archive<R: Read + Seek>(&self, reader: R) -> Result<Vec<Paragraph>> {
        let mut archive = ZipArchive::new(reader)?;

        let mut doc_xml_bytes = Vec::new();
        match archive.by_name(DOCUMENT_PART) {
            Ok(mut file) => {
                file.read_to_end(&mut doc_xml_bytes)?;
            }
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::MissingPart(DOCUMENT_PART.to_string()))
            }
            Err(e) => return Err(e.into()),
        }
        let doc_xml = String::from_utf8(doc_xml_bytes)?;
        let paragraphs = self.parse_document_xml(&doc_xml)?;
        debug!("Extracted {} paragraphs from {}", paragraphs.len(), DOCUMENT_PART);
        Ok(paragraphs)
    }

    /// Extract paragraphs from the main document XML.
    pub fn parse_document_xml(&self, xml: &str) -> Result<Vec<Paragraph>> {
        let doc = Document::parse(xml)?;

        let paragraphs = doc
            .descendants()
            .filter(|n| is_w(n, "p"))
            .filter_map(|p| {
                let runs: Vec<String> = p
                    .descendants()
                    .filter(|n| is_w(n, "t"))
                    .filter_map(|t| t.text())
                    .filter(|txt| !txt.is_empty())
                    .map(|txt| txt.replace('\u{a0}', " "))
                    .collect();
                let parts: Vec<String> = merge_runs(runs)
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(Paragraph::from(parts))
                }
            })
            .collect();

        Ok(paragraphs)
    }
}

impl Parser for DocxParser {
    fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Paragraph>> {
        let file_size = std::fs::metadata(path.as_ref())?.len();

        // Use memory mapping for large files (> 10MB)
        if file_size > MMAP_THRESHOLD {
            let file = File::open(path.as_ref())?;
            let mmap = unsafe { Mmap::map(&file)? };
            self.parse_archive(Cursor::new(&mmap[..]))
        } else {
            let bytes = std::fs::read(path.as_ref())?;
            self.parse_archive(Cursor::new(bytes))
        }
    }
}

fn is_w(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NS)
}

/// Glue runs that were split only by highlighting: a run ending with a space,
/// or followed by one starting with a space or comma, joins its neighbour.
/// Repeats until nothing changes.
fn merge_runs(mut runs: Vec<String>) -> Vec<String> {
    loop {
        let mut merged = Vec::with_capacity(runs.len());
        let mut i = 0;
        while i < runs.len() {
            let run = &runs[i];
            match runs.get(i + 1) {
                Some(next)
                    if run.ends_with(' ') || next.starts_with(' ') || next.starts_with(',') =>
                {
                    merged.push(format!("{}{}", run, next));
                    i += 2;
                }
                _ => {
                    merged.push(run.clone());
                    i += 1;
                }
            }
        }
        if merged == runs {
            return merged;
        }
        runs = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            W_NS, body
        )
    }

    fn docx(files: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn merges_runs_split_by_highlighting() {
        let runs = vec!["Python ".to_string(), "developer".to_string(), ", remote".to_string()];
        assert_eq!(merge_runs(runs), vec!["Python developer, remote".to_string()]);

        let runs = vec!["Python".to_string(), "SQL".to_string()];
        assert_eq!(merge_runs(runs.clone()), runs);
    }

    #[test]
    fn extracts_single_and_multi_run_paragraphs() {
        let xml = document(
            r#"<w:p><w:r><w:t>Иван</w:t></w:r>
                    <w:r><w:t xml:space="preserve"> Иванов</w:t></w:r></w:p>
               <w:p><w:r><w:t>Python</w:t></w:r><w:r><w:t>SQL</w:t></w:r></w:p>
               <w:p><w:r><w:t></w:t></w:r></w:p>
               <w:p><w:r><w:t>a&#160;b</w:t></w:r></w:p>"#,
        );
        let paragraphs = DocxParser::new().parse_document_xml(&xml).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                Paragraph::from("Иван Иванов"),
                Paragraph::Parts(vec!["Python".into(), "SQL".into()]),
                Paragraph::from("a b"),
            ]
        );
    }

    #[test]
    fn reads_only_the_main_part() {
        let bytes = docx(&[
            ("word/styles.xml", "<not-even-parsed"),
            ("word/document.xml", &document("<w:p><w:r><w:t>Контакты</w:t></w:r></w:p>")),
        ]);
        let paragraphs = DocxParser::new().parse_bytes(&bytes).unwrap();
        assert_eq!(paragraphs, vec![Paragraph::from("Контакты")]);
    }

    #[test]
    fn missing_main_part_is_reported() {
        let bytes = docx(&[("word/styles.xml", "<x/>")]);
        let err = DocxParser::new().parse_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn non_zip_input_is_rejected() {
        let err = DocxParser::new().parse_bytes(b"plain text").unwrap_err();
        assert!(matches!(err, Error::Zip(_)));
    }

    #[test]
    fn parses_from_path() {
        let xml = document("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>");
        let bytes = docx(&[("word/document.xml", &xml)]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        let paragraphs = DocxParser::new().parse(file.path()).unwrap();
        assert_eq!(paragraphs, vec![Paragraph::from("Hello")]);
    }
}
