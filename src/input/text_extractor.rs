//! Text extraction from document bytes

use crate::error::{JobScoutError, Result};
use pulldown_cmark::{Event, Parser, Tag};

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pages come back concatenated in document order
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            JobScoutError::PdfExtraction(format!("Failed to extract text from PDF: {}", e))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let markdown = String::from_utf8_lossy(bytes);
        let mut text = String::new();

        for event in Parser::new(&markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak => text.push(' '),
                Event::HardBreak => text.push('\n'),
                Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_)) => {
                    text.push('\n')
                }
                _ => {}
            }
        }

        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_formatting_is_stripped() {
        let md = b"# Jane Roe\n\n**Backend Developer** with `Rust` and *Python*.\n\n- Docker\n- SQL\n";
        let text = MarkdownExtractor.extract(md).unwrap();

        assert!(text.contains("Jane Roe"));
        assert!(text.contains("Backend Developer with Rust and Python."));
        assert!(text.contains("Docker"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_plain_text_tolerates_invalid_utf8() {
        let text = PlainTextExtractor.extract(&[b'o', b'k', 0xff]).unwrap();
        assert!(text.starts_with("ok"));
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        let result = PdfExtractor.extract(b"definitely not a pdf");
        assert!(matches!(result, Err(JobScoutError::PdfExtraction(_))));
    }
}
