//! Input manager for handling different file types

use crate::error::{JobScoutError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::path::Path;
use tokio::fs;

/// Routes a resume file to the extractor for its type
#[derive(Debug, Default, Clone, Copy)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a resume file and return its text
    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(JobScoutError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = FileType::from_path(path);
        if file_type == FileType::Unknown {
            return Err(JobScoutError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        info!("Extracting {:?} text from: {}", file_type, path.display());
        Self::extract_bytes(file_type, &bytes)
    }

    /// Route raw bytes to the matching extractor
    fn extract_bytes(file_type: FileType, bytes: &[u8]) -> Result<String> {
        match file_type {
            FileType::Pdf => PdfExtractor.extract(bytes),
            FileType::Text => PlainTextExtractor.extract(bytes),
            FileType::Markdown => MarkdownExtractor.extract(bytes),
            FileType::Unknown => Err(JobScoutError::UnsupportedFormat(
                "unknown document type".to_string(),
            )),
        }
    }
}
