//! Resume profiling: keywords and inferred job titles

pub mod profiler;
pub mod text_processor;
pub mod vocabulary;

pub use profiler::DocumentProfiler;

use serde::Serialize;
use std::collections::BTreeSet;

/// Title used when nothing in a resume names or implies one
pub const FALLBACK_TITLE: &str = "General Candidate";

/// Normalized keyword/title representation of a resume.
///
/// Built once per upload and never mutated afterwards. `job_titles` always
/// holds at least one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeProfile {
    keywords: BTreeSet<String>,
    job_titles: Vec<String>,
    raw_text: String,
}

impl ResumeProfile {
    pub(crate) fn new(keywords: BTreeSet<String>, mut job_titles: Vec<String>, raw_text: String) -> Self {
        if job_titles.is_empty() {
            job_titles.push(FALLBACK_TITLE.to_string());
        }
        Self {
            keywords,
            job_titles,
            raw_text,
        }
    }

    /// Profile holding only keywords, for scoring ad-hoc text.
    /// Its single title is [`FALLBACK_TITLE`].
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            keywords.into_iter().map(|k| k.into().to_lowercase()).collect(),
            Vec::new(),
            String::new(),
        )
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn job_titles(&self) -> &[String] {
        &self.job_titles
    }

    pub fn primary_title(&self) -> Option<&str> {
        self.job_titles.first().map(String::as_str)
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}
