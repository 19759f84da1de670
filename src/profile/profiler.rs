//! Document profiler: resume text to `ResumeProfile`

use crate::config::ProfilerConfig;
use crate::error::{JobScoutError, Result};
use crate::input::text_extractor::{PdfExtractor, TextExtractor};
use crate::profile::text_processor::TextProcessor;
use crate::profile::vocabulary::{SkillVocabulary, TitleVocabulary};
use crate::profile::ResumeProfile;
use log::{debug, info};
use std::collections::{BTreeSet, HashMap, HashSet};

pub struct DocumentProfiler {
    processor: TextProcessor,
    skills: SkillVocabulary,
    titles: TitleVocabulary,
    top_k: usize,
    max_titles: usize,
    min_title_signals: usize,
    fallback_title: String,
}

impl DocumentProfiler {
    pub fn new(config: &ProfilerConfig) -> Result<Self> {
        Ok(Self {
            processor: TextProcessor::new(config.min_token_length, &config.extra_stop_words),
            skills: SkillVocabulary::new(&config.extra_skills)?,
            titles: TitleVocabulary::new()?,
            top_k: config.top_k,
            max_titles: config.max_titles,
            min_title_signals: config.min_title_signals,
            fallback_title: config.fallback_title.clone(),
        })
    }

    /// Profile a PDF resume from its raw bytes
    pub fn extract(&self, document_bytes: &[u8]) -> Result<ResumeProfile> {
        let text = PdfExtractor.extract(document_bytes)?;
        self.profile_text(&text)
    }

    /// Profile already extracted resume text
    pub fn profile_text(&self, text: &str) -> Result<ResumeProfile> {
        let raw_text = text.trim();
        if raw_text.is_empty() {
            return Err(JobScoutError::EmptyDocument);
        }

        let normalized = self.processor.normalize(raw_text);
        let tokens = self.processor.tokenize_normalized(&normalized);
        let skill_hits = self.skills.find(&normalized);

        let mut keywords: BTreeSet<String> = self.top_tokens(&tokens).into_iter().collect();
        keywords.extend(skill_hits.iter().cloned());

        let present: HashSet<String> = tokens.into_iter().chain(skill_hits).collect();
        let job_titles = self.titles.infer(
            &normalized,
            &present,
            self.max_titles,
            self.min_title_signals,
            &self.fallback_title,
        );

        info!(
            "Profiled resume: {} keywords, titles: {}",
            keywords.len(),
            job_titles.join(", ")
        );

        Ok(ResumeProfile::new(keywords, job_titles, raw_text.to_string()))
    }

    /// Most frequent tokens; equal counts keep first-occurrence order
    fn top_tokens(&self, tokens: &[String]) -> Vec<String> {
        let mut freq: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, token) in tokens.iter().enumerate() {
            freq.entry(token.as_str()).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, (usize, usize))> = freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

        debug!("{} distinct tokens, keeping {}", ranked.len(), self.top_k);
        ranked
            .into_iter()
            .take(self.top_k)
            .map(|(token, _)| token.to_string())
            .collect()
    }
}
