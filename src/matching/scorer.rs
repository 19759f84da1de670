//! Term-frequency cosine similarity between a resume profile and posting text

use crate::config::ScoringConfig;
use crate::profile::text_processor::TextProcessor;
use crate::profile::vocabulary::count_phrase;
use crate::profile::ResumeProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display band of a match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Strong
        } else if score >= 50.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

pub struct SimilarityScorer {
    processor: TextProcessor,
    cosine_weight: f64,
    coverage_weight: f64,
}

impl SimilarityScorer {
    pub fn new(config: &ScoringConfig, processor: TextProcessor) -> Self {
        Self {
            processor,
            cosine_weight: config.cosine_weight.max(0.0),
            coverage_weight: config.coverage_weight.max(0.0),
        }
    }

    /// Compatibility of `posting_text` with the profile, in [0, 100].
    ///
    /// Both sides become term-frequency vectors over their joint vocabulary:
    /// one unit per profile keyword against the posting's token counts (plus
    /// counts of multi-word keywords). Exactly 0 when either side is empty
    /// or nothing overlaps.
    pub fn score(&self, profile: &ResumeProfile, posting_text: &str) -> f64 {
        let keywords = profile.keywords();
        if keywords.is_empty() || posting_text.trim().is_empty() {
            return 0.0;
        }

        let posting = self.posting_vector(profile, posting_text);

        // Ordered iteration keeps the floating point sums reproducible
        let matched: Vec<f64> = keywords
            .iter()
            .filter_map(|k| posting.get(k).copied())
            .collect();
        if matched.is_empty() {
            return 0.0;
        }

        let dot: f64 = matched.iter().sum();
        let profile_norm = (keywords.len() as f64).sqrt();
        let posting_norm = posting.values().map(|tf| tf * tf).sum::<f64>().sqrt();
        let cosine = if posting_norm == 0.0 {
            0.0
        } else {
            dot / (profile_norm * posting_norm)
        };
        let coverage = matched.len() as f64 / keywords.len() as f64;

        let total_weight = self.cosine_weight + self.coverage_weight;
        let blended = if total_weight == 0.0 {
            cosine
        } else {
            (cosine * self.cosine_weight + coverage * self.coverage_weight) / total_weight
        };

        let score = (blended * 100.0).clamp(0.0, 100.0);
        (score * 10.0).round() / 10.0
    }

    fn posting_vector(&self, profile: &ResumeProfile, posting_text: &str) -> BTreeMap<String, f64> {
        let normalized = self.processor.normalize(posting_text);
        let mut vector: BTreeMap<String, f64> = BTreeMap::new();

        for token in self.processor.tokenize_normalized(&normalized) {
            *vector.entry(token).or_insert(0.0) += 1.0;
        }

        for keyword in profile.keywords() {
            if self.processor.is_single_token(keyword) {
                continue;
            }
            let count = count_phrase(&normalized, keyword);
            if count > 0 {
                vector.insert(keyword.clone(), count as f64);
            }
        }

        vector
    }
}
