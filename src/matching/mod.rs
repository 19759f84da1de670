//! Posting-to-profile similarity scoring

pub mod scorer;

pub use scorer::{ScoreBand, SimilarityScorer};
