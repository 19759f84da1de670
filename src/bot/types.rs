//! Search inputs and outputs shared by the bot modules

use crate::error::{JobScoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Kariyer,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Kariyer => "kariyer",
        }
    }

    /// Prefix of the credential environment variables
    pub fn env_prefix(&self) -> String {
        format!("JOB_SCOUT_{}", self.as_str().to_uppercase())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = JobScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Platform::Linkedin),
            "kariyer" | "kariyer.net" | "kariyernet" => Ok(Platform::Kariyer),
            other => Err(JobScoutError::InvalidInput(format!("Unknown platform: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub job_title: String,
    pub location: String,
    pub platform: Platform,
}

impl SearchQuery {
    pub fn new(job_title: &str, location: &str, platform: Platform) -> Result<Self> {
        let job_title = job_title.trim();
        if job_title.is_empty() {
            return Err(JobScoutError::InvalidInput("Job title must not be empty".to_string()));
        }
        Ok(Self {
            job_title: job_title.to_string(),
            location: location.trim().to_string(),
            platform,
        })
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{} on {}", self.job_title, self.platform)
        } else {
            write!(f, "{} in {} on {}", self.job_title, self.location, self.platform)
        }
    }
}

/// One job posting as collected from a results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub link: String,
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    match_score: Option<f64>,
}

impl Posting {
    pub fn new(title: &str, company: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            company: company.to_string(),
            link: link.to_string(),
            image_url: None,
            location: None,
            description: String::new(),
            match_score: None,
        }
    }

    /// Attach the match score; a posting is scored once
    pub fn with_score(self, score: f64) -> Self {
        Self {
            match_score: Some(score),
            ..self
        }
    }

    pub fn match_score(&self) -> Option<f64> {
        self.match_score
    }

    /// Text the scorer compares against a profile
    pub fn scoring_text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.description)
        }
    }
}

/// Cooperative cancellation flag shared between the caller and a running search
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(JobScoutError::Cancelled)
        } else {
            Ok(())
        }
    }
}
