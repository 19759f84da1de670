//! Configuration management for job-scout

use crate::error::{JobScoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub profiler: ProfilerConfig,
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
    pub collector: CollectorConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Number of most frequent tokens kept as keywords
    pub top_k: usize,
    pub min_token_length: usize,
    pub max_titles: usize,
    /// Skill signals a title needs when its name never appears in the text
    pub min_title_signals: usize,
    pub fallback_title: String,
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
    #[serde(default)]
    pub extra_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub cosine_weight: f64,
    pub coverage_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
    pub allow_guest: bool,
    pub user_agent: String,
    pub page_timeout_secs: u64,
    pub action_delay_min_ms: u64,
    pub action_delay_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub max_results: usize,
    pub max_pages: usize,
    pub fetch_descriptions: bool,
    pub description_max_chars: usize,
    pub retry_attempts: u32,
    pub backoff_min_ms: u64,
    pub backoff_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_n: usize,
    pub busy_policy: BusyPolicy,
    pub default_location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Wait for the running search to finish
    Queue,
    /// Fail fast with `BotBusy`
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("job-scout");

        Self {
            profiler: ProfilerConfig {
                top_k: 15,
                min_token_length: 3,
                max_titles: 4,
                min_title_signals: 2,
                fallback_title: crate::profile::FALLBACK_TITLE.to_string(),
                extra_stop_words: Vec::new(),
                extra_skills: Vec::new(),
            },
            scoring: ScoringConfig {
                cosine_weight: 1.0,
                coverage_weight: 0.0,
            },
            session: SessionConfig {
                data_dir,
                allow_guest: true,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                page_timeout_secs: 15,
                action_delay_min_ms: 300,
                action_delay_max_ms: 600,
            },
            collector: CollectorConfig {
                max_results: 200,
                max_pages: 8,
                fetch_descriptions: true,
                description_max_chars: 2000,
                retry_attempts: 2,
                backoff_min_ms: 500,
                backoff_max_ms: 1500,
            },
            search: SearchConfig {
                top_n: 50,
                busy_policy: BusyPolicy::Queue,
                default_location: "Istanbul".to_string(),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| JobScoutError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| JobScoutError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("job-scout")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(JobScoutError::Configuration(msg.to_string()));

        if self.profiler.max_titles == 0 || self.profiler.max_titles > 5 {
            return invalid("profiler.max_titles must be between 1 and 5");
        }
        if self.profiler.min_token_length == 0 {
            return invalid("profiler.min_token_length must be positive");
        }
        if self.profiler.fallback_title.trim().is_empty() {
            return invalid("profiler.fallback_title must not be empty");
        }
        if self.scoring.cosine_weight < 0.0
            || self.scoring.coverage_weight < 0.0
            || self.scoring.cosine_weight + self.scoring.coverage_weight <= 0.0
        {
            return invalid("scoring weights must be non-negative and not both zero");
        }
        if self.session.action_delay_min_ms > self.session.action_delay_max_ms {
            return invalid("session.action_delay_min_ms exceeds action_delay_max_ms");
        }
        if self.session.page_timeout_secs == 0 {
            return invalid("session.page_timeout_secs must be positive");
        }
        if self.collector.backoff_min_ms > self.collector.backoff_max_ms {
            return invalid("collector.backoff_min_ms exceeds backoff_max_ms");
        }
        if self.collector.max_pages == 0 || self.collector.max_results == 0 {
            return invalid("collector.max_pages and max_results must be positive");
        }
        if self.collector.retry_attempts == 0 {
            return invalid("collector.retry_attempts must be at least 1");
        }
        if self.search.top_n == 0 {
            return invalid("search.top_n must be positive");
        }
        Ok(())
    }

    pub fn cookie_dir(&self) -> PathBuf {
        self.session.data_dir.join("sessions")
    }

    pub fn results_path(&self) -> PathBuf {
        self.session.data_dir.join("last_search.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip_keeps_policies() {
        let mut config = Config::default();
        config.search.busy_policy = BusyPolicy::Reject;
        config.output.format = OutputFormat::Markdown;

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("busy_policy = \"reject\""));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.search.busy_policy, BusyPolicy::Reject);
        assert_eq!(parsed.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_validate_rejects_inverted_delay_range() {
        let mut config = Config::default();
        config.session.action_delay_min_ms = 900;
        config.session.action_delay_max_ms = 100;
        assert!(matches!(config.validate(), Err(JobScoutError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_too_many_titles() {
        let mut config = Config::default();
        config.profiler.max_titles = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.collector.max_pages = 3;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.collector.max_pages, 3);
    }
}
