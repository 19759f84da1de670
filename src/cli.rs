//! CLI interface for job-scout

use crate::bot::Platform;
use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "job-scout")]
#[command(about = "Profile a resume and rank live job postings against it")]
#[command(long_about = "Extract keywords and likely job titles from a resume, collect postings from LinkedIn or Kariyer.net, and rank them by similarity to the resume")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the keywords and job titles extracted from a resume
    Profile {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Search a job board and rank postings against a resume
    Search {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job title to search for (defaults to the best title inferred from the resume)
        #[arg(short, long)]
        title: Option<String>,

        /// Location to search in
        #[arg(short, long)]
        location: Option<String>,

        /// Platform: linkedin, kariyer
        #[arg(short, long, default_value = "linkedin")]
        platform: String,

        /// Number of ranked postings to keep
        #[arg(long)]
        top: Option<usize>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Skip opening each posting for its description
        #[arg(long)]
        no_details: bool,
    },

    /// Show the results of the last search
    Jobs {
        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inspect or clear saved login sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show saved session details
    Status {
        #[arg(short, long, default_value = "linkedin")]
        platform: String,
    },

    /// Delete saved cookies
    Clear {
        #[arg(short, long, default_value = "linkedin")]
        platform: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

pub fn parse_platform(platform: &str) -> Result<Platform, String> {
    platform.parse::<Platform>().map_err(|e| e.to_string())
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("MD").unwrap(), OutputFormat::Markdown);
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), &["pdf", "txt", "md"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &["pdf"]).is_err());
        assert!(validate_file_extension(Path::new("cv"), &["pdf"]).is_err());
    }

    #[test]
    fn test_search_command_parses() {
        let cli = Cli::try_parse_from([
            "job-scout", "search", "--resume", "cv.pdf", "--platform", "kariyer", "--no-details",
        ])
        .unwrap();

        match cli.command {
            Commands::Search { platform, no_details, title, .. } => {
                assert_eq!(parse_platform(&platform).unwrap(), Platform::Kariyer);
                assert!(no_details);
                assert!(title.is_none());
            }
            _ => panic!("expected search command"),
        }
    }
}
