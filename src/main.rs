//! job-scout: rank live job postings against a resume

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use job_scout::bot::{CancelToken, JobSearchOrchestrator, SearchQuery, SessionManager};
use job_scout::browser::HttpPage;
use job_scout::cli::{self, Cli, Commands, ConfigAction, SessionAction};
use job_scout::config::OutputFormat;
use job_scout::input::InputManager;
use job_scout::output::{formatter_for, ProfileSummary, ResultsStore, SearchRecord};
use job_scout::profile::{DocumentProfiler, ResumeProfile};
use job_scout::{Config, JobScoutError, Result};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Profile { resume, output } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let profile = build_profile(&resume, &config).await?;
            let summary = ProfileSummary::new(&profile, &config.search.default_location);

            let formatter = formatter_for(format, config.output.color_output);
            println!("{}", formatter.format_profile(&summary)?);
        }

        Commands::Search {
            resume,
            title,
            location,
            platform,
            top,
            output,
            no_details,
        } => {
            let platform = cli::parse_platform(&platform).map_err(JobScoutError::InvalidInput)?;
            let format = resolve_format(output.as_deref(), &config)?;

            let mut config = config;
            if no_details {
                config.collector.fetch_descriptions = false;
            }
            if let Some(top) = top {
                config.search.top_n = top;
            }

            let profile = build_profile(&resume, &config).await?;
            let title = match title {
                Some(title) => title,
                None => profile
                    .primary_title()
                    .unwrap_or(config.profiler.fallback_title.as_str())
                    .to_string(),
            };
            let location = location.unwrap_or_else(|| config.search.default_location.clone());
            let query = SearchQuery::new(&title, &location, platform)?;

            let session_config = config.clone();
            let orchestrator = JobSearchOrchestrator::from_config(&config, move |platform| {
                let page = HttpPage::new(
                    &session_config.session.user_agent,
                    Duration::from_secs(session_config.session.page_timeout_secs),
                )?;
                Ok(SessionManager::from_config(page, platform, &session_config))
            });

            let cancel = CancelToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted; stopping after the current page");
                    on_interrupt.cancel();
                }
            });

            let spinner = spinner(&format!("Searching {}", query));
            let result = orchestrator.search_report(&profile, &query, &cancel).await;
            spinner.finish_and_clear();
            orchestrator.shutdown().await;
            let report = result?;

            for notice in &report.notices {
                warn!("{}", notice);
            }

            let store = ResultsStore::new(config.results_path());
            store.save(&SearchRecord::new(
                query.clone(),
                report.postings.clone(),
                report.notices.clone(),
            ))?;
            info!("Saved results to {}", store.path().display());

            let formatter = formatter_for(format, config.output.color_output);
            println!("{}", formatter.format_postings(&query, &report.postings, &report.notices)?);
        }

        Commands::Jobs { output } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let formatter = formatter_for(format, config.output.color_output);

            match ResultsStore::new(config.results_path()).load()? {
                Some(record) => {
                    info!(
                        "Showing search from {}",
                        record.searched_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                    println!(
                        "{}",
                        formatter.format_postings(&record.query, &record.postings, &record.notices)?
                    );
                }
                None => println!("No saved search yet. Run `job-scout search` first."),
            }
        }

        Commands::Session { action } => {
            let (platform, clear) = match action {
                SessionAction::Status { platform } => (platform, false),
                SessionAction::Clear { platform } => (platform, true),
            };
            let platform = cli::parse_platform(&platform).map_err(JobScoutError::InvalidInput)?;
            let page = HttpPage::new(
                &config.session.user_agent,
                Duration::from_secs(config.session.page_timeout_secs),
            )?;
            let mut session = SessionManager::from_config(page, platform, &config);

            if clear {
                if session.clear_persisted()? {
                    println!("Removed saved {} session", platform);
                } else {
                    println!("No saved {} session", platform);
                }
            } else {
                let status = session.status();
                println!("Platform: {}", status.platform);
                println!(
                    "Credentials: {}",
                    if status.credentials_configured {
                        "configured"
                    } else if config.session.allow_guest {
                        "not set (guest mode)"
                    } else {
                        "not set"
                    }
                );
                println!("Saved cookies: {}", status.saved_cookies);
                println!("Cookie file: {}", status.cookie_file.display());
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let text = toml::to_string_pretty(&config)
                    .map_err(|e| JobScoutError::Configuration(e.to_string()))?;
                println!("{}", text);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save()?;
                println!("Configuration reset to defaults at {}", Config::config_path().display());
            }

            Some(ConfigAction::Path) => {
                let path = config_path.unwrap_or_else(Config::config_path);
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}

async fn build_profile(resume: &Path, config: &Config) -> Result<ResumeProfile> {
    cli::validate_file_extension(resume, &["pdf", "txt", "md"])
        .map_err(|e| JobScoutError::InvalidInput(format!("Resume file: {}", e)))?;

    let text = InputManager::new().extract_text(resume).await?;
    DocumentProfiler::new(&config.profiler)?.profile_text(&text)
}

fn resolve_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(format).map_err(JobScoutError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
