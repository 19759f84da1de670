//! Console, JSON and Markdown rendering of profiles and ranked postings

use crate::bot::{Posting, SearchQuery};
use crate::config::OutputFormat;
use crate::error::Result;
use crate::matching::ScoreBand;
use crate::profile::ResumeProfile;
use colored::{Color, Colorize};
use serde::Serialize;

/// Flat view of a profile as shown to users
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub job_title: String,
    pub job_titles: Vec<String>,
    pub location: String,
    pub keywords: Vec<String>,
}

impl ProfileSummary {
    pub fn new(profile: &ResumeProfile, location: &str) -> Self {
        Self {
            job_title: profile.primary_title().unwrap_or_default().to_string(),
            job_titles: profile.job_titles().to_vec(),
            location: location.to_string(),
            keywords: profile.keywords().iter().cloned().collect(),
        }
    }
}

pub trait OutputFormatter {
    fn format_profile(&self, summary: &ProfileSummary) -> Result<String>;

    fn format_postings(&self, query: &SearchQuery, postings: &[Posting], notices: &[String]) -> Result<String>;
}

/// Formatter for the requested output format
pub fn formatter_for(format: OutputFormat, use_colors: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "▓".blue().bold(), title.blue().bold())
        } else {
            format!("\n▓ {}\n", title)
        }
    }

    fn format_score(&self, score: Option<f64>) -> String {
        let Some(score) = score else {
            return self.colorize("  n/a", Color::BrightBlack);
        };
        let text = format!("{:>5.1}%", score);
        let color = match ScoreBand::of(score) {
            ScoreBand::Strong => Color::Green,
            ScoreBand::Moderate => Color::Yellow,
            ScoreBand::Weak => Color::Red,
        };
        if self.use_colors {
            text.color(color).bold().to_string()
        } else {
            text
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_profile(&self, summary: &ProfileSummary) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header("Resume Profile"));
        output.push_str(&format!(
            "Suggested title: {}\n",
            self.colorize(&summary.job_title, Color::Cyan)
        ));
        if summary.job_titles.len() > 1 {
            output.push_str(&format!("Other titles: {}\n", summary.job_titles[1..].join(", ")));
        }
        output.push_str(&format!("Location: {}\n", summary.location));
        output.push_str(&format!(
            "Keywords ({}): {}\n",
            summary.keywords.len(),
            summary.keywords.join(", ")
        ));
        Ok(output)
    }

    fn format_postings(&self, query: &SearchQuery, postings: &[Posting], notices: &[String]) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header(&format!("Jobs for {}", query)));

        for notice in notices {
            output.push_str(&format!("{} {}\n", self.colorize("!", Color::Yellow), notice));
        }

        if postings.is_empty() {
            output.push_str("No matching postings found.\n");
            return Ok(output);
        }

        for (i, posting) in postings.iter().enumerate() {
            output.push_str(&format!(
                "{:>3}. {} {} {}\n",
                i + 1,
                self.format_score(posting.match_score()),
                self.colorize(&posting.title, Color::White),
                self.colorize(&format!("@ {}", posting.company), Color::BrightBlack)
            ));
            if let Some(location) = &posting.location {
                output.push_str(&format!("      {}\n", location));
            }
            output.push_str(&format!("      {}\n", self.colorize(&posting.link, Color::Blue)));
        }
        Ok(output)
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

#[derive(Serialize)]
struct PostingsDocument<'a> {
    query: &'a SearchQuery,
    notices: &'a [String],
    jobs: &'a [Posting],
}

impl OutputFormatter for JsonFormatter {
    fn format_profile(&self, summary: &ProfileSummary) -> Result<String> {
        self.render(summary)
    }

    fn format_postings(&self, query: &SearchQuery, postings: &[Posting], notices: &[String]) -> Result<String> {
        self.render(&PostingsDocument {
            query,
            notices,
            jobs: postings,
        })
    }
}

pub struct MarkdownFormatter;

impl MarkdownFormatter {
    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_profile(&self, summary: &ProfileSummary) -> Result<String> {
        let mut output = String::from("# Resume Profile\n\n");
        output.push_str(&format!("**Suggested title:** {}\n\n", summary.job_title));
        if !summary.job_titles.is_empty() {
            output.push_str("## Job Titles\n\n");
            for title in &summary.job_titles {
                output.push_str(&format!("- {}\n", title));
            }
            output.push('\n');
        }
        output.push_str("## Keywords\n\n");
        output.push_str(
            &summary
                .keywords
                .iter()
                .map(|k| format!("`{}`", k))
                .collect::<Vec<_>>()
                .join(" "),
        );
        output.push('\n');
        Ok(output)
    }

    fn format_postings(&self, query: &SearchQuery, postings: &[Posting], notices: &[String]) -> Result<String> {
        let mut output = format!("# Jobs for {}\n\n", query);
        for notice in notices {
            output.push_str(&format!("> {}\n", notice));
        }
        if !notices.is_empty() {
            output.push('\n');
        }

        if postings.is_empty() {
            output.push_str("_No matching postings found._\n");
            return Ok(output);
        }

        output.push_str("| # | Score | Title | Company | Link |\n");
        output.push_str("|---|-------|-------|---------|------|\n");
        for (i, posting) in postings.iter().enumerate() {
            let score = posting
                .match_score()
                .map(|s| format!("{:.1}%", s))
                .unwrap_or_else(|| "n/a".to_string());
            output.push_str(&format!(
                "| {} | {} | {} | {} | [view]({}) |\n",
                i + 1,
                score,
                Self::escape_cell(&posting.title),
                Self::escape_cell(&posting.company),
                posting.link
            ));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::Platform;

    fn sample() -> (SearchQuery, Vec<Posting>) {
        let query = SearchQuery::new("Backend Developer", "Istanbul", Platform::Linkedin).unwrap();
        let postings = vec![
            Posting::new("Go | Rust Engineer", "Acme", "https://example.com/1").with_score(91.0),
            Posting::new("Backend Developer", "Globex", "https://example.com/2").with_score(42.5),
        ];
        (query, postings)
    }

    #[test]
    fn test_console_lists_postings_in_order() {
        let (query, postings) = sample();
        let text = ConsoleFormatter::new(false)
            .format_postings(&query, &postings, &[])
            .unwrap();

        let first = text.find("Go | Rust Engineer").unwrap();
        let second = text.find("Backend Developer @ Globex").unwrap();
        assert!(first < second);
        assert!(text.contains("91.0%"));
    }

    #[test]
    fn test_json_carries_scores_as_numbers() {
        let (query, postings) = sample();
        let text = JsonFormatter::new(false)
            .format_postings(&query, &postings, &["partial".to_string()])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["jobs"][0]["match_score"], 91.0);
        assert_eq!(value["query"]["platform"], "linkedin");
        assert_eq!(value["notices"][0], "partial");
    }

    #[test]
    fn test_markdown_escapes_table_cells() {
        let (query, postings) = sample();
        let text = MarkdownFormatter.format_postings(&query, &postings, &[]).unwrap();

        assert!(text.contains("Go \\| Rust Engineer"));
        assert!(text.contains("| 2 | 42.5% |"));
    }

    #[test]
    fn test_empty_results_are_reported() {
        let (query, _) = sample();
        let text = ConsoleFormatter::new(false).format_postings(&query, &[], &[]).unwrap();
        assert!(text.contains("No matching postings"));
    }
}
