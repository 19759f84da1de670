//! Paginated collection of postings from a results listing

use crate::bot::platform::PlatformProfile;
use crate::bot::session::SessionManager;
use crate::bot::types::{CancelToken, Posting, SearchQuery};
use crate::browser::{BrowserPage, Element, RetryPolicy};
use crate::config::CollectorConfig;
use crate::error::{JobScoutError, Result};
use log::{debug, info, warn};
use std::collections::HashSet;

/// Shorter matches are usually labels, not descriptions
const MIN_DESCRIPTION_CHARS: usize = 50;
const MIN_TITLE_CHARS: usize = 3;
const MAX_TITLE_SPACES: usize = 10;

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub max_pages: usize,
    pub fetch_descriptions: bool,
    pub description_max_chars: usize,
    pub retry: RetryPolicy,
}

impl CollectorOptions {
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            fetch_descriptions: config.fetch_descriptions,
            description_max_chars: config.description_max_chars,
            retry: RetryPolicy::from_config(config),
        }
    }
}

/// Outcome of one collection run
///
/// `interruption` is set when pagination stopped early for a reason the
/// caller may act on; postings gathered before it are still returned.
#[derive(Debug, Default)]
pub struct Collection {
    pub postings: Vec<Posting>,
    pub pages_visited: usize,
    pub interruption: Option<JobScoutError>,
    pub layout_warning: Option<JobScoutError>,
}

impl Collection {
    pub fn session_expired(&self) -> bool {
        matches!(self.interruption, Some(JobScoutError::SessionExpired))
    }
}

pub struct ListingCollector {
    options: CollectorOptions,
}

impl ListingCollector {
    pub fn new(options: CollectorOptions) -> Self {
        Self { options }
    }

    pub async fn collect<P: BrowserPage>(
        &self,
        session: &mut SessionManager<P>,
        query: &SearchQuery,
        max_results: usize,
        cancel: &CancelToken,
    ) -> Result<Collection> {
        let profile = session.profile().clone();
        let mut collection = Collection::default();
        let mut seen_links = HashSet::new();
        let mut last_failure = None;

        info!("Collecting up to {} postings for {}", max_results, query);

        for page_index in 0..self.options.max_pages {
            if collection.postings.len() >= max_results {
                break;
            }
            cancel.check()?;

            let url = profile.search_url(query, page_index);
            if let Err(e) = session.navigate_with_retry(&url, &self.options.retry).await {
                warn!("Skipping results page {}: {}", page_index + 1, e);
                last_failure = Some(e);
                continue;
            }
            collection.pages_visited += 1;

            if session.on_login_wall().await? {
                session.mark_expired();
                collection.interruption = Some(JobScoutError::SessionExpired);
                break;
            }

            let cards = find_cards(session.page(), &profile).await?;
            debug!("Results page {} has {} cards", page_index + 1, cards.len());

            if cards.is_empty() {
                if collection.pages_visited == 1 && !is_no_results_page(session.page(), &profile).await? {
                    let warning = JobScoutError::PlatformLayoutChanged {
                        platform: profile.platform,
                        detail: format!("no job cards recognised on {}", url),
                    };
                    warn!("{}", warning);
                    collection.layout_warning = Some(warning);
                }
                break;
            }

            let mut added = 0;
            for card in &cards {
                if collection.postings.len() >= max_results {
                    break;
                }
                let Some(posting) = extract_posting(session.page(), &profile, card, query).await? else {
                    continue;
                };
                if !seen_links.insert(posting.link.clone()) {
                    debug!("Duplicate posting {}", posting.link);
                    continue;
                }
                debug!("Collected '{}' at {}", posting.title, posting.company);
                collection.postings.push(posting);
                added += 1;
            }

            if added == 0 {
                debug!("Page {} added nothing new; stopping", page_index + 1);
                break;
            }
        }

        if collection.pages_visited == 0 && collection.interruption.is_none() {
            collection.interruption = last_failure;
        }

        if self.options.fetch_descriptions && !collection.session_expired() {
            for posting in collection.postings.iter_mut() {
                cancel.check()?;
                match self.fetch_description(session, &profile, &posting.link).await {
                    Ok(Some(description)) => posting.description = description,
                    Ok(None) => debug!("No description found at {}", posting.link),
                    Err(e) => debug!("Description fetch for {} failed: {}", posting.link, e),
                }
            }
        }

        info!(
            "Collected {} postings from {} pages",
            collection.postings.len(),
            collection.pages_visited
        );
        Ok(collection)
    }

    async fn fetch_description<P: BrowserPage>(
        &self,
        session: &mut SessionManager<P>,
        profile: &PlatformProfile,
        link: &str,
    ) -> Result<Option<String>> {
        session.navigate_with_retry(link, &self.options.retry).await?;
        if session.on_login_wall().await? {
            return Ok(None);
        }

        let page = session.page();
        for selector in profile.description_selectors {
            let Some(element) = page.find_elements(selector).await?.into_iter().next() else {
                continue;
            };
            let text = page.extract_text(&element).await?;
            if text.chars().count() > MIN_DESCRIPTION_CHARS {
                return Ok(Some(truncate_chars(&text, self.options.description_max_chars)));
            }
        }
        Ok(None)
    }
}

async fn find_cards<P: BrowserPage>(page: &P, profile: &PlatformProfile) -> Result<Vec<Element>> {
    for selector in profile.card_selectors {
        let cards = page.find_elements(selector).await?;
        if !cards.is_empty() {
            return Ok(cards);
        }
    }
    Ok(Vec::new())
}

async fn is_no_results_page<P: BrowserPage>(page: &P, profile: &PlatformProfile) -> Result<bool> {
    for selector in profile.no_results_selectors {
        if !page.find_elements(selector).await?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn extract_posting<P: BrowserPage>(
    page: &P,
    profile: &PlatformProfile,
    card: &Element,
    query: &SearchQuery,
) -> Result<Option<Posting>> {
    let Some(raw_title) = first_text(page, card, profile.title_selectors).await? else {
        debug!("Card without a title skipped");
        return Ok(None);
    };
    // masked titles still belong to the searched role
    let title = if raw_title.contains('*') {
        query.job_title.clone()
    } else {
        raw_title
    };
    if title.chars().count() < MIN_TITLE_CHARS || title.matches(' ').count() > MAX_TITLE_SPACES {
        debug!("Implausible title '{}' skipped", title);
        return Ok(None);
    }

    let Some(link) = first_attr(page, card, profile.link_selectors, &["href"])
        .await?
        .and_then(|href| profile.canonical_link(&href))
    else {
        debug!("Card '{}' has no link", title);
        return Ok(None);
    };

    let company = first_text(page, card, profile.company_selectors)
        .await?
        .filter(|company| !company.contains('*'))
        .unwrap_or_else(|| profile.company_placeholder.to_string());

    let mut posting = Posting::new(&title, &company, &link);
    posting.image_url = first_attr(page, card, profile.image_selectors, &["src", "data-delayed-url"]).await?;
    posting.location = first_text(page, card, profile.location_selectors).await?;
    Ok(Some(posting))
}

async fn first_text<P: BrowserPage>(page: &P, card: &Element, selectors: &[&str]) -> Result<Option<String>> {
    for selector in selectors {
        for element in page.find_within(card, selector).await? {
            let text = page.extract_text(&element).await?;
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

async fn first_attr<P: BrowserPage>(
    page: &P,
    card: &Element,
    selectors: &[&str],
    attributes: &[&str],
) -> Result<Option<String>> {
    for selector in selectors {
        for element in page.find_within(card, selector).await? {
            let value = attributes
                .iter()
                .filter_map(|name| element.attr(name))
                .map(str::trim)
                .find(|value| !value.is_empty());
            if let Some(value) = value {
                return Ok(Some(value.to_string()));
            }
        }
    }
    Ok(None)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
