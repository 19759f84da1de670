//! Per-platform URLs and selector lists
//!
//! Job boards change their markup often, so every extraction point carries a
//! list of selectors tried in order. The first one that yields something wins.

use crate::bot::types::{Platform, SearchQuery};
use reqwest::Url;

/// LinkedIn pages results 25 postings at a time
const LINKEDIN_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub platform: Platform,
    origin: String,
    pub login_path: &'static str,
    pub username_selector: &'static str,
    pub password_selector: &'static str,
    pub submit_selector: &'static str,
    /// Page only reachable with a live login
    pub probe_path: &'static str,
    /// Public page used when running as a guest
    pub guest_probe_path: &'static str,
    pub login_url_markers: &'static [&'static str],
    pub login_form_selectors: &'static [&'static str],
    pub challenge_url_markers: &'static [&'static str],
    pub challenge_selectors: &'static [&'static str],
    pub interstitial_skip_selectors: &'static [&'static str],
    pub card_selectors: &'static [&'static str],
    pub title_selectors: &'static [&'static str],
    pub company_selectors: &'static [&'static str],
    pub location_selectors: &'static [&'static str],
    pub link_selectors: &'static [&'static str],
    pub image_selectors: &'static [&'static str],
    pub description_selectors: &'static [&'static str],
    pub no_results_selectors: &'static [&'static str],
    /// Shown when a card hides or omits the company name
    pub company_placeholder: &'static str,
}

impl PlatformProfile {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Linkedin => Self::linkedin(),
            Platform::Kariyer => Self::kariyer(),
        }
    }

    fn linkedin() -> Self {
        Self {
            platform: Platform::Linkedin,
            origin: "https://www.linkedin.com".to_string(),
            login_path: "/login",
            username_selector: "#username",
            password_selector: "#password",
            submit_selector: "button[type='submit']",
            probe_path: "/feed/",
            guest_probe_path: "/jobs/search",
            login_url_markers: &["/login", "/authwall", "/uas/login", "/checkpoint/lg"],
            login_form_selectors: &["form.login__form", "#username"],
            challenge_url_markers: &["/checkpoint/challenge", "/two-step-verification"],
            challenge_selectors: &[
                "#captcha-internal",
                "input[name='pin']",
                ".g-recaptcha",
                "iframe[src*='captcha']",
            ],
            interstitial_skip_selectors: &[
                "a[href*='remind-me-later']",
                "button.secondary-action",
                "button[class*='skip']",
            ],
            card_selectors: &[
                "div.base-card",
                "li.jobs-search-results__list-item",
                "div[class*='job-search-card']",
                "div[data-entity-urn]",
            ],
            title_selectors: &[
                "h3.base-search-card__title",
                "h3[class*='job-card-list__title']",
                "a.base-card__full-link",
                "span.sr-only",
                "h3",
            ],
            company_selectors: &[
                "h4.base-search-card__subtitle",
                "a.hidden-nested-link",
                "span.job-card-container__company-name",
                "h4",
            ],
            location_selectors: &["span.job-search-card__location", "[class*='location']"],
            link_selectors: &["a.base-card__full-link[href]", "a[href]"],
            image_selectors: &["img[src]", "img[data-delayed-url]"],
            description_selectors: &[
                "div.description__text",
                "div.show-more-less-html__markup",
                "div[class*='job-description']",
                "section[class*='description']",
            ],
            no_results_selectors: &[
                ".jobs-search-no-results-banner",
                "[class*='no-results']",
            ],
            company_placeholder: "Confidential",
        }
    }

    fn kariyer() -> Self {
        Self {
            platform: Platform::Kariyer,
            origin: "https://www.kariyer.net".to_string(),
            login_path: "/giris",
            username_selector: "input[name='username']",
            password_selector: "input[name='password']",
            submit_selector: "button[type='submit']",
            probe_path: "/profil",
            guest_probe_path: "/is-ilanlari",
            login_url_markers: &["/giris", "/login"],
            login_form_selectors: &["#login-form", "form[action*='giris'] input[name='password']"],
            challenge_url_markers: &["/dogrulama", "/verification"],
            challenge_selectors: &[".g-recaptcha", "iframe[src*='captcha']", "input[name='code']"],
            interstitial_skip_selectors: &["a[class*='skip']", "button[class*='skip']"],
            card_selectors: &[
                "div.list-items",
                "div[class*='job-item']",
                "a[class*='k-ad-card']",
                ".listing-list .list-items",
                ".job-list-item",
                ".job-card",
            ],
            title_selectors: &[
                "h2[class*='title']",
                "h3[class*='title']",
                "a[class*='title']",
                "[class*='title']",
                "a[href]",
            ],
            company_selectors: &[
                "span[class*='company']",
                "div[class*='company']",
                "a[class*='company']",
            ],
            location_selectors: &["span[class*='location']", "div[class*='location']"],
            link_selectors: &["a[href]"],
            image_selectors: &["img[src]"],
            description_selectors: &[
                "div.job-detail-content",
                "div[class*='job-description']",
                "div[class*='description']",
                "section[class*='description']",
            ],
            no_results_selectors: &[".no-result", "[class*='empty-state']"],
            company_placeholder: "Şirket",
        }
    }

    /// Point every URL at another origin, e.g. a local test server
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.trim_end_matches('/').to_string();
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    pub fn login_url(&self) -> String {
        self.url(self.login_path)
    }

    /// Results page `page_index` (0-based) for `query`
    pub fn search_url(&self, query: &SearchQuery, page_index: usize) -> String {
        match self.platform {
            Platform::Linkedin => format!(
                "{}/jobs/search?keywords={}&location={}&start={}",
                self.origin,
                urlencoding::encode(&query.job_title),
                urlencoding::encode(&query.location),
                page_index * LINKEDIN_PAGE_SIZE
            ),
            Platform::Kariyer => format!(
                "{}/is-ilanlari?kw={}&loc={}&cp={}",
                self.origin,
                urlencoding::encode(&query.job_title.to_lowercase()),
                urlencoding::encode(&query.location.to_lowercase()),
                page_index + 1
            ),
        }
    }

    pub fn is_login_url(&self, url: &str) -> bool {
        contains_marker(url, self.login_url_markers)
    }

    pub fn is_challenge_url(&self, url: &str) -> bool {
        contains_marker(url, self.challenge_url_markers)
    }

    /// Absolute, fragment-free form of a card link; `None` for non-links
    pub fn canonical_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return None;
        }

        let base = Url::parse(&self.origin).ok()?;
        let mut url = base.join(href).ok()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }

        url.set_fragment(None);
        // LinkedIn appends tracking parameters that differ per listing page
        if self.platform == Platform::Linkedin {
            url.set_query(None);
        }
        Some(url.to_string())
    }
}

fn contains_marker(url: &str, markers: &[&str]) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| url.to_lowercase());
    markers.iter().any(|marker| path.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(platform: Platform) -> SearchQuery {
        SearchQuery::new("Python Developer", "İstanbul", platform).unwrap()
    }

    #[test]
    fn test_linkedin_search_url_pages_by_25() {
        let profile = PlatformProfile::for_platform(Platform::Linkedin);
        let url = profile.search_url(&query(Platform::Linkedin), 2);

        assert!(url.starts_with("https://www.linkedin.com/jobs/search?"));
        assert!(url.contains("keywords=Python%20Developer"));
        assert!(url.ends_with("&start=50"));
    }

    #[test]
    fn test_kariyer_search_url_is_lowercased_and_one_based() {
        let profile = PlatformProfile::for_platform(Platform::Kariyer);
        let url = profile.search_url(&query(Platform::Kariyer), 0);

        assert!(url.contains("kw=python%20developer"));
        assert!(url.ends_with("&cp=1"));
    }

    #[test]
    fn test_canonical_link_resolves_relative_and_strips_tracking() {
        let linkedin = PlatformProfile::for_platform(Platform::Linkedin);
        assert_eq!(
            linkedin.canonical_link("/jobs/view/123?refId=abc#top").as_deref(),
            Some("https://www.linkedin.com/jobs/view/123")
        );

        let kariyer = PlatformProfile::for_platform(Platform::Kariyer);
        assert_eq!(
            kariyer.canonical_link("/is-ilani/acme-python-99?src=list").as_deref(),
            Some("https://www.kariyer.net/is-ilani/acme-python-99?src=list")
        );
        assert_eq!(kariyer.canonical_link("#"), None);
        assert_eq!(kariyer.canonical_link("mailto:hr@acme.com"), None);
    }

    #[test]
    fn test_with_origin_rewrites_urls() {
        let profile = PlatformProfile::for_platform(Platform::Linkedin).with_origin("http://127.0.0.1:4000/");
        assert_eq!(profile.login_url(), "http://127.0.0.1:4000/login");
        assert!(profile.is_login_url("http://127.0.0.1:4000/authwall?trk=x"));
        assert!(!profile.is_login_url("http://127.0.0.1:4000/jobs/search"));
    }
}
