//! Browser capability used by the session manager and the listing collector
//!
//! Everything that touches a live page goes through [`BrowserPage`], so the
//! bot can run against the HTTP-backed [`HttpPage`] or a scripted fake.

pub mod dom;
pub mod http_page;
pub mod pacing;

pub use dom::Element;
pub use http_page::HttpPage;
pub use pacing::{DelayRange, RetryPolicy};

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// A cookie as kept by a page and persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<DateTime<Utc>>,
}

impl StoredCookie {
    pub fn new(name: &str, value: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.trim_start_matches('.').to_lowercase(),
            path: "/".to_string(),
            expires: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Whether the cookie should be sent to `host` for `path`
    pub fn matches(&self, host: &str, path: &str) -> bool {
        let host = host.to_lowercase();
        let domain_ok = host == self.domain || host.ends_with(&format!(".{}", self.domain));
        domain_ok && path.starts_with(&self.path)
    }
}

/// Stateful handle to one page of a browsing context
pub trait BrowserPage: Send {
    /// Load `url`, following redirects; relative URLs resolve against the current page
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<()>> + Send;

    fn current_url(&self) -> Option<String>;

    fn find_elements(&self, selector: &str) -> impl Future<Output = Result<Vec<Element>>> + Send;

    fn find_within(
        &self,
        parent: &Element,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Element>>> + Send;

    fn click(&mut self, element: &Element) -> impl Future<Output = Result<()>> + Send;

    fn type_text(&mut self, element: &Element, text: &str) -> impl Future<Output = Result<()>> + Send;

    fn extract_text(&self, element: &Element) -> impl Future<Output = Result<String>> + Send;

    /// Resolve once `selector` matches, or fail with `NavigationTimeout`
    fn wait_for(&mut self, selector: &str, timeout: Duration) -> impl Future<Output = Result<()>> + Send;

    fn cookies(&self) -> Vec<StoredCookie>;

    fn set_cookies(&mut self, cookies: &[StoredCookie]);

    fn close(&mut self) -> impl Future<Output = ()> + Send;
}
