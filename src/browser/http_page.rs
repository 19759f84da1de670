//! Headless page driven over HTTP
//!
//! Keeps the state a browser tab would: current URL, last document, a cookie
//! jar and pending form input. Redirects are followed by hand so cookies set
//! on intermediate hops are kept. No scripts run.

use crate::browser::dom::{self, Element};
use crate::browser::{BrowserPage, StoredCookie};
use crate::error::{JobScoutError, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::header::{COOKIE, LOCATION};
use reqwest::{redirect, Client, Method, StatusCode, Url};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const MAX_REDIRECTS: usize = 10;
const WAIT_POLL: Duration = Duration::from_millis(250);

pub struct HttpPage {
    client: Client,
    current_url: Option<Url>,
    document: String,
    cookies: Vec<StoredCookie>,
    form_values: HashMap<String, String>,
}

impl HttpPage {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| JobScoutError::Browser(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            current_url: None,
            document: String::new(),
            cookies: Vec::new(),
            form_values: HashMap::new(),
        })
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        let parsed = match &self.current_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        parsed.map_err(|e| JobScoutError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))
    }

    fn cookie_header(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        let now = Utc::now();
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| !c.is_expired(now) && c.matches(host, url.path()))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    fn absorb_cookies(&mut self, url: &Url, response: &reqwest::Response) {
        let now = Utc::now();
        let default_domain = url.host_str().unwrap_or_default().to_string();

        for cookie in response.cookies() {
            let expires = match cookie.max_age() {
                Some(max_age) => chrono::Duration::from_std(max_age).ok().map(|d| now + d),
                None => cookie.expires().map(DateTime::<Utc>::from),
            };
            let stored = StoredCookie {
                name: cookie.name().to_string(),
                value: cookie.value().to_string(),
                domain: cookie
                    .domain()
                    .unwrap_or(&default_domain)
                    .trim_start_matches('.')
                    .to_lowercase(),
                path: cookie.path().unwrap_or("/").to_string(),
                expires,
            };

            self.cookies
                .retain(|c| !(c.name == stored.name && c.domain == stored.domain && c.path == stored.path));
            if !stored.is_expired(now) {
                self.cookies.push(stored);
            }
        }
    }

    /// Issue a request and follow redirects, leaving the final document loaded
    async fn load(&mut self, method: Method, url: Url, form: Option<Vec<(String, String)>>) -> Result<()> {
        let mut method = method;
        let mut url = url;
        let mut form = form;

        for _ in 0..=MAX_REDIRECTS {
            debug!("{} {}", method, url);
            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(header) = self.cookie_header(&url) {
                request = request.header(COOKIE, header);
            }
            if let Some(fields) = &form {
                request = request.form(fields);
            }

            let response = request.send().await?;
            self.absorb_cookies(&url, &response);
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| JobScoutError::Browser(format!("Redirect without location from {}", url)))?;
                url = url
                    .join(location)
                    .map_err(|e| JobScoutError::Browser(format!("Bad redirect target '{}': {}", location, e)))?;
                if status != StatusCode::TEMPORARY_REDIRECT && status != StatusCode::PERMANENT_REDIRECT {
                    method = Method::GET;
                    form = None;
                }
                continue;
            }

            if !status.is_success() {
                let detail = format!("HTTP {} for {}", status, url);
                return Err(if status.is_server_error()
                    || status == StatusCode::TOO_MANY_REQUESTS
                    || status.as_u16() == 999
                {
                    JobScoutError::Network(detail)
                } else {
                    JobScoutError::Browser(detail)
                });
            }

            self.document = response.text().await?;
            self.current_url = Some(url);
            return Ok(());
        }

        Err(JobScoutError::Browser(format!("Too many redirects loading {}", url)))
    }

    async fn submit_form(&mut self, element: &Element) -> Result<()> {
        let form = dom::enclosing_form(&self.document, element)?
            .ok_or_else(|| JobScoutError::Browser(format!("<{}> is not clickable", element.tag)))?;

        let mut fields = form.fields;
        for (name, value) in fields.iter_mut() {
            if let Some(typed) = self.form_values.get(name) {
                *value = typed.clone();
            }
        }
        for (name, value) in &self.form_values {
            if !fields.iter().any(|(n, _)| n == name) {
                fields.push((name.clone(), value.clone()));
            }
        }
        self.form_values.clear();

        let action = match form.action.as_deref() {
            Some(action) if !action.is_empty() => self.resolve(action)?,
            _ => self
                .current_url
                .clone()
                .ok_or_else(|| JobScoutError::Browser("No page loaded".to_string()))?,
        };

        if form.method == "post" {
            self.load(Method::POST, action, Some(fields)).await
        } else {
            let mut action = action;
            action.query_pairs_mut().clear().extend_pairs(fields.iter());
            self.load(Method::GET, action, None).await
        }
    }
}

impl BrowserPage for HttpPage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let target = self.resolve(url)?;
        self.form_values.clear();
        self.load(Method::GET, target, None).await
    }

    fn current_url(&self) -> Option<String> {
        self.current_url.as_ref().map(Url::to_string)
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        dom::select(&self.document, selector)
    }

    async fn find_within(&self, parent: &Element, selector: &str) -> Result<Vec<Element>> {
        dom::select_within(parent, selector)
    }

    async fn click(&mut self, element: &Element) -> Result<()> {
        match (element.tag.as_str(), element.attr("href")) {
            ("a", Some(href)) => {
                let href = href.to_string();
                self.navigate(&href).await
            }
            _ => self.submit_form(element).await,
        }
    }

    async fn type_text(&mut self, element: &Element, text: &str) -> Result<()> {
        let name = element
            .attr("name")
            .ok_or_else(|| JobScoutError::Browser(format!("<{}> has no name to type into", element.tag)))?;
        self.form_values.insert(name.to_string(), text.to_string());
        Ok(())
    }

    async fn extract_text(&self, element: &Element) -> Result<String> {
        Ok(element.text.clone())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        loop {
            if !dom::select(&self.document, selector)?.is_empty() {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                let url = self.current_url().unwrap_or_default();
                warn!("Timed out waiting for '{}' on {}", selector, url);
                return Err(JobScoutError::NavigationTimeout { url });
            }
            tokio::time::sleep(WAIT_POLL.min(timeout)).await;
            // a static page only changes when reloaded
            if let Some(current) = self.current_url.clone() {
                self.load(Method::GET, current, None).await?;
            }
        }
    }

    fn cookies(&self) -> Vec<StoredCookie> {
        self.cookies.clone()
    }

    fn set_cookies(&mut self, cookies: &[StoredCookie]) {
        self.cookies = cookies.to_vec();
    }

    async fn close(&mut self) {
        self.current_url = None;
        self.document.clear();
        self.form_values.clear();
    }
}
