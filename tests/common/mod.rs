//! Scripted in-memory site for driving the bot without a network

#![allow(dead_code)]

use job_scout::bot::{CancelToken, CookieStore, Credentials, Platform, PlatformProfile, SessionManager};
use job_scout::browser::{dom, BrowserPage, DelayRange, Element, RetryPolicy, StoredCookie};
use job_scout::{JobScoutError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ORIGIN: &str = "https://jobs.test";
pub const USERNAME: &str = "ada@example.com";
pub const PASSWORD: &str = "correct horse";
pub const VALID_TOKEN: &str = "valid-token";

pub type SharedSite = Arc<Mutex<FakeSite>>;

pub struct FakeSite {
    pub pages: HashMap<String, String>,
    /// URL prefixes that redirect to the auth wall without a valid session cookie
    pub protected_prefixes: Vec<String>,
    pub after_login_url: String,
    /// Loading this URL drops the session cookie
    pub expire_on: Option<String>,
    pub expire_always: bool,
    pub cancel_on_visit: Option<(String, CancelToken)>,
    /// Remaining forced timeouts per URL
    pub fail_urls: HashMap<String, usize>,
    pub cookies: Vec<StoredCookie>,
    pub typed: HashMap<String, String>,
    pub visits: Vec<String>,
    pub current: Option<String>,
    pub closed: bool,
}

impl FakeSite {
    pub fn new() -> Self {
        let mut pages = HashMap::new();
        pages.insert(url("/login"), login_page());
        pages.insert(url("/authwall"), auth_wall_page());
        pages.insert(url("/feed/"), "<html><body><main class='feed'>Welcome back</main></body></html>".to_string());

        Self {
            pages,
            protected_prefixes: vec![url("/feed/")],
            after_login_url: url("/feed/"),
            expire_on: None,
            expire_always: false,
            cancel_on_visit: None,
            fail_urls: HashMap::new(),
            cookies: Vec::new(),
            typed: HashMap::new(),
            visits: Vec::new(),
            current: None,
            closed: false,
        }
    }

    pub fn shared(self) -> SharedSite {
        Arc::new(Mutex::new(self))
    }

    pub fn protect_results(&mut self) {
        self.protected_prefixes.push(url("/jobs/search?"));
    }

    pub fn add_page(&mut self, url: &str, html: String) {
        self.pages.insert(url.to_string(), html);
    }

    fn is_authenticated(&self) -> bool {
        self.cookies
            .iter()
            .any(|c| c.name == "session" && c.value == VALID_TOKEN)
    }

    fn document(&self) -> String {
        self.current
            .as_ref()
            .and_then(|current| self.pages.get(current))
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string())
    }

    fn load(&mut self, target: &str) -> Result<()> {
        let target = absolute(target);
        self.visits.push(target.clone());

        if let Some((trigger, token)) = &self.cancel_on_visit {
            if *trigger == target {
                token.cancel();
            }
        }
        if let Some(remaining) = self.fail_urls.get_mut(&target) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(JobScoutError::NavigationTimeout { url: target });
            }
        }
        if self.expire_on.as_deref() == Some(target.as_str()) {
            self.cookies.clear();
            if !self.expire_always {
                self.expire_on = None;
            }
        }

        let needs_login = self.protected_prefixes.iter().any(|p| target.starts_with(p.as_str()));
        self.current = if needs_login && !self.is_authenticated() {
            Some(url("/authwall"))
        } else {
            Some(target)
        };
        Ok(())
    }

    fn submit_login(&mut self) -> Result<()> {
        let accepted = self.typed.get("session_key").map(String::as_str) == Some(USERNAME)
            && self.typed.get("session_password").map(String::as_str) == Some(PASSWORD);
        self.typed.clear();

        if accepted {
            self.cookies.push(StoredCookie::new("session", VALID_TOKEN, "jobs.test"));
            let next = self.after_login_url.clone();
            self.load(&next)
        } else {
            self.load(&url("/login?error=1"))
        }
    }

    pub fn visit_count(&self, target: &str) -> usize {
        self.visits.iter().filter(|v| v.as_str() == target).count()
    }
}

pub struct FakePage {
    site: SharedSite,
}

impl FakePage {
    pub fn new(site: SharedSite) -> Self {
        Self { site }
    }
}

impl BrowserPage for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.site.lock().unwrap().load(url)
    }

    fn current_url(&self) -> Option<String> {
        self.site.lock().unwrap().current.clone()
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let document = self.site.lock().unwrap().document();
        dom::select(&document, selector)
    }

    async fn find_within(&self, parent: &Element, selector: &str) -> Result<Vec<Element>> {
        dom::select_within(parent, selector)
    }

    async fn click(&mut self, element: &Element) -> Result<()> {
        let mut site = self.site.lock().unwrap();
        match element.attr("href") {
            Some(href) => site.load(href),
            None => site.submit_login(),
        }
    }

    async fn type_text(&mut self, element: &Element, text: &str) -> Result<()> {
        let name = element
            .attr("name")
            .ok_or_else(|| JobScoutError::Browser("field without name".to_string()))?;
        self.site.lock().unwrap().typed.insert(name.to_string(), text.to_string());
        Ok(())
    }

    async fn extract_text(&self, element: &Element) -> Result<String> {
        Ok(element.text.clone())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<()> {
        let site = self.site.lock().unwrap();
        if dom::select(&site.document(), selector)?.is_empty() {
            return Err(JobScoutError::NavigationTimeout {
                url: site.current.clone().unwrap_or_default(),
            });
        }
        Ok(())
    }

    fn cookies(&self) -> Vec<StoredCookie> {
        self.site.lock().unwrap().cookies.clone()
    }

    fn set_cookies(&mut self, cookies: &[StoredCookie]) {
        self.site.lock().unwrap().cookies = cookies.to_vec();
    }

    async fn close(&mut self) {
        let mut site = self.site.lock().unwrap();
        site.closed = true;
        site.current = None;
    }
}

pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

fn absolute(target: &str) -> String {
    if target.starts_with('/') {
        url(target)
    } else {
        target.to_string()
    }
}

pub fn profile() -> PlatformProfile {
    PlatformProfile::for_platform(Platform::Linkedin).with_origin(ORIGIN)
}

pub fn kariyer_profile() -> PlatformProfile {
    PlatformProfile::for_platform(Platform::Kariyer).with_origin(ORIGIN)
}

pub fn session(site: &SharedSite, cookie_dir: &Path, credentials: bool) -> SessionManager<FakePage> {
    session_on(site, cookie_dir, profile(), credentials)
}

pub fn session_on(
    site: &SharedSite,
    cookie_dir: &Path,
    profile: PlatformProfile,
    credentials: bool,
) -> SessionManager<FakePage> {
    let credentials = credentials.then(|| Credentials::new(USERNAME, PASSWORD));
    SessionManager::new(FakePage::new(site.clone()), profile, CookieStore::new(cookie_dir))
        .with_credentials(credentials)
        .with_pacing(DelayRange::instant())
        .with_retry(RetryPolicy::new(2, DelayRange::instant()))
        .with_page_timeout(Duration::from_millis(50))
}

pub struct Card<'a> {
    pub title: &'a str,
    pub company: &'a str,
    pub href: &'a str,
}

pub fn card<'a>(title: &'a str, company: &'a str, href: &'a str) -> Card<'a> {
    Card { title, company, href }
}

pub fn results_page(cards: &[Card<'_>]) -> String {
    let mut html = String::from("<html><body><ul class='jobs-search__results-list'>");
    for card in cards {
        html.push_str(&format!(
            "<li><div class='base-card job-search-card'>\
             <a class='base-card__full-link' href='{}'><span class='sr-only'>{}</span></a>\
             <img class='artdeco-entity-image' data-delayed-url='https://media.test/logo.png'>\
             <h3 class='base-search-card__title'>{}</h3>\
             <h4 class='base-search-card__subtitle'>{}</h4>\
             <span class='job-search-card__location'>Istanbul, Türkiye</span>\
             </div></li>",
            card.href, card.title, card.title, card.company
        ));
    }
    html.push_str("</ul></body></html>");
    html
}

/// Kariyer.net style listing; an empty company leaves the span blank
pub fn kariyer_results_page(cards: &[Card<'_>]) -> String {
    let mut html = String::from("<html><body><div class='list-container'>");
    for card in cards {
        html.push_str(&format!(
            "<div class='list-items'>\
             <a href='{}'><h3 class='k-ad-card-title'>{}</h3></a>\
             <span class='company-name'>{}</span>\
             <span class='location'>Istanbul (Avr.)</span>\
             <img src='https://img.test/logo.png'>\
             </div>",
            card.href, card.title, card.company
        ));
    }
    html.push_str("</div></body></html>");
    html
}

pub fn kariyer_detail_page(description: &str) -> String {
    format!(
        "<html><body><div class='job-detail-content'>{}</div></body></html>",
        description
    )
}

pub fn detail_page(description: &str) -> String {
    format!(
        "<html><body><section class='show-more-less-html'>\
         <div class='description__text'>{}</div></section></body></html>",
        description
    )
}

pub fn login_page() -> String {
    "<html><body><form class='login__form' action='/checkpoint/lg/login-submit' method='post'>\
     <input id='username' name='session_key' type='text'>\
     <input id='password' name='session_password' type='password'>\
     <button class='btn__primary--large' type='submit'>Sign in</button>\
     </form></body></html>"
        .to_string()
}

pub fn auth_wall_page() -> String {
    "<html><body><div class='authwall'><form class='login__form'></form></div></body></html>".to_string()
}

/// Unique links used across tests
pub fn job_link(id: usize) -> String {
    url(&format!("/jobs/view/{}", id))
}

pub fn unique(items: &[String]) -> bool {
    let set: HashSet<&String> = items.iter().collect();
    set.len() == items.len()
}
