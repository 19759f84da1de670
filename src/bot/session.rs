//! Login state machine and paced page actions
//!
//! ```text
//! Unauthenticated --(saved cookies pass probe)--> Authenticated
//!        |                                              |
//!        +--(no cookies / probe fails)--> Authenticating <--(login wall seen)-- Expired
//! ```

use crate::bot::cookies::CookieStore;
use crate::bot::platform::PlatformProfile;
use crate::bot::types::Platform;
use crate::browser::{BrowserPage, DelayRange, Element, RetryPolicy, StoredCookie};
use crate::config::Config;
use crate::error::{JobScoutError, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Post-login prompts dismissed before giving up
const MAX_INTERSTITIALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expired,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// In-memory view of the live session
#[derive(Debug, Clone, Serialize)]
pub struct BotSession {
    pub authenticated: bool,
    pub guest: bool,
    pub cookies: Vec<StoredCookie>,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Read `JOB_SCOUT_<PLATFORM>_USERNAME` and `_PASSWORD`
    pub fn from_env(platform: Platform) -> Option<Self> {
        let prefix = platform.env_prefix();
        let read = |suffix: &str| {
            std::env::var(format!("{}_{}", prefix, suffix))
                .ok()
                .filter(|value| !value.trim().is_empty())
        };
        Some(Self::new(&read("USERNAME")?, &read("PASSWORD")?))
    }

    fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub platform: Platform,
    pub state: SessionState,
    pub guest: bool,
    pub credentials_configured: bool,
    pub live_cookies: usize,
    pub saved_cookies: usize,
    pub cookie_file: PathBuf,
    pub last_used_at: Option<DateTime<Utc>>,
}

pub struct SessionManager<P: BrowserPage> {
    page: P,
    profile: PlatformProfile,
    store: CookieStore,
    credentials: Option<Credentials>,
    allow_guest: bool,
    pacing: DelayRange,
    retry: RetryPolicy,
    page_timeout: Duration,
    state: SessionState,
    session: Option<BotSession>,
}

impl<P: BrowserPage> SessionManager<P> {
    pub fn new(page: P, profile: PlatformProfile, store: CookieStore) -> Self {
        Self {
            page,
            profile,
            store,
            credentials: None,
            allow_guest: true,
            pacing: DelayRange::from_millis(300, 600),
            retry: RetryPolicy::new(2, DelayRange::from_millis(500, 1500)),
            page_timeout: Duration::from_secs(15),
            state: SessionState::Unauthenticated,
            session: None,
        }
    }

    /// Session for `platform` set up from configuration and environment credentials
    pub fn from_config(page: P, platform: Platform, config: &Config) -> Self {
        let session = &config.session;
        Self::new(
            page,
            PlatformProfile::for_platform(platform),
            CookieStore::new(config.cookie_dir()),
        )
        .with_credentials(Credentials::from_env(platform))
        .with_guest_access(session.allow_guest)
        .with_pacing(DelayRange::from_millis(
            session.action_delay_min_ms,
            session.action_delay_max_ms,
        ))
        .with_retry(RetryPolicy::from_config(&config.collector))
        .with_page_timeout(Duration::from_secs(session.page_timeout_secs))
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_guest_access(mut self, allow: bool) -> Self {
        self.allow_guest = allow;
        self
    }

    pub fn with_pacing(mut self, pacing: DelayRange) -> Self {
        self.pacing = pacing;
        self
    }

    /// Retry policy for the probe, login and guest page loads
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn platform(&self) -> Platform {
        self.profile.platform
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_guest(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.guest)
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Make sure the page is logged in (or browsing as a guest)
    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        match self.state {
            SessionState::Authenticated => {
                self.touch();
                Ok(())
            }
            SessionState::Unauthenticated => {
                if self.restore_saved_session().await? {
                    return Ok(());
                }
                self.login().await
            }
            SessionState::Expired | SessionState::Authenticating => self.login().await,
        }
    }

    /// Install saved cookies and probe them; true when they still hold a login
    async fn restore_saved_session(&mut self) -> Result<bool> {
        let platform = self.platform();
        let Some(cookies) = self.store.load(platform)? else {
            debug!("No saved cookies for {}", platform);
            return Ok(false);
        };

        info!("Restoring saved {} session ({} cookies)", platform, cookies.len());
        self.page.set_cookies(&cookies);

        let probe_url = self.profile.url(self.profile.probe_path);
        let retry = self.retry;
        let alive = match self.navigate_with_retry(&probe_url, &retry).await {
            Ok(()) => !self.on_login_wall().await? && !self.on_challenge().await?,
            Err(e) => {
                warn!("Session probe for {} failed: {}", platform, e);
                false
            }
        };

        if alive {
            self.finish_login(false)?;
            Ok(true)
        } else {
            info!("Saved {} session is no longer valid", platform);
            self.mark_expired();
            Ok(false)
        }
    }

    async fn login(&mut self) -> Result<()> {
        self.state = SessionState::Authenticating;

        let result = match self.credentials.clone() {
            Some(credentials) => self.login_with_credentials(&credentials).await,
            None if self.allow_guest => self.start_guest().await,
            None => {
                let prefix = self.platform().env_prefix();
                Err(JobScoutError::Configuration(format!(
                    "No credentials for {}: set {}_USERNAME and {}_PASSWORD or enable session.allow_guest",
                    self.platform(),
                    prefix,
                    prefix
                )))
            }
        };

        if result.is_err() {
            self.state = SessionState::Expired;
            self.session = None;
        }
        result
    }

    async fn login_with_credentials(&mut self, credentials: &Credentials) -> Result<()> {
        let platform = self.platform();
        info!("Logging in to {} as {}", platform, credentials.username);

        self.page.set_cookies(&[]);
        let login_url = self.profile.login_url();
        let retry = self.retry;
        self.navigate_with_retry(&login_url, &retry).await?;
        self.page
            .wait_for(self.profile.username_selector, self.page_timeout)
            .await?;

        let username = self.login_field(self.profile.username_selector).await?;
        self.type_text(&username, &credentials.username).await?;
        let password = self.login_field(self.profile.password_selector).await?;
        self.type_text(&password, credentials.password()).await?;
        let submit = self.login_field(self.profile.submit_selector).await?;
        self.click(&submit).await?;

        self.resolve_post_login().await
    }

    async fn login_field(&self, selector: &str) -> Result<Element> {
        self.page
            .find_elements(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| JobScoutError::PlatformLayoutChanged {
                platform: self.platform(),
                detail: format!("login form has no element matching '{}'", selector),
            })
    }

    /// Inspect the page reached after submitting the login form
    async fn resolve_post_login(&mut self) -> Result<()> {
        let platform = self.platform();

        for _ in 0..=MAX_INTERSTITIALS {
            if self.on_challenge().await? {
                warn!("{} asked for a verification challenge", platform);
                return Err(JobScoutError::AuthenticationRequiresManualStep {
                    platform,
                    detail: "verification challenge (captcha, PIN or two-step) must be completed in a browser"
                        .to_string(),
                });
            }
            if self.on_login_wall().await? {
                return Err(JobScoutError::AuthenticationRequiresManualStep {
                    platform,
                    detail: "credentials rejected".to_string(),
                });
            }
            match self.find_interstitial().await? {
                Some(skip) => {
                    info!("Dismissing post-login prompt on {}", platform);
                    self.click(&skip).await?;
                }
                None => {
                    self.finish_login(false)?;
                    info!("Logged in to {}", platform);
                    return Ok(());
                }
            }
        }

        Err(JobScoutError::AuthenticationRequiresManualStep {
            platform,
            detail: "post-login prompts could not be dismissed".to_string(),
        })
    }

    async fn start_guest(&mut self) -> Result<()> {
        let platform = self.platform();
        info!("No credentials for {}; browsing the public job board as a guest", platform);

        let url = self.profile.url(self.profile.guest_probe_path);
        let retry = self.retry;
        self.navigate_with_retry(&url, &retry).await?;
        if self.on_challenge().await? || self.on_login_wall().await? {
            return Err(JobScoutError::AuthenticationRequiresManualStep {
                platform,
                detail: "the public job board requires a login; configure credentials".to_string(),
            });
        }

        self.finish_login(true)
    }

    fn finish_login(&mut self, guest: bool) -> Result<()> {
        let cookies = self.page.cookies();
        // guest cookies carry no login worth restoring
        if !guest {
            self.store.save(self.platform(), &cookies)?;
        }
        self.session = Some(BotSession {
            authenticated: true,
            guest,
            cookies,
            last_used_at: Utc::now(),
        });
        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// Whether the current page is a login form or an auth wall
    pub async fn on_login_wall(&self) -> Result<bool> {
        if self
            .page
            .current_url()
            .is_some_and(|url| self.profile.is_login_url(&url))
        {
            return Ok(true);
        }
        self.any_present(self.profile.login_form_selectors).await
    }

    async fn on_challenge(&self) -> Result<bool> {
        if self
            .page
            .current_url()
            .is_some_and(|url| self.profile.is_challenge_url(&url))
        {
            return Ok(true);
        }
        self.any_present(self.profile.challenge_selectors).await
    }

    async fn find_interstitial(&self) -> Result<Option<Element>> {
        for selector in self.profile.interstitial_skip_selectors {
            if let Some(element) = self.page.find_elements(selector).await?.into_iter().next() {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn any_present(&self, selectors: &[&str]) -> Result<bool> {
        for selector in selectors {
            if !self.page.find_elements(selector).await?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Record that the platform no longer accepts this session
    pub fn mark_expired(&mut self) {
        if self.state == SessionState::Authenticated {
            warn!("{} session expired", self.platform());
        }
        self.state = SessionState::Expired;
        if let Some(session) = self.session.as_mut() {
            session.authenticated = false;
        }
    }

    fn touch(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.last_used_at = Utc::now();
        }
    }

    pub async fn navigate(&mut self, url: &str) -> Result<()> {
        self.pacing.pause().await;
        let result = self.page.navigate(url).await;
        self.pacing.pause().await;
        self.touch();
        result
    }

    pub async fn navigate_with_retry(&mut self, url: &str, retry: &RetryPolicy) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.navigate(url).await {
                Ok(()) => return Ok(()),
                Err(e) if retry.should_retry(attempt, &e) => {
                    warn!("Loading {} failed (attempt {}): {}", url, attempt, e);
                    retry.backoff().await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn click(&mut self, element: &Element) -> Result<()> {
        self.pacing.pause().await;
        let result = self.page.click(element).await;
        self.pacing.pause().await;
        self.touch();
        result
    }

    pub async fn type_text(&mut self, element: &Element, text: &str) -> Result<()> {
        self.pacing.pause().await;
        let result = self.page.type_text(element, text).await;
        self.pacing.pause().await;
        result
    }

    pub fn status(&self) -> SessionStatus {
        let platform = self.platform();
        let saved_cookies = match self.store.load(platform) {
            Ok(cookies) => cookies.map_or(0, |c| c.len()),
            Err(e) => {
                warn!("Could not read saved cookies for {}: {}", platform, e);
                0
            }
        };

        SessionStatus {
            platform,
            state: self.state,
            guest: self.is_guest(),
            credentials_configured: self.credentials.is_some(),
            live_cookies: self.page.cookies().len(),
            saved_cookies,
            cookie_file: self.store.path_for(platform),
            last_used_at: self.session.as_ref().map(|s| s.last_used_at),
        }
    }

    /// Forget the saved login; returns whether a cookie file was removed
    pub fn clear_persisted(&mut self) -> Result<bool> {
        let removed = self.store.clear(self.platform())?;
        self.page.set_cookies(&[]);
        self.session = None;
        self.state = SessionState::Unauthenticated;
        Ok(removed)
    }

    /// Close the page; saved cookies stay on disk
    pub async fn shutdown(&mut self) {
        self.page.close().await;
        self.session = None;
        self.state = SessionState::Unauthenticated;
        debug!("{} session shut down", self.platform());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("ada@example.com", "hunter2");
        let shown = format!("{:?}", credentials);

        assert!(shown.contains("ada@example.com"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_session_state_labels() {
        assert_eq!(SessionState::Expired.to_string(), "expired");
        assert_eq!(
            serde_json::to_value(SessionState::Authenticated).unwrap(),
            "authenticated"
        );
    }
}
