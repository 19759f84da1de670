//! Cookie persistence between runs

use crate::browser::StoredCookie;
use crate::bot::types::Platform;
use crate::error::Result;
use crate::storage::write_atomic;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const COOKIE_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieFile {
    pub version: u32,
    pub platform: Platform,
    pub saved_at: DateTime<Utc>,
    pub cookies: Vec<StoredCookie>,
}

/// One cookie file per platform inside a directory
#[derive(Debug, Clone)]
pub struct CookieStore {
    dir: PathBuf,
}

impl CookieStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, platform: Platform) -> PathBuf {
        self.dir.join(format!("{}_cookies.json", platform))
    }

    /// Unexpired cookies saved for `platform`, if any
    ///
    /// Unreadable or newer-version files are treated as absent.
    pub fn load(&self, platform: Platform) -> Result<Option<Vec<StoredCookie>>> {
        let path = self.path_for(platform);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let file: CookieFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!("Ignoring unreadable cookie file {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        if file.version > COOKIE_FILE_VERSION {
            warn!(
                "Ignoring cookie file {} with unsupported version {}",
                path.display(),
                file.version
            );
            return Ok(None);
        }

        let now = Utc::now();
        let total = file.cookies.len();
        let cookies: Vec<StoredCookie> = file
            .cookies
            .into_iter()
            .filter(|c| !c.is_expired(now))
            .collect();
        debug!("Loaded {} of {} cookies for {}", cookies.len(), total, platform);

        Ok((!cookies.is_empty()).then_some(cookies))
    }

    pub fn save(&self, platform: Platform, cookies: &[StoredCookie]) -> Result<()> {
        let file = CookieFile {
            version: COOKIE_FILE_VERSION,
            platform,
            saved_at: Utc::now(),
            cookies: cookies.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        write_atomic(&self.path_for(platform), &json)?;
        debug!("Saved {} cookies for {}", cookies.len(), platform);
        Ok(())
    }

    /// Remove the saved cookies; returns whether a file existed
    pub fn clear(&self, platform: Platform) -> Result<bool> {
        remove_if_present(&self.path_for(platform))
    }
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_round_trip_drops_expired_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieStore::new(dir.path());

        let live = StoredCookie::new("li_at", "token", "linkedin.com");
        let mut stale = StoredCookie::new("old", "x", "linkedin.com");
        stale.expires = Some(Utc::now() - Duration::hours(1));

        store.save(Platform::Linkedin, &[live.clone(), stale]).unwrap();
        let loaded = store.load(Platform::Linkedin).unwrap().unwrap();

        assert_eq!(loaded, vec![live]);
        assert!(store.load(Platform::Kariyer).unwrap().is_none());
    }

    #[test]
    fn test_only_expired_cookies_count_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieStore::new(dir.path());
        let mut stale = StoredCookie::new("old", "x", "kariyer.net");
        stale.expires = Some(Utc::now() - Duration::minutes(5));

        store.save(Platform::Kariyer, &[stale]).unwrap();
        assert!(store.load(Platform::Kariyer).unwrap().is_none());
    }

    #[test]
    fn test_newer_version_and_garbage_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieStore::new(dir.path());
        let path = store.path_for(Platform::Linkedin);

        let future = CookieFile {
            version: COOKIE_FILE_VERSION + 1,
            platform: Platform::Linkedin,
            saved_at: Utc::now(),
            cookies: vec![StoredCookie::new("a", "b", "linkedin.com")],
        };
        std::fs::write(&path, serde_json::to_string(&future).unwrap()).unwrap();
        assert!(store.load(Platform::Linkedin).unwrap().is_none());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(store.load(Platform::Linkedin).unwrap().is_none());
    }

    #[test]
    fn test_clear_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieStore::new(dir.path());
        store
            .save(Platform::Linkedin, &[StoredCookie::new("a", "b", "linkedin.com")])
            .unwrap();

        assert!(store.clear(Platform::Linkedin).unwrap());
        assert!(!store.clear(Platform::Linkedin).unwrap());
    }
}
