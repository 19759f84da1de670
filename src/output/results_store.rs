//! Cache of the most recent search, shown again by `job-scout jobs`

use crate::bot::{Posting, SearchQuery};
use crate::error::Result;
use crate::storage::write_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: SearchQuery,
    pub searched_at: DateTime<Utc>,
    #[serde(default)]
    pub notices: Vec<String>,
    pub postings: Vec<Posting>,
}

impl SearchRecord {
    pub fn new(query: SearchQuery, postings: Vec<Posting>, notices: Vec<String>) -> Self {
        Self {
            query,
            searched_at: Utc::now(),
            notices,
            postings,
        }
    }
}

pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, record: &SearchRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.path, &json)
    }

    /// The cached search, or `None` when nothing was searched yet
    pub fn load(&self) -> Result<Option<SearchRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::Platform;

    #[test]
    fn test_save_and_load_last_search() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultsStore::new(dir.path().join("last_search.json"));
        assert!(store.load().unwrap().is_none());

        let query = SearchQuery::new("Data Analyst", "Ankara", Platform::Kariyer).unwrap();
        let postings = vec![Posting::new("Data Analyst", "Şirket", "https://www.kariyer.net/is-ilani/1").with_score(64.2)];
        store.save(&SearchRecord::new(query.clone(), postings, Vec::new())).unwrap();

        let record = store.load().unwrap().unwrap();
        assert_eq!(record.query, query);
        assert_eq!(record.postings[0].match_score(), Some(64.2));
        assert_eq!(record.postings[0].company, "Şirket");
    }
}
