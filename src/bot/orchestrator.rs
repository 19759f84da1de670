//! Runs a search end to end: session, collection, scoring and ranking

use crate::bot::collector::{Collection, CollectorOptions, ListingCollector};
use crate::bot::session::{SessionManager, SessionStatus};
use crate::bot::types::{CancelToken, Platform, Posting, SearchQuery};
use crate::browser::BrowserPage;
use crate::config::{BusyPolicy, Config};
use crate::error::{JobScoutError, Result, SearchStage};
use crate::matching::SimilarityScorer;
use crate::profile::text_processor::TextProcessor;
use crate::profile::ResumeProfile;
use log::{info, warn};
use serde::Serialize;
use tokio::sync::Mutex;

/// Builds the session used for a platform on first search
pub type SessionFactory<P> = Box<dyn Fn(Platform) -> Result<SessionManager<P>> + Send + Sync>;

/// Ranked postings plus the non-fatal conditions met while collecting them
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    pub postings: Vec<Posting>,
    pub notices: Vec<String>,
    pub pages_visited: usize,
    pub collected: usize,
}

pub struct JobSearchOrchestrator<P: BrowserPage> {
    session: Mutex<Option<SessionManager<P>>>,
    factory: SessionFactory<P>,
    collector: ListingCollector,
    scorer: SimilarityScorer,
    max_results: usize,
    top_n: usize,
    busy_policy: BusyPolicy,
}

impl<P: BrowserPage> JobSearchOrchestrator<P> {
    pub fn new<F>(factory: F, collector: ListingCollector, scorer: SimilarityScorer) -> Self
    where
        F: Fn(Platform) -> Result<SessionManager<P>> + Send + Sync + 'static,
    {
        Self {
            session: Mutex::new(None),
            factory: Box::new(factory),
            collector,
            scorer,
            max_results: 200,
            top_n: 50,
            busy_policy: BusyPolicy::Queue,
        }
    }

    pub fn from_config<F>(config: &Config, factory: F) -> Self
    where
        F: Fn(Platform) -> Result<SessionManager<P>> + Send + Sync + 'static,
    {
        let processor = TextProcessor::new(
            config.profiler.min_token_length,
            &config.profiler.extra_stop_words,
        );
        Self::new(
            factory,
            ListingCollector::new(CollectorOptions::from_config(&config.collector)),
            SimilarityScorer::new(&config.scoring, processor),
        )
        .with_limits(config.collector.max_results, config.search.top_n)
        .with_busy_policy(config.search.busy_policy)
    }

    pub fn with_limits(mut self, max_results: usize, top_n: usize) -> Self {
        self.max_results = max_results.max(1);
        self.top_n = top_n.max(1);
        self
    }

    pub fn with_busy_policy(mut self, policy: BusyPolicy) -> Self {
        self.busy_policy = policy;
        self
    }

    /// Postings for `query`, best match first, capped at `top_n`
    pub async fn search(
        &self,
        profile: &ResumeProfile,
        query: &SearchQuery,
        cancel: &CancelToken,
    ) -> Result<Vec<Posting>> {
        Ok(self.search_report(profile, query, cancel).await?.postings)
    }

    pub async fn search_report(
        &self,
        profile: &ResumeProfile,
        query: &SearchQuery,
        cancel: &CancelToken,
    ) -> Result<SearchReport> {
        let mut guard = match self.busy_policy {
            BusyPolicy::Queue => self.session.lock().await,
            BusyPolicy::Reject => self.session.try_lock().map_err(|_| JobScoutError::BotBusy)?,
        };

        let platform = query.platform;
        let wrap = |stage: SearchStage, source: JobScoutError| JobScoutError::Search {
            platform,
            query: query.job_title.clone(),
            stage,
            source: Box::new(source),
        };

        info!("Searching {}", query);

        let session = match guard.take() {
            Some(existing) if existing.platform() == platform => guard.insert(existing),
            other => {
                if let Some(mut previous) = other {
                    previous.shutdown().await;
                }
                let fresh = (self.factory)(platform).map_err(|e| wrap(SearchStage::Session, e))?;
                guard.insert(fresh)
            }
        };

        session
            .ensure_authenticated()
            .await
            .map_err(|e| wrap(SearchStage::Session, e))?;

        let mut collection = self
            .collect(session, query, cancel)
            .await
            .map_err(|e| wrap(SearchStage::Collect, e))?;

        if collection.session_expired() && collection.postings.is_empty() {
            info!("Session expired while collecting; logging in again");
            session
                .ensure_authenticated()
                .await
                .map_err(|e| wrap(SearchStage::Session, e))?;
            collection = self
                .collect(session, query, cancel)
                .await
                .map_err(|e| wrap(SearchStage::Collect, e))?;

            if collection.session_expired() && collection.postings.is_empty() {
                return Err(wrap(SearchStage::Collect, JobScoutError::SessionExpired));
            }
        }

        let mut notices = Vec::new();
        if let Some(warning) = collection.layout_warning.take() {
            notices.push(warning.to_string());
        }
        match collection.interruption.take() {
            None => {}
            Some(JobScoutError::SessionExpired) => {
                notices.push("Session expired during collection; results are partial".to_string());
            }
            Some(e) if collection.postings.is_empty() => return Err(wrap(SearchStage::Collect, e)),
            Some(e) => notices.push(format!("Collection stopped early: {}", e)),
        }

        let collected = collection.postings.len();
        let scored = collection
            .postings
            .into_iter()
            .map(|posting| {
                let score = self.scorer.score(profile, &posting.scoring_text());
                posting.with_score(score)
            })
            .collect();
        let postings = rank_postings(scored, self.top_n);

        info!(
            "Ranked {} postings for {}; keeping {}",
            collected,
            query,
            postings.len()
        );

        Ok(SearchReport {
            postings,
            notices,
            pages_visited: collection.pages_visited,
            collected,
        })
    }

    async fn collect(
        &self,
        session: &mut SessionManager<P>,
        query: &SearchQuery,
        cancel: &CancelToken,
    ) -> Result<Collection> {
        match self.collector.collect(session, query, self.max_results, cancel).await {
            Err(JobScoutError::Cancelled) => {
                warn!("Search for {} cancelled", query);
                session.shutdown().await;
                Err(JobScoutError::Cancelled)
            }
            other => other,
        }
    }

    /// Status of the live session, if one exists for `platform`
    pub async fn session_status(&self, platform: Platform) -> Option<SessionStatus> {
        let guard = self.session.lock().await;
        guard
            .as_ref()
            .filter(|session| session.platform() == platform)
            .map(SessionManager::status)
    }

    /// Close the live session; saved cookies stay on disk
    pub async fn shutdown(&self) {
        let mut guard = self.session.lock().await;
        if let Some(mut session) = guard.take() {
            session.shutdown().await;
        }
    }
}

/// Sort by score, best first, keeping collection order among equal scores
pub fn rank_postings(mut postings: Vec<Posting>, top_n: usize) -> Vec<Posting> {
    postings.sort_by(|a, b| {
        let a = a.match_score().unwrap_or(0.0);
        let b = b.match_score().unwrap_or(0.0);
        b.total_cmp(&a)
    });
    postings.truncate(top_n);
    postings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(link: &str, score: f64) -> Posting {
        Posting::new("Engineer", "Acme", link).with_score(score)
    }

    #[test]
    fn test_rank_is_stable_for_equal_scores() {
        let postings = vec![
            scored("a", 40.0),
            scored("b", 90.0),
            scored("c", 90.0),
            scored("d", 10.0),
        ];

        let ranked = rank_postings(postings, 10);
        let links: Vec<&str> = ranked.iter().map(|p| p.link.as_str()).collect();
        assert_eq!(links, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_rank_caps_at_top_n() {
        let postings = (0..8).map(|i| scored(&i.to_string(), i as f64)).collect();
        let ranked = rank_postings(postings, 3);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].match_score(), Some(7.0));
    }
}
