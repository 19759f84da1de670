//! Job board automation: session handling, listing collection and search orchestration

pub mod collector;
pub mod cookies;
pub mod orchestrator;
pub mod platform;
pub mod session;
pub mod types;

pub use collector::{Collection, CollectorOptions, ListingCollector};
pub use cookies::CookieStore;
pub use orchestrator::{rank_postings, JobSearchOrchestrator, SearchReport};
pub use platform::PlatformProfile;
pub use session::{Credentials, SessionManager, SessionState, SessionStatus};
pub use types::{CancelToken, Platform, Posting, SearchQuery};
