//! Rendering and caching of results

pub mod formatter;
pub mod results_store;

pub use formatter::{formatter_for, OutputFormatter, ProfileSummary};
pub use results_store::{ResultsStore, SearchRecord};
