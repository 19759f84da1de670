//! job-scout library: resume profiling, job board collection and match ranking

pub mod bot;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod matching;
pub mod output;
pub mod profile;
pub mod storage;

pub use config::Config;
pub use error::{JobScoutError, Result};
