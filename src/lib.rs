// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod date;
pub mod extract;
pub mod fetch;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{Digest, NewsItem, SourceSummary};
pub use crate::config::{CategoryRule, FeedSource, RadarConfig, Taxonomy};
pub use crate::fetch::{run_once, FeedTransport, HttpTransport};
