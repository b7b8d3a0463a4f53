// src/fetch.rs
//! Per-source feed retrieval with failure isolation.
//!
//! Every registry source runs in its own task: fetch, decode, extract,
//! filter, classify. Whatever goes wrong inside a task (transport error,
//! malformed document, even a panic) is contained at the join and downgraded
//! to a zero-count summary plus a warn diagnostic, so one broken feed never
//! touches the others. Summaries come back in registry order no matter how
//! the tasks finish.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::aggregate::{self, Digest, NewsItem, SourceSummary};
use crate::classify;
use crate::config::{FeedSource, RadarConfig, Taxonomy};
use crate::date;
use crate::extract;

/// Independent deadline per request; a stuck source must not hold up the run.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("oilgas-threat-radar/", env!("CARGO_PKG_VERSION"));

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "radar_sources_failed_total",
            "Feed sources skipped after a fetch or parse failure."
        );
        describe_counter!(
            "radar_items_kept_total",
            "Items surviving relevance filtering and classification."
        );
        describe_counter!(
            "radar_items_deduped_total",
            "Items dropped as duplicate links during digest assembly."
        );
        describe_histogram!(
            "radar_source_ms",
            "Per-source fetch + extract + classify time in milliseconds."
        );
    });
}

/// Transport seam: returns the raw body for a feed endpoint.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Production transport. Certificate validation is off: the registry hosts
/// are public feeds and several of them present certificates that fail
/// validation.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("feed request failed")?
            .error_for_status()
            .context("feed returned non-success status")?;
        let body = resp.bytes().await.context("reading feed body")?;
        Ok(body.to_vec())
    }
}

/// Run one source through the whole per-item pipeline.
async fn fetch_source(
    transport: &dyn FeedTransport,
    source: &FeedSource,
    taxonomy: &Taxonomy,
) -> Result<Vec<NewsItem>> {
    let bytes = transport.fetch(&source.url).await?;
    let body = extract::decode_body(&bytes);
    let candidates = extract::extract_items(&body)?;

    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let text = classify::item_text(&candidate.title, &candidate.summary);
        if !classify::is_relevant(&text, &taxonomy.relevance_terms) {
            continue;
        }
        let categories = classify::classify(&text, taxonomy);
        out.push(NewsItem {
            title: candidate.title,
            link: candidate.link,
            source: source.name.clone(),
            published: date::normalize(candidate.published_raw.as_deref()),
            summary: candidate.summary,
            categories,
        });
    }
    Ok(out)
}

/// Fetch every registry source concurrently and join in registry order.
///
/// Returns the surviving items (concatenated in registry order) and one
/// summary per source. Failed sources report `count = 0` and the run goes on.
pub async fn fetch_all(
    transport: Arc<dyn FeedTransport>,
    sources: &[FeedSource],
    taxonomy: &Taxonomy,
) -> (Vec<NewsItem>, Vec<SourceSummary>) {
    let taxonomy = Arc::new(taxonomy.clone());

    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let transport = transport.clone();
            let taxonomy = taxonomy.clone();
            let source = source.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                let result = fetch_source(transport.as_ref(), &source, &taxonomy).await;
                histogram!("radar_source_ms").record(started.elapsed().as_secs_f64() * 1_000.0);
                result
            })
        })
        .collect();

    let mut items = Vec::new();
    let mut summaries = Vec::with_capacity(sources.len());
    for (source, handle) in sources.iter().zip(handles) {
        let batch = match handle.await {
            Ok(Ok(batch)) => Some(batch),
            Ok(Err(err)) => {
                warn!(source = %source.name, error = ?err, "feed source skipped");
                counter!("radar_sources_failed_total").increment(1);
                None
            }
            Err(join_err) => {
                warn!(source = %source.name, error = ?join_err, "feed task died");
                counter!("radar_sources_failed_total").increment(1);
                None
            }
        };

        let count = batch.as_ref().map_or(0, Vec::len);
        debug!(source = %source.name, count, "source finished");
        summaries.push(SourceSummary {
            name: source.name.clone(),
            url: source.url.clone(),
            count,
        });
        if let Some(batch) = batch {
            items.extend(batch);
        }
    }

    counter!("radar_items_kept_total").increment(items.len() as u64);
    (items, summaries)
}

/// One batch run over an explicit configuration. Always completes: with
/// every source down the digest still comes out, just empty.
pub async fn run_once(transport: Arc<dyn FeedTransport>, config: &RadarConfig) -> Digest {
    ensure_metrics_described();

    let (items, summaries) = fetch_all(transport, &config.sources, &config.taxonomy).await;
    let before = items.len();
    let digest = aggregate::build_digest(items, summaries);
    counter!("radar_items_deduped_total").increment((before - digest.items.len()) as u64);
    digest
}
