//! Search-interest lookups used to decide whether a headline is trending.
//!
//! Google Trends has no public API; the client below speaks the same JSON
//! endpoints the Trends web UI uses: `explore` hands out a token for the
//! time-series widget, and `widgetdata/multiline` returns the series itself.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::TrendsSettings;
use crate::models::TrendStatus;

const TRENDS_BASE: &str = "https://trends.google.com";
const HOME_PATH: &str = "/trends/explore";
const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const MAX_KEYWORDS: usize = 4;

#[derive(Debug, Error)]
pub enum TrendsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("trends returned HTTP {0}")]
    Status(u16),
    #[error("could not decode trends response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no TIMESERIES widget in explore response")]
    MissingWidget,
}

/// A source of search-interest values
#[async_trait]
pub trait TrendSignal: Send + Sync {
    /// Highest interest value observed for any keyword, or `None` when the
    /// provider has no data points for the window.
    async fn max_interest(&self, keywords: &[String]) -> Result<Option<u32>, TrendsError>;
}

/// First four whitespace tokens with surrounding punctuation removed
pub fn extract_keywords(title: &str) -> Vec<String> {
    title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| ".,!?:;".contains(c)))
        .filter(|w| !w.is_empty())
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

impl TrendStatus {
    /// Classify a lookup result. Lookup errors count as not trending.
    pub fn from_lookup(lookup: Result<Option<u32>, TrendsError>, threshold: u32) -> Self {
        match lookup {
            Ok(Some(max)) if max > threshold => TrendStatus::Trending,
            Ok(_) => TrendStatus::NotTrending,
            Err(e) => {
                warn!(error = %e, "❌ Google Trends error");
                TrendStatus::NotTrending
            }
        }
    }
}

pub struct TrendChecker<'a> {
    signal: &'a dyn TrendSignal,
    threshold: u32,
}

impl<'a> TrendChecker<'a> {
    pub fn new(signal: &'a dyn TrendSignal, threshold: u32) -> Self {
        Self { signal, threshold }
    }

    pub async fn check(&self, title: &str) -> TrendStatus {
        let keywords = extract_keywords(title);
        if keywords.is_empty() {
            return TrendStatus::NotTrending;
        }
        let lookup = self.signal.max_interest(&keywords).await;
        TrendStatus::from_lookup(lookup, self.threshold)
    }
}

#[derive(Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    request: Value,
}

#[derive(Deserialize)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    value: Vec<u32>,
}

/// Drop the anti-XSSI prefix (`)]}'` and similar) ahead of the JSON body
fn strip_xssi(body: &str) -> &str {
    match body.find('{') {
        Some(start) => &body[start..],
        None => body,
    }
}

fn encode_query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn max_over_timeline(body: &str) -> Result<Option<u32>, TrendsError> {
    let parsed: MultilineResponse = serde_json::from_str(strip_xssi(body))?;
    Ok(parsed
        .default
        .timeline_data
        .iter()
        .flat_map(|p| p.value.iter().copied())
        .max())
}

pub struct GoogleTrendsClient {
    client: Client,
    settings: TrendsSettings,
    base_url: String,
    primed: OnceCell<()>,
}

impl GoogleTrendsClient {
    pub fn new(settings: TrendsSettings) -> Result<Self, TrendsError> {
        Self::with_base_url(settings, TRENDS_BASE)
    }

    fn with_base_url(settings: TrendsSettings, base_url: &str) -> Result<Self, TrendsError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .cookie_store(true)
            .user_agent("Mozilla/5.0 (compatible; TrendyNews/1.0)")
            .build()?;

        Ok(Self {
            client,
            settings,
            base_url: base_url.trim_end_matches('/').to_string(),
            primed: OnceCell::new(),
        })
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, TrendsError> {
        let url = format!("{}{}?{}", self.base_url, path, encode_query(query));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrendsError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Trends hands out the NID cookie on the explore page; the API calls
    /// answer 429 without it. Fetched once per client, retried if it failed.
    async fn prime_cookies(&self) -> Result<(), TrendsError> {
        self.primed
            .get_or_try_init(|| async {
                let query = encode_query(&[("geo", self.settings.geo.as_str())]);
                let url = format!("{}{}?{}", self.base_url, HOME_PATH, query);
                self.client.get(&url).send().await?;
                Ok::<(), TrendsError>(())
            })
            .await?;
        Ok(())
    }

    fn explore_request(&self, keywords: &[String]) -> Value {
        let items: Vec<Value> = keywords
            .iter()
            .map(|kw| {
                json!({
                    "keyword": kw,
                    "time": self.settings.timeframe,
                    "geo": self.settings.geo,
                })
            })
            .collect();
        json!({ "comparisonItem": items, "category": 0, "property": "" })
    }
}

#[async_trait]
impl TrendSignal for GoogleTrendsClient {
    async fn max_interest(&self, keywords: &[String]) -> Result<Option<u32>, TrendsError> {
        self.prime_cookies().await?;

        let tz = self.settings.tz.to_string();
        let explore_req = self.explore_request(keywords).to_string();
        let explore_body = self
            .get_text(
                EXPLORE_PATH,
                &[
                    ("hl", self.settings.hl.as_str()),
                    ("tz", tz.as_str()),
                    ("req", explore_req.as_str()),
                ],
            )
            .await?;

        let explore: ExploreResponse = serde_json::from_str(strip_xssi(&explore_body))?;
        let widget = explore
            .widgets
            .into_iter()
            .find(|w| w.id == "TIMESERIES")
            .ok_or(TrendsError::MissingWidget)?;

        let widget_req = widget.request.to_string();
        let series_body = self
            .get_text(
                MULTILINE_PATH,
                &[
                    ("hl", self.settings.hl.as_str()),
                    ("tz", tz.as_str()),
                    ("req", widget_req.as_str()),
                    ("token", widget.token.as_str()),
                ],
            )
            .await?;

        let max = max_over_timeline(&series_body)?;
        debug!(?keywords, ?max, "trends lookup");
        Ok(max)
    }
}
