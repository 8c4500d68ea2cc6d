use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::models::FeedEntry;

#[async_trait]
pub trait FeedReader: Send + Sync {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>>;
}

pub struct HttpFeedReader {
    client: Client,
}

impl HttpFeedReader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; TrendyNews/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedReader for HttpFeedReader {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        url::Url::parse(url).with_context(|| format!("Invalid feed URL: {}", url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Feed {} returned error: {}", url, status);
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read feed body")?;

        parse_feed(&body).with_context(|| format!("Failed to parse feed {}", url))
    }
}

/// Parse RSS or Atom into entries, in document order
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(bytes)?;

    feed.entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            if title.is_empty() {
                anyhow::bail!("Feed entry {} has no title", entry.id);
            }

            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();

            let published = entry
                .published
                .or(entry.updated)
                .map(|d| d.to_rfc3339());

            Ok(FeedEntry {
                title,
                link,
                published,
            })
        })
        .collect()
}
