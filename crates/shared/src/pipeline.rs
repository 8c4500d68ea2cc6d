use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::feeds::FeedReader;
use crate::io::{load_existing_headlines, save_articles};
use crate::models::{Article, Enrichment, FeedSource};
use crate::summarizer::{Summarizer, TextGenerator};
use crate::trends::{TrendChecker, TrendSignal};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub sources: Vec<FeedSource>,
    pub output_path: PathBuf,
    pub per_feed_limit: usize,
    pub trend_threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub written: usize,
    pub duplicates: usize,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn total_written(&self) -> usize {
        self.sources.iter().map(|s| s.written).sum()
    }
}

pub struct Pipeline<'a> {
    reader: &'a dyn FeedReader,
    trends: TrendChecker<'a>,
    summarizer: Summarizer<'a>,
    settings: PipelineSettings,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        reader: &'a dyn FeedReader,
        signal: &'a dyn TrendSignal,
        generator: &'a dyn TextGenerator,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            reader,
            trends: TrendChecker::new(signal, settings.trend_threshold),
            summarizer: Summarizer::new(generator),
            settings,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_on(Local::now().date_naive()).await
    }

    /// One full pass over every source, writing sheets dated `date`
    pub async fn run_on(&self, date: NaiveDate) -> Result<RunReport> {
        info!("🚀 Running Trendy News Automation...");

        let output = &self.settings.output_path;
        let mut seen = load_existing_headlines(output).context("Failed to load existing headlines")?;
        let mut report = RunReport::default();

        for source in &self.settings.sources {
            info!(source = %source.name, "📌 Fetching");
            let entries = self.reader.fetch_entries(&source.url).await?;

            let mut articles = Vec::new();
            let mut duplicates = 0;

            for entry in entries {
                let title = entry.title.trim().to_string();
                if seen.contains(&title) {
                    info!(%title, "⚠️ Skipping duplicate");
                    duplicates += 1;
                    continue;
                }
                if articles.len() >= self.settings.per_feed_limit {
                    break;
                }

                let trend_status = self.trends.check(&title).await;
                let enrichment = if trend_status.is_trending() {
                    info!(%title, "📰 Trending News");
                    self.summarizer.summarize_and_tag(&title).await
                } else {
                    info!(%title, "ℹ️ Not trending");
                    Enrichment::default()
                };

                let published_date = entry
                    .published
                    .unwrap_or_else(|| Local::now().to_rfc3339());

                seen.insert(title.clone());
                articles.push(Article {
                    title,
                    link: entry.link,
                    published_date,
                    enrichment,
                    trend_status,
                });
            }

            let sheet = if articles.is_empty() {
                info!(source = %source.name, "ℹ️ No new articles");
                None
            } else {
                let name = save_articles(output, &source.name, date, &articles)?;
                info!(sheet = %name, "✅ Saved");
                Some(name)
            };

            report.sources.push(SourceReport {
                source: source.name.clone(),
                written: articles.len(),
                duplicates,
                sheet,
            });
        }

        if report.total_written() == 0 {
            warn!("No articles written in this run");
        }
        info!("🎉 Pipeline Completed!");
        Ok(report)
    }
}
