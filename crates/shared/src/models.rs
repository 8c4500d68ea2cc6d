use std::fmt;

/// A named news feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The feeds polled on every run, in processing order
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("TheHindu", "https://www.thehindu.com/news/national/rssfeed/"),
        FeedSource::new(
            "IndianExpress",
            "https://indianexpress.com/section/india/feed/",
        ),
        FeedSource::new("GKToday", "https://www.gktoday.in/current-affairs/feed/"),
    ]
}

/// One item as read from a feed, before any enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendStatus {
    Trending,
    NotTrending,
}

impl TrendStatus {
    pub fn is_trending(&self) -> bool {
        matches!(self, TrendStatus::Trending)
    }
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendStatus::Trending => write!(f, "Trending 🔥"),
            TrendStatus::NotTrending => write!(f, "Not Trending"),
        }
    }
}

/// Generated text attached to a trending headline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub summary: String,
    pub tags: String,
    pub reporter_explanation: String,
    pub hook_script: String,
}

/// A processed headline, written once as a spreadsheet row
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published_date: String,
    pub enrichment: Enrichment,
    pub trend_status: TrendStatus,
}

impl Article {
    /// Cell values in header order
    pub fn row(&self) -> [String; 8] {
        [
            self.title.clone(),
            self.link.clone(),
            self.published_date.clone(),
            self.enrichment.summary.clone(),
            self.enrichment.tags.clone(),
            self.enrichment.reporter_explanation.clone(),
            self.enrichment.hook_script.clone(),
            self.trend_status.to_string(),
        ]
    }
}
