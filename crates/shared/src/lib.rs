// Public modules
pub mod config;
pub mod feeds;
pub mod io;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod summarizer;
pub mod trends;

// Re-export commonly used types
pub use config::{Config, TrendsSettings};
pub use feeds::{FeedReader, HttpFeedReader};
pub use io::{load_existing_headlines, save_articles};
pub use models::{Article, Enrichment, FeedEntry, FeedSource, TrendStatus};
pub use pipeline::{Pipeline, PipelineSettings, RunReport, SourceReport};
pub use summarizer::{GeminiClient, Summarizer, TextGenerator};
pub use trends::{GoogleTrendsClient, TrendChecker, TrendSignal, TrendsError};
