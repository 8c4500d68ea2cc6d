use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::{default_sources, FeedSource};

pub const DEFAULT_OUTPUT: &str = "trendy_news_summary.xlsx";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Google Trends query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendsSettings {
    pub geo: String,
    pub hl: String,
    pub tz: i32,
    pub timeframe: String,
    pub threshold: u32,
}

impl Default for TrendsSettings {
    fn default() -> Self {
        Self {
            geo: "IN".to_string(),
            hl: "en-US".to_string(),
            tz: 330,
            timeframe: "now 7-d".to_string(),
            threshold: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub output_path: PathBuf,
    pub trends: TrendsSettings,
    pub per_feed_limit: usize,
    pub schedule_at: NaiveTime,
    pub sources: Vec<FeedSource>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context(
                "GEMINI_API_KEY not found.\n\n\
                To fix this, create ~/.config/trendy-news/.env with:\n  \
                GEMINI_API_KEY=your_key_here\n\n\
                Get a Gemini API key from: https://aistudio.google.com/app/apikey",
            )?;

        let defaults = TrendsSettings::default();
        let trends = TrendsSettings {
            geo: lookup("TRENDS_GEO").unwrap_or(defaults.geo),
            hl: lookup("TRENDS_HL").unwrap_or(defaults.hl),
            tz: parse_var(&lookup, "TRENDS_TZ", defaults.tz)?,
            timeframe: lookup("TRENDS_TIMEFRAME").unwrap_or(defaults.timeframe),
            threshold: parse_var(&lookup, "TREND_THRESHOLD", defaults.threshold)?,
        };

        let schedule_at = match lookup("SCHEDULE_AT") {
            Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .with_context(|| format!("SCHEDULE_AT must be HH:MM, got '{}'", raw))?,
            None => NaiveTime::from_hms_opt(8, 0, 0).context("Invalid default schedule time")?,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            output_path: lookup("TRENDY_NEWS_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            trends,
            per_feed_limit: parse_var(&lookup, "PER_FEED_LIMIT", 3)?,
            schedule_at,
            sources: default_sources(),
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/trendy-news/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("trendy-news").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let env = vars(&[("GEMINI_API_KEY", "secret")]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.gemini_api_key, "secret");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.output_path, PathBuf::from("trendy_news_summary.xlsx"));
        assert_eq!(config.trends, TrendsSettings::default());
        assert_eq!(config.per_feed_limit, 3);
        assert_eq!(config.schedule_at, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(config.sources.len(), 3);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = Config::from_vars(|_| None).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_an_error() {
        let env = vars(&[("GEMINI_API_KEY", "  ")]);
        assert!(Config::from_vars(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_overrides() {
        let env = vars(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("TRENDY_NEWS_OUTPUT", "/tmp/out.xlsx"),
            ("TRENDS_GEO", "US"),
            ("TRENDS_TZ", "-300"),
            ("TREND_THRESHOLD", "50"),
            ("PER_FEED_LIMIT", "5"),
            ("SCHEDULE_AT", "07:30"),
        ]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.output_path, PathBuf::from("/tmp/out.xlsx"));
        assert_eq!(config.trends.geo, "US");
        assert_eq!(config.trends.tz, -300);
        assert_eq!(config.trends.threshold, 50);
        assert_eq!(config.per_feed_limit, 5);
        assert_eq!(config.schedule_at, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let env = vars(&[("GEMINI_API_KEY", "k"), ("TREND_THRESHOLD", "high")]);
        let err = Config::from_vars(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("TREND_THRESHOLD"));
    }

    #[test]
    fn test_bad_schedule_is_an_error() {
        let env = vars(&[("GEMINI_API_KEY", "k"), ("SCHEDULE_AT", "8am")]);
        assert!(Config::from_vars(|k| env.get(k).cloned()).is_err());
    }
}
