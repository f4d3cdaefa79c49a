//! Video discovery
//!
//! Finds recently published videos for a keyword, enriches each with its
//! channel's subscriber count and ranks them by performance ratio.

pub mod pipeline;
pub mod youtube;

// Re-export main types
pub use pipeline::VideoDiscovery;
pub use youtube::{YouTubeClient, YouTubeConfig};

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest page the search endpoint returns in one call
pub const MAX_PAGE_SIZE: u32 = 50;

/// Publish window bounds in days
pub const MIN_DAYS_AGO: u32 = 1;
pub const MAX_DAYS_AGO: u32 = 30;

/// Platform-defined video length classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationBucket {
    /// No length filter is sent
    #[default]
    Any,
    /// Under 4 minutes
    Short,
    /// 4 to 20 minutes
    Medium,
    /// Over 20 minutes
    Long,
}

impl DurationBucket {
    /// Value for the search `videoDuration` parameter, `None` when unrestricted
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            DurationBucket::Any => None,
            DurationBucket::Short => Some("short"),
            DurationBucket::Medium => Some("medium"),
            DurationBucket::Long => Some("long"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationBucket::Any => "All lengths",
            DurationBucket::Short => "Under 4 min (Short)",
            DurationBucket::Medium => "4 to 20 min (Medium)",
            DurationBucket::Long => "Over 20 min (Long)",
        }
    }
}

impl FromStr for DurationBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "all" | "" => Ok(DurationBucket::Any),
            "short" => Ok(DurationBucket::Short),
            "medium" => Ok(DurationBucket::Medium),
            "long" => Ok(DurationBucket::Long),
            other => Err(format!(
                "unknown duration '{}', expected any, short, medium or long",
                other
            )),
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value().unwrap_or("any"))
    }
}

/// Keyword prefilled when none is configured
pub const DEFAULT_KEYWORD: &str = "재테크";

/// Filters for one discovery run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryQuery {
    /// Search keyword
    pub keyword: String,
    /// Only videos published within this many days
    pub days_ago: u32,
    /// Videos with fewer views are dropped after fetching
    pub min_views: u64,
    /// Length filter
    pub duration: DurationBucket,
    /// Search page size
    pub max_results: u32,
}

impl DiscoveryQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            days_ago: 10,
            min_views: 10_000,
            duration: DurationBucket::Any,
            max_results: 20,
        }
    }

    pub fn with_days_ago(mut self, days_ago: u32) -> Self {
        self.days_ago = days_ago;
        self
    }

    pub fn with_min_views(mut self, min_views: u64) -> Self {
        self.min_views = min_views;
        self
    }

    pub fn with_duration(mut self, duration: DurationBucket) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Check the bounds the search endpoint itself imposes
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DAYS_AGO..=MAX_DAYS_AGO).contains(&self.days_ago) {
            return Err(Error::InvalidParameter(format!(
                "days_ago must be between {} and {}, got {}",
                MIN_DAYS_AGO, MAX_DAYS_AGO, self.days_ago
            )));
        }

        if self.max_results == 0 || self.max_results > MAX_PAGE_SIZE {
            return Err(Error::InvalidParameter(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.max_results
            )));
        }

        Ok(())
    }

    /// Build the search-stage request relative to `now`
    pub fn search_request(&self, now: DateTime<Utc>) -> SearchRequest {
        SearchRequest {
            keyword: self.keyword.clone(),
            published_after: now - Duration::days(i64::from(self.days_ago)),
            duration: self.duration,
            max_results: self.max_results,
        }
    }
}

impl Default for DiscoveryQuery {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD)
    }
}

/// Parameters sent to the search endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub keyword: String,
    pub published_after: DateTime<Utc>,
    pub duration: DurationBucket,
    pub max_results: u32,
}

impl SearchRequest {
    /// `publishedAfter` bound as an ISO-8601 UTC timestamp at second precision
    pub fn published_after_param(&self) -> String {
        self.published_after.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Per-video statistics and snippet returned by the detail stage
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetail {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub view_count: u64,
    pub thumbnail_url: String,
    pub published_at: String,
}

/// Per-channel statistics returned by the channel stage
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStats {
    pub id: String,
    /// Absent when the channel hides its subscriber count
    pub subscriber_count: Option<u64>,
}

/// A ranked discovery result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub channel_id: String,
    pub view_count: u64,
    pub subscriber_count: u64,
    pub performance_ratio: f64,
    pub published_on: NaiveDate,
    pub thumbnail_url: String,
    pub watch_url: String,
}

impl VideoRecord {
    pub fn watch_url_for(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }
}

/// The three lookups a video platform must answer for the pipeline
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Video identifiers for a search, in the platform's relevance order
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>>;

    /// Statistics and snippet for each identifier, in one batch
    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoDetail>>;

    /// Statistics for each channel identifier, in one batch
    async fn channels(&self, ids: &[String]) -> Result<Vec<ChannelStats>>;
}
