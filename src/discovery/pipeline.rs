//! Three-stage discovery pipeline: search, video details, channel statistics

use super::youtube::{YouTubeClient, YouTubeConfig};
use super::{DiscoveryQuery, VideoDetail, VideoPlatform, VideoRecord};
use crate::error::{Error, Result};
use crate::scoring::performance_ratio;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Runs discovery queries against one video platform
pub struct VideoDiscovery<P: VideoPlatform> {
    platform: P,
}

impl VideoDiscovery<YouTubeClient> {
    /// Discovery backed by the YouTube Data API
    pub fn youtube(api_key: &str, config: &YouTubeConfig) -> Result<Self> {
        Ok(Self::new(YouTubeClient::new(api_key, config)?))
    }
}

impl<P: VideoPlatform> VideoDiscovery<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run a query with the publish window ending now
    pub async fn discover(&self, query: &DiscoveryQuery) -> Result<Vec<VideoRecord>> {
        self.discover_at(query, Utc::now()).await
    }

    /// Run a query with the publish window ending at `now`
    ///
    /// The stages run strictly in sequence; any stage failure aborts the run
    /// and no partial results are returned.
    pub async fn discover_at(
        &self,
        query: &DiscoveryQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<VideoRecord>> {
        query.validate()?;

        let request = query.search_request(now);
        info!(
            "🔍 Searching '{}' published after {} (duration: {}, page size: {})",
            request.keyword,
            request.published_after_param(),
            request.duration,
            request.max_results
        );

        let video_ids = self.platform.search(&request).await?;
        if video_ids.is_empty() {
            info!("📭 Search returned no videos");
            return Ok(Vec::new());
        }
        debug!("Search returned {} video ids", video_ids.len());

        let videos = self.platform.videos(&video_ids).await?;

        let channel_ids = distinct_channel_ids(&videos);
        let subscribers: HashMap<String, u64> = if channel_ids.is_empty() {
            HashMap::new()
        } else {
            self.platform
                .channels(&channel_ids)
                .await?
                .into_iter()
                .map(|channel| (channel.id, channel.subscriber_count.unwrap_or(0)))
                .collect()
        };
        debug!(
            "Resolved subscriber counts for {} of {} channels",
            subscribers.len(),
            channel_ids.len()
        );

        let records = merge(videos, &subscribers, query.min_views)?;
        info!(
            "✅ {} videos at or above {} views",
            records.len(),
            query.min_views
        );

        Ok(rank(records))
    }
}

/// Channel ids in first-seen order, each once
fn distinct_channel_ids(videos: &[VideoDetail]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for video in videos {
        if seen.insert(video.channel_id.as_str()) {
            ids.push(video.channel_id.clone());
        }
    }
    ids
}

/// Drop videos under the view floor and build scored records for the rest
fn merge(
    videos: Vec<VideoDetail>,
    subscribers: &HashMap<String, u64>,
    min_views: u64,
) -> Result<Vec<VideoRecord>> {
    videos
        .into_iter()
        .filter(|video| video.view_count >= min_views)
        .map(|video| {
            let subscriber_count = subscribers.get(&video.channel_id).copied().unwrap_or(0);
            let published_on = parse_published_date(&video.published_at)?;

            Ok(VideoRecord {
                watch_url: VideoRecord::watch_url_for(&video.id),
                performance_ratio: performance_ratio(video.view_count, subscriber_count),
                id: video.id,
                title: video.title,
                channel_title: video.channel_title,
                channel_id: video.channel_id,
                view_count: video.view_count,
                subscriber_count,
                published_on,
                thumbnail_url: video.thumbnail_url,
            })
        })
        .collect()
}

/// Sort by performance ratio, highest first; equal ratios keep input order
pub fn rank(mut records: Vec<VideoRecord>) -> Vec<VideoRecord> {
    records.sort_by(|a, b| {
        b.performance_ratio
            .partial_cmp(&a.performance_ratio)
            .unwrap_or(Ordering::Equal)
    });
    records
}

/// Day part of a `publishedAt` timestamp
fn parse_published_date(published_at: &str) -> Result<NaiveDate> {
    published_at
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            Error::UnexpectedResponse(format!("invalid publishedAt value '{}'", published_at))
        })
}
