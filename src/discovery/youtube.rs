//! YouTube Data API v3 client for the discovery pipeline

use super::{ChannelStats, SearchRequest, VideoDetail, VideoPlatform};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

const SERVICE: &str = "YouTube";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for the YouTube Data API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Base URL of the v3 API
    pub api_base: String,
    /// Default API key when none is given on the command line
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

/// YouTube client holding one user-supplied API key
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl YouTubeClient {
    /// Create a client; a blank key is rejected before any request is built
    pub fn new(api_key: &str, config: &YouTubeConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::MissingApiKey("YouTube Data"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, resource: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.api_base, resource))
            .map_err(|e| Error::InvalidParameter(format!("invalid YouTube API base URL: {}", e)))?;

        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

        Ok(url)
    }

    pub fn search_url(&self, request: &SearchRequest) -> Result<Url> {
        let mut params = vec![
            ("part", "id,snippet".to_string()),
            ("q", request.keyword.clone()),
            ("type", "video".to_string()),
            ("publishedAfter", request.published_after_param()),
            ("maxResults", request.max_results.to_string()),
        ];

        if let Some(duration) = request.duration.query_value() {
            params.push(("videoDuration", duration.to_string()));
        }

        self.endpoint("search", &params)
    }

    pub fn videos_url(&self, ids: &[String]) -> Result<Url> {
        self.endpoint(
            "videos",
            &[("part", "statistics,snippet".to_string()), ("id", ids.join(","))],
        )
    }

    pub fn channels_url(&self, ids: &[String]) -> Result<Url> {
        self.endpoint(
            "channels",
            &[("part", "statistics".to_string()), ("id", ids.join(","))],
        )
    }

    /// The key is sent only as a header, never in the URL
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Sending request to YouTube API: {}", url.path());

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::upstream(SERVICE, status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::UnexpectedResponse(format!("YouTube response: {}", e)))
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>> {
        let response: SearchListResponse = self.get_json(self.search_url(request)?).await?;
        Ok(response.video_ids())
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoDetail>> {
        let response: VideoListResponse = self.get_json(self.videos_url(ids)?).await?;
        Ok(response.items.into_iter().map(VideoDetail::from).collect())
    }

    async fn channels(&self, ids: &[String]) -> Result<Vec<ChannelStats>> {
        let response: ChannelListResponse = self.get_json(self.channels_url(ids)?).await?;
        Ok(response.items.into_iter().map(ChannelStats::from).collect())
    }
}

/// Counts arrive as decimal strings; plain numbers are accepted too
fn de_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Count::Number(n)) => Ok(Some(n)),
        Some(Count::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

impl SearchListResponse {
    fn video_ids(self) -> Vec<String> {
        self.items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    published_at: String,
    channel_id: String,
    title: String,
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    fallback: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    #[serde(default, deserialize_with = "de_count")]
    view_count: Option<u64>,
}

impl From<VideoItem> for VideoDetail {
    fn from(item: VideoItem) -> Self {
        let Thumbnails { medium, fallback } = item.snippet.thumbnails;
        let thumbnail_url = medium.or(fallback).map(|t| t.url).unwrap_or_default();

        VideoDetail {
            id: item.id,
            title: item.snippet.title,
            channel_id: item.snippet.channel_id,
            channel_title: item.snippet.channel_title,
            view_count: item.statistics.view_count.unwrap_or(0),
            thumbnail_url,
            published_at: item.snippet.published_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    #[serde(default)]
    statistics: ChannelStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    #[serde(default, deserialize_with = "de_count")]
    subscriber_count: Option<u64>,
    #[serde(default)]
    hidden_subscriber_count: bool,
}

impl From<ChannelItem> for ChannelStats {
    fn from(item: ChannelItem) -> Self {
        let subscriber_count = if item.statistics.hidden_subscriber_count {
            None
        } else {
            item.statistics.subscriber_count
        };

        ChannelStats {
            id: item.id,
            subscriber_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{DiscoveryQuery, DurationBucket, VideoDiscovery};
    use crate::testing::{closed_base_url, CannedServer};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    const SECRET_KEY: &str = "SECRET-KEY-123";

    fn client() -> YouTubeClient {
        YouTubeClient::new("test_key", &YouTubeConfig::default()).unwrap()
    }

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_blank_key_rejected() {
        let result = YouTubeClient::new("   ", &YouTubeConfig::default());
        assert!(matches!(result, Err(Error::MissingApiKey(_))));
    }

    #[test]
    fn test_search_url_without_duration() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let request = DiscoveryQuery::new("재테크")
            .with_max_results(20)
            .search_request(now);

        let url = client().search_url(&request).unwrap();
        let params = query_map(&url);

        assert_eq!(url.path(), "/youtube/v3/search");
        assert_eq!(params["part"], "id,snippet");
        assert_eq!(params["q"], "재테크");
        assert_eq!(params["type"], "video");
        assert_eq!(params["publishedAfter"], "2024-03-05T00:00:00Z");
        assert_eq!(params["maxResults"], "20");
        assert!(!params.contains_key("key"));
        assert!(!params.contains_key("videoDuration"));
    }

    #[test]
    fn test_search_url_with_duration() {
        let request = DiscoveryQuery::new("jazz")
            .with_duration(DurationBucket::Medium)
            .search_request(Utc::now());

        let params = query_map(&client().search_url(&request).unwrap());
        assert_eq!(params["videoDuration"], "medium");
    }

    #[test]
    fn test_detail_urls_join_ids() {
        let ids = vec!["a1".to_string(), "b2".to_string()];

        let videos = query_map(&client().videos_url(&ids).unwrap());
        assert_eq!(videos["part"], "statistics,snippet");
        assert_eq!(videos["id"], "a1,b2");

        let channels = query_map(&client().channels_url(&ids).unwrap());
        assert_eq!(channels["part"], "statistics");
        assert_eq!(channels["id"], "a1,b2");
    }

    #[test]
    fn test_search_response_keeps_order_and_skips_non_videos() {
        let body = r#"{
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v2"}},
                {"id": {"kind": "youtube#channel", "channelId": "c9"}},
                {"id": {"kind": "youtube#video", "videoId": "v1"}}
            ]
        }"#;

        let response: SearchListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.video_ids(), vec!["v2", "v1"]);
    }

    #[test]
    fn test_video_item_conversion() {
        let body = r#"{
            "items": [{
                "id": "v1",
                "snippet": {
                    "publishedAt": "2024-03-10T08:15:00Z",
                    "channelId": "c1",
                    "title": "Budget tips",
                    "channelTitle": "Money Talk",
                    "thumbnails": {
                        "default": {"url": "https://i.ytimg.com/vi/v1/default.jpg"},
                        "medium": {"url": "https://i.ytimg.com/vi/v1/mqdefault.jpg"}
                    }
                },
                "statistics": {"viewCount": "123456", "likeCount": "10"}
            }, {
                "id": "v2",
                "snippet": {
                    "publishedAt": "2024-03-11T08:15:00Z",
                    "channelId": "c2",
                    "title": "No stats",
                    "channelTitle": "Quiet"
                }
            }]
        }"#;

        let response: VideoListResponse = serde_json::from_str(body).unwrap();
        let details: Vec<VideoDetail> = response.items.into_iter().map(VideoDetail::from).collect();

        assert_eq!(details[0].view_count, 123_456);
        assert_eq!(details[0].thumbnail_url, "https://i.ytimg.com/vi/v1/mqdefault.jpg");
        assert_eq!(details[0].channel_title, "Money Talk");
        assert_eq!(details[1].view_count, 0);
        assert_eq!(details[1].thumbnail_url, "");
    }

    #[test]
    fn test_channel_subscriber_counts() {
        let body = r#"{
            "items": [
                {"id": "c1", "statistics": {"subscriberCount": "1500", "hiddenSubscriberCount": false}},
                {"id": "c2", "statistics": {"hiddenSubscriberCount": true}},
                {"id": "c3"}
            ]
        }"#;

        let response: ChannelListResponse = serde_json::from_str(body).unwrap();
        let stats: Vec<ChannelStats> = response.items.into_iter().map(ChannelStats::from).collect();

        assert_eq!(stats[0].subscriber_count, Some(1500));
        assert_eq!(stats[1].subscriber_count, None);
        assert_eq!(stats[2].subscriber_count, None);
    }

    fn client_at(base_url: &str) -> YouTubeClient {
        let config = YouTubeConfig {
            api_base: format!("{}/youtube/v3", base_url),
            ..Default::default()
        };
        YouTubeClient::new(SECRET_KEY, &config).unwrap()
    }

    fn search_request() -> SearchRequest {
        DiscoveryQuery::new("재테크").search_request(Utc::now())
    }

    #[tokio::test]
    async fn test_key_sent_as_header_only() {
        let server = CannedServer::start(
            200,
            r#"{"items": [{"id": {"kind": "youtube#video", "videoId": "v1"}}]}"#,
        )
        .await;

        let ids = client_at(&server.base_url).search(&search_request()).await.unwrap();
        assert_eq!(ids, vec!["v1"]);

        let request = server.received().await;
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /youtube/v3/search?"));
        assert!(!request_line.contains(SECRET_KEY));
        assert!(request
            .to_lowercase()
            .contains(&format!("x-goog-api-key: {}", SECRET_KEY.to_lowercase())));
    }

    #[tokio::test]
    async fn test_error_status_reports_api_message_verbatim() {
        let server = CannedServer::start(
            403,
            r#"{"error": {"code": 403, "message": "The request cannot be completed because you have exceeded your quota.", "errors": []}}"#,
        )
        .await;

        let err = client_at(&server.base_url)
            .search(&search_request())
            .await
            .unwrap_err();

        match err {
            Error::Upstream {
                service,
                status,
                message,
            } => {
                assert_eq!(service, "YouTube");
                assert_eq!(status, 403);
                assert_eq!(
                    message,
                    "The request cannot be completed because you have exceeded your quota."
                );
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_unexpected_response() {
        let server = CannedServer::start(200, "<html>maintenance</html>").await;

        let err = client_at(&server.base_url)
            .videos(&["v1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_expose_key() {
        let discovery = VideoDiscovery::new(client_at(&closed_base_url().await));

        let err = discovery
            .discover(&DiscoveryQuery::new("test"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
        assert!(!err.to_string().contains(SECRET_KEY));
        assert!(!err.user_message().contains(SECRET_KEY));
        assert!(!format!("{:?}", err).contains(SECRET_KEY));
    }
}
