//! Spike Studio
//!
//! Finds recently published videos that outperform their channel's audience
//! and drafts AI music playlist plans for Suno and Midjourney.

pub mod config;
pub mod discovery;
pub mod error;
pub mod llm;
pub mod playlist;
pub mod report;
pub mod scoring;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::discovery::{
    DiscoveryQuery, DurationBucket, VideoDiscovery, VideoPlatform, VideoRecord, YouTubeClient,
};
pub use crate::error::{Error, Result};
pub use crate::llm::{LLMConfig, LLMProvider};
pub use crate::playlist::{ingest, PlaylistGenerator, TrackRecord};
pub use crate::report::DiscoveryReport;
pub use crate::scoring::performance_ratio;
