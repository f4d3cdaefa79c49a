//! Playlist planning: ingest a track plan from pasted or generated JSON
//!
//! A plan is produced either by an external chat assistant fed the manual
//! prompt, or directly through an LLM provider.

pub mod generator;
pub mod ingest;
pub mod prompts;

// Re-export main types
pub use generator::PlaylistGenerator;
pub use ingest::{ingest, Payload};

use serde::{Deserialize, Serialize};

/// One planned track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub title: String,
    /// Suno style tags
    #[serde(rename = "style")]
    pub style_tags: String,
    /// Midjourney thumbnail prompt
    #[serde(rename = "midjourney")]
    pub image_prompt: String,
    pub lyrics: String,
}

impl TrackRecord {
    /// Tab label for the track at zero-based `index`
    pub fn tab_label(&self, index: usize) -> String {
        let title = if self.title.trim().is_empty() {
            "Track"
        } else {
            self.title.as_str()
        };
        format!("{}. {}", index + 1, title)
    }
}
