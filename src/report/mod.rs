//! Presentation data for discovery results and playlist plans
//!
//! Builds the view models a front end renders (ranked table, top-three
//! cards, per-track sections) plus a plain-text rendering for the terminal.

pub mod export;

pub use export::{tracks_to_csv, write_tracks_csv, TrackExportRow};

use crate::discovery::VideoRecord;
use crate::playlist::TrackRecord;
use serde::Serialize;
use std::fmt::Write;

/// Number of highlighted results
pub const TOP_CARD_COUNT: usize = 3;

const PROGRESS_WIDTH: usize = 20;

/// One row of the ranked table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub title: String,
    pub performance_ratio: f64,
    /// Ratio relative to the batch maximum, in [0, 1]
    pub progress: f64,
    pub view_count: u64,
    pub subscriber_count: u64,
    pub watch_url: String,
}

/// A highlighted result card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCard {
    pub thumbnail_url: String,
    pub title: String,
    pub watch_url: String,
    pub performance_ratio: f64,
    pub view_count: u64,
}

/// View model for one discovery run
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub top: Vec<TopCard>,
    pub rows: Vec<TableRow>,
    /// Upper bound of the progress column
    pub progress_max: f64,
}

impl DiscoveryReport {
    /// Build from records already ranked by performance ratio
    pub fn new(records: &[VideoRecord]) -> Self {
        let progress_max = records
            .iter()
            .map(|r| r.performance_ratio)
            .fold(0.0_f64, f64::max);

        let top = records
            .iter()
            .take(TOP_CARD_COUNT)
            .map(|r| TopCard {
                thumbnail_url: r.thumbnail_url.clone(),
                title: r.title.clone(),
                watch_url: r.watch_url.clone(),
                performance_ratio: r.performance_ratio,
                view_count: r.view_count,
            })
            .collect();

        let rows = records
            .iter()
            .map(|r| TableRow {
                title: r.title.clone(),
                performance_ratio: r.performance_ratio,
                progress: if progress_max > 0.0 {
                    r.performance_ratio / progress_max
                } else {
                    0.0
                },
                view_count: r.view_count,
                subscriber_count: r.subscriber_count,
                watch_url: r.watch_url.clone(),
            })
            .collect();

        Self {
            top,
            rows,
            progress_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_empty() {
            "No videos match these filters.".to_string()
        } else {
            format!("Analysis complete! Found {} videos.", self.rows.len())
        }
    }

    /// Plain-text rendering: top cards followed by the ranked table
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.is_empty() {
            out.push_str(&self.summary());
            out.push('\n');
            return out;
        }

        let _ = writeln!(out, "🏆 Performance TOP {}", self.top.len());
        for (i, card) in self.top.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, card.title);
            let _ = writeln!(out, "     {}", card.watch_url);
            let _ = writeln!(
                out,
                "     Performance: {:.1}% | Views: {}",
                card.performance_ratio,
                format_count(card.view_count)
            );
            if !card.thumbnail_url.is_empty() {
                let _ = writeln!(out, "     Thumbnail: {}", card.thumbnail_url);
            }
        }
        out.push('\n');

        for row in &self.rows {
            let _ = writeln!(
                out,
                "{} {:>9.1}%  views {:>13}  subs {:>11}  {}",
                progress_bar(row.progress, PROGRESS_WIDTH),
                row.performance_ratio,
                format_count(row.view_count),
                format_count(row.subscriber_count),
                row.title
            );
            let _ = writeln!(out, "{:w$}  {}", "", row.watch_url, w = PROGRESS_WIDTH + 2);
        }

        out
    }
}

/// Per-track sections, one per tab
pub fn render_tracks(tracks: &[TrackRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🎉 {} tracks planned!", tracks.len());

    for (i, track) in tracks.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "━━━ {} ━━━", track.tab_label(i));
        let _ = writeln!(out, "🎹 Suno Style");
        let _ = writeln!(out, "{}", track.style_tags);
        let _ = writeln!(out, "🎨 Midjourney Prompt");
        let _ = writeln!(out, "{}", track.image_prompt);
        let _ = writeln!(out, "📝 Lyrics & Structure (3 min+)");
        let _ = writeln!(out, "{}", track.lyrics);
    }

    out
}

/// Bar of `width` cells filled in proportion to `fraction`
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Thousands-separated count, e.g. 1,234,567
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, ratio: f64, views: u64) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("Video {}", id),
            channel_title: "Channel".to_string(),
            channel_id: "c1".to_string(),
            view_count: views,
            subscriber_count: 1_000,
            performance_ratio: ratio,
            published_on: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            thumbnail_url: format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id),
            watch_url: VideoRecord::watch_url_for(id),
        }
    }

    #[test]
    fn test_top_cards_limited_to_three() {
        let records = vec![
            record("a", 400.0, 40_000),
            record("b", 300.0, 30_000),
            record("c", 200.0, 20_000),
            record("d", 100.0, 10_000),
        ];

        let report = DiscoveryReport::new(&records);
        assert_eq!(report.top.len(), 3);
        assert_eq!(report.top[0].title, "Video a");
        assert_eq!(report.rows.len(), 4);
    }

    #[test]
    fn test_progress_scaled_to_batch_max() {
        let records = vec![record("a", 400.0, 40_000), record("b", 100.0, 10_000)];

        let report = DiscoveryReport::new(&records);
        assert_eq!(report.progress_max, 400.0);
        assert_eq!(report.rows[0].progress, 1.0);
        assert_eq!(report.rows[1].progress, 0.25);
    }

    #[test]
    fn test_all_zero_scores() {
        let report = DiscoveryReport::new(&[record("a", 0.0, 40_000)]);
        assert_eq!(report.progress_max, 0.0);
        assert_eq!(report.rows[0].progress, 0.0);
    }

    #[test]
    fn test_empty_report() {
        let report = DiscoveryReport::new(&[]);
        assert!(report.is_empty());
        assert!(report.top.is_empty());
        assert_eq!(report.render(), "No videos match these filters.\n");
    }

    #[test]
    fn test_render_contains_cards_and_links() {
        let report = DiscoveryReport::new(&[record("v2", 10000.0, 50_000)]);
        let text = report.render();

        assert!(text.contains("Performance: 10000.0% | Views: 50,000"));
        assert!(text.contains("https://www.youtube.com/watch?v=v2"));
        assert!(text.contains(&format!("[{}]", "#".repeat(PROGRESS_WIDTH))));
    }

    #[test]
    fn test_render_tracks_sections() {
        let tracks = vec![
            TrackRecord {
                title: "Neon Rain".to_string(),
                style_tags: "synthwave".to_string(),
                image_prompt: "neon city --ar 16:9".to_string(),
                lyrics: "[Intro]".to_string(),
            },
            TrackRecord::default(),
        ];

        let text = render_tracks(&tracks);
        assert!(text.starts_with("🎉 2 tracks planned!"));
        assert!(text.contains("━━━ 1. Neon Rain ━━━"));
        assert!(text.contains("━━━ 2. Track ━━━"));
        assert!(text.contains("neon city --ar 16:9"));
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
    }
}
