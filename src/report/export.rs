//! Spreadsheet export of a playlist plan

use crate::error::Result;
use crate::playlist::TrackRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// UTF-8 byte-order mark so spreadsheet apps pick the right encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADER: [&str; 5] = ["Track", "Title", "Style", "Lyrics", "Image Prompt"];

/// One exported row; `track` is 1-based
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackExportRow {
    pub track: usize,
    pub title: String,
    pub style: String,
    pub lyrics: String,
    pub image_prompt: String,
}

impl TrackExportRow {
    pub fn from_tracks(tracks: &[TrackRecord]) -> Vec<Self> {
        tracks
            .iter()
            .enumerate()
            .map(|(i, track)| Self {
                track: i + 1,
                title: track.title.clone(),
                style: track.style_tags.clone(),
                lyrics: track.lyrics.clone(),
                image_prompt: track.image_prompt.clone(),
            })
            .collect()
    }

    fn fields(&self) -> [String; 5] {
        [
            self.track.to_string(),
            self.title.clone(),
            self.style.clone(),
            self.lyrics.clone(),
            self.image_prompt.clone(),
        ]
    }
}

/// Comma-separated export with a UTF-8 BOM
pub fn tracks_to_csv(tracks: &[TrackRecord]) -> Vec<u8> {
    let mut out = String::new();
    push_record(&mut out, HEADER.iter().copied());

    for row in TrackExportRow::from_tracks(tracks) {
        let fields = row.fields();
        push_record(&mut out, fields.iter().map(String::as_str));
    }

    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + out.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(out.as_bytes());
    bytes
}

/// Write the export to `path`
pub async fn write_tracks_csv(tracks: &[TrackRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, tracks_to_csv(tracks)).await?;
    info!("💾 Exported {} tracks to: {}", tracks.len(), path.display());
    Ok(())
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

/// Quote only when the field needs it, doubling embedded quotes
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
