use super::TrackRecord;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Top-level keys that may hold the track list, in lookup order
const TRACK_LIST_KEYS: [&str; 2] = ["playlist", "songs"];

/// Playlist data as raw text or as an already-parsed JSON value
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    Parsed(&'a Value),
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Payload::Text(text)
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(text: &'a String) -> Self {
        Payload::Text(text.as_str())
    }
}

impl<'a> From<&'a Value> for Payload<'a> {
    fn from(value: &'a Value) -> Self {
        Payload::Parsed(value)
    }
}

/// Turn a playlist payload into tracks, in source order
///
/// Invalid JSON fails with [`Error::ParseFailed`]; valid JSON without a
/// non-empty track list fails with [`Error::NoTracks`]. Missing track fields
/// become empty strings.
pub fn ingest<'a>(payload: impl Into<Payload<'a>>) -> Result<Vec<TrackRecord>> {
    match payload.into() {
        Payload::Text(text) => {
            let cleaned = strip_code_fence(text);
            let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
                debug!("Playlist JSON parse failed: {}", e);
                Error::ParseFailed(e.to_string())
            })?;
            tracks_from_value(&value)
        }
        Payload::Parsed(value) => tracks_from_value(value),
    }
}

fn tracks_from_value(value: &Value) -> Result<Vec<TrackRecord>> {
    let entries = value
        .as_object()
        .and_then(resolve_track_list)
        .filter(|entries| !entries.is_empty())
        .ok_or(Error::NoTracks)?;

    let tracks: Vec<TrackRecord> = entries.iter().map(track_from_entry).collect();
    info!("🎵 Ingested {} tracks", tracks.len());
    Ok(tracks)
}

/// `playlist` wins whenever it is present; `songs` is only read when it is absent
fn resolve_track_list(object: &Map<String, Value>) -> Option<&Vec<Value>> {
    TRACK_LIST_KEYS
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(Value::as_array)
}

fn track_from_entry(entry: &Value) -> TrackRecord {
    let Some(fields) = entry.as_object() else {
        warn!("Skipping fields of non-object track entry: {}", entry);
        return TrackRecord::default();
    };

    TrackRecord {
        title: text_field(fields, "title"),
        style_tags: text_field(fields, "style"),
        image_prompt: text_field(fields, "midjourney"),
        lyrics: text_field(fields, "lyrics"),
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(text)) => text.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Remove a surrounding markdown code fence (```json ... ```) if present
fn strip_code_fence(content: &str) -> String {
    let content = content.trim();

    if content.starts_with("```") {
        if let Some(start) = content.find('\n') {
            if let Some(end) = content.rfind("```") {
                if end > start {
                    return content[start + 1..end].trim().to_string();
                }
            }
        }
    }

    content.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_playlist_key_with_missing_fields() {
        let tracks = assert_ok!(ingest(r#"{"playlist":[{"title":"A"}]}"#));

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "A");
        assert_eq!(tracks[0].style_tags, "");
        assert_eq!(tracks[0].image_prompt, "");
        assert_eq!(tracks[0].lyrics, "");
    }

    #[test]
    fn test_songs_key_accepted_identically() {
        let from_playlist = ingest(r#"{"playlist":[{"title":"A","style":"jazz"}]}"#).unwrap();
        let from_songs = ingest(r#"{"songs":[{"title":"A","style":"jazz"}]}"#).unwrap();

        assert_eq!(from_playlist, from_songs);
    }

    #[test]
    fn test_playlist_key_takes_precedence() {
        let tracks = ingest(r#"{"songs":[{"title":"S"}],"playlist":[{"title":"P"}]}"#).unwrap();
        assert_eq!(tracks[0].title, "P");
    }

    #[test]
    fn test_empty_object_is_no_tracks() {
        let err = assert_err!(ingest("{}"));
        assert!(matches!(err, Error::NoTracks));
    }

    #[test]
    fn test_empty_list_is_no_tracks() {
        assert!(matches!(ingest(r#"{"playlist": []}"#), Err(Error::NoTracks)));
        assert!(matches!(ingest(r#"{"songs": []}"#), Err(Error::NoTracks)));
        assert!(matches!(ingest(r#"{"playlist": "five songs"}"#), Err(Error::NoTracks)));
        assert!(matches!(ingest(r#"[{"title": "A"}]"#), Err(Error::NoTracks)));
    }

    #[test]
    fn test_truncated_json_is_parse_error() {
        let err = assert_err!(ingest(r#"{"playlist":[{"title":"A", "lyr"#));
        assert!(matches!(err, Error::ParseFailed(_)));
    }

    #[test]
    fn test_preserves_source_order() {
        let tracks = ingest(r#"{"playlist":[{"title":"Z"},{"title":"A"},{"title":"M"}]}"#).unwrap();
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_parsed_value_input() {
        let value = json!({
            "playlist": [{
                "title": "Neon Rain",
                "style": "synthwave, 110 bpm",
                "midjourney": "neon city in rain --ar 16:9",
                "lyrics": "[Intro]\n..."
            }]
        });

        let tracks = ingest(&value).unwrap();
        assert_eq!(tracks[0].image_prompt, "neon city in rain --ar 16:9");
        assert_eq!(tracks[0].lyrics, "[Intro]\n...");
    }

    #[test]
    fn test_code_fenced_paste() {
        let pasted = "```json\n{\"playlist\": [{\"title\": \"Fenced\"}]}\n```";
        let tracks = ingest(pasted).unwrap();
        assert_eq!(tracks[0].title, "Fenced");
    }

    #[test]
    fn test_non_string_fields_are_tolerated() {
        let tracks = ingest(r#"{"playlist":[{"title": 7, "style": null}, "oops"]}"#).unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "7");
        assert_eq!(tracks[0].style_tags, "");
        assert_eq!(tracks[1], TrackRecord::default());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
