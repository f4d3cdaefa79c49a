//! Prompt text for playlist planning

/// Tracks requested per plan
pub const TRACK_COUNT: usize = 5;

/// Lyric sections, in order, that keep a song past the three-minute mark
pub const SONG_STRUCTURE: [&str; 10] = [
    "[Intro]",
    "[Verse 1]",
    "[Chorus]",
    "[Verse 2]",
    "[Chorus]",
    "[Bridge]",
    "[Guitar Solo/Interlude]",
    "[Chorus]",
    "[Outro]",
    "[End]",
];

/// Instruction the user pastes into an external chat assistant
pub fn manual_prompt() -> String {
    format!(
        r#"You are an AI creative director specialised in Suno AI (v3.5/v5) and Midjourney.
Plan a playlist of {count} songs for the topic the user gives you.

### Rules
1. Mode: write lyrics for a lyrical request, use Instrumental mode for a BGM request.
2. Language: English by default. If Korean is requested, write a Korean title and Korean lyrics.
3. Midjourney: write a thumbnail prompt matching the mood of each song (English, include --ar 16:9).
4. Suno style: genre, mood, instruments and BPM as English tags.
5. Structure (important): to reach at least 3 minutes, the lyrics must follow this structure exactly.
   {structure}

### Output format
Output only the JSON below. No explanations; put it inside a code block.

{{
  "playlist": [
    {{
      "title": "Song title",
      "style": "Suno Style Tags (English)",
      "midjourney": "Midjourney Prompt (English, --ar 16:9)",
      "lyrics": "[Intro]\n..."
    }}
  ]
}}"#,
        count = TRACK_COUNT,
        structure = SONG_STRUCTURE.join(" -> "),
    )
}

/// System instruction for direct generation through an LLM provider
pub fn system_prompt() -> String {
    format!(
        r#"You are a director specialised in Suno AI and Midjourney.
Plan {count} songs for the user's topic. To keep every song at least 3 minutes long,
the lyrics must follow the [Intro]-[Verse]-[Chorus]-[Verse]-[Chorus]-[Bridge]-[Solo]-[Chorus]-[Outro] structure.
Respond with exactly one JSON object whose top-level key is "playlist": a list of tracks,
each with the string fields "title", "style" (Suno style tags in English),
"midjourney" (English image prompt including --ar 16:9) and "lyrics"."#,
        count = TRACK_COUNT,
    )
}

/// User instruction naming the topic
pub fn user_message(topic: &str) -> String {
    format!("Topic: {}. Output JSON following the rules above.", topic.trim())
}
