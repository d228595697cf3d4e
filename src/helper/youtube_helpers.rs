use regex::Regex;
use std::sync::OnceLock;

const VIDEO_ID_LEN: usize = 11;

fn video_url_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
            .expect("video URL pattern is valid")
    })
}

/// Pulls the 11-character video id out of the usual share, embed and watch URL shapes.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    let caps = video_url_regex().captures(url)?;
    let id = caps.get(2)?.as_str();
    (id.chars().count() == VIDEO_ID_LEN).then(|| id.to_string())
}

pub fn validate_youtube_url(url: &str) -> bool {
    extract_youtube_id(url).is_some()
}

pub fn youtube_embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", video_id)
}
