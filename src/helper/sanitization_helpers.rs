use std::collections::HashSet;

/// Strips all markup and decodes entities, leaving plain text for titles and excerpts.
/// Script and style elements are dropped with their contents.
/// The output is NOT escaped; escape it again before splicing it into markup.
pub fn strip_tags(input: &str) -> String {
    let cleaned = ammonia::Builder::new()
        .tags(HashSet::new()) // Allow no tags
        .clean(input)
        .to_string();
    let decoded = html_escape::decode_html_entities(&cleaned);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of the plain text followed by `...`.
/// Empty input stays empty so cards can skip the paragraph.
pub fn excerpt(input: &str, max_chars: usize) -> String {
    let plain = strip_tags(input);
    if plain.is_empty() {
        return plain;
    }
    let mut out: String = plain.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
