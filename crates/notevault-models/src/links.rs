//! Splitting note text into plain text and web links.

use std::sync::OnceLock;

use regex::Regex;

/// A run of note text, either plain or a clickable link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteSegment<'a> {
    Text(&'a str),
    Link(&'a str),
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("valid link pattern"))
}

/// Split `text` into segments; concatenating them yields `text` again.
///
/// A link runs from `http://` or `https://` up to the next whitespace.
pub fn note_segments(text: &str) -> Vec<NoteSegment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for found in link_pattern().find_iter(text) {
        if found.start() > cursor {
            segments.push(NoteSegment::Text(&text[cursor..found.start()]));
        }
        segments.push(NoteSegment::Link(found.as_str()));
        cursor = found.end();
    }

    if cursor < text.len() {
        segments.push(NoteSegment::Text(&text[cursor..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_single_segment() {
        assert_eq!(
            note_segments("just words"),
            vec![NoteSegment::Text("just words")]
        );
        assert!(note_segments("").is_empty());
    }

    #[test]
    fn test_links_are_split_out() {
        let segments = note_segments("see https://example.com/a?b=1 and http://x.org");
        assert_eq!(
            segments,
            vec![
                NoteSegment::Text("see "),
                NoteSegment::Link("https://example.com/a?b=1"),
                NoteSegment::Text(" and "),
                NoteSegment::Link("http://x.org"),
            ]
        );
    }

    #[test]
    fn test_non_http_schemes_stay_text() {
        assert_eq!(
            note_segments("ftp://host/file"),
            vec![NoteSegment::Text("ftp://host/file")]
        );
    }
}
