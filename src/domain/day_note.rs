//! A single day's note and its attachments.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// The content of one day's note.
///
/// `content` is the markup as read from disk, with local image references
/// resolved for display. `updated_at` is always the backing file's
/// last-modified time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayNote {
    content: String,
    updated_at: DateTime<Utc>,
}

impl DayNote {
    pub fn new(content: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            updated_at,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the note has no visible text and no images.
    ///
    /// An empty document still exists on disk but counts as "no note" for
    /// display purposes.
    pub fn is_blank(&self) -> bool {
        !image_tag_regex().is_match(&self.content) && self.text().trim().is_empty()
    }

    /// Returns the plain-text content with markup removed and whitespace
    /// collapsed.
    pub fn text(&self) -> String {
        let stripped = tag_regex().replace_all(&self.content, " ");
        let decoded = decode_entities(&stripped);
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Returns the plain text truncated to `max_chars`, with an ellipsis if
    /// anything was cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.text();
        if text.chars().count() <= max_chars {
            text
        } else {
            let truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{}…", truncated.trim_end())
        }
    }
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("valid tag regex"))
}

fn image_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<img\b").expect("valid image regex"))
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// A named binary file attached to a note during one editing session.
///
/// `live_ref` is the reference the editor used for the image while it was
/// pending (for example the path the user picked it from). Image elements
/// whose `src` equals it are rewritten to `./<name>` on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    bytes: Vec<u8>,
    live_ref: Option<String>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            live_ref: None,
        }
    }

    /// Creates an attachment with a collision-resistant name derived from the
    /// original file name and a timestamp: `img_<millis>_<name>`, with
    /// whitespace in the name replaced by underscores.
    pub fn stamped(original_name: &str, bytes: Vec<u8>, at: DateTime<Utc>) -> Self {
        let cleaned: String = original_name
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        Self::new(format!("img_{}_{}", at.timestamp_millis(), cleaned), bytes)
    }

    /// Sets the reference the editor currently uses for this image.
    pub fn with_live_ref(mut self, live_ref: impl Into<String>) -> Self {
        self.live_ref = Some(live_ref.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn live_ref(&self) -> Option<&str> {
        self.live_ref.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(content: &str) -> DayNote {
        DayNote::new(content, DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn empty_content_is_blank() {
        assert!(note("").is_blank());
        assert!(note("  \n ").is_blank());
    }

    #[test]
    fn tag_only_content_is_blank() {
        assert!(note("<p><br></p>").is_blank());
    }

    #[test]
    fn image_only_content_is_not_blank() {
        assert!(!note(r#"<p><img src="./a.png"></p>"#).is_blank());
    }

    #[test]
    fn text_strips_tags_and_collapses_whitespace() {
        let n = note("<h1>Title</h1>\n<p>Some   <b>bold</b> text</p>");
        assert_eq!(n.text(), "Title Some bold text");
    }

    #[test]
    fn text_decodes_common_entities() {
        assert_eq!(note("<p>fish &amp; chips&nbsp;&lt;3</p>").text(), "fish & chips <3");
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        let n = note("<p>abcdefghij</p>");
        assert_eq!(n.preview(5), "abcd…");
        assert_eq!(n.preview(20), "abcdefghij");
    }

    #[test]
    fn stamped_name_replaces_whitespace() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let a = Attachment::stamped("my beach photo.jpg", vec![1, 2], at);
        assert_eq!(a.name(), "img_1700000000123_my_beach_photo.jpg");
        assert_eq!(a.bytes(), &[1, 2]);
        assert_eq!(a.live_ref(), None);
    }

    #[test]
    fn with_live_ref_records_reference() {
        let a = Attachment::new("a.png", vec![]).with_live_ref("/tmp/a.png");
        assert_eq!(a.live_ref(), Some("/tmp/a.png"));
    }
}
