use crate::parse_length_text;

/// A track waiting to be played in a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub title: String,
    /// Opaque identifier of the track, passed as-is to clients
    pub link: String,
    /// The length of the track, in seconds
    pub duration: u32,
}

impl PlaylistItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>, duration: u32) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            duration,
        }
    }

    /// Creates an item from a `[hh:]mm:ss` length text.
    /// Unreadable lengths result in a zero duration instead of an error.
    pub fn with_length_text(
        title: impl Into<String>,
        link: impl Into<String>,
        length_text: &str,
    ) -> Self {
        Self::new(title, link, parse_length_text(length_text))
    }
}
