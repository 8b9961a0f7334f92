use crate::{Id, PlaylistItem};

pub type ParticipantId = Id<Participant>;

/// A connected member of a space.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub position: Position,
    /// Items this participant contributed, kept for attribution only.
    /// Playback order is decided by the space's [PlaylistQueue](crate::PlaylistQueue).
    pub playlist_items: Vec<PlaylistItem>,
}

/// Where a participant is in the virtual space
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Participant {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            position,
            playlist_items: vec![],
        }
    }
}
