use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Booth, Participant, PlaylistItem, StreamState};

/// The latest snapshot of a coordinator, shared with its handles.
pub type PublishedSnapshot = Arc<RwLock<Arc<SpaceSnapshot>>>;

/// An immutable view of everything a space replicates to its participants.
#[derive(Debug, Default, Clone)]
pub struct SpaceSnapshot {
    pub stream: StreamState,
    pub booths: Vec<Booth>,
    pub queue: Vec<PlaylistItem>,
    pub participants: Vec<Participant>,
}
