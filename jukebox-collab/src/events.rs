use jukebox_core::{Booth, Participant, ParticipantId, PlaylistItem, StreamState, SyncEvent};

use crate::{CollabContext, SpaceId};

/// Events emitted by spaces, to be replicated to their participants.
#[derive(Debug, Clone)]
pub enum CollabEvent {
    /// The stream of a space transitioned.
    StreamUpdate {
        space_id: SpaceId,
        state: StreamState,
    },
    /// The playlist of a space changed.
    QueueUpdate {
        space_id: SpaceId,
        items: Vec<PlaylistItem>,
    },
    /// A booth was claimed or released.
    BoothUpdate {
        space_id: SpaceId,
        booths: Vec<Booth>,
    },
    /// A participant connected to a space
    ParticipantJoined {
        space_id: SpaceId,
        participant: Participant,
    },
    /// A participant disconnected from a space
    ParticipantLeft {
        space_id: SpaceId,
        participant_id: ParticipantId,
    },
}

impl CollabEvent {
    /// Convert a sync event to a friendly collab event
    pub fn from_sync_event(context: &CollabContext, event: SyncEvent) -> Option<CollabEvent> {
        let space_id = context
            .space_by_coordinator_id(event.coordinator_id())?
            .id;

        let event = match event {
            SyncEvent::StreamUpdate { state, .. } => Self::StreamUpdate { space_id, state },
            SyncEvent::QueueUpdate { items, .. } => Self::QueueUpdate { space_id, items },
            SyncEvent::BoothUpdate { booths, .. } => Self::BoothUpdate { space_id, booths },
            SyncEvent::ParticipantJoined { participant, .. } => Self::ParticipantJoined {
                space_id,
                participant,
            },
            SyncEvent::ParticipantLeft { participant_id, .. } => Self::ParticipantLeft {
                space_id,
                participant_id,
            },
        };

        Some(event)
    }

    pub fn space_id(&self) -> SpaceId {
        match self {
            Self::StreamUpdate { space_id, .. }
            | Self::QueueUpdate { space_id, .. }
            | Self::BoothUpdate { space_id, .. }
            | Self::ParticipantJoined { space_id, .. }
            | Self::ParticipantLeft { space_id, .. } => *space_id,
        }
    }
}
