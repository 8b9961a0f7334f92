use std::sync::Arc;

use jukebox_core::{
    Coordinator, CoordinatorId, Id, Participant, ParticipantId, PlaylistItem, Position,
    SpaceSnapshot,
};
use log::{info, warn};
use parking_lot::Mutex;

use crate::{util::random_string, CollabContext, SearchResult};

use super::{NewSpace, SpaceConnection, SpaceConnectionHandle, SpaceConnectionId, SpaceError};

pub type SpaceId = Id<Space>;

const KEY_LENGTH: usize = 32;

/// A jukebox space, containing participants, booths, a playlist, and a shared stream.
pub struct Space {
    pub id: SpaceId,
    pub slug: String,
    pub title: String,

    context: CollabContext,
    coordinator: Coordinator,
    /// The participants currently connected to this space
    connections: Mutex<Vec<SpaceConnection>>,
}

impl Space {
    pub fn new(context: &CollabContext, new_space: NewSpace) -> Self {
        Self {
            id: SpaceId::new(),
            slug: new_space.slug,
            title: new_space.title,
            context: context.clone(),
            coordinator: context.engine.create_coordinator(),
            connections: Default::default(),
        }
    }

    /// Connects a new participant to the space.
    /// The participant stays connected until the returned handle is dropped.
    pub fn connect(&self, name: impl Into<String>, position: Position) -> SpaceConnectionHandle {
        let participant = Participant::new(name, position);
        let connection = SpaceConnection::new(participant.id, random_string(KEY_LENGTH));

        info!(
            "Participant {} (#{}) connected to space {}",
            participant.name, participant.id, self.slug
        );

        self.connections.lock().push(connection.clone());
        self.coordinator.connect(participant);

        SpaceConnectionHandle::new(&self.context, connection, self.id)
    }

    /// Called when a [SpaceConnectionHandle] is dropped
    pub fn remove_connection(&self, connection_id: SpaceConnectionId) {
        let mut connections = self.connections.lock();

        let Some(connection) = connections.iter().find(|c| c.id == connection_id) else {
            warn!("Tried to remove unknown connection #{}", connection_id);
            return;
        };

        info!(
            "Participant #{} disconnected from space {}",
            connection.participant_id, self.slug
        );

        self.coordinator.disconnect(connection.participant_id);
        connections.retain(|c| c.id != connection_id)
    }

    /// Returns the participant a request key belongs to
    pub fn participant_by_key(&self, key: &str) -> Result<ParticipantId, SpaceError> {
        self.connections
            .lock()
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.participant_id)
            .ok_or(SpaceError::UnknownKey)
    }

    pub async fn claim_booth(
        &self,
        participant_id: ParticipantId,
        booth_index: usize,
    ) -> Result<(), SpaceError> {
        Ok(self
            .coordinator
            .claim_booth(participant_id, booth_index)
            .await?)
    }

    pub async fn release_booth(&self, participant_id: ParticipantId) -> Result<(), SpaceError> {
        Ok(self.coordinator.release_booth(participant_id).await?)
    }

    /// Adds a search result to the playlist
    pub async fn submit(
        &self,
        participant_id: ParticipantId,
        candidate: SearchResult,
    ) -> Result<PlaylistItem, SpaceError> {
        let item =
            PlaylistItem::with_length_text(candidate.title, candidate.id, &candidate.length_text);

        self.coordinator
            .enqueue(participant_id, item.clone())
            .await?;

        Ok(item)
    }

    pub async fn play(&self, participant_id: ParticipantId) -> Result<(), SpaceError> {
        Ok(self.coordinator.play(participant_id).await?)
    }

    pub async fn skip(&self, participant_id: ParticipantId) -> Result<(), SpaceError> {
        Ok(self.coordinator.skip(participant_id).await?)
    }

    pub async fn stop(&self, participant_id: ParticipantId) -> Result<(), SpaceError> {
        Ok(self.coordinator.stop(participant_id).await?)
    }

    pub fn snapshot(&self) -> Arc<SpaceSnapshot> {
        self.coordinator.snapshot()
    }

    /// Returns the pending playlist items, next first
    pub fn peek_queue(&self) -> Vec<PlaylistItem> {
        self.coordinator.peek_queue()
    }

    pub fn coordinator_id(&self) -> CoordinatorId {
        self.coordinator.id
    }
}
