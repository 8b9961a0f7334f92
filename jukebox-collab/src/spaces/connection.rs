use jukebox_core::{Id, ParticipantId};

use crate::CollabContext;

use super::SpaceId;

pub type SpaceConnectionId = Id<SpaceConnection>;

/// Represents a participant's presence in a space
#[derive(Debug, Clone)]
pub struct SpaceConnection {
    pub id: SpaceConnectionId,
    pub participant_id: ParticipantId,
    /// Secret used to authorize requests made on behalf of the participant
    pub key: String,
}

/// A handle to a connection, which when dropped removes the [SpaceConnection] from a space
pub struct SpaceConnectionHandle {
    connection: SpaceConnection,
    space_id: SpaceId,
    context: CollabContext,
}

impl SpaceConnection {
    pub fn new(participant_id: ParticipantId, key: String) -> Self {
        Self {
            id: SpaceConnectionId::new(),
            participant_id,
            key,
        }
    }
}

impl SpaceConnectionHandle {
    pub fn new(context: &CollabContext, connection: SpaceConnection, space_id: SpaceId) -> Self {
        Self {
            connection,
            space_id,
            context: context.clone(),
        }
    }

    pub fn participant_id(&self) -> ParticipantId {
        self.connection.participant_id
    }

    pub fn key(&self) -> &str {
        &self.connection.key
    }

    pub fn space_id(&self) -> SpaceId {
        self.space_id
    }
}

impl Drop for SpaceConnectionHandle {
    fn drop(&mut self) {
        if let Some(space) = self.context.spaces.get(&self.space_id) {
            space.remove_connection(self.connection.id)
        }
    }
}
