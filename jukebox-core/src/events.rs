use crossbeam::channel::{Receiver, Sender};
use tokio::sync::oneshot;

use crate::{
    Booth, CoordinatorId, Participant, ParticipantId, PlaylistItem, StreamState, SyncError,
};

pub type EventSender = Sender<SyncEvent>;
pub type EventReceiver = Receiver<SyncEvent>;

/// Where the result of a request is sent back to.
pub type Reply<T> = oneshot::Sender<Result<T, SyncError>>;

/// Describes the events that are emitted by coordinators.
///
/// Events of a single coordinator are emitted in the order the transitions happened.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The stream transitioned. Contains the full state, never a partial one.
    StreamUpdate {
        coordinator_id: CoordinatorId,
        state: StreamState,
    },
    /// Items were added to or taken from the playlist.
    QueueUpdate {
        coordinator_id: CoordinatorId,
        items: Vec<PlaylistItem>,
    },
    /// A booth was claimed or released.
    BoothUpdate {
        coordinator_id: CoordinatorId,
        booths: Vec<Booth>,
    },
    ParticipantJoined {
        coordinator_id: CoordinatorId,
        participant: Participant,
    },
    ParticipantLeft {
        coordinator_id: CoordinatorId,
        participant_id: ParticipantId,
    },
}

/// Describes a request sent to a coordinator.
///
/// Requests are handled one at a time, in the order they were sent.
#[derive(Debug)]
pub enum SyncAction {
    Connect {
        participant: Participant,
    },
    /// Disconnects are ordinary requests, so they can never race with a claim.
    Disconnect {
        participant_id: ParticipantId,
    },
    ClaimBooth {
        participant_id: ParticipantId,
        booth_index: usize,
        reply: Reply<()>,
    },
    ReleaseBooth {
        participant_id: ParticipantId,
        reply: Reply<()>,
    },
    Enqueue {
        participant_id: ParticipantId,
        item: PlaylistItem,
        reply: Reply<()>,
    },
    Play {
        participant_id: ParticipantId,
        reply: Reply<()>,
    },
    Skip {
        participant_id: ParticipantId,
        reply: Reply<()>,
    },
    Stop {
        participant_id: ParticipantId,
        reply: Reply<()>,
    },
}

impl SyncEvent {
    pub fn coordinator_id(&self) -> CoordinatorId {
        match self {
            Self::StreamUpdate { coordinator_id, .. }
            | Self::QueueUpdate { coordinator_id, .. }
            | Self::BoothUpdate { coordinator_id, .. }
            | Self::ParticipantJoined { coordinator_id, .. }
            | Self::ParticipantLeft { coordinator_id, .. } => *coordinator_id,
        }
    }
}
