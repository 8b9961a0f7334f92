use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::{
    sync::{mpsc, oneshot},
    time::sleep,
};

use crate::{
    EngineContext, Id, Participant, ParticipantId, PlaylistItem, StreamState, SyncAction,
    SyncError,
};

mod coordinator;
mod schedule;
mod snapshot;

pub use coordinator::*;
pub use schedule::*;
pub use snapshot::*;

pub type CoordinatorId = Id<Coordinator>;

type ActionSender = mpsc::UnboundedSender<SyncAction>;
type ActionReceiver = mpsc::UnboundedReceiver<SyncAction>;

/// A handle to a running [SyncCoordinator].
///
/// The coordinator runs in its own task, and requests are handled strictly one after another.
/// Cloning the handle is cheap, and the task ends once every handle is dropped.
#[derive(Debug, Clone)]
pub struct Coordinator {
    pub id: CoordinatorId,

    actions: ActionSender,
    published: PublishedSnapshot,
}

impl Coordinator {
    /// Spawns a coordinator task. Must be called from within a tokio runtime.
    pub fn spawn(context: &EngineContext) -> Self {
        let id = CoordinatorId::new();
        let (actions, receiver) = mpsc::unbounded_channel();

        let machine = SyncCoordinator::new(id, &context.config, context.event_sender());
        let published = machine.published();

        tokio::spawn(run(machine, receiver));

        Self {
            id,
            actions,
            published,
        }
    }

    /// Registers a participant with the coordinator.
    pub fn connect(&self, participant: Participant) {
        self.send(SyncAction::Connect { participant });
    }

    /// Removes a participant, releasing its booth if it had one.
    pub fn disconnect(&self, participant_id: ParticipantId) {
        self.send(SyncAction::Disconnect { participant_id });
    }

    pub async fn claim_booth(
        &self,
        participant_id: ParticipantId,
        booth_index: usize,
    ) -> Result<(), SyncError> {
        self.request(|reply| SyncAction::ClaimBooth {
            participant_id,
            booth_index,
            reply,
        })
        .await
    }

    pub async fn release_booth(&self, participant_id: ParticipantId) -> Result<(), SyncError> {
        self.request(|reply| SyncAction::ReleaseBooth {
            participant_id,
            reply,
        })
        .await
    }

    pub async fn enqueue(
        &self,
        participant_id: ParticipantId,
        item: PlaylistItem,
    ) -> Result<(), SyncError> {
        self.request(|reply| SyncAction::Enqueue {
            participant_id,
            item,
            reply,
        })
        .await
    }

    pub async fn play(&self, participant_id: ParticipantId) -> Result<(), SyncError> {
        self.request(|reply| SyncAction::Play {
            participant_id,
            reply,
        })
        .await
    }

    pub async fn skip(&self, participant_id: ParticipantId) -> Result<(), SyncError> {
        self.request(|reply| SyncAction::Skip {
            participant_id,
            reply,
        })
        .await
    }

    pub async fn stop(&self, participant_id: ParticipantId) -> Result<(), SyncError> {
        self.request(|reply| SyncAction::Stop {
            participant_id,
            reply,
        })
        .await
    }

    /// Returns the last published snapshot. Never blocks on the coordinator.
    ///
    /// Once a request has been answered, or an event has been received, the snapshot includes it.
    pub fn snapshot(&self) -> Arc<SpaceSnapshot> {
        self.published.read().clone()
    }

    pub fn stream_state(&self) -> StreamState {
        self.snapshot().stream.clone()
    }

    pub fn peek_queue(&self) -> Vec<PlaylistItem> {
        self.snapshot().queue.clone()
    }

    /// Returns the participant in the given booth, if any.
    pub fn authority_for(&self, booth_index: usize) -> Option<ParticipantId> {
        self.snapshot()
            .booths
            .get(booth_index)
            .and_then(|b| b.connected_participant)
    }

    async fn request<F>(&self, make: F) -> Result<(), SyncError>
    where
        F: FnOnce(oneshot::Sender<Result<(), SyncError>>) -> SyncAction,
    {
        let (reply, response) = oneshot::channel();

        self.actions
            .send(make(reply))
            .map_err(|_| SyncError::Unavailable)?;

        response.await.map_err(|_| SyncError::Unavailable)?
    }

    fn send(&self, action: SyncAction) {
        if self.actions.send(action).is_err() {
            warn!("Coordinator #{} is no longer running", self.id);
        }
    }
}

async fn run(mut machine: SyncCoordinator, mut receiver: ActionReceiver) {
    loop {
        let deadline = machine.next_deadline();

        tokio::select! {
            action = receiver.recv() => {
                let Some(action) = action else {
                    break;
                };

                machine.handle(action, Utc::now());
            }
            _ = sleep_until(deadline) => {
                machine.tick(Utc::now());
            }
        }
    }

    debug!("Coordinator stopped, all handles were dropped");
}

/// Sleeps until the deadline, or forever if there is none.
async fn sleep_until(deadline: Option<DateTime<Utc>>) {
    match deadline {
        Some(deadline) => {
            let remaining = (deadline - Utc::now()).to_std().unwrap_or_default();
            sleep(remaining).await;
        }
        None => std::future::pending().await,
    }
}
