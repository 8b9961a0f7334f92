use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
};
use chrono::Utc;
use futures_util::Stream;
use jukebox_collab::{CollabEvent, Space, SpaceConnectionHandle, SpaceId};
use jukebox_core::{Id, Position};
use log::{debug, error};
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    collections::VecDeque,
    convert::Infallible,
    pin::Pin,
    sync::{Arc, Weak},
    task::{Context, Poll, Waker},
};
use utoipa::ToSchema;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{ConnectParams, ValidatedQuery},
    serialized::{Booth, Participant, PlaylistItem, SpaceSnapshot, StreamState, ToSerialized},
};

type ConnectionId = Id<Connection>;
type PendingMessages = Arc<Mutex<VecDeque<ServerEvent>>>;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum ServerEvent {
    /// Always the first event of a connection.
    /// The key authorizes requests made on behalf of the participant.
    #[serde(rename_all = "camelCase")]
    Welcome {
        space_id: u64,
        participant_id: u64,
        key: String,
        /// The server's clock, in milliseconds since the unix epoch
        server_time: i64,
    },
    /// The full state of the space, sent right after the welcome
    #[serde(rename_all = "camelCase")]
    SpaceSnapshot {
        space_id: u64,
        snapshot: SpaceSnapshot,
    },
    /// The stream transitioned. Older versions should be ignored.
    #[serde(rename_all = "camelCase")]
    StreamUpdate { space_id: u64, state: StreamState },
    /// The playlist changed
    #[serde(rename_all = "camelCase")]
    QueueUpdate {
        space_id: u64,
        items: Vec<PlaylistItem>,
    },
    /// A booth was claimed or released
    #[serde(rename_all = "camelCase")]
    BoothUpdate { space_id: u64, booths: Vec<Booth> },
    #[serde(rename_all = "camelCase")]
    ParticipantJoined {
        space_id: u64,
        participant: Participant,
    },
    #[serde(rename_all = "camelCase")]
    ParticipantLeft { space_id: u64, participant_id: u64 },
}

impl From<CollabEvent> for ServerEvent {
    fn from(value: CollabEvent) -> Self {
        match value {
            CollabEvent::StreamUpdate { space_id, state } => Self::StreamUpdate {
                space_id: space_id.value(),
                state: state.to_serialized(),
            },
            CollabEvent::QueueUpdate { space_id, items } => Self::QueueUpdate {
                space_id: space_id.value(),
                items: items.to_serialized(),
            },
            CollabEvent::BoothUpdate { space_id, booths } => Self::BoothUpdate {
                space_id: space_id.value(),
                booths: booths.to_serialized(),
            },
            CollabEvent::ParticipantJoined {
                space_id,
                participant,
            } => Self::ParticipantJoined {
                space_id: space_id.value(),
                participant: participant.to_serialized(),
            },
            CollabEvent::ParticipantLeft {
                space_id,
                participant_id,
            } => Self::ParticipantLeft {
                space_id: space_id.value(),
                participant_id: participant_id.value(),
            },
        }
    }
}

/// Manages server sent event connections, one per connected participant
pub struct ServerSentEvents {
    me: Weak<Self>,
    connections: Mutex<Vec<Connection>>,
}

struct Connection {
    id: ConnectionId,
    space_id: SpaceId,
    pending_messages: PendingMessages,
    waker: Arc<Mutex<Option<Waker>>>,
}

/// The event stream of a participant. Dropping it disconnects the participant.
pub struct ConnectionHandle {
    id: ConnectionId,
    /// A reference to [Connection]'s pending messages
    pending_messages: PendingMessages,
    /// A reference to [Connection]'s stored [Waker]
    waker: Arc<Mutex<Option<Waker>>>,
    /// Required to remove connection when dropped
    manager: Weak<ServerSentEvents>,
    /// Keeps the participant connected to the space
    participant: SpaceConnectionHandle,
}

impl ServerSentEvents {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            connections: Default::default(),
        })
    }

    /// Sends an event to every connection of the space it concerns
    pub fn broadcast(&self, event: CollabEvent) {
        let space_id = event.space_id();
        let event = ServerEvent::from(event);
        let connections = self.connections.lock();

        for connection in connections.iter().filter(|c| c.space_id == space_id) {
            connection.send(event.clone())
        }
    }

    /// Connects a new participant to the space, and opens its event stream.
    fn connect(&self, space: &Space, name: String, position: Position) -> ConnectionHandle {
        // Held until the initial events are queued, so no update can overtake them
        let mut connections = self.connections.lock();

        let participant = space.connect(name, position);
        let connection = Connection::new(space.id);

        connection.send(ServerEvent::Welcome {
            space_id: space.id.value(),
            participant_id: participant.participant_id().value(),
            key: participant.key().to_string(),
            server_time: Utc::now().timestamp_millis(),
        });

        connection.send(ServerEvent::SpaceSnapshot {
            space_id: space.id.value(),
            snapshot: space.snapshot().to_serialized(),
        });

        let handle = connection.handle(self.me.clone(), participant);
        connections.push(connection);

        handle
    }

    fn disconnect(&self, id: ConnectionId) {
        self.connections.lock().retain(|c| c.id != id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }
}

impl Connection {
    fn new(space_id: SpaceId) -> Self {
        Self {
            id: ConnectionId::new(),
            space_id,
            pending_messages: Default::default(),
            waker: Default::default(),
        }
    }

    fn send(&self, message: ServerEvent) {
        self.pending_messages.lock().push_back(message);

        if let Some(waker) = self.waker.lock().take() {
            waker.wake()
        }
    }

    fn handle(
        &self,
        manager: Weak<ServerSentEvents>,
        participant: SpaceConnectionHandle,
    ) -> ConnectionHandle {
        ConnectionHandle {
            id: self.id,
            pending_messages: self.pending_messages.clone(),
            waker: self.waker.clone(),
            manager,
            participant,
        }
    }
}

impl Stream for ConnectionHandle {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut pending_messages = self.pending_messages.lock();

        while let Some(message) = pending_messages.pop_front() {
            match serde_json::to_string(&message) {
                Ok(data) => return Poll::Ready(Some(Ok(Event::default().data(data)))),
                Err(e) => error!("Failed to serialize event: {}", e),
            }
        }

        // Stored while the messages are still locked, so a send can't slip in between
        *self.waker.lock() = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        debug!(
            "Event stream of participant #{} closed",
            self.participant.participant_id()
        );

        if let Some(manager) = self.manager.upgrade() {
            manager.disconnect(self.id)
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/spaces/{slug}/events",
    tag = "spaces",
    params(
        ("slug" = String, Path, description = "The slug of the space"),
        ConnectParams
    ),
    responses(
        (
            status = 200,
            content_type = "text/event-stream",
            description = "Connects as a participant, and streams the state of the space",
            body = ServerEvent
        ),
        (status = 404, description = "Space does not exist")
    )
)]
pub async fn event_stream(
    State(context): State<ServerContext>,
    Path(slug): Path<String>,
    ValidatedQuery(params): ValidatedQuery<ConnectParams>,
) -> ServerResult<Sse<ConnectionHandle>> {
    let space = context.collab.spaces.space_by_slug(&slug)?;
    let position = Position {
        x: params.x,
        y: params.y,
    };

    let handle = context.sse.connect(&space, params.name, position);

    Ok(Sse::new(handle).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod test {
    use futures_util::StreamExt;
    use jukebox_collab::{Collab, ContentResolver, InputError, NewSpace, SearchResult};
    use jukebox_core::Engine;

    use super::*;

    struct NoResolver;

    #[async_trait::async_trait]
    impl ContentResolver for NoResolver {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, InputError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_welcome_and_snapshot_come_first() {
        let collab = Collab::new(Engine::default(), NoResolver);
        let space = collab
            .spaces
            .create_space(NewSpace {
                slug: "lobby".to_string(),
                title: "Lobby".to_string(),
            })
            .unwrap();

        let sse = ServerSentEvents::new();
        let handle = sse.connect(&space, "alice".to_string(), Position::default());

        assert_eq!(sse.connection_count(), 1);

        {
            let mut pending = handle.pending_messages.lock();

            assert!(matches!(
                pending.pop_front(),
                Some(ServerEvent::Welcome { ref key, .. }) if key == handle.participant.key()
            ));
            assert!(matches!(
                pending.pop_front(),
                Some(ServerEvent::SpaceSnapshot { .. })
            ));
        }

        drop(handle);
        assert_eq!(sse.connection_count(), 0, "dropping the stream removes it");
    }

    #[tokio::test]
    async fn test_events_are_routed_by_space() {
        let collab = Collab::new(Engine::default(), NoResolver);
        let new_space = |slug: &str| NewSpace {
            slug: slug.to_string(),
            title: slug.to_string(),
        };

        let lobby = collab.spaces.create_space(new_space("lobby")).unwrap();
        let rooftop = collab.spaces.create_space(new_space("rooftop")).unwrap();

        let sse = ServerSentEvents::new();
        let mut in_lobby = sse.connect(&lobby, "alice".to_string(), Position::default());
        let in_rooftop = sse.connect(&rooftop, "bob".to_string(), Position::default());

        in_rooftop.pending_messages.lock().clear();

        sse.broadcast(CollabEvent::QueueUpdate {
            space_id: lobby.id,
            items: vec![],
        });

        assert!(in_rooftop.pending_messages.lock().is_empty());

        // Welcome, snapshot, then the update
        let _ = in_lobby.next().await;
        let _ = in_lobby.next().await;
        let update = in_lobby.next().await;

        assert!(matches!(update, Some(Ok(_))));
        assert!(in_lobby.pending_messages.lock().is_empty());
    }
}
