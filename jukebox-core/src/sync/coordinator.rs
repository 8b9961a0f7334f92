use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use parking_lot::RwLock;

use crate::{
    BoothRegistry, Config, CoordinatorId, EventSender, Participant, ParticipantId, PlaylistItem,
    PlaylistQueue, Reply, StreamState, StreamStatus, SyncAction, SyncError, SyncEvent,
};

use super::{PublishedSnapshot, ScheduledKind, ScheduledTransition, SpaceSnapshot};

/// The state machine of a single space.
///
/// It owns the playlist, the booths, and the stream state, and is the only thing that mutates them.
/// Time is passed in by the caller, so the machine itself never waits.
///
/// Events are buffered until [SyncCoordinator::flush], which publishes the snapshot first.
pub struct SyncCoordinator {
    id: CoordinatorId,
    config: Config,
    events: EventSender,
    outbox: Vec<SyncEvent>,
    published: PublishedSnapshot,

    queue: PlaylistQueue,
    booths: BoothRegistry,
    participants: Vec<Participant>,
    state: StreamState,
    scheduled: Option<ScheduledTransition>,
}

impl SyncCoordinator {
    pub fn new(id: CoordinatorId, config: &Config, events: EventSender) -> Self {
        let mut coordinator = Self {
            id,
            config: config.clone(),
            events,
            outbox: vec![],
            published: Default::default(),
            queue: PlaylistQueue::new(config.max_queue_length),
            booths: BoothRegistry::new(config.booth_count),
            participants: vec![],
            state: StreamState::default(),
            scheduled: None,
        };

        coordinator.flush();
        coordinator
    }

    /// Performs a request and sends the result back to the requester.
    /// The requester only hears back once the new state is published.
    pub fn handle(&mut self, action: SyncAction, now: DateTime<Utc>) {
        let outcome = match action {
            SyncAction::Connect { participant } => {
                self.connect(participant);
                None
            }
            SyncAction::Disconnect { participant_id } => {
                self.disconnect(participant_id, now);
                None
            }
            SyncAction::ClaimBooth {
                participant_id,
                booth_index,
                reply,
            } => Some((reply, self.claim_booth(participant_id, booth_index))),
            SyncAction::ReleaseBooth {
                participant_id,
                reply,
            } => Some((reply, self.release_booth(participant_id, now))),
            SyncAction::Enqueue {
                participant_id,
                item,
                reply,
            } => Some((reply, self.enqueue(participant_id, item))),
            SyncAction::Play {
                participant_id,
                reply,
            } => Some((reply, self.play(participant_id, now))),
            SyncAction::Skip {
                participant_id,
                reply,
            } => Some((reply, self.skip(participant_id, now))),
            SyncAction::Stop {
                participant_id,
                reply,
            } => Some((reply, self.stop(participant_id))),
        };

        self.flush();

        if let Some((reply, result)) = outcome {
            respond(reply, result);
        }
    }

    /// Registers a participant. Connecting twice is a no-op.
    pub fn connect(&mut self, participant: Participant) {
        if self.is_connected(participant.id) {
            return;
        }

        info!(
            "Participant {} (#{}) joined coordinator #{}",
            participant.name, participant.id, self.id
        );

        self.participants.push(participant.clone());
        self.emit(SyncEvent::ParticipantJoined {
            coordinator_id: self.id,
            participant,
        });
    }

    /// Removes a participant and clears its booth. Disconnecting twice is a no-op.
    pub fn disconnect(&mut self, participant_id: ParticipantId, now: DateTime<Utc>) {
        let Some(index) = self
            .participants
            .iter()
            .position(|p| p.id == participant_id)
        else {
            return;
        };

        let participant = self.participants.remove(index);

        info!(
            "Participant {} (#{}) left coordinator #{}",
            participant.name, participant.id, self.id
        );

        self.emit(SyncEvent::ParticipantLeft {
            coordinator_id: self.id,
            participant_id,
        });

        self.leave_booth(participant_id, now);
    }

    pub fn claim_booth(
        &mut self,
        participant_id: ParticipantId,
        booth_index: usize,
    ) -> Result<(), SyncError> {
        self.ensure_connected(participant_id)?;
        self.booths.claim(booth_index, participant_id)?;

        self.emit_booths();
        Ok(())
    }

    pub fn release_booth(
        &mut self,
        participant_id: ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        self.ensure_connected(participant_id)?;
        self.leave_booth(participant_id, now);

        Ok(())
    }

    /// Adds an item to the playlist. Anyone connected may do this.
    pub fn enqueue(
        &mut self,
        participant_id: ParticipantId,
        item: PlaylistItem,
    ) -> Result<(), SyncError> {
        self.ensure_connected(participant_id)?;
        self.queue.enqueue(item.clone())?;

        if let Some(participant) = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
        {
            participant.playlist_items.push(item);
        }

        self.emit_queue();
        Ok(())
    }

    /// Starts the head of the playlist. Only participants in a booth may do this.
    pub fn play(
        &mut self,
        participant_id: ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        self.ensure_connected(participant_id)?;

        let booth_index = self
            .booths
            .booth_of(participant_id)
            .ok_or(SyncError::NotAuthorized)?;

        if self.state.status != StreamStatus::Waiting {
            return Err(SyncError::InvalidTransitionRequest(
                "the stream is already active",
            ));
        }

        let item = self
            .queue
            .dequeue_next()
            .ok_or(SyncError::InvalidTransitionRequest("the playlist is empty"))?;

        self.emit_queue();
        self.begin_seeking(item, Some(booth_index), now);

        Ok(())
    }

    /// Moves on to the next item, or stops if there is none.
    pub fn skip(
        &mut self,
        participant_id: ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        self.ensure_connected(participant_id)?;
        self.ensure_stream_authority(participant_id)?;

        if self.state.status == StreamStatus::Waiting {
            return Err(SyncError::InvalidTransitionRequest("nothing is playing"));
        }

        let booth_index = self.booths.booth_of(participant_id);
        self.advance_or_stop(booth_index, now);

        Ok(())
    }

    /// Stops the stream, leaving the playlist as is.
    pub fn stop(&mut self, participant_id: ParticipantId) -> Result<(), SyncError> {
        self.ensure_connected(participant_id)?;
        self.ensure_stream_authority(participant_id)?;

        if self.state.status == StreamStatus::Waiting {
            return Err(SyncError::InvalidTransitionRequest("nothing is playing"));
        }

        self.enter_waiting();
        Ok(())
    }

    /// Performs the scheduled transitions that are due.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        while let Some(scheduled) = self.scheduled.filter(|s| s.due <= now) {
            self.scheduled = None;

            if scheduled.version != self.state.version {
                debug!(
                    "Discarded {:?} scheduled for version {} of coordinator #{}",
                    scheduled.kind, scheduled.version, self.id
                );
                continue;
            }

            match scheduled.kind {
                ScheduledKind::CommitStart => self.commit_start(now),
                ScheduledKind::TrackEnd => self.advance_or_stop(None, now),
            }
        }

        self.flush();
    }

    /// Publishes the current snapshot, then sends the buffered events.
    /// A reader that heard of version N always finds at least version N in the snapshot.
    pub fn flush(&mut self) {
        *self.published.write() = Arc::new(self.snapshot());

        for event in self.outbox.drain(..) {
            if self.events.send(event).is_err() {
                debug!("Event of coordinator #{} has no receiver", self.id);
            }
        }
    }

    /// Returns the shared view that [SyncCoordinator::flush] keeps current.
    pub fn published(&self) -> PublishedSnapshot {
        self.published.clone()
    }

    /// Returns when [SyncCoordinator::tick] should be called next, if at all.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.scheduled.map(|s| s.due)
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn booths(&self) -> &BoothRegistry {
        &self.booths
    }

    pub fn queue(&self) -> &PlaylistQueue {
        &self.queue
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn snapshot(&self) -> SpaceSnapshot {
        SpaceSnapshot {
            stream: self.state.clone(),
            booths: self.booths.booths().to_vec(),
            queue: self.queue.peek_all(),
            participants: self.participants.clone(),
        }
    }

    fn begin_seeking(&mut self, item: PlaylistItem, booth_index: Option<usize>, now: DateTime<Utc>) {
        let state = StreamState {
            status: StreamStatus::Seeking,
            current_link: Some(item.link),
            current_title: Some(item.title),
            current_booth_index: booth_index,
            start_time: None,
            duration: item.duration,
            version: self.state.version + 1,
        };

        self.scheduled = Some(ScheduledTransition {
            due: now + self.config.seeking_grace(),
            version: state.version,
            kind: ScheduledKind::CommitStart,
        });

        self.transition(state);
    }

    fn commit_start(&mut self, now: DateTime<Utc>) {
        let state = StreamState {
            status: StreamStatus::Playing,
            start_time: Some(now),
            version: self.state.version + 1,
            ..self.state.clone()
        };

        self.scheduled = Some(ScheduledTransition {
            due: now + Duration::seconds(state.duration as i64),
            version: state.version,
            kind: ScheduledKind::TrackEnd,
        });

        self.transition(state);
    }

    fn enter_waiting(&mut self) {
        self.scheduled = None;

        self.transition(StreamState {
            version: self.state.version + 1,
            ..Default::default()
        });
    }

    fn advance_or_stop(&mut self, booth_index: Option<usize>, now: DateTime<Utc>) {
        match self.queue.dequeue_next() {
            Some(item) => {
                self.emit_queue();
                self.begin_seeking(item, booth_index, now)
            }
            None => self.enter_waiting(),
        }
    }

    fn leave_booth(&mut self, participant_id: ParticipantId, now: DateTime<Utc>) {
        if let Some(released) = self.booths.release(participant_id) {
            self.emit_booths();
            self.handle_authority_loss(released, now);
        }
    }

    /// Called when a booth is vacated. If it controlled the stream, control moves to another occupied booth.
    /// With no one left in a booth, the next item is started, or the stream stops.
    fn handle_authority_loss(&mut self, released: usize, now: DateTime<Utc>) {
        if self.state.status == StreamStatus::Waiting
            || self.state.current_booth_index != Some(released)
        {
            return;
        }

        if let Some(next) = self.booths.first_occupied() {
            info!(
                "Control of coordinator #{} moved from booth {} to booth {}",
                self.id, released, next
            );

            let state = StreamState {
                current_booth_index: Some(next),
                version: self.state.version + 1,
                ..self.state.clone()
            };

            // The pending transition still applies to the same track.
            if let Some(scheduled) = self.scheduled.as_mut() {
                scheduled.version = state.version;
            }

            self.transition(state);
            return;
        }

        self.advance_or_stop(None, now);
    }

    fn transition(&mut self, state: StreamState) {
        debug_assert!(state.is_consistent(), "inconsistent stream state: {:?}", state);

        info!(
            "Coordinator #{} {:?} -> {:?} ({}, v{})",
            self.id,
            self.state.status,
            state.status,
            state.current_title.as_deref().unwrap_or("nothing"),
            state.version
        );

        self.state = state;
        self.emit(SyncEvent::StreamUpdate {
            coordinator_id: self.id,
            state: self.state.clone(),
        });
    }

    fn ensure_connected(&self, participant_id: ParticipantId) -> Result<(), SyncError> {
        self.is_connected(participant_id)
            .then_some(())
            .ok_or(SyncError::NotConnected)
    }

    /// Only the participant in the booth that started the current track may control it.
    /// If that booth is empty, or the track was auto-advanced, anyone may.
    fn ensure_stream_authority(&self, participant_id: ParticipantId) -> Result<(), SyncError> {
        let controller = self
            .state
            .current_booth_index
            .and_then(|index| self.booths.authority_for(index));

        match controller {
            Some(controller) if controller != participant_id => Err(SyncError::NotAuthorized),
            _ => Ok(()),
        }
    }

    fn is_connected(&self, participant_id: ParticipantId) -> bool {
        self.participants.iter().any(|p| p.id == participant_id)
    }

    fn emit_queue(&mut self) {
        self.emit(SyncEvent::QueueUpdate {
            coordinator_id: self.id,
            items: self.queue.peek_all(),
        });
    }

    fn emit_booths(&mut self) {
        self.emit(SyncEvent::BoothUpdate {
            coordinator_id: self.id,
            booths: self.booths.booths().to_vec(),
        });
    }

    fn emit(&mut self, event: SyncEvent) {
        self.outbox.push(event);
    }
}

fn respond(reply: Reply<()>, result: Result<(), SyncError>) {
    if let Err(error) = &result {
        debug!("Rejected request: {}", error);
    }

    // The requester may have stopped waiting
    let _ = reply.send(result);
}

#[cfg(test)]
mod test {
    use crossbeam::channel::{unbounded, Receiver};

    use super::*;
    use crate::Position;

    struct Harness {
        coordinator: SyncCoordinator,
        events: Receiver<SyncEvent>,
        start: DateTime<Utc>,
    }

    impl Harness {
        fn new(config: Config) -> Self {
            let (sender, events) = unbounded();

            Self {
                coordinator: SyncCoordinator::new(CoordinatorId::new(), &config, sender),
                events,
                start: Utc::now(),
            }
        }

        fn at(&self, seconds: f32) -> DateTime<Utc> {
            self.start + Duration::milliseconds((seconds * 1000.) as i64)
        }

        fn join(&mut self, name: &str) -> ParticipantId {
            let participant = Participant::new(name, Position::default());
            let id = participant.id;

            self.coordinator.connect(participant);
            id
        }

        /// Returns every stream state that was broadcast since the last call
        fn stream_updates(&mut self) -> Vec<StreamState> {
            self.coordinator.flush();

            self.events
                .try_iter()
                .filter_map(|e| match e {
                    SyncEvent::StreamUpdate { state, .. } => Some(state),
                    _ => None,
                })
                .collect()
        }
    }

    fn config() -> Config {
        Config {
            seeking_grace_in_seconds: 1.,
            ..Default::default()
        }
    }

    fn item(title: &str, duration: u32) -> PlaylistItem {
        PlaylistItem::new(title, title.to_lowercase(), duration)
    }

    #[test]
    fn test_queue_scenario() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");

        h.coordinator.enqueue(dj, item("A", 180)).unwrap();
        h.coordinator.enqueue(dj, item("B", 90)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();
        h.stream_updates();

        h.coordinator.play(dj, h.at(0.)).expect("dj can play");
        assert_eq!(h.coordinator.state().status, StreamStatus::Seeking);
        assert_eq!(h.coordinator.state().current_link.as_deref(), Some("a"));
        assert_eq!(h.coordinator.state().current_booth_index, Some(0));
        assert_eq!(h.coordinator.state().start_time, None);

        h.coordinator.tick(h.at(1.));
        let state = h.coordinator.state().clone();
        assert_eq!(state.status, StreamStatus::Playing);
        assert_eq!(state.duration, 180);
        assert_eq!(state.start_time, Some(h.at(1.)));

        // Nothing happens before the end of the track
        h.coordinator.tick(h.at(180.));
        assert_eq!(h.coordinator.state(), &state);

        h.coordinator.tick(h.at(181.));
        assert_eq!(h.coordinator.state().status, StreamStatus::Seeking);
        assert_eq!(h.coordinator.state().current_link.as_deref(), Some("b"));
        assert_eq!(
            h.coordinator.state().current_booth_index,
            None,
            "auto-advanced tracks belong to no booth"
        );

        h.coordinator.tick(h.at(182.));
        assert_eq!(h.coordinator.state().status, StreamStatus::Playing);
        assert_eq!(h.coordinator.state().duration, 90);

        h.coordinator.tick(h.at(272.));
        assert_eq!(h.coordinator.state().status, StreamStatus::Waiting);
        assert_eq!(h.coordinator.state().current_link, None);
        assert_eq!(h.coordinator.next_deadline(), None);

        let statuses: Vec<_> = h.stream_updates().into_iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                StreamStatus::Seeking,
                StreamStatus::Playing,
                StreamStatus::Seeking,
                StreamStatus::Playing,
                StreamStatus::Waiting
            ]
        );
    }

    #[test]
    fn test_broadcasts_are_total_and_versioned() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");

        for (i, title) in ["one", "two", "three"].iter().enumerate() {
            h.coordinator.enqueue(dj, item(title, 10 + i as u32)).unwrap();
        }

        h.coordinator.claim_booth(dj, 1).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();
        h.coordinator.tick(h.at(1.));
        h.coordinator.skip(dj, h.at(2.)).unwrap();
        h.coordinator.tick(h.at(3.));
        h.coordinator.stop(dj).unwrap();

        let updates = h.stream_updates();
        assert!(!updates.is_empty());

        for pair in updates.windows(2) {
            assert!(
                pair[1].version > pair[0].version,
                "versions should increase with every broadcast"
            );
        }

        for state in updates {
            assert!(state.is_consistent(), "partial state was broadcast: {:?}", state);
        }
    }

    #[test]
    fn test_state_is_published_before_it_is_announced() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");
        let published = h.coordinator.published();

        h.coordinator.enqueue(dj, item("A", 100)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();

        assert!(h.events.is_empty(), "events wait for the flush");
        assert!(published.read().queue.is_empty());

        h.coordinator.flush();
        assert_eq!(published.read().queue.len(), 1);
        assert_eq!(h.events.try_iter().count(), 3);

        let (reply, mut response) = tokio::sync::oneshot::channel();
        h.coordinator.handle(
            SyncAction::Play {
                participant_id: dj,
                reply,
            },
            h.at(0.),
        );

        assert_eq!(response.try_recv(), Ok(Ok(())));

        let updates = h.stream_updates();
        let announced = updates.last().expect("play is broadcast");

        assert_eq!(published.read().stream.version, announced.version);
        assert_eq!(published.read().stream.status, StreamStatus::Seeking);
    }

    #[test]
    fn test_unauthorized_skip_does_not_change_state() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");
        let listener = h.join("listener");

        h.coordinator.enqueue(listener, item("A", 100)).unwrap();
        h.coordinator.enqueue(listener, item("B", 100)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();
        h.coordinator.tick(h.at(1.));

        let before = h.coordinator.snapshot();
        h.stream_updates();

        assert_eq!(
            h.coordinator.skip(listener, h.at(5.)),
            Err(SyncError::NotAuthorized)
        );
        assert_eq!(
            h.coordinator.stop(listener),
            Err(SyncError::NotAuthorized)
        );
        assert_eq!(
            h.coordinator.play(listener, h.at(5.)),
            Err(SyncError::NotAuthorized),
            "only participants in a booth may start playback"
        );

        assert_eq!(h.coordinator.state(), &before.stream);
        assert_eq!(h.coordinator.queue().peek_all(), before.queue);
        assert!(h.stream_updates().is_empty(), "rejections are never broadcast");
    }

    #[test]
    fn test_skip_cancels_pending_start() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");

        h.coordinator.enqueue(dj, item("A", 100)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();

        // Skip before the grace period is over, with nothing left to play
        h.coordinator.skip(dj, h.at(0.5)).unwrap();
        assert_eq!(h.coordinator.state().status, StreamStatus::Waiting);
        assert_eq!(h.coordinator.next_deadline(), None, "pending start is invalidated");

        h.coordinator.tick(h.at(1.));
        h.coordinator.tick(h.at(500.));

        let statuses: Vec<_> = h.stream_updates().into_iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![StreamStatus::Seeking, StreamStatus::Waiting],
            "no stale playing state may follow the stop"
        );
    }

    #[test]
    fn test_skip_replaces_pending_start() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");

        h.coordinator.enqueue(dj, item("A", 100)).unwrap();
        h.coordinator.enqueue(dj, item("B", 100)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();
        h.coordinator.skip(dj, h.at(0.5)).unwrap();

        // The start of A would have been due here
        h.coordinator.tick(h.at(1.));
        assert_eq!(h.coordinator.state().status, StreamStatus::Seeking);
        assert_eq!(h.coordinator.state().current_link.as_deref(), Some("b"));

        h.coordinator.tick(h.at(1.5));
        assert_eq!(h.coordinator.state().status, StreamStatus::Playing);
        assert_eq!(h.coordinator.state().start_time, Some(h.at(1.5)));
    }

    #[test]
    fn test_invalid_requests() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");

        h.coordinator.claim_booth(dj, 0).unwrap();

        assert_eq!(
            h.coordinator.skip(dj, h.at(0.)),
            Err(SyncError::InvalidTransitionRequest("nothing is playing"))
        );
        assert_eq!(
            h.coordinator.play(dj, h.at(0.)),
            Err(SyncError::InvalidTransitionRequest("the playlist is empty"))
        );

        h.coordinator.enqueue(dj, item("A", 100)).unwrap();
        h.coordinator.enqueue(dj, item("B", 100)).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();

        assert!(
            matches!(
                h.coordinator.play(dj, h.at(0.1)),
                Err(SyncError::InvalidTransitionRequest(_))
            ),
            "play while seeking is rejected"
        );
        assert_eq!(h.coordinator.queue().len(), 1, "rejected play leaves the queue alone");

        let stranger = ParticipantId::new();
        assert_eq!(
            h.coordinator.enqueue(stranger, item("C", 1)),
            Err(SyncError::NotConnected)
        );
    }

    #[test]
    fn test_controller_disconnect_advances_queue() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");
        let listener = h.join("listener");

        h.coordinator.enqueue(listener, item("A", 100)).unwrap();
        h.coordinator.enqueue(listener, item("B", 100)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();
        h.coordinator.tick(h.at(1.));

        h.coordinator.disconnect(dj, h.at(10.));

        assert_eq!(h.coordinator.booths().authority_for(0), None);
        assert_eq!(h.coordinator.state().status, StreamStatus::Seeking);
        assert_eq!(h.coordinator.state().current_link.as_deref(), Some("b"));
        assert_eq!(h.coordinator.state().current_booth_index, None);

        // Open floor, anyone may skip now
        h.coordinator.skip(listener, h.at(11.)).unwrap();
        assert_eq!(h.coordinator.state().status, StreamStatus::Waiting);
    }

    #[test]
    fn test_controller_disconnect_with_empty_queue_stops() {
        let mut h = Harness::new(config());
        let dj = h.join("dj");

        h.coordinator.enqueue(dj, item("A", 100)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();
        h.coordinator.tick(h.at(1.));

        h.coordinator.disconnect(dj, h.at(10.));
        h.coordinator.disconnect(dj, h.at(10.));

        assert_eq!(h.coordinator.state().status, StreamStatus::Waiting);
        assert!(h.coordinator.participants().is_empty());
        assert_eq!(h.coordinator.next_deadline(), None);
    }

    #[test]
    fn test_control_moves_to_occupied_booth() {
        let mut h = Harness::new(config());
        let first = h.join("first");
        let second = h.join("second");

        h.coordinator.enqueue(first, item("A", 100)).unwrap();
        h.coordinator.claim_booth(first, 0).unwrap();
        h.coordinator.claim_booth(second, 1).unwrap();
        h.coordinator.play(first, h.at(0.)).unwrap();
        h.coordinator.tick(h.at(1.));

        let start_time = h.coordinator.state().start_time;
        h.coordinator.release_booth(first, h.at(20.)).unwrap();

        let state = h.coordinator.state();
        assert_eq!(state.status, StreamStatus::Playing, "track keeps playing");
        assert_eq!(state.current_booth_index, Some(1));
        assert_eq!(state.start_time, start_time);
        assert_eq!(
            h.coordinator.skip(first, h.at(21.)),
            Err(SyncError::NotAuthorized)
        );

        // The end of the track is still scheduled after the hand-over
        h.coordinator.tick(h.at(101.));
        assert_eq!(h.coordinator.state().status, StreamStatus::Waiting);
    }

    #[test]
    fn test_enqueue_records_contribution() {
        let mut h = Harness::new(Config {
            max_queue_length: Some(1),
            ..config()
        });
        let john = h.join("john");

        h.coordinator.enqueue(john, item("A", 100)).unwrap();
        assert_eq!(
            h.coordinator.enqueue(john, item("B", 100)),
            Err(SyncError::QueueFull { max: 1 })
        );

        let participant = &h.coordinator.participants()[0];
        assert_eq!(participant.playlist_items, vec![item("A", 100)]);
    }

    #[test]
    fn test_zero_duration_items_are_passed_over() {
        let mut h = Harness::new(Config {
            seeking_grace_in_seconds: 0.,
            ..Default::default()
        });
        let dj = h.join("dj");

        h.coordinator.enqueue(dj, item("unknown", 0)).unwrap();
        h.coordinator.enqueue(dj, item("known", 30)).unwrap();
        h.coordinator.claim_booth(dj, 0).unwrap();
        h.coordinator.play(dj, h.at(0.)).unwrap();
        h.coordinator.tick(h.at(0.));

        assert_eq!(h.coordinator.state().status, StreamStatus::Playing);
        assert_eq!(h.coordinator.state().current_link.as_deref(), Some("known"));
    }
}
