use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use crate::{Config, StreamState, StreamStatus};

/// What a client should do with its local audio after receiving a [StreamState].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackDirective {
    /// Start, or move, local playback of `link` at `offset`.
    Play { link: String, offset: StdDuration },
    /// Fetch the track without starting it, the clock has not started yet.
    Prepare { link: String },
    /// Stop local playback.
    Stop,
    /// The track ended before the state arrived. Nothing should be started, a newer state is on its way.
    Stale,
    /// The state was already applied, or is older than the applied one.
    Unchanged,
}

/// Keeps a single client's playback aligned with the authoritative [StreamState].
///
/// Applying the same state twice yields [PlaybackDirective::Unchanged] the second time,
/// so duplicated deliveries never restart audio. The same goes for newer states
/// that keep the track and its start time.
#[derive(Debug, Clone)]
pub struct ClientReconciler {
    drift_tolerance: Duration,
    applied: Option<StreamState>,
}

impl ClientReconciler {
    pub fn new(drift_tolerance: Duration) -> Self {
        Self {
            drift_tolerance,
            applied: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.drift_tolerance())
    }

    /// Reconciles against a newly received state.
    pub fn apply(&mut self, state: &StreamState, now: DateTime<Utc>) -> PlaybackDirective {
        if let Some(applied) = &self.applied {
            if applied.version >= state.version {
                return PlaybackDirective::Unchanged;
            }
        }

        let same_origin = self.applied.as_ref().is_some_and(|applied| {
            applied.status == state.status
                && applied.current_link == state.current_link
                && applied.start_time == state.start_time
        });

        self.applied = Some(state.clone());

        // A new version with the same playback origin, like a booth hand-over, keeps local audio going
        if same_origin {
            return PlaybackDirective::Unchanged;
        }

        match state.status {
            StreamStatus::Waiting => PlaybackDirective::Stop,
            StreamStatus::Seeking => state
                .current_link
                .clone()
                .map(|link| PlaybackDirective::Prepare { link })
                .unwrap_or(PlaybackDirective::Stop),
            StreamStatus::Playing => Self::position_in(state, now),
        }
    }

    /// Returns where local playback should be right now, if anything is playing.
    pub fn expected_offset(&self, now: DateTime<Utc>) -> Option<StdDuration> {
        self.applied
            .as_ref()
            .filter(|s| !s.has_ended(now))
            .and_then(|s| s.elapsed(now))
            .and_then(|e| e.to_std().ok())
    }

    /// Compares the local playback position with the expected one,
    /// returning a corrective seek if the drift is larger than the tolerance.
    pub fn correct_drift(
        &self,
        local_position: StdDuration,
        now: DateTime<Utc>,
    ) -> Option<PlaybackDirective> {
        let expected = self.expected_offset(now)?;
        let link = self.applied.as_ref()?.current_link.clone()?;

        let drift = if expected > local_position {
            expected - local_position
        } else {
            local_position - expected
        };

        let tolerance = self.drift_tolerance.to_std().unwrap_or_default();

        (drift > tolerance).then_some(PlaybackDirective::Play {
            link,
            offset: expected,
        })
    }

    fn position_in(state: &StreamState, now: DateTime<Utc>) -> PlaybackDirective {
        let (Some(link), Some(elapsed)) = (state.current_link.clone(), state.elapsed(now)) else {
            return PlaybackDirective::Stop;
        };

        if state.has_ended(now) {
            return PlaybackDirective::Stale;
        }

        PlaybackDirective::Play {
            link,
            offset: elapsed.to_std().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn playing(start: DateTime<Utc>, duration: u32, version: u64) -> StreamState {
        StreamState {
            status: StreamStatus::Playing,
            current_link: Some("dQw4w9WgXcQ".to_string()),
            current_title: Some("A song".to_string()),
            current_booth_index: Some(0),
            start_time: Some(start),
            duration,
            version,
        }
    }

    #[test]
    fn test_seeks_to_elapsed_offset() {
        let start = Utc::now();
        let mut reconciler = ClientReconciler::new(Duration::milliseconds(500));

        let directive = reconciler.apply(&playing(start, 180, 2), start + Duration::seconds(42));

        assert_eq!(
            directive,
            PlaybackDirective::Play {
                link: "dQw4w9WgXcQ".to_string(),
                offset: StdDuration::from_secs(42)
            }
        );
    }

    #[test]
    fn test_duplicate_snapshot_is_unchanged() {
        let start = Utc::now();
        let state = playing(start, 180, 2);
        let mut reconciler = ClientReconciler::new(Duration::milliseconds(500));

        let first = reconciler.apply(&state, start + Duration::seconds(10));
        let second = reconciler.apply(&state, start + Duration::seconds(11));

        assert!(matches!(first, PlaybackDirective::Play { .. }));
        assert_eq!(second, PlaybackDirective::Unchanged, "replay must not restart audio");
        assert_eq!(
            reconciler.expected_offset(start + Duration::seconds(11)),
            Some(StdDuration::from_secs(11)),
            "position is recomputed from the same start time"
        );
    }

    #[test]
    fn test_hand_over_keeps_playing() {
        let start = Utc::now();
        let mut reconciler = ClientReconciler::new(Duration::milliseconds(500));

        let first = reconciler.apply(&playing(start, 180, 3), start + Duration::seconds(40));
        assert!(matches!(first, PlaybackDirective::Play { .. }));

        let handed_over = StreamState {
            current_booth_index: Some(1),
            ..playing(start, 180, 4)
        };

        assert_eq!(
            reconciler.apply(&handed_over, start + Duration::seconds(41)),
            PlaybackDirective::Unchanged,
            "a new controller must not make clients seek"
        );
        assert_eq!(
            reconciler.apply(&playing(start, 180, 4), start + Duration::seconds(42)),
            PlaybackDirective::Unchanged,
            "the hand-over version was applied"
        );

        let restarted = playing(start + Duration::seconds(42), 180, 5);
        assert!(matches!(
            reconciler.apply(&restarted, start + Duration::seconds(43)),
            PlaybackDirective::Play { .. }
        ));
    }

    #[test]
    fn test_older_snapshot_is_ignored() {
        let start = Utc::now();
        let mut reconciler = ClientReconciler::new(Duration::milliseconds(500));

        reconciler.apply(
            &StreamState {
                version: 5,
                ..Default::default()
            },
            start,
        );

        assert_eq!(
            reconciler.apply(&playing(start, 180, 4), start),
            PlaybackDirective::Unchanged,
            "a late delivery of an older transition must not resume audio"
        );
    }

    #[test]
    fn test_ended_track_is_stale() {
        let start = Utc::now();
        let mut reconciler = ClientReconciler::new(Duration::milliseconds(500));

        let directive = reconciler.apply(&playing(start, 90, 7), start + Duration::seconds(95));

        assert_eq!(directive, PlaybackDirective::Stale);
        assert_eq!(reconciler.expected_offset(start + Duration::seconds(95)), None);
    }

    #[test]
    fn test_waiting_and_seeking() {
        let mut reconciler = ClientReconciler::new(Duration::milliseconds(500));
        let now = Utc::now();

        let seeking = StreamState {
            status: StreamStatus::Seeking,
            current_link: Some("next".to_string()),
            version: 1,
            ..Default::default()
        };

        assert_eq!(
            reconciler.apply(&seeking, now),
            PlaybackDirective::Prepare {
                link: "next".to_string()
            }
        );

        let waiting = StreamState {
            version: 2,
            ..Default::default()
        };

        assert_eq!(reconciler.apply(&waiting, now), PlaybackDirective::Stop);
    }

    #[test]
    fn test_drift_correction() {
        let start = Utc::now();
        let now = start + Duration::seconds(60);
        let mut reconciler = ClientReconciler::from_config(&Config {
            drift_tolerance_in_seconds: 0.5,
            ..Default::default()
        });

        reconciler.apply(&playing(start, 180, 1), now);

        assert_eq!(
            reconciler.correct_drift(StdDuration::from_millis(59_800), now),
            None,
            "small drift is tolerated"
        );
        assert_eq!(
            reconciler.correct_drift(StdDuration::from_secs(58), now),
            Some(PlaybackDirective::Play {
                link: "dQw4w9WgXcQ".to_string(),
                offset: StdDuration::from_secs(60)
            })
        );
    }
}
