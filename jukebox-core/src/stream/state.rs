use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Nothing is playing.
    #[default]
    Waiting,
    /// A track was selected, and clients are buffering it before the clock starts.
    Seeking,
    /// A track is playing, and its start time is known.
    Playing,
}

/// The authoritative record of what is playing in a space.
///
/// A [StreamState] is always replaced as a whole, so a snapshot never mixes fields of two transitions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamState {
    pub status: StreamStatus,
    pub current_link: Option<String>,
    pub current_title: Option<String>,
    /// The booth that initiated the current track, `None` when it was auto-advanced
    pub current_booth_index: Option<usize>,
    pub start_time: Option<DateTime<Utc>>,
    /// The length of the current track, in seconds
    pub duration: u32,
    /// Incremented on every change
    pub version: u64,
}

impl StreamState {
    /// Returns how long the current track has been playing for.
    /// Clock skew that would put the start in the future is clamped to zero.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        match (self.status, self.start_time) {
            (StreamStatus::Playing, Some(start_time)) => {
                Some((now - start_time).max(Duration::zero()))
            }
            _ => None,
        }
    }

    /// Returns when the current track is done playing
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            StreamStatus::Playing => self
                .start_time
                .map(|start| start + Duration::seconds(self.duration as i64)),
            _ => None,
        }
    }

    /// Returns true if the track's duration has elapsed
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.ends_at().map(|end| now >= end).unwrap_or(false)
    }

    /// Checks the relations between status and the other fields.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            StreamStatus::Waiting => self.current_link.is_none() && self.start_time.is_none(),
            StreamStatus::Seeking => self.current_link.is_some() && self.start_time.is_none(),
            StreamStatus::Playing => self.current_link.is_some() && self.start_time.is_some(),
        }
    }
}
