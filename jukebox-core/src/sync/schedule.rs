use chrono::{DateTime, Utc};

/// A transition the coordinator performs by itself once `due` is reached.
///
/// It is keyed by the stream version it was scheduled for, and only one can be pending at a time.
/// Any transition that supersedes it replaces or clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTransition {
    pub due: DateTime<Utc>,
    pub version: u64,
    pub kind: ScheduledKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledKind {
    /// The seeking grace period is over, and the start time should be committed.
    CommitStart,
    /// The current track reached the end of its duration.
    TrackEnd,
}
