use thiserror::Error;

/// Errors returned to a participant whose request was rejected.
///
/// None of these alter the state of a space, and they are only ever reported to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Booth {booth_index} is already occupied")]
    AlreadyOccupied { booth_index: usize },
    #[error("Participant already occupies booth {booth_index}")]
    ParticipantAlreadyBound { booth_index: usize },
    #[error("Booth {booth_index} does not exist")]
    NoSuchBooth { booth_index: usize },
    #[error("Participant is not allowed to control the stream")]
    NotAuthorized,
    #[error("The playlist is full ({max} items)")]
    QueueFull { max: usize },
    #[error("Invalid request: {0}")]
    InvalidTransitionRequest(&'static str),
    #[error("Participant is not connected to this space")]
    NotConnected,
    #[error("The space coordinator is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{variable} has an invalid value: {value}")]
    Invalid {
        variable: &'static str,
        value: String,
    },
}
