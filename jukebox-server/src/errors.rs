use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jukebox_collab::{InputError, SpaceError};
use jukebox_core::SyncError;
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Key does not belong to a participant of this space")]
    UnknownKey,
    #[error(transparent)]
    Rejected(SyncError),
    #[error("Search failed: {0}")]
    Search(InputError),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UnknownKey => StatusCode::UNAUTHORIZED,
            Self::Rejected(error) => match error {
                SyncError::AlreadyOccupied { .. } | SyncError::ParticipantAlreadyBound { .. } => {
                    StatusCode::CONFLICT
                }
                SyncError::NotAuthorized | SyncError::NotConnected => StatusCode::FORBIDDEN,
                SyncError::NoSuchBooth { .. } => StatusCode::NOT_FOUND,
                SyncError::QueueFull { .. } | SyncError::InvalidTransitionRequest(_) => {
                    StatusCode::BAD_REQUEST
                }
                SyncError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Search(InputError::NoMatch) => StatusCode::BAD_REQUEST,
            Self::Search(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<SpaceError> for ServerError {
    fn from(value: SpaceError) -> Self {
        match value {
            SpaceError::NotFound => Self::NotFound { resource: "Space" },
            SpaceError::Conflict(slug) => Self::Conflict {
                resource: "Space",
                field: "slug",
                value: slug,
            },
            SpaceError::UnknownKey => Self::UnknownKey,
            SpaceError::Sync(error) => Self::Rejected(error),
        }
    }
}

impl From<InputError> for ServerError {
    fn from(value: InputError) -> Self {
        Self::Search(value)
    }
}
