use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use jukebox_collab::Space;
use jukebox_core::ParticipantId;

use crate::errors::ServerResult;

/// The key a participant received when connecting, taken from the Authorization header
pub struct RequestKey(String);

impl RequestKey {
    /// Returns the participant in the space this key belongs to
    pub fn participant_in(&self, space: &Space) -> ServerResult<ParticipantId> {
        Ok(space.participant_by_key(&self.0)?)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestKey
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing authorization"))?;

        let parts: Vec<_> = header.split_ascii_whitespace().collect();

        match parts.as_slice() {
            ["Bearer", key] => Ok(Self(key.to_string())),
            _ => Err((StatusCode::BAD_REQUEST, "Authorization must be Bearer")),
        }
    }
}
