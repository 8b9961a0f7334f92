use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSpaceSchema {
    #[validate(length(min = 2, max = 64))]
    pub slug: String,
    #[validate(length(min = 2, max = 128))]
    pub title: String,
}

/// A search result to add to the playlist
#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CandidateSchema {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    /// Unreadable lengths are accepted, the track then has a duration of zero
    #[serde(default)]
    pub length_text: String,
}

#[derive(Debug, Clone, Copy, ToSchema, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamAction {
    Play,
    Skip,
    Stop,
}

#[derive(Debug, ToSchema, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamActionSchema {
    #[serde(rename = "type")]
    pub action: StreamAction,
}

#[derive(Debug, IntoParams, Validate, Deserialize)]
#[into_params(parameter_in = Query)]
pub struct ConnectParams {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, IntoParams, Validate, Deserialize)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    #[validate(length(min = 1, max = 256))]
    pub query: String,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}

pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Query parse failed"))?;

        params
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Query is invalid"))?;

        Ok(Self(params))
    }
}
