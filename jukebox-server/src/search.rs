use axum::{extract::State, routing::get, Json};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{SearchParams, ValidatedQuery},
    serialized::{SearchResult, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/search",
    tag = "search",
    params(SearchParams),
    responses(
        (status = 200, body = Vec<SearchResult>, description = "Candidates that can be added to a playlist"),
        (status = 502, description = "The content provider could not be reached")
    )
)]
async fn search(
    State(context): State<ServerContext>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> ServerResult<Json<Vec<SearchResult>>> {
    let results = context.collab.search(&params.query).await?;

    Ok(Json(results.to_serialized()))
}

pub fn router() -> Router {
    Router::new().route("/", get(search))
}
