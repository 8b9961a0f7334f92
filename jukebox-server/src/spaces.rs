use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json,
};
use jukebox_collab::{NewSpace, SearchResult as CollabSearchResult};
use log::debug;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    participant::RequestKey,
    schemas::{CandidateSchema, NewSpaceSchema, StreamAction, StreamActionSchema, ValidatedJson},
    serialized::{PlaylistItem, Space, ToSerialized},
    sse, Router,
};

#[utoipa::path(
    get,
    path = "/v1/spaces",
    tag = "spaces",
    responses(
        (status = 200, body = Vec<Space>)
    )
)]
async fn list_spaces(State(context): State<ServerContext>) -> Json<Vec<Space>> {
    let spaces: Vec<_> = context
        .collab
        .spaces
        .list_all()
        .into_iter()
        .map(|s| s.to_serialized())
        .collect();

    Json(spaces)
}

#[utoipa::path(
    get,
    path = "/v1/spaces/{slug}",
    tag = "spaces",
    params(
        ("slug" = String, Path, description = "The slug of the space")
    ),
    responses(
        (status = 200, body = Space),
        (status = 404, description = "Space does not exist")
    )
)]
async fn space(
    State(context): State<ServerContext>,
    Path(slug): Path<String>,
) -> ServerResult<Json<Space>> {
    let space = context.collab.spaces.space_by_slug(&slug)?;

    Ok(Json(space.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/spaces",
    tag = "spaces",
    request_body = NewSpaceSchema,
    responses(
        (status = 200, body = Space),
        (status = 409, description = "A space with the slug already exists")
    )
)]
async fn create_space(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewSpaceSchema>,
) -> ServerResult<Json<Space>> {
    let space = context.collab.spaces.create_space(NewSpace {
        slug: body.slug,
        title: body.title,
    })?;

    Ok(Json(space.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/spaces/{slug}/queue",
    tag = "spaces",
    params(
        ("slug" = String, Path, description = "The slug of the space")
    ),
    responses(
        (status = 200, body = Vec<PlaylistItem>, description = "The pending items, next first")
    )
)]
async fn queue(
    State(context): State<ServerContext>,
    Path(slug): Path<String>,
) -> ServerResult<Json<Vec<PlaylistItem>>> {
    let space = context.collab.spaces.space_by_slug(&slug)?;

    Ok(Json(space.peek_queue().to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/spaces/{slug}/queue",
    tag = "spaces",
    request_body = CandidateSchema,
    params(
        ("slug" = String, Path, description = "The slug of the space")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = PlaylistItem, description = "The item was added to the playlist"),
        (status = 400, description = "The playlist is full")
    )
)]
async fn add_to_queue(
    key: RequestKey,
    State(context): State<ServerContext>,
    Path(slug): Path<String>,
    ValidatedJson(body): ValidatedJson<CandidateSchema>,
) -> ServerResult<Json<PlaylistItem>> {
    let space = context.collab.spaces.space_by_slug(&slug)?;
    let participant_id = key.participant_in(&space)?;

    let candidate = CollabSearchResult {
        title: body.title,
        id: body.id,
        length_text: body.length_text,
    };

    let item = space.submit(participant_id, candidate).await?;

    Ok(Json(item.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/spaces/{slug}/booths/{index}",
    tag = "spaces",
    params(
        ("slug" = String, Path, description = "The slug of the space"),
        ("index" = usize, Path, description = "The index of the booth to claim")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "The booth was claimed"),
        (status = 409, description = "The booth is occupied, or the participant already has one")
    )
)]
async fn claim_booth(
    key: RequestKey,
    State(context): State<ServerContext>,
    Path((slug, index)): Path<(String, usize)>,
) -> ServerResult<()> {
    let space = context.collab.spaces.space_by_slug(&slug)?;
    let participant_id = key.participant_in(&space)?;

    space.claim_booth(participant_id, index).await?;

    Ok(())
}

#[utoipa::path(
    delete,
    path = "/v1/spaces/{slug}/booths",
    tag = "spaces",
    params(
        ("slug" = String, Path, description = "The slug of the space")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "The participant no longer occupies a booth")
    )
)]
async fn release_booth(
    key: RequestKey,
    State(context): State<ServerContext>,
    Path(slug): Path<String>,
) -> ServerResult<()> {
    let space = context.collab.spaces.space_by_slug(&slug)?;
    let participant_id = key.participant_in(&space)?;

    space.release_booth(participant_id).await?;

    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/spaces/{slug}/actions",
    tag = "spaces",
    request_body = StreamActionSchema,
    params(
        ("slug" = String, Path, description = "The slug of the space")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "The stream transitioned"),
        (status = 400, description = "The transition is not possible right now"),
        (status = 403, description = "The participant may not control the stream")
    )
)]
async fn stream_action(
    key: RequestKey,
    State(context): State<ServerContext>,
    Path(slug): Path<String>,
    Json(body): Json<StreamActionSchema>,
) -> ServerResult<()> {
    let space = context.collab.spaces.space_by_slug(&slug)?;
    let participant_id = key.participant_in(&space)?;

    debug!(
        "Participant #{} requested {:?} in space {}",
        participant_id, body.action, space.slug
    );

    match body.action {
        StreamAction::Play => space.play(participant_id).await?,
        StreamAction::Skip => space.skip(participant_id).await?,
        StreamAction::Stop => space.stop(participant_id).await?,
    }

    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_spaces).post(create_space))
        .route("/:slug", get(space))
        .route("/:slug/events", get(sse::event_stream))
        .route("/:slug/queue", get(queue).post(add_to_queue))
        .route("/:slug/booths", delete(release_booth))
        .route("/:slug/booths/:index", post(claim_booth))
        .route("/:slug/actions", post(stream_action))
}
