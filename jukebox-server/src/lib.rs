use std::{
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
    thread,
};

use axum::routing::get;
use context::ServerContext;
use jukebox_collab::Collab;
use log::info;
use sse::ServerSentEvents;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod context;
mod docs;
mod errors;
mod participant;
mod schemas;
mod search;
mod serialized;
mod spaces;
mod sse;

pub use errors::ServerError;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9050;

pub type Router = axum::Router<ServerContext>;

/// Starts the jukebox server, and runs until it fails.
pub async fn run_server(collab: Arc<Collab>, port: u16) -> std::io::Result<()> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let context = ServerContext {
        collab: collab.clone(),
        sse: ServerSentEvents::new(),
    };

    spawn_event_forwarding_thread(&context);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/spaces", spaces::router())
        .nest("/search", search::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, root_router.into_make_service()).await
}

/// Replicates the events of every space to the participants connected to it
fn spawn_event_forwarding_thread(context: &ServerContext) {
    let collab = context.collab.clone();
    let sse = context.sse.clone();

    let run = move || {
        while let Some(event) = collab.wait_for_event() {
            sse.broadcast(event);
        }
    };

    thread::spawn(run);
}
