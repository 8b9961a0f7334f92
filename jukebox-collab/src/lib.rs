mod events;
mod input;
mod spaces;
mod util;

use std::sync::Arc;

use dashmap::DashMap;
pub use events::*;
pub use input::*;
pub use spaces::*;

use jukebox_core::{CoordinatorId, Engine};

// Reduces verbosity
pub type Store<Id, T> = Arc<DashMap<Id, Arc<T>>>;

/// The jukebox collab system, facilitating spaces, participant connections, and content resolution.
pub struct Collab {
    context: CollabContext,

    pub spaces: SpaceManager,
}

/// A type passed to various components of the collab system, to access state and resolve content.
#[derive(Clone)]
pub struct CollabContext {
    pub engine: Arc<Engine>,
    pub resolver: Arc<dyn ContentResolver>,

    pub spaces: Store<SpaceId, Space>,
}

impl Collab {
    pub fn new<R>(engine: Engine, resolver: R) -> Self
    where
        R: ContentResolver + 'static,
    {
        let context = CollabContext {
            engine: Arc::new(engine),
            resolver: Arc::new(resolver),
            spaces: Default::default(),
        };

        let spaces = SpaceManager::new(&context);

        Self { context, spaces }
    }

    /// Blocks until an event concerning a space happens.
    /// Returns [None] once the engine is gone.
    pub fn wait_for_event(&self) -> Option<CollabEvent> {
        loop {
            let event = self.context.engine.wait_for_event()?;

            if let Some(event) = CollabEvent::from_sync_event(&self.context, event) {
                return Some(event);
            }
        }
    }

    /// Searches for content that can be added to a playlist.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, InputError> {
        self.context.resolver.search(query).await
    }

    pub fn context(&self) -> &CollabContext {
        &self.context
    }
}

impl CollabContext {
    /// Returns the space driven by the given coordinator.
    pub fn space_by_coordinator_id(&self, coordinator_id: CoordinatorId) -> Option<Arc<Space>> {
        self.spaces
            .iter()
            .find(|s| s.coordinator_id() == coordinator_id)
            .map(|s| s.clone())
    }
}
