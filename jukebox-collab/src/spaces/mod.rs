mod connection;
mod space;

use std::sync::Arc;

use jukebox_core::SyncError;
use log::info;
use thiserror::Error;

use crate::CollabContext;

pub use connection::*;
pub use space::*;

pub struct SpaceManager {
    context: CollabContext,
}

#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("Space does not exist")]
    NotFound,
    #[error("A space with the slug \"{0}\" already exists")]
    Conflict(String),
    #[error("Key does not belong to a connection in this space")]
    UnknownKey,
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// The data needed to create a space
#[derive(Debug, Clone)]
pub struct NewSpace {
    pub slug: String,
    pub title: String,
}

impl SpaceManager {
    pub fn new(context: &CollabContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Creates a new space with its own coordinator.
    /// Must be called from within a tokio runtime.
    pub fn create_space(&self, new_space: NewSpace) -> Result<Arc<Space>, SpaceError> {
        if self.space_by_slug(&new_space.slug).is_ok() {
            return Err(SpaceError::Conflict(new_space.slug));
        }

        let space = Arc::new(Space::new(&self.context, new_space));
        self.context.spaces.insert(space.id, space.clone());

        info!("Created space {} ({})", space.title, space.slug);

        Ok(space)
    }

    pub fn space_by_slug(&self, slug: &str) -> Result<Arc<Space>, SpaceError> {
        self.context
            .spaces
            .iter()
            .find(|s| s.slug == slug)
            .map(|s| s.clone())
            .ok_or(SpaceError::NotFound)
    }

    pub fn space_by_id(&self, id: SpaceId) -> Result<Arc<Space>, SpaceError> {
        self.context
            .spaces
            .get(&id)
            .map(|s| s.clone())
            .ok_or(SpaceError::NotFound)
    }

    /// Get all spaces, ordered by creation
    pub fn list_all(&self) -> Vec<Arc<Space>> {
        let mut spaces: Vec<_> = self.context.spaces.iter().map(|s| s.clone()).collect();
        spaces.sort_by_key(|s| s.id.value());

        spaces
    }
}

#[cfg(test)]
mod test {
    use jukebox_core::Engine;

    use crate::{Collab, SearchResult};

    use super::*;

    struct NoResolver;

    #[async_trait::async_trait]
    impl crate::ContentResolver for NoResolver {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, crate::InputError> {
            Ok(vec![])
        }
    }

    fn new_space(slug: &str) -> NewSpace {
        NewSpace {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn test_slugs_are_unique() {
        let collab = Collab::new(Engine::default(), NoResolver);

        let lobby = collab.spaces.create_space(new_space("lobby")).unwrap();
        let result = collab.spaces.create_space(new_space("lobby"));

        assert!(
            matches!(result, Err(SpaceError::Conflict(_))),
            "duplicate slug should conflict"
        );

        let found = collab.spaces.space_by_slug("lobby").unwrap();
        assert_eq!(found.id, lobby.id);
        assert!(matches!(
            collab.spaces.space_by_slug("nowhere"),
            Err(SpaceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_spaces_are_listed_in_creation_order() {
        let collab = Collab::new(Engine::default(), NoResolver);

        collab.spaces.create_space(new_space("first")).unwrap();
        collab.spaces.create_space(new_space("second")).unwrap();
        collab.spaces.create_space(new_space("third")).unwrap();

        let slugs: Vec<_> = collab
            .spaces
            .list_all()
            .iter()
            .map(|s| s.slug.clone())
            .collect();

        assert_eq!(slugs, vec!["first", "second", "third"]);
    }
}
