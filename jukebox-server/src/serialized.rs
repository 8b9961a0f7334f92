//! All schemas that are exposed from endpoints are defined here
//! along with the ToSerialized impls

use std::sync::Arc;

use jukebox_collab::{SearchResult as CollabSearchResult, Space as CollabSpace};
use jukebox_core::{
    Booth as CoreBooth, Participant as CoreParticipant, PlaylistItem as CorePlaylistItem,
    SpaceSnapshot as CoreSpaceSnapshot, StreamState as CoreStreamState, StreamStatus,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    id: u64,
    slug: String,
    title: String,
    snapshot: SpaceSnapshot,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpaceSnapshot {
    stream: StreamState,
    booths: Vec<Booth>,
    queue: Vec<PlaylistItem>,
    participants: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Waiting,
    Seeking,
    Playing,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamState {
    status: Status,
    current_link: Option<String>,
    current_title: Option<String>,
    current_booth_index: Option<usize>,
    /// When the track started playing, in milliseconds since the unix epoch
    start_time: Option<i64>,
    /// In seconds
    duration: u32,
    version: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booth {
    index: usize,
    connected_participant: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    title: String,
    link: String,
    duration: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    id: u64,
    name: String,
    x: f32,
    y: f32,
    playlist_items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    title: String,
    id: String,
    length_text: String,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<Space> for Arc<CollabSpace> {
    fn to_serialized(&self) -> Space {
        Space {
            id: self.id.value(),
            slug: self.slug.clone(),
            title: self.title.clone(),
            snapshot: self.snapshot().to_serialized(),
        }
    }
}

impl ToSerialized<SpaceSnapshot> for Arc<CoreSpaceSnapshot> {
    fn to_serialized(&self) -> SpaceSnapshot {
        SpaceSnapshot {
            stream: self.stream.to_serialized(),
            booths: self.booths.to_serialized(),
            queue: self.queue.to_serialized(),
            participants: self.participants.to_serialized(),
        }
    }
}

impl ToSerialized<StreamState> for CoreStreamState {
    fn to_serialized(&self) -> StreamState {
        let status = match self.status {
            StreamStatus::Waiting => Status::Waiting,
            StreamStatus::Seeking => Status::Seeking,
            StreamStatus::Playing => Status::Playing,
        };

        StreamState {
            status,
            current_link: self.current_link.clone(),
            current_title: self.current_title.clone(),
            current_booth_index: self.current_booth_index,
            start_time: self.start_time.map(|t| t.timestamp_millis()),
            duration: self.duration,
            version: self.version,
        }
    }
}

impl ToSerialized<Booth> for CoreBooth {
    fn to_serialized(&self) -> Booth {
        Booth {
            index: self.index,
            connected_participant: self.connected_participant.map(|id| id.value()),
        }
    }
}

impl ToSerialized<PlaylistItem> for CorePlaylistItem {
    fn to_serialized(&self) -> PlaylistItem {
        PlaylistItem {
            title: self.title.clone(),
            link: self.link.clone(),
            duration: self.duration,
        }
    }
}

impl ToSerialized<Participant> for CoreParticipant {
    fn to_serialized(&self) -> Participant {
        Participant {
            id: self.id.value(),
            name: self.name.clone(),
            x: self.position.x,
            y: self.position.y,
            playlist_items: self.playlist_items.to_serialized(),
        }
    }
}

impl ToSerialized<SearchResult> for CollabSearchResult {
    fn to_serialized(&self) -> SearchResult {
        SearchResult {
            title: self.title.clone(),
            id: self.id.clone(),
            length_text: self.length_text.clone(),
        }
    }
}
