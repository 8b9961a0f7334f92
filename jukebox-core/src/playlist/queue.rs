use std::collections::VecDeque;

use crate::{PlaylistItem, SyncError};

/// The ordered list of pending tracks of a space.
///
/// Items leave the queue exactly once, in insertion order, when they are promoted to the stream.
#[derive(Debug, Default, Clone)]
pub struct PlaylistQueue {
    items: VecDeque<PlaylistItem>,
    max_length: Option<usize>,
}

impl PlaylistQueue {
    pub fn new(max_length: Option<usize>) -> Self {
        Self {
            items: Default::default(),
            max_length,
        }
    }

    /// Appends an item to the tail of the queue.
    pub fn enqueue(&mut self, item: PlaylistItem) -> Result<(), SyncError> {
        if let Some(max) = self.max_length {
            if self.items.len() >= max {
                return Err(SyncError::QueueFull { max });
            }
        }

        self.items.push_back(item);
        Ok(())
    }

    /// Pops the head of the queue. An empty queue is not an error, there is just nothing to play.
    pub fn dequeue_next(&mut self) -> Option<PlaylistItem> {
        self.items.pop_front()
    }

    /// Returns every pending item in playback order.
    pub fn peek_all(&self) -> Vec<PlaylistItem> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
