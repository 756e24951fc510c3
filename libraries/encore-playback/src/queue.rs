//! Play queue
//!
//! Ordered list of queue items plus a pointer to the current one. Pure data,
//! no platform player involved.
//!
//! ```text
//!   index:   0        1        2        3
//!          [ A ]    [ B ]    [ A ]    [ C ]
//!                     ^
//!                  current
//! ```
//!
//! The same track may appear several times; items are told apart by their
//! synthetic [`QueueItemId`].

use encore_core::Track;
use std::sync::Arc;

use crate::error::{PlaybackError, Result};
use crate::types::{EndOfQueuePolicy, QueueItem, QueueItemId};

/// Queue with a current-item pointer
///
/// Invariant: `index` is `None` or a valid position in `items`.
#[derive(Debug, Clone, Default)]
pub struct QueueManager {
    items: Vec<QueueItem>,
    index: Option<usize>,
    end_policy: EndOfQueuePolicy,
}

impl QueueManager {
    /// Create new empty queue with the default end-of-queue policy (stop)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(end_policy: EndOfQueuePolicy) -> Self {
        Self {
            end_policy,
            ..Self::default()
        }
    }

    pub fn end_policy(&self) -> EndOfQueuePolicy {
        self.end_policy
    }

    pub fn set_end_policy(&mut self, policy: EndOfQueuePolicy) {
        self.end_policy = policy;
    }

    /// Replace the queue wholesale
    ///
    /// An empty list clears the queue. A `start_index` outside a non-empty
    /// list is rejected and the queue is left untouched.
    pub fn set_queue<I>(&mut self, tracks: I, start_index: usize) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Arc<Track>>,
    {
        let tracks: Vec<Arc<Track>> = tracks.into_iter().map(Into::into).collect();

        if tracks.is_empty() {
            self.clear();
            return Ok(());
        }

        if start_index >= tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index: start_index,
                len: tracks.len(),
            });
        }

        self.items = tracks.into_iter().map(QueueItem::new).collect();
        self.index = Some(start_index);
        Ok(())
    }

    /// Append a track to the tail
    ///
    /// The pointer is unchanged, except on an empty queue where the new item
    /// becomes current.
    pub fn add_to_queue(&mut self, track: impl Into<Arc<Track>>) -> QueueItemId {
        let item = QueueItem::new(track);
        let id = item.id();
        let was_empty = self.items.is_empty();

        self.items.push(item);
        if was_empty {
            self.index = Some(0);
        }
        id
    }

    /// Insert a track at `index` (clamped to the queue length)
    ///
    /// Inserting at or before the current item shifts the pointer so the
    /// current item stays current.
    pub fn insert_at(&mut self, index: usize, track: impl Into<Arc<Track>>) -> QueueItemId {
        let item = QueueItem::new(track);
        let id = item.id();
        let was_empty = self.items.is_empty();
        let index = index.min(self.items.len());

        self.items.insert(index, item);

        match self.index {
            Some(current) if index <= current => self.index = Some(current + 1),
            None if was_empty => self.index = Some(0),
            _ => {}
        }
        id
    }

    /// Insert a track right after the current item (or at the tail)
    pub fn insert_next(&mut self, track: impl Into<Arc<Track>>) -> QueueItemId {
        let position = self.index.map_or(self.items.len(), |current| current + 1);
        self.insert_at(position, track)
    }

    /// Remove an item by its synthetic id
    ///
    /// Removing the current item makes the item that slides into its
    /// position current, or clears the pointer if it was the last one.
    pub fn remove(&mut self, item_id: QueueItemId) -> Option<QueueItem> {
        let position = self.position_of(item_id)?;
        let removed = self.items.remove(position);

        self.index = match self.index {
            Some(current) if position < current => Some(current - 1),
            Some(current) if position == current => {
                (position < self.items.len()).then_some(position)
            }
            other => other,
        };

        Some(removed)
    }

    /// Move an item from `from_index` to `to_index`, keeping the current item current
    pub fn reorder(&mut self, from_index: usize, to_index: usize) -> Result<()> {
        let len = self.items.len();
        for index in [from_index, to_index] {
            if index >= len {
                return Err(PlaybackError::IndexOutOfBounds { index, len });
            }
        }

        if from_index == to_index {
            return Ok(());
        }

        let current_id = self.current().map(QueueItem::id);
        let item = self.items.remove(from_index);
        self.items.insert(to_index, item);
        self.index = current_id.and_then(|id| self.position_of(id));
        Ok(())
    }

    /// Move the pointer to the next item
    ///
    /// At the end of the queue the end-of-queue policy applies: `Stop`
    /// clears the pointer, `Stay` leaves it on the last item.
    pub fn advance(&mut self) -> Option<&QueueItem> {
        if let Some(current) = self.index {
            if current + 1 < self.items.len() {
                self.index = Some(current + 1);
            } else if self.end_policy == EndOfQueuePolicy::Stop {
                self.index = None;
            }
        }
        self.current()
    }

    /// Move the pointer to the previous item; stays put on the first item
    pub fn retreat(&mut self) -> Option<&QueueItem> {
        if let Some(current) = self.index {
            self.index = Some(current.saturating_sub(1));
        }
        self.current()
    }

    /// Item under the pointer
    pub fn current(&self) -> Option<&QueueItem> {
        self.index.and_then(|index| self.items.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    /// Clear the pointer but keep the items
    pub fn reset_pointer(&mut self) {
        self.index = None;
    }

    /// Put `item` in place of the current item when both hold the same track
    ///
    /// Used to carry an item's identity across a queue replacement.
    pub(crate) fn adopt_current(&mut self, item: QueueItem) -> bool {
        let Some(index) = self.index else {
            return false;
        };

        if self.items[index].track_id() != item.track_id() || self.position_of(item.id()).is_some()
        {
            return false;
        }

        self.items[index] = item;
        true
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.items.clear();
        self.index = None;
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn position_of(&self, item_id: QueueItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == item_id)
    }

    /// Total number of items in queue
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
