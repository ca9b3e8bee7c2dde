//! # Change Feed
//!
//! Row-level change notifications, broadcast per table.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Change Feed Flow                                 │
//! │                                                                         │
//! │  Repository write (insert/update/soft delete)                           │
//! │       │ commit first, then publish                                      │
//! │       ▼                                                                 │
//! │  ChangeFeed ── broadcast::Sender<ChangeEvent> ──┬──► subscriber A       │
//! │                                                 ├──► subscriber B       │
//! │                                                 └──► (none? dropped)    │
//! │                                                                         │
//! │  Each event carries the table, the action, the record id and (when     │
//! │  the writer had the row at hand) the serialized row, so subscribers    │
//! │  can patch a normalized cache incrementally instead of re-fetching     │
//! │  the whole table.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are only published after the underlying write has committed.
//! A subscriber that falls behind observes `RecvError::Lagged` and should
//! re-sync the affected caches from the store.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

use gestio_core::EntityKind;

/// Broadcast channel capacity. Slow subscribers past this lag are forced to
/// re-sync.
const CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Event Types
// =============================================================================

/// What happened to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// A row-level change in one of the entity tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Which table changed.
    pub entity: EntityKind,

    /// Insert, update or delete.
    pub action: ChangeAction,

    /// The affected record's id.
    pub id: String,

    /// The row after the change, serialized. `None` for deletes and for
    /// writers that do not have the row at hand (restores); subscribers
    /// re-read by id in that case.
    pub payload: Option<serde_json::Value>,
}

impl ChangeEvent {
    /// Builds an event carrying the serialized row.
    pub fn with_record<T: Serialize>(
        entity: EntityKind,
        action: ChangeAction,
        id: &str,
        record: &T,
    ) -> Self {
        let payload = match serde_json::to_value(record) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(?entity, id = %id, error = %e, "Failed to serialize change payload");
                None
            }
        };

        ChangeEvent {
            entity,
            action,
            id: id.to_string(),
            payload,
        }
    }

    /// Builds an event without a payload.
    pub fn bare(entity: EntityKind, action: ChangeAction, id: &str) -> Self {
        ChangeEvent {
            entity,
            action,
            id: id.to_string(),
            payload: None,
        }
    }
}

// =============================================================================
// Change Feed
// =============================================================================

/// Handle to the change broadcast channel.
///
/// Cloning is cheap; every repository holds a clone and publishes after its
/// writes commit.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Creates a new feed with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        ChangeFeed { tx }
    }

    /// Subscribes to all change events. Subscribers filter by
    /// [`ChangeEvent::entity`].
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event. Publishing with no subscribers is a no-op.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers (diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
