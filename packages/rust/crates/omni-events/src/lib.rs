//! Observable attributes with origin-tagged change notifications
//!
//! Provides a source-of-truth value container backed by tokio's broadcast
//! channel. Used to share model state (child lists, selection, titles)
//! between many independent view instances.
//!
//! # Architecture
//!
//! ```text
//! Attribute.set(value, origin)
//!      ↓
//! Change { seq, old, new, origin } → broadcast::Sender
//!      ↓
//! Fan-out to every Subscription
//!      ↓
//! Each view drains its subscriptions and skips its own echoes
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Errors surfaced by a [`Subscription`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The receiver fell behind and notifications were dropped.
    #[error("Subscriber of '{attribute}' lagged, {skipped} notifications skipped")]
    Lagged {
        /// Attribute name
        attribute: String,
        /// Number of dropped notifications
        skipped: u64,
    },

    /// The attribute was dropped.
    #[error("Attribute '{attribute}' closed")]
    Closed {
        /// Attribute name
        attribute: String,
    },
}

/// Identity of a writer, attached to every write it performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin(Uuid);

impl Origin {
    /// Create a fresh origin marker
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.0.simple().to_string();
        write!(f, "{}", &simple[..8])
    }
}

/// Shared sequence source.
///
/// Attributes created with the same clock stamp their notifications from one
/// counter, so changes observed on separate subscriptions can be merged back
/// into write order.
#[derive(Debug, Clone, Default)]
pub struct Clock(Arc<AtomicU64>);

impl Clock {
    /// Create a clock starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the next sequence number (first is 1)
    pub fn tick(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last issued sequence number
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// One attribute change notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change<T> {
    /// Unique notification identifier
    pub id: String,
    /// Name of the attribute that changed
    pub attribute: String,
    /// Position in the write order of the attribute's clock
    pub seq: u64,
    /// Value before the write
    pub old: T,
    /// Value after the write
    pub new: T,
    /// Writer that caused the change, if it identified itself
    pub origin: Option<Origin>,
    /// Change timestamp
    pub timestamp: DateTime<Utc>,
}

impl<T> Change<T> {
    /// True when this change was written by `origin`.
    pub fn is_from(&self, origin: Origin) -> bool {
        self.origin == Some(origin)
    }
}

impl<T: fmt::Debug> fmt::Display for Change<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = self
            .origin
            .map_or_else(|| "-".to_string(), |o| o.to_string());
        write!(
            f,
            "[{}] #{} {} ({}): {:?} -> {:?}",
            self.timestamp.format("%H:%M:%S"),
            self.seq,
            self.attribute,
            origin,
            self.old,
            self.new
        )
    }
}

/// Observable value with broadcast change notification.
///
/// Uses `tokio::sync::broadcast` for:
/// - 1-to-Many fan-out to every subscribed view
/// - Non-blocking publish
/// - Automatic cleanup on receiver drop
pub struct Attribute<T> {
    name: String,
    value: RwLock<T>,
    tx: broadcast::Sender<Change<T>>,
    clock: Clock,
    capacity: usize,
}

impl<T> Attribute<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Create an attribute with its own clock
    pub fn new(name: impl Into<String>, initial: T, capacity: usize) -> Self {
        Self::with_clock(name, initial, capacity, Clock::new())
    }

    /// Create an attribute stamping notifications from a shared clock
    pub fn with_clock(name: impl Into<String>, initial: T, capacity: usize, clock: Clock) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            name: name.into(),
            value: RwLock::new(initial),
            tx,
            clock,
            capacity: capacity.max(1),
        }
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Broadcast capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write a new value on behalf of `origin`.
    ///
    /// Returns `false` without notifying anyone when the value is unchanged.
    pub fn set(&self, value: T, origin: Option<Origin>) -> bool {
        self.update(|current| *current = value, origin)
    }

    /// Read-modify-write the value on behalf of `origin`.
    ///
    /// The closure runs under the write lock. Publishes only if the value changed.
    pub fn update<F>(&self, f: F, origin: Option<Origin>) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        let old = guard.clone();
        f(&mut *guard);
        if *guard == old {
            return false;
        }

        let change = Change {
            id: Uuid::new_v4().to_string(),
            attribute: self.name.clone(),
            seq: self.clock.tick(),
            old,
            new: guard.clone(),
            origin,
            timestamp: Utc::now(),
        };
        // Publish while still holding the lock so notifications follow write order
        let delivered = self.tx.send(change).unwrap_or(0);
        log::trace!("{} changed, delivered to {} subscribers", self.name, delivered);
        true
    }

    /// Subscribe to future changes.
    ///
    /// Dropping the subscription automatically unsubscribes.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            attribute: self.name.clone(),
            rx: self.tx.subscribe(),
        }
    }

    /// Get current subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: fmt::Debug> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Receiving end of an [`Attribute`]
#[derive(Debug)]
pub struct Subscription<T> {
    attribute: String,
    rx: broadcast::Receiver<Change<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Name of the observed attribute
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Take the next queued change without blocking.
    ///
    /// Returns `Ok(None)` once the queue is drained.
    pub fn try_next(&mut self) -> Result<Option<Change<T>>, EventError> {
        match self.rx.try_recv() {
            Ok(change) => Ok(Some(change)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => Err(EventError::Lagged {
                attribute: self.attribute.clone(),
                skipped,
            }),
            Err(broadcast::error::TryRecvError::Closed) => Err(EventError::Closed {
                attribute: self.attribute.clone(),
            }),
        }
    }

    /// Wait for the next change
    pub async fn recv(&mut self) -> Result<Change<T>, EventError> {
        self.rx.recv().await.map_err(|err| match err {
            broadcast::error::RecvError::Lagged(skipped) => EventError::Lagged {
                attribute: self.attribute.clone(),
                skipped,
            },
            broadcast::error::RecvError::Closed => EventError::Closed {
                attribute: self.attribute.clone(),
            },
        })
    }
}
