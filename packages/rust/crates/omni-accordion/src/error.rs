//! Error types for accordion views.
//!
//! Externally triggered conditions (failed materialization, stale indices)
//! are reported as values and signals; these enums never cross the event
//! boundary as panics.

use omni_events::EventError;
use thiserror::Error;

use crate::model::ChildId;

/// Accordion-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccordionError {
    /// The child list named the same identifier twice.
    #[error("Duplicate child identifier: {0}")]
    DuplicateChild(ChildId),

    /// A user-driven activation pointed outside the current panels.
    #[error("Ordinal {ordinal} out of range for {count} panels")]
    OrdinalOutOfRange {
        /// Requested ordinal position
        ordinal: usize,
        /// Current panel count
        count: usize,
    },

    /// The view was already torn down.
    #[error("View has been torn down")]
    TornDown,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Model notification channel failure.
    #[error("Event channel error: {0}")]
    Events(#[from] EventError),
}

/// Failure reported by the child-view collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Couldn't create child view: {reason}")]
pub struct MaterializeError {
    /// Collaborator-supplied reason
    pub reason: String,
}

impl MaterializeError {
    /// Create a materialization error with a reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Result type for accordion operations.
pub type Result<T> = std::result::Result<T, AccordionError>;
