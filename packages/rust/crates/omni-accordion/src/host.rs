//! Child-view collaborator interface

use crate::error::MaterializeError;
use crate::model::ChildId;
use crate::panel::Ticket;

/// Creates and destroys the child views rendered inside panels.
///
/// Creation is asynchronous: `request_view` only starts the work, and the
/// result is delivered later through
/// [`AccordionView::complete_materialization`](crate::AccordionView::complete_materialization)
/// with the same ticket.
pub trait ChildViewHost {
    /// Handle of a materialized child view
    type View;

    /// Start materializing the child view for `id`
    fn request_view(&mut self, ticket: Ticket, id: &ChildId);

    /// Release a child view and everything it owns
    fn teardown_view(&mut self, id: &ChildId, view: Self::View);
}

/// Host that records requests and teardowns without doing any work.
///
/// Completions are fed back by hand, which makes it the natural driver for
/// tests and for hosts that materialize views synchronously.
#[derive(Debug)]
pub struct RecordingHost<V> {
    /// Requests in the order they were issued
    pub requested: Vec<(Ticket, ChildId)>,
    /// Torn-down views in the order they were released
    pub torn_down: Vec<(ChildId, V)>,
}

impl<V> RecordingHost<V> {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self {
            requested: Vec::new(),
            torn_down: Vec::new(),
        }
    }

    /// Ticket of the most recent request for `id`
    pub fn ticket_for(&self, id: &str) -> Option<Ticket> {
        self.requested
            .iter()
            .rev()
            .find(|(_, child)| child.as_str() == id)
            .map(|(ticket, _)| *ticket)
    }

    /// Identifiers whose views were torn down
    pub fn torn_down_ids(&self) -> Vec<&str> {
        self.torn_down.iter().map(|(id, _)| id.as_str()).collect()
    }
}

impl<V> Default for RecordingHost<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChildViewHost for RecordingHost<V> {
    type View = V;

    fn request_view(&mut self, ticket: Ticket, id: &ChildId) {
        self.requested.push((ticket, id.clone()));
    }

    fn teardown_view(&mut self, id: &ChildId, view: V) {
        self.torn_down.push((id.clone(), view));
    }
}

/// Result of one materialization request, fed back to the view
#[derive(Debug)]
pub struct Completion<V> {
    /// Ticket of the originating request
    pub ticket: Ticket,
    /// Child the view was requested for
    pub id: ChildId,
    /// Materialized view or the collaborator's failure
    pub result: Result<V, MaterializeError>,
}

impl<V> Completion<V> {
    /// Successful completion
    pub fn ready(ticket: Ticket, id: impl Into<ChildId>, view: V) -> Self {
        Self {
            ticket,
            id: id.into(),
            result: Ok(view),
        }
    }

    /// Failed completion
    pub fn failed(ticket: Ticket, id: impl Into<ChildId>, error: MaterializeError) -> Self {
        Self {
            ticket,
            id: id.into(),
            result: Err(error),
        }
    }
}
