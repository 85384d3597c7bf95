//! Asynchronous child-view materialization
//!
//! [`Materializer`] turns a [`ChildViewFactory`] into a [`ChildViewHost`]:
//! every request becomes a future in a `FuturesUnordered` set, so any
//! number can be in flight and they complete in whatever order they finish.
//! Everything runs on the caller's thread; nothing here spawns.

use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;

use crate::error::MaterializeError;
use crate::host::{ChildViewHost, Completion};
use crate::model::ChildId;
use crate::panel::Ticket;

/// Produces child views for child models
pub trait ChildViewFactory {
    /// Child view handle
    type View: 'static;

    /// Start creating the view for `id`
    fn create(&self, id: &ChildId) -> LocalBoxFuture<'static, Result<Self::View, MaterializeError>>;

    /// Release a view created by this factory
    fn destroy(&self, id: &ChildId, view: Self::View) {
        log::trace!("Dropping child view for {id}");
        drop(view);
    }
}

/// Host that materializes views through a factory
pub struct Materializer<F: ChildViewFactory> {
    factory: F,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion<F::View>>>,
}

impl<F: ChildViewFactory> Materializer<F> {
    /// Create a materializer around `factory`
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            in_flight: FuturesUnordered::new(),
        }
    }

    /// The wrapped factory
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Number of requests not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait for the next request to finish.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion<F::View>> {
        self.in_flight.next().await
    }

    /// Take a finished request without waiting
    pub fn try_next_completion(&mut self) -> Option<Completion<F::View>> {
        self.in_flight.next().now_or_never().flatten()
    }
}

impl<F: ChildViewFactory> ChildViewHost for Materializer<F> {
    type View = F::View;

    fn request_view(&mut self, ticket: Ticket, id: &ChildId) {
        let pending = self.factory.create(id);
        let id = id.clone();
        self.in_flight.push(
            async move {
                let result = pending.await;
                Completion { ticket, id, result }
            }
            .boxed_local(),
        );
    }

    fn teardown_view(&mut self, id: &ChildId, view: F::View) {
        self.factory.destroy(id, view);
    }
}

impl<F: ChildViewFactory + fmt::Debug> fmt::Debug for Materializer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer")
            .field("factory", &self.factory)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}
