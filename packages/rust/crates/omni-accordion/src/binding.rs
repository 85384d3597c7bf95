//! Binding between a shared model and one view instance
//!
//! # Architecture
//!
//! ```text
//! AccordionModel (children, selected_index, _titles)
//!      ↓ one Subscription per attribute
//! process_pending(): drain, merge by seq, apply in write order
//!      ↓
//! AccordionView → ViewEvent signals
//!      ↑
//! activate(i): apply locally, then model.select(i, Some(origin))
//! ```

use omni_events::{Change, EventError, Origin, Subscription};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::host::{ChildViewHost, Completion};
use crate::materialize::{ChildViewFactory, Materializer};
use crate::model::{AccordionModel, ChildId, SelectedIndex};
use crate::view::{AccordionView, ViewEvent};

/// A model notification of any attribute
#[derive(Debug)]
enum ModelEvent {
    Children(Change<Vec<ChildId>>),
    Selected(Change<SelectedIndex>),
    Titles(Change<Vec<String>>),
}

impl ModelEvent {
    fn seq(&self) -> u64 {
        match self {
            Self::Children(c) => c.seq,
            Self::Selected(c) => c.seq,
            Self::Titles(c) => c.seq,
        }
    }
}

/// One view kept in sync with a shared model
pub struct AccordionBinding<H: ChildViewHost> {
    model: Arc<AccordionModel>,
    view: AccordionView<H::View>,
    host: H,
    children: Subscription<Vec<ChildId>>,
    selected: Subscription<SelectedIndex>,
    titles: Subscription<Vec<String>>,
}

impl<H: ChildViewHost> AccordionBinding<H> {
    /// Attach a new view to `model` and render its current state.
    ///
    /// Subscriptions are taken before the first render so no change made
    /// afterwards is missed.
    pub fn attach(model: Arc<AccordionModel>, host: H) -> Self {
        let children = model.subscribe_children();
        let selected = model.subscribe_selected_index();
        let titles = model.subscribe_titles();
        let view = AccordionView::new(Origin::new(), model.config().clone());

        let mut binding = Self {
            model,
            view,
            host,
            children,
            selected,
            titles,
        };
        log::debug!("Attached accordion view {}", binding.origin());
        binding.resync();
        binding
    }

    /// Origin marker of this binding's view
    pub fn origin(&self) -> Origin {
        self.view.origin()
    }

    /// Shared model
    pub fn model(&self) -> &Arc<AccordionModel> {
        &self.model
    }

    /// The bound view
    pub fn view(&self) -> &AccordionView<H::View> {
        &self.view
    }

    /// Child-view host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable child-view host
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Subscribe to the view's signals
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.view.subscribe()
    }

    /// Apply every queued model notification in write order.
    ///
    /// Returns the number of notifications applied. Failures caused by the
    /// notifications themselves are logged and signalled, never returned.
    /// A lagged subscription falls back to a full resync instead, which
    /// applies no individual notification and returns 0.
    pub fn process_pending(&mut self) -> Result<usize> {
        let mut batch = Vec::new();
        let mut lagged = false;

        lagged |= drain(&mut self.children, ModelEvent::Children, &mut batch)?;
        lagged |= drain(&mut self.selected, ModelEvent::Selected, &mut batch)?;
        lagged |= drain(&mut self.titles, ModelEvent::Titles, &mut batch)?;

        if lagged {
            log::warn!("View {} fell behind the model, resyncing", self.origin());
            self.resync();
            return Ok(0);
        }

        batch.sort_by_key(ModelEvent::seq);
        let applied = batch.len();
        for event in batch {
            self.apply(event);
        }
        Ok(applied)
    }

    /// User activated the panel at `ordinal`.
    ///
    /// The view reflects the selection immediately; the model write carries
    /// this view's origin so the echo is skipped here and applied elsewhere.
    pub fn activate(&mut self, ordinal: usize) -> Result<()> {
        let selected = self.view.activate(ordinal)?;
        self.model.select(selected, Some(self.origin()));
        Ok(())
    }

    /// Deliver a materialization result to the view
    pub fn complete(&mut self, completion: Completion<H::View>) -> bool {
        self.view.complete_materialization(completion, &mut self.host)
    }

    /// Tear down every child view
    pub fn teardown(&mut self) {
        self.view.teardown(&mut self.host);
    }

    /// Render the model's current values from scratch
    pub fn resync(&mut self) {
        self.view.reset_selection(self.model.selected_index());
        // A rejected list is already logged and signalled by the view
        let _ = self.view.sync_children(&self.model.children(), &mut self.host);
        self.view.apply_titles(&self.model.titles());
    }

    fn apply(&mut self, event: ModelEvent) {
        match event {
            ModelEvent::Children(change) => {
                let _ = self.view.sync_children(&change.new, &mut self.host);
            }
            ModelEvent::Selected(change) => {
                self.view.on_selected_index_change(&change);
            }
            ModelEvent::Titles(change) => {
                self.view.apply_titles(&change.new);
            }
        }
    }
}

impl<F: ChildViewFactory> AccordionBinding<Materializer<F>> {
    /// Apply every materialization that has already finished
    pub fn poll_materialized(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.host.try_next_completion() {
            self.view.complete_materialization(completion, &mut self.host);
            applied += 1;
        }
        applied
    }

    /// Wait for one materialization and apply it.
    ///
    /// Returns false when nothing was in flight.
    pub async fn next_materialized(&mut self) -> bool {
        match self.host.next_completion().await {
            Some(completion) => {
                self.view.complete_materialization(completion, &mut self.host);
                true
            }
            None => false,
        }
    }

    /// Drive materializations until none are in flight
    pub async fn settle(&mut self) {
        while self.next_materialized().await {}
    }
}

/// Move queued changes into `batch`. Returns true if the subscription lagged.
fn drain<T: Clone>(
    subscription: &mut Subscription<T>,
    wrap: fn(Change<T>) -> ModelEvent,
    batch: &mut Vec<ModelEvent>,
) -> Result<bool> {
    loop {
        match subscription.try_next() {
            Ok(Some(change)) => batch.push(wrap(change)),
            Ok(None) => return Ok(false),
            Err(EventError::Lagged { skipped, .. }) => {
                log::warn!(
                    "Subscription to {} lagged by {skipped}",
                    subscription.attribute()
                );
                // Keep draining so the receiver is current before the resync
                while let Ok(Some(_)) | Err(EventError::Lagged { .. }) = subscription.try_next() {}
                return Ok(true);
            }
            Err(err) => return Err(err.into()),
        }
    }
}
