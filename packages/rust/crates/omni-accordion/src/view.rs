//! Accordion view - one rendered instance of a shared model
//!
//! Owns the panel registry and applies the three kinds of input a view
//! receives: child list changes, title changes and selected index changes,
//! plus user activation and asynchronous child-view completions. Every
//! visible effect is published as a [`ViewEvent`] to subscribers.

use omni_events::{Change, Origin};
use tokio::sync::broadcast;

use crate::config::AccordionConfig;
use crate::error::{AccordionError, MaterializeError, Result};
use crate::host::{ChildViewHost, Completion};
use crate::model::{ChildId, SelectedIndex};
use crate::panel::PanelWrapper;
use crate::reconcile::{self, ReconcileOutcome, Reconciler};
use crate::registry::PanelRegistry;
use crate::selection::{SelectionSync, SelectionUpdate, Toggle};
use crate::titles::project_titles;

/// Signals published by a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Panels were added or removed; `ids[i]` is the child at ordinal `i`
    StructureChanged {
        /// Identifiers in render order
        ids: Vec<ChildId>,
    },
    /// Panel labels changed
    TitlesChanged {
        /// Ordinals whose label changed
        ordinals: Vec<usize>,
    },
    /// Panels opened or closed
    SelectionChanged {
        /// Selected index the view now reflects
        selected: SelectedIndex,
        /// Transitions applied
        toggles: Vec<Toggle>,
    },
    /// A placeholder was replaced by its child view
    ChildViewReady {
        /// Child identity
        id: ChildId,
        /// Panel ordinal at completion time
        ordinal: usize,
    },
    /// A child view could not be created; its placeholder stays
    ChildViewFailed {
        /// Child identity
        id: ChildId,
        /// Collaborator failure
        error: MaterializeError,
    },
    /// A child list was refused and the panels were left as they were
    ChildListRejected {
        /// Why the list was refused
        error: AccordionError,
    },
    /// Every child view was released
    TornDown,
}

/// One view instance over an accordion model
#[derive(Debug)]
pub struct AccordionView<V> {
    config: AccordionConfig,
    registry: PanelRegistry<V>,
    reconciler: Reconciler,
    selection: SelectionSync,
    titles: Vec<String>,
    events: broadcast::Sender<ViewEvent>,
    torn_down: bool,
}

impl<V> AccordionView<V> {
    /// Create an empty view writing as `origin`
    pub fn new(origin: Origin, config: AccordionConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            config,
            registry: PanelRegistry::new(),
            reconciler: Reconciler::new(),
            selection: SelectionSync::new(origin, SelectedIndex::none()),
            titles: Vec::new(),
            events,
            torn_down: false,
        }
    }

    /// Origin marker of this view's writes
    pub fn origin(&self) -> Origin {
        self.selection.origin()
    }

    /// View configuration
    pub fn config(&self) -> &AccordionConfig {
        &self.config
    }

    /// Subscribe to this view's signals
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Number of panels
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if there are no panels
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Panel at `ordinal`
    pub fn panel(&self, ordinal: usize) -> Option<&PanelWrapper<V>> {
        self.registry.get(ordinal)
    }

    /// Panels in render order
    pub fn panels(&self) -> impl Iterator<Item = &PanelWrapper<V>> {
        self.registry.iter()
    }

    /// Underlying registry
    pub fn registry(&self) -> &PanelRegistry<V> {
        &self.registry
    }

    /// Child identifiers in render order
    pub fn ids(&self) -> Vec<ChildId> {
        self.registry.ids()
    }

    /// Panel labels in render order
    pub fn labels(&self) -> Vec<&str> {
        self.registry.iter().map(PanelWrapper::label).collect()
    }

    /// Ordinals of open panels
    pub fn open_ordinals(&self) -> Vec<usize> {
        self.registry
            .iter()
            .filter(|p| p.is_open())
            .map(PanelWrapper::ordinal)
            .collect()
    }

    /// Selected index this view reflects
    pub fn selected(&self) -> SelectedIndex {
        self.selection.selected()
    }

    /// Check if [`Self::teardown`] has run
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Reconcile the panels with a new child list.
    ///
    /// On structural change, titles are re-projected and the open panel is
    /// revalidated. A rejected list leaves every panel untouched.
    pub fn sync_children<H>(&mut self, next: &[ChildId], host: &mut H) -> Result<ReconcileOutcome>
    where
        H: ChildViewHost<View = V>,
    {
        if self.torn_down {
            return Err(AccordionError::TornDown);
        }

        let outcome = match self
            .reconciler
            .reconcile(&mut self.registry, next, host, &self.config)
        {
            Ok(outcome) => outcome,
            Err(error) => {
                log::error!("Rejected child list: {error}");
                self.emit(ViewEvent::ChildListRejected {
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        if !outcome.is_noop() {
            self.emit(ViewEvent::StructureChanged {
                ids: self.registry.ids(),
            });
            self.refresh();
        }
        Ok(outcome)
    }

    /// Project a title sequence onto the panels.
    ///
    /// The sequence is kept and re-applied after later structural changes.
    pub fn apply_titles(&mut self, titles: &[String]) -> Vec<usize> {
        self.titles = titles.to_vec();
        let changed = project_titles(&mut self.registry, &self.titles);
        if !changed.is_empty() {
            self.emit(ViewEvent::TitlesChanged {
                ordinals: changed.clone(),
            });
        }
        changed
    }

    /// Handle a selected index notification from the model
    pub fn on_selected_index_change(&mut self, change: &Change<SelectedIndex>) -> SelectionUpdate {
        let update = self.selection.on_model_change(&mut self.registry, change);
        match &update {
            SelectionUpdate::Echo => {
                log::trace!("Skipped own selection echo {}", change.new);
            }
            SelectionUpdate::Applied(toggles) => self.emit_selection(toggles.clone()),
        }
        update
    }

    /// Adopt `selected` without a change notification, e.g. at first render
    pub fn reset_selection(&mut self, selected: SelectedIndex) {
        self.selection = SelectionSync::new(self.selection.origin(), selected);
        let toggles = self.selection.revalidate(&mut self.registry);
        self.emit_selection(toggles);
    }

    /// User activated the panel at `ordinal`.
    ///
    /// Returns the index to write to the model under [`Self::origin`].
    pub fn activate(&mut self, ordinal: usize) -> Result<SelectedIndex> {
        if self.torn_down {
            return Err(AccordionError::TornDown);
        }
        let (selected, toggles) = self.selection.activate(&mut self.registry, ordinal)?;
        self.emit_selection(toggles);
        Ok(selected)
    }

    /// Deliver the result of a materialization request.
    ///
    /// Returns true if a panel consumed it. Completions for cancelled
    /// requests touch no panel; a view created for one is torn down.
    pub fn complete_materialization<H>(&mut self, completion: Completion<V>, host: &mut H) -> bool
    where
        H: ChildViewHost<View = V>,
    {
        let Completion { ticket, id, result } = completion;
        let Some(ordinal) = self.registry.find_ticket(ticket) else {
            log::debug!("Dropping completion {ticket} for {id}: request was cancelled");
            if let Ok(view) = result {
                host.teardown_view(&id, view);
            }
            return false;
        };

        let Some(panel) = self.registry.get_mut(ordinal) else {
            return false;
        };
        match result {
            Ok(view) => {
                if let Err(view) = panel.fulfill(view) {
                    host.teardown_view(&id, view);
                    return false;
                }
                self.emit(ViewEvent::ChildViewReady { id, ordinal });
            }
            Err(error) => {
                log::warn!("Couldn't add child view {id} to accordion: {error}");
                panel.fail(error.clone());
                self.emit(ViewEvent::ChildViewFailed { id, error });
            }
        }
        true
    }

    /// Tear down every panel's child view and release the registry.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: ChildViewHost<View = V>,
    {
        if self.torn_down {
            return;
        }
        let panels = self.registry.drain();
        log::debug!("Tearing down accordion with {} panels", panels.len());
        for panel in panels {
            reconcile::detach(panel, host);
        }
        self.torn_down = true;
        self.emit(ViewEvent::TornDown);
    }

    fn refresh(&mut self) {
        let changed = project_titles(&mut self.registry, &self.titles);
        if !changed.is_empty() {
            self.emit(ViewEvent::TitlesChanged { ordinals: changed });
        }
        let toggles = self.selection.revalidate(&mut self.registry);
        self.emit_selection(toggles);
    }

    fn emit_selection(&self, toggles: Vec<Toggle>) {
        if toggles.is_empty() {
            return;
        }
        self.emit(ViewEvent::SelectionChanged {
            selected: self.selection.selected(),
            toggles,
        });
    }

    fn emit(&self, event: ViewEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}
