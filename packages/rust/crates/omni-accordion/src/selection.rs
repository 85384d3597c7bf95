//! Selection synchronization
//!
//! Keeps one view's open/closed panels in step with the model's shared
//! selected index. Writes made by this view carry its [`Origin`]; when the
//! resulting notification comes back it is recognised and skipped, because
//! the view already applied the transition locally. Indices outside the
//! current panel range name no panel and are ignored.

use omni_events::{Change, Origin};

use crate::error::{AccordionError, Result};
use crate::model::SelectedIndex;
use crate::panel::OpenState;
use crate::registry::PanelRegistry;

/// One open/close transition applied to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    /// Ordinal of the panel
    pub ordinal: usize,
    /// State it moved to
    pub state: OpenState,
}

/// Result of handling a model notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// The change was written by this view and the panels already reflect it
    Echo,
    /// The change came from elsewhere and these transitions were applied
    Applied(Vec<Toggle>),
}

/// Per-view selection state
#[derive(Debug, Clone)]
pub struct SelectionSync {
    origin: Origin,
    selected: SelectedIndex,
}

impl SelectionSync {
    /// Create the synchronizer for a view writing as `origin`
    pub fn new(origin: Origin, initial: SelectedIndex) -> Self {
        Self {
            origin,
            selected: initial,
        }
    }

    /// Origin marker attached to this view's writes
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Selected index as last observed or written by this view
    pub fn selected(&self) -> SelectedIndex {
        self.selected
    }

    /// Apply a selected index change from the model.
    ///
    /// Closes the panel at the old index and opens the one at the new index,
    /// then closes anything else still open so at most one panel is open.
    /// An echo of this view's own write is skipped unless an external change
    /// replayed in between left the panels out of step with it.
    pub fn on_model_change<V>(
        &mut self,
        registry: &mut PanelRegistry<V>,
        change: &Change<SelectedIndex>,
    ) -> SelectionUpdate {
        self.selected = change.new;
        let target = change.new.resolve(registry.len());
        let mut toggles = Vec::new();

        if change.is_from(self.origin) {
            open_only(registry, target, &mut toggles);
            if toggles.is_empty() {
                return SelectionUpdate::Echo;
            }
            return SelectionUpdate::Applied(toggles);
        }

        // The old index may be stale after a removal
        if let Some(old) = change.old.resolve(registry.len()) {
            set_state(registry, old, OpenState::Closed, &mut toggles);
        }
        open_only(registry, target, &mut toggles);
        SelectionUpdate::Applied(toggles)
    }

    /// User activated the panel at `ordinal`.
    ///
    /// Applies the transition locally and returns the index the caller must
    /// write to the model, tagged with [`Self::origin`].
    pub fn activate<V>(
        &mut self,
        registry: &mut PanelRegistry<V>,
        ordinal: usize,
    ) -> Result<(SelectedIndex, Vec<Toggle>)> {
        let count = registry.len();
        if ordinal >= count {
            return Err(AccordionError::OrdinalOutOfRange { ordinal, count });
        }

        let mut toggles = Vec::new();
        open_only(registry, Some(ordinal), &mut toggles);

        self.selected = SelectedIndex::from(ordinal);
        Ok((self.selected, toggles))
    }

    /// Make the panel at the selected ordinal the only open one.
    ///
    /// Run after structural changes. The index is taken as an ordinal and
    /// is not remapped to follow a moved child.
    pub fn revalidate<V>(&self, registry: &mut PanelRegistry<V>) -> Vec<Toggle> {
        let mut toggles = Vec::new();
        open_only(registry, self.selected.resolve(registry.len()), &mut toggles);
        toggles
    }
}

/// Close every panel except `target`, then open `target`
fn open_only<V>(registry: &mut PanelRegistry<V>, target: Option<usize>, toggles: &mut Vec<Toggle>) {
    for other in (0..registry.len()).filter(|&i| Some(i) != target) {
        set_state(registry, other, OpenState::Closed, toggles);
    }
    if let Some(ordinal) = target {
        set_state(registry, ordinal, OpenState::Open, toggles);
    }
}

fn set_state<V>(
    registry: &mut PanelRegistry<V>,
    ordinal: usize,
    state: OpenState,
    toggles: &mut Vec<Toggle>,
) {
    if let Some(panel) = registry.get_mut(ordinal) {
        if panel.set_state(state) {
            toggles.push(Toggle { ordinal, state });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChildId;
    use crate::panel::{PanelWrapper, Ticket};
    use omni_events::Attribute;

    fn registry(count: usize) -> PanelRegistry<()> {
        let mut registry = PanelRegistry::new();
        for i in 0..count {
            let id = ChildId::new(format!("c{i}"));
            registry.insert_at(i, PanelWrapper::new(id, "", Ticket(i as u64)));
        }
        registry
    }

    fn change(old: SelectedIndex, new: SelectedIndex, origin: Option<Origin>) -> Change<SelectedIndex> {
        let attr = Attribute::new("selected_index", old, 4);
        let mut sub = attr.subscribe();
        attr.set(new, origin);
        sub.try_next().unwrap().unwrap()
    }

    fn open(registry: &PanelRegistry<()>) -> Vec<usize> {
        registry.iter().filter(|p| p.is_open()).map(|p| p.ordinal()).collect()
    }

    #[test]
    fn test_external_change_closes_old_opens_new() {
        let mut registry = registry(3);
        let mut sync = SelectionSync::new(Origin::new(), SelectedIndex::none());

        sync.on_model_change(&mut registry, &change(SelectedIndex::none(), SelectedIndex::at(0), None));
        let update = sync.on_model_change(
            &mut registry,
            &change(SelectedIndex::at(0), SelectedIndex::at(2), Some(Origin::new())),
        );

        assert_eq!(
            update,
            SelectionUpdate::Applied(vec![
                Toggle { ordinal: 0, state: OpenState::Closed },
                Toggle { ordinal: 2, state: OpenState::Open },
            ])
        );
        assert_eq!(open(&registry), vec![2]);
        assert_eq!(sync.selected(), SelectedIndex::at(2));
    }

    #[test]
    fn test_own_echo_is_skipped() {
        let mut registry = registry(3);
        let me = Origin::new();
        let mut sync = SelectionSync::new(me, SelectedIndex::none());

        let (written, toggles) = sync.activate(&mut registry, 1).unwrap();
        assert_eq!(written, SelectedIndex::at(1));
        assert_eq!(toggles, vec![Toggle { ordinal: 1, state: OpenState::Open }]);

        let update = sync.on_model_change(&mut registry, &change(SelectedIndex::none(), written, Some(me)));
        assert_eq!(update, SelectionUpdate::Echo);
        assert_eq!(open(&registry), vec![1]);
    }

    #[test]
    fn test_external_change_closes_locally_opened_panel() {
        let mut registry = registry(3);
        let me = Origin::new();
        let mut sync = SelectionSync::new(me, SelectedIndex::none());
        sync.activate(&mut registry, 2).unwrap();

        // Another view's earlier write arrives after the local activation
        let update = sync.on_model_change(
            &mut registry,
            &change(SelectedIndex::none(), SelectedIndex::at(1), Some(Origin::new())),
        );
        assert_eq!(
            update,
            SelectionUpdate::Applied(vec![
                Toggle { ordinal: 2, state: OpenState::Closed },
                Toggle { ordinal: 1, state: OpenState::Open },
            ])
        );

        // The own write follows and puts the panels back in step with it
        let update = sync.on_model_change(
            &mut registry,
            &change(SelectedIndex::at(1), SelectedIndex::at(2), Some(me)),
        );
        assert_eq!(
            update,
            SelectionUpdate::Applied(vec![
                Toggle { ordinal: 1, state: OpenState::Closed },
                Toggle { ordinal: 2, state: OpenState::Open },
            ])
        );
        assert_eq!(open(&registry), vec![2]);
    }

    #[test]
    fn test_stale_indices_ignored() {
        let mut registry = registry(2);
        let mut sync = SelectionSync::new(Origin::new(), SelectedIndex::none());

        let update = sync.on_model_change(&mut registry, &change(SelectedIndex::at(7), SelectedIndex::at(5), None));

        assert_eq!(update, SelectionUpdate::Applied(Vec::new()));
        assert!(open(&registry).is_empty());
        assert_eq!(sync.selected(), SelectedIndex::at(5));
    }

    #[test]
    fn test_activate_out_of_range() {
        let mut registry = registry(2);
        let mut sync = SelectionSync::new(Origin::new(), SelectedIndex::none());

        let err = sync.activate(&mut registry, 2).unwrap_err();
        assert_eq!(err, AccordionError::OrdinalOutOfRange { ordinal: 2, count: 2 });
        assert_eq!(sync.selected(), SelectedIndex::none());
    }

    #[test]
    fn test_activate_open_panel_keeps_it_open() {
        let mut registry = registry(2);
        let mut sync = SelectionSync::new(Origin::new(), SelectedIndex::none());
        sync.activate(&mut registry, 0).unwrap();

        let (_, toggles) = sync.activate(&mut registry, 0).unwrap();
        assert!(toggles.is_empty());
        assert_eq!(open(&registry), vec![0]);
    }

    #[test]
    fn test_revalidate_uses_ordinal() {
        let mut registry = registry(3);
        let mut sync = SelectionSync::new(Origin::new(), SelectedIndex::none());
        sync.activate(&mut registry, 2).unwrap();

        registry.remove_at(0);
        // Index 2 is now out of range: nothing stays open
        let toggles = sync.revalidate(&mut registry);
        assert_eq!(toggles, vec![Toggle { ordinal: 1, state: OpenState::Closed }]);
        assert!(open(&registry).is_empty());
    }
}
