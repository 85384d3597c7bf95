//! Panel registry - ordered panels plus identity lookup
//!
//! Ordinal positions are kept contiguous from zero: every insertion or
//! removal renumbers the panels after it. Positions handed to
//! [`PanelRegistry::insert_at`] and [`PanelRegistry::remove_at`] must come
//! from the current length; anything else is a caller bug and panics.

use std::collections::HashMap;

use crate::model::ChildId;
use crate::panel::{PanelWrapper, Ticket};

/// Ordered collection of panels
#[derive(Debug)]
pub struct PanelRegistry<V> {
    panels: Vec<PanelWrapper<V>>,
    positions: HashMap<ChildId, usize>,
}

impl<V> PanelRegistry<V> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            panels: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Number of registered panels
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Insert `panel` at `position`, shifting later panels down by one.
    ///
    /// # Panics
    ///
    /// If `position > len()` or the identifier is already registered.
    pub fn insert_at(&mut self, position: usize, mut panel: PanelWrapper<V>) {
        assert!(
            position <= self.panels.len(),
            "insert position {position} beyond {} panels",
            self.panels.len()
        );
        assert!(
            !self.positions.contains_key(panel.id()),
            "panel {} already registered",
            panel.id()
        );

        panel.ordinal = position;
        self.positions.insert(panel.id().clone(), position);
        self.panels.insert(position, panel);
        self.renumber_from(position + 1);
        self.debug_check();
    }

    /// Remove the panel at `position`, shifting later panels up by one.
    ///
    /// # Panics
    ///
    /// If `position >= len()`.
    pub fn remove_at(&mut self, position: usize) -> PanelWrapper<V> {
        assert!(
            position < self.panels.len(),
            "remove position {position} beyond {} panels",
            self.panels.len()
        );

        let panel = self.panels.remove(position);
        self.positions.remove(panel.id());
        self.renumber_from(position);
        self.debug_check();
        panel
    }

    /// Look up a panel by child identity
    pub fn lookup(&self, id: &ChildId) -> Option<&PanelWrapper<V>> {
        self.positions.get(id).map(|&pos| &self.panels[pos])
    }

    /// Mutable lookup by child identity
    pub fn lookup_mut(&mut self, id: &ChildId) -> Option<&mut PanelWrapper<V>> {
        let pos = *self.positions.get(id)?;
        self.panels.get_mut(pos)
    }

    /// Ordinal of a child, if registered
    pub fn position_of(&self, id: &ChildId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Check whether a child is registered
    pub fn contains(&self, id: &ChildId) -> bool {
        self.positions.contains_key(id)
    }

    /// Panel at `ordinal`
    pub fn get(&self, ordinal: usize) -> Option<&PanelWrapper<V>> {
        self.panels.get(ordinal)
    }

    /// Mutable panel at `ordinal`
    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut PanelWrapper<V>> {
        self.panels.get_mut(ordinal)
    }

    /// Panels in render order
    pub fn iter(&self) -> impl Iterator<Item = &PanelWrapper<V>> {
        self.panels.iter()
    }

    /// Mutable panels in render order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PanelWrapper<V>> {
        self.panels.iter_mut()
    }

    /// Registered identifiers in render order
    pub fn ids(&self) -> Vec<ChildId> {
        self.panels.iter().map(|p| p.id().clone()).collect()
    }

    /// Ordinal of the panel still waiting on `ticket`
    pub fn find_ticket(&self, ticket: Ticket) -> Option<usize> {
        self.panels
            .iter()
            .position(|p| p.pending_ticket() == Some(ticket))
    }

    /// Remove every panel, in render order
    pub fn drain(&mut self) -> Vec<PanelWrapper<V>> {
        self.positions.clear();
        std::mem::take(&mut self.panels)
    }

    /// Verify the structural invariants.
    ///
    /// Sequence and map sizes agree and every ordinal equals its index.
    pub fn is_consistent(&self) -> bool {
        self.panels.len() == self.positions.len()
            && self.panels.iter().enumerate().all(|(index, panel)| {
                panel.ordinal == index && self.positions.get(panel.id()) == Some(&index)
            })
    }

    fn renumber_from(&mut self, start: usize) {
        for (index, panel) in self.panels.iter_mut().enumerate().skip(start) {
            panel.ordinal = index;
            if let Some(pos) = self.positions.get_mut(panel.id()) {
                *pos = index;
            }
        }
    }

    fn debug_check(&self) {
        debug_assert!(self.is_consistent(), "panel registry out of sync");
    }
}

impl<V> Default for PanelRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
