//! Child list reconciliation
//!
//! Brings the panel registry in line with a newly observed child list:
//!
//! 1. Reject lists that name an identifier twice (registry untouched).
//! 2. Remove panels whose identifier left the list, tearing down their views.
//! 3. Walk the new list by position. Matching panels stay; missing
//!    identifiers get a new pending panel at that position; an identifier
//!    found at another position is removed and added again as a new entry.
//!
//! Afterwards the registry order equals the list order exactly.

use std::collections::HashSet;

use crate::config::AccordionConfig;
use crate::error::{AccordionError, Result};
use crate::host::ChildViewHost;
use crate::model::ChildId;
use crate::panel::{PanelWrapper, Ticket};
use crate::registry::PanelRegistry;

/// Structural changes applied by one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Identifiers that left the list
    pub removed: Vec<ChildId>,
    /// New panels and the ordinal they were inserted at
    pub added: Vec<(ChildId, usize)>,
    /// Identifiers that changed position and were re-added
    pub relocated: Vec<ChildId>,
}

impl ReconcileOutcome {
    /// True when nothing changed
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Applies child list changes to a registry
#[derive(Debug, Default)]
pub struct Reconciler {
    last_ticket: u64,
}

impl Reconciler {
    /// Create a reconciler
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile `registry` against `next`.
    pub fn reconcile<H: ChildViewHost>(
        &mut self,
        registry: &mut PanelRegistry<H::View>,
        next: &[ChildId],
        host: &mut H,
        config: &AccordionConfig,
    ) -> Result<ReconcileOutcome> {
        if let Some(dup) = find_duplicate(next) {
            return Err(AccordionError::DuplicateChild(dup.clone()));
        }

        let mut outcome = ReconcileOutcome::default();
        let wanted: HashSet<&ChildId> = next.iter().collect();

        for id in registry.ids() {
            if wanted.contains(&id) {
                continue;
            }
            if let Some(pos) = registry.position_of(&id) {
                let panel = registry.remove_at(pos);
                detach(panel, host);
                log::debug!("Removed panel {id} at {pos}");
                outcome.removed.push(id);
            }
        }

        for (pos, id) in next.iter().enumerate() {
            if registry.get(pos).is_some_and(|p| p.id() == id) {
                continue;
            }

            if let Some(current) = registry.position_of(id) {
                let panel = registry.remove_at(current);
                detach(panel, host);
                log::debug!("Relocating panel {id} from {current} to {pos}");
                outcome.relocated.push(id.clone());
            }

            let ticket = self.issue_ticket();
            registry.insert_at(pos, PanelWrapper::new(id.clone(), config.default_label(pos), ticket));
            host.request_view(ticket, id);
            log::debug!("Added panel {id} at {pos}, awaiting view {ticket}");
            outcome.added.push((id.clone(), pos));
        }

        debug_assert_eq!(registry.len(), next.len());
        Ok(outcome)
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        Ticket(self.last_ticket)
    }
}

/// First identifier that appears more than once
pub fn find_duplicate(list: &[ChildId]) -> Option<&ChildId> {
    let mut seen = HashSet::with_capacity(list.len());
    list.iter().find(|id| !seen.insert(*id))
}

/// Release whatever a removed panel owns.
///
/// A ready view goes back to the host; a pending request is simply
/// forgotten, so its completion will find no matching ticket.
pub(crate) fn detach<H: ChildViewHost>(panel: PanelWrapper<H::View>, host: &mut H) {
    if let Some(ticket) = panel.pending_ticket() {
        log::debug!("Cancelled pending view {ticket} for {}", panel.id());
        return;
    }
    let id = panel.id().clone();
    if let Some(view) = panel.into_view() {
        host.teardown_view(&id, view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    fn ids(list: &[&str]) -> Vec<ChildId> {
        list.iter().map(|s| ChildId::from(*s)).collect()
    }

    fn run(
        reconciler: &mut Reconciler,
        registry: &mut PanelRegistry<String>,
        host: &mut RecordingHost<String>,
        next: &[&str],
    ) -> ReconcileOutcome {
        reconciler
            .reconcile(registry, &ids(next), host, &AccordionConfig::default())
            .unwrap()
    }

    #[test]
    fn test_additions_request_views_in_order() {
        let mut reconciler = Reconciler::new();
        let mut registry = PanelRegistry::new();
        let mut host = RecordingHost::new();

        let outcome = run(&mut reconciler, &mut registry, &mut host, &["a", "b", "c"]);

        assert_eq!(registry.ids(), ids(&["a", "b", "c"]));
        assert_eq!(outcome.added.len(), 3);
        assert_eq!(outcome.added[2], (ChildId::from("c"), 2));
        let requested: Vec<&str> = host.requested.iter().map(|(_, id)| id.as_str()).collect();
        assert_eq!(requested, vec!["a", "b", "c"]);
        assert!(registry.iter().all(|p| p.is_pending() && !p.is_open()));
        assert_eq!(registry.get(1).unwrap().label(), "Page 1");
    }

    #[test]
    fn test_unchanged_list_is_noop() {
        let mut reconciler = Reconciler::new();
        let mut registry = PanelRegistry::new();
        let mut host = RecordingHost::new();
        run(&mut reconciler, &mut registry, &mut host, &["a", "b"]);

        let outcome = run(&mut reconciler, &mut registry, &mut host, &["a", "b"]);
        assert!(outcome.is_noop());
        assert_eq!(host.requested.len(), 2);
    }

    #[test]
    fn test_removal_tears_down_ready_view() {
        let mut reconciler = Reconciler::new();
        let mut registry = PanelRegistry::new();
        let mut host = RecordingHost::new();
        run(&mut reconciler, &mut registry, &mut host, &["a", "b", "c"]);
        registry
            .lookup_mut(&ChildId::from("b"))
            .unwrap()
            .fulfill("view-b".to_string())
            .unwrap();

        let outcome = run(&mut reconciler, &mut registry, &mut host, &["a", "c"]);

        assert_eq!(outcome.removed, ids(&["b"]));
        assert_eq!(host.torn_down, vec![(ChildId::from("b"), "view-b".to_string())]);
        assert_eq!(registry.position_of(&ChildId::from("c")), Some(1));
    }

    #[test]
    fn test_pending_removal_is_cancelled_silently() {
        let mut reconciler = Reconciler::new();
        let mut registry = PanelRegistry::new();
        let mut host = RecordingHost::new();
        run(&mut reconciler, &mut registry, &mut host, &["a"]);
        let ticket = host.ticket_for("a").unwrap();

        run(&mut reconciler, &mut registry, &mut host, &[]);

        assert!(registry.is_empty());
        assert!(host.torn_down.is_empty());
        assert_eq!(registry.find_ticket(ticket), None);
    }

    #[test]
    fn test_reorder_is_remove_then_add() {
        let mut reconciler = Reconciler::new();
        let mut registry = PanelRegistry::new();
        let mut host = RecordingHost::new();
        run(&mut reconciler, &mut registry, &mut host, &["a", "b", "c"]);
        let first_ticket = host.ticket_for("c").unwrap();

        let outcome = run(&mut reconciler, &mut registry, &mut host, &["c", "a", "b"]);

        assert_eq!(registry.ids(), ids(&["c", "a", "b"]));
        assert_eq!(outcome.relocated, ids(&["c"]));
        assert!(outcome.removed.is_empty());
        assert_ne!(host.ticket_for("c"), Some(first_ticket));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_replacement_keeps_position() {
        let mut reconciler = Reconciler::new();
        let mut registry = PanelRegistry::new();
        let mut host = RecordingHost::new();
        run(&mut reconciler, &mut registry, &mut host, &["a", "b", "c"]);

        let outcome = run(&mut reconciler, &mut registry, &mut host, &["a", "x", "c"]);

        assert_eq!(outcome.removed, ids(&["b"]));
        assert_eq!(outcome.added, vec![(ChildId::from("x"), 1)]);
        assert_eq!(registry.ids(), ids(&["a", "x", "c"]));
    }

    #[test]
    fn test_duplicates_rejected_without_mutation() {
        let mut reconciler = Reconciler::new();
        let mut registry = PanelRegistry::new();
        let mut host = RecordingHost::new();
        run(&mut reconciler, &mut registry, &mut host, &["a"]);

        let err = reconciler
            .reconcile(&mut registry, &ids(&["b", "c", "b"]), &mut host, &AccordionConfig::default())
            .unwrap_err();

        assert_eq!(err, AccordionError::DuplicateChild(ChildId::from("b")));
        assert_eq!(registry.ids(), ids(&["a"]));
        assert_eq!(host.requested.len(), 1);
    }

    #[test]
    fn test_find_duplicate() {
        assert_eq!(find_duplicate(&ids(&["a", "b"])), None);
        assert_eq!(find_duplicate(&ids(&["a", "b", "a"])), Some(&ChildId::from("a")));
    }
}
