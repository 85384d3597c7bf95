use std::fmt;

use crate::error::MaterializeError;
use crate::model::ChildId;

/// Open/closed state of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    /// Body visible
    Open,
    /// Only the header visible
    Closed,
}

/// Identity of one child-view materialization request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    /// Raw ticket number
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Body of a panel.
///
/// `Pending` is the placeholder slot; it moves to `Ready` or `Failed` exactly once.
#[derive(Debug)]
pub enum PanelContent<V> {
    /// Child view requested, placeholder shown
    Pending {
        /// Request awaiting completion
        ticket: Ticket,
    },
    /// Child view materialized
    Ready(V),
    /// Materialization failed; the placeholder stays for good
    Failed(MaterializeError),
}

/// One collapsible panel bound to a child model
#[derive(Debug)]
pub struct PanelWrapper<V> {
    id: ChildId,
    pub(crate) ordinal: usize,
    open: OpenState,
    label: String,
    content: PanelContent<V>,
}

impl<V> PanelWrapper<V> {
    /// Create a closed panel waiting on `ticket`
    pub fn new(id: ChildId, label: impl Into<String>, ticket: Ticket) -> Self {
        Self {
            id,
            ordinal: 0,
            open: OpenState::Closed,
            label: label.into(),
            content: PanelContent::Pending { ticket },
        }
    }

    /// Child model identity
    pub fn id(&self) -> &ChildId {
        &self.id
    }

    /// Position in render order
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Get panel state
    pub fn state(&self) -> OpenState {
        self.open
    }

    /// Check if the panel is open
    pub fn is_open(&self) -> bool {
        self.open == OpenState::Open
    }

    /// Set the open state. Returns true if it changed.
    pub fn set_state(&mut self, state: OpenState) -> bool {
        let changed = self.open != state;
        self.open = state;
        changed
    }

    /// Visible header label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the header label. Returns true if it changed.
    pub fn set_label(&mut self, label: &str) -> bool {
        if self.label == label {
            return false;
        }
        self.label = label.to_string();
        true
    }

    /// Panel body
    pub fn content(&self) -> &PanelContent<V> {
        &self.content
    }

    /// Materialized child view, if any
    pub fn view(&self) -> Option<&V> {
        match &self.content {
            PanelContent::Ready(view) => Some(view),
            _ => None,
        }
    }

    /// Ticket of the outstanding request, if still pending
    pub fn pending_ticket(&self) -> Option<Ticket> {
        match self.content {
            PanelContent::Pending { ticket } => Some(ticket),
            _ => None,
        }
    }

    /// Check if the child view is still materializing
    pub fn is_pending(&self) -> bool {
        self.pending_ticket().is_some()
    }

    /// Swap the placeholder for the materialized view.
    ///
    /// Hands the view back if the panel is no longer pending.
    pub(crate) fn fulfill(&mut self, view: V) -> Result<(), V> {
        if !self.is_pending() {
            return Err(view);
        }
        self.content = PanelContent::Ready(view);
        Ok(())
    }

    /// Mark the placeholder as permanent after a failed materialization
    pub(crate) fn fail(&mut self, error: MaterializeError) {
        if self.is_pending() {
            self.content = PanelContent::Failed(error);
        }
    }

    /// Release the child view for teardown
    pub(crate) fn into_view(self) -> Option<V> {
        match self.content {
            PanelContent::Ready(view) => Some(view),
            _ => None,
        }
    }
}
