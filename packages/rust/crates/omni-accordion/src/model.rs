//! Shared accordion model
//!
//! The single source of truth observed by every view instance: the ordered
//! child list, the selected index and the title sequence. All three
//! attributes share one clock so a view can replay their changes in write order.

use omni_events::{Attribute, Clock, Origin, Subscription};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::AccordionConfig;

/// Attribute name of the ordered child list
pub const CHILDREN: &str = "children";
/// Attribute name of the selected index
pub const SELECTED_INDEX: &str = "selected_index";
/// Attribute name of the title sequence
pub const TITLES: &str = "_titles";

/// Stable identity of a child model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChildId(String);

impl ChildId {
    /// Create an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChildId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChildId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Selected panel index as stored on the model.
///
/// Any integer is representable; only `0 <= idx < panel_count` names a
/// panel. Everything else (including the conventional `-1`) resolves to no panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectedIndex(Option<i64>);

impl SelectedIndex {
    /// No selection
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Raw index value
    #[must_use]
    pub const fn at(index: i64) -> Self {
        Self(Some(index))
    }

    /// Raw value, if any
    #[must_use]
    pub const fn get(self) -> Option<i64> {
        self.0
    }

    /// Ordinal this index names among `panel_count` panels, if in range.
    #[must_use]
    pub fn resolve(self, panel_count: usize) -> Option<usize> {
        let index = usize::try_from(self.0?).ok()?;
        (index < panel_count).then_some(index)
    }
}

impl From<usize> for SelectedIndex {
    fn from(ordinal: usize) -> Self {
        Self(i64::try_from(ordinal).ok())
    }
}

impl fmt::Display for SelectedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(index) => write!(f, "{index}"),
            None => f.write_str("none"),
        }
    }
}

/// Model shared by all views of one accordion
#[derive(Debug)]
pub struct AccordionModel {
    children: Attribute<Vec<ChildId>>,
    selected_index: Attribute<SelectedIndex>,
    titles: Attribute<Vec<String>>,
    config: AccordionConfig,
}

impl AccordionModel {
    /// Create an empty model with no selection
    #[must_use]
    pub fn new(config: AccordionConfig) -> Arc<Self> {
        let clock = Clock::new();
        let capacity = config.event_capacity;
        Arc::new(Self {
            children: Attribute::with_clock(CHILDREN, Vec::new(), capacity, clock.clone()),
            selected_index: Attribute::with_clock(
                SELECTED_INDEX,
                SelectedIndex::none(),
                capacity,
                clock.clone(),
            ),
            titles: Attribute::with_clock(TITLES, Vec::new(), capacity, clock),
            config,
        })
    }

    /// Configuration the model was built with
    pub fn config(&self) -> &AccordionConfig {
        &self.config
    }

    /// Current ordered child list
    pub fn children(&self) -> Vec<ChildId> {
        self.children.get()
    }

    /// Replace the ordered child list
    pub fn set_children(&self, children: Vec<ChildId>) -> bool {
        self.children.set(children, None)
    }

    /// Append a child. Ignored if the identifier is already listed.
    pub fn push_child(&self, id: impl Into<ChildId>) -> bool {
        let id = id.into();
        self.children.update(
            |children| {
                if !children.contains(&id) {
                    children.push(id);
                }
            },
            None,
        )
    }

    /// Remove a child from the list
    pub fn remove_child(&self, id: &ChildId) -> bool {
        self.children.update(|children| children.retain(|c| c != id), None)
    }

    /// Replace one child identifier in place, keeping its position
    pub fn replace_child(&self, old: &ChildId, new: impl Into<ChildId>) -> bool {
        let new = new.into();
        self.children.update(
            |children| {
                if let Some(slot) = children.iter_mut().find(|c| *c == old) {
                    *slot = new;
                }
            },
            None,
        )
    }

    /// Current selected index
    pub fn selected_index(&self) -> SelectedIndex {
        self.selected_index.get()
    }

    /// Write the selected index on behalf of `origin`
    pub fn select(&self, index: SelectedIndex, origin: Option<Origin>) -> bool {
        self.selected_index.set(index, origin)
    }

    /// Current title sequence
    pub fn titles(&self) -> Vec<String> {
        self.titles.get()
    }

    /// Replace the title sequence
    pub fn set_titles(&self, titles: Vec<String>) -> bool {
        self.titles.set(titles, None)
    }

    /// Title stored for `index`
    pub fn title(&self, index: usize) -> Option<String> {
        self.titles.get().get(index).cloned()
    }

    /// Set one title. Gaps before `index` are filled with default labels.
    pub fn set_title(&self, index: usize, title: impl Into<String>) -> bool {
        let title = title.into();
        self.titles.update(
            |titles| {
                while titles.len() < index {
                    titles.push(self.config.default_label(titles.len()));
                }
                if index == titles.len() {
                    titles.push(title);
                } else {
                    titles[index] = title;
                }
            },
            None,
        )
    }

    /// Subscribe to child list changes
    pub fn subscribe_children(&self) -> Subscription<Vec<ChildId>> {
        self.children.subscribe()
    }

    /// Subscribe to selected index changes
    pub fn subscribe_selected_index(&self) -> Subscription<SelectedIndex> {
        self.selected_index.subscribe()
    }

    /// Subscribe to title changes
    pub fn subscribe_titles(&self) -> Subscription<Vec<String>> {
        self.titles.subscribe()
    }
}
