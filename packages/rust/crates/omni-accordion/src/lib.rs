//! omni-accordion - Accordion view core over a shared observable model
//!
//! A model holds an ordered list of child identifiers, a selected index and
//! optional panel titles. Any number of views render the same model: each
//! keeps one panel per child, materializes child views asynchronously and
//! keeps exactly the selected panel open. A selection made in one view is
//! written back to the model and reaches every other view, while the
//! writing view skips its own echo.

pub mod binding;
pub mod config;
pub mod error;
pub mod host;
pub mod materialize;
pub mod model;
pub mod panel;
pub mod reconcile;
pub mod registry;
pub mod render;
pub mod selection;
pub mod titles;
pub mod view;

pub use binding::AccordionBinding;
pub use config::AccordionConfig;
pub use error::{AccordionError, MaterializeError, Result};
pub use host::{ChildViewHost, Completion, RecordingHost};
pub use materialize::{ChildViewFactory, Materializer};
pub use model::{AccordionModel, ChildId, SelectedIndex};
pub use panel::{OpenState, PanelContent, PanelWrapper, Ticket};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use registry::PanelRegistry;
pub use render::{AccordionWidget, PanelBody};
pub use selection::{SelectionSync, SelectionUpdate, Toggle};
pub use view::{AccordionView, ViewEvent};

pub use omni_events::Origin;

/// Initialize logging for the accordion binary and embedders
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}
