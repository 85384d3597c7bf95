//! Accordion configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AccordionError, Result};

/// Default broadcast capacity for model and view signals
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Accordion view configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccordionConfig {
    /// Prefix of the label a panel carries until a title is projected onto it
    pub default_label_prefix: String,
    /// Text shown in a panel whose child view is still materializing
    pub placeholder_text: String,
    /// Capacity of the model attribute and view signal channels
    pub event_capacity: usize,
}

impl Default for AccordionConfig {
    fn default() -> Self {
        Self {
            default_label_prefix: "Page".to_string(),
            placeholder_text: "Loading...".to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl AccordionConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| AccordionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AccordionError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded accordion config from {}", path.display());
        Ok(config)
    }

    /// Check value constraints
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(AccordionError::Config(
                "event_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Label for a freshly created panel at `ordinal`
    #[must_use]
    pub fn default_label(&self, ordinal: usize) -> String {
        format!("{} {}", self.default_label_prefix, ordinal)
    }
}
