//! Editor configuration

use crate::error::EditorError;
use crate::layout::{PageDimensions, PageFormat};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLACEHOLDER: &str = "Start typing...";
pub const DEFAULT_CONTENT: &str = "<p></p>";

/// Options for one editing session, as passed from the host in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub page_format: PageFormat,
    /// Run live pagination
    pub pagination: bool,
    /// Shown while the document is a single empty paragraph
    pub placeholder: String,
    pub initial_content: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_format: PageFormat::A4,
            pagination: true,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            initial_content: DEFAULT_CONTENT.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn dimensions(&self) -> PageDimensions {
        self.page_format.dimensions()
    }
}
