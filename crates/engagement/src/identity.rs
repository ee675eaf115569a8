//! Recognized student identity

use serde::{Deserialize, Serialize};

/// Identity resolved by a confident identify match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    /// Display name; may be empty when the roster has no name on file
    pub name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Overlay/wire display label: name, else id
    pub fn display_label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Wire name field for an optional identity: name, else id, else "Unknown"
pub fn wire_name(identity: Option<&Identity>) -> String {
    identity
        .map(|i| i.display_label().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
