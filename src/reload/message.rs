//! Live Reload Message Protocol
//!
//! Defines the JSON message format for WebSocket communication between
//! the development server and browser clients.
//!
//! # Message Types
//!
//! - `reload`: Trigger full page reload (compiled HTML changed)
//! - `css`: Swap the matching stylesheet link (no page reload)
//! - `js`: Script bundle changed (client re-fetches by reloading)
//! - `error`/`clear_error`: Compile error overlay control
//! - `connected`: Handshake acknowledgement

use serde::{Deserialize, Serialize};

/// Message pushed to connected browser sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Full page reload
    Reload {
        /// Optional reason for reload
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet update (fast path - swap the link, keep the page)
    Css {
        /// Served stylesheet path (e.g., "/assets/css/main.css")
        path: String,
    },

    /// Script bundle update
    Js {
        /// Served bundle path (e.g., "/assets/js/main.js")
        path: String,
    },

    /// Compilation error (display overlay, no reload)
    Error {
        /// Source file path
        path: String,
        /// Error message
        error: String,
    },

    /// Clear error overlay (compilation succeeded after error)
    #[serde(rename = "clear_error")]
    ClearError,

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },
}

impl ReloadMessage {
    /// Create a reload message with reason
    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
