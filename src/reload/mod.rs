//! Live push channel: WebSocket server, message protocol, task-side helpers.
//!
//! Tasks push through these helpers without knowing whether a server is
//! running; with no connected clients a push is a no-op.

pub mod message;
pub mod server;

pub use message::ReloadMessage;
pub use server::{DEFAULT_WS_PORT, broadcast, start_ws_server};

/// Push a stylesheet update (live-inject, no page reload).
pub fn push_css(path: &str) {
    broadcast(&ReloadMessage::Css {
        path: path.to_string(),
    });
}

/// Push a script bundle update.
pub fn push_js(path: &str) {
    broadcast(&ReloadMessage::Js {
        path: path.to_string(),
    });
}

/// Push a full-reload request (compiled HTML changed).
pub fn push_reload(reason: &str) {
    broadcast(&ReloadMessage::reload(reason));
}

/// Surface a compile error in connected browsers (overlay, no reload).
pub fn push_error(path: &str, error: &str) {
    broadcast(&ReloadMessage::Error {
        path: path.to_string(),
        error: error.to_string(),
    });
}

/// Clear the browser error overlay after a successful run.
pub fn clear_error() {
    broadcast(&ReloadMessage::ClearError);
}
