//! Embedded static resources for the dev server.
//!
//! The live-reload client script is compiled into the binary and served
//! from memory; it never lands in the output directory.

/// Route at which the dev server exposes the client script.
pub const LIVERELOAD_URL: &str = "/__atelier/livereload.js";

/// Raw client script with a `__WS_PORT__` placeholder.
const LIVERELOAD_JS: &str = include_str!("livereload.js");

/// Render the client script for the bound WebSocket port.
pub fn livereload_js(ws_port: u16) -> String {
    LIVERELOAD_JS.replace("__WS_PORT__", &ws_port.to_string())
}

/// Script tag injected before `</body>` of served HTML.
pub fn livereload_tag() -> String {
    format!(r#"<script src="{LIVERELOAD_URL}"></script>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_substitution() {
        let js = livereload_js(35729);
        assert!(js.contains("ws://127.0.0.1:35729"));
        assert!(!js.contains("__WS_PORT__"));
    }

    #[test]
    fn test_tag_points_at_served_route() {
        assert!(livereload_tag().contains(LIVERELOAD_URL));
    }
}
