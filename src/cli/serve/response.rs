//! HTTP response handlers.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::config::PipelineConfig;
use crate::embed;
use crate::utils::mime;

/// Respond with a static file, injecting the live-reload script into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_livereload(body, content_type, ws_port);

    send_body(request, 200, content_type, body)
}

/// Respond with 404 page (custom or default).
pub fn respond_not_found(
    request: Request,
    config: &PipelineConfig,
    ws_port: Option<u16>,
) -> Result<()> {
    use crate::utils::mime::types::{HTML, PLAIN};

    let custom_404 = config.paths.output.join("404.html");
    if let Ok(body) = fs::read(&custom_404) {
        let body = maybe_inject_livereload(body, HTML, ws_port);
        return send_body(request, 404, HTML, body);
    }

    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    use crate::utils::mime::types::PLAIN;
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the live-reload client from memory.
pub fn respond_livereload_js(request: Request, ws_port: u16) -> Result<()> {
    use crate::utils::mime::types::JAVASCRIPT;
    let body = embed::livereload_js(ws_port);
    send_body(request, 200, JAVASCRIPT, body.into_bytes())
}

/// Maybe inject the live-reload script if content is HTML and watching is on
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(_)) => inject_livereload_script(&body),
        _ => body,
    }
}

/// Inject the client script tag before `</body>`
fn inject_livereload_script(content: &[u8]) -> Vec<u8> {
    let script = embed::livereload_tag();
    let script_bytes = script.as_bytes();

    // Byte pattern for </body> - most generators use lowercase
    const PATTERN: &[u8] = b"</body>";

    // Reverse search for </body> using byte windows
    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(content.len() + script_bytes.len());
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&content[pos..]);
        return result;
    }

    // No </body> found, append to end (browsers handle this gracefully)
    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(content);
    result.extend_from_slice(script_bytes);
    result
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(
            Header::from_bytes("Content-Type", content_type)
                .expect("static content types are valid header values"),
        );
    request.respond(response)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>".to_vec();
        let out = maybe_inject_livereload(html, "text/html; charset=utf-8", Some(35729));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("livereload.js\"></script></body>"));
    }

    #[test]
    fn test_inject_appends_without_body_tag() {
        let html = b"<p>fragment</p>".to_vec();
        let out = maybe_inject_livereload(html, "text/html; charset=utf-8", Some(35729));
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("</script>"));
    }

    #[test]
    fn test_no_injection_for_css_or_without_watch() {
        let css = b"body{}".to_vec();
        let out = maybe_inject_livereload(css.clone(), "text/css; charset=utf-8", Some(35729));
        assert_eq!(out, css);

        let html = b"<body></body>".to_vec();
        let out = maybe_inject_livereload(html.clone(), "text/html; charset=utf-8", None);
        assert_eq!(out, html);
    }
}
