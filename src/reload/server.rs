//! WebSocket Server for Live Reload
//!
//! An acceptor thread hands new connections to a shared client registry;
//! tasks push messages through [`broadcast`]. Dead clients are pruned on
//! the next send.

use std::net::{TcpListener, TcpStream};
use std::sync::LazyLock;

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::ReloadMessage;

/// Default WebSocket port for live reload
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Connected browser sessions
static CLIENTS: LazyLock<Mutex<Vec<WebSocket<TcpStream>>>> =
    LazyLock::new(|| Mutex::new(Vec::new()));

/// Start the WebSocket listener; returns the actually bound port
/// (may differ from `base_port` when it was in use).
pub fn start_ws_server(base_port: u16) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;

    // Spawn acceptor thread
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => add_client(stream),
                Err(e) => crate::log!("reload"; "accept error: {}", e),
            }
        }
    });

    Ok(actual_port)
}

/// Perform the WebSocket handshake and register the client.
fn add_client(stream: TcpStream) {
    match tungstenite::accept(stream) {
        Ok(mut ws) => {
            let connected = ReloadMessage::connected();
            if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                crate::log!("reload"; "failed to send connected message: {}", e);
                return;
            }

            let mut clients = CLIENTS.lock();
            crate::debug!("reload"; "client connected (total: {})", clients.len() + 1);
            clients.push(ws);
        }
        Err(e) => {
            crate::log!("reload"; "handshake failed: {}", e);
        }
    }
}

/// Broadcast a message to every connected browser session.
///
/// Delivery is unordered relative to other tasks' output. Clients whose
/// send fails are dropped from the registry.
pub fn broadcast(message: &ReloadMessage) {
    let text = message.to_json();
    let mut clients = CLIENTS.lock();
    clients.retain_mut(|ws| ws.send(Message::Text(text.clone().into())).is_ok());
}

// =============================================================================
// Helpers
// =============================================================================

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_without_clients_is_a_noop() {
        // Must not panic or block when nothing is connected.
        broadcast(&ReloadMessage::reload("nobody listening"));
    }

    #[test]
    fn test_bind_retries_past_occupied_port() {
        let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let (listener, actual) = try_bind_port(port, MAX_PORT_RETRIES).unwrap();
        assert_ne!(actual, port);
        drop(listener);
    }
}
