//! Development server with live reload support.

mod path;
mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::config::{self, PipelineConfig};
use crate::core::{BuildMode, register_server, set_serving};
use crate::pipeline;
use crate::reload;
use crate::watch;
use crate::{debug, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// The dev/default sequence: build everything in development mode, then
/// serve the output directory and watch sources until terminated.
pub fn serve(config: &PipelineConfig) -> Result<()> {
    pipeline::run_sequence(pipeline::DEV_SEQUENCE, config, BuildMode::DEVELOPMENT)?;

    // The server and the output-HTML watch both need the root to exist,
    // even when the dev sequence had nothing to write.
    std::fs::create_dir_all(&config.paths.output)?;

    let ws_port = if config.serve.watch {
        let port = reload::start_ws_server(reload::DEFAULT_WS_PORT)?;
        debug!("reload"; "ws://localhost:{}", port);
        Some(port)
    } else {
        None
    };

    if config.serve.watch {
        watch::spawn_watcher(config::get())?;
    }

    run_server(config, ws_port)
}

/// Bind the HTTP server and serve the output directory (blocking until
/// shutdown unblocks the listener).
fn run_server(config: &PipelineConfig, ws_port: Option<u16>) -> Result<()> {
    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, _shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);
    set_serving();

    log!("serve"; "http://{}", addr);

    // Use thread pool to handle requests concurrently
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = config::get();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: std::net::IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &PipelineConfig, ws_port: Option<u16>) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    // Serve the live-reload client from memory (doesn't touch the file system)
    if let Some(port) = ws_port
        && request.url() == crate::embed::LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    // Serve from the output directory
    if let Some(path) = path::resolve_path(request.url(), &config.paths.output) {
        return response::respond_file(request, &path, ws_port);
    }

    response::respond_not_found(request, config, ws_port)
}
