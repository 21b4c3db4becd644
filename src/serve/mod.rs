//! Preview server for development mode.
//!
//! Serves the development output directory over HTTP and pushes reload
//! messages over a separate WebSocket port. HTML responses get the live
//! reload script injected before `</body>`.

mod path;
pub mod reload;
mod response;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tiny_http::{Request, Server};

use crate::config::ServeConfig;
use crate::embed::serve::HOTRELOAD_URL;
use crate::{debug, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Request worker threads.
const WORKERS: usize = 4;

/// Bound server ready to accept requests.
pub struct PreviewServer {
    server: Arc<Server>,
    addr: SocketAddr,
    root: PathBuf,
    ws_port: Option<u16>,
}

/// Bind the HTTP server (and the reload socket when `live_reload` is set)
/// without entering the request loop.
pub fn bind(config: &ServeConfig, root: PathBuf, live_reload: bool) -> Result<PreviewServer> {
    let ws_port = if live_reload {
        let port = reload::start(config.interface, config.ws_port)?;
        debug!("reload"; "ws://{}:{}", config.interface, port);
        Some(port)
    } else {
        None
    };

    let (server, addr) = bind_with_retry(config.interface, config.port)?;
    log!("serve"; "http://{}", addr);

    Ok(PreviewServer {
        server: Arc::new(server),
        addr,
        root,
        ws_port,
    })
}

impl PreviewServer {
    #[cfg(test)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared handle, unblocked by the shutdown handler.
    pub fn handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Serve requests until the server is unblocked.
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WORKERS)
            .thread_name(|i| format!("serve-{i}"))
            .build()?;
        debug!("serve"; "{} on {}", self.root.display(), self.addr);
        let root = Arc::new(self.root);

        for request in self.server.incoming_requests() {
            let root = Arc::clone(&root);
            let ws_port = self.ws_port;
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &root, ws_port) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// Bind to the interface and port, trying the next ports when taken.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match Server::http(SocketAddr::new(interface, port)) {
            Ok(server) => {
                let addr = server
                    .server_addr()
                    .to_ip()
                    .unwrap_or_else(|| SocketAddr::new(interface, port));
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn handle_request(request: Request, root: &Path, ws_port: Option<u16>) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = request.url().to_string();
    debug!("serve"; "{} {}", request.method(), url);

    if let Some(port) = ws_port
        && url.split('?').next() == Some(HOTRELOAD_URL)
    {
        return response::respond_hotreload_js(request, port);
    }

    match path::resolve_path(&url, root) {
        Some(file) => response::respond_file(request, &file, ws_port),
        None => response::respond_not_found(request, root, ws_port),
    }
}
