//! Live reload channel to connected browsers.
//!
//! ```text
//! report::success/failure ─► notify()/error()/resolved() ─► Hub ─► WebSocket clients
//!                                                            ▲
//!                          acceptor thread ── handshake ─────┘ (+ connected, pending error)
//! ```
//!
//! Messages are JSON objects tagged by `type`. Errors are kept per stage
//! title until that stage succeeds again. The overlay is cleared only when
//! no stage is failing, and a browser that connects while a stage is broken
//! still sees the overlay.

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Message pushed to browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Handshake done
    Connected { version: String },
    /// Full page reload
    Reload,
    /// Swap one stylesheet, matched by its href path
    Css { path: String },
    /// Show the error overlay
    Error { title: String, message: String },
    /// Hide the error overlay
    Clear,
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

/// Connected clients plus the errors of every failing stage.
#[derive(Default)]
struct Hub {
    clients: Vec<WebSocket<TcpStream>>,
    errors: BTreeMap<String, String>,
}

impl Hub {
    fn record_error(&mut self, title: &str, message: &str) -> ReloadMessage {
        self.errors.insert(title.to_string(), message.to_string());
        ReloadMessage::Error {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    /// Forget `title`'s error. Returns what the overlay should show now,
    /// or `None` when `title` was not failing.
    fn resolve(&mut self, title: &str) -> Option<ReloadMessage> {
        self.errors.remove(title)?;
        Some(self.pending_error().unwrap_or(ReloadMessage::Clear))
    }

    /// Overlay for a browser that connects now.
    fn pending_error(&self) -> Option<ReloadMessage> {
        self.errors
            .iter()
            .next()
            .map(|(title, message)| ReloadMessage::Error {
                title: title.clone(),
                message: message.clone(),
            })
    }

    fn broadcast(&mut self, msg: &ReloadMessage) {
        if self.clients.is_empty() {
            return;
        }
        let text = msg.to_json();
        self.clients
            .retain_mut(|ws| match ws.send(Message::Text(text.clone().into())) {
                Ok(()) => true,
                Err(e) => {
                    crate::debug!("reload"; "client disconnected: {}", e);
                    false
                }
            });
        crate::debug!("reload"; "{} to {} clients", text, self.clients.len());
    }
}

static HUB: LazyLock<Mutex<Hub>> = LazyLock::new(|| Mutex::new(Hub::default()));

/// Send `msg` to every connected browser.
pub fn notify(msg: &ReloadMessage) {
    HUB.lock().broadcast(msg);
}

/// Show `title`'s failure in every browser until that stage succeeds.
pub fn error(title: &str, message: &str) {
    let mut hub = HUB.lock();
    let msg = hub.record_error(title, message);
    hub.broadcast(&msg);
}

/// `title` succeeded: hide its overlay, or fall back to another failing
/// stage's error.
pub fn resolved(title: &str) {
    let mut hub = HUB.lock();
    if let Some(msg) = hub.resolve(title) {
        hub.broadcast(&msg);
    }
}

/// Number of connected browsers.
#[cfg(test)]
pub fn client_count() -> usize {
    HUB.lock().clients.len()
}

/// Bind the WebSocket listener (with port retry) and accept clients on a
/// background thread. Returns the bound port.
pub fn start(interface: IpAddr, base_port: u16) -> Result<u16> {
    let (listener, port) = try_bind_port(interface, base_port)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        while !crate::core::is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    add_client(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
        close_all();
    });

    Ok(port)
}

fn add_client(stream: TcpStream) {
    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::log!("reload"; "handshake failed: {}", e);
            return;
        }
    };

    let connected = ReloadMessage::connected().to_json();
    if let Err(e) = ws.send(Message::Text(connected.into())) {
        crate::log!("reload"; "failed to send connected message: {}", e);
        return;
    }

    let mut hub = HUB.lock();
    if let Some(err) = hub.pending_error()
        && let Err(e) = ws.send(Message::Text(err.to_json().into()))
    {
        crate::debug!("reload"; "failed to send pending error: {}", e);
        return;
    }
    hub.clients.push(ws);
}

fn close_all() {
    let mut hub = HUB.lock();
    for mut ws in hub.clients.drain(..) {
        let _ = ws.close(None);
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                if offset > 0 {
                    crate::log!("reload"; "port {} in use, using {} instead", base_port, actual_port);
                }
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind WebSocket server after {} attempts: {}",
        MAX_PORT_RETRIES,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
