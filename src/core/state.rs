//! Process-wide flags shared by the build, the watch loop and the server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam::channel::Sender;
use tiny_http::Server;

/// Watch loop running: outcomes go to the status block instead of logs.
static SERVING: AtomicBool = AtomicBool::new(false);

/// Ctrl+C received.
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// What Ctrl+C must stop once watch mode is up.
struct Running {
    server: Arc<Server>,
    watch_loop: Sender<()>,
}

static RUNNING: OnceLock<Running> = OnceLock::new();

/// Install the Ctrl+C handler. One-shot builds exit right away with 130;
/// after [`register_server`] the server and watch loop are stopped instead.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        match RUNNING.get() {
            Some(running) => {
                crate::log!("serve"; "shutting down...");
                let _ = running.watch_loop.send(());
                running.server.unblock();
            }
            None => std::process::exit(130),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

pub fn register_server(server: Arc<Server>, watch_loop: Sender<()>) {
    let _ = RUNNING.set(Running { server, watch_loop });
}

pub fn set_serving() {
    SERVING.store(true, Ordering::SeqCst);
}

pub fn is_serving() -> bool {
    SERVING.load(Ordering::Relaxed)
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        assert!(!is_shutdown());
        set_serving();
        assert!(is_serving());
    }
}
