//! Development watch mode.
//!
//! ```text
//! notify ─► channel ─► Debouncer ─► bindings (rayon, one run per binding)
//!                                         │
//!                       report ─► WatchStatus + reload hub
//! ```
//!
//! The watcher is created before the initial build so edits made while it
//! runs are not lost; they are dispatched once the loop starts serving.

mod binding;
mod debouncer;
mod roots;

use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context as _, Result};
use crossbeam::channel::{self, Receiver};
use notify::RecommendedWatcher;

use crate::pipeline::Context;
use crate::utils::path::normalize_path;

use binding::Binding;
use debouncer::Debouncer;
use roots::WatchRoots;

type EventResult = notify::Result<notify::Event>;

/// A started watcher, buffering events until [`Watcher::serve`].
pub struct Watcher {
    watcher: RecommendedWatcher,
    events: Receiver<EventResult>,
    roots: WatchRoots,
    bindings: Vec<Binding>,
}

impl Watcher {
    pub fn start(ctx: &Context) -> Result<Self> {
        let bindings = binding::all(&ctx.config)?;
        let (tx, events) = channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |res: EventResult| {
            let _ = tx.send(res);
        })
        .context("failed to start file watcher")?;

        let dirs = bindings
            .iter()
            .flat_map(Binding::roots)
            .map(|rel| ctx.config.root_join(rel))
            .collect();
        let mut roots = WatchRoots::new(dirs);
        roots.attach(&mut watcher);
        crate::debug!("watch"; "{} roots, {} bindings", roots.attached(), bindings.len());

        Ok(Self {
            watcher,
            events,
            roots,
            bindings,
        })
    }

    /// Serve the output and dispatch changes until Ctrl+C.
    pub fn serve(self, ctx: &Context) -> Result<()> {
        let server = crate::serve::bind(
            &ctx.config.serve,
            ctx.target.paths.base.clone(),
            ctx.target.flags.live_reload,
        )?;
        let (shutdown_tx, shutdown_rx) = channel::bounded(1);
        crate::core::register_server(server.handle(), shutdown_tx);

        let ctx = ctx.clone();
        let watch_loop = thread::Builder::new()
            .name("watch".into())
            .spawn(move || self.event_loop(&ctx, &shutdown_rx))?;

        crate::core::set_serving();
        crate::log!("watch"; "watching for changes, press Ctrl+C to stop");
        server.run()?;

        let _ = watch_loop.join();
        Ok(())
    }

    fn event_loop(mut self, ctx: &Context, shutdown: &Receiver<()>) {
        let mut debouncer = Debouncer::new();
        let root = normalize_path(&ctx.config.root);

        loop {
            channel::select! {
                recv(shutdown) -> _ => break,
                recv(self.events) -> msg => match msg {
                    Ok(Ok(event)) => debouncer.add_event(&event),
                    Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                    Err(_) => break,
                },
                default(debouncer.sleep_duration()) => {
                    self.roots.attach(&mut self.watcher);
                    if let Some(changes) = debouncer.take_if_ready() {
                        self.dispatch(ctx, &root, &changes);
                    }
                }
            }
            if crate::core::is_shutdown() {
                break;
            }
        }
        crate::debug!("watch"; "stopped");
    }

    fn dispatch(&self, ctx: &Context, root: &Path, changes: &[PathBuf]) {
        let rel: Vec<&Path> = changes
            .iter()
            .filter_map(|path| relative_to(path, root, &ctx.config.root))
            .collect();
        for binding in binding::matching(&self.bindings, &rel) {
            binding.trigger(ctx);
        }
    }
}

/// `path` relative to the project root, trying the canonical root first.
fn relative_to<'a>(path: &'a Path, canonical: &Path, configured: &Path) -> Option<&'a Path> {
    path.strip_prefix(canonical)
        .or_else(|_| path.strip_prefix(configured))
        .ok()
}
