//! Watch bindings: a glob set plus the work to run when it matches.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use crate::config::{Config, WatchConfig};
use crate::logger::{status_error, status_success};
use crate::pipeline::{Context, Pipeline};
use crate::utils::glob::SourceGlob;

/// What a binding runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BindingKind {
    Pipeline(Pipeline),
    /// Reload layouts, partials and data without rendering pages.
    Templates,
}

impl BindingKind {
    pub(super) fn name(self) -> &'static str {
        match self {
            Self::Pipeline(p) => p.name(),
            Self::Templates => "templates",
        }
    }

    fn run(self, ctx: &Context) {
        match self {
            // Failures are already reported per stage
            Self::Pipeline(p) => {
                let _ = p.run(ctx);
            }
            Self::Templates => match ctx.templates.refresh() {
                Ok(stats) => status_success(
                    "TEMPLATES",
                    &format!(
                        "{} layouts, {} partials, {} data files",
                        stats.layouts, stats.partials, stats.data
                    ),
                ),
                Err(e) => status_error("TEMPLATES", &format!("{e:#}")),
            },
        }
    }
}

/// Busy/pending pair: at most one run at a time, and a trigger during a
/// run queues exactly one more.
#[derive(Default)]
pub(super) struct RunGate {
    busy: AtomicBool,
    pending: AtomicBool,
}

impl RunGate {
    pub(super) fn trigger<F>(self: &Arc<Self>, job: F)
    where
        F: Fn() + Send + 'static,
    {
        self.pending.store(true, Ordering::SeqCst);
        if self.busy.swap(true, Ordering::SeqCst) {
            return;
        }

        let gate = Arc::clone(self);
        rayon::spawn(move || {
            loop {
                gate.pending.store(false, Ordering::SeqCst);
                job();
                gate.busy.store(false, Ordering::SeqCst);

                // A trigger that lost the race against `busy = false` has
                // already started its own run.
                if !gate.pending.load(Ordering::SeqCst) || gate.busy.swap(true, Ordering::SeqCst) {
                    break;
                }
            }
        });
    }

    #[cfg(test)]
    pub(super) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

pub(super) struct Binding {
    pub(super) kind: BindingKind,
    glob: SourceGlob,
    gate: Arc<RunGate>,
}

impl Binding {
    fn new(kind: BindingKind, pattern: &str) -> Result<Self> {
        Ok(Self {
            kind,
            glob: SourceGlob::single(pattern)?,
            gate: Arc::default(),
        })
    }

    /// Whether a root-relative path belongs to this binding.
    pub(super) fn matches(&self, rel: &Path) -> bool {
        self.glob.is_match(rel)
    }

    /// Literal directories to watch, root-relative.
    pub(super) fn roots(&self) -> Vec<std::path::PathBuf> {
        self.glob.bases()
    }

    /// Run on the rayon pool, serialized per binding.
    pub(super) fn trigger(&self, ctx: &Context) {
        let ctx = ctx.clone();
        let kind = self.kind;
        crate::debug!("watch"; "trigger {}", kind.name());
        self.gate.trigger(move || kind.run(&ctx));
    }
}

/// One binding per asset class, from `[watch]`.
pub(super) fn all(config: &Config) -> Result<Vec<Binding>> {
    let WatchConfig {
        sass,
        js,
        html,
        templates,
        img,
        icons,
        svg,
        fonts,
        resources,
    } = &config.watch;

    [
        (BindingKind::Pipeline(Pipeline::Styles), sass),
        (BindingKind::Pipeline(Pipeline::Scripts), js),
        (BindingKind::Pipeline(Pipeline::Layout), html),
        (BindingKind::Templates, templates),
        (BindingKind::Pipeline(Pipeline::Images), img),
        (BindingKind::Pipeline(Pipeline::Sprite), icons),
        (BindingKind::Pipeline(Pipeline::Svg), svg),
        (BindingKind::Pipeline(Pipeline::Fonts), fonts),
        (BindingKind::Pipeline(Pipeline::Resources), resources),
    ]
    .into_iter()
    .map(|(kind, pattern)| Binding::new(kind, pattern))
    .collect()
}

/// Bindings matching any of the root-relative `changes`, in binding order.
pub(super) fn matching<'a>(bindings: &'a [Binding], changes: &[&Path]) -> Vec<&'a Binding> {
    bindings
        .iter()
        .filter(|b| changes.iter().any(|rel| b.matches(rel)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    fn kinds(config: &Config, changes: &[&str]) -> Vec<BindingKind> {
        let bindings = all(config).unwrap();
        let changes: Vec<&Path> = changes.iter().map(Path::new).collect();
        matching(&bindings, &changes).iter().map(|b| b.kind).collect()
    }

    fn wait_until(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_icon_change_runs_sprite_only() {
        let config = test_parse_config("");
        assert_eq!(
            kinds(&config, &["src/icons/home.png"]),
            vec![BindingKind::Pipeline(Pipeline::Sprite)]
        );
    }

    #[test]
    fn test_partial_change_refreshes_and_rerenders() {
        let config = test_parse_config("");
        assert_eq!(
            kinds(&config, &["src/html/partials/nav.html"]),
            vec![BindingKind::Pipeline(Pipeline::Layout), BindingKind::Templates]
        );
        assert_eq!(
            kinds(&config, &["src/html/data/site.yml"]),
            vec![BindingKind::Templates]
        );
    }

    #[test]
    fn test_svg_not_treated_as_raster() {
        let config = test_parse_config("");
        assert_eq!(
            kinds(&config, &["src/img/svg/logo.svg"]),
            vec![BindingKind::Pipeline(Pipeline::Svg)]
        );
        assert_eq!(
            kinds(&config, &["src/sass/main.scss", "src/js/app.js"]),
            vec![
                BindingKind::Pipeline(Pipeline::Styles),
                BindingKind::Pipeline(Pipeline::Scripts)
            ]
        );
        assert!(kinds(&config, &["README.md"]).is_empty());
    }

    #[test]
    fn test_custom_watch_glob() {
        let config = test_parse_config("[watch]\nsass = \"styles/**/*.scss\"\n");
        assert_eq!(
            kinds(&config, &["styles/app.scss"]),
            vec![BindingKind::Pipeline(Pipeline::Styles)]
        );
        let bindings = all(&config).unwrap();
        assert_eq!(bindings[0].roots(), vec![std::path::PathBuf::from("styles")]);
    }

    #[test]
    fn test_trigger_during_run_queues_one_rerun() {
        let gate = Arc::new(RunGate::default());
        let runs = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(AtomicBool::new(false));

        let job = {
            let runs = Arc::clone(&runs);
            let release = Arc::clone(&release);
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                while !release.load(Ordering::SeqCst) {
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
        };

        gate.trigger(job.clone());
        wait_until(|| runs.load(Ordering::SeqCst) == 1);
        for _ in 0..5 {
            gate.trigger(job.clone());
        }
        release.store(true, Ordering::SeqCst);

        wait_until(|| !gate.is_busy());
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_idle_triggers_each_run() {
        let gate = Arc::new(RunGate::default());
        let runs = Arc::new(AtomicUsize::new(0));
        for expected in 1..=3 {
            let counter = Arc::clone(&runs);
            gate.trigger(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            wait_until(|| runs.load(Ordering::SeqCst) == expected && !gate.is_busy());
        }
    }
}
