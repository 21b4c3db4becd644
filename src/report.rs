//! Notification channel for pipeline outcomes.
//!
//! One-shot builds log a line per stage. Once the watch loop is running,
//! outcomes go to the single-block [`WatchStatus`](crate::logger::WatchStatus)
//! display instead, and connected browsers are told to reload, swap a
//! stylesheet, or show the error overlay.

use crate::core::{Target, is_serving};
use crate::logger::{status_error, status_success, status_unchanged};
use crate::pipeline::{PipelineError, PipelineReport};
use crate::serve::reload::{self, ReloadMessage};
use crate::utils::plural_count;

pub fn success(report: &PipelineReport, target: &Target) {
    let title = report.stage.title();
    let summary = summarize(report, target);

    if is_serving() {
        if report.written.is_empty() {
            status_unchanged(title, &summary);
        } else {
            status_success(title, &summary);
        }
    } else {
        crate::log!(title; "{}", summary);
    }

    if target.flags.live_reload {
        reload::resolved(title);
    }
    if target.flags.live_reload && !report.stage.is_intermediate() && !report.written.is_empty() {
        for message in reload_messages(report, target) {
            reload::notify(&message);
        }
    }
}

pub fn failure(err: &PipelineError, target: &Target) {
    if is_serving() {
        status_error(err.title(), &err.message);
    } else {
        crate::log!("error"; "[{}] {}", err.title(), err.message);
    }

    if target.flags.live_reload {
        reload::error(err.title(), &err.message);
    }
}

fn summarize(report: &PipelineReport, target: &Target) -> String {
    match report.written.as_slice() {
        [] if report.skipped > 0 => format!("{} up to date", plural_count(report.skipped, "file")),
        [] => "nothing to do".to_string(),
        [single] => target.output_key(single),
        many => {
            let mut line = plural_count(many.len(), "file");
            if report.skipped > 0 {
                line.push_str(&format!(", {} up to date", report.skipped));
            }
            line
        }
    }
}

/// Stylesheet stages hot-swap their CSS; everything else reloads the page.
fn reload_messages(report: &PipelineReport, target: &Target) -> Vec<ReloadMessage> {
    if !report.stage.is_stylesheet() {
        return vec![ReloadMessage::Reload];
    }
    report
        .written
        .iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "css"))
        .map(|path| ReloadMessage::Css {
            path: format!("/{}", target.output_key(path)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::core::BuildMode;
    use crate::pipeline::Stage;
    use std::path::Path;

    fn target() -> Target {
        Target::resolve(&test_config_at(Path::new("/p"), ""), BuildMode::Development)
    }

    #[test]
    fn test_summary_single_file() {
        let target = target();
        let mut report = PipelineReport::new(Stage::Styles);
        report.wrote(target.paths.css.join("main.css"));
        assert_eq!(summarize(&report, &target), "css/main.css");
    }

    #[test]
    fn test_summary_skipped() {
        let target = target();
        let mut report = PipelineReport::new(Stage::Images);
        report.skipped = 3;
        assert_eq!(summarize(&report, &target), "3 files up to date");
    }

    #[test]
    fn test_styles_swap_css() {
        let target = target();
        let mut report = PipelineReport::new(Stage::Styles);
        report.wrote(target.paths.css.join("main.css"));
        report.wrote(target.paths.css.join("second.css"));

        let messages = reload_messages(&report, &target);
        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], ReloadMessage::Css { path } if path == "/css/main.css"));
    }

    #[test]
    fn test_other_stages_reload() {
        let target = target();
        let mut report = PipelineReport::new(Stage::Scripts);
        report.wrote(target.paths.js.join("all.js"));
        assert!(matches!(
            reload_messages(&report, &target).as_slice(),
            [ReloadMessage::Reload]
        ));
    }
}
