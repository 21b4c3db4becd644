//! Configuration errors and validation diagnostics.

use super::FieldPath;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML")]
    Toml(#[from] toml::de::Error),

    #[error("config file `{0}` not found")]
    NotFound(PathBuf),

    // No #[from]: source() would print the diagnostics twice
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
struct Diagnostic {
    severity: Severity,
    field: FieldPath,
    message: String,
    hint: Option<String>,
}

/// Problems found across every section, reported in one go.
///
/// Errors fail [`Config::validate`](crate::config::Config::validate);
/// warnings are only logged.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    items: Vec<Diagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, field: FieldPath, message: String, hint: Option<String>) {
        self.items.push(Diagnostic {
            severity,
            field,
            message,
            hint,
        });
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field, message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into(), None);
    }

    fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn print_warnings(&self) {
        for d in self.items.iter().filter(|d| d.severity == Severity::Warning) {
            crate::log!("config"; "{}: {}", d.field.as_str(), d.message);
        }
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.errors().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    /// Errors grouped under their `[section]`, in the order they were found.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "invalid frontkit.toml".red().bold())?;

        let mut sections: Vec<&str> = Vec::new();
        for d in self.errors() {
            if !sections.contains(&d.field.section()) {
                sections.push(d.field.section());
            }
        }

        for section in sections {
            write!(f, "\n\n{}", format_args!("[{section}]").cyan())?;
            for d in self.errors().filter(|d| d.field.section() == section) {
                write!(f, "\n  {} {}", d.field, d.message)?;
                if let Some(hint) = &d.hint {
                    write!(f, "\n    {} {}", "hint:".yellow(), hint)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("frontkit.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(format!("{io_err}"), "cannot read `frontkit.toml`");

        let missing = ConfigError::NotFound(PathBuf::from("custom.toml"));
        assert!(format!("{missing}").contains("custom.toml"));
    }

    #[test]
    fn test_errors_grouped_by_section() {
        let mut diag = ConfigDiagnostics::new();
        diag.error(FieldPath::new("sprite.css_name"), "must end with `.css`");
        diag.error(FieldPath::new("images.jpeg_quality"), "out of range");
        diag.error_with_hint(FieldPath::new("sprite.padding"), "too large", "use 0-64");
        diag.warn(FieldPath::new("folders"), "absolute");

        assert_eq!(diag.len(), 3);
        let text = format!("{}", diag.into_result().unwrap_err());
        let sprite = text.find("[sprite]").unwrap();
        let images = text.find("[images]").unwrap();
        assert!(sprite < images);
        assert_eq!(text.matches("[sprite]").count(), 1);
        assert!(text.contains("use 0-64"));
        assert!(!text.contains("absolute"));
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut diag = ConfigDiagnostics::new();
        diag.warn(FieldPath::new("folders"), "odd");
        assert!(diag.is_empty());
        assert!(diag.into_result().is_ok());
    }
}
