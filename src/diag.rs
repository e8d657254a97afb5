//! Diagnostics and error types.
//!
//! Programmer errors (null where non-null required, adding a child that
//! already has a parent, ...) are reported as warnings through a
//! [`DiagnosticSink`] and the offending operation becomes a no-op. Stylesheet
//! parse errors carry a source location and skip only the offending
//! declaration. Backend failures are the one terminal error class.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A location in a stylesheet source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Byte offset from the start of the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl SourceLocation {
    /// Compute the location of a byte offset within `source`.
    pub fn at(source: &str, offset: usize) -> Self {
        let clamped = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;
        for b in source[..clamped].bytes() {
            if b == b'\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal issue reported to the diagnostic sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Present for stylesheet parse errors.
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// A warning without a source location.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location: None,
        }
    }

    /// A warning pinned to a stylesheet location.
    pub fn parse_warning(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location: Some(location),
        }
    }
}

/// Receives diagnostics from the toolkit.
///
/// The default sink forwards to the `log` crate. Tests install a
/// [`CollectingSink`] to assert on emitted diagnostics.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: forwards diagnostics to `log`.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        match (&diagnostic.severity, &diagnostic.location) {
            (Severity::Warning, Some(loc)) => {
                log::warn!("{} at {}", diagnostic.message, loc)
            }
            (Severity::Warning, None) => log::warn!("{}", diagnostic.message),
            (Severity::Error, Some(loc)) => {
                log::error!("{} at {}", diagnostic.message, loc)
            }
            (Severity::Error, None) => log::error!("{}", diagnostic.message),
        }
    }
}

/// Sink that accumulates diagnostics for inspection.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    collected: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectingSink {
    /// Create an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All diagnostics reported so far.
    pub fn collected(&self) -> Vec<Diagnostic> {
        self.collected.borrow().clone()
    }

    /// Number of diagnostics reported so far.
    pub fn len(&self) -> usize {
        self.collected.borrow().len()
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.collected.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.collected.borrow_mut().push(diagnostic);
    }
}

/// Programmer-error taxonomy: each value names a precondition that was
/// violated. Reporting one is non-fatal; the operation becomes a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TkError {
    #[error("widget already has a parent")]
    AlreadyParented,
    #[error("widget is not a child of the given container")]
    NotAChild,
    #[error("widget has been destroyed")]
    Destroyed,
    #[error("no such widget")]
    NoSuchWidget,
    #[error("duplicate child name: {0}")]
    DuplicateChildName(String),
    #[error("widget is not a registered drop destination")]
    NotADropDestination,
    #[error("invalid inhibitor cookie: {0}")]
    InvalidInhibitorCookie(u32),
}

/// Terminal backend failures.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("display disconnected")]
    DisplayDisconnected,
    #[error("surface creation failed: {0}")]
    SurfaceCreationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_location_single_line() {
        let loc = SourceLocation::at("color: red", 7);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 8);
        assert_eq!(loc.offset, 7);
    }

    #[test]
    fn source_location_multi_line() {
        let src = "a {\n  color: red;\n}\n";
        let offset = src.find("color").unwrap();
        let loc = SourceLocation::at(src, offset);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn source_location_clamps_offset() {
        let loc = SourceLocation::at("ab", 99);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn source_location_display() {
        let loc = SourceLocation {
            offset: 0,
            line: 3,
            column: 14,
        };
        assert_eq!(loc.to_string(), "3:14");
    }

    #[test]
    fn collecting_sink_accumulates() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());
        sink.report(Diagnostic::warning("first"));
        sink.report(Diagnostic::warning("second"));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.collected()[0].message, "first");
    }

    #[test]
    fn collecting_sink_clones_share_storage() {
        let sink = CollectingSink::new();
        let clone = sink.clone();
        clone.report(Diagnostic::warning("shared"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn tk_error_messages() {
        assert_eq!(
            TkError::AlreadyParented.to_string(),
            "widget already has a parent"
        );
        assert_eq!(
            TkError::DuplicateChildName("page1".into()).to_string(),
            "duplicate child name: page1"
        );
    }
}
