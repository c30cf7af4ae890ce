use std::io::Write;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use super::{Diagnostic, DiagnosticPart, Severity};

/// The pass-facing reporting surface. Every pass takes one of these by
/// `&mut` in its constructor; no pass aborts on an error, it reports and
/// keeps going, and the driver checks [`DiagnosticReporter::had_error`]
/// between phases.
pub trait DiagnosticReporter {
    fn report(&mut self, diagnostic: Diagnostic);

    /// Builds the diagnostic in place from a code and its parts.
    fn report_emplace(&mut self, code: i64, parts: Vec<DiagnosticPart>) {
        self.report(Diagnostic::new(code, parts));
    }

    /// Whether an **error** (not just any diagnostic) has been reported.
    fn had_error(&self) -> bool;

    /// The number of diagnostics reported so far.
    fn count(&self) -> usize;
}

// one process-wide lock so helper threads in a surrounding driver can
// never interleave the lines of two diagnostics
static CONSOLE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// The default reporter: renders each diagnostic against the source text
/// and writes it to stderr.
pub struct ConsoleReporter {
    source: String,
    count: usize,
    had_error: bool,
}

impl ConsoleReporter {
    pub fn new(source: impl Into<String>) -> ConsoleReporter {
        ConsoleReporter {
            source: source.into(),
            count: 0,
            had_error: false,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl DiagnosticReporter for ConsoleReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        self.had_error |= diagnostic.severity() == Severity::Error;

        let built = diagnostic.build(&self.source);

        let guard = CONSOLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{built}\n");
        drop(guard);
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// A reporter that collects diagnostics into a vector instead of printing
/// them. Used by tests to assert on exactly which codes were produced.
#[derive(Default)]
pub struct CollectingReporter {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingReporter {
    pub fn new() -> CollectingReporter {
        CollectingReporter::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The reported codes, in report order.
    pub fn codes(&self) -> Vec<i64> {
        self.diagnostics.iter().map(|d| d.code()).collect()
    }
}

impl DiagnosticReporter for CollectingReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn had_error(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    fn count(&self) -> usize {
        self.diagnostics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter_tracks_codes() {
        let mut reporter = CollectingReporter::new();

        assert!(!reporter.had_error());
        assert_eq!(reporter.count(), 0);

        reporter.report_emplace(15, vec![]);
        reporter.report_emplace(32, vec![]);

        assert!(reporter.had_error());
        assert_eq!(reporter.count(), 2);
        assert_eq!(reporter.codes(), vec![15, 32]);
    }

    #[test]
    fn test_console_reporter_counts_errors() {
        let mut reporter = ConsoleReporter::new("");

        assert!(!reporter.had_error());

        reporter.report_emplace(15, vec![]);

        assert!(reporter.had_error());
        assert_eq!(reporter.count(), 1);
    }
}
