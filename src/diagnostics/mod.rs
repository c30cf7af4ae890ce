//! Source-pointed, coded diagnostics shared by every pass.
//!
//! A [`Diagnostic`] is a code plus a list of parts. Each code maps
//! statically to a one-line summary, a long explanation and a severity
//! (see [`codes`]); the explanation is appended to every diagnostic as a
//! trailing note. Parts are either a single free-standing message or a
//! list of underlined source spans.

mod codes;
mod render;
mod reporter;

pub use self::codes::{diagnostic_info, DiagnosticInfo};
pub use self::reporter::{CollectingReporter, ConsoleReporter, DiagnosticReporter};

use crate::ast::SourceLoc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// How an underlined span is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderlineKind {
    /// `~~~~`
    Squiggly,
    /// `----`
    Straight,
    /// `^^^^`
    Carets,
    /// `^---`
    StraightArrow,
    /// `^~~~`
    SquigglyArrow,
}

/// A single spot in the source to underline, with an inline message.
#[derive(Debug, Clone)]
pub struct PointedOut {
    pub loc: SourceLoc,
    pub message: String,
    pub severity: Severity,
    pub underline: UnderlineKind,
}

/// A free-standing message line, optionally repeating the code.
#[derive(Debug, Clone)]
pub struct SingleMessage {
    pub message: String,
    pub severity: Severity,
    pub code: Option<i64>,
}

/// A set of underlined spans. All spans must belong to the same file;
/// spans at nonexistent locations are silently dropped.
#[derive(Debug, Clone)]
pub struct UnderlineList {
    list: Vec<PointedOut>,
    important: Option<SourceLoc>,
}

impl UnderlineList {
    pub fn new(locs: Vec<PointedOut>) -> UnderlineList {
        let mut list: Vec<_> = locs
            .into_iter()
            .filter(|spot| !spot.loc.is_nonexistent())
            .collect();

        debug_assert!(list
            .windows(2)
            .all(|pair| pair[0].loc.file() == pair[1].loc.file()));

        // the file header points at the first error, else the first
        // warning, else the first span
        let important = list
            .iter()
            .find(|spot| spot.severity == Severity::Error)
            .or_else(|| list.iter().find(|spot| spot.severity == Severity::Warning))
            .or_else(|| list.first())
            .map(|spot| spot.loc.clone());

        // messages show up in source order; the sort is stable so spans on
        // the same line keep the order they were given in
        list.sort_by_key(|spot| spot.loc.line());

        UnderlineList { list, important }
    }

    pub fn spans(&self) -> &[PointedOut] {
        &self.list
    }

    pub fn important_loc(&self) -> Option<&SourceLoc> {
        self.important.as_ref()
    }
}

/// One renderable piece of a diagnostic.
#[derive(Debug, Clone)]
pub enum DiagnosticPart {
    Message(SingleMessage),
    Underlines(UnderlineList),
}

impl DiagnosticPart {
    /// Builds a ready-to-print string for this part.
    pub fn build(&self, source: &str, padding: &str) -> String {
        match self {
            DiagnosticPart::Message(message) => render::build_message(message, padding),
            DiagnosticPart::Underlines(list) => render::build_underlines(list, source, padding),
        }
    }
}

/// A complete diagnostic, ready to render against the source it points at.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: i64,
    parts: Vec<DiagnosticPart>,
}

impl Diagnostic {
    pub fn new(code: i64, mut parts: Vec<DiagnosticPart>) -> Diagnostic {
        let info = diagnostic_info(code);

        parts.push(single_message(info.explanation, Severity::Note));

        Diagnostic { code, parts }
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn severity(&self) -> Severity {
        diagnostic_info(self.code).severity
    }

    /// Renders the whole diagnostic: the coded header line, then every
    /// part separated by newlines.
    pub fn build(&self, source: &str) -> String {
        let info = diagnostic_info(self.code);
        let main = SingleMessage {
            message: info.one_liner.into(),
            severity: info.severity,
            code: Some(self.code),
        };

        let rest = self
            .parts
            .iter()
            .map(|part| part.build(source, " "))
            .collect::<Vec<_>>()
            .join("\n");

        format!("{}\n{rest}", render::build_message(&main, ""))
    }
}

/// Creates an underline part pointing out a single location.
pub fn point_out(loc: SourceLoc, severity: Severity, message: impl Into<String>) -> DiagnosticPart {
    point_out_list(vec![point_out_part(loc, severity, message)])
}

/// Creates a single span, with the underline style implied by severity.
pub fn point_out_part(loc: SourceLoc, severity: Severity, message: impl Into<String>) -> PointedOut {
    let underline = if severity == Severity::Note {
        UnderlineKind::Straight
    } else {
        UnderlineKind::Squiggly
    };

    PointedOut {
        loc,
        message: message.into(),
        severity,
        underline,
    }
}

/// Creates an underline part from a list of spans.
pub fn point_out_list(list: Vec<PointedOut>) -> DiagnosticPart {
    DiagnosticPart::Underlines(UnderlineList::new(list))
}

/// Creates a free-standing message part.
pub fn single_message(message: impl Into<String>, severity: Severity) -> DiagnosticPart {
    DiagnosticPart::Message(SingleMessage {
        message: message.into(),
        severity,
        code: None,
    })
}

/// Makes a plural word singular when `count` is one.
pub fn make_plural(count: u64, text: &str) -> &str {
    if count == 1 {
        &text[..text.len() - 1]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(line: u64, severity: Severity) -> PointedOut {
        point_out_part(
            SourceLoc::new("x", line, 1, "main.ga"),
            severity,
            "message",
        )
    }

    #[test]
    fn test_underline_list_drops_nonexistent_spans() {
        let list = UnderlineList::new(vec![
            point_out_part(SourceLoc::nonexistent(), Severity::Error, ""),
            spot(3, Severity::Error),
        ]);

        assert_eq!(list.spans().len(), 1);
    }

    #[test]
    fn test_important_span_prefers_errors() {
        let list = UnderlineList::new(vec![
            spot(5, Severity::Note),
            spot(9, Severity::Warning),
            spot(7, Severity::Error),
        ]);

        assert_eq!(list.important_loc().unwrap().line(), 7);
    }

    #[test]
    fn test_spans_are_sorted_by_line() {
        let list = UnderlineList::new(vec![
            spot(9, Severity::Error),
            spot(2, Severity::Note),
            spot(5, Severity::Note),
        ]);

        let lines: Vec<_> = list.spans().iter().map(|s| s.loc.line()).collect();
        assert_eq!(lines, vec![2, 5, 9]);
    }

    #[test]
    fn test_diagnostic_appends_explanation_note() {
        let diagnostic = Diagnostic::new(15, vec![]);

        assert_eq!(diagnostic.parts.len(), 1);
        assert!(matches!(
            &diagnostic.parts[0],
            DiagnosticPart::Message(SingleMessage {
                severity: Severity::Note,
                ..
            })
        ));
    }

    #[test]
    fn test_make_plural() {
        assert_eq!(make_plural(1, "errors"), "error");
        assert_eq!(make_plural(2, "errors"), "errors");
        assert_eq!(make_plural(0, "errors"), "errors");
    }
}
