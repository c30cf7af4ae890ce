//! Turns diagnostic parts into ready-to-print text.
//!
//! Output shape, for each underlined span:
//!
//! ```text
//! >>> src/main.ga (line 3, column 9)
//!    |
//!  3 | let x: i32 = 2147483648
//!    |              ~~~~~~~~~~ literal does not fit in `i32`
//!    |
//! ```
//!
//! Color codes are applied through `colored`, which disables itself when
//! the stream is not a terminal.

use colored::{ColoredString, Colorize};

use super::{PointedOut, Severity, SingleMessage, UnderlineKind, UnderlineList};

fn diagnostic_color(severity: Severity, text: &str) -> ColoredString {
    match severity {
        Severity::Error => text.red().bold(),
        Severity::Warning => text.yellow().bold(),
        Severity::Note => text.cyan().bold(),
    }
}

fn header(severity: Severity, code: Option<i64>) -> String {
    match (severity, code) {
        (Severity::Error, Some(code)) => format!("{} ", format!("error [E#{code:04}]").red().bold()),
        (Severity::Error, None) => format!("{} ", "error".red().bold()),
        (Severity::Warning, Some(code)) => {
            format!("{} ", format!("warning [E#{code:04}]").yellow().bold())
        }
        (Severity::Warning, None) => format!("{} ", "warning".yellow().bold()),
        (Severity::Note, _) => format!("{} ", "note".cyan().bold()),
    }
}

pub(super) fn build_message(message: &SingleMessage, padding: &str) -> String {
    format!(
        "{padding}{}{}",
        header(message.severity, message.code),
        message.message.bold()
    )
}

fn underline_with(length: usize, kind: UnderlineKind) -> String {
    let length = length.max(1);

    match kind {
        UnderlineKind::Squiggly => "~".repeat(length),
        UnderlineKind::Straight => "-".repeat(length),
        UnderlineKind::Carets => "^".repeat(length),
        UnderlineKind::StraightArrow => format!("^{}", "-".repeat(length.saturating_sub(1))),
        UnderlineKind::SquigglyArrow => format!("^{}", "~".repeat(length.saturating_sub(1))),
    }
}

/// The three pieces of a source line: before, underlined, after.
fn break_up<'a>(line: &'a str, spot: &PointedOut) -> (&'a str, &'a str, &'a str) {
    let start = (spot.loc.column() as usize).saturating_sub(1).min(line.len());
    let end = (start + spot.loc.length()).min(line.len());

    (&line[..start], &line[start..end], &line[end..])
}

fn line_number_padding(current: u64, max: u64) -> (String, String) {
    let current_digits = current.to_string().len();
    let max_digits = max.to_string().len();

    (
        " ".repeat(max_digits - current_digits),
        " ".repeat(max_digits),
    )
}

pub(super) fn build_underlines(list: &UnderlineList, source: &str, padding: &str) -> String {
    let spans = list.spans();

    if spans.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let max_line = spans.iter().map(|spot| spot.loc.line()).max().unwrap_or(1);

    let mut builder = String::new();

    if let Some(loc) = list.important_loc() {
        builder.push_str(&format!(
            "{padding}>>> {}\n",
            format!(
                "{} (line {}, column {})",
                loc.file().display(),
                loc.line(),
                loc.column()
            )
            .green()
        ));
    }

    let mut previous_line: Option<u64> = None;

    for spot in spans {
        let line = spot.loc.line();
        let full_line = lines.get(line as usize - 1).copied().unwrap_or("");
        let (before_line, without_line) = line_number_padding(line, max_line);
        let (start, underlined, rest) = break_up(full_line, spot);
        let underline = format!(
            "{}{}",
            " ".repeat(start.len()),
            diagnostic_color(spot.severity, &underline_with(underlined.len(), spot.underline))
        );

        // non-adjacent lines get a `...` separator between their excerpts
        match previous_line {
            Some(previous) if previous != line && previous != line - 1 => {
                builder.push_str(&format!("\n{padding}{without_line}...\n"));
            }
            Some(_) => builder.push('\n'),
            None => {}
        }

        builder.push_str(&format!(
            "{padding}{without_line} |\n{padding}{before_line}{line} | {start}{}{rest}\n{padding}{without_line} | {underline} {}",
            diagnostic_color(spot.severity, underlined),
            diagnostic_color(spot.severity, &spot.message),
        ));

        previous_line = Some(line);
    }

    let (_, gutter) = line_number_padding(0, max_line);
    builder.push_str(&format!("\n{padding}{gutter} |"));

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLoc;
    use crate::diagnostics::{point_out_part, UnderlineList};

    fn plain(text: String) -> String {
        // strip ANSI escapes so tests are stable regardless of tty detection
        let mut out = String::new();
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }

        out
    }

    #[test]
    fn test_underline_styles() {
        assert_eq!(underline_with(4, UnderlineKind::Squiggly), "~~~~");
        assert_eq!(underline_with(4, UnderlineKind::Straight), "----");
        assert_eq!(underline_with(4, UnderlineKind::Carets), "^^^^");
        assert_eq!(underline_with(4, UnderlineKind::StraightArrow), "^---");
        assert_eq!(underline_with(4, UnderlineKind::SquigglyArrow), "^~~~");
        assert_eq!(underline_with(0, UnderlineKind::Squiggly), "~");
    }

    #[test]
    fn test_single_span_excerpt() {
        let source = "fn main() -> i32 {\n    if 1 { 2 } else { 3 }\n}";
        let list = UnderlineList::new(vec![point_out_part(
            SourceLoc::new("1", 2, 8, "main.ga"),
            Severity::Error,
            "condition must be `bool`",
        )]);

        let built = plain(build_underlines(&list, source, ""));

        assert!(built.contains(">>> main.ga (line 2, column 8)"));
        assert!(built.contains("2 |     if 1 { 2 } else { 3 }"));
        assert!(built.contains("~ condition must be `bool`"));
    }

    #[test]
    fn test_gap_between_lines_renders_separator() {
        let source = "a\nb\nc\nd\ne";
        let list = UnderlineList::new(vec![
            point_out_part(SourceLoc::new("a", 1, 1, "f.ga"), Severity::Error, "first"),
            point_out_part(SourceLoc::new("e", 5, 1, "f.ga"), Severity::Note, "second"),
        ]);

        let built = plain(build_underlines(&list, source, ""));

        assert!(built.contains("..."));
    }

    #[test]
    fn test_adjacent_lines_render_without_separator() {
        let source = "a\nb";
        let list = UnderlineList::new(vec![
            point_out_part(SourceLoc::new("a", 1, 1, "f.ga"), Severity::Error, ""),
            point_out_part(SourceLoc::new("b", 2, 1, "f.ga"), Severity::Note, ""),
        ]);

        let built = plain(build_underlines(&list, source, ""));

        assert!(!built.contains("..."));
    }
}
