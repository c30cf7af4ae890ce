use gallium_lang::ast::SourceLoc;
use gallium_lang::diagnostics::{
    diagnostic_info, point_out, point_out_list, point_out_part, single_message, Diagnostic,
    Severity,
};

/// Strips ANSI escapes so assertions hold whether or not the test runner
/// is attached to a terminal.
fn plain(text: String) -> String {
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
fn diagnostic_header_shows_severity_and_zero_padded_code() {
    let source = "let x: i32 = 2147483648";
    let diagnostic = Diagnostic::new(
        32,
        vec![point_out(
            SourceLoc::new("2147483648", 1, 14, "main.ga"),
            Severity::Error,
            "does not fit in `i32`",
        )],
    );

    let built = plain(diagnostic.build(source));

    assert!(built.starts_with("error [E#0032] integer literal out of bounds of type"));
    assert!(built.contains(">>> main.ga (line 1, column 14)"));
    assert!(built.contains("1 | let x: i32 = 2147483648"));
    assert!(built.contains("~~~~~~~~~~ does not fit in `i32`"));

    // the long-form explanation rides along as a trailing note
    assert!(built.contains("note "));
    assert!(built.contains(diagnostic_info(32).explanation));
}

#[test]
fn multiple_spans_merge_into_one_excerpt() {
    let source = "fn f() {}\nfn f() {}";
    let diagnostic = Diagnostic::new(
        9,
        vec![point_out_list(vec![
            point_out_part(
                SourceLoc::new("fn f() {}", 2, 1, "dup.ga"),
                Severity::Error,
                "conflicting overload is here",
            ),
            point_out_part(
                SourceLoc::new("fn f() {}", 1, 1, "dup.ga"),
                Severity::Note,
                "original overload is here",
            ),
        ])],
    );

    let built = plain(diagnostic.build(source));

    // sorted into source order, with the file header on the error span
    assert!(built.contains(">>> dup.ga (line 2, column 1)"));

    let first = built.find("original overload is here").unwrap();
    let second = built.find("conflicting overload is here").unwrap();
    assert!(first < second);
}

#[test]
fn nonexistent_spans_render_nothing() {
    let diagnostic = Diagnostic::new(
        26,
        vec![point_out(
            SourceLoc::nonexistent(),
            Severity::Error,
            "synthesized node",
        )],
    );

    let built = plain(diagnostic.build(""));

    assert!(!built.contains("synthesized node"));
    assert!(built.starts_with("error [E#0026]"));
}

#[test]
fn notes_have_no_code_in_their_header() {
    let part = single_message("just so you know", Severity::Note);
    let built = plain(part.build("", ""));

    assert_eq!(built, "note just so you know");
}

#[test]
fn severities_come_from_the_code_table() {
    for code in [6, 15, 32, 51] {
        assert_eq!(diagnostic_info(code).severity, Severity::Error);
        assert_eq!(Diagnostic::new(code, vec![]).severity(), Severity::Error);
    }
}
