use gallium_lang::ast::*;
use gallium_lang::backend;
use gallium_lang::diagnostics::CollectingReporter;

fn loc() -> SourceLoc {
    SourceLoc::default()
}

fn sample_program() -> Program {
    let greet = FnDeclaration::new(
        loc(),
        false,
        FnPrototype::new("greet", None, vec![], vec![], Type::void()),
        Block::new(
            loc(),
            vec![ExpressionStatement::new(
                loc(),
                Call::new(
                    loc(),
                    UnqualifiedIdentifier::new(loc(), UnqualifiedId::bare("println")).into(),
                    vec![StringLiteral::new(loc(), "hello").into()],
                )
                .into(),
            )
            .into()],
        )
        .into(),
    );

    let main = FnDeclaration::new(
        loc(),
        false,
        FnPrototype::new("main", None, vec![], vec![], Type::signed(IntegerWidth::W32)),
        Block::new(
            loc(),
            vec![
                ExpressionStatement::new(
                    loc(),
                    Call::new(
                        loc(),
                        UnqualifiedIdentifier::new(loc(), UnqualifiedId::bare("greet")).into(),
                        vec![],
                    )
                    .into(),
                )
                .into(),
                ExpressionStatement::new(
                    loc(),
                    Return::new(loc(), Some(IntegerLiteral::new(loc(), 0).into())).into(),
                )
                .into(),
            ],
        )
        .into(),
    );

    Program::new(vec![greet.into(), main.into()])
}

#[test]
fn the_finished_tree_satisfies_the_backend_contract() {
    let mut program = sample_program();
    let mut reporter = CollectingReporter::new();

    gallium_lang::analyze(&mut program, &mut reporter)
        .unwrap_or_else(|e| panic!("{e}: {:?}", reporter.codes()));

    backend::verify_contract(&program).unwrap_or_else(|violations| {
        panic!(
            "{}",
            violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        )
    });

    // calls through the stdlib shims resolved against the predefined
    // overload sets
    assert_eq!(program.decls()[1].mangled_name(), Some("_GF4mainNEl"));
}

#[test]
fn a_checked_program_serializes_and_deserializes_losslessly() {
    let mut program = sample_program();
    let mut reporter = CollectingReporter::new();

    gallium_lang::analyze(&mut program, &mut reporter).unwrap();

    let json = serde_json::to_string(&program).unwrap();
    let restored: Program = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, program);
}

#[test]
fn analysis_reuses_the_same_reporter_across_phases() {
    // a resolution error stops the pipeline; the reporter keeps the
    // diagnostics from the phase that ran
    let broken = FnDeclaration::new(
        loc(),
        false,
        FnPrototype::new("f", None, vec![], vec![], Type::void()),
        Block::new(
            loc(),
            vec![ExpressionStatement::new(
                loc(),
                UnqualifiedIdentifier::new(loc(), UnqualifiedId::bare("missing")).into(),
            )
            .into()],
        )
        .into(),
    );

    let mut program = Program::new(vec![broken.into()]);
    let mut reporter = CollectingReporter::new();

    let result = gallium_lang::analyze(&mut program, &mut reporter);

    assert!(result.is_err());
    assert_eq!(reporter.codes(), vec![18]);
    assert!(backend::verify_contract(&program).is_err());
}
