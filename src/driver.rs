//! The front-end pipeline.
//!
//! Orders the passes the way the compiler driver runs them: inject the
//! predefined declarations, resolve names, type check, mangle. Passes
//! never abort on a user error; the driver checks the reporter between
//! phases and refuses to hand a broken tree to the next one.

use anyhow::{bail, Result};
use log::debug;

use crate::ast::Program;
use crate::diagnostics::{make_plural, DiagnosticReporter};
use crate::resolver::NameResolver;
use crate::{mangler, predefined, typechecker};

/// Runs the whole front-end over a freshly parsed program. On success the
/// tree is fully resolved, fully typed and fully mangled, ready for a
/// code generator (see [`crate::backend`]).
pub fn analyze(program: &mut Program, reporter: &mut dyn DiagnosticReporter) -> Result<()> {
    predefined::register_predefined(program);

    let resolver = NameResolver::new(program, reporter);
    resolver.resolve(program, reporter);

    if reporter.had_error() {
        bail!(
            "name resolution failed with {} {}",
            reporter.count(),
            make_plural(reporter.count() as u64, "diagnostics")
        );
    }

    typechecker::check(program, &resolver, reporter);

    if reporter.had_error() {
        bail!(
            "type checking failed with {} {}",
            reporter.count(),
            make_plural(reporter.count() as u64, "diagnostics")
        );
    }

    mangler::mangle_program(program);

    debug!(
        "front-end finished, {} declarations ready for code generation",
        program.decls().len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Block, Declaration, ExpressionStatement, FnDeclaration, FnPrototype, IntegerLiteral,
        IntegerWidth, Return, SourceLoc, Type,
    };
    use crate::diagnostics::CollectingReporter;

    fn main_fn() -> Declaration {
        FnDeclaration::new(
            SourceLoc::default(),
            false,
            FnPrototype::new("main", None, vec![], vec![], Type::signed(IntegerWidth::W32)),
            Block::new(
                SourceLoc::default(),
                vec![ExpressionStatement::new(
                    SourceLoc::default(),
                    Return::new(
                        SourceLoc::default(),
                        Some(IntegerLiteral::new(SourceLoc::default(), 0).into()),
                    )
                    .into(),
                )
                .into()],
            )
            .into(),
        )
        .into()
    }

    #[test]
    fn test_minimal_program_analyzes_cleanly() {
        let mut program = Program::new(vec![main_fn()]);
        let mut reporter = CollectingReporter::new();

        analyze(&mut program, &mut reporter).unwrap();

        assert!(!reporter.had_error(), "codes: {:?}", reporter.codes());
        crate::backend::verify_contract(&program).unwrap();
    }

    #[test]
    fn test_driver_refuses_to_continue_past_errors() {
        use crate::ast::{UnqualifiedId, UnqualifiedIdentifier};

        let body = Block::new(
            SourceLoc::default(),
            vec![ExpressionStatement::new(
                SourceLoc::default(),
                UnqualifiedIdentifier::new(SourceLoc::default(), UnqualifiedId::bare("ghost"))
                    .into(),
            )
            .into()],
        );
        let decl = FnDeclaration::new(
            SourceLoc::default(),
            false,
            FnPrototype::new("f", None, vec![], vec![], Type::void()),
            body.into(),
        );

        let mut program = Program::new(vec![decl.into()]);
        let mut reporter = CollectingReporter::new();

        assert!(analyze(&mut program, &mut reporter).is_err());
        assert_eq!(reporter.codes(), vec![18]);

        // mangling never ran
        assert!(program.decls()[0].mangled_name().is_none());
    }
}
