//! The type checker.
//!
//! A single traversal over the resolved tree that computes a result type
//! for every expression, stores it on the node, inserts implicit
//! conversion wrappers where an expected type requires one, resolves
//! overloaded calls into static calls, and enforces the language rules
//! (mutability, literal range, control-flow context, operator typing).
//!
//! Like every pass, the checker never aborts: a rule violation reports a
//! diagnostic, substitutes the error type into the offending slot and
//! keeps going. The error type compares equal to everything, so one
//! mistake produces one diagnostic instead of a cascade.
//!
//! Lvalue-ness is tracked through the compiler-internal indirection type:
//! expressions that denote a place (locals, fields, indexes, derefs) have
//! their real type wrapped in an indirection marker carrying mutability.
//! Value contexts look through the marker; assignment and `&mut` require
//! it.

mod conversions;
mod expr;

pub use self::conversions::{
    applicability, coerce, default_integral, fix_unsized, safe_cast_allowed, select_overload,
    Applicability, OverloadChoice,
};

use log::trace;

use crate::ast::{
    Declaration, Expression, IntegerWidth, Program, SelfKind, Statement, Type,
};
use crate::diagnostics::{point_out, point_out_list, point_out_part, DiagnosticReporter, Severity};
use crate::resolver::{Environment, NameResolver, ScopeEntity};

/// Checks the whole program in place. Requires that the resolver has
/// already run over it.
pub fn check(
    program: &mut Program,
    resolver: &NameResolver,
    reporter: &mut dyn DiagnosticReporter,
) {
    trace!("type checking {} declarations", program.decls().len());

    let mut checker = TypeChecker {
        resolver,
        reporter,
        env: Environment::new(),
        expected_return: None,
        loops: vec![],
    };

    for decl in program.decls_mut() {
        checker.check_declaration(decl);
    }

    checker.check_main(program);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    Loop,
    While,
    For,
}

struct LoopFrame {
    kind: LoopKind,
    break_value: Option<Type>,
}

struct TypeChecker<'a> {
    resolver: &'a NameResolver,
    reporter: &'a mut dyn DiagnosticReporter,
    env: Environment,
    expected_return: Option<Type>,
    loops: Vec<LoopFrame>,
}

impl TypeChecker<'_> {
    fn check_declaration(&mut self, decl: &mut Declaration) {
        match decl {
            Declaration::Fn(decl) => {
                self.env.enter_scope();

                for arg in &decl.proto.args {
                    self.env.insert(
                        &arg.name.clone(),
                        ScopeEntity::new(arg.loc.clone(), arg.ty.clone(), false),
                    );
                }

                self.expected_return = Some(decl.proto.return_type.clone());
                self.check_expression(&mut decl.body);
                self.check_body_type(&mut decl.body, &decl.proto.return_type.clone());
                self.expected_return = None;

                self.env.leave_scope();
            }
            Declaration::Method(decl) => {
                self.env.enter_scope();

                let mutable = matches!(
                    decl.proto.self_kind,
                    Some(SelfKind::MutRef) | Some(SelfKind::MutValue)
                );
                self.env.insert(
                    "self",
                    ScopeEntity::new(decl.loc.clone(), decl.receiver.clone(), mutable),
                );

                for arg in &decl.proto.args {
                    self.env.insert(
                        &arg.name.clone(),
                        ScopeEntity::new(arg.loc.clone(), arg.ty.clone(), false),
                    );
                }

                self.expected_return = Some(decl.proto.return_type.clone());
                self.check_expression(&mut decl.body);
                self.check_body_type(&mut decl.body, &decl.proto.return_type.clone());
                self.expected_return = None;

                self.env.leave_scope();
            }
            Declaration::Constant(decl) => {
                let hint = decl.hint.clone();
                self.check_expression(&mut decl.initializer);

                if conversions::coerce(&mut decl.initializer, &hint, self.reporter).is_err() {
                    let actual = result_of(&decl.initializer);
                    let error = point_out_part(
                        decl.initializer.loc(),
                        Severity::Error,
                        format!("real type was `{actual}`"),
                    );
                    let expected = point_out_part(
                        hint.loc(),
                        Severity::Note,
                        format!("expected type `{hint}`"),
                    );

                    self.reporter
                        .report_emplace(7, vec![point_out_list(vec![error, expected])]);
                }
            }
            _ => {}
        }
    }

    /// Enforces that a function body evaluates to the declared return
    /// type. A body whose final statement is a `return` already had its
    /// value checked at the return site.
    fn check_body_type(&mut self, body: &mut Expression, return_type: &Type) {
        if matches!(return_type.as_rvalue(), Type::Void { .. }) || ends_in_return(body) {
            return;
        }

        if conversions::coerce(body, return_type, self.reporter).is_err() {
            let actual = result_of(body);

            self.reporter.report_emplace(
                31,
                vec![point_out(
                    body.loc(),
                    Severity::Error,
                    format!("body evaluates to `{actual}`, expected `{return_type}`"),
                )],
            );
        }
    }

    fn check_statement(&mut self, stmt: &mut Statement) -> Type {
        match stmt {
            Statement::Binding(binding) => {
                self.check_expression(&mut binding.initializer);

                let ty = match binding.hint.clone() {
                    Some(hint) => {
                        if conversions::coerce(&mut binding.initializer, &hint, self.reporter)
                            .is_err()
                        {
                            let actual = result_of(&binding.initializer);
                            let error = point_out_part(
                                binding.initializer.loc(),
                                Severity::Error,
                                format!("real type was `{actual}`"),
                            );
                            let expected = point_out_part(
                                hint.loc(),
                                Severity::Note,
                                format!("expected type `{hint}`"),
                            );

                            self.reporter
                                .report_emplace(7, vec![point_out_list(vec![error, expected])]);
                        }

                        hint
                    }
                    None => {
                        if matches!(
                            result_of(&binding.initializer).as_rvalue(),
                            Type::NilPointer { .. }
                        ) {
                            self.reporter.report_emplace(
                                21,
                                vec![point_out(
                                    binding.initializer.loc(),
                                    Severity::Error,
                                    "cast this to a pointer type",
                                )],
                            );

                            Type::Error
                        } else {
                            conversions::fix_unsized(&mut binding.initializer);
                            result_of(&binding.initializer).into_rvalue()
                        }
                    }
                };

                self.env.insert(
                    &binding.name.clone(),
                    ScopeEntity::new(binding.loc.clone(), ty, binding.mutable),
                );

                Type::void()
            }
            Statement::Assert(assert) => {
                let condition = self.check_expression(&mut assert.assertion).into_rvalue();

                if !matches!(condition, Type::Bool { .. }) && !condition.is_error() {
                    self.reporter.report_emplace(
                        15,
                        vec![point_out(
                            assert.assertion.loc(),
                            Severity::Error,
                            format!("condition has type `{condition}`"),
                        )],
                    );
                }

                self.check_expression(&mut assert.message);

                Type::void()
            }
            Statement::Expression(stmt) => self.check_expression(&mut stmt.expr),
        }
    }

    /// `main`, when declared, must be `fn main() -> i32`. It is the only
    /// unmangled user function.
    fn check_main(&mut self, program: &Program) {
        for decl in program.decls() {
            let Declaration::Fn(decl) = decl else {
                continue;
            };

            if decl.injected || decl.proto.name != "main" {
                continue;
            }

            let returns_i32 = decl.proto.return_type == Type::signed(IntegerWidth::W32);

            if !decl.proto.args.is_empty() || decl.proto.self_kind.is_some() || !returns_i32 {
                self.reporter.report_emplace(
                    52,
                    vec![point_out(
                        decl.loc.clone(),
                        Severity::Error,
                        "declared here",
                    )],
                );
            }
        }
    }
}

/// The result type already stored on a checked expression, with the error
/// type standing in for the (never expected) unchecked case.
fn result_of(expr: &Expression) -> Type {
    expr.result().cloned().unwrap_or(Type::Error)
}

/// Whether a block's final statement is a `return`, which makes the
/// block's own value irrelevant to the function's return type.
fn ends_in_return(body: &Expression) -> bool {
    match body {
        Expression::Block(block) => matches!(
            block.statements.last(),
            Some(Statement::Expression(stmt)) if matches!(stmt.expr, Expression::Return(_))
        ),
        Expression::Return(_) => true,
        _ => false,
    }
}

/// Splits the lvalue marker off a type: `Some((mutable, produced))` when
/// the expression denotes a place.
fn lvalue_info(ty: &Type) -> Option<(bool, Type)> {
    match ty {
        Type::Indirection {
            mutable, produced, ..
        } => Some((*mutable, (**produced).clone())),
        _ => None,
    }
}
