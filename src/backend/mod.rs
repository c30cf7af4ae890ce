//! The boundary the code generator consumes.
//!
//! The front-end hands a back end a [`Program`] that is fully resolved,
//! fully typed and fully mangled: every mangle-capable declaration has its
//! symbol, every reachable expression has a result type, every call has
//! been rewritten to a static call or checked as a function-pointer call,
//! and no unqualified identifier or type nodes remain. Declaration
//! back-pointers stay valid for the program's lifetime. How a back end
//! assigns storage (registers versus memory) is entirely its own concern.

pub mod const_fold;

use std::fmt::{self, Display, Formatter};

use crate::ast::visit::{self, Visitor};
use crate::ast::{Declaration, Expression, Program, SourceLoc, Type};

/// A back end. The driver hands it the finished program; everything the
/// generator needs is reachable from there.
pub trait CodeGenerator {
    type Output;

    fn generate(&mut self, program: &Program) -> Self::Output;
}

/// A broken promise in the front-end → back-end contract. These indicate
/// bugs in the front end (or a driver skipping a phase), never user
/// errors.
#[derive(Debug, Clone)]
pub struct ContractViolation {
    pub message: String,
    pub loc: SourceLoc,
}

impl Display for ContractViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.loc.is_nonexistent() {
            f.write_str(&self.message)
        } else {
            write!(
                f,
                "{} (at {}:{}:{})",
                self.message,
                self.loc.file().display(),
                self.loc.line(),
                self.loc.column()
            )
        }
    }
}

/// Checks that a program upholds the back-end contract. Intended for
/// drivers and tests; a passing check means the tree is safe to hand to a
/// [`CodeGenerator`].
pub fn verify_contract(program: &Program) -> Result<(), Vec<ContractViolation>> {
    let mut check = ContractCheck { violations: vec![] };

    for decl in program.decls() {
        check.check_mangled(decl);
        check.visit_declaration(decl);
    }

    if check.violations.is_empty() {
        Ok(())
    } else {
        Err(check.violations)
    }
}

struct ContractCheck {
    violations: Vec<ContractViolation>,
}

impl ContractCheck {
    fn violation(&mut self, loc: SourceLoc, message: impl Into<String>) {
        self.violations.push(ContractViolation {
            message: message.into(),
            loc,
        });
    }

    fn check_mangled(&mut self, decl: &Declaration) {
        match decl {
            Declaration::Fn(_) | Declaration::ExternalFn(_) | Declaration::Constant(_) => {
                if decl.mangled_name().is_none() {
                    self.violation(
                        decl.loc(),
                        format!(
                            "declaration `{}` has no mangled name",
                            decl.name().unwrap_or("<unnamed>")
                        ),
                    );
                }
            }
            Declaration::External(block) => {
                for member in &block.externals {
                    self.check_mangled(member);
                }
            }
            _ => {}
        }
    }
}

impl Visitor for ContractCheck {
    fn visit_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::UnqualifiedIdentifier(e) => {
                self.violation(e.loc.clone(), "unqualified identifier survived resolution");
            }
            Expression::MethodCall(e) => {
                self.violation(e.loc.clone(), "method call was never resolved");
            }
            Expression::Call(e) => {
                if matches!(e.callee.as_ref(), Expression::Identifier(_)) {
                    self.violation(e.loc.clone(), "call was never rewritten to a static call");
                }
            }
            _ => {}
        }

        if expr.result().is_none() {
            self.violation(expr.loc(), "expression has no result type");
        }

        visit::walk_expression(self, expr);
    }

    fn visit_type(&mut self, ty: &Type) {
        if matches!(
            ty,
            Type::UnqualifiedUserDefined { .. } | Type::UnqualifiedDynInterface { .. }
        ) {
            self.violation(ty.loc(), "unqualified type survived resolution");
        }

        visit::walk_type(self, ty);
    }
}
