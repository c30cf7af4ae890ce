//! Name resolution.
//!
//! Phase 1 ([`NameResolver::new`]) walks every declaration at module scope
//! and builds the global symbol table: unique entities keyed by name,
//! function overload sets keyed by unmangled name, and method tables keyed
//! by receiver. Mangle-capable declarations get their fully-qualified id
//! stamped here. Phase 2 ([`NameResolver::resolve`]) walks the whole tree
//! with a stack of lexical scopes and rewrites every unqualified
//! identifier and type into its resolved form.
//!
//! Resolution is idempotent: the rewrites only fire on unqualified nodes,
//! so running the resolver over an already-resolved tree changes nothing.

mod environment;

pub use self::environment::{
    Environment, GlobalEntity, GlobalEnvironment, ModuleTable, Overload, OverloadSet, Scope,
    ScopeEntity,
};

use log::trace;

use crate::ast::visit::{self, MutVisitor};
use crate::ast::{
    Declaration, Expression, FullyQualifiedId, Identifier, LocalIdentifier, Program, SelfKind,
    SourceLoc, StaticGlobal, Statement, Type, UnqualifiedId,
};
use crate::diagnostics::{point_out, DiagnosticReporter, Severity};

/// Handles resolving symbol names for locals, functions, and any global
/// symbol name, rewriting the AST with qualified nodes as it goes.
pub struct NameResolver {
    root: ModuleTable,
}

impl NameResolver {
    /// Phase 1: builds the global environment for the program's module and
    /// stamps fully-qualified ids.
    pub fn new(program: &mut Program, reporter: &mut dyn DiagnosticReporter) -> NameResolver {
        trace!("building global symbol table");

        let root = ModuleTable {
            nested: Default::default(),
            env: GlobalEnvironment::build(program, "::", reporter),
        };

        NameResolver { root }
    }

    /// The environment of the module with the given canonical path
    /// (`::`, `::a::b::`, ...), if that module exists.
    pub fn env_for(&self, module_string: &str) -> Option<&GlobalEnvironment> {
        let mut table = &self.root;

        for part in module_string.split("::").filter(|part| !part.is_empty()) {
            table = table.nested.get(part)?;
        }

        Some(&table.env)
    }

    pub fn overloads(&self, id: &FullyQualifiedId) -> Option<&OverloadSet> {
        self.env_for(id.module_string())?.overloads(id.name())
    }

    pub fn entity(&self, id: &FullyQualifiedId) -> Option<&GlobalEntity> {
        self.env_for(id.module_string())?.entity(id.name())
    }

    /// The type a fully-qualified id names, through aliases.
    pub fn ty(&self, id: &FullyQualifiedId) -> Option<&Type> {
        self.entity(id)?.ty()
    }

    /// The overload set for `method` on the receiver type named by the
    /// fully-qualified string `receiver`.
    pub fn methods(&self, receiver: &str, method: &str) -> Option<&OverloadSet> {
        // methods live in the environment of the module the receiver was
        // declared in
        let module_end = receiver.rfind("::").map(|i| i + 2).unwrap_or(0);

        self.env_for(&receiver[..module_end])?
            .methods(receiver, method)
    }

    /// Finds the environment that contains `id`, walking the module tree
    /// for prefixed references, and returns the fully-qualified form.
    pub fn qualified_for(
        &self,
        id: &UnqualifiedId,
    ) -> Option<(FullyQualifiedId, &GlobalEnvironment)> {
        let mut table = &self.root;
        let mut module_string = String::from("::");

        if let Some(prefix) = &id.prefix {
            // the program models one module, so a relative prefix starts
            // from the same table a rooted one does
            for part in &prefix.parts {
                table = table.nested.get(part)?;
                module_string.push_str(part);
                module_string.push_str("::");
            }
        }

        if table.env.contains_any(&id.name) {
            Some((FullyQualifiedId::new(module_string, &id.name), &table.env))
        } else {
            None
        }
    }

    /// Phase 2: local resolution and qualification over the whole tree.
    pub fn resolve(&self, program: &mut Program, reporter: &mut dyn DiagnosticReporter) {
        trace!("resolving and qualifying {} declarations", program.decls().len());

        let mut walk = ResolveWalk {
            resolver: self,
            reporter,
            env: Environment::new(),
        };

        for decl in program.decls_mut() {
            walk.visit_declaration(decl);
        }
    }
}

struct ResolveWalk<'a, 'r> {
    resolver: &'a NameResolver,
    reporter: &'r mut dyn DiagnosticReporter,
    env: Environment,
}

impl ResolveWalk<'_, '_> {
    fn add_local(&mut self, name: &str, loc: SourceLoc, ty: Type, mutable: bool) {
        self.env
            .add(name, ScopeEntity::new(loc, ty, mutable), self.reporter);
    }

    /// The replacement for an unqualified identifier reference, or `None`
    /// if the name resolves to nothing anywhere.
    fn resolve_identifier(&mut self, id: &UnqualifiedId, loc: &SourceLoc) -> Option<Expression> {
        if id.prefix.is_none() && self.env.contains(&id.name) {
            return Some(LocalIdentifier::new(loc.clone(), id.name.clone()).into());
        }

        let (fq, env) = self.resolver.qualified_for(id)?;

        if env.overloads(fq.name()).is_some() {
            // stays a pending callee until call checking picks an overload
            return Some(Identifier::new(loc.clone(), fq).into());
        }

        let entity = env.entity(fq.name())?;

        Some(StaticGlobal::new(loc.clone(), fq, entity.decl()).into())
    }

    /// The replacement for an unqualified user-defined type, or `None` if
    /// the name does not resolve to a type.
    fn resolve_type_name(&mut self, id: &UnqualifiedId, loc: &SourceLoc) -> Option<Type> {
        let (fq, env) = self.resolver.qualified_for(id)?;
        let entity = env.entity(fq.name())?;
        let mut replacement = entity.ty()?.clone();

        if let Type::UserDefined { loc: type_loc, .. } = &mut replacement {
            *type_loc = loc.clone();
        }

        Some(replacement)
    }
}

impl MutVisitor for ResolveWalk<'_, '_> {
    fn visit_declaration(&mut self, decl: &mut Declaration) {
        match decl {
            Declaration::Fn(decl) => {
                self.visit_prototype(&mut decl.proto);

                // parameters form the outermost scope of the body
                self.env.enter_scope();

                for arg in &decl.proto.args {
                    self.add_local(&arg.name.clone(), arg.loc.clone(), arg.ty.clone(), false);
                }

                self.visit_expression(&mut decl.body);
                self.env.leave_scope();
            }
            Declaration::Method(decl) => {
                self.visit_type(&mut decl.receiver);
                self.visit_prototype(&mut decl.proto);

                self.env.enter_scope();

                let mutable = matches!(
                    decl.proto.self_kind,
                    Some(SelfKind::MutRef) | Some(SelfKind::MutValue)
                );
                self.add_local("self", decl.loc.clone(), decl.receiver.clone(), mutable);

                for arg in &decl.proto.args {
                    self.add_local(&arg.name.clone(), arg.loc.clone(), arg.ty.clone(), false);
                }

                self.visit_expression(&mut decl.body);
                self.env.leave_scope();
            }
            other => visit::walk_declaration_mut(self, other),
        }
    }

    fn visit_statement(&mut self, stmt: &mut Statement) {
        visit::walk_statement_mut(self, stmt);

        if let Statement::Binding(binding) = stmt {
            let ty = binding.hint.clone().unwrap_or(Type::Error);

            self.add_local(
                &binding.name.clone(),
                binding.loc.clone(),
                ty,
                binding.mutable,
            );
        }
    }

    fn visit_expression(&mut self, expr: &mut Expression) {
        match expr {
            Expression::UnqualifiedIdentifier(identifier) => {
                for arg in &mut identifier.generic_args {
                    self.visit_type(arg);
                }

                let id = identifier.id.clone();
                let loc = identifier.loc.clone();

                match self.resolve_identifier(&id, &loc) {
                    Some(replacement) => *expr = replacement,
                    None => {
                        self.reporter.report_emplace(
                            18,
                            vec![point_out(loc, Severity::Error, "used here")],
                        );

                        *expr = Expression::Error;
                    }
                }
            }
            Expression::Block(block) => {
                self.env.enter_scope();

                for stmt in &mut block.statements {
                    self.visit_statement(stmt);
                }

                self.env.leave_scope();
            }
            Expression::For(for_loop) => {
                self.visit_expression(&mut for_loop.init);
                self.visit_expression(&mut for_loop.last);

                // the loop variable lives in its own scope around the body;
                // its type is fixed by the checker once `init` has one
                self.env.enter_scope();
                self.add_local(
                    &for_loop.loop_variable.clone(),
                    for_loop.loc.clone(),
                    Type::Error,
                    false,
                );
                self.visit_expression(&mut for_loop.body);
                self.env.leave_scope();
            }
            other => visit::walk_expression_mut(self, other),
        }
    }

    fn visit_type(&mut self, ty: &mut Type) {
        match ty {
            Type::UnqualifiedUserDefined {
                loc,
                id,
                generic_args,
            } => {
                for arg in generic_args.iter_mut() {
                    self.visit_type(arg);
                }

                let id = id.clone();
                let loc = loc.clone();
                let generic_args = std::mem::take(generic_args);

                match self.resolve_type_name(&id, &loc) {
                    Some(mut replacement) => {
                        if let Type::UserDefined {
                            generic_args: slot, ..
                        } = &mut replacement
                        {
                            *slot = generic_args;
                        }

                        *ty = replacement;
                    }
                    None => {
                        self.reporter.report_emplace(
                            14,
                            vec![point_out(loc, Severity::Error, "used here")],
                        );

                        *ty = Type::Error;
                    }
                }
            }
            Type::UnqualifiedDynInterface { loc, id } => {
                let id = id.clone();
                let loc = loc.clone();

                match self.resolver.qualified_for(&id) {
                    Some((fq, env)) if env.entity(fq.name()).is_some() => {
                        let decl = env.entity(fq.name()).unwrap().decl();

                        *ty = Type::DynInterface {
                            loc,
                            id: fq,
                            decl,
                        };
                    }
                    _ => {
                        self.reporter.report_emplace(
                            14,
                            vec![point_out(loc, Severity::Error, "used here")],
                        );

                        *ty = Type::Error;
                    }
                }
            }
            other => visit::walk_type_mut(self, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Argument, BindingStatement, Block, Call, ExpressionStatement, FnDeclaration, FnPrototype,
        IntegerLiteral, IntegerWidth, SourceLoc, StructDeclaration, UnqualifiedIdentifier,
    };
    use crate::diagnostics::CollectingReporter;

    fn unqualified(name: &str) -> Expression {
        UnqualifiedIdentifier::new(SourceLoc::default(), UnqualifiedId::bare(name)).into()
    }

    fn fn_with_body(name: &str, args: Vec<Argument>, statements: Vec<Statement>) -> Declaration {
        FnDeclaration::new(
            SourceLoc::default(),
            false,
            FnPrototype::new(name, None, args, vec![], Type::void()),
            Block::new(SourceLoc::default(), statements).into(),
        )
        .into()
    }

    fn resolve(program: &mut Program) -> CollectingReporter {
        let mut reporter = CollectingReporter::new();
        let resolver = NameResolver::new(program, &mut reporter);
        resolver.resolve(program, &mut reporter);
        reporter
    }

    fn body_statements(decl: &Declaration) -> &[Statement] {
        match decl {
            Declaration::Fn(decl) => match &decl.body {
                Expression::Block(block) => &block.statements,
                _ => panic!("function body is not a block"),
            },
            _ => panic!("not a function"),
        }
    }

    #[test]
    fn test_parameter_reference_becomes_local() {
        let mut program = Program::new(vec![fn_with_body(
            "f",
            vec![Argument::new(
                SourceLoc::default(),
                "x",
                Type::signed(IntegerWidth::W32),
            )],
            vec![ExpressionStatement::new(SourceLoc::default(), unqualified("x")).into()],
        )]);

        let reporter = resolve(&mut program);
        assert!(reporter.codes().is_empty());

        match &body_statements(&program.decls()[0])[0] {
            Statement::Expression(stmt) => {
                assert!(matches!(&stmt.expr, Expression::LocalIdentifier(local) if local.name == "x"));
            }
            _ => panic!("expected expression statement"),
        }
    }

    #[test]
    fn test_function_reference_becomes_qualified_identifier() {
        let mut program = Program::new(vec![
            fn_with_body("g", vec![], vec![]),
            fn_with_body(
                "f",
                vec![],
                vec![ExpressionStatement::new(
                    SourceLoc::default(),
                    Call::new(SourceLoc::default(), unqualified("g"), vec![]).into(),
                )
                .into()],
            ),
        ]);

        let reporter = resolve(&mut program);
        assert!(reporter.codes().is_empty());

        match &body_statements(&program.decls()[1])[0] {
            Statement::Expression(stmt) => match &stmt.expr {
                Expression::Call(call) => match call.callee.as_ref() {
                    Expression::Identifier(id) => assert_eq!(id.id.as_string(), "::g"),
                    other => panic!("expected qualified identifier, got {other:?}"),
                },
                other => panic!("expected call, got {other:?}"),
            },
            _ => panic!("expected expression statement"),
        }
    }

    #[test]
    fn test_unknown_identifier_reports_18_and_substitutes_error() {
        let mut program = Program::new(vec![fn_with_body(
            "f",
            vec![],
            vec![ExpressionStatement::new(SourceLoc::default(), unqualified("missing")).into()],
        )]);

        let reporter = resolve(&mut program);
        assert_eq!(reporter.codes(), vec![18]);

        match &body_statements(&program.decls()[0])[0] {
            Statement::Expression(stmt) => assert!(stmt.expr.is_error()),
            _ => panic!("expected expression statement"),
        }
    }

    #[test]
    fn test_unqualified_type_resolves_to_struct() {
        let mut program = Program::new(vec![
            StructDeclaration::new(SourceLoc::default(), false, "S", vec![]).into(),
            fn_with_body(
                "f",
                vec![],
                vec![BindingStatement::new(
                    SourceLoc::default(),
                    "s",
                    false,
                    Some(Type::UnqualifiedUserDefined {
                        loc: SourceLoc::default(),
                        id: UnqualifiedId::bare("S"),
                        generic_args: vec![],
                    }),
                    unqualified("s_init"),
                )
                .into()],
            ),
        ]);

        // `s_init` is unknown; we only care about the type rewrite here
        let reporter = resolve(&mut program);
        assert_eq!(reporter.codes(), vec![18]);

        match &body_statements(&program.decls()[1])[0] {
            Statement::Binding(binding) => match binding.hint.as_ref().unwrap() {
                Type::UserDefined { id, .. } => assert_eq!(id.as_string(), "::S"),
                other => panic!("expected user-defined type, got {other:?}"),
            },
            _ => panic!("expected binding"),
        }
    }

    #[test]
    fn test_unknown_type_reports_14() {
        let mut program = Program::new(vec![fn_with_body(
            "f",
            vec![],
            vec![BindingStatement::new(
                SourceLoc::default(),
                "x",
                false,
                Some(Type::UnqualifiedUserDefined {
                    loc: SourceLoc::default(),
                    id: UnqualifiedId::bare("Nope"),
                    generic_args: vec![],
                }),
                IntegerLiteral::new(SourceLoc::default(), 1).into(),
            )
            .into()],
        )]);

        let reporter = resolve(&mut program);
        assert_eq!(reporter.codes(), vec![14]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut program = Program::new(vec![
            fn_with_body("g", vec![], vec![]),
            fn_with_body(
                "f",
                vec![Argument::new(
                    SourceLoc::default(),
                    "x",
                    Type::signed(IntegerWidth::W32),
                )],
                vec![
                    ExpressionStatement::new(SourceLoc::default(), unqualified("x")).into(),
                    ExpressionStatement::new(
                        SourceLoc::default(),
                        Call::new(SourceLoc::default(), unqualified("g"), vec![]).into(),
                    )
                    .into(),
                ],
            ),
        ]);

        let reporter = resolve(&mut program);
        assert!(reporter.codes().is_empty());

        let once = program.clone();
        let reporter = resolve(&mut program);

        assert!(reporter.codes().is_empty());
        assert_eq!(program, once);
    }

    #[test]
    fn test_same_scope_duplicate_binding_reports_8() {
        let binding = |name: &str| -> Statement {
            BindingStatement::new(
                SourceLoc::default(),
                name,
                false,
                Some(Type::bool_type()),
                IntegerLiteral::new(SourceLoc::default(), 1).into(),
            )
            .into()
        };

        let mut program = Program::new(vec![fn_with_body(
            "f",
            vec![],
            vec![binding("x"), binding("x")],
        )]);

        let reporter = resolve(&mut program);
        assert_eq!(reporter.codes(), vec![8]);
    }
}
