use gallium_lang::ast::*;
use gallium_lang::diagnostics::CollectingReporter;
use gallium_lang::resolver::NameResolver;

fn loc() -> SourceLoc {
    SourceLoc::default()
}

fn name(id: &str) -> Expression {
    UnqualifiedIdentifier::new(loc(), UnqualifiedId::bare(id)).into()
}

fn rooted_name(id: &str) -> Expression {
    UnqualifiedIdentifier::new(loc(), UnqualifiedId::new(Some(ModuleId::root()), id)).into()
}

fn expr_stmt(expr: Expression) -> Statement {
    ExpressionStatement::new(loc(), expr).into()
}

fn fn_decl(name: &str, statements: Vec<Statement>) -> Declaration {
    FnDeclaration::new(
        loc(),
        false,
        FnPrototype::new(name, None, vec![], vec![], Type::void()),
        Block::new(loc(), statements).into(),
    )
    .into()
}

fn resolve(program: &mut Program) -> (NameResolver, CollectingReporter) {
    let mut reporter = CollectingReporter::new();
    let resolver = NameResolver::new(program, &mut reporter);
    resolver.resolve(program, &mut reporter);

    (resolver, reporter)
}

fn first_body_expr(decl: &Declaration) -> &Expression {
    match decl {
        Declaration::Fn(decl) => match &decl.body {
            Expression::Block(block) => match &block.statements[0] {
                Statement::Expression(stmt) => &stmt.expr,
                other => panic!("expected expression statement, got {other:?}"),
            },
            other => panic!("expected block body, got {other:?}"),
        },
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn constant_reference_becomes_static_global() {
    let constant = ConstantDeclaration::new(
        loc(),
        false,
        "LIMIT",
        Type::signed(IntegerWidth::W32),
        IntegerLiteral::new(loc(), 100).into(),
    );

    let mut program = Program::new(vec![
        constant.into(),
        fn_decl("f", vec![expr_stmt(name("LIMIT"))]),
    ]);

    let (resolver, reporter) = resolve(&mut program);
    assert!(reporter.codes().is_empty());

    match first_body_expr(&program.decls()[1]) {
        Expression::StaticGlobal(global) => {
            assert_eq!(global.id.as_string(), "::LIMIT");
            assert_eq!(global.decl, DeclRef::top_level(0));
        }
        other => panic!("expected static global, got {other:?}"),
    }

    // the entity carries the constant's hinted type
    let entity = resolver
        .entity(&FullyQualifiedId::in_root("LIMIT"))
        .unwrap();
    assert_eq!(entity.ty(), Some(&Type::signed(IntegerWidth::W32)));
}

#[test]
fn rooted_prefix_resolves_through_the_module_tree() {
    let mut program = Program::new(vec![
        fn_decl("g", vec![]),
        fn_decl("f", vec![expr_stmt(rooted_name("g"))]),
    ]);

    let (_, reporter) = resolve(&mut program);
    assert!(reporter.codes().is_empty());

    match first_body_expr(&program.decls()[1]) {
        Expression::Identifier(id) => assert_eq!(id.id.as_string(), "::g"),
        other => panic!("expected qualified identifier, got {other:?}"),
    }
}

#[test]
fn missing_module_prefix_is_unknown_identifier() {
    let prefixed = UnqualifiedIdentifier::new(
        loc(),
        UnqualifiedId::new(Some(ModuleId::new(true, vec!["nope".into()])), "g"),
    );

    let mut program = Program::new(vec![fn_decl("f", vec![expr_stmt(prefixed.into())])]);

    let (_, reporter) = resolve(&mut program);
    assert_eq!(reporter.codes(), vec![18]);
}

#[test]
fn type_alias_resolves_to_the_aliased_type() {
    let alias = TypeAliasDeclaration::new(
        loc(),
        false,
        "Word",
        Type::unsigned(IntegerWidth::W64),
    );

    let binding = BindingStatement::new(
        loc(),
        "x",
        false,
        Some(Type::UnqualifiedUserDefined {
            loc: loc(),
            id: UnqualifiedId::bare("Word"),
            generic_args: vec![],
        }),
        IntegerLiteral::new(loc(), 1).into(),
    );

    let mut program = Program::new(vec![alias.into(), fn_decl("f", vec![binding.into()])]);

    let (_, reporter) = resolve(&mut program);
    assert!(reporter.codes().is_empty());

    match &program.decls()[1] {
        Declaration::Fn(decl) => match &decl.body {
            Expression::Block(block) => match &block.statements[0] {
                Statement::Binding(binding) => {
                    assert_eq!(
                        binding.hint.as_ref(),
                        Some(&Type::unsigned(IntegerWidth::W64))
                    );
                }
                other => panic!("expected binding, got {other:?}"),
            },
            _ => unreachable!(),
        },
        _ => unreachable!(),
    }
}

#[test]
fn duplicate_declarations_and_conflicting_overloads() {
    let structs = |name: &str| -> Declaration {
        StructDeclaration::new(loc(), false, name, vec![]).into()
    };

    let mut program = Program::new(vec![
        structs("S"),
        structs("S"),
        fn_decl("f", vec![]),
        fn_decl("f", vec![]),
    ]);

    let (_, reporter) = resolve(&mut program);
    assert_eq!(reporter.codes(), vec![6, 9]);
}

#[test]
fn a_function_and_a_struct_may_share_a_name() {
    // entities and overload sets are separate namespaces
    let mut program = Program::new(vec![
        StructDeclaration::new(loc(), false, "thing", vec![]).into(),
        fn_decl("thing", vec![]),
    ]);

    let (resolver, reporter) = resolve(&mut program);
    assert!(reporter.codes().is_empty());

    let id = FullyQualifiedId::in_root("thing");
    assert!(resolver.entity(&id).is_some());
    assert!(resolver.overloads(&id).is_some());
}

#[test]
fn externals_contribute_overloads_through_their_block() {
    let puts = ExternalFnDeclaration::new(
        loc(),
        false,
        FnPrototype::new(
            "puts",
            None,
            vec![Argument::new(
                loc(),
                "s",
                Type::pointer(false, Type::char_type()),
            )],
            vec![],
            Type::signed(IntegerWidth::W32),
        ),
    );
    let block = ExternalDeclaration::new(loc(), false, vec![puts.into()]);

    let mut program = Program::new(vec![
        block.into(),
        fn_decl(
            "f",
            vec![expr_stmt(
                Call::new(loc(), name("puts"), vec![]).into(),
            )],
        ),
    ]);

    let (resolver, reporter) = resolve(&mut program);
    assert!(reporter.codes().is_empty());

    let set = resolver
        .overloads(&FullyQualifiedId::in_root("puts"))
        .unwrap();

    assert_eq!(set.fns().len(), 1);
    assert_eq!(set.fns()[0].decl(), DeclRef::member(0, 0));
    assert!(set.fns()[0].external());
}

#[test]
fn resolving_twice_changes_nothing() {
    let constant = ConstantDeclaration::new(
        loc(),
        false,
        "LIMIT",
        Type::signed(IntegerWidth::W32),
        IntegerLiteral::new(loc(), 100).into(),
    );

    let mut program = Program::new(vec![
        constant.into(),
        StructDeclaration::new(
            loc(),
            false,
            "S",
            vec![Field::new(loc(), "v", Type::bool_type())],
        )
        .into(),
        fn_decl("g", vec![]),
        fn_decl(
            "f",
            vec![
                expr_stmt(name("LIMIT")),
                expr_stmt(Call::new(loc(), name("g"), vec![]).into()),
            ],
        ),
    ]);

    let (_, reporter) = resolve(&mut program);
    assert!(reporter.codes().is_empty());

    let resolved_once = program.clone();

    let (_, reporter) = resolve(&mut program);
    assert!(reporter.codes().is_empty());
    assert_eq!(program, resolved_once);
}
