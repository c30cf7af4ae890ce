use gallium_lang::ast::*;
use gallium_lang::diagnostics::CollectingReporter;
use gallium_lang::mangler::{demangle, mangle};

fn loc() -> SourceLoc {
    SourceLoc::default()
}

fn fn_decl(name: &str, args: Vec<(&str, Type)>, ret: Type, statements: Vec<Statement>) -> Declaration {
    let args = args
        .into_iter()
        .map(|(name, ty)| Argument::new(loc(), name, ty))
        .collect();

    FnDeclaration::new(
        loc(),
        false,
        FnPrototype::new(name, None, args, vec![], ret),
        Block::new(loc(), statements).into(),
    )
    .into()
}

/// Runs the whole pipeline so ids come from the resolver and symbols from
/// the mangling pass, exactly as a driver would produce them.
fn analyzed(decls: Vec<Declaration>) -> Program {
    let mut program = Program::new(decls);
    let mut reporter = CollectingReporter::new();

    gallium_lang::analyze(&mut program, &mut reporter)
        .unwrap_or_else(|e| panic!("{e}: {:?}", reporter.codes()));

    program
}

#[test]
fn the_pipeline_stamps_resolver_derived_symbols() {
    let program = analyzed(vec![
        fn_decl("f", vec![], Type::void(), vec![]),
        fn_decl(
            "g",
            vec![("x", Type::signed(IntegerWidth::W32))],
            Type::bool_type(),
            vec![ExpressionStatement::new(
                loc(),
                Return::new(loc(), Some(BoolLiteral::new(loc(), true).into())).into(),
            )
            .into()],
        ),
    ]);

    assert_eq!(program.decls()[0].mangled_name(), Some("_GF1fNEv"));
    assert_eq!(program.decls()[1].mangled_name(), Some("_GF1gNlEb"));
}

#[test]
fn void_main_gets_the_fixed_linker_name() {
    // the fixed-name exception matches the original's void `main`; the
    // i32 signature rule is enforced separately by the checker
    let mut decl = FnDeclaration::new(
        loc(),
        false,
        FnPrototype::new("main", None, vec![], vec![], Type::void()),
        Block::new(loc(), vec![]).into(),
    );
    decl.id = Some(FullyQualifiedId::in_root("main"));

    assert_eq!(mangle(&decl.into()), "__gallium_user_main");
    assert_eq!(demangle("__gallium_user_main"), "fn ::main() -> void");
}

#[test]
fn user_defined_argument_types_mangle_with_substitutions() {
    let point = StructDeclaration::new(
        loc(),
        false,
        "Point",
        vec![Field::new(loc(), "x", Type::signed(IntegerWidth::W32))],
    );

    let point_ty = Type::UnqualifiedUserDefined {
        loc: loc(),
        id: UnqualifiedId::bare("Point"),
        generic_args: vec![],
    };

    let program = analyzed(vec![
        point.into(),
        fn_decl(
            "dist",
            vec![("a", point_ty.clone()), ("b", point_ty)],
            Type::void(),
            vec![],
        ),
    ]);

    // the first `::Point` registers substitution 0, the second reuses it
    assert_eq!(program.decls()[1].mangled_name(), Some("_GF4distNU5PointZ0_Ev"));
    assert_eq!(
        demangle("_GF4distNU5PointZ0_Ev"),
        "fn ::dist(::Point, ::Point) -> void"
    );
}

#[test]
fn demangling_symbols_round_trips_the_prototype_shape() {
    let cases = [
        ("_GF1fNEv", "fn ::f() -> void"),
        (
            "_G4core3memF8allocateTR4core3memU6LayoutS4core3memU10AllocationEZ1_",
            "fn ::core::mem::allocate(&::core::mem::Layout, &mut ::core::mem::Allocation) \
             throws -> ::core::mem::Allocation",
        ),
        ("_GF1fN1sU1SZ0_1qU1QEZ1_", "fn ::f(::s::S, ::s::S, ::q::Q) -> ::q::Q"),
        (
            "_G4core4math8internalC17pi_full_precisionr",
            "const ::core::math::internal::pi_full_precision: f128",
        ),
    ];

    for (symbol, expected) in cases {
        assert_eq!(demangle(symbol), expected);
    }
}

#[test]
fn equal_prototypes_produce_equal_symbols() {
    let make = || {
        let mut decl = FnDeclaration::new(
            loc(),
            false,
            FnPrototype::new(
                "compute",
                None,
                vec![Argument::new(
                    loc(),
                    "x",
                    Type::slice(false, Type::unsigned(IntegerWidth::W8)),
                )],
                vec![],
                Type::unsigned(IntegerWidth::Native),
            ),
            Block::new(loc(), vec![]).into(),
        );
        decl.id = Some(FullyQualifiedId::new("::hash::", "compute"));
        Declaration::from(decl)
    };

    assert_eq!(mangle(&make()), mangle(&make()));
}

#[test]
fn extern_functions_pass_through_unmangled() {
    let memcpy = ExternalFnDeclaration::new(
        loc(),
        false,
        FnPrototype::new("memcpy", None, vec![], vec![], Type::void()),
    );
    let block = ExternalDeclaration::new(loc(), false, vec![memcpy.into()]);

    let program = analyzed(vec![block.into()]);

    let member = program.decl(DeclRef::member(0, 0));
    assert_eq!(member.mangled_name(), Some("memcpy"));
    assert_eq!(demangle("memcpy"), "memcpy");
}
