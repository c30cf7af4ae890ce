//! Registration of the predefined declarations every program gets before
//! resolution runs: the `__builtin_*` intrinsics, the runtime's I/O FFI
//! surface, and the stdlib `print`/`println` shims built on top of them.
//!
//! Everything injected here carries a nonexistent source location and the
//! `injected` flag, and participates in overload resolution like any other
//! extern. Intrinsics get special treatment from the back end; that is
//! none of the front-end's business.

use crate::ast::{
    Argument, Attribute, AttributeKind, Block, Call, Cast, CharLiteral, Declaration, Expression,
    ExpressionStatement, ExternalDeclaration, ExternalFnDeclaration, FloatWidth, FnDeclaration,
    FnPrototype, IntegerLiteral, IntegerWidth, Program, SourceLoc, Statement, Type, UnqualifiedId,
    UnqualifiedIdentifier,
};

/// Whether a function name refers to a compiler intrinsic.
pub fn is_builtin(name: &str) -> bool {
    name.starts_with("__builtin")
}

/// Injects every predefined declaration into the program. Must run before
/// name resolution so the predefined names participate in it.
pub fn register_predefined(program: &mut Program) {
    register_builtins(program);
    register_io_ffi(program);
    register_io(program);
}

fn loc() -> SourceLoc {
    SourceLoc::nonexistent()
}

fn arg(name: &str, ty: Type) -> Argument {
    Argument::new(loc(), name, ty)
}

fn numbered_args(types: Vec<Type>) -> Vec<Argument> {
    types
        .into_iter()
        .enumerate()
        .map(|(i, ty)| arg(&format!("__{}", i + 1), ty))
        .collect()
}

fn create_builtin(
    name: &str,
    args: Vec<Argument>,
    attributes: Vec<Attribute>,
    ret: Type,
) -> Declaration {
    let proto = FnPrototype::new(name, None, args, attributes, ret);
    let mut decl = ExternalFnDeclaration::new(loc(), false, proto);
    decl.injected = true;

    decl.into()
}

fn injected_external_block(externals: Vec<Declaration>) -> Declaration {
    let mut block = ExternalDeclaration::new(loc(), false, externals);
    block.injected = true;

    block.into()
}

fn create_id(name: &str) -> Expression {
    UnqualifiedIdentifier::new(loc(), UnqualifiedId::bare(name)).into()
}

fn create_call(name: &str, args: Vec<Expression>) -> Expression {
    Call::new(loc(), create_id(name), args).into()
}

fn create_cast(operand: Expression, to: Type) -> Expression {
    Cast::new(loc(), false, operand, to).into()
}

fn char_literal(value: u8) -> Expression {
    // char literals type as `u8`; the shim bodies cast where a `char` is
    // actually wanted
    CharLiteral::new(loc(), value).into()
}

fn exprs_into_block(exprs: Vec<Expression>) -> Expression {
    let statements: Vec<Statement> = exprs
        .into_iter()
        .map(|expr| ExpressionStatement::new(loc(), expr).into())
        .collect();

    Block::new(loc(), statements).into()
}

fn create_stdlib_fn(name: &str, arg_types: Vec<Type>, body: Expression) -> Declaration {
    let proto = FnPrototype::new(
        name,
        None,
        numbered_args(arg_types),
        vec![Attribute::new(AttributeKind::Stdlib)],
        Type::void(),
    );

    let mut decl = FnDeclaration::new(loc(), false, proto, body);
    decl.injected = true;

    decl.into()
}

fn register_builtins(program: &mut Program) {
    let trap = create_builtin(
        "__builtin_trap",
        vec![],
        vec![Attribute::new(AttributeKind::NoReturn)],
        Type::void(),
    );

    let string_ptr = create_builtin(
        "__builtin_string_ptr",
        vec![arg("__1", Type::slice(false, Type::char_type()))],
        vec![],
        Type::pointer(false, Type::char_type()),
    );

    let string_len = create_builtin(
        "__builtin_string_len",
        vec![arg("__1", Type::slice(false, Type::char_type()))],
        vec![],
        Type::unsigned(IntegerWidth::Native),
    );

    let black_box = create_builtin(
        "__builtin_black_box",
        vec![arg("__1", Type::pointer(false, Type::byte_type()))],
        vec![],
        Type::void(),
    );

    program.add_decl(injected_external_block(vec![
        trap, string_ptr, string_len, black_box,
    ]));
}

fn register_io_ffi(program: &mut Program) {
    let print_f32 = create_builtin(
        "__gallium_print_f32",
        numbered_args(vec![
            Type::float(FloatWidth::Single),
            Type::signed(IntegerWidth::W32),
        ]),
        vec![],
        Type::void(),
    );
    let print_f64 = create_builtin(
        "__gallium_print_f64",
        numbered_args(vec![
            Type::float(FloatWidth::Double),
            Type::signed(IntegerWidth::W32),
        ]),
        vec![],
        Type::void(),
    );
    let print_int = create_builtin(
        "__gallium_print_int",
        numbered_args(vec![Type::signed(IntegerWidth::Native)]),
        vec![],
        Type::void(),
    );
    let print_uint = create_builtin(
        "__gallium_print_uint",
        numbered_args(vec![Type::unsigned(IntegerWidth::Native)]),
        vec![],
        Type::void(),
    );
    let print_char = create_builtin(
        "__gallium_print_char",
        numbered_args(vec![Type::char_type()]),
        vec![],
        Type::void(),
    );
    let print_string = create_builtin(
        "__gallium_print_string",
        numbered_args(vec![
            Type::pointer(false, Type::char_type()),
            Type::unsigned(IntegerWidth::Native),
        ]),
        vec![],
        Type::void(),
    );

    program.add_decl(injected_external_block(vec![
        print_f32,
        print_f64,
        print_int,
        print_uint,
        print_char,
        print_string,
    ]));
}

fn register_io(program: &mut Program) {
    // print(__1: [char])
    let body = exprs_into_block(vec![create_call(
        "__gallium_print_string",
        vec![
            create_call("__builtin_string_ptr", vec![create_id("__1")]),
            create_call("__builtin_string_len", vec![create_id("__1")]),
        ],
    )]);
    program.add_decl(create_stdlib_fn(
        "print",
        vec![Type::slice(false, Type::char_type())],
        body,
    ));

    // print(__1: char)
    let body = exprs_into_block(vec![create_call(
        "__gallium_print_char",
        vec![create_id("__1")],
    )]);
    program.add_decl(create_stdlib_fn("print", vec![Type::char_type()], body));

    // print(__1: isize) / print(__1: usize)
    let body = exprs_into_block(vec![create_call(
        "__gallium_print_int",
        vec![create_id("__1")],
    )]);
    program.add_decl(create_stdlib_fn(
        "print",
        vec![Type::signed(IntegerWidth::Native)],
        body,
    ));

    let body = exprs_into_block(vec![create_call(
        "__gallium_print_uint",
        vec![create_id("__1")],
    )]);
    program.add_decl(create_stdlib_fn(
        "print",
        vec![Type::unsigned(IntegerWidth::Native)],
        body,
    ));

    // print(__1: f32, __2: i32) and the default-precision form
    let body = exprs_into_block(vec![create_call(
        "__gallium_print_f32",
        vec![create_id("__1"), create_id("__2")],
    )]);
    program.add_decl(create_stdlib_fn(
        "print",
        vec![
            Type::float(FloatWidth::Single),
            Type::signed(IntegerWidth::W32),
        ],
        body,
    ));

    let body = exprs_into_block(vec![create_call(
        "__gallium_print_f32",
        vec![
            create_id("__1"),
            create_cast(
                IntegerLiteral::new(loc(), 5).into(),
                Type::signed(IntegerWidth::W32),
            ),
        ],
    )]);
    program.add_decl(create_stdlib_fn(
        "print",
        vec![Type::float(FloatWidth::Single)],
        body,
    ));

    // print(__1: f64, __2: i32) and the default-precision form
    let body = exprs_into_block(vec![create_call(
        "__gallium_print_f64",
        vec![create_id("__1"), create_id("__2")],
    )]);
    program.add_decl(create_stdlib_fn(
        "print",
        vec![
            Type::float(FloatWidth::Double),
            Type::signed(IntegerWidth::W32),
        ],
        body,
    ));

    let body = exprs_into_block(vec![create_call(
        "__gallium_print_f64",
        vec![
            create_id("__1"),
            create_cast(
                IntegerLiteral::new(loc(), 5).into(),
                Type::signed(IntegerWidth::W32),
            ),
        ],
    )]);
    program.add_decl(create_stdlib_fn(
        "print",
        vec![Type::float(FloatWidth::Double)],
        body,
    ));

    // println over the single-argument print overloads
    for ty in [
        Type::slice(false, Type::char_type()),
        Type::char_type(),
        Type::signed(IntegerWidth::Native),
        Type::unsigned(IntegerWidth::Native),
        Type::float(FloatWidth::Single),
        Type::float(FloatWidth::Double),
    ] {
        let body = exprs_into_block(vec![
            create_call("print", vec![create_id("__1")]),
            create_call(
                "print",
                vec![create_cast(char_literal(b'\n'), Type::char_type())],
            ),
        ]);

        program.add_decl(create_stdlib_fn("println", vec![ty], body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin("__builtin_trap"));
        assert!(is_builtin("__builtin_string_len"));
        assert!(!is_builtin("__gallium_print_int"));
        assert!(!is_builtin("print"));
    }

    #[test]
    fn test_registration_injects_declarations() {
        let mut program = Program::default();

        register_predefined(&mut program);

        assert!(!program.decls().is_empty());
        assert!(program.decls().iter().all(|decl| decl.is_injected()));

        let stdlib_fns = program
            .decls()
            .iter()
            .filter(|decl| matches!(decl, Declaration::Fn(_)))
            .count();

        // eight print overloads and six println wrappers
        assert_eq!(stdlib_fns, 14);
    }

    #[test]
    fn test_print_overloads_are_distinct() {
        use crate::diagnostics::{CollectingReporter, DiagnosticReporter};
        use crate::resolver::NameResolver;

        let mut program = Program::default();
        register_predefined(&mut program);

        let mut reporter = CollectingReporter::new();
        let resolver = NameResolver::new(&mut program, &mut reporter);
        resolver.resolve(&mut program, &mut reporter);

        // no conflicting overloads or unresolved names among the shims
        assert!(!reporter.had_error(), "codes: {:?}", reporter.codes());

        let print = resolver
            .overloads(&crate::ast::FullyQualifiedId::in_root("print"))
            .unwrap();
        assert_eq!(print.fns().len(), 8);
    }
}
