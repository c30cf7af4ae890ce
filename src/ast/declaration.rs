use super::{Expression, FullyQualifiedId, ModuleId, SourceLoc, Type, UnqualifiedId};

/// The kind of `self` parameter a method prototype takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SelfKind {
    /// `&self`
    Ref,
    /// `&mut self`
    MutRef,
    /// `self`
    Value,
    /// `mut self`
    MutValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AttributeKind {
    Pure,
    Throws,
    AlwaysInline,
    Inline,
    NoInline,
    Malloc,
    Hot,
    Cold,
    Arch,
    NoReturn,
    Stdlib,
    VarArgs,
}

/// An attribute on a function, possibly with arguments (`__arch("x86_64")`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    pub kind: AttributeKind,
    pub args: Vec<String>,
}

impl Attribute {
    pub fn new(kind: AttributeKind) -> Attribute {
        Attribute { kind, args: vec![] }
    }
}

/// A `name: type` pair in a function prototype.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Argument {
    pub loc: SourceLoc,
    pub name: String,
    pub ty: Type,
}

impl Argument {
    pub fn new(loc: SourceLoc, name: impl Into<String>, ty: Type) -> Argument {
        Argument {
            loc,
            name: name.into(),
            ty,
        }
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

/// A function prototype: shared by function declarations, methods and
/// external function declarations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FnPrototype {
    pub name: String,
    pub self_kind: Option<SelfKind>,
    pub args: Vec<Argument>,
    pub attributes: Vec<Attribute>,
    pub return_type: Type,
}

impl FnPrototype {
    pub fn new(
        name: impl Into<String>,
        self_kind: Option<SelfKind>,
        args: Vec<Argument>,
        attributes: Vec<Attribute>,
        return_type: Type,
    ) -> FnPrototype {
        FnPrototype {
            name: name.into(),
            self_kind,
            args,
            attributes,
            return_type,
        }
    }

    pub fn has_attribute(&self, kind: AttributeKind) -> bool {
        self.attributes.iter().any(|attr| attr.kind == kind)
    }

    pub fn throws(&self) -> bool {
        self.has_attribute(AttributeKind::Throws)
    }

    /// The function-pointer type of this prototype.
    pub fn fn_pointer_type(&self) -> Type {
        Type::fn_pointer(
            self.args.iter().map(|arg| arg.ty.clone()).collect(),
            self.return_type.clone(),
        )
    }
}

impl PartialEq for FnPrototype {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.self_kind == other.self_kind
            && self.args == other.args
            && self.attributes == other.attributes
            && self.return_type == other.return_type
    }
}

/// One field of a struct declaration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub loc: SourceLoc,
    pub name: String,
    pub ty: Type,
}

impl Field {
    pub fn new(loc: SourceLoc, name: impl Into<String>, ty: Type) -> Field {
        Field {
            loc,
            name: name.into(),
            ty,
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

/// `import foo::bar`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImportDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub module: ModuleId,
}

/// `import a, b from foo::bar`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImportFromDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub module: ModuleId,
    pub entities: Vec<UnqualifiedId>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FnDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub external: bool,
    pub proto: FnPrototype,
    pub body: Expression,
    pub id: Option<FullyQualifiedId>,
    pub mangled_name: Option<String>,
    pub injected: bool,
}

impl FnDeclaration {
    pub fn new(loc: SourceLoc, exported: bool, proto: FnPrototype, body: Expression) -> FnDeclaration {
        FnDeclaration {
            loc,
            exported,
            external: false,
            proto,
            body,
            id: None,
            mangled_name: None,
            injected: false,
        }
    }
}

/// A method declaration: a function with a `self` parameter attached to a
/// receiver type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MethodDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub receiver: Type,
    pub proto: FnPrototype,
    pub body: Expression,
}

impl MethodDeclaration {
    pub fn new(
        loc: SourceLoc,
        exported: bool,
        receiver: Type,
        proto: FnPrototype,
        body: Expression,
    ) -> MethodDeclaration {
        debug_assert!(proto.self_kind.is_some());

        MethodDeclaration {
            loc,
            exported,
            receiver,
            proto,
            body,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StructDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub name: String,
    pub fields: Vec<Field>,
}

impl StructDeclaration {
    pub fn new(
        loc: SourceLoc,
        exported: bool,
        name: impl Into<String>,
        fields: Vec<Field>,
    ) -> StructDeclaration {
        StructDeclaration {
            loc,
            exported,
            name: name.into(),
            fields,
        }
    }
}

/// A placeholder: classes are parsed but have no semantics yet. Any use
/// reports an "unimplemented" diagnostic.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub name: String,
}

/// `type Name = T`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TypeAliasDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub name: String,
    pub aliased: Type,
}

impl TypeAliasDeclaration {
    pub fn new(
        loc: SourceLoc,
        exported: bool,
        name: impl Into<String>,
        aliased: Type,
    ) -> TypeAliasDeclaration {
        TypeAliasDeclaration {
            loc,
            exported,
            name: name.into(),
            aliased,
        }
    }
}

/// A function declared inside an `external` block. Never mangled: the
/// prototype name is the linker symbol, for FFI visibility.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExternalFnDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub proto: FnPrototype,
    pub id: Option<FullyQualifiedId>,
    pub mangled_name: Option<String>,
    pub injected: bool,
}

impl ExternalFnDeclaration {
    pub fn new(loc: SourceLoc, exported: bool, proto: FnPrototype) -> ExternalFnDeclaration {
        ExternalFnDeclaration {
            loc,
            exported,
            proto,
            id: None,
            mangled_name: None,
            injected: false,
        }
    }
}

/// An `external { ... }` block of foreign function declarations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExternalDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub externals: Vec<Declaration>,
    pub injected: bool,
}

impl ExternalDeclaration {
    pub fn new(loc: SourceLoc, exported: bool, externals: Vec<Declaration>) -> ExternalDeclaration {
        debug_assert!(externals
            .iter()
            .all(|decl| matches!(decl, Declaration::ExternalFn(_))));

        ExternalDeclaration {
            loc,
            exported,
            externals,
            injected: false,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConstantDeclaration {
    pub loc: SourceLoc,
    pub exported: bool,
    pub name: String,
    pub hint: Type,
    pub initializer: Expression,
    pub id: Option<FullyQualifiedId>,
    pub mangled_name: Option<String>,
    pub injected: bool,
}

impl ConstantDeclaration {
    pub fn new(
        loc: SourceLoc,
        exported: bool,
        name: impl Into<String>,
        hint: Type,
        initializer: Expression,
    ) -> ConstantDeclaration {
        ConstantDeclaration {
            loc,
            exported,
            name: name.into(),
            hint,
            initializer,
            id: None,
            mangled_name: None,
            injected: false,
        }
    }
}

/// Discriminant of a [`Declaration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Import,
    ImportFrom,
    Fn,
    Method,
    Struct,
    Class,
    TypeAlias,
    ExternalFn,
    External,
    Constant,
    Error,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Declaration {
    Import(ImportDeclaration),
    ImportFrom(ImportFromDeclaration),
    Fn(FnDeclaration),
    Method(MethodDeclaration),
    Struct(StructDeclaration),
    Class(ClassDeclaration),
    TypeAlias(TypeAliasDeclaration),
    ExternalFn(ExternalFnDeclaration),
    External(ExternalDeclaration),
    Constant(ConstantDeclaration),
    /// Stands in for a declaration that already produced a diagnostic.
    Error,
}

impl Declaration {
    pub fn kind(&self) -> DeclKind {
        match self {
            Declaration::Import(_) => DeclKind::Import,
            Declaration::ImportFrom(_) => DeclKind::ImportFrom,
            Declaration::Fn(_) => DeclKind::Fn,
            Declaration::Method(_) => DeclKind::Method,
            Declaration::Struct(_) => DeclKind::Struct,
            Declaration::Class(_) => DeclKind::Class,
            Declaration::TypeAlias(_) => DeclKind::TypeAlias,
            Declaration::ExternalFn(_) => DeclKind::ExternalFn,
            Declaration::External(_) => DeclKind::External,
            Declaration::Constant(_) => DeclKind::Constant,
            Declaration::Error => DeclKind::Error,
        }
    }

    pub fn loc(&self) -> SourceLoc {
        match self {
            Declaration::Import(d) => d.loc.clone(),
            Declaration::ImportFrom(d) => d.loc.clone(),
            Declaration::Fn(d) => d.loc.clone(),
            Declaration::Method(d) => d.loc.clone(),
            Declaration::Struct(d) => d.loc.clone(),
            Declaration::Class(d) => d.loc.clone(),
            Declaration::TypeAlias(d) => d.loc.clone(),
            Declaration::ExternalFn(d) => d.loc.clone(),
            Declaration::External(d) => d.loc.clone(),
            Declaration::Constant(d) => d.loc.clone(),
            Declaration::Error => SourceLoc::nonexistent(),
        }
    }

    /// The declared name, for declarations that have one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Fn(d) => Some(&d.proto.name),
            Declaration::Method(d) => Some(&d.proto.name),
            Declaration::Struct(d) => Some(&d.name),
            Declaration::Class(d) => Some(&d.name),
            Declaration::TypeAlias(d) => Some(&d.name),
            Declaration::ExternalFn(d) => Some(&d.proto.name),
            Declaration::Constant(d) => Some(&d.name),
            _ => None,
        }
    }

    /// Whether this declaration was injected by the compiler rather than
    /// written by the user.
    pub fn is_injected(&self) -> bool {
        match self {
            Declaration::Fn(d) => d.injected,
            Declaration::ExternalFn(d) => d.injected,
            Declaration::External(d) => d.injected,
            Declaration::Constant(d) => d.injected,
            _ => false,
        }
    }

    /// The fully-qualified id, for mangle-capable declarations once the
    /// resolver has stamped it.
    pub fn id(&self) -> Option<&FullyQualifiedId> {
        match self {
            Declaration::Fn(d) => d.id.as_ref(),
            Declaration::ExternalFn(d) => d.id.as_ref(),
            Declaration::Constant(d) => d.id.as_ref(),
            _ => None,
        }
    }

    pub fn set_id(&mut self, id: FullyQualifiedId) {
        match self {
            Declaration::Fn(d) => d.id = Some(id),
            Declaration::ExternalFn(d) => d.id = Some(id),
            Declaration::Constant(d) => d.id = Some(id),
            _ => {}
        }
    }

    /// The linker symbol, for mangle-capable declarations once the mangler
    /// has stamped it.
    pub fn mangled_name(&self) -> Option<&str> {
        match self {
            Declaration::Fn(d) => d.mangled_name.as_deref(),
            Declaration::ExternalFn(d) => d.mangled_name.as_deref(),
            Declaration::Constant(d) => d.mangled_name.as_deref(),
            _ => None,
        }
    }

    pub fn set_mangled(&mut self, symbol: String) {
        match self {
            Declaration::Fn(d) => d.mangled_name = Some(symbol),
            Declaration::ExternalFn(d) => d.mangled_name = Some(symbol),
            Declaration::Constant(d) => d.mangled_name = Some(symbol),
            _ => {}
        }
    }

    /// The prototype, for the function-like declarations.
    pub fn proto(&self) -> Option<&FnPrototype> {
        match self {
            Declaration::Fn(d) => Some(&d.proto),
            Declaration::Method(d) => Some(&d.proto),
            Declaration::ExternalFn(d) => Some(&d.proto),
            _ => None,
        }
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        use Declaration::*;

        match (self, other) {
            (Error, _) | (_, Error) => true,
            (Import(a), Import(b)) => a.module == b.module,
            (ImportFrom(a), ImportFrom(b)) => a.module == b.module && a.entities == b.entities,
            (Fn(a), Fn(b)) => {
                a.external == b.external && a.proto == b.proto && a.body == b.body
            }
            (Method(a), Method(b)) => {
                a.receiver == b.receiver && a.proto == b.proto && a.body == b.body
            }
            (Struct(a), Struct(b)) => a.name == b.name && a.fields == b.fields,
            (Class(a), Class(b)) => a.name == b.name,
            (TypeAlias(a), TypeAlias(b)) => a.name == b.name && a.aliased == b.aliased,
            (ExternalFn(a), ExternalFn(b)) => a.proto == b.proto,
            (External(a), External(b)) => a.externals == b.externals,
            (Constant(a), Constant(b)) => {
                a.name == b.name && a.hint == b.hint && a.initializer == b.initializer
            }
            _ => false,
        }
    }
}

impl From<FnDeclaration> for Declaration {
    fn from(value: FnDeclaration) -> Self {
        Declaration::Fn(value)
    }
}

impl From<MethodDeclaration> for Declaration {
    fn from(value: MethodDeclaration) -> Self {
        Declaration::Method(value)
    }
}

impl From<StructDeclaration> for Declaration {
    fn from(value: StructDeclaration) -> Self {
        Declaration::Struct(value)
    }
}

impl From<TypeAliasDeclaration> for Declaration {
    fn from(value: TypeAliasDeclaration) -> Self {
        Declaration::TypeAlias(value)
    }
}

impl From<ExternalFnDeclaration> for Declaration {
    fn from(value: ExternalFnDeclaration) -> Self {
        Declaration::ExternalFn(value)
    }
}

impl From<ExternalDeclaration> for Declaration {
    fn from(value: ExternalDeclaration) -> Self {
        Declaration::External(value)
    }
}

impl From<ConstantDeclaration> for Declaration {
    fn from(value: ConstantDeclaration) -> Self {
        Declaration::Constant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, IntegerWidth};

    fn proto(name: &str, args: Vec<Argument>) -> FnPrototype {
        FnPrototype::new(name, None, args, vec![], Type::void())
    }

    fn empty_body() -> Expression {
        Block::new(SourceLoc::default(), vec![]).into()
    }

    #[test]
    fn test_prototype_equality_ignores_argument_names_locations_only() {
        let a = proto(
            "f",
            vec![Argument::new(
                SourceLoc::new("x: i32", 1, 4, "a.ga"),
                "x",
                Type::signed(IntegerWidth::W32),
            )],
        );
        let b = proto(
            "f",
            vec![Argument::new(
                SourceLoc::default(),
                "x",
                Type::signed(IntegerWidth::W32),
            )],
        );

        assert_eq!(a, b);
    }

    #[test]
    fn test_declaration_equality_ignores_mangling_state() {
        let mut a = FnDeclaration::new(SourceLoc::default(), false, proto("f", vec![]), empty_body());
        let b = FnDeclaration::new(SourceLoc::default(), false, proto("f", vec![]), empty_body());

        a.id = Some(FullyQualifiedId::in_root("f"));
        a.mangled_name = Some("_GF1fNEv".into());

        assert_eq!(Declaration::from(a), Declaration::from(b));
    }

    #[test]
    fn test_error_declaration_equals_anything() {
        let decl: Declaration =
            FnDeclaration::new(SourceLoc::default(), false, proto("f", vec![]), empty_body()).into();

        assert_eq!(Declaration::Error, decl);
    }

    #[test]
    fn test_fn_pointer_type_of_prototype() {
        let proto = FnPrototype::new(
            "f",
            None,
            vec![Argument::new(
                SourceLoc::default(),
                "x",
                Type::signed(IntegerWidth::W32),
            )],
            vec![],
            Type::bool_type(),
        );

        assert_eq!(
            proto.fn_pointer_type(),
            Type::fn_pointer(vec![Type::signed(IntegerWidth::W32)], Type::bool_type())
        );
    }
}
