use std::collections::HashMap;

use crate::ast::{
    DeclKind, DeclRef, Declaration, FnPrototype, FullyQualifiedId, Program, SourceLoc, Type,
};
use crate::diagnostics::{point_out_list, point_out_part, DiagnosticReporter, Severity};

/// A unique (non-function) module-scope entity, with the data later passes
/// need copied out of its declaration so they never have to re-borrow the
/// program while rewriting it.
#[derive(Debug, Clone)]
pub struct GlobalEntity {
    name: String,
    decl: DeclRef,
    kind: DeclKind,
    loc: SourceLoc,
    ty: Option<Type>,
    fields: Vec<(String, Type)>,
}

impl GlobalEntity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decl(&self) -> DeclRef {
        self.decl
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    pub fn loc(&self) -> &SourceLoc {
        &self.loc
    }

    /// The type attached to the entity: for a struct, the user-defined
    /// type naming it; for an alias, a clone of the aliased type; for a
    /// constant, its hint.
    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Struct fields, in declaration order. Empty for non-structs.
    pub fn fields(&self) -> &[(String, Type)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }
}

/// One member of an overload set.
#[derive(Debug, Clone)]
pub struct Overload {
    decl: DeclRef,
    proto: FnPrototype,
    loc: SourceLoc,
    external: bool,
}

impl Overload {
    pub fn new(decl: DeclRef, proto: FnPrototype, loc: SourceLoc, external: bool) -> Overload {
        Overload {
            decl,
            proto,
            loc,
            external,
        }
    }

    pub fn decl(&self) -> DeclRef {
        self.decl
    }

    pub fn proto(&self) -> &FnPrototype {
        &self.proto
    }

    pub fn loc(&self) -> &SourceLoc {
        &self.loc
    }

    pub fn external(&self) -> bool {
        self.external
    }
}

/// All function declarations in one module sharing a name.
#[derive(Debug, Clone)]
pub struct OverloadSet {
    name: String,
    functions: Vec<Overload>,
}

impl OverloadSet {
    pub fn new(name: impl Into<String>) -> OverloadSet {
        OverloadSet {
            name: name.into(),
            functions: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fns(&self) -> &[Overload] {
        &self.functions
    }

    fn add_overload(&mut self, overload: Overload) {
        debug_assert!(!self
            .functions
            .iter()
            .any(|other| same_signature(other.proto(), overload.proto())));

        self.functions.push(overload);
    }
}

fn same_signature(a: &FnPrototype, b: &FnPrototype) -> bool {
    a.args.len() == b.args.len()
        && a.args
            .iter()
            .zip(&b.args)
            .all(|(lhs, rhs)| lhs.ty == rhs.ty)
}

/// The global symbol table of one module: unique entities, overload sets,
/// and per-receiver method tables.
#[derive(Debug, Clone, Default)]
pub struct GlobalEnvironment {
    entities: HashMap<String, GlobalEntity>,
    overloads: HashMap<String, OverloadSet>,
    methods: HashMap<String, HashMap<String, OverloadSet>>,
}

impl GlobalEnvironment {
    /// Builds the table from every declaration at module scope, stamping
    /// fully-qualified ids onto mangle-capable declarations as it goes.
    ///
    /// Conflicts are reported, never fatal: a conflicting declaration is
    /// simply not inserted.
    pub fn build(
        program: &mut Program,
        module: &str,
        reporter: &mut dyn DiagnosticReporter,
    ) -> GlobalEnvironment {
        let mut env = GlobalEnvironment::default();

        for index in 0..program.decls().len() {
            env.insert_decl(program, DeclRef::top_level(index), module, reporter);
        }

        env
    }

    fn insert_decl(
        &mut self,
        program: &mut Program,
        r: DeclRef,
        module: &str,
        reporter: &mut dyn DiagnosticReporter,
    ) {
        let loc = program.decl(r).loc();

        match program.decl(r) {
            Declaration::Fn(decl) => {
                let overload = Overload::new(r, decl.proto.clone(), loc, false);
                let id = FullyQualifiedId::new(module, &decl.proto.name);

                self.insert_overload(overload, reporter);
                program.decl_mut(r).set_id(id);
            }
            Declaration::ExternalFn(decl) => {
                let overload = Overload::new(r, decl.proto.clone(), loc, true);
                let id = FullyQualifiedId::new(module, &decl.proto.name);

                self.insert_overload(overload, reporter);
                program.decl_mut(r).set_id(id);
            }
            Declaration::External(decl) => {
                debug_assert!(r.member.is_none());

                let members = decl.externals.len();

                for member in 0..members {
                    self.insert_decl(program, DeclRef::member(r.index, member), module, reporter);
                }
            }
            Declaration::Struct(decl) => {
                let id = FullyQualifiedId::new(module, &decl.name);
                let fields = decl
                    .fields
                    .iter()
                    .map(|field| (field.name.clone(), field.ty.clone()))
                    .collect();

                let entity = GlobalEntity {
                    name: decl.name.clone(),
                    decl: r,
                    kind: DeclKind::Struct,
                    loc,
                    ty: Some(Type::UserDefined {
                        loc: decl.loc.clone(),
                        id,
                        decl: r,
                        generic_args: vec![],
                    }),
                    fields,
                };

                self.insert_entity(entity, reporter);
            }
            Declaration::Class(decl) => {
                let id = FullyQualifiedId::new(module, &decl.name);
                let entity = GlobalEntity {
                    name: decl.name.clone(),
                    decl: r,
                    kind: DeclKind::Class,
                    loc,
                    ty: Some(Type::UserDefined {
                        loc: decl.loc.clone(),
                        id,
                        decl: r,
                        generic_args: vec![],
                    }),
                    fields: vec![],
                };

                self.insert_entity(entity, reporter);
            }
            Declaration::TypeAlias(decl) => {
                let entity = GlobalEntity {
                    name: decl.name.clone(),
                    decl: r,
                    kind: DeclKind::TypeAlias,
                    loc,
                    ty: Some(decl.aliased.clone()),
                    fields: vec![],
                };

                self.insert_entity(entity, reporter);
            }
            Declaration::Constant(decl) => {
                let id = FullyQualifiedId::new(module, &decl.name);
                let entity = GlobalEntity {
                    name: decl.name.clone(),
                    decl: r,
                    kind: DeclKind::Constant,
                    loc,
                    ty: Some(decl.hint.clone()),
                    fields: vec![],
                };

                self.insert_entity(entity, reporter);
                program.decl_mut(r).set_id(id);
            }
            Declaration::Method(decl) => {
                // methods are registered under the name their receiver will
                // resolve to in this module
                let receiver = match &decl.receiver {
                    Type::UnqualifiedUserDefined { id, .. } => {
                        FullyQualifiedId::new(module, &id.name).as_string().to_string()
                    }
                    Type::UserDefined { id, .. } => id.as_string().to_string(),
                    _ => return,
                };

                let overload = Overload::new(r, decl.proto.clone(), loc, false);

                self.insert_method(receiver, overload, reporter);
            }
            Declaration::Import(_) | Declaration::ImportFrom(_) | Declaration::Error => {}
        }
    }

    fn insert_entity(&mut self, entity: GlobalEntity, reporter: &mut dyn DiagnosticReporter) {
        if let Some(previous) = self.entities.get(entity.name()) {
            let current = point_out_part(
                entity.loc().clone(),
                Severity::Error,
                "re-declaration was here",
            );
            let original = point_out_part(
                previous.loc().clone(),
                Severity::Note,
                "previous declaration was here",
            );

            reporter.report_emplace(6, vec![point_out_list(vec![current, original])]);

            return;
        }

        self.entities.insert(entity.name().to_string(), entity);
    }

    fn insert_overload(&mut self, overload: Overload, reporter: &mut dyn DiagnosticReporter) {
        let set = self
            .overloads
            .entry(overload.proto().name.clone())
            .or_insert_with(|| OverloadSet::new(&overload.proto().name));

        // overloads are only distinguished by parameter types; trying to
        // make it work off return types or whatever would be miserable to
        // reason about
        if let Some(other) = set
            .fns()
            .iter()
            .find(|other| same_signature(other.proto(), overload.proto()))
        {
            let original = point_out_part(
                other.loc().clone(),
                Severity::Note,
                "original overload is here",
            );
            let conflicting = point_out_part(
                overload.loc().clone(),
                Severity::Error,
                "conflicting overload is here",
            );

            reporter.report_emplace(9, vec![point_out_list(vec![original, conflicting])]);

            return;
        }

        set.add_overload(overload);
    }

    fn insert_method(
        &mut self,
        receiver: String,
        overload: Overload,
        reporter: &mut dyn DiagnosticReporter,
    ) {
        let per_name = self.methods.entry(receiver).or_default();
        let set = per_name
            .entry(overload.proto().name.clone())
            .or_insert_with(|| OverloadSet::new(&overload.proto().name));

        if let Some(other) = set
            .fns()
            .iter()
            .find(|other| same_signature(other.proto(), overload.proto()))
        {
            let original = point_out_part(
                other.loc().clone(),
                Severity::Note,
                "original overload is here",
            );
            let conflicting = point_out_part(
                overload.loc().clone(),
                Severity::Error,
                "conflicting overload is here",
            );

            reporter.report_emplace(9, vec![point_out_list(vec![original, conflicting])]);

            return;
        }

        set.add_overload(overload);
    }

    /// Whether any category of entity goes by `name`.
    pub fn contains_any(&self, name: &str) -> bool {
        self.overloads.contains_key(name) || self.entities.contains_key(name)
    }

    pub fn entity(&self, name: &str) -> Option<&GlobalEntity> {
        self.entities.get(name)
    }

    pub fn overloads(&self, name: &str) -> Option<&OverloadSet> {
        self.overloads.get(name)
    }

    /// The method set named `method` on the receiver type named by the
    /// fully-qualified string `receiver`.
    pub fn methods(&self, receiver: &str, method: &str) -> Option<&OverloadSet> {
        self.methods.get(receiver).and_then(|set| set.get(method))
    }
}

/// An entry in a lexical scope.
#[derive(Debug, Clone)]
pub struct ScopeEntity {
    pub loc: SourceLoc,
    pub ty: Type,
    pub mutable: bool,
}

impl ScopeEntity {
    pub fn new(loc: SourceLoc, ty: Type, mutable: bool) -> ScopeEntity {
        ScopeEntity { loc, ty, mutable }
    }
}

/// A single level of lexical scope.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: HashMap<String, ScopeEntity>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&ScopeEntity> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Adds a binding, reporting a duplicate-binding diagnostic when the
    /// name already exists at this level.
    pub fn add(
        &mut self,
        name: &str,
        data: ScopeEntity,
        reporter: &mut dyn DiagnosticReporter,
    ) -> bool {
        if let Some(previous) = self.variables.get(name) {
            let second = point_out_part(data.loc.clone(), Severity::Error, "second binding was here");
            let first = point_out_part(
                previous.loc.clone(),
                Severity::Note,
                "first binding was here",
            );

            reporter.report_emplace(8, vec![point_out_list(vec![second, first])]);

            return false;
        }

        self.variables.insert(name.to_string(), data);

        true
    }

    /// Adds or overwrites a binding without duplicate checking, for passes
    /// that run after resolution has already diagnosed duplicates.
    pub fn insert(&mut self, name: &str, data: ScopeEntity) {
        self.variables.insert(name.to_string(), data);
    }
}

/// The stack of lexical scopes for the function currently being walked.
/// Function parameters form the outermost scope; every block pushes a new
/// one. Shadowing across levels is legal; within one level it is a
/// diagnostic.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    /// Innermost-first lookup across every open scope.
    pub fn get(&self, name: &str) -> Option<&ScopeEntity> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    pub fn add(&mut self, name: &str, data: ScopeEntity, reporter: &mut dyn DiagnosticReporter) {
        let scope = self
            .scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("binding `{name}` added outside any scope"));

        scope.add(name, data, reporter);
    }

    /// See [`Scope::insert`].
    pub fn insert(&mut self, name: &str, data: ScopeEntity) {
        let scope = self
            .scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("binding `{name}` added outside any scope"));

        scope.insert(name, data);
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn leave_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

/// One node of the module tree: a module's own environment plus its nested
/// modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    pub nested: HashMap<String, ModuleTable>,
    pub env: GlobalEnvironment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Argument, Block, Expression, Field, FnDeclaration, IntegerWidth, StructDeclaration,
    };
    use crate::diagnostics::CollectingReporter;

    fn fn_decl(name: &str, args: Vec<Argument>) -> Declaration {
        FnDeclaration::new(
            SourceLoc::default(),
            false,
            FnPrototype::new(name, None, args, vec![], Type::void()),
            Expression::Block(Block::new(SourceLoc::default(), vec![])),
        )
        .into()
    }

    fn arg(name: &str, ty: Type) -> Argument {
        Argument::new(SourceLoc::default(), name, ty)
    }

    #[test]
    fn test_overload_sets_group_by_name() {
        let mut program = Program::new(vec![
            fn_decl("f", vec![]),
            fn_decl("f", vec![arg("x", Type::signed(IntegerWidth::W32))]),
            fn_decl("g", vec![]),
        ]);
        let mut reporter = CollectingReporter::new();

        let env = GlobalEnvironment::build(&mut program, "::", &mut reporter);

        assert!(reporter.codes().is_empty());
        assert_eq!(env.overloads("f").unwrap().fns().len(), 2);
        assert_eq!(env.overloads("g").unwrap().fns().len(), 1);
        assert!(env.overloads("h").is_none());
    }

    #[test]
    fn test_conflicting_overloads_report_code_9() {
        let mut program = Program::new(vec![
            fn_decl("f", vec![arg("x", Type::signed(IntegerWidth::W32))]),
            fn_decl("f", vec![arg("y", Type::signed(IntegerWidth::W32))]),
        ]);
        let mut reporter = CollectingReporter::new();

        let env = GlobalEnvironment::build(&mut program, "::", &mut reporter);

        assert_eq!(reporter.codes(), vec![9]);
        assert_eq!(env.overloads("f").unwrap().fns().len(), 1);
    }

    #[test]
    fn test_duplicate_entities_report_code_6() {
        let s = |name: &str| -> Declaration {
            StructDeclaration::new(SourceLoc::default(), false, name, vec![]).into()
        };

        let mut program = Program::new(vec![s("S"), s("S")]);
        let mut reporter = CollectingReporter::new();

        GlobalEnvironment::build(&mut program, "::", &mut reporter);

        assert_eq!(reporter.codes(), vec![6]);
    }

    #[test]
    fn test_struct_entity_carries_self_type_and_fields() {
        let decl: Declaration = StructDeclaration::new(
            SourceLoc::default(),
            false,
            "Point",
            vec![
                Field::new(SourceLoc::default(), "x", Type::signed(IntegerWidth::W32)),
                Field::new(SourceLoc::default(), "y", Type::signed(IntegerWidth::W32)),
            ],
        )
        .into();

        let mut program = Program::new(vec![decl]);
        let mut reporter = CollectingReporter::new();
        let env = GlobalEnvironment::build(&mut program, "::", &mut reporter);

        let entity = env.entity("Point").unwrap();

        assert_eq!(entity.kind(), DeclKind::Struct);
        assert_eq!(entity.fields().len(), 2);
        assert!(entity.field("x").is_some());
        assert!(entity.field("z").is_none());

        match entity.ty().unwrap() {
            Type::UserDefined { id, .. } => assert_eq!(id.as_string(), "::Point"),
            other => panic!("expected user-defined type, got {other:?}"),
        }
    }

    #[test]
    fn test_fq_ids_are_stamped_during_build() {
        let mut program = Program::new(vec![fn_decl("f", vec![])]);
        let mut reporter = CollectingReporter::new();

        GlobalEnvironment::build(&mut program, "::", &mut reporter);

        assert_eq!(
            program.decls()[0].id().unwrap().as_string(),
            "::f"
        );
    }

    #[test]
    fn test_scope_shadowing_rules() {
        let mut env = Environment::new();
        let mut reporter = CollectingReporter::new();

        env.enter_scope();
        env.add(
            "x",
            ScopeEntity::new(SourceLoc::default(), Type::bool_type(), false),
            &mut reporter,
        );

        // shadowing in a *nested* scope is fine
        env.enter_scope();
        env.add(
            "x",
            ScopeEntity::new(SourceLoc::default(), Type::void(), true),
            &mut reporter,
        );
        assert!(reporter.codes().is_empty());
        assert!(env.get("x").unwrap().mutable);

        env.leave_scope();
        assert!(!env.get("x").unwrap().mutable);

        // a duplicate in the *same* scope is code 8
        env.add(
            "x",
            ScopeEntity::new(SourceLoc::default(), Type::void(), false),
            &mut reporter,
        );
        assert_eq!(reporter.codes(), vec![8]);
    }
}
