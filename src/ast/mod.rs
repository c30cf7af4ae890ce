//! The abstract syntax tree.
//!
//! Declarations are owned by the [`Program`]; statements own their
//! expressions, expressions own their sub-expressions, types own their
//! sub-types. The tree is a tree, never a DAG. Resolution back-pointers
//! (from qualified types and static-global expressions to declarations)
//! are [`DeclRef`] indices into the program's declaration arena, so they
//! stay valid for the program's whole lifetime without borrowing it.

mod declaration;
mod expression;
mod ids;
mod source_loc;
mod statement;
mod ty;
pub mod visit;

pub use self::declaration::*;
pub use self::expression::*;
pub use self::ids::*;
pub use self::source_loc::*;
pub use self::statement::*;
pub use self::ty::*;

/// A back-pointer to a declaration: an index into the program's arena,
/// plus a member index for functions nested inside an `external` block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct DeclRef {
    pub index: usize,
    pub member: Option<usize>,
}

impl DeclRef {
    pub fn top_level(index: usize) -> DeclRef {
        DeclRef {
            index,
            member: None,
        }
    }

    pub fn member(index: usize, member: usize) -> DeclRef {
        DeclRef {
            index,
            member: Some(member),
        }
    }
}

/// A whole compilation unit: the sequence of declarations the parser
/// produced, mutated in place by the resolver, type checker and mangler.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Program {
    decls: Vec<Declaration>,
}

impl Program {
    pub fn new(decls: Vec<Declaration>) -> Program {
        Program { decls }
    }

    pub fn decls(&self) -> &[Declaration] {
        &self.decls
    }

    pub fn decls_mut(&mut self) -> &mut [Declaration] {
        &mut self.decls
    }

    /// Appends a declaration and returns its back-pointer.
    pub fn add_decl(&mut self, decl: Declaration) -> DeclRef {
        self.decls.push(decl);

        DeclRef::top_level(self.decls.len() - 1)
    }

    /// Dereferences a back-pointer, resolving members through `external`
    /// blocks.
    pub fn decl(&self, r: DeclRef) -> &Declaration {
        let top = &self.decls[r.index];

        match r.member {
            None => top,
            Some(member) => match top {
                Declaration::External(ext) => &ext.externals[member],
                _ => unreachable!("member back-pointer into a non-external declaration"),
            },
        }
    }

    pub fn decl_mut(&mut self, r: DeclRef) -> &mut Declaration {
        let top = &mut self.decls[r.index];

        match r.member {
            None => top,
            Some(member) => match top {
                Declaration::External(ext) => &mut ext.externals[member],
                _ => unreachable!("member back-pointer into a non-external declaration"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decl_ref_resolution() {
        let mut program = Program::default();

        let ext_fn = ExternalFnDeclaration::new(
            SourceLoc::default(),
            false,
            FnPrototype::new("puts", None, vec![], vec![], Type::void()),
        );
        let block = ExternalDeclaration::new(SourceLoc::default(), false, vec![ext_fn.into()]);
        let r = program.add_decl(block.into());

        assert_eq!(r, DeclRef::top_level(0));

        let member = DeclRef::member(0, 0);
        assert_eq!(program.decl(member).name(), Some("puts"));
        assert_eq!(program.decl(r).kind(), DeclKind::External);
    }
}
