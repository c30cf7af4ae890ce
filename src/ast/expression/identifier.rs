use crate::ast::{DeclRef, FullyQualifiedId, SourceLoc, Type, UnqualifiedId};

/// An identifier reference as the parser produced it, before name
/// resolution. The resolver replaces every one of these with a
/// local / qualified / static-global form.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UnqualifiedIdentifier {
    pub loc: SourceLoc,
    pub id: UnqualifiedId,
    pub generic_args: Vec<Type>,
    pub result: Option<Type>,
}

impl UnqualifiedIdentifier {
    pub fn new(loc: SourceLoc, id: UnqualifiedId) -> UnqualifiedIdentifier {
        UnqualifiedIdentifier {
            loc,
            id,
            generic_args: vec![],
            result: None,
        }
    }
}

/// A reference to a local binding or function parameter.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LocalIdentifier {
    pub loc: SourceLoc,
    pub name: String,
    pub result: Option<Type>,
}

impl LocalIdentifier {
    pub fn new(loc: SourceLoc, name: impl Into<String>) -> LocalIdentifier {
        LocalIdentifier {
            loc,
            name: name.into(),
            result: None,
        }
    }
}

/// A fully-qualified reference to an overload set. Stays in the tree as a
/// pending callee until call checking picks the overload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Identifier {
    pub loc: SourceLoc,
    pub id: FullyQualifiedId,
    pub result: Option<Type>,
}

impl Identifier {
    pub fn new(loc: SourceLoc, id: FullyQualifiedId) -> Identifier {
        Identifier {
            loc,
            id,
            result: None,
        }
    }
}

/// A fully-qualified reference to a unique global entity, carrying the
/// back-pointer to its declaration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StaticGlobal {
    pub loc: SourceLoc,
    pub id: FullyQualifiedId,
    pub decl: DeclRef,
    pub result: Option<Type>,
}

impl StaticGlobal {
    pub fn new(loc: SourceLoc, id: FullyQualifiedId, decl: DeclRef) -> StaticGlobal {
        StaticGlobal {
            loc,
            id,
            decl,
            result: None,
        }
    }
}
