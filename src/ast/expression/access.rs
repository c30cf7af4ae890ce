use crate::ast::{SourceLoc, Type};

use super::Expression;

/// An index expression, `callee[indices...]`. The language only allows a
/// single index; extras are a diagnostic, not a parse error.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Index {
    pub loc: SourceLoc,
    pub callee: Box<Expression>,
    pub indices: Vec<Expression>,
    pub result: Option<Type>,
}

impl Index {
    pub fn new(loc: SourceLoc, callee: Expression, indices: Vec<Expression>) -> Index {
        Index {
            loc,
            callee: Box::new(callee),
            indices,
            result: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FieldAccess {
    pub loc: SourceLoc,
    pub object: Box<Expression>,
    pub field: String,
    pub result: Option<Type>,
}

impl FieldAccess {
    pub fn new(loc: SourceLoc, object: Expression, field: impl Into<String>) -> FieldAccess {
        FieldAccess {
            loc,
            object: Box::new(object),
            field: field.into(),
            result: None,
        }
    }
}

/// A parenthesized expression.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Group {
    pub loc: SourceLoc,
    pub inner: Box<Expression>,
    pub result: Option<Type>,
}

impl Group {
    pub fn new(loc: SourceLoc, inner: Expression) -> Group {
        Group {
            loc,
            inner: Box::new(inner),
            result: None,
        }
    }
}

/// A compiler-synthesized lvalue-to-rvalue load.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Load {
    pub loc: SourceLoc,
    pub operand: Box<Expression>,
    pub result: Option<Type>,
}

impl Load {
    pub fn new(loc: SourceLoc, operand: Expression) -> Load {
        Load {
            loc,
            operand: Box::new(operand),
            result: None,
        }
    }
}

/// A compiler-synthesized address-of over an lvalue.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AddressOf {
    pub loc: SourceLoc,
    pub operand: Box<Expression>,
    pub result: Option<Type>,
}

impl AddressOf {
    pub fn new(loc: SourceLoc, operand: Expression) -> AddressOf {
        AddressOf {
            loc,
            operand: Box::new(operand),
            result: None,
        }
    }
}

/// Builds a slice from a pointer and a length.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SliceOf {
    pub loc: SourceLoc,
    pub ptr: Box<Expression>,
    pub len: Box<Expression>,
    pub result: Option<Type>,
}

impl SliceOf {
    pub fn new(loc: SourceLoc, ptr: Expression, len: Expression) -> SliceOf {
        SliceOf {
            loc,
            ptr: Box::new(ptr),
            len: Box::new(len),
            result: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RangeKind {
    Inclusive,
    Exclusive,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Range {
    pub loc: SourceLoc,
    pub start: Box<Expression>,
    pub end: Box<Expression>,
    pub kind: RangeKind,
    pub result: Option<Type>,
}

impl Range {
    pub fn new(loc: SourceLoc, start: Expression, end: Expression, kind: RangeKind) -> Range {
        Range {
            loc,
            start: Box::new(start),
            end: Box::new(end),
            kind,
            result: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Sizeof {
    pub loc: SourceLoc,
    pub ty: Type,
    pub result: Option<Type>,
}

impl Sizeof {
    pub fn new(loc: SourceLoc, ty: Type) -> Sizeof {
        Sizeof {
            loc,
            ty,
            result: None,
        }
    }
}
