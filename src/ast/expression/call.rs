use crate::ast::{DeclRef, FullyQualifiedId, SourceLoc, Type};

use super::Expression;

/// A call as the parser produced it: the callee is an arbitrary expression.
/// Call checking replaces this with a [`StaticCall`] when the callee turns
/// out to be an overload set, or leaves it in place for function-pointer
/// calls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Call {
    pub loc: SourceLoc,
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub generic_args: Vec<Type>,
    pub result: Option<Type>,
}

impl Call {
    pub fn new(loc: SourceLoc, callee: Expression, args: Vec<Expression>) -> Call {
        Call {
            loc,
            callee: Box::new(callee),
            args,
            generic_args: vec![],
            result: None,
        }
    }
}

/// A call after overload resolution: the callee is a specific function
/// declaration, identified both by fully-qualified id and by back-pointer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StaticCall {
    pub loc: SourceLoc,
    pub id: FullyQualifiedId,
    pub decl: DeclRef,
    pub args: Vec<Expression>,
    pub generic_args: Vec<Type>,
    pub result: Option<Type>,
}

impl StaticCall {
    pub fn new(
        loc: SourceLoc,
        id: FullyQualifiedId,
        decl: DeclRef,
        args: Vec<Expression>,
    ) -> StaticCall {
        StaticCall {
            loc,
            id,
            decl,
            args,
            generic_args: vec![],
            result: None,
        }
    }
}

/// A method call, `receiver.name(args)`, before the method has been
/// resolved against the receiver's type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MethodCall {
    pub loc: SourceLoc,
    pub receiver: Box<Expression>,
    pub name: String,
    pub args: Vec<Expression>,
    pub generic_args: Vec<Type>,
    pub result: Option<Type>,
}

impl MethodCall {
    pub fn new(
        loc: SourceLoc,
        receiver: Expression,
        name: impl Into<String>,
        args: Vec<Expression>,
    ) -> MethodCall {
        MethodCall {
            loc,
            receiver: Box::new(receiver),
            name: name.into(),
            args,
            generic_args: vec![],
            result: None,
        }
    }
}

/// A method call after resolution, carrying the chosen method declaration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StaticMethodCall {
    pub loc: SourceLoc,
    pub receiver: Box<Expression>,
    pub id: FullyQualifiedId,
    pub decl: DeclRef,
    pub name: String,
    pub args: Vec<Expression>,
    pub result: Option<Type>,
}

impl StaticMethodCall {
    pub fn new(
        loc: SourceLoc,
        receiver: Expression,
        id: FullyQualifiedId,
        decl: DeclRef,
        name: impl Into<String>,
        args: Vec<Expression>,
    ) -> StaticMethodCall {
        StaticMethodCall {
            loc,
            receiver: Box::new(receiver),
            id,
            decl,
            name: name.into(),
            args,
            result: None,
        }
    }
}
