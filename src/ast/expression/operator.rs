use crate::ast::{SourceLoc, Type};

use super::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOp {
    LogicalNot,
    BitwiseNot,
    RefTo,
    MutRefTo,
    Negate,
    Dereference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Equals,
    NotEqual,
    LeftShift,
    RightShift,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Assignment,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    LeftShiftAssign,
    RightShiftAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
}

/// The rule family an operator belongs to. Each family has one typing rule
/// in the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFamily {
    /// `* / % + -` — arithmetic operands of equal type, result is that type
    Arithmetic,
    /// `<< >> & | ^` — integral operands, result is the left type
    Bitwise,
    /// `< > <= >=` — arithmetic operands of equal type, result is `bool`
    Ordering,
    /// `== !=` — equal types, result is `bool`
    Equality,
    /// `&& || ^^` — `bool` operands, result is `bool`
    Logical,
    /// `=` and compound forms — `mut` lvalue on the left, result is `void`
    Assignment,
}

impl BinaryOp {
    pub fn family(self) -> OpFamily {
        use BinaryOp::*;

        match self {
            Mul | Div | Mod | Add | Sub => OpFamily::Arithmetic,
            LeftShift | RightShift | BitwiseAnd | BitwiseOr | BitwiseXor => OpFamily::Bitwise,
            Lt | Gt | LtEq | GtEq => OpFamily::Ordering,
            Equals | NotEqual => OpFamily::Equality,
            LogicalAnd | LogicalOr | LogicalXor => OpFamily::Logical,
            Assignment | AddAssign | SubAssign | MulAssign | DivAssign | ModAssign
            | LeftShiftAssign | RightShiftAssign | BitwiseAndAssign | BitwiseOrAssign
            | BitwiseXorAssign => OpFamily::Assignment,
        }
    }

    /// For compound assignments, the operator applied before storing;
    /// `None` for plain `=`.
    pub fn compound_op(self) -> Option<BinaryOp> {
        use BinaryOp::*;

        match self {
            AddAssign => Some(Add),
            SubAssign => Some(Sub),
            MulAssign => Some(Mul),
            DivAssign => Some(Div),
            ModAssign => Some(Mod),
            LeftShiftAssign => Some(LeftShift),
            RightShiftAssign => Some(RightShift),
            BitwiseAndAssign => Some(BitwiseAnd),
            BitwiseOrAssign => Some(BitwiseOr),
            BitwiseXorAssign => Some(BitwiseXor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Unary {
    pub loc: SourceLoc,
    pub op: UnaryOp,
    pub operand: Box<Expression>,
    pub result: Option<Type>,
}

impl Unary {
    pub fn new(loc: SourceLoc, op: UnaryOp, operand: Expression) -> Unary {
        Unary {
            loc,
            op,
            operand: Box::new(operand),
            result: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Binary {
    pub loc: SourceLoc,
    pub op: BinaryOp,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
    pub result: Option<Type>,
}

impl Binary {
    pub fn new(loc: SourceLoc, op: BinaryOp, lhs: Expression, rhs: Expression) -> Binary {
        Binary {
            loc,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            result: None,
        }
    }
}

/// An `as` / `as!` cast written in the source.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Cast {
    pub loc: SourceLoc,
    pub unsafe_cast: bool,
    pub operand: Box<Expression>,
    pub target: Type,
    pub result: Option<Type>,
}

impl Cast {
    pub fn new(loc: SourceLoc, unsafe_cast: bool, operand: Expression, target: Type) -> Cast {
        Cast {
            loc,
            unsafe_cast,
            operand: Box::new(operand),
            target,
            result: None,
        }
    }
}

/// A compiler-inserted conversion wrapper. The type checker wraps an
/// expression in one of these whenever an implicit conversion is needed to
/// satisfy the expected type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImplicitConversion {
    pub loc: SourceLoc,
    pub operand: Box<Expression>,
    pub target: Type,
    pub result: Option<Type>,
}

impl ImplicitConversion {
    pub fn new(operand: Expression, target: Type) -> ImplicitConversion {
        ImplicitConversion {
            loc: operand.loc(),
            operand: Box::new(operand),
            result: Some(target.clone()),
            target,
        }
    }
}
