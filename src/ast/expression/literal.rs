use crate::ast::{SourceLoc, Type};

use super::Expression;

/// A string literal. Evaluates to `[char]`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StringLiteral {
    pub loc: SourceLoc,
    pub value: String,
    pub result: Option<Type>,
}

impl StringLiteral {
    pub fn new(loc: SourceLoc, value: impl Into<String>) -> StringLiteral {
        StringLiteral {
            loc,
            value: value.into(),
            result: None,
        }
    }
}

/// An integer literal. The sign lives on the surrounding negation, so the
/// value is always non-negative.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IntegerLiteral {
    pub loc: SourceLoc,
    pub value: u128,
    pub result: Option<Type>,
}

impl IntegerLiteral {
    pub fn new(loc: SourceLoc, value: u128) -> IntegerLiteral {
        IntegerLiteral {
            loc,
            value,
            result: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FloatLiteral {
    pub loc: SourceLoc,
    pub value: f64,
    pub result: Option<Type>,
}

impl FloatLiteral {
    pub fn new(loc: SourceLoc, value: f64) -> FloatLiteral {
        FloatLiteral {
            loc,
            value,
            result: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BoolLiteral {
    pub loc: SourceLoc,
    pub value: bool,
    pub result: Option<Type>,
}

impl BoolLiteral {
    pub fn new(loc: SourceLoc, value: bool) -> BoolLiteral {
        BoolLiteral {
            loc,
            value,
            result: None,
        }
    }
}

/// A char literal. Gallium chars are bytes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CharLiteral {
    pub loc: SourceLoc,
    pub value: u8,
    pub result: Option<Type>,
}

impl CharLiteral {
    pub fn new(loc: SourceLoc, value: u8) -> CharLiteral {
        CharLiteral {
            loc,
            value,
            result: None,
        }
    }
}

/// The `nil` literal. Types as the nil-pointer placeholder until inference
/// fixes it to a concrete pointer type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NilLiteral {
    pub loc: SourceLoc,
    pub result: Option<Type>,
}

impl NilLiteral {
    pub fn new(loc: SourceLoc) -> NilLiteral {
        NilLiteral { loc, result: None }
    }
}

/// An array literal, e.g `[1, 2, 3]`. All elements must end up with one
/// unified type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ArrayLiteral {
    pub loc: SourceLoc,
    pub elements: Vec<Expression>,
    pub result: Option<Type>,
}

impl ArrayLiteral {
    pub fn new(loc: SourceLoc, elements: Vec<Expression>) -> ArrayLiteral {
        ArrayLiteral {
            loc,
            elements,
            result: None,
        }
    }
}
