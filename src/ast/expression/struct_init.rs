use crate::ast::{SourceLoc, Type};

use super::Expression;

/// One `field: value` pair in a struct-init expression.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FieldInitializer {
    pub loc: SourceLoc,
    pub name: String,
    pub value: Expression,
}

impl FieldInitializer {
    pub fn new(loc: SourceLoc, name: impl Into<String>, value: Expression) -> FieldInitializer {
        FieldInitializer {
            loc,
            name: name.into(),
            value,
        }
    }
}

/// A struct-init expression, `S { a: 1, b: 2 }`. Every field of the target
/// struct must be initialized exactly once.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StructInit {
    pub loc: SourceLoc,
    pub target: Type,
    pub fields: Vec<FieldInitializer>,
    pub result: Option<Type>,
}

impl StructInit {
    pub fn new(loc: SourceLoc, target: Type, fields: Vec<FieldInitializer>) -> StructInit {
        StructInit {
            loc,
            target,
            fields,
            result: None,
        }
    }
}
