//! Literal constant folding.
//!
//! Used by the type checker to give arithmetic over two still-unsized
//! integer literals a value (so range checks keep working), and available
//! to back ends for array lengths and constant initializers.

use crate::ast::{BinaryOp, Expression, UnaryOp};

/// Folds a binary operator over two integer literal values. Returns `None`
/// for operators that do not produce an integer or for division by zero;
/// overflow saturates rather than wrapping so later range checks stay
/// conservative.
pub fn fold_binary(op: BinaryOp, lhs: u128, rhs: u128) -> Option<u128> {
    match op {
        BinaryOp::Add => Some(lhs.saturating_add(rhs)),
        BinaryOp::Sub => Some(lhs.saturating_sub(rhs)),
        BinaryOp::Mul => Some(lhs.saturating_mul(rhs)),
        BinaryOp::Div => lhs.checked_div(rhs),
        BinaryOp::Mod => lhs.checked_rem(rhs),
        BinaryOp::LeftShift => {
            if rhs < 128 {
                lhs.checked_shl(rhs as u32)
            } else {
                Some(0)
            }
        }
        BinaryOp::RightShift => {
            if rhs < 128 {
                Some(lhs >> rhs)
            } else {
                Some(0)
            }
        }
        BinaryOp::BitwiseAnd => Some(lhs & rhs),
        BinaryOp::BitwiseOr => Some(lhs | rhs),
        BinaryOp::BitwiseXor => Some(lhs ^ rhs),
        _ => None,
    }
}

/// Folds a unary operator over an integer literal value, where that makes
/// sense as another literal value.
pub fn fold_unary(op: UnaryOp, value: u128) -> Option<u128> {
    match op {
        UnaryOp::BitwiseNot => Some(!value),
        _ => None,
    }
}

/// The literal value of an expression, looking through groups and
/// compiler-inserted conversions. This is the shape back ends use to pull
/// constant array lengths and initializers out of a checked tree.
pub fn literal_value(expr: &Expression) -> Option<u128> {
    match expr {
        Expression::IntegerLiteral(literal) => Some(literal.value),
        Expression::CharLiteral(literal) => Some(literal.value as u128),
        Expression::BoolLiteral(literal) => Some(literal.value as u128),
        Expression::Group(group) => literal_value(&group.inner),
        Expression::ImplicitConversion(conversion) => literal_value(&conversion.operand),
        Expression::Binary(binary) => {
            let lhs = literal_value(&binary.lhs)?;
            let rhs = literal_value(&binary.rhs)?;

            fold_binary(binary.op, lhs, rhs)
        }
        Expression::Unary(unary) => fold_unary(unary.op, literal_value(&unary.operand)?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Binary, Group, IntegerLiteral, SourceLoc};

    fn int(value: u128) -> Expression {
        IntegerLiteral::new(SourceLoc::default(), value).into()
    }

    #[test]
    fn test_fold_binary_arithmetic() {
        assert_eq!(fold_binary(BinaryOp::Add, 2, 3), Some(5));
        assert_eq!(fold_binary(BinaryOp::Mul, 4, 8), Some(32));
        assert_eq!(fold_binary(BinaryOp::Div, 9, 2), Some(4));
        assert_eq!(fold_binary(BinaryOp::Div, 9, 0), None);
        assert_eq!(fold_binary(BinaryOp::Mod, 9, 4), Some(1));
    }

    #[test]
    fn test_fold_saturates_instead_of_wrapping() {
        assert_eq!(fold_binary(BinaryOp::Add, u128::MAX, 1), Some(u128::MAX));
        assert_eq!(fold_binary(BinaryOp::Sub, 1, 2), Some(0));
    }

    #[test]
    fn test_comparisons_do_not_fold_to_integers() {
        assert_eq!(fold_binary(BinaryOp::Lt, 1, 2), None);
        assert_eq!(fold_binary(BinaryOp::LogicalAnd, 1, 1), None);
    }

    #[test]
    fn test_literal_value_looks_through_structure() {
        let expr: Expression = Group::new(
            SourceLoc::default(),
            Binary::new(SourceLoc::default(), BinaryOp::Add, int(40), int(2)).into(),
        )
        .into();

        assert_eq!(literal_value(&expr), Some(42));
        assert_eq!(literal_value(&int(7)), Some(7));
        assert_eq!(literal_value(&Expression::Error), None);
    }
}
