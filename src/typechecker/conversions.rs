//! Implicit conversions, literal range checks, safe-cast legality and
//! overload candidate ranking.

use crate::ast::{Expression, ImplicitConversion, IntegerWidth, Type};
use crate::diagnostics::{point_out, DiagnosticReporter, Severity};
use crate::resolver::{Overload, OverloadSet};

/// How (and whether) a value of type `actual` can satisfy `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// Already the right type, nothing to insert.
    Exact,
    /// Satisfiable by inserting an implicit conversion; the cost orders
    /// overload candidates (smaller is better).
    Convertible { cost: u32 },
    /// An unsized integer literal that does not fit the target type.
    OutOfRange,
    No,
}

fn width_rank(width: IntegerWidth) -> u32 {
    match width {
        IntegerWidth::W8 => 1,
        IntegerWidth::W16 => 2,
        IntegerWidth::W32 => 3,
        IntegerWidth::W64 => 4,
        IntegerWidth::Native => 5,
        IntegerWidth::W128 => 6,
    }
}

/// The recognized implicit conversions:
///
/// - unsized integer → any integral type that contains the literal (the
///   cost prefers narrower then signed targets, so `f(1)` picks `f(i32)`
///   over `f(i64)`)
/// - `&[T; N]` → `[T]` (and `&mut [T; N]` → `[mut T]` or `[T]`)
/// - `nil` → any pointer type
pub fn applicability(actual: &Type, expected: &Type) -> Applicability {
    let actual = actual.as_rvalue();
    let expected = expected.as_rvalue();

    if actual == expected {
        return Applicability::Exact;
    }

    match (actual, expected) {
        (Type::UnsizedInteger { value, .. }, Type::Integral { signed, width, .. }) => {
            if Type::fits_integral(*value, *signed, *width) {
                Applicability::Convertible {
                    cost: 2 * width_rank(*width) + u32::from(!signed),
                }
            } else {
                Applicability::OutOfRange
            }
        }
        (Type::UnsizedInteger { value, .. }, Type::Byte { .. }) => {
            if *value <= u8::MAX as u128 {
                Applicability::Convertible {
                    cost: 2 * width_rank(IntegerWidth::W8) + 1,
                }
            } else {
                Applicability::OutOfRange
            }
        }
        (Type::NilPointer { .. }, Type::Pointer { .. }) => Applicability::Convertible { cost: 1 },
        (
            Type::Reference {
                mutable: ref_mut,
                referenced,
                ..
            },
            Type::Slice {
                mutable: slice_mut,
                element,
                ..
            },
        ) => match referenced.as_ref() {
            Type::Array {
                element: array_element,
                ..
            } if array_element.as_ref() == element.as_ref() && (*ref_mut || !slice_mut) => {
                Applicability::Convertible { cost: 1 }
            }
            _ => Applicability::No,
        },
        _ => Applicability::No,
    }
}

/// Makes a checked expression satisfy `expected`, inserting an implicit
/// conversion wrapper when one is needed.
///
/// Out-of-range literals report code 32 here (and are wrapped anyway so
/// the cascade stops); a plain type mismatch is returned to the caller,
/// which owns the specific diagnostic code for its context.
pub fn coerce(
    slot: &mut Expression,
    expected: &Type,
    reporter: &mut dyn DiagnosticReporter,
) -> Result<(), ()> {
    let actual = match slot.result() {
        Some(ty) => ty.clone(),
        None => return Ok(()),
    };

    match applicability(&actual, expected) {
        Applicability::Exact => Ok(()),
        Applicability::Convertible { .. } => {
            let inner = slot.take();
            *slot = ImplicitConversion::new(inner, expected.as_rvalue().clone()).into();

            Ok(())
        }
        Applicability::OutOfRange => {
            reporter.report_emplace(
                32,
                vec![point_out(
                    slot.loc(),
                    Severity::Error,
                    format!("literal does not fit in `{expected}`"),
                )],
            );

            let inner = slot.take();
            *slot = ImplicitConversion::new(inner, expected.as_rvalue().clone()).into();

            Ok(())
        }
        Applicability::No => Err(()),
    }
}

/// The type an integer literal defaults to when no context fixes it: the
/// smallest of `i32`/`i64`/`i128` that contains the value, falling back to
/// `u128` for values past `i128::MAX`.
pub fn default_integral(value: u128) -> Type {
    for width in [IntegerWidth::W32, IntegerWidth::W64, IntegerWidth::W128] {
        if Type::fits_integral(value, true, width) {
            return Type::signed(width);
        }
    }

    Type::unsigned(IntegerWidth::W128)
}

/// Pins a still-unsized literal to its default integral type. A no-op for
/// anything already concrete.
pub fn fix_unsized(slot: &mut Expression) {
    if let Some(Type::UnsizedInteger { value, .. }) = slot.result().map(Type::as_rvalue) {
        let target = default_integral(*value);
        let inner = slot.take();

        *slot = ImplicitConversion::new(inner, target).into();
    }
}

fn numeric_kind(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Integral { .. }
            | Type::Float { .. }
            | Type::Byte { .. }
            | Type::Char { .. }
            | Type::UnsizedInteger { .. }
    )
}

/// Whether `from as to` is a legal *safe* cast: numeric widening and
/// narrowing between compatible kinds, pointer-to-pointer, and
/// reference-to-slice for `&[T; N]` → `[T]`. Everything else needs `as!`.
pub fn safe_cast_allowed(from: &Type, to: &Type) -> bool {
    let from = from.as_rvalue();
    let to = to.as_rvalue();

    if from.is_error() || to.is_error() {
        return true;
    }

    if numeric_kind(from) && numeric_kind(to) {
        return true;
    }

    if matches!(from, Type::Pointer { .. }) && matches!(to, Type::Pointer { .. }) {
        return true;
    }

    matches!(
        applicability(from, to),
        Applicability::Exact | Applicability::Convertible { .. }
    )
}

/// The outcome of ranking an overload set against a list of argument
/// types.
pub enum OverloadChoice<'a> {
    Selected(&'a Overload),
    Ambiguous,
    NoMatch,
}

/// Finds the overload whose parameters match the argument types, allowing
/// each argument its implicit conversions. Candidates are ordered by
/// total conversion cost; a unique minimum wins and a tie is ambiguous.
pub fn select_overload<'a>(set: &'a OverloadSet, args: &[Type]) -> OverloadChoice<'a> {
    let mut best: Option<(u32, &Overload)> = None;
    let mut tied = false;

    for overload in set.fns() {
        let params = &overload.proto().args;

        if params.len() != args.len() {
            continue;
        }

        let mut cost = 0u32;
        let mut matches = true;

        for (arg, param) in args.iter().zip(params) {
            match applicability(arg, &param.ty) {
                Applicability::Exact => {}
                Applicability::Convertible { cost: c } => cost += c,
                Applicability::OutOfRange | Applicability::No => {
                    matches = false;
                    break;
                }
            }
        }

        if !matches {
            continue;
        }

        match &best {
            Some((best_cost, _)) if cost > *best_cost => {}
            Some((best_cost, _)) if cost == *best_cost => tied = true,
            _ => {
                best = Some((cost, overload));
                tied = false;
            }
        }
    }

    match best {
        Some(_) if tied => OverloadChoice::Ambiguous,
        Some((_, overload)) => OverloadChoice::Selected(overload),
        None => OverloadChoice::NoMatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{IntegerLiteral, SourceLoc};

    fn unsized_int(value: u128) -> Type {
        Type::UnsizedInteger {
            loc: SourceLoc::default(),
            value,
        }
    }

    #[test]
    fn test_unsized_literal_narrows_to_containing_types() {
        assert!(matches!(
            applicability(&unsized_int(1), &Type::signed(IntegerWidth::W32)),
            Applicability::Convertible { .. }
        ));
        assert_eq!(
            applicability(&unsized_int(300), &Type::unsigned(IntegerWidth::W8)),
            Applicability::OutOfRange
        );
        assert_eq!(
            applicability(&unsized_int(2_147_483_648), &Type::signed(IntegerWidth::W32)),
            Applicability::OutOfRange
        );
    }

    #[test]
    fn test_narrower_targets_cost_less() {
        let narrow = applicability(&unsized_int(1), &Type::signed(IntegerWidth::W32));
        let wide = applicability(&unsized_int(1), &Type::signed(IntegerWidth::W64));

        match (narrow, wide) {
            (Applicability::Convertible { cost: a }, Applicability::Convertible { cost: b }) => {
                assert!(a < b)
            }
            other => panic!("expected two conversions, got {other:?}"),
        }
    }

    #[test]
    fn test_signed_targets_beat_unsigned_on_tie() {
        let signed = applicability(&unsized_int(1), &Type::signed(IntegerWidth::Native));
        let unsigned = applicability(&unsized_int(1), &Type::unsigned(IntegerWidth::Native));

        match (signed, unsigned) {
            (Applicability::Convertible { cost: a }, Applicability::Convertible { cost: b }) => {
                assert!(a < b)
            }
            other => panic!("expected two conversions, got {other:?}"),
        }
    }

    #[test]
    fn test_nil_converts_to_any_pointer() {
        let nil = Type::NilPointer {
            loc: SourceLoc::default(),
        };

        assert!(matches!(
            applicability(&nil, &Type::pointer(true, Type::byte_type())),
            Applicability::Convertible { .. }
        ));
        assert_eq!(
            applicability(&nil, &Type::signed(IntegerWidth::W64)),
            Applicability::No
        );
    }

    #[test]
    fn test_array_reference_converts_to_slice() {
        let array_ref = Type::reference(false, Type::array(Type::byte_type(), 4));

        assert!(matches!(
            applicability(&array_ref, &Type::slice(false, Type::byte_type())),
            Applicability::Convertible { .. }
        ));

        // an immutable reference cannot produce a mutable slice
        assert_eq!(
            applicability(&array_ref, &Type::slice(true, Type::byte_type())),
            Applicability::No
        );

        let mut_ref = Type::reference(true, Type::array(Type::byte_type(), 4));
        assert!(matches!(
            applicability(&mut_ref, &Type::slice(true, Type::byte_type())),
            Applicability::Convertible { .. }
        ));
    }

    #[test]
    fn test_default_integral_widens_with_the_value() {
        assert_eq!(default_integral(1), Type::signed(IntegerWidth::W32));
        assert_eq!(
            default_integral(2_147_483_648),
            Type::signed(IntegerWidth::W64)
        );
        assert_eq!(
            default_integral(u64::MAX as u128),
            Type::signed(IntegerWidth::W128)
        );
        assert_eq!(default_integral(u128::MAX), Type::unsigned(IntegerWidth::W128));
    }

    #[test]
    fn test_coerce_wraps_in_implicit_conversion() {
        use crate::diagnostics::CollectingReporter;

        let mut expr: Expression = IntegerLiteral::new(SourceLoc::default(), 7).into();
        expr.result_update(unsized_int(7));

        let mut reporter = CollectingReporter::new();
        let target = Type::signed(IntegerWidth::W16);

        coerce(&mut expr, &target, &mut reporter).unwrap();

        assert!(reporter.codes().is_empty());
        assert!(matches!(expr, Expression::ImplicitConversion(_)));
        assert_eq!(expr.result(), Some(&target));
    }

    #[test]
    fn test_coerce_reports_32_when_literal_does_not_fit() {
        use crate::diagnostics::CollectingReporter;

        let mut expr: Expression = IntegerLiteral::new(SourceLoc::default(), 70_000).into();
        expr.result_update(unsized_int(70_000));

        let mut reporter = CollectingReporter::new();

        coerce(&mut expr, &Type::signed(IntegerWidth::W16), &mut reporter).unwrap();

        assert_eq!(reporter.codes(), vec![32]);
    }

    #[test]
    fn test_safe_cast_rules() {
        assert!(safe_cast_allowed(
            &Type::signed(IntegerWidth::W64),
            &Type::signed(IntegerWidth::W8)
        ));
        assert!(safe_cast_allowed(
            &Type::signed(IntegerWidth::W32),
            &Type::float(crate::ast::FloatWidth::Double)
        ));
        assert!(safe_cast_allowed(&Type::unsigned(IntegerWidth::W8), &Type::char_type()));
        assert!(safe_cast_allowed(
            &Type::pointer(false, Type::byte_type()),
            &Type::pointer(true, Type::char_type())
        ));
        assert!(safe_cast_allowed(
            &Type::reference(false, Type::array(Type::byte_type(), 3)),
            &Type::slice(false, Type::byte_type())
        ));

        assert!(!safe_cast_allowed(&Type::bool_type(), &Type::signed(IntegerWidth::W8)));
        assert!(!safe_cast_allowed(
            &Type::pointer(false, Type::byte_type()),
            &Type::signed(IntegerWidth::Native)
        ));
    }
}
