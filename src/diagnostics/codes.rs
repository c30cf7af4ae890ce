use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::Severity;

/// The key information about a diagnostic code that reporting needs to be
/// able to display.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticInfo {
    /// A single-line short message explaining the diagnostic.
    pub one_liner: &'static str,
    /// A longer-form explanation, suitable for a note.
    pub explanation: &'static str,
    pub severity: Severity,
}

const fn error(one_liner: &'static str, explanation: &'static str) -> DiagnosticInfo {
    DiagnosticInfo {
        one_liner,
        explanation,
        severity: Severity::Error,
    }
}

// a map instead of a dense array so codes can be looked up by the number
// that appears in the table, and so gaps stay possible
static LOOKUP: Lazy<HashMap<i64, DiagnosticInfo>> = Lazy::new(|| {
    HashMap::from([
        (
            1,
            error(
                "invalid builtin width",
                "integer builtin types must be of width 8/16/32/64/128, floats must have 32/64/128",
            ),
        ),
        (
            2,
            error("invalid char literal", "char literal was unable to be parsed"),
        ),
        (
            3,
            error(
                "invalid integer literal",
                "integer literal was unable to be parsed",
            ),
        ),
        (
            4,
            error(
                "invalid float literal",
                "float literal was unable to be parsed",
            ),
        ),
        (5, error("syntax error", "general syntax error")),
        (
            6,
            error(
                "duplicate declaration name",
                "every declaration name must be unique in the module",
            ),
        ),
        (
            7,
            error(
                "mismatched type for binding initializer",
                "if a binding has a type hint, the hint must match the real type of the initializer",
            ),
        ),
        (
            8,
            error(
                "duplicate binding name",
                "every binding name must be unique in the same level of scope. shadowing is \
                 allowed in *different* levels of scope, but not the same",
            ),
        ),
        (
            9,
            error(
                "conflicting function overloads",
                "overloads cannot have the same parameter types, or they would be ambiguous",
            ),
        ),
        (
            10,
            error(
                "invalid type for struct-init expression",
                "the type of a struct-init expr must be a user-defined type, and not a `dyn` type",
            ),
        ),
        (
            11,
            error(
                "unknown identifier name",
                "name did not resolve to a declaration",
            ),
        ),
        (
            12,
            error(
                "missing initializer for struct field",
                "a struct-init expression must initialize every field of a struct",
            ),
        ),
        (
            13,
            error(
                "mismatched types for struct field",
                "a struct initializer must evaluate to the same type as the associated struct field",
            ),
        ),
        (14, error("unknown type name", "name did not resolve to a type")),
        (
            15,
            error(
                "expected `bool` type for condition",
                "the condition must be of type `bool`",
            ),
        ),
        (
            16,
            error(
                "mismatched types in if-expr",
                "all branches must evaluate to the same type in an if-expr",
            ),
        ),
        (
            17,
            error(
                "invalid safe cast",
                "cannot perform a safe cast between these types",
            ),
        ),
        (
            18,
            error(
                "unknown identifier",
                "variables must be declared before they can be used, does your variable exist?",
            ),
        ),
        (
            19,
            error(
                "ambiguous reference to function",
                "you cannot reference or take the address of an overloaded function, you can only \
                 call it",
            ),
        ),
        (
            20,
            error(
                "mismatched return type",
                "return expressions must return a type compatible with the function",
            ),
        ),
        (
            21,
            error(
                "binding cannot be nil",
                "a binding without a type hint cannot be nil, it must be cast to a pointer type",
            ),
        ),
        (
            22,
            error(
                "reference to declaration other than constant/function in identifier expression",
                "you can only reference constant declarations and function declarations in an \
                 id-expr, not all declarations",
            ),
        ),
        (
            23,
            error(
                "mismatched argument type in call expr",
                "each argument in a call must match the function type being called",
            ),
        ),
        (
            24,
            error(
                "too many arguments for function call",
                "extra arguments cannot be given, you can only pass the exact number the function \
                 accepts.",
            ),
        ),
        (
            25,
            error(
                "too few arguments for function call",
                "every non-defaulted argument in a function must have a value provided",
            ),
        ),
        (
            26,
            error("return outside of function", "cannot return outside of a function"),
        ),
        (
            27,
            error(
                "break/continue outside of loop",
                "cannot break or continue outside of a loop",
            ),
        ),
        (
            28,
            error(
                "ambiguous overloaded function call",
                "call to overloaded function was ambiguous as to which function to call",
            ),
        ),
        (
            29,
            error(
                "cannot call non-function entity",
                "you can only call functions, not anything else",
            ),
        ),
        (
            30,
            error(
                "cannot call expression",
                "expressions of any type other than fn pointers cannot be called",
            ),
        ),
        (
            31,
            error(
                "mismatched return type",
                "the body of a function must evaluate to a type compatible with the function",
            ),
        ),
        (
            32,
            error(
                "integer literal out of bounds of type",
                "the integer literal given cannot fit inside the bounds of the type",
            ),
        ),
        (
            33,
            error("invalid array length", "unable to parse length of array type"),
        ),
        (
            34,
            error(
                "array elements must all be the same type",
                "arrays can only contain one type",
            ),
        ),
        (
            35,
            error(
                "unknown field on type",
                "the field is not found on the type or any implemented interface",
            ),
        ),
        (
            36,
            error(
                "break with value outside of `loop` expression",
                "cannot `break` with a value inside of `while` or `for` loops, only `loop` loops",
            ),
        ),
        (
            37,
            error(
                "multiple breaks with incompatible break values",
                "cannot `break` with different types in the same loop",
            ),
        ),
        (
            38,
            error(
                "logical operators require boolean expressions",
                "logical operators can only be applied to expressions evaluating to `bool`",
            ),
        ),
        (
            39,
            error(
                "arithmetic operator requires integral or floating-point expressions",
                "arithmetic operators can only be applied to expressions that evaluate to an \
                 arithmetic type (signed/unsigned integers, bytes, or floating-point numbers)",
            ),
        ),
        (
            40,
            error(
                "mismatched types in binary expression",
                "both the left and right expressions in a binary expr must be of the same type",
            ),
        ),
        (
            41,
            error(
                "operator requires integral expressions",
                "this operator can only be applied to expressions that evaluate to an integral \
                 type (signed/unsigned integers, or bytes)",
            ),
        ),
        (
            42,
            error(
                "assignment operator requires lvalue on the left-hand side",
                "assignment operators can only assign to lvalues, i.e identifiers or dereference \
                 expressions",
            ),
        ),
        (
            43,
            error(
                "`&` and `&mut` operators requires lvalue",
                "only lvalues (identifiers, struct-field/array accesses or dereference \
                 expressions) can be referenced / have their addresses taken",
            ),
        ),
        (
            44,
            error(
                "`&mut` can only operate on `mut` objects",
                "`&mut` can only operate on `mut` objects, i.e `mut` bindings, `*mut T` \
                 dereferences, `&mut T` dereferences, etc",
            ),
        ),
        (
            45,
            error(
                "expression is not dereference-able",
                "expression must be of pointer or reference type to dereference",
            ),
        ),
        (
            46,
            error(
                "expression is not able to be indexed into",
                "expression must be of type slice (`[T]` / `[mut T]`) or array (`[T; N]`)",
            ),
        ),
        (
            47,
            error(
                "index expression can only have one argument",
                "there can only be one number inside the `[]`s",
            ),
        ),
        (
            48,
            error(
                "array expression can only be indexed with `isize`",
                "other integer types must be cast explicitly",
            ),
        ),
        (
            49,
            error(
                "assignment expressions can only assign to `mut` lvalues",
                "immutable lvalues cannot be assigned to",
            ),
        ),
        (
            50,
            error(
                "right-hand of assignment expression must be of a compatible type",
                "cannot assign an object to a value of an incompatible type",
            ),
        ),
        (
            51,
            error(
                "call does not have a matching overload",
                "there must exist a function in the overload set with the **same** type of \
                 arguments",
            ),
        ),
        (
            52,
            error(
                "function `::main` must have signature `fn main() -> i32`",
                "`main` has to return an `i32`",
            ),
        ),
        (
            53,
            error(
                "cannot negate unsigned type",
                "negation operator (`-`) can only be applied to signed types",
            ),
        ),
        (
            54,
            error(
                "for loop type must be integral",
                "the type of the init value, end value and loop variable must be integral types",
            ),
        ),
        (
            55,
            error(
                "for loop initial value and last value must be the same type",
                "try inserting a cast",
            ),
        ),
        (
            56,
            error(
                "slice-of expr must have pointer as first expression",
                "you can only create a slice from a pointer",
            ),
        ),
        (
            57,
            error(
                "slice-of expr must have integer as second expression",
                "you need to provide an integral size for the new slice",
            ),
        ),
        (
            58,
            error(
                "class declarations are not implemented",
                "`class` declarations are parsed but have no semantics yet and cannot be used",
            ),
        ),
    ])
});

/// Gets the info, description and explanation for a diagnostic code.
///
/// Panics on an unknown code: the set of codes is fixed and every call
/// site uses a constant.
pub fn diagnostic_info(code: i64) -> &'static DiagnosticInfo {
    LOOKUP
        .get(&code)
        .unwrap_or_else(|| unreachable!("unknown diagnostic code {code}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_is_present() {
        for code in 1..=58 {
            let info = diagnostic_info(code);
            assert!(!info.one_liner.is_empty());
            assert!(!info.explanation.is_empty());
        }
    }

    #[test]
    fn test_known_entries() {
        assert_eq!(
            diagnostic_info(32).one_liner,
            "integer literal out of bounds of type"
        );
        assert_eq!(diagnostic_info(15).severity, Severity::Error);
    }
}
