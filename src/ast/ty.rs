use std::fmt::{self, Display, Formatter};

use super::ids::{FullyQualifiedId, UnqualifiedId};
use super::source_loc::SourceLoc;
use super::DeclRef;

/// Width of a builtin integral type. `Native` is the pointer-sized width
/// (`usize` / `isize`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum IntegerWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
    Native,
}

impl IntegerWidth {
    /// The number of bits, with the native width pinned to 64 for the
    /// purposes of literal range checking.
    pub fn bits(self) -> u32 {
        match self {
            IntegerWidth::W8 => 8,
            IntegerWidth::W16 => 16,
            IntegerWidth::W32 => 32,
            IntegerWidth::W64 | IntegerWidth::Native => 64,
            IntegerWidth::W128 => 128,
        }
    }
}

/// Width of a builtin IEEE-754 float type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FloatWidth {
    Single,
    Double,
    Quadruple,
}

/// Discriminant of a [`Type`], for quick kind checks without matching the
/// whole variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Reference,
    Slice,
    Pointer,
    Array,
    Integral,
    Float,
    Bool,
    Byte,
    Char,
    UnqualifiedUserDefined,
    UserDefined,
    UnqualifiedDynInterface,
    DynInterface,
    FnPointer,
    Void,
    NilPointer,
    UnsizedInteger,
    Indirection,
    Error,
}

/// A Gallium type. Types compare structurally (source locations are
/// ignored), and [`Type::Error`] compares equal to anything so that a
/// reported error does not cascade into spurious diagnostics downstream.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Type {
    /// `&T` / `&mut T`
    Reference {
        loc: SourceLoc,
        mutable: bool,
        referenced: Box<Type>,
    },
    /// `[T]` / `[mut T]`
    Slice {
        loc: SourceLoc,
        mutable: bool,
        element: Box<Type>,
    },
    /// `*const T` / `*mut T`
    Pointer {
        loc: SourceLoc,
        mutable: bool,
        pointed: Box<Type>,
    },
    /// `[T; N]`
    Array {
        loc: SourceLoc,
        element: Box<Type>,
        len: u64,
    },
    /// `i8`..`i128`, `isize`, `u8`..`u128`, `usize`
    Integral {
        loc: SourceLoc,
        signed: bool,
        width: IntegerWidth,
    },
    /// `f32` / `f64` / `f128`
    Float { loc: SourceLoc, width: FloatWidth },
    Bool { loc: SourceLoc },
    Byte { loc: SourceLoc },
    Char { loc: SourceLoc },
    /// A user-defined type name the resolver has not yet qualified. Only
    /// exists between parsing and name resolution.
    UnqualifiedUserDefined {
        loc: SourceLoc,
        id: UnqualifiedId,
        generic_args: Vec<Type>,
    },
    /// A resolved user-defined type, pointing back at the `struct`/`type`
    /// declaration it came from.
    UserDefined {
        loc: SourceLoc,
        id: FullyQualifiedId,
        decl: DeclRef,
        generic_args: Vec<Type>,
    },
    /// A `dyn` interface name the resolver has not yet qualified.
    UnqualifiedDynInterface { loc: SourceLoc, id: UnqualifiedId },
    /// A resolved `dyn` interface type.
    DynInterface {
        loc: SourceLoc,
        id: FullyQualifiedId,
        decl: DeclRef,
    },
    /// `fn(args...) -> ret`
    FnPointer {
        loc: SourceLoc,
        args: Vec<Type>,
        ret: Box<Type>,
    },
    Void { loc: SourceLoc },
    /// The type of a `nil` literal before inference fixes it to a pointer
    /// type.
    NilPointer { loc: SourceLoc },
    /// The type of an integer literal before context fixes it to a concrete
    /// integral type. Carries the literal's value for range checking.
    UnsizedInteger { loc: SourceLoc, value: u128 },
    /// Compiler-internal lvalue marker wrapping the object's real type.
    /// Transparent to field access and dereference, never written by users.
    Indirection {
        loc: SourceLoc,
        mutable: bool,
        produced: Box<Type>,
    },
    Error,
}

impl Type {
    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Reference { .. } => TypeKind::Reference,
            Type::Slice { .. } => TypeKind::Slice,
            Type::Pointer { .. } => TypeKind::Pointer,
            Type::Array { .. } => TypeKind::Array,
            Type::Integral { .. } => TypeKind::Integral,
            Type::Float { .. } => TypeKind::Float,
            Type::Bool { .. } => TypeKind::Bool,
            Type::Byte { .. } => TypeKind::Byte,
            Type::Char { .. } => TypeKind::Char,
            Type::UnqualifiedUserDefined { .. } => TypeKind::UnqualifiedUserDefined,
            Type::UserDefined { .. } => TypeKind::UserDefined,
            Type::UnqualifiedDynInterface { .. } => TypeKind::UnqualifiedDynInterface,
            Type::DynInterface { .. } => TypeKind::DynInterface,
            Type::FnPointer { .. } => TypeKind::FnPointer,
            Type::Void { .. } => TypeKind::Void,
            Type::NilPointer { .. } => TypeKind::NilPointer,
            Type::UnsizedInteger { .. } => TypeKind::UnsizedInteger,
            Type::Indirection { .. } => TypeKind::Indirection,
            Type::Error => TypeKind::Error,
        }
    }

    pub fn loc(&self) -> SourceLoc {
        match self {
            Type::Reference { loc, .. }
            | Type::Slice { loc, .. }
            | Type::Pointer { loc, .. }
            | Type::Array { loc, .. }
            | Type::Integral { loc, .. }
            | Type::Float { loc, .. }
            | Type::Bool { loc }
            | Type::Byte { loc }
            | Type::Char { loc }
            | Type::UnqualifiedUserDefined { loc, .. }
            | Type::UserDefined { loc, .. }
            | Type::UnqualifiedDynInterface { loc, .. }
            | Type::DynInterface { loc, .. }
            | Type::FnPointer { loc, .. }
            | Type::Void { loc }
            | Type::NilPointer { loc }
            | Type::UnsizedInteger { loc, .. }
            | Type::Indirection { loc, .. } => loc.clone(),
            Type::Error => SourceLoc::nonexistent(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Type::Integral { .. } | Type::Byte { .. } | Type::UnsizedInteger { .. }
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integral() || matches!(self, Type::Float { .. })
    }

    /// Strips the compiler-internal lvalue marker, yielding the type an
    /// expression evaluates to when used as a value.
    pub fn as_rvalue(&self) -> &Type {
        match self {
            Type::Indirection { produced, .. } => produced,
            other => other,
        }
    }

    /// Moves out of the lvalue marker, if present.
    pub fn into_rvalue(self) -> Type {
        match self {
            Type::Indirection { produced, .. } => *produced,
            other => other,
        }
    }

    pub fn signed(width: IntegerWidth) -> Type {
        Type::Integral {
            loc: SourceLoc::nonexistent(),
            signed: true,
            width,
        }
    }

    pub fn unsigned(width: IntegerWidth) -> Type {
        Type::Integral {
            loc: SourceLoc::nonexistent(),
            signed: false,
            width,
        }
    }

    pub fn float(width: FloatWidth) -> Type {
        Type::Float {
            loc: SourceLoc::nonexistent(),
            width,
        }
    }

    pub fn bool_type() -> Type {
        Type::Bool {
            loc: SourceLoc::nonexistent(),
        }
    }

    pub fn byte_type() -> Type {
        Type::Byte {
            loc: SourceLoc::nonexistent(),
        }
    }

    pub fn char_type() -> Type {
        Type::Char {
            loc: SourceLoc::nonexistent(),
        }
    }

    pub fn void() -> Type {
        Type::Void {
            loc: SourceLoc::nonexistent(),
        }
    }

    pub fn reference(mutable: bool, referenced: Type) -> Type {
        Type::Reference {
            loc: SourceLoc::nonexistent(),
            mutable,
            referenced: Box::new(referenced),
        }
    }

    pub fn pointer(mutable: bool, pointed: Type) -> Type {
        Type::Pointer {
            loc: SourceLoc::nonexistent(),
            mutable,
            pointed: Box::new(pointed),
        }
    }

    pub fn slice(mutable: bool, element: Type) -> Type {
        Type::Slice {
            loc: SourceLoc::nonexistent(),
            mutable,
            element: Box::new(element),
        }
    }

    pub fn array(element: Type, len: u64) -> Type {
        Type::Array {
            loc: SourceLoc::nonexistent(),
            element: Box::new(element),
            len,
        }
    }

    pub fn fn_pointer(args: Vec<Type>, ret: Type) -> Type {
        Type::FnPointer {
            loc: SourceLoc::nonexistent(),
            args,
            ret: Box::new(ret),
        }
    }

    pub fn indirection(mutable: bool, produced: Type) -> Type {
        Type::Indirection {
            loc: SourceLoc::nonexistent(),
            mutable,
            produced: Box::new(produced),
        }
    }

    /// Whether `value` is representable in an integral type of the given
    /// signedness and width.
    pub fn fits_integral(value: u128, signed: bool, width: IntegerWidth) -> bool {
        let bits = width.bits();

        if signed {
            value <= (1u128 << (bits - 1)) - 1
        } else if bits == 128 {
            true
        } else {
            value <= (1u128 << bits) - 1
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        use Type::*;

        match (self, other) {
            // error suppresses cascades by comparing equal to everything
            (Error, _) | (_, Error) => true,
            (
                Reference {
                    mutable: m1,
                    referenced: t1,
                    ..
                },
                Reference {
                    mutable: m2,
                    referenced: t2,
                    ..
                },
            ) => m1 == m2 && t1 == t2,
            (
                Slice {
                    mutable: m1,
                    element: t1,
                    ..
                },
                Slice {
                    mutable: m2,
                    element: t2,
                    ..
                },
            ) => m1 == m2 && t1 == t2,
            (
                Pointer {
                    mutable: m1,
                    pointed: t1,
                    ..
                },
                Pointer {
                    mutable: m2,
                    pointed: t2,
                    ..
                },
            ) => m1 == m2 && t1 == t2,
            (
                Array {
                    element: t1,
                    len: l1,
                    ..
                },
                Array {
                    element: t2,
                    len: l2,
                    ..
                },
            ) => l1 == l2 && t1 == t2,
            (
                Integral {
                    signed: s1,
                    width: w1,
                    ..
                },
                Integral {
                    signed: s2,
                    width: w2,
                    ..
                },
            ) => s1 == s2 && w1 == w2,
            (Float { width: w1, .. }, Float { width: w2, .. }) => w1 == w2,
            (Bool { .. }, Bool { .. }) => true,
            (Byte { .. }, Byte { .. }) => true,
            (Char { .. }, Char { .. }) => true,
            (
                UnqualifiedUserDefined {
                    id: i1,
                    generic_args: g1,
                    ..
                },
                UnqualifiedUserDefined {
                    id: i2,
                    generic_args: g2,
                    ..
                },
            ) => i1 == i2 && g1 == g2,
            (
                UserDefined {
                    id: i1,
                    generic_args: g1,
                    ..
                },
                UserDefined {
                    id: i2,
                    generic_args: g2,
                    ..
                },
            ) => i1 == i2 && g1 == g2,
            (UnqualifiedDynInterface { id: i1, .. }, UnqualifiedDynInterface { id: i2, .. }) => {
                i1 == i2
            }
            (DynInterface { id: i1, .. }, DynInterface { id: i2, .. }) => i1 == i2,
            (
                FnPointer {
                    args: a1, ret: r1, ..
                },
                FnPointer {
                    args: a2, ret: r2, ..
                },
            ) => a1 == a2 && r1 == r2,
            (Void { .. }, Void { .. }) => true,
            (NilPointer { .. }, NilPointer { .. }) => true,
            // two literals-in-flight are the same type regardless of value
            (UnsizedInteger { .. }, UnsizedInteger { .. }) => true,
            (
                Indirection {
                    mutable: m1,
                    produced: t1,
                    ..
                },
                Indirection {
                    mutable: m2,
                    produced: t2,
                    ..
                },
            ) => m1 == m2 && t1 == t2,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Reference {
                mutable,
                referenced,
                ..
            } => {
                write!(f, "&{}{referenced}", if *mutable { "mut " } else { "" })
            }
            Type::Slice {
                mutable, element, ..
            } => write!(f, "[{}{element}]", if *mutable { "mut " } else { "" }),
            Type::Pointer {
                mutable, pointed, ..
            } => write!(f, "*{} {pointed}", if *mutable { "mut" } else { "const" }),
            Type::Array { element, len, .. } => write!(f, "[{element}; {len}]"),
            Type::Integral { signed, width, .. } => {
                let prefix = if *signed { "i" } else { "u" };

                match width {
                    IntegerWidth::W8 => write!(f, "{prefix}8"),
                    IntegerWidth::W16 => write!(f, "{prefix}16"),
                    IntegerWidth::W32 => write!(f, "{prefix}32"),
                    IntegerWidth::W64 => write!(f, "{prefix}64"),
                    IntegerWidth::W128 => write!(f, "{prefix}128"),
                    IntegerWidth::Native => write!(f, "{prefix}size"),
                }
            }
            Type::Float { width, .. } => match width {
                FloatWidth::Single => f.write_str("f32"),
                FloatWidth::Double => f.write_str("f64"),
                FloatWidth::Quadruple => f.write_str("f128"),
            },
            Type::Bool { .. } => f.write_str("bool"),
            Type::Byte { .. } => f.write_str("byte"),
            Type::Char { .. } => f.write_str("char"),
            Type::UnqualifiedUserDefined {
                id, generic_args, ..
            } => {
                write!(f, "{id}")?;
                write_generic_args(f, generic_args)
            }
            Type::UserDefined {
                id, generic_args, ..
            } => {
                write!(f, "{id}")?;
                write_generic_args(f, generic_args)
            }
            Type::UnqualifiedDynInterface { id, .. } => write!(f, "dyn {id}"),
            Type::DynInterface { id, .. } => write!(f, "dyn {id}"),
            Type::FnPointer { args, ret, .. } => {
                let args = args
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");

                write!(f, "fn({args}) -> {ret}")
            }
            Type::Void { .. } => f.write_str("void"),
            Type::NilPointer { .. } => f.write_str("nil"),
            Type::UnsizedInteger { .. } => f.write_str("{integer}"),
            Type::Indirection { produced, .. } => write!(f, "{produced}"),
            Type::Error => f.write_str("<error>"),
        }
    }
}

fn write_generic_args(f: &mut Formatter<'_>, args: &[Type]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }

    let args = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    write!(f, "<{args}>")
}

#[cfg(test)]
mod tests {
    use super::{FloatWidth, IntegerWidth, Type};
    use crate::ast::FullyQualifiedId;

    #[test]
    fn test_error_equals_anything() {
        assert_eq!(Type::Error, Type::signed(IntegerWidth::W32));
        assert_eq!(Type::void(), Type::Error);
        assert_eq!(Type::Error, Type::Error);
    }

    #[test]
    fn test_equality_ignores_locations() {
        let a = Type::Reference {
            loc: crate::ast::SourceLoc::new("&i32", 10, 4, "a.ga"),
            mutable: false,
            referenced: Box::new(Type::signed(IntegerWidth::W32)),
        };
        let b = Type::reference(false, Type::signed(IntegerWidth::W32));

        assert_eq!(a, b);
    }

    #[test]
    fn test_structural_inequality() {
        assert_ne!(
            Type::reference(true, Type::bool_type()),
            Type::reference(false, Type::bool_type())
        );
        assert_ne!(
            Type::signed(IntegerWidth::W32),
            Type::unsigned(IntegerWidth::W32)
        );
        assert_ne!(Type::array(Type::byte_type(), 3), Type::array(Type::byte_type(), 4));
    }

    #[test]
    fn test_display_surface_syntax() {
        assert_eq!(
            Type::reference(true, Type::array(Type::unsigned(IntegerWidth::W8), 3)).to_string(),
            "&mut [u8; 3]"
        );
        assert_eq!(
            Type::fn_pointer(vec![Type::signed(IntegerWidth::W32)], Type::bool_type()).to_string(),
            "fn(i32) -> bool"
        );
        assert_eq!(Type::unsigned(IntegerWidth::Native).to_string(), "usize");
        assert_eq!(Type::float(FloatWidth::Quadruple).to_string(), "f128");
        assert_eq!(
            Type::pointer(false, Type::char_type()).to_string(),
            "*const char"
        );
    }

    #[test]
    fn test_fits_integral() {
        assert!(Type::fits_integral(127, true, IntegerWidth::W8));
        assert!(!Type::fits_integral(128, true, IntegerWidth::W8));
        assert!(Type::fits_integral(255, false, IntegerWidth::W8));
        assert!(!Type::fits_integral(256, false, IntegerWidth::W8));
        assert!(!Type::fits_integral(2_147_483_648, true, IntegerWidth::W32));
        assert!(Type::fits_integral(2_147_483_648, false, IntegerWidth::W32));
        assert!(Type::fits_integral(u128::MAX, false, IntegerWidth::W128));
    }

    #[test]
    fn test_indirection_is_transparent_for_display_and_rvalue() {
        let ty = Type::indirection(true, Type::signed(IntegerWidth::W64));

        assert_eq!(ty.to_string(), "i64");
        assert_eq!(*ty.as_rvalue(), Type::signed(IntegerWidth::W64));
    }

    #[test]
    fn test_user_defined_equality_is_by_id() {
        let a = Type::UserDefined {
            loc: Default::default(),
            id: FullyQualifiedId::new("::s::", "S"),
            decl: crate::ast::DeclRef::top_level(0),
            generic_args: vec![],
        };
        let b = Type::UserDefined {
            loc: Default::default(),
            id: FullyQualifiedId::new("::s::", "S"),
            decl: crate::ast::DeclRef::top_level(4),
            generic_args: vec![],
        };
        let c = Type::UserDefined {
            loc: Default::default(),
            id: FullyQualifiedId::new("::q::", "S"),
            decl: crate::ast::DeclRef::top_level(0),
            generic_args: vec![],
        };

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
