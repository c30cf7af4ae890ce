//! The expression side of the AST.
//!
//! Every expression kind is a struct with public fields, wrapped by the
//! [`Expression`] enum. Each node carries its source location and an
//! optional result type; after the type checker completes, every reachable
//! non-error expression has its result set.
//!
//! Equality is structural over the syntactic content: source locations and
//! result annotations are ignored, and [`Expression::Error`] compares equal
//! to any expression so that an already-reported error does not produce
//! cascading diagnostics downstream.

mod access;
mod call;
mod control;
mod identifier;
mod literal;
mod operator;
mod struct_init;

pub use self::access::*;
pub use self::call::*;
pub use self::control::*;
pub use self::identifier::*;
pub use self::literal::*;
pub use self::operator::*;
pub use self::struct_init::*;

use super::{SourceLoc, Type};

/// Discriminant of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    StringLiteral,
    IntegerLiteral,
    FloatLiteral,
    BoolLiteral,
    CharLiteral,
    NilLiteral,
    ArrayLiteral,
    UnqualifiedIdentifier,
    LocalIdentifier,
    Identifier,
    StaticGlobal,
    Call,
    StaticCall,
    MethodCall,
    StaticMethodCall,
    Index,
    FieldAccess,
    Group,
    Unary,
    Binary,
    Cast,
    ImplicitConversion,
    IfThen,
    IfElse,
    Block,
    Loop,
    While,
    For,
    Return,
    Break,
    Continue,
    StructInit,
    Load,
    AddressOf,
    SliceOf,
    Range,
    Sizeof,
    Error,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Expression {
    StringLiteral(StringLiteral),
    IntegerLiteral(IntegerLiteral),
    FloatLiteral(FloatLiteral),
    BoolLiteral(BoolLiteral),
    CharLiteral(CharLiteral),
    NilLiteral(NilLiteral),
    ArrayLiteral(ArrayLiteral),
    UnqualifiedIdentifier(UnqualifiedIdentifier),
    LocalIdentifier(LocalIdentifier),
    Identifier(Identifier),
    StaticGlobal(StaticGlobal),
    Call(Call),
    StaticCall(StaticCall),
    MethodCall(MethodCall),
    StaticMethodCall(StaticMethodCall),
    Index(Index),
    FieldAccess(FieldAccess),
    Group(Group),
    Unary(Unary),
    Binary(Binary),
    Cast(Cast),
    ImplicitConversion(ImplicitConversion),
    IfThen(IfThen),
    IfElse(IfElse),
    Block(Block),
    Loop(Loop),
    While(While),
    For(For),
    Return(Return),
    Break(Break),
    Continue(Continue),
    StructInit(StructInit),
    Load(Load),
    AddressOf(AddressOf),
    SliceOf(SliceOf),
    Range(Range),
    Sizeof(Sizeof),
    /// Stands in for an expression that already produced a diagnostic.
    Error,
}

static ERROR_RESULT: Type = Type::Error;

impl Expression {
    pub fn kind(&self) -> ExprKind {
        match self {
            Expression::StringLiteral(_) => ExprKind::StringLiteral,
            Expression::IntegerLiteral(_) => ExprKind::IntegerLiteral,
            Expression::FloatLiteral(_) => ExprKind::FloatLiteral,
            Expression::BoolLiteral(_) => ExprKind::BoolLiteral,
            Expression::CharLiteral(_) => ExprKind::CharLiteral,
            Expression::NilLiteral(_) => ExprKind::NilLiteral,
            Expression::ArrayLiteral(_) => ExprKind::ArrayLiteral,
            Expression::UnqualifiedIdentifier(_) => ExprKind::UnqualifiedIdentifier,
            Expression::LocalIdentifier(_) => ExprKind::LocalIdentifier,
            Expression::Identifier(_) => ExprKind::Identifier,
            Expression::StaticGlobal(_) => ExprKind::StaticGlobal,
            Expression::Call(_) => ExprKind::Call,
            Expression::StaticCall(_) => ExprKind::StaticCall,
            Expression::MethodCall(_) => ExprKind::MethodCall,
            Expression::StaticMethodCall(_) => ExprKind::StaticMethodCall,
            Expression::Index(_) => ExprKind::Index,
            Expression::FieldAccess(_) => ExprKind::FieldAccess,
            Expression::Group(_) => ExprKind::Group,
            Expression::Unary(_) => ExprKind::Unary,
            Expression::Binary(_) => ExprKind::Binary,
            Expression::Cast(_) => ExprKind::Cast,
            Expression::ImplicitConversion(_) => ExprKind::ImplicitConversion,
            Expression::IfThen(_) => ExprKind::IfThen,
            Expression::IfElse(_) => ExprKind::IfElse,
            Expression::Block(_) => ExprKind::Block,
            Expression::Loop(_) => ExprKind::Loop,
            Expression::While(_) => ExprKind::While,
            Expression::For(_) => ExprKind::For,
            Expression::Return(_) => ExprKind::Return,
            Expression::Break(_) => ExprKind::Break,
            Expression::Continue(_) => ExprKind::Continue,
            Expression::StructInit(_) => ExprKind::StructInit,
            Expression::Load(_) => ExprKind::Load,
            Expression::AddressOf(_) => ExprKind::AddressOf,
            Expression::SliceOf(_) => ExprKind::SliceOf,
            Expression::Range(_) => ExprKind::Range,
            Expression::Sizeof(_) => ExprKind::Sizeof,
            Expression::Error => ExprKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Expression::Error)
    }

    pub fn loc(&self) -> SourceLoc {
        match self {
            Expression::StringLiteral(e) => e.loc.clone(),
            Expression::IntegerLiteral(e) => e.loc.clone(),
            Expression::FloatLiteral(e) => e.loc.clone(),
            Expression::BoolLiteral(e) => e.loc.clone(),
            Expression::CharLiteral(e) => e.loc.clone(),
            Expression::NilLiteral(e) => e.loc.clone(),
            Expression::ArrayLiteral(e) => e.loc.clone(),
            Expression::UnqualifiedIdentifier(e) => e.loc.clone(),
            Expression::LocalIdentifier(e) => e.loc.clone(),
            Expression::Identifier(e) => e.loc.clone(),
            Expression::StaticGlobal(e) => e.loc.clone(),
            Expression::Call(e) => e.loc.clone(),
            Expression::StaticCall(e) => e.loc.clone(),
            Expression::MethodCall(e) => e.loc.clone(),
            Expression::StaticMethodCall(e) => e.loc.clone(),
            Expression::Index(e) => e.loc.clone(),
            Expression::FieldAccess(e) => e.loc.clone(),
            Expression::Group(e) => e.loc.clone(),
            Expression::Unary(e) => e.loc.clone(),
            Expression::Binary(e) => e.loc.clone(),
            Expression::Cast(e) => e.loc.clone(),
            Expression::ImplicitConversion(e) => e.loc.clone(),
            Expression::IfThen(e) => e.loc.clone(),
            Expression::IfElse(e) => e.loc.clone(),
            Expression::Block(e) => e.loc.clone(),
            Expression::Loop(e) => e.loc.clone(),
            Expression::While(e) => e.loc.clone(),
            Expression::For(e) => e.loc.clone(),
            Expression::Return(e) => e.loc.clone(),
            Expression::Break(e) => e.loc.clone(),
            Expression::Continue(e) => e.loc.clone(),
            Expression::StructInit(e) => e.loc.clone(),
            Expression::Load(e) => e.loc.clone(),
            Expression::AddressOf(e) => e.loc.clone(),
            Expression::SliceOf(e) => e.loc.clone(),
            Expression::Range(e) => e.loc.clone(),
            Expression::Sizeof(e) => e.loc.clone(),
            Expression::Error => SourceLoc::nonexistent(),
        }
    }

    /// The inferred result type, if the type checker has run over this
    /// node. The error expression always reports the error type.
    pub fn result(&self) -> Option<&Type> {
        match self {
            Expression::StringLiteral(e) => e.result.as_ref(),
            Expression::IntegerLiteral(e) => e.result.as_ref(),
            Expression::FloatLiteral(e) => e.result.as_ref(),
            Expression::BoolLiteral(e) => e.result.as_ref(),
            Expression::CharLiteral(e) => e.result.as_ref(),
            Expression::NilLiteral(e) => e.result.as_ref(),
            Expression::ArrayLiteral(e) => e.result.as_ref(),
            Expression::UnqualifiedIdentifier(e) => e.result.as_ref(),
            Expression::LocalIdentifier(e) => e.result.as_ref(),
            Expression::Identifier(e) => e.result.as_ref(),
            Expression::StaticGlobal(e) => e.result.as_ref(),
            Expression::Call(e) => e.result.as_ref(),
            Expression::StaticCall(e) => e.result.as_ref(),
            Expression::MethodCall(e) => e.result.as_ref(),
            Expression::StaticMethodCall(e) => e.result.as_ref(),
            Expression::Index(e) => e.result.as_ref(),
            Expression::FieldAccess(e) => e.result.as_ref(),
            Expression::Group(e) => e.result.as_ref(),
            Expression::Unary(e) => e.result.as_ref(),
            Expression::Binary(e) => e.result.as_ref(),
            Expression::Cast(e) => e.result.as_ref(),
            Expression::ImplicitConversion(e) => e.result.as_ref(),
            Expression::IfThen(e) => e.result.as_ref(),
            Expression::IfElse(e) => e.result.as_ref(),
            Expression::Block(e) => e.result.as_ref(),
            Expression::Loop(e) => e.result.as_ref(),
            Expression::While(e) => e.result.as_ref(),
            Expression::For(e) => e.result.as_ref(),
            Expression::Return(e) => e.result.as_ref(),
            Expression::Break(e) => e.result.as_ref(),
            Expression::Continue(e) => e.result.as_ref(),
            Expression::StructInit(e) => e.result.as_ref(),
            Expression::Load(e) => e.result.as_ref(),
            Expression::AddressOf(e) => e.result.as_ref(),
            Expression::SliceOf(e) => e.result.as_ref(),
            Expression::Range(e) => e.result.as_ref(),
            Expression::Sizeof(e) => e.result.as_ref(),
            Expression::Error => Some(&ERROR_RESULT),
        }
    }

    /// Stores the result type computed for this node. A no-op on the error
    /// expression, which is always of the error type.
    pub fn result_update(&mut self, ty: Type) {
        let slot = match self {
            Expression::StringLiteral(e) => &mut e.result,
            Expression::IntegerLiteral(e) => &mut e.result,
            Expression::FloatLiteral(e) => &mut e.result,
            Expression::BoolLiteral(e) => &mut e.result,
            Expression::CharLiteral(e) => &mut e.result,
            Expression::NilLiteral(e) => &mut e.result,
            Expression::ArrayLiteral(e) => &mut e.result,
            Expression::UnqualifiedIdentifier(e) => &mut e.result,
            Expression::LocalIdentifier(e) => &mut e.result,
            Expression::Identifier(e) => &mut e.result,
            Expression::StaticGlobal(e) => &mut e.result,
            Expression::Call(e) => &mut e.result,
            Expression::StaticCall(e) => &mut e.result,
            Expression::MethodCall(e) => &mut e.result,
            Expression::StaticMethodCall(e) => &mut e.result,
            Expression::Index(e) => &mut e.result,
            Expression::FieldAccess(e) => &mut e.result,
            Expression::Group(e) => &mut e.result,
            Expression::Unary(e) => &mut e.result,
            Expression::Binary(e) => &mut e.result,
            Expression::Cast(e) => &mut e.result,
            Expression::ImplicitConversion(e) => &mut e.result,
            Expression::IfThen(e) => &mut e.result,
            Expression::IfElse(e) => &mut e.result,
            Expression::Block(e) => &mut e.result,
            Expression::Loop(e) => &mut e.result,
            Expression::While(e) => &mut e.result,
            Expression::For(e) => &mut e.result,
            Expression::Return(e) => &mut e.result,
            Expression::Break(e) => &mut e.result,
            Expression::Continue(e) => &mut e.result,
            Expression::StructInit(e) => &mut e.result,
            Expression::Load(e) => &mut e.result,
            Expression::AddressOf(e) => &mut e.result,
            Expression::SliceOf(e) => &mut e.result,
            Expression::Range(e) => &mut e.result,
            Expression::Sizeof(e) => &mut e.result,
            Expression::Error => return,
        };

        *slot = Some(ty);
    }

    /// Moves this expression out of its slot, leaving the error expression
    /// behind. This is how passes replace subtrees: take the child, build
    /// the replacement, write it back.
    pub fn take(&mut self) -> Expression {
        std::mem::replace(self, Expression::Error)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        use Expression::*;

        match (self, other) {
            // suppresses follow-on diagnostics from already-reported errors
            (Error, _) | (_, Error) => true,
            (StringLiteral(a), StringLiteral(b)) => a.value == b.value,
            (IntegerLiteral(a), IntegerLiteral(b)) => a.value == b.value,
            (FloatLiteral(a), FloatLiteral(b)) => a.value == b.value,
            (BoolLiteral(a), BoolLiteral(b)) => a.value == b.value,
            (CharLiteral(a), CharLiteral(b)) => a.value == b.value,
            (NilLiteral(_), NilLiteral(_)) => true,
            (ArrayLiteral(a), ArrayLiteral(b)) => a.elements == b.elements,
            (UnqualifiedIdentifier(a), UnqualifiedIdentifier(b)) => {
                a.id == b.id && a.generic_args == b.generic_args
            }
            (LocalIdentifier(a), LocalIdentifier(b)) => a.name == b.name,
            (Identifier(a), Identifier(b)) => a.id == b.id,
            (StaticGlobal(a), StaticGlobal(b)) => a.id == b.id,
            (Call(a), Call(b)) => {
                a.callee == b.callee && a.args == b.args && a.generic_args == b.generic_args
            }
            (StaticCall(a), StaticCall(b)) => {
                a.id == b.id && a.args == b.args && a.generic_args == b.generic_args
            }
            (MethodCall(a), MethodCall(b)) => {
                a.receiver == b.receiver
                    && a.name == b.name
                    && a.args == b.args
                    && a.generic_args == b.generic_args
            }
            (StaticMethodCall(a), StaticMethodCall(b)) => {
                a.receiver == b.receiver && a.id == b.id && a.args == b.args
            }
            (Index(a), Index(b)) => a.callee == b.callee && a.indices == b.indices,
            (FieldAccess(a), FieldAccess(b)) => a.object == b.object && a.field == b.field,
            (Group(a), Group(b)) => a.inner == b.inner,
            (Unary(a), Unary(b)) => a.op == b.op && a.operand == b.operand,
            (Binary(a), Binary(b)) => a.op == b.op && a.lhs == b.lhs && a.rhs == b.rhs,
            (Cast(a), Cast(b)) => {
                a.unsafe_cast == b.unsafe_cast && a.operand == b.operand && a.target == b.target
            }
            (ImplicitConversion(a), ImplicitConversion(b)) => {
                a.operand == b.operand && a.target == b.target
            }
            (IfThen(a), IfThen(b)) => {
                a.condition == b.condition
                    && a.true_branch == b.true_branch
                    && a.false_branch == b.false_branch
            }
            (IfElse(a), IfElse(b)) => {
                a.condition == b.condition
                    && a.block == b.block
                    && a.elif_blocks == b.elif_blocks
                    && a.else_block == b.else_block
            }
            (Block(a), Block(b)) => a.statements == b.statements,
            (Loop(a), Loop(b)) => a.body == b.body,
            (While(a), While(b)) => a.condition == b.condition && a.body == b.body,
            (For(a), For(b)) => {
                a.loop_variable == b.loop_variable
                    && a.direction == b.direction
                    && a.init == b.init
                    && a.last == b.last
                    && a.body == b.body
            }
            (Return(a), Return(b)) => a.value == b.value,
            (Break(a), Break(b)) => a.value == b.value,
            (Continue(_), Continue(_)) => true,
            (StructInit(a), StructInit(b)) => a.target == b.target && a.fields == b.fields,
            (Load(a), Load(b)) => a.operand == b.operand,
            (AddressOf(a), AddressOf(b)) => a.operand == b.operand,
            (SliceOf(a), SliceOf(b)) => a.ptr == b.ptr && a.len == b.len,
            (Range(a), Range(b)) => a.start == b.start && a.end == b.end && a.kind == b.kind,
            (Sizeof(a), Sizeof(b)) => a.ty == b.ty,
            _ => false,
        }
    }
}

impl PartialEq for ElifBlock {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition && self.block == other.block
    }
}

impl PartialEq for FieldInitializer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

macro_rules! impl_from_expression {
    ($($name:ident),* $(,)?) => {
        $(
            impl From<$name> for Expression {
                fn from(value: $name) -> Self {
                    Expression::$name(value)
                }
            }
        )*
    };
}

impl_from_expression!(
    StringLiteral,
    IntegerLiteral,
    FloatLiteral,
    BoolLiteral,
    CharLiteral,
    NilLiteral,
    ArrayLiteral,
    UnqualifiedIdentifier,
    LocalIdentifier,
    Identifier,
    StaticGlobal,
    Call,
    StaticCall,
    MethodCall,
    StaticMethodCall,
    Index,
    FieldAccess,
    Group,
    Unary,
    Binary,
    Cast,
    ImplicitConversion,
    IfThen,
    IfElse,
    Block,
    Loop,
    While,
    For,
    Return,
    Break,
    Continue,
    StructInit,
    Load,
    AddressOf,
    SliceOf,
    Range,
    Sizeof,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{IntegerWidth, SourceLoc, Type, UnqualifiedId};

    fn int(value: u128) -> Expression {
        IntegerLiteral::new(SourceLoc::default(), value).into()
    }

    #[test]
    fn test_error_expression_equals_anything() {
        assert_eq!(Expression::Error, int(42));
        assert_eq!(int(42), Expression::Error);
        assert_eq!(Expression::Error, Expression::Error);
    }

    #[test]
    fn test_equality_short_circuits_on_kind() {
        assert_ne!(int(1), BoolLiteral::new(SourceLoc::default(), true).into());
        assert_eq!(int(1), int(1));
        assert_ne!(int(1), int(2));
    }

    #[test]
    fn test_equality_ignores_result_annotation() {
        let mut typed = int(1);
        typed.result_update(Type::signed(IntegerWidth::W32));

        assert_eq!(typed, int(1));
    }

    #[test]
    fn test_clone_is_deep_and_equal() {
        let original: Expression = Binary::new(
            SourceLoc::new("1 + x", 1, 1, "a.ga"),
            BinaryOp::Add,
            int(1),
            UnqualifiedIdentifier::new(SourceLoc::default(), UnqualifiedId::bare("x")).into(),
        )
        .into();

        let clone = original.clone();

        assert_eq!(original, clone);
    }

    #[test]
    fn test_take_leaves_error_behind() {
        let mut expr = int(7);
        let taken = expr.take();

        assert_eq!(taken, int(7));
        assert!(expr.is_error());
    }

    #[test]
    fn test_error_expression_reports_error_result() {
        assert_eq!(Expression::Error.result(), Some(&Type::Error));
    }
}
