use super::{Expression, SourceLoc, Type};

/// A `let` / `mut` binding.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BindingStatement {
    pub loc: SourceLoc,
    pub name: String,
    pub mutable: bool,
    pub hint: Option<Type>,
    pub initializer: Expression,
}

impl BindingStatement {
    pub fn new(
        loc: SourceLoc,
        name: impl Into<String>,
        mutable: bool,
        hint: Option<Type>,
        initializer: Expression,
    ) -> BindingStatement {
        BindingStatement {
            loc,
            name: name.into(),
            mutable,
            hint,
            initializer,
        }
    }
}

/// An `assert condition, "message"` statement.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AssertStatement {
    pub loc: SourceLoc,
    pub assertion: Expression,
    pub message: Expression,
}

impl AssertStatement {
    pub fn new(loc: SourceLoc, assertion: Expression, message: Expression) -> AssertStatement {
        AssertStatement {
            loc,
            assertion,
            message,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExpressionStatement {
    pub loc: SourceLoc,
    pub expr: Expression,
}

impl ExpressionStatement {
    pub fn new(loc: SourceLoc, expr: Expression) -> ExpressionStatement {
        ExpressionStatement { loc, expr }
    }
}

/// Discriminant of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Binding,
    Assert,
    Expression,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Statement {
    Binding(BindingStatement),
    Assert(AssertStatement),
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn kind(&self) -> StmtKind {
        match self {
            Statement::Binding(_) => StmtKind::Binding,
            Statement::Assert(_) => StmtKind::Assert,
            Statement::Expression(_) => StmtKind::Expression,
        }
    }

    pub fn loc(&self) -> SourceLoc {
        match self {
            Statement::Binding(s) => s.loc.clone(),
            Statement::Assert(s) => s.loc.clone(),
            Statement::Expression(s) => s.loc.clone(),
        }
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Statement::Binding(a), Statement::Binding(b)) => {
                a.name == b.name
                    && a.mutable == b.mutable
                    && a.hint == b.hint
                    && a.initializer == b.initializer
            }
            (Statement::Assert(a), Statement::Assert(b)) => {
                a.assertion == b.assertion && a.message == b.message
            }
            (Statement::Expression(a), Statement::Expression(b)) => a.expr == b.expr,
            _ => false,
        }
    }
}

impl From<BindingStatement> for Statement {
    fn from(value: BindingStatement) -> Self {
        Statement::Binding(value)
    }
}

impl From<AssertStatement> for Statement {
    fn from(value: AssertStatement) -> Self {
        Statement::Assert(value)
    }
}

impl From<ExpressionStatement> for Statement {
    fn from(value: ExpressionStatement) -> Self {
        Statement::Expression(value)
    }
}
