//! Generic traversal over the AST.
//!
//! Passes implement [`Visitor`] (read-only) or [`MutVisitor`] (in-place
//! mutation), override the hooks they care about, and delegate to the
//! matching `walk_*` function for the recursion. A visitor that produces a
//! value stages it into one of its own fields and the caller reads it back
//! afterwards.
//!
//! A `MutVisitor` may replace a subtree outright: every expression hook
//! receives the owning slot as `&mut Expression`, so
//! [`Expression::take`](super::Expression::take) plus a write-back swaps
//! the node. This is how the resolver rewrites unqualified identifiers and
//! how the type checker wraps arguments in implicit conversions.

use super::{Declaration, Expression, FnPrototype, Statement, Type};

pub trait Visitor {
    fn visit_declaration(&mut self, decl: &Declaration) {
        walk_declaration(self, decl);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_type(&mut self, ty: &Type) {
        walk_type(self, ty);
    }

    fn visit_prototype(&mut self, proto: &FnPrototype) {
        walk_prototype(self, proto);
    }
}

pub trait MutVisitor {
    fn visit_declaration(&mut self, decl: &mut Declaration) {
        walk_declaration_mut(self, decl);
    }

    fn visit_statement(&mut self, stmt: &mut Statement) {
        walk_statement_mut(self, stmt);
    }

    fn visit_expression(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
    }

    fn visit_type(&mut self, ty: &mut Type) {
        walk_type_mut(self, ty);
    }

    fn visit_prototype(&mut self, proto: &mut FnPrototype) {
        walk_prototype_mut(self, proto);
    }
}

pub fn walk_declaration<V: Visitor + ?Sized>(visitor: &mut V, decl: &Declaration) {
    match decl {
        Declaration::Import(_) | Declaration::ImportFrom(_) | Declaration::Class(_) => {}
        Declaration::Fn(decl) => {
            visitor.visit_prototype(&decl.proto);
            visitor.visit_expression(&decl.body);
        }
        Declaration::Method(decl) => {
            visitor.visit_type(&decl.receiver);
            visitor.visit_prototype(&decl.proto);
            visitor.visit_expression(&decl.body);
        }
        Declaration::Struct(decl) => {
            for field in &decl.fields {
                visitor.visit_type(&field.ty);
            }
        }
        Declaration::TypeAlias(decl) => visitor.visit_type(&decl.aliased),
        Declaration::ExternalFn(decl) => visitor.visit_prototype(&decl.proto),
        Declaration::External(decl) => {
            for decl in &decl.externals {
                visitor.visit_declaration(decl);
            }
        }
        Declaration::Constant(decl) => {
            visitor.visit_type(&decl.hint);
            visitor.visit_expression(&decl.initializer);
        }
        Declaration::Error => {}
    }
}

pub fn walk_declaration_mut<V: MutVisitor + ?Sized>(visitor: &mut V, decl: &mut Declaration) {
    match decl {
        Declaration::Import(_) | Declaration::ImportFrom(_) | Declaration::Class(_) => {}
        Declaration::Fn(decl) => {
            visitor.visit_prototype(&mut decl.proto);
            visitor.visit_expression(&mut decl.body);
        }
        Declaration::Method(decl) => {
            visitor.visit_type(&mut decl.receiver);
            visitor.visit_prototype(&mut decl.proto);
            visitor.visit_expression(&mut decl.body);
        }
        Declaration::Struct(decl) => {
            for field in &mut decl.fields {
                visitor.visit_type(&mut field.ty);
            }
        }
        Declaration::TypeAlias(decl) => visitor.visit_type(&mut decl.aliased),
        Declaration::ExternalFn(decl) => visitor.visit_prototype(&mut decl.proto),
        Declaration::External(decl) => {
            for decl in &mut decl.externals {
                visitor.visit_declaration(decl);
            }
        }
        Declaration::Constant(decl) => {
            visitor.visit_type(&mut decl.hint);
            visitor.visit_expression(&mut decl.initializer);
        }
        Declaration::Error => {}
    }
}

pub fn walk_prototype<V: Visitor + ?Sized>(visitor: &mut V, proto: &FnPrototype) {
    for arg in &proto.args {
        visitor.visit_type(&arg.ty);
    }

    visitor.visit_type(&proto.return_type);
}

pub fn walk_prototype_mut<V: MutVisitor + ?Sized>(visitor: &mut V, proto: &mut FnPrototype) {
    for arg in &mut proto.args {
        visitor.visit_type(&mut arg.ty);
    }

    visitor.visit_type(&mut proto.return_type);
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Binding(stmt) => {
            if let Some(hint) = &stmt.hint {
                visitor.visit_type(hint);
            }

            visitor.visit_expression(&stmt.initializer);
        }
        Statement::Assert(stmt) => {
            visitor.visit_expression(&stmt.assertion);
            visitor.visit_expression(&stmt.message);
        }
        Statement::Expression(stmt) => visitor.visit_expression(&stmt.expr),
    }
}

pub fn walk_statement_mut<V: MutVisitor + ?Sized>(visitor: &mut V, stmt: &mut Statement) {
    match stmt {
        Statement::Binding(stmt) => {
            if let Some(hint) = &mut stmt.hint {
                visitor.visit_type(hint);
            }

            visitor.visit_expression(&mut stmt.initializer);
        }
        Statement::Assert(stmt) => {
            visitor.visit_expression(&mut stmt.assertion);
            visitor.visit_expression(&mut stmt.message);
        }
        Statement::Expression(stmt) => visitor.visit_expression(&mut stmt.expr),
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::StringLiteral(_)
        | Expression::IntegerLiteral(_)
        | Expression::FloatLiteral(_)
        | Expression::BoolLiteral(_)
        | Expression::CharLiteral(_)
        | Expression::NilLiteral(_)
        | Expression::LocalIdentifier(_)
        | Expression::Identifier(_)
        | Expression::StaticGlobal(_)
        | Expression::Continue(_)
        | Expression::Error => {}
        Expression::ArrayLiteral(e) => {
            for element in &e.elements {
                visitor.visit_expression(element);
            }
        }
        Expression::UnqualifiedIdentifier(e) => {
            for arg in &e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::Call(e) => {
            visitor.visit_expression(&e.callee);

            for arg in &e.args {
                visitor.visit_expression(arg);
            }

            for arg in &e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::StaticCall(e) => {
            for arg in &e.args {
                visitor.visit_expression(arg);
            }

            for arg in &e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::MethodCall(e) => {
            visitor.visit_expression(&e.receiver);

            for arg in &e.args {
                visitor.visit_expression(arg);
            }

            for arg in &e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::StaticMethodCall(e) => {
            visitor.visit_expression(&e.receiver);

            for arg in &e.args {
                visitor.visit_expression(arg);
            }
        }
        Expression::Index(e) => {
            visitor.visit_expression(&e.callee);

            for index in &e.indices {
                visitor.visit_expression(index);
            }
        }
        Expression::FieldAccess(e) => visitor.visit_expression(&e.object),
        Expression::Group(e) => visitor.visit_expression(&e.inner),
        Expression::Unary(e) => visitor.visit_expression(&e.operand),
        Expression::Binary(e) => {
            visitor.visit_expression(&e.lhs);
            visitor.visit_expression(&e.rhs);
        }
        Expression::Cast(e) => {
            visitor.visit_expression(&e.operand);
            visitor.visit_type(&e.target);
        }
        Expression::ImplicitConversion(e) => {
            visitor.visit_expression(&e.operand);
            visitor.visit_type(&e.target);
        }
        Expression::IfThen(e) => {
            visitor.visit_expression(&e.condition);
            visitor.visit_expression(&e.true_branch);
            visitor.visit_expression(&e.false_branch);
        }
        Expression::IfElse(e) => {
            visitor.visit_expression(&e.condition);
            visitor.visit_expression(&e.block);

            for elif in &e.elif_blocks {
                visitor.visit_expression(&elif.condition);
                visitor.visit_expression(&elif.block);
            }

            if let Some(else_block) = &e.else_block {
                visitor.visit_expression(else_block);
            }
        }
        Expression::Block(e) => {
            for stmt in &e.statements {
                visitor.visit_statement(stmt);
            }
        }
        Expression::Loop(e) => visitor.visit_expression(&e.body),
        Expression::While(e) => {
            visitor.visit_expression(&e.condition);
            visitor.visit_expression(&e.body);
        }
        Expression::For(e) => {
            visitor.visit_expression(&e.init);
            visitor.visit_expression(&e.last);
            visitor.visit_expression(&e.body);
        }
        Expression::Return(e) => {
            if let Some(value) = &e.value {
                visitor.visit_expression(value);
            }
        }
        Expression::Break(e) => {
            if let Some(value) = &e.value {
                visitor.visit_expression(value);
            }
        }
        Expression::StructInit(e) => {
            visitor.visit_type(&e.target);

            for field in &e.fields {
                visitor.visit_expression(&field.value);
            }
        }
        Expression::Load(e) => visitor.visit_expression(&e.operand),
        Expression::AddressOf(e) => visitor.visit_expression(&e.operand),
        Expression::SliceOf(e) => {
            visitor.visit_expression(&e.ptr);
            visitor.visit_expression(&e.len);
        }
        Expression::Range(e) => {
            visitor.visit_expression(&e.start);
            visitor.visit_expression(&e.end);
        }
        Expression::Sizeof(e) => visitor.visit_type(&e.ty),
    }
}

pub fn walk_expression_mut<V: MutVisitor + ?Sized>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::StringLiteral(_)
        | Expression::IntegerLiteral(_)
        | Expression::FloatLiteral(_)
        | Expression::BoolLiteral(_)
        | Expression::CharLiteral(_)
        | Expression::NilLiteral(_)
        | Expression::LocalIdentifier(_)
        | Expression::Identifier(_)
        | Expression::StaticGlobal(_)
        | Expression::Continue(_)
        | Expression::Error => {}
        Expression::ArrayLiteral(e) => {
            for element in &mut e.elements {
                visitor.visit_expression(element);
            }
        }
        Expression::UnqualifiedIdentifier(e) => {
            for arg in &mut e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::Call(e) => {
            visitor.visit_expression(&mut e.callee);

            for arg in &mut e.args {
                visitor.visit_expression(arg);
            }

            for arg in &mut e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::StaticCall(e) => {
            for arg in &mut e.args {
                visitor.visit_expression(arg);
            }

            for arg in &mut e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::MethodCall(e) => {
            visitor.visit_expression(&mut e.receiver);

            for arg in &mut e.args {
                visitor.visit_expression(arg);
            }

            for arg in &mut e.generic_args {
                visitor.visit_type(arg);
            }
        }
        Expression::StaticMethodCall(e) => {
            visitor.visit_expression(&mut e.receiver);

            for arg in &mut e.args {
                visitor.visit_expression(arg);
            }
        }
        Expression::Index(e) => {
            visitor.visit_expression(&mut e.callee);

            for index in &mut e.indices {
                visitor.visit_expression(index);
            }
        }
        Expression::FieldAccess(e) => visitor.visit_expression(&mut e.object),
        Expression::Group(e) => visitor.visit_expression(&mut e.inner),
        Expression::Unary(e) => visitor.visit_expression(&mut e.operand),
        Expression::Binary(e) => {
            visitor.visit_expression(&mut e.lhs);
            visitor.visit_expression(&mut e.rhs);
        }
        Expression::Cast(e) => {
            visitor.visit_expression(&mut e.operand);
            visitor.visit_type(&mut e.target);
        }
        Expression::ImplicitConversion(e) => {
            visitor.visit_expression(&mut e.operand);
            visitor.visit_type(&mut e.target);
        }
        Expression::IfThen(e) => {
            visitor.visit_expression(&mut e.condition);
            visitor.visit_expression(&mut e.true_branch);
            visitor.visit_expression(&mut e.false_branch);
        }
        Expression::IfElse(e) => {
            visitor.visit_expression(&mut e.condition);
            visitor.visit_expression(&mut e.block);

            for elif in &mut e.elif_blocks {
                visitor.visit_expression(&mut elif.condition);
                visitor.visit_expression(&mut elif.block);
            }

            if let Some(else_block) = &mut e.else_block {
                visitor.visit_expression(else_block);
            }
        }
        Expression::Block(e) => {
            for stmt in &mut e.statements {
                visitor.visit_statement(stmt);
            }
        }
        Expression::Loop(e) => visitor.visit_expression(&mut e.body),
        Expression::While(e) => {
            visitor.visit_expression(&mut e.condition);
            visitor.visit_expression(&mut e.body);
        }
        Expression::For(e) => {
            visitor.visit_expression(&mut e.init);
            visitor.visit_expression(&mut e.last);
            visitor.visit_expression(&mut e.body);
        }
        Expression::Return(e) => {
            if let Some(value) = &mut e.value {
                visitor.visit_expression(value);
            }
        }
        Expression::Break(e) => {
            if let Some(value) = &mut e.value {
                visitor.visit_expression(value);
            }
        }
        Expression::StructInit(e) => {
            visitor.visit_type(&mut e.target);

            for field in &mut e.fields {
                visitor.visit_expression(&mut field.value);
            }
        }
        Expression::Load(e) => visitor.visit_expression(&mut e.operand),
        Expression::AddressOf(e) => visitor.visit_expression(&mut e.operand),
        Expression::SliceOf(e) => {
            visitor.visit_expression(&mut e.ptr);
            visitor.visit_expression(&mut e.len);
        }
        Expression::Range(e) => {
            visitor.visit_expression(&mut e.start);
            visitor.visit_expression(&mut e.end);
        }
        Expression::Sizeof(e) => visitor.visit_type(&mut e.ty),
    }
}

pub fn walk_type<V: Visitor + ?Sized>(visitor: &mut V, ty: &Type) {
    match ty {
        Type::Reference { referenced, .. } => visitor.visit_type(referenced),
        Type::Slice { element, .. } => visitor.visit_type(element),
        Type::Pointer { pointed, .. } => visitor.visit_type(pointed),
        Type::Array { element, .. } => visitor.visit_type(element),
        Type::UnqualifiedUserDefined { generic_args, .. }
        | Type::UserDefined { generic_args, .. } => {
            for arg in generic_args {
                visitor.visit_type(arg);
            }
        }
        Type::FnPointer { args, ret, .. } => {
            for arg in args {
                visitor.visit_type(arg);
            }

            visitor.visit_type(ret);
        }
        Type::Indirection { produced, .. } => visitor.visit_type(produced),
        _ => {}
    }
}

pub fn walk_type_mut<V: MutVisitor + ?Sized>(visitor: &mut V, ty: &mut Type) {
    match ty {
        Type::Reference { referenced, .. } => visitor.visit_type(referenced),
        Type::Slice { element, .. } => visitor.visit_type(element),
        Type::Pointer { pointed, .. } => visitor.visit_type(pointed),
        Type::Array { element, .. } => visitor.visit_type(element),
        Type::UnqualifiedUserDefined { generic_args, .. }
        | Type::UserDefined { generic_args, .. } => {
            for arg in generic_args {
                visitor.visit_type(arg);
            }
        }
        Type::FnPointer { args, ret, .. } => {
            for arg in args {
                visitor.visit_type(arg);
            }

            visitor.visit_type(ret);
        }
        Type::Indirection { produced, .. } => visitor.visit_type(produced),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Binary, BinaryOp, Block, ExpressionStatement, IntegerLiteral, SourceLoc, UnqualifiedId,
        UnqualifiedIdentifier,
    };

    #[derive(Default)]
    struct CountingVisitor {
        expressions: usize,
        unqualified: usize,
    }

    impl Visitor for CountingVisitor {
        fn visit_expression(&mut self, expr: &Expression) {
            self.expressions += 1;

            if matches!(expr, Expression::UnqualifiedIdentifier(_)) {
                self.unqualified += 1;
            }

            walk_expression(self, expr);
        }
    }

    #[test]
    fn test_walk_reaches_nested_expressions() {
        let tree: Expression = Block::new(
            SourceLoc::default(),
            vec![ExpressionStatement::new(
                SourceLoc::default(),
                Binary::new(
                    SourceLoc::default(),
                    BinaryOp::Add,
                    IntegerLiteral::new(SourceLoc::default(), 1).into(),
                    UnqualifiedIdentifier::new(SourceLoc::default(), UnqualifiedId::bare("x"))
                        .into(),
                )
                .into(),
            )
            .into()],
        )
        .into();

        let mut visitor = CountingVisitor::default();
        visitor.visit_expression(&tree);

        // block, binary, both operands
        assert_eq!(visitor.expressions, 4);
        assert_eq!(visitor.unqualified, 1);
    }
}
