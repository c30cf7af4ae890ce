//! The per-expression-kind typing rules.

use crate::ast::{
    ArrayLiteral, Binary, Break, Cast, DeclKind, Expression, FieldAccess, FloatWidth, For,
    FullyQualifiedId, Identifier, IfElse, IfThen, Index, IntegerWidth, OpFamily, SelfKind,
    SliceOf, SourceLoc, StaticCall, StaticGlobal, StaticMethodCall, StructInit, Type, Unary,
    UnaryOp,
};
use crate::backend::const_fold;
use crate::diagnostics::{point_out, Severity};
use crate::resolver::ScopeEntity;

use super::conversions::{coerce, default_integral, select_overload, OverloadChoice};
use super::{lvalue_info, result_of, LoopFrame, LoopKind, TypeChecker};

impl TypeChecker<'_> {
    pub(super) fn check_expression(&mut self, expr: &mut Expression) -> Type {
        // calls may rewrite the whole node, so they get the owning slot
        match expr {
            Expression::Call(_) => return self.check_call(expr),
            Expression::MethodCall(_) => return self.check_method_call(expr),
            _ => {}
        }

        let ty = match expr {
            Expression::StringLiteral(_) => Type::slice(false, Type::char_type()),
            Expression::IntegerLiteral(e) => Type::UnsizedInteger {
                loc: e.loc.clone(),
                value: e.value,
            },
            Expression::FloatLiteral(_) => Type::float(FloatWidth::Double),
            Expression::BoolLiteral(_) => Type::bool_type(),
            Expression::CharLiteral(_) => Type::unsigned(IntegerWidth::W8),
            Expression::NilLiteral(e) => Type::NilPointer { loc: e.loc.clone() },
            Expression::ArrayLiteral(e) => self.check_array_literal(e),
            Expression::UnqualifiedIdentifier(_) => Type::Error,
            Expression::LocalIdentifier(e) => match self.env.get(&e.name) {
                Some(ScopeEntity { ty, mutable, .. }) => {
                    Type::indirection(*mutable, ty.clone().into_rvalue())
                }
                None => {
                    self.error(18, e.loc.clone(), "used here");
                    Type::Error
                }
            },
            Expression::Identifier(e) => self.check_overload_reference(e),
            Expression::StaticGlobal(e) => self.check_static_global(e),
            Expression::StaticCall(e) => {
                for arg in &mut e.args {
                    self.check_expression(arg);
                }

                let resolver = self.resolver;

                resolver
                    .overloads(&e.id)
                    .and_then(|set| set.fns().iter().find(|ov| ov.decl() == e.decl))
                    .map(|ov| ov.proto().return_type.clone())
                    .unwrap_or(Type::Error)
            }
            Expression::StaticMethodCall(e) => {
                self.check_expression(&mut e.receiver);

                for arg in &mut e.args {
                    self.check_expression(arg);
                }

                // the method id's module string is the receiver type's full
                // name plus a trailing `::`
                let resolver = self.resolver;
                let receiver = e.id.module_string().trim_end_matches("::").to_string();

                resolver
                    .methods(&receiver, e.id.name())
                    .and_then(|set| set.fns().iter().find(|ov| ov.decl() == e.decl))
                    .map(|ov| ov.proto().return_type.clone())
                    .unwrap_or(Type::Error)
            }
            Expression::Index(e) => self.check_index(e),
            Expression::FieldAccess(e) => self.check_field_access(e),
            Expression::Group(e) => self.check_expression(&mut e.inner),
            Expression::Unary(e) => self.check_unary(e),
            Expression::Binary(e) => self.check_binary(e),
            Expression::Cast(e) => self.check_cast(e),
            Expression::ImplicitConversion(e) => {
                self.check_expression(&mut e.operand);
                e.target.clone()
            }
            Expression::IfThen(e) => self.check_if_then(e),
            Expression::IfElse(e) => self.check_if_else(e),
            Expression::Block(e) => {
                self.env.enter_scope();

                let mut last = Type::void();

                for stmt in &mut e.statements {
                    last = self.check_statement(stmt);
                }

                self.env.leave_scope();

                last
            }
            Expression::Loop(e) => {
                self.loops.push(LoopFrame {
                    kind: LoopKind::Loop,
                    break_value: None,
                });
                self.check_expression(&mut e.body);

                let frame = self.loops.pop().unwrap_or_else(|| unreachable!());

                frame.break_value.unwrap_or_else(Type::void)
            }
            Expression::While(e) => {
                self.require_bool(&mut e.condition);

                self.loops.push(LoopFrame {
                    kind: LoopKind::While,
                    break_value: None,
                });
                self.check_expression(&mut e.body);
                self.loops.pop();

                Type::void()
            }
            Expression::For(e) => self.check_for(e),
            Expression::Return(e) => {
                let expected = self.expected_return.clone();

                match expected {
                    None => {
                        self.error(26, e.loc.clone(), "return is here");
                        Type::Error
                    }
                    Some(expected) => {
                        match &mut e.value {
                            Some(value) => {
                                self.check_expression(value);

                                if coerce(value, &expected, self.reporter).is_err() {
                                    let actual = result_of(value);

                                    self.error(
                                        20,
                                        value.loc(),
                                        format!("expected `{expected}`, found `{actual}`"),
                                    );
                                }
                            }
                            None => {
                                if expected != Type::void() {
                                    self.error(
                                        20,
                                        e.loc.clone(),
                                        format!("expected a `{expected}` value"),
                                    );
                                }
                            }
                        }

                        Type::void()
                    }
                }
            }
            Expression::Break(e) => self.check_break(e),
            Expression::Continue(e) => {
                if self.loops.is_empty() {
                    self.error(27, e.loc.clone(), "continue is here");
                    Type::Error
                } else {
                    Type::void()
                }
            }
            Expression::StructInit(e) => self.check_struct_init(e),
            Expression::Load(e) => {
                let ty = self.check_expression(&mut e.operand);
                ty.into_rvalue()
            }
            Expression::AddressOf(e) => {
                let ty = self.check_expression(&mut e.operand);

                match lvalue_info(&ty) {
                    Some((mutable, produced)) => Type::pointer(mutable, produced),
                    None if ty.is_error() => Type::Error,
                    None => {
                        self.error(43, e.operand.loc(), "cannot take the address of this");
                        Type::Error
                    }
                }
            }
            Expression::SliceOf(e) => self.check_slice_of(e),
            Expression::Range(e) => {
                let start = self.check_expression(&mut e.start).into_rvalue();
                let end = self.check_expression(&mut e.end).into_rvalue();

                if !start.is_error() && !start.is_integral() {
                    self.error(41, e.start.loc(), format!("this has type `{start}`"));
                }

                if !end.is_error() && !end.is_integral() {
                    self.error(41, e.end.loc(), format!("this has type `{end}`"));
                }

                Type::void()
            }
            Expression::Sizeof(_) => Type::unsigned(IntegerWidth::Native),
            Expression::Error => Type::Error,
            Expression::Call(_) | Expression::MethodCall(_) => unreachable!(),
        };

        expr.result_update(ty.clone());

        ty
    }

    fn error(&mut self, code: i64, loc: SourceLoc, message: impl Into<String>) {
        self.reporter
            .report_emplace(code, vec![point_out(loc, Severity::Error, message)]);
    }

    fn require_bool(&mut self, slot: &mut Expression) {
        let ty = self.check_expression(slot).into_rvalue();

        if !matches!(ty, Type::Bool { .. }) && !ty.is_error() {
            self.error(15, slot.loc(), format!("condition has type `{ty}`"));
        }
    }

    /// A reference to an overload set outside a call: fine when the set
    /// has exactly one member (it becomes a function-pointer value),
    /// ambiguous otherwise.
    fn check_overload_reference(&mut self, e: &Identifier) -> Type {
        let resolver = self.resolver;

        match resolver.overloads(&e.id) {
            None => {
                self.error(18, e.loc.clone(), "used here");
                Type::Error
            }
            Some(set) if set.fns().len() == 1 => set.fns()[0].proto().fn_pointer_type(),
            Some(_) => {
                self.error(19, e.loc.clone(), "referenced here");
                Type::Error
            }
        }
    }

    fn check_static_global(&mut self, e: &StaticGlobal) -> Type {
        let resolver = self.resolver;

        match resolver.entity(&e.id) {
            None => {
                self.error(18, e.loc.clone(), "used here");
                Type::Error
            }
            Some(entity) => match entity.kind() {
                DeclKind::Constant => {
                    let ty = entity.ty().cloned().unwrap_or(Type::Error);
                    Type::indirection(false, ty.into_rvalue())
                }
                DeclKind::Class => {
                    self.error(58, e.loc.clone(), "class used here");
                    Type::Error
                }
                _ => {
                    self.error(22, e.loc.clone(), "referenced here");
                    Type::Error
                }
            },
        }
    }

    fn check_array_literal(&mut self, e: &mut ArrayLiteral) -> Type {
        let len = e.elements.len() as u64;

        if e.elements.is_empty() {
            return Type::array(Type::Error, 0);
        }

        let mut tys = vec![];

        for element in &mut e.elements {
            tys.push(self.check_expression(element).into_rvalue());
        }

        if tys.iter().any(Type::is_error) {
            return Type::array(Type::Error, len);
        }

        let concrete = tys
            .iter()
            .find(|ty| !matches!(ty, Type::UnsizedInteger { .. }))
            .cloned();

        let element_ty = match concrete {
            Some(target) => {
                for element in e.elements.iter_mut() {
                    if result_of(element).into_rvalue() == target {
                        continue;
                    }

                    if coerce(element, &target, self.reporter).is_err() {
                        let actual = result_of(element);

                        self.error(
                            34,
                            element.loc(),
                            format!("this element has type `{actual}`, expected `{target}`"),
                        );
                    }
                }

                target
            }
            None => {
                // every element is an integer literal: the array gets the
                // default type of the largest one
                let max = tys
                    .iter()
                    .map(|ty| match ty {
                        Type::UnsizedInteger { value, .. } => *value,
                        _ => 0,
                    })
                    .max()
                    .unwrap_or(0);
                let target = default_integral(max);

                for element in e.elements.iter_mut() {
                    let _ = coerce(element, &target, self.reporter);
                }

                target
            }
        };

        Type::array(element_ty, len)
    }

    fn check_call(&mut self, expr: &mut Expression) -> Type {
        let Expression::Call(call) = expr else {
            unreachable!()
        };

        let pending_overload = matches!(call.callee.as_ref(), Expression::Identifier(_));
        let callee_ty = if pending_overload {
            None
        } else {
            Some(self.check_expression(&mut call.callee))
        };

        let mut arg_types = vec![];

        for arg in &mut call.args {
            arg_types.push(self.check_expression(arg).into_rvalue());
        }

        if let Expression::Identifier(identifier) = call.callee.as_ref() {
            let id = identifier.id.clone();
            let resolver = self.resolver;

            let Some(set) = resolver.overloads(&id) else {
                self.error(29, call.loc.clone(), "called here");
                expr.result_update(Type::Error);
                return Type::Error;
            };

            return match select_overload(set, &arg_types) {
                OverloadChoice::Selected(overload) => {
                    let decl = overload.decl();
                    let params: Vec<Type> = overload
                        .proto()
                        .args
                        .iter()
                        .map(|arg| arg.ty.clone())
                        .collect();
                    let ret = overload.proto().return_type.clone();

                    for (arg, param) in call.args.iter_mut().zip(&params) {
                        let _ = coerce(arg, param, self.reporter);
                    }

                    let args = std::mem::take(&mut call.args);
                    let generic_args = std::mem::take(&mut call.generic_args);
                    let loc = call.loc.clone();

                    let mut replacement = StaticCall::new(loc, id, decl, args);
                    replacement.generic_args = generic_args;
                    replacement.result = Some(ret.clone());

                    *expr = replacement.into();

                    ret
                }
                OverloadChoice::Ambiguous => {
                    self.error(28, call.loc.clone(), "this call is ambiguous");
                    expr.result_update(Type::Error);
                    Type::Error
                }
                OverloadChoice::NoMatch => {
                    if !arg_types.iter().any(Type::is_error) {
                        self.error(51, call.loc.clone(), "no overload matches these arguments");
                    }

                    expr.result_update(Type::Error);
                    Type::Error
                }
            };
        }

        // not an overload set: the callee must evaluate to a fn pointer
        let callee_ty = callee_ty.unwrap_or(Type::Error).into_rvalue();

        let ty = match callee_ty {
            Type::Error => Type::Error,
            Type::FnPointer { args: params, ret, .. } => {
                if call.args.len() > params.len() {
                    self.error(
                        24,
                        call.loc.clone(),
                        format!("expected {} arguments, found {}", params.len(), call.args.len()),
                    );
                } else if call.args.len() < params.len() {
                    self.error(
                        25,
                        call.loc.clone(),
                        format!("expected {} arguments, found {}", params.len(), call.args.len()),
                    );
                }

                for (arg, param) in call.args.iter_mut().zip(&params) {
                    if coerce(arg, param, self.reporter).is_err() {
                        let actual = result_of(arg);

                        self.error(
                            23,
                            arg.loc(),
                            format!("expected `{param}`, found `{actual}`"),
                        );
                    }
                }

                *ret
            }
            other => {
                if matches!(call.callee.as_ref(), Expression::StaticGlobal(_)) {
                    self.error(29, call.loc.clone(), "called here");
                } else {
                    self.error(
                        30,
                        call.loc.clone(),
                        format!("this expression has type `{other}`"),
                    );
                }

                Type::Error
            }
        };

        expr.result_update(ty.clone());

        ty
    }

    fn check_method_call(&mut self, expr: &mut Expression) -> Type {
        let Expression::MethodCall(call) = expr else {
            unreachable!()
        };

        let receiver_ty = self.check_expression(&mut call.receiver);

        let mut arg_types = vec![];

        for arg in &mut call.args {
            arg_types.push(self.check_expression(arg).into_rvalue());
        }

        let (receiver_mut, underlying) = receiver_place(&receiver_ty);

        let ty = match underlying {
            Type::Error => Type::Error,
            Type::UserDefined { id, .. } => {
                let resolver = self.resolver;

                match resolver.methods(id.as_string(), &call.name) {
                    None => {
                        self.error(
                            35,
                            call.loc.clone(),
                            format!("no method `{}` on `{id}`", call.name),
                        );

                        Type::Error
                    }
                    Some(set) => match select_overload(set, &arg_types) {
                        OverloadChoice::Selected(overload) => {
                            let decl = overload.decl();
                            let needs_mut = matches!(
                                overload.proto().self_kind,
                                Some(SelfKind::MutRef) | Some(SelfKind::MutValue)
                            );
                            let params: Vec<Type> = overload
                                .proto()
                                .args
                                .iter()
                                .map(|arg| arg.ty.clone())
                                .collect();
                            let ret = overload.proto().return_type.clone();

                            if needs_mut && !receiver_mut {
                                self.error(
                                    44,
                                    call.receiver.loc(),
                                    "this method needs a `mut` receiver",
                                );
                            }

                            for (arg, param) in call.args.iter_mut().zip(&params) {
                                let _ = coerce(arg, param, self.reporter);
                            }

                            let receiver = call.receiver.take();
                            let args = std::mem::take(&mut call.args);
                            let name = call.name.clone();
                            let loc = call.loc.clone();
                            let method_id =
                                FullyQualifiedId::new(format!("{}::", id.as_string()), &name);

                            let mut replacement = StaticMethodCall::new(
                                loc, receiver, method_id, decl, name, args,
                            );
                            replacement.result = Some(ret.clone());

                            *expr = replacement.into();

                            return ret;
                        }
                        OverloadChoice::Ambiguous => {
                            self.error(28, call.loc.clone(), "this call is ambiguous");
                            Type::Error
                        }
                        OverloadChoice::NoMatch => {
                            if !arg_types.iter().any(Type::is_error) {
                                self.error(
                                    51,
                                    call.loc.clone(),
                                    "no overload matches these arguments",
                                );
                            }

                            Type::Error
                        }
                    },
                }
            }
            other => {
                self.error(
                    35,
                    call.receiver.loc(),
                    format!("type `{other}` has no methods"),
                );

                Type::Error
            }
        };

        expr.result_update(ty.clone());

        ty
    }

    fn check_index(&mut self, e: &mut Index) -> Type {
        let callee_ty = self.check_expression(&mut e.callee);

        for index in &mut e.indices {
            self.check_expression(index);
        }

        if e.indices.len() != 1 {
            self.error(
                47,
                e.loc.clone(),
                format!("found {} index arguments", e.indices.len()),
            );
        }

        if let Some(index) = e.indices.first_mut() {
            let index_ty = result_of(index).into_rvalue();

            match index_ty {
                Type::Integral {
                    signed: true,
                    width: IntegerWidth::Native,
                    ..
                }
                | Type::Error => {}
                Type::UnsizedInteger { .. } => {
                    let _ = coerce(index, &Type::signed(IntegerWidth::Native), self.reporter);
                }
                other => {
                    self.error(48, index.loc(), format!("index has type `{other}`"));
                }
            }
        }

        match callee_ty.clone().into_rvalue() {
            Type::Slice {
                mutable, element, ..
            } => Type::indirection(mutable, *element),
            Type::Array { element, .. } => match lvalue_info(&callee_ty) {
                Some((mutable, _)) => Type::indirection(mutable, *element),
                None => *element,
            },
            Type::Error => Type::Error,
            other => {
                self.error(
                    46,
                    e.callee.loc(),
                    format!("this expression has type `{other}`"),
                );

                Type::Error
            }
        }
    }

    fn check_field_access(&mut self, e: &mut FieldAccess) -> Type {
        let object_ty = self.check_expression(&mut e.object);

        // the lvalue marker is transparent, and one level of pointer or
        // reference auto-dereferences
        let (mut mutable, mut is_place, stripped) = match lvalue_info(&object_ty) {
            Some((mutable, produced)) => (mutable, true, produced),
            None => (false, false, object_ty.clone()),
        };

        let underlying = match stripped {
            Type::Reference {
                mutable: m,
                referenced,
                ..
            } => {
                mutable = m;
                is_place = true;
                *referenced
            }
            Type::Pointer {
                mutable: m,
                pointed,
                ..
            } => {
                mutable = m;
                is_place = true;
                *pointed
            }
            other => other,
        };

        match underlying {
            Type::Error => Type::Error,
            Type::UserDefined { id, .. } => {
                let resolver = self.resolver;

                let Some(entity) = resolver.entity(&id) else {
                    self.error(35, e.loc.clone(), format!("on type `{id}`"));
                    return Type::Error;
                };

                if entity.kind() == DeclKind::Class {
                    self.error(58, e.loc.clone(), "class used here");
                    return Type::Error;
                }

                match entity.field(&e.field) {
                    Some(field_ty) => {
                        let field_ty = field_ty.clone();

                        if is_place {
                            Type::indirection(mutable, field_ty)
                        } else {
                            field_ty
                        }
                    }
                    None => {
                        self.error(
                            35,
                            e.loc.clone(),
                            format!("no field `{}` on `{id}`", e.field),
                        );

                        Type::Error
                    }
                }
            }
            other => {
                self.error(
                    35,
                    e.object.loc(),
                    format!("type `{other}` has no fields"),
                );

                Type::Error
            }
        }
    }

    fn check_unary(&mut self, e: &mut Unary) -> Type {
        let operand_ty = self.check_expression(&mut e.operand);
        let value_ty = operand_ty.clone().into_rvalue();

        if value_ty.is_error() {
            return Type::Error;
        }

        match e.op {
            UnaryOp::LogicalNot => {
                if !matches!(value_ty, Type::Bool { .. }) {
                    self.error(38, e.operand.loc(), format!("this has type `{value_ty}`"));
                    return Type::Error;
                }

                Type::bool_type()
            }
            UnaryOp::BitwiseNot => {
                if !value_ty.is_integral() {
                    self.error(41, e.operand.loc(), format!("this has type `{value_ty}`"));
                    return Type::Error;
                }

                value_ty
            }
            UnaryOp::Negate => {
                if !value_ty.is_arithmetic() {
                    self.error(39, e.operand.loc(), format!("this has type `{value_ty}`"));
                    return Type::Error;
                }

                if matches!(value_ty, Type::Integral { signed: false, .. }) {
                    self.error(53, e.operand.loc(), format!("this has type `{value_ty}`"));
                    return Type::Error;
                }

                value_ty
            }
            UnaryOp::RefTo => match lvalue_info(&operand_ty) {
                Some((_, produced)) => Type::reference(false, produced),
                None => {
                    self.error(43, e.operand.loc(), "cannot reference this");
                    Type::Error
                }
            },
            UnaryOp::MutRefTo => match lvalue_info(&operand_ty) {
                Some((true, produced)) => Type::reference(true, produced),
                Some((false, _)) => {
                    self.error(44, e.operand.loc(), "this is not `mut`");
                    Type::Error
                }
                None => {
                    self.error(43, e.operand.loc(), "cannot reference this");
                    Type::Error
                }
            },
            UnaryOp::Dereference => match value_ty {
                Type::Pointer {
                    mutable, pointed, ..
                } => Type::indirection(mutable, *pointed),
                Type::Reference {
                    mutable,
                    referenced,
                    ..
                } => Type::indirection(mutable, *referenced),
                other => {
                    self.error(45, e.operand.loc(), format!("this has type `{other}`"));
                    Type::Error
                }
            },
        }
    }

    fn check_binary(&mut self, e: &mut Binary) -> Type {
        let lhs_ty = self.check_expression(&mut e.lhs);
        let rhs_ty = self.check_expression(&mut e.rhs);

        match e.op.family() {
            OpFamily::Assignment => self.check_assignment(e, &lhs_ty),
            OpFamily::Logical => {
                for (slot, ty) in [(&e.lhs, &lhs_ty), (&e.rhs, &rhs_ty)] {
                    let ty = ty.as_rvalue();

                    if !matches!(ty, Type::Bool { .. }) && !ty.is_error() {
                        self.error(38, slot.loc(), format!("this has type `{ty}`"));
                    }
                }

                Type::bool_type()
            }
            family => {
                let lhs_value = lhs_ty.into_rvalue();
                let rhs_value = rhs_ty.into_rvalue();
                let yields_bool =
                    matches!(family, OpFamily::Ordering | OpFamily::Equality);

                if lhs_value.is_error() || rhs_value.is_error() {
                    return if yields_bool { Type::bool_type() } else { Type::Error };
                }

                // operand-kind requirements per family
                let kind_ok = |ty: &Type| match family {
                    OpFamily::Arithmetic | OpFamily::Ordering => ty.is_arithmetic(),
                    OpFamily::Bitwise => ty.is_integral(),
                    _ => true,
                };
                let kind_code = if family == OpFamily::Bitwise { 41 } else { 39 };

                let mut ok = true;

                for (slot, ty) in [(&e.lhs, &lhs_value), (&e.rhs, &rhs_value)] {
                    if !kind_ok(ty) {
                        self.error(kind_code, slot.loc(), format!("this has type `{ty}`"));
                        ok = false;
                    }
                }

                if !ok {
                    return if yields_bool { Type::bool_type() } else { Type::Error };
                }

                let unified = self.unify_operands(e, &lhs_value, &rhs_value);

                match unified {
                    Some(ty) if yields_bool => {
                        let _ = ty;
                        Type::bool_type()
                    }
                    Some(ty) => ty,
                    None if yields_bool => Type::bool_type(),
                    None => Type::Error,
                }
            }
        }
    }

    /// Makes both operands of a binary expression the same type, letting
    /// an integer literal adopt the other side's integral type.
    fn unify_operands(&mut self, e: &mut Binary, lhs: &Type, rhs: &Type) -> Option<Type> {
        if lhs == rhs {
            // two literals fold so the combined value still range-checks
            if let (
                Type::UnsizedInteger { value: a, .. },
                Type::UnsizedInteger { value: b, .. },
            ) = (lhs, rhs)
            {
                let folded = const_fold::fold_binary(e.op, *a, *b).unwrap_or(*a);

                return Some(Type::UnsizedInteger {
                    loc: e.loc.clone(),
                    value: folded,
                });
            }

            return Some(lhs.clone());
        }

        if matches!(lhs, Type::UnsizedInteger { .. }) && rhs.is_integral() {
            let _ = coerce(&mut e.lhs, rhs, self.reporter);
            return Some(rhs.clone());
        }

        if matches!(rhs, Type::UnsizedInteger { .. }) && lhs.is_integral() {
            let _ = coerce(&mut e.rhs, lhs, self.reporter);
            return Some(lhs.clone());
        }

        self.error(
            40,
            e.loc.clone(),
            format!("left is `{lhs}`, right is `{rhs}`"),
        );

        None
    }

    fn check_assignment(&mut self, e: &mut Binary, lhs_ty: &Type) -> Type {
        let Some((mutable, target)) = lvalue_info(lhs_ty) else {
            if !lhs_ty.is_error() {
                self.error(42, e.lhs.loc(), "cannot assign to this");
            }

            return Type::void();
        };

        if !mutable {
            self.error(49, e.lhs.loc(), "this is not `mut`");
        }

        if let Some(op) = e.op.compound_op() {
            let ok = match op.family() {
                OpFamily::Arithmetic => target.is_arithmetic(),
                OpFamily::Bitwise => target.is_integral(),
                _ => true,
            };

            if !ok && !target.is_error() {
                let code = if op.family() == OpFamily::Bitwise { 41 } else { 39 };
                self.error(code, e.lhs.loc(), format!("this has type `{target}`"));
            }
        }

        if coerce(&mut e.rhs, &target, self.reporter).is_err() {
            let actual = result_of(&e.rhs);

            self.error(
                50,
                e.rhs.loc(),
                format!("cannot assign `{actual}` to `{target}`"),
            );
        }

        Type::void()
    }

    fn check_cast(&mut self, e: &mut Cast) -> Type {
        let operand_ty = self.check_expression(&mut e.operand).into_rvalue();
        let target = e.target.clone();

        if e.unsafe_cast || operand_ty.is_error() || target.is_error() {
            return target;
        }

        if !super::conversions::safe_cast_allowed(&operand_ty, &target) {
            self.error(
                17,
                e.loc.clone(),
                format!("cannot safely cast `{operand_ty}` to `{target}`"),
            );

            return Type::Error;
        }

        // a literal cast to an integral type must still fit it
        if let (
            Type::UnsizedInteger { value, .. },
            Type::Integral { signed, width, .. },
        ) = (&operand_ty, target.as_rvalue())
        {
            if !Type::fits_integral(*value, *signed, *width) {
                self.error(
                    32,
                    e.operand.loc(),
                    format!("literal does not fit in `{target}`"),
                );
            }
        }

        target
    }

    fn check_if_then(&mut self, e: &mut IfThen) -> Type {
        self.require_bool(&mut e.condition);

        self.check_expression(&mut e.true_branch);
        self.check_expression(&mut e.false_branch);

        let loc = e.loc.clone();
        self.unify_branches(vec![e.true_branch.as_mut(), e.false_branch.as_mut()], &loc)
    }

    fn check_if_else(&mut self, e: &mut IfElse) -> Type {
        self.require_bool(&mut e.condition);
        self.check_expression(&mut e.block);

        for elif in &mut e.elif_blocks {
            self.require_bool(&mut elif.condition);
            self.check_expression(&mut elif.block);
        }

        if let Some(else_block) = &mut e.else_block {
            self.check_expression(else_block);
        }

        // a chain without an `else` produces void and is not evaluable
        if !e.is_evaluable() {
            return Type::void();
        }

        let loc = e.loc.clone();
        let mut branches: Vec<&mut Expression> = vec![e.block.as_mut()];

        for elif in &mut e.elif_blocks {
            branches.push(elif.block.as_mut());
        }

        if let Some(else_block) = &mut e.else_block {
            branches.push(else_block.as_mut());
        }

        self.unify_branches(branches, &loc)
    }

    /// Unifies already-checked branch expressions to one type, coercing
    /// literal branches toward the first concrete one.
    fn unify_branches(&mut self, mut branches: Vec<&mut Expression>, loc: &SourceLoc) -> Type {
        let tys: Vec<Type> = branches
            .iter()
            .map(|slot| result_of(slot).into_rvalue())
            .collect();

        if tys.iter().any(Type::is_error) {
            return Type::Error;
        }

        let concrete = tys
            .iter()
            .find(|ty| !matches!(ty, Type::UnsizedInteger { .. }))
            .cloned();

        match concrete {
            Some(target) => {
                for slot in branches.iter_mut() {
                    if result_of(slot).into_rvalue() == target {
                        continue;
                    }

                    if coerce(slot, &target, self.reporter).is_err() {
                        let actual = result_of(slot);

                        self.error(
                            16,
                            slot.loc(),
                            format!("this branch has type `{actual}`, expected `{target}`"),
                        );
                    }
                }

                target
            }
            None => {
                // all branches are integer literals; keep the placeholder
                // with the largest value so later fitting stays honest
                let max = tys
                    .iter()
                    .map(|ty| match ty {
                        Type::UnsizedInteger { value, .. } => *value,
                        _ => 0,
                    })
                    .max()
                    .unwrap_or(0);

                Type::UnsizedInteger {
                    loc: loc.clone(),
                    value: max,
                }
            }
        }
    }

    fn check_for(&mut self, e: &mut For) -> Type {
        let init_ty = self.check_expression(&mut e.init).into_rvalue();
        let last_ty = self.check_expression(&mut e.last).into_rvalue();

        let loop_ty = if init_ty.is_error() || last_ty.is_error() {
            Type::Error
        } else if !init_ty.is_integral() || !last_ty.is_integral() {
            for (slot, ty) in [(&e.init, &init_ty), (&e.last, &last_ty)] {
                if !ty.is_integral() {
                    self.error(54, slot.loc(), format!("this has type `{ty}`"));
                }
            }

            Type::Error
        } else {
            match (&init_ty, &last_ty) {
                (
                    Type::UnsizedInteger { value: a, .. },
                    Type::UnsizedInteger { value: b, .. },
                ) => {
                    let target = default_integral((*a).max(*b));
                    let _ = coerce(&mut e.init, &target, self.reporter);
                    let _ = coerce(&mut e.last, &target, self.reporter);
                    target
                }
                (Type::UnsizedInteger { .. }, _) => {
                    let _ = coerce(&mut e.init, &last_ty, self.reporter);
                    last_ty.clone()
                }
                (_, Type::UnsizedInteger { .. }) => {
                    let _ = coerce(&mut e.last, &init_ty, self.reporter);
                    init_ty.clone()
                }
                _ if init_ty == last_ty => init_ty.clone(),
                _ => {
                    self.error(
                        55,
                        e.last.loc(),
                        format!("initial value is `{init_ty}`, last value is `{last_ty}`"),
                    );

                    Type::Error
                }
            }
        };

        self.env.enter_scope();
        self.env.insert(
            &e.loop_variable.clone(),
            ScopeEntity::new(e.loc.clone(), loop_ty, false),
        );

        self.loops.push(LoopFrame {
            kind: LoopKind::For,
            break_value: None,
        });
        self.check_expression(&mut e.body);
        self.loops.pop();

        self.env.leave_scope();

        Type::void()
    }

    fn check_break(&mut self, e: &mut Break) -> Type {
        if let Some(value) = &mut e.value {
            self.check_expression(value);
        }

        if self.loops.is_empty() {
            self.error(27, e.loc.clone(), "break is here");
            return Type::Error;
        }

        if let Some(value) = &mut e.value {
            let kind = self.loops.last().map(|frame| frame.kind);

            if kind != Some(LoopKind::Loop) {
                self.error(36, e.loc.clone(), "break with a value is here");
            } else {
                let value_ty = result_of(value).into_rvalue();
                let previous = self
                    .loops
                    .last()
                    .and_then(|frame| frame.break_value.clone());

                match previous {
                    None => {
                        if let Some(frame) = self.loops.last_mut() {
                            frame.break_value = Some(value_ty);
                        }
                    }
                    Some(previous) => {
                        if value_ty != previous
                            && coerce(value, &previous, self.reporter).is_err()
                        {
                            self.error(
                                37,
                                value.loc(),
                                format!(
                                    "this break has type `{value_ty}`, an earlier one had \
                                     `{previous}`"
                                ),
                            );
                        }
                    }
                }
            }
        }

        Type::void()
    }

    fn check_struct_init(&mut self, e: &mut StructInit) -> Type {
        for field in &mut e.fields {
            self.check_expression(&mut field.value);
        }

        let target = e.target.clone();

        match &target {
            Type::Error => Type::Error,
            Type::UserDefined { id, .. } => {
                let resolver = self.resolver;

                let Some(entity) = resolver.entity(id) else {
                    self.error(10, e.loc.clone(), format!("`{id}` is not a struct"));
                    return Type::Error;
                };

                if entity.kind() == DeclKind::Class {
                    self.error(58, e.loc.clone(), "class used here");
                    return Type::Error;
                }

                if entity.kind() != DeclKind::Struct {
                    self.error(10, e.loc.clone(), format!("`{id}` is not a struct"));
                    return Type::Error;
                }

                let expected: Vec<(String, Type)> = entity.fields().to_vec();

                for field in &mut e.fields {
                    match expected.iter().find(|(name, _)| *name == field.name) {
                        Some((name, field_ty)) => {
                            if coerce(&mut field.value, field_ty, self.reporter).is_err() {
                                let actual = result_of(&field.value);

                                self.error(
                                    13,
                                    field.value.loc(),
                                    format!(
                                        "field `{name}` has type `{field_ty}`, found `{actual}`"
                                    ),
                                );
                            }
                        }
                        None => {
                            self.error(
                                35,
                                field.loc.clone(),
                                format!("no field `{}` on `{id}`", field.name),
                            );
                        }
                    }
                }

                for (name, _) in &expected {
                    if !e.fields.iter().any(|field| field.name == *name) {
                        self.error(
                            12,
                            e.loc.clone(),
                            format!("missing initializer for field `{name}`"),
                        );
                    }
                }

                target
            }
            _ => {
                self.error(
                    10,
                    e.loc.clone(),
                    format!("`{target}` is not a user-defined type"),
                );

                Type::Error
            }
        }
    }

    fn check_slice_of(&mut self, e: &mut SliceOf) -> Type {
        let ptr_ty = self.check_expression(&mut e.ptr).into_rvalue();
        let len_ty = self.check_expression(&mut e.len).into_rvalue();

        match len_ty {
            ty if ty.is_error() => {}
            Type::UnsizedInteger { .. } => {
                let _ = coerce(&mut e.len, &Type::unsigned(IntegerWidth::Native), self.reporter);
            }
            ty if ty.is_integral() => {}
            other => {
                self.error(57, e.len.loc(), format!("length has type `{other}`"));
            }
        }

        match ptr_ty {
            Type::Pointer {
                mutable, pointed, ..
            } => Type::slice(mutable, *pointed),
            Type::Error => Type::Error,
            other => {
                self.error(56, e.ptr.loc(), format!("this has type `{other}`"));
                Type::Error
            }
        }
    }
}

/// The place-ness and underlying type of a method receiver: strips the
/// lvalue marker, then one level of pointer or reference.
fn receiver_place(ty: &Type) -> (bool, Type) {
    let (mutable, stripped) = match lvalue_info(ty) {
        Some((mutable, produced)) => (mutable, produced),
        None => (false, ty.clone()),
    };

    match stripped {
        Type::Reference {
            mutable, referenced, ..
        } => (mutable, *referenced),
        Type::Pointer {
            mutable, pointed, ..
        } => (mutable, *pointed),
        other => (mutable, other),
    }
}
