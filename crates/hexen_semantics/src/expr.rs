//! The Expression Analyzer (§4.5) — the nerve center every other analyzer
//! calls into with a target type.
//!
//! `analyze_expr` is a thin wrapper around [`dispatch`]: it decorates the
//! node with its resolved type and, for every kind except a type-annotated
//! expression (which reconciles against `target` itself), applies the
//! precision-loss/commit step generically. This is what gives the "no node
//! carries a comptime type where a concrete target was in play" invariant
//! without every dispatch arm re-deriving it.

use hexen_base::Span;

use crate::array;
use crate::ast::{Expr, ExprKind};
use crate::block;
use crate::context::AnalysisCtx;
use crate::control;
use crate::decl;
use crate::diagnostics::DiagnosticKind;
use crate::operators;
use crate::symbols::InitState;
use crate::types::{commit, ComptimeValue, Type};

pub fn analyze_expr(ctx: &mut AnalysisCtx, e: &mut Expr, target: Option<&Type>) -> Type {
    let is_annotated = matches!(e.kind, ExprKind::TypeAnnotated(..));
    let found = dispatch(ctx, e, target);
    let final_ty = if is_annotated { found } else { commit_to_target(ctx, found, target, e.span) };
    e.resolved_type = Some(final_ty.clone());
    final_ty
}

fn commit_to_target(ctx: &mut AnalysisCtx, found: Type, target: Option<&Type>, span: Span) -> Type {
    let Some(t) = target else { return found };
    if matches!(found, Type::Unknown) {
        return Type::Unknown;
    }
    if found == *t {
        return found;
    }
    if Type::can_coerce(&found, t) {
        return t.clone();
    }
    decl::require_coercible(ctx, &found, t, span);
    Type::Unknown
}

fn analyze_int_literal(ctx: &mut AnalysisCtx, n: i64, target: Option<&Type>, span: Span) -> Type {
    match target {
        Some(t) if matches!(t, Type::Unknown) => Type::ComptimeInt,
        Some(t) if t.is_numeric() => match commit(&Type::ComptimeInt, t, Some(ComptimeValue::Int(n as i128))) {
            Ok(ty) => ty,
            Err(overflow) => ctx.error(DiagnosticKind::LiteralOverflow { value: overflow.value, destination: overflow.destination }, span),
        },
        None => Type::ComptimeInt,
        Some(t) => ctx.error(DiagnosticKind::TypeMismatch { expected: t.clone(), found: Type::ComptimeInt }, span),
    }
}

fn analyze_float_literal(ctx: &mut AnalysisCtx, x: f64, target: Option<&Type>, span: Span) -> Type {
    match target {
        Some(t) if matches!(t, Type::Unknown) => Type::ComptimeFloat,
        Some(t @ (Type::F32 | Type::F64)) => match commit(&Type::ComptimeFloat, t, Some(ComptimeValue::Float(x))) {
            Ok(ty) => ty,
            Err(overflow) => ctx.error(DiagnosticKind::LiteralOverflow { value: overflow.value, destination: overflow.destination }, span),
        },
        None => Type::ComptimeFloat,
        Some(t) => ctx.error(DiagnosticKind::TypeMismatch { expected: t.clone(), found: Type::ComptimeFloat }, span),
    }
}

fn analyze_bool_literal(ctx: &mut AnalysisCtx, target: Option<&Type>, span: Span) -> Type {
    match target {
        Some(t) if !matches!(t, Type::Bool | Type::Unknown) => {
            ctx.error(DiagnosticKind::TypeMismatch { expected: t.clone(), found: Type::Bool }, span)
        }
        _ => Type::Bool,
    }
}

fn analyze_string_literal(ctx: &mut AnalysisCtx, target: Option<&Type>, span: Span) -> Type {
    match target {
        Some(t) if !matches!(t, Type::String | Type::Unknown) => {
            ctx.error(DiagnosticKind::TypeMismatch { expected: t.clone(), found: Type::String }, span)
        }
        _ => Type::String,
    }
}

fn analyze_identifier(ctx: &mut AnalysisCtx, name: &str, span: Span) -> Type {
    match ctx.symbols.lookup(name) {
        Ok(symbol) => {
            let ty = symbol.declared_type.clone();
            if symbol.init_state == InitState::Deferred {
                ctx.diagnostics.push(DiagnosticKind::UseOfUninitialized { name: name.to_string() }, span);
            }
            ty
        }
        Err(_) => ctx.error(DiagnosticKind::Undefined { name: name.to_string() }, span),
    }
}

fn analyze_call(ctx: &mut AnalysisCtx, callee: &str, args: &mut [Expr], span: Span) -> Type {
    let Some(sig) = ctx.functions.get(callee).cloned() else {
        for arg in args.iter_mut() {
            analyze_expr(ctx, arg, None);
        }
        return ctx.error(DiagnosticKind::Undefined { name: callee.to_string() }, span);
    };

    if args.len() != sig.params.len() {
        ctx.diagnostics.push(
            DiagnosticKind::TypeMismatch {
                expected: Type::Function(sig.params.clone(), Box::new(sig.return_type.clone())),
                found: Type::Unknown,
            },
            span,
        );
    }

    for (i, arg) in args.iter_mut().enumerate() {
        match sig.params.get(i) {
            Some(param_ty) => {
                let found = analyze_expr(ctx, arg, Some(param_ty));
                decl::require_coercible(ctx, &found, param_ty, arg.span);
                if param_ty.is_array() && !param_ty.is_comptime() {
                    array::require_explicit_copy(ctx, arg, param_ty);
                }
            }
            None => {
                analyze_expr(ctx, arg, None);
            }
        }
    }

    sig.return_type
}

fn dispatch(ctx: &mut AnalysisCtx, e: &mut Expr, target: Option<&Type>) -> Type {
    let span = e.span;
    match &mut e.kind {
        ExprKind::IntLiteral(n) => analyze_int_literal(ctx, *n, target, span),
        ExprKind::FloatLiteral(x) => analyze_float_literal(ctx, *x, target, span),
        ExprKind::BoolLiteral(_) => analyze_bool_literal(ctx, target, span),
        ExprKind::StringLiteral(_) => analyze_string_literal(ctx, target, span),
        ExprKind::Identifier(name) => {
            let name = name.clone();
            analyze_identifier(ctx, &name, span)
        }
        ExprKind::Paren(inner) => analyze_expr(ctx, inner, target),
        ExprKind::TypeAnnotated(inner, ann_ty) => {
            let ann_ty = ann_ty.clone();
            analyze_expr(ctx, inner, Some(&ann_ty));
            match target {
                None => {
                    ctx.diagnostics.push(DiagnosticKind::AnnotationWithoutLeftType, span);
                    ann_ty
                }
                Some(t) if *t == ann_ty => ann_ty,
                Some(t) => ctx.error(DiagnosticKind::AnnotationMismatch { expected: t.clone(), found: ann_ty }, span),
            }
        }
        ExprKind::Binary { op, left, right } => {
            let op = *op;
            let lt = analyze_expr(ctx, left, target);
            let rt = analyze_expr(ctx, right, target);
            operators::analyze_binary(ctx, op, &lt, &rt, target, span)
        }
        ExprKind::Unary { op, operand } => {
            let op = *op;
            let ot = analyze_expr(ctx, operand, target);
            operators::analyze_unary(ctx, op, &ot, span)
        }
        ExprKind::Call { callee, args } => {
            let callee = callee.clone();
            analyze_call(ctx, &callee, args, span)
        }
        ExprKind::ArrayLiteral(elements) => array::analyze_array_literal(ctx, elements, target, span),
        ExprKind::Index { base, index } => {
            let bt = analyze_expr(ctx, base, None);
            let it = analyze_expr(ctx, index, None);
            array::analyze_index(ctx, &bt, &it, span)
        }
        ExprKind::ArrayCopy(base) => {
            let bt = analyze_expr(ctx, base, None);
            array::analyze_array_copy(ctx, &bt, span)
        }
        ExprKind::Length(base) => {
            let bt = analyze_expr(ctx, base, None);
            array::analyze_length(ctx, &bt, span)
        }
        ExprKind::Block(block) => block::analyze_block(ctx, block, target),
        ExprKind::Conditional(cond) => control::analyze_conditional(ctx, cond, target, span),
        ExprKind::ForLoop(for_expr) => control::analyze_for_expr(ctx, for_expr, target, span),
        ExprKind::Undef => Type::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FunctionSig;
    use crate::symbols::Mutability;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn int_literal_without_target_is_comptime() {
        let mut ctx = AnalysisCtx::new();
        let mut e = Expr::int(7, sp());
        assert_eq!(analyze_expr(&mut ctx, &mut e, None), Type::ComptimeInt);
    }

    #[test]
    fn int_literal_commits_to_concrete_target() {
        let mut ctx = AnalysisCtx::new();
        let mut e = Expr::int(7, sp());
        assert_eq!(analyze_expr(&mut ctx, &mut e, Some(&Type::I64)), Type::I64);
        assert_eq!(e.resolved_type, Some(Type::I64));
    }

    #[test]
    fn overflowing_literal_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        let mut e = Expr::int(9_000_000_000, sp());
        let ty = analyze_expr(&mut ctx, &mut e, Some(&Type::I32));
        assert_eq!(ty, Type::Unknown);
        assert!(matches!(
            ctx.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::LiteralOverflow { .. }
        ));
    }

    #[test]
    fn identifier_use_of_deferred_symbol_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        ctx.symbols.enter_scope();
        ctx.symbols.declare("v", Type::I32, Mutability::Mut, InitState::Deferred).unwrap();
        let mut e = Expr::ident("v", sp());
        let ty = analyze_expr(&mut ctx, &mut e, None);
        assert_eq!(ty, Type::I32);
        assert_eq!(ctx.diagnostics.iter().next().unwrap().kind, DiagnosticKind::UseOfUninitialized { name: "v".into() });
    }

    #[test]
    fn annotation_without_outer_target_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        let mut e = Expr::annotated(Expr::int(5, sp()), Type::I32, sp());
        analyze_expr(&mut ctx, &mut e, None);
        assert_eq!(ctx.diagnostics.iter().next().unwrap().kind, DiagnosticKind::AnnotationWithoutLeftType);
    }

    #[test]
    fn annotation_matching_outer_target_is_accepted() {
        let mut ctx = AnalysisCtx::new();
        let mut e = Expr::annotated(Expr::int(5, sp()), Type::I32, sp());
        let ty = analyze_expr(&mut ctx, &mut e, Some(&Type::I32));
        assert_eq!(ty, Type::I32);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn annotation_mismatching_outer_target_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        let mut e = Expr::annotated(Expr::int(5, sp()), Type::I32, sp());
        let ty = analyze_expr(&mut ctx, &mut e, Some(&Type::I64));
        assert_eq!(ty, Type::Unknown);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::AnnotationMismatch { expected: Type::I64, found: Type::I32 }
        );
    }

    #[test]
    fn call_resolves_return_type_and_coerces_args() {
        let mut ctx = AnalysisCtx::new();
        ctx.functions.insert("f".into(), FunctionSig { params: vec![Type::I64], return_type: Type::Bool });
        let mut e = Expr::call("f", vec![Expr::int(1, sp())], sp());
        let ty = analyze_expr(&mut ctx, &mut e, None);
        assert_eq!(ty, Type::Bool);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn call_to_undefined_function_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        let mut e = Expr::call("missing", vec![], sp());
        let ty = analyze_expr(&mut ctx, &mut e, None);
        assert_eq!(ty, Type::Unknown);
        assert_eq!(ctx.diagnostics.iter().next().unwrap().kind, DiagnosticKind::Undefined { name: "missing".into() });
    }

    #[test]
    fn flexible_comptime_adapts_at_two_different_use_sites() {
        let mut ctx = AnalysisCtx::new();
        ctx.symbols.enter_scope();
        ctx.symbols.declare("x", Type::ComptimeInt, Mutability::Val, InitState::Initialized).unwrap();
        let mut a = Expr::ident("x", sp());
        let mut b = Expr::ident("x", sp());
        assert_eq!(analyze_expr(&mut ctx, &mut a, Some(&Type::I32)), Type::I32);
        assert_eq!(analyze_expr(&mut ctx, &mut b, Some(&Type::F64)), Type::F64);
        assert!(ctx.diagnostics.is_empty());
    }
}
