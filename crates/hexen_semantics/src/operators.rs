//! The Binary / Unary Operator Analyzer (§4.6).
//!
//! Each operator has its own typing rule; none of them mutate the symbol
//! table or the diagnostic sink beyond what `analyze_binary`/`analyze_unary`
//! themselves report. Operand analysis (recursing into `expr::analyze_expr`)
//! is the caller's job — these functions receive already-typed operands.

use hexen_base::Span;

use crate::ast::{BinOp, UnOp};
use crate::context::AnalysisCtx;
use crate::diagnostics::DiagnosticKind;
use crate::types::Type;

/// Arithmetic `+ - *`: both operands must be numeric; the result is the
/// unification of the two (comptime stays comptime and adapts later; a
/// concrete operand alongside a comptime one commits the comptime side; two
/// different concrete types require an explicit target, per
/// `MixedConcreteRequiresContext`).
fn unify_arithmetic(ctx: &mut AnalysisCtx, left: &Type, right: &Type, target: Option<&Type>, span: Span) -> Type {
    if matches!(left, Type::Unknown) || matches!(right, Type::Unknown) {
        return Type::Unknown;
    }
    if !left.is_numeric() || !right.is_numeric() {
        return ctx.error(DiagnosticKind::IncomparableTypes { left: left.clone(), right: right.clone() }, span);
    }

    match (left.is_comptime(), right.is_comptime()) {
        (true, true) => Type::unify_comptime(left, right).unwrap_or(Type::Unknown),
        (true, false) => right.clone(),
        (false, true) => left.clone(),
        (false, false) => {
            if left == right {
                left.clone()
            } else if let Some(t) = target {
                if Type::can_coerce(left, t) && Type::can_coerce(right, t) {
                    t.clone()
                } else {
                    ctx.error(DiagnosticKind::MixedConcreteRequiresContext { left: left.clone(), right: right.clone() }, span)
                }
            } else {
                ctx.error(DiagnosticKind::MixedConcreteRequiresContext { left: left.clone(), right: right.clone() }, span)
            }
        }
    }
}

/// `/`: always produces a float; the outer target must be a concrete float
/// type (never inferred from the operands, regardless of how they're typed).
fn float_div(ctx: &mut AnalysisCtx, left: &Type, right: &Type, target: Option<&Type>, span: Span) -> Type {
    if matches!(left, Type::Unknown) || matches!(right, Type::Unknown) {
        return Type::Unknown;
    }
    if !left.is_numeric() || !right.is_numeric() {
        return ctx.error(DiagnosticKind::IncomparableTypes { left: left.clone(), right: right.clone() }, span);
    }
    match target {
        Some(t @ (Type::F32 | Type::F64)) => t.clone(),
        _ => ctx.error(DiagnosticKind::FloatDivRequiresFloatTarget, span),
    }
}

/// `\` and `%`: both operands must be integers (concrete or comptime); the
/// result follows the same unification as arithmetic, restricted to ints.
fn int_div_or_mod(ctx: &mut AnalysisCtx, left: &Type, right: &Type, target: Option<&Type>, span: Span) -> Type {
    if matches!(left, Type::Unknown) || matches!(right, Type::Unknown) {
        return Type::Unknown;
    }
    if !left.is_integer() {
        return ctx.error(DiagnosticKind::IntDivRequiresIntegers { found: left.clone() }, span);
    }
    if !right.is_integer() {
        return ctx.error(DiagnosticKind::IntDivRequiresIntegers { found: right.clone() }, span);
    }
    unify_arithmetic(ctx, left, right, target, span)
}

/// Comparisons undergo the same operand reconciliation as arithmetic (§4.6):
/// comptime adapts to a concrete partner, and two distinct concrete numerics
/// require an explicit target to resolve, same as `+ - *`. Only the
/// diagnostic effect of that reconciliation matters here — a comparison
/// always produces `bool`, never the unified operand type.
fn comparison(ctx: &mut AnalysisCtx, left: &Type, right: &Type, target: Option<&Type>, span: Span) -> Type {
    if matches!(left, Type::Unknown) || matches!(right, Type::Unknown) {
        return Type::Bool;
    }
    if left.is_numeric() && right.is_numeric() {
        unify_arithmetic(ctx, left, right, target, span);
        return Type::Bool;
    }
    if left == right && !left.is_array() {
        return Type::Bool;
    }
    ctx.error(DiagnosticKind::IncomparableTypes { left: left.clone(), right: right.clone() }, span)
}

fn logical(ctx: &mut AnalysisCtx, left: &Type, right: &Type, span: Span) -> Type {
    let mut ok = true;
    if !matches!(left, Type::Bool | Type::Unknown) {
        ctx.diagnostics.push(DiagnosticKind::LogicalOperandNotBool { found: left.clone() }, span);
        ok = false;
    }
    if !matches!(right, Type::Bool | Type::Unknown) {
        ctx.diagnostics.push(DiagnosticKind::LogicalOperandNotBool { found: right.clone() }, span);
        ok = false;
    }
    if ok { Type::Bool } else { Type::Unknown }
}

/// `+` additionally permits `string × string` concatenation; no other
/// operator, and no other type combination involving a string, is allowed.
fn add(ctx: &mut AnalysisCtx, left: &Type, right: &Type, target: Option<&Type>, span: Span) -> Type {
    if matches!(left, Type::String) || matches!(right, Type::String) {
        return if matches!(left, Type::String) && matches!(right, Type::String) {
            Type::String
        } else {
            ctx.error(DiagnosticKind::IncomparableTypes { left: left.clone(), right: right.clone() }, span)
        };
    }
    unify_arithmetic(ctx, left, right, target, span)
}

pub fn analyze_binary(
    ctx: &mut AnalysisCtx,
    op: BinOp,
    left: &Type,
    right: &Type,
    target: Option<&Type>,
    span: Span,
) -> Type {
    match op {
        BinOp::Add => add(ctx, left, right, target, span),
        BinOp::Sub | BinOp::Mul => unify_arithmetic(ctx, left, right, target, span),
        BinOp::FloatDiv => float_div(ctx, left, right, target, span),
        BinOp::IntDiv | BinOp::Mod => int_div_or_mod(ctx, left, right, target, span),
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => comparison(ctx, left, right, target, span),
        BinOp::And | BinOp::Or => logical(ctx, left, right, span),
    }
}

pub fn analyze_unary(ctx: &mut AnalysisCtx, op: UnOp, operand: &Type, span: Span) -> Type {
    match op {
        UnOp::Neg => {
            if matches!(operand, Type::Unknown) {
                Type::Unknown
            } else if operand.is_numeric() {
                operand.clone()
            } else {
                ctx.error(DiagnosticKind::IncomparableTypes { left: operand.clone(), right: operand.clone() }, span)
            }
        }
        UnOp::Not => {
            if matches!(operand, Type::Bool | Type::Unknown) {
                Type::Bool
            } else {
                ctx.error(DiagnosticKind::LogicalOperandNotBool { found: operand.clone() }, span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn comptime_ints_add_to_comptime_int() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Add, &Type::ComptimeInt, &Type::ComptimeInt, None, sp());
        assert_eq!(ty, Type::ComptimeInt);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn mixed_concrete_without_target_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Add, &Type::I32, &Type::I64, None, sp());
        assert_eq!(ty, Type::Unknown);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::MixedConcreteRequiresContext { left: Type::I32, right: Type::I64 }
        );
    }

    #[test]
    fn mixed_concrete_with_coercible_target_resolves() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Add, &Type::I32, &Type::I64, Some(&Type::I64), sp());
        assert_eq!(ty, Type::I64);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn float_div_requires_float_target() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::FloatDiv, &Type::I32, &Type::I32, None, sp());
        assert_eq!(ty, Type::Unknown);
        assert_eq!(ctx.diagnostics.iter().next().unwrap().kind, DiagnosticKind::FloatDivRequiresFloatTarget);
    }

    #[test]
    fn float_div_with_float_target_succeeds() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::FloatDiv, &Type::ComptimeInt, &Type::ComptimeInt, Some(&Type::F64), sp());
        assert_eq!(ty, Type::F64);
    }

    #[test]
    fn int_div_rejects_float_operand() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::IntDiv, &Type::F64, &Type::I32, None, sp());
        assert_eq!(ty, Type::Unknown);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::IntDivRequiresIntegers { found: Type::F64 }
        );
    }

    #[test]
    fn logical_and_requires_bool_operands() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::And, &Type::Bool, &Type::I32, None, sp());
        assert_eq!(ty, Type::Unknown);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::LogicalOperandNotBool { found: Type::I32 }
        );
    }

    #[test]
    fn comparison_of_numerics_is_bool() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Lt, &Type::I32, &Type::ComptimeInt, None, sp());
        assert_eq!(ty, Type::Bool);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn comparison_of_mixed_concrete_without_target_requires_context() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Lt, &Type::I32, &Type::I64, None, sp());
        assert_eq!(ty, Type::Bool);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::MixedConcreteRequiresContext { left: Type::I32, right: Type::I64 }
        );
    }

    #[test]
    fn comparison_of_mixed_concrete_with_target_is_accepted() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Lt, &Type::I32, &Type::I64, Some(&Type::I64), sp());
        assert_eq!(ty, Type::Bool);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn strings_concatenate_with_plus() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Add, &Type::String, &Type::String, None, sp());
        assert_eq!(ty, Type::String);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn string_plus_number_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_binary(&mut ctx, BinOp::Add, &Type::String, &Type::I32, None, sp());
        assert_eq!(ty, Type::Unknown);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::IncomparableTypes { left: Type::String, right: Type::I32 }
        );
    }

    #[test]
    fn unary_not_requires_bool() {
        let mut ctx = AnalysisCtx::new();
        let ty = analyze_unary(&mut ctx, UnOp::Not, &Type::I32, sp());
        assert_eq!(ty, Type::Unknown);
        assert_eq!(ctx.diagnostics.iter().next().unwrap().kind, DiagnosticKind::LogicalOperandNotBool { found: Type::I32 });
    }
}
