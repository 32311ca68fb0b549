//! The Conditional & Loop Analyzer (§4.9).

use hexen_base::Span;

use crate::ast::{Conditional, Else, ForExpr, ForSource, ForStmt, Stmt, Terminator, WhileStmt};
use crate::block;
use crate::context::AnalysisCtx;
use crate::diagnostics::DiagnosticKind;
use crate::expr;
use crate::symbols::{InitState, Mutability};
use crate::types::Type;

/// A conditional is always classified runtime (§4.4), even with a literal
/// condition — so, like a runtime block, it requires an outer target type.
/// Missing one is reported exactly once per conditional expression, at the
/// entry point; an `else if` chain shares its outer's target decision rather
/// than re-deriving (and re-reporting) it branch by branch.
pub fn analyze_conditional(ctx: &mut AnalysisCtx, cond: &mut Conditional, target: Option<&Type>, span: Span) -> Type {
    if target.is_none() {
        ctx.diagnostics.push(DiagnosticKind::MissingRuntimeContext, span);
    }
    analyze_conditional_branches(ctx, cond, target)
}

fn analyze_conditional_branches(ctx: &mut AnalysisCtx, cond: &mut Conditional, target: Option<&Type>) -> Type {
    let cond_ty = expr::analyze_expr(ctx, &mut cond.cond, Some(&Type::Bool));
    if !matches!(cond_ty, Type::Bool | Type::Unknown) {
        ctx.diagnostics.push(DiagnosticKind::TypeMismatch { expected: Type::Bool, found: cond_ty }, cond.cond.span);
    }

    block::analyze_block(ctx, &mut cond.then_branch, target);
    match &mut cond.else_branch {
        Some(Else::Block(b)) => {
            block::analyze_block(ctx, b, target);
        }
        Some(Else::If(inner)) => {
            analyze_conditional_branches(ctx, inner, target);
        }
        None => {}
    }

    target.cloned().unwrap_or(Type::Unknown)
}

fn bind_loop_var_type(ctx: &mut AnalysisCtx, source: &mut ForSource, annotated: Option<Type>, span: Span) -> Type {
    match source {
        ForSource::Range(a, b) => {
            expr::analyze_expr(ctx, a, None);
            expr::analyze_expr(ctx, b, None);
            annotated.unwrap_or(Type::ComptimeInt)
        }
        ForSource::Array(arr) => {
            let at = expr::analyze_expr(ctx, arr, None);
            if !at.is_array() {
                ctx.diagnostics.push(DiagnosticKind::PropertyOnNonArray { found: at.clone() }, span);
                Type::Unknown
            } else {
                annotated.unwrap_or_else(|| at.element_type().unwrap_or(Type::Unknown))
            }
        }
    }
}

fn analyze_for_stmt_labeled(ctx: &mut AnalysisCtx, f: &mut ForStmt, label: Option<String>) {
    let var_type = bind_loop_var_type(ctx, &mut f.source, f.var_type.clone(), f.span);
    ctx.symbols.enter_scope();
    let _ = ctx.symbols.declare(f.var.clone(), var_type, Mutability::Val, InitState::Initialized);
    ctx.push_loop(label);
    block::analyze_block(ctx, &mut f.body, None);
    ctx.pop_loop();
    ctx.symbols.exit_scope();
}

fn analyze_while_stmt_labeled(ctx: &mut AnalysisCtx, w: &mut WhileStmt, label: Option<String>) {
    let ct = expr::analyze_expr(ctx, &mut w.cond, Some(&Type::Bool));
    if !matches!(ct, Type::Bool | Type::Unknown) {
        ctx.diagnostics.push(DiagnosticKind::TypeMismatch { expected: Type::Bool, found: ct }, w.span);
    }
    ctx.push_loop(label);
    block::analyze_block(ctx, &mut w.body, None);
    ctx.pop_loop();
}

pub fn analyze_for_stmt(ctx: &mut AnalysisCtx, f: &mut ForStmt) {
    analyze_for_stmt_labeled(ctx, f, None);
}

pub fn analyze_while_stmt(ctx: &mut AnalysisCtx, w: &mut WhileStmt) {
    analyze_while_stmt_labeled(ctx, w, None);
}

pub fn analyze_labeled(ctx: &mut AnalysisCtx, label: &str, stmt: &mut Stmt) {
    match stmt {
        Stmt::For(f) => analyze_for_stmt_labeled(ctx, f, Some(label.to_string())),
        Stmt::While(w) => analyze_while_stmt_labeled(ctx, w, Some(label.to_string())),
        other => block::analyze_stmt(ctx, other),
    }
}

pub fn analyze_break(ctx: &mut AnalysisCtx, label: Option<&str>, span: Span) {
    if !ctx.in_loop() {
        ctx.diagnostics.push(DiagnosticKind::BreakOutsideLoop, span);
        return;
    }
    if let Some(l) = label {
        if !ctx.loop_label_in_scope(l) {
            ctx.diagnostics.push(DiagnosticKind::UnknownLabel { label: l.to_string() }, span);
        }
    }
}

pub fn analyze_continue(ctx: &mut AnalysisCtx, label: Option<&str>, span: Span) {
    if !ctx.in_loop() {
        ctx.diagnostics.push(DiagnosticKind::ContinueOutsideLoop, span);
        return;
    }
    if let Some(l) = label {
        if !ctx.loop_label_in_scope(l) {
            ctx.diagnostics.push(DiagnosticKind::UnknownLabel { label: l.to_string() }, span);
        }
    }
}

/// `for i in … { … -> e }` used as an expression (§4.9). The result is
/// conservatively always an inferred-size array when a yield is present —
/// tracking whether `break`/`continue` rule out a statically-known fixed
/// size would require flow analysis this crate does not perform.
pub fn analyze_for_expr(ctx: &mut AnalysisCtx, f: &mut ForExpr, target: Option<&Type>, span: Span) -> Type {
    let element_target = target.and_then(|t| t.element_type());
    let has_yield = matches!(f.body.terminator, Some(Terminator::Assign(_)));
    if has_yield && element_target.is_none() {
        ctx.diagnostics.push(DiagnosticKind::LoopExpressionRequiresType, span);
    }

    let var_type = bind_loop_var_type(ctx, &mut f.source, f.var_type.clone(), span);
    ctx.symbols.enter_scope();
    let _ = ctx.symbols.declare(f.var.clone(), var_type, Mutability::Val, InitState::Initialized);
    ctx.push_loop(None);
    let element_ty = block::analyze_block(ctx, &mut f.body, element_target.as_ref());
    ctx.pop_loop();
    ctx.symbols.exit_scope();

    if has_yield && element_target.is_some() {
        Type::InferredArray(Box::new(element_ty))
    } else {
        Type::Unknown
    }
}
