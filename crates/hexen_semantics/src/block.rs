//! The Block Analyzer (§4.7).
//!
//! Also the single statement dispatcher: every other analyzer that owns a
//! statement kind (`decl` for `val`/`mut`/assignment, `control` for loops and
//! labels) is invoked from here, in lexical order.

use hexen_base::Span;

use crate::array;
use crate::ast::{Block, ExprKind, Stmt, Terminator};
use crate::classifier::{self, Classification};
use crate::context::AnalysisCtx;
use crate::control;
use crate::decl;
use crate::diagnostics::DiagnosticKind;
use crate::expr;
use crate::types::Type;

pub fn analyze_stmt(ctx: &mut AnalysisCtx, stmt: &mut Stmt) {
    match stmt {
        Stmt::Val { name, declared_type, value, span } => {
            decl::analyze_val(ctx, name, declared_type.as_ref(), value, *span);
        }
        Stmt::Mut { name, declared_type, value, span } => {
            decl::analyze_mut(ctx, name, declared_type.as_ref(), value, *span);
        }
        Stmt::Assign { name, value, span } => {
            decl::analyze_assign(ctx, name, value, *span);
        }
        Stmt::Return(value, span) => {
            analyze_return(ctx, value.as_mut(), *span);
        }
        Stmt::Block(block, _span) => {
            analyze_block(ctx, block, None);
        }
        Stmt::For(for_stmt) => control::analyze_for_stmt(ctx, for_stmt),
        Stmt::While(while_stmt) => control::analyze_while_stmt(ctx, while_stmt),
        Stmt::Labeled { label, stmt, .. } => control::analyze_labeled(ctx, label, stmt),
        Stmt::Break { label, span } => control::analyze_break(ctx, label.as_deref(), *span),
        Stmt::Continue { label, span } => control::analyze_continue(ctx, label.as_deref(), *span),
        Stmt::Expr(e, _span) => {
            expr::analyze_expr(ctx, e, None);
            if let ExprKind::Identifier(name) = &e.kind {
                if let Ok(symbol) = ctx.symbols.lookup(name) {
                    if symbol.declared_type.is_array() && !symbol.declared_type.is_comptime() {
                        array::require_explicit_copy(ctx, e, &symbol.declared_type.clone());
                    }
                }
            }
        }
    }
}

fn analyze_return(ctx: &mut AnalysisCtx, value: Option<&mut crate::ast::Expr>, span: Span) {
    let expected = ctx.current_return_type().cloned();
    match (value, &expected) {
        (Some(v), Some(t)) => {
            let found = expr::analyze_expr(ctx, v, Some(t));
            decl::require_coercible(ctx, &found, t, v.span);
        }
        (Some(v), None) => {
            expr::analyze_expr(ctx, v, None);
        }
        (None, Some(t)) if !matches!(t, Type::Void) => {
            ctx.diagnostics.push(DiagnosticKind::TypeMismatch { expected: t.clone(), found: Type::Void }, span);
        }
        (None, _) => {}
    }
}

/// Analyze a statement or expression block. Statement blocks are identified
/// by having no terminator; their type is never consulted by the caller.
pub fn analyze_block(ctx: &mut AnalysisCtx, block: &mut Block, target: Option<&Type>) -> Type {
    let classification = classifier::classify_block(block, &ctx.symbols);

    ctx.symbols.enter_scope();

    for stmt in &mut block.stmts {
        analyze_stmt(ctx, stmt);
    }

    let result = match &mut block.terminator {
        None => Type::Void,
        Some(Terminator::Assign(value)) => {
            // A conditional terminator reports its own missing-context
            // diagnostic (it is always runtime-classified, §4.4) — avoid
            // pushing the same diagnostic for it here too.
            let self_reporting = matches!(value.kind, ExprKind::Conditional(_));
            if classification == Classification::Runtime && target.is_none() && !self_reporting {
                ctx.diagnostics.push(DiagnosticKind::MissingRuntimeContext, value.span);
                expr::analyze_expr(ctx, value, None);
                Type::Unknown
            } else {
                expr::analyze_expr(ctx, value, target)
            }
        }
        Some(Terminator::Return(value)) => {
            analyze_return(ctx, value.as_mut(), block.terminator_span().unwrap_or(Span::new(0, 0)));
            Type::Void
        }
    };

    ctx.symbols.exit_scope();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn compile_time_block_preserves_comptime_without_target() {
        let mut ctx = AnalysisCtx::new();
        ctx.symbols.enter_scope();
        let mut block = Block::with_terminator(vec![], Terminator::Assign(Expr::int(42, sp())));
        let ty = analyze_block(&mut ctx, &mut block, None);
        assert_eq!(ty, Type::ComptimeInt);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn runtime_block_without_target_is_rejected() {
        let mut ctx = AnalysisCtx::new();
        ctx.symbols.enter_scope();
        let mut block = Block::with_terminator(vec![], Terminator::Assign(Expr::call("f", vec![], sp())));
        let ty = analyze_block(&mut ctx, &mut block, None);
        assert_eq!(ty, Type::Unknown);
        assert_eq!(ctx.diagnostics.iter().next().unwrap().kind, DiagnosticKind::MissingRuntimeContext);
    }

    #[test]
    fn runtime_block_with_target_is_accepted() {
        let mut ctx = AnalysisCtx::new();
        ctx.symbols.enter_scope();
        ctx.functions.insert("f".into(), crate::context::FunctionSig { params: vec![], return_type: Type::I32 });
        let mut block = Block::with_terminator(vec![], Terminator::Assign(Expr::call("f", vec![], sp())));
        let ty = analyze_block(&mut ctx, &mut block, Some(&Type::I32));
        assert_eq!(ty, Type::I32);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn block_scope_is_balanced() {
        let mut ctx = AnalysisCtx::new();
        ctx.symbols.enter_scope();
        let depth_before = ctx.symbols.depth();
        let mut block = Block::new(vec![Stmt::Val {
            name: "x".into(),
            declared_type: None,
            value: Expr::int(1, sp()),
            span: sp(),
        }]);
        analyze_block(&mut ctx, &mut block, None);
        assert_eq!(ctx.symbols.depth(), depth_before);
    }
}
