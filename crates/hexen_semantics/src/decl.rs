//! The Declaration / Assignment Analyzer.
//!
//! Owns the `val`/`mut` typing rules, the `undef` deferred-initialization
//! discipline, and the precision-loss acknowledgment rule that every other
//! analyzer with a target type in play (call arguments, mixed-concrete
//! arithmetic, array elements) also calls through [`require_coercible`].

use hexen_base::Span;

use crate::array;
use crate::ast::{Expr, ExprKind};
use crate::context::AnalysisCtx;
use crate::diagnostics::DiagnosticKind;
use crate::expr;
use crate::symbols::{InitState, Mutability, SymbolError};
use crate::types::Type;

fn is_undef(value: &Expr) -> bool {
    matches!(value.kind, ExprKind::Undef)
}

/// Applies the precision-loss acknowledgment rule (§4.8): a safe coercion is
/// silent, `Unknown` on either side never cascades into a second diagnostic,
/// and anything else is dangerous and must already have been acknowledged by
/// a matching `expr : T` (which [`expr::analyze_expr`] resolves to `target`
/// itself before this runs) — otherwise it's an error.
pub fn require_coercible(ctx: &mut AnalysisCtx, found: &Type, target: &Type, span: Span) {
    if matches!(found, Type::Unknown) || matches!(target, Type::Unknown) {
        return;
    }
    if found == target || Type::can_coerce(found, target) {
        return;
    }
    if found.is_array() && target.is_array() {
        array::check_array_coercion(ctx, found, target, span);
        return;
    }
    ctx.diagnostics
        .push(DiagnosticKind::PrecisionLossRequiresAck { target: target.clone() }, span);
}

fn declare_checked(ctx: &mut AnalysisCtx, name: &str, ty: Type, mutability: Mutability, init: InitState, span: Span) {
    if let Err(SymbolError::Redeclaration) = ctx.symbols.declare(name, ty, mutability, init) {
        ctx.diagnostics.push(DiagnosticKind::Redeclaration { name: name.to_string() }, span);
    }
}

/// `val name [: T] = expr`.
pub fn analyze_val(ctx: &mut AnalysisCtx, name: &str, declared_type: Option<&Type>, value: &mut Expr, span: Span) {
    if is_undef(value) {
        ctx.diagnostics.push(DiagnosticKind::ValUndef, span);
        declare_checked(ctx, name, Type::Unknown, Mutability::Val, InitState::Initialized, span);
        return;
    }

    let final_type = match declared_type {
        Some(t) => {
            let found = expr::analyze_expr(ctx, value, Some(t));
            require_coercible(ctx, &found, t, value.span);
            t.clone()
        }
        None => expr::analyze_expr(ctx, value, None),
    };

    declare_checked(ctx, name, final_type, Mutability::Val, InitState::Initialized, span);
}

/// `mut name [: T] = expr` (`expr` may be `undef`).
pub fn analyze_mut(ctx: &mut AnalysisCtx, name: &str, declared_type: Option<&Type>, value: &mut Expr, span: Span) {
    if is_undef(value) {
        let Some(t) = declared_type else {
            ctx.diagnostics.push(DiagnosticKind::MutUndefRequiresType { name: name.to_string() }, span);
            declare_checked(ctx, name, Type::Unknown, Mutability::Mut, InitState::Initialized, span);
            return;
        };
        value.resolved_type = Some(t.clone());
        declare_checked(ctx, name, t.clone(), Mutability::Mut, InitState::Deferred, span);
        return;
    }

    let final_type = match declared_type {
        Some(t) => {
            let found = expr::analyze_expr(ctx, value, Some(t));
            require_coercible(ctx, &found, t, value.span);
            t.clone()
        }
        None => {
            let found = expr::analyze_expr(ctx, value, None);
            if found.is_comptime() {
                ctx.diagnostics
                    .push(DiagnosticKind::MutUndefRequiresType { name: name.to_string() }, span);
                Type::Unknown
            } else {
                found
            }
        }
    };

    declare_checked(ctx, name, final_type, Mutability::Mut, InitState::Initialized, span);
}

/// `name = expr` — reassignment to an existing `mut` binding.
pub fn analyze_assign(ctx: &mut AnalysisCtx, name: &str, value: &mut Expr, span: Span) {
    let lookup = ctx.symbols.lookup(name).cloned_for_assign();
    let Some((declared_type, mutability)) = lookup else {
        ctx.error(DiagnosticKind::Undefined { name: name.to_string() }, span);
        expr::analyze_expr(ctx, value, None);
        return;
    };

    if mutability != Mutability::Mut {
        ctx.diagnostics.push(DiagnosticKind::ImmutableAssignment { name: name.to_string() }, span);
    }

    let found = expr::analyze_expr(ctx, value, Some(&declared_type));
    require_coercible(ctx, &found, &declared_type, value.span);
    ctx.symbols.mark_initialized(name);
}

/// Small helper: clone out just what `analyze_assign` needs from a lookup so
/// the borrow on `ctx.symbols` ends before we recurse into `value`, which
/// itself needs to borrow `ctx` mutably (for nested declarations/lookups).
trait LookupForAssign {
    fn cloned_for_assign(self) -> Option<(Type, Mutability)>;
}

impl LookupForAssign for Result<&crate::symbols::Symbol, SymbolError> {
    fn cloned_for_assign(self) -> Option<(Type, Mutability)> {
        self.ok().map(|s| (s.declared_type.clone(), s.mutability))
    }
}
