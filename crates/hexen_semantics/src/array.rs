//! The Array Analyzer (§4.5, array-specific diagnostics).
//!
//! Array literals, indexing, the explicit `[..]` copy, and `.length` all live
//! here. Element expressions are analyzed by recursing into
//! [`expr::analyze_expr`]; this module only owns the array-shape rules.

use hexen_base::Span;

use crate::ast::Expr;
use crate::context::AnalysisCtx;
use crate::diagnostics::DiagnosticKind;
use crate::expr;
use crate::types::Type;

/// Array-to-array compatibility has its own diagnostic vocabulary distinct
/// from the scalar precision-loss rule: a size mismatch, an element-type
/// mismatch, a dimension mismatch (nested arrays), or a size that can't be
/// reconciled between an inferred-size source and a concrete destination.
/// Called from [`crate::decl::require_coercible`] whenever both sides are
/// arrays instead of its generic scalar check.
pub fn check_array_coercion(ctx: &mut AnalysisCtx, found: &Type, target: &Type, span: Span) -> bool {
    let (found_elem, found_len) = match found {
        Type::Array(e, n) => (Some(e.as_ref()), Some(*n)),
        Type::InferredArray(e) => (Some(e.as_ref()), None),
        Type::ComptimeArrayInt => (Some(&Type::ComptimeInt), None),
        Type::ComptimeArrayFloat => (Some(&Type::ComptimeFloat), None),
        _ => (None, None),
    };
    let (target_elem, target_len) = match target {
        Type::Array(e, n) => (Some(e.as_ref()), Some(*n)),
        Type::InferredArray(e) => (Some(e.as_ref()), None),
        _ => (None, None),
    };

    let (Some(fe), Some(te)) = (found_elem, target_elem) else {
        return false;
    };

    if fe.is_array() != te.is_array() {
        ctx.diagnostics.push(DiagnosticKind::MultiDimMismatch, span);
        return false;
    }
    if fe.is_array() && te.is_array() && !check_array_coercion(ctx, fe, te, span) {
        return false;
    } else if !fe.is_array() && !Type::can_coerce(fe, te) && fe != te {
        ctx.diagnostics
            .push(DiagnosticKind::ArrayElementTypeMismatch { expected: te.clone(), found: fe.clone() }, span);
        return false;
    }

    match (found_len, target_len) {
        (Some(f), Some(t)) if f != t => {
            ctx.diagnostics.push(DiagnosticKind::ArraySizeMismatch { expected: t, found: f }, span);
            false
        }
        (None, Some(_)) if matches!(found, Type::InferredArray(_)) => {
            ctx.diagnostics.push(DiagnosticKind::InferredSizeToConcreteMismatch, span);
            false
        }
        _ => true,
    }
}

fn element_target(target: Option<&Type>) -> Option<Type> {
    target.and_then(Type::element_type)
}

pub fn analyze_array_literal(ctx: &mut AnalysisCtx, elements: &mut [Expr], target: Option<&Type>, span: Span) -> Type {
    if elements.is_empty() {
        return match target {
            Some(t) if t.is_array() => t.clone(),
            _ => ctx.error(DiagnosticKind::EmptyArrayRequiresContext, span),
        };
    }

    let elem_target = element_target(target);
    let mut element_types = Vec::with_capacity(elements.len());
    for element in elements.iter_mut() {
        let found = expr::analyze_expr(ctx, element, elem_target.as_ref());
        element_types.push(found);
    }
    let len = elements.len() as u64;

    if let Some(t) = target {
        if let Some(te) = t.element_type() {
            let ok = element_types.iter().zip(elements.iter()).all(|(found, el)| {
                found == &te || Type::can_coerce(found, &te) || matches!(found, Type::Unknown) || {
                    ctx.diagnostics
                        .push(DiagnosticKind::ArrayElementTypeMismatch { expected: te.clone(), found: found.clone() }, el.span);
                    false
                }
            });
            if let Type::Array(_, n) = t {
                if *n != len {
                    ctx.diagnostics.push(DiagnosticKind::ArraySizeMismatch { expected: *n, found: len }, span);
                    return Type::Unknown;
                }
            }
            return if ok { t.clone() } else { Type::Unknown };
        }
    }

    let mut iter = element_types.into_iter();
    let first = iter.next().unwrap();
    let mut unified = first;
    for (found, el) in iter.zip(elements.iter().skip(1)) {
        unified = match (&unified, &found) {
            (a, b) if a == b => unified,
            (a, b) if a.is_comptime() && b.is_comptime() => {
                Type::unify_comptime(a, b).unwrap_or_else(|| {
                    ctx.diagnostics
                        .push(DiagnosticKind::ArrayElementTypeMismatch { expected: unified.clone(), found: found.clone() }, el.span);
                    Type::Unknown
                })
            }
            (a, b) if a.is_array() && b.is_array() => {
                check_array_coercion(ctx, b, a, el.span);
                unified
            }
            _ => {
                ctx.diagnostics
                    .push(DiagnosticKind::ArrayElementTypeMismatch { expected: unified.clone(), found: found.clone() }, el.span);
                Type::Unknown
            }
        };
    }

    match unified {
        Type::ComptimeInt => Type::ComptimeArrayInt,
        Type::ComptimeFloat => Type::ComptimeArrayFloat,
        Type::Unknown => Type::Unknown,
        other => Type::Array(Box::new(other), len),
    }
}

pub fn analyze_index(ctx: &mut AnalysisCtx, base: &Type, index: &Type, span: Span) -> Type {
    if !base.is_array() {
        return ctx.error(DiagnosticKind::PropertyOnNonArray { found: base.clone() }, span);
    }
    if !matches!(index, Type::Unknown) && !index.is_integer() {
        ctx.diagnostics.push(DiagnosticKind::IntDivRequiresIntegers { found: index.clone() }, span);
    }
    base.element_type().unwrap_or(Type::Unknown)
}

pub fn analyze_array_copy(ctx: &mut AnalysisCtx, base: &Type, span: Span) -> Type {
    if !base.is_array() {
        return ctx.error(DiagnosticKind::PropertyOnNonArray { found: base.clone() }, span);
    }
    base.clone()
}

pub fn analyze_length(ctx: &mut AnalysisCtx, base: &Type, span: Span) -> Type {
    if !base.is_array() {
        return ctx.error(DiagnosticKind::PropertyOnNonArray { found: base.clone() }, span);
    }
    if base.is_comptime() {
        Type::ComptimeInt
    } else {
        Type::I64
    }
}

/// A concrete array passed by value must be explicitly copied with `[..]`;
/// bare identifiers of concrete array type used where a value is expected
/// (not as the base of `.length`/`[..]`/indexing) trigger this. Called by
/// callers that consume a whole array value (call arguments, declarations).
pub fn require_explicit_copy(ctx: &mut AnalysisCtx, expr: &Expr, ty: &Type) {
    let is_bare_concrete_array_ident = matches!(expr.kind, crate::ast::ExprKind::Identifier(_))
        && ty.is_array()
        && !ty.is_comptime();
    if is_bare_concrete_array_ident {
        ctx.diagnostics.push(DiagnosticKind::ConcreteArrayCopyRequired, expr.span);
    }
}
