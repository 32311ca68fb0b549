//! The Comptime Classifier.
//!
//! A pure function of a subtree and the current symbol typings: it never
//! emits a diagnostic and never mutates anything. The Block Analyzer asks it
//! whether a block is compile-time-evaluable (and so preserves its result's
//! comptime type) or runtime-evaluable (and so requires an explicit target
//! type supplied from the outside).

use crate::ast::{Block, Expr, ExprKind, Stmt};
use crate::symbols::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    CompileTime,
    Runtime,
}

impl Classification {
    fn or(self, other: Classification) -> Classification {
        if self == Classification::Runtime || other == Classification::Runtime {
            Classification::Runtime
        } else {
            Classification::CompileTime
        }
    }
}

/// Is `base`'s static type a *concrete* array? Identifiers are resolved
/// against the symbol table; anything else falls back to the type already
/// recorded on the node (if analysis has reached it) or `false` (a comptime
/// array literal, or not yet known — neither triggers the runtime rule).
fn is_concrete_array(base: &Expr, symbols: &SymbolTable) -> bool {
    if let ExprKind::Identifier(name) = &base.kind {
        if let Ok(symbol) = symbols.lookup(name) {
            return symbol.declared_type.is_array() && !symbol.declared_type.is_comptime();
        }
    }
    match &base.resolved_type {
        Some(ty) => ty.is_array() && !ty.is_comptime(),
        None => false,
    }
}

pub fn classify_expr(expr: &Expr, symbols: &SymbolTable) -> Classification {
    match &expr.kind {
        ExprKind::IntLiteral(_)
        | ExprKind::FloatLiteral(_)
        | ExprKind::BoolLiteral(_)
        | ExprKind::StringLiteral(_)
        | ExprKind::Undef => Classification::CompileTime,

        ExprKind::Identifier(name) => match symbols.lookup(name) {
            Ok(symbol) if symbol.declared_type.is_comptime() => Classification::CompileTime,
            _ => Classification::Runtime,
        },

        ExprKind::Paren(inner) | ExprKind::Unary { operand: inner, .. } => {
            classify_expr(inner, symbols)
        }

        ExprKind::TypeAnnotated(inner, _) => classify_expr(inner, symbols),

        ExprKind::Binary { left, right, .. } => {
            classify_expr(left, symbols).or(classify_expr(right, symbols))
        }

        ExprKind::Call { .. } => Classification::Runtime,

        ExprKind::ArrayLiteral(elements) => elements
            .iter()
            .fold(Classification::CompileTime, |acc, e| acc.or(classify_expr(e, symbols))),

        ExprKind::Index { base, index } => classify_expr(base, symbols).or(classify_expr(index, symbols)),

        ExprKind::ArrayCopy(base) => {
            let own = if is_concrete_array(base, symbols) { Classification::Runtime } else { Classification::CompileTime };
            own.or(classify_expr(base, symbols))
        }

        ExprKind::Length(base) => {
            let own = if is_concrete_array(base, symbols) { Classification::Runtime } else { Classification::CompileTime };
            own.or(classify_expr(base, symbols))
        }

        ExprKind::Block(block) => classify_block(block, symbols),

        ExprKind::Conditional(_) => Classification::Runtime,

        ExprKind::ForLoop(_) => Classification::Runtime,
    }
}

pub fn classify_stmt(stmt: &Stmt, symbols: &SymbolTable) -> Classification {
    match stmt {
        Stmt::Val { value, .. } => classify_expr(value, symbols),
        Stmt::Mut { value, .. } => classify_expr(value, symbols),
        Stmt::Assign { value, .. } => classify_expr(value, symbols),
        Stmt::Return(value, _) => value
            .as_ref()
            .map(|v| classify_expr(v, symbols))
            .unwrap_or(Classification::CompileTime),
        Stmt::Block(block, _) => classify_block(block, symbols),
        Stmt::For(_) | Stmt::While(_) => Classification::Runtime,
        Stmt::Labeled { stmt, .. } => classify_stmt(stmt, symbols),
        Stmt::Break { .. } | Stmt::Continue { .. } => Classification::CompileTime,
        Stmt::Expr(expr, _) => classify_expr(expr, symbols),
    }
}

/// Classify a block: compile-time iff every statement and the terminator
/// expression are compile-time. This is the classification the Block
/// Analyzer consults to decide whether the block's result keeps its comptime
/// type or must commit to an externally-supplied target.
pub fn classify_block(block: &Block, symbols: &SymbolTable) -> Classification {
    let mut result = Classification::CompileTime;
    for stmt in &block.stmts {
        result = result.or(classify_stmt(stmt, symbols));
    }
    if let Some(terminator) = &block.terminator {
        let terminator_class = match terminator {
            crate::ast::Terminator::Assign(expr) => classify_expr(expr, symbols),
            crate::ast::Terminator::Return(Some(expr)) => classify_expr(expr, symbols),
            crate::ast::Terminator::Return(None) => Classification::CompileTime,
        };
        result = result.or(terminator_class);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::symbols::{InitState, Mutability};
    use crate::types::Type;
    use hexen_base::Span;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn literal_is_compile_time() {
        let symbols = SymbolTable::new();
        let e = Expr::int(42, sp());
        assert_eq!(classify_expr(&e, &symbols), Classification::CompileTime);
    }

    #[test]
    fn call_is_runtime() {
        let symbols = SymbolTable::new();
        let e = Expr::call("f", vec![], sp());
        assert_eq!(classify_expr(&e, &symbols), Classification::Runtime);
    }

    #[test]
    fn concrete_symbol_use_is_runtime() {
        let mut symbols = SymbolTable::new();
        symbols.enter_scope();
        symbols.declare("x", Type::I32, Mutability::Val, InitState::Initialized).unwrap();
        let e = Expr::ident("x", sp());
        assert_eq!(classify_expr(&e, &symbols), Classification::Runtime);
    }

    #[test]
    fn comptime_symbol_use_is_compile_time() {
        let mut symbols = SymbolTable::new();
        symbols.enter_scope();
        symbols.declare("x", Type::ComptimeInt, Mutability::Val, InitState::Initialized).unwrap();
        let e = Expr::ident("x", sp());
        assert_eq!(classify_expr(&e, &symbols), Classification::CompileTime);
    }

    #[test]
    fn conditional_is_always_runtime_even_with_literal_condition() {
        let symbols = SymbolTable::new();
        let cond = Conditional {
            cond: Box::new(Expr::boolean(true, sp())),
            then_branch: Block::with_terminator(vec![], Terminator::Assign(Expr::int(1, sp()))),
            else_branch: Some(Else::Block(Block::with_terminator(vec![], Terminator::Assign(Expr::int(2, sp()))))),
        };
        let e = Expr::conditional(cond, sp());
        assert_eq!(classify_expr(&e, &symbols), Classification::Runtime);
    }

    #[test]
    fn unrelated_statements_do_not_change_classification() {
        let symbols = SymbolTable::new();
        let narrow = Block::with_terminator(vec![], Terminator::Assign(Expr::int(1, sp())));
        let wider = Block::with_terminator(
            vec![Stmt::Val { name: "a".into(), declared_type: None, value: Expr::int(2, sp()), span: sp() }],
            Terminator::Assign(Expr::int(1, sp())),
        );
        assert_eq!(classify_block(&narrow, &symbols), classify_block(&wider, &symbols));
    }
}
