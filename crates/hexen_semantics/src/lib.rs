//! Hexen's semantic analysis core: type checking, mutability and `undef`
//! discipline, comptime-vs-runtime block classification, and the rest of the
//! static checks that run after parsing and before code generation.
//!
//! The crate does not parse, execute, or generate code — it consumes an
//! already-built syntax tree ([`ast::Program`]), decorates each expression
//! node with a resolved [`types::Type`], and returns an [`context::AnalysisReport`]
//! carrying every diagnostic observed along the way. See [`analyze_program`]
//! for the entry point.

pub mod array;
pub mod ast;
pub mod block;
pub mod classifier;
pub mod context;
pub mod control;
pub mod decl;
pub mod diagnostics;
pub mod expr;
pub mod operators;
pub mod symbols;
pub mod types;

use ast::Program;
use context::{AnalysisCtx, AnalysisReport, FunctionSig};
use symbols::{InitState, Mutability};

/// Analyze a full program: register every function signature up front (so
/// forward references between functions resolve), then walk each body in
/// turn. The input tree is mutated in place to carry resolved types; the
/// returned report carries every diagnostic observed.
pub fn analyze_program(program: &mut Program) -> AnalysisReport {
    let mut ctx = AnalysisCtx::new();

    for function in &program.functions {
        if ctx.functions.contains_key(&function.name) {
            ctx.diagnostics.push(
                diagnostics::DiagnosticKind::Redeclaration { name: function.name.clone() },
                function.span,
            );
            continue;
        }
        ctx.functions.insert(
            function.name.clone(),
            FunctionSig {
                params: function.params.iter().map(|p| p.ty.clone()).collect(),
                return_type: function.return_type.clone(),
            },
        );
    }

    for function in &mut program.functions {
        ctx.symbols.enter_scope();
        for param in &function.params {
            let _ = ctx.symbols.declare(param.name.clone(), param.ty.clone(), Mutability::Val, InitState::Initialized);
        }
        ctx.push_function_return_type(function.return_type.clone());

        let target = function.body.is_expression_block().then(|| function.return_type.clone());
        block::analyze_block(&mut ctx, &mut function.body, target.as_ref());

        ctx.pop_function_return_type();
        ctx.symbols.exit_scope();
    }

    AnalysisReport { diagnostics: ctx.diagnostics.into_vec() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{Block, Expr, Function, Param, Stmt, Terminator};
    use hexen_base::Span;
    use types::Type;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn symbol_table_is_empty_after_a_well_formed_program() {
        let mut program = Program {
            functions: vec![Function {
                name: "main".into(),
                params: vec![],
                return_type: Type::I32,
                body: Block::new(vec![Stmt::Return(Some(Expr::int(0, sp())), sp())]),
                span: sp(),
            }],
        };
        let report = analyze_program(&mut program);
        assert!(report.is_ok());
    }

    #[test]
    fn forward_reference_between_functions_resolves() {
        let mut program = Program {
            functions: vec![
                Function {
                    name: "a".into(),
                    params: vec![],
                    return_type: Type::I32,
                    body: Block::new(vec![Stmt::Return(Some(Expr::call("b", vec![], sp())), sp())]),
                    span: sp(),
                },
                Function {
                    name: "b".into(),
                    params: vec![],
                    return_type: Type::I32,
                    body: Block::new(vec![Stmt::Return(Some(Expr::int(1, sp())), sp())]),
                    span: sp(),
                },
            ],
        };
        let report = analyze_program(&mut program);
        assert!(report.is_ok());
    }

    #[test]
    fn expression_block_function_body_commits_to_return_type() {
        let mut program = Program {
            functions: vec![Function {
                name: "main".into(),
                params: vec![Param { name: "x".into(), ty: Type::I64, span: sp() }],
                return_type: Type::I64,
                body: Block::with_terminator(vec![], Terminator::Assign(Expr::ident("x", sp()))),
                span: sp(),
            }],
        };
        let report = analyze_program(&mut program);
        assert!(report.is_ok());
    }

    #[test]
    fn duplicate_function_names_are_rejected() {
        let mut program = Program {
            functions: vec![
                Function { name: "f".into(), params: vec![], return_type: Type::Void, body: Block::new(vec![]), span: sp() },
                Function { name: "f".into(), params: vec![], return_type: Type::Void, body: Block::new(vec![]), span: sp() },
            ],
        };
        let report = analyze_program(&mut program);
        assert!(!report.is_ok());
    }
}
