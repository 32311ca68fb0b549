//! The root analysis context threaded through every analyzer.
//!
//! A fresh [`AnalysisCtx`] is created per invocation: there is no shared
//! mutable state across trees, no locking, and no cancellation — analysis is
//! a straight recursive descent over an immutable input tree.

use std::collections::HashMap;

use hexen_base::Span;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::symbols::SymbolTable;
use crate::types::Type;

/// A registered function signature, used to resolve calls and to check
/// `return` statements against the enclosing function's declared type.
#[derive(Debug, Clone)]
pub struct FunctionSig {
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// One entry in the loop stack, used to resolve bare and labeled
/// `break`/`continue`. Labels are purely lexical: pushed on entry to a loop,
/// popped on exit, and may be reused afterward.
struct LoopFrame {
    label: Option<String>,
}

pub struct AnalysisCtx {
    pub symbols: SymbolTable,
    pub diagnostics: DiagnosticSink,
    pub functions: HashMap<String, FunctionSig>,
    return_type_stack: Vec<Type>,
    loop_stack: Vec<LoopFrame>,
}

impl AnalysisCtx {
    pub fn new() -> Self {
        AnalysisCtx {
            symbols: SymbolTable::new(),
            diagnostics: DiagnosticSink::new(),
            functions: HashMap::new(),
            return_type_stack: Vec::new(),
            loop_stack: Vec::new(),
        }
    }

    pub fn error(&mut self, kind: DiagnosticKind, span: Span) -> Type {
        self.diagnostics.push(kind, span);
        Type::Unknown
    }

    pub fn push_function_return_type(&mut self, ty: Type) {
        self.return_type_stack.push(ty);
    }

    pub fn pop_function_return_type(&mut self) {
        self.return_type_stack.pop();
    }

    pub fn current_return_type(&self) -> Option<&Type> {
        self.return_type_stack.last()
    }

    pub fn push_loop(&mut self, label: Option<String>) {
        self.loop_stack.push(LoopFrame { label });
    }

    pub fn pop_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub fn in_loop(&self) -> bool {
        !self.loop_stack.is_empty()
    }

    pub fn loop_label_in_scope(&self, label: &str) -> bool {
        self.loop_stack.iter().any(|frame| frame.label.as_deref() == Some(label))
    }
}

impl Default for AnalysisCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a full program analysis: the caller inspects `diagnostics`; an
/// empty list indicates success. The input tree was mutated in place to
/// carry resolved types, so there is nothing further to return there.
pub struct AnalysisReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
