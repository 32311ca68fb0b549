//! Diagnostics as data.
//!
//! Analyzers never raise exceptions to control flow; a failed check appends a
//! [`Diagnostic`] to the sink and keeps walking with a best-effort type
//! (usually [`crate::types::Type::Unknown`]). The sink is append-only and
//! preserves traversal order.

use hexen_base::Span;

use crate::types::Type;

/// The kind of problem observed, matching the external diagnostic catalogue.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    Undefined { name: String },
    Redeclaration { name: String },
    UseOfUninitialized { name: String },
    ValUndef,
    MutUndefRequiresType { name: String },
    ImmutableAssignment { name: String },
    TypeMismatch { expected: Type, found: Type },
    PrecisionLossRequiresAck { target: Type },
    AnnotationMismatch { expected: Type, found: Type },
    AnnotationWithoutLeftType,
    MixedConcreteRequiresContext { left: Type, right: Type },
    FloatDivRequiresFloatTarget,
    IntDivRequiresIntegers { found: Type },
    IncomparableTypes { left: Type, right: Type },
    LogicalOperandNotBool { found: Type },
    LiteralOverflow { value: String, destination: Type },
    MissingRuntimeContext,
    LoopExpressionRequiresType,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    UnknownLabel { label: String },
    ArraySizeMismatch { expected: u64, found: u64 },
    ArrayElementTypeMismatch { expected: Type, found: Type },
    EmptyArrayRequiresContext,
    PropertyOnNonArray { found: Type },
    MultiDimMismatch,
    InferredSizeToConcreteMismatch,
    ConcreteArrayCopyRequired,
}

/// A single diagnostic: what went wrong, where, and — wherever a concrete fix
/// applies — how to fix it.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        let message = describe(&kind);
        let hint = hint_for(&kind);
        Diagnostic { kind, message, span, hint }
    }
}

fn describe(kind: &DiagnosticKind) -> String {
    match kind {
        DiagnosticKind::Undefined { name } => format!("undefined name '{name}'"),
        DiagnosticKind::Redeclaration { name } => format!("'{name}' is already declared in this scope"),
        DiagnosticKind::UseOfUninitialized { name } => format!("use of uninitialized variable '{name}'"),
        DiagnosticKind::ValUndef => "'val' cannot be initialized with 'undef'".to_string(),
        DiagnosticKind::MutUndefRequiresType { name } => {
            format!("'mut {name} = undef' requires an explicit type annotation")
        }
        DiagnosticKind::ImmutableAssignment { name } => format!("cannot assign to 'val' binding '{name}'"),
        DiagnosticKind::TypeMismatch { expected, found } => {
            format!("expected type '{expected}', found '{found}'")
        }
        DiagnosticKind::PrecisionLossRequiresAck { target } => {
            format!("assigning to '{target}' here may lose precision; acknowledge with a trailing annotation")
        }
        DiagnosticKind::AnnotationMismatch { expected, found } => {
            format!("annotation ': {found}' does not match the expected type '{expected}'")
        }
        DiagnosticKind::AnnotationWithoutLeftType => {
            "a trailing type annotation is only legal where an outer type is expected".to_string()
        }
        DiagnosticKind::MixedConcreteRequiresContext { left, right } => {
            format!("mixing '{left}' and '{right}' requires an explicit target type")
        }
        DiagnosticKind::FloatDivRequiresFloatTarget => {
            "'/' produces a float and requires a concrete float target".to_string()
        }
        DiagnosticKind::IntDivRequiresIntegers { found } => {
            format!("'\\' and '%' require integer operands, found '{found}'")
        }
        DiagnosticKind::IncomparableTypes { left, right } => {
            format!("'{left}' and '{right}' cannot be compared")
        }
        DiagnosticKind::LogicalOperandNotBool { found } => {
            format!("logical operator requires 'bool', found '{found}'")
        }
        DiagnosticKind::LiteralOverflow { value, destination } => {
            format!("literal '{value}' does not fit in '{destination}'")
        }
        DiagnosticKind::MissingRuntimeContext => {
            "a runtime-evaluable block requires an explicit target type".to_string()
        }
        DiagnosticKind::LoopExpressionRequiresType => {
            "a loop expression that yields values requires an explicit array type annotation".to_string()
        }
        DiagnosticKind::BreakOutsideLoop => "'break' outside any loop".to_string(),
        DiagnosticKind::ContinueOutsideLoop => "'continue' outside any loop".to_string(),
        DiagnosticKind::UnknownLabel { label } => format!("no enclosing loop labeled '{label}'"),
        DiagnosticKind::ArraySizeMismatch { expected, found } => {
            format!("expected an array of length {expected}, found length {found}")
        }
        DiagnosticKind::ArrayElementTypeMismatch { expected, found } => {
            format!("array element type '{found}' does not match expected '{expected}'")
        }
        DiagnosticKind::EmptyArrayRequiresContext => {
            "an empty array literal requires an explicit element type from context".to_string()
        }
        DiagnosticKind::PropertyOnNonArray { found } => {
            format!("'.length' requires an array, found '{found}'")
        }
        DiagnosticKind::MultiDimMismatch => "mismatched dimensions in a multi-dimensional array".to_string(),
        DiagnosticKind::InferredSizeToConcreteMismatch => {
            "an inferred-size array does not match the declared fixed size".to_string()
        }
        DiagnosticKind::ConcreteArrayCopyRequired => {
            "passing a concrete array by value requires an explicit copy 'a[..]'".to_string()
        }
    }
}

fn hint_for(kind: &DiagnosticKind) -> Option<String> {
    match kind {
        DiagnosticKind::PrecisionLossRequiresAck { target } | DiagnosticKind::AnnotationMismatch { expected: target, .. } => {
            Some(format!("': {target}'"))
        }
        DiagnosticKind::MixedConcreteRequiresContext { .. } => {
            Some("annotate the target with the concrete type both operands should commit to".to_string())
        }
        DiagnosticKind::FloatDivRequiresFloatTarget => Some("': f64' or ': f32'".to_string()),
        DiagnosticKind::MissingRuntimeContext | DiagnosticKind::LoopExpressionRequiresType => {
            Some("add an explicit ': T' type annotation to the declaration".to_string())
        }
        DiagnosticKind::MutUndefRequiresType { .. } => Some("add ': T' after the variable name".to_string()),
        DiagnosticKind::ConcreteArrayCopyRequired => Some("use 'a[..]' to copy the array".to_string()),
        DiagnosticKind::AnnotationWithoutLeftType => {
            Some("remove the annotation, or move this expression into a position with an expected type".to_string())
        }
        _ => None,
    }
}

/// Append-only collector of diagnostics. A fresh instance is created per
/// analysis; there is no shared mutable state across invocations.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, span: Span) {
        self.diagnostics.push(Diagnostic::new(kind, span));
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
