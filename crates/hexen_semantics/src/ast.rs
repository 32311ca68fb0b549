//! Input tree shapes.
//!
//! The semantic core does not parse; it consumes a tree built by an external
//! front-end (a PEG/CFG parser, per the external-interfaces contract) and
//! decorates it in place. Every [`Expr`] carries a `resolved_type` slot that
//! starts `None` and is written exactly once by the analyzer that visits it —
//! this is where "the same tree decorated with a resolved type per expression
//! node" (the crate's output contract) actually lives.

use hexen_base::Span;

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    FloatDiv,
    IntDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// An expression node. `resolved_type` is the decoration the analyzer adds.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub resolved_type: Option<Type>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    StringLiteral(String),
    Identifier(String),
    Paren(Box<Expr>),
    /// `expr : T` — an acknowledgment of a precision-losing coercion.
    TypeAnnotated(Box<Expr>, Type),
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnOp, operand: Box<Expr> },
    Call { callee: String, args: Vec<Expr> },
    ArrayLiteral(Vec<Expr>),
    Index { base: Box<Expr>, index: Box<Expr> },
    /// `base[..]` — an explicit array copy.
    ArrayCopy(Box<Expr>),
    /// `base.length`.
    Length(Box<Expr>),
    Block(Box<Block>),
    Conditional(Box<Conditional>),
    ForLoop(Box<ForExpr>),
    Undef,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span, resolved_type: None }
    }

    pub fn int(n: i64, span: Span) -> Self {
        Self::new(ExprKind::IntLiteral(n), span)
    }

    pub fn float(x: f64, span: Span) -> Self {
        Self::new(ExprKind::FloatLiteral(x), span)
    }

    pub fn boolean(b: bool, span: Span) -> Self {
        Self::new(ExprKind::BoolLiteral(b), span)
    }

    pub fn string(s: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::StringLiteral(s.into()), span)
    }

    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Identifier(name.into()), span)
    }

    pub fn annotated(expr: Expr, ty: Type, span: Span) -> Self {
        Self::new(ExprKind::TypeAnnotated(Box::new(expr), ty), span)
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr, span: Span) -> Self {
        Self::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, span)
    }

    pub fn unary(op: UnOp, operand: Expr, span: Span) -> Self {
        Self::new(ExprKind::Unary { op, operand: Box::new(operand) }, span)
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>, span: Span) -> Self {
        Self::new(ExprKind::Call { callee: callee.into(), args }, span)
    }

    pub fn array_literal(elements: Vec<Expr>, span: Span) -> Self {
        Self::new(ExprKind::ArrayLiteral(elements), span)
    }

    pub fn index(base: Expr, index: Expr, span: Span) -> Self {
        Self::new(ExprKind::Index { base: Box::new(base), index: Box::new(index) }, span)
    }

    pub fn array_copy(base: Expr, span: Span) -> Self {
        Self::new(ExprKind::ArrayCopy(Box::new(base)), span)
    }

    pub fn length(base: Expr, span: Span) -> Self {
        Self::new(ExprKind::Length(Box::new(base)), span)
    }

    pub fn block(block: Block, span: Span) -> Self {
        Self::new(ExprKind::Block(Box::new(block)), span)
    }

    pub fn conditional(cond: Conditional, span: Span) -> Self {
        Self::new(ExprKind::Conditional(Box::new(cond)), span)
    }

    pub fn for_loop(expr: ForExpr, span: Span) -> Self {
        Self::new(ExprKind::ForLoop(Box::new(expr)), span)
    }

    pub fn undef(span: Span) -> Self {
        Self::new(ExprKind::Undef, span)
    }
}

/// A block's terminator: the dual-capability contract (§4.7). `Assign`
/// contributes the block's value; `Return` bypasses it and exits the
/// enclosing function. A single expression block may contain several early
/// `Return`s on conditional paths plus one fall-through `Assign`.
#[derive(Debug, Clone)]
pub enum Terminator {
    Assign(Expr),
    Return(Option<Expr>),
}

/// A statement or expression block. A statement block simply has no
/// terminator; an expression block's terminator supplies its value.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub terminator: Option<Terminator>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Block { stmts, terminator: None }
    }

    pub fn with_terminator(stmts: Vec<Stmt>, terminator: Terminator) -> Self {
        Block { stmts, terminator: Some(terminator) }
    }

    pub fn is_expression_block(&self) -> bool {
        self.terminator.is_some()
    }

    /// The span of the terminator's expression, if it carries one (`return`
    /// without a value does not).
    pub fn terminator_span(&self) -> Option<Span> {
        match &self.terminator {
            Some(Terminator::Assign(e)) => Some(e.span),
            Some(Terminator::Return(Some(e))) => Some(e.span),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Else {
    Block(Block),
    If(Box<Conditional>),
}

#[derive(Debug, Clone)]
pub struct Conditional {
    pub cond: Box<Expr>,
    pub then_branch: Block,
    pub else_branch: Option<Else>,
}

/// The source a `for` loop iterates over.
#[derive(Debug, Clone)]
pub enum ForSource {
    /// `a..b`, an exclusive range.
    Range(Box<Expr>, Box<Expr>),
    /// Iteration over an array-valued expression.
    Array(Box<Expr>),
}

/// `for`/`while`, statement form: the body is a plain statement block.
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub var: String,
    pub var_type: Option<Type>,
    pub source: ForSource,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for`, expression form: requires an outer array target type; the body is
/// an expression block whose terminators are `->` (yield an element),
/// `continue` (skip), or `break` (stop early).
#[derive(Debug, Clone)]
pub struct ForExpr {
    pub var: String,
    pub var_type: Option<Type>,
    pub source: ForSource,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Val { name: String, declared_type: Option<Type>, value: Expr, span: Span },
    /// `mut name : T = expr` or `mut name : T = undef` (`value.kind` is
    /// [`ExprKind::Undef`] in the latter case).
    Mut { name: String, declared_type: Option<Type>, value: Expr, span: Span },
    Assign { name: String, value: Expr, span: Span },
    Return(Option<Expr>, Span),
    Block(Block, Span),
    For(ForStmt),
    While(WhileStmt),
    Labeled { label: String, stmt: Box<Stmt>, span: Span },
    Break { label: Option<String>, span: Span },
    Continue { label: Option<String>, span: Span },
    /// An expression evaluated for its side effect and discarded (a bare
    /// call, or a conditional/loop expression used as a statement).
    Expr(Expr, Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Val { span, .. }
            | Stmt::Mut { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::Return(_, span)
            | Stmt::Block(_, span)
            | Stmt::Labeled { span, .. }
            | Stmt::Break { span, .. }
            | Stmt::Continue { span, .. }
            | Stmt::Expr(_, span) => *span,
            Stmt::For(f) => f.span,
            Stmt::While(w) => w.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub functions: Vec<Function>,
}
