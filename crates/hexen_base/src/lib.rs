#![cfg_attr(docsrs, feature(doc_cfg))]

//! # hexen-base
//!
//! Pure structural atoms for the Hexen semantic core.
//!
//! This crate provides the foundational types shared by every analyzer:
//!
//! - [`Interner`]/[`Ident`] — string interning for O(1) equality
//! - [`Span`] — source location tracking
//!
//! # Design Principles
//!
//! This crate has **no knowledge of Hexen's type system or grammar**. It
//! provides only generic, reusable infrastructure that the semantic analyzers
//! build upon; nothing here can emit a diagnostic or reject a program.
//!
//! # Example
//!
//! ```
//! use hexen_base::{Interner, Span};
//!
//! let mut interner = Interner::new();
//! let name = interner.intern("total");
//! let span = Span::new(0, 5);
//! assert_eq!(interner.resolve(name), "total");
//! assert_eq!(span.len(), 5);
//! ```

pub mod intern;
pub mod span;

pub use intern::{Ident, IdentEq, Interner};
pub use span::Span;
