//! # Gallium front-end
//!
//! The front and middle end of the Gallium compiler: everything between a
//! parsed syntax tree and a back-end code generator.
//!
//! ```text
//! Parser  →  Name Resolution  →  Type Checking  →  Mangling  →  Back end
//!  (AST)      (qualified AST)     (typed AST)     (symbols)    (LLVM, ...)
//! ```
//!
//! The parser hands over a [`ast::Program`]; [`driver::analyze`] runs the
//! passes over it in place. The resolver binds every identifier to a
//! declaration and rewrites unqualified nodes into qualified ones, the
//! type checker annotates every expression with its result type and
//! inserts implicit conversions, and the mangler stamps each function and
//! constant with its deterministic linker symbol. The finished tree
//! satisfies the contract in [`backend`].
//!
//! Errors never unwind: each pass reports coded diagnostics through a
//! [`diagnostics::DiagnosticReporter`], substitutes error nodes and keeps
//! going, so one mistake yields one message.

pub mod ast;
pub mod backend;
pub mod diagnostics;
pub mod driver;
pub mod mangler;
pub mod predefined;
pub mod resolver;
pub mod typechecker;

pub use driver::analyze;
