//! Call-site semantics for symbolic execution.
//!
//! A method call is the one instruction shape where the engine can be much
//! smarter than "pop everything, push unknown". This module turns recognized
//! calls — equality and identity comparisons, string null checks,
//! validates-not-null contracts, `nameof`-shape queries — into precise state
//! transitions, and leaves everything else on the generic opaque fallback.
//!
//! # Architecture
//!
//! The module is organized into focused sub-modules:
//!
//! - [`oracle`] - collaborator contracts the host front-end implements:
//!   [`SymbolOracle`], [`CallSite`], [`MethodSig`], parameter metadata
//! - [`classify`] - the closed [`CallPattern`] classification of a call site
//! - [`visitor`] - the [`InvocationVisitor`] that executes one exhaustive
//!   transition per pattern
//!
//! # Usage
//!
//! ```rust,ignore
//! use symscope::invocation::{CallSite, InvocationVisitor};
//!
//! let mut visitor = InvocationVisitor::new(&mut arena, &oracle, &observers);
//! match visitor.visit(&state, &call, &mut sink)? {
//!     Transition::Next(successor) => explore(successor),
//!     Transition::Infeasible => drop_path(),
//! }
//! ```

pub mod classify;
pub mod oracle;
pub mod visitor;

pub use classify::{classify, CallPattern};
pub use oracle::{CallSite, KnownType, MethodSig, ParamInfo, SymbolOracle};
pub use visitor::InvocationVisitor;
