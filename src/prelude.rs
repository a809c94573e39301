//! # symscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the symscope library. Import this module to get quick
//! access to the essential types for driving a symbolic execution over a
//! method.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all symscope operations
pub use crate::Error;

/// The result type used throughout symscope
pub use crate::Result;

// ================================================================================================
// Symbolic Values
// ================================================================================================

/// Symbolic value identity, kinds, and the per-method arena
pub use crate::values::{MemberId, SymbolicValueId, SymbolicValueKind, ValueArena};

// ================================================================================================
// Constraints
// ================================================================================================

/// Constraint domains and tags
pub use crate::constraints::{Constraint, ConstraintDomain};

// ================================================================================================
// Program State
// ================================================================================================

/// Immutable program state and transformation outcomes
pub use crate::state::{ProgramState, SetOutcome, Transition};

// ================================================================================================
// Observers and Reporting
// ================================================================================================

/// Constraint-assignment events, observers, and the violation channel
pub use crate::observers::{
    ConstraintEvent, ConstraintObserver, ObserverRegistry, RedundantDisposeObserver, ReportSink,
    SiteId, Violation,
};

// ================================================================================================
// Call-Site Semantics
// ================================================================================================

/// Call classification and the invocation visitor
pub use crate::invocation::{
    classify, CallPattern, CallSite, InvocationVisitor, KnownType, MethodSig, ParamInfo,
    SymbolOracle,
};
