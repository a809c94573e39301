//! External collaborator contracts for call-site classification.
//!
//! The core does not parse source or resolve symbols. The host front-end owns
//! semantic name/type resolution and answers a small set of questions through
//! the [`SymbolOracle`] trait: what known method signature a call resolves to,
//! and whether an argument's static type is a value type. Parameter-level
//! "validates its argument is not null" contract metadata rides along on the
//! resolved signature.
//!
//! All oracle answers must be deterministic for a fixed input — the engine
//! deduplicates states structurally, and a flapping oracle would make
//! identical paths diverge.

use crate::observers::SiteId;

/// Driver-built description of one call instruction.
///
/// This is everything the core needs to know about the call *expression*
/// itself; what the callee resolves to comes from the oracle, and the operand
/// values come off the evaluation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Site identity, threaded into events and violations.
    pub site: SiteId,

    /// Number of argument expressions evaluated onto the stack.
    ///
    /// Does not count the receiver / static-call marker, which is always
    /// pushed below the arguments.
    pub arg_count: usize,

    /// `true` for `nameof`-shape expressions.
    ///
    /// These are identified structurally by the front-end: their arguments
    /// are compile-time-only and were never evaluated onto the stack, so the
    /// call classifies without consulting the oracle and pops nothing.
    pub is_nameof: bool,
}

impl CallSite {
    /// Creates a call-site description for an ordinary call.
    #[must_use]
    pub const fn new(site: SiteId, arg_count: usize) -> Self {
        Self {
            site,
            arg_count,
            is_nameof: false,
        }
    }

    /// Creates a call-site description for a `nameof`-shape expression.
    #[must_use]
    pub const fn nameof(site: SiteId) -> Self {
        Self {
            site,
            arg_count: 0,
            is_nameof: true,
        }
    }
}

/// Declaring-type classification of a resolved callee.
///
/// The call-site rules only care about two well-known declaring types; every
/// other type is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownType {
    /// `System.Object`.
    Object,
    /// `System.String`.
    String,
    /// Any other declaring type.
    Other,
}

/// Contract metadata for one formal parameter of a resolved callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParamInfo {
    /// `true` if the parameter carries a "validates its argument is not
    /// null" contract: when the call returns normally, the argument is
    /// guaranteed non-null.
    pub validates_not_null: bool,
}

impl ParamInfo {
    /// A plain parameter with no contracts.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            validates_not_null: false,
        }
    }

    /// A parameter whose argument is validated non-null.
    #[must_use]
    pub const fn validated_not_null() -> Self {
        Self {
            validates_not_null: true,
        }
    }
}

/// A resolved method signature, as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    /// Declaring-type classification.
    pub declaring: KnownType,
    /// Simple method name (`Equals`, `ReferenceEquals`, ...).
    pub name: String,
    /// `true` for static methods (callers push a static-call marker instead
    /// of a receiver).
    pub is_static: bool,
    /// Formal parameters, in declaration order.
    pub params: Vec<ParamInfo>,
}

impl MethodSig {
    /// Creates a signature with plain (contract-free) parameters.
    #[must_use]
    pub fn new(
        declaring: KnownType,
        name: impl Into<String>,
        is_static: bool,
        param_count: usize,
    ) -> Self {
        Self {
            declaring,
            name: name.into(),
            is_static,
            params: vec![ParamInfo::plain(); param_count],
        }
    }

    /// Index of the first parameter flagged `validates_not_null`, if any.
    #[must_use]
    pub fn first_validated_param(&self) -> Option<usize> {
        self.params.iter().position(|p| p.validates_not_null)
    }
}

/// Symbol and type oracle supplied by the host front-end.
///
/// Implementations must be deterministic: the same call site and argument
/// index always yield the same answers within one analysis.
pub trait SymbolOracle {
    /// Resolves the callee of `call` to a known method signature.
    ///
    /// `None` means the callee is unknown or unresolved; the call then takes
    /// the generic opaque-result transition.
    fn resolve(&self, call: &CallSite) -> Option<MethodSig>;

    /// Returns `true` if the static type of argument `index` of `call` is a
    /// value type.
    ///
    /// Consulted by the reference-equality rules: a boxed value-type operand
    /// can never be reference-identical to anything.
    fn argument_is_value_type(&self, call: &CallSite, index: usize) -> bool;
}
