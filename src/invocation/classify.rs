//! Closed classification of call sites into recognized patterns.
//!
//! The engine special-cases a fixed catalogue of well-known method shapes.
//! Instead of a chain of predicate checks scattered through the transition
//! code, classification happens once, up front, producing a single
//! [`CallPattern`] variant; the visitor then runs one exhaustive `match` over
//! it. The compiler checks totality — adding a pattern without handling its
//! transition is a build error, not a silent fall-through to the generic
//! case.
//!
//! Patterns are mutually exclusive by construction: the classifier returns
//! the first (and only) shape a resolved signature can take, and everything
//! unrecognized lands in [`CallPattern::Unknown`] — which is a normal,
//! non-error outcome.

use crate::invocation::oracle::{CallSite, KnownType, MethodSig, SymbolOracle};

/// Which recognized shape a call site matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPattern {
    /// `nameof`-shape metadata query; structural, arguments never on stack.
    Nameof,

    /// Instance value-equality call: `a.Equals(b)` shape — non-static,
    /// exactly one parameter.
    InstanceEquals,

    /// Static value-equality call: `Object.Equals(a, b)` shape.
    StaticEquals,

    /// Identity comparison: `Object.ReferenceEquals(a, b)` shape.
    ReferenceEquals,

    /// String null/blank check: static `String.IsNullOrEmpty` /
    /// `String.IsNullOrWhiteSpace` with one parameter.
    StringNullCheck,

    /// Call with a parameter carrying a validates-not-null contract.
    NotNullValidation {
        /// Index of the validated formal parameter.
        param: usize,
    },

    /// No recognized shape; takes the generic opaque-result transition.
    Unknown,
}

/// Classifies one call site against the recognized shapes.
///
/// `nameof`-shape calls classify structurally, without consulting the oracle.
/// Everything else requires a resolved signature; unresolved callees are
/// [`CallPattern::Unknown`].
pub fn classify<O>(call: &CallSite, oracle: &O) -> CallPattern
where
    O: SymbolOracle + ?Sized,
{
    if call.is_nameof {
        return CallPattern::Nameof;
    }

    let Some(sig) = oracle.resolve(call) else {
        return CallPattern::Unknown;
    };

    classify_signature(&sig)
}

fn classify_signature(sig: &MethodSig) -> CallPattern {
    if !sig.is_static && sig.name == "Equals" && sig.params.len() == 1 {
        return CallPattern::InstanceEquals;
    }

    if sig.is_static && sig.declaring == KnownType::Object && sig.params.len() == 2 {
        match sig.name.as_str() {
            "Equals" => return CallPattern::StaticEquals,
            "ReferenceEquals" => return CallPattern::ReferenceEquals,
            _ => {}
        }
    }

    if sig.is_static
        && sig.declaring == KnownType::String
        && sig.params.len() == 1
        && matches!(sig.name.as_str(), "IsNullOrEmpty" | "IsNullOrWhiteSpace")
    {
        return CallPattern::StringNullCheck;
    }

    if let Some(param) = sig.first_validated_param() {
        return CallPattern::NotNullValidation { param };
    }

    CallPattern::Unknown
}
