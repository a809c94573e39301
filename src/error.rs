use thiserror::Error;

/// The generic Error type, which provides coverage for all faults this library
/// can potentially return.
///
/// Faults are strictly distinguished from expected analysis outcomes. An
/// infeasible path — an attempted constraint assignment that contradicts the
/// store — is routine during exploration and is modeled as a value
/// ([`Transition::Infeasible`]), never as an `Error`. An unrecognized call is
/// not an error either; it takes the generic opaque-result transition. What
/// remains here is genuine misuse of the core: conditions that mean the
/// caller's bookkeeping is wrong and the current path must be abandoned.
///
/// [`Transition::Infeasible`]: crate::state::Transition::Infeasible
#[derive(Error, Debug)]
pub enum Error {
    /// A pop requested more values than the evaluation stack holds.
    ///
    /// This is a framework-level fault: the driver's instruction/stack-effect
    /// mapping is inconsistent with the state it supplied. The result of the
    /// current transformation must be discarded — sibling states are
    /// unaffected, and whether to log or halt the enclosing method's
    /// exploration is the driver's decision.
    ///
    /// # Fields
    ///
    /// * `requested` - Number of values the operation tried to pop
    /// * `available` - Number of values actually on the stack
    #[error("evaluation stack underflow - requested {requested}, available {available}")]
    StackUnderflow {
        /// Number of values the operation tried to pop.
        requested: usize,
        /// Number of values actually on the stack.
        available: usize,
    },
}
