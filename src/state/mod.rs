//! Immutable program state for symbolic execution.
//!
//! A [`ProgramState`] is one snapshot of the abstract machine at one point on
//! one execution path: an evaluation stack of symbolic value ids plus a store
//! of the constraint tags currently known to hold for those values. States are
//! never mutated — every operation returns a new state and leaves the receiver
//! untouched, which lets the external exploration driver share states freely
//! between paths (and between worker threads) without coordination.
//!
//! # Structural Equality
//!
//! The driver deduplicates paths by comparing states, so `ProgramState`
//! implements structural `Eq` and `Hash` over exactly its stack and constraint
//! store. The store is a `BTreeMap` keyed by value id, making equality and
//! hashing deterministic regardless of the order in which constraints were
//! added. There are no hidden counters or timestamps: two states produced by
//! the same operations on the same inputs are identical.
//!
//! # Stack Discipline
//!
//! The stack reflects evaluation order and is popped strictly LIFO. Popping
//! more values than are present is a framework fault
//! ([`Error::StackUnderflow`]) — it means the caller's instruction/stack-effect
//! mapping is inconsistent, and the current path must be abandoned rather than
//! patched.
//!
//! # Constraint Assignment
//!
//! [`ProgramState::set_constraint`] is the pure half of constraint assignment:
//! it reports whether the tag was applied, already held, or contradicts the
//! store via [`SetOutcome`], and never broadcasts events. The evented half —
//! observer notification and infeasibility mapping — lives in
//! [`ObserverRegistry::assign`](crate::observers::ObserverRegistry::assign).

use std::collections::BTreeMap;

use strum::EnumCount;

use crate::{
    constraints::{Constraint, ConstraintDomain},
    values::{SymbolicValueId, ValueArena},
    Error, Result,
};

/// At most one tag per domain, stored in a fixed slot per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct ConstraintSet {
    slots: [Option<Constraint>; ConstraintDomain::COUNT],
}

impl ConstraintSet {
    fn get(&self, domain: ConstraintDomain) -> Option<Constraint> {
        self.slots[domain.slot()]
    }

    fn set(&mut self, tag: Constraint) {
        self.slots[tag.domain().slot()] = Some(tag);
    }

    fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Outcome of a pure constraint assignment on a [`ProgramState`].
///
/// Contradictions are expected and routine during exploration — they mark the
/// path as infeasible — so they are modeled as a value, not as an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The tag was added; the successor state holds it.
    Applied(ProgramState),

    /// The value already held exactly this tag; the state is unchanged.
    ///
    /// Callers that broadcast assignment events must still emit one for this
    /// outcome: re-assertion is precisely what the redundant-dispose rule
    /// detects.
    AlreadyHeld,

    /// The value holds a different tag of the same domain.
    ///
    /// The accumulated constraints on this path are mutually contradictory,
    /// so the path cannot occur at runtime and should be dropped.
    Contradiction,
}

impl SetOutcome {
    /// Returns the successor state if the tag was newly applied.
    #[must_use]
    pub fn applied(self) -> Option<ProgramState> {
        match self {
            Self::Applied(state) => Some(state),
            Self::AlreadyHeld | Self::Contradiction => None,
        }
    }
}

/// Typed outcome of one evented state transformation.
///
/// Distinguishes a successor state from an infeasible path. Faults
/// (stack underflow) travel separately as [`Error`], giving the driver the
/// full success / infeasible / fault triage of one transformation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The transformation produced a successor state.
    Next(ProgramState),

    /// The transformation proved the path infeasible; there is no successor.
    Infeasible,
}

impl Transition {
    /// Returns the successor state, if the path is feasible.
    #[must_use]
    pub fn state(&self) -> Option<&ProgramState> {
        match self {
            Self::Next(state) => Some(state),
            Self::Infeasible => None,
        }
    }

    /// Consumes the transition, returning the successor state if any.
    #[must_use]
    pub fn into_state(self) -> Option<ProgramState> {
        match self {
            Self::Next(state) => Some(state),
            Self::Infeasible => None,
        }
    }

    /// Returns `true` if the path was proven infeasible.
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }
}

/// Immutable snapshot of the abstract machine on one execution path.
///
/// # Examples
///
/// ```rust
/// use symscope::constraints::Constraint;
/// use symscope::state::{ProgramState, SetOutcome};
/// use symscope::values::ValueArena;
///
/// let mut arena = ValueArena::new();
/// let v = arena.fresh();
///
/// let s0 = ProgramState::entry();
/// let s1 = s0.push_value(v);
/// let s2 = match s1.set_constraint(v, Constraint::NotNull) {
///     SetOutcome::Applied(next) => next,
///     other => panic!("unexpected outcome: {other:?}"),
/// };
///
/// assert!(s2.has_constraint(v, Constraint::NotNull));
/// assert!(!s1.has_constraint(v, Constraint::NotNull)); // s1 unchanged
/// let (s3, popped) = s2.pop_value().unwrap();
/// assert_eq!(popped, v);
/// assert!(s3.stack_is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ProgramState {
    stack: Vec<SymbolicValueId>,
    constraints: BTreeMap<SymbolicValueId, ConstraintSet>,
}

impl ProgramState {
    /// Creates an empty state: no stack entries, no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the method-entry state.
    ///
    /// The canonical constants are born constrained: [`ValueArena::NULL`]
    /// holds [`Constraint::Null`] and [`ValueArena::THIS`] holds
    /// [`Constraint::NotNull`]. These facts are part of construction, not
    /// assignments, so no events are emitted for them.
    #[must_use]
    pub fn entry() -> Self {
        let mut state = Self::new();
        state
            .constraints
            .entry(ValueArena::NULL)
            .or_default()
            .set(Constraint::Null);
        state
            .constraints
            .entry(ValueArena::THIS)
            .or_default()
            .set(Constraint::NotNull);
        state
    }

    /// Pushes a value onto the evaluation stack, returning the new state.
    #[must_use]
    pub fn push_value(&self, value: SymbolicValueId) -> Self {
        let mut next = self.clone();
        next.stack.push(value);
        next
    }

    /// Pops the top of the evaluation stack.
    ///
    /// # Errors
    ///
    /// [`Error::StackUnderflow`] if the stack is empty. An underflow means
    /// the caller's stack-effect bookkeeping is inconsistent with the state;
    /// the current path must be abandoned.
    pub fn pop_value(&self) -> Result<(Self, SymbolicValueId)> {
        let mut next = self.clone();
        match next.stack.pop() {
            Some(value) => Ok((next, value)),
            None => Err(Error::StackUnderflow {
                requested: 1,
                available: 0,
            }),
        }
    }

    /// Pops exactly `count` values, top of stack first.
    ///
    /// # Errors
    ///
    /// [`Error::StackUnderflow`] if fewer than `count` values are present.
    pub fn pop_values(&self, count: usize) -> Result<(Self, Vec<SymbolicValueId>)> {
        if self.stack.len() < count {
            return Err(Error::StackUnderflow {
                requested: count,
                available: self.stack.len(),
            });
        }

        let mut next = self.clone();
        let mut popped = Vec::with_capacity(count);
        for _ in 0..count {
            // Length was checked above.
            if let Some(value) = next.stack.pop() {
                popped.push(value);
            }
        }
        Ok((next, popped))
    }

    /// Returns the top of the evaluation stack without popping it.
    #[must_use]
    pub fn peek(&self) -> Option<SymbolicValueId> {
        self.stack.last().copied()
    }

    /// Current depth of the evaluation stack.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if the evaluation stack is empty.
    #[must_use]
    pub fn stack_is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Checks whether `value` currently holds exactly `tag`.
    #[must_use]
    pub fn has_constraint(&self, value: SymbolicValueId, tag: Constraint) -> bool {
        self.constraint(value, tag.domain()) == Some(tag)
    }

    /// Returns the tag `value` holds in `domain`, if any.
    #[must_use]
    pub fn constraint(&self, value: SymbolicValueId, domain: ConstraintDomain) -> Option<Constraint> {
        self.constraints.get(&value).and_then(|set| set.get(domain))
    }

    /// Attempts to record `tag` for `value`.
    ///
    /// Per-domain exclusivity decides the outcome:
    ///
    /// - no tag held in the domain → [`SetOutcome::Applied`] with the
    ///   successor state;
    /// - exactly this tag held → [`SetOutcome::AlreadyHeld`] (no new state;
    ///   evented callers still broadcast the assignment);
    /// - a different tag of the domain held → [`SetOutcome::Contradiction`]
    ///   (infeasible path; there is no successor to produce).
    #[must_use]
    pub fn set_constraint(&self, value: SymbolicValueId, tag: Constraint) -> SetOutcome {
        match self.constraint(value, tag.domain()) {
            Some(held) if held == tag => SetOutcome::AlreadyHeld,
            Some(_) => SetOutcome::Contradiction,
            None => {
                let mut next = self.clone();
                next.constraints.entry(value).or_default().set(tag);
                SetOutcome::Applied(next)
            }
        }
    }

    /// Number of values with at least one recorded constraint.
    #[must_use]
    pub fn constrained_value_count(&self) -> usize {
        self.constraints.values().filter(|set| !set.is_empty()).count()
    }
}
