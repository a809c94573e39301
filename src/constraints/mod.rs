//! Constraint lattice framework for symbolic execution.
//!
//! A constraint is a tag drawn from exactly one *constraint domain*: a closed
//! set of mutually exclusive facts along one axis of knowledge about a
//! symbolic value. The engine proves properties by accumulating tags in a
//! [`ProgramState`](crate::state::ProgramState) and detecting when an
//! attempted assignment contradicts what is already known.
//!
//! # Domains
//!
//! | Domain | Tags | Exclusivity |
//! |--------|------|-------------|
//! | [`ConstraintDomain::Object`] | `Null`, `NotNull` | mutually exclusive |
//! | [`ConstraintDomain::Boolean`] | `True`, `False` | mutually exclusive |
//! | [`ConstraintDomain::Disposable`] | `Disposed` | presence/absence |
//!
//! A symbolic value holds at most one tag per domain. Within a mutually
//! exclusive domain, assigning a different tag than the one held is a
//! contradiction — the signal that the current path is infeasible. The
//! `Disposable` domain has a single tag, so it can never contradict; its
//! interesting transition is *re-assertion*, which the redundant-dispose
//! observer keys off (see [`crate::observers`]).
//!
//! Domains carry no behavior beyond identity and exclusivity. Merging at
//! control-flow joins is the concern of the external exploration driver,
//! which deduplicates structurally equal states instead of joining tags.

use strum::{Display, EnumCount, EnumIter};

/// One axis of knowledge about a symbolic value.
///
/// The set of domains is closed: the engine's transition rules only ever
/// produce tags from these three. The framework itself is shaped so that a
/// new domain is one new variant here plus its tags in [`Constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum ConstraintDomain {
    /// Reference nullability.
    Object,
    /// Known boolean result of a comparison.
    Boolean,
    /// Released-handle tracking.
    Disposable,
}

impl ConstraintDomain {
    /// Returns the storage slot index of this domain.
    ///
    /// [`ProgramState`](crate::state::ProgramState) stores at most one tag
    /// per domain in a fixed-size slot array indexed by this value.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }
}

/// A constraint tag: one fact from one domain.
///
/// Tags are plain identity — they have no payload and no behavior beyond
/// knowing their domain and which other tags they exclude.
///
/// # Examples
///
/// ```rust
/// use symscope::constraints::{Constraint, ConstraintDomain};
///
/// assert_eq!(Constraint::Null.domain(), ConstraintDomain::Object);
/// assert!(Constraint::Null.conflicts_with(Constraint::NotNull));
/// assert!(!Constraint::Null.conflicts_with(Constraint::True));
/// assert!(!Constraint::Disposed.conflicts_with(Constraint::Disposed));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Constraint {
    /// The value is the null reference here.
    Null,
    /// The value is a non-null reference here.
    NotNull,
    /// The comparison this value stands for is true here.
    True,
    /// The comparison this value stands for is false here.
    False,
    /// The handle this value stands for was already released.
    Disposed,
}

impl Constraint {
    /// Returns the domain this tag belongs to.
    #[must_use]
    pub const fn domain(self) -> ConstraintDomain {
        match self {
            Self::Null | Self::NotNull => ConstraintDomain::Object,
            Self::True | Self::False => ConstraintDomain::Boolean,
            Self::Disposed => ConstraintDomain::Disposable,
        }
    }

    /// Checks if this tag conflicts with another (both can't hold at once).
    ///
    /// True iff the tags are different members of the same domain. Tags from
    /// different domains never conflict, and a tag never conflicts with
    /// itself — re-asserting a held tag is a no-op at the state level.
    #[must_use]
    pub const fn conflicts_with(self, other: Constraint) -> bool {
        (self.domain() as usize == other.domain() as usize) && (self as usize != other as usize)
    }

    /// Returns the boolean tag for `value`.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}
