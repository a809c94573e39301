//! Constraint observers and the violation report channel.
//!
//! Observers are stateless rules that watch the stream of "constraint being
//! assigned" events and emit a violation report when a logically meaningful
//! pattern occurs. They are pure readers: an observer never alters a state,
//! never vetoes an assignment, and never affects the analysis result — its
//! only output is the side-channel report stream consumed by the surrounding
//! tool's diagnostic layer.
//!
//! # Broadcast Model
//!
//! There is exactly one producer per path and the core is single-threaded per
//! path, so broadcasting is a plain synchronous callback list:
//! [`ObserverRegistry::assign`] performs the pure
//! [`set_constraint`](crate::state::ProgramState::set_constraint), then hands
//! the [`ConstraintEvent`] to every registered observer before the caller
//! commits to the successor state. Registration order is not significant;
//! observers evaluate independently.
//!
//! Events are emitted both when a tag is newly applied and when an identical
//! tag is re-asserted. The re-assertion case is load-bearing: the
//! [`RedundantDisposeObserver`] detects a double dispose precisely by seeing
//! `Disposed` assigned to a value whose pre-assignment state already held it.
//! Contradictory assignments emit no event — nothing is committed and the
//! path is dropped as infeasible.

use crate::{
    constraints::Constraint,
    state::{ProgramState, SetOutcome, Transition},
    values::SymbolicValueId,
};

use std::fmt;

/// Opaque identity of one instruction site, assigned by the host front-end.
///
/// The core threads site identities through events and violations so the
/// reporting layer can anchor diagnostics; it never interprets them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiteId(u32);

impl SiteId {
    /// Creates a site identity from a host-assigned index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the host-assigned index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site{}", self.0)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site{}", self.0)
    }
}

/// One constraint-assignment event, delivered to observers before commit.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEvent<'a> {
    /// The value the tag is being assigned to.
    pub value: SymbolicValueId,
    /// The tag being assigned.
    pub constraint: Constraint,
    /// The instruction site performing the assignment.
    pub site: SiteId,
    /// The state *before* the assignment is committed.
    ///
    /// Rules that care about re-assertion inspect this state: if it already
    /// holds the assigned tag, the event is a re-assertion, not new knowledge.
    pub state: &'a ProgramState,
}

/// A report emitted by an observer: (value, tag, site).
///
/// How violations become user-facing diagnostics — message text, severity,
/// source mapping — is the surrounding tool's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// The value the finding is about.
    pub value: SymbolicValueId,
    /// The tag whose assignment triggered the finding.
    pub constraint: Constraint,
    /// The instruction site the finding anchors to.
    pub site: SiteId,
}

/// Receiver for violation reports.
///
/// Implemented by whatever the embedder uses to collect findings. For tests
/// and simple embedders, `Vec<Violation>` implements this directly.
pub trait ReportSink {
    /// Records one violation.
    fn report(&mut self, violation: Violation);
}

impl ReportSink for Vec<Violation> {
    fn report(&mut self, violation: Violation) {
        self.push(violation);
    }
}

/// A stateless rule over constraint-assignment events.
///
/// Implementations must be read-only with respect to analysis state: they may
/// inspect the event and its pre-assignment state and write to the sink,
/// nothing else. The analysis result must be identical with or without any
/// observer attached.
pub trait ConstraintObserver {
    /// Inspects one assignment event, reporting to `sink` if a rule fires.
    fn on_assignment(&self, event: &ConstraintEvent<'_>, sink: &mut dyn ReportSink);
}

/// Synchronous broadcast list of observers, and the evented assignment entry
/// point.
///
/// # Examples
///
/// ```rust
/// use symscope::constraints::Constraint;
/// use symscope::observers::{ObserverRegistry, RedundantDisposeObserver, SiteId, Violation};
/// use symscope::state::{ProgramState, Transition};
/// use symscope::values::ValueArena;
///
/// let mut arena = ValueArena::new();
/// let handle = arena.fresh();
///
/// let mut observers = ObserverRegistry::new();
/// observers.register(RedundantDisposeObserver);
///
/// let mut reports: Vec<Violation> = Vec::new();
/// let state = ProgramState::entry();
///
/// // First dispose: applied, no finding.
/// let state = observers
///     .assign(&state, handle, Constraint::Disposed, SiteId::new(1), &mut reports)
///     .into_state()
///     .unwrap();
/// assert!(reports.is_empty());
///
/// // Second dispose: re-assertion, one finding.
/// let next = observers.assign(&state, handle, Constraint::Disposed, SiteId::new(2), &mut reports);
/// assert!(matches!(next, Transition::Next(_)));
/// assert_eq!(reports.len(), 1);
/// ```
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Box<dyn ConstraintObserver>>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. Order of registration is not significant.
    pub fn register<O>(&mut self, observer: O)
    where
        O: ConstraintObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if no observers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Assigns `tag` to `value` in `state`, broadcasting the event.
    ///
    /// The event is delivered to every observer against the pre-assignment
    /// state, for newly applied tags and for re-assertions alike. A
    /// contradicting tag yields [`Transition::Infeasible`] and no event —
    /// nothing was committed.
    pub fn assign(
        &self,
        state: &ProgramState,
        value: SymbolicValueId,
        tag: Constraint,
        site: SiteId,
        sink: &mut dyn ReportSink,
    ) -> Transition {
        let outcome = state.set_constraint(value, tag);
        let next = match outcome {
            SetOutcome::Applied(next) => next,
            SetOutcome::AlreadyHeld => state.clone(),
            SetOutcome::Contradiction => return Transition::Infeasible,
        };

        let event = ConstraintEvent {
            value,
            constraint: tag,
            site,
            state,
        };
        for observer in &self.observers {
            observer.on_assignment(&event, sink);
        }

        Transition::Next(next)
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Reports a dispose of an already-disposed value.
///
/// Fires on every event that assigns [`Constraint::Disposed`] to a value whose
/// pre-assignment state already holds `Disposed`: the release is provably
/// redundant, which is the feed for a double-dispose diagnostic. One report
/// per re-assertion — repeat offenses at distinct sites each get their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedundantDisposeObserver;

impl ConstraintObserver for RedundantDisposeObserver {
    fn on_assignment(&self, event: &ConstraintEvent<'_>, sink: &mut dyn ReportSink) {
        if event.constraint == Constraint::Disposed
            && event.state.has_constraint(event.value, Constraint::Disposed)
        {
            sink.report(Violation {
                value: event.value,
                constraint: event.constraint,
                site: event.site,
            });
        }
    }
}
