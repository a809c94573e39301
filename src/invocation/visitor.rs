//! Call-site semantics: precise state transitions for recognized calls.
//!
//! The default meaning of a call is "pop the receiver (or static-call marker)
//! and every argument, push one fresh opaque result". The
//! [`InvocationVisitor`] rewrites that into a precise transition when the call
//! matches one of the recognized shapes — equality and identity comparisons,
//! string null checks, validates-not-null contracts, and `nameof`-shape
//! metadata queries.
//!
//! Classification happens once per call (see [`classify`]); the visitor then
//! runs a single exhaustive `match` over the resulting [`CallPattern`], so a
//! newly added pattern cannot silently fall through to the generic case.
//!
//! # Stack Protocol
//!
//! Callers evaluate the receiver (instance calls) or push a static-call
//! marker (static calls) first, then each argument left to right, so the last
//! argument is on top. Every transition pops its operands top-down. A pop
//! that underflows is a framework fault ([`Error::StackUnderflow`]) and
//! aborts the path via `Err`; constraint contradictions discovered while
//! applying a transition surface as `Ok(`[`Transition::Infeasible`]`)`.
//!
//! [`Error::StackUnderflow`]: crate::Error::StackUnderflow

use crate::{
    constraints::Constraint,
    invocation::{
        classify::{classify, CallPattern},
        oracle::{CallSite, SymbolOracle},
    },
    observers::{ObserverRegistry, ReportSink},
    state::{ProgramState, Transition},
    values::{SymbolicValueId, ValueArena},
    Result,
};

/// Transforms one incoming state through one call instruction.
///
/// Borrows the per-method [`ValueArena`] (new values are allocated for call
/// results), the host's [`SymbolOracle`], and the [`ObserverRegistry`] every
/// constraint assignment is broadcast through.
///
/// # Examples
///
/// ```rust
/// use symscope::invocation::{CallSite, InvocationVisitor, KnownType, MethodSig, SymbolOracle};
/// use symscope::constraints::Constraint;
/// use symscope::observers::{ObserverRegistry, SiteId, Violation};
/// use symscope::state::ProgramState;
/// use symscope::values::ValueArena;
///
/// struct NullCheckOracle;
/// impl SymbolOracle for NullCheckOracle {
///     fn resolve(&self, _call: &CallSite) -> Option<MethodSig> {
///         Some(MethodSig::new(KnownType::String, "IsNullOrEmpty", true, 1))
///     }
///     fn argument_is_value_type(&self, _call: &CallSite, _index: usize) -> bool {
///         false
///     }
/// }
///
/// let mut arena = ValueArena::new();
/// let marker = arena.fresh();
///
/// let observers = ObserverRegistry::new();
/// let mut reports: Vec<Violation> = Vec::new();
/// let mut visitor = InvocationVisitor::new(&mut arena, &NullCheckOracle, &observers);
///
/// // string.IsNullOrEmpty(null) is provably true.
/// let state = ProgramState::entry()
///     .push_value(marker)
///     .push_value(ValueArena::NULL);
/// let call = CallSite::new(SiteId::new(0), 1);
/// let next = visitor.visit(&state, &call, &mut reports).unwrap();
///
/// let next = next.into_state().unwrap();
/// let result = next.peek().unwrap();
/// assert!(next.has_constraint(result, Constraint::True));
/// ```
pub struct InvocationVisitor<'a, O: SymbolOracle + ?Sized> {
    values: &'a mut ValueArena,
    oracle: &'a O,
    observers: &'a ObserverRegistry,
}

impl<'a, O: SymbolOracle + ?Sized> InvocationVisitor<'a, O> {
    /// Creates a visitor over the given arena, oracle, and observer list.
    pub fn new(
        values: &'a mut ValueArena,
        oracle: &'a O,
        observers: &'a ObserverRegistry,
    ) -> Self {
        Self {
            values,
            oracle,
            observers,
        }
    }

    /// Produces the successor state(s) of `state` through `call`.
    ///
    /// # Errors
    ///
    /// [`Error::StackUnderflow`](crate::Error::StackUnderflow) if the state's
    /// stack holds fewer operands than the call shape requires — a malformed
    /// caller, not a user-code condition. The path must be abandoned.
    pub fn visit(
        &mut self,
        state: &ProgramState,
        call: &CallSite,
        sink: &mut dyn ReportSink,
    ) -> Result<Transition> {
        match classify(call, self.oracle) {
            CallPattern::Nameof => Ok(self.visit_nameof(state, call, sink)),
            CallPattern::InstanceEquals => self.visit_instance_equals(state, call, sink),
            CallPattern::StaticEquals => self.visit_static_equals(state, call, sink),
            CallPattern::ReferenceEquals => self.visit_reference_equals(state, call, sink),
            CallPattern::StringNullCheck => self.visit_string_null_check(state, call, sink),
            CallPattern::NotNullValidation { param } => {
                self.visit_not_null_validation(state, call, param, sink)
            }
            CallPattern::Unknown => self.visit_unknown(state, call),
        }
    }

    /// `a.Equals(b)`: pop argument and receiver, push the derived equality.
    ///
    /// The receiver on the stack is the member-access value for `a.Equals`;
    /// its base is the left operand. An implicit-receiver call (`Equals(b)`)
    /// has no member access, so the canonical `this` stands in.
    fn visit_instance_equals(
        &mut self,
        state: &ProgramState,
        call: &CallSite,
        sink: &mut dyn ReportSink,
    ) -> Result<Transition> {
        let (state, arg) = state.pop_value()?;
        let (state, receiver) = state.pop_value()?;

        let left = self
            .values
            .kind(receiver)
            .member_access_base()
            .unwrap_or(ValueArena::THIS);

        let result = self.values.equals(left, arg);
        let state = state.push_value(result);

        Ok(self.apply_self_equality(state, result, left, arg, call, sink))
    }

    /// `Object.Equals(a, b)`: pop both arguments and the marker, push the
    /// derived equality.
    fn visit_static_equals(
        &mut self,
        state: &ProgramState,
        call: &CallSite,
        sink: &mut dyn ReportSink,
    ) -> Result<Transition> {
        let (state, right) = state.pop_value()?;
        let (state, left) = state.pop_value()?;
        let (state, _marker) = state.pop_value()?;

        let result = self.values.equals(left, right);
        let state = state.push_value(result);

        Ok(self.apply_self_equality(state, result, left, right, call, sink))
    }

    /// Self-equality is always true: same identity on both sides pins the
    /// pushed comparison to `True`.
    fn apply_self_equality(
        &self,
        state: ProgramState,
        result: SymbolicValueId,
        left: SymbolicValueId,
        right: SymbolicValueId,
        call: &CallSite,
        sink: &mut dyn ReportSink,
    ) -> Transition {
        if left == right {
            self.observers
                .assign(&state, result, Constraint::True, call.site, sink)
        } else {
            Transition::Next(state)
        }
    }

    /// `Object.ReferenceEquals(a, b)`: pop both arguments and the marker,
    /// push the derived identity comparison, then pin its boolean result
    /// where the operands prove it.
    fn visit_reference_equals(
        &mut self,
        state: &ProgramState,
        call: &CallSite,
        sink: &mut dyn ReportSink,
    ) -> Result<Transition> {
        let (state, right) = state.pop_value()?;
        let (state, left) = state.pop_value()?;
        let (state, _marker) = state.pop_value()?;

        let result = self.values.reference_equals(left, right);
        let state = state.push_value(result);

        match self.reference_equality_verdict(&state, call, left, Some(0), right, Some(1)) {
            Some(tag) => Ok(self.observers.assign(&state, result, tag, call.site, sink)),
            None => Ok(Transition::Next(state)),
        }
    }

    /// `String.IsNullOrEmpty(s)` / `IsNullOrWhiteSpace(s)`: pop the argument
    /// and the marker, and treat the check as an identity comparison between
    /// the argument and the canonical `null`.
    fn visit_string_null_check(
        &mut self,
        state: &ProgramState,
        call: &CallSite,
        sink: &mut dyn ReportSink,
    ) -> Result<Transition> {
        let (state, arg) = state.pop_value()?;
        let (state, _marker) = state.pop_value()?;

        let result = self.values.reference_equals(arg, ValueArena::NULL);
        let state = state.push_value(result);

        // The null side has no argument position and is never a value type.
        match self.reference_equality_verdict(&state, call, arg, Some(0), ValueArena::NULL, None) {
            Some(tag) => Ok(self.observers.assign(&state, result, tag, call.site, sink)),
            None => Ok(Transition::Next(state)),
        }
    }

    /// The four-rule identity-comparison policy, first match wins:
    ///
    /// 1. both operands hold `Null` → `True`;
    /// 2. either operand is a non-null value type instance, or the operands
    ///    hold opposite nullability → `False`;
    /// 3. same symbolic identity → `True`;
    /// 4. otherwise unconstrained.
    ///
    /// Rule 2 precedes rule 3: a boxed value type is never reference-equal,
    /// even to the syntactically same operand. Nullability comes strictly
    /// from tags already in the store — no deeper inference.
    fn reference_equality_verdict(
        &self,
        state: &ProgramState,
        call: &CallSite,
        left: SymbolicValueId,
        left_arg: Option<usize>,
        right: SymbolicValueId,
        right_arg: Option<usize>,
    ) -> Option<Constraint> {
        let left_null = state.has_constraint(left, Constraint::Null);
        let right_null = state.has_constraint(right, Constraint::Null);
        let left_not_null = state.has_constraint(left, Constraint::NotNull);
        let right_not_null = state.has_constraint(right, Constraint::NotNull);

        if left_null && right_null {
            return Some(Constraint::True);
        }

        let boxed = |arg: Option<usize>, not_null: bool| {
            not_null && arg.is_some_and(|index| self.oracle.argument_is_value_type(call, index))
        };
        let opposite_nullability = (left_null && right_not_null) || (left_not_null && right_null);
        if boxed(left_arg, left_not_null) || boxed(right_arg, right_not_null) || opposite_nullability
        {
            return Some(Constraint::False);
        }

        if left == right {
            return Some(Constraint::True);
        }

        None
    }

    /// Validates-not-null contract: drain the call's operands and record
    /// `NotNull` on the validated argument's value.
    ///
    /// The call pushes no boolean result — it either returns normally with
    /// the guarantee established or has already diverged. A validated value
    /// already holding `Null` makes the normal-return path infeasible.
    fn visit_not_null_validation(
        &mut self,
        state: &ProgramState,
        call: &CallSite,
        param: usize,
        sink: &mut dyn ReportSink,
    ) -> Result<Transition> {
        let after = call.arg_count.saturating_sub(param + 1);
        let (state, _after) = state.pop_values(after)?;
        let (state, validated) = state.pop_value()?;
        let (state, _before) = state.pop_values(param)?;
        let (state, _marker) = state.pop_value()?;

        Ok(self
            .observers
            .assign(&state, validated, Constraint::NotNull, call.site, sink))
    }

    /// `nameof`-shape query: arguments were never evaluated, so nothing is
    /// popped; the result is a fresh value that is always non-null text.
    fn visit_nameof(
        &mut self,
        state: &ProgramState,
        call: &CallSite,
        sink: &mut dyn ReportSink,
    ) -> Transition {
        let result = self.values.fresh();
        let state = state.push_value(result);
        self.observers
            .assign(&state, result, Constraint::NotNull, call.site, sink)
    }

    /// Generic fallback: pop the receiver-or-marker and every argument, push
    /// one fresh opaque result. Never an error.
    fn visit_unknown(&mut self, state: &ProgramState, call: &CallSite) -> Result<Transition> {
        let (state, _operands) = state.pop_values(call.arg_count + 1)?;
        let state = state.push_value(self.values.fresh());
        Ok(Transition::Next(state))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        invocation::oracle::{KnownType, MethodSig, ParamInfo},
        observers::{SiteId, Violation},
        test::TestOracle,
        Error,
    };

    use super::*;

    fn run(
        arena: &mut ValueArena,
        oracle: &TestOracle,
        state: &ProgramState,
        call: &CallSite,
    ) -> Result<Transition> {
        let observers = ObserverRegistry::new();
        let mut reports: Vec<Violation> = Vec::new();
        InvocationVisitor::new(arena, oracle, &observers).visit(state, call, &mut reports)
    }

    fn feasible(transition: Transition) -> ProgramState {
        transition.into_state().expect("path must stay feasible")
    }

    #[test]
    fn test_instance_equals_unwraps_member_access_receiver() {
        let mut arena = ValueArena::new();
        let base = arena.fresh();
        let receiver = arena.member_access(base, crate::values::MemberId::new(0));
        let arg = arena.fresh();

        let oracle = TestOracle::resolving(MethodSig::new(KnownType::Other, "Equals", false, 1));
        let state = ProgramState::entry().push_value(receiver).push_value(arg);
        let call = CallSite::new(SiteId::new(0), 1);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert_eq!(
            arena.kind(result).comparison_operands(),
            Some((base, arg)),
            "left operand must be the member-access base"
        );
        assert_eq!(next.stack_depth(), 1);
        assert!(!next.has_constraint(result, Constraint::True));
    }

    #[test]
    fn test_instance_equals_implicit_receiver_uses_this() {
        let mut arena = ValueArena::new();
        let receiver = arena.fresh(); // not a member access
        let arg = arena.fresh();

        let oracle = TestOracle::resolving(MethodSig::new(KnownType::Other, "Equals", false, 1));
        let state = ProgramState::entry().push_value(receiver).push_value(arg);
        let call = CallSite::new(SiteId::new(0), 1);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert_eq!(
            arena.kind(result).comparison_operands(),
            Some((ValueArena::THIS, arg))
        );
    }

    #[test]
    fn test_instance_self_equality_is_true() {
        let mut arena = ValueArena::new();
        let base = arena.fresh();
        let receiver = arena.member_access(base, crate::values::MemberId::new(0));

        let oracle = TestOracle::resolving(MethodSig::new(KnownType::Other, "Equals", false, 1));
        // x.Equals(x): the argument is the member-access base itself.
        let state = ProgramState::entry().push_value(receiver).push_value(base);
        let call = CallSite::new(SiteId::new(0), 1);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert!(next.has_constraint(result, Constraint::True));
    }

    #[test]
    fn test_static_equals_self_equality() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let x = arena.fresh();

        let oracle = TestOracle::resolving(MethodSig::new(KnownType::Object, "Equals", true, 2));
        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(x)
            .push_value(x);
        let call = CallSite::new(SiteId::new(0), 2);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert_eq!(next.stack_depth(), 1, "marker and both args consumed");
        assert!(next.has_constraint(result, Constraint::True));
    }

    #[test]
    fn test_reference_equals_null_null_is_true() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();

        let oracle =
            TestOracle::resolving(MethodSig::new(KnownType::Object, "ReferenceEquals", true, 2));
        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(ValueArena::NULL)
            .push_value(ValueArena::NULL);
        let call = CallSite::new(SiteId::new(0), 2);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert!(next.has_constraint(result, Constraint::True));
    }

    #[test]
    fn test_reference_equals_opposite_nullability_is_false() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let x = arena.fresh();

        let oracle =
            TestOracle::resolving(MethodSig::new(KnownType::Object, "ReferenceEquals", true, 2));
        let state = ProgramState::entry()
            .set_constraint(x, Constraint::NotNull)
            .applied()
            .unwrap()
            .push_value(marker)
            .push_value(x)
            .push_value(ValueArena::NULL);
        let call = CallSite::new(SiteId::new(0), 2);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert!(next.has_constraint(result, Constraint::False));
    }

    #[test]
    fn test_reference_equals_unknown_nullability_stays_unconstrained() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let x = arena.fresh();

        let oracle =
            TestOracle::resolving(MethodSig::new(KnownType::Object, "ReferenceEquals", true, 2));
        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(x)
            .push_value(ValueArena::NULL);
        let call = CallSite::new(SiteId::new(0), 2);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert!(!next.has_constraint(result, Constraint::True));
        assert!(!next.has_constraint(result, Constraint::False));
    }

    #[test]
    fn test_reference_equals_boxed_value_type_beats_same_identity() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let x = arena.fresh();

        let oracle =
            TestOracle::resolving(MethodSig::new(KnownType::Object, "ReferenceEquals", true, 2))
                .with_value_type_arg(0)
                .with_value_type_arg(1);
        let state = ProgramState::entry()
            .set_constraint(x, Constraint::NotNull)
            .applied()
            .unwrap()
            .push_value(marker)
            .push_value(x)
            .push_value(x);
        let call = CallSite::new(SiteId::new(0), 2);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert!(
            next.has_constraint(result, Constraint::False),
            "boxing: identical value-type operands still compare unequal"
        );
    }

    #[test]
    fn test_reference_equals_same_identity_is_true() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let x = arena.fresh();

        let oracle =
            TestOracle::resolving(MethodSig::new(KnownType::Object, "ReferenceEquals", true, 2));
        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(x)
            .push_value(x);
        let call = CallSite::new(SiteId::new(0), 2);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert!(next.has_constraint(result, Constraint::True));
    }

    #[test]
    fn test_string_null_check_of_null_is_true() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();

        let oracle =
            TestOracle::resolving(MethodSig::new(KnownType::String, "IsNullOrEmpty", true, 1));
        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(ValueArena::NULL);
        let call = CallSite::new(SiteId::new(0), 1);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert_eq!(next.stack_depth(), 1);
        assert!(next.has_constraint(result, Constraint::True));
    }

    #[test]
    fn test_string_null_check_of_not_null_is_false() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let s = arena.fresh();

        let oracle =
            TestOracle::resolving(MethodSig::new(KnownType::String, "IsNullOrWhiteSpace", true, 1));
        let state = ProgramState::entry()
            .set_constraint(s, Constraint::NotNull)
            .applied()
            .unwrap()
            .push_value(marker)
            .push_value(s);
        let call = CallSite::new(SiteId::new(0), 1);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        let result = next.peek().unwrap();
        assert!(next.has_constraint(result, Constraint::False));
    }

    #[test]
    fn test_not_null_validation_drains_and_constrains() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let a0 = arena.fresh();
        let a1 = arena.fresh();
        let a2 = arena.fresh();

        let mut sig = MethodSig::new(KnownType::Other, "Require", true, 3);
        sig.params[1] = ParamInfo::validated_not_null();
        let oracle = TestOracle::resolving(sig);

        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(a0)
            .push_value(a1)
            .push_value(a2);
        let call = CallSite::new(SiteId::new(0), 3);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        assert!(next.stack_is_empty(), "3 args + marker drained, no result");
        assert!(next.has_constraint(a1, Constraint::NotNull));
        assert!(!next.has_constraint(a0, Constraint::NotNull));
        assert!(!next.has_constraint(a2, Constraint::NotNull));
    }

    #[test]
    fn test_not_null_validation_of_null_is_infeasible() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();

        let mut sig = MethodSig::new(KnownType::Other, "Require", true, 1);
        sig.params[0] = ParamInfo::validated_not_null();
        let oracle = TestOracle::resolving(sig);

        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(ValueArena::NULL);
        let call = CallSite::new(SiteId::new(0), 1);

        let next = run(&mut arena, &oracle, &state, &call).unwrap();
        assert!(next.is_infeasible());
    }

    #[test]
    fn test_nameof_pushes_not_null_without_popping() {
        let mut arena = ValueArena::new();
        let below = arena.fresh();

        let oracle = TestOracle::unresolved();
        let state = ProgramState::entry().push_value(below);
        let call = CallSite::nameof(SiteId::new(0));

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        assert_eq!(next.stack_depth(), 2, "nothing popped");
        let result = next.peek().unwrap();
        assert!(next.has_constraint(result, Constraint::NotNull));
    }

    #[test]
    fn test_unknown_call_opaque_fallback() {
        let mut arena = ValueArena::new();
        let marker = arena.fresh();
        let a0 = arena.fresh();
        let a1 = arena.fresh();

        let oracle = TestOracle::unresolved();
        let state = ProgramState::entry()
            .push_value(marker)
            .push_value(a0)
            .push_value(a1);
        let call = CallSite::new(SiteId::new(0), 2);

        let next = feasible(run(&mut arena, &oracle, &state, &call).unwrap());
        assert_eq!(next.stack_depth(), 1);
        let result = next.peek().unwrap();
        assert_ne!(result, marker);
        assert_ne!(result, a0);
        assert_ne!(result, a1);
        assert_eq!(next.constraint(result, crate::constraints::ConstraintDomain::Object), None);
    }

    #[test]
    fn test_underflow_is_a_fault() {
        let mut arena = ValueArena::new();

        let oracle = TestOracle::unresolved();
        let state = ProgramState::entry(); // empty stack, but the call wants 3 pops
        let call = CallSite::new(SiteId::new(0), 2);

        match run(&mut arena, &oracle, &state, &call) {
            Err(Error::StackUnderflow {
                requested: 3,
                available: 0,
            }) => {}
            other => panic!("expected underflow fault, got {other:?}"),
        }
    }
}
