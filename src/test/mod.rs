//! Shared fixtures for unit tests.

use crate::invocation::{CallSite, MethodSig, SymbolOracle};

/// Canned oracle: resolves every call to one fixed signature and reports a
/// fixed set of argument positions as value types.
pub(crate) struct TestOracle {
    sig: Option<MethodSig>,
    value_type_args: Vec<usize>,
}

impl TestOracle {
    /// An oracle that resolves every call to `sig`.
    pub(crate) fn resolving(sig: MethodSig) -> Self {
        Self {
            sig: Some(sig),
            value_type_args: Vec::new(),
        }
    }

    /// An oracle that resolves nothing.
    pub(crate) fn unresolved() -> Self {
        Self {
            sig: None,
            value_type_args: Vec::new(),
        }
    }

    /// Marks argument `index` as having a value-type static type.
    pub(crate) fn with_value_type_arg(mut self, index: usize) -> Self {
        self.value_type_args.push(index);
        self
    }
}

impl SymbolOracle for TestOracle {
    fn resolve(&self, _call: &CallSite) -> Option<MethodSig> {
        self.sig.clone()
    }

    fn argument_is_value_type(&self, _call: &CallSite, index: usize) -> bool {
        self.value_type_args.contains(&index)
    }
}
