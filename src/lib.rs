// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # symscope
//!
//! A symbolic-execution core for static analysis of .NET-style managed code.
//! `symscope` walks a method one instruction at a time and maintains an
//! abstract machine state — an evaluation stack of symbolic values plus a
//! store of logical constraints on those values — instead of concrete runtime
//! values. That is enough to prove or disprove semantic properties ("this
//! value is null here", "these two references are equal", "this handle was
//! already released") without executing the program, so a reporting layer can
//! flag code that is provably buggy or provably redundant.
//!
//! ## Features
//!
//! - **🧊 Immutable program states** - Every transformation returns a new
//!   state; structural equality and hashing give the exploration driver cheap
//!   path deduplication
//! - **🪪 Identity-based symbolic values** - Arena-allocated value tokens;
//!   derived values reference their operands by identity, never by structure
//! - **🔒 Closed constraint lattice** - Nullability, boolean-result, and
//!   disposed-handle domains with per-domain exclusivity and contradiction
//!   detection
//! - **📞 Precise call-site semantics** - Well-known BCL method shapes
//!   (equality, identity comparison, string null checks, not-null validation
//!   contracts, `nameof`) become exact state transitions instead of opaque
//!   unknowns
//! - **🔎 Pluggable constraint observers** - Stateless rules over the
//!   assignment-event stream feed diagnostics like redundant-dispose without
//!   touching analysis results
//!
//! ## Quick Start
//!
//! Add `symscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! symscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use symscope::prelude::*;
//!
//! let mut arena = ValueArena::new();
//! let handle = arena.fresh();
//!
//! let mut observers = ObserverRegistry::new();
//! observers.register(RedundantDisposeObserver);
//! let mut reports: Vec<Violation> = Vec::new();
//!
//! // Dispose the same handle twice: the second assignment is reported.
//! let state = ProgramState::entry();
//! let state = observers
//!     .assign(&state, handle, Constraint::Disposed, SiteId::new(1), &mut reports)
//!     .into_state()
//!     .unwrap();
//! let _ = observers.assign(&state, handle, Constraint::Disposed, SiteId::new(2), &mut reports);
//! assert_eq!(reports.len(), 1);
//! ```
//!
//! ## Architecture
//!
//! `symscope` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`values`] - Symbolic value identity model and the per-method arena
//! - [`constraints`] - Constraint domains and tags
//! - [`state`] - Immutable program state: evaluation stack + constraint store
//! - [`observers`] - Assignment-event broadcast and the violation channel
//! - [`invocation`] - Call classification and the invocation visitor
//! - [`Error`] and [`Result`] - Fault handling for framework misuse
//!
//! ## Division of Labor
//!
//! The core defines how a *single* instruction transforms a *single* incoming
//! state. Everything around that is a collaborator the embedder supplies:
//!
//! - a **symbol/type oracle** ([`invocation::SymbolOracle`]) answering
//!   name/type resolution questions deterministically;
//! - an **exploration driver** owning CFG traversal, loop bounding, and
//!   state-set deduplication via [`state::ProgramState`] structural equality;
//! - a **report sink** ([`observers::ReportSink`]) turning violations into
//!   user-facing diagnostics.
//!
//! Every operation here is a pure function from immutable inputs to new
//! immutable values, so a driver may fan path exploration out across threads
//! freely: states are safely shared read-only, and nothing in this crate
//! mutates in place, blocks, or suspends.

pub(crate) mod error;

pub mod constraints;
pub mod invocation;
pub mod observers;
pub mod prelude;
pub mod state;
pub mod values;

pub(crate) mod test;

/// The result type used throughout symscope for fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all symscope operations.
///
/// Covers framework faults only — infeasible paths and unrecognized calls are
/// ordinary outcomes, not errors. See [`error::Error`] for the taxonomy.
pub use error::Error;
