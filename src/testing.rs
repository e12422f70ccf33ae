//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]
#![allow(clippy::needless_pass_by_ref_mut)] // &mut self for ergonomics with RefCell

use crate::beads::{Bead, BeadStatus, ListFilter, Progress};
use crate::error::{Error, Result};
use crate::traits::{BeadStore, CommandOutput, CommandRunner, IdentityResolver};
use std::cell::RefCell;
use std::collections::HashMap;

/// A mock command runner for testing.
///
/// Records expected commands and their outputs, then verifies they were called.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    expectations: RefCell<Vec<(String, Vec<String>, CommandOutput)>>,
    call_index: RefCell<usize>,
}

impl MockCommandRunner {
    /// Create a new mock command runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expected command and its output.
    pub fn expect(&mut self, program: &str, args: &[&str], output: CommandOutput) {
        self.expectations.borrow_mut().push((
            program.to_string(),
            args.iter().map(|s| (*s).to_string()).collect(),
            output,
        ));
    }

    /// Verify all expected commands were called.
    ///
    /// # Panics
    ///
    /// Panics if not all expected commands were called.
    pub fn verify(&self) {
        let index = *self.call_index.borrow();
        let expected = self.expectations.borrow().len();
        assert_eq!(
            index, expected,
            "Expected {expected} command calls, but only {index} were made"
        );
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let mut index = self.call_index.borrow_mut();
        let expectations = self.expectations.borrow();

        assert!(
            *index < expectations.len(),
            "Unexpected command call: {program} {args:?} (no more expectations)"
        );

        let (exp_program, exp_args, output) = &expectations[*index];
        let args_vec: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();

        assert!(
            program == exp_program && &args_vec == exp_args,
            "Command mismatch at index {}:\n  Expected: {} {:?}\n  Got: {} {:?}",
            *index,
            exp_program,
            exp_args,
            program,
            args
        );

        *index += 1;
        Ok(output.clone())
    }
}

/// A command runner that always fails to spawn, for testing error paths.
#[derive(Debug, Default)]
pub struct FailingCommandRunner {
    error_message: String,
}

impl FailingCommandRunner {
    /// Create a new failing command runner with the specified error message.
    #[must_use]
    pub fn new(error_message: impl Into<String>) -> Self {
        Self { error_message: error_message.into() }
    }
}

impl CommandRunner for FailingCommandRunner {
    fn run(&self, _program: &str, _args: &[&str]) -> Result<CommandOutput> {
        Err(std::io::Error::other(self.error_message.clone()).into())
    }
}

/// A mutation kind, for choosing which [`MemoryStore`] call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// [`BeadStore::pin`].
    Pin,
    /// [`BeadStore::unpin`].
    Unpin,
    /// [`BeadStore::close`].
    Close,
}

/// A mutation request received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `pin(id, assignee)`.
    Pin {
        /// Bead id.
        id: String,
        /// New assignee.
        assignee: String,
    },
    /// `unpin(id)`.
    Unpin {
        /// Bead id.
        id: String,
    },
    /// `close(id, reason)`.
    Close {
        /// Bead id.
        id: String,
        /// Recorded reason.
        reason: String,
    },
}

/// An in-memory bead store.
///
/// Mutations are applied to the stored beads and recorded in order. Any one
/// mutation kind can be made to fail; the failed attempt is still recorded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    beads: RefCell<Vec<Bead>>,
    molecules: HashMap<String, Vec<BeadStatus>>,
    calls: RefCell<Vec<StoreCall>>,
    progress_queries: RefCell<Vec<String>>,
    failing: Option<Mutation>,
    fail_listing: bool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bead. Beads are listed in insertion order.
    pub fn add(&mut self, bead: Bead) {
        self.beads.borrow_mut().push(bead);
    }

    /// Register a molecule whose steps have the given statuses.
    pub fn add_molecule(&mut self, molecule: &str, steps: &[BeadStatus]) {
        self.molecules.insert(molecule.to_string(), steps.to_vec());
    }

    /// Make every call of the given kind fail.
    pub fn fail_on(&mut self, mutation: Mutation) {
        self.failing = Some(mutation);
    }

    /// Make [`BeadStore::list`] fail.
    pub fn fail_listing(&mut self) {
        self.fail_listing = true;
    }

    /// Mutation calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    /// Molecules whose progress was queried, in order.
    #[must_use]
    pub fn progress_queries(&self) -> Vec<String> {
        self.progress_queries.borrow().clone()
    }

    /// Current state of a bead.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Bead> {
        self.beads.borrow().iter().find(|b| b.id == id).cloned()
    }

    /// Ids of beads pinned to `agent`.
    #[must_use]
    pub fn pinned_to(&self, agent: &str) -> Vec<String> {
        let filter = ListFilter::pinned_to(agent);
        self.beads.borrow().iter().filter(|b| filter.matches(b)).map(|b| b.id.clone()).collect()
    }

    fn mutate(
        &self,
        kind: Mutation,
        call: StoreCall,
        id: &str,
        apply: impl FnOnce(&mut Bead),
    ) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if self.failing == Some(kind) {
            return Err(Error::CommandFailed {
                command: format!("{kind:?} {id}").to_lowercase(),
                exit_code: 1,
                stderr: "injected failure".to_string(),
            });
        }
        let mut beads = self.beads.borrow_mut();
        let bead = beads
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })?;
        apply(bead);
        Ok(())
    }
}

impl BeadStore for MemoryStore {
    fn verify_exists(&self, id: &str) -> Result<()> {
        if self.beads.borrow().iter().any(|b| b.id == id) {
            Ok(())
        } else {
            Err(Error::NotFound { id: id.to_string() })
        }
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<Bead>> {
        if self.fail_listing {
            return Err(Error::CommandFailed {
                command: "list".to_string(),
                exit_code: 1,
                stderr: "injected failure".to_string(),
            });
        }
        if let Some(parent) = &filter.parent {
            let steps = self.molecules.get(parent).map_or_else(Vec::new, |statuses| {
                statuses
                    .iter()
                    .enumerate()
                    .map(|(i, s)| Bead::new(format!("{parent}.{}", i + 1), "step", s.clone()))
                    .collect()
            });
            return Ok(steps.into_iter().filter(|b| filter.matches(b)).collect());
        }
        Ok(self.beads.borrow().iter().filter(|b| filter.matches(b)).cloned().collect())
    }

    fn molecule_progress(&self, molecule: &str) -> Result<Progress> {
        self.progress_queries.borrow_mut().push(molecule.to_string());
        if !self.molecules.contains_key(molecule) {
            return Err(Error::NotFound { id: molecule.to_string() });
        }
        let steps = self.list(&ListFilter::steps_of(molecule))?;
        Ok(Progress::from_steps(&steps))
    }

    fn pin(&self, id: &str, assignee: &str) -> Result<()> {
        let call = StoreCall::Pin { id: id.to_string(), assignee: assignee.to_string() };
        self.mutate(Mutation::Pin, call, id, |bead| {
            bead.status = BeadStatus::Pinned;
            bead.assignee = assignee.to_string();
        })
    }

    fn unpin(&self, id: &str) -> Result<()> {
        let call = StoreCall::Unpin { id: id.to_string() };
        self.mutate(Mutation::Unpin, call, id, |bead| bead.status = BeadStatus::Open)
    }

    fn close(&self, id: &str, reason: &str) -> Result<()> {
        let call = StoreCall::Close { id: id.to_string(), reason: reason.to_string() };
        self.mutate(Mutation::Close, call, id, |bead| bead.status = BeadStatus::Closed)
    }
}

/// An identity resolver returning a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity(Option<String>);

impl FixedIdentity {
    /// Resolve to `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    /// Fail to resolve.
    #[must_use]
    pub const fn unresolved() -> Self {
        Self(None)
    }
}

impl IdentityResolver for FixedIdentity {
    fn resolve_self(&self) -> Result<String> {
        self.0.clone().ok_or_else(|| Error::IdentityUnresolved("no identity configured".to_string()))
    }
}
