//! The hook operation.
//!
//! An agent's hook is the single bead pinned with that agent as assignee.
//! Hooking a new bead while another occupies the hook is resolved by the
//! completion state of the occupant:
//!
//! | Occupant | `--force` | Decision |
//! |---|---|---|
//! | none | any | [`Decision::Proceed`] |
//! | the requested bead | any | [`Decision::NoOp`] |
//! | complete (naked, or molecule finished) | any | [`Decision::AutoReplace`] |
//! | incomplete | yes | [`Decision::ForceReplace`] |
//! | incomplete | no | [`Decision::Block`] |
//!
//! [`resolve`] only decides. [`run_hook`] gathers the inputs, plans the
//! mutations and, unless this is a dry run, performs them.

mod classify;
mod execute;

pub use classify::{classify, Completion};
pub use execute::{apply, plan, Action};

use crate::beads::{Bead, ListFilter};
use crate::error::Result;
use crate::identity::AgentClass;
use crate::traits::{BeadStore, IdentityResolver};
use serde::Serialize;

/// What to do about the hook's current occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// The hook is empty; pin the requested bead.
    Proceed,
    /// The requested bead is already on the hook.
    NoOp,
    /// The occupant is complete and is cleared automatically.
    AutoReplace {
        /// The occupant.
        existing: Bead,
        /// Whether it carries a molecule. Beads with a finished molecule are
        /// closed; naked beads are only unpinned.
        has_attachment: bool,
    },
    /// The occupant is incomplete and cleared because the caller forced it.
    ForceReplace {
        /// The occupant.
        existing: Bead,
    },
    /// The occupant is incomplete and blocks the request.
    Block {
        /// The occupant.
        existing: Bead,
    },
}

impl Decision {
    /// The bead this decision clears or is blocked by.
    #[must_use]
    pub const fn existing(&self) -> Option<&Bead> {
        match self {
            Self::Proceed | Self::NoOp => None,
            Self::AutoReplace { existing, .. }
            | Self::ForceReplace { existing }
            | Self::Block { existing } => Some(existing),
        }
    }

    /// Short snake-case name, as used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Proceed => "proceed",
            Self::NoOp => "no_op",
            Self::AutoReplace { .. } => "auto_replace",
            Self::ForceReplace { .. } => "force_replace",
            Self::Block { .. } => "block",
        }
    }
}

/// Decide what hooking `requested` means given the beads currently pinned
/// to the caller.
///
/// `pinned` should hold at most one bead. If it holds more, the first is
/// treated as the occupant and the rest are logged and otherwise ignored.
/// `classify` is only consulted when an occupant other than `requested`
/// exists.
pub fn resolve<F>(requested: &str, pinned: &[Bead], force: bool, classify: F) -> Decision
where
    F: FnOnce(&Bead) -> Completion,
{
    let Some((existing, extra)) = pinned.split_first() else {
        return Decision::Proceed;
    };
    if !extra.is_empty() {
        let extra: Vec<&str> = extra.iter().map(|b| b.id.as_str()).collect();
        tracing::warn!(
            occupant = %existing.id,
            ?extra,
            "more than one bead pinned to this agent; using the first"
        );
    }

    if existing.id == requested {
        return Decision::NoOp;
    }

    let completion = classify(existing);
    if completion.complete {
        Decision::AutoReplace {
            existing: existing.clone(),
            has_attachment: completion.has_attachment,
        }
    } else if force {
        Decision::ForceReplace { existing: existing.clone() }
    } else {
        Decision::Block { existing: existing.clone() }
    }
}

/// A request to hook a bead.
#[derive(Debug, Clone, Default)]
pub struct HookRequest {
    /// The bead to hook.
    pub bead_id: String,
    /// Subject for handoff mail. Passed through untouched.
    pub subject: Option<String>,
    /// Context message for handoff mail. Passed through untouched.
    pub message: Option<String>,
    /// Report what would happen without mutating anything.
    pub dry_run: bool,
    /// Replace an incomplete occupant.
    pub force: bool,
}

impl HookRequest {
    /// A plain request to hook `bead_id`.
    #[must_use]
    pub fn new(bead_id: impl Into<String>) -> Self {
        Self { bead_id: bead_id.into(), ..Self::default() }
    }
}

/// Outcome of a successful (or dry-run) hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookReport {
    /// The calling agent.
    pub agent: String,
    /// The requested bead.
    pub bead_id: String,
    /// The decision taken.
    pub decision: Decision,
    /// Mutations performed, or that would be performed on a dry run.
    pub actions: Vec<Action>,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Handoff subject, as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Handoff context message, as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Other beads found pinned to the agent besides the occupant.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_pinned: Vec<String>,
}

/// Hook `request.bead_id` for the calling agent.
///
/// Steps, each failing fast: reject ephemeral callers, verify the bead
/// exists, resolve identity, look up the current occupant, decide, plan,
/// and (unless `request.dry_run`) apply.
///
/// # Errors
///
/// - [`crate::error::Error::PreconditionDenied`] for ephemeral callers
/// - [`crate::error::Error::NotFound`] if the bead does not exist
/// - [`crate::error::Error::IdentityUnresolved`] if identity fails
/// - [`crate::error::Error::Conflict`] if an incomplete occupant blocks
/// - [`crate::error::Error::MutationFailed`] if the store rejects a step
/// - any error from listing the current occupant
pub fn run_hook(
    request: &HookRequest,
    class: &AgentClass,
    identity: &dyn IdentityResolver,
    store: &dyn BeadStore,
) -> Result<HookReport> {
    class.ensure_can_hook()?;
    store.verify_exists(&request.bead_id)?;
    let agent = identity.resolve_self()?;

    let pinned = store.list(&ListFilter::pinned_to(&agent))?;
    let decision = resolve(&request.bead_id, &pinned, request.force, |bead| classify(bead, store));
    tracing::debug!(
        bead = %request.bead_id,
        %agent,
        decision = decision.name(),
        dry_run = request.dry_run,
        "resolved hook"
    );

    let actions = plan(&decision, &request.bead_id, &agent)?;
    if !request.dry_run {
        apply(&actions, store)?;
    }

    Ok(HookReport {
        agent,
        bead_id: request.bead_id.clone(),
        decision,
        actions,
        dry_run: request.dry_run,
        subject: request.subject.clone(),
        message: request.message.clone(),
        extra_pinned: pinned.iter().skip(1).map(|b| b.id.clone()).collect(),
    })
}

/// What is on an agent's hook right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookStatus {
    /// The agent whose hook was inspected.
    pub agent: String,
    /// The occupant, if any.
    pub hooked: Option<Bead>,
    /// Classification of the occupant.
    pub completion: Option<Completion>,
    /// Other beads found pinned to the agent besides the occupant.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_pinned: Vec<String>,
}

/// Inspect the caller's hook without changing anything.
///
/// Uses the same occupant lookup and classification as [`run_hook`].
///
/// # Errors
///
/// Returns an error if identity cannot be resolved or the listing fails.
pub fn hook_status(identity: &dyn IdentityResolver, store: &dyn BeadStore) -> Result<HookStatus> {
    let agent = identity.resolve_self()?;
    let mut pinned = store.list(&ListFilter::pinned_to(&agent))?;
    let extra_pinned = pinned.iter().skip(1).map(|b| b.id.clone()).collect();
    pinned.truncate(1);
    let hooked = pinned.pop();
    let completion = hooked.as_ref().map(|bead| classify(bead, store));
    Ok(HookStatus { agent, hooked, completion, extra_pinned })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beads::{BeadStatus, Progress};
    use crate::error::Error;
    use crate::testing::{FixedIdentity, MemoryStore, Mutation, StoreCall};
    use proptest::prelude::*;

    const AGENT: &str = "gastown/crew/joe";

    fn pinned(id: &str) -> Bead {
        Bead::new(id, format!("Title of {id}"), BeadStatus::Pinned).with_assignee(AGENT)
    }

    fn open(id: &str) -> Bead {
        Bead::new(id, format!("Title of {id}"), BeadStatus::Open)
    }

    fn never_called(_: &Bead) -> Completion {
        panic!("classifier should not run")
    }

    fn incomplete(_: &Bead) -> Completion {
        Completion::of_molecule(Progress::Steps { total: 3, closed: 1 })
    }

    fn pin_call(id: &str) -> StoreCall {
        StoreCall::Pin { id: id.to_string(), assignee: AGENT.to_string() }
    }

    fn hook(store: &MemoryStore, request: &HookRequest) -> Result<HookReport> {
        run_hook(request, &AgentClass::Durable, &FixedIdentity::new(AGENT), store)
    }

    // --- resolve ---

    #[test]
    fn test_resolve_empty_hook_proceeds() {
        assert_eq!(resolve("gt-001", &[], false, never_called), Decision::Proceed);
    }

    #[test]
    fn test_resolve_same_bead_is_noop() {
        assert_eq!(resolve("gt-001", &[pinned("gt-001")], true, never_called), Decision::NoOp);
    }

    #[test]
    fn test_resolve_complete_occupant_auto_replaces() {
        let decision = resolve("gt-003", &[pinned("gt-002")], false, |_| Completion::NAKED);
        assert_eq!(
            decision,
            Decision::AutoReplace { existing: pinned("gt-002"), has_attachment: false }
        );
    }

    #[test]
    fn test_resolve_incomplete_blocks_unless_forced() {
        let occupant = [pinned("gt-006")];
        assert_eq!(
            resolve("gt-007", &occupant, false, incomplete),
            Decision::Block { existing: pinned("gt-006") }
        );
        assert_eq!(
            resolve("gt-007", &occupant, true, incomplete),
            Decision::ForceReplace { existing: pinned("gt-006") }
        );
    }

    #[test]
    fn test_resolve_uses_first_of_several() {
        let occupants = [pinned("gt-a"), pinned("gt-b")];
        assert_eq!(resolve("gt-a", &occupants, false, never_called), Decision::NoOp);
        // gt-b is pinned too, but only the first occupant is considered
        assert_eq!(
            resolve("gt-b", &occupants, false, incomplete),
            Decision::Block { existing: pinned("gt-a") }
        );
    }

    // --- run_hook ---

    #[test]
    fn test_hook_empty_slot() {
        let mut store = MemoryStore::new();
        store.add(open("gt-001"));

        let report = hook(&store, &HookRequest::new("gt-001")).unwrap();
        assert_eq!(report.decision, Decision::Proceed);
        assert_eq!(store.calls(), vec![pin_call("gt-001")]);
        assert_eq!(store.pinned_to(AGENT), vec!["gt-001".to_string()]);
    }

    #[test]
    fn test_hook_blocked_by_incomplete_molecule() {
        let mut store = MemoryStore::new();
        store.add(pinned("gt-006").with_description("attached_molecule: mol-2"));
        store.add(open("gt-007"));
        store.add_molecule("mol-2", &[BeadStatus::Closed, BeadStatus::Open]);

        let err = hook(&store, &HookRequest::new("gt-007")).unwrap_err();
        assert!(matches!(err, Error::Conflict { ref id, .. } if id == "gt-006"));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_hook_blocked_when_progress_unreadable() {
        let mut store = MemoryStore::new();
        store.add(pinned("gt-006").with_description("attached_molecule: mol-gone"));
        store.add(open("gt-007"));

        let err = hook(&store, &HookRequest::new("gt-007")).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_hook_ephemeral_rejected_before_store() {
        let mut store = MemoryStore::new();
        store.fail_listing();
        let class = AgentClass::Ephemeral { name: "nux".to_string() };
        let err = run_hook(&HookRequest::new("gt-404"), &class, &FixedIdentity::new(AGENT), &store)
            .unwrap_err();
        assert!(matches!(err, Error::PreconditionDenied { .. }));
    }

    #[test]
    fn test_hook_unknown_bead() {
        let store = MemoryStore::new();
        let err = hook(&store, &HookRequest::new("gt-404")).unwrap_err();
        assert!(matches!(err, Error::NotFound { ref id } if id == "gt-404"));
    }

    #[test]
    fn test_hook_existence_checked_before_identity() {
        let store = MemoryStore::new();
        let err = run_hook(
            &HookRequest::new("gt-404"),
            &AgentClass::Durable,
            &FixedIdentity::unresolved(),
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_hook_identity_unresolved() {
        let mut store = MemoryStore::new();
        store.add(open("gt-001"));
        let err = run_hook(
            &HookRequest::new("gt-001"),
            &AgentClass::Durable,
            &FixedIdentity::unresolved(),
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, Error::IdentityUnresolved(_)));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_hook_listing_failure_propagates() {
        let mut store = MemoryStore::new();
        store.add(open("gt-001"));
        store.fail_listing();
        assert!(hook(&store, &HookRequest::new("gt-001")).is_err());
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_hook_unpin_failure_skips_pin() {
        let mut store = MemoryStore::new();
        store.add(pinned("gt-006").with_description("attached_molecule: mol-2"));
        store.add(open("gt-007"));
        store.add_molecule("mol-2", &[BeadStatus::Open]);
        store.fail_on(Mutation::Unpin);

        let request = HookRequest { force: true, ..HookRequest::new("gt-007") };
        let err = hook(&store, &request).unwrap_err();
        assert!(matches!(err, Error::MutationFailed { action: "unpinning", .. }));
        assert_eq!(store.calls(), vec![StoreCall::Unpin { id: "gt-006".to_string() }]);
        assert_eq!(store.pinned_to(AGENT), vec!["gt-006".to_string()]);
    }

    #[test]
    fn test_hook_reports_extra_pinned_without_touching_them() {
        let mut store = MemoryStore::new();
        store.add(pinned("gt-a"));
        store.add(pinned("gt-b"));
        store.add(open("gt-c"));

        let report = hook(&store, &HookRequest::new("gt-c")).unwrap();
        assert_eq!(report.extra_pinned, vec!["gt-b".to_string()]);
        assert_eq!(
            store.calls(),
            vec![StoreCall::Unpin { id: "gt-a".to_string() }, pin_call("gt-c")]
        );
    }

    #[test]
    fn test_hook_passes_subject_and_message_through() {
        let mut store = MemoryStore::new();
        store.add(open("gt-001"));
        let request = HookRequest {
            subject: Some("Fix the bug".to_string()),
            message: Some("Check tests".to_string()),
            ..HookRequest::new("gt-001")
        };
        let report = hook(&store, &request).unwrap();
        assert_eq!(report.subject.as_deref(), Some("Fix the bug"));
        assert_eq!(report.message.as_deref(), Some("Check tests"));
    }

    #[test]
    fn test_report_serializes_decision_tag() {
        let mut store = MemoryStore::new();
        store.add(open("gt-001"));
        let report = hook(&store, &HookRequest::new("gt-001")).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["decision"]["decision"], "proceed");
        assert_eq!(json["actions"][0]["action"], "pin");
        assert!(json.get("subject").is_none());
    }

    // --- hook_status ---

    #[test]
    fn test_status_empty_hook() {
        let store = MemoryStore::new();
        let status = hook_status(&FixedIdentity::new(AGENT), &store).unwrap();
        assert_eq!(status.agent, AGENT);
        assert!(status.hooked.is_none());
        assert!(status.completion.is_none());
    }

    #[test]
    fn test_status_classifies_occupant_without_mutating() {
        let mut store = MemoryStore::new();
        store.add(pinned("gt-004").with_description("attached_molecule: mol-004"));
        store.add_molecule("mol-004", &[BeadStatus::Closed, BeadStatus::Open]);

        let status = hook_status(&FixedIdentity::new(AGENT), &store).unwrap();
        assert_eq!(status.hooked.map(|b| b.id), Some("gt-004".to_string()));
        assert_eq!(
            status.completion,
            Some(Completion::of_molecule(Progress::Steps { total: 2, closed: 1 }))
        );
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_status_reports_extra_pinned() {
        let mut store = MemoryStore::new();
        store.add(pinned("gt-a"));
        store.add(pinned("gt-b"));
        let status = hook_status(&FixedIdentity::new(AGENT), &store).unwrap();
        assert_eq!(status.hooked.map(|b| b.id), Some("gt-a".to_string()));
        assert_eq!(status.extra_pinned, vec!["gt-b".to_string()]);
    }

    #[test]
    fn test_status_identity_failure() {
        let store = MemoryStore::new();
        let err = hook_status(&FixedIdentity::unresolved(), &store).unwrap_err();
        assert!(matches!(err, Error::IdentityUnresolved(_)));
    }

    // --- properties ---

    /// The kinds of occupant a hook can have.
    #[derive(Debug, Clone)]
    enum Occupant {
        Empty,
        Requested,
        Naked,
        Molecule(Vec<bool>),
        Unreadable,
        /// A naked occupant plus a second bead wrongly pinned to the same agent.
        Crowded,
    }

    impl Occupant {
        fn extra_pinned(&self) -> Vec<String> {
            match self {
                Self::Crowded => vec!["gt-extra".to_string()],
                _ => vec![],
            }
        }
    }

    fn occupant() -> impl Strategy<Value = Occupant> {
        prop_oneof![
            Just(Occupant::Empty),
            Just(Occupant::Requested),
            Just(Occupant::Naked),
            prop::collection::vec(any::<bool>(), 0..5).prop_map(Occupant::Molecule),
            Just(Occupant::Unreadable),
            Just(Occupant::Crowded),
        ]
    }

    fn setup(occupant: &Occupant) -> MemoryStore {
        let mut store = MemoryStore::new();
        match occupant {
            Occupant::Empty | Occupant::Requested => {}
            Occupant::Naked => store.add(pinned("gt-old")),
            Occupant::Molecule(steps) => {
                store.add(pinned("gt-old").with_description("attached_molecule: mol-x"));
                let statuses: Vec<BeadStatus> = steps
                    .iter()
                    .map(|closed| if *closed { BeadStatus::Closed } else { BeadStatus::Open })
                    .collect();
                store.add_molecule("mol-x", &statuses);
            }
            Occupant::Unreadable => {
                store.add(pinned("gt-old").with_description("attached_molecule: mol-lost"));
            }
            Occupant::Crowded => {
                store.add(pinned("gt-old"));
                store.add(pinned("gt-extra"));
            }
        }
        if matches!(occupant, Occupant::Requested) {
            store.add(pinned("gt-new"));
        } else {
            store.add(open("gt-new"));
        }
        store
    }

    proptest! {
        #[test]
        fn prop_success_pins_requested_and_clears_occupant(occ in occupant(), force in any::<bool>()) {
            let store = setup(&occ);
            let request = HookRequest { force, ..HookRequest::new("gt-new") };
            match hook(&store, &request) {
                Ok(report) => {
                    // Extra occupants are reported, never touched.
                    let extras = occ.extra_pinned();
                    let mut expected = extras.clone();
                    expected.push("gt-new".to_string());
                    prop_assert_eq!(store.pinned_to(AGENT), expected);
                    prop_assert_eq!(report.extra_pinned, extras);
                    prop_assert!(store.get("gt-old").map_or(true, |b| b.status != BeadStatus::Pinned));
                }
                Err(Error::Conflict { .. }) => {
                    prop_assert!(!force);
                    prop_assert!(store.calls().is_empty());
                }
                Err(other) => {
                    prop_assert!(false, "unexpected error: {}", other);
                }
            }
        }

        #[test]
        fn prop_dry_run_never_mutates_and_plans_the_same(
            occ in occupant(),
            force in any::<bool>(),
        ) {
            let dry_store = setup(&occ);
            let wet_store = setup(&occ);
            let dry_request = HookRequest { force, dry_run: true, ..HookRequest::new("gt-new") };
            let dry = hook(&dry_store, &dry_request);
            let wet = hook(&wet_store, &HookRequest { force, ..HookRequest::new("gt-new") });

            prop_assert!(dry_store.calls().is_empty());
            match (dry, wet) {
                (Ok(dry), Ok(wet)) => {
                    prop_assert_eq!(&dry.decision, &wet.decision);
                    prop_assert_eq!(&dry.actions, &wet.actions);
                    prop_assert!(dry.dry_run);
                }
                (Err(Error::Conflict { .. }), Err(Error::Conflict { .. })) => {}
                (dry, wet) => {
                    prop_assert!(false, "dry {:?} vs wet {:?}", dry, wet);
                }
            }
        }

        #[test]
        fn prop_rehooking_is_idempotent(id in "gt-[a-z0-9]{1,6}", force in any::<bool>()) {
            let mut store = MemoryStore::new();
            store.add(pinned(&id));
            let request = HookRequest { force, ..HookRequest::new(id.clone()) };
            let report = hook(&store, &request).unwrap();
            prop_assert_eq!(report.decision, Decision::NoOp);
            prop_assert!(store.calls().is_empty());
        }

        #[test]
        fn prop_force_never_blocks(steps in prop::collection::vec(any::<bool>(), 1..6)) {
            prop_assume!(steps.iter().any(|closed| !closed));
            let store = setup(&Occupant::Molecule(steps));
            let existing = store.get("gt-old").unwrap();
            let decision = resolve(
                "gt-new",
                std::slice::from_ref(&existing),
                true,
                |bead| classify(bead, &store),
            );
            prop_assert_eq!(decision, Decision::ForceReplace { existing });
        }
    }
}
