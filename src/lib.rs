//! # `gt_hook`
//!
//! Attach beads to an agent's hook: the single bead pinned to that agent.
//!
//! Hooking resolves any existing occupant by its completion state. Finished
//! work is replaced automatically, unfinished work blocks unless forced,
//! and an occupant whose progress cannot be read counts as unfinished.
//!
//! The store and identity are traits ([`traits::BeadStore`],
//! [`traits::IdentityResolver`]); [`beads::BdStore`] implements the store by
//! shelling out to `bd`.

pub mod beads;
#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod event_log;
pub mod hook;
pub mod identity;
pub mod paths;
pub mod testing;
pub mod traits;

pub use command::RealCommandRunner;
pub use error::{Error, Result};
pub use hook::{hook_status, run_hook, Decision, HookReport, HookRequest};
pub use traits::{BeadStore, CommandRunner, IdentityResolver};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
