//! Who is calling, and whether they may hook work.
//!
//! Environment variables are read here and nowhere else. The resulting
//! [`AgentClass`] and identity are passed explicitly into
//! [`crate::hook::run_hook`], which never looks at the environment.

use crate::error::{Error, Result};
use crate::traits::IdentityResolver;

/// Set (non-empty) inside ephemeral workers; names the worker.
pub const EPHEMERAL_ENV: &str = "GT_POLECAT";

/// Explicit actor identity.
pub const ACTOR_ENV: &str = "BD_ACTOR";

/// Role-derived identity, consulted after [`ACTOR_ENV`].
pub const ROLE_ENV: &str = "GT_ROLE";

/// The kind of agent making the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AgentClass {
    /// A long-lived agent with its own hook.
    #[default]
    Durable,
    /// A short-lived task executor. These hand work back with `gt done`
    /// instead of hooking it.
    Ephemeral {
        /// The worker's name.
        name: String,
    },
}

impl AgentClass {
    /// Classify the current process from [`EPHEMERAL_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_marker(std::env::var(EPHEMERAL_ENV).ok())
    }

    /// Classify from the value of the ephemeral-worker marker.
    #[must_use]
    pub fn from_marker(marker: Option<String>) -> Self {
        match marker {
            Some(name) if !name.trim().is_empty() => Self::Ephemeral { name },
            _ => Self::Durable,
        }
    }

    /// Reject classes that may not hook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreconditionDenied`] for ephemeral workers.
    pub fn ensure_can_hook(&self) -> Result<()> {
        match self {
            Self::Durable => Ok(()),
            Self::Ephemeral { name } => Err(Error::PreconditionDenied { agent: name.clone() }),
        }
    }
}

/// Identity resolver over the process environment, with a configured fallback.
#[derive(Debug, Clone, Default)]
pub struct EnvIdentity {
    fallback: Option<String>,
}

impl EnvIdentity {
    /// Create a resolver that falls back to `fallback` when neither
    /// [`ACTOR_ENV`] nor [`ROLE_ENV`] is set.
    #[must_use]
    pub const fn new(fallback: Option<String>) -> Self {
        Self { fallback }
    }

    /// Resolve using `lookup` in place of the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityUnresolved`] when no source yields a
    /// non-empty identity.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        [ACTOR_ENV, ROLE_ENV]
            .into_iter()
            .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()))
            .into_iter()
            .chain(self.fallback.clone())
            .map(|id| id.trim().to_string())
            .find(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::IdentityUnresolved(format!(
                    "set {ACTOR_ENV} or {ROLE_ENV}, or `actor` in the project config"
                ))
            })
    }
}

impl IdentityResolver for EnvIdentity {
    fn resolve_self(&self) -> Result<String> {
        self.resolve_with(|var| std::env::var(var).ok())
    }
}
