//! Store configuration.
//!
//! # Example
//!
//! ```rust
//! use normcache::{Config, OrphanPolicy, StoreId};
//!
//! let config = Config::new()
//!     .identity(|value| {
//!         Ok(value
//!             .get("uuid")
//!             .and_then(|v| v.as_str())
//!             .map(StoreId::from))
//!     })
//!     .orphan_policy(OrphanPolicy::Collect);
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::HookError;
use crate::model::{default_identity, StoreId};

/// Resolves the identity of a keyed value, `Ok(None)` for non-entities.
pub type IdentityFn = dyn Fn(&Value) -> Result<Option<StoreId>, HookError> + Send + Sync;

/// Observes a value at a hook stage.
pub type HookFn = dyn Fn(&Value) -> Result<(), HookError> + Send + Sync;

/// What happens to an entity once nothing references or observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Keep it; it stays retrievable through `get`.
    #[default]
    Retain,
    /// Remove it, cascading to children that become orphans in turn.
    Collect,
}

/// Construction-time options for a [`Store`](crate::Store).
#[derive(Clone, Default)]
pub struct Config {
    pub(crate) identity: Option<Arc<IdentityFn>>,
    pub(crate) parse_hook: Option<Arc<HookFn>>,
    pub(crate) join_hook: Option<Arc<HookFn>>,
    pub(crate) orphan_policy: OrphanPolicy,
}

impl Config {
    /// Creates a configuration using default identity resolution and no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides identity resolution.
    ///
    /// The resolver is consulted for every keyed container met during
    /// normalization. Errors abort the current `parse`.
    pub fn identity<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Option<StoreId>, HookError> + Send + Sync + 'static,
    {
        self.identity = Some(Arc::new(f));
        self
    }

    /// Observes each entity payload discovered during `parse`, before it is
    /// inserted.
    pub fn on_parse<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.parse_hook = Some(Arc::new(f));
        self
    }

    /// Observes each freshly constructed joined value (not memo hits).
    pub fn on_join<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.join_hook = Some(Arc::new(f));
        self
    }

    /// Sets the orphan policy.
    pub fn orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Resolves the identity of `value` with the configured or default scheme.
    pub(crate) fn resolve_identity(&self, value: &Value) -> Result<Option<StoreId>, HookError> {
        match &self.identity {
            Some(identity) => identity(value),
            None => Ok(default_identity(value)),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("identity", &self.identity.as_ref().map(|_| "custom"))
            .field("parse_hook", &self.parse_hook.is_some())
            .field("join_hook", &self.join_hook.is_some())
            .field("orphan_policy", &self.orphan_policy)
            .finish()
    }
}
