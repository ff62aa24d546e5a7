//! Error types for normalization, reconstruction and graph validation.

use thiserror::Error;

use crate::model::StoreId;

/// Boxed error returned by user-supplied hooks and identity resolvers.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Observation point at which a hook fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Fired for each entity payload discovered during `parse`.
    Parse,
    /// Fired for each freshly constructed joined value.
    Join,
}

impl HookStage {
    /// Returns the stage name used in error messages and log events.
    pub fn name(&self) -> &'static str {
        match self {
            HookStage::Parse => "parse",
            HookStage::Join => "join",
        }
    }
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised by [`Store`](crate::Store) operations.
///
/// A failure during `parse` aborts the remainder of that call. Entities that
/// were inserted before the failure stay inserted; there is no rollback.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The id was never inserted into the store.
    #[error("unknown entity: {id}")]
    UnknownEntity { id: StoreId },

    /// A configured hook returned an error.
    #[error("{stage} hook failed: {source}")]
    Hook {
        stage: HookStage,
        #[source]
        source: HookError,
    },

    /// The configured identity resolver returned an error.
    #[error("identity resolution failed: {source}")]
    Identity {
        #[source]
        source: HookError,
    },
}

impl CacheError {
    pub(crate) fn unknown(id: impl Into<StoreId>) -> Self {
        CacheError::UnknownEntity { id: id.into() }
    }

    /// Returns true if this is an [`CacheError::UnknownEntity`] fault.
    pub fn is_unknown_entity(&self) -> bool {
        matches!(self, CacheError::UnknownEntity { .. })
    }
}

/// Structural inconsistency found by [`check_graph`](crate::validate::check_graph).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("entity {owner} refers to missing entity {child}")]
    DanglingRef { owner: StoreId, child: StoreId },

    #[error("entity {child} lists missing parent {parent}")]
    DanglingParent { child: StoreId, parent: StoreId },

    #[error("entity {child} is referenced by {parent} but does not list it as a parent")]
    MissingParentLink { parent: StoreId, child: StoreId },
}
