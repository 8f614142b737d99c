//! core::verify
//!
//! Semantic validation of constructed entities.
//!
//! Structural checks belong to [`crate::core::schema`]; the rules here need
//! the whole entity, such as the coupling between a unit's model type and its
//! tools or cloud container.
//!
//! # Invariants
//!
//! - Never mutates the entity
//! - Never runs implicitly: importers and constructors do not call it, so a
//!   structurally valid but semantically incomplete entity can exist while it
//!   is being assembled

use thiserror::Error;

use super::types::UnitTag;

/// Errors from semantic validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unit \"{0}\" missing agent status not valid")]
    MissingAgentStatus(UnitTag),

    #[error("unit \"{0}\" missing workload status not valid")]
    MissingWorkloadStatus(UnitTag),

    #[error("unit \"{0}\" missing tools not valid")]
    MissingTools(UnitTag),

    #[error("unit \"{0}\" with tools not valid")]
    UnexpectedTools(UnitTag),

    #[error("unit \"{0}\" missing cloud container not valid")]
    MissingCloudContainer(UnitTag),

    #[error("remote application \"{application}\" binding for unknown endpoint \"{endpoint}\" not valid")]
    UnknownBinding {
        application: String,
        endpoint: String,
    },

    #[error("unit \"{unit}\" {relation} \"{target}\" not found")]
    DanglingReference {
        unit: UnitTag,
        relation: Relation,
        target: UnitTag,
    },
}

/// The kind of weak unit-to-unit reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Principal,
    Subordinate,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Principal => f.write_str("principal"),
            Relation::Subordinate => f.write_str("subordinate"),
        }
    }
}

/// Post-construction semantic checks.
pub trait Validate {
    /// Check the entity's cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule violation found.
    fn validate(&self) -> Result<(), ValidationError>;
}
