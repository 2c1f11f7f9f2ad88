//! Core error types for termgraph-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Every workspace
//! operation that receives an unknown id fails immediately with one of the
//! `*NotFound` variants.

use crate::id::{DiagramId, EntityId, Iri, LinkId, PackageId};
use thiserror::Error;

/// Core errors produced by the termgraph-core crate.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// An entity id was not found in the workspace.
    #[error("entity not found: EntityId({id})", id = id.0)]
    EntityNotFound { id: EntityId },

    /// A link id was not found in the workspace.
    #[error("link not found: LinkId({id})", id = id.0)]
    LinkNotFound { id: LinkId },

    /// A diagram id was not found in the workspace.
    #[error("diagram not found: DiagramId({id})", id = id.0)]
    DiagramNotFound { id: DiagramId },

    /// A package id was not found in the package tree.
    #[error("package not found: PackageId({id})", id = id.0)]
    PackageNotFound { id: PackageId },

    /// An entity's IRI does not resolve in the term cache.
    #[error("term not found: <{iri}>")]
    TermNotFound { iri: Iri },

    /// A link endpoint is not an active entity.
    #[error("inactive endpoint: EntityId({id})", id = id.0)]
    InactiveEndpoint { id: EntityId },

    /// A multiplicity string could not be parsed.
    #[error("invalid cardinality: '{value}'")]
    InvalidCardinality { value: String },

    /// A workspace invariant was violated.
    #[error("workspace inconsistency: {reason}")]
    Inconsistency { reason: String },
}
