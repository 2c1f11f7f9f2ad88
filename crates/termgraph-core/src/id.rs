//! Identity newtypes for workspace elements.
//!
//! Internal ids ([`EntityId`], [`LinkId`], [`DiagramId`], [`PackageId`]) are
//! session-local integers. [`Iri`] is the external name of a term. The two
//! families are distinct types so that an internal id can never be passed
//! where an IRI is expected, and vice versa.

use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};

/// Stable entity identifier. Maps to a petgraph `NodeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Stable link identifier. Maps to a petgraph `EdgeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub u32);

/// Diagram index. Diagrams are appended and never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiagramId(pub u32);

/// Package tree node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId(pub u32);

/// Internationalized Resource Identifier of a term, relationship type or
/// persisted record.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Iri(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a new IRI with `suffix` appended verbatim.
    pub fn join(&self, suffix: &str) -> Iri {
        Iri(format!("{}{}", self.0, suffix))
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Iri(value.to_string())
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Iri(value)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DiagramId {
    /// Position of the diagram in the workspace's diagram list.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// One-based ordinal used in persisted record IRIs (`.../diagram-1`).
    pub fn ordinal(self) -> u32 {
        self.0 + 1
    }
}

// Bridge between the workspace ids and petgraph indices.

impl From<NodeIndex<u32>> for EntityId {
    fn from(idx: NodeIndex<u32>) -> Self {
        EntityId(idx.index() as u32)
    }
}

impl From<EntityId> for NodeIndex<u32> {
    fn from(id: EntityId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

impl From<EdgeIndex<u32>> for LinkId {
    fn from(idx: EdgeIndex<u32>) -> Self {
        LinkId(idx.index() as u32)
    }
}

impl From<LinkId> for EdgeIndex<u32> {
    fn from(id: LinkId) -> Self {
        EdgeIndex::new(id.0 as usize)
    }
}
