//! Remote-update descriptors.
//!
//! Workspace mutations that must reach the remote store are described by
//! [`UpdateOp`] values. The descriptors name *what* changed; the store layer
//! reads the current workspace state when it turns them into statements, so
//! a descriptor emitted early in a batch always persists the settled state.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::id::{DiagramId, EntityId, LinkId};

/// One record of workspace state to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UpdateOp {
    /// The entity's diagram-independent record (active flag, diagram list).
    Element { entity: EntityId },
    /// The entity's position and visibility on one diagram.
    ElementDiagram { diagram: DiagramId, entity: EntityId },
    /// The link record (endpoints, type, cardinalities, active flag).
    Link { link: LinkId },
    /// The link's routing vertices on one diagram.
    LinkVertices { diagram: DiagramId, link: LinkId },
    /// Removal of `count` stored vertices starting at `from`.
    DeleteLinkVertices {
        diagram: DiagramId,
        link: LinkId,
        from: usize,
        count: usize,
    },
    /// Diagram settings (name, representation, active flag).
    Diagram { diagram: DiagramId },
}

/// Ordered, duplicate-free collection of descriptors.
///
/// Several restores can be merged into one batch and sent in a single round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    ops: IndexSet<UpdateOp>,
}

impl UpdateBatch {
    pub fn new() -> Self {
        UpdateBatch::default()
    }

    /// Appends `op` unless an identical descriptor is already queued.
    pub fn push(&mut self, op: UpdateOp) {
        self.ops.insert(op);
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = UpdateOp>) {
        self.ops.extend(ops);
    }

    pub fn merge(&mut self, other: UpdateBatch) {
        self.ops.extend(other.ops);
    }

    pub fn contains(&self, op: &UpdateOp) -> bool {
        self.ops.contains(op)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpdateOp> {
        self.ops.iter()
    }

    pub fn into_vec(self) -> Vec<UpdateOp> {
        self.ops.into_iter().collect()
    }
}

impl FromIterator<UpdateOp> for UpdateBatch {
    fn from_iter<T: IntoIterator<Item = UpdateOp>>(iter: T) -> Self {
        UpdateBatch {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for UpdateBatch {
    type Item = UpdateOp;
    type IntoIter = indexmap::set::IntoIter<UpdateOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
