//! Diagram-level views over the shared workspace graph.
//!
//! [`Transformer`] switches a diagram between the FULL and COMPACT
//! representations. [`Synchronizer`] decides which links are drawn when an
//! entity becomes visible and recomputes their routing. Both borrow the
//! [`Workspace`](termgraph_core::Workspace) for the duration of a call and
//! keep no state between calls. Every operation returns the
//! [`UpdateBatch`](termgraph_core::UpdateBatch) needed to persist its effect;
//! nothing here talks to the remote store.

pub mod representation;
pub mod sync;

pub use representation::{Transformer, Transition};
pub use sync::{RestoreOptions, Synchronizer, VertexPolicy};
