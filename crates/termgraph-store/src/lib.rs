//! Remote persistence for termgraph workspaces.
//!
//! Workspace changes arrive as [`termgraph_core::UpdateOp`] descriptors.
//! [`executor::prepare`] turns them into per-subject JSON-LD documents and
//! [`executor::Executor`] replaces each subject in the store through the
//! transaction protocol implemented by [`transaction::TransactionClient`].
//!
//! Local files are covered by [`save::DiagramSave`] (one diagram) and
//! [`snapshot::ProjectSnapshot`] (a whole project).

pub mod config;
pub mod documents;
pub mod error;
pub mod executor;
pub mod jsonld;
pub mod save;
pub mod snapshot;
pub mod transaction;

pub use config::{StoreConfig, TransactionPolicy};
pub use documents::{DocumentBuilder, SubjectUpdate};
pub use error::{Action, DeserializationError, StoreError};
pub use executor::{prepare, Executor};
pub use jsonld::JsonLdDocument;
pub use save::{DiagramSave, NodeKind, SavedLink, SavedNode};
pub use snapshot::ProjectSnapshot;
pub use transaction::{StatementPattern, TransactionClient};
