//! Project snapshot files.
//!
//! A snapshot holds everything needed to reopen a project offline: the
//! workspace, the term cache and the relationship-type catalog.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use termgraph_core::{RelationshipCatalog, TermCache, Workspace};

use crate::error::{DeserializationError, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub workspace: Workspace,
    pub terms: TermCache,
    pub catalog: RelationshipCatalog,
}

impl ProjectSnapshot {
    pub fn new(workspace: Workspace, terms: TermCache, catalog: RelationshipCatalog) -> Self {
        ProjectSnapshot {
            workspace,
            terms,
            catalog,
        }
    }

    /// Reads a snapshot and checks that its workspace is internally
    /// consistent. A workspace that breaks the connections invariant is
    /// reported as [`DeserializationError::InvalidValue`].
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path)?;
        let snapshot: ProjectSnapshot =
            serde_json::from_str(&text).map_err(DeserializationError::from)?;
        snapshot
            .workspace
            .validate()
            .map_err(|err| DeserializationError::InvalidValue {
                path: "$.workspace".to_string(),
                reason: err.to_string(),
            })?;
        tracing::debug!("Loaded snapshot from {}", path.display());
        Ok(snapshot)
    }

    /// Writes the snapshot as pretty-printed JSON, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        tracing::debug!("Saved snapshot to {}", path.display());
        Ok(())
    }
}
