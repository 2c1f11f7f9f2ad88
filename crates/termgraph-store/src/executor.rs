//! Runs a batch of remote-update descriptors against the store.

use termgraph_core::{CoreError, UpdateBatch, Workspace};

use crate::config::StoreConfig;
use crate::documents::{DocumentBuilder, SubjectUpdate};
use crate::transaction::TransactionClient;

/// Resolves every descriptor of `batch` against the current workspace.
///
/// Runs synchronously so the documents describe the settled local state
/// before any request is sent.
pub fn prepare(
    ws: &Workspace,
    config: &StoreConfig,
    batch: &UpdateBatch,
) -> Result<Vec<SubjectUpdate>, CoreError> {
    let builder = DocumentBuilder::new(ws, config);
    let mut updates = Vec::with_capacity(batch.len());
    for op in batch.iter() {
        updates.extend(builder.subject_updates(op)?);
    }
    Ok(updates)
}

/// Sends prepared subject updates one transaction at a time.
#[derive(Debug, Clone)]
pub struct Executor {
    client: TransactionClient,
}

impl Executor {
    pub fn new(client: TransactionClient) -> Self {
        Executor { client }
    }

    pub fn client(&self) -> &TransactionClient {
        &self.client
    }

    /// Replaces each subject in order and stops at the first failure.
    ///
    /// Errors never cross this boundary; they are logged and reported as
    /// `false`. Subjects already committed stay committed.
    pub async fn execute(&self, updates: &[SubjectUpdate]) -> bool {
        for (i, update) in updates.iter().enumerate() {
            match self.client.replace_subject(&update.subject, &update.document).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(
                        "Update of <{}> failed; {} of {} subjects persisted",
                        update.subject,
                        i,
                        updates.len()
                    );
                    return false;
                }
                Err(err) => {
                    tracing::warn!("Update of <{}> failed: {}", update.subject, err);
                    return false;
                }
            }
        }
        tracing::info!("Persisted {} subjects", updates.len());
        true
    }

    /// [`prepare`] followed by [`Executor::execute`].
    pub async fn run(&self, ws: &Workspace, config: &StoreConfig, batch: &UpdateBatch) -> bool {
        match prepare(ws, config, batch) {
            Ok(updates) => self.execute(&updates).await,
            Err(err) => {
                tracing::warn!("Could not build update documents: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termgraph_core::{Iri, Point, UpdateOp};

    #[test]
    fn prepare_expands_descriptors_in_batch_order() {
        let mut ws = Workspace::new();
        let d = ws.add_diagram("Main");
        let root = ws.packages.root_id();
        let a = ws.add_entity(Iri::from("urn:a"), root).unwrap();
        ws.place(a, d, Point::new(1.0, 2.0)).unwrap();
        let config = StoreConfig::new("http://store", Iri::from("urn:ctx"));

        let mut batch = UpdateBatch::new();
        batch.push(UpdateOp::Diagram { diagram: d });
        batch.push(UpdateOp::ElementDiagram { diagram: d, entity: a });
        batch.push(UpdateOp::Element { entity: a });

        let subjects: Vec<String> = prepare(&ws, &config, &batch)
            .unwrap()
            .into_iter()
            .map(|u| u.subject.to_string())
            .collect();
        assert_eq!(subjects, vec!["urn:ctx/diagram-1", "urn:a/diagram-1", "urn:a/diagram"]);
    }

    #[test]
    fn prepare_fails_on_unknown_entity() {
        let ws = Workspace::new();
        let config = StoreConfig::new("http://store", Iri::from("urn:ctx"));
        let mut batch = UpdateBatch::new();
        batch.push(UpdateOp::Element {
            entity: termgraph_core::EntityId(3),
        });
        assert!(prepare(&ws, &config, &batch).is_err());
    }
}
