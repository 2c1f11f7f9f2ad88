//! Connection settings for the remote triple store.

use serde::{Deserialize, Serialize};
use termgraph_core::{vocab, Iri};

/// How the transaction client reacts to a failed DELETE or ADD step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPolicy {
    /// Still send COMMIT after a failed step and report failure afterwards.
    ///
    /// This can leave both the old and the new statements of a subject in
    /// the store. With `false` the transaction is rolled back instead.
    pub commit_after_failed_step: bool,
}

impl Default for TransactionPolicy {
    fn default() -> Self {
        TransactionPolicy {
            commit_after_failed_step: true,
        }
    }
}

/// Where and how workspace records are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Repository URL; transactions are opened at `{endpoint}/transactions`.
    pub endpoint: String,
    /// Graph holding the application's workspace records.
    pub application_context: Iri,
    /// Namespace bound to the `og:` prefix in written documents.
    pub vocabulary: String,
    #[serde(default)]
    pub policy: TransactionPolicy,
}

impl StoreConfig {
    pub fn new(endpoint: impl Into<String>, application_context: Iri) -> Self {
        StoreConfig {
            endpoint: endpoint.into(),
            application_context,
            vocabulary: vocab::OG.to_string(),
            policy: TransactionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TransactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// URL used to open a transaction.
    pub fn transactions_url(&self) -> String {
        format!("{}/transactions", self.endpoint.trim_end_matches('/'))
    }
}
