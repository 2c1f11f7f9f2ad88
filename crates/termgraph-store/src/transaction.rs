//! Client for the store's transaction protocol.
//!
//! A transaction is opened with `POST {endpoint}/transactions`; the returned
//! `Location` header is its handle. Steps are `PUT {handle}?action=...`:
//! GET (read statements), DELETE and ADD (JSON-LD bodies), then COMMIT.
//! Steps of one transaction are always sent strictly in sequence.
//!
//! Each subject is updated in its own transaction. There is no atomicity
//! across subjects.

use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response, Url};
use termgraph_core::Iri;

use crate::config::{StoreConfig, TransactionPolicy};
use crate::error::{Action, StoreError};
use crate::jsonld::JsonLdDocument;

const JSON_LD: &str = "application/ld+json";

/// Pattern for a GET step. Unset positions match anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementPattern<'a> {
    pub subject: Option<&'a Iri>,
    pub predicate: Option<&'a Iri>,
    pub object: Option<&'a Iri>,
}

impl<'a> StatementPattern<'a> {
    pub fn subject(iri: &'a Iri) -> Self {
        StatementPattern {
            subject: Some(iri),
            ..Self::default()
        }
    }

    pub fn predicate(iri: &'a Iri) -> Self {
        StatementPattern {
            predicate: Some(iri),
            ..Self::default()
        }
    }

    pub fn object(iri: &'a Iri) -> Self {
        StatementPattern {
            object: Some(iri),
            ..Self::default()
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("action", "GET".to_string())];
        let parts = [("subj", self.subject), ("pred", self.predicate), ("obj", self.object)];
        for (key, iri) in parts {
            if let Some(iri) = iri {
                query.push((key, format!("<{}>", iri)));
            }
        }
        query
    }
}

/// Sends transactions to one repository.
#[derive(Debug, Clone)]
pub struct TransactionClient {
    http: Client,
    transactions_url: String,
    policy: TransactionPolicy,
}

impl TransactionClient {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &StoreConfig, http: Client) -> Self {
        TransactionClient {
            http,
            transactions_url: config.transactions_url(),
            policy: config.policy,
        }
    }

    pub fn policy(&self) -> TransactionPolicy {
        self.policy
    }

    /// Opens a transaction and returns its absolute URL.
    pub async fn begin(&self) -> Result<Url, StoreError> {
        let response = self
            .http
            .post(&self.transactions_url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        check(Action::Begin, &response)?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(StoreError::MissingLocation)?;
        let base = parse_url(&self.transactions_url)?;
        base.join(location).map_err(|err| StoreError::InvalidUrl {
            url: location.to_string(),
            reason: err.to_string(),
        })
    }

    /// Reads the statements matching `pattern` inside a short-lived transaction.
    ///
    /// Returns `None` when the store has no matching statements. The read
    /// transaction is rolled back afterwards; a failed rollback is only logged.
    pub async fn get(&self, pattern: StatementPattern<'_>) -> Result<Option<JsonLdDocument>, StoreError> {
        let txn = self.begin().await?;
        let result = self.read(&txn, pattern).await;
        self.rollback(&txn).await;

        Ok(result?.filter(|doc| !doc.is_empty()))
    }

    /// Applies a delete/add pair as one transaction.
    ///
    /// DELETE is sent before ADD, then COMMIT. Returns `Ok(false)` when any
    /// step failed. Under the default policy COMMIT is still attempted after
    /// a failed step; otherwise the transaction is rolled back. Only a failure
    /// to open the transaction is returned as an error.
    pub async fn apply(
        &self,
        delete: Option<&JsonLdDocument>,
        add: Option<&JsonLdDocument>,
    ) -> Result<bool, StoreError> {
        let txn = self.begin().await?;
        let mut ok = true;

        for (action, body) in [(Action::Delete, delete), (Action::Add, add)] {
            let Some(body) = body else {
                continue;
            };
            if let Err(err) = self.step(&txn, action, Some(body)).await {
                tracing::warn!("Transaction {} failed: {}", txn, err);
                ok = false;
                if !self.policy.commit_after_failed_step {
                    self.rollback(&txn).await;
                    return Ok(false);
                }
            }
        }

        if let Err(err) = self.step(&txn, Action::Commit, None).await {
            tracing::warn!("Transaction {} failed: {}", txn, err);
            return Ok(false);
        }
        if ok {
            tracing::info!("Committed transaction {}", txn);
        }
        Ok(ok)
    }

    /// Replaces every statement about `subject` with `statements`.
    ///
    /// Reads the current statements first, then deletes them and adds the new
    /// ones in a second transaction. When the store knows nothing about the
    /// subject no DELETE step is sent. An empty `statements` document only
    /// deletes.
    pub async fn replace_subject(&self, subject: &Iri, statements: &JsonLdDocument) -> Result<bool, StoreError> {
        let existing = self.get(StatementPattern::subject(subject)).await?;
        let add = (!statements.is_empty()).then_some(statements);
        if existing.is_none() && add.is_none() {
            tracing::debug!("Nothing to replace for <{}>", subject);
            return Ok(true);
        }
        self.apply(existing.as_ref(), add).await
    }

    /// Removes every statement in which `iri` occurs as subject, predicate or object.
    ///
    /// The three reads happen before any delete is sent. Returns `Ok(false)`
    /// as soon as one delete transaction fails.
    pub async fn delete_subject(&self, iri: &Iri) -> Result<bool, StoreError> {
        let patterns = [
            StatementPattern::subject(iri),
            StatementPattern::predicate(iri),
            StatementPattern::object(iri),
        ];
        let mut found = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            found.push(self.get(pattern).await?);
        }
        for doc in found.iter().flatten() {
            if !self.apply(Some(doc), None).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn read(&self, txn: &Url, pattern: StatementPattern<'_>) -> Result<Option<JsonLdDocument>, StoreError> {
        let response = self
            .http
            .put(txn.clone())
            .query(&pattern.query())
            .header(ACCEPT, JSON_LD)
            .send()
            .await?;
        check(Action::Get, &response)?;
        let body = response.text().await?;
        Ok(JsonLdDocument::parse(&body)?)
    }

    async fn step(&self, txn: &Url, action: Action, body: Option<&JsonLdDocument>) -> Result<(), StoreError> {
        let mut request = self.http.put(txn.clone());
        if let Some(value) = action.as_query() {
            request = request.query(&[("action", value)]);
        }
        request = match body {
            Some(doc) => request
                .header(CONTENT_TYPE, JSON_LD)
                .body(serde_json::to_vec(doc)?),
            None => request.header(CONTENT_TYPE, "application/json"),
        };
        let response = request.send().await?;
        check(action, &response)
    }

    /// Best-effort rollback; the outcome does not affect the caller.
    async fn rollback(&self, txn: &Url) {
        match self.http.delete(txn.clone()).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => tracing::debug!(
                "Rollback of {} returned status {}",
                txn,
                response.status()
            ),
            Err(err) => tracing::debug!("Rollback of {} failed: {}", txn, err),
        }
    }
}

fn check(action: Action, response: &Response) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::StepFailed {
            action,
            status: status.as_u16(),
        })
    }
}

fn parse_url(url: &str) -> Result<Url, StoreError> {
    Url::parse(url).map_err(|err| StoreError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })
}
