//! Reconciliation policy
//!
//! A batch of layout writes is issued concurrently and every result is
//! collected. If any write fails, the optimistic model is thrown away and
//! the authoritative tree is read back from the store. Partial writes are
//! never rolled back one by one: after renumbering, a half-applied batch
//! leaves order attributes in a mix of old and new values, and only the
//! store knows which ones landed.

use crate::model::LayoutModel;
use crate::store::{StoreError, StoreOp, TemplateStore};
use crate::types::CategoryId;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

/// A single write that did not go through
#[derive(Debug)]
pub struct WriteFailure {
    pub op: StoreOp,
    pub error: StoreError,
}

/// Result of issuing one batch of writes
#[derive(Debug, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub failures: Vec<WriteFailure>,
}

impl BatchReport {
    /// True when every write succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    /// Consume the report, yielding the first failure if any
    pub fn into_first_error(self) -> Option<StoreError> {
        self.failures.into_iter().next().map(|f| f.error)
    }
}

/// User-visible notice published when persistence goes wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Writes failed; the layout now shows what the store holds
    ChangesReverted {
        operation: String,
        attempted_writes: usize,
        failed_writes: usize,
        message: String,
    },
    /// The store could not be read back; a manual refresh is required
    ReloadFailed { operation: String, message: String },
}

/// Reload-from-store on any failure
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationPolicy {
    max_concurrent_writes: usize,
}

impl ReconciliationPolicy {
    pub fn new(max_concurrent_writes: usize) -> Self {
        Self {
            max_concurrent_writes: max_concurrent_writes.max(1),
        }
    }

    /// Issue every write concurrently and wait for all of them to settle.
    ///
    /// There is no ordering between the writes and a failure does not stop
    /// the others.
    pub async fn execute(&self, store: &dyn TemplateStore, ops: Vec<StoreOp>) -> BatchReport {
        let attempted = ops.len();
        debug!(
            attempted,
            concurrency = self.max_concurrent_writes,
            "issuing store writes"
        );

        let results: Vec<(StoreOp, Result<(), StoreError>)> = stream::iter(ops)
            .map(|op| async move {
                let result = op.apply(store).await;
                (op, result)
            })
            .buffer_unordered(self.max_concurrent_writes)
            .collect()
            .await;

        let failures: Vec<WriteFailure> = results
            .into_iter()
            .filter_map(|(op, result)| result.err().map(|error| WriteFailure { op, error }))
            .collect();

        for failure in &failures {
            warn!(op = %failure.op, error = %failure.error, "store write failed");
        }

        BatchReport {
            attempted,
            failures,
        }
    }

    /// Read the authoritative tree back and rebuild the model from it
    pub async fn recover(
        &self,
        store: &dyn TemplateStore,
        category: &CategoryId,
    ) -> Result<LayoutModel, StoreError> {
        let tree = store
            .load_template_tree(category)
            .await?
            .ok_or_else(|| StoreError::not_found("template", category))?;
        let model = LayoutModel::from_tree(tree);
        if let Err(violation) = model.check_invariants() {
            warn!(%category, %violation, "reloaded layout violates invariants");
        }
        Ok(model)
    }
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_CONCURRENT_WRITES)
    }
}
