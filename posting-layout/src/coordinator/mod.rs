//! Reorder coordinator
//!
//! Owns the single layout model of one template and runs every change to
//! it through one state machine:
//!
//! ```text
//! Idle → Computing → Persisting → Idle
//!                        │
//!                        └─(any write fails)→ Reloading → Idle
//! ```
//!
//! A drag is computed synchronously and the optimistic model is published
//! before any store call is made. The writes implied by the diff go out
//! concurrently. If one fails, the model is rebuilt from the store and a
//! [`Notice`] is broadcast. Operations arriving while not `Idle` are
//! rejected with [`LayoutError::Busy`]; the phase is observable through a
//! watch channel so the UI can lock the whole template meanwhile.
//!
//! Step and field CRUD (see `crud.rs`) skip the optimistic path: they call
//! the store and then reload.

mod crud;
mod event;
mod phase;

pub use event::{DragEnd, DragOutcome};
pub use phase::Phase;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::model::LayoutModel;
use crate::reconcile::{Notice, ReconciliationPolicy};
use crate::store::{StoreError, TemplateStore, TemplateTree};
use crate::types::CategoryId;
use phase::PhaseGuard;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

/// Serializes layout changes of one template and keeps the store in sync
pub struct ReorderCoordinator {
    store: Arc<dyn TemplateStore>,
    category: CategoryId,
    config: LayoutConfig,
    policy: ReconciliationPolicy,
    model: RwLock<Arc<LayoutModel>>,
    phase: watch::Sender<Phase>,
    notices: broadcast::Sender<Notice>,
}

impl ReorderCoordinator {
    /// Load the category's template, creating it if the category has none
    pub async fn open(
        store: Arc<dyn TemplateStore>,
        category: impl Into<CategoryId>,
        config: LayoutConfig,
    ) -> Result<Self> {
        config.validate()?;
        let category = category.into();

        let tree = match store
            .load_template_tree(&category)
            .await
            .map_err(|source| LayoutError::StoreReadFailed { source })?
        {
            Some(tree) => tree,
            None => {
                info!(%category, "no template for category, creating one");
                let template = store.create_template(&category).await.map_err(|source| {
                    LayoutError::StoreWriteFailed {
                        operation: "create template".into(),
                        source,
                    }
                })?;
                TemplateTree::new(template)
            }
        };

        let model = LayoutModel::from_tree(tree);
        if let Err(violation) = model.check_invariants() {
            warn!(%category, %violation, "stored layout violates invariants, repair_layout will fix it");
        }
        debug!(
            %category,
            steps = model.steps().len(),
            fields = model.fields().len(),
            "layout opened"
        );

        let (phase, _) = watch::channel(Phase::Idle);
        let (notices, _) = broadcast::channel(config.notice_capacity);

        Ok(Self {
            policy: ReconciliationPolicy::new(config.max_concurrent_writes),
            store,
            category,
            config,
            model: RwLock::new(Arc::new(model)),
            phase,
            notices,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the model the UI should render
    pub fn current_model(&self) -> Arc<LayoutModel> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn category(&self) -> &CategoryId {
        &self.category
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Observe phase changes, e.g. to disable drag input while not idle
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Subscribe to failure notices
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    // =========================================================================
    // Layout changes
    // =========================================================================

    /// Handle the end of a drag gesture
    pub async fn on_drag_end(&self, event: &DragEnd) -> Result<DragOutcome> {
        let guard = self.begin("drag")?;
        let current = self.current_model();

        let next = match compute_drag(&current, event) {
            Ok(next) => next,
            Err(err) => {
                // UI/engine mismatch, nothing was written
                warn!(error = %err, ?event, "drag rejected");
                return Err(err);
            }
        };

        self.commit("drag", guard, current, next).await
    }

    /// Move a step to another position in the form
    pub async fn move_step(&self, from: usize, to: usize) -> Result<DragOutcome> {
        let guard = self.begin("move step")?;
        let current = self.current_model();
        let next = current.with_step_reordered(from, to).inspect_err(|err| {
            warn!(error = %err, from, to, "step move rejected");
        })?;
        self.commit("move step", guard, current, next).await
    }

    /// Renumber every zone contiguously and persist whatever changed
    pub async fn repair_layout(&self) -> Result<DragOutcome> {
        let guard = self.begin("repair layout")?;
        let current = self.current_model();
        let next = current.compacted();
        self.commit("repair layout", guard, current, next).await
    }

    /// Discard the in-memory model and read the store again
    pub async fn reload(&self) -> Result<()> {
        let guard = self.begin("reload")?;
        guard.advance(Phase::Reloading);
        self.reload_from_store("reload").await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin(&self, operation: &str) -> Result<PhaseGuard<'_>> {
        PhaseGuard::acquire(&self.phase).map_err(|phase| {
            warn!(operation, %phase, "operation rejected while busy");
            LayoutError::Busy { phase }
        })
    }

    fn replace_model(&self, model: Arc<LayoutModel>) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = model;
    }

    fn notify(&self, notice: Notice) {
        warn!(?notice, "publishing notice");
        // no subscribers is fine
        let _ = self.notices.send(notice);
    }

    /// Publish `next` optimistically, persist the diff, reconcile on failure
    async fn commit(
        &self,
        operation: &str,
        guard: PhaseGuard<'_>,
        previous: Arc<LayoutModel>,
        next: LayoutModel,
    ) -> Result<DragOutcome> {
        let ops = previous.diff(&next);
        if ops.is_empty() {
            debug!(operation, "nothing to persist");
            return Ok(DragOutcome::Unchanged);
        }

        self.replace_model(Arc::new(next));
        guard.advance(Phase::Persisting);

        let report = self.policy.execute(self.store.as_ref(), ops).await;
        if report.is_clean() {
            info!(operation, writes = report.attempted, "layout persisted");
            return Ok(DragOutcome::Persisted {
                writes: report.attempted,
            });
        }

        guard.advance(Phase::Reloading);
        let attempted = report.attempted;
        let failed = report.failures.len();
        let message = report
            .into_first_error()
            .map(|e| e.to_string())
            .unwrap_or_default();
        error!(operation, attempted, failed, "layout writes failed, reloading");

        match self.policy.recover(self.store.as_ref(), &self.category).await {
            Ok(model) => {
                self.replace_model(Arc::new(model));
                self.notify(Notice::ChangesReverted {
                    operation: operation.to_string(),
                    attempted_writes: attempted,
                    failed_writes: failed,
                    message,
                });
                Ok(DragOutcome::Reconciled { attempted, failed })
            }
            Err(source) => {
                // keep the last model the store confirmed
                self.replace_model(previous);
                Err(self.reload_failed(operation, source))
            }
        }
    }

    /// Rebuild the model from the store after a direct store call
    async fn reload_from_store(&self, operation: &str) -> Result<()> {
        match self.policy.recover(self.store.as_ref(), &self.category).await {
            Ok(model) => {
                self.replace_model(Arc::new(model));
                debug!(operation, "layout reloaded");
                Ok(())
            }
            Err(source) => Err(self.reload_failed(operation, source)),
        }
    }

    /// Recover from a failed direct store call
    async fn write_failed(
        &self,
        operation: &str,
        attempted: usize,
        source: StoreError,
    ) -> LayoutError {
        error!(operation, error = %source, "store write failed, reloading");
        if let Err(err) = self.reload_from_store(operation).await {
            return err;
        }
        self.notify(Notice::ChangesReverted {
            operation: operation.to_string(),
            attempted_writes: attempted,
            failed_writes: 1,
            message: source.to_string(),
        });
        LayoutError::StoreWriteFailed {
            operation: operation.to_string(),
            source,
        }
    }

    fn reload_failed(&self, operation: &str, source: StoreError) -> LayoutError {
        error!(operation, error = %source, "reload from store failed");
        self.notify(Notice::ReloadFailed {
            operation: operation.to_string(),
            message: source.to_string(),
        });
        LayoutError::StoreReadFailed { source }
    }
}

/// Resolve the event's zones and build the new model
fn compute_drag(model: &LayoutModel, event: &DragEnd) -> Result<LayoutModel> {
    let resolver = model.resolver();
    let source = resolver.parse(event.view, &event.source_zone)?;
    let dest = resolver.parse(event.view, &event.dest_zone)?;

    if let Some(expected) = &event.field_id {
        let members = model.fields_in_zone(event.view, &source)?;
        match members.get(event.source_index) {
            Some(field) if &field.id == expected => {}
            _ => {
                return Err(LayoutError::invalid_index(
                    &source,
                    event.source_index,
                    members.len(),
                ))
            }
        }
    }

    model.with_moved(
        event.view,
        &source,
        event.source_index,
        &dest,
        event.dest_index,
    )
}
