//! In-memory template store.
//!
//! Stores exactly what it is given. Useful as a stand-in for the real store
//! in tests and for hosts that keep templates in process.

use super::{StepNode, StoreError, TemplateStore, TemplateTree};
use crate::types::{
    CategoryId, Field, FieldId, FieldPatch, Step, StepId, StepPatch, Template, TemplateId,
    TemplatePatch,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

#[derive(Debug, Default)]
struct MemoryState {
    templates: IndexMap<TemplateId, Template>,
    steps: IndexMap<StepId, Step>,
    fields: IndexMap<FieldId, Field>,
}

/// Template store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a tree
    pub fn with_tree(tree: TemplateTree) -> Self {
        let store = Self::new();
        store.insert_tree(tree);
        store
    }

    /// Insert or replace every record of a tree. Not counted as writes.
    pub fn insert_tree(&self, tree: TemplateTree) {
        let mut state = self.lock();
        state.templates.insert(tree.template.id.clone(), tree.template);
        for node in tree.steps {
            for field in node.fields {
                state.fields.insert(field.id.clone(), field);
            }
            state.steps.insert(node.step.id.clone(), node.step);
        }
    }

    /// Number of create/update/delete calls served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of a stored field
    pub fn field(&self, id: &FieldId) -> Option<Field> {
        self.lock().fields.get(id).cloned()
    }

    /// Snapshot of a stored step
    pub fn step(&self, id: &StepId) -> Option<Step> {
        self.lock().steps.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn count_write(&self, what: &str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        trace!(what, "memory store write");
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn load_template_tree(
        &self,
        category: &CategoryId,
    ) -> Result<Option<TemplateTree>, StoreError> {
        let state = self.lock();
        let Some(template) = state
            .templates
            .values()
            .find(|t| &t.category_id == category)
            .cloned()
        else {
            return Ok(None);
        };

        let mut steps: Vec<&Step> = state
            .steps
            .values()
            .filter(|s| s.template_id == template.id)
            .collect();
        steps.sort_by_key(|s| s.form_order);

        let steps = steps
            .into_iter()
            .map(|step| {
                let mut fields: Vec<Field> = state
                    .fields
                    .values()
                    .filter(|f| f.form.step_id == step.id)
                    .cloned()
                    .collect();
                fields.sort_by_key(|f| f.form.order);
                StepNode {
                    step: step.clone(),
                    fields,
                }
            })
            .collect();

        Ok(Some(TemplateTree { template, steps }))
    }

    async fn create_template(&self, category: &CategoryId) -> Result<Template, StoreError> {
        let mut state = self.lock();
        if state.templates.values().any(|t| &t.category_id == category) {
            return Err(StoreError::rejected(format!(
                "category {} already has a template",
                category
            )));
        }
        let template = Template::new(category.clone());
        state.templates.insert(template.id.clone(), template.clone());
        drop(state);
        self.count_write("create_template");
        Ok(template)
    }

    async fn update_template(
        &self,
        id: &TemplateId,
        patch: &TemplatePatch,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        let template = state
            .templates
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("template", id))?;
        patch.apply_to(template);
        drop(state);
        self.count_write("update_template");
        Ok(())
    }

    async fn create_step(&self, step: &Step) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.templates.contains_key(&step.template_id) {
            return Err(StoreError::not_found("template", &step.template_id));
        }
        if state.steps.contains_key(&step.id) {
            return Err(StoreError::rejected(format!("duplicate step id {}", step.id)));
        }
        state.steps.insert(step.id.clone(), step.clone());
        drop(state);
        self.count_write("create_step");
        Ok(())
    }

    async fn update_step(&self, id: &StepId, patch: &StepPatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        let step = state
            .steps
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("step", id))?;
        patch.apply_to(step);
        drop(state);
        self.count_write("update_step");
        Ok(())
    }

    async fn delete_step(&self, id: &StepId) -> Result<(), StoreError> {
        let mut state = self.lock();
        state
            .steps
            .shift_remove(id)
            .ok_or_else(|| StoreError::not_found("step", id))?;
        drop(state);
        self.count_write("delete_step");
        Ok(())
    }

    async fn create_field(&self, field: &Field) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.steps.contains_key(&field.form.step_id) {
            return Err(StoreError::not_found("step", &field.form.step_id));
        }
        if state.fields.contains_key(&field.id) {
            return Err(StoreError::rejected(format!(
                "duplicate field id {}",
                field.id
            )));
        }
        state.fields.insert(field.id.clone(), field.clone());
        drop(state);
        self.count_write("create_field");
        Ok(())
    }

    async fn update_field(&self, id: &FieldId, patch: &FieldPatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(step_id) = &patch.step_id {
            if !state.steps.contains_key(step_id) {
                return Err(StoreError::not_found("step", step_id));
            }
        }
        let field = state
            .fields
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("field", id))?;
        patch.apply_to(field);
        drop(state);
        self.count_write("update_field");
        Ok(())
    }

    async fn delete_field(&self, id: &FieldId) -> Result<(), StoreError> {
        let mut state = self.lock();
        state
            .fields
            .shift_remove(id)
            .ok_or_else(|| StoreError::not_found("field", id))?;
        drop(state);
        self.count_write("delete_field");
        Ok(())
    }
}
