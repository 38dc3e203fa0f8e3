//! Template Store contract
//!
//! The engine never owns persistence. It talks to a [`TemplateStore`] that
//! loads the full template tree and applies per-entity writes. Each call is
//! atomic on its own; nothing groups calls into a transaction, which is why
//! a failed batch is reconciled by reloading (see [`crate::reconcile`]).

mod memory;

pub use memory::MemoryStore;

use crate::types::{
    CategoryId, Field, FieldId, FieldPatch, Step, StepId, StepPatch, Template, TemplateId,
    TemplatePatch,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors reported by a template store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity missing from the store
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The store refused the write (validation, conflict)
    #[error("write rejected: {message}")]
    Rejected { message: String },

    /// Transport or storage failure
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn backend(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(error))
    }
}

/// A step together with the fields it owns, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepNode {
    pub step: Step,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Template → steps → fields, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTree {
    pub template: Template,
    #[serde(default)]
    pub steps: Vec<StepNode>,
}

impl TemplateTree {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            steps: Vec::new(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.steps.iter().map(|node| node.fields.len()).sum()
    }
}

/// Persistence access for templates, steps and fields
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Read the full tree of a category's template, if one exists
    async fn load_template_tree(
        &self,
        category: &CategoryId,
    ) -> Result<Option<TemplateTree>, StoreError>;

    async fn create_template(&self, category: &CategoryId) -> Result<Template, StoreError>;

    async fn update_template(
        &self,
        id: &TemplateId,
        patch: &TemplatePatch,
    ) -> Result<(), StoreError>;

    async fn create_step(&self, step: &Step) -> Result<(), StoreError>;

    async fn update_step(&self, id: &StepId, patch: &StepPatch) -> Result<(), StoreError>;

    async fn delete_step(&self, id: &StepId) -> Result<(), StoreError>;

    async fn create_field(&self, field: &Field) -> Result<(), StoreError>;

    async fn update_field(&self, id: &FieldId, patch: &FieldPatch) -> Result<(), StoreError>;

    async fn delete_field(&self, id: &FieldId) -> Result<(), StoreError>;
}

/// One write implied by a layout change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOp {
    UpdateField { id: FieldId, patch: FieldPatch },
    UpdateStep { id: StepId, patch: StepPatch },
}

impl StoreOp {
    /// Issue the write against a store
    pub async fn apply(&self, store: &dyn TemplateStore) -> Result<(), StoreError> {
        match self {
            StoreOp::UpdateField { id, patch } => store.update_field(id, patch).await,
            StoreOp::UpdateStep { id, patch } => store.update_step(id, patch).await,
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOp::UpdateField { id, .. } => write!(f, "update field {}", id),
            StoreOp::UpdateStep { id, .. } => write!(f, "update step {}", id),
        }
    }
}
