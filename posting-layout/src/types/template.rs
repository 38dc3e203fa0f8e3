//! Template and step records.

use super::ids::{CategoryId, StepId, TemplateId};
use serde::{Deserialize, Serialize};

/// The posting template of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub published: bool,
}

impl Template {
    /// Create an unpublished template for a category
    pub fn new(category_id: impl Into<CategoryId>) -> Self {
        Self {
            id: TemplateId::new(),
            category_id: category_id.into(),
            published: false,
        }
    }
}

/// A page of the multi-step posting form.
///
/// `form_order` is 1-based and contiguous across the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub template_id: TemplateId,
    pub form_order: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl Step {
    /// Create a step with a fresh id
    pub fn new(template_id: TemplateId, title: impl Into<String>, form_order: u32) -> Self {
        Self {
            id: StepId::new(),
            template_id,
            form_order,
            title: title.into(),
            description: None,
            icon: None,
            required: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Admin input for creating a step. Order and ids are assigned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl StepDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Materialize the draft as a step at the given position
    pub fn into_step(self, template_id: TemplateId, form_order: u32) -> Step {
        Step {
            id: StepId::new(),
            template_id,
            form_order,
            title: self.title,
            description: self.description,
            icon: self.icon,
            required: self.required,
        }
    }
}
