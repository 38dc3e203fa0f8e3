//! Partial updates accepted by the template store.
//!
//! Every attribute is optional; `None` leaves the stored value untouched.
//! For optional text attributes (descriptions, icons, help text,
//! placeholders) an empty string clears the stored value.

use super::field::{Field, FieldKind, FieldOption, FieldWidth};
use super::ids::StepId;
use super::template::{Step, Template};
use super::view::{CardZone, DetailSection};
use serde::{Deserialize, Serialize};

/// Partial update of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl TemplatePatch {
    pub fn apply_to(&self, template: &mut Template) {
        if let Some(published) = self.published {
            template.published = published;
        }
    }
}

/// Partial update of a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl StepPatch {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
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
        self.required = Some(required);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// True if the patch changes the step's position in the form
    pub fn touches_layout(&self) -> bool {
        self.form_order.is_some()
    }

    pub fn apply_to(&self, step: &mut Step) {
        if let Some(order) = self.form_order {
            step.form_order = order;
        }
        if let Some(title) = &self.title {
            step.title = title.clone();
        }
        set_or_clear(&mut step.description, self.description.as_deref());
        set_or_clear(&mut step.icon, self.icon.as_deref());
        if let Some(required) = self.required {
            step.required = required;
        }
    }
}

/// Partial update of a field: any subset of placement and content attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPatch {
    // Placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<StepId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<DetailSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_zone: Option<CardZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_order: Option<u32>,

    // Content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<FieldWidth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldPatch {
    /// Placement delta between two versions of the same field.
    ///
    /// Only attributes that differ are set. Content attributes are ignored.
    pub fn placement_delta(before: &Field, after: &Field) -> Self {
        Self {
            step_id: (before.form.step_id != after.form.step_id)
                .then(|| after.form.step_id.clone()),
            form_order: (before.form.order != after.form.order).then_some(after.form.order),
            section: (before.detail.section != after.detail.section)
                .then_some(after.detail.section),
            detail_order: (before.detail.order != after.detail.order)
                .then_some(after.detail.order),
            card_visible: (before.card.visible != after.card.visible)
                .then_some(after.card.visible),
            card_zone: (before.card.zone != after.card.zone).then_some(after.card.zone),
            card_order: (before.card.order != after.card.order).then_some(after.card.order),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_width(mut self, width: FieldWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// True if the patch changes any of the three placements
    pub fn touches_layout(&self) -> bool {
        self.step_id.is_some()
            || self.form_order.is_some()
            || self.section.is_some()
            || self.detail_order.is_some()
            || self.card_visible.is_some()
            || self.card_zone.is_some()
            || self.card_order.is_some()
    }

    pub fn apply_to(&self, field: &mut Field) {
        if let Some(step_id) = &self.step_id {
            field.form.step_id = step_id.clone();
        }
        if let Some(order) = self.form_order {
            field.form.order = order;
        }
        if let Some(section) = self.section {
            field.detail.section = section;
        }
        if let Some(order) = self.detail_order {
            field.detail.order = order;
        }
        if let Some(visible) = self.card_visible {
            field.card.visible = visible;
        }
        if let Some(zone) = self.card_zone {
            field.card.zone = zone;
        }
        if let Some(order) = self.card_order {
            field.card.order = order;
        }
        if let Some(name) = &self.name {
            field.name = name.clone();
        }
        if let Some(label) = &self.label {
            field.label = label.clone();
        }
        if let Some(kind) = self.kind {
            field.kind = kind;
        }
        if let Some(width) = self.width {
            field.width = width;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(visible) = self.visible {
            field.visible = visible;
        }
        if let Some(options) = &self.options {
            field.options = options.clone();
        }
        set_or_clear(&mut field.help_text, self.help_text.as_deref());
        set_or_clear(&mut field.placeholder, self.placeholder.as_deref());
    }
}

fn set_or_clear(target: &mut Option<String>, value: Option<&str>) {
    match value {
        Some("") => *target = None,
        Some(value) => *target = Some(value.to_string()),
        None => {}
    }
}
