//! Field records and their three placements.
//!
//! A field carries one placement per view. The placements are independent:
//! moving a field on the card never touches its detail section or its step.

use super::ids::{FieldId, StepId};
use super::view::{CardZone, DetailSection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input widget kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Price,
    Email,
    Phone,
    Url,
    Select,
    MultiSelect,
    Radio,
    Checkbox,
    Date,
    Image,
    Gallery,
    Location,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Price => "price",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Url => "url",
            FieldKind::Select => "select",
            FieldKind::MultiSelect => "multi_select",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::Image => "image",
            FieldKind::Gallery => "gallery",
            FieldKind::Location => "location",
        }
    }

    /// Kinds whose values come from a fixed option list
    pub fn is_enumerated(&self) -> bool {
        matches!(
            self,
            FieldKind::Select | FieldKind::MultiSelect | FieldKind::Radio
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal footprint of a field in the data-entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
    Quarter,
}

/// One choice of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }
}

/// Form projection: owning step and position inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormPlacement {
    pub step_id: StepId,
    pub order: u32,
}

/// Detail projection: section and position inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DetailPlacement {
    pub section: DetailSection,
    pub order: u32,
}

/// Card projection.
///
/// `zone` and `order` only bind while `visible` is set; a hidden field keeps
/// its last values so re-showing it needs no extra bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CardPlacement {
    pub visible: bool,
    pub zone: CardZone,
    pub order: u32,
}

/// A field of a posting template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub width: FieldWidth,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    pub form: FormPlacement,
    #[serde(default)]
    pub detail: DetailPlacement,
    #[serde(default)]
    pub card: CardPlacement,
}

fn default_visible() -> bool {
    true
}

impl Field {
    /// Create a field at the head of a step, in the main detail section,
    /// hidden from the card.
    pub fn new(
        step_id: StepId,
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            id: FieldId::new(),
            name: name.into(),
            label: label.into(),
            kind,
            width: FieldWidth::default(),
            required: false,
            visible: true,
            options: Vec::new(),
            help_text: None,
            placeholder: None,
            form: FormPlacement { step_id, order: 0 },
            detail: DetailPlacement::default(),
            card: CardPlacement::default(),
        }
    }

    pub fn step_id(&self) -> &StepId {
        &self.form.step_id
    }

    pub fn with_form_order(mut self, order: u32) -> Self {
        self.form.order = order;
        self
    }

    pub fn with_detail(mut self, section: DetailSection, order: u32) -> Self {
        self.detail = DetailPlacement { section, order };
        self
    }

    pub fn with_card(mut self, zone: CardZone, order: u32) -> Self {
        self.card = CardPlacement {
            visible: true,
            zone,
            order,
        };
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_width(mut self, width: FieldWidth) -> Self {
        self.width = width;
        self
    }
}

/// Admin input for creating a field. Placement is assigned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDraft {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub width: FieldWidth,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            width: FieldWidth::default(),
            required: false,
            visible: true,
            options: Vec::new(),
            help_text: None,
            placeholder: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}
