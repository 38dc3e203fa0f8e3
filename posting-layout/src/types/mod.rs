//! Core types for the layout engine

mod field;
mod ids;
mod patch;
mod template;
mod view;

pub use field::{
    CardPlacement, DetailPlacement, Field, FieldDraft, FieldKind, FieldOption, FieldWidth,
    FormPlacement,
};
pub use ids::{CategoryId, FieldId, StepId, TemplateId};
pub use patch::{FieldPatch, StepPatch, TemplatePatch};
pub use template::{Step, StepDraft, Template};
pub use view::{CardZone, DetailSection, ViewMode};
