//! Drag events received from the UI and their outcomes.

use crate::types::{FieldId, ViewMode};
use serde::{Deserialize, Serialize};

/// A completed drag gesture.
///
/// Zones are the raw ids the UI renders: a step id in form view, a section
/// name in detail view, a card zone name or `hidden` in card view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub view: ViewMode,
    pub source_zone: String,
    pub source_index: usize,
    pub dest_zone: String,
    pub dest_index: usize,
    /// Field the UI believes it dragged; checked against `source_index`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<FieldId>,
}

impl DragEnd {
    pub fn new(
        view: ViewMode,
        source_zone: impl Into<String>,
        source_index: usize,
        dest_zone: impl Into<String>,
        dest_index: usize,
    ) -> Self {
        Self {
            view,
            source_zone: source_zone.into(),
            source_index,
            dest_zone: dest_zone.into(),
            dest_index,
            field_id: None,
        }
    }

    /// Reorder inside one zone
    pub fn within(view: ViewMode, zone: impl Into<String>, from: usize, to: usize) -> Self {
        let zone = zone.into();
        Self::new(view, zone.clone(), from, zone, to)
    }

    pub fn with_field(mut self, id: impl Into<FieldId>) -> Self {
        self.field_id = Some(id.into());
        self
    }

    pub fn is_cross_zone(&self) -> bool {
        self.source_zone != self.dest_zone
    }
}

/// How a layout change ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DragOutcome {
    /// Nothing to persist; the model is unchanged
    Unchanged,
    /// Every write succeeded; the optimistic model is authoritative
    Persisted { writes: usize },
    /// Some writes failed; the model was reloaded from the store
    Reconciled { attempted: usize, failed: usize },
}
