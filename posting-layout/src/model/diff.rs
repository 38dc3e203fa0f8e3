//! Persistence diff between two models of the same template.

use super::LayoutModel;
use crate::store::StoreOp;
use crate::types::{FieldPatch, StepPatch};
use std::collections::HashMap;

impl LayoutModel {
    /// Store writes that turn `self` into `next`.
    ///
    /// One `UpdateStep` per step whose `form_order` changed, then one
    /// `UpdateField` per field whose placement changed, carrying only the
    /// changed attributes. Entities present in only one model produce no
    /// operation; creation and deletion are explicit store calls.
    pub fn diff(&self, next: &LayoutModel) -> Vec<StoreOp> {
        let mut ops = Vec::new();

        let steps: HashMap<_, _> = self.steps().iter().map(|s| (&s.id, s)).collect();
        for step in next.steps() {
            if let Some(before) = steps.get(&step.id) {
                if before.form_order != step.form_order {
                    ops.push(StoreOp::UpdateStep {
                        id: step.id.clone(),
                        patch: StepPatch {
                            form_order: Some(step.form_order),
                            ..Default::default()
                        },
                    });
                }
            }
        }

        let fields: HashMap<_, _> = self.fields().iter().map(|f| (&f.id, f)).collect();
        for field in next.fields() {
            if let Some(before) = fields.get(&field.id) {
                let patch = FieldPatch::placement_delta(before, field);
                if !patch.is_empty() {
                    ops.push(StoreOp::UpdateField {
                        id: field.id.clone(),
                        patch,
                    });
                }
            }
        }

        ops
    }
}
