//! Layout invariants.
//!
//! - step `form_order` values are exactly `1..=n`
//! - per step, field `form.order` values are exactly `0..n`
//! - per detail section, `detail.order` values are exactly `0..n`
//! - per card zone, `card.order` of visible fields are exactly `0..n`
//! - every field is owned by a step of the template, and ids are unique

use super::LayoutModel;
use crate::types::ViewMode;
use crate::zones::ZoneId;
use std::collections::HashSet;
use thiserror::Error;

/// A broken layout invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("step orders are not 1..={expected}: {found:?}")]
    StepOrder { expected: usize, found: Vec<u32> },

    #[error("{view} zone '{zone}' orders are not contiguous: {found:?}")]
    ZoneOrder {
        view: ViewMode,
        zone: String,
        found: Vec<u32>,
    },

    #[error("field {field} is owned by unknown step {step}")]
    OrphanField { field: String, step: String },

    #[error("duplicate {entity} id {id}")]
    DuplicateId { entity: &'static str, id: String },
}

impl LayoutModel {
    /// Verify every layout invariant, reporting the first violation found
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut step_ids = HashSet::new();
        for step in self.steps() {
            if !step_ids.insert(&step.id) {
                return Err(InvariantViolation::DuplicateId {
                    entity: "step",
                    id: step.id.to_string(),
                });
            }
        }

        let mut step_orders: Vec<u32> = self.steps().iter().map(|s| s.form_order).collect();
        step_orders.sort_unstable();
        if !step_orders.iter().copied().eq(1..=step_orders.len() as u32) {
            return Err(InvariantViolation::StepOrder {
                expected: step_orders.len(),
                found: step_orders,
            });
        }

        let mut field_ids = HashSet::new();
        for field in self.fields() {
            if !field_ids.insert(&field.id) {
                return Err(InvariantViolation::DuplicateId {
                    entity: "field",
                    id: field.id.to_string(),
                });
            }
            if !step_ids.contains(&field.form.step_id) {
                return Err(InvariantViolation::OrphanField {
                    field: field.id.to_string(),
                    step: field.form.step_id.to_string(),
                });
            }
        }

        let resolver = self.resolver();
        for view in ViewMode::ALL {
            for zone in resolver.zones(view) {
                if !zone.is_ordered() {
                    continue;
                }
                let found: Vec<u32> = resolver
                    .members(&zone)
                    .iter()
                    .filter_map(|f| zone.sort_key(f))
                    .collect();
                if !found.iter().copied().eq(0..found.len() as u32) {
                    return Err(zone_violation(view, &zone, found));
                }
            }
        }

        Ok(())
    }
}

fn zone_violation(view: ViewMode, zone: &ZoneId, found: Vec<u32>) -> InvariantViolation {
    InvariantViolation::ZoneOrder {
        view,
        zone: zone.to_string(),
        found,
    }
}
