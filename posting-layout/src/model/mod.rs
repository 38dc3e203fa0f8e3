//! Layout model
//!
//! In-memory template → steps → fields, with three independent orderings
//! per field. Every mutation is pure: it returns a new model and leaves the
//! receiver untouched, so the coordinator can keep the last confirmed model
//! around while an optimistic one is being persisted.
//!
//! Steps are kept sorted by `form_order`. Fields are kept in canonical
//! order: owning step's position, then `form.order`. Canonical order is what
//! the `hidden` card zone reports, and what makes two models built from the
//! same data compare equal.

mod diff;
mod invariants;

#[cfg(test)]
pub(crate) mod fixtures;

pub use invariants::InvariantViolation;

use crate::error::{LayoutError, Result};
use crate::store::{StepNode, TemplateTree};
use crate::types::{Field, FieldId, Step, StepId, Template, ViewMode};
use crate::zones::{ZoneId, ZoneResolver};
use serde::Serialize;
use std::collections::HashMap;

/// Current layout of one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutModel {
    template: Template,
    steps: Vec<Step>,
    fields: Vec<Field>,
}

impl LayoutModel {
    /// A template with no steps
    pub fn empty(template: Template) -> Self {
        Self {
            template,
            steps: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Build a model from the store's tree
    pub fn from_tree(tree: TemplateTree) -> Self {
        let mut steps = Vec::with_capacity(tree.steps.len());
        let mut fields = Vec::with_capacity(tree.field_count());
        for node in tree.steps {
            for mut field in node.fields {
                // the tree's nesting is authoritative for ownership
                field.form.step_id = node.step.id.clone();
                fields.push(field);
            }
            steps.push(node.step);
        }

        let mut model = Self {
            template: tree.template,
            steps,
            fields,
        };
        model.canonicalize();
        model
    }

    /// Nest the model back into the store's tree shape
    pub fn to_tree(&self) -> TemplateTree {
        let steps = self
            .steps
            .iter()
            .map(|step| StepNode {
                step: step.clone(),
                fields: self
                    .fields
                    .iter()
                    .filter(|f| f.form.step_id == step.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        TemplateTree {
            template: self.template.clone(),
            steps,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Steps sorted by `form_order`
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Fields in canonical order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn resolver(&self) -> ZoneResolver<'_> {
        ZoneResolver::new(self)
    }

    /// Fields of a zone, sorted by the view's order attribute
    pub fn fields_in_zone(&self, view: ViewMode, zone: &ZoneId) -> Result<Vec<&Field>> {
        let resolver = self.resolver();
        resolver.validate(view, zone)?;
        Ok(resolver.members(zone))
    }

    /// The field shown at `index` of a zone
    pub fn field_at(&self, view: ViewMode, zone: &ZoneId, index: usize) -> Result<&Field> {
        let members = self.fields_in_zone(view, zone)?;
        let len = members.len();
        members
            .get(index)
            .copied()
            .ok_or_else(|| LayoutError::invalid_index(zone, index, len))
    }

    /// Every zone of a view with its members, for rendering
    pub fn zone_layout(&self, view: ViewMode) -> Vec<(ZoneId, Vec<&Field>)> {
        let resolver = self.resolver();
        resolver
            .zones(view)
            .into_iter()
            .map(|zone| {
                let members = resolver.members(&zone);
                (zone, members)
            })
            .collect()
    }

    /// `form_order` a newly appended step receives
    pub fn next_step_order(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Order a field appended to a zone receives
    pub fn next_order_in(&self, zone: &ZoneId) -> u32 {
        self.fields.iter().filter(|f| zone.contains(f)).count() as u32
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Move the field at `from` to `to` within one zone and renumber it.
    ///
    /// Inside `hidden` there is no order to change; indices are still
    /// validated and an equal model is returned.
    pub fn with_reordered(
        &self,
        view: ViewMode,
        zone: &ZoneId,
        from: usize,
        to: usize,
    ) -> Result<Self> {
        let mut ids = self.member_ids(view, zone)?;
        check_index(zone, from, ids.len())?;
        check_index(zone, to, ids.len())?;

        let mut next = self.clone();
        if !zone.is_ordered() || from == to {
            return Ok(next);
        }

        let id = ids.remove(from);
        ids.insert(to, id);
        next.renumber(zone, &ids);
        next.canonicalize();
        Ok(next)
    }

    /// Move the field at `from` in one zone to `to` in another.
    ///
    /// Survivors of the source zone and members of the destination zone are
    /// renumbered; the moved field's membership attribute for the view is
    /// rewritten. `to` may equal the destination's length (append).
    pub fn with_moved(
        &self,
        view: ViewMode,
        from_zone: &ZoneId,
        from: usize,
        to_zone: &ZoneId,
        to: usize,
    ) -> Result<Self> {
        if from_zone == to_zone {
            return self.with_reordered(view, from_zone, from, to);
        }

        let mut source = self.member_ids(view, from_zone)?;
        let mut dest = self.member_ids(view, to_zone)?;
        check_index(from_zone, from, source.len())?;
        check_index(to_zone, to, dest.len() + 1)?;

        let id = source.remove(from);
        dest.insert(to, id.clone());

        let mut next = self.clone();
        if let Some(field) = next.fields.iter_mut().find(|f| f.id == id) {
            assign_zone(to_zone, field);
        }
        next.renumber(from_zone, &source);
        next.renumber(to_zone, &dest);
        next.canonicalize();
        Ok(next)
    }

    /// Move a step to another position and renumber all steps from 1
    pub fn with_step_reordered(&self, from: usize, to: usize) -> Result<Self> {
        let len = self.steps.len();
        check_index("steps", from, len)?;
        check_index("steps", to, len)?;

        let mut next = self.clone();
        if from == to {
            return Ok(next);
        }
        let step = next.steps.remove(from);
        next.steps.insert(to, step);
        next.renumber_steps();
        next.canonicalize();
        Ok(next)
    }

    /// Renumber every zone of every view in its current sort order.
    ///
    /// A model satisfying the invariants compacts to itself.
    pub fn compacted(&self) -> Self {
        let mut next = self.clone();
        next.renumber_steps();
        for view in ViewMode::ALL {
            let zones = next.resolver().zones(view);
            for zone in zones {
                let ids = next.ordered_ids(&zone);
                next.renumber(&zone, &ids);
            }
        }
        next.canonicalize();
        next
    }

    /// Remove a field and close the gaps it leaves in its three zones
    pub fn without_field(&self, id: &FieldId) -> Result<Self> {
        let field = self
            .field(id)
            .ok_or_else(|| LayoutError::FieldNotFound { id: id.to_string() })?;
        let zones: Vec<ZoneId> = ViewMode::ALL
            .into_iter()
            .map(|view| ZoneId::of(view, field))
            .collect();

        let mut next = self.clone();
        next.fields.retain(|f| &f.id != id);
        for zone in &zones {
            let ids = next.ordered_ids(zone);
            next.renumber(zone, &ids);
        }
        next.canonicalize();
        Ok(next)
    }

    /// Remove a step together with its fields and close every gap
    pub fn without_step(&self, id: &StepId) -> Result<Self> {
        if self.step(id).is_none() {
            return Err(LayoutError::StepNotFound { id: id.to_string() });
        }

        let mut zones: Vec<ZoneId> = Vec::new();
        for field in self.fields.iter().filter(|f| &f.form.step_id == id) {
            for view in [ViewMode::Detail, ViewMode::Card] {
                let zone = ZoneId::of(view, field);
                if !zones.contains(&zone) {
                    zones.push(zone);
                }
            }
        }

        let mut next = self.clone();
        next.steps.retain(|s| &s.id != id);
        next.fields.retain(|f| &f.form.step_id != id);
        next.renumber_steps();
        for zone in &zones {
            let ids = next.ordered_ids(zone);
            next.renumber(zone, &ids);
        }
        next.canonicalize();
        Ok(next)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn member_ids(&self, view: ViewMode, zone: &ZoneId) -> Result<Vec<FieldId>> {
        Ok(self
            .fields_in_zone(view, zone)?
            .into_iter()
            .map(|f| f.id.clone())
            .collect())
    }

    fn ordered_ids(&self, zone: &ZoneId) -> Vec<FieldId> {
        self.resolver()
            .members(zone)
            .into_iter()
            .map(|f| f.id.clone())
            .collect()
    }

    /// Give each listed field its index as the zone's order attribute
    fn renumber(&mut self, zone: &ZoneId, ids: &[FieldId]) {
        if !zone.is_ordered() {
            return;
        }
        let positions: HashMap<&FieldId, u32> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id, i as u32))
            .collect();
        for field in &mut self.fields {
            if let Some(&order) = positions.get(&field.id) {
                set_order(zone, field, order);
            }
        }
    }

    fn renumber_steps(&mut self) {
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.form_order = i as u32 + 1;
        }
    }

    fn canonicalize(&mut self) {
        self.steps.sort_by_key(|s| s.form_order);
        let rank: HashMap<StepId, usize> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        self.fields.sort_by_key(|f| {
            (
                rank.get(&f.form.step_id).copied().unwrap_or(usize::MAX),
                f.form.order,
            )
        });
    }
}

fn check_index(zone: impl ToString, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(LayoutError::invalid_index(zone, index, len))
    }
}

fn set_order(zone: &ZoneId, field: &mut Field, order: u32) {
    match zone {
        ZoneId::Step(_) => field.form.order = order,
        ZoneId::Section(_) => field.detail.order = order,
        ZoneId::Card(_) => field.card.order = order,
        ZoneId::Hidden => {}
    }
}

fn assign_zone(zone: &ZoneId, field: &mut Field) {
    match zone {
        ZoneId::Step(step_id) => field.form.step_id = step_id.clone(),
        ZoneId::Section(section) => field.detail.section = *section,
        ZoneId::Card(card_zone) => {
            field.card.visible = true;
            field.card.zone = *card_zone;
        }
        ZoneId::Hidden => field.card.visible = false,
    }
}
