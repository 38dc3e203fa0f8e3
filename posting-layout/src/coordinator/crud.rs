//! Step and field CRUD.
//!
//! These go straight to the store and then reload; there is no optimistic
//! model. They share the coordinator's phase so they cannot interleave with
//! a drag.

use super::phase::PhaseGuard;
use super::{Phase, ReorderCoordinator};
use crate::config::StepDeletePolicy;
use crate::error::{LayoutError, Result};
use crate::model::LayoutModel;
use crate::store::StoreError;
use crate::types::{
    DetailSection, Field, FieldDraft, FieldId, FieldPatch, StepDraft, StepId, StepPatch,
    TemplatePatch,
};
use crate::zones::ZoneId;
use tracing::info;

impl ReorderCoordinator {
    /// Append a step after the last one
    pub async fn add_step(&self, draft: StepDraft) -> Result<StepId> {
        let guard = self.begin("add step")?;
        if draft.title.trim().is_empty() {
            return Err(LayoutError::invalid_value("title", "must not be empty"));
        }

        let current = self.current_model();
        let step = draft.into_step(current.template().id.clone(), current.next_step_order());
        let id = step.id.clone();

        guard.advance(Phase::Persisting);
        let result = self.store.create_step(&step).await;
        self.finish("add step", &guard, 1, result).await?;
        info!(step = %id, title = %step.title, "step added");
        Ok(id)
    }

    /// Update a step's content. Position changes go through `move_step`.
    pub async fn update_step(&self, id: &StepId, patch: StepPatch) -> Result<()> {
        let guard = self.begin("update step")?;
        if patch.touches_layout() {
            return Err(LayoutError::invalid_value(
                "form_order",
                "use move_step to reorder steps",
            ));
        }
        if matches!(&patch.title, Some(title) if title.trim().is_empty()) {
            return Err(LayoutError::invalid_value("title", "must not be empty"));
        }
        if self.current_model().step(id).is_none() {
            return Err(LayoutError::StepNotFound { id: id.to_string() });
        }
        if patch.is_empty() {
            return Ok(());
        }

        guard.advance(Phase::Persisting);
        let result = self.store.update_step(id, &patch).await;
        self.finish("update step", &guard, 1, result).await
    }

    /// Delete a step and, under the cascade policy, every field it owns.
    ///
    /// Remaining steps and the detail and card zones the removed fields
    /// occupied are renumbered.
    pub async fn delete_step(&self, id: &StepId) -> Result<()> {
        let guard = self.begin("delete step")?;
        let current = self.current_model();
        let next = current.without_step(id)?;

        let owned: Vec<FieldId> = current
            .fields()
            .iter()
            .filter(|f| f.step_id() == id)
            .map(|f| f.id.clone())
            .collect();
        if !owned.is_empty() && self.config.step_delete == StepDeletePolicy::RequireEmpty {
            return Err(LayoutError::StepNotEmpty {
                id: id.to_string(),
                count: owned.len(),
            });
        }

        let renumber = current.diff(&next);
        let attempted = owned.len() + 1 + renumber.len();

        guard.advance(Phase::Persisting);
        let result = async {
            for field in &owned {
                self.store.delete_field(field).await?;
            }
            self.store.delete_step(id).await?;
            let report = self.policy.execute(self.store.as_ref(), renumber).await;
            report.into_first_error().map_or(Ok(()), Err)
        }
        .await;

        self.finish("delete step", &guard, attempted, result).await?;
        info!(step = %id, fields = owned.len(), "step deleted");
        Ok(())
    }

    /// Append a field to a step.
    ///
    /// The field lands at the end of the step, at the end of the main detail
    /// section, and hidden from the card.
    pub async fn add_field(&self, step_id: &StepId, draft: FieldDraft) -> Result<FieldId> {
        let guard = self.begin("add field")?;
        let current = self.current_model();
        if current.step(step_id).is_none() {
            return Err(LayoutError::StepNotFound {
                id: step_id.to_string(),
            });
        }

        let mut field = Field::new(step_id.clone(), draft.name, draft.label, draft.kind)
            .with_form_order(current.next_order_in(&ZoneId::Step(step_id.clone())))
            .with_detail(
                DetailSection::Main,
                current.next_order_in(&ZoneId::Section(DetailSection::Main)),
            )
            .with_options(draft.options)
            .with_width(draft.width);
        field.required = draft.required;
        field.visible = draft.visible;
        field.help_text = draft.help_text;
        field.placeholder = draft.placeholder;
        validate_field(&current, &field)?;
        let id = field.id.clone();

        guard.advance(Phase::Persisting);
        let result = self.store.create_field(&field).await;
        self.finish("add field", &guard, 1, result).await?;
        info!(field = %id, name = %field.name, step = %step_id, "field added");
        Ok(id)
    }

    /// Update a field's content. Placement changes go through drags.
    pub async fn update_field(&self, id: &FieldId, patch: FieldPatch) -> Result<()> {
        let guard = self.begin("update field")?;
        if patch.touches_layout() {
            return Err(LayoutError::invalid_value(
                "placement",
                "fields are placed by dragging",
            ));
        }

        let current = self.current_model();
        let mut updated = current
            .field(id)
            .cloned()
            .ok_or_else(|| LayoutError::FieldNotFound { id: id.to_string() })?;
        if patch.is_empty() {
            return Ok(());
        }
        patch.apply_to(&mut updated);
        validate_field(&current, &updated)?;

        guard.advance(Phase::Persisting);
        let result = self.store.update_field(id, &patch).await;
        self.finish("update field", &guard, 1, result).await
    }

    /// Delete a field and close the gaps it leaves in every view
    pub async fn delete_field(&self, id: &FieldId) -> Result<()> {
        let guard = self.begin("delete field")?;
        let current = self.current_model();
        let next = current.without_field(id)?;
        let renumber = current.diff(&next);
        let attempted = 1 + renumber.len();

        guard.advance(Phase::Persisting);
        let result = async {
            self.store.delete_field(id).await?;
            let report = self.policy.execute(self.store.as_ref(), renumber).await;
            report.into_first_error().map_or(Ok(()), Err)
        }
        .await;

        self.finish("delete field", &guard, attempted, result).await?;
        info!(field = %id, "field deleted");
        Ok(())
    }

    /// Publish or unpublish the template
    pub async fn set_published(&self, published: bool) -> Result<()> {
        let guard = self.begin("set published")?;
        let current = self.current_model();
        if current.template().published == published {
            return Ok(());
        }

        let patch = TemplatePatch {
            published: Some(published),
        };
        guard.advance(Phase::Persisting);
        let result = self
            .store
            .update_template(&current.template().id, &patch)
            .await;
        self.finish("set published", &guard, 1, result).await
    }

    /// Reload after the store calls of one operation
    async fn finish(
        &self,
        operation: &str,
        guard: &PhaseGuard<'_>,
        attempted: usize,
        result: std::result::Result<(), StoreError>,
    ) -> Result<()> {
        guard.advance(Phase::Reloading);
        match result {
            Ok(()) => self.reload_from_store(operation).await,
            Err(source) => Err(self.write_failed(operation, attempted, source).await),
        }
    }
}

/// Content rules for a field about to be written
fn validate_field(model: &LayoutModel, field: &Field) -> Result<()> {
    if field.name.trim().is_empty() {
        return Err(LayoutError::invalid_value("name", "must not be empty"));
    }
    if field.label.trim().is_empty() {
        return Err(LayoutError::invalid_value("label", "must not be empty"));
    }
    if model
        .fields()
        .iter()
        .any(|other| other.id != field.id && other.name == field.name)
    {
        return Err(LayoutError::invalid_value(
            "name",
            format!("'{}' is already used in this template", field.name),
        ));
    }
    if field.kind.is_enumerated() && field.options.is_empty() {
        return Err(LayoutError::invalid_value(
            "options",
            format!("{} fields need at least one option", field.kind),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::fixtures::{self, field_named};
    use crate::store::MemoryStore;
    use crate::types::{FieldKind, FieldOption};
    use std::sync::Arc;

    async fn open(
        model: &LayoutModel,
        config: LayoutConfig,
    ) -> (Arc<MemoryStore>, ReorderCoordinator) {
        let store = Arc::new(MemoryStore::with_tree(model.to_tree()));
        let category = model.template().category_id.clone();
        let coordinator = ReorderCoordinator::open(store.clone(), category, config)
            .await
            .unwrap();
        (store, coordinator)
    }

    #[tokio::test]
    async fn test_add_step_appends() {
        let model = fixtures::two_step_model();
        let (_store, coordinator) = open(&model, LayoutConfig::default()).await;

        let id = coordinator.add_step(StepDraft::new("Contact")).await.unwrap();
        let model = coordinator.current_model();
        assert_eq!(model.steps().len(), 3);
        assert_eq!(model.step(&id).unwrap().form_order, 3);
        assert_eq!(coordinator.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_add_step_rejects_blank_title() {
        let model = fixtures::two_step_model();
        let (store, coordinator) = open(&model, LayoutConfig::default()).await;
        let result = coordinator.add_step(StepDraft::new("  ")).await;
        assert!(matches!(result, Err(LayoutError::InvalidValue { .. })));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_add_field_placement() {
        let model = fixtures::two_step_model();
        let (_store, coordinator) = open(&model, LayoutConfig::default()).await;
        let media = model.steps()[1].id.clone();

        let id = coordinator
            .add_field(&media, FieldDraft::new("video", "Video", FieldKind::Url))
            .await
            .unwrap();

        let model = coordinator.current_model();
        let field = model.field(&id).unwrap();
        assert_eq!(field.form.order, 2);
        assert_eq!(field.detail.section, DetailSection::Main);
        assert_eq!(field.detail.order, 3);
        assert!(!field.card.visible);
        assert!(model.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_add_field_validation() {
        let model = fixtures::two_step_model();
        let (store, coordinator) = open(&model, LayoutConfig::default()).await;
        let basics = model.steps()[0].id.clone();

        let duplicate = coordinator
            .add_field(&basics, FieldDraft::new("price", "Price", FieldKind::Number))
            .await;
        assert!(matches!(duplicate, Err(LayoutError::InvalidValue { .. })));

        let no_options = coordinator
            .add_field(&basics, FieldDraft::new("fuel", "Fuel", FieldKind::Select))
            .await;
        assert!(matches!(no_options, Err(LayoutError::InvalidValue { .. })));

        let with_options = coordinator
            .add_field(
                &basics,
                FieldDraft::new("fuel", "Fuel", FieldKind::Select)
                    .with_options(vec![FieldOption::new("diesel")]),
            )
            .await;
        assert!(with_options.is_ok());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_update_field_rejects_placement() {
        let model = fixtures::two_step_model();
        let (store, coordinator) = open(&model, LayoutConfig::default()).await;
        let price = field_named(&model, "price").id.clone();

        let patch = FieldPatch {
            card_visible: Some(false),
            ..Default::default()
        };
        let result = coordinator.update_field(&price, patch).await;
        assert!(matches!(result, Err(LayoutError::InvalidValue { .. })));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_field_content() {
        let model = fixtures::two_step_model();
        let (_store, coordinator) = open(&model, LayoutConfig::default()).await;
        let price = field_named(&model, "price").id.clone();

        coordinator
            .update_field(&price, FieldPatch::default().with_label("Asking price"))
            .await
            .unwrap();
        let model = coordinator.current_model();
        assert_eq!(model.field(&price).unwrap().label, "Asking price");
    }

    #[tokio::test]
    async fn test_delete_step_cascades_and_renumbers() {
        let model = fixtures::two_step_model();
        let (store, coordinator) = open(&model, LayoutConfig::default()).await;
        let basics = model.steps()[0].id.clone();

        coordinator.delete_step(&basics).await.unwrap();

        let model = coordinator.current_model();
        assert_eq!(model.steps().len(), 1);
        assert_eq!(model.steps()[0].form_order, 1);
        assert_eq!(model.fields().len(), 2);
        assert_eq!(field_named(&model, "location").detail.order, 0);
        assert!(model.check_invariants().is_ok());
        assert!(store.step(&basics).is_none());
    }

    #[tokio::test]
    async fn test_delete_step_require_empty() {
        let model = fixtures::two_step_model();
        let config = LayoutConfig::default().with_step_delete(StepDeletePolicy::RequireEmpty);
        let (store, coordinator) = open(&model, config).await;
        let basics = model.steps()[0].id.clone();

        let result = coordinator.delete_step(&basics).await;
        assert!(matches!(
            result,
            Err(LayoutError::StepNotEmpty { count: 3, .. })
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_field_closes_gaps() {
        let model = fixtures::three_field_step();
        let (_store, coordinator) = open(&model, LayoutConfig::default()).await;
        let f1 = field_named(&model, "f1").id.clone();

        coordinator.delete_field(&f1).await.unwrap();

        let model = coordinator.current_model();
        assert_eq!(field_named(&model, "f2").form.order, 0);
        assert_eq!(field_named(&model, "f3").form.order, 1);
        assert_eq!(field_named(&model, "f2").detail.order, 0);
        assert!(model.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_set_published() {
        let model = fixtures::two_step_model();
        let (store, coordinator) = open(&model, LayoutConfig::default()).await;

        coordinator.set_published(true).await.unwrap();
        assert!(coordinator.current_model().template().published);

        coordinator.set_published(true).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
