//! Shared builders and store doubles for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use posting_layout::{
    CardZone, CategoryId, DetailSection, Field, FieldId, FieldKind, FieldPatch, LayoutConfig,
    LayoutModel, MemoryStore, ReorderCoordinator, Step, StepId, StepNode, StepPatch,
    StoreError, Template, TemplateId, TemplatePatch, TemplateStore, TemplateTree,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Step "Details" with f1, f2, f3 at form orders 0, 1, 2, all in `main`.
pub fn three_field_tree(category: &str) -> TemplateTree {
    let template = Template::new(category);
    let step = Step::new(template.id.clone(), "Details", 1);
    let fields = ["f1", "f2", "f3"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            Field::new(step.id.clone(), name, name.to_uppercase(), FieldKind::Text)
                .with_form_order(i as u32)
                .with_detail(DetailSection::Main, i as u32)
        })
        .collect();
    TemplateTree {
        template,
        steps: vec![StepNode { step, fields }],
    }
}

/// A car listing template.
///
/// - Basics: title, price, mileage, description
/// - Media: photos, location
///
/// Detail: header = [title], main = [price, mileage, description, location],
/// sidebar = [photos]. Card: header_top_left = [title], cover = [photos],
/// footer = [price]; mileage, description and location hidden.
pub fn car_tree() -> TemplateTree {
    let template = Template::new("cars");
    let basics = Step::new(template.id.clone(), "Basics", 1);
    let media = Step::new(template.id.clone(), "Media", 2);

    let basics_fields = vec![
        Field::new(basics.id.clone(), "title", "Title", FieldKind::Text)
            .with_form_order(0)
            .with_detail(DetailSection::Header, 0)
            .with_card(CardZone::HeaderTopLeft, 0),
        Field::new(basics.id.clone(), "price", "Price", FieldKind::Price)
            .with_form_order(1)
            .with_detail(DetailSection::Main, 0)
            .with_card(CardZone::Footer, 0),
        Field::new(basics.id.clone(), "mileage", "Mileage", FieldKind::Number)
            .with_form_order(2)
            .with_detail(DetailSection::Main, 1),
        Field::new(basics.id.clone(), "description", "Description", FieldKind::Textarea)
            .with_form_order(3)
            .with_detail(DetailSection::Main, 2),
    ];
    let media_fields = vec![
        Field::new(media.id.clone(), "photos", "Photos", FieldKind::Gallery)
            .with_form_order(0)
            .with_detail(DetailSection::Sidebar, 0)
            .with_card(CardZone::Cover, 0),
        Field::new(media.id.clone(), "location", "Location", FieldKind::Location)
            .with_form_order(1)
            .with_detail(DetailSection::Main, 3),
    ];

    TemplateTree {
        template,
        steps: vec![
            StepNode {
                step: basics,
                fields: basics_fields,
            },
            StepNode {
                step: media,
                fields: media_fields,
            },
        ],
    }
}

pub fn field_id(model: &LayoutModel, name: &str) -> FieldId {
    model
        .fields()
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.id.clone())
        .unwrap_or_else(|| panic!("no field named {name}"))
}

pub fn field<'a>(model: &'a LayoutModel, name: &str) -> &'a Field {
    model
        .fields()
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no field named {name}"))
}

/// Names of a zone's fields in view order
pub fn names_in(model: &LayoutModel, view: posting_layout::ViewMode, zone: &str) -> Vec<String> {
    let zone = model.resolver().parse(view, zone).unwrap();
    model
        .fields_in_zone(view, &zone)
        .unwrap()
        .into_iter()
        .map(|f| f.name.clone())
        .collect()
}

pub async fn open<S: TemplateStore + 'static>(
    store: Arc<S>,
    category: &str,
) -> ReorderCoordinator {
    ReorderCoordinator::open(store, category, LayoutConfig::default())
        .await
        .unwrap()
}

/// Memory store whose writes and loads can be made to fail on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing_fields: Mutex<HashSet<FieldId>>,
    failing_loads: AtomicBool,
}

impl FlakyStore {
    pub fn with_tree(tree: TemplateTree) -> Self {
        Self {
            inner: MemoryStore::with_tree(tree),
            ..Default::default()
        }
    }

    /// Make every `update_field` for `id` fail
    pub fn fail_updates_of(&self, id: &FieldId) {
        self.failing_fields.lock().unwrap().insert(id.clone());
    }

    pub fn fail_loads(&self, fail: bool) {
        self.failing_loads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TemplateStore for FlakyStore {
    async fn load_template_tree(
        &self,
        category: &CategoryId,
    ) -> Result<Option<TemplateTree>, StoreError> {
        if self.failing_loads.load(Ordering::SeqCst) {
            return Err(StoreError::backend(std::io::Error::other("connection reset")));
        }
        self.inner.load_template_tree(category).await
    }

    async fn create_template(&self, category: &CategoryId) -> Result<Template, StoreError> {
        self.inner.create_template(category).await
    }

    async fn update_template(
        &self,
        id: &TemplateId,
        patch: &TemplatePatch,
    ) -> Result<(), StoreError> {
        self.inner.update_template(id, patch).await
    }

    async fn create_step(&self, step: &Step) -> Result<(), StoreError> {
        self.inner.create_step(step).await
    }

    async fn update_step(&self, id: &StepId, patch: &StepPatch) -> Result<(), StoreError> {
        self.inner.update_step(id, patch).await
    }

    async fn delete_step(&self, id: &StepId) -> Result<(), StoreError> {
        self.inner.delete_step(id).await
    }

    async fn create_field(&self, field: &Field) -> Result<(), StoreError> {
        self.inner.create_field(field).await
    }

    async fn update_field(&self, id: &FieldId, patch: &FieldPatch) -> Result<(), StoreError> {
        if self.failing_fields.lock().unwrap().contains(id) {
            return Err(StoreError::rejected(format!("field {id} is locked")));
        }
        self.inner.update_field(id, patch).await
    }

    async fn delete_field(&self, id: &FieldId) -> Result<(), StoreError> {
        self.inner.delete_field(id).await
    }
}

/// Memory store whose layout writes wait until the test opens the gate.
pub struct GatedStore {
    pub inner: MemoryStore,
    gate: Semaphore,
}

impl GatedStore {
    pub fn with_tree(tree: TemplateTree) -> Self {
        Self {
            inner: MemoryStore::with_tree(tree),
            gate: Semaphore::new(0),
        }
    }

    /// Let every pending and future write through
    pub fn open_gate(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    async fn pass(&self) {
        let permit = self.gate.acquire().await.unwrap();
        permit.forget();
    }
}

#[async_trait]
impl TemplateStore for GatedStore {
    async fn load_template_tree(
        &self,
        category: &CategoryId,
    ) -> Result<Option<TemplateTree>, StoreError> {
        self.inner.load_template_tree(category).await
    }

    async fn create_template(&self, category: &CategoryId) -> Result<Template, StoreError> {
        self.inner.create_template(category).await
    }

    async fn update_template(
        &self,
        id: &TemplateId,
        patch: &TemplatePatch,
    ) -> Result<(), StoreError> {
        self.inner.update_template(id, patch).await
    }

    async fn create_step(&self, step: &Step) -> Result<(), StoreError> {
        self.inner.create_step(step).await
    }

    async fn update_step(&self, id: &StepId, patch: &StepPatch) -> Result<(), StoreError> {
        self.pass().await;
        self.inner.update_step(id, patch).await
    }

    async fn delete_step(&self, id: &StepId) -> Result<(), StoreError> {
        self.inner.delete_step(id).await
    }

    async fn create_field(&self, field: &Field) -> Result<(), StoreError> {
        self.inner.create_field(field).await
    }

    async fn update_field(&self, id: &FieldId, patch: &FieldPatch) -> Result<(), StoreError> {
        self.pass().await;
        self.inner.update_field(id, patch).await
    }

    async fn delete_field(&self, id: &FieldId) -> Result<(), StoreError> {
        self.inner.delete_field(id).await
    }
}
