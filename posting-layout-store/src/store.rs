//! FileTemplateStore - one YAML file per template, step and field

use crate::error::{FileStoreError, Result};
use async_trait::async_trait;
use posting_layout::{
    CategoryId, Field, FieldId, FieldPatch, Step, StepId, StepNode, StepPatch, StoreError,
    Template, TemplateId, TemplatePatch, TemplateStore, TemplateTree,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use ulid::Ulid;

const TEMPLATES_DIR: &str = "templates";
const STEPS_DIR: &str = "steps";
const FIELDS_DIR: &str = "fields";

/// Template store backed by a directory of YAML files.
///
/// ```text
/// root/
/// ├── templates/{id}.yaml
/// ├── steps/{id}.yaml
/// └── fields/{id}.yaml
/// ```
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    root: PathBuf,
}

impl FileTemplateStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open an existing store, failing if it was never initialized
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        if !fs::try_exists(store.templates_dir()).await? {
            return Err(FileStoreError::NotInitialized { path: store.root });
        }
        Ok(store)
    }

    /// Create the directory structure
    pub async fn init(&self) -> Result<()> {
        for dir in [self.templates_dir(), self.steps_dir(), self.fields_dir()] {
            fs::create_dir_all(&dir).await?;
        }
        debug!(root = %self.root.display(), "template store initialized");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // =========================================================================
    // Paths
    // =========================================================================

    fn templates_dir(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }

    fn steps_dir(&self) -> PathBuf {
        self.root.join(STEPS_DIR)
    }

    fn fields_dir(&self) -> PathBuf {
        self.root.join(FIELDS_DIR)
    }

    pub fn template_path(&self, id: &TemplateId) -> PathBuf {
        self.templates_dir().join(format!("{id}.yaml"))
    }

    pub fn step_path(&self, id: &StepId) -> PathBuf {
        self.steps_dir().join(format!("{id}.yaml"))
    }

    pub fn field_path(&self, id: &FieldId) -> PathBuf {
        self.fields_dir().join(format!("{id}.yaml"))
    }

    // =========================================================================
    // Entity I/O
    // =========================================================================

    async fn read_all<T: DeserializeOwned>(&self, dir: &Path) -> Result<Vec<T>> {
        let mut entities = Vec::new();
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entities),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            // Only malformed content is skipped. An I/O failure would silently
            // drop an entity from the tree.
            let content = fs::read_to_string(&path).await?;
            match serde_yaml_ng::from_str::<T>(&content) {
                Ok(entity) => entities.push(entity),
                Err(e) => warn!(?path, %e, "skipping invalid entity file"),
            }
        }
        Ok(entities)
    }

    async fn read_entity<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entity =
            serde_yaml_ng::from_str(&content).map_err(|e| FileStoreError::yaml(path, e))?;
        Ok(Some(entity))
    }

    async fn write_entity<T: Serialize>(&self, path: &Path, entity: &T) -> Result<()> {
        let yaml = serde_yaml_ng::to_string(entity).map_err(|e| FileStoreError::yaml(path, e))?;
        atomic_write(path, yaml.as_bytes()).await
    }

    /// Remove an entity file, reporting whether it existed
    async fn remove_entity(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_template(&self, category: &CategoryId) -> Result<Option<Template>> {
        let templates: Vec<Template> = self.read_all(&self.templates_dir()).await?;
        Ok(templates.into_iter().find(|t| &t.category_id == category))
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn load_template_tree(
        &self,
        category: &CategoryId,
    ) -> std::result::Result<Option<TemplateTree>, StoreError> {
        let Some(template) = self.find_template(category).await? else {
            return Ok(None);
        };

        let mut steps: Vec<Step> = self
            .read_all::<Step>(&self.steps_dir())
            .await?
            .into_iter()
            .filter(|s| s.template_id == template.id)
            .collect();
        steps.sort_by_key(|s| s.form_order);

        let step_ids: HashSet<StepId> = steps.iter().map(|s| s.id.clone()).collect();
        let mut fields: Vec<Field> = self
            .read_all::<Field>(&self.fields_dir())
            .await?
            .into_iter()
            .filter(|f| step_ids.contains(f.step_id()))
            .collect();
        fields.sort_by_key(|f| f.form.order);

        let steps = steps
            .into_iter()
            .map(|step| {
                let fields = fields
                    .iter()
                    .filter(|f| f.form.step_id == step.id)
                    .cloned()
                    .collect();
                StepNode { step, fields }
            })
            .collect();

        debug!(%category, template = %template.id, "template tree loaded");
        Ok(Some(TemplateTree { template, steps }))
    }

    async fn create_template(
        &self,
        category: &CategoryId,
    ) -> std::result::Result<Template, StoreError> {
        if self.find_template(category).await?.is_some() {
            return Err(StoreError::rejected(format!(
                "category {category} already has a template"
            )));
        }
        let template = Template::new(category.clone());
        self.write_entity(&self.template_path(&template.id), &template)
            .await?;
        debug!(%category, template = %template.id, "template created");
        Ok(template)
    }

    async fn update_template(
        &self,
        id: &TemplateId,
        patch: &TemplatePatch,
    ) -> std::result::Result<(), StoreError> {
        let path = self.template_path(id);
        let mut template: Template = self
            .read_entity(&path)
            .await?
            .ok_or_else(|| StoreError::not_found("template", id))?;
        patch.apply_to(&mut template);
        self.write_entity(&path, &template).await?;
        Ok(())
    }

    async fn create_step(&self, step: &Step) -> std::result::Result<(), StoreError> {
        if !fs::try_exists(self.template_path(&step.template_id))
            .await
            .map_err(FileStoreError::from)?
        {
            return Err(StoreError::not_found("template", &step.template_id));
        }
        let path = self.step_path(&step.id);
        if fs::try_exists(&path).await.map_err(FileStoreError::from)? {
            return Err(StoreError::rejected(format!("duplicate step id {}", step.id)));
        }
        self.write_entity(&path, step).await?;
        Ok(())
    }

    async fn update_step(
        &self,
        id: &StepId,
        patch: &StepPatch,
    ) -> std::result::Result<(), StoreError> {
        let path = self.step_path(id);
        let mut step: Step = self
            .read_entity(&path)
            .await?
            .ok_or_else(|| StoreError::not_found("step", id))?;
        patch.apply_to(&mut step);
        self.write_entity(&path, &step).await?;
        Ok(())
    }

    async fn delete_step(&self, id: &StepId) -> std::result::Result<(), StoreError> {
        if !self.remove_entity(&self.step_path(id)).await? {
            return Err(StoreError::not_found("step", id));
        }
        debug!(step = %id, "step file removed");
        Ok(())
    }

    async fn create_field(&self, field: &Field) -> std::result::Result<(), StoreError> {
        if !fs::try_exists(self.step_path(field.step_id()))
            .await
            .map_err(FileStoreError::from)?
        {
            return Err(StoreError::not_found("step", field.step_id()));
        }
        let path = self.field_path(&field.id);
        if fs::try_exists(&path).await.map_err(FileStoreError::from)? {
            return Err(StoreError::rejected(format!(
                "duplicate field id {}",
                field.id
            )));
        }
        self.write_entity(&path, field).await?;
        Ok(())
    }

    async fn update_field(
        &self,
        id: &FieldId,
        patch: &FieldPatch,
    ) -> std::result::Result<(), StoreError> {
        if let Some(step_id) = &patch.step_id {
            if !fs::try_exists(self.step_path(step_id))
                .await
                .map_err(FileStoreError::from)?
            {
                return Err(StoreError::not_found("step", step_id));
            }
        }
        let path = self.field_path(id);
        let mut field: Field = self
            .read_entity(&path)
            .await?
            .ok_or_else(|| StoreError::not_found("field", id))?;
        patch.apply_to(&mut field);
        self.write_entity(&path, &field).await?;
        Ok(())
    }

    async fn delete_field(&self, id: &FieldId) -> std::result::Result<(), StoreError> {
        if !self.remove_entity(&self.field_path(id)).await? {
            return Err(StoreError::not_found("field", id));
        }
        Ok(())
    }
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
