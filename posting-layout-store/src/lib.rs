//! YAML file-backed template store
//!
//! Implements [`posting_layout::TemplateStore`] over a directory with one
//! human-readable YAML file per entity:
//!
//! ```text
//! layouts/
//! ├── templates/
//! │   └── {id}.yaml        # Template (category, published)
//! ├── steps/
//! │   └── {id}.yaml        # Step (template, form_order, title, ...)
//! └── fields/
//!     └── {id}.yaml        # Field with its form, detail and card placement
//! ```
//!
//! Every write replaces a single file atomically (temp file + rename), so a
//! failed call never leaves a half-written entity. Nothing groups writes
//! across files; the engine reconciles a failed batch by reloading.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use posting_layout::{LayoutConfig, ReorderCoordinator};
//! use posting_layout_store::FileTemplateStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileTemplateStore::new("/var/lib/postings/layouts");
//! store.init().await?;
//!
//! let coordinator =
//!     ReorderCoordinator::open(Arc::new(store), "cars", LayoutConfig::load()?).await?;
//! println!("{} steps", coordinator.current_model().steps().len());
//! # Ok(())
//! # }
//! ```

mod error;
mod store;

pub use error::{FileStoreError, Result};
pub use store::FileTemplateStore;
