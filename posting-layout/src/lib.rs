//! Multi-view field layout engine for posting templates
//!
//! A posting template belongs to a category and is split into ordered
//! steps. Each field of the template appears in three views, and each view
//! orders the field independently:
//!
//! - **Form** - the data-entry wizard; a field sits in its step at `form.order`
//! - **Detail** - the posting page; a field sits in `header`, `main` or
//!   `sidebar` at `detail.order`
//! - **Card** - the listing preview; a field sits in one card zone at
//!   `card.order`, or in `hidden` when it is not shown on the card
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use posting_layout::{DragEnd, LayoutConfig, MemoryStore, ReorderCoordinator, ViewMode};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let coordinator = ReorderCoordinator::open(store, "cars", LayoutConfig::load()?).await?;
//!
//! // Move the second field of the main section to the top
//! let outcome = coordinator
//!     .on_drag_end(&DragEnd::within(ViewMode::Detail, "main", 1, 0))
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Persistence
//!
//! The engine is storage-agnostic. A [`TemplateStore`] loads the whole
//! template tree and applies per-entity writes. A drag publishes the new
//! model at once and writes the changed order attributes concurrently; if
//! any write fails the model is reloaded from the store and a [`Notice`] is
//! broadcast to subscribers.

pub mod config;
pub mod coordinator;
mod error;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod types;
pub mod zones;

pub use config::{LayoutConfig, StepDeletePolicy};
pub use coordinator::{DragEnd, DragOutcome, Phase, ReorderCoordinator};
pub use error::{LayoutError, Result};
pub use model::{InvariantViolation, LayoutModel};
pub use reconcile::{BatchReport, Notice, ReconciliationPolicy, WriteFailure};
pub use store::{MemoryStore, StepNode, StoreError, StoreOp, TemplateStore, TemplateTree};
pub use types::*;
pub use zones::{ZoneId, ZoneResolver, HIDDEN_ZONE};
