//! Error types for the layout engine

use crate::coordinator::Phase;
use crate::store::StoreError;
use crate::types::ViewMode;
use thiserror::Error;

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur in layout operations
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Index outside the zone's current ordering
    #[error("index {index} out of bounds for zone '{zone}' ({len} fields)")]
    InvalidIndex {
        zone: String,
        index: usize,
        len: usize,
    },

    /// Zone id not valid for the view
    #[error("unknown {view} zone: {zone}")]
    UnknownZone { view: ViewMode, zone: String },

    /// Another operation is still in flight
    #[error("layout is busy ({phase})")]
    Busy { phase: Phase },

    /// Field not found
    #[error("field not found: {id}")]
    FieldNotFound { id: String },

    /// Step not found
    #[error("step not found: {id}")]
    StepNotFound { id: String },

    /// Step still owns fields and the delete policy forbids cascading
    #[error("step '{id}' has {count} fields and cannot be deleted")]
    StepNotEmpty { id: String, count: usize },

    /// Invalid value supplied by the caller
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A persistence call failed
    #[error("store write failed during {operation}: {source}")]
    StoreWriteFailed {
        operation: String,
        #[source]
        source: StoreError,
    },

    /// Reading the authoritative tree failed
    #[error("store read failed: {source}")]
    StoreReadFailed {
        #[source]
        source: StoreError,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for LayoutError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}

impl LayoutError {
    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_index(zone: impl ToString, index: usize, len: usize) -> Self {
        Self::InvalidIndex {
            zone: zone.to_string(),
            index,
            len,
        }
    }

    pub(crate) fn unknown_zone(view: ViewMode, zone: impl Into<String>) -> Self {
        Self::UnknownZone {
            view,
            zone: zone.into(),
        }
    }

    /// Errors caused by the UI offering indices or zones the engine never produced
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::InvalidIndex { .. } | Self::UnknownZone { .. })
    }

    /// Errors the admin must be told about
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::StoreWriteFailed { .. } | Self::StoreReadFailed { .. }
        )
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}
