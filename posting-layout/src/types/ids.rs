//! Identifier newtypes.
//!
//! Template, step and field ids are ULID strings minted by the engine.
//! Category ids come from the host application and are opaque.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id string
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident) => {
        string_id!($(#[$meta])* $name);

        impl $name {
            /// Mint a fresh ULID-backed id
            pub fn new() -> Self {
                Self(Ulid::new().to_string())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

string_id!(
    /// Host-supplied category identifier. One template exists per category.
    CategoryId
);

ulid_id!(
    /// Template identifier
    TemplateId
);

ulid_id!(
    /// Step identifier
    StepId
);

ulid_id!(
    /// Field identifier
    FieldId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(FieldId::new(), FieldId::new());
        assert_ne!(StepId::new(), StepId::new());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = StepId::from_string("step-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"step-1\"");
        let back: StepId = serde_json::from_str("\"step-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_display_matches_inner() {
        let id = CategoryId::from("cars");
        assert_eq!(id.to_string(), "cars");
        assert_eq!(id.as_str(), "cars");
    }
}
