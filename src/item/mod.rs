//! Host item values as seen by screens.
//!
//! Hosts convert their native item representation into an [`ItemSignature`]
//! before handing it to the registry. Equality is plain value equality over
//! every field, which is what slot matching relies on.

use serde::{Deserialize, Serialize};

pub mod matcher;

pub use matcher::matches_opener;

/// Kind reported by hosts for an empty hand or an empty slot.
pub const EMPTY_KIND: &str = "air";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSignature {
    pub kind: String,
    #[serde(default)]
    pub variant: u16,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ItemSignature {
    pub fn new(kind: impl Into<String>, quantity: u32) -> Self {
        Self {
            kind: kind.into(),
            variant: 0,
            quantity,
            label: None,
        }
    }

    pub fn with_variant(mut self, variant: u16) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// True when the value stands for "no item" (air, blank kind or zero stack).
    pub fn is_empty(&self) -> bool {
        self.quantity == 0 || self.kind.is_empty() || self.kind.eq_ignore_ascii_case(EMPTY_KIND)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}
