//! Model document and override-list shapes.
//!
//! These mirror the on-disk JSON model format: a document with an optional
//! `parent`, a texture map, a `display` block, and an ordered `overrides`
//! list. Only the override list's shape is owned by this crate; unrelated
//! fields on baseline documents are preserved through `extra`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::transform::{DisplaySlot, DisplayTransform};
use crate::DEFAULT_NAMESPACE;

/// Predicate of one override entry: named values the runtime matches
/// in order against item state (`custom_model_data`, `pulling`, ...).
pub type Predicate = BTreeMap<String, serde_json::Value>;

/// One entry of a model's override list.
///
/// The consumer walks the list in order and picks the last matching entry,
/// so relative order is load-bearing and must never change silently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOverride {
    /// Conditions under which this entry applies. Empty matches always.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub predicate: Predicate,
    /// Artifact reference to render when the predicate matches.
    ///
    /// Optional only because user-supplied override lists may omit it;
    /// such entries are skipped with a warning during synthesis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ModelOverride {
    /// Namespace the artifact reference in place, treating un-namespaced
    /// entries as belonging to the default namespace.
    pub fn namespace_model(&mut self) {
        if let Some(model) = &self.model {
            if !model.contains(':') {
                self.model = Some(format!("{}:{}", DEFAULT_NAMESPACE, model));
            }
        }
    }
}

/// A model document, generated or baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Parent model to inherit geometry from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Texture slot name to texture reference.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub textures: BTreeMap<String, String>,
    /// Placement transforms keyed by display slot.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display: BTreeMap<DisplaySlot, DisplayTransform>,
    /// Ordered predicate-to-model override list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ModelOverride>,
    /// Fields this crate does not interpret (elements, gui_light, ...),
    /// carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelDocument {
    /// A single-texture document inheriting the given parent.
    pub fn with_parent(parent: &str) -> Self {
        Self { parent: Some(parent.to_string()), ..Default::default() }
    }

    /// Set one texture slot.
    pub fn texture(mut self, slot: &str, value: &str) -> Self {
        self.textures.insert(slot.to_string(), value.to_string());
        self
    }
}
