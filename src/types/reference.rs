//! Reference and item identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Regex for valid resource locations: optional namespace, then a path.
const RESOURCE_LOCATION_PATTERN: &str = r"^([a-z0-9_.-]+:)?[a-z0-9_/.-]+$";

/// Compiled once; validation runs per leaf during resolution.
fn resource_location_regex() -> &'static regex_lite::Regex {
    static REGEX: OnceLock<regex_lite::Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        regex_lite::Regex::new(RESOURCE_LOCATION_PATTERN)
            .expect("reference pattern is a valid regex")
    })
}

/// Namespaced identifier for one visual/logical model variant.
///
/// A reference is the stable name a module uses to address one model
/// (e.g. `gm4_metallurgy:shamir`). Once a CustomModelData value has been
/// issued for a reference and published, the pair is permanent.
///
/// Implements `Ord` on the underlying string for deterministic ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    /// Create a reference from a raw string, without namespace handling.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Check resource-location syntax (`namespace:path` or bare `path`).
    pub fn is_valid(&self) -> bool {
        resource_location_regex().is_match(&self.0)
    }

    /// The namespace portion, if this reference carries one.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(':').map(|(ns, _)| ns)
    }

    /// The path portion (everything after the namespace).
    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, p)| p).unwrap_or(&self.0)
    }

    /// Whether this reference belongs to the given namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace() == Some(namespace)
    }

    /// Attach a namespace if the reference does not already carry one.
    ///
    /// Namespaces are attached exactly once, at configuration-resolution
    /// time; a reference must not change namespace within a build.
    pub fn namespaced(&self, namespace: &str) -> Reference {
        if self.0.contains(':') {
            self.clone()
        } else {
            Reference(format!("{}:{}", namespace, self.0))
        }
    }

    /// The underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Reference {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The item type a CustomModelData value is allocated against.
///
/// Bare item name without namespace (`stick`, `bow`): model data values
/// are scoped per item, so the same integer may appear on different items.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item id from a raw string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Artifact key of this item's baseline model document
    /// (e.g. `minecraft:item/stick`).
    pub fn model_key(&self) -> String {
        format!("{}:item/{}", crate::DEFAULT_NAMESPACE, self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_attach_is_idempotent() {
        let bare = Reference::new("shamir");
        let namespaced = bare.namespaced("gm4_metallurgy");
        assert_eq!(namespaced.as_str(), "gm4_metallurgy:shamir");
        assert_eq!(namespaced.namespaced("other").as_str(), "gm4_metallurgy:shamir");
    }

    #[test]
    fn test_namespace_split() {
        let r = Reference::new("gm4_metallurgy:shamir");
        assert_eq!(r.namespace(), Some("gm4_metallurgy"));
        assert_eq!(r.path(), "shamir");
        assert!(r.in_namespace("gm4_metallurgy"));
        assert!(!r.in_namespace("gm4_orchards"));
    }

    #[test]
    fn test_bare_reference_has_no_namespace() {
        let r = Reference::new("shamir");
        assert_eq!(r.namespace(), None);
        assert_eq!(r.path(), "shamir");
        assert!(!r.in_namespace("gm4_metallurgy"));
    }

    #[test]
    fn test_reference_syntax() {
        assert!(Reference::new("gm4_metallurgy:item/shamir").is_valid());
        assert!(Reference::new("shamir").is_valid());
        assert!(!Reference::new("Bad Name").is_valid());
        assert!(!Reference::new("ns:UPPER").is_valid());
    }

    #[test]
    fn test_item_model_key() {
        assert_eq!(ItemId::new("stick").model_key(), "minecraft:item/stick");
    }
}
