//! Configuration tree and resolved model specification types.
//!
//! Configuration arrives as a forest of [`ConfigNode`]s: every field
//! optional, plus a `broadcast` list of children that inherit unset fields
//! from the ancestor chain. The resolver collapses each tree into flat,
//! fully-validated [`ModelSpec`]s; the tree form never survives resolution.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::artifact::ModelOverride;
use super::reference::{ItemId, Reference};
use super::transform::TransformSpec;

/// A field that accepts either one value or a list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single bare value.
    One(T),
    /// A list of values.
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    /// The values as a list.
    pub fn entries(&self) -> Vec<T> {
        match self {
            Self::One(v) => vec![v.clone()],
            Self::Many(vs) => vs.clone(),
        }
    }
}

/// Where a record's artifact comes from.
///
/// The two forms are mutually exclusive by construction: a record either
/// names a single artifact, or supplies fully-specified override entries
/// that bypass the identifier-merge path entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactRef {
    /// A single artifact reference name.
    Name(Reference),
    /// User-supplied complex predicate entries, used verbatim.
    Overrides(Vec<ModelOverride>),
}

impl ArtifactRef {
    /// The artifact name, when this is the single-name form.
    pub fn name(&self) -> Option<&Reference> {
        match self {
            Self::Name(r) => Some(r),
            Self::Overrides(_) => None,
        }
    }

    /// Whether this is the explicit override-list form.
    pub fn is_overrides(&self) -> bool {
        matches!(self, Self::Overrides(_))
    }
}

/// Texture references for one record: positional or keyed by slot name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Textures {
    /// Ordered list, zipped into a template's declared slot names.
    Ordered(Vec<String>),
    /// Explicit slot-name to texture map.
    Keyed(BTreeMap<String, String>),
}

impl Textures {
    /// All texture references, regardless of shape.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Ordered(list) => list.iter().map(String::as_str).collect(),
            Self::Keyed(map) => map.values().map(String::as_str).collect(),
        }
    }
}

/// A partially-specified configuration node.
///
/// Mirrors [`ModelSpec`] with every field optional, plus `broadcast`.
/// A node with a non-empty `broadcast` contributes no record itself; only
/// its collapsed descendants do, each inheriting unset fields from the
/// ancestor chain. Descendant fields override, never merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigNode {
    /// Item(s) the model data value is allocated against.
    pub item: Option<OneOrMany<ItemId>>,
    /// Reference naming this variant.
    pub reference: Option<Reference>,
    /// Artifact name or explicit override entries.
    pub model: Option<ArtifactRef>,
    /// Generator template name.
    pub template: Option<String>,
    /// Texture references.
    pub textures: Option<Textures>,
    /// Record-specific transforms.
    pub transforms: Option<Vec<TransformSpec>>,
    /// Children inheriting this node's fields.
    pub broadcast: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Merge a child onto this node: child fields win, `broadcast` is
    /// taken from the child alone.
    pub fn merged_child(&self, child: &ConfigNode) -> ConfigNode {
        ConfigNode {
            item: child.item.clone().or_else(|| self.item.clone()),
            reference: child.reference.clone().or_else(|| self.reference.clone()),
            model: child.model.clone().or_else(|| self.model.clone()),
            template: child.template.clone().or_else(|| self.template.clone()),
            textures: child.textures.clone().or_else(|| self.textures.clone()),
            transforms: child.transforms.clone().or_else(|| self.transforms.clone()),
            broadcast: child.broadcast.clone(),
        }
    }
}

/// A fully-resolved configuration unit for one model variant.
///
/// Produced only by the resolver; all defaults applied, the reference
/// namespaced, and the invariants of the config format already enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Items hosting this variant. Non-empty.
    pub items: BTreeSet<ItemId>,
    /// Namespaced reference for this variant.
    pub reference: Reference,
    /// Artifact source. `Overrides` form implies the identity template.
    pub artifact: ArtifactRef,
    /// Generator template name.
    pub template: String,
    /// Texture references. Defaults to `[reference]`.
    pub textures: Textures,
    /// Record-specific transforms, applied after template defaults.
    pub transforms: Vec<TransformSpec>,
}

impl ModelSpec {
    /// Whether this spec targets the given item.
    pub fn targets(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }
}
