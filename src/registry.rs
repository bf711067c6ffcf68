//! Persistent CustomModelData registry.
//!
//! Maps `(item, reference)` pairs to small integers drawn from a bounded
//! per-namespace band. The registry file is shared across modules and
//! builds; one build pass loads it, mutates it in place, and persists it.
//!
//! ## Stability
//!
//! A value issued for a reference is permanent once published: re-running
//! an update with the same configuration never changes it. A reference is
//! removed only when it disappears from its namespace's configuration
//! entirely, and values are never reassigned while their reference remains
//! configured. Removal exists for development cycles, not for published
//! content.
//!
//! ## Determinism
//!
//! Serialization is deterministic: items sort by key and each item's
//! entries sort by value ascending (ties by reference), keeping registry
//! diffs minimal for change review.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::env::BuildEnv;
use crate::types::{ItemId, ModelSpec, Reference};
use crate::{CUSTOM_MODEL_OFFSET, DEFAULT_ALLOCATION};

/// Highest assignable value: leaves room for the fixed offset added when
/// a value is written into a predicate, so the sum can never overflow.
/// Band upper bounds are clamped to this at read time.
pub const MAX_MODEL_DATA_VALUE: u32 = u32::MAX - CUSTOM_MODEL_OFFSET;

/// Fatal registry failures. Both abort the build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Every value in the namespace's band is already taken on one of the
    /// requested items. An operator-configuration error: the band is too
    /// small, not a transient condition.
    #[error("no CustomModelData value is open in band [{lower}, {upper}] of namespace `{namespace}` for reference `{reference}`")]
    AllocationExhausted {
        /// Namespace whose band is exhausted.
        namespace: String,
        /// Inclusive lower bound of the band.
        lower: u32,
        /// Inclusive upper bound of the band.
        upper: u32,
        /// Reference that could not be assigned.
        reference: Reference,
    },

    /// A new value would be issued in an unattended environment, where it
    /// could never be committed back to the shared registry file. Raised
    /// before any mutation; the registry must not be persisted after it.
    #[error("reference `{reference}` needs a new CustomModelData value, which cannot be issued in an unattended build; run an interactive build and commit the registry")]
    UnattendedAllocation {
        /// Reference that required a new value.
        reference: Reference,
    },
}

/// The persisted `(item, reference) -> value` mapping plus per-namespace
/// allocation bands.
///
/// The only entity with lifetime beyond a single build: loaded once at the
/// start of a pass, mutated in place by [`update`](Self::update), and
/// persisted once at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDataRegistry {
    /// Item to reference-to-value mapping.
    items: BTreeMap<ItemId, BTreeMap<Reference, u32>>,
    /// Namespace to inclusive `[lower, upper]` value band.
    allocations: BTreeMap<String, (u32, u32)>,
}

impl ModelDataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The inclusive value band for a namespace, falling back to the
    /// default allocation when none is configured. The upper bound is
    /// clamped to [`MAX_MODEL_DATA_VALUE`], covering hand-edited files too.
    pub fn band(&self, namespace: &str) -> (u32, u32) {
        let (lower, upper) =
            self.allocations.get(namespace).copied().unwrap_or(DEFAULT_ALLOCATION);
        (lower, upper.min(MAX_MODEL_DATA_VALUE))
    }

    /// Reserve an explicit band for a namespace.
    pub fn set_band(&mut self, namespace: impl Into<String>, lower: u32, upper: u32) {
        self.allocations.insert(namespace.into(), (lower, upper));
    }

    /// The value assigned to a reference, searching across all items.
    ///
    /// A reference has at most one globally-intended value, so the first
    /// hit is authoritative.
    pub fn retrieve_index(&self, reference: &Reference) -> Option<u32> {
        self.items.values().find_map(|entries| entries.get(reference).copied())
    }

    /// The reference-to-value entries recorded for one item.
    pub fn item_entries(&self, item: &ItemId) -> Option<&BTreeMap<Reference, u32>> {
        self.items.get(item)
    }

    /// Record an assignment directly. Test and migration seam; ordinary
    /// builds go through [`update`](Self::update).
    pub fn insert(&mut self, item: ItemId, reference: Reference, value: u32) {
        self.items.entry(item).or_default().insert(reference, value);
    }

    /// Update the registry from one build's flat configuration.
    ///
    /// Runs the allocation algorithm per spec record in input order, then
    /// garbage-collects references of `namespace` that the configuration
    /// no longer defines. References in other namespaces are never touched.
    pub fn update(
        &mut self,
        specs: &[ModelSpec],
        namespace: &str,
        env: BuildEnv,
    ) -> Result<(), RegistryError> {
        for spec in specs {
            let reference = &spec.reference;
            match self.retrieve_index(reference) {
                Some(value) if !self.conflicts(spec, value) => {
                    // share the existing value onto any item missing it
                    for item in &spec.items {
                        self.items
                            .entry(item.clone())
                            .or_default()
                            .entry(reference.clone())
                            .or_insert(value);
                    }
                }
                existing => {
                    if existing.is_some() {
                        tracing::warn!(
                            reference = %reference,
                            "failed to share existing CustomModelData; a new value will be \
                             assigned and existing items may lose their texture"
                        );
                    }
                    self.assign_new_index(spec, namespace, env)?;
                }
            }
        }

        self.collect_garbage(specs, namespace);
        Ok(())
    }

    /// Whether assigning `value` for this spec's reference would collide
    /// with a different reference on any of its items.
    fn conflicts(&self, spec: &ModelSpec, value: u32) -> bool {
        spec.items.iter().any(|item| {
            self.items
                .get(item)
                .map(|entries| {
                    entries.iter().any(|(r, v)| r != &spec.reference && *v == value)
                })
                .unwrap_or(false)
        })
    }

    /// Find the minimum free value in the namespace's band across all of
    /// the spec's items and record it for each item missing the reference.
    fn assign_new_index(
        &mut self,
        spec: &ModelSpec,
        namespace: &str,
        env: BuildEnv,
    ) -> Result<(), RegistryError> {
        // guard before any mutation so nothing unpersistable materializes
        if !env.allows_allocation() {
            return Err(RegistryError::UnattendedAllocation { reference: spec.reference.clone() });
        }

        let (lower, upper) = self.band(namespace);
        let mut used: BTreeSet<u32> = BTreeSet::new();
        for item in &spec.items {
            if let Some(entries) = self.items.get(item) {
                used.extend(entries.values().copied());
            }
        }

        // scan upward instead of materializing the band; the first free
        // value lies within `used.len() + 1` steps of `lower`
        let value = (lower..=upper).find(|v| !used.contains(v)).ok_or_else(|| {
            RegistryError::AllocationExhausted {
                namespace: namespace.to_string(),
                lower,
                upper,
                reference: spec.reference.clone(),
            }
        })?;

        for item in &spec.items {
            let entries = self.items.entry(item.clone()).or_default();
            if !entries.contains_key(&spec.reference) {
                entries.insert(spec.reference.clone(), value);
                tracing::info!(
                    reference = %spec.reference,
                    item = %item,
                    value,
                    "issuing new CustomModelData"
                );
            }
        }
        Ok(())
    }

    /// Delete references of `namespace` that the current configuration no
    /// longer defines on any item.
    fn collect_garbage(&mut self, specs: &[ModelSpec], namespace: &str) {
        let configured: BTreeSet<&Reference> = specs
            .iter()
            .map(|s| &s.reference)
            .filter(|r| r.in_namespace(namespace))
            .collect();

        for entries in self.items.values_mut() {
            entries.retain(|reference, _| {
                let keep = !reference.in_namespace(namespace) || configured.contains(reference);
                if !keep {
                    tracing::info!(%reference, "removing undefined CustomModelData from registry");
                }
                keep
            });
        }
    }
}

impl Serialize for ModelDataRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        /// Inner map emitted sorted by value ascending, ties by reference.
        struct ByValue<'a>(&'a BTreeMap<Reference, u32>);

        impl Serialize for ByValue<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut entries: Vec<(&Reference, u32)> =
                    self.0.iter().map(|(r, v)| (r, *v)).collect();
                entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (reference, value) in entries {
                    map.serialize_entry(reference, &value)?;
                }
                map.end()
            }
        }

        struct Items<'a>(&'a BTreeMap<ItemId, BTreeMap<Reference, u32>>);

        impl Serialize for Items<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (item, entries) in self.0 {
                    map.serialize_entry(item, &ByValue(entries))?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("ModelDataRegistry", 2)?;
        state.serialize_field("items", &Items(&self.items))?;
        state.serialize_field("allocations", &self.allocations)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ModelDataRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(default)]
            items: BTreeMap<ItemId, BTreeMap<Reference, u32>>,
            #[serde(default)]
            allocations: BTreeMap<String, (u32, u32)>,
        }

        let repr = Repr::deserialize(deserializer)?;
        Ok(Self { items: repr.items, allocations: repr.allocations })
    }
}
