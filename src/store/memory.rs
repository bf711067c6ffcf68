//! In-memory stores for testing.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

use super::{ArtifactStore, BaselineProvider, RegistryStore};
use crate::registry::ModelDataRegistry;
use crate::types::{ItemId, ModelDocument};

/// In-memory resource pack for testing.
///
/// Plays baseline provider and artifact store at once; BTree containers
/// keep iteration deterministic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPack {
    /// Baseline item model documents, keyed by item.
    baselines: BTreeMap<ItemId, ModelDocument>,
    /// Model documents keyed by artifact key.
    models: BTreeMap<String, ModelDocument>,
    /// Known texture keys.
    textures: BTreeSet<String>,
}

impl InMemoryPack {
    /// Create an empty pack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a baseline item model.
    pub fn add_baseline(&mut self, item: ItemId, doc: ModelDocument) {
        self.baselines.insert(item, doc);
    }

    /// Seed a source model document.
    pub fn add_model(&mut self, key: impl Into<String>, doc: ModelDocument) {
        self.models.insert(key.into(), doc);
    }

    /// Seed a texture key.
    pub fn add_texture(&mut self, key: impl Into<String>) {
        self.textures.insert(key.into());
    }

    /// All stored model keys.
    pub fn model_keys(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Number of stored models.
    pub fn num_models(&self) -> usize {
        self.models.len()
    }
}

impl BaselineProvider for InMemoryPack {
    type Error = Infallible;

    fn item_model(&self, item: &ItemId) -> Result<Option<ModelDocument>, Self::Error> {
        Ok(self.baselines.get(item).cloned())
    }
}

impl ArtifactStore for InMemoryPack {
    type Error = Infallible;

    fn model(&self, key: &str) -> Result<Option<ModelDocument>, Self::Error> {
        Ok(self.models.get(key).cloned())
    }

    fn put_model(&mut self, key: &str, doc: ModelDocument) -> Result<(), Self::Error> {
        self.models.insert(key.to_string(), doc);
        Ok(())
    }

    fn has_texture(&self, key: &str) -> bool {
        self.textures.contains(key)
    }
}

/// In-memory registry store for testing: load clones, persist replaces.
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    registry: RefCell<ModelDataRegistry>,
    persisted: RefCell<bool>,
}

impl InMemoryRegistryStore {
    /// Create a store seeded with the given registry.
    pub fn seeded(registry: ModelDataRegistry) -> Self {
        Self { registry: RefCell::new(registry), persisted: RefCell::new(false) }
    }

    /// The currently stored registry.
    pub fn snapshot(&self) -> ModelDataRegistry {
        self.registry.borrow().clone()
    }

    /// Whether `persist` has been called since construction.
    pub fn was_persisted(&self) -> bool {
        *self.persisted.borrow()
    }
}

impl RegistryStore for InMemoryRegistryStore {
    type Error = Infallible;

    fn load(&self) -> Result<ModelDataRegistry, Self::Error> {
        Ok(self.registry.borrow().clone())
    }

    fn persist(&self, registry: &ModelDataRegistry) -> Result<(), Self::Error> {
        *self.registry.borrow_mut() = registry.clone();
        *self.persisted.borrow_mut() = true;
        Ok(())
    }
}
