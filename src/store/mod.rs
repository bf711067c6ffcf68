//! Storage collaborators for one build pass.
//!
//! The engine itself performs no I/O mid-algorithm; these traits are the
//! seams to the outside world. The registry store is acquire/release
//! scoped to one pass (load at the start, persist at the end); baseline
//! and artifact access happen between the two.

pub mod file;
pub mod memory;

use crate::registry::ModelDataRegistry;
use crate::types::{ItemId, ModelDocument};

/// Backend for the shared persisted registry file.
///
/// One pass owns the loaded registry exclusively; callers running multiple
/// passes against the same backing file must serialize them.
pub trait RegistryStore {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the registry. A missing backing file yields an empty registry.
    fn load(&self) -> Result<ModelDataRegistry, Self::Error>;

    /// Persist the registry in a single atomic write.
    fn persist(&self, registry: &ModelDataRegistry) -> Result<(), Self::Error>;
}

/// Source of baseline model documents (the vanilla assets an override
/// list is merged into).
pub trait BaselineProvider {
    /// Error type for provider operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The baseline model document for an item, if one exists.
    fn item_model(&self, item: &ItemId) -> Result<Option<ModelDocument>, Self::Error>;
}

/// Destination for generated and synthesized model documents, and the
/// lookup surface for textures and already-present source models.
pub trait ArtifactStore {
    /// Error type for artifact operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// An existing model document by artifact key.
    fn model(&self, key: &str) -> Result<Option<ModelDocument>, Self::Error>;

    /// Write a model document under an artifact key.
    fn put_model(&mut self, key: &str, doc: ModelDocument) -> Result<(), Self::Error>;

    /// Whether a texture exists in the asset set. Used only for warnings.
    fn has_texture(&self, key: &str) -> bool;
}

pub use file::{FileRegistryStore, FileStoreError};
pub use memory::{InMemoryPack, InMemoryRegistryStore};
