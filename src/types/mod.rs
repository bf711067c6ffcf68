//! Core types for the model-data engine.

pub mod artifact;
pub mod config;
pub mod reference;
pub mod transform;

pub use artifact::{ModelDocument, ModelOverride, Predicate};
pub use config::{ArtifactRef, ConfigNode, ModelSpec, OneOrMany, Textures};
pub use reference::{ItemId, Reference};
pub use transform::{DisplaySlot, DisplayTransform, TransformSpec};
