//! # modelsmith
//!
//! Persistent CustomModelData registry and model override synthesis for
//! resource pack builds.
//!
//! The engine answers one question per build:
//!
//! > Given a module's model configuration, which CustomModelData value
//! > renders each variant, and what override lists make that happen?
//!
//! ## Core Contract
//!
//! 1. Collapse the nested, broadcast-capable configuration into a flat
//!    list of fully-resolved model specs
//! 2. Assign each `(item, reference)` pair a stable small integer from the
//!    project namespace's band, reusing persisted assignments
//! 3. Generate model documents from named template strategies
//! 4. Splice the assigned identifiers into each item's baseline override
//!    list without disturbing pre-existing entries
//!
//! ## Architecture
//!
//! ```text
//! ConfigNode forest → Resolver → ModelSpecs → Registry update
//!                                    ↓             ↓
//!                              TemplateEngine   Synthesizer
//!                                    ↓             ↓
//!                               ArtifactStore (generated docs + overrides)
//! ```
//!
//! ## Stability Guarantees
//!
//! - A value issued for a reference never changes while the reference
//!   stays configured; removal requires the reference to disappear
//! - Registry serialization is deterministic (sorted by item, then value)
//! - Override synthesis appends after baseline entries, preserving the
//!   relative order of both groups

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod env;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod synthesis;
pub mod template;
pub mod types;

// Re-exports
pub use engine::{BuildPass, EngineError};
pub use env::BuildEnv;
pub use registry::{ModelDataRegistry, RegistryError, MAX_MODEL_DATA_VALUE};
pub use resolver::{resolve, ConfigProblem, ResolveError, MAX_BROADCAST_DEPTH};
pub use store::{ArtifactStore, BaselineProvider, FileRegistryStore, RegistryStore};
pub use synthesis::{synthesize_overrides, SynthesisError};
pub use template::{Generator, Template, TemplateError, TemplateRegistry};
pub use types::{
    ArtifactRef, ConfigNode, DisplaySlot, DisplayTransform, ItemId, ModelDocument, ModelOverride,
    ModelSpec, OneOrMany, Predicate, Reference, Textures, TransformSpec,
};

/// Fixed offset added to every allocated identifier before it is written
/// into a predicate, keeping generated values clear of any externally
/// reserved low range.
pub const CUSTOM_MODEL_OFFSET: u32 = 3_420_000;

/// Namespace assumed for un-namespaced baseline artifact references.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Inclusive value band used for namespaces without an explicit
/// allocation entry.
pub const DEFAULT_ALLOCATION: (u32, u32) = (0, 99);

/// Name of the identity template: the artifact exists in source form and
/// nothing is generated.
pub const IDENTITY_TEMPLATE: &str = "vanilla";
