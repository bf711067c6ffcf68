//! Build pass orchestration.
//!
//! One [`BuildPass`] owns a whole build: resolve configuration, update
//! the registry, generate model documents, synthesize override lists, and
//! persist the registry.
//!
//! ## Registry Lifecycle
//!
//! The registry store is acquire/release scoped: loaded once at the start,
//! persisted on every exit path after mutation has begun, including fatal
//! ones. The single exception is the unattended-allocation guard, which
//! fires before mutation and explicitly forbids persistence so no value
//! can materialize without a human to commit it.

use thiserror::Error;

use crate::env::BuildEnv;
use crate::registry::{ModelDataRegistry, RegistryError};
use crate::resolver::{resolve, ResolveError};
use crate::store::{ArtifactStore, BaselineProvider, RegistryStore};
use crate::synthesis::{synthesize_overrides, SynthesisError};
use crate::template::{TemplateError, TemplateRegistry};
use crate::types::{ConfigNode, ItemId, ModelDocument};

/// Top-level build failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration validation failed; aggregated across the forest.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Registry allocation failed fatally.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Template generation failed fatally.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Override synthesis failed fatally.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// A storage collaborator failed.
    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Process-exit code for this failure.
    ///
    /// The unattended-allocation guard gets a distinct code so callers can
    /// tell "stop the whole build, registry was never committed" apart
    /// from ordinary build failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Registry(RegistryError::UnattendedAllocation { .. }) => 3,
            _ => 1,
        }
    }
}

/// One build invocation over one project namespace.
pub struct BuildPass {
    /// The building project's namespace.
    namespace: String,
    /// Whether new identifier allocation is permitted.
    env: BuildEnv,
    /// The configured strategy set.
    templates: TemplateRegistry,
}

impl BuildPass {
    /// Create a pass with the builtin templates, detecting the build
    /// environment from the process environment.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_env(namespace, BuildEnv::detect())
    }

    /// Create a pass with an explicit build environment.
    pub fn with_env(namespace: impl Into<String>, env: BuildEnv) -> Self {
        Self { namespace: namespace.into(), env, templates: TemplateRegistry::builtin() }
    }

    /// Replace the template registry (to add custom strategies).
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// The pass's namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Run the whole pass.
    ///
    /// Fails all-or-nothing on configuration errors before touching the
    /// registry; after registry mutation begins, the registry is persisted
    /// on every exit path except the unattended-allocation guard.
    pub fn run<R, B, A>(
        &self,
        forest: &[ConfigNode],
        registry_store: &R,
        baselines: &B,
        artifacts: &mut A,
    ) -> Result<(), EngineError>
    where
        R: RegistryStore,
        B: BaselineProvider,
        A: ArtifactStore,
    {
        let specs = resolve(forest, &self.namespace)?;

        let mut registry =
            registry_store.load().map_err(|e| EngineError::Store(e.to_string()))?;

        if let Err(e) = registry.update(&specs, &self.namespace, self.env) {
            match e {
                // guard fires before mutation; nothing may be persisted
                RegistryError::UnattendedAllocation { .. } => return Err(e.into()),
                // release the registry: values issued before the failure
                // stay stable for the operator's next attempt
                RegistryError::AllocationExhausted { .. } => {
                    registry_store
                        .persist(&registry)
                        .map_err(|pe| EngineError::Store(pe.to_string()))?;
                    return Err(e.into());
                }
            }
        }

        let emitted = self.emit(&specs, &registry, baselines, artifacts);
        let persisted = registry_store
            .persist(&registry)
            .map_err(|e| EngineError::Store(e.to_string()));

        emitted?;
        persisted
    }

    /// Generate model documents and synthesized override lists.
    fn emit<B, A>(
        &self,
        specs: &[crate::types::ModelSpec],
        registry: &ModelDataRegistry,
        baselines: &B,
        artifacts: &mut A,
    ) -> Result<(), EngineError>
    where
        B: BaselineProvider,
        A: ArtifactStore,
    {
        for spec in specs {
            if let Some(doc) = self.templates.generate(spec, artifacts)? {
                if let Some(name) = spec.artifact.name() {
                    artifacts
                        .put_model(name.as_str(), doc)
                        .map_err(|e| EngineError::Store(e.to_string()))?;
                }
            }
        }

        let items: std::collections::BTreeSet<&ItemId> =
            specs.iter().flat_map(|s| &s.items).collect();
        for item in items {
            let baseline = baselines
                .item_model(item)
                .map_err(|e| EngineError::Store(e.to_string()))?
                .unwrap_or_else(ModelDocument::default);
            let doc = synthesize_overrides(item, specs, registry, baseline)?;
            artifacts
                .put_model(&item.model_key(), doc)
                .map_err(|e| EngineError::Store(e.to_string()))?;
        }
        Ok(())
    }
}
