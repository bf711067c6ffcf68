//! Override synthesis.
//!
//! Splices CustomModelData predicates into a baseline model's override
//! list. Pre-existing baseline entries are namespaced and kept first, in
//! their original order; generated entries are appended after them, so the
//! consumer's in-order evaluation keeps baseline visual precedence intact
//! and repeated builds from the same baseline produce the same list.

use thiserror::Error;

use crate::registry::ModelDataRegistry;
use crate::types::{ArtifactRef, ItemId, ModelDocument, ModelOverride, ModelSpec, Reference};
use crate::CUSTOM_MODEL_OFFSET;

/// Predicate field the allocated identifier is written into.
const PREDICATE_FIELD: &str = "custom_model_data";

/// Fatal synthesis failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// A spec reached synthesis without a registry entry. The registry
    /// update runs first in a pass, so this indicates a caller bug or a
    /// manually edited registry file.
    #[error("reference `{reference}` targeting `{item}` has no CustomModelData value in the registry")]
    ReferenceNotRegistered {
        /// The unregistered reference.
        reference: Reference,
        /// The item being synthesized.
        item: ItemId,
    },
}

/// Merge generated override entries for one item into its baseline
/// document, returning the mutated document.
pub fn synthesize_overrides(
    item: &ItemId,
    specs: &[ModelSpec],
    registry: &ModelDataRegistry,
    mut baseline: ModelDocument,
) -> Result<ModelDocument, SynthesisError> {
    // baseline references without a namespace belong to the default one
    for entry in &mut baseline.overrides {
        entry.namespace_model();
    }
    // snapshot of the namespaced baseline list, reused as the merge base
    let reuse_pool: Vec<ModelOverride> = baseline.overrides.clone();

    for spec in specs.iter().filter(|s| s.targets(item)) {
        let value = registry.retrieve_index(&spec.reference).ok_or_else(|| {
            SynthesisError::ReferenceNotRegistered {
                reference: spec.reference.clone(),
                item: item.clone(),
            }
        })?;
        let custom_model_data = CUSTOM_MODEL_OFFSET + value;

        match &spec.artifact {
            // user-supplied complex predicates: used verbatim, each entry
            // must carry its own artifact reference
            ArtifactRef::Overrides(entries) => {
                // a degenerate empty list still publishes the identifier,
                // pointing at the reference itself
                if entries.is_empty() {
                    let empty = ModelOverride::default();
                    baseline
                        .overrides
                        .push(merged_entry(custom_model_data, &empty, spec.reference.as_str()));
                }
                for base in entries {
                    let Some(model) = &base.model else {
                        tracing::warn!(
                            reference = %spec.reference,
                            "user-supplied override entry has no model reference; skipping"
                        );
                        continue;
                    };
                    baseline.overrides.push(merged_entry(custom_model_data, base, model));
                }
            }
            // single-name form: merge onto every baseline predicate so the
            // generated model keeps baseline state variants (pulling, ...)
            ArtifactRef::Name(name) => {
                if reuse_pool.is_empty() {
                    let empty = ModelOverride::default();
                    baseline.overrides.push(merged_entry(custom_model_data, &empty, name.as_str()));
                } else {
                    for base in &reuse_pool {
                        baseline.overrides.push(merged_entry(custom_model_data, base, name.as_str()));
                    }
                }
            }
        }
    }

    Ok(baseline)
}

/// Build one appended override: the identifier predicate unioned with the
/// base predicate (base fields win on clash), pointing at `model`.
fn merged_entry(custom_model_data: u32, base: &ModelOverride, model: &str) -> ModelOverride {
    let mut predicate = crate::types::Predicate::new();
    predicate.insert(PREDICATE_FIELD.to_string(), serde_json::json!(custom_model_data));
    for (key, value) in &base.predicate {
        predicate.insert(key.clone(), value.clone());
    }
    ModelOverride { predicate, model: Some(model.to_string()) }
}
