//! Configuration tree resolver.
//!
//! Collapses a forest of broadcast-capable [`ConfigNode`]s into flat,
//! fully-validated [`ModelSpec`]s.
//!
//! ## Algorithm
//!
//! Depth-first collapse. A node with no children yields itself as one leaf
//! candidate. A node with children yields nothing itself; each child is
//! merged onto the parent (child fields win, `broadcast` taken from the
//! child) and collapsed recursively. Every terminal candidate is then
//! validated and defaulted into a [`ModelSpec`], with the reference
//! namespaced exactly once.
//!
//! ## Error Aggregation
//!
//! Validation failures are collected per top-level forest entry so one
//! mis-configured branch does not hide problems in its siblings. If any
//! entry produced a failure the whole resolution fails with one aggregated
//! error; callers never see partial results.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::types::{ArtifactRef, ConfigNode, ModelSpec, Textures};
use crate::IDENTITY_TEMPLATE;

/// Depth bound for recursive broadcast collapse.
///
/// Configuration is hand-written and shallow in practice; exceeding this
/// bound indicates a pathological or self-referential tree and is reported
/// as a validation error rather than recursed into.
pub const MAX_BROADCAST_DEPTH: usize = 64;

/// One reason a collapsed leaf failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigProblem {
    /// A required field was still unset after inheritance.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// The reference is not a valid resource location.
    #[error("invalid resource location `{0}`")]
    InvalidReference(String),
    /// Explicit override lists bypass generation and require the
    /// identity template.
    #[error("explicit override list requires the `{IDENTITY_TEMPLATE}` template, found `{0}`")]
    OverridesRequireIdentity(String),
    /// Broadcast nesting exceeded [`MAX_BROADCAST_DEPTH`].
    #[error("broadcast nesting exceeds {MAX_BROADCAST_DEPTH} levels")]
    BroadcastTooDeep,
}

/// A validation failure at one collapsed leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafFailure {
    /// Index of the leaf within its top-level entry's collapse order.
    pub leaf: usize,
    /// What went wrong.
    pub problem: ConfigProblem,
}

/// All failures under one top-level forest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailures {
    /// Index of the entry in the input forest.
    pub index: usize,
    /// Failures from this entry's collapsed leaves.
    pub failures: Vec<LeafFailure>,
}

/// Aggregated validation error for a whole forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    /// Failures grouped by top-level forest entry.
    pub entries: Vec<EntryFailures>,
}

impl std::error::Error for ResolveError {}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "model configuration has {} invalid top-level entr{}:",
            self.entries.len(),
            if self.entries.len() == 1 { "y" } else { "ies" }
        )?;
        for entry in &self.entries {
            writeln!(f, "  entry {} inherited incomplete options:", entry.index)?;
            for failure in &entry.failures {
                writeln!(f, "    leaf {}: {}", failure.leaf, failure.problem)?;
            }
        }
        Ok(())
    }
}

/// Collapse and validate a configuration forest.
///
/// `namespace` is the building project's namespace, attached to every
/// un-namespaced reference, artifact name, and defaulted texture.
pub fn resolve(forest: &[ConfigNode], namespace: &str) -> Result<Vec<ModelSpec>, ResolveError> {
    let mut specs: Vec<ModelSpec> = Vec::new();
    let mut errors: Vec<EntryFailures> = Vec::new();

    for (index, node) in forest.iter().enumerate() {
        let mut leaves: Vec<ConfigNode> = Vec::new();
        let mut failures: Vec<LeafFailure> = Vec::new();

        if let Err(problem) = collapse(node, 0, &mut leaves) {
            failures.push(LeafFailure { leaf: 0, problem });
        }

        for (leaf, candidate) in leaves.iter().enumerate() {
            match validate(candidate, namespace) {
                Ok(spec) => specs.push(spec),
                Err(problems) => failures
                    .extend(problems.into_iter().map(|problem| LeafFailure { leaf, problem })),
            }
        }

        if !failures.is_empty() {
            errors.push(EntryFailures { index, failures });
        }
    }

    if errors.is_empty() {
        Ok(specs)
    } else {
        Err(ResolveError { entries: errors })
    }
}

/// Depth-first broadcast collapse, appending terminal candidates to `out`.
fn collapse(node: &ConfigNode, depth: usize, out: &mut Vec<ConfigNode>) -> Result<(), ConfigProblem> {
    if depth > MAX_BROADCAST_DEPTH {
        return Err(ConfigProblem::BroadcastTooDeep);
    }
    if node.broadcast.is_empty() {
        out.push(node.clone());
        return Ok(());
    }
    for child in &node.broadcast {
        collapse(&node.merged_child(child), depth + 1, out)?;
    }
    Ok(())
}

/// Validate a terminal candidate and apply field defaults.
fn validate(node: &ConfigNode, namespace: &str) -> Result<ModelSpec, Vec<ConfigProblem>> {
    let mut problems: Vec<ConfigProblem> = Vec::new();

    let reference = match &node.reference {
        Some(r) if !r.is_valid() => {
            problems.push(ConfigProblem::InvalidReference(r.as_str().to_string()));
            None
        }
        Some(r) => Some(r.namespaced(namespace)),
        None => {
            problems.push(ConfigProblem::MissingField("reference"));
            None
        }
    };

    let items: BTreeSet<_> = match &node.item {
        Some(list) => list.entries().into_iter().collect(),
        None => BTreeSet::new(),
    };
    if items.is_empty() {
        problems.push(ConfigProblem::MissingField("item"));
    }

    let template = node.template.clone().unwrap_or_else(|| IDENTITY_TEMPLATE.to_string());

    let artifact = match (&node.model, &reference) {
        (Some(ArtifactRef::Overrides(list)), _) => {
            if template != IDENTITY_TEMPLATE {
                problems.push(ConfigProblem::OverridesRequireIdentity(template.clone()));
            }
            Some(ArtifactRef::Overrides(list.clone()))
        }
        (Some(ArtifactRef::Name(name)), _) => Some(ArtifactRef::Name(name.namespaced(namespace))),
        // artifact defaults to the reference itself
        (None, Some(reference)) => Some(ArtifactRef::Name(reference.clone())),
        (None, None) => None,
    };

    if !problems.is_empty() {
        return Err(problems);
    }

    let reference = reference.expect("validated above");
    let textures = node
        .textures
        .clone()
        .unwrap_or_else(|| Textures::Ordered(vec![reference.as_str().to_string()]));

    Ok(ModelSpec {
        items,
        reference,
        artifact: artifact.expect("validated above"),
        template,
        textures,
        transforms: node.transforms.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemId, Reference};

    fn forest(value: serde_json::Value) -> Vec<ConfigNode> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_leaf_without_broadcast_resolves_itself() {
        let specs = resolve(
            &forest(serde_json::json!([{"reference": "a", "item": ["stick"]}])),
            "gm4_test",
        )
        .unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].reference, Reference::new("gm4_test:a"));
        assert!(specs[0].targets(&ItemId::new("stick")));
    }

    #[test]
    fn test_broadcast_children_inherit_and_override() {
        let specs = resolve(
            &forest(serde_json::json!([{
                "reference": "a",
                "item": ["stick"],
                "broadcast": [{"item": ["bow"]}]
            }])),
            "gm4_test",
        )
        .unwrap();
        // the broadcasting parent contributes no leaf of its own
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].reference, Reference::new("gm4_test:a"));
        assert!(specs[0].targets(&ItemId::new("bow")));
        assert!(!specs[0].targets(&ItemId::new("stick")));
    }

    #[test]
    fn test_defaults_artifact_and_textures_to_reference() {
        let specs = resolve(
            &forest(serde_json::json!([{"reference": "a", "item": "stick"}])),
            "gm4_test",
        )
        .unwrap();
        let spec = &specs[0];
        assert_eq!(spec.artifact.name(), Some(&Reference::new("gm4_test:a")));
        assert_eq!(spec.textures, Textures::Ordered(vec!["gm4_test:a".to_string()]));
        assert_eq!(spec.template, IDENTITY_TEMPLATE);
    }

    #[test]
    fn test_nested_broadcast_collapses_recursively() {
        let specs = resolve(
            &forest(serde_json::json!([{
                "reference": "a",
                "broadcast": [{
                    "item": "stick",
                    "broadcast": [{"reference": "b"}, {"reference": "c"}]
                }]
            }])),
            "gm4_test",
        )
        .unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].reference, Reference::new("gm4_test:b"));
        assert_eq!(specs[1].reference, Reference::new("gm4_test:c"));
        assert!(specs.iter().all(|s| s.targets(&ItemId::new("stick"))));
    }

    #[test]
    fn test_errors_aggregate_across_entries() {
        let err = resolve(
            &forest(serde_json::json!([
                {"reference": "ok", "item": "stick"},
                {"item": "stick"},
                {"reference": "x"}
            ])),
            "gm4_test",
        )
        .unwrap_err();
        let indices: Vec<usize> = err.entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(err.entries[0].failures[0].problem, ConfigProblem::MissingField("reference"));
        assert_eq!(err.entries[1].failures[0].problem, ConfigProblem::MissingField("item"));
    }

    #[test]
    fn test_override_list_requires_identity_template() {
        let err = resolve(
            &forest(serde_json::json!([{
                "reference": "a",
                "item": "bow",
                "template": "generated",
                "model": [{"predicate": {"pulling": 1}, "model": "gm4:bow_pull"}]
            }])),
            "gm4_test",
        )
        .unwrap_err();
        assert!(matches!(
            err.entries[0].failures[0].problem,
            ConfigProblem::OverridesRequireIdentity(_)
        ));
    }

    #[test]
    fn test_invalid_reference_is_rejected() {
        let err = resolve(
            &forest(serde_json::json!([{"reference": "Bad Ref", "item": "stick"}])),
            "gm4_test",
        )
        .unwrap_err();
        assert!(matches!(
            err.entries[0].failures[0].problem,
            ConfigProblem::InvalidReference(_)
        ));
    }

    #[test]
    fn test_already_namespaced_reference_unchanged() {
        let specs = resolve(
            &forest(serde_json::json!([{"reference": "other_ns:a", "item": "stick"}])),
            "gm4_test",
        )
        .unwrap();
        assert_eq!(specs[0].reference, Reference::new("other_ns:a"));
    }

    #[test]
    fn test_depth_bound_rejects_runaway_nesting() {
        let mut node = serde_json::json!({"reference": "a", "item": "stick"});
        for _ in 0..(MAX_BROADCAST_DEPTH + 2) {
            node = serde_json::json!({"broadcast": [node]});
        }
        let err = resolve(&forest(serde_json::json!([node])), "gm4_test").unwrap_err();
        assert_eq!(err.entries[0].failures[0].problem, ConfigProblem::BroadcastTooDeep);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let input = forest(serde_json::json!([{
            "reference": "a",
            "item": ["stick"],
            "broadcast": [{"item": ["bow"]}, {"reference": "b", "template": "generated"}]
        }]));
        let first = resolve(&input, "gm4_test").unwrap();
        let second = resolve(&input, "gm4_test").unwrap();
        assert_eq!(first, second);
    }
}
