//! Model template engine.
//!
//! A template is a named strategy turning a resolved [`ModelSpec`] into an
//! optional generated model document. Builtin strategies cover the common
//! skeletons (flat generated items, handheld items, full cubes); modules
//! can register custom strategies under new names.
//!
//! ## Pipeline
//!
//! 1. Look up the spec's template; an unknown name is fatal.
//! 2. Map textures into slot names: a keyed map is taken as-is, an ordered
//!    list is zipped positionally into the template's declared slots.
//! 3. Warn (never fail) on textures absent from the asset set.
//! 4. Run the strategy to produce the document skeleton, or fetch the
//!    existing source document for identity templates with transforms.
//! 5. Apply transforms in order: template defaults, then record-specific.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::store::ArtifactStore;
use crate::types::{DisplaySlot, DisplayTransform, ModelDocument, ModelSpec, Textures, TransformSpec};
use crate::IDENTITY_TEMPLATE;

/// Fatal template-engine failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The spec names a strategy that is not registered.
    #[error("unknown model template `{0}`")]
    UnknownTemplate(String),

    /// A declared texture slot was left unfilled.
    #[error("template `{template}` requires texture slot `{slot}`")]
    MissingTextureSlot {
        /// The strategy that declared the slot.
        template: String,
        /// The unfilled slot name.
        slot: String,
    },

    /// Artifact store access failed while fetching a source document.
    #[error("artifact store error: {0}")]
    Store(String),
}

/// A skeleton builder: pure function from slotted textures to a document.
pub type SkeletonFn = fn(&BTreeMap<String, String>) -> ModelDocument;

/// How a template produces its document.
#[derive(Debug, Clone)]
pub enum Generator {
    /// Emits nothing; the artifact already exists in source form. When
    /// `fetch` is set and the record carries transforms, the existing
    /// document is fetched solely to apply them.
    Passthrough {
        /// Whether to fetch the source document for transform application.
        fetch: bool,
    },
    /// Builds a fresh document skeleton from the slotted textures.
    Skeleton(SkeletonFn),
}

/// One named generator strategy.
#[derive(Debug, Clone)]
pub struct Template {
    /// Ordered texture slot names. When declared, an ordered texture list
    /// is zipped positionally into these names, and every slot must end
    /// up filled.
    pub slots: Option<&'static [&'static str]>,
    /// Transforms applied to the skeleton before record transforms.
    pub defaults: Vec<TransformSpec>,
    /// The document producer.
    pub generator: Generator,
}

impl Template {
    /// A skeleton-building template.
    pub fn skeleton(slots: &'static [&'static str], build: SkeletonFn) -> Self {
        Self { slots: Some(slots), defaults: Vec::new(), generator: Generator::Skeleton(build) }
    }

    /// A pass-through template that may fetch the source document to
    /// apply transforms.
    pub fn identity() -> Self {
        Self { slots: None, defaults: Vec::new(), generator: Generator::Passthrough { fetch: true } }
    }

    /// Attach default transforms.
    pub fn with_defaults(mut self, defaults: Vec<TransformSpec>) -> Self {
        self.defaults = defaults;
        self
    }
}

/// The configured set of named strategies.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateRegistry {
    /// The builtin strategy set.
    pub fn builtin() -> Self {
        let mut templates: BTreeMap<String, Template> = BTreeMap::new();
        templates.insert(IDENTITY_TEMPLATE.to_string(), Template::identity());
        templates.insert(
            "vanilla_passthrough".to_string(),
            Template { slots: None, defaults: Vec::new(), generator: Generator::Passthrough { fetch: false } },
        );
        templates.insert("generated".to_string(), Template::skeleton(&["layer0"], generated));
        templates.insert(
            "generated_overlay".to_string(),
            Template::skeleton(&["layer0", "layer1"], generated),
        );
        templates.insert("handheld".to_string(), Template::skeleton(&["layer0"], handheld));
        templates.insert(
            "block".to_string(),
            Template::skeleton(&["top", "bottom", "front", "side"], cube).with_defaults(vec![
                TransformSpec::Display {
                    slot: DisplaySlot::Gui,
                    transform: DisplayTransform {
                        rotation: [30.0, 225.0, 0.0],
                        scale: [0.625, 0.625, 0.625],
                        ..Default::default()
                    },
                },
                TransformSpec::Display {
                    slot: DisplaySlot::Ground,
                    transform: DisplayTransform {
                        translation: [0.0, 3.0, 0.0],
                        scale: [0.25, 0.25, 0.25],
                        ..Default::default()
                    },
                },
            ]),
        );
        Self { templates }
    }

    /// Register a custom strategy, replacing any previous one of the
    /// same name.
    pub fn register(&mut self, name: impl Into<String>, template: Template) {
        self.templates.insert(name.into(), template);
    }

    /// Whether a strategy of this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Produce the generated document for one spec, or `None` for
    /// pass-through strategies without transform work.
    pub fn generate<A: ArtifactStore>(
        &self,
        spec: &ModelSpec,
        artifacts: &A,
    ) -> Result<Option<ModelDocument>, TemplateError> {
        let template = self
            .templates
            .get(&spec.template)
            .ok_or_else(|| TemplateError::UnknownTemplate(spec.template.clone()))?;

        let textures = slotted(&spec.textures, template.slots);
        if let Some(slots) = template.slots {
            for slot in slots {
                if !textures.contains_key(*slot) {
                    return Err(TemplateError::MissingTextureSlot {
                        template: spec.template.clone(),
                        slot: (*slot).to_string(),
                    });
                }
            }
        }
        for texture in textures.values() {
            if !artifacts.has_texture(texture) {
                tracing::warn!(
                    texture = %texture,
                    reference = %spec.reference,
                    "referenced texture not found in asset set"
                );
            }
        }

        let mut doc = match &template.generator {
            Generator::Skeleton(build) => build(&textures),
            Generator::Passthrough { fetch } => {
                if !fetch || spec.transforms.is_empty() {
                    return Ok(None);
                }
                let Some(name) = spec.artifact.name() else {
                    return Ok(None);
                };
                match artifacts.model(name.as_str()).map_err(|e| TemplateError::Store(e.to_string()))? {
                    Some(doc) => doc,
                    None => {
                        tracing::warn!(
                            artifact = %name,
                            "transforms configured but source model was not found"
                        );
                        return Ok(None);
                    }
                }
            }
        };

        for transform in template.defaults.iter().chain(&spec.transforms) {
            transform.apply(&mut doc);
        }
        Ok(Some(doc))
    }
}

/// Map a record's textures into slot names.
fn slotted(textures: &Textures, slots: Option<&'static [&'static str]>) -> BTreeMap<String, String> {
    match textures {
        Textures::Keyed(map) => map.clone(),
        Textures::Ordered(list) => match slots {
            Some(slots) => slots
                .iter()
                .zip(list)
                .map(|(slot, tex)| ((*slot).to_string(), tex.clone()))
                .collect(),
            None => list
                .iter()
                .enumerate()
                .map(|(i, tex)| (format!("layer{}", i), tex.clone()))
                .collect(),
        },
    }
}

/// Flat single/multi-layer item skeleton.
fn generated(textures: &BTreeMap<String, String>) -> ModelDocument {
    ModelDocument {
        parent: Some("minecraft:item/generated".to_string()),
        textures: textures.clone(),
        ..Default::default()
    }
}

/// Handheld item skeleton (tools, rods).
fn handheld(textures: &BTreeMap<String, String>) -> ModelDocument {
    ModelDocument {
        parent: Some("minecraft:item/handheld".to_string()),
        textures: textures.clone(),
        ..Default::default()
    }
}

/// Six-face cube skeleton from top/bottom/front/side slots.
fn cube(textures: &BTreeMap<String, String>) -> ModelDocument {
    let slot = |name: &str| textures[name].clone();
    let mut faces = BTreeMap::new();
    faces.insert("up".to_string(), slot("top"));
    faces.insert("down".to_string(), slot("bottom"));
    faces.insert("north".to_string(), slot("front"));
    faces.insert("south".to_string(), slot("side"));
    faces.insert("east".to_string(), slot("side"));
    faces.insert("west".to_string(), slot("side"));
    faces.insert("particle".to_string(), slot("front"));
    ModelDocument { parent: Some("minecraft:block/cube".to_string()), textures: faces, ..Default::default() }
}
