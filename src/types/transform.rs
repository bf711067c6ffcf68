//! Post-generation transforms for model documents.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::artifact::ModelDocument;

/// Discrete placement points a model document's `display` block is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySlot {
    /// Held in the right hand, third-person camera.
    ThirdpersonRighthand,
    /// Held in the left hand, third-person camera.
    ThirdpersonLefthand,
    /// Held in the right hand, first-person camera.
    FirstpersonRighthand,
    /// Held in the left hand, first-person camera.
    FirstpersonLefthand,
    /// Inventory/GUI rendering.
    Gui,
    /// Worn on the head.
    Head,
    /// Dropped on the ground.
    Ground,
    /// Item frame / fixed display.
    Fixed,
}

impl fmt::Display for DisplaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ThirdpersonRighthand => "thirdperson_righthand",
            Self::ThirdpersonLefthand => "thirdperson_lefthand",
            Self::FirstpersonRighthand => "firstperson_righthand",
            Self::FirstpersonLefthand => "firstperson_lefthand",
            Self::Gui => "gui",
            Self::Head => "head",
            Self::Ground => "ground",
            Self::Fixed => "fixed",
        };
        write!(f, "{}", s)
    }
}

fn zero_vec3() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn unit_vec3() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn is_zero(v: &[f32; 3]) -> bool {
    *v == [0.0, 0.0, 0.0]
}

fn is_unit(v: &[f32; 3]) -> bool {
    *v == [1.0, 1.0, 1.0]
}

/// A 3D placement transform written into one `display` slot.
///
/// Unset components serialize away so generated documents stay minimal,
/// matching hand-written model files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    /// Rotation in degrees around x/y/z.
    #[serde(default = "zero_vec3", skip_serializing_if = "is_zero")]
    pub rotation: [f32; 3],
    /// Translation in model units.
    #[serde(default = "zero_vec3", skip_serializing_if = "is_zero")]
    pub translation: [f32; 3],
    /// Scale per axis.
    #[serde(default = "unit_vec3", skip_serializing_if = "is_unit")]
    pub scale: [f32; 3],
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self {
            rotation: zero_vec3(),
            translation: zero_vec3(),
            scale: unit_vec3(),
        }
    }
}

/// A named, polymorphic transform applied to a generated document.
///
/// Transforms execute in declared order: template defaults first, then
/// record-specific transforms, each mutating the document in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformSpec {
    /// Write a 3D placement transform into one display slot.
    Display {
        /// Placement point the transform applies to.
        slot: DisplaySlot,
        /// The placement parameters.
        #[serde(flatten)]
        transform: DisplayTransform,
    },
}

impl TransformSpec {
    /// Apply this transform to a model document.
    pub fn apply(&self, doc: &mut ModelDocument) {
        match self {
            Self::Display { slot, transform } => {
                doc.display.insert(*slot, transform.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_transform_writes_slot() {
        let mut doc = ModelDocument::default();
        let spec = TransformSpec::Display {
            slot: DisplaySlot::Gui,
            transform: DisplayTransform {
                rotation: [30.0, 225.0, 0.0],
                scale: [0.625, 0.625, 0.625],
                ..Default::default()
            },
        };
        spec.apply(&mut doc);
        assert_eq!(doc.display[&DisplaySlot::Gui].rotation, [30.0, 225.0, 0.0]);
    }

    #[test]
    fn test_later_transform_wins_same_slot() {
        let mut doc = ModelDocument::default();
        let first = TransformSpec::Display {
            slot: DisplaySlot::Head,
            transform: DisplayTransform { translation: [0.0, 1.0, 0.0], ..Default::default() },
        };
        let second = TransformSpec::Display {
            slot: DisplaySlot::Head,
            transform: DisplayTransform { translation: [0.0, 2.0, 0.0], ..Default::default() },
        };
        first.apply(&mut doc);
        second.apply(&mut doc);
        assert_eq!(doc.display[&DisplaySlot::Head].translation, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_transform_spec_deserializes_from_config_shape() {
        let json = r#"{"type": "display", "slot": "gui", "rotation": [0.0, 90.0, 0.0]}"#;
        let spec: TransformSpec = serde_json::from_str(json).unwrap();
        match spec {
            TransformSpec::Display { slot, transform } => {
                assert_eq!(slot, DisplaySlot::Gui);
                assert_eq!(transform.rotation, [0.0, 90.0, 0.0]);
                assert_eq!(transform.scale, [1.0, 1.0, 1.0]);
            }
        }
    }

    #[test]
    fn test_default_components_serialize_away() {
        let t = DisplayTransform { rotation: [10.0, 0.0, 0.0], ..Default::default() };
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("rotation").is_some());
        assert!(json.get("translation").is_none());
        assert!(json.get("scale").is_none());
    }
}
