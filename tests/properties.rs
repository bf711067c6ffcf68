//! Property tests for the resolver and registry laws.

use proptest::prelude::*;

use modelsmith::{resolve, BuildEnv, ConfigNode, ItemId, ModelDataRegistry, Reference};

fn leaf_node() -> impl Strategy<Value = ConfigNode> {
    (
        "[a-z][a-z0-9_]{0,8}",
        prop::collection::vec("[a-z][a-z_]{0,6}", 1..3),
        prop::option::of(prop_oneof![
            Just("vanilla".to_string()),
            Just("generated".to_string())
        ]),
    )
        .prop_map(|(reference, items, template)| {
            serde_json::from_value(serde_json::json!({
                "reference": reference,
                "item": items,
                "template": template,
            }))
            .unwrap()
        })
}

fn config_forest() -> impl Strategy<Value = Vec<ConfigNode>> {
    // leaves plus one level of broadcast fan-out
    prop::collection::vec(
        prop_oneof![
            leaf_node(),
            (leaf_node(), prop::collection::vec(leaf_node(), 1..4)).prop_map(
                |(mut parent, children)| {
                    parent.broadcast = children;
                    parent
                }
            ),
        ],
        1..6,
    )
}

proptest! {
    #[test]
    fn resolution_is_idempotent(forest in config_forest()) {
        let first = resolve(&forest, "gm4_prop").unwrap();
        let second = resolve(&forest, "gm4_prop").unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn resolved_references_are_namespaced(forest in config_forest()) {
        for spec in resolve(&forest, "gm4_prop").unwrap() {
            prop_assert!(spec.reference.in_namespace("gm4_prop"));
        }
    }

    #[test]
    fn update_is_idempotent_and_in_band(forest in config_forest()) {
        let specs = resolve(&forest, "gm4_prop").unwrap();
        let mut registry = ModelDataRegistry::new();
        registry.set_band("gm4_prop", 0, 99);

        registry.update(&specs, "gm4_prop", BuildEnv::Interactive).unwrap();
        let after_first = registry.clone();
        registry.update(&specs, "gm4_prop", BuildEnv::Interactive).unwrap();
        prop_assert_eq!(&registry, &after_first);

        for spec in &specs {
            let value = registry.retrieve_index(&spec.reference).unwrap();
            prop_assert!(value <= 99);
        }
    }

    #[test]
    fn allocation_picks_minimum_free_value(used in prop::collection::btree_set(0u32..20, 0..19)) {
        let mut registry = ModelDataRegistry::new();
        registry.set_band("gm4_prop", 0, 19);
        let item = ItemId::new("stick");
        for (i, value) in used.iter().enumerate() {
            registry.insert(item.clone(), Reference::new(format!("gm4_prop:seed_{}", i)), *value);
        }
        let expected = (0u32..=19).find(|v| !used.contains(v)).unwrap();

        let specs = resolve(
            &[serde_json::from_value(serde_json::json!({
                "reference": "fresh",
                "item": "stick",
            }))
            .unwrap()],
            "gm4_prop",
        )
        .unwrap();
        registry.update(&specs, "gm4_prop", BuildEnv::Interactive).unwrap();
        prop_assert_eq!(
            registry.retrieve_index(&Reference::new("gm4_prop:fresh")),
            Some(expected)
        );
    }

    #[test]
    fn serialization_is_deterministic(forest in config_forest()) {
        let specs = resolve(&forest, "gm4_prop").unwrap();
        let mut registry = ModelDataRegistry::new();
        registry.set_band("gm4_prop", 0, 99);
        registry.update(&specs, "gm4_prop", BuildEnv::Interactive).unwrap();

        let a = serde_json::to_string(&registry).unwrap();
        let b = serde_json::to_string(&serde_json::from_str::<ModelDataRegistry>(&a).unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }
}
