use proptest::prelude::*;
use serde_json::{json, Map, Value};

use tracker_engine::{materialize, merge, parse_instance, serialize_instance, validate_instance};
use tracker_schema::SchemaTree;

const TEMPLATE: &str = include_str!("fixtures/tracker_template.json");

fn schema() -> SchemaTree {
    SchemaTree::from_json_str(TEMPLATE).unwrap()
}

/// Updates that only name fields the template declares.
fn update() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("[A-Za-z ,]{1,24}"),
        proptest::option::of("[A-Za-z]{1,12}"),
        proptest::option::of(proptest::collection::vec("[A-Z][a-z]{2,8}", 0..4)),
        proptest::collection::btree_map("[A-Z][a-z]{2,6}", "[0-9]{1,2}", 0..4),
        proptest::collection::btree_map("[A-Z][a-z]{2,8}", "[A-Za-z]{1,8}", 0..3),
    )
        .prop_map(|(weather, tone, present, inventory, characters)| {
            let mut story = Map::new();
            if let Some(weather) = weather {
                story.insert("Weather".to_string(), json!(weather));
            }
            if let Some(tone) = tone {
                story.insert("EmotionalTone".to_string(), json!(tone));
            }

            let inventory: Map<String, Value> = inventory
                .into_iter()
                .map(|(item, quantity)| {
                    let entry = json!({"ItemName": item, "Quantity": quantity});
                    (item, entry)
                })
                .collect();
            let characters: Map<String, Value> = characters
                .into_iter()
                .map(|(name, trust)| (name, json!({"Relationship": {"Trust": trust}})))
                .collect();

            let mut update = json!({
                "Story": story,
                "MainCharacter": {"Inventory": inventory},
                "Characters": characters,
            });
            if let Some(present) = present {
                update["CharactersPresent"] = json!(present);
            }
            update
        })
}

proptest! {
    #[test]
    fn empty_update_is_identity(first in update()) {
        let schema = schema();
        let instance = merge(&materialize(&schema), &first, &schema).instance;

        let outcome = merge(&instance, &json!({}), &schema);
        prop_assert!(outcome.report.is_clean());
        prop_assert_eq!(outcome.instance, instance);
    }

    #[test]
    fn merge_is_idempotent(first in update(), second in update()) {
        let schema = schema();
        let instance = merge(&materialize(&schema), &first, &schema).instance;

        let once = merge(&instance, &second, &schema);
        let twice = merge(&once.instance, &second, &schema);
        prop_assert!(once.report.is_clean());
        prop_assert!(!twice.report.changed());
        prop_assert_eq!(twice.instance, once.instance);
    }

    #[test]
    fn merged_instances_round_trip(first in update(), second in update()) {
        let schema = schema();
        let instance = merge(&materialize(&schema), &first, &schema).instance;
        let instance = merge(&instance, &second, &schema).instance;

        prop_assert!(validate_instance(&schema, &instance).is_empty());
        let parsed = parse_instance(&serialize_instance(&instance), &schema);
        prop_assert_eq!(parsed.ok(), Some(instance));
    }
}
