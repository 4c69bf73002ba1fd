//! The framework structure every tracker starts from.
//!
//! The narrator integration relies on a handful of fields being present in
//! every template (scene time, weather and location, who is present, and the
//! characters' names). `default_structure` builds a template holding exactly
//! those fields, ready to be extended.

use crate::{FieldNode, SchemaTree};

/// Section and field names the framework relies on.
pub mod framework {
    pub const STORY: &str = "Story";
    pub const CHARACTERS_PRESENT: &str = "CharactersPresent";
    pub const MAIN_CHARACTER: &str = "MainCharacter";
    pub const CHARACTERS: &str = "Characters";

    pub const TIME: &str = "Time";
    pub const WEATHER: &str = "Weather";
    pub const LOCATION: &str = "Location";
    pub const NAME: &str = "Name";
}

/// Scene time every new tracker starts at.
pub const DEFAULT_TIME: &str = "2024-10-16T09:15:30";

fn character_name() -> FieldNode {
    FieldNode::scalar(framework::NAME, "Ariel")
        .with_prompt("The character's full name.")
        .with_examples(["Ariel", "Kael", "Valerius"])
}

/// Build the framework template.
pub fn default_structure() -> SchemaTree {
    SchemaTree::new()
        .with_fields(
            framework::STORY,
            vec![
                FieldNode::scalar(framework::TIME, DEFAULT_TIME)
                    .with_prompt(
                        "Adjust time in small increments for natural progression unless explicit \
                         directives indicate larger changes. Format: ISO 8601 (YYYY-MM-DDTHH:MM:SS).",
                    )
                    .with_examples([DEFAULT_TIME, "2024-10-16T18:45:50", "2024-10-16T15:10:20"]),
                FieldNode::scalar(framework::WEATHER, "Overcast, mild temperature")
                    .with_prompt("Describe current weather concisely to set the scene.")
                    .with_examples([
                        "Overcast, mild temperature",
                        "Clear skies, warm evening",
                        "Sunny, gentle sea breeze",
                    ]),
                FieldNode::scalar(
                    framework::LOCATION,
                    "Conference Room B, 12th Floor, Apex Corporation, New York, NY",
                )
                .with_prompt(
                    "Provide a detailed and specific location, including exact places like rooms, \
                     landmarks, or stores, following this format: 'Specific Place, Building, City, State'.",
                )
                .with_examples([
                    "Conference Room B, 12th Floor, Apex Corporation, New York, NY",
                    "Main Gym Hall, Maple Street Fitness Center, Denver, CO",
                    "South Beach, Miami, FL",
                ]),
            ],
        )
        .with_field(
            framework::CHARACTERS_PRESENT,
            FieldNode::list(framework::CHARACTERS_PRESENT, ["No Characters"])
                .with_prompt("List of all characters present in the scene.")
                .with_examples([serde_json::json!(["Emma Thompson", "James Miller"])]),
        )
        .with_fields(framework::MAIN_CHARACTER, vec![character_name()])
        .with_field(
            framework::CHARACTERS,
            FieldNode::collection(framework::CHARACTERS, vec![character_name()])
                .with_prompt("Every other character met so far, keyed by name."),
        )
}
