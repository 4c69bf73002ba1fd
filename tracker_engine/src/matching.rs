//! Pairing supplied document keys with declared field names.

use serde_json::{Map, Value};
use tracker_schema::{canonicalize, FieldName, FieldPath};

use crate::error::{Mismatch, Problems};

/// Pair each declared name with the value supplied for it, if any.
///
/// Returns one slot per declared name, in declaration order. Keys match
/// case-insensitively. A key naming no declared field is reported with
/// `unknown` at its path; a key naming a field that another key already
/// named is reported as a duplicate.
pub(crate) fn match_names<'a, 'v>(
    names: impl IntoIterator<Item = &'a FieldName>,
    supplied: &'v Map<String, Value>,
    path: &FieldPath,
    unknown: fn(String) -> Mismatch,
    problems: &mut Problems,
) -> Vec<Option<&'v Value>> {
    let names: Vec<&FieldName> = names.into_iter().collect();
    let mut slots = vec![None; names.len()];

    for (key, value) in supplied {
        let canonical = canonicalize(key);
        match names.iter().position(|name| name.canonical() == canonical) {
            None => problems.push(path.field(key.as_str()), unknown(key.clone())),
            Some(index) if slots[index].is_some() => {
                problems.push(path.field(key.as_str()), Mismatch::DuplicateField(key.clone()))
            }
            Some(index) => slots[index] = Some(value),
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slots_follow_declaration_order() {
        let names = [FieldName::new("Time"), FieldName::new("Weather")];
        let supplied = json!({"weather": "rain", "TIME": "noon"});
        let mut problems = Problems::new();

        let slots = match_names(
            &names,
            supplied.as_object().unwrap(),
            &FieldPath::root().field("Story"),
            Mismatch::UnknownField,
            &mut problems,
        );

        assert!(problems.is_empty());
        assert_eq!(slots, vec![Some(&json!("noon")), Some(&json!("rain"))]);
    }

    #[test]
    fn test_unknown_and_duplicate_keys() {
        let names = [FieldName::new("Time")];
        let supplied = json!({"Time": "noon", "time": "dusk", "Mood": "tense"});
        let mut problems = Problems::new();

        let slots = match_names(
            &names,
            supplied.as_object().unwrap(),
            &FieldPath::root().field("Story"),
            Mismatch::UnknownField,
            &mut problems,
        );

        assert_eq!(slots, vec![Some(&json!("noon"))]);
        assert_eq!(problems.len(), 2);
        assert!(problems.has_problem_at("Story.time"));
        assert!(problems.has_problem_at("Story.Mood"));
    }
}
