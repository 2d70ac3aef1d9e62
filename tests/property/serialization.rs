//! Property-based tests for the wire model.
//!
//! Uses proptest to verify:
//! 1. A tag reference decodes to the right variant for any id or tag.
//! 2. Title validation agrees with trimming and character counting.
//! 3. Due dates parse from both accepted forms and are emitted as `YYYY-MM-DD`.
//! 4. Random bytes never cause a panic when decoding a task.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use serde_json::json;
use taskdeck_proto::task::parse_due_date;
use taskdeck_proto::validate::check_title;
use taskdeck_proto::{Tag, TagReference, Task, TaskPatch, ValidationError};

/// Strategy for calendar dates between 1970 and 2200.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2200, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for identifiers shaped like Mongo object ids or free text.
fn arb_id() -> impl Strategy<Value = String> {
    prop_oneof!["[0-9a-f]{24}", "[A-Za-z0-9_-]{1,40}"]
}

fn task_json(due: &str, tag: serde_json::Value) -> serde_json::Value {
    json!({
        "_id": "t1",
        "title": "x",
        "dueDate": due,
        "tagId": tag,
        "userId": "u1",
        "completed": false,
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z"
    })
}

proptest! {
    #[test]
    fn bare_id_decodes_as_by_id(id in arb_id()) {
        let reference: TagReference = serde_json::from_value(json!(id.clone())).unwrap();
        prop_assert_eq!(&reference, &TagReference::ById(id.clone()));
        prop_assert!(reference.points_at(&id));
        prop_assert!(reference.resolve(&[]).is_none());
    }

    #[test]
    fn tag_object_decodes_inline(id in arb_id(), name in "[^\x00]{1,40}") {
        let raw = json!({ "_id": id, "name": name, "color": "#8B5CF6", "userId": "u1" });
        let reference: TagReference = serde_json::from_value(raw).unwrap();
        prop_assert_eq!(reference.id(), id.as_str());
        let resolved = reference.resolve(&[]).unwrap();
        prop_assert_eq!(&resolved.name, &name);
    }

    #[test]
    fn id_reference_resolves_against_known_tags(
        ids in prop::collection::hash_set(arb_id(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let ids: Vec<String> = ids.into_iter().collect();
        let known: Vec<Tag> = ids
            .iter()
            .map(|id| serde_json::from_value(json!({ "_id": id, "name": id })).unwrap())
            .collect();
        let wanted = pick.get(&ids);
        let reference = TagReference::ById(wanted.clone());
        prop_assert_eq!(&reference.resolve(&known).unwrap().id, wanted);
    }

    #[test]
    fn title_check_matches_trim_and_char_count(title in "\\PC{0,40}", max in 1usize..32) {
        let result = check_title(&title, max);
        if title.trim().is_empty() {
            prop_assert_eq!(result, Err(ValidationError::TitleEmpty));
        } else if title.chars().count() > max {
            prop_assert_eq!(result, Err(ValidationError::TitleTooLong { max }));
        } else {
            prop_assert_eq!(result, Ok(()));
        }
    }

    #[test]
    fn due_date_accepts_both_forms(date in arb_date()) {
        let plain = date.format("%Y-%m-%d").to_string();
        let stamped = format!("{plain}T00:00:00.000Z");
        prop_assert_eq!(parse_due_date(&plain).unwrap(), date);
        prop_assert_eq!(parse_due_date(&stamped).unwrap(), date);
    }

    #[test]
    fn task_due_date_is_emitted_as_calendar_date(date in arb_date()) {
        let stamped = format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"));
        let task: Task = serde_json::from_value(task_json(&stamped, json!(null))).unwrap();
        prop_assert_eq!(task.due_date.map(|d| d.year()), Some(date.year()));

        let encoded = serde_json::to_value(&task).unwrap();
        let expected = date.format("%Y-%m-%d").to_string();
        prop_assert_eq!(encoded["dueDate"].as_str(), Some(expected.as_str()));
    }

    #[test]
    fn garbage_due_date_is_rejected(raw in "[a-z ]{1,20}") {
        prop_assert!(parse_due_date(&raw).is_err());
    }

    #[test]
    fn patch_is_empty_only_without_fields(
        title in prop::option::of("[a-z]{1,8}"),
        completed in prop::option::of(any::<bool>()),
    ) {
        let patch = TaskPatch {
            title: title.clone(),
            completed,
            ..Default::default()
        };
        prop_assert_eq!(patch.is_empty(), title.is_none() && completed.is_none());
    }

    #[test]
    fn random_bytes_decode_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = serde_json::from_slice::<Task>(&bytes);
        let _ = serde_json::from_slice::<TagReference>(&bytes);
    }
}
