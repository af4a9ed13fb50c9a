mod test_support;

use ferrum_jsonformat::field_map::build_field_map;
use std::sync::Arc;
use test_support::{context, pool};

#[test]
fn test_choice_fields_are_flattened() {
    let pool = pool();
    let observation = pool.get_message_by_name("fhir.test.Observation").unwrap();
    let map = build_field_map(&observation);

    for key in ["valueString", "_valueString", "valueQuantity", "valueBoolean", "_valueBoolean"] {
        let field = map.get(key).unwrap_or_else(|| panic!("missing {key}"));
        assert_eq!(field.name(), "value");
    }
    // Quantity is complex, so it has no shadow entry.
    assert!(!map.contains_key("_valueQuantity"));
    assert!(!map.contains_key("value"));
}

#[test]
fn test_primitive_fields_have_shadow_entries() {
    let pool = pool();
    let observation = pool.get_message_by_name("fhir.test.Observation").unwrap();
    let map = build_field_map(&observation);

    assert_eq!(map["status"].name(), "status");
    assert_eq!(map["_status"].name(), "status");
    assert_eq!(map["note"].name(), "note");
    assert_eq!(map["_note"].name(), "note");
    assert_eq!(map["subject"].name(), "subject");
    assert!(!map.contains_key("_subject"));
    assert!(!map.contains_key("_extension"));

    let mut keys: Vec<_> = map.keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "_id", "_note", "_status", "_valueBoolean", "_valueString", "extension", "focus", "id",
            "note", "performer", "status", "subject", "valueBoolean", "valueQuantity", "valueString",
        ]
    );
}

#[test]
fn test_json_names_come_from_descriptors() {
    let pool = pool();
    let patient = pool.get_message_by_name("fhir.test.Patient").unwrap();
    let map = build_field_map(&patient);
    assert_eq!(map["managingOrganization"].name(), "managing_organization");
    assert!(!map.contains_key("managing_organization"));
}

#[test]
fn test_context_caches_field_maps() {
    let ctx = context();
    let observation = ctx.pool().get_message_by_name("fhir.test.Observation").unwrap();
    assert!(ctx.field_maps().is_empty());

    let first = ctx.field_map_for(&observation);
    let second = ctx.field_map_for(&observation);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(ctx.field_maps().len(), 1);

    let patient = ctx.pool().get_message_by_name("fhir.test.Patient").unwrap();
    ctx.field_map_for(&patient);
    assert_eq!(ctx.field_maps().len(), 2);
}

#[test]
fn test_field_maps_are_shared_across_threads() {
    let ctx = Arc::new(context());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            std::thread::spawn(move || {
                let desc = ctx.pool().get_message_by_name("fhir.test.Observation").unwrap();
                ctx.field_map_for(&desc).len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 15);
    }
    assert_eq!(ctx.field_maps().len(), 1);
}
