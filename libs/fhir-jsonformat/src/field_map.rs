//! JSON field name -> field descriptor tables.
//!
//! Choice fields are flattened: a `value` field whose type is a choice with
//! alternatives `string` and `quantity` answers to `valueString` and
//! `valueQuantity`. Primitive-typed fields also answer to their `_` shadow
//! name, which carries the primitive's id and extensions.

use crate::schema::{is_choice, is_primitive_type};
use ferrum_reflect::{FieldDescriptor, MessageDescriptor};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::trace;

pub type FieldMap = Arc<HashMap<String, FieldDescriptor>>;

const SHADOW_PREFIX: char = '_';

/// Per-descriptor cache of [`FieldMap`]s.
#[derive(Debug, Default)]
pub struct FieldMapCache {
    maps: RwLock<HashMap<MessageDescriptor, FieldMap>>,
}

impl FieldMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_map_for(&self, desc: &MessageDescriptor) -> FieldMap {
        if let Some(hit) = self.maps.read().ok().and_then(|m| m.get(desc).cloned()) {
            return hit;
        }

        trace!(message = desc.full_name(), "building field map");
        let map: FieldMap = Arc::new(build_field_map(desc));
        if let Ok(mut maps) = self.maps.write() {
            maps.insert(desc.clone(), map.clone());
        }
        map
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.maps.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the table for `desc` without caching.
pub fn build_field_map(desc: &MessageDescriptor) -> HashMap<String, FieldDescriptor> {
    let mut entries = Vec::new();
    collect_entries(desc, &mut entries);
    // Later entries win on collision.
    entries.into_iter().collect()
}

fn collect_entries(desc: &MessageDescriptor, out: &mut Vec<(String, FieldDescriptor)>) {
    for field in desc.fields() {
        match &field.message_type() {
            Some(choice) if is_choice(choice) => {
                let mut alternatives = Vec::new();
                collect_entries(choice, &mut alternatives);
                for (name, _) in alternatives {
                    out.push((choice_key(field.json_name(), &name), field.clone()));
                }
            }
            Some(ty) if is_primitive_type(ty) => {
                out.push((field.json_name().to_string(), field.clone()));
                out.push((format!("{SHADOW_PREFIX}{}", field.json_name()), field.clone()));
            }
            _ => out.push((field.json_name().to_string(), field.clone())),
        }
    }
}

fn choice_key(parent: &str, alternative: &str) -> String {
    match alternative.strip_prefix(SHADOW_PREFIX) {
        Some(rest) => format!("{SHADOW_PREFIX}{parent}{}", title(rest)),
        None => format!("{parent}{}", title(alternative)),
    }
}

/// Uppercase the first character, ASCII only
fn title(s: &str) -> String {
    let mut out = s.to_string();
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}
