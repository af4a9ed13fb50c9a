//! Predicates and traversal over FHIR message descriptors.

use crate::error::{Error, Result};
use ferrum_reflect::{FieldDescriptor, MessageDescriptor, StructureDefinitionKind};
use std::collections::{HashSet, VecDeque};

pub const EXTENSION_FIELD: &str = "extension";

pub fn is_primitive_type(desc: &MessageDescriptor) -> bool {
    desc.options().structure_definition_kind == Some(StructureDefinitionKind::PrimitiveType)
}

pub fn is_resource_type(desc: &MessageDescriptor) -> bool {
    desc.options().structure_definition_kind == Some(StructureDefinitionKind::Resource)
}

pub fn is_choice(desc: &MessageDescriptor) -> bool {
    desc.options().is_choice_type
}

/// The repeated message field `extension` of `desc`
pub fn extension_field(desc: &MessageDescriptor) -> Result<FieldDescriptor> {
    let field = desc.get_field_by_name(EXTENSION_FIELD).ok_or_else(|| {
        Error::descriptor(format!("no extension field found in {}", desc.full_name()))
    })?;
    if !field.is_list() {
        return Err(Error::descriptor(format!(
            "extension field of {} is not repeated",
            desc.full_name()
        )));
    }
    if field.message_type().is_none() {
        return Err(Error::descriptor(format!(
            "extension field of {} has non-message type {}",
            desc.full_name(),
            field.kind()
        )));
    }
    Ok(field)
}

/// Field `field_name` of oneof `oneof_name`, checking membership
pub fn oneof_field(
    desc: &MessageDescriptor,
    oneof_name: &str,
    field_name: &str,
) -> Result<FieldDescriptor> {
    let oneof = desc
        .get_oneof_by_name(oneof_name)
        .ok_or_else(|| Error::descriptor(format!("oneof field not found: {oneof_name}")))?;
    oneof.get_field_by_name(field_name).ok_or_else(|| {
        Error::descriptor(format!("field {field_name} not found in oneof {oneof_name}"))
    })
}

/// Visit every message type reachable from `root` exactly once, breadth first.
pub fn walk_message_graph(root: &MessageDescriptor, mut visit: impl FnMut(&MessageDescriptor)) {
    let mut seen = HashSet::new();
    walk_from(root, &mut seen, &mut visit);
}

/// Like [`walk_message_graph`], sharing `seen` across several roots.
pub(crate) fn walk_from(
    root: &MessageDescriptor,
    seen: &mut HashSet<MessageDescriptor>,
    visit: &mut impl FnMut(&MessageDescriptor),
) {
    if !seen.insert(root.clone()) {
        return;
    }
    let mut queue = VecDeque::from([root.clone()]);
    while let Some(node) = queue.pop_front() {
        visit(&node);
        for field in node.fields() {
            if let Some(child) = field.message_type() {
                if seen.insert(child.clone()) {
                    queue.push_back(child);
                }
            }
        }
    }
}
