//! Typed references.
//!
//! A Reference message holds a `reference` oneof whose members are typed id
//! fields (`patient_id`, `organization_id`, ...) plus untyped fallbacks such
//! as `uri`, `fragment` and `identifier`. [`ReferenceTypeTable`] maps between
//! typed id field names and the resource types they point to.

use crate::config::FormatConfig;
use crate::error::{Error, ErrorKind, Result, SchemaError, ValidationError};
use crate::patterns::RELATIVE_REFERENCE;
use crate::schema::oneof_field;
use ferrum_reflect::{DescriptorPool, DynamicMessage, FieldDescriptor, Value};
use heck::ToUpperCamelCase;
use std::collections::HashMap;
use tracing::{debug, error};

pub const REFERENCE_ONEOF: &str = "reference";
pub const REFERENCE_ID_SUFFIX: &str = "_id";
pub const FRAGMENT_FIELD: &str = "fragment";
pub const FRAGMENT_PREFIX: &str = "#";
pub const HISTORY_SEGMENT: &str = "_history";
pub const URI_FIELD: &str = "uri";
/// Allowed-type entry that accepts any resource
pub const ANY_RESOURCE: &str = "Resource";

const VALUE_FIELD: &str = "value";
const HISTORY_FIELD: &str = "history";

/// The populated typed id field of `reference`, if any.
///
/// Untyped references (identifier, display, uri) yield `None`: they cannot be
/// checked against allowed types but are not invalid.
pub fn resource_id_field(
    reference: &DynamicMessage,
) -> std::result::Result<Option<FieldDescriptor>, ValidationError> {
    let Some(oneof) = reference.descriptor().get_oneof_by_name(REFERENCE_ONEOF) else {
        return Err(ValidationError::malformed("unexpected reference"));
    };
    Ok(reference
        .which_oneof(&oneof)
        .filter(|field| field.name().ends_with(REFERENCE_ID_SUFFIX)))
}

/// A parsed reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget<'a> {
    /// `Type/id` or `Type/id/_history/version`
    Relative {
        resource_type: &'a str,
        id: &'a str,
        version: Option<&'a str>,
    },
    /// `#id` pointing into contained resources
    Fragment(&'a str),
    /// Anything else
    Uri(&'a str),
}

pub fn parse_reference(input: &str) -> ReferenceTarget<'_> {
    if let Some(fragment) = input.strip_prefix(FRAGMENT_PREFIX) {
        return ReferenceTarget::Fragment(fragment);
    }
    match RELATIVE_REFERENCE.captures(input) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(resource_type), Some(id)) => ReferenceTarget::Relative {
                resource_type: resource_type.as_str(),
                id: id.as_str(),
                version: caps.get(3).map(|m| m.as_str()),
            },
            _ => ReferenceTarget::Uri(input),
        },
        None => ReferenceTarget::Uri(input),
    }
}

#[derive(Debug, Default, Clone)]
pub struct ReferenceTypeTable {
    field_to_type: HashMap<String, String>,
    type_to_field: HashMap<String, String>,
}

impl ReferenceTypeTable {
    /// Index the `reference` oneof of every configured Reference type.
    ///
    /// A member maps to a resource type when it is annotated with
    /// `referenced_fhir_type` or its name ends in `_id`, in which case the
    /// type is the UpperCamel form of the rest of the name.
    pub fn build(pool: &DescriptorPool, config: &FormatConfig) -> std::result::Result<Self, SchemaError> {
        let mut table = Self::default();
        for type_name in &config.reference_types {
            let desc = pool
                .get_message_by_name(type_name)
                .ok_or_else(|| SchemaError::UnknownType(type_name.clone()))?;
            let oneof = desc.get_oneof_by_name(REFERENCE_ONEOF).ok_or_else(|| {
                SchemaError::MissingReferenceOneof {
                    type_name: type_name.clone(),
                }
            })?;
            for field in oneof.fields() {
                let resource_type = match &field.options().referenced_fhir_type {
                    Some(annotated) => annotated.clone(),
                    None => match field.name().strip_suffix(REFERENCE_ID_SUFFIX) {
                        Some(stem) => stem.to_upper_camel_case(),
                        None => continue,
                    },
                };
                if resource_type.is_empty() {
                    continue;
                }
                table.insert(field.name(), &resource_type).map_err(|err| {
                    error!(reference_type = %type_name, %err, "conflicting reference schema");
                    err
                })?;
            }
        }
        debug!(entries = table.len(), "built reference type table");
        Ok(table)
    }

    /// Record a mapping; an existing different mapping in either direction is a conflict
    pub fn insert(&mut self, field: &str, resource_type: &str) -> std::result::Result<(), SchemaError> {
        if let Some(existing) = self.field_to_type.get(field) {
            if existing != resource_type {
                return Err(SchemaError::ConflictingReferenceType {
                    field: field.to_string(),
                    existing: existing.clone(),
                    conflicting: resource_type.to_string(),
                });
            }
        }
        if let Some(existing) = self.type_to_field.get(resource_type) {
            if existing != field {
                return Err(SchemaError::ConflictingReferenceField {
                    resource_type: resource_type.to_string(),
                    existing: existing.clone(),
                    conflicting: field.to_string(),
                });
            }
        }
        self.field_to_type
            .insert(field.to_string(), resource_type.to_string());
        self.type_to_field
            .insert(resource_type.to_string(), field.to_string());
        Ok(())
    }

    pub fn type_for_field(&self, field: &str) -> Option<&str> {
        self.field_to_type.get(field).map(String::as_str)
    }

    pub fn field_for_type(&self, resource_type: &str) -> Option<&str> {
        self.type_to_field.get(resource_type).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.field_to_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_to_type.is_empty()
    }

    /// Check a populated reference against the allowed types of `field`.
    ///
    /// References should be split with
    /// [`split_if_relative_reference`](Self::split_if_relative_reference) first.
    pub fn validate_reference_type(
        &self,
        field: &FieldDescriptor,
        reference: &DynamicMessage,
    ) -> std::result::Result<(), ValidationError> {
        let allowed = &field.options().valid_reference_type;
        if allowed.is_empty() {
            return Ok(());
        }
        let Some(id_field) = resource_id_field(reference)? else {
            return Ok(());
        };
        let Some(resource_type) = self.type_for_field(id_field.name()) else {
            return Ok(());
        };
        if allowed
            .iter()
            .any(|t| t == ANY_RESOURCE || t == resource_type)
        {
            return Ok(());
        }
        // Both names come from the schema, never from the input.
        Err(ValidationError::new(
            ErrorKind::ReferenceTypeMismatch,
            format!(
                "invalid reference to a {} resource, want {}",
                resource_type,
                allowed.join(", ")
            ),
        ))
    }

    /// Move a relative `uri` reference into its typed id field, or a `#`
    /// reference into `fragment`. Other references are left as they are.
    pub fn split_if_relative_reference(&self, reference: &mut DynamicMessage) -> Result<()> {
        let desc = reference.descriptor().clone();
        let uri_field = oneof_field(&desc, REFERENCE_ONEOF, URI_FIELD)?;
        let Some(uri) = reference.get_message(&uri_field).and_then(string_value) else {
            return Ok(());
        };

        match parse_reference(&uri) {
            ReferenceTarget::Fragment(fragment) => {
                let field = oneof_field(&desc, REFERENCE_ONEOF, FRAGMENT_FIELD)?;
                set_string_value(reference.get_message_mut(&field)?, fragment)?;
            }
            ReferenceTarget::Relative {
                resource_type,
                id,
                version,
            } => {
                let Some(field_name) = self.field_for_type(resource_type) else {
                    return Ok(());
                };
                let field = oneof_field(&desc, REFERENCE_ONEOF, field_name)?;
                let typed = reference.get_message_mut(&field)?;
                set_string_value(typed, id)?;
                if let Some(version) = version {
                    let history = typed
                        .descriptor()
                        .get_field_by_name(HISTORY_FIELD)
                        .ok_or_else(|| {
                            Error::descriptor(format!(
                                "reference id type {} has no history field",
                                typed.descriptor().full_name()
                            ))
                        })?;
                    set_string_value(typed.get_message_mut(&history)?, version)?;
                }
            }
            ReferenceTarget::Uri(_) => {}
        }
        Ok(())
    }

    /// Render a reference as its string form; `None` for identifier or
    /// display-only references.
    pub fn reference_to_string(&self, reference: &DynamicMessage) -> Result<Option<String>> {
        let desc = reference.descriptor();
        let oneof = desc.get_oneof_by_name(REFERENCE_ONEOF).ok_or_else(|| {
            Error::descriptor(format!("{} has no reference oneof", desc.full_name()))
        })?;
        let Some(field) = reference.which_oneof(&oneof) else {
            return Ok(None);
        };
        let Some(target) = reference.get_message(&field) else {
            return Ok(None);
        };

        let rendered = match field.name() {
            URI_FIELD => string_value(target),
            FRAGMENT_FIELD => string_value(target).map(|f| format!("{FRAGMENT_PREFIX}{f}")),
            name => match self.type_for_field(name) {
                Some(resource_type) => string_value(target).map(|id| {
                    let version = target
                        .get_field_by_name(HISTORY_FIELD)
                        .and_then(|h| h.as_message().and_then(string_value));
                    match version {
                        Some(v) => format!("{resource_type}/{id}/{HISTORY_SEGMENT}/{v}"),
                        None => format!("{resource_type}/{id}"),
                    }
                }),
                None => None,
            },
        };
        Ok(rendered)
    }
}

/// `value` of a string-valued primitive, if set
pub(crate) fn string_value(msg: &DynamicMessage) -> Option<String> {
    let field = msg.descriptor().get_field_by_name(VALUE_FIELD)?;
    if !msg.has_field(&field) {
        return None;
    }
    msg.get_field(&field).as_str().map(str::to_string)
}

fn set_string_value(msg: &mut DynamicMessage, value: &str) -> Result<()> {
    msg.set_field_by_name(VALUE_FIELD, Value::String(value.to_string()))?;
    Ok(())
}
