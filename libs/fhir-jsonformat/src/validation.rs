//! Required fields, string well-formedness and primitive value constraints.

use crate::config::DEFAULT_MAX_STRING_BYTES;
use crate::context::FormatContext;
use crate::error::{ErrorKind, ValidationError};
use crate::patterns::INVALID_STRING_CHARS;
use crate::reference::{string_value, REFERENCE_ONEOF};
use crate::registry::ConstraintRegistry;
use ferrum_reflect::{DynamicMessage, FieldDescriptor, MessageDescriptor, Value};

type Result<T> = std::result::Result<T, ValidationError>;

/// The first required field of `message` that is not populated.
pub fn validate_required_fields(registry: &ConstraintRegistry, message: &DynamicMessage) -> Result<()> {
    let desc = message.descriptor();
    for &number in registry.required_fields_for(desc) {
        let Some(field) = desc.get_field(number) else {
            continue;
        };
        if !message.has_field(&field) {
            return Err(ValidationError::new(
                ErrorKind::MissingRequired,
                format!("missing required field {:?}", field.json_name()),
            ));
        }
    }
    Ok(())
}

/// Check the FHIR size and character limits of a string.
pub fn validate_string(value: &str) -> Result<()> {
    validate_string_with_limit(value, DEFAULT_MAX_STRING_BYTES)
}

pub fn validate_string_with_limit(value: &str, max_bytes: usize) -> Result<()> {
    if value.len() > max_bytes {
        return Err(ValidationError::new(
            ErrorKind::StringTooLong,
            if max_bytes == DEFAULT_MAX_STRING_BYTES {
                "string exceeds maximum size of 1 MB".to_string()
            } else {
                format!("string exceeds maximum size of {max_bytes} bytes")
            },
        ));
    }
    if let Some(found) = INVALID_STRING_CHARS.find(value) {
        let code_point = found.as_str().chars().next().map(u32::from).unwrap_or_default();
        return Err(ValidationError::new(
            ErrorKind::InvalidCharacters,
            format!("string contains invalid characters: U+{code_point:04X}"),
        ));
    }
    Ok(())
}

/// Match `value` against the registered regex of primitive type `desc`.
pub fn validate_primitive_value(
    registry: &ConstraintRegistry,
    desc: &MessageDescriptor,
    value: &str,
) -> Result<()> {
    match registry.constraint_for(desc) {
        Some(regex) if !regex.is_match(value) => Err(ValidationError::malformed(format!(
            "invalid {}",
            desc.name()
        ))
        .with_diagnostics(format!("found {value:?}"))),
        _ => Ok(()),
    }
}

/// Validate a whole message tree.
///
/// Applies required fields, string limits, primitive regexes and reference
/// types to every nested message, stopping at the first failure. Errors carry
/// a location such as `Patient.link[0].other`.
pub fn validate_resource(ctx: &FormatContext, message: &DynamicMessage) -> Result<()> {
    walk(ctx, message, message.descriptor().name())
}

fn walk(ctx: &FormatContext, message: &DynamicMessage, path: &str) -> Result<()> {
    validate_required_fields(ctx.registry(), message).map_err(|e| e.or_path(path))?;

    if let Some(value) = string_value(message) {
        validate_primitive_value(ctx.registry(), message.descriptor(), &value)
            .map_err(|e| e.or_path(path))?;
    }

    for (field, value) in message.populated_fields() {
        let field_path = format!("{path}.{}", field.json_name());
        match value {
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    check_value(ctx, &field, item, &format!("{field_path}[{index}]"))?;
                }
            }
            single => check_value(ctx, &field, single, &field_path)?,
        }
    }
    Ok(())
}

fn check_value(ctx: &FormatContext, field: &FieldDescriptor, value: &Value, path: &str) -> Result<()> {
    match value {
        Value::String(s) => {
            validate_string_with_limit(s, ctx.config().max_string_bytes).map_err(|e| e.or_path(path))
        }
        Value::Message(child) => {
            if child.descriptor().get_oneof_by_name(REFERENCE_ONEOF).is_some() {
                ctx.references()
                    .validate_reference_type(field, child)
                    .map_err(|e| e.or_path(path))?;
            }
            walk(ctx, child, path)
        }
        _ => Ok(()),
    }
}
