//! FHIR `code` values backed by enum or string `value` fields.

use crate::error::{Error, Result, ValidationError};
use ferrum_reflect::{DynamicMessage, EnumDescriptor, Kind, MessageDescriptor, Value};

const VALUE_FIELD: &str = "value";

/// Build a code message of type `desc` from a JSON token.
///
/// Enum-backed codes match the uppercased code with `-` replaced by `_`
/// against the value names, then fall back to each value's
/// `fhir_original_code`.
pub fn unmarshal_code(
    path: &str,
    desc: &MessageDescriptor,
    token: &serde_json::Value,
) -> Result<DynamicMessage> {
    let field = desc.get_field_by_name(VALUE_FIELD).ok_or_else(|| {
        Error::descriptor(format!("value field not found in {}", desc.name()))
    })?;
    let Some(code) = token.as_str() else {
        return Err(ValidationError::malformed("expected code")
            .with_path(path)
            .with_diagnostics(format!("found {token}"))
            .into());
    };

    let mut msg = DynamicMessage::new(desc.clone());
    match field.kind() {
        Kind::String => {
            msg.set_field(&field, Value::String(code.to_string()))?;
            Ok(msg)
        }
        Kind::Enum(values) => {
            let Some(number) = enum_number_for_code(&values, code) else {
                return Err(ValidationError::malformed("code type mismatch")
                    .with_path(path)
                    .with_diagnostics(format!("{code:?} is not a {}", code_type_name(&values)))
                    .into());
            };
            msg.set_field(&field, Value::EnumNumber(number))?;
            Ok(msg)
        }
        other => Err(Error::descriptor(format!(
            "unexpected field kind {other}, want enum"
        ))),
    }
}

fn enum_number_for_code(values: &EnumDescriptor, code: &str) -> Option<i32> {
    let name = code.to_uppercase().replace('-', "_");
    if let Some(value) = values.get_value_by_name(&name).filter(|v| v.number() != 0) {
        return Some(value.number());
    }
    values
        .values()
        .find(|v| v.options().fhir_original_code.as_deref() == Some(code))
        .map(|v| v.number())
}

/// Name of the code type an enum is declared in (`AdministrativeGenderCode`
/// for `google.fhir.r4.core.AdministrativeGenderCode.Value`)
fn code_type_name(values: &EnumDescriptor) -> &str {
    let mut segments = values.full_name().rsplit('.');
    segments.next();
    segments.next().unwrap_or_else(|| values.name())
}

/// The FHIR string form of a code message.
pub fn serialize_code(msg: &DynamicMessage) -> Result<String> {
    let desc = msg.descriptor();
    let field = desc.get_field_by_name(VALUE_FIELD).ok_or_else(|| {
        Error::descriptor(format!("value field not found in {}", desc.name()))
    })?;
    match field.kind() {
        Kind::String => Ok(msg.get_field(&field).as_str().unwrap_or_default().to_string()),
        Kind::Enum(values) => {
            let number = msg.get_field(&field).as_enum_number().unwrap_or_default();
            let value = values
                .get_value(number)
                .filter(|v| v.number() != 0)
                .ok_or_else(|| Error::from(ValidationError::malformed("code value is not set")))?;
            Ok(match &value.options().fhir_original_code {
                Some(original) => original.clone(),
                None => value.name().to_lowercase().replace('_', "-"),
            })
        }
        other => Err(Error::descriptor(format!(
            "unexpected field kind {other}, want enum"
        ))),
    }
}
