//! Extensions, and the internal extensions used to carry implementation
//! private data on a resource.
//!
//! An internal extension type is a profile of Extension: it lists the
//! Extension structure definition among its profile bases and declares its
//! own structure definition URL. Entries in a host's `extension` list are
//! matched against that URL through their `url.value` field.

use crate::error::{Error, Result, ValidationError};
use crate::patterns::{INVALID_COLUMN_CHARS, INVALID_COLUMN_START};
use crate::schema::extension_field;
use ferrum_reflect::{DynamicMessage, Kind, MessageDescriptor, Value};

pub const EXTENSION_STRUCTURE_DEFINITION_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/Extension";

/// URL identifying an internal extension type.
pub fn internal_extension_url(desc: &MessageDescriptor) -> Result<String> {
    let options = desc.options();
    if !options
        .fhir_profile_base
        .iter()
        .any(|base| base == EXTENSION_STRUCTURE_DEFINITION_URL)
    {
        return Err(Error::descriptor(format!(
            "{} does not have Extension as a profile base",
            desc.full_name()
        )));
    }
    options
        .fhir_structure_definition_url
        .clone()
        .ok_or_else(|| {
            Error::descriptor(format!(
                "{} is missing its structure definition url",
                desc.full_name()
            ))
        })
}

/// `url.value` of an extension.
pub fn extension_url(ext: &DynamicMessage) -> Result<String> {
    let desc = ext.descriptor();
    let url = desc.get_field_by_name("url").ok_or_else(|| {
        Error::descriptor(format!("extension type {} has no url field", desc.full_name()))
    })?;
    let Some(url_type) = url.message_type() else {
        return Err(Error::descriptor(format!(
            "url field of {} has non-message type {}",
            desc.full_name(),
            url.kind()
        )));
    };
    let url_value = url_type.get_field_by_name("value").ok_or_else(|| {
        Error::descriptor(format!("url type {} has no value field", url_type.full_name()))
    })?;
    if url_value.kind() != Kind::String {
        return Err(Error::descriptor(format!(
            "url type {} has wrong type for value field: {}",
            url_type.full_name(),
            url_value.kind()
        )));
    }

    let Some(url_msg) = ext.get_message(&url) else {
        return Err(ValidationError::malformed("extension url is not set").into());
    };
    Ok(url_msg
        .get_field(&url_value)
        .as_str()
        .unwrap_or_default()
        .to_string())
}

/// The `value` of an extension, `None` when unset.
pub fn extension_value(ext: &DynamicMessage) -> Result<Option<&DynamicMessage>> {
    let desc = ext.descriptor();
    let value = desc.get_field_by_name("value").ok_or_else(|| {
        Error::descriptor(format!("extension of type {} has no value field", desc.full_name()))
    })?;
    if value.message_type().is_none() {
        return Err(Error::descriptor(format!(
            "extension of type {} has value field of kind {}; want message",
            desc.full_name(),
            value.kind()
        )));
    }
    if value.is_list() {
        return Err(Error::descriptor(format!(
            "extension of type {} has repeated value field",
            desc.full_name()
        )));
    }
    Ok(ext.get_message(&value))
}

pub fn extension_has_url(ext: &DynamicMessage, url: &str) -> bool {
    extension_url(ext).is_ok_and(|u| u == url)
}

/// Whether `host` carries an extension with the URL of `ext_type`.
pub fn has_internal_extension(host: &DynamicMessage, ext_type: &MessageDescriptor) -> bool {
    matches!(get_internal_extension(host, ext_type), Ok(Some(_)))
}

/// First extension on `host` with the URL of `ext_type`.
pub fn get_internal_extension<'a>(
    host: &'a DynamicMessage,
    ext_type: &MessageDescriptor,
) -> Result<Option<&'a DynamicMessage>> {
    let url = internal_extension_url(ext_type)?;
    let field = extension_field(host.descriptor())?;
    Ok(host
        .get_list(&field)
        .iter()
        .filter_map(Value::as_message)
        .find(|entry| extension_has_url(entry, &url)))
}

/// Append `ext` to `host` unless an equal extension is already there.
pub fn add_internal_extension(host: &mut DynamicMessage, ext: DynamicMessage) -> Result<()> {
    let field = extension_field(host.descriptor())?;
    if field.message_type().as_ref() != Some(ext.descriptor()) {
        return Err(Error::descriptor(format!(
            "{} cannot hold an extension of type {}",
            field.full_name(),
            ext.descriptor().full_name()
        )));
    }
    let list = host.get_list_mut(&field)?;
    if list.iter().any(|entry| entry.as_message() == Some(&ext)) {
        return Ok(());
    }
    list.push(Value::Message(ext));
    Ok(())
}

/// Drop every extension with the URL of `ext_type`, keeping the others in order.
pub fn remove_internal_extension(
    host: &mut DynamicMessage,
    ext_type: &MessageDescriptor,
) -> Result<()> {
    let url = internal_extension_url(ext_type)?;
    let field = extension_field(host.descriptor())?;
    let matches = |entry: &Value| {
        entry
            .as_message()
            .is_some_and(|ext| extension_has_url(ext, &url))
    };
    if !host.get_list(&field).iter().any(matches) {
        return Ok(());
    }
    host.get_list_mut(&field)?.retain(|entry| !matches(entry));
    Ok(())
}

/// Column name for an extension in analytics exports: the last path segment
/// of `url` with anything but letters, digits and `_` replaced by `_`.
pub fn extension_field_name(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    let name = INVALID_COLUMN_CHARS.replace_all(last, "_");
    if INVALID_COLUMN_START.is_match(&name) {
        format!("_{name}")
    } else {
        name.into_owned()
    }
}
