//! Serializable schema documents that a [`DescriptorPool`](crate::DescriptorPool) is built from.

use crate::options::{EnumValueOptions, FieldOptions, MessageOptions, OneofOptions};
use serde::{Deserialize, Serialize};

/// A set of message and enum definitions, usually one per FHIR release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFile {
    #[serde(default)]
    pub messages: Vec<MessageDef>,

    #[serde(default)]
    pub enums: Vec<EnumDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDef {
    /// Fully-qualified type name (e.g., "google.fhir.r4.core.Patient")
    pub name: String,

    #[serde(default)]
    pub options: MessageOptions,

    #[serde(default)]
    pub fields: Vec<FieldDef>,

    #[serde(default)]
    pub oneofs: Vec<OneofDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,

    pub number: u32,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Fully-qualified message or enum name for `message`/`enum` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Defaults to the lowerCamel form of `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,

    #[serde(default)]
    pub repeated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<String>,

    #[serde(default)]
    pub options: FieldOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Double,
    String,
    Bytes,
    Enum,
    Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneofDef {
    pub name: String,

    #[serde(default)]
    pub options: OneofOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub name: String,

    #[serde(default)]
    pub values: Vec<EnumValueDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueDef {
    pub name: String,

    pub number: i32,

    #[serde(default)]
    pub options: EnumValueOptions,
}
