//! FHIR annotations attached to messages, fields, oneofs and enum values.
//!
//! These mirror the custom options FHIR schema sets carry on their generated
//! types. They are plain data: a schema document sets them, descriptors expose
//! them read-only.

use serde::{Deserialize, Serialize};

/// StructureDefinition kind of a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureDefinitionKind {
    PrimitiveType,
    ComplexType,
    Resource,
    Logical,
}

/// Whether a field must be populated according to the FHIR specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Optional,
    RequiredByFhir,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure_definition_kind: Option<StructureDefinitionKind>,

    /// Polymorphic container whose fields are the alternatives of a `value[x]`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_choice_type: bool,

    /// Lexical constraint for the `value` of a primitive, unanchored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_regex: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fhir_profile_base: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_structure_definition_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_requirement: Option<Requirement>,

    /// Resource types a Reference-typed field may point to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub valid_reference_type: Vec<String>,

    /// Resource type named by a typed reference id field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_fhir_type: Option<String>,
}

impl FieldOptions {
    pub fn is_required_by_fhir(&self) -> bool {
        self.validation_requirement == Some(Requirement::RequiredByFhir)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OneofOptions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fhir_oneof_is_optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnumValueOptions {
    /// Code as written in FHIR when it cannot be derived from the value name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_original_code: Option<String>,
}
