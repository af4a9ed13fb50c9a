//! Shared schema fixtures: a trimmed-down FHIR release under `fhir.test`.

#![allow(dead_code)]

use ferrum_jsonformat::{FormatConfig, FormatContext};
use ferrum_reflect::{DescriptorPool, DynamicMessage, Value};
use serde_json::{json, Value as Json};

pub const EVENT_TRIGGER_URL: &str = "https://example.com/fhir/StructureDefinition/event-trigger";
pub const SOURCE_SYSTEM_URL: &str = "https://example.com/fhir/StructureDefinition/source-system";

fn primitive(name: &str, value_type: Json) -> Json {
    let mut value = json!({ "name": "value", "number": 1 });
    if let (Some(target), Some(source)) = (value.as_object_mut(), value_type.as_object()) {
        target.extend(source.clone());
    }
    json!({
        "name": name,
        "options": { "structureDefinitionKind": "primitive_type" },
        "fields": [
            value,
            { "name": "extension", "number": 2, "type": "message", "typeName": "fhir.test.Extension", "repeated": true }
        ]
    })
}

fn reference_id(number: u32, name: &str) -> Json {
    json!({
        "name": name, "number": number, "type": "message",
        "typeName": "fhir.test.ReferenceId", "oneof": "reference"
    })
}

pub fn schema() -> Json {
    let mut decimal = primitive("fhir.test.Decimal", json!({ "type": "string" }));
    decimal["options"]["valueRegex"] = json!(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?");

    json!({
        "messages": [
            primitive("fhir.test.String", json!({ "type": "string" })),
            primitive("fhir.test.Uri", json!({ "type": "string" })),
            primitive("fhir.test.Id", json!({ "type": "string" })),
            primitive("fhir.test.Boolean", json!({ "type": "bool" })),
            decimal,
            primitive(
                "fhir.test.ObservationStatusCode",
                json!({ "type": "enum", "typeName": "fhir.test.ObservationStatusCode.Value" })
            ),
            primitive(
                "fhir.test.QuantityComparatorCode",
                json!({ "type": "enum", "typeName": "fhir.test.QuantityComparatorCode.Value" })
            ),
            primitive("fhir.test.MimeTypeCode", json!({ "type": "string" })),
            {
                "name": "fhir.test.ReferenceId",
                "fields": [
                    { "name": "value", "number": 1, "type": "string" },
                    { "name": "history", "number": 2, "type": "message", "typeName": "fhir.test.Id" }
                ]
            },
            {
                "name": "fhir.test.Extension",
                "options": {
                    "structureDefinitionKind": "complex_type",
                    "fhirStructureDefinitionUrl": "http://hl7.org/fhir/StructureDefinition/Extension"
                },
                "fields": [
                    { "name": "id", "number": 1, "type": "message", "typeName": "fhir.test.String" },
                    { "name": "extension", "number": 2, "type": "message", "typeName": "fhir.test.Extension", "repeated": true },
                    {
                        "name": "url", "number": 3, "type": "message", "typeName": "fhir.test.Uri",
                        "options": { "validationRequirement": "required_by_fhir" }
                    },
                    { "name": "value", "number": 4, "type": "message", "typeName": "fhir.test.Extension.ValueX" }
                ]
            },
            {
                "name": "fhir.test.Extension.ValueX",
                "options": { "isChoiceType": true },
                "fields": [
                    { "name": "boolean", "number": 1, "type": "message", "typeName": "fhir.test.Boolean", "oneof": "choice" },
                    { "name": "string_value", "number": 2, "type": "message", "typeName": "fhir.test.String", "jsonName": "string", "oneof": "choice" },
                    { "name": "decimal", "number": 3, "type": "message", "typeName": "fhir.test.Decimal", "oneof": "choice" },
                    { "name": "reference", "number": 4, "type": "message", "typeName": "fhir.test.Reference", "oneof": "choice" }
                ],
                "oneofs": [{ "name": "choice" }]
            },
            {
                "name": "fhir.test.Identifier",
                "options": { "structureDefinitionKind": "complex_type" },
                "fields": [
                    { "name": "system", "number": 1, "type": "message", "typeName": "fhir.test.Uri" },
                    { "name": "value", "number": 2, "type": "message", "typeName": "fhir.test.String" }
                ]
            },
            {
                "name": "fhir.test.Reference",
                "options": { "structureDefinitionKind": "complex_type" },
                "fields": [
                    { "name": "extension", "number": 1, "type": "message", "typeName": "fhir.test.Extension", "repeated": true },
                    { "name": "uri", "number": 2, "type": "message", "typeName": "fhir.test.String", "oneof": "reference" },
                    { "name": "fragment", "number": 3, "type": "message", "typeName": "fhir.test.String", "oneof": "reference" },
                    reference_id(4, "patient_id"),
                    reference_id(5, "organization_id"),
                    reference_id(6, "group_id"),
                    reference_id(7, "practitioner_role_id"),
                    {
                        "name": "careteam_id", "number": 8, "type": "message", "typeName": "fhir.test.ReferenceId",
                        "oneof": "reference", "options": { "referencedFhirType": "CareTeam" }
                    },
                    { "name": "identifier", "number": 9, "type": "message", "typeName": "fhir.test.Identifier", "oneof": "reference" },
                    { "name": "display", "number": 10, "type": "message", "typeName": "fhir.test.String" }
                ],
                "oneofs": [{ "name": "reference" }]
            },
            {
                "name": "fhir.test.Quantity",
                "options": { "structureDefinitionKind": "complex_type" },
                "fields": [
                    { "name": "value", "number": 1, "type": "message", "typeName": "fhir.test.Decimal" },
                    { "name": "comparator", "number": 2, "type": "message", "typeName": "fhir.test.QuantityComparatorCode" },
                    { "name": "unit", "number": 3, "type": "message", "typeName": "fhir.test.String" }
                ]
            },
            {
                "name": "fhir.test.Observation",
                "options": { "structureDefinitionKind": "resource" },
                "fields": [
                    { "name": "id", "number": 1, "type": "message", "typeName": "fhir.test.Id" },
                    { "name": "extension", "number": 2, "type": "message", "typeName": "fhir.test.Extension", "repeated": true },
                    {
                        "name": "status", "number": 3, "type": "message", "typeName": "fhir.test.ObservationStatusCode",
                        "options": { "validationRequirement": "required_by_fhir" }
                    },
                    {
                        "name": "subject", "number": 4, "type": "message", "typeName": "fhir.test.Reference",
                        "options": { "validReferenceType": ["Patient", "Group"] }
                    },
                    { "name": "value", "number": 5, "type": "message", "typeName": "fhir.test.Observation.ValueX" },
                    {
                        "name": "performer", "number": 6, "type": "message", "typeName": "fhir.test.Reference", "repeated": true,
                        "options": { "validReferenceType": ["Organization", "PractitionerRole"] }
                    },
                    { "name": "note", "number": 7, "type": "message", "typeName": "fhir.test.String", "repeated": true },
                    {
                        "name": "focus", "number": 8, "type": "message", "typeName": "fhir.test.Reference", "repeated": true,
                        "options": { "validReferenceType": ["Resource"] }
                    }
                ]
            },
            {
                "name": "fhir.test.Observation.ValueX",
                "options": { "isChoiceType": true },
                "fields": [
                    { "name": "quantity", "number": 1, "type": "message", "typeName": "fhir.test.Quantity", "oneof": "choice" },
                    { "name": "string_value", "number": 2, "type": "message", "typeName": "fhir.test.String", "jsonName": "string", "oneof": "choice" },
                    { "name": "boolean", "number": 3, "type": "message", "typeName": "fhir.test.Boolean", "oneof": "choice" }
                ],
                "oneofs": [{ "name": "choice" }]
            },
            {
                "name": "fhir.test.Patient",
                "options": { "structureDefinitionKind": "resource" },
                "fields": [
                    { "name": "id", "number": 1, "type": "message", "typeName": "fhir.test.Id" },
                    { "name": "extension", "number": 2, "type": "message", "typeName": "fhir.test.Extension", "repeated": true },
                    { "name": "link", "number": 3, "type": "message", "typeName": "fhir.test.Patient.Link", "repeated": true },
                    {
                        "name": "managing_organization", "number": 4, "type": "message", "typeName": "fhir.test.Reference",
                        "options": { "validReferenceType": ["Organization"] }
                    }
                ]
            },
            {
                "name": "fhir.test.Patient.Link",
                "options": { "structureDefinitionKind": "complex_type" },
                "fields": [
                    {
                        "name": "other", "number": 1, "type": "message", "typeName": "fhir.test.Reference",
                        "options": { "validationRequirement": "required_by_fhir", "validReferenceType": ["Patient"] }
                    }
                ]
            },
            {
                "name": "fhir.test.ContainedResource",
                "fields": [
                    { "name": "observation", "number": 1, "type": "message", "typeName": "fhir.test.Observation", "oneof": "oneof_resource" },
                    { "name": "patient", "number": 2, "type": "message", "typeName": "fhir.test.Patient", "oneof": "oneof_resource" }
                ],
                "oneofs": [{ "name": "oneof_resource" }]
            },
            {
                "name": "fhir.test.Untracked",
                "fields": [
                    {
                        "name": "code", "number": 1, "type": "message", "typeName": "fhir.test.String",
                        "options": { "validationRequirement": "required_by_fhir" }
                    }
                ]
            },
            {
                "name": "fhir.test.ext.EventTrigger",
                "options": {
                    "fhirProfileBase": ["http://hl7.org/fhir/StructureDefinition/Extension"],
                    "fhirStructureDefinitionUrl": EVENT_TRIGGER_URL
                },
                "fields": [{ "name": "trigger", "number": 1, "type": "message", "typeName": "fhir.test.String" }]
            },
            {
                "name": "fhir.test.ext.SourceSystem",
                "options": {
                    "fhirProfileBase": ["http://hl7.org/fhir/StructureDefinition/Extension"],
                    "fhirStructureDefinitionUrl": SOURCE_SYSTEM_URL
                },
                "fields": [{ "name": "system", "number": 1, "type": "message", "typeName": "fhir.test.Uri" }]
            },
            {
                "name": "fhir.test.ext.Unprofiled",
                "options": { "fhirStructureDefinitionUrl": "https://example.com/fhir/StructureDefinition/unprofiled" }
            }
        ],
        "enums": [
            {
                "name": "fhir.test.ObservationStatusCode.Value",
                "values": [
                    { "name": "INVALID_UNINITIALIZED", "number": 0 },
                    { "name": "REGISTERED", "number": 1 },
                    { "name": "PRELIMINARY", "number": 2 },
                    { "name": "FINAL", "number": 3 },
                    { "name": "ENTERED_IN_ERROR", "number": 4 }
                ]
            },
            {
                "name": "fhir.test.QuantityComparatorCode.Value",
                "values": [
                    { "name": "INVALID_UNINITIALIZED", "number": 0 },
                    { "name": "LESS_THAN", "number": 1, "options": { "fhirOriginalCode": "<" } },
                    { "name": "LESS_THAN_OR_EQUAL_TO", "number": 2, "options": { "fhirOriginalCode": "<=" } },
                    { "name": "GREATER_THAN_OR_EQUAL_TO", "number": 3, "options": { "fhirOriginalCode": ">=" } },
                    { "name": "GREATER_THAN", "number": 4, "options": { "fhirOriginalCode": ">" } }
                ]
            }
        ]
    })
}

pub fn pool() -> DescriptorPool {
    DescriptorPool::from_json_value(schema()).unwrap()
}

pub fn config() -> FormatConfig {
    FormatConfig::builder()
        .container_root("fhir.test.ContainedResource")
        .reference_type("fhir.test.Reference")
        .regex_primitive("fhir.test.Decimal")
        .build()
}

pub fn context() -> FormatContext {
    FormatContext::new(pool(), config()).unwrap()
}

pub fn message(pool: &DescriptorPool, name: &str) -> DynamicMessage {
    DynamicMessage::new(pool.get_message_by_name(name).unwrap())
}

/// A primitive of type `name` whose `value` is the string `value`
pub fn primitive_string(pool: &DescriptorPool, name: &str, value: &str) -> DynamicMessage {
    let mut msg = message(pool, name);
    msg.set_field_by_name("value", Value::String(value.to_string()))
        .unwrap();
    msg
}

pub fn string(pool: &DescriptorPool, value: &str) -> DynamicMessage {
    primitive_string(pool, "fhir.test.String", value)
}

/// A generic `fhir.test.Extension` with the given url and optional string value
pub fn extension(pool: &DescriptorPool, url: &str, value: Option<&str>) -> DynamicMessage {
    let mut ext = message(pool, "fhir.test.Extension");
    ext.set_field_by_name("url", primitive_string(pool, "fhir.test.Uri", url).into())
        .unwrap();
    if let Some(value) = value {
        let mut choice = message(pool, "fhir.test.Extension.ValueX");
        choice
            .set_field_by_name("string_value", string(pool, value).into())
            .unwrap();
        ext.set_field_by_name("value", choice.into()).unwrap();
    }
    ext
}

/// A Reference populated through its `uri` member
pub fn uri_reference(pool: &DescriptorPool, uri: &str) -> DynamicMessage {
    let mut reference = message(pool, "fhir.test.Reference");
    reference
        .set_field_by_name("uri", string(pool, uri).into())
        .unwrap();
    reference
}

/// A Reference populated through the typed id member `field`
pub fn typed_reference(pool: &DescriptorPool, field: &str, id: &str) -> DynamicMessage {
    let mut reference = message(pool, "fhir.test.Reference");
    reference
        .set_field_by_name(field, primitive_string(pool, "fhir.test.ReferenceId", id).into())
        .unwrap();
    reference
}

pub fn status(pool: &DescriptorPool, number: i32) -> DynamicMessage {
    let mut code = message(pool, "fhir.test.ObservationStatusCode");
    code.set_field_by_name("value", Value::EnumNumber(number))
        .unwrap();
    code
}
