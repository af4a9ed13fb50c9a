//! # ferrum-reflect
//!
//! Runtime descriptors and dynamic messages for FHIR schema types.
//!
//! A [`DescriptorPool`] is built from serializable [`SchemaFile`] documents
//! that describe message types, their fields and oneofs, and the FHIR
//! annotations attached to them. [`DynamicMessage`] holds instances of those
//! types without generated code.
//!
//! ```
//! use ferrum_reflect::{DescriptorPool, DynamicMessage};
//!
//! let pool = DescriptorPool::from_json_str(r#"{
//!     "messages": [{
//!         "name": "example.Id",
//!         "fields": [{ "name": "value", "number": 1, "type": "string" }]
//!     }]
//! }"#).unwrap();
//!
//! let mut id = DynamicMessage::new(pool.get_message_by_name("example.Id").unwrap());
//! id.set_field_by_name("value", "abc".into()).unwrap();
//! assert!(id.has_field_by_name("value"));
//! ```

pub mod descriptor;
pub mod error;
pub mod message;
pub mod options;
pub mod schema;

pub use descriptor::{
    DescriptorPool, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, Kind,
    MessageDescriptor, OneofDescriptor,
};
pub use error::{Error, Result};
pub use message::{DynamicMessage, Value};
pub use options::{
    EnumValueOptions, FieldOptions, MessageOptions, OneofOptions, Requirement,
    StructureDefinitionKind,
};
pub use schema::{EnumDef, EnumValueDef, FieldDef, FieldType, MessageDef, OneofDef, SchemaFile};
