//! # ferrum-jsonformat
//!
//! FHIR JSON format rules on top of [`ferrum_reflect`] descriptors.
//!
//! The rules here are the ones a JSON marshaller cannot derive from a schema
//! alone:
//!
//! - routing JSON keys to fields, including flattened choice fields and `_`
//!   primitive shadows ([`field_map`])
//! - precision-preserving `time`, `date`, `dateTime` and `instant` values ([`time`])
//! - required fields, string limits and primitive regexes ([`validation`])
//! - typed references and their allowed resource types ([`reference`])
//! - implementation-private extensions ([`extension`])
//! - enum-backed `code` values ([`code`])
//!
//! Schema-derived indexes live in a [`FormatContext`], built once per
//! descriptor pool.
//!
//! ```
//! use ferrum_jsonformat::time::{parse_time, serialize_time, TimePrecision};
//!
//! let t = parse_time("08:30:00.250").unwrap();
//! assert_eq!(t.precision, TimePrecision::Millisecond);
//! assert_eq!(serialize_time(t.value_us, t.precision).unwrap(), "08:30:00.250");
//! ```

pub mod code;
pub mod config;
pub mod context;
pub mod error;
pub mod extension;
pub mod field_map;
pub mod patterns;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod time;
pub mod validation;

pub use code::{serialize_code, unmarshal_code};
pub use config::{FhirVersion, FormatConfig, FormatConfigBuilder, DEFAULT_MAX_STRING_BYTES};
pub use context::FormatContext;
pub use error::{ConfigError, Error, ErrorKind, Result, SchemaError, ValidationError};
pub use extension::{
    add_internal_extension, extension_field_name, extension_has_url, extension_url,
    extension_value, get_internal_extension, has_internal_extension, internal_extension_url,
    remove_internal_extension,
};
pub use field_map::{FieldMap, FieldMapCache};
pub use reference::{parse_reference, resource_id_field, ReferenceTarget, ReferenceTypeTable};
pub use registry::ConstraintRegistry;
pub use validation::{validate_string, validate_string_with_limit};
