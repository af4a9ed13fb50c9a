mod test_support;

use ferrum_jsonformat::{serialize_code, unmarshal_code, ErrorKind};
use ferrum_reflect::Value;
use serde_json::json;
use test_support::{message, pool, primitive_string};

#[test]
fn test_code_from_enum_name() {
    let pool = pool();
    let desc = pool.get_message_by_name("fhir.test.ObservationStatusCode").unwrap();

    let code = unmarshal_code("Observation.status", &desc, &json!("entered-in-error")).unwrap();
    assert_eq!(
        code.get_field_by_name("value").unwrap().into_owned(),
        Value::EnumNumber(4)
    );
    assert_eq!(serialize_code(&code).unwrap(), "entered-in-error");

    let code = unmarshal_code("Observation.status", &desc, &json!("final")).unwrap();
    assert_eq!(serialize_code(&code).unwrap(), "final");
}

#[test]
fn test_code_from_original_code() {
    let pool = pool();
    let desc = pool.get_message_by_name("fhir.test.QuantityComparatorCode").unwrap();

    let code = unmarshal_code("Quantity.comparator", &desc, &json!(">=")).unwrap();
    assert_eq!(
        code.get_field_by_name("value").unwrap().into_owned(),
        Value::EnumNumber(3)
    );
    assert_eq!(serialize_code(&code).unwrap(), ">=");
}

#[test]
fn test_code_mismatch() {
    let pool = pool();
    let desc = pool.get_message_by_name("fhir.test.ObservationStatusCode").unwrap();

    let err = unmarshal_code("Observation.status", &desc, &json!("done")).unwrap_err();
    let err = err.as_validation().unwrap();
    assert_eq!(err.kind, ErrorKind::Malformed);
    assert_eq!(err.detail, "code type mismatch");
    assert_eq!(err.path, "Observation.status");
    assert_eq!(
        err.diagnostics.as_deref(),
        Some("\"done\" is not a ObservationStatusCode")
    );

    // The zero value is never a valid code.
    assert!(unmarshal_code("Observation.status", &desc, &json!("invalid-uninitialized")).is_err());
}

#[test]
fn test_code_must_be_a_string() {
    let pool = pool();
    let desc = pool.get_message_by_name("fhir.test.ObservationStatusCode").unwrap();
    let err = unmarshal_code("Observation.status", &desc, &json!(3)).unwrap_err();
    let err = err.as_validation().unwrap();
    assert_eq!(err.detail, "expected code");
    assert_eq!(err.diagnostics.as_deref(), Some("found 3"));
}

#[test]
fn test_string_backed_code() {
    let pool = pool();
    let desc = pool.get_message_by_name("fhir.test.MimeTypeCode").unwrap();
    let code = unmarshal_code("Attachment.contentType", &desc, &json!("text/plain")).unwrap();
    assert_eq!(code, primitive_string(&pool, "fhir.test.MimeTypeCode", "text/plain"));
    assert_eq!(serialize_code(&code).unwrap(), "text/plain");
}

#[test]
fn test_serialize_unset_code() {
    let pool = pool();
    let unset = message(&pool, "fhir.test.ObservationStatusCode");
    let err = serialize_code(&unset).unwrap_err();
    assert_eq!(err.to_string(), "code value is not set");
}
