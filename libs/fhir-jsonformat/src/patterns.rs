//! Lexical patterns of FHIR primitive types.
//!
//! See <https://www.hl7.org/fhir/datatypes.html>.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

const SUB_MILLI: &str = r"([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]\.[0-9]{3}[0-9]+";
const SUB_SECOND: &str = r"([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]\.[0-9]+";

pub static DATE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^-?[0-9]{4}(-(0[1-9]|1[0-2])(-(0[0-9]|[1-2][0-9]|3[0-1]))?)?$")
});

pub static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"^-?[0-9]{4}(-(0[1-9]|1[0-2])(-(0[0-9]|[1-2][0-9]|3[0-1])(T([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9](\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00)))?)?)?$",
    )
});

pub static TIME: Lazy<Regex> =
    Lazy::new(|| compile(r"^([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9](\.[0-9]+)?$"));

pub static INSTANT: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"^-?[0-9]{4}-(0[1-9]|1[0-2])-(0[0-9]|[1-2][0-9]|3[0-1])T([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9](\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00))$",
    )
});

pub static ID: Lazy<Regex> = Lazy::new(|| compile(r"^([[:alnum:]]|\-|\.){1,64}$"));

pub static OID: Lazy<Regex> = Lazy::new(|| compile(r"^urn:oid:[0-2](\.[1-9][0-9]*)+$"));

pub static POSITIVE_INT: Lazy<Regex> = Lazy::new(|| compile(r"^[+]?[1-9][0-9]*$"));

pub static UNSIGNED_INT: Lazy<Regex> = Lazy::new(|| compile(r"^(0|([1-9][0-9]*))$"));

pub static CODE: Lazy<Regex> = Lazy::new(|| compile(r"^[^\s]+([\s]?[^\s]+)*$"));

pub static UUID: Lazy<Regex> = Lazy::new(|| {
    compile(r"^urn:uuid:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
});

pub(crate) static SUB_MILLI_TIME: Lazy<Regex> = Lazy::new(|| compile(SUB_MILLI));
pub(crate) static SUB_SECOND_TIME: Lazy<Regex> = Lazy::new(|| compile(SUB_SECOND));
pub(crate) static SUB_MILLI_DATE_TIME: Lazy<Regex> =
    Lazy::new(|| compile(&format!("T{SUB_MILLI}")));
pub(crate) static SUB_SECOND_DATE_TIME: Lazy<Regex> =
    Lazy::new(|| compile(&format!("T{SUB_SECOND}")));

/// Fixed UTC offset, `±HH:MM`
pub(crate) static FIXED_OFFSET: Lazy<Regex> =
    Lazy::new(|| compile(r"^([+-])([0-9]{2}):([0-9]{2})$"));

/// Code points below 0x20 other than tab, newline and carriage return
pub(crate) static INVALID_STRING_CHARS: Lazy<Regex> =
    Lazy::new(|| compile(r"[\x00-\x08\x0B\x0C\x0E-\x1F]"));

// Analytics column names: letters, digits and underscores, not starting with a digit.
pub(crate) static INVALID_COLUMN_CHARS: Lazy<Regex> = Lazy::new(|| compile(r"[^a-zA-Z0-9_]+"));
pub(crate) static INVALID_COLUMN_START: Lazy<Regex> = Lazy::new(|| compile(r"^[^a-zA-Z_]"));

pub(crate) static RELATIVE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^([0-9A-Za-z_]+)/([A-Za-z0-9\-\.]{1,64})(?:/_history/([A-Za-z0-9\-\.]{1,64}))?$")
});
