//! Patient summary with a nested address sub-record.
//!
//! The address is its own type so callers can reach `summary.address.city` directly instead of
//! pulling it out of a flat map. Validation errors carry the dotted path of the failing field,
//! e.g. `address.pin`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{self, Coercion};
use crate::constants::ROOT_PATH;
use crate::error::{DumpError, FieldError, ValidationError, ValidationResult};

/// Postal address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub state: String,
    pub pin: String,
}

/// Basic demographics with a nested [`Address`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub name: String,
    pub gender: String,
    pub age: i64,
    pub address: Address,
}

impl Address {
    /// Validate a raw address mapping.
    pub fn validate(raw: &Value) -> ValidationResult<Self> {
        let mut errors = Vec::new();
        let address = address_at(ROOT_PATH, "", raw, &mut errors);
        finish(address, errors)
    }
}

impl PatientSummary {
    pub fn new(name: impl Into<String>, gender: impl Into<String>, age: i64, address: Address) -> Self {
        Self {
            name: name.into(),
            gender: gender.into(),
            age,
            address,
        }
    }

    /// Validate a raw summary mapping, including its nested address.
    ///
    /// `age` accepts numeric text. All failures, nested ones included, are reported together.
    pub fn validate(raw: &Value) -> ValidationResult<Self> {
        let mut errors = Vec::new();

        let Some(input) = object_at(ROOT_PATH, raw, &mut errors) else {
            return Err(ValidationError::Fields { errors });
        };

        let name = text_at(input, "", "name", &mut errors);
        let gender = text_at(input, "", "gender", &mut errors);
        let age = match input.get("age") {
            Some(value) => coerce::integer("age", value, Coercion::Lenient)
                .map_err(|e| errors.push(e))
                .ok(),
            None => {
                errors.push(FieldError::missing("age"));
                None
            }
        };
        let address = match input.get("address") {
            Some(value) => address_at("address", "address.", value, &mut errors),
            None => {
                errors.push(FieldError::missing("address"));
                None
            }
        };

        match (name, gender, age, address) {
            (Some(name), Some(gender), Some(age), Some(address)) if errors.is_empty() => Ok(Self {
                name,
                gender,
                age,
                address,
            }),
            _ => Err(ValidationError::Fields { errors }),
        }
    }

    /// Dump as a nested mapping.
    pub fn to_json_value(&self) -> Result<Value, DumpError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Dump as JSON text.
    pub fn to_json(&self) -> Result<String, DumpError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn finish<T>(value: Option<T>, errors: Vec<FieldError>) -> ValidationResult<T> {
    match value {
        Some(v) if errors.is_empty() => Ok(v),
        _ => Err(ValidationError::Fields { errors }),
    }
}

fn object_at<'a>(
    path: &str,
    value: &'a Value,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Map<String, Value>> {
    let object = value.as_object();
    if object.is_none() {
        errors.push(FieldError::type_mismatch(path, "object", value));
    }
    object
}

fn text_at(
    input: &Map<String, Value>,
    prefix: &str,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let path = format!("{prefix}{key}");
    match input.get(key) {
        Some(value) => coerce::text(&path, value).map_err(|e| errors.push(e)).ok(),
        None => {
            errors.push(FieldError::missing(path));
            None
        }
    }
}

fn address_at(
    path: &str,
    prefix: &str,
    raw: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Address> {
    let input = object_at(path, raw, errors)?;
    let city = text_at(input, prefix, "city", errors);
    let state = text_at(input, prefix, "state", errors);
    let pin = text_at(input, prefix, "pin", errors);

    Some(Address {
        city: city?,
        state: state?,
        pin: pin?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abhi() -> Value {
        json!({
            "name": "Abhi",
            "gender": "male",
            "age": 22,
            "address": {"city": "Howrah", "state": "West Bengal", "pin": "700002"}
        })
    }

    #[test]
    fn validates_nested_address() {
        let summary = PatientSummary::validate(&abhi()).expect("valid summary");
        assert_eq!(summary.address.city, "Howrah");
        assert_eq!(summary.age, 22);
    }

    #[test]
    fn dump_is_nested_mapping() {
        let summary = PatientSummary::validate(&abhi()).expect("valid summary");
        assert_eq!(summary.to_json_value().expect("dump"), abhi());
    }

    #[test]
    fn json_dump_is_text() {
        let address = Address::validate(&json!({"city": "Howrah", "state": "WB", "pin": "1"}))
            .expect("valid address");
        let summary = PatientSummary::new("Abhi", "male", 22, address);
        let text = summary.to_json().expect("json");
        assert!(text.contains("\"address\":{\"city\":\"Howrah\""));
    }

    #[test]
    fn reports_nested_paths() {
        let input = json!({
            "name": "Abhi",
            "gender": "male",
            "age": "22",
            "address": {"city": "Howrah", "pin": 700002}
        });
        let err = PatientSummary::validate(&input).expect_err("bad address");
        let paths: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(paths, vec!["address.state", "address.pin"]);
        assert!(err.field_errors()[0].is_constraint_violation());
        assert!(err.field_errors()[1].is_type_mismatch());
    }

    #[test]
    fn address_must_be_a_mapping() {
        let input = json!({"name": "Abhi", "gender": "male", "age": 22, "address": "Howrah"});
        let err = PatientSummary::validate(&input).expect_err("flat address");
        assert_eq!(err.field_errors()[0].field, "address");
        assert!(err.field_errors()[0].is_type_mismatch());
    }

    #[test]
    fn collects_top_level_and_nested_errors() {
        let err = PatientSummary::validate(&json!({"age": "old", "address": {}})).expect_err("bad");
        let paths: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            paths,
            vec!["name", "gender", "age", "address.city", "address.state", "address.pin"]
        );
    }

    #[test]
    fn standalone_address_uses_bare_paths() {
        let err = Address::validate(&json!({"city": "Howrah"})).expect_err("incomplete");
        let paths: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(paths, vec!["state", "pin"]);
    }
}
