//! # PRV Core
//!
//! Validation and normalisation of patient records.
//!
//! This crate turns untyped key/value input into validated records:
//! - `record`: the patient record, its five-stage validator and the derived BMI
//! - `nested`: a patient summary with a nested address sub-record
//! - `roster`: ordering validated records by height, weight or BMI
//! - `config`: the tunable validation policy, resolved once at startup
//!
//! **No I/O**: reading files, environment variables and printing belong in `prv-cli`.

pub(crate) mod coerce;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod nested;
pub mod record;
pub mod roster;

pub use coerce::Coercion;
pub use config::{policy_from_env_values, ValidationPolicy};
pub use error::{
    Constraint, DumpError, FieldError, FieldErrorKind, PolicyError, RosterError, ValidationError,
    ValidationResult,
};
pub use field::Field;
pub use nested::{Address, PatientSummary};
pub use record::{compute_bmi, validate, validate_with, PatientRecord};
pub use roster::{sort_records, SortKey, SortOrder};

// Re-export the validated field types used in `PatientRecord`'s accessors.
pub use prv_types::{EmailAddress, PatientName};
