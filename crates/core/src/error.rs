use serde::Serialize;
use serde_json::Value;

/// A named bound that a correctly-typed value failed to satisfy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Constraint {
    /// A required field was not supplied.
    Required,
    /// Value must be strictly greater than `limit`.
    Gt { limit: f64 },
    /// Value must be strictly less than `limit`.
    Lt { limit: f64 },
    /// Text must have at most `max` characters.
    MaxLength { max: usize },
    /// Sequence must have at most `max` entries.
    MaxItems { max: usize },
    EmailShape,
    /// Email domain must be one of `allowed`.
    EmailDomain { allowed: Vec<String> },
    Url,
    /// The field was supplied under both its canonical key and `alias`.
    Duplicate { alias: String },
    /// The field is derived and cannot be supplied.
    Computed,
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Required => f.write_str("field required"),
            Constraint::Gt { limit } => write!(f, "must be greater than {limit}"),
            Constraint::Lt { limit } => write!(f, "must be less than {limit}"),
            Constraint::MaxLength { max } => write!(f, "must be at most {max} characters"),
            Constraint::MaxItems { max } => write!(f, "must have at most {max} items"),
            Constraint::EmailShape => f.write_str("must be a valid email address"),
            Constraint::EmailDomain { allowed } => {
                write!(f, "email domain must be one of [{}]", allowed.join(", "))
            }
            Constraint::Url => f.write_str("must be a valid absolute URL"),
            Constraint::Duplicate { alias } => {
                write!(f, "supplied more than once (also as '{alias}')")
            }
            Constraint::Computed => f.write_str("is computed and cannot be supplied"),
        }
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("{constraint} (got {value})")]
    ConstraintViolation { constraint: Constraint, value: Value },
}

/// A rejection of one field, identified by its dotted path (e.g. `address.city`, `allergies.2`).
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{field}: {kind}")]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::TypeMismatch {
                expected,
                found: json_type_name(found),
            },
        }
    }

    pub fn constraint(field: impl Into<String>, constraint: Constraint, value: Value) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::ConstraintViolation { constraint, value },
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::constraint(field, Constraint::Required, Value::Null)
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, FieldErrorKind::TypeMismatch { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.kind, FieldErrorKind::ConstraintViolation { .. })
    }
}

/// Errors returned when raw input cannot be turned into a validated record.
///
/// Field errors are accumulated: every field is checked and all failures are reported
/// together, in field declaration order. The whole-record check only runs when no field
/// failed, so `CrossField` is never mixed with field errors.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{} field(s) failed validation: {}", .errors.len(), summarise(.errors))]
    Fields { errors: Vec<FieldError> },
    #[error("cross-field check '{rule}' failed: {message}")]
    CrossField { rule: &'static str, message: String },
}

impl ValidationError {
    /// All field errors, empty for a cross-field rejection.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::Fields { errors } => errors,
            ValidationError::CrossField { .. } => &[],
        }
    }

    /// Field errors reported against `field` (exact path match).
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.field_errors().iter().filter(move |e| e.field == field)
    }

    pub fn is_cross_field(&self) -> bool {
        matches!(self, ValidationError::CrossField { .. })
    }
}

fn summarise(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while building a [`crate::ValidationPolicy`].
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid policy: {0}")]
    InvalidInput(String),
}

/// Errors raised when sort parameters for a roster are not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("invalid field '{0}'. Select from [height, weight, bmi]")]
    InvalidField(String),
    #[error("invalid order '{0}'. Select between asc and desc")]
    InvalidOrder(String),
}

/// Errors raised when dumping a record to text.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("failed to serialize to JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to serialize to YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Short JSON type name used in type-mismatch reports.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
