//! The patient record and its validator.
//!
//! Raw input goes through a fixed pipeline. Each field runs its own ordered stages:
//!
//! 1. type/shape check, with lenient coercion unless the policy marks the field strict,
//! 2. range/format check on the coerced value,
//! 3. transformation (email domain allow-list, name upper-casing).
//!
//! Fields are independent, so every field is checked and all failures are collected. Only when
//! no field failed does the whole-record stage run (age above the emergency-contact threshold
//! requires an `emergency` contact). The body-mass index is computed last, once, from the
//! validated weight and height.
//!
//! The validator is a pure function of its input and policy: it never mutates the caller's
//! value and performs no I/O.

use std::collections::BTreeMap;

use prv_types::{EmailAddress, PatientName, TextError};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::coerce::{self, Coerced};
use crate::config::ValidationPolicy;
use crate::constants::{BMI_KEY, EMERGENCY_CONTACT_KEY, MAX_ALLERGIES, ROOT_PATH};
use crate::error::{Constraint, DumpError, FieldError, ValidationError, ValidationResult};
use crate::field::Field;

/// A validated, normalised patient record.
///
/// Construct one with [`validate`] or [`validate_with`]. There are no setters: a record is
/// immutable once built, so the stored BMI always agrees with weight and height.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    name: PatientName,
    email: EmailAddress,
    age: u32,
    weight: f64,
    height: f64,
    marital_status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    allergies: Option<Vec<String>>,
    contact_details: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    github_url: Option<Url>,
    bmi: f64,
}

impl PatientRecord {
    /// Uppercased name.
    pub fn name(&self) -> &PatientName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Height in metres.
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn marital_status(&self) -> bool {
        self.marital_status
    }

    pub fn allergies(&self) -> Option<&[String]> {
        self.allergies.as_deref()
    }

    pub fn contact_details(&self) -> &BTreeMap<String, String> {
        &self.contact_details
    }

    pub fn github_url(&self) -> Option<&Url> {
        self.github_url.as_ref()
    }

    /// Body-mass index, `weight / height²` rounded to two decimal places.
    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    /// Dump every field at its normalised value, including `bmi`.
    pub fn to_json_value(&self) -> Result<Value, DumpError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String, DumpError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, DumpError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// `round(weight / height², 2)`.
pub fn compute_bmi(weight: f64, height: f64) -> f64 {
    round_to_hundredths(weight / (height * height))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Validate raw input against the default [`ValidationPolicy`].
pub fn validate(raw: &Value) -> ValidationResult<PatientRecord> {
    validate_with(raw, &ValidationPolicy::default())
}

/// Validate raw input against an explicit policy.
///
/// # Errors
///
/// Returns [`ValidationError::Fields`] with every failing field if any field-level check fails,
/// or [`ValidationError::CrossField`] if all fields pass but the record as a whole does not.
pub fn validate_with(raw: &Value, policy: &ValidationPolicy) -> ValidationResult<PatientRecord> {
    let Some(input) = raw.as_object() else {
        return Err(ValidationError::Fields {
            errors: vec![FieldError::type_mismatch(ROOT_PATH, "object", raw)],
        });
    };

    let mut fields = FieldChecks {
        input,
        policy,
        errors: Vec::new(),
    };

    let name = fields.required(Field::Name, check_name);
    let email = fields.required(Field::Email, check_email);
    let age = fields.required(Field::Age, check_age);
    let weight = fields.required(Field::Weight, check_positive_real);
    let height = fields.required(Field::Height, check_positive_real);
    let marital_status = fields.defaulted(Field::MaritalStatus, true, check_boolean);
    let allergies = fields.optional(Field::Allergies, check_allergies);
    let contact_details = fields.required(Field::ContactDetails, check_contact_details);
    let github_url = fields.optional(Field::GithubUrl, check_url);

    if let Some(bmi) = input.get(BMI_KEY) {
        fields
            .errors
            .push(FieldError::constraint(BMI_KEY, Constraint::Computed, bmi.clone()));
    }

    let FieldChecks { errors, .. } = fields;

    let (
        Some(name),
        Some(email),
        Some(age),
        Some(weight),
        Some(height),
        Some(marital_status),
        Some(allergies),
        Some(contact_details),
        Some(github_url),
    ) = (
        name,
        email,
        age,
        weight,
        height,
        marital_status,
        allergies,
        contact_details,
        github_url,
    )
    else {
        return Err(ValidationError::Fields { errors });
    };

    if !errors.is_empty() {
        return Err(ValidationError::Fields { errors });
    }

    check_emergency_contact(age, &contact_details, policy)?;

    Ok(PatientRecord {
        name,
        email,
        age,
        weight,
        height,
        marital_status,
        allergies,
        contact_details,
        github_url,
        bmi: compute_bmi(weight, height),
    })
}

/// Whole-record stage: older patients must have an emergency contact.
fn check_emergency_contact(
    age: u32,
    contact_details: &BTreeMap<String, String>,
    policy: &ValidationPolicy,
) -> ValidationResult<()> {
    let threshold = policy.emergency_contact_age();
    if age > threshold && !contact_details.contains_key(EMERGENCY_CONTACT_KEY) {
        return Err(ValidationError::CrossField {
            rule: "emergency_contact",
            message: format!(
                "patients older than {threshold} must have an '{EMERGENCY_CONTACT_KEY}' entry in contactDetails"
            ),
        });
    }
    Ok(())
}

/// Context handed to each field check.
struct FieldContext<'a> {
    field: Field,
    policy: &'a ValidationPolicy,
}

impl FieldContext<'_> {
    fn path(&self) -> &'static str {
        self.field.key()
    }
}

type Check<T> = fn(&FieldContext<'_>, &Value) -> Result<T, Vec<FieldError>>;

/// Runs per-field checks against the input map and collects their failures.
///
/// Every method returns `None` exactly when it has pushed at least one error.
struct FieldChecks<'a> {
    input: &'a Map<String, Value>,
    policy: &'a ValidationPolicy,
    errors: Vec<FieldError>,
}

enum Lookup<'a> {
    Absent,
    Present(&'a Value),
    Duplicate,
}

impl<'a> FieldChecks<'a> {
    fn lookup(&mut self, field: Field) -> Lookup<'a> {
        let input = self.input;
        let canonical = input.get(field.key());
        let aliased = field.alias().and_then(|alias| input.get(alias));

        match (canonical, aliased) {
            (Some(value), Some(_)) => {
                let alias = field.alias().unwrap_or_default().to_string();
                self.errors.push(FieldError::constraint(
                    field.key(),
                    Constraint::Duplicate { alias },
                    value.clone(),
                ));
                Lookup::Duplicate
            }
            (Some(value), None) | (None, Some(value)) => Lookup::Present(value),
            (None, None) => Lookup::Absent,
        }
    }

    fn run<T>(&mut self, field: Field, value: &Value, check: Check<T>) -> Option<T> {
        let ctx = FieldContext {
            field,
            policy: self.policy,
        };
        match check(&ctx, value) {
            Ok(v) => Some(v),
            Err(mut errs) => {
                self.errors.append(&mut errs);
                None
            }
        }
    }

    fn required<T>(&mut self, field: Field, check: Check<T>) -> Option<T> {
        match self.lookup(field) {
            Lookup::Present(value) => self.run(field, value, check),
            Lookup::Absent => {
                self.errors.push(FieldError::missing(field.key()));
                None
            }
            Lookup::Duplicate => None,
        }
    }

    fn defaulted<T>(&mut self, field: Field, default: T, check: Check<T>) -> Option<T> {
        match self.lookup(field) {
            Lookup::Present(value) => self.run(field, value, check),
            Lookup::Absent => Some(default),
            Lookup::Duplicate => None,
        }
    }

    /// Absent and `null` both yield `Some(None)`.
    fn optional<T>(&mut self, field: Field, check: Check<T>) -> Option<Option<T>> {
        match self.lookup(field) {
            Lookup::Present(Value::Null) | Lookup::Absent => Some(None),
            Lookup::Present(value) => self.run(field, value, check).map(Some),
            Lookup::Duplicate => None,
        }
    }
}

fn single<T>(result: Coerced<T>) -> Result<T, Vec<FieldError>> {
    result.map_err(|e| vec![e])
}

fn check_name(ctx: &FieldContext<'_>, value: &Value) -> Result<PatientName, Vec<FieldError>> {
    let text = single(coerce::text(ctx.path(), value))?;
    PatientName::new(&text).map_err(|TextError::TooLong { max, .. }| {
        vec![FieldError::constraint(
            ctx.path(),
            Constraint::MaxLength { max },
            value.clone(),
        )]
    })
}

fn check_email(ctx: &FieldContext<'_>, value: &Value) -> Result<EmailAddress, Vec<FieldError>> {
    let text = single(coerce::text(ctx.path(), value))?;
    let email = EmailAddress::new(&text).map_err(|_| {
        vec![FieldError::constraint(
            ctx.path(),
            Constraint::EmailShape,
            value.clone(),
        )]
    })?;

    if !ctx.policy.allows_domain(email.domain()) {
        return Err(vec![FieldError::constraint(
            ctx.path(),
            Constraint::EmailDomain {
                allowed: ctx.policy.allowed_email_domains().map(String::from).collect(),
            },
            value.clone(),
        )]);
    }

    Ok(email)
}

fn check_age(ctx: &FieldContext<'_>, value: &Value) -> Result<u32, Vec<FieldError>> {
    let age = single(coerce::integer(
        ctx.path(),
        value,
        ctx.policy.coercion(ctx.field),
    ))?;

    let max = ctx.policy.max_age_exclusive();
    let lt = || {
        vec![FieldError::constraint(
            ctx.path(),
            Constraint::Lt {
                limit: f64::from(max),
            },
            value.clone(),
        )]
    };
    if age <= 0 {
        return Err(vec![FieldError::constraint(
            ctx.path(),
            Constraint::Gt { limit: 0.0 },
            value.clone(),
        )]);
    }
    if age >= i64::from(max) {
        return Err(lt());
    }

    // 0 < age < max <= u32::MAX
    u32::try_from(age).map_err(|_| lt())
}

fn check_positive_real(ctx: &FieldContext<'_>, value: &Value) -> Result<f64, Vec<FieldError>> {
    let number = single(coerce::real(
        ctx.path(),
        value,
        ctx.policy.coercion(ctx.field),
    ))?;

    if number <= 0.0 {
        return Err(vec![FieldError::constraint(
            ctx.path(),
            Constraint::Gt { limit: 0.0 },
            Value::from(number),
        )]);
    }
    Ok(number)
}

fn check_boolean(ctx: &FieldContext<'_>, value: &Value) -> Result<bool, Vec<FieldError>> {
    single(coerce::boolean(
        ctx.path(),
        value,
        ctx.policy.coercion(ctx.field),
    ))
}

fn check_allergies(ctx: &FieldContext<'_>, value: &Value) -> Result<Vec<String>, Vec<FieldError>> {
    let allergies = coerce::text_list(ctx.path(), value)?;
    if allergies.len() > MAX_ALLERGIES {
        return Err(vec![FieldError::constraint(
            ctx.path(),
            Constraint::MaxItems { max: MAX_ALLERGIES },
            value.clone(),
        )]);
    }
    Ok(allergies)
}

fn check_contact_details(
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<BTreeMap<String, String>, Vec<FieldError>> {
    coerce::text_map(ctx.path(), value)
}

fn check_url(ctx: &FieldContext<'_>, value: &Value) -> Result<Url, Vec<FieldError>> {
    let text = single(coerce::text(ctx.path(), value))?;
    Url::parse(text.trim())
        .map_err(|_| vec![FieldError::constraint(ctx.path(), Constraint::Url, value.clone())])
}
