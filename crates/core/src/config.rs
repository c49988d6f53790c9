//! Validation policy configuration.
//!
//! The tunable parts of the patient schema are resolved once at process startup and then passed
//! into the validator. Nothing in this crate reads environment variables; the binary reads them
//! and hands the raw strings to the `*_from_env_value` helpers below.

use std::collections::BTreeSet;

use crate::coerce::Coercion;
use crate::constants::{
    DEFAULT_EMAIL_DOMAINS, DEFAULT_EMERGENCY_CONTACT_AGE, DEFAULT_MAX_AGE_EXCLUSIVE,
};
use crate::error::PolicyError;
use crate::field::Field;

/// Schema policy applied by [`crate::validate_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationPolicy {
    max_age_exclusive: u32,
    allowed_email_domains: BTreeSet<String>,
    strict_fields: BTreeSet<Field>,
    emergency_contact_age: u32,
}

impl ValidationPolicy {
    /// Create a new `ValidationPolicy`.
    ///
    /// Domains are trimmed and lowercased. The emergency-contact age starts at its default and
    /// can be changed with [`ValidationPolicy::with_emergency_contact_age`].
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidInput` if:
    /// - `max_age_exclusive` leaves no valid age (it must be at least 2),
    /// - the domain allow-list is empty after trimming,
    /// - any domain is blank or contains `@`.
    pub fn new<D, S>(
        max_age_exclusive: u32,
        allowed_email_domains: D,
        strict_fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self, PolicyError>
    where
        D: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if max_age_exclusive < 2 {
            return Err(PolicyError::InvalidInput(format!(
                "max age must be at least 2, got {max_age_exclusive}"
            )));
        }

        let mut domains = BTreeSet::new();
        for domain in allowed_email_domains {
            let domain = domain.as_ref().trim().to_ascii_lowercase();
            if domain.is_empty() || domain.contains('@') {
                return Err(PolicyError::InvalidInput(format!(
                    "'{domain}' is not a valid email domain"
                )));
            }
            domains.insert(domain);
        }

        if domains.is_empty() {
            return Err(PolicyError::InvalidInput(
                "email domain allow-list cannot be empty".into(),
            ));
        }

        Ok(Self {
            max_age_exclusive,
            allowed_email_domains: domains,
            strict_fields: strict_fields.into_iter().collect(),
            emergency_contact_age: DEFAULT_EMERGENCY_CONTACT_AGE,
        })
    }

    pub fn with_emergency_contact_age(mut self, age: u32) -> Self {
        self.emergency_contact_age = age;
        self
    }

    pub fn max_age_exclusive(&self) -> u32 {
        self.max_age_exclusive
    }

    pub fn allowed_email_domains(&self) -> impl Iterator<Item = &str> {
        self.allowed_email_domains.iter().map(String::as_str)
    }

    pub fn allows_domain(&self, domain: &str) -> bool {
        self.allowed_email_domains.contains(domain)
    }

    pub fn emergency_contact_age(&self) -> u32 {
        self.emergency_contact_age
    }

    pub fn is_strict(&self, field: Field) -> bool {
        self.strict_fields.contains(&field)
    }

    pub fn coercion(&self, field: Field) -> Coercion {
        if self.is_strict(field) {
            Coercion::Strict
        } else {
            Coercion::Lenient
        }
    }
}

impl Default for ValidationPolicy {
    /// Ages 1..=119, the `hdfc.com`/`icici.com` allow-list, and a strict `weight`.
    fn default() -> Self {
        Self {
            max_age_exclusive: DEFAULT_MAX_AGE_EXCLUSIVE,
            allowed_email_domains: DEFAULT_EMAIL_DOMAINS.iter().map(|d| d.to_string()).collect(),
            strict_fields: BTreeSet::from([Field::Weight]),
            emergency_contact_age: DEFAULT_EMERGENCY_CONTACT_AGE,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the exclusive age upper bound from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default bound.
pub fn max_age_from_env_value(value: Option<String>) -> Result<u32, PolicyError> {
    match non_blank(value) {
        None => Ok(DEFAULT_MAX_AGE_EXCLUSIVE),
        Some(v) => v
            .parse::<u32>()
            .map_err(|_| PolicyError::InvalidInput(format!("max age '{v}' is not a number"))),
    }
}

/// Parse a comma-separated email domain allow-list.
///
/// If `value` is `None` or empty/whitespace, returns the default allow-list. Blank entries
/// between commas are skipped.
pub fn email_domains_from_env_value(value: Option<String>) -> Vec<String> {
    match non_blank(value) {
        None => DEFAULT_EMAIL_DOMAINS.iter().map(|d| d.to_string()).collect(),
        Some(v) => v
            .split(',')
            .map(|d| d.trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect(),
    }
}

/// Parse a comma-separated list of strict fields (canonical keys or snake_case aliases).
///
/// If `value` is `None` or empty/whitespace, returns the default (`weight`). The literal `none`
/// turns strict mode off for every field.
pub fn strict_fields_from_env_value(value: Option<String>) -> Result<BTreeSet<Field>, PolicyError> {
    match non_blank(value) {
        None => Ok(BTreeSet::from([Field::Weight])),
        Some(v) if v.eq_ignore_ascii_case("none") => Ok(BTreeSet::new()),
        Some(v) => v
            .split(',')
            .filter(|f| !f.trim().is_empty())
            .map(|f| f.parse::<Field>().map_err(PolicyError::InvalidInput))
            .collect(),
    }
}

/// Parse the age above which an emergency contact is required.
///
/// If `value` is `None` or empty/whitespace, returns the default threshold.
pub fn emergency_contact_age_from_env_value(value: Option<String>) -> Result<u32, PolicyError> {
    match non_blank(value) {
        None => Ok(DEFAULT_EMERGENCY_CONTACT_AGE),
        Some(v) => v.parse::<u32>().map_err(|_| {
            PolicyError::InvalidInput(format!("emergency contact age '{v}' is not a number"))
        }),
    }
}

/// Build a policy from the optional environment values.
pub fn policy_from_env_values(
    max_age: Option<String>,
    email_domains: Option<String>,
    strict_fields: Option<String>,
    emergency_contact_age: Option<String>,
) -> Result<ValidationPolicy, PolicyError> {
    let max_age = max_age_from_env_value(max_age)?;
    let domains = email_domains_from_env_value(email_domains);
    let strict = strict_fields_from_env_value(strict_fields)?;
    let emergency_contact_age = emergency_contact_age_from_env_value(emergency_contact_age)?;

    let policy = ValidationPolicy::new(max_age, &domains, strict)?
        .with_emergency_contact_age(emergency_contact_age);
    tracing::debug!(
        max_age,
        emergency_contact_age,
        domains = ?domains,
        "resolved validation policy"
    );
    Ok(policy)
}
