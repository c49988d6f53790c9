//! Validated field types shared across PRV crates.
//!
//! Each type here can only be constructed through a checking constructor, so holding one is
//! proof that the value already passed its own field-level rules.

/// Maximum number of characters accepted for a patient name.
pub const MAX_NAME_CHARS: usize = 50;

/// Errors that can occur when creating a [`PatientName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The uppercased name was longer than the permitted number of characters
    #[error("text must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Errors that can occur when creating an [`EmailAddress`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    /// The input does not look like `local@domain.tld`
    #[error("'{0}' is not a valid email address")]
    NotEmailShaped(String),
}

/// A patient name, stored in uppercase and at most [`MAX_NAME_CHARS`] characters long.
///
/// The bound applies to the stored form. Upper-casing can lengthen text (`ß` becomes `SS`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatientName(String);

impl PatientName {
    /// Creates a new `PatientName`, normalising it to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `TextError::TooLong` if the uppercased input has more than [`MAX_NAME_CHARS`]
    /// characters.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let upper = input.as_ref().to_uppercase();
        let actual = upper.chars().count();
        if actual > MAX_NAME_CHARS {
            return Err(TextError::TooLong {
                max: MAX_NAME_CHARS,
                actual,
            });
        }
        Ok(Self(upper))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatientName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An email address that has passed a shape check.
///
/// The domain part is lowercased on construction; the local part is kept as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    full: String,
    at: usize,
}

impl EmailAddress {
    /// Creates a new `EmailAddress`.
    ///
    /// The shape rules are deliberately small: exactly one `@`, a non-empty local part, no
    /// whitespace, and a domain made of at least two non-empty dot-separated labels.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::NotEmailShaped` if any rule fails.
    pub fn new(input: impl AsRef<str>) -> Result<Self, EmailError> {
        let raw = input.as_ref().trim();
        let reject = || EmailError::NotEmailShaped(raw.to_owned());

        if raw.chars().any(char::is_whitespace) {
            return Err(reject());
        }

        let mut parts = raw.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(reject());
        };

        if local.is_empty() {
            return Err(reject());
        }

        let labels: Vec<&str> = domain.split('.').collect();
        let labels_ok = labels.len() >= 2
            && labels.iter().all(|label| {
                !label.is_empty()
                    && !label.starts_with('-')
                    && !label.ends_with('-')
                    && label.chars().all(|c| c.is_alphanumeric() || c == '-')
            });
        if !labels_ok {
            return Err(reject());
        }

        Ok(Self {
            full: format!("{local}@{}", domain.to_lowercase()),
            at: local.len(),
        })
    }

    /// The part before the `@`.
    pub fn local_part(&self) -> &str {
        &self.full[..self.at]
    }

    /// The lowercased part after the `@`.
    pub fn domain(&self) -> &str {
        &self.full[self.at + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.full
    }
}

impl serde::Serialize for PatientName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PatientName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientName::new(&s).map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.full)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_uppercased() {
        let name = PatientName::new("Quaresma").expect("valid name");
        assert_eq!(name.as_str(), "QUARESMA");
    }

    #[test]
    fn name_normalisation_is_idempotent() {
        let once = PatientName::new("Marcelo Vieira").expect("valid name");
        let twice = PatientName::new(once.as_str()).expect("valid name");
        assert_eq!(once, twice);
    }

    #[test]
    fn name_accepts_exactly_fifty_chars() {
        assert!(PatientName::new("a".repeat(MAX_NAME_CHARS)).is_ok());
    }

    #[test]
    fn name_rejects_fifty_one_chars() {
        let err = PatientName::new("a".repeat(51)).expect_err("should reject long name");
        assert_eq!(err, TextError::TooLong { max: 50, actual: 51 });
    }

    #[test]
    fn name_length_counts_chars_not_bytes() {
        assert!(PatientName::new("é".repeat(50)).is_ok());
    }

    #[test]
    fn name_bound_applies_after_uppercasing() {
        let name = PatientName::new("ß".repeat(25)).expect("expands to fifty");
        assert_eq!(name.as_str(), "SS".repeat(25));

        let err = PatientName::new("ß".repeat(30)).expect_err("expands past fifty");
        assert_eq!(err, TextError::TooLong { max: 50, actual: 60 });
    }

    #[test]
    fn email_splits_local_and_domain() {
        let email = EmailAddress::new("user@HDFC.com").expect("valid email");
        assert_eq!(email.local_part(), "user");
        assert_eq!(email.domain(), "hdfc.com");
        assert_eq!(email.as_str(), "user@hdfc.com");
    }

    #[test]
    fn email_rejects_bad_shapes() {
        for bad in [
            "",
            "user",
            "@hdfc.com",
            "user@",
            "user@hdfc",
            "user@@hdfc.com",
            "a@b@hdfc.com",
            "user name@hdfc.com",
            "user@.com",
            "user@hdfc..com",
            "user@-hdfc.com",
        ] {
            assert!(
                matches!(EmailAddress::new(bad), Err(EmailError::NotEmailShaped(_))),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn deserialize_runs_constructor() {
        let name: PatientName = serde_json::from_str("\"kaka\"").expect("valid name");
        assert_eq!(name.as_str(), "KAKA");

        let err = serde_json::from_str::<EmailAddress>("\"not-an-email\"");
        assert!(err.is_err());
    }

    #[test]
    fn serialize_writes_plain_string() {
        let email = EmailAddress::new("user@icici.com").expect("valid email");
        let json = serde_json::to_string(&email).expect("serialize");
        assert_eq!(json, "\"user@icici.com\"");
    }
}
