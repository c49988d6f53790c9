//! Names of the attributes a caller may supply for a patient record.

use serde::{Deserialize, Serialize};

/// An input attribute of a patient record, in declaration order.
///
/// `bmi` is deliberately absent: it is derived and never accepted as input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Age,
    Weight,
    Height,
    MaritalStatus,
    Allergies,
    ContactDetails,
    GithubUrl,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::Email,
        Field::Age,
        Field::Weight,
        Field::Height,
        Field::MaritalStatus,
        Field::Allergies,
        Field::ContactDetails,
        Field::GithubUrl,
    ];

    /// Canonical (camelCase) input key.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Age => "age",
            Field::Weight => "weight",
            Field::Height => "height",
            Field::MaritalStatus => "maritalStatus",
            Field::Allergies => "allergies",
            Field::ContactDetails => "contactDetails",
            Field::GithubUrl => "githubUrl",
        }
    }

    /// snake_case spelling also accepted on input, where it differs from the key.
    pub fn alias(self) -> Option<&'static str> {
        match self {
            Field::MaritalStatus => Some("marital_status"),
            Field::ContactDetails => Some("contact_details"),
            Field::GithubUrl => Some("github_url"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.key() == s || field.alias() == Some(s))
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_and_alias() {
        assert_eq!("maritalStatus".parse::<Field>(), Ok(Field::MaritalStatus));
        assert_eq!("marital_status".parse::<Field>(), Ok(Field::MaritalStatus));
        assert_eq!(" weight ".parse::<Field>(), Ok(Field::Weight));
    }

    #[test]
    fn rejects_unknown_and_derived_names() {
        assert!("bmi".parse::<Field>().is_err());
        assert!("githubURL".parse::<Field>().is_err());
    }

    #[test]
    fn display_uses_canonical_key() {
        assert_eq!(Field::ContactDetails.to_string(), "contactDetails");
    }
}
