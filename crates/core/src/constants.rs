//! Constants used throughout the PRV core crate.
//!
//! Defaults for the validation policy live here so that the binary, the policy builder and the
//! tests agree on one set of numbers.

/// Exclusive upper bound on a patient's age when no override is configured.
pub const DEFAULT_MAX_AGE_EXCLUSIVE: u32 = 120;

/// Email domains accepted when no override is configured.
pub const DEFAULT_EMAIL_DOMAINS: [&str; 2] = ["hdfc.com", "icici.com"];

/// Patients strictly older than this must list an emergency contact.
pub const DEFAULT_EMERGENCY_CONTACT_AGE: u32 = 60;

/// Key that must be present in `contactDetails` for older patients.
pub const EMERGENCY_CONTACT_KEY: &str = "emergency";

/// Maximum number of allergies on one record.
pub const MAX_ALLERGIES: usize = 5;

/// Key under which the derived body-mass index appears in a dump.
pub const BMI_KEY: &str = "bmi";

/// Path label used when the whole input, rather than one field, has the wrong shape.
pub const ROOT_PATH: &str = "<root>";
