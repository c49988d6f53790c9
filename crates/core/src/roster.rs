//! Ordering a set of validated records by a body measurement.

use std::str::FromStr;

use crate::error::RosterError;
use crate::record::PatientRecord;

/// Measurement used to order records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Height,
    Weight,
    Bmi,
}

impl SortKey {
    pub fn value_of(self, record: &PatientRecord) -> f64 {
        match self {
            SortKey::Height => record.height(),
            SortKey::Weight => record.weight(),
            SortKey::Bmi => record.bmi(),
        }
    }
}

impl FromStr for SortKey {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "height" => Ok(SortKey::Height),
            "weight" => Ok(SortKey::Weight),
            "bmi" => Ok(SortKey::Bmi),
            other => Err(RosterError::InvalidField(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(RosterError::InvalidOrder(other.to_string())),
        }
    }
}

/// Sort `(id, record)` pairs in place.
///
/// The sort is stable in both directions: records with equal values keep their input order.
pub fn sort_records<K>(records: &mut [(K, PatientRecord)], key: SortKey, order: SortOrder) {
    records.sort_by(|(_, a), (_, b)| {
        let ordering = key.value_of(a).total_cmp(&key.value_of(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
