//! Structural validation applied between record building and scoring.
//!
//! A failing record is dropped from the batch with its reasons collected for
//! the run summary; validation never raises to the caller.

use chrono::{Datelike, NaiveDate};

use super::domain::PropertyRecord;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("missing parcel_id")]
    MissingParcelId,
    #[error("missing address")]
    MissingAddress,
    #[error("missing ZIP code")]
    MissingZip,
    #[error("malformed ZIP code '{0}'")]
    MalformedZip(String),
    #[error("negative purchase price {0}")]
    NegativePurchasePrice(f64),
    #[error("negative assessed value {0}")]
    NegativeAssessedValue(f64),
    #[error("implausible year_built {0}")]
    ImplausibleYearBuilt(i32),
}

/// Check the invariants a record must satisfy before scoring. All issues are
/// reported at once so a bad source row is diagnosable in one pass.
pub fn validate(record: &PropertyRecord, today: NaiveDate) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if record.parcel_id.is_empty() {
        issues.push(ValidationIssue::MissingParcelId);
    }
    if record.address.is_empty() {
        issues.push(ValidationIssue::MissingAddress);
    }
    if record.zip.is_empty() {
        issues.push(ValidationIssue::MissingZip);
    } else if record.zip.len() != 5 || !record.zip.bytes().all(|b| b.is_ascii_digit()) {
        issues.push(ValidationIssue::MalformedZip(record.zip.clone()));
    }

    if record.purchase_price < 0.0 {
        issues.push(ValidationIssue::NegativePurchasePrice(record.purchase_price));
    }
    if record.assessed_value < 0.0 {
        issues.push(ValidationIssue::NegativeAssessedValue(record.assessed_value));
    }

    if let Some(year_built) = record.year_built {
        if year_built < 1800 || year_built > today.year() + 1 {
            issues.push(ValidationIssue::ImplausibleYearBuilt(year_built));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::leads::builder::build_record;
    use crate::leads::domain::RawPropertyFields;

    fn record() -> PropertyRecord {
        let raw = RawPropertyFields {
            parcel_id: "010-1".to_string(),
            address: "1 Elm St".to_string(),
            city: "Columbus".to_string(),
            zip: "43215".to_string(),
            county: "Franklin".to_string(),
            ..RawPropertyFields::default()
        };
        build_record(&raw, &ScoringConfig::default(), today())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn valid_record_passes() {
        assert!(validate(&record(), today()).is_ok());
    }

    #[test]
    fn missing_identity_fields_are_all_reported() {
        let mut record = record();
        record.parcel_id.clear();
        record.address.clear();
        record.zip.clear();

        let issues = validate(&record, today()).unwrap_err();
        assert_eq!(
            issues,
            vec![
                ValidationIssue::MissingParcelId,
                ValidationIssue::MissingAddress,
                ValidationIssue::MissingZip,
            ]
        );
    }

    #[test]
    fn malformed_zip_is_rejected() {
        let mut record = record();
        record.zip = "4321A".to_string();
        let issues = validate(&record, today()).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::MalformedZip("4321A".to_string())]);
    }

    #[test]
    fn negative_money_and_implausible_year_are_rejected() {
        let mut record = record();
        record.purchase_price = -1.0;
        record.assessed_value = -50.0;
        record.year_built = Some(1750);

        let issues = validate(&record, today()).unwrap_err();
        assert!(issues.contains(&ValidationIssue::NegativePurchasePrice(-1.0)));
        assert!(issues.contains(&ValidationIssue::NegativeAssessedValue(-50.0)));
        assert!(issues.contains(&ValidationIssue::ImplausibleYearBuilt(1750)));
    }

    #[test]
    fn next_year_construction_is_plausible() {
        let mut record = record();
        record.year_built = Some(2026);
        assert!(validate(&record, today()).is_ok());

        record.year_built = Some(2027);
        assert!(validate(&record, today()).is_err());
    }
}
