//! Raw record acquisition.
//!
//! County auditor scraping lives outside this crate; anything able to
//! produce [`RawPropertyFields`] can feed the pipeline through the
//! [`CountySource`] trait. The CSV adapter covers exports and fixtures.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use super::domain::RawPropertyFields;

/// Capability every county adapter satisfies. Scoring never knows which
/// county a record came from.
pub trait CountySource {
    /// Human-readable source name for logs and the run summary.
    fn county(&self) -> &str;

    /// Fetch raw records, optionally restricted to one ZIP.
    fn fetch_raw_records(&self, zip: Option<&str>) -> Result<Vec<RawPropertyFields>, IngestError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read county export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid county CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// File-backed source reading a canonical-column CSV export.
pub struct CsvCountySource {
    county: String,
    path: PathBuf,
}

impl CsvCountySource {
    pub fn new<P: AsRef<Path>>(county: impl Into<String>, path: P) -> Self {
        Self {
            county: county.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CountySource for CsvCountySource {
    fn county(&self) -> &str {
        &self.county
    }

    fn fetch_raw_records(&self, zip: Option<&str>) -> Result<Vec<RawPropertyFields>, IngestError> {
        let file = File::open(&self.path)?;
        let mut records = parse_records(file, &self.county)?;

        if let Some(zip) = zip {
            records.retain(|record| record.zip.trim().starts_with(zip));
        }

        Ok(records)
    }
}

/// Parse canonical-column CSV into raw fields. Blank cells become `None` so
/// the record builder can distinguish absent from zero where it matters.
pub fn parse_records<R: Read>(reader: R, county: &str) -> Result<Vec<RawPropertyFields>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<CsvRow>() {
        let row = row?;
        records.push(row.into_raw_fields(county));
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    parcel_id: String,
    address: String,
    city: String,
    zip: String,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    owner_name: Option<String>,
    #[serde(default)]
    owner_mailing_address: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    purchase_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    purchase_price: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    assessed_value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    beds: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    baths: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sqft: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    year_built: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    property_class: Option<String>,
}

impl CsvRow {
    fn into_raw_fields(self, fallback_county: &str) -> RawPropertyFields {
        RawPropertyFields {
            parcel_id: self.parcel_id,
            address: self.address,
            city: self.city,
            zip: self.zip,
            county: self
                .county
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| fallback_county.to_string()),
            owner_name: self.owner_name.unwrap_or_default(),
            owner_mailing_address: self.owner_mailing_address.unwrap_or_default(),
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            assessed_value: self.assessed_value,
            beds: self.beds,
            baths: self.baths,
            sqft: self.sqft,
            year_built: self.year_built,
            property_class: self.property_class,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
