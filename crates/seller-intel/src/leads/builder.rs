//! Assembles canonical [`PropertyRecord`]s from raw county fields.
//!
//! Derived fields are computed in a fixed order because later steps read
//! earlier ones: purchase date, then years owned, then market value, then
//! equity, then neighborhood, then owner occupancy.

use chrono::{NaiveDate, Utc};

use super::domain::{PropertyRecord, RawPropertyFields};
use super::normalize::{
    self, parse_currency, parse_date, parse_int, parse_number, round2, years_owned,
};
use super::service_area::map_city_to_neighborhood;
use crate::config::ScoringConfig;

/// Similarity floor for the mailing-address comparison. Below this, the
/// owner is treated as absentee.
pub const OWNER_OCCUPIED_THRESHOLD: f64 = 0.85;

/// Build a property record from adapter output. `today` is explicit so the
/// derived fields are reproducible in tests and backfills.
pub fn build_record(raw: &RawPropertyFields, config: &ScoringConfig, today: NaiveDate) -> PropertyRecord {
    let purchase_date = raw.purchase_date.as_deref().and_then(parse_date);
    let years_owned = years_owned(purchase_date, today);

    let purchase_price = raw.purchase_price.as_deref().map_or(0.0, parse_currency);
    let assessed_value = raw.assessed_value.as_deref().map_or(0.0, parse_currency);
    let estimated_market_value = round2(assessed_value * config.market_value_multiplier);

    let (estimated_equity, equity_gain_pct) = equity(estimated_market_value, purchase_price);

    let zip = clean_zip(&raw.zip);
    let neighborhood = map_city_to_neighborhood(&raw.city, &zip);
    let is_owner_occupied = normalize::is_owner_occupied(
        &raw.address,
        &raw.owner_mailing_address,
        OWNER_OCCUPIED_THRESHOLD,
    );

    PropertyRecord {
        parcel_id: raw.parcel_id.trim().to_string(),
        address: raw.address.trim().to_string(),
        city: raw.city.trim().to_string(),
        zip,
        county: raw.county.trim().to_string(),
        neighborhood,
        owner_name: raw.owner_name.trim().to_string(),
        owner_mailing_address: raw.owner_mailing_address.trim().to_string(),
        is_owner_occupied,
        purchase_date,
        purchase_price,
        years_owned,
        assessed_value,
        estimated_market_value,
        estimated_equity,
        equity_gain_pct,
        beds: raw.beds.as_deref().and_then(parse_int),
        baths: raw.baths.as_deref().and_then(parse_number),
        sqft: raw.sqft.as_deref().and_then(parse_int),
        year_built: raw
            .year_built
            .as_deref()
            .and_then(parse_int)
            .map(|year| year as i32),
        property_class: raw
            .property_class
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        propensity_score: None,
        td_fit_score: None,
        priority_tier: None,
        last_updated: Utc::now(),
    }
}

/// Estimated equity and gain percentage. A zero or absent purchase price
/// yields (0.0, 0.0); the division is guarded, not propagated as an error.
fn equity(market_value: f64, purchase_price: f64) -> (f64, f64) {
    if market_value <= 0.0 || purchase_price <= 0.0 {
        return (0.0, 0.0);
    }

    let equity = market_value - purchase_price;
    let gain_pct = equity / purchase_price * 100.0;
    (round2(equity), round2(gain_pct))
}

fn clean_zip(zip: &str) -> String {
    zip.trim().chars().take(5).collect()
}
