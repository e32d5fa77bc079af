//! Per-ZIP neighborhood rollups.
//!
//! One pass over the batch, grouped by ZIP. The pipeline runs this twice:
//! once before scoring to seed the turnover sub-score and once after scoring
//! so the published stats include tier counts and propensity averages.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use super::domain::{NeighborhoodStats, PriorityTier, PropertyRecord};
use super::normalize::round2;

#[derive(Debug, Default)]
struct ZipAccumulator {
    total_properties: usize,
    years_owned_sum: f64,
    equity_sum: f64,
    propensity_sum: u64,
    hot_count: usize,
    warm_count: usize,
    recent_purchases: usize,
}

/// Aggregate a batch into per-ZIP stats. Records without a ZIP are skipped;
/// they cannot be attributed to a neighborhood.
pub fn aggregate(records: &[PropertyRecord], today: NaiveDate) -> HashMap<String, NeighborhoodStats> {
    let mut by_zip: HashMap<String, ZipAccumulator> = HashMap::new();

    for record in records {
        if record.zip.is_empty() {
            continue;
        }

        let stats = by_zip.entry(record.zip.clone()).or_default();
        stats.total_properties += 1;
        stats.years_owned_sum += record.years_owned;
        stats.equity_sum += record.estimated_equity;

        if let Some(score) = record.propensity_score {
            stats.propensity_sum += u64::from(score);
        }

        match record.priority_tier {
            Some(PriorityTier::Hot) => stats.hot_count += 1,
            Some(PriorityTier::Warm) => stats.warm_count += 1,
            _ => {}
        }

        if let Some(purchased) = record.purchase_date {
            let days_since = (today - purchased).num_days();
            if (0..=365).contains(&days_since) {
                stats.recent_purchases += 1;
            }
        }
    }

    let now = Utc::now();
    by_zip
        .into_iter()
        .map(|(zip, acc)| {
            let total = acc.total_properties as f64;
            let stats = NeighborhoodStats {
                zip: zip.clone(),
                total_properties: acc.total_properties,
                avg_years_owned: round2(acc.years_owned_sum / total),
                avg_equity: round2(acc.equity_sum / total),
                // Averaged over the whole group, not just scored records, so
                // an unscored batch reads as 0 rather than skewing high.
                avg_propensity_score: round2(acc.propensity_sum as f64 / total),
                hot_lead_count: acc.hot_count,
                warm_lead_count: acc.warm_count,
                turnover_rate_12mo: round2(acc.recent_purchases as f64 / total * 100.0),
                last_updated: now,
            };
            (zip, stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(zip: &str, purchased: Option<NaiveDate>) -> PropertyRecord {
        PropertyRecord {
            parcel_id: format!("p-{zip}"),
            address: "1 Elm St".to_string(),
            city: String::new(),
            zip: zip.to_string(),
            county: String::new(),
            neighborhood: String::new(),
            owner_name: String::new(),
            owner_mailing_address: String::new(),
            is_owner_occupied: false,
            purchase_date: purchased,
            purchase_price: 0.0,
            years_owned: 4.0,
            assessed_value: 0.0,
            estimated_market_value: 0.0,
            estimated_equity: 60_000.0,
            equity_gain_pct: 0.0,
            beds: None,
            baths: None,
            sqft: None,
            year_built: None,
            property_class: String::new(),
            propensity_score: None,
            td_fit_score: None,
            priority_tier: None,
            last_updated: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn turnover_counts_trailing_twelve_months() {
        let recent = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let old = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap();

        let mut records = Vec::new();
        for _ in 0..3 {
            records.push(record("43081", Some(recent)));
        }
        for _ in 0..27 {
            records.push(record("43081", Some(old)));
        }

        let stats = aggregate(&records, today());
        let zip_stats = &stats["43081"];
        assert_eq!(zip_stats.total_properties, 30);
        assert_eq!(zip_stats.turnover_rate_12mo, 10.0);
    }

    #[test]
    fn boundary_purchase_exactly_365_days_ago_counts() {
        let boundary = today() - chrono::Duration::days(365);
        let stats = aggregate(&[record("43081", Some(boundary))], today());
        assert_eq!(stats["43081"].turnover_rate_12mo, 100.0);
    }

    #[test]
    fn future_purchase_dates_are_not_recent_sales() {
        let future = today() + chrono::Duration::days(30);
        let stats = aggregate(&[record("43081", Some(future))], today());
        assert_eq!(stats["43081"].turnover_rate_12mo, 0.0);
    }

    #[test]
    fn averages_and_tier_counts() {
        let mut hot = record("43016", None);
        hot.propensity_score = Some(90);
        hot.priority_tier = Some(PriorityTier::Hot);
        let mut warm = record("43016", None);
        warm.propensity_score = Some(60);
        warm.priority_tier = Some(PriorityTier::Warm);

        let stats = aggregate(&[hot, warm], today());
        let zip_stats = &stats["43016"];
        assert_eq!(zip_stats.hot_lead_count, 1);
        assert_eq!(zip_stats.warm_lead_count, 1);
        assert_eq!(zip_stats.avg_propensity_score, 75.0);
        assert_eq!(zip_stats.avg_years_owned, 4.0);
        assert_eq!(zip_stats.avg_equity, 60_000.0);
    }

    #[test]
    fn records_without_zip_are_skipped() {
        let stats = aggregate(&[record("", None)], today());
        assert!(stats.is_empty());
    }
}
