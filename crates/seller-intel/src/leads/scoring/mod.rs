//! Propensity and TD-Fit scoring.
//!
//! The engine is stateless apart from the config reference and the turnover
//! rates seeded from the first aggregation pass; scoring the same batch with
//! the same config and date is fully reproducible.

mod policy;
mod rules;

pub use policy::{decide_tier, tier_for_score};

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{NeighborhoodStats, PriorityTier, PropertyRecord};
use super::service_area::classify_service_area;
use crate::config::ScoringConfig;

/// TD-Fit factor weights. Fixed by the customer-profile definition, not
/// exposed through [`ScoringConfig`].
const TD_FIT_PRICE_WEIGHT: f64 = 0.25;
const TD_FIT_EQUITY_WEIGHT: f64 = 0.35;
const TD_FIT_OCCUPANCY_WEIGHT: f64 = 0.20;
const TD_FIT_SERVICE_AREA_WEIGHT: f64 = 0.20;

/// Factors contributing to either composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    YearsOwned,
    EquityGain,
    NeighborhoodTurnover,
    OwnerOccupied,
    PriceTier,
    HomeAge,
    EquityPosition,
    OwnerOccupiedFit,
    ServiceArea,
}

/// Discrete contribution to a composite score, kept for audits so an agent
/// can see why a parcel landed where it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: u8,
    pub weight: f64,
}

/// Scoring output for a single parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub parcel_id: String,
    pub propensity_score: u8,
    pub td_fit_score: u8,
    pub priority_tier: PriorityTier,
    pub propensity_components: Vec<ScoreComponent>,
    pub td_fit_components: Vec<ScoreComponent>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("non-finite {field} ({value})")]
    NonFiniteInput { field: &'static str, value: f64 },
}

/// Engine combining the per-factor rules into the two composite scores.
pub struct ScoringEngine<'a> {
    config: &'a ScoringConfig,
    turnover_by_zip: HashMap<String, f64>,
}

impl<'a> ScoringEngine<'a> {
    /// Build an engine over preliminary neighborhood stats. Stats come from
    /// the first aggregation pass and may be slightly stale relative to the
    /// scores being computed; that is the accepted resolution of the
    /// turnover-feeds-propensity cycle.
    pub fn new(config: &'a ScoringConfig, stats: &HashMap<String, NeighborhoodStats>) -> Self {
        let turnover_by_zip = stats
            .iter()
            .map(|(zip, stat)| (zip.clone(), stat.turnover_rate_12mo))
            .collect();

        Self {
            config,
            turnover_by_zip,
        }
    }

    /// Score every record in the batch in place. Records that fail scoring
    /// are dropped from the output and reported as error strings; one bad
    /// parcel never halts the batch.
    pub fn score_batch(
        &self,
        records: Vec<PropertyRecord>,
        today: NaiveDate,
    ) -> (Vec<PropertyRecord>, Vec<String>) {
        let mut scored = Vec::with_capacity(records.len());
        let mut errors = Vec::new();

        for mut record in records {
            match self.score_record(&record, today) {
                Ok(outcome) => {
                    record.propensity_score = Some(outcome.propensity_score);
                    record.td_fit_score = Some(outcome.td_fit_score);
                    record.priority_tier = Some(outcome.priority_tier);
                    record.last_updated = Utc::now();
                    scored.push(record);
                }
                Err(err) => {
                    tracing::warn!(parcel_id = %record.parcel_id, error = %err, "failed to score property");
                    errors.push(format!("Scoring failed for {}: {err}", record.parcel_id));
                }
            }
        }

        (scored, errors)
    }

    /// Compute both composite scores and the tier for one record.
    pub fn score_record(
        &self,
        record: &PropertyRecord,
        today: NaiveDate,
    ) -> Result<ScoringOutcome, ScoringError> {
        check_finite("years_owned", record.years_owned)?;
        check_finite("equity_gain_pct", record.equity_gain_pct)?;
        check_finite("estimated_market_value", record.estimated_market_value)?;
        check_finite("estimated_equity", record.estimated_equity)?;

        let propensity_components = self.propensity_components(record, today);
        let propensity_score = weighted_total(&propensity_components);

        let td_fit_components = self.td_fit_components(record);
        let td_fit_score = weighted_total(&td_fit_components);

        let priority_tier = policy::decide_tier(record, propensity_score, self.config);

        Ok(ScoringOutcome {
            parcel_id: record.parcel_id.clone(),
            propensity_score,
            td_fit_score,
            priority_tier,
            propensity_components,
            td_fit_components,
        })
    }

    fn propensity_components(&self, record: &PropertyRecord, today: NaiveDate) -> Vec<ScoreComponent> {
        let turnover = self.turnover_by_zip.get(&record.zip).copied();

        vec![
            ScoreComponent {
                factor: ScoreFactor::YearsOwned,
                score: rules::years_owned_score(record.years_owned),
                weight: self.config.weight_years_owned,
            },
            ScoreComponent {
                factor: ScoreFactor::EquityGain,
                score: rules::equity_gain_score(record.equity_gain_pct),
                weight: self.config.weight_equity_gain,
            },
            ScoreComponent {
                factor: ScoreFactor::NeighborhoodTurnover,
                score: rules::turnover_score(turnover),
                weight: self.config.weight_neighborhood_turnover,
            },
            ScoreComponent {
                factor: ScoreFactor::OwnerOccupied,
                score: rules::owner_occupied_score(record.is_owner_occupied),
                weight: self.config.weight_owner_occupied,
            },
            ScoreComponent {
                factor: ScoreFactor::PriceTier,
                score: rules::price_tier_score(record.estimated_market_value, self.config),
                weight: self.config.weight_price_tier,
            },
            ScoreComponent {
                factor: ScoreFactor::HomeAge,
                score: rules::home_age_score(record.year_built, today.year()),
                weight: self.config.weight_home_age,
            },
        ]
    }

    fn td_fit_components(&self, record: &PropertyRecord) -> Vec<ScoreComponent> {
        vec![
            ScoreComponent {
                factor: ScoreFactor::PriceTier,
                score: rules::price_tier_score(record.estimated_market_value, self.config),
                weight: TD_FIT_PRICE_WEIGHT,
            },
            ScoreComponent {
                factor: ScoreFactor::EquityPosition,
                score: rules::equity_position_fit(record.estimated_equity),
                weight: TD_FIT_EQUITY_WEIGHT,
            },
            ScoreComponent {
                factor: ScoreFactor::OwnerOccupiedFit,
                score: rules::owner_occupied_fit(record.is_owner_occupied),
                weight: TD_FIT_OCCUPANCY_WEIGHT,
            },
            ScoreComponent {
                factor: ScoreFactor::ServiceArea,
                score: rules::service_area_fit(classify_service_area(&record.zip)),
                weight: TD_FIT_SERVICE_AREA_WEIGHT,
            },
        ]
    }
}

fn weighted_total(components: &[ScoreComponent]) -> u8 {
    let total: f64 = components
        .iter()
        .map(|component| f64::from(component.score) * component.weight)
        .sum();

    total.round().clamp(0.0, 100.0) as u8
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ScoringError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScoringError::NonFiniteInput { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> PropertyRecord {
        PropertyRecord {
            parcel_id: "010-9".to_string(),
            address: "9 Oak Dr".to_string(),
            city: "Westerville".to_string(),
            zip: "43081".to_string(),
            county: "Franklin".to_string(),
            neighborhood: "Westerville".to_string(),
            owner_name: String::new(),
            owner_mailing_address: String::new(),
            is_owner_occupied: false,
            purchase_date: None,
            purchase_price: 250_000.0,
            years_owned: 6.0,
            assessed_value: 318_000.0,
            estimated_market_value: 350_000.0,
            estimated_equity: 100_000.0,
            equity_gain_pct: 40.0,
            beds: None,
            baths: None,
            sqft: None,
            year_built: Some(2005),
            property_class: String::new(),
            propensity_score: None,
            td_fit_score: None,
            priority_tier: None,
            last_updated: Utc::now(),
        }
    }

    fn stats_with_turnover(zip: &str, rate: f64) -> HashMap<String, NeighborhoodStats> {
        let mut stats = HashMap::new();
        stats.insert(
            zip.to_string(),
            NeighborhoodStats {
                zip: zip.to_string(),
                total_properties: 50,
                avg_years_owned: 7.5,
                avg_equity: 80_000.0,
                avg_propensity_score: 0.0,
                hot_lead_count: 0,
                warm_lead_count: 0,
                turnover_rate_12mo: rate,
                last_updated: Utc::now(),
            },
        );
        stats
    }

    #[test]
    fn default_weight_scenario_scores_eighty_two() {
        // Sub-scores: tenure 80, equity gain 70, turnover 75, absentee 90,
        // price band 100, home age 90 under the default weights.
        let config = ScoringConfig::default();
        let stats = stats_with_turnover("43081", 6.0);
        let engine = ScoringEngine::new(&config, &stats);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let outcome = engine.score_record(&record(), today).unwrap();
        assert_eq!(outcome.propensity_score, 82);
        assert_eq!(outcome.priority_tier, PriorityTier::Hot);
    }

    #[test]
    fn unknown_zip_takes_neutral_turnover() {
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&config, &HashMap::new());
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let outcome = engine.score_record(&record(), today).unwrap();
        let turnover = outcome
            .propensity_components
            .iter()
            .find(|component| component.factor == ScoreFactor::NeighborhoodTurnover)
            .unwrap();
        assert_eq!(turnover.score, 50);
    }

    #[test]
    fn td_fit_uses_fixed_weights() {
        // price 100 * .25 + equity 90 * .35 + absentee 60 * .20 +
        // primary zip 100 * .20 = 88.5 -> 89
        let config = ScoringConfig::default();
        let stats = stats_with_turnover("43081", 6.0);
        let engine = ScoringEngine::new(&config, &stats);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let outcome = engine.score_record(&record(), today).unwrap();
        assert_eq!(outcome.td_fit_score, 89);
    }

    #[test]
    fn non_finite_input_is_reported_not_panicked() {
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&config, &HashMap::new());
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let mut bad = record();
        bad.equity_gain_pct = f64::NAN;
        let err = engine.score_record(&bad, today).unwrap_err();
        assert!(err.to_string().contains("equity_gain_pct"));
    }

    #[test]
    fn batch_scoring_drops_only_failing_records() {
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&config, &HashMap::new());
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let good = record();
        let mut bad = record();
        bad.parcel_id = "010-bad".to_string();
        bad.years_owned = f64::INFINITY;

        let (scored, errors) = engine.score_batch(vec![good, bad], today);
        assert_eq!(scored.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("010-bad"));
    }

    #[test]
    fn overweighted_config_is_clamped_to_one_hundred() {
        // Weight sums above 1.0 are allowed by the config contract; the
        // composite is clamped rather than rejected.
        let mut config = ScoringConfig::default();
        config.weight_years_owned = 1.0;
        config.weight_equity_gain = 1.0;
        let stats = stats_with_turnover("43081", 6.0);
        let engine = ScoringEngine::new(&config, &stats);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let outcome = engine.score_record(&record(), today).unwrap();
        assert_eq!(outcome.propensity_score, 100);
    }
}
