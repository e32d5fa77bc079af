//! Step functions producing the per-factor sub-scores.
//!
//! Each factor maps to a small set of plateaus rather than a continuous
//! curve so an agent can read a score back to a bucket boundary.

use crate::config::ScoringConfig;
use crate::leads::service_area::ServiceAreaClass;

/// Ownership tenure. The 5-10 year window is the prime moving window;
/// very recent buyers and very settled owners both score low.
pub(crate) fn years_owned_score(years_owned: f64) -> u8 {
    if years_owned < 0.0 {
        0
    } else if years_owned < 2.0 {
        10
    } else if years_owned < 4.0 {
        40
    } else if years_owned < 7.0 {
        80
    } else if years_owned < 10.0 {
        100
    } else if years_owned < 15.0 {
        70
    } else if years_owned < 20.0 {
        50
    } else {
        40
    }
}

/// Paper gains motivate sellers; owners past +100% may hold for more.
pub(crate) fn equity_gain_score(equity_gain_pct: f64) -> u8 {
    if equity_gain_pct < 10.0 {
        10
    } else if equity_gain_pct < 25.0 {
        40
    } else if equity_gain_pct < 50.0 {
        70
    } else if equity_gain_pct <= 100.0 {
        100
    } else {
        85
    }
}

/// Neighborhood turnover as a 12-month percentage. `None` means the ZIP has
/// no stats yet and lands on the neutral midpoint.
pub(crate) fn turnover_score(turnover_rate_12mo: Option<f64>) -> u8 {
    let Some(rate) = turnover_rate_12mo else {
        return 50;
    };

    if rate < 3.0 {
        30
    } else if rate < 5.0 {
        50
    } else if rate < 8.0 {
        75
    } else if rate <= 12.0 {
        100
    } else {
        90
    }
}

/// Absentee owners are the more willing sellers, so they score higher here
/// even though owner-occupiers are the better customer fit.
pub(crate) fn owner_occupied_score(is_owner_occupied: bool) -> u8 {
    if is_owner_occupied {
        70
    } else {
        90
    }
}

/// Alignment with the configured target price band.
pub(crate) fn price_tier_score(market_value: f64, config: &ScoringConfig) -> u8 {
    if market_value < config.target_price_min {
        50
    } else if market_value <= config.target_price_max {
        100
    } else {
        60
    }
}

/// Home age by construction year. Mid-age homes tend to need updates that
/// motivate a sale.
pub(crate) fn home_age_score(year_built: Option<i32>, current_year: i32) -> u8 {
    let Some(year_built) = year_built.filter(|year| *year > 0) else {
        return 50;
    };

    let age = current_year - year_built;
    if age < 5 {
        40
    } else if age < 15 {
        70
    } else if age < 30 {
        90
    } else if age < 50 {
        80
    } else {
        60
    }
}

/// TD-Fit equity bucket: higher absolute equity means larger savings under a
/// 1% listing commission.
pub(crate) fn equity_position_fit(estimated_equity: f64) -> u8 {
    if estimated_equity < 50_000.0 {
        40
    } else if estimated_equity < 100_000.0 {
        70
    } else if estimated_equity < 200_000.0 {
        90
    } else {
        100
    }
}

/// TD-Fit occupancy: the primary customer is a homeowner, inverting the
/// propensity reading of the same flag.
pub(crate) fn owner_occupied_fit(is_owner_occupied: bool) -> u8 {
    if is_owner_occupied {
        100
    } else {
        60
    }
}

/// TD-Fit geography by service-area classification.
pub(crate) fn service_area_fit(class: ServiceAreaClass) -> u8 {
    match class {
        ServiceAreaClass::Primary => 100,
        ServiceAreaClass::Adjacent => 70,
        ServiceAreaClass::Other => 40,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_owned_buckets() {
        assert_eq!(years_owned_score(-1.0), 0);
        assert_eq!(years_owned_score(0.5), 10);
        assert_eq!(years_owned_score(3.0), 40);
        assert_eq!(years_owned_score(6.0), 80);
        assert_eq!(years_owned_score(8.0), 100);
        assert_eq!(years_owned_score(12.0), 70);
        assert_eq!(years_owned_score(17.0), 50);
        assert_eq!(years_owned_score(25.0), 40);
    }

    #[test]
    fn equity_gain_buckets() {
        assert_eq!(equity_gain_score(-5.0), 10);
        assert_eq!(equity_gain_score(5.0), 10);
        assert_eq!(equity_gain_score(20.0), 40);
        assert_eq!(equity_gain_score(40.0), 70);
        assert_eq!(equity_gain_score(100.0), 100);
        assert_eq!(equity_gain_score(150.0), 85);
    }

    #[test]
    fn turnover_buckets_include_upper_boundary() {
        assert_eq!(turnover_score(None), 50);
        assert_eq!(turnover_score(Some(2.0)), 30);
        assert_eq!(turnover_score(Some(4.0)), 50);
        assert_eq!(turnover_score(Some(6.0)), 75);
        assert_eq!(turnover_score(Some(10.0)), 100);
        assert_eq!(turnover_score(Some(12.0)), 100);
        assert_eq!(turnover_score(Some(12.5)), 90);
    }

    #[test]
    fn occupancy_readings_invert_between_scores() {
        assert_eq!(owner_occupied_score(true), 70);
        assert_eq!(owner_occupied_score(false), 90);
        assert_eq!(owner_occupied_fit(true), 100);
        assert_eq!(owner_occupied_fit(false), 60);
    }

    #[test]
    fn price_tier_follows_config_band() {
        let config = crate::config::ScoringConfig::default();
        assert_eq!(price_tier_score(150_000.0, &config), 50);
        assert_eq!(price_tier_score(200_000.0, &config), 100);
        assert_eq!(price_tier_score(750_000.0, &config), 100);
        assert_eq!(price_tier_score(800_000.0, &config), 60);
    }

    #[test]
    fn home_age_buckets() {
        assert_eq!(home_age_score(None, 2025), 50);
        assert_eq!(home_age_score(Some(0), 2025), 50);
        assert_eq!(home_age_score(Some(2023), 2025), 40);
        assert_eq!(home_age_score(Some(2015), 2025), 70);
        assert_eq!(home_age_score(Some(2005), 2025), 90);
        assert_eq!(home_age_score(Some(1980), 2025), 80);
        assert_eq!(home_age_score(Some(1950), 2025), 60);
    }

    #[test]
    fn equity_fit_buckets() {
        assert_eq!(equity_position_fit(30_000.0), 40);
        assert_eq!(equity_position_fit(75_000.0), 70);
        assert_eq!(equity_position_fit(150_000.0), 90);
        assert_eq!(equity_position_fit(250_000.0), 100);
    }
}
