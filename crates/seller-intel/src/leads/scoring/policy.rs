//! Tier determination: score thresholds plus the eligibility floors.

use crate::config::ScoringConfig;
use crate::leads::domain::{PriorityTier, PropertyRecord};

/// Map a propensity score to a tier using the configured thresholds.
pub fn tier_for_score(propensity_score: u8, config: &ScoringConfig) -> PriorityTier {
    if propensity_score >= config.hot_threshold {
        PriorityTier::Hot
    } else if propensity_score >= config.warm_threshold {
        PriorityTier::Warm
    } else {
        PriorityTier::Cold
    }
}

/// Final tier decision. Records under the minimum tenure or minimum equity
/// floors are forced COLD no matter what they scored; the floors gate
/// eligibility for outreach, they are not score inputs.
pub fn decide_tier(record: &PropertyRecord, propensity_score: u8, config: &ScoringConfig) -> PriorityTier {
    if record.years_owned < config.min_years_owned || record.estimated_equity < config.min_equity {
        return PriorityTier::Cold;
    }

    tier_for_score(propensity_score, config)
}
