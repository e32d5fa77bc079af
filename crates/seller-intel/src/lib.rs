//! Lead-scoring core for the TD Realty seller-intelligence suite.
//!
//! Consumes raw county assessor records, derives canonical property records,
//! scores each for propensity-to-sell and target-customer fit, tiers them
//! for outreach, and aggregates per-ZIP neighborhood statistics.

pub mod config;
pub mod error;
pub mod leads;
pub mod telemetry;
