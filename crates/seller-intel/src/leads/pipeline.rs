//! Two-pass scoring pipeline and the persistence seam.
//!
//! Raw records flow build -> validate -> aggregate -> score -> re-aggregate.
//! The first aggregation seeds the turnover sub-score before any scores
//! exist; the second produces the published stats. Everything is sequential
//! and in-memory: the pipeline receives a fully-materialized batch and
//! returns a fully-materialized result.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::builder::build_record;
use super::domain::{
    NeighborhoodStats, PriorityTier, PropertyRecord, RawPropertyFields, RunStatus, RunSummary,
};
use super::scoring::ScoringEngine;
use super::stats::aggregate;
use super::validate::validate;
use crate::config::ScoringConfig;

/// Everything a scoring run produces for downstream persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Full scored batch for the master store (upsert by parcel_id).
    pub records: Vec<PropertyRecord>,
    /// HOT subset, propensity descending.
    pub hot_leads: Vec<PropertyRecord>,
    /// WARM subset, propensity descending.
    pub warm_leads: Vec<PropertyRecord>,
    /// Final per-ZIP stats (full-replace semantics downstream).
    pub neighborhood_stats: Vec<NeighborhoodStats>,
    pub summary: RunSummary,
}

/// The scoring pipeline: pure computation over an in-memory batch.
pub struct LeadPipeline {
    config: ScoringConfig,
}

impl LeadPipeline {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Run the full pipeline over a raw batch. Individual record failures
    /// (validation drops, scoring errors) downgrade the run to `partial`
    /// but never abort it.
    pub fn run(&self, raw_records: Vec<RawPropertyFields>, today: NaiveDate) -> PipelineOutput {
        let started = Instant::now();
        let input_count = raw_records.len();
        let mut errors = Vec::new();

        tracing::info!(records = input_count, "starting scoring run");

        let mut records = Vec::with_capacity(input_count);
        for raw in &raw_records {
            let record = build_record(raw, &self.config, today);
            match validate(&record, today) {
                Ok(()) => records.push(record),
                Err(issues) => {
                    let reasons = issues
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    tracing::warn!(parcel_id = %record.parcel_id, reasons = %reasons, "dropping invalid record");
                    errors.push(format!(
                        "Validation failed for {}: {reasons}",
                        display_parcel(&record.parcel_id)
                    ));
                }
            }
        }

        // Pass 1: preliminary stats so turnover can feed the propensity
        // score. Slightly stale by construction; replaced below.
        let preliminary_stats = aggregate(&records, today);

        let engine = ScoringEngine::new(&self.config, &preliminary_stats);
        let (scored, scoring_errors) = engine.score_batch(records, today);
        errors.extend(scoring_errors);

        // Pass 2: published stats, now including tiers and score averages.
        let final_stats = aggregate(&scored, today);

        let hot_leads = tier_subset(&scored, PriorityTier::Hot);
        let warm_leads = tier_subset(&scored, PriorityTier::Warm);

        tracing::info!(
            hot = hot_leads.len(),
            warm = warm_leads.len(),
            cold = scored.len() - hot_leads.len() - warm_leads.len(),
            "scoring complete"
        );

        let status = if scored.is_empty() && input_count > 0 {
            RunStatus::Error
        } else if errors.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Partial
        };

        let summary = RunSummary {
            status,
            records_processed: scored.len(),
            hot_leads: hot_leads.len(),
            warm_leads: warm_leads.len(),
            neighborhoods: final_stats.len(),
            duration_seconds: started.elapsed().as_secs_f64(),
            errors,
        };

        PipelineOutput {
            records: scored,
            hot_leads,
            warm_leads,
            neighborhood_stats: sorted_stats(final_stats),
            summary,
        }
    }
}

fn display_parcel(parcel_id: &str) -> &str {
    if parcel_id.is_empty() {
        "<missing parcel_id>"
    } else {
        parcel_id
    }
}

fn tier_subset(records: &[PropertyRecord], tier: PriorityTier) -> Vec<PropertyRecord> {
    let mut subset: Vec<PropertyRecord> = records
        .iter()
        .filter(|record| record.priority_tier == Some(tier))
        .cloned()
        .collect();

    subset.sort_by(|a, b| {
        b.propensity_score
            .cmp(&a.propensity_score)
            .then_with(|| a.parcel_id.cmp(&b.parcel_id))
    });
    subset
}

fn sorted_stats(stats: HashMap<String, NeighborhoodStats>) -> Vec<NeighborhoodStats> {
    let mut list: Vec<NeighborhoodStats> = stats.into_values().collect();
    list.sort_by(|a, b| a.zip.cmp(&b.zip));
    list
}

/// Entry appended to the run log after every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub job: String,
    pub status: RunStatus,
    pub records_processed: usize,
    pub error_digest: String,
    pub logged_at: DateTime<Utc>,
}

/// Persistence seam for scored output. The production implementation is the
/// spreadsheet transport living outside this crate; tests and dry runs use
/// the in-memory store.
pub trait LeadStore: Send + Sync {
    fn upsert_master(&self, records: &[PropertyRecord]) -> Result<(), StoreError>;
    fn replace_hot_leads(&self, records: &[PropertyRecord]) -> Result<(), StoreError>;
    fn replace_warm_leads(&self, records: &[PropertyRecord]) -> Result<(), StoreError>;
    fn replace_neighborhood_stats(&self, stats: &[NeighborhoodStats]) -> Result<(), StoreError>;
    fn append_run_log(&self, entry: &RunLogEntry) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("lead store unavailable: {0}")]
    Unavailable(String),
}

/// Persist a run and append the run log. Store failures are folded into the
/// returned summary rather than raised; losing one write should not lose
/// the whole run report.
pub fn persist_output(
    output: &PipelineOutput,
    store: &dyn LeadStore,
    job: &str,
) -> RunSummary {
    let mut summary = output.summary.clone();

    let writes: [(&str, Result<(), StoreError>); 4] = [
        ("master", store.upsert_master(&output.records)),
        ("hot leads", store.replace_hot_leads(&output.hot_leads)),
        ("warm leads", store.replace_warm_leads(&output.warm_leads)),
        (
            "neighborhood stats",
            store.replace_neighborhood_stats(&output.neighborhood_stats),
        ),
    ];

    for (target, result) in writes {
        if let Err(err) = result {
            tracing::error!(target, error = %err, "failed to persist scoring output");
            summary.errors.push(format!("Failed to write {target}: {err}"));
        }
    }

    if !summary.errors.is_empty() && summary.status == RunStatus::Success {
        summary.status = RunStatus::Partial;
    }

    let entry = RunLogEntry {
        job: job.to_string(),
        status: summary.status,
        records_processed: summary.records_processed,
        error_digest: summary.error_digest(),
        logged_at: Utc::now(),
    };

    if let Err(err) = store.append_run_log(&entry) {
        tracing::error!(error = %err, "failed to append run log");
    }

    summary
}

pub mod memory {
    //! In-memory [`LeadStore`] used by tests and CLI dry runs.

    use std::sync::Mutex;

    use super::{LeadStore, RunLogEntry, StoreError};
    use crate::leads::domain::{NeighborhoodStats, PropertyRecord};

    #[derive(Debug, Default)]
    pub struct InMemoryLeadStore {
        inner: Mutex<Inner>,
    }

    #[derive(Debug, Default)]
    struct Inner {
        master: Vec<PropertyRecord>,
        hot_leads: Vec<PropertyRecord>,
        warm_leads: Vec<PropertyRecord>,
        neighborhood_stats: Vec<NeighborhoodStats>,
        run_log: Vec<RunLogEntry>,
    }

    impl InMemoryLeadStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn master(&self) -> Vec<PropertyRecord> {
            self.inner.lock().expect("store poisoned").master.clone()
        }

        pub fn hot_leads(&self) -> Vec<PropertyRecord> {
            self.inner.lock().expect("store poisoned").hot_leads.clone()
        }

        pub fn warm_leads(&self) -> Vec<PropertyRecord> {
            self.inner.lock().expect("store poisoned").warm_leads.clone()
        }

        pub fn neighborhood_stats(&self) -> Vec<NeighborhoodStats> {
            self.inner
                .lock()
                .expect("store poisoned")
                .neighborhood_stats
                .clone()
        }

        pub fn run_log(&self) -> Vec<RunLogEntry> {
            self.inner.lock().expect("store poisoned").run_log.clone()
        }
    }

    impl LeadStore for InMemoryLeadStore {
        fn upsert_master(&self, records: &[PropertyRecord]) -> Result<(), StoreError> {
            let mut inner = self.inner.lock().expect("store poisoned");
            for record in records {
                match inner
                    .master
                    .iter_mut()
                    .find(|existing| existing.parcel_id == record.parcel_id)
                {
                    Some(existing) => *existing = record.clone(),
                    None => inner.master.push(record.clone()),
                }
            }
            Ok(())
        }

        fn replace_hot_leads(&self, records: &[PropertyRecord]) -> Result<(), StoreError> {
            self.inner.lock().expect("store poisoned").hot_leads = records.to_vec();
            Ok(())
        }

        fn replace_warm_leads(&self, records: &[PropertyRecord]) -> Result<(), StoreError> {
            self.inner.lock().expect("store poisoned").warm_leads = records.to_vec();
            Ok(())
        }

        fn replace_neighborhood_stats(
            &self,
            stats: &[NeighborhoodStats],
        ) -> Result<(), StoreError> {
            self.inner.lock().expect("store poisoned").neighborhood_stats = stats.to_vec();
            Ok(())
        }

        fn append_run_log(&self, entry: &RunLogEntry) -> Result<(), StoreError> {
            self.inner
                .lock()
                .expect("store poisoned")
                .run_log
                .push(entry.clone());
            Ok(())
        }
    }
}
