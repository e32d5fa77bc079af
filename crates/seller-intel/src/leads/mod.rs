//! Lead-scoring pipeline: normalization, record building, validation,
//! scoring, and neighborhood aggregation.

pub mod builder;
pub mod domain;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod service_area;
pub mod stats;
pub mod validate;

pub use builder::build_record;
pub use domain::{
    NeighborhoodStats, PriorityTier, PropertyRecord, RawPropertyFields, RunStatus, RunSummary,
};
pub use ingest::{CountySource, CsvCountySource, IngestError};
pub use pipeline::{
    memory::InMemoryLeadStore, persist_output, LeadPipeline, LeadStore, PipelineOutput,
    RunLogEntry, StoreError,
};
pub use scoring::{ScoreComponent, ScoreFactor, ScoringEngine, ScoringError, ScoringOutcome};
pub use service_area::{classify_service_area, map_city_to_neighborhood, ServiceAreaClass};
pub use validate::{validate, ValidationIssue};
