//! Salary aggregation and cross-view selection for job-posting dashboards.
//!
//! Raw rows are normalized into [`data::model::JobRecord`]s, invalid ones are
//! dropped by [`data::repository::JobRepository`], and a
//! [`state::Coordinator`] turns region → track selections into the derived
//! views (skill frequency, size buckets, flow graph) that renderers consume.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod ingest;
pub mod state;

pub use config::AtlasConfig;
pub use data::filter::FilterState;
pub use data::model::{JobRecord, Quartile, RegionStatistic, SizeBucket, Skill, Track};
pub use data::repository::JobRepository;
pub use error::IngestError;
pub use state::{Coordinator, SelectionChanged, SelectionEvent};
