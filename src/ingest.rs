//! One-time dataset load behind a timeout.
//!
//! Parsing runs on a blocking worker; the caller awaits it for at most the
//! configured timeout. There is no retry: a load that fails or times out is
//! reported once and the caller decides what to do.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::config::{AtlasConfig, NormalizeConfig};
use crate::data::loader::load_file;
use crate::data::model::RawRow;
use crate::data::normalize::Normalizer;
use crate::data::repository::JobRepository;
use crate::error::{IngestError, IngestResult};

/// Normalize raw rows and build the repository (drops invalid records).
pub fn build_repository(rows: &[RawRow], config: &NormalizeConfig) -> JobRepository {
    let normalizer = Normalizer::new(config.clone());
    JobRepository::from_records(normalizer.normalize_all(rows))
}

/// Load, normalize and validate a dataset file synchronously.
pub fn load_repository(path: &Path, config: &NormalizeConfig) -> Result<JobRepository> {
    let rows = load_file(path)?;
    log::debug!("Read {} raw rows from {}", rows.len(), path.display());
    Ok(build_repository(&rows, config))
}

/// A dataset load in flight.
pub struct PendingDataset {
    origin: String,
    handle: JoinHandle<Result<JobRepository>>,
}

impl PendingDataset {
    /// Start loading `path` on a blocking worker. Must be called inside a
    /// Tokio runtime.
    pub fn spawn(path: impl Into<PathBuf>, config: NormalizeConfig) -> Self {
        let path = path.into();
        let origin = path.display().to_string();
        Self::spawn_with(origin, move || load_repository(&path, &config))
    }

    /// Run an arbitrary loader on a blocking worker.
    pub fn spawn_with<F>(origin: impl Into<String>, load: F) -> Self
    where
        F: FnOnce() -> Result<JobRepository> + Send + 'static,
    {
        let origin = origin.into();
        log::info!("Loading dataset {origin}");
        Self {
            origin,
            handle: tokio::task::spawn_blocking(load),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Wait for the load to finish, giving up after `timeout`.
    pub async fn wait(self, timeout: Duration) -> IngestResult<JobRepository> {
        let Self { origin, handle } = self;
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Ok(repo))) => Ok(repo),
            Ok(Ok(Err(cause))) => {
                log::error!("Dataset {origin} failed to load: {cause:#}");
                Err(IngestError::Load { origin, cause })
            }
            Ok(Err(join_err)) => {
                log::error!("Dataset {origin} loader stopped: {join_err}");
                Err(IngestError::Aborted {
                    origin,
                    reason: join_err.to_string(),
                })
            }
            Err(_elapsed) => {
                log::error!("Dataset {origin} not ready after {timeout:?}");
                Err(IngestError::Timeout { origin, timeout })
            }
        }
    }
}

/// Load `path` with the configured normalization and timeout.
pub async fn load_dataset(path: &Path, config: &AtlasConfig) -> IngestResult<JobRepository> {
    PendingDataset::spawn(path, config.normalize.clone())
        .wait(config.ingest.timeout())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawValue;

    const CSV: &str = "Job Title,Location,Salary Estimate,Size,python_yn\n\
        Data Scientist,\"San Jose, CA\",$90K-$110K (Glassdoor est.),1 to 50 employees,1\n\
        Data Engineer,\"Los Angeles, CA\",$130K-$150K (Glassdoor est.),10000+ employees,1\n\
        Data Scientist,\"New York, NY\",$80K-$100K (Glassdoor est.),201 to 500 employees,0\n\
        Data Analyst,Remote,$60K-$70K,-1,0\n\
        Data Analyst,\"Austin, TX\",,-1,0\n";

    #[test]
    fn test_build_repository_drops_invalid_rows() {
        let rows = crate::data::loader::parse_csv(CSV.as_bytes()).unwrap();
        let repo = build_repository(&rows, &NormalizeConfig::default());
        assert_eq!(repo.len(), 3);
        let report = repo.report();
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.dropped_missing_region, 1);
        assert_eq!(report.dropped_bad_salary, 1);
        assert_eq!(repo.national_median(), Some(105_000.0));
    }

    #[test]
    fn test_build_repository_from_json_rows() {
        let rows = crate::data::loader::parse_json(
            r#"[{"title": "Data Scientist", "job_state": "WA", "avg_salary": 150}]"#,
        )
        .unwrap();
        assert_eq!(rows[0]["avg_salary"], RawValue::Integer(150));
        let repo = build_repository(&rows, &NormalizeConfig::default());
        assert_eq!(repo.region_statistics()[0].mean_salary, 150_000.0);
    }

    #[tokio::test]
    async fn test_load_dataset_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        std::fs::write(&path, CSV).unwrap();

        let repo = load_dataset(&path, &AtlasConfig::default()).await.unwrap();
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("nope.csv"), &AtlasConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Load { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[tokio::test]
    async fn test_slow_load_times_out() {
        let pending = PendingDataset::spawn_with("slow", || {
            std::thread::sleep(Duration::from_millis(300));
            Ok(JobRepository::from_records(Vec::new()))
        });
        assert_eq!(pending.origin(), "slow");
        let err = pending.wait(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, IngestError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_panicking_loader_is_aborted() {
        let pending = PendingDataset::spawn_with("broken", || panic!("bad parser"));
        let err = pending.wait(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, IngestError::Aborted { .. }));
    }
}
