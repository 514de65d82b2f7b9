use serde::Serialize;

use super::categorize::{classify_size, classify_track, classify_track_detailed};
use super::model::{DetailedTrack, JobRecord, RegionStatistic, SizeBucket, Track};
use super::regions::is_known_region;
use crate::analysis::aggregate::{national_median, region_stats};

// ---------------------------------------------------------------------------
// Ingest diagnostics
// ---------------------------------------------------------------------------

/// Row counts from building a repository. Dropped rows are not errors; the
/// counts exist for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows_read: usize,
    pub records_valid: usize,
    pub dropped_missing_region: usize,
    pub dropped_bad_salary: usize,
}

impl IngestReport {
    pub fn dropped(&self) -> usize {
        self.dropped_missing_region + self.dropped_bad_salary
    }
}

// ---------------------------------------------------------------------------
// CategorizedRecord – a valid record with its labels attached
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedRecord {
    #[serde(flatten)]
    pub record: JobRecord,
    pub track: Track,
    pub detailed_track: DetailedTrack,
    pub size: SizeBucket,
}

impl CategorizedRecord {
    pub fn new(record: JobRecord) -> Self {
        let detailed_track = classify_track_detailed(&record.title);
        Self {
            track: classify_track(&record.title),
            detailed_track,
            size: classify_size(&record.size_text),
            record,
        }
    }
}

// ---------------------------------------------------------------------------
// JobRepository – the loaded dataset
// ---------------------------------------------------------------------------

/// All valid records plus the statistics derived once from them. Immutable
/// after construction; a reload builds a new repository.
#[derive(Debug, Clone)]
pub struct JobRepository {
    records: Vec<CategorizedRecord>,
    region_stats: Vec<RegionStatistic>,
    national_median: Option<f64>,
    report: IngestReport,
}

impl JobRepository {
    /// Drop invalid records, attach labels and compute the per-region cache.
    pub fn from_records(records: Vec<JobRecord>) -> Self {
        let mut report = IngestReport {
            rows_read: records.len(),
            ..Default::default()
        };

        let mut valid = Vec::with_capacity(records.len());
        for record in records {
            if !is_known_region(&record.region) {
                report.dropped_missing_region += 1;
            } else if !record.is_valid() {
                report.dropped_bad_salary += 1;
            } else {
                valid.push(CategorizedRecord::new(record));
            }
        }
        report.records_valid = valid.len();

        let all: Vec<&CategorizedRecord> = valid.iter().collect();
        let region_stats = region_stats(&all);
        let national_median = national_median(&region_stats);

        log::info!(
            "Loaded {} rows: {} valid, {} dropped ({} without region, {} without salary), {} regions",
            report.rows_read,
            report.records_valid,
            report.dropped(),
            report.dropped_missing_region,
            report.dropped_bad_salary,
            region_stats.len()
        );

        Self {
            records: valid,
            region_stats,
            national_median,
            report,
        }
    }

    pub fn records(&self) -> &[CategorizedRecord] {
        &self.records
    }

    /// Every record, as the subset type the aggregators take.
    pub fn all(&self) -> Vec<&CategorizedRecord> {
        self.records.iter().collect()
    }

    pub fn region_statistics(&self) -> &[RegionStatistic] {
        &self.region_stats
    }

    pub fn region_statistic(&self, region: &str) -> Option<&RegionStatistic> {
        self.region_stats.iter().find(|s| s.region == region)
    }

    /// Median of the per-region means; `None` for an empty dataset.
    pub fn national_median(&self) -> Option<f64> {
        self.national_median
    }

    pub fn report(&self) -> IngestReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::data::model::{Skill, SkillFlags};

    pub fn job(region: &str, salary: f64, title: &str) -> JobRecord {
        JobRecord {
            region: region.to_string(),
            title: title.to_string(),
            salary_avg: salary,
            salary_min: salary * 0.8,
            salary_max: salary * 1.2,
            skills: SkillFlags::default(),
            size_text: String::new(),
            industry: String::new(),
            company: String::new(),
        }
    }

    pub fn job_with(
        region: &str,
        salary: f64,
        title: &str,
        skills: &[Skill],
        size_text: &str,
    ) -> JobRecord {
        let mut record = job(region, salary, title);
        for skill in skills {
            record.skills.set(*skill, true);
        }
        record.size_text = size_text.to_string();
        record
    }

    /// CA $100k DS, CA $140k DE, NY $90k DS.
    pub fn three_jobs() -> JobRepository {
        JobRepository::from_records(vec![
            job_with("CA", 100_000.0, "Data Scientist", &[Skill::Python], "1 to 50 employees"),
            job_with(
                "CA",
                140_000.0,
                "Data Engineer",
                &[Skill::Python, Skill::Spark],
                "10000+ employees",
            ),
            job_with("NY", 90_000.0, "Data Scientist", &[Skill::R], "201 to 500 employees"),
        ])
    }
}
