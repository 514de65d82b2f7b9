//! Statistics over an explicit record subset.
//!
//! Nothing here assumes it is looking at the whole dataset: the global map
//! view and every filtered context go through the same functions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{DetailedTrack, Quartile, RegionStatistic, SizeBucket, Skill, Track};
use crate::data::repository::CategorizedRecord;

/// Running count, sum and salary range for one group.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Tally {
    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

fn tally_by<K: Ord>(
    records: &[&CategorizedRecord],
    key: impl Fn(&CategorizedRecord) -> K,
) -> BTreeMap<K, Tally> {
    let mut groups: BTreeMap<K, Tally> = BTreeMap::new();
    for rec in records {
        groups.entry(key(*rec)).or_default().add(rec.record.salary_avg);
    }
    groups
}

// ---------------------------------------------------------------------------
// Region statistics & national median
// ---------------------------------------------------------------------------

/// Count and mean salary for every region present in `records`, ordered by
/// region code.
pub fn region_stats(records: &[&CategorizedRecord]) -> Vec<RegionStatistic> {
    tally_by(records, |rec| rec.record.region.clone())
        .into_iter()
        .map(|(region, tally)| RegionStatistic {
            region,
            sample_count: tally.count,
            mean_salary: tally.mean(),
        })
        .collect()
}

/// Median of the per-region means (not of individual salaries).
pub fn national_median(stats: &[RegionStatistic]) -> Option<f64> {
    let means: Vec<f64> = stats.iter().map(|s| s.mean_salary).collect();
    median(&means)
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, 0.5)
}

/// Where a region sits relative to the national median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MedianComparison {
    Above,
    AtMedian,
    Below,
}

pub fn compare_to_median(stat: &RegionStatistic, national_median: f64) -> MedianComparison {
    match stat.mean_salary.total_cmp(&national_median) {
        std::cmp::Ordering::Greater => MedianComparison::Above,
        std::cmp::Ordering::Equal => MedianComparison::AtMedian,
        std::cmp::Ordering::Less => MedianComparison::Below,
    }
}

// ---------------------------------------------------------------------------
// Skill frequency
// ---------------------------------------------------------------------------

/// Share of records carrying each skill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillFrequency {
    /// Size of the subset; zero means "no data", not "0% of postings".
    pub sample_count: usize,
    pub fractions: BTreeMap<Skill, f64>,
}

impl SkillFrequency {
    pub fn fraction(&self, skill: Skill) -> f64 {
        self.fractions.get(&skill).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

pub fn skill_frequency(records: &[&CategorizedRecord]) -> SkillFrequency {
    let n = records.len();
    let fractions = Skill::ALL
        .iter()
        .map(|&skill| {
            let with_skill = records.iter().filter(|r| r.record.has_skill(skill)).count();
            let fraction = if n == 0 {
                0.0
            } else {
                with_skill as f64 / n as f64
            };
            (skill, fraction)
        })
        .collect();
    SkillFrequency {
        sample_count: n,
        fractions,
    }
}

// ---------------------------------------------------------------------------
// Salary quartiles
// ---------------------------------------------------------------------------

/// The three boundaries splitting a subset's salaries into quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuartileBoundaries {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl QuartileBoundaries {
    /// Boundary values belong to the lower bucket.
    pub fn bucket(&self, salary: f64) -> Quartile {
        if salary <= self.q1 {
            Quartile::Q1
        } else if salary <= self.q2 {
            Quartile::Q2
        } else if salary <= self.q3 {
            Quartile::Q3
        } else {
            Quartile::Q4
        }
    }
}

/// Linear interpolation between order statistics: position `(n - 1) * p`.
fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let (first, last) = (sorted.first()?, sorted.last()?);
    if sorted.len() == 1 || p <= 0.0 {
        return Some(*first);
    }
    if p >= 1.0 {
        return Some(*last);
    }
    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    let lower = sorted[lo];
    Some(match sorted.get(lo + 1) {
        Some(upper) => lower + frac * (upper - lower),
        None => lower,
    })
}

/// Quartile boundaries of the subset's average salaries; `None` if empty.
pub fn salary_quartiles(records: &[&CategorizedRecord]) -> Option<QuartileBoundaries> {
    let mut salaries: Vec<f64> = records.iter().map(|r| r.record.salary_avg).collect();
    salaries.sort_by(f64::total_cmp);
    Some(QuartileBoundaries {
        q1: quantile_sorted(&salaries, 0.25)?,
        q2: quantile_sorted(&salaries, 0.5)?,
        q3: quantile_sorted(&salaries, 0.75)?,
    })
}

// ---------------------------------------------------------------------------
// Category breakdowns
// ---------------------------------------------------------------------------

/// Per company-size summary of average salaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeBucketStat {
    pub bucket: SizeBucket,
    pub count: usize,
    pub mean_salary: f64,
    pub min_salary: f64,
    pub max_salary: f64,
}

/// One entry per bucket with at least one record, in bucket order.
pub fn size_bucket_stats(records: &[&CategorizedRecord]) -> Vec<SizeBucketStat> {
    tally_by(records, |rec| rec.size)
        .into_iter()
        .map(|(bucket, t)| SizeBucketStat {
            bucket,
            count: t.count,
            mean_salary: t.mean(),
            min_salary: t.min,
            max_salary: t.max,
        })
        .collect()
}

/// Count and mean salary for one title category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackStat<T> {
    pub track: T,
    pub count: usize,
    pub mean_salary: f64,
}

fn track_stats<T: Ord>(tallies: BTreeMap<T, Tally>) -> Vec<TrackStat<T>> {
    tallies
        .into_iter()
        .map(|(track, t)| TrackStat {
            track,
            count: t.count,
            mean_salary: t.mean(),
        })
        .collect()
}

/// Tracks with at least one record, in fixed track order.
pub fn track_breakdown(records: &[&CategorizedRecord]) -> Vec<TrackStat<Track>> {
    track_stats(tally_by(records, |rec| rec.track))
}

pub fn detailed_track_breakdown(records: &[&CategorizedRecord]) -> Vec<TrackStat<DetailedTrack>> {
    track_stats(tally_by(records, |rec| rec.detailed_track))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::repository::fixtures::{job, job_with};
    use crate::data::repository::JobRepository;

    fn build(records: Vec<crate::data::model::JobRecord>) -> JobRepository {
        JobRepository::from_records(records)
    }

    #[test]
    fn test_median_of_means_differs_from_record_median() {
        // CA has many cheap postings, two other states a single expensive one.
        let mut records: Vec<_> = (0..5).map(|_| job("CA", 50_000.0, "Data Analyst")).collect();
        records.push(job("NY", 200_000.0, "Data Scientist"));
        records.push(job("WA", 180_000.0, "Data Scientist"));
        let repo = build(records);

        let stats = region_stats(&repo.all());
        assert_eq!(national_median(&stats), Some(180_000.0));

        let raw: Vec<f64> = repo.records().iter().map(|r| r.record.salary_avg).collect();
        assert_eq!(median(&raw), Some(50_000.0));
    }

    #[test]
    fn test_median_even_and_empty() {
        assert_eq!(median(&[3.0, 1.0, 4.0, 2.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_compare_to_median() {
        let stat = RegionStatistic {
            region: "CA".into(),
            sample_count: 2,
            mean_salary: 120_000.0,
        };
        assert_eq!(compare_to_median(&stat, 105_000.0), MedianComparison::Above);
        assert_eq!(compare_to_median(&stat, 120_000.0), MedianComparison::AtMedian);
        assert_eq!(compare_to_median(&stat, 130_000.0), MedianComparison::Below);
    }

    #[test]
    fn test_skill_frequency_matches_counts() {
        let repo = build(vec![
            job_with("CA", 100.0, "a", &[Skill::Python, Skill::R], ""),
            job_with("CA", 100.0, "b", &[Skill::Python], ""),
            job_with("CA", 100.0, "c", &[Skill::Excel], ""),
            job_with("CA", 100.0, "d", &[], ""),
        ]);
        let subset = repo.all();
        let freq = skill_frequency(&subset);
        assert_eq!(freq.sample_count, 4);
        for skill in Skill::ALL {
            let expected = subset.iter().filter(|r| r.record.has_skill(skill)).count() as f64 / 4.0;
            assert_eq!(freq.fraction(skill), expected);
        }
        assert_eq!(freq.fraction(Skill::Python), 0.5);
        assert_eq!(freq.fraction(Skill::Spark), 0.0);
    }

    #[test]
    fn test_skill_frequency_empty_subset() {
        let freq = skill_frequency(&[]);
        assert!(freq.is_empty());
        assert_eq!(freq.fractions.len(), 5);
        assert!(freq.fractions.values().all(|f| *f == 0.0));
    }

    #[test]
    fn test_quartiles_interpolate() {
        let repo = build(
            [10.0, 20.0, 30.0, 40.0, 50.0]
                .iter()
                .map(|s| job("TX", s * 1000.0, "x"))
                .collect(),
        );
        let q = salary_quartiles(&repo.all()).unwrap();
        assert_eq!(q.q1, 20_000.0);
        assert_eq!(q.q2, 30_000.0);
        assert_eq!(q.q3, 40_000.0);

        let repo = build(
            [1.0, 2.0, 3.0, 4.0]
                .iter()
                .map(|s| job("TX", s * 1000.0, "x"))
                .collect(),
        );
        let q = salary_quartiles(&repo.all()).unwrap();
        assert_eq!(q.q1, 1_750.0);
        assert_eq!(q.q2, 2_500.0);
        assert_eq!(q.q3, 3_250.0);
    }

    #[test]
    fn test_quartile_bucket_boundaries() {
        let q = QuartileBoundaries {
            q1: 10.0,
            q2: 20.0,
            q3: 30.0,
        };
        assert_eq!(q.bucket(5.0), Quartile::Q1);
        assert_eq!(q.bucket(10.0), Quartile::Q1);
        assert_eq!(q.bucket(10.5), Quartile::Q2);
        assert_eq!(q.bucket(20.0), Quartile::Q2);
        assert_eq!(q.bucket(30.0), Quartile::Q3);
        assert_eq!(q.bucket(30.1), Quartile::Q4);
    }

    #[test]
    fn test_every_record_gets_exactly_one_quartile() {
        let repo = build(
            [55.0, 61.0, 61.0, 70.0, 83.0, 90.0, 90.0, 125.0, 140.0]
                .iter()
                .map(|s| job("OR", s * 1000.0, "x"))
                .collect(),
        );
        let subset = repo.all();
        let q = salary_quartiles(&subset).unwrap();
        let mut counts: BTreeMap<Quartile, usize> = BTreeMap::new();
        for rec in &subset {
            let bucket = q.bucket(rec.record.salary_avg);
            let matching = Quartile::ALL.iter().filter(|b| **b == bucket).count();
            assert_eq!(matching, 1);
            *counts.entry(bucket).or_default() += 1;
        }
        assert_eq!(counts.values().sum::<usize>(), subset.len());
    }

    #[test]
    fn test_quartiles_empty_and_single() {
        assert_eq!(salary_quartiles(&[]), None);
        let repo = build(vec![job("OH", 70_000.0, "x")]);
        let q = salary_quartiles(&repo.all()).unwrap();
        assert_eq!((q.q1, q.q2, q.q3), (70_000.0, 70_000.0, 70_000.0));
        assert_eq!(q.bucket(70_000.0), Quartile::Q1);
    }

    #[test]
    fn test_size_bucket_stats() {
        let repo = build(vec![
            job_with("CA", 100_000.0, "x", &[], "1 to 50 employees"),
            job_with("CA", 60_000.0, "x", &[], "51 to 200 employees"),
            job_with("CA", 200_000.0, "x", &[], "10000+ employees"),
            job_with("CA", 90_000.0, "x", &[], "-1"),
        ]);
        let stats = size_bucket_stats(&repo.all());
        let buckets: Vec<SizeBucket> = stats.iter().map(|s| s.bucket).collect();
        assert_eq!(
            buckets,
            vec![SizeBucket::Small, SizeBucket::Large, SizeBucket::Unknown]
        );
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].mean_salary, 80_000.0);
        assert_eq!(stats[0].min_salary, 60_000.0);
        assert_eq!(stats[0].max_salary, 100_000.0);
        assert!(size_bucket_stats(&[]).is_empty());
    }

    #[test]
    fn test_track_breakdown() {
        let repo = build(vec![
            job("CA", 100_000.0, "Data Scientist"),
            job("CA", 120_000.0, "Lead Data Scientist"),
            job("CA", 80_000.0, "Software Engineer"),
        ]);
        let tracks = track_breakdown(&repo.all());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].track, Track::DataScientist);
        assert_eq!(tracks[0].count, 2);
        assert_eq!(tracks[0].mean_salary, 110_000.0);
        assert_eq!(tracks[1].track, Track::Other);

        let detailed = detailed_track_breakdown(&repo.all());
        assert_eq!(detailed[1].track, DetailedTrack::SoftwareEngineer);
    }
}
