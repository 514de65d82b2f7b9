//! Raw rows → canonical [`JobRecord`]s.
//!
//! Column names vary between dataset exports ("Avg Salary(K)", "avg_salary",
//! "Salary Estimate", ...), so every field is looked up through a list of
//! candidate keys compared case- and punctuation-insensitively. A record is
//! always produced; deciding whether it is usable is left to
//! [`JobRecord::is_valid`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{JobRecord, RawRow, RawValue, Skill, SkillFlags};
use super::regions::is_known_region;
use crate::config::NormalizeConfig;

/// Trailing ", XX" state code in a location string.
static LOCATION_STATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([A-Z]{2})\s*$").unwrap());

/// Dollar amounts in estimate strings: `$53K`, `85`, `120,000`, `$17.50`.
static SALARY_FIGURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\s*(\d+(?:,\d{3})*(?:\.\d+)?)\s*([kK])?").unwrap());

const TITLE_KEYS: &[&str] = &["jobtitle", "title", "position", "role"];
const STATE_KEYS: &[&str] = &["jobstate", "state", "joblocation"];
const LOCATION_KEYS: &[&str] = &["location", "joblocation", "city"];
const AVG_KEYS: &[&str] = &["avgsalaryk", "avgsalary", "salaryavg", "averagesalary", "salary"];
const RANGE_KEYS: &[&str] = &["salaryestimate", "salaryrange", "estimatedsalary", "salary"];
const MIN_KEYS: &[&str] = &["minsalary", "lowersalary", "salarymin"];
const MAX_KEYS: &[&str] = &["maxsalary", "uppersalary", "salarymax"];
const SIZE_KEYS: &[&str] = &["size", "companysize", "employees"];
const INDUSTRY_KEYS: &[&str] = &["industry", "sector"];
const COMPANY_KEYS: &[&str] = &["companyname", "companytxt", "company", "employer"];

fn skill_keys(skill: Skill) -> &'static [&'static str] {
    match skill {
        Skill::Python => &["python", "pythonyn"],
        Skill::R => &["r", "ryn", "rstudio"],
        Skill::Spark => &["spark", "sparkyn"],
        Skill::Cloud => &["cloud", "aws", "awsyn", "azure", "gcp"],
        Skill::Excel => &["excel", "excelyn"],
    }
}

fn column_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A row re-keyed by normalized column name.
struct Fields<'a> {
    by_key: BTreeMap<String, &'a RawValue>,
}

impl<'a> Fields<'a> {
    fn new(row: &'a RawRow) -> Self {
        let mut by_key = BTreeMap::new();
        for (name, value) in row {
            // First spelling wins if two columns collapse to the same key.
            by_key.entry(column_key(name)).or_insert(value);
        }
        Self { by_key }
    }

    fn values(&self, keys: &'static [&'static str]) -> impl Iterator<Item = &'a RawValue> + '_ {
        keys.iter().filter_map(|k| self.by_key.get(*k).copied())
    }

    fn text(&self, keys: &'static [&'static str]) -> Option<String> {
        self.values(keys).find_map(RawValue::as_text)
    }

    fn number(&self, keys: &'static [&'static str]) -> Option<f64> {
        self.values(keys)
            .filter_map(RawValue::as_f64)
            .find(|v| v.is_finite() && *v > 0.0)
    }

    fn flag(&self, keys: &'static [&'static str]) -> bool {
        self.values(keys).any(RawValue::is_truthy)
    }
}

/// Converts raw rows into [`JobRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, row: &RawRow) -> JobRecord {
        let fields = Fields::new(row);

        let (salary_avg, salary_min, salary_max) = self.salary(&fields);

        let mut skills = SkillFlags::default();
        for skill in Skill::ALL {
            skills.set(skill, fields.flag(skill_keys(skill)));
        }

        JobRecord {
            region: extract_region(&fields),
            title: fields.text(TITLE_KEYS).unwrap_or_default(),
            salary_avg,
            salary_min,
            salary_max,
            skills,
            size_text: fields.text(SIZE_KEYS).unwrap_or_default(),
            industry: fields.text(INDUSTRY_KEYS).unwrap_or_default(),
            company: fields
                .text(COMPANY_KEYS)
                .map(|c| c.lines().next().unwrap_or_default().trim().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn normalize_all(&self, rows: &[RawRow]) -> Vec<JobRecord> {
        rows.iter().map(|row| self.normalize(row)).collect()
    }

    /// Returns `(avg, min, max)`; all zero when no salary could be found.
    ///
    /// Each source (numeric average, range string, explicit bounds) is scaled
    /// as a unit, so figures from one source never end up on different scales.
    fn salary(&self, fields: &Fields<'_>) -> (f64, f64, f64) {
        let range = fields
            .values(RANGE_KEYS)
            .filter_map(|v| match v {
                RawValue::String(s) => parse_salary_range(s),
                _ => None,
            })
            .next()
            .map(|r| r.scaled(self.factor(r.avg)));

        let (explicit_min, explicit_max) = self.explicit_bounds(fields);

        let avg = fields
            .number(AVG_KEYS)
            .map(|v| v * self.factor(v))
            .or_else(|| range.map(|r| r.avg))
            .or_else(|| match (explicit_min, explicit_max) {
                (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
                _ => None,
            })
            .unwrap_or(0.0);

        if avg <= 0.0 {
            return (0.0, 0.0, 0.0);
        }

        let min = explicit_min
            .or_else(|| range.and_then(|r| r.min))
            .unwrap_or(avg * self.config.min_ratio);
        let max = explicit_max
            .or_else(|| range.and_then(|r| r.max))
            .unwrap_or(avg * self.config.max_ratio);

        (avg, min, max)
    }

    /// Explicit min/max columns, scaled together from their midpoint.
    fn explicit_bounds(&self, fields: &Fields<'_>) -> (Option<f64>, Option<f64>) {
        let (lo, hi) = (fields.number(MIN_KEYS), fields.number(MAX_KEYS));
        let reference = match (lo, hi) {
            (Some(lo), Some(hi)) => (lo + hi) / 2.0,
            (Some(v), None) | (None, Some(v)) => v,
            (None, None) => return (None, None),
        };
        let factor = self.factor(reference);
        (lo.map(|v| v * factor), hi.map(|v| v * factor))
    }

    /// Figures whose reference value is below the threshold are
    /// thousands-scale (`85` means 85000).
    fn factor(&self, reference: f64) -> f64 {
        if reference > 0.0 && reference < self.config.thousands_threshold {
            1000.0
        } else {
            1.0
        }
    }
}

/// Region from an explicit state column, else from the trailing ", XX" of the
/// location text. Empty when neither yields a known code.
fn extract_region(fields: &Fields<'_>) -> String {
    let explicit = fields
        .values(STATE_KEYS)
        .filter_map(RawValue::as_text)
        .map(|s| s.trim().to_string())
        .find(|s| s.len() == 2 && s.chars().all(|c| c.is_ascii_uppercase()) && is_known_region(s));
    if let Some(code) = explicit {
        return code;
    }

    fields
        .values(LOCATION_KEYS)
        .filter_map(RawValue::as_text)
        .find_map(|loc| {
            LOCATION_STATE_RE
                .captures(&loc)
                .map(|caps| caps[1].to_string())
        })
        .unwrap_or_default()
}

/// Figures parsed out of a salary estimate string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryRange {
    pub avg: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SalaryRange {
    fn scaled(self, factor: f64) -> Self {
        Self {
            avg: self.avg * factor,
            min: self.min.map(|v| v * factor),
            max: self.max.map(|v| v * factor),
        }
    }
}

/// Parse strings like `"$53K-$91K (Glassdoor est.)"`, `"85-120"` or
/// `"$120,000"`. `K` suffixes are applied here; the thousands heuristic for
/// bare small numbers is applied by the caller.
pub fn parse_salary_range(text: &str) -> Option<SalaryRange> {
    let figures: Vec<f64> = SALARY_FIGURE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let number = caps[1].replace(',', "").parse::<f64>().ok()?;
            Some(if caps.get(2).is_some() { number * 1000.0 } else { number })
        })
        .take(2)
        .collect();

    match figures.as_slice() {
        [single] => Some(SalaryRange {
            avg: *single,
            min: None,
            max: None,
        }),
        [lo, hi] => Some(SalaryRange {
            avg: (lo + hi) / 2.0,
            min: Some(lo.min(*hi)),
            max: Some(lo.max(*hi)),
        }),
        _ => None,
    }
}
