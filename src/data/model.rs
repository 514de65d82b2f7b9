use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// RawValue – a single cell of an un-normalized input row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, as produced by the CSV/JSON/Parquet loaders.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Null => Ok(()),
        }
    }
}

impl RawValue {
    /// Interpret the value as a number. Numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Float(v) => Some(*v),
            RawValue::Integer(i) => Some(*i as f64),
            RawValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text form of the value; `None` for nulls and blank strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::String(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    /// Loose truthiness used for skill flag columns: `1`, `true`, `"1"`,
    /// `"yes"`, ... are true, everything else is false.
    pub fn is_truthy(&self) -> bool {
        match self {
            RawValue::Bool(b) => *b,
            RawValue::Integer(i) => *i == 1,
            RawValue::Float(v) => *v == 1.0,
            RawValue::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "1.0" | "true" | "t" | "yes" | "y"
            ),
            RawValue::Null => false,
        }
    }
}

/// One row of the source table: column name → cell.
pub type RawRow = BTreeMap<String, RawValue>;

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Two-letter U.S. state code, always upper case.
pub type RegionCode = String;

/// Tracked skills, in the fixed order every consumer relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Skill {
    Python,
    R,
    Spark,
    Cloud,
    Excel,
}

impl Skill {
    pub const ALL: [Skill; 5] = [Skill::Python, Skill::R, Skill::Spark, Skill::Cloud, Skill::Excel];

    pub fn label(self) -> &'static str {
        match self {
            Skill::Python => "Python",
            Skill::R => "R",
            Skill::Spark => "Spark",
            Skill::Cloud => "Cloud",
            Skill::Excel => "Excel",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Standardized job-title category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Track {
    DataScientist,
    DataEngineer,
    DataAnalyst,
    MLEngineer,
    Other,
}

impl Track {
    pub const ALL: [Track; 5] = [
        Track::DataScientist,
        Track::DataEngineer,
        Track::DataAnalyst,
        Track::MLEngineer,
        Track::Other,
    ];

    /// The four tracks that appear as nodes of the flow graph.
    pub const FLOW: [Track; 4] = [
        Track::DataScientist,
        Track::DataEngineer,
        Track::DataAnalyst,
        Track::MLEngineer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Track::DataScientist => "Data Scientist",
            Track::DataEngineer => "Data Engineer",
            Track::DataAnalyst => "Data Analyst",
            Track::MLEngineer => "ML Engineer",
            Track::Other => "Other",
        }
    }

    /// Parse a user-facing track name (`data-scientist`, `DataScientist`,
    /// `ml engineer`, ...).
    pub fn parse(text: &str) -> Option<Track> {
        let key: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "datascientist" | "ds" => Some(Track::DataScientist),
            "dataengineer" | "de" => Some(Track::DataEngineer),
            "dataanalyst" | "analyst" | "da" => Some(Track::DataAnalyst),
            "mlengineer" | "machinelearningengineer" | "mle" => Some(Track::MLEngineer),
            "other" => Some(Track::Other),
            _ => None,
        }
    }
}

/// Richer title categorization used for reporting; collapses into [`Track`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DetailedTrack {
    DataScientist,
    DataEngineer,
    DataAnalyst,
    MLEngineer,
    SoftwareEngineer,
    Management,
    Research,
    Other,
}

impl From<DetailedTrack> for Track {
    fn from(detailed: DetailedTrack) -> Self {
        match detailed {
            DetailedTrack::DataScientist => Track::DataScientist,
            DetailedTrack::DataEngineer => Track::DataEngineer,
            DetailedTrack::DataAnalyst => Track::DataAnalyst,
            DetailedTrack::MLEngineer => Track::MLEngineer,
            DetailedTrack::SoftwareEngineer
            | DetailedTrack::Management
            | DetailedTrack::Research
            | DetailedTrack::Other => Track::Other,
        }
    }
}

/// Standardized company-size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
    Unknown,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 4] = [
        SizeBucket::Small,
        SizeBucket::Medium,
        SizeBucket::Large,
        SizeBucket::Unknown,
    ];

    pub fn parse(text: &str) -> Option<SizeBucket> {
        match text.trim().to_ascii_lowercase().as_str() {
            "small" => Some(SizeBucket::Small),
            "medium" => Some(SizeBucket::Medium),
            "large" => Some(SizeBucket::Large),
            "unknown" => Some(SizeBucket::Unknown),
            _ => None,
        }
    }
}

/// Salary quartile bucket within one filtering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Quartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quartile {
    pub const ALL: [Quartile; 4] = [Quartile::Q1, Quartile::Q2, Quartile::Q3, Quartile::Q4];

    pub fn label(self) -> &'static str {
        match self {
            Quartile::Q1 => "Q1",
            Quartile::Q2 => "Q2",
            Quartile::Q3 => "Q3",
            Quartile::Q4 => "Q4",
        }
    }
}

// ---------------------------------------------------------------------------
// JobRecord – one normalized posting
// ---------------------------------------------------------------------------

/// Bit set over [`Skill`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SkillFlags(u8);

impl SkillFlags {
    pub fn with(mut self, skill: Skill, present: bool) -> Self {
        self.set(skill, present);
        self
    }

    pub fn set(&mut self, skill: Skill, present: bool) {
        if present {
            self.0 |= skill.bit();
        } else {
            self.0 &= !skill.bit();
        }
    }

    pub fn has(&self, skill: Skill) -> bool {
        self.0 & skill.bit() != 0
    }
}

impl Serialize for SkillFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Skill::ALL.len()))?;
        for skill in Skill::ALL {
            map.serialize_entry(skill.label(), &self.has(skill))?;
        }
        map.end()
    }
}

/// Canonical job posting. Produced for every input row; validity is decided
/// later by [`JobRecord::is_valid`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    /// Two-letter region code, empty when none could be extracted.
    pub region: RegionCode,
    pub title: String,
    pub salary_avg: f64,
    pub salary_min: f64,
    pub salary_max: f64,
    pub skills: SkillFlags,
    pub size_text: String,
    pub industry: String,
    pub company: String,
}

impl JobRecord {
    /// A record takes part in statistics only with a known region and a
    /// positive average salary.
    pub fn is_valid(&self) -> bool {
        crate::data::regions::is_known_region(&self.region)
            && self.salary_avg.is_finite()
            && self.salary_avg > 0.0
    }

    pub fn has_skill(&self, skill: Skill) -> bool {
        self.skills.has(skill)
    }
}

// ---------------------------------------------------------------------------
// Derived statistics
// ---------------------------------------------------------------------------

/// Per-region sample count and mean salary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStatistic {
    pub region: RegionCode,
    pub sample_count: usize,
    pub mean_salary: f64,
}
