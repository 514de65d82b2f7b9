//! Command-line interface for the headless driver.

use std::path::PathBuf;

use clap::Parser;

use salary_atlas::{SizeBucket, Track};

/// Load a job-posting dataset, replay a selection and print the views as JSON.
///
/// Examples:
///   salary-atlas jobs.csv
///   salary-atlas jobs.parquet --region CA --track data-scientist
///   salary-atlas jobs.json --feature "New York" --size large
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset file (.csv, .json or .parquet)
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "SALARY_ATLAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Two-letter state code to select
    #[arg(short, long, value_name = "XX", conflicts_with = "feature")]
    pub region: Option<String>,

    /// Map feature identifier (state name or FIPS id) to select
    #[arg(long, value_name = "ID")]
    pub feature: Option<String>,

    /// Job track to select within the region
    #[arg(short, long, value_parser = parse_track)]
    pub track: Option<Track>,

    /// Company size to record within the region
    #[arg(short, long, value_parser = parse_size)]
    pub size: Option<SizeBucket>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

fn parse_track(text: &str) -> Result<Track, String> {
    Track::parse(text).ok_or_else(|| {
        format!("unknown track '{text}' (data-scientist, data-engineer, data-analyst, ml-engineer, other)")
    })
}

fn parse_size(text: &str) -> Result<SizeBucket, String> {
    SizeBucket::parse(text)
        .ok_or_else(|| format!("unknown size '{text}' (small, medium, large, unknown)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_selection() {
        let args = Args::try_parse_from([
            "salary-atlas",
            "jobs.csv",
            "--region",
            "CA",
            "--track",
            "data-scientist",
            "--size",
            "small",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("jobs.csv"));
        assert_eq!(args.region.as_deref(), Some("CA"));
        assert_eq!(args.track, Some(Track::DataScientist));
        assert_eq!(args.size, Some(SizeBucket::Small));
        assert!(!args.compact);
    }

    #[test]
    fn test_rejects_unknown_track() {
        assert!(Args::try_parse_from(["salary-atlas", "jobs.csv", "--track", "pilot"]).is_err());
    }

    #[test]
    fn test_region_and_feature_conflict() {
        assert!(Args::try_parse_from([
            "salary-atlas",
            "jobs.csv",
            "--region",
            "CA",
            "--feature",
            "Texas"
        ])
        .is_err());
    }
}
