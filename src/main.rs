mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use salary_atlas::analysis::aggregate::{
    MedianComparison, TrackStat, compare_to_median, detailed_track_breakdown,
};
use salary_atlas::data::model::DetailedTrack;
use salary_atlas::data::regions::{UsStateLookup, region_name};
use salary_atlas::data::repository::IngestReport;
use salary_atlas::ingest::PendingDataset;
use salary_atlas::{AtlasConfig, Coordinator, RegionStatistic, SelectionChanged};

use cli::Args;

#[derive(Serialize)]
struct RegionRow<'a> {
    #[serde(flatten)]
    stat: &'a RegionStatistic,
    name: Option<&'static str>,
    vs_median: Option<MedianComparison>,
}

#[derive(Serialize)]
struct Output<'a> {
    ingest: IngestReport,
    national_median: Option<f64>,
    regions: Vec<RegionRow<'a>>,
    selection: Arc<SelectionChanged>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detailed_tracks: Option<Vec<TrackStat<DetailedTrack>>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = AtlasConfig::load(args.config.as_deref())?;

    let pending = PendingDataset::spawn(&args.data, config.normalize.clone());
    let origin = pending.origin().to_string();
    let mut coordinator = Coordinator::from_pending(pending, config.ingest.timeout())
        .await
        .with_context(|| format!("ingesting {origin} failed"))?;

    if let Some(region) = &args.region {
        if !coordinator.select_region(region.to_ascii_uppercase()) {
            log::warn!("Unknown region {region}; showing all regions");
        }
    } else if let Some(feature) = &args.feature {
        if !coordinator.select_feature(feature, &UsStateLookup) {
            log::warn!("No region matches feature {feature:?}; showing all regions");
        }
    }
    if let Some(track) = args.track {
        if !coordinator.select_track(track) {
            log::warn!("--track needs a selected region; ignored");
        }
    }
    if let Some(size) = args.size {
        if !coordinator.select_size(size) {
            log::warn!("--size needs a selected region; ignored");
        }
    }

    let repo = Arc::clone(coordinator.repository());
    let selection = coordinator.current();
    let national_median = coordinator.national_median();

    let regions = coordinator
        .region_statistics()
        .iter()
        .map(|stat| RegionRow {
            stat,
            name: region_name(&stat.region),
            vs_median: national_median.map(|m| compare_to_median(stat, m)),
        })
        .collect();

    let detailed_tracks = config
        .categorize
        .detailed_tracks
        .then(|| detailed_track_breakdown(&coordinator.filtered_records(&selection.state)));

    let output = Output {
        ingest: repo.report(),
        national_median,
        regions,
        selection,
        detailed_tracks,
    };

    let json = if args.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{json}");

    Ok(())
}
