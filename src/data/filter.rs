use serde::Serialize;

use super::model::{RegionCode, SizeBucket, Track};
use super::repository::{CategorizedRecord, JobRepository};

// ---------------------------------------------------------------------------
// Filter state: region → track hierarchy plus a recorded size
// ---------------------------------------------------------------------------

/// The current selection. Track and size only mean something under a
/// selected region; selecting a region clears both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub selected_region: Option<RegionCode>,
    pub selected_track: Option<Track>,
    /// Recorded but never used to filter a view.
    pub selected_size: Option<SizeBucket>,
}

impl FilterState {
    pub fn for_region(region: impl Into<RegionCode>) -> Self {
        Self {
            selected_region: Some(region.into()),
            ..Default::default()
        }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.selected_track = Some(track);
        self
    }

    /// The same selection with the track dropped; the scope of the flow graph.
    pub fn region_only(&self) -> FilterState {
        FilterState {
            selected_region: self.selected_region.clone(),
            selected_track: None,
            selected_size: None,
        }
    }
}

/// Records passing the region and track filters. The size selection is
/// ignored; an empty result is a valid "no data" answer.
pub fn filtered_records<'a>(
    repo: &'a JobRepository,
    filters: &FilterState,
) -> Vec<&'a CategorizedRecord> {
    let Some(region) = filters.selected_region.as_deref() else {
        return repo.all();
    };
    repo.records()
        .iter()
        .filter(|rec| rec.record.region == region)
        .filter(|rec| match filters.selected_track {
            Some(track) => rec.track == track,
            None => true,
        })
        .collect()
}
