use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::analysis::aggregate::{
    SizeBucketStat, SkillFrequency, TrackStat, size_bucket_stats, skill_frequency,
    track_breakdown,
};
use crate::analysis::flow::{FlowGraph, build_flow_graph};
use crate::data::filter::{FilterState, filtered_records};
use crate::data::model::{RegionCode, RegionStatistic, SizeBucket, Track};
use crate::data::regions::{RegionLookup, is_known_region};
use crate::data::repository::{CategorizedRecord, JobRepository};
use crate::error::IngestResult;
use crate::ingest::PendingDataset;

// ---------------------------------------------------------------------------
// Events and phases
// ---------------------------------------------------------------------------

/// A selection made in one of the views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectionEvent {
    SelectRegion(RegionCode),
    SelectTrack(Track),
    SelectSize(SizeBucket),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionPhase {
    Unselected,
    RegionSelected,
    RegionAndTrackSelected,
}

impl SelectionPhase {
    pub fn of(state: &FilterState) -> Self {
        match (&state.selected_region, state.selected_track) {
            (None, _) => SelectionPhase::Unselected,
            (Some(_), None) => SelectionPhase::RegionSelected,
            (Some(_), Some(_)) => SelectionPhase::RegionAndTrackSelected,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Everything the dependent views render for one selection. Replaced as a
/// whole on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    /// Records behind `skill_frequency`, `size_stats` and `tracks`.
    pub record_count: usize,
    pub skill_frequency: SkillFrequency,
    pub size_stats: Vec<SizeBucketStat>,
    pub tracks: Vec<TrackStat<Track>>,
    /// Always scoped to the region (or everything), never to the track.
    pub flow_graph: Arc<FlowGraph>,
}

impl DerivedViews {
    fn compute(records: &[&CategorizedRecord], flow_graph: Arc<FlowGraph>) -> Self {
        Self {
            record_count: records.len(),
            skill_frequency: skill_frequency(records),
            size_stats: size_bucket_stats(records),
            tracks: track_breakdown(records),
            flow_graph,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// What subscribers receive after every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionChanged {
    /// Increases by one per transition; a consumer holding a lower number
    /// is looking at a superseded selection.
    pub generation: u64,
    pub event: Option<SelectionEvent>,
    pub phase: SelectionPhase,
    pub state: FilterState,
    pub views: Arc<DerivedViews>,
}

/// Views for the unselected dashboard.
pub fn initial_views(repo: &JobRepository) -> DerivedViews {
    let all = repo.all();
    DerivedViews::compute(&all, Arc::new(build_flow_graph(&all)))
}

/// Apply `event` to the previous selection. Returns `None` when the event
/// does not apply (a track or size with no region, an unknown region code),
/// in which case nothing changes.
pub fn transition(
    repo: &JobRepository,
    state: &FilterState,
    views: &Arc<DerivedViews>,
    event: &SelectionEvent,
) -> Option<(FilterState, Arc<DerivedViews>)> {
    match event {
        SelectionEvent::SelectRegion(region) => {
            if !is_known_region(region) {
                return None;
            }
            let next = FilterState::for_region(region.clone());
            let records = filtered_records(repo, &next);
            let flow = Arc::new(build_flow_graph(&records));
            Some((next, Arc::new(DerivedViews::compute(&records, flow))))
        }
        SelectionEvent::SelectTrack(track) => {
            state.selected_region.as_ref()?;
            let mut next = state.clone();
            next.selected_track = Some(*track);
            let records = filtered_records(repo, &next);
            let flow = Arc::clone(&views.flow_graph);
            Some((next, Arc::new(DerivedViews::compute(&records, flow))))
        }
        SelectionEvent::SelectSize(size) => {
            state.selected_region.as_ref()?;
            let mut next = state.clone();
            next.selected_size = Some(*size);
            Some((next, Arc::clone(views)))
        }
        SelectionEvent::Clear => Some((FilterState::default(), Arc::new(initial_views(repo)))),
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&SelectionChanged)>;

/// Owns the selection and publishes the derived views.
pub struct Coordinator {
    repo: Arc<JobRepository>,
    current: Arc<SelectionChanged>,
    subscribers: Vec<(SubscriptionId, Handler)>,
    next_subscription: u64,
}

impl Coordinator {
    pub fn new(repo: Arc<JobRepository>) -> Self {
        let views = Arc::new(initial_views(&repo));
        Self {
            repo,
            current: Arc::new(SelectionChanged {
                generation: 0,
                event: None,
                phase: SelectionPhase::Unselected,
                state: FilterState::default(),
                views,
            }),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Wait for a pending load and start unselected. Fails if the dataset is
    /// not ready within `timeout`.
    pub async fn from_pending(pending: PendingDataset, timeout: Duration) -> IngestResult<Self> {
        let repo = pending.wait(timeout).await?;
        Ok(Self::new(Arc::new(repo)))
    }

    pub fn repository(&self) -> &Arc<JobRepository> {
        &self.repo
    }

    // -- selection events --

    pub fn select_region(&mut self, region: impl Into<RegionCode>) -> bool {
        self.dispatch(SelectionEvent::SelectRegion(region.into()))
    }

    /// Select the region behind a map feature. A feature the lookup does not
    /// know is ignored.
    pub fn select_feature(&mut self, feature_id: &str, lookup: &dyn RegionLookup) -> bool {
        match lookup.lookup(feature_id) {
            Some(region) => self.select_region(region),
            None => {
                log::debug!("No region for feature {feature_id:?}");
                false
            }
        }
    }

    pub fn select_track(&mut self, track: Track) -> bool {
        self.dispatch(SelectionEvent::SelectTrack(track))
    }

    pub fn select_size(&mut self, size: SizeBucket) -> bool {
        self.dispatch(SelectionEvent::SelectSize(size))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.dispatch(SelectionEvent::Clear)
    }

    /// Apply an event and publish the result. Returns whether anything
    /// changed.
    pub fn dispatch(&mut self, event: SelectionEvent) -> bool {
        let Some((state, views)) =
            transition(&self.repo, &self.current.state, &self.current.views, &event)
        else {
            log::debug!("Ignoring {event:?} in {:?}", self.current.phase);
            return false;
        };

        if let SelectionEvent::SelectSize(size) = &event {
            log::info!("Recorded size selection {size:?}; views unchanged");
        }

        let changed = Arc::new(SelectionChanged {
            generation: self.current.generation + 1,
            phase: SelectionPhase::of(&state),
            event: Some(event),
            state,
            views,
        });
        log::debug!(
            "Selection #{} {:?}: {} records",
            changed.generation,
            changed.phase,
            changed.views.record_count
        );

        self.current = Arc::clone(&changed);
        for (_, handler) in &mut self.subscribers {
            handler(changed.as_ref());
        }
        true
    }

    // -- subscriptions --

    pub fn on_selection_changed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SelectionChanged) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // -- read access --

    /// The latest published selection and views.
    pub fn current(&self) -> Arc<SelectionChanged> {
        Arc::clone(&self.current)
    }

    pub fn filter_state(&self) -> FilterState {
        self.current.state.clone()
    }

    pub fn region_statistics(&self) -> &[RegionStatistic] {
        self.repo.region_statistics()
    }

    pub fn national_median(&self) -> Option<f64> {
        self.repo.national_median()
    }

    pub fn filtered_records(&self, context: &FilterState) -> Vec<&CategorizedRecord> {
        filtered_records(&self.repo, context)
    }

    pub fn skill_frequency(&self, context: &FilterState) -> SkillFrequency {
        skill_frequency(&self.filtered_records(context))
    }

    pub fn size_bucket_stats(&self, context: &FilterState) -> Vec<SizeBucketStat> {
        size_bucket_stats(&self.filtered_records(context))
    }

    pub fn flow_graph(&self, context: &FilterState) -> FlowGraph {
        build_flow_graph(&self.filtered_records(&context.region_only()))
    }
}
