//! Skill → track → salary-quartile flow graph.
//!
//! ```text
//!   skills (0..5)      tracks (5..9)       quartiles (9..13)
//!   Python ─┐
//!   R      ─┼────────▶ DataScientist ─┐
//!   Spark  ─┼────────▶ DataEngineer  ─┼──▶ Q1 .. Q4
//!   Cloud  ─┼────────▶ DataAnalyst   ─┤
//!   Excel  ─┘          MLEngineer    ─┘
//! ```
//!
//! Node positions are fixed by the taxonomy order so consumers can address
//! nodes by index. Records classified as `Track::Other` have no node and do
//! not contribute links.

use std::collections::BTreeMap;

use serde::Serialize;

use super::aggregate::salary_quartiles;
use crate::data::model::{Quartile, Skill, Track};
use crate::data::repository::CategorizedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowLayer {
    Skill,
    Track,
    Quartile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub layer: FlowLayer,
    pub name: &'static str,
}

/// Auxiliary data carried by track → quartile links.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkMeta {
    pub mean_salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub weight: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<LinkMeta>,
}

/// A complete flow graph. Always rebuilt as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

const SKILL_OFFSET: usize = 0;
const TRACK_OFFSET: usize = SKILL_OFFSET + Skill::ALL.len();
const QUARTILE_OFFSET: usize = TRACK_OFFSET + Track::FLOW.len();

pub fn skill_node(skill: Skill) -> usize {
    SKILL_OFFSET + skill as usize
}

/// Node index of a track; `None` for `Track::Other`.
pub fn track_node(track: Track) -> Option<usize> {
    Track::FLOW
        .iter()
        .position(|t| *t == track)
        .map(|i| TRACK_OFFSET + i)
}

pub fn quartile_node(quartile: Quartile) -> usize {
    QUARTILE_OFFSET + quartile as usize
}

fn nodes() -> Vec<FlowNode> {
    let skills = Skill::ALL.iter().map(|s| FlowNode {
        layer: FlowLayer::Skill,
        name: s.label(),
    });
    let tracks = Track::FLOW.iter().map(|t| FlowNode {
        layer: FlowLayer::Track,
        name: t.label(),
    });
    let quartiles = Quartile::ALL.iter().map(|q| FlowNode {
        layer: FlowLayer::Quartile,
        name: q.label(),
    });
    skills.chain(tracks).chain(quartiles).collect()
}

/// Build the graph for `records`. Quartile boundaries come from `records`
/// themselves, so a region's flow reflects its own salary distribution.
pub fn build_flow_graph(records: &[&CategorizedRecord]) -> FlowGraph {
    let mut skill_track: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut track_quartile: BTreeMap<(usize, usize), (usize, f64)> = BTreeMap::new();

    let boundaries = salary_quartiles(records);

    for rec in records {
        let Some(track) = track_node(rec.track) else {
            continue;
        };
        for skill in Skill::ALL {
            if rec.record.has_skill(skill) {
                *skill_track.entry((skill_node(skill), track)).or_default() += 1;
            }
        }
        if let Some(bounds) = &boundaries {
            let quartile = quartile_node(bounds.bucket(rec.record.salary_avg));
            let cell = track_quartile.entry((track, quartile)).or_default();
            cell.0 += 1;
            cell.1 += rec.record.salary_avg;
        }
    }

    // BTreeMap iteration yields links in (source, target) order, which is
    // the taxonomy order.
    let mut links: Vec<FlowLink> = skill_track
        .into_iter()
        .map(|((source, target), weight)| FlowLink {
            source,
            target,
            weight,
            meta: None,
        })
        .collect();
    links.extend(
        track_quartile
            .into_iter()
            .map(|((source, target), (count, sum))| FlowLink {
                source,
                target,
                weight: count,
                meta: Some(LinkMeta {
                    mean_salary: sum / count as f64,
                }),
            }),
    );

    log::debug!(
        "Built flow graph from {} records: {} links",
        records.len(),
        links.len()
    );

    FlowGraph {
        nodes: nodes(),
        links,
    }
}

impl FlowGraph {
    /// Total weight flowing out of `node`.
    pub fn outflow(&self, node: usize) -> usize {
        self.links
            .iter()
            .filter(|l| l.source == node)
            .map(|l| l.weight)
            .sum()
    }

    /// Total weight flowing into `node`.
    pub fn inflow(&self, node: usize) -> usize {
        self.links
            .iter()
            .filter(|l| l.target == node)
            .map(|l| l.weight)
            .sum()
    }

    pub fn link(&self, source: usize, target: usize) -> Option<&FlowLink> {
        self.links
            .iter()
            .find(|l| l.source == source && l.target == target)
    }
}
