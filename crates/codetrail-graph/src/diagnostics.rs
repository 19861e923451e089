//! Route and channel diagnostics. Reports are measured against the strict
//! interior of non-endpoint node rectangles (no padding) and formatted in
//! edge-id order, so fixture suites can assert on the rendered text.

use crate::elements::LayoutElements;
use crate::geometry::{Rect, segment_intersects_rect};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReport {
    pub edge_id: String,
    pub turns: u32,
    /// Obstacle rectangles the route cuts through.
    pub collisions: u32,
    /// Individual segment/rectangle crossings.
    pub intersections: u32,
    pub trunk_deviation: f32,
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: turns={} collisions={} intersections={} trunk_deviation={:.1}",
            self.edge_id, self.turns, self.collisions, self.intersections, self.trunk_deviation
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelReport {
    pub channel_id: String,
    pub edge_count: u32,
    pub weight: u32,
}

impl fmt::Display for ChannelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: edges={} weight={}",
            self.channel_id, self.edge_count, self.weight
        )
    }
}

pub fn route_reports(elements: &LayoutElements) -> Vec<RouteReport> {
    let mut reports: Vec<RouteReport> = elements
        .edges
        .iter()
        .map(|edge| {
            let obstacles: Vec<Rect> = elements
                .nodes
                .iter()
                .filter(|node| node.id != edge.source && node.id != edge.target)
                .map(|node| node.rect())
                .collect();

            let mut collisions = 0u32;
            let mut intersections = 0u32;
            for rect in &obstacles {
                let mut hit = false;
                for pair in edge.route_points.windows(2) {
                    if segment_intersects_rect(pair[0], pair[1], rect) {
                        intersections += 1;
                        hit = true;
                    }
                }
                if hit {
                    collisions += 1;
                }
            }

            let trunk_deviation = match edge.trunk_coord {
                Some(trunk) if edge.route_points.len() > 2 => edge.route_points
                    [1..edge.route_points.len() - 1]
                    .iter()
                    .map(|point| (point.x - trunk).abs().min((point.y - trunk).abs()))
                    .fold(f32::MAX, f32::min),
                _ => 0.0,
            };

            RouteReport {
                edge_id: edge.id.clone(),
                turns: edge.route_points.len().saturating_sub(2) as u32,
                collisions,
                intersections,
                trunk_deviation,
            }
        })
        .collect();
    reports.sort_by(|left, right| left.edge_id.cmp(&right.edge_id));
    reports
}

pub fn channel_reports(elements: &LayoutElements) -> Vec<ChannelReport> {
    let mut reports: Vec<ChannelReport> = Vec::new();
    for edge in &elements.edges {
        let Some(channel_id) = &edge.channel_id else {
            continue;
        };
        match reports
            .iter_mut()
            .find(|report| &report.channel_id == channel_id)
        {
            Some(report) => report.edge_count += 1,
            None => reports.push(ChannelReport {
                channel_id: channel_id.clone(),
                edge_count: 1,
                weight: edge.channel_weight.unwrap_or(0),
            }),
        }
    }
    reports.sort_by(|left, right| left.channel_id.cmp(&right.channel_id));
    reports
}

pub fn format_route_reports(reports: &[RouteReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&report.to_string());
        out.push('\n');
    }
    out
}
