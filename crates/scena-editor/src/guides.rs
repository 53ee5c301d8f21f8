//! Ruler guides and snapping.
//!
//! Each axis snaps to the viewport edges, its center, and the guide lines
//! the user dragged out of the rulers.

use crate::input::{GuideEvent, Orientation};

#[derive(Debug, Clone, PartialEq)]
pub struct Guides {
    width: f64,
    height: f64,
    threshold: f64,
    horizontal: Vec<f64>,
    vertical: Vec<f64>,
}

impl Guides {
    pub fn new(width: f64, height: f64, threshold: f64) -> Self {
        Self {
            width,
            height,
            threshold,
            horizontal: Vec::new(),
            vertical: Vec::new(),
        }
    }

    pub fn handle(&mut self, event: &GuideEvent) {
        match event {
            GuideEvent::Changed {
                orientation,
                guides,
            } => self.set(*orientation, guides.clone()),
        }
    }

    /// Replace the user guides of one ruler.
    pub fn set(&mut self, orientation: Orientation, guides: Vec<f64>) {
        match orientation {
            Orientation::Horizontal => self.horizontal = guides,
            Orientation::Vertical => self.vertical = guides,
        }
    }

    pub fn user_guides(&self, orientation: Orientation) -> &[f64] {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// All snap lines of one axis: `0`, the viewport size, half of it, then
    /// the user guides. Horizontal lines are y positions.
    pub fn snap_lines(&self, orientation: Orientation) -> Vec<f64> {
        let size = match orientation {
            Orientation::Horizontal => self.height,
            Orientation::Vertical => self.width,
        };
        let mut lines = vec![0.0, size, size / 2.0];
        lines.extend_from_slice(self.user_guides(orientation));
        lines
    }

    /// Snap `value` to the nearest line within the threshold.
    pub fn snap(&self, value: f64, orientation: Orientation) -> f64 {
        self.snap_lines(orientation)
            .into_iter()
            .map(|line| (line, (line - value).abs()))
            .filter(|(_, dist)| *dist <= self.threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(value, |(line, _)| line)
    }

    /// Offset that puts the closest of a box's start edge, center or end
    /// edge onto a snap line of `orientation`. `0` when nothing is within
    /// the threshold.
    pub fn snap_offset(&self, start: f64, size: f64, orientation: Orientation) -> f64 {
        let lines = self.snap_lines(orientation);
        [start, start + size / 2.0, start + size]
            .into_iter()
            .flat_map(|edge| lines.iter().map(move |line| line - edge))
            .filter(|offset| offset.abs() <= self.threshold)
            .min_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0)
    }

    pub fn clear(&mut self) {
        self.horizontal.clear();
        self.vertical.clear();
    }
}

/// Ruler tick unit for a zoom level: 50px, widened when zoomed out.
pub fn ruler_unit(zoom: f64) -> f64 {
    if zoom < 0.8 && zoom > 0.0 {
        (1.0 / zoom).floor() * 50.0
    } else {
        50.0
    }
}
