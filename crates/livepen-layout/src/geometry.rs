#![forbid(unsafe_code)]

//! Integer pane geometry along one resize axis.
//!
//! All values are whole CSS pixels. Hosts round fractional browser
//! measurements before handing them in, which keeps the sum invariant exact:
//!
//! ```text
//! editor + preview + divider == container
//! ```
//!
//! # Failure Modes
//!
//! None. Out-of-range offsets are clamped. A divider thicker than the
//! container is clamped to the container. A container too small for both
//! minimums is divided evenly (both panes then sit below the minimum).

use serde::{Deserialize, Serialize};

/// Basis-point scale for the remembered editor share.
pub const SHARE_SCALE_BPS: u16 = 10_000;

/// Even split.
pub const DEFAULT_EDITOR_SHARE_BPS: u16 = 5_000;

/// Axis along which pane extents are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeAxis {
    /// Heights, measured along `y` (stacked panes).
    Vertical,
    /// Widths, measured along `x` (side-by-side panes).
    Horizontal,
}

/// Axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Coordinate of the leading (top or left) edge on `axis`.
    #[must_use]
    pub const fn leading_edge(self, axis: ResizeAxis) -> i32 {
        match axis {
            ResizeAxis::Vertical => self.y,
            ResizeAxis::Horizontal => self.x,
        }
    }

    /// Extent (height or width) on `axis`.
    #[must_use]
    pub const fn extent(self, axis: ResizeAxis) -> u32 {
        match axis {
            ResizeAxis::Vertical => self.height,
            ResizeAxis::Horizontal => self.width,
        }
    }
}

/// Pointer location in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn along(self, axis: ResizeAxis) -> i32 {
        match axis {
            ResizeAxis::Vertical => self.y,
            ResizeAxis::Horizontal => self.x,
        }
    }
}

/// Editor and preview extents along the active axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneGeometry {
    pub axis: ResizeAxis,
    pub container: u32,
    pub divider: u32,
    pub editor: u32,
    pub preview: u32,
}

impl PaneGeometry {
    /// Place the divider `offset` units from the container's leading edge.
    #[must_use]
    pub fn at_offset(
        axis: ResizeAxis,
        container: u32,
        divider: u32,
        min_pane: u32,
        offset: i64,
    ) -> Self {
        let divider = divider.min(container);
        let available = container - divider;
        let (lo, hi) = editor_bounds(available, min_pane);
        let editor = offset.clamp(i64::from(lo), i64::from(hi)) as u32;
        Self {
            axis,
            container,
            divider,
            editor,
            preview: available - editor,
        }
    }

    /// Give the editor `share_bps` of the space left after the divider.
    #[must_use]
    pub fn from_share(
        axis: ResizeAxis,
        container: u32,
        divider: u32,
        min_pane: u32,
        share_bps: u16,
    ) -> Self {
        let available = container - divider.min(container);
        let share = u64::from(share_bps.min(SHARE_SCALE_BPS));
        let offset = u64::from(available) * share / u64::from(SHARE_SCALE_BPS);
        Self::at_offset(axis, container, divider, min_pane, offset as i64)
    }

    /// Editor share of the non-divider space, in basis points.
    #[must_use]
    pub fn editor_share_bps(&self) -> u16 {
        let available = self.editor + self.preview;
        if available == 0 {
            return DEFAULT_EDITOR_SHARE_BPS;
        }
        (u64::from(self.editor) * u64::from(SHARE_SCALE_BPS) / u64::from(available)) as u16
    }

    /// Sum of both panes and the divider. Always equals `container`.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.editor as u64 + self.preview as u64 + self.divider as u64
    }

    #[must_use]
    pub const fn respects_minimum(&self, min_pane: u32) -> bool {
        self.editor >= min_pane && self.preview >= min_pane
    }
}

fn editor_bounds(available: u32, min_pane: u32) -> (u32, u32) {
    if available >= min_pane.saturating_mul(2) {
        (min_pane, available - min_pane)
    } else {
        let half = available / 2;
        (half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: ResizeAxis = ResizeAxis::Vertical;
    const H: ResizeAxis = ResizeAxis::Horizontal;

    #[test]
    fn offset_inside_bounds_is_kept() {
        let g = PaneGeometry::at_offset(H, 1000, 6, 200, 400);
        assert_eq!(g.editor, 400);
        assert_eq!(g.preview, 594);
        assert_eq!(g.total(), 1000);
    }

    #[test]
    fn offset_below_minimum_clamps_to_minimum() {
        let g = PaneGeometry::at_offset(V, 600, 6, 100, -50);
        assert_eq!(g.editor, 100);
        assert_eq!(g.preview, 494);
    }

    #[test]
    fn offset_past_end_leaves_preview_at_minimum() {
        let g = PaneGeometry::at_offset(H, 1000, 6, 200, 5_000);
        assert_eq!(g.preview, 200);
        assert_eq!(g.editor, 794);
        assert!(g.respects_minimum(200));
        assert_eq!(g.total(), 1000);
    }

    #[test]
    fn cramped_container_splits_evenly() {
        let g = PaneGeometry::at_offset(H, 301, 5, 200, 10);
        assert_eq!(g.editor, 148);
        assert_eq!(g.preview, 148);
        assert_eq!(g.total(), 301);
    }

    #[test]
    fn divider_thicker_than_container_is_clamped() {
        let g = PaneGeometry::at_offset(V, 4, 10, 100, 2);
        assert_eq!(g.divider, 4);
        assert_eq!(g.editor, 0);
        assert_eq!(g.preview, 0);
        assert_eq!(g.total(), 4);
    }

    #[test]
    fn share_round_trips_within_a_unit() {
        let g = PaneGeometry::from_share(H, 1206, 6, 200, 2_500);
        assert_eq!(g.editor, 300);
        assert_eq!(g.preview, 900);
        assert_eq!(g.editor_share_bps(), 2_500);

        let again = PaneGeometry::from_share(H, 1206, 6, 200, g.editor_share_bps());
        assert_eq!(again, g);
    }

    #[test]
    fn default_share_is_even() {
        let g = PaneGeometry::from_share(V, 806, 6, 100, DEFAULT_EDITOR_SHARE_BPS);
        assert_eq!(g.editor, 400);
        assert_eq!(g.preview, 400);
    }

    #[test]
    fn empty_container_reports_default_share() {
        let g = PaneGeometry::from_share(V, 0, 6, 100, 9_000);
        assert_eq!(g.total(), 0);
        assert_eq!(g.editor_share_bps(), DEFAULT_EDITOR_SHARE_BPS);
    }

    #[test]
    fn rect_and_pointer_project_onto_axes() {
        let rect = Rect::new(10, 20, 300, 400);
        assert_eq!(rect.leading_edge(V), 20);
        assert_eq!(rect.leading_edge(H), 10);
        assert_eq!(rect.extent(V), 400);
        assert_eq!(rect.extent(H), 300);

        let p = PointerPosition::new(-3, 7);
        assert_eq!(p.along(H), -3);
        assert_eq!(p.along(V), 7);
    }
}
