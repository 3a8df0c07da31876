#![forbid(unsafe_code)]

//! Host collaborators the layout controller reads from and writes to.

use serde::{Deserialize, Serialize};

use crate::geometry::{PaneGeometry, Rect, ResizeAxis};
use crate::orientation::{Orientation, PaneMode};

/// Page cursor affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorStyle {
    #[default]
    Default,
    RowResize,
    ColResize,
}

impl CursorStyle {
    /// Cursor shown while dragging along `axis`.
    #[must_use]
    pub const fn for_drag(axis: ResizeAxis) -> Self {
        match axis {
            ResizeAxis::Vertical => Self::RowResize,
            ResizeAxis::Horizontal => Self::ColResize,
        }
    }

    /// CSS `cursor` value.
    #[must_use]
    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::RowResize => "row-resize",
            Self::ColResize => "col-resize",
        }
    }
}

/// The container, divider, panes and toggle control of one playground page.
///
/// Geometry is read on demand (hosts return current, rounded measurements);
/// everything else is a write the host applies immediately.
pub trait LayoutSurface {
    /// Bounding box of the container holding both panes and the divider.
    fn container_bounds(&self) -> Rect;

    /// Divider thickness along `axis`.
    fn divider_thickness(&self, axis: ResizeAxis) -> u32;

    fn apply_orientation(&mut self, orientation: Orientation);

    fn apply_geometry(&mut self, geometry: &PaneGeometry);

    /// Show or hide the editor pane and divider.
    fn apply_pane_mode(&mut self, mode: PaneMode);

    fn set_cursor(&mut self, cursor: CursorStyle);

    fn set_toggle_label(&mut self, label: &str);
}

impl<T: LayoutSurface + ?Sized> LayoutSurface for &mut T {
    fn container_bounds(&self) -> Rect {
        (**self).container_bounds()
    }

    fn divider_thickness(&self, axis: ResizeAxis) -> u32 {
        (**self).divider_thickness(axis)
    }

    fn apply_orientation(&mut self, orientation: Orientation) {
        (**self).apply_orientation(orientation);
    }

    fn apply_geometry(&mut self, geometry: &PaneGeometry) {
        (**self).apply_geometry(geometry);
    }

    fn apply_pane_mode(&mut self, mode: PaneMode) {
        (**self).apply_pane_mode(mode);
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        (**self).set_cursor(cursor);
    }

    fn set_toggle_label(&mut self, label: &str) {
        (**self).set_toggle_label(label);
    }
}
