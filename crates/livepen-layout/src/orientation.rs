#![forbid(unsafe_code)]

//! Viewport-width breakpoint and pane visibility modes.
//!
//! Orientation is a pure function of the current viewport width: no
//! hysteresis, no debounce. It is recomputed on load and on every resize
//! notification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::ResizeAxis;

/// Widest viewport that still stacks the panes.
pub const STACKED_MAX_WIDTH: u32 = 768;

/// Minimum pane height while stacked.
pub const MIN_PANE_VERTICAL: u32 = 100;

/// Minimum pane width while side by side.
pub const MIN_PANE_HORIZONTAL: u32 = 200;

/// Toggle label offered while both panes are visible.
pub const TOGGLE_LABEL_PREVIEW: &str = "Preview";

/// Toggle label offered while only the preview is visible.
pub const TOGGLE_LABEL_EDITOR: &str = "Editor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Editor above preview.
    Stacked,
    /// Editor left of preview.
    SideBySide,
}

impl Orientation {
    #[must_use]
    pub const fn axis(self) -> ResizeAxis {
        match self {
            Self::Stacked => ResizeAxis::Vertical,
            Self::SideBySide => ResizeAxis::Horizontal,
        }
    }

    #[must_use]
    pub const fn is_stacked(self) -> bool {
        matches!(self, Self::Stacked)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stacked => f.write_str("stacked"),
            Self::SideBySide => f.write_str("side_by_side"),
        }
    }
}

/// Width breakpoint between the two orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrientationPolicy {
    /// Inclusive upper bound of the stacked range.
    pub stacked_max_width: u32,
}

impl OrientationPolicy {
    #[must_use]
    pub const fn classify(self, viewport_width: u32) -> Orientation {
        if viewport_width <= self.stacked_max_width {
            Orientation::Stacked
        } else {
            Orientation::SideBySide
        }
    }
}

impl Default for OrientationPolicy {
    fn default() -> Self {
        Self {
            stacked_max_width: STACKED_MAX_WIDTH,
        }
    }
}

/// Per-axis minimum pane extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisMinimums {
    pub vertical: u32,
    pub horizontal: u32,
}

impl AxisMinimums {
    #[must_use]
    pub const fn for_axis(self, axis: ResizeAxis) -> u32 {
        match axis {
            ResizeAxis::Vertical => self.vertical,
            ResizeAxis::Horizontal => self.horizontal,
        }
    }
}

impl Default for AxisMinimums {
    fn default() -> Self {
        Self {
            vertical: MIN_PANE_VERTICAL,
            horizontal: MIN_PANE_HORIZONTAL,
        }
    }
}

/// Which panes are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneMode {
    /// Editor, divider and preview.
    #[default]
    Split,
    /// Preview only (stacked orientation).
    PreviewOnly,
}

impl PaneMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Split => Self::PreviewOnly,
            Self::PreviewOnly => Self::Split,
        }
    }

    /// Label for the toggle control: names the mode pressing it switches to.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Split => TOGGLE_LABEL_PREVIEW,
            Self::PreviewOnly => TOGGLE_LABEL_EDITOR,
        }
    }

    #[must_use]
    pub const fn editor_visible(self) -> bool {
        matches!(self, Self::Split)
    }
}
