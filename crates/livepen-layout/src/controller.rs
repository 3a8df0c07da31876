#![forbid(unsafe_code)]

//! Layout state machine.
//!
//! ```text
//! orientation:  Stacked <-> SideBySide        (viewport width, every resize)
//! drag:         Idle -> Dragging(axis) -> Idle (start / end, cancel, axis change)
//! pane mode:    Split <-> PreviewOnly         (toggle, stacked only)
//!               PreviewOnly -> Split          (forced on entering SideBySide)
//! ```
//!
//! Every handler returns a [`LayoutTransition`] so hosts and tests can observe
//! exactly what happened, including explicit no-ops.
//!
//! # Failure Modes
//!
//! None at runtime. Pointer positions outside the container are clamped.
//! Invalid configuration is rejected up front by [`LayoutConfig::validate`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{
    DEFAULT_EDITOR_SHARE_BPS, PaneGeometry, PointerPosition, ResizeAxis, SHARE_SCALE_BPS,
};
use crate::orientation::{AxisMinimums, Orientation, OrientationPolicy, PaneMode};
use crate::surface::{CursorStyle, LayoutSurface};

/// Tunables for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub orientation: OrientationPolicy,
    pub minimums: AxisMinimums,
    /// Editor share before the first drag, in basis points.
    pub default_editor_share_bps: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: OrientationPolicy::default(),
            minimums: AxisMinimums::default(),
            default_editor_share_bps: DEFAULT_EDITOR_SHARE_BPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutConfigError {
    #[error("stacked breakpoint must be positive")]
    ZeroBreakpoint,
    #[error("minimum pane extent for the {axis:?} axis must be positive")]
    ZeroMinimum { axis: ResizeAxis },
    #[error("default editor share {bps} bps is outside 0..=10000")]
    ShareOutOfRange { bps: u16 },
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutConfigError> {
        if self.orientation.stacked_max_width == 0 {
            return Err(LayoutConfigError::ZeroBreakpoint);
        }
        for axis in [ResizeAxis::Vertical, ResizeAxis::Horizontal] {
            if self.minimums.for_axis(axis) == 0 {
                return Err(LayoutConfigError::ZeroMinimum { axis });
            }
        }
        if self.default_editor_share_bps > SHARE_SCALE_BPS {
            return Err(LayoutConfigError::ShareOutOfRange {
                bps: self.default_editor_share_bps,
            });
        }
        Ok(())
    }
}

/// Observable layout flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub orientation: Orientation,
    pub dragging: bool,
    pub pane_mode: PaneMode,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            orientation: Orientation::SideBySide,
            dragging: false,
            pane_mode: PaneMode::Split,
        }
    }
}

/// Why a handler left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutNoopReason {
    DragAlreadyInProgress,
    DividerHidden,
    NotDragging,
    ToggleUnavailable,
}

/// What one handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum LayoutEffect {
    Oriented {
        orientation: Orientation,
        viewport_width: u32,
        /// Preview-only mode was cleared by entering side-by-side.
        forced_split: bool,
        /// An in-flight drag was dropped because the axis changed.
        drag_canceled: bool,
        geometry: PaneGeometry,
    },
    DragStarted {
        axis: ResizeAxis,
    },
    DragUpdated {
        axis: ResizeAxis,
        offset: i64,
        geometry: PaneGeometry,
    },
    DragEnded {
        axis: ResizeAxis,
    },
    DragCanceled {
        axis: ResizeAxis,
    },
    PaneModeToggled {
        mode: PaneMode,
    },
    Noop {
        reason: LayoutNoopReason,
    },
}

/// One controller step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTransition {
    pub transition_id: u64,
    pub from: LayoutState,
    pub to: LayoutState,
    pub effect: LayoutEffect,
}

impl LayoutTransition {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self.effect, LayoutEffect::Noop { .. })
    }
}

/// Split-pane controller for one playground page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutController {
    config: LayoutConfig,
    state: LayoutState,
    /// `Some` exactly while `state.dragging`.
    drag_axis: Option<ResizeAxis>,
    editor_share_bps: u16,
    geometry: Option<PaneGeometry>,
    transition_counter: u64,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutController {
    /// Build a controller. Call [`Self::viewport_resized`] once on load to
    /// classify the initial viewport.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            state: LayoutState::default(),
            drag_axis: None,
            editor_share_bps: config.default_editor_share_bps.min(SHARE_SCALE_BPS),
            geometry: None,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> LayoutState {
        self.state
    }

    /// Last geometry applied to the surface.
    #[must_use]
    pub const fn geometry(&self) -> Option<PaneGeometry> {
        self.geometry
    }

    /// Remembered editor share, reapplied on resize and orientation changes.
    #[must_use]
    pub const fn editor_share_bps(&self) -> u16 {
        self.editor_share_bps
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Reclassify the viewport and re-derive geometry for the active axis.
    pub fn viewport_resized<S: LayoutSurface + ?Sized>(
        &mut self,
        viewport_width: u32,
        surface: &mut S,
    ) -> LayoutTransition {
        let from = self.state;
        let orientation = self.config.orientation.classify(viewport_width);

        let drag_canceled = orientation != from.orientation && self.end_drag(surface).is_some();

        self.state.orientation = orientation;
        surface.apply_orientation(orientation);

        let mut forced_split = false;
        if orientation == Orientation::SideBySide {
            forced_split = self.state.pane_mode != PaneMode::Split;
            self.state.pane_mode = PaneMode::Split;
            surface.apply_pane_mode(PaneMode::Split);
            surface.set_toggle_label(PaneMode::Split.toggle_label());
        }

        let geometry = self.relayout(surface);

        #[cfg(feature = "tracing")]
        if orientation != from.orientation {
            tracing::debug!(
                message = "layout.orientation",
                viewport_width,
                orientation = %orientation,
                forced_split,
                drag_canceled,
            );
        }

        self.record(
            from,
            LayoutEffect::Oriented {
                orientation,
                viewport_width,
                forced_split,
                drag_canceled,
                geometry,
            },
        )
    }

    /// Divider pressed: begin dragging along the current axis.
    pub fn drag_start<S: LayoutSurface + ?Sized>(&mut self, surface: &mut S) -> LayoutTransition {
        let from = self.state;
        if self.state.dragging {
            return self.noop(LayoutNoopReason::DragAlreadyInProgress);
        }
        if !self.state.pane_mode.editor_visible() {
            return self.noop(LayoutNoopReason::DividerHidden);
        }

        let axis = self.state.orientation.axis();
        self.drag_axis = Some(axis);
        self.state.dragging = true;
        surface.set_cursor(CursorStyle::for_drag(axis));

        #[cfg(feature = "tracing")]
        tracing::debug!(message = "layout.drag", phase = "start", axis = ?axis);

        self.record(from, LayoutEffect::DragStarted { axis })
    }

    /// Pointer moved anywhere on the page.
    pub fn drag_move<S: LayoutSurface + ?Sized>(
        &mut self,
        position: PointerPosition,
        surface: &mut S,
    ) -> LayoutTransition {
        let from = self.state;
        let Some(axis) = self.drag_axis else {
            return self.noop(LayoutNoopReason::NotDragging);
        };

        let bounds = surface.container_bounds();
        let offset = i64::from(position.along(axis)) - i64::from(bounds.leading_edge(axis));
        let geometry = PaneGeometry::at_offset(
            axis,
            bounds.extent(axis),
            surface.divider_thickness(axis),
            self.config.minimums.for_axis(axis),
            offset,
        );
        self.editor_share_bps = geometry.editor_share_bps();
        self.geometry = Some(geometry);
        surface.apply_geometry(&geometry);

        self.record(
            from,
            LayoutEffect::DragUpdated {
                axis,
                offset,
                geometry,
            },
        )
    }

    /// Pointer released anywhere on the page.
    ///
    /// The default cursor is restored even when no drag was active.
    pub fn drag_end<S: LayoutSurface + ?Sized>(&mut self, surface: &mut S) -> LayoutTransition {
        let from = self.state;
        match self.end_drag(surface) {
            Some(axis) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    message = "layout.drag",
                    phase = "end",
                    axis = ?axis,
                    editor_share_bps = self.editor_share_bps,
                );
                self.record(from, LayoutEffect::DragEnded { axis })
            }
            None => {
                surface.set_cursor(CursorStyle::Default);
                self.noop(LayoutNoopReason::NotDragging)
            }
        }
    }

    /// Drop an in-flight drag without a pointer-up (focus loss, lost capture).
    pub fn cancel_drag<S: LayoutSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Option<LayoutTransition> {
        let from = self.state;
        let axis = self.end_drag(surface)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "layout.drag", phase = "cancel", axis = ?axis);
        Some(self.record(from, LayoutEffect::DragCanceled { axis }))
    }

    /// Flip between split and preview-only. Only available while stacked.
    pub fn toggle_preview<S: LayoutSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> LayoutTransition {
        let from = self.state;
        if !self.state.orientation.is_stacked() {
            return self.noop(LayoutNoopReason::ToggleUnavailable);
        }

        let mode = self.state.pane_mode.toggled();
        if !mode.editor_visible() {
            // The divider disappears with the editor.
            self.end_drag(surface);
        }
        self.state.pane_mode = mode;
        surface.apply_pane_mode(mode);
        surface.set_toggle_label(mode.toggle_label());

        #[cfg(feature = "tracing")]
        tracing::debug!(message = "layout.toggle", mode = ?mode);

        self.record(from, LayoutEffect::PaneModeToggled { mode })
    }

    fn relayout<S: LayoutSurface + ?Sized>(&mut self, surface: &mut S) -> PaneGeometry {
        let axis = self.state.orientation.axis();
        let geometry = PaneGeometry::from_share(
            axis,
            surface.container_bounds().extent(axis),
            surface.divider_thickness(axis),
            self.config.minimums.for_axis(axis),
            self.editor_share_bps,
        );
        self.geometry = Some(geometry);
        surface.apply_geometry(&geometry);
        geometry
    }

    fn end_drag<S: LayoutSurface + ?Sized>(&mut self, surface: &mut S) -> Option<ResizeAxis> {
        let axis = self.drag_axis.take()?;
        self.state.dragging = false;
        surface.set_cursor(CursorStyle::Default);
        Some(axis)
    }

    fn noop(&mut self, reason: LayoutNoopReason) -> LayoutTransition {
        let state = self.state;
        self.record(state, LayoutEffect::Noop { reason })
    }

    fn record(&mut self, from: LayoutState, effect: LayoutEffect) -> LayoutTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        LayoutTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        }
    }
}
