#![forbid(unsafe_code)]

//! Split-pane layout controller for the playground page.
//!
//! # Role in livepen
//! `livepen-layout` decides how the editor and preview panes share the
//! container: stacked (narrow viewports) or side by side, where the divider
//! sits after a drag, and whether the editor is hidden in favor of the
//! preview. It never reads editor content.
//!
//! # Primary responsibilities
//! - **OrientationPolicy**: viewport width to [`Orientation`] (`<= 768` is stacked).
//! - **PaneGeometry**: integer pane extents along the active [`ResizeAxis`].
//! - **LayoutController**: the state machine reacting to resize, drag and
//!   toggle events, applying results through a [`LayoutSurface`].
//!
//! # Invariants
//! 1. `editor + preview + divider == container` after every applied geometry.
//! 2. `dragging` is only true between a drag start and the next drag end,
//!    cancel, or axis change.
//! 3. Entering side-by-side always resets [`PaneMode`] to `Split`.

pub mod controller;
pub mod geometry;
pub mod orientation;
pub mod surface;

pub use controller::{
    LayoutConfig, LayoutConfigError, LayoutController, LayoutEffect, LayoutNoopReason,
    LayoutState, LayoutTransition,
};
pub use geometry::{
    DEFAULT_EDITOR_SHARE_BPS, PaneGeometry, PointerPosition, Rect, ResizeAxis, SHARE_SCALE_BPS,
};
pub use orientation::{
    AxisMinimums, MIN_PANE_HORIZONTAL, MIN_PANE_VERTICAL, Orientation, OrientationPolicy,
    PaneMode, STACKED_MAX_WIDTH, TOGGLE_LABEL_EDITOR, TOGGLE_LABEL_PREVIEW,
};
pub use surface::{CursorStyle, LayoutSurface};
