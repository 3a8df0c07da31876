#![forbid(unsafe_code)]

//! `livepen-web` drives one playground page from host-supplied events.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes edits, resizes,
//!   pointer signals and clock ticks; nothing here touches a DOM.
//! - **Deterministic time**: the host advances a monotonic clock explicitly,
//!   so delayed keyboard reveals replay exactly.
//! - **Headless surfaces**: [`HeadlessPreview`] and [`HeadlessLayout`] record
//!   what a browser would show; a runner flushes them into the real page.
//!
//! This crate does not bind to `wasm-bindgen`. `livepen-wasm` wraps it with a
//! JS API.

pub mod config;
pub mod input_parser;
pub mod keyboard;
pub mod pointer_capture;
pub mod session;
pub mod session_record;
pub mod tabs;

use core::time::Duration;

use livepen_compose::PreviewSurface;
use livepen_layout::{
    CursorStyle, LayoutSurface, Orientation, PaneGeometry, PaneMode, Rect, ResizeAxis,
    TOGGLE_LABEL_PREVIEW,
};
use serde::{Deserialize, Serialize};

pub use config::{ConfigError, KeyboardConfig, PlaygroundConfig, SourceTexts};
pub use input_parser::{HostEvent, HostEventParseError, PointerPhase, parse_host_event};
pub use keyboard::{KeyboardCommand, KeyboardRevealScheduler};
pub use pointer_capture::{
    PointerButton, PointerCaptureAdapter, PointerCaptureCommand, PointerDispatch,
    PointerIgnoredReason, PointerLifecyclePhase, PointerLogEntry, PointerLogOutcome,
};
pub use session::{HostCommand, PlaygroundSession};
pub use session_record::{
    ReplayError, ReplayMismatch, ReplayResult, SessionRecorder, SessionTrace, TraceRecord,
    replay,
};
pub use tabs::EditorTabs;

/// Divider thickness assumed when a host does not report one.
pub const DEFAULT_DIVIDER_THICKNESS: u32 = 6;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Page measurements a host reports on load and on every resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// `window.innerWidth`, rounded.
    pub width: u32,
    /// Bounding box of the pane container, rounded.
    pub container: Rect,
    /// Divider thickness along the active axis.
    pub divider: u32,
}

impl Viewport {
    /// Viewport whose container fills the whole window.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            container: Rect::new(0, 0, width, height),
            divider: DEFAULT_DIVIDER_THICKNESS,
        }
    }
}

/// In-memory preview: keeps the last written document until a runner takes it.
#[derive(Debug, Default, Clone)]
pub struct HeadlessPreview {
    last_document: Option<String>,
    pending: bool,
    writes: u64,
}

impl HeadlessPreview {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent document, whether or not it was taken.
    #[must_use]
    pub fn last_document(&self) -> Option<&str> {
        self.last_document.as_deref()
    }

    /// Total documents written.
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.writes
    }

    /// The document written since the previous call, if any.
    pub fn take_pending(&mut self) -> Option<&str> {
        if !std::mem::take(&mut self.pending) {
            return None;
        }
        self.last_document.as_deref()
    }
}

impl PreviewSurface for HeadlessPreview {
    fn replace_document(&mut self, html: &str) {
        self.last_document = Some(html.to_owned());
        self.pending = true;
        self.writes = self.writes.saturating_add(1);
    }
}

/// Everything a runner needs to mirror the layout into a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub orientation: Option<Orientation>,
    pub geometry: Option<PaneGeometry>,
    pub pane_mode: PaneMode,
    pub cursor: CursorStyle,
    pub toggle_label: String,
}

/// In-memory layout surface backed by host-reported measurements.
///
/// Every write bumps [`HeadlessLayout::revision`], so runners can skip DOM
/// work when nothing changed.
#[derive(Debug, Clone)]
pub struct HeadlessLayout {
    container: Rect,
    divider: u32,
    orientation: Option<Orientation>,
    geometry: Option<PaneGeometry>,
    pane_mode: PaneMode,
    cursor: CursorStyle,
    toggle_label: String,
    revision: u64,
}

impl Default for HeadlessLayout {
    fn default() -> Self {
        Self::new(Rect::default(), DEFAULT_DIVIDER_THICKNESS)
    }
}

impl HeadlessLayout {
    #[must_use]
    pub fn new(container: Rect, divider: u32) -> Self {
        Self {
            container,
            divider,
            orientation: None,
            geometry: None,
            pane_mode: PaneMode::Split,
            cursor: CursorStyle::Default,
            toggle_label: TOGGLE_LABEL_PREVIEW.to_owned(),
            revision: 0,
        }
    }

    /// Record fresh host measurements. Nothing is re-laid out until the
    /// controller runs.
    pub fn measure(&mut self, viewport: &Viewport) {
        self.container = viewport.container;
        self.divider = viewport.divider;
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub const fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    #[must_use]
    pub fn toggle_label(&self) -> &str {
        &self.toggle_label
    }

    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            orientation: self.orientation,
            geometry: self.geometry,
            pane_mode: self.pane_mode,
            cursor: self.cursor,
            toggle_label: self.toggle_label.clone(),
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }
}

impl LayoutSurface for HeadlessLayout {
    fn container_bounds(&self) -> Rect {
        self.container
    }

    fn divider_thickness(&self, _axis: ResizeAxis) -> u32 {
        self.divider
    }

    fn apply_orientation(&mut self, orientation: Orientation) {
        self.orientation = Some(orientation);
        self.touch();
    }

    fn apply_geometry(&mut self, geometry: &PaneGeometry) {
        self.geometry = Some(*geometry);
        self.touch();
    }

    fn apply_pane_mode(&mut self, mode: PaneMode) {
        self.pane_mode = mode;
        self.touch();
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
        self.touch();
    }

    fn set_toggle_label(&mut self, label: &str) {
        label.clone_into(&mut self.toggle_label);
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepen_layout::LayoutController;
    use pretty_assertions::assert_eq;

    #[test]
    fn deterministic_clock_advances_monotonically() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now(), Duration::ZERO);

        c.advance(Duration::from_millis(10));
        c.advance(Duration::from_millis(5));
        assert_eq!(c.now(), Duration::from_millis(15));

        // Saturation: don't panic or wrap.
        c.set(Duration::MAX);
        c.advance(Duration::from_secs(1));
        assert_eq!(c.now(), Duration::MAX);
    }

    #[test]
    fn headless_preview_hands_out_each_document_once() {
        let mut preview = HeadlessPreview::new();
        assert_eq!(preview.take_pending(), None);

        preview.replace_document("<p>one</p>");
        preview.replace_document("<p>two</p>");
        assert_eq!(preview.writes(), 2);
        assert_eq!(preview.take_pending(), Some("<p>two</p>"));
        assert_eq!(preview.take_pending(), None);
        assert_eq!(preview.last_document(), Some("<p>two</p>"));
    }

    #[test]
    fn headless_layout_records_controller_output() {
        let viewport = Viewport::full(1206, 700);
        let mut surface = HeadlessLayout::default();
        surface.measure(&viewport);
        let mut controller = LayoutController::default();
        controller.viewport_resized(viewport.width, &mut surface);

        let snapshot = surface.snapshot();
        assert_eq!(snapshot.orientation, Some(Orientation::SideBySide));
        let geometry = snapshot.geometry.expect("geometry recorded");
        assert_eq!((geometry.editor, geometry.preview), (600, 600));
        assert_eq!(snapshot.toggle_label, "Preview");
        assert!(surface.revision() > 0);
    }

    #[test]
    fn layout_snapshot_serializes_to_json() {
        let snapshot = HeadlessLayout::default().snapshot();
        let json = serde_json::to_string(&snapshot).expect("snapshot serializes");
        assert!(json.contains(r#""cursor":"default""#));
        assert!(json.contains(r#""pane_mode":"split""#));
    }
}
