#![forbid(unsafe_code)]

//! Platform-independent runner core wrapping [`PlaygroundSession`].
//!
//! This module contains the logic shared between the wasm-bindgen exports
//! and the native test harness. No JS/WASM types here: the core decides what
//! the page must show, the wasm layer copies it into elements.

use std::collections::VecDeque;
use std::time::Duration;

use livepen_compose::{RefreshReport, SourceKind};
use livepen_layout::{LayoutTransition, PointerPosition};
use livepen_web::{
    ConfigError, HostCommand, HostEvent, LayoutSnapshot, PlaygroundConfig, PlaygroundSession,
    PointerButton, PointerDispatch, Viewport, parse_host_event,
};
use serde::{Deserialize, Serialize};

/// Ids of the page elements the runner reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementIds {
    /// Pane container; carries the `vertical` and `preview-mode` classes.
    pub container: String,
    /// Editor pane.
    pub editors: String,
    /// Preview iframe.
    pub preview: String,
    /// Divider between the panes.
    pub resizer: String,
    /// Preview/editor toggle button.
    pub toggle: String,
    pub html_editor: String,
    pub css_editor: String,
    pub js_editor: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            container: "container".to_owned(),
            editors: "editors".to_owned(),
            preview: "preview".to_owned(),
            resizer: "resizer".to_owned(),
            toggle: "togglePreview".to_owned(),
            html_editor: "htmlEditor".to_owned(),
            css_editor: "cssEditor".to_owned(),
            js_editor: "jsEditor".to_owned(),
        }
    }
}

impl ElementIds {
    #[must_use]
    pub fn editor(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Markup => &self.html_editor,
            SourceKind::Style => &self.css_editor,
            SourceKind::Script => &self.js_editor,
        }
    }
}

/// Constructor options, accepted from JS as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerOptions {
    pub config: PlaygroundConfig,
    pub elements: ElementIds,
}

impl RunnerOptions {
    /// Parse options. Config validation happens in [`RunnerCore::new`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        Ok(options)
    }
}

/// Outcome of draining the event queue once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepResult {
    pub events_processed: u32,
    /// Preview documents written while draining.
    pub documents_written: u64,
    /// Whether any layout surface write happened while draining.
    pub layout_changed: bool,
}

/// Everything the page must change since the previous flush.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunnerFlush {
    pub document: Option<String>,
    pub layout: Option<LayoutSnapshot>,
    pub active_tab: Option<SourceKind>,
    pub commands: Vec<HostCommand>,
}

impl RunnerFlush {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_none()
            && self.layout.is_none()
            && self.active_tab.is_none()
            && self.commands.is_empty()
    }
}

/// Platform-independent playground runner.
pub struct RunnerCore {
    session: PlaygroundSession,
    elements: ElementIds,
    queue: VecDeque<HostEvent>,
    initialized: bool,
    /// Layout surface revision at the last flush.
    flushed_revision: Option<u64>,
    /// Active tab at the last flush.
    flushed_tab: Option<SourceKind>,
    logs: Vec<String>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl RunnerCore {
    /// Validate the config and build an uninitialized runner.
    pub fn new(options: RunnerOptions) -> Result<Self, ConfigError> {
        let session = PlaygroundSession::new(options.config)?;
        Ok(Self {
            session,
            elements: options.elements,
            queue: VecDeque::new(),
            initialized: false,
            flushed_revision: None,
            flushed_tab: None,
            logs: Vec::new(),
        })
    }

    /// Classify the first viewport and render the initial document.
    /// Later calls are ignored.
    pub fn init(&mut self, viewport: Viewport) -> Option<RefreshReport> {
        if self.initialized {
            return None;
        }
        self.initialized = true;
        Some(self.session.init(viewport))
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub const fn elements(&self) -> &ElementIds {
        &self.elements
    }

    #[must_use]
    pub const fn session(&self) -> &PlaygroundSession {
        &self.session
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    /// Parse a JSON host event and queue it. Returns `false` for malformed
    /// input and for kinds this runner does not handle.
    pub fn push_encoded_input(&mut self, json: &str) -> bool {
        match parse_host_event(json) {
            Ok(Some(event)) => {
                self.push_event(event);
                true
            }
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(message = "runner.input_rejected", error = %err);
                self.logs.push(format!("runner_input_error: {err}"));
                false
            }
        }
    }

    /// Apply every queued event in arrival order.
    pub fn step(&mut self) -> StepResult {
        let writes_before = self.session.preview().writes();
        let revision_before = self.session.layout_surface().revision();
        let mut events_processed: u32 = 0;
        while let Some(event) = self.queue.pop_front() {
            self.session.apply(&event);
            events_processed = events_processed.saturating_add(1);
        }
        let result = StepResult {
            events_processed,
            documents_written: self.session.preview().writes() - writes_before,
            layout_changed: self.session.layout_surface().revision() != revision_before,
        };
        tracing::debug!(
            message = "runner.step",
            events_processed = result.events_processed,
            documents_written = result.documents_written,
            layout_changed = result.layout_changed,
        );
        result
    }

    pub fn edit(&mut self, kind: SourceKind, text: &str) -> RefreshReport {
        self.session.edit(kind, text)
    }

    pub fn resize(&mut self, viewport: Viewport) -> LayoutTransition {
        self.session.viewport_resized(viewport)
    }

    /// Record fresh page measurements without re-laying out.
    pub fn remeasure(&mut self, viewport: &Viewport) {
        self.session.remeasure(viewport);
    }

    pub fn pointer_down(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> PointerDispatch {
        self.session.pointer_down(pointer_id, button, position)
    }

    pub fn pointer_move(&mut self, pointer_id: u32, position: PointerPosition) -> PointerDispatch {
        self.session.pointer_move(pointer_id, position)
    }

    pub fn pointer_up(&mut self, pointer_id: u32, position: PointerPosition) -> PointerDispatch {
        self.session.pointer_up(pointer_id, position)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> PointerDispatch {
        self.session.lost_pointer_capture(pointer_id)
    }

    pub fn blur(&mut self) -> PointerDispatch {
        self.session.blur()
    }

    pub fn toggle_preview(&mut self) -> LayoutTransition {
        self.session.toggle_preview()
    }

    pub fn select_tab(&mut self, label: &str) -> bool {
        self.session.select_tab(label)
    }

    pub fn request_keyboard(&mut self) {
        self.session.request_keyboard();
    }

    pub fn editor_scrolled(&mut self, kind: SourceKind, input_focused: bool) {
        self.session.editor_scrolled(kind, input_focused);
    }

    /// Advance the deterministic clock by `dt_ms` milliseconds.
    pub fn advance_time_ms(&mut self, dt_ms: f64) {
        // Host timers can report NaN or negative spikes; drop them.
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        // Whole nanoseconds keep integral millisecond steps exact.
        let nanos = (dt_ms * 1_000_000.0).round();
        let dt = if nanos >= u64::MAX as f64 {
            Duration::from_nanos(u64::MAX)
        } else {
            Duration::from_nanos(nanos as u64)
        };
        self.session.advance_time(dt);
    }

    /// The document written since the previous take, if any.
    pub fn take_document(&mut self) -> Option<String> {
        self.session.preview_mut().take_pending().map(str::to_owned)
    }

    #[must_use]
    pub fn layout_snapshot(&self) -> LayoutSnapshot {
        self.session.layout_surface().snapshot()
    }

    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        self.session.drain_commands()
    }

    /// Collect every page change since the previous flush.
    pub fn take_flush(&mut self) -> RunnerFlush {
        let document = self.take_document();

        let revision = self.session.layout_surface().revision();
        let layout = (self.flushed_revision != Some(revision)).then(|| self.layout_snapshot());
        self.flushed_revision = Some(revision);

        let active = self.session.tabs().active();
        let active_tab = (self.flushed_tab != Some(active)).then_some(active);
        self.flushed_tab = Some(active);

        RunnerFlush {
            document,
            layout,
            active_tab,
            commands: self.drain_commands(),
        }
    }

    /// Runner diagnostics followed by pointer lifecycle entries as JSON.
    pub fn take_logs(&mut self) -> Vec<String> {
        let mut logs = std::mem::take(&mut self.logs);
        for dispatch in self.session.drain_pointer_log() {
            match serde_json::to_string(&dispatch.log) {
                Ok(line) => logs.push(line),
                Err(err) => logs.push(format!("runner_log_encode_error: {err}")),
            }
        }
        logs
    }
}
