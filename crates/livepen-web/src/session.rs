#![forbid(unsafe_code)]

//! One playground page: buffers, preview, layout and input handling.
//!
//! The session is explicitly constructed and owns every collaborator. Hosts
//! call one handler per DOM signal (or feed parsed [`HostEvent`]s through
//! [`PlaygroundSession::apply`]) and read back:
//! - the preview document via [`PlaygroundSession::preview_mut`],
//! - layout state via [`PlaygroundSession::layout_surface`], and
//! - focus and capture instructions via [`PlaygroundSession::drain_commands`].
//!
//! # Invariants
//! 1. Every [`PlaygroundSession::edit`] performs exactly one recompose and
//!    one document write, even when the text is unchanged.
//! 2. The pointer adapter never holds a pointer while the controller is idle.

use core::time::Duration;

use livepen_compose::{Composer, PreviewPipeline, RefreshReport, SourceKind, SourceSet};
use livepen_layout::{LayoutController, LayoutState, LayoutTransition, PointerPosition};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, PlaygroundConfig};
use crate::input_parser::{HostEvent, PointerPhase};
use crate::keyboard::{KeyboardCommand, KeyboardRevealScheduler};
use crate::pointer_capture::{
    PointerButton, PointerCaptureAdapter, PointerCaptureCommand, PointerDispatch,
};
use crate::tabs::EditorTabs;
use crate::{DeterministicClock, HeadlessLayout, HeadlessPreview, Viewport};

/// Side effect a host must perform outside the preview and layout surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCommand {
    Capture(PointerCaptureCommand),
    Keyboard(KeyboardCommand),
}

#[derive(Debug, Clone)]
pub struct PlaygroundSession {
    config: PlaygroundConfig,
    sources: SourceSet,
    pipeline: PreviewPipeline,
    layout: LayoutController,
    pointer: PointerCaptureAdapter,
    tabs: EditorTabs,
    keyboard: KeyboardRevealScheduler,
    clock: DeterministicClock,
    preview: HeadlessPreview,
    surface: HeadlessLayout,
    commands: Vec<HostCommand>,
    pointer_log: Vec<PointerDispatch>,
}

impl PlaygroundSession {
    /// Validate `config` and build an uninitialized session.
    pub fn new(config: PlaygroundConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let composer = Composer::new(config.placeholders.clone())?;
        Ok(Self {
            sources: config.sources.to_source_set(),
            pipeline: PreviewPipeline::new(composer),
            layout: LayoutController::new(config.layout),
            pointer: PointerCaptureAdapter::new(),
            tabs: EditorTabs::new(),
            keyboard: KeyboardRevealScheduler::new(config.keyboard.reveal_delay()),
            clock: DeterministicClock::new(),
            preview: HeadlessPreview::new(),
            surface: HeadlessLayout::default(),
            commands: Vec::new(),
            pointer_log: Vec::new(),
            config,
        })
    }

    /// Page load: classify the viewport and render the initial document.
    pub fn init(&mut self, viewport: Viewport) -> RefreshReport {
        self.viewport_resized(viewport);
        self.refresh()
    }

    #[must_use]
    pub const fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    #[must_use]
    pub const fn sources(&self) -> &SourceSet {
        &self.sources
    }

    #[must_use]
    pub const fn layout(&self) -> &LayoutController {
        &self.layout
    }

    #[must_use]
    pub const fn layout_state(&self) -> LayoutState {
        self.layout.state()
    }

    #[must_use]
    pub const fn layout_surface(&self) -> &HeadlessLayout {
        &self.surface
    }

    #[must_use]
    pub const fn preview(&self) -> &HeadlessPreview {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut HeadlessPreview {
        &mut self.preview
    }

    #[must_use]
    pub const fn tabs(&self) -> &EditorTabs {
        &self.tabs
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub const fn renders(&self) -> u64 {
        self.pipeline.renders()
    }

    /// Pointer dispatches since the last [`Self::drain_pointer_log`].
    pub fn drain_pointer_log(&mut self) -> Vec<PointerDispatch> {
        std::mem::take(&mut self.pointer_log)
    }

    /// Host commands since the last call, in emission order.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Editor content changed. Recomposes immediately.
    pub fn edit(&mut self, kind: SourceKind, text: impl Into<String>) -> RefreshReport {
        self.sources.get_mut(kind).set_text(text);
        self.refresh()
    }

    /// Window resized (or first measured).
    pub fn viewport_resized(&mut self, viewport: Viewport) -> LayoutTransition {
        self.surface.measure(&viewport);
        let transition = self.layout.viewport_resized(viewport.width, &mut self.surface);
        self.sync_pointer();
        transition
    }

    /// Refresh container bounds and divider thickness without re-laying out.
    /// Hosts call this before pointer signals, since scrolling moves the
    /// container without resizing the window.
    pub fn remeasure(&mut self, viewport: &Viewport) {
        self.surface.measure(viewport);
    }

    pub fn pointer_down(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> PointerDispatch {
        let dispatch = self.pointer.pointer_down(
            &mut self.layout,
            &mut self.surface,
            pointer_id,
            button,
            position,
        );
        self.log_pointer(dispatch)
    }

    pub fn pointer_move(&mut self, pointer_id: u32, position: PointerPosition) -> PointerDispatch {
        let dispatch =
            self.pointer
                .pointer_move(&mut self.layout, &mut self.surface, pointer_id, position);
        self.log_pointer(dispatch)
    }

    pub fn pointer_up(&mut self, pointer_id: u32, position: PointerPosition) -> PointerDispatch {
        let dispatch =
            self.pointer
                .pointer_up(&mut self.layout, &mut self.surface, pointer_id, position);
        self.log_pointer(dispatch)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> PointerDispatch {
        let dispatch =
            self.pointer
                .lost_pointer_capture(&mut self.layout, &mut self.surface, pointer_id);
        self.log_pointer(dispatch)
    }

    /// Window lost focus.
    pub fn blur(&mut self) -> PointerDispatch {
        let dispatch = self.pointer.blur(&mut self.layout, &mut self.surface);
        self.log_pointer(dispatch)
    }

    pub fn toggle_preview(&mut self) -> LayoutTransition {
        let transition = self.layout.toggle_preview(&mut self.surface);
        self.sync_pointer();
        transition
    }

    /// Tab clicked. Unknown labels are ignored and yield `false`.
    pub fn select_tab(&mut self, label: &str) -> bool {
        self.tabs.select_label(label).unwrap_or(false)
    }

    /// "Show keyboard" pressed: reveal the keyboard for the active tab.
    pub fn request_keyboard(&mut self) {
        let active = self.tabs.active();
        if let Some(command) = self.keyboard.request(active, self.clock.now()) {
            self.commands.push(HostCommand::Keyboard(command));
        }
    }

    /// An editor scrolled; `input_focused` reports whether its text input
    /// currently holds focus.
    pub fn editor_scrolled(&mut self, kind: SourceKind, input_focused: bool) {
        if let Some(command) = self.keyboard.editor_scrolled(kind, input_focused) {
            self.commands.push(HostCommand::Keyboard(command));
        }
    }

    /// Advance the host clock and fire anything that came due.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
        let fired = self.keyboard.poll(self.clock.now());
        self.commands
            .extend(fired.into_iter().map(HostCommand::Keyboard));
    }

    /// Route one parsed host event to its handler.
    pub fn apply(&mut self, event: &HostEvent) {
        match event {
            HostEvent::Edit { editor, text } => {
                self.edit(*editor, text.as_str());
            }
            HostEvent::Resize { viewport } => {
                self.viewport_resized(*viewport);
            }
            HostEvent::Pointer {
                phase,
                pointer_id,
                button,
                position,
            } => {
                match phase {
                    PointerPhase::Down => self.pointer_down(*pointer_id, *button, *position),
                    PointerPhase::Move => self.pointer_move(*pointer_id, *position),
                    PointerPhase::Up => self.pointer_up(*pointer_id, *position),
                    PointerPhase::Cancel => self.lost_pointer_capture(*pointer_id),
                };
            }
            HostEvent::Blur => {
                self.blur();
            }
            HostEvent::Toggle => {
                self.toggle_preview();
            }
            HostEvent::Tab { tab } => {
                self.select_tab(tab);
            }
            HostEvent::Keyboard => self.request_keyboard(),
            HostEvent::Scroll { editor, focused } => self.editor_scrolled(*editor, *focused),
            HostEvent::Tick { dt_ms } => self.advance_time(Duration::from_millis(*dt_ms)),
        }
    }

    fn refresh(&mut self) -> RefreshReport {
        self.pipeline.refresh(&self.sources, &mut self.preview)
    }

    fn log_pointer(&mut self, dispatch: PointerDispatch) -> PointerDispatch {
        if let Some(command) = dispatch.capture_command {
            self.commands.push(HostCommand::Capture(command));
        }
        self.pointer_log.push(dispatch);
        dispatch
    }

    fn sync_pointer(&mut self) {
        if let Some(dispatch) = self.pointer.sync_with(&self.layout) {
            self.log_pointer(dispatch);
        }
    }
}
