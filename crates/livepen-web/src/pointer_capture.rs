#![forbid(unsafe_code)]

//! Deterministic web pointer-capture adapter for divider drags.
//!
//! This module bridges browser pointer lifecycle signals into
//! [`LayoutController`] calls while enforcing:
//! - one active pointer at a time,
//! - explicit capture acquire/release commands for JS hosts, and
//! - cancellation on interruption paths (blur, lost capture).
//!
//! A pointer-up from any pointer ends the drag, matching a page-wide
//! `mouseup` listener. Moves from other pointers are ignored.

use livepen_layout::{LayoutController, LayoutSurface, LayoutTransition, PointerPosition};
use serde::{Deserialize, Serialize};

/// DOM `PointerEvent.button` value, folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Other,
}

impl PointerButton {
    #[must_use]
    pub const fn from_dom(button: i32) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            _ => Self::Other,
        }
    }
}

/// Host command emitted by the adapter for browser pointer-capture control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "capture", rename_all = "snake_case")]
pub enum PointerCaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerLifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    Blur,
    LostPointerCapture,
    /// The controller ended the drag on its own (axis change, preview-only).
    ControllerEnded,
}

/// Deterministic reason why an incoming lifecycle signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerIgnoredReason {
    ButtonNotAllowed,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    PointerMismatch,
    ControllerRejected,
}

/// Outcome category for one lifecycle dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerLogOutcome {
    Forwarded,
    Ignored(PointerIgnoredReason),
}

/// Structured lifecycle log record for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerLogEntry {
    pub phase: PointerLifecyclePhase,
    pub pointer_id: Option<u32>,
    pub position: Option<PointerPosition>,
    pub capture_command: Option<PointerCaptureCommand>,
    pub outcome: PointerLogOutcome,
}

/// Result of one pointer lifecycle dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDispatch {
    pub transition: Option<LayoutTransition>,
    pub capture_command: Option<PointerCaptureCommand>,
    pub log: PointerLogEntry,
}

impl PointerDispatch {
    fn ignored(
        phase: PointerLifecyclePhase,
        reason: PointerIgnoredReason,
        pointer_id: Option<u32>,
        position: Option<PointerPosition>,
    ) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "pointer.ignored",
            phase = ?phase,
            reason = ?reason,
            pointer_id,
        );
        Self {
            transition: None,
            capture_command: None,
            log: PointerLogEntry {
                phase,
                pointer_id,
                position,
                capture_command: None,
                outcome: PointerLogOutcome::Ignored(reason),
            },
        }
    }

    fn forwarded(
        phase: PointerLifecyclePhase,
        transition: Option<LayoutTransition>,
        pointer_id: Option<u32>,
        position: Option<PointerPosition>,
        capture_command: Option<PointerCaptureCommand>,
    ) -> Self {
        Self {
            transition,
            capture_command,
            log: PointerLogEntry {
                phase,
                pointer_id,
                position,
                capture_command,
                outcome: PointerLogOutcome::Forwarded,
            },
        }
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.log.outcome, PointerLogOutcome::Ignored(_))
    }
}

/// Deterministic pointer-capture adapter for the playground divider.
///
/// Capture commands map to DOM `setPointerCapture()` /
/// `releasePointerCapture()`.
#[derive(Debug, Clone, Default)]
pub struct PointerCaptureAdapter {
    active: Option<u32>,
}

impl PointerCaptureAdapter {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Active pointer ID, if any.
    #[must_use]
    pub const fn active_pointer_id(&self) -> Option<u32> {
        self.active
    }

    /// Pointer pressed on the divider.
    pub fn pointer_down<S: LayoutSurface + ?Sized>(
        &mut self,
        controller: &mut LayoutController,
        surface: &mut S,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerDown;
        if button != PointerButton::Primary {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::ButtonNotAllowed,
                Some(pointer_id),
                Some(position),
            );
        }
        if self.active.is_some() {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::ActivePointerAlreadyInProgress,
                Some(pointer_id),
                Some(position),
            );
        }

        let transition = controller.drag_start(surface);
        if transition.is_noop() {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::ControllerRejected,
                Some(pointer_id),
                Some(position),
            );
        }
        self.active = Some(pointer_id);
        PointerDispatch::forwarded(
            phase,
            Some(transition),
            Some(pointer_id),
            Some(position),
            Some(PointerCaptureCommand::Acquire { pointer_id }),
        )
    }

    /// Pointer moved anywhere on the page.
    pub fn pointer_move<S: LayoutSurface + ?Sized>(
        &mut self,
        controller: &mut LayoutController,
        surface: &mut S,
        pointer_id: u32,
        position: PointerPosition,
    ) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerMove;
        let Some(active) = self.active else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                Some(pointer_id),
                Some(position),
            );
        };
        if active != pointer_id {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(position),
            );
        }
        let transition = controller.drag_move(position, surface);
        PointerDispatch::forwarded(
            phase,
            Some(transition),
            Some(pointer_id),
            Some(position),
            None,
        )
    }

    /// Pointer released anywhere on the page.
    ///
    /// Always forwarded: the controller restores the default cursor even
    /// without an active drag.
    pub fn pointer_up<S: LayoutSurface + ?Sized>(
        &mut self,
        controller: &mut LayoutController,
        surface: &mut S,
        pointer_id: u32,
        position: PointerPosition,
    ) -> PointerDispatch {
        let release = self
            .active
            .take()
            .map(|active| PointerCaptureCommand::Release { pointer_id: active });
        let transition = controller.drag_end(surface);
        PointerDispatch::forwarded(
            PointerLifecyclePhase::PointerUp,
            Some(transition),
            Some(pointer_id),
            Some(position),
            release,
        )
    }

    /// Window lost focus mid-drag.
    pub fn blur<S: LayoutSurface + ?Sized>(
        &mut self,
        controller: &mut LayoutController,
        surface: &mut S,
    ) -> PointerDispatch {
        self.cancel_active(PointerLifecyclePhase::Blur, None, controller, surface, true)
    }

    /// Handle `lostpointercapture`; the browser already released capture.
    pub fn lost_pointer_capture<S: LayoutSurface + ?Sized>(
        &mut self,
        controller: &mut LayoutController,
        surface: &mut S,
        pointer_id: u32,
    ) -> PointerDispatch {
        self.cancel_active(
            PointerLifecyclePhase::LostPointerCapture,
            Some(pointer_id),
            controller,
            surface,
            false,
        )
    }

    /// Forget the active pointer after the controller ended the drag itself.
    ///
    /// Returns `None` while the controller is still dragging or nothing was
    /// active.
    pub fn sync_with(&mut self, controller: &LayoutController) -> Option<PointerDispatch> {
        if controller.is_dragging() {
            return None;
        }
        let pointer_id = self.active.take()?;
        Some(PointerDispatch::forwarded(
            PointerLifecyclePhase::ControllerEnded,
            None,
            Some(pointer_id),
            None,
            Some(PointerCaptureCommand::Release { pointer_id }),
        ))
    }

    fn cancel_active<S: LayoutSurface + ?Sized>(
        &mut self,
        phase: PointerLifecyclePhase,
        pointer_id: Option<u32>,
        controller: &mut LayoutController,
        surface: &mut S,
        release_capture: bool,
    ) -> PointerDispatch {
        let Some(active) = self.active else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                pointer_id,
                None,
            );
        };
        if let Some(id) = pointer_id
            && id != active
        {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(id),
                None,
            );
        }

        self.active = None;
        let transition = controller.cancel_drag(surface);
        let command =
            release_capture.then_some(PointerCaptureCommand::Release { pointer_id: active });
        PointerDispatch::forwarded(phase, transition, Some(active), None, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeadlessLayout, Viewport};
    use livepen_layout::{CursorStyle, LayoutEffect, ResizeAxis};
    use pretty_assertions::assert_eq;

    fn pos(x: i32, y: i32) -> PointerPosition {
        PointerPosition::new(x, y)
    }

    fn setup(width: u32) -> (PointerCaptureAdapter, LayoutController, HeadlessLayout) {
        let viewport = Viewport::full(width, 706);
        let mut surface = HeadlessLayout::default();
        surface.measure(&viewport);
        let mut controller = LayoutController::default();
        controller.viewport_resized(width, &mut surface);
        (PointerCaptureAdapter::new(), controller, surface)
    }

    #[test]
    fn down_move_up_lifecycle_emits_capture_commands() {
        let (mut adapter, mut controller, mut surface) = setup(1206);

        let down = adapter.pointer_down(
            &mut controller,
            &mut surface,
            7,
            PointerButton::Primary,
            pos(600, 10),
        );
        assert_eq!(
            down.capture_command,
            Some(PointerCaptureCommand::Acquire { pointer_id: 7 })
        );
        assert_eq!(down.log.outcome, PointerLogOutcome::Forwarded);
        assert_eq!(adapter.active_pointer_id(), Some(7));
        assert_eq!(surface.cursor(), CursorStyle::ColResize);

        let moved = adapter.pointer_move(&mut controller, &mut surface, 7, pos(300, 10));
        let transition = moved.transition.expect("move forwarded");
        let LayoutEffect::DragUpdated { geometry, .. } = transition.effect else {
            panic!("expected drag update, got {:?}", transition.effect);
        };
        assert_eq!((geometry.editor, geometry.preview), (300, 900));

        let up = adapter.pointer_up(&mut controller, &mut surface, 7, pos(300, 10));
        assert_eq!(
            up.capture_command,
            Some(PointerCaptureCommand::Release { pointer_id: 7 })
        );
        assert_eq!(adapter.active_pointer_id(), None);
        assert!(!controller.is_dragging());
        assert_eq!(surface.cursor(), CursorStyle::Default);
    }

    #[test]
    fn non_primary_buttons_are_ignored() {
        let (mut adapter, mut controller, mut surface) = setup(1206);

        let right = adapter.pointer_down(
            &mut controller,
            &mut surface,
            3,
            PointerButton::Secondary,
            pos(1, 1),
        );
        assert_eq!(
            right.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::ButtonNotAllowed)
        );
        assert_eq!(right.capture_command, None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn pointer_id_zero_drives_a_full_drag() {
        let (mut adapter, mut controller, mut surface) = setup(1206);

        let down = adapter.pointer_down(
            &mut controller,
            &mut surface,
            0,
            PointerButton::Primary,
            pos(600, 10),
        );
        assert_eq!(down.log.outcome, PointerLogOutcome::Forwarded);
        assert_eq!(
            down.capture_command,
            Some(PointerCaptureCommand::Acquire { pointer_id: 0 })
        );
        assert_eq!(adapter.active_pointer_id(), Some(0));
        assert!(controller.is_dragging());

        let moved = adapter.pointer_move(&mut controller, &mut surface, 0, pos(300, 10));
        assert!(!moved.is_ignored());
        let geometry = controller.geometry().expect("geometry");
        assert_eq!((geometry.editor, geometry.preview), (300, 900));

        let up = adapter.pointer_up(&mut controller, &mut surface, 0, pos(300, 10));
        assert_eq!(
            up.capture_command,
            Some(PointerCaptureCommand::Release { pointer_id: 0 })
        );
        assert_eq!(adapter.active_pointer_id(), None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn second_pointer_cannot_start_or_steer_a_drag() {
        let (mut adapter, mut controller, mut surface) = setup(1206);
        adapter.pointer_down(
            &mut controller,
            &mut surface,
            1,
            PointerButton::Primary,
            pos(0, 0),
        );

        let second = adapter.pointer_down(
            &mut controller,
            &mut surface,
            2,
            PointerButton::Primary,
            pos(0, 0),
        );
        assert_eq!(
            second.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::ActivePointerAlreadyInProgress)
        );

        let stray = adapter.pointer_move(&mut controller, &mut surface, 2, pos(900, 0));
        assert_eq!(
            stray.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::PointerMismatch)
        );
        assert_eq!(stray.transition, None);
    }

    #[test]
    fn pointer_up_from_any_pointer_ends_drag() {
        let (mut adapter, mut controller, mut surface) = setup(1206);
        adapter.pointer_down(
            &mut controller,
            &mut surface,
            1,
            PointerButton::Primary,
            pos(0, 0),
        );
        let up = adapter.pointer_up(&mut controller, &mut surface, 9, pos(0, 0));
        assert_eq!(
            up.capture_command,
            Some(PointerCaptureCommand::Release { pointer_id: 1 })
        );
        assert!(!controller.is_dragging());
    }

    #[test]
    fn stray_pointer_up_is_forwarded_without_release() {
        let (mut adapter, mut controller, mut surface) = setup(1206);
        let up = adapter.pointer_up(&mut controller, &mut surface, 4, pos(0, 0));
        assert_eq!(up.log.outcome, PointerLogOutcome::Forwarded);
        assert_eq!(up.capture_command, None);
        assert!(up.transition.expect("drag_end always runs").is_noop());
    }

    #[test]
    fn blur_cancels_and_releases() {
        let (mut adapter, mut controller, mut surface) = setup(1206);
        adapter.pointer_down(
            &mut controller,
            &mut surface,
            5,
            PointerButton::Primary,
            pos(0, 0),
        );
        let blur = adapter.blur(&mut controller, &mut surface);
        assert_eq!(
            blur.capture_command,
            Some(PointerCaptureCommand::Release { pointer_id: 5 })
        );
        assert_eq!(
            blur.transition.map(|t| t.effect),
            Some(LayoutEffect::DragCanceled {
                axis: ResizeAxis::Horizontal
            })
        );
        assert!(!controller.is_dragging());

        let idle = adapter.blur(&mut controller, &mut surface);
        assert!(idle.is_ignored());
    }

    #[test]
    fn lost_capture_cancels_without_release() {
        let (mut adapter, mut controller, mut surface) = setup(1206);
        adapter.pointer_down(
            &mut controller,
            &mut surface,
            5,
            PointerButton::Primary,
            pos(0, 0),
        );
        let mismatch = adapter.lost_pointer_capture(&mut controller, &mut surface, 6);
        assert_eq!(
            mismatch.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::PointerMismatch)
        );
        assert!(controller.is_dragging());

        let lost = adapter.lost_pointer_capture(&mut controller, &mut surface, 5);
        assert_eq!(lost.capture_command, None);
        assert!(!controller.is_dragging());
        assert_eq!(adapter.active_pointer_id(), None);
    }

    #[test]
    fn preview_only_divider_rejects_pointer_down() {
        let (mut adapter, mut controller, mut surface) = setup(600);
        controller.toggle_preview(&mut surface);
        let down = adapter.pointer_down(
            &mut controller,
            &mut surface,
            1,
            PointerButton::Primary,
            pos(0, 0),
        );
        assert_eq!(
            down.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::ControllerRejected)
        );
        assert_eq!(adapter.active_pointer_id(), None);
    }

    #[test]
    fn sync_releases_after_controller_ends_drag() {
        let (mut adapter, mut controller, mut surface) = setup(1206);
        adapter.pointer_down(
            &mut controller,
            &mut surface,
            8,
            PointerButton::Primary,
            pos(0, 0),
        );
        assert_eq!(adapter.sync_with(&controller), None);

        surface.measure(&Viewport::full(700, 706));
        controller.viewport_resized(700, &mut surface);
        let synced = adapter.sync_with(&controller).expect("drag was canceled");
        assert_eq!(
            synced.capture_command,
            Some(PointerCaptureCommand::Release { pointer_id: 8 })
        );
        assert_eq!(adapter.active_pointer_id(), None);
    }

    #[test]
    fn dom_buttons_fold_to_variants() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Auxiliary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(-1), PointerButton::Other);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Other);
    }
}
