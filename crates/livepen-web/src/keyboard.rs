#![forbid(unsafe_code)]

//! Touch keyboard control.
//!
//! Editors never raise the on-screen keyboard by themselves: touching or
//! scrolling one drops focus. The keyboard only appears on an explicit
//! request, in two steps:
//!
//! ```text
//! request(kind)          -> FocusProxy                      (now)
//! poll(now >= due)       -> FocusEditor, RevealCursor, RemoveProxy
//! ```
//!
//! The proxy is an invisible text input the host focuses synchronously inside
//! the user gesture; mobile browsers only open the keyboard for focus changes
//! made during a gesture. Focus then moves to the editor once the keyboard is
//! up.
//!
//! # Invariants
//! 1. At most one proxy exists. A request while a reveal is pending restarts
//!    the delay and retargets it without a second `FocusProxy`.
//! 2. `RemoveProxy` is emitted exactly once per `FocusProxy`.

use core::time::Duration;

use livepen_compose::SourceKind;
use serde::{Deserialize, Serialize};

/// Focus instruction for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "editor", rename_all = "snake_case")]
pub enum KeyboardCommand {
    /// Insert and focus the invisible keyboard proxy.
    FocusProxy,
    FocusEditor(SourceKind),
    /// Scroll the editor so its cursor is centered.
    RevealCursor(SourceKind),
    RemoveProxy,
    /// Drop focus from the editor's text input.
    Blur(SourceKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReveal {
    kind: SourceKind,
    due: Duration,
}

/// Two-step keyboard reveal driven by the session clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardRevealScheduler {
    delay: Duration,
    pending: Option<PendingReveal>,
}

impl KeyboardRevealScheduler {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Editor a pending reveal will focus.
    #[must_use]
    pub fn pending(&self) -> Option<SourceKind> {
        self.pending.map(|pending| pending.kind)
    }

    /// Explicit keyboard request for `kind` at `now`.
    pub fn request(&mut self, kind: SourceKind, now: Duration) -> Option<KeyboardCommand> {
        let restarted = self.pending.is_some();
        self.pending = Some(PendingReveal {
            kind,
            due: now.saturating_add(self.delay),
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "keyboard.reveal",
            phase = "request",
            editor = %kind,
            restarted,
        );
        (!restarted).then_some(KeyboardCommand::FocusProxy)
    }

    /// Emit the second step once the delay has elapsed.
    pub fn poll(&mut self, now: Duration) -> Vec<KeyboardCommand> {
        let Some(pending) = self.pending else {
            return Vec::new();
        };
        if now < pending.due {
            return Vec::new();
        }
        self.pending = None;
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "keyboard.reveal", phase = "focus", editor = %pending.kind);
        vec![
            KeyboardCommand::FocusEditor(pending.kind),
            KeyboardCommand::RevealCursor(pending.kind),
            KeyboardCommand::RemoveProxy,
        ]
    }

    /// Editor scrolled. A focused text input is blurred so scrolling never
    /// brings the keyboard up.
    #[must_use]
    pub fn editor_scrolled(&self, kind: SourceKind, input_focused: bool) -> Option<KeyboardCommand> {
        input_focused.then_some(KeyboardCommand::Blur(kind))
    }
}
