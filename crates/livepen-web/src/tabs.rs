#![forbid(unsafe_code)]

//! Editor tab strip: exactly one of the three editors is visible at a time.

use livepen_compose::SourceKind;

/// Which editor tab is active. Starts on the markup tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorTabs {
    active: SourceKind,
}

impl Default for EditorTabs {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorTabs {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: SourceKind::Markup,
        }
    }

    #[must_use]
    pub const fn active(&self) -> SourceKind {
        self.active
    }

    /// Only the active tab's editor is shown.
    #[must_use]
    pub fn is_visible(&self, kind: SourceKind) -> bool {
        self.active == kind
    }

    /// Activate `kind`. Returns `false` when it was already active.
    pub fn select(&mut self, kind: SourceKind) -> bool {
        if self.active == kind {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "tabs.switch", from = %self.active, to = %kind);
        self.active = kind;
        true
    }

    /// Activate a tab by host label (`html`, `css`, `js`).
    ///
    /// Unknown labels are ignored and yield `None`.
    pub fn select_label(&mut self, label: &str) -> Option<bool> {
        SourceKind::from_label(label).map(|kind| self.select(kind))
    }
}
