#![forbid(unsafe_code)]

//! Source buffers: the three texts a playground session edits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Markup shipped with a fresh playground.
pub const SHIPPED_MARKUP: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Responsive Preview</title>
  <link rel="stylesheet" href="style.css" />
</head>
<body>
  <h1>Hello, Responsive World!</h1>
  <script src="script.js"></script>
</body>
</html>"#;

/// Styles shipped with a fresh playground.
pub const SHIPPED_STYLE: &str = "h1 {
  color: dodgerblue;
  text-align: center;
}";

/// Script shipped with a fresh playground.
pub const SHIPPED_SCRIPT: &str = r#"console.log("Responsive script loaded");"#;

/// Which of the three playground buffers a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Markup,
    Style,
    Script,
}

impl SourceKind {
    /// All kinds in tab order.
    pub const ALL: [Self; 3] = [Self::Markup, Self::Style, Self::Script];

    /// Short label used by hosts for tabs and editor ids (`html`, `css`, `js`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "js",
        }
    }

    /// Parse a host label. Unknown labels yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "html" => Some(Self::Markup),
            "css" => Some(Self::Style),
            "js" => Some(Self::Script),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Markup => 0,
            Self::Style => 1,
            Self::Script => 2,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Owned, mutable text for one buffer kind.
///
/// The revision counter increases on every mutation, including writes that
/// leave the text unchanged; hosts fire a change notification for those too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    kind: SourceKind,
    text: String,
    revision: u64,
}

impl SourceBuffer {
    #[must_use]
    pub fn new(kind: SourceKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            revision: 0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the whole buffer.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision = self.revision.saturating_add(1);
    }
}

/// Exactly one [`SourceBuffer`] per [`SourceKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    buffers: [SourceBuffer; 3],
}

impl SourceSet {
    #[must_use]
    pub fn new(
        markup: impl Into<String>,
        style: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            buffers: [
                SourceBuffer::new(SourceKind::Markup, markup),
                SourceBuffer::new(SourceKind::Style, style),
                SourceBuffer::new(SourceKind::Script, script),
            ],
        }
    }

    /// The buffers a fresh playground starts with.
    #[must_use]
    pub fn shipped() -> Self {
        Self::new(SHIPPED_MARKUP, SHIPPED_STYLE, SHIPPED_SCRIPT)
    }

    #[must_use]
    pub fn get(&self, kind: SourceKind) -> &SourceBuffer {
        &self.buffers[kind.index()]
    }

    pub fn get_mut(&mut self, kind: SourceKind) -> &mut SourceBuffer {
        &mut self.buffers[kind.index()]
    }

    #[must_use]
    pub fn text(&self, kind: SourceKind) -> &str {
        self.get(kind).text()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceBuffer> {
        self.buffers.iter()
    }
}

impl Default for SourceSet {
    fn default() -> Self {
        Self::shipped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_for_every_kind() {
        for kind in SourceKind::ALL {
            assert_eq!(SourceKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(SourceKind::from_label("HTML"), None);
        assert_eq!(SourceKind::from_label("ts"), None);
    }

    #[test]
    fn set_text_bumps_revision_even_when_unchanged() {
        let mut buf = SourceBuffer::new(SourceKind::Style, "a");
        assert_eq!(buf.revision(), 0);
        buf.set_text("a");
        buf.set_text("b");
        assert_eq!(buf.revision(), 2);
        assert_eq!(buf.text(), "b");
    }

    #[test]
    fn set_is_indexed_by_kind() {
        let mut set = SourceSet::new("m", "s", "j");
        assert_eq!(set.text(SourceKind::Markup), "m");
        assert_eq!(set.text(SourceKind::Style), "s");
        assert_eq!(set.text(SourceKind::Script), "j");

        set.get_mut(SourceKind::Script).set_text("j2");
        assert_eq!(set.text(SourceKind::Script), "j2");
        assert_eq!(set.get(SourceKind::Markup).revision(), 0);

        let kinds: Vec<_> = set.iter().map(SourceBuffer::kind).collect();
        assert_eq!(kinds, SourceKind::ALL);
    }

    #[test]
    fn shipped_markup_carries_both_placeholders() {
        let set = SourceSet::shipped();
        let markup = set.text(SourceKind::Markup);
        assert!(markup.contains(r#"<link rel="stylesheet" href="style.css" />"#));
        assert!(markup.contains(r#"<script src="script.js"></script>"#));
    }
}
