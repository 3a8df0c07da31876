#![forbid(unsafe_code)]

//! Preview composition: three source texts in, one renderable document out.
//!
//! # Role in livepen
//! `livepen-compose` is the content half of the playground. It owns the
//! [`SourceBuffer`] model (one buffer each for markup, styles and script), the
//! [`Composer`] that inlines the style and script buffers into the markup, and
//! the [`PreviewPipeline`] that pushes each composed document into a
//! [`PreviewSurface`].
//!
//! # Invariants
//! 1. Composition is a pure function of its three inputs.
//! 2. Composition never fails. A placeholder missing from the markup drops the
//!    corresponding buffer silently; [`ComposedDocument`] records which
//!    buffers actually reached the output.
//! 3. One [`PreviewPipeline::refresh`] call performs exactly one compose and
//!    one full document replacement. There is no diffing and no debouncing.

pub mod composer;
pub mod pipeline;
pub mod source;

pub use composer::{
    ComposeError, ComposedDocument, Composer, DEFAULT_SCRIPT_SRC, DEFAULT_STYLE_HREF,
    PlaceholderConfig,
};
pub use pipeline::{PreviewPipeline, PreviewSurface, RefreshReport};
pub use source::{
    SHIPPED_MARKUP, SHIPPED_SCRIPT, SHIPPED_STYLE, SourceBuffer, SourceKind, SourceSet,
};
