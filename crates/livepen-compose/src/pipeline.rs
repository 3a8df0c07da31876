#![forbid(unsafe_code)]

//! Refresh pipeline: compose the current buffers and replace the preview.

use crate::composer::Composer;
use crate::source::SourceSet;

/// Sink that displays a composed document.
///
/// Implementations replace the entire displayed document (open, write,
/// close). Previewed script state does not survive a replacement.
pub trait PreviewSurface {
    fn replace_document(&mut self, html: &str);
}

impl<T: PreviewSurface + ?Sized> PreviewSurface for &mut T {
    fn replace_document(&mut self, html: &str) {
        (**self).replace_document(html);
    }
}

/// Outcome of one [`PreviewPipeline::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// 1-based index of this render within the pipeline's lifetime.
    pub render_index: u64,
    pub bytes: usize,
    pub style_inlined: bool,
    pub script_inlined: bool,
}

/// Composer plus a render counter.
#[derive(Debug, Clone, Default)]
pub struct PreviewPipeline {
    composer: Composer,
    renders: u64,
}

impl PreviewPipeline {
    #[must_use]
    pub fn new(composer: Composer) -> Self {
        Self {
            composer,
            renders: 0,
        }
    }

    #[must_use]
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Number of documents written so far.
    #[must_use]
    pub const fn renders(&self) -> u64 {
        self.renders
    }

    /// Compose a snapshot of `sources` and write it to `surface`.
    pub fn refresh<S: PreviewSurface + ?Sized>(
        &mut self,
        sources: &SourceSet,
        surface: &mut S,
    ) -> RefreshReport {
        let doc = self.composer.compose_sources(sources);
        surface.replace_document(doc.as_str());
        self.renders = self.renders.saturating_add(1);

        let report = RefreshReport {
            render_index: self.renders,
            bytes: doc.html.len(),
            style_inlined: doc.style_inlined,
            script_inlined: doc.script_inlined,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "compose.refresh",
            render_index = report.render_index,
            bytes = report.bytes,
            style_inlined = report.style_inlined,
            script_inlined = report.script_inlined,
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    #[derive(Default)]
    struct RecordingSurface {
        documents: Vec<String>,
    }

    impl PreviewSurface for RecordingSurface {
        fn replace_document(&mut self, html: &str) {
            self.documents.push(html.to_owned());
        }
    }

    #[test]
    fn each_refresh_writes_exactly_one_document() {
        let mut pipeline = PreviewPipeline::default();
        let mut surface = RecordingSurface::default();
        let mut sources = SourceSet::shipped();

        let first = pipeline.refresh(&sources, &mut surface);
        assert_eq!(first.render_index, 1);
        assert_eq!(surface.documents.len(), 1);

        sources.get_mut(SourceKind::Style).set_text("h1 { color: red; }");
        let second = pipeline.refresh(&sources, &mut surface);
        assert_eq!(second.render_index, 2);
        assert_eq!(pipeline.renders(), 2);
        assert_eq!(surface.documents.len(), 2);
        assert!(surface.documents[1].contains("<style>h1 { color: red; }</style>"));
    }

    #[test]
    fn report_flags_dropped_buffers() {
        let mut pipeline = PreviewPipeline::default();
        let mut surface = RecordingSurface::default();
        let sources = SourceSet::new("<p>bare</p>", "ignored", "ignored");

        let report = pipeline.refresh(&sources, &mut surface);
        assert!(!report.style_inlined);
        assert!(!report.script_inlined);
        assert_eq!(report.bytes, "<p>bare</p>".len());
        assert_eq!(surface.documents, vec!["<p>bare</p>".to_owned()]);
    }

    #[test]
    fn refresh_through_mutable_reference() {
        let mut pipeline = PreviewPipeline::default();
        let mut surface = RecordingSurface::default();
        let mut by_ref = &mut surface;
        pipeline.refresh(&SourceSet::shipped(), &mut by_ref);
        assert_eq!(surface.documents.len(), 1);
    }
}
