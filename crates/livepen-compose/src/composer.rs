#![forbid(unsafe_code)]

//! Placeholder substitution: inline the style and script buffers into markup.
//!
//! The markup buffer is taken verbatim. The first stylesheet link naming the
//! configured style file is replaced with `<style>…</style>` holding the style
//! buffer, then the first external script tag naming the configured script
//! file is replaced with `<script>…</script>` holding the script buffer.
//!
//! # Matching
//!
//! ```text
//! <link  rel=Q stylesheet Q  href=Q style.css Q  [/]>
//! <script  src=Q script.js Q  ></script>
//! ```
//!
//! `Q` is `'` or `"` (each side independently), whitespace runs are flexible,
//! matching is ASCII case-insensitive, and attribute order is fixed.
//!
//! # Failure Modes
//!
//! None. A missing placeholder leaves the markup untouched for that buffer and
//! is reported through [`ComposedDocument::style_inlined`] /
//! [`ComposedDocument::script_inlined`]. Malformed markup passes through
//! uninterpreted.

use std::borrow::Cow;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{SourceKind, SourceSet};

/// Conventional stylesheet filename the shipped markup links to.
pub const DEFAULT_STYLE_HREF: &str = "style.css";

/// Conventional script filename the shipped markup loads.
pub const DEFAULT_SCRIPT_SRC: &str = "script.js";

/// Filenames the placeholders must name to be substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    pub style_href: String,
    pub script_src: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            style_href: DEFAULT_STYLE_HREF.to_owned(),
            script_src: DEFAULT_SCRIPT_SRC.to_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("placeholder filename for {kind} must not be empty")]
    EmptyFilename { kind: SourceKind },
    #[error("failed to compile {kind} placeholder pattern: {source}")]
    Pattern {
        kind: SourceKind,
        #[source]
        source: regex_lite::Error,
    },
}

/// One composed document plus which buffers reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDocument {
    pub html: String,
    pub style_inlined: bool,
    pub script_inlined: bool,
}

impl ComposedDocument {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.html
    }

    #[must_use]
    pub fn into_html(self) -> String {
        self.html
    }
}

/// Compiled placeholder patterns.
#[derive(Debug, Clone)]
pub struct Composer {
    config: PlaceholderConfig,
    style: Regex,
    script: Regex,
}

impl Composer {
    /// Compile the placeholder patterns for the given filenames.
    pub fn new(config: PlaceholderConfig) -> Result<Self, ComposeError> {
        let style = compile(SourceKind::Style, &config.style_href, |file| {
            format!(r#"(?i)<link\s+rel=["']stylesheet["']\s+href=["']{file}["']\s*/?>"#)
        })?;
        let script = compile(SourceKind::Script, &config.script_src, |file| {
            format!(r#"(?i)<script\s+src=["']{file}["']\s*></script>"#)
        })?;
        Ok(Self {
            config,
            style,
            script,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PlaceholderConfig {
        &self.config
    }

    /// Compose one document from the three buffer texts.
    #[must_use]
    pub fn compose(&self, markup: &str, style: &str, script: &str) -> ComposedDocument {
        let styled = substitute_first(&self.style, markup, "<style>", style, "</style>");
        let style_inlined = matches!(styled, Cow::Owned(_));
        let scripted = substitute_first(&self.script, &styled, "<script>", script, "</script>");
        let script_inlined = matches!(scripted, Cow::Owned(_));
        ComposedDocument {
            html: scripted.into_owned(),
            style_inlined,
            script_inlined,
        }
    }

    /// Compose from a snapshot of a [`SourceSet`].
    #[must_use]
    pub fn compose_sources(&self, sources: &SourceSet) -> ComposedDocument {
        self.compose(
            sources.text(SourceKind::Markup),
            sources.text(SourceKind::Style),
            sources.text(SourceKind::Script),
        )
    }
}

impl Default for Composer {
    /// Composer for the shipped `style.css` / `script.js` placeholders.
    ///
    /// # Panics
    ///
    /// Panics if the default placeholder patterns fail to compile. The
    /// default filenames are escaped before interpolation, so they cannot.
    fn default() -> Self {
        Self::new(PlaceholderConfig::default()).expect("default placeholder patterns compile")
    }
}

fn compile(
    kind: SourceKind,
    file: &str,
    template: impl FnOnce(&str) -> String,
) -> Result<Regex, ComposeError> {
    if file.is_empty() {
        return Err(ComposeError::EmptyFilename { kind });
    }
    let pattern = template(&regex_lite::escape(file));
    Regex::new(&pattern).map_err(|source| ComposeError::Pattern { kind, source })
}

fn substitute_first<'a>(
    pattern: &Regex,
    haystack: &'a str,
    open: &str,
    body: &str,
    close: &str,
) -> Cow<'a, str> {
    let Some(found) = pattern.find(haystack) else {
        return Cow::Borrowed(haystack);
    };
    let mut out = String::with_capacity(
        haystack.len() - found.len() + open.len() + body.len() + close.len(),
    );
    out.push_str(&haystack[..found.start()]);
    out.push_str(open);
    out.push_str(body);
    out.push_str(close);
    out.push_str(&haystack[found.end()..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SHIPPED_MARKUP, SHIPPED_SCRIPT, SHIPPED_STYLE};

    fn composer() -> Composer {
        Composer::default()
    }

    #[test]
    fn default_placeholder_patterns_compile() {
        let config = PlaceholderConfig::default();
        assert_eq!(config.style_href, "style.css");
        assert_eq!(config.script_src, "script.js");
        assert!(Composer::new(config).is_ok());
    }

    #[test]
    fn shipped_sources_compose_to_expected_document() {
        let doc = composer().compose(SHIPPED_MARKUP, SHIPPED_STYLE, SHIPPED_SCRIPT);
        assert!(doc.style_inlined);
        assert!(doc.script_inlined);
        assert!(doc.html.contains("<h1>Hello, Responsive World!</h1>"));
        assert!(doc.html.contains("color: dodgerblue;"));
        assert!(doc.html.contains("text-align: center;"));
        assert!(
            doc.html
                .contains(r#"<script>console.log("Responsive script loaded");</script>"#)
        );
        assert!(!doc.html.contains("style.css"));
        assert!(!doc.html.contains("script.js"));
    }

    #[test]
    fn uppercase_tag_with_mixed_quotes_matches() {
        let doc = composer().compose(r#"<LINK REL='stylesheet' HREF="style.css">"#, "a{}", "");
        assert_eq!(doc.html, "<style>a{}</style>");
        assert!(doc.style_inlined);
    }

    #[test]
    fn self_closing_link_with_single_quoted_href_matches() {
        let doc = composer().compose(r#"<link rel="stylesheet" href='style.css' />"#, "b{}", "");
        assert_eq!(doc.html, "<style>b{}</style>");
    }

    #[test]
    fn script_placeholder_tolerates_whitespace_before_close() {
        let doc = composer().compose(r#"<SCRIPT  src='script.js'   ></SCRIPT>"#, "", "go()");
        assert_eq!(doc.html, "<script>go()</script>");
    }

    #[test]
    fn attribute_order_is_fixed() {
        let markup = r#"<link href="style.css" rel="stylesheet">"#;
        let doc = composer().compose(markup, "x", "");
        assert_eq!(doc.html, markup);
        assert!(!doc.style_inlined);
    }

    #[test]
    fn missing_placeholders_are_silent_noops() {
        let markup = "<p>no placeholders</p>";
        let a = composer().compose(markup, "one", "1");
        let b = composer().compose(markup, "two", "2");
        assert_eq!(a.html, markup);
        assert_eq!(a.html, b.html);
        assert!(!a.style_inlined);
        assert!(!a.script_inlined);
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let markup = concat!(
            r#"<link rel="stylesheet" href="style.css">"#,
            r#"<link rel="stylesheet" href="style.css">"#,
        );
        let doc = composer().compose(markup, "s", "");
        assert_eq!(
            doc.html,
            r#"<style>s</style><link rel="stylesheet" href="style.css">"#
        );
    }

    #[test]
    fn replacement_text_is_literal() {
        let doc = composer().compose(
            r#"<script src="script.js"></script>"#,
            "",
            "let price = '$1' + '$&' + '${x}';",
        );
        assert_eq!(
            doc.html,
            "<script>let price = '$1' + '$&' + '${x}';</script>"
        );
    }

    #[test]
    fn other_filenames_are_left_alone() {
        let markup = r#"<link rel="stylesheet" href="theme.css"><script src="app.js"></script>"#;
        let doc = composer().compose(markup, "s", "j");
        assert_eq!(doc.html, markup);
    }

    #[test]
    fn filename_dot_is_literal() {
        let doc = composer().compose(r#"<link rel="stylesheet" href="stylexcss">"#, "s", "");
        assert!(!doc.style_inlined);
    }

    #[test]
    fn custom_filenames_are_escaped() {
        let composer = Composer::new(PlaceholderConfig {
            style_href: "css/main+dark.css".into(),
            script_src: "js/app(1).js".into(),
        })
        .expect("escaped filenames compile");
        let doc = composer.compose(
            r#"<link rel="stylesheet" href="css/main+dark.css"><script src="js/app(1).js"></script>"#,
            "s",
            "j",
        );
        assert_eq!(doc.html, "<style>s</style><script>j</script>");
    }

    #[test]
    fn empty_filename_is_rejected() {
        let err = Composer::new(PlaceholderConfig {
            style_href: String::new(),
            ..PlaceholderConfig::default()
        })
        .expect_err("empty filename must fail");
        assert!(matches!(
            err,
            ComposeError::EmptyFilename {
                kind: SourceKind::Style
            }
        ));
    }

    #[test]
    fn malformed_markup_passes_through() {
        let markup = r#"<div><span><link rel="stylesheet" href="style.css"></div"#;
        let doc = composer().compose(markup, "p{}", "");
        assert_eq!(doc.html, "<div><span><style>p{}</style></div");
    }

    #[test]
    fn placeholder_config_defaults_when_fields_missing() {
        let config: PlaceholderConfig =
            serde_json::from_str(r#"{"script_src":"main.js"}"#).expect("partial config parses");
        assert_eq!(config.style_href, DEFAULT_STYLE_HREF);
        assert_eq!(config.script_src, "main.js");
    }
}
