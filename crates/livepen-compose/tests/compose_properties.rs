//! Property checks for placeholder substitution.
//!
//! Buffer texts are drawn without `<` or `.` so they can never themselves name a
//! placeholder or its filename; quotes, `$`, unicode and newlines are fair.

use livepen_compose::{Composer, SourceKind, SourceSet};
use proptest::prelude::*;

const CANONICAL: &str = concat!(
    "<html><head>",
    r#"<link rel="stylesheet" href="style.css" />"#,
    "</head><body>",
    r#"<script src="script.js"></script>"#,
    "</body></html>",
);

fn buffer_text() -> impl Strategy<Value = String> {
    "[^<.]{0,64}"
}

fn link_variant() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["link", "LINK", "Link"]),
        prop::sample::select(vec!["rel", "REL"]),
        prop::sample::select(vec!["href", "HREF", "Href"]),
        prop::sample::select(vec!['"', '\'']),
        prop::sample::select(vec!['"', '\'']),
        prop::sample::select(vec!["", " ", "  "]),
        prop::sample::select(vec![">", "/>"]),
    )
        .prop_map(|(tag, rel, href, q1, q2, ws, close)| {
            format!("<{tag} {rel}={q1}stylesheet{q1} {href}={q2}style.css{q2}{ws}{close}")
        })
}

proptest! {
    #[test]
    fn canonical_placeholders_are_replaced_verbatim(
        style in buffer_text(),
        script in buffer_text(),
    ) {
        let doc = Composer::default().compose(CANONICAL, &style, &script);
        let style_block = format!("<style>{style}</style>");
        let script_block = format!("<script>{script}</script>");
        prop_assert!(doc.style_inlined);
        prop_assert!(doc.script_inlined);
        prop_assert!(doc.html.contains(&style_block));
        prop_assert!(doc.html.contains(&script_block));
        prop_assert!(!doc.html.contains("style.css"));
        prop_assert!(!doc.html.contains("script.js"));
    }

    #[test]
    fn output_ignores_style_when_placeholder_absent(
        a in buffer_text(),
        b in buffer_text(),
        script in buffer_text(),
    ) {
        let markup = r#"<body><script src="script.js"></script></body>"#;
        let composer = Composer::default();
        let left = composer.compose(markup, &a, &script);
        let right = composer.compose(markup, &b, &script);
        prop_assert_eq!(left.html, right.html);
        prop_assert!(!left.style_inlined);
    }

    #[test]
    fn link_spellings_all_match(link in link_variant(), style in buffer_text()) {
        let doc = Composer::default().compose(&link, &style, "");
        prop_assert!(doc.style_inlined);
        prop_assert_eq!(doc.html, format!("<style>{style}</style>"));
    }

    #[test]
    fn compose_never_panics_on_arbitrary_markup(
        markup in ".{0,256}",
        style in ".{0,64}",
        script in ".{0,64}",
    ) {
        let sources = SourceSet::new(markup.clone(), style, script);
        let doc = Composer::default().compose_sources(&sources);
        if !doc.style_inlined && !doc.script_inlined {
            prop_assert_eq!(doc.html, sources.text(SourceKind::Markup));
        }
    }
}
