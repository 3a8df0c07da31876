#![no_main]

use libfuzzer_sys::fuzz_target;
use livepen_compose::{Composer, PlaceholderConfig};

fuzz_target!(|data: &[u8]| {
    // Split the input into markup, style and script at the first two NULs.
    let text = String::from_utf8_lossy(data);
    let mut parts = text.splitn(3, '\0');
    let markup = parts.next().unwrap_or_default();
    let style = parts.next().unwrap_or_default();
    let script = parts.next().unwrap_or_default();

    let composer =
        Composer::new(PlaceholderConfig::default()).expect("default placeholders compile");
    let doc = composer.compose(markup, style, script);

    // Substitution never drops surrounding markup and inlines bodies verbatim.
    if !doc.style_inlined && !doc.script_inlined {
        assert_eq!(doc.html, markup);
    }
    if doc.style_inlined {
        assert!(doc.html.contains(&format!("<style>{style}</style>")));
    }
    if doc.script_inlined {
        assert!(doc.html.contains(&format!("<script>{script}</script>")));
    }
});
