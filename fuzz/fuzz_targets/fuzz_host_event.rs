#![no_main]

use libfuzzer_sys::fuzz_target;
use livepen_web::{PlaygroundConfig, PlaygroundSession, Viewport, parse_host_event};

fuzz_target!(|data: &[u8]| {
    // Each line is one host event; the parser must never panic and every
    // accepted event must leave the layout consistent.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut session =
        PlaygroundSession::new(PlaygroundConfig::default()).expect("default config is valid");
    session.init(Viewport::full(1024, 768));

    for line in text.lines().take(64) {
        let Ok(Some(event)) = parse_host_event(line) else {
            continue;
        };
        session.apply(&event);
        if let Some(geometry) = session.layout_surface().snapshot().geometry {
            assert_eq!(geometry.total(), u64::from(geometry.container));
        }
    }
});
