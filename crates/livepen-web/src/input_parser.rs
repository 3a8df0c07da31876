#![forbid(unsafe_code)]

//! JSON parser for host-encoded playground events.
//!
//! Hosts serialize each DOM signal they care about as one flat JSON object:
//!
//! ```json
//! {"kind":"edit","editor":"css","text":"h1 { color: red; }"}
//! {"kind":"resize","width":1280,"container":{"x":0,"y":48,"width":1280,"height":672},"divider":6}
//! {"kind":"pointer","phase":"down","pointer_id":1,"button":0,"x":640,"y":300}
//! {"kind":"blur"}
//! {"kind":"toggle"}
//! {"kind":"tab","tab":"js"}
//! {"kind":"keyboard"}
//! {"kind":"scroll","editor":"html","focused":true}
//! {"kind":"tick","dt_ms":16}
//! ```
//!
//! [`parse_host_event`] returns `Ok(None)` for kinds it does not know, so
//! newer hosts can send extra signals to older runners. Malformed JSON and
//! missing or unrecognized required values are errors.

use livepen_compose::SourceKind;
use livepen_layout::{PointerPosition, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pointer_capture::PointerButton;
use crate::{DEFAULT_DIVIDER_THICKNESS, Viewport};

/// Errors from parsing host event JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostEventParseError {
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unknown pointer phase: {0}")]
    UnknownPhase(String),
    #[error("unknown editor: {0}")]
    UnknownEditor(String),
}

/// Pointer lifecycle step reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// `lostpointercapture`.
    Cancel,
}

/// One host signal, in the shape sessions consume and traces store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    Edit {
        editor: SourceKind,
        text: String,
    },
    Resize {
        viewport: Viewport,
    },
    Pointer {
        phase: PointerPhase,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    },
    Blur,
    Toggle,
    /// Tab label as sent by the host; unknown labels are ignored downstream.
    Tab {
        tab: String,
    },
    Keyboard,
    Scroll {
        editor: SourceKind,
        focused: bool,
    },
    Tick {
        dt_ms: u64,
    },
}

#[derive(Debug, Deserialize)]
struct RawRect {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    width: u32,
    height: u32,
}

/// Internal deserialization target for the flat wire shape.
#[derive(Debug, Deserialize)]
struct RawHostEvent {
    kind: String,
    #[serde(default)]
    editor: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    container: Option<RawRect>,
    #[serde(default)]
    divider: Option<u32>,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    pointer_id: Option<u32>,
    #[serde(default)]
    button: Option<i32>,
    #[serde(default)]
    x: Option<i32>,
    #[serde(default)]
    y: Option<i32>,
    #[serde(default)]
    tab: Option<String>,
    #[serde(default)]
    focused: Option<bool>,
    #[serde(default)]
    dt_ms: Option<u64>,
}

/// Parse one JSON-encoded host event.
///
/// Returns `Ok(None)` for unknown kinds and `Err` for malformed JSON or
/// missing required fields.
pub fn parse_host_event(json: &str) -> Result<Option<HostEvent>, HostEventParseError> {
    let raw: RawHostEvent =
        serde_json::from_str(json).map_err(|e| HostEventParseError::Json(e.to_string()))?;

    match raw.kind.as_str() {
        "edit" => parse_edit(raw).map(Some),
        "resize" => parse_resize(&raw).map(Some),
        "pointer" => parse_pointer(&raw).map(Some),
        "blur" => Ok(Some(HostEvent::Blur)),
        "toggle" => Ok(Some(HostEvent::Toggle)),
        "tab" => raw
            .tab
            .map(|tab| Some(HostEvent::Tab { tab }))
            .ok_or(HostEventParseError::MissingField("tab")),
        "keyboard" => Ok(Some(HostEvent::Keyboard)),
        "scroll" => Ok(Some(HostEvent::Scroll {
            editor: parse_editor(raw.editor.as_deref())?,
            focused: raw.focused.unwrap_or(false),
        })),
        "tick" => raw
            .dt_ms
            .map(|dt_ms| Some(HostEvent::Tick { dt_ms }))
            .ok_or(HostEventParseError::MissingField("dt_ms")),
        _ => Ok(None),
    }
}

fn parse_editor(label: Option<&str>) -> Result<SourceKind, HostEventParseError> {
    let label = label.ok_or(HostEventParseError::MissingField("editor"))?;
    SourceKind::from_label(label).ok_or_else(|| HostEventParseError::UnknownEditor(label.to_owned()))
}

fn parse_edit(raw: RawHostEvent) -> Result<HostEvent, HostEventParseError> {
    let editor = parse_editor(raw.editor.as_deref())?;
    let text = raw.text.ok_or(HostEventParseError::MissingField("text"))?;
    Ok(HostEvent::Edit { editor, text })
}

fn parse_resize(raw: &RawHostEvent) -> Result<HostEvent, HostEventParseError> {
    let width = raw.width.ok_or(HostEventParseError::MissingField("width"))?;
    let container = match (&raw.container, raw.height) {
        (Some(rect), _) => Rect::new(rect.x, rect.y, rect.width, rect.height),
        (None, Some(height)) => Rect::new(0, 0, width, height),
        (None, None) => return Err(HostEventParseError::MissingField("container")),
    };
    Ok(HostEvent::Resize {
        viewport: Viewport {
            width,
            container,
            divider: raw.divider.unwrap_or(DEFAULT_DIVIDER_THICKNESS),
        },
    })
}

fn parse_pointer(raw: &RawHostEvent) -> Result<HostEvent, HostEventParseError> {
    let phase = match raw.phase.as_deref() {
        Some("down") => PointerPhase::Down,
        Some("move") => PointerPhase::Move,
        Some("up") => PointerPhase::Up,
        Some("cancel") => PointerPhase::Cancel,
        Some(other) => return Err(HostEventParseError::UnknownPhase(other.to_owned())),
        None => return Err(HostEventParseError::MissingField("phase")),
    };
    let pointer_id = raw
        .pointer_id
        .ok_or(HostEventParseError::MissingField("pointer_id"))?;
    Ok(HostEvent::Pointer {
        phase,
        pointer_id,
        button: PointerButton::from_dom(raw.button.unwrap_or(0)),
        position: PointerPosition::new(raw.x.unwrap_or(0), raw.y.unwrap_or(0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> HostEvent {
        parse_host_event(json)
            .expect("event parses")
            .expect("event kind is known")
    }

    #[test]
    fn edit_event() {
        assert_eq!(
            parse(r#"{"kind":"edit","editor":"css","text":"p{}"}"#),
            HostEvent::Edit {
                editor: SourceKind::Style,
                text: "p{}".to_owned(),
            }
        );
    }

    #[test]
    fn edit_requires_known_editor_and_text() {
        assert_eq!(
            parse_host_event(r#"{"kind":"edit","editor":"ts","text":""}"#),
            Err(HostEventParseError::UnknownEditor("ts".to_owned()))
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"edit","editor":"js"}"#),
            Err(HostEventParseError::MissingField("text"))
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"edit","text":"x"}"#),
            Err(HostEventParseError::MissingField("editor"))
        );
    }

    #[test]
    fn resize_with_container_and_divider() {
        assert_eq!(
            parse(
                r#"{"kind":"resize","width":1280,"container":{"x":0,"y":48,"width":1280,"height":672},"divider":4}"#
            ),
            HostEvent::Resize {
                viewport: Viewport {
                    width: 1280,
                    container: Rect::new(0, 48, 1280, 672),
                    divider: 4,
                },
            }
        );
    }

    #[test]
    fn resize_height_shorthand_fills_window() {
        assert_eq!(
            parse(r#"{"kind":"resize","width":600,"height":800}"#),
            HostEvent::Resize {
                viewport: Viewport::full(600, 800),
            }
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"resize","width":600}"#),
            Err(HostEventParseError::MissingField("container"))
        );
    }

    #[test]
    fn pointer_phases() {
        assert_eq!(
            parse(r#"{"kind":"pointer","phase":"down","pointer_id":1,"button":0,"x":5,"y":6}"#),
            HostEvent::Pointer {
                phase: PointerPhase::Down,
                pointer_id: 1,
                button: PointerButton::Primary,
                position: PointerPosition::new(5, 6),
            }
        );
        let HostEvent::Pointer { phase, button, .. } =
            parse(r#"{"kind":"pointer","phase":"cancel","pointer_id":3,"button":2}"#)
        else {
            panic!("expected pointer event");
        };
        assert_eq!(phase, PointerPhase::Cancel);
        assert_eq!(button, PointerButton::Secondary);
    }

    #[test]
    fn pointer_errors() {
        assert_eq!(
            parse_host_event(r#"{"kind":"pointer","phase":"hover","pointer_id":1}"#),
            Err(HostEventParseError::UnknownPhase("hover".to_owned()))
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"pointer","pointer_id":1}"#),
            Err(HostEventParseError::MissingField("phase"))
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"pointer","phase":"up"}"#),
            Err(HostEventParseError::MissingField("pointer_id"))
        );
    }

    #[test]
    fn bare_events() {
        assert_eq!(parse(r#"{"kind":"blur"}"#), HostEvent::Blur);
        assert_eq!(parse(r#"{"kind":"toggle"}"#), HostEvent::Toggle);
        assert_eq!(parse(r#"{"kind":"keyboard"}"#), HostEvent::Keyboard);
    }

    #[test]
    fn tab_keeps_unknown_labels() {
        assert_eq!(
            parse(r#"{"kind":"tab","tab":"settings"}"#),
            HostEvent::Tab {
                tab: "settings".to_owned()
            }
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"tab"}"#),
            Err(HostEventParseError::MissingField("tab"))
        );
    }

    #[test]
    fn scroll_defaults_to_unfocused() {
        assert_eq!(
            parse(r#"{"kind":"scroll","editor":"html"}"#),
            HostEvent::Scroll {
                editor: SourceKind::Markup,
                focused: false,
            }
        );
    }

    #[test]
    fn tick_requires_duration() {
        assert_eq!(
            parse(r#"{"kind":"tick","dt_ms":16}"#),
            HostEvent::Tick { dt_ms: 16 }
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"tick"}"#),
            Err(HostEventParseError::MissingField("dt_ms"))
        );
    }

    #[test]
    fn unknown_kind_is_none() {
        assert_eq!(parse_host_event(r#"{"kind":"touch"}"#), Ok(None));
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(matches!(
            parse_host_event("{not json"),
            Err(HostEventParseError::Json(_))
        ));
        assert!(matches!(
            parse_host_event(r#"{"editor":"css"}"#),
            Err(HostEventParseError::Json(_))
        ));
    }

    #[test]
    fn host_events_round_trip_through_trace_shape() {
        let event = HostEvent::Pointer {
            phase: PointerPhase::Move,
            pointer_id: 2,
            button: PointerButton::Primary,
            position: PointerPosition::new(-4, 9),
        };
        let json = serde_json::to_string(&event).expect("event serializes");
        let back: HostEvent = serde_json::from_str(&json).expect("event deserializes");
        assert_eq!(back, event);
    }
}
