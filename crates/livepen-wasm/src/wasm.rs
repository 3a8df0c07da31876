#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the [`PlaygroundRunner`].
//!
//! Wraps [`super::runner_core::RunnerCore`] and copies its output into the
//! page after every call. Only compiled on `wasm32` targets.

use std::fmt::Display;

use js_sys::{Array, JSON, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlDocument, HtmlElement, HtmlIFrameElement};

use livepen_compose::SourceKind;
use livepen_layout::{PaneMode, PointerPosition, Rect, ResizeAxis};
use livepen_web::{
    DEFAULT_DIVIDER_THICKNESS, HostCommand, KeyboardCommand, LayoutSnapshot,
    PointerCaptureCommand, PointerDispatch, PointerButton, Viewport,
};

use super::runner_core::{ElementIds, RunnerCore, RunnerOptions, StepResult};

const KEYBOARD_PROXY_ID: &str = "livepen-keyboard-proxy";
const TAB_BUTTON_SELECTOR: &str = ".tabs button[data-tab]";

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!(
                    "livepen panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                ),
                None => format!("livepen panic: {info}"),
            };
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

/// Round a CSS pixel measurement to a non-negative integer.
fn css_px(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn css_coord(value: f64) -> i32 {
    if value.is_finite() {
        value
            .round()
            .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    } else {
        0
    }
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("livepen: no document"))
}

fn window_width() -> Result<u32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("livepen: no window"))?;
    Ok(css_px(window.inner_width()?.as_f64().unwrap_or(0.0)))
}

fn lookup<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("livepen: missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("livepen: element #{id} has the wrong type")))
}

fn dispatch_to_js(dispatch: &PointerDispatch) -> JsValue {
    let log = serde_json::to_string(&dispatch.log)
        .ok()
        .and_then(|json| JSON::parse(&json).ok())
        .and_then(|value| value.dyn_into::<Object>().ok())
        .unwrap_or_else(Object::new);
    set_js(&log, "accepted", JsValue::from_bool(!dispatch.is_ignored()));
    log.into()
}

fn step_to_js(result: StepResult) -> JsValue {
    let obj = Object::new();
    set_js(
        &obj,
        "events_processed",
        JsValue::from_f64(f64::from(result.events_processed)),
    );
    set_js(
        &obj,
        "documents_written",
        JsValue::from_f64(result.documents_written as f64),
    );
    set_js(&obj, "layout_changed", JsValue::from_bool(result.layout_changed));
    obj.into()
}

/// Live page elements the runner writes into.
struct Page {
    document: Document,
    container: Element,
    editors: HtmlElement,
    preview: HtmlIFrameElement,
    resizer: HtmlElement,
    toggle: Option<HtmlElement>,
}

impl Page {
    fn locate(ids: &ElementIds) -> Result<Self, JsValue> {
        let document = document()?;
        Ok(Self {
            container: lookup(&document, &ids.container)?,
            editors: lookup(&document, &ids.editors)?,
            preview: lookup(&document, &ids.preview)?,
            resizer: lookup(&document, &ids.resizer)?,
            toggle: lookup(&document, &ids.toggle).ok(),
            document,
        })
    }

    /// Current container bounds and divider thickness.
    fn measure(&self, width: u32) -> Viewport {
        let bounds = self.container.get_bounding_client_rect();
        let thickness = self.resizer.offset_width().min(self.resizer.offset_height());
        let divider = u32::try_from(thickness)
            .ok()
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_DIVIDER_THICKNESS);
        Viewport {
            width,
            container: Rect::new(
                css_coord(bounds.left()),
                css_coord(bounds.top()),
                css_px(bounds.width()),
                css_px(bounds.height()),
            ),
            divider,
        }
    }

    fn write_preview(&self, html: &str) -> Result<(), JsValue> {
        let doc = self
            .preview
            .content_document()
            .ok_or_else(|| JsValue::from_str("livepen: preview frame has no document"))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| JsValue::from_str("livepen: preview document is not HTML"))?;
        doc.open()?;
        doc.write_1(html)?;
        doc.close()
    }

    fn apply_layout(&self, layout: &LayoutSnapshot) -> Result<(), JsValue> {
        let classes = self.container.class_list();
        if let Some(orientation) = layout.orientation {
            classes.toggle_with_force("vertical", orientation.is_stacked())?;
        }
        classes.toggle_with_force("preview-mode", layout.pane_mode == PaneMode::PreviewOnly)?;

        if let Some(geometry) = layout.geometry {
            let (sized, cleared) = match geometry.axis {
                ResizeAxis::Vertical => ("height", "width"),
                ResizeAxis::Horizontal => ("width", "height"),
            };
            let preview: &HtmlElement = &self.preview;
            for (pane, extent) in [(&self.editors, geometry.editor), (preview, geometry.preview)] {
                let style = pane.style();
                style.set_property(sized, &format!("{extent}px"))?;
                style.remove_property(cleared)?;
            }
        }

        if let Some(body) = self.document.body() {
            body.style().set_property("cursor", layout.cursor.css_value())?;
        }
        if let Some(toggle) = &self.toggle {
            toggle.set_text_content(Some(&layout.toggle_label));
        }
        Ok(())
    }

    fn show_tab(&self, active: SourceKind, ids: &ElementIds) -> Result<(), JsValue> {
        for kind in SourceKind::ALL {
            if let Some(editor) = self.document.get_element_by_id(ids.editor(kind)) {
                editor.class_list().toggle_with_force("hidden", kind != active)?;
            }
        }
        let buttons = self.document.query_selector_all(TAB_BUTTON_SELECTOR)?;
        for idx in 0..buttons.length() {
            let Some(button) = buttons.get(idx).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let is_active = button.get_attribute("data-tab").as_deref() == Some(active.label());
            button.class_list().toggle_with_force("active", is_active)?;
        }
        Ok(())
    }

    /// The focusable text input inside an editor, or the editor itself.
    fn editor_input(&self, ids: &ElementIds, kind: SourceKind) -> Option<HtmlElement> {
        let editor = self.document.get_element_by_id(ids.editor(kind))?;
        let input = editor.query_selector("textarea").ok().flatten().unwrap_or(editor);
        input.dyn_into::<HtmlElement>().ok()
    }

    fn run(&self, command: HostCommand, ids: &ElementIds) -> Result<(), JsValue> {
        match command {
            HostCommand::Capture(PointerCaptureCommand::Acquire { pointer_id }) => {
                self.resizer.set_pointer_capture(pointer_id as i32)?;
            }
            HostCommand::Capture(PointerCaptureCommand::Release { pointer_id }) => {
                // Throws when the browser already dropped capture.
                let _ = self.resizer.release_pointer_capture(pointer_id as i32);
            }
            HostCommand::Keyboard(KeyboardCommand::FocusProxy) => {
                let proxy = self
                    .document
                    .create_element("input")?
                    .dyn_into::<HtmlElement>()
                    .map_err(|_| JsValue::from_str("livepen: proxy is not an element"))?;
                proxy.set_id(KEYBOARD_PROXY_ID);
                proxy.set_attribute("type", "text")?;
                let style = proxy.style();
                style.set_property("position", "fixed")?;
                style.set_property("top", "0")?;
                style.set_property("opacity", "0")?;
                style.set_property("height", "0")?;
                if let Some(body) = self.document.body() {
                    body.append_child(&proxy)?;
                }
                proxy.focus()?;
            }
            HostCommand::Keyboard(KeyboardCommand::FocusEditor(kind)) => {
                if let Some(input) = self.editor_input(ids, kind) {
                    input.focus()?;
                }
            }
            HostCommand::Keyboard(KeyboardCommand::RevealCursor(kind)) => {
                if let Some(input) = self.editor_input(ids, kind) {
                    input.scroll_into_view_with_bool(false);
                }
            }
            HostCommand::Keyboard(KeyboardCommand::RemoveProxy) => {
                if let Some(proxy) = self.document.get_element_by_id(KEYBOARD_PROXY_ID) {
                    proxy.remove();
                }
            }
            HostCommand::Keyboard(KeyboardCommand::Blur(kind)) => {
                if let Some(input) = self.editor_input(ids, kind) {
                    input.blur()?;
                }
            }
        }
        Ok(())
    }
}

/// Browser playground runner. Every method flushes its effects into the page.
#[wasm_bindgen]
pub struct PlaygroundRunner {
    core: RunnerCore,
    page: Page,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

impl PlaygroundRunner {
    fn flush(&mut self) -> Result<(), JsValue> {
        let flush = self.core.take_flush();
        if flush.is_empty() {
            return Ok(());
        }
        if let Some(document) = &flush.document {
            self.page.write_preview(document)?;
        }
        if let Some(layout) = &flush.layout {
            self.page.apply_layout(layout)?;
        }
        if let Some(active) = flush.active_tab {
            self.page.show_tab(active, self.core.elements())?;
        }
        for command in flush.commands {
            self.page.run(command, self.core.elements())?;
        }
        Ok(())
    }

    /// Refresh container bounds; the page may have scrolled since the last
    /// resize.
    fn remeasure(&mut self) -> Result<(), JsValue> {
        let viewport = self.page.measure(window_width()?);
        self.core.remeasure(&viewport);
        Ok(())
    }

    /// Measure the page as it stands after a flush and lay out against it.
    fn relayout_measured(&mut self, width: u32) -> Result<(), JsValue> {
        let viewport = self.page.measure(width);
        self.core.resize(viewport);
        self.flush()
    }

    fn flushed<T>(&mut self, value: T) -> Result<T, JsValue> {
        self.flush()?;
        Ok(value)
    }
}

#[wasm_bindgen]
impl PlaygroundRunner {
    /// Build a runner from an optional JSON `{ "config": ..., "elements": ... }`.
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<PlaygroundRunner, JsValue> {
        install_panic_hook();
        let options = match options_json.as_deref() {
            Some(json) => RunnerOptions::from_json(json).map_err(js_error)?,
            None => RunnerOptions::default(),
        };
        let page = Page::locate(&options.elements)?;
        let core = RunnerCore::new(options).map_err(js_error)?;
        Ok(Self { core, page })
    }

    /// Page load: measure, lay out, and write the first preview document.
    pub fn init(&mut self) -> Result<(), JsValue> {
        let width = window_width()?;
        let viewport = self.page.measure(width);
        if self.core.init(viewport).is_none() {
            return Ok(());
        }
        self.flush()?;
        // The first flush sets the container classes, which can change its box.
        self.relayout_measured(width)
    }

    /// Editor content changed. Returns `false` for an unknown editor label.
    #[wasm_bindgen(js_name = sourceChanged)]
    pub fn source_changed(&mut self, editor: &str, text: &str) -> Result<bool, JsValue> {
        let Some(kind) = SourceKind::from_label(editor) else {
            return Ok(false);
        };
        self.core.edit(kind, text);
        self.flushed(true)
    }

    /// Window resized to `width` CSS pixels.
    pub fn resize(&mut self, width: f64) -> Result<(), JsValue> {
        let width = css_px(width);
        let before = self.core.layout_snapshot().orientation;
        let viewport = self.page.measure(width);
        self.core.resize(viewport);
        self.flush()?;
        if self.core.layout_snapshot().orientation != before {
            // Toggling `vertical` reflowed the container.
            self.relayout_measured(width)?;
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        pointer_id: u32,
        button: i32,
        x: i32,
        y: i32,
    ) -> Result<JsValue, JsValue> {
        self.remeasure()?;
        let dispatch = self.core.pointer_down(
            pointer_id,
            PointerButton::from_dom(button),
            PointerPosition::new(x, y),
        );
        self.flushed(dispatch_to_js(&dispatch))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, pointer_id: u32, x: i32, y: i32) -> Result<JsValue, JsValue> {
        self.remeasure()?;
        let dispatch = self
            .core
            .pointer_move(pointer_id, PointerPosition::new(x, y));
        self.flushed(dispatch_to_js(&dispatch))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, pointer_id: u32, x: i32, y: i32) -> Result<JsValue, JsValue> {
        let dispatch = self.core.pointer_up(pointer_id, PointerPosition::new(x, y));
        self.flushed(dispatch_to_js(&dispatch))
    }

    #[wasm_bindgen(js_name = lostPointerCapture)]
    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> Result<JsValue, JsValue> {
        let dispatch = self.core.lost_pointer_capture(pointer_id);
        self.flushed(dispatch_to_js(&dispatch))
    }

    /// Window lost focus.
    pub fn blur(&mut self) -> Result<JsValue, JsValue> {
        let dispatch = self.core.blur();
        self.flushed(dispatch_to_js(&dispatch))
    }

    /// Returns `false` when the toggle had no effect.
    #[wasm_bindgen(js_name = togglePreview)]
    pub fn toggle_preview(&mut self) -> Result<bool, JsValue> {
        let changed = !self.core.toggle_preview().is_noop();
        self.flushed(changed)
    }

    #[wasm_bindgen(js_name = selectTab)]
    pub fn select_tab(&mut self, label: &str) -> Result<bool, JsValue> {
        let changed = self.core.select_tab(label);
        self.flushed(changed)
    }

    #[wasm_bindgen(js_name = requestKeyboard)]
    pub fn request_keyboard(&mut self) -> Result<(), JsValue> {
        self.core.request_keyboard();
        self.flush()
    }

    /// An editor scrolled while its input had (or lacked) focus.
    #[wasm_bindgen(js_name = editorScrolled)]
    pub fn editor_scrolled(&mut self, editor: &str, focused: bool) -> Result<(), JsValue> {
        if let Some(kind) = SourceKind::from_label(editor) {
            self.core.editor_scrolled(kind, focused);
        }
        self.flush()
    }

    /// Advance the deterministic clock; fires due keyboard reveals.
    #[wasm_bindgen(js_name = advanceTimeMs)]
    pub fn advance_time_ms(&mut self, dt_ms: f64) -> Result<(), JsValue> {
        self.core.advance_time_ms(dt_ms);
        self.flush()
    }

    /// Queue a JSON host event for the next [`Self::step`].
    #[wasm_bindgen(js_name = pushEncodedInput)]
    pub fn push_encoded_input(&mut self, json: &str) -> bool {
        self.core.push_encoded_input(json)
    }

    /// Apply queued events and flush.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        let result = self.core.step();
        self.flushed(step_to_js(result))
    }

    #[wasm_bindgen(js_name = layoutSnapshot)]
    pub fn layout_snapshot(&self) -> Result<JsValue, JsValue> {
        let json = serde_json::to_string(&self.core.layout_snapshot()).map_err(js_error)?;
        JSON::parse(&json)
    }

    /// Drain diagnostics and pointer lifecycle log lines.
    #[wasm_bindgen(js_name = takeLogs)]
    pub fn take_logs(&mut self) -> Array {
        self.core
            .take_logs()
            .into_iter()
            .map(|line| JsValue::from_str(&line))
            .collect()
    }
}
