#![forbid(unsafe_code)]

//! Browser runner for the livepen playground.
//!
//! This crate provides [`PlaygroundRunner`], a `wasm-bindgen`-exported struct
//! that wraps a `livepen_web::PlaygroundSession` and mirrors it into the page:
//! the preview iframe document, pane sizes, container classes, the body
//! cursor, the toggle label, tab visibility, pointer capture and keyboard
//! focus.
//!
//! The session logic lives in a platform-independent runner core so native
//! tests exercise exactly what the browser build runs.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::PlaygroundRunner;

// Runner core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod runner_core;
