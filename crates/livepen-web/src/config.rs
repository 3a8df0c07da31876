#![forbid(unsafe_code)]

//! Session configuration.
//!
//! Every section defaults to the shipped playground, so `{}` is a complete
//! configuration:
//!
//! ```json
//! {
//!   "placeholders": { "style_href": "style.css", "script_src": "script.js" },
//!   "layout": { "orientation": { "stacked_max_width": 768 } },
//!   "keyboard": { "reveal_delay_ms": 100 },
//!   "sources": { "markup": "<!DOCTYPE html>..." }
//! }
//! ```
//!
//! # Failure Modes
//!
//! [`PlaygroundConfig::from_json`] rejects malformed JSON and unknown fields.
//! [`PlaygroundConfig::validate`] rejects values the session cannot honor.

use core::time::Duration;

use livepen_compose::{
    ComposeError, PlaceholderConfig, SHIPPED_MARKUP, SHIPPED_SCRIPT, SHIPPED_STYLE, SourceKind,
    SourceSet,
};
use livepen_layout::{LayoutConfig, LayoutConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delay between focusing the keyboard proxy and focusing the editor.
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 100;

/// Longest accepted reveal delay.
pub const MAX_REVEAL_DELAY_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Layout(#[from] LayoutConfigError),
    #[error(transparent)]
    Placeholder(#[from] ComposeError),
    #[error("keyboard reveal delay {ms} ms is outside 1..=10000")]
    RevealDelay { ms: u64 },
}

/// Touch keyboard reveal tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyboardConfig {
    pub reveal_delay_ms: u64,
}

impl KeyboardConfig {
    #[must_use]
    pub const fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
        }
    }
}

/// Initial buffer contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceTexts {
    pub markup: String,
    pub style: String,
    pub script: String,
}

impl SourceTexts {
    #[must_use]
    pub fn to_source_set(&self) -> SourceSet {
        SourceSet::new(
            self.markup.as_str(),
            self.style.as_str(),
            self.script.as_str(),
        )
    }
}

impl Default for SourceTexts {
    fn default() -> Self {
        Self {
            markup: SHIPPED_MARKUP.to_owned(),
            style: SHIPPED_STYLE.to_owned(),
            script: SHIPPED_SCRIPT.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundConfig {
    pub placeholders: PlaceholderConfig,
    pub layout: LayoutConfig,
    pub keyboard: KeyboardConfig,
    pub sources: SourceTexts,
}

impl PlaygroundConfig {
    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        for (kind, file) in [
            (SourceKind::Style, &self.placeholders.style_href),
            (SourceKind::Script, &self.placeholders.script_src),
        ] {
            if file.is_empty() {
                return Err(ComposeError::EmptyFilename { kind }.into());
            }
        }
        let ms = self.keyboard.reveal_delay_ms;
        if ms == 0 || ms > MAX_REVEAL_DELAY_MS {
            return Err(ConfigError::RevealDelay { ms });
        }
        Ok(())
    }
}
