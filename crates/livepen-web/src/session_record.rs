#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] wraps a [`PlaygroundSession`], records every host event
//! it applies, and takes a frame checkpoint after each one. [`replay`] feeds
//! the recorded events through a fresh session and verifies that every
//! checkpoint matches.
//!
//! # Trace shape
//!
//! - **Header**: schema version, session configuration, initial viewport.
//! - **Event**: a timestamped [`HostEvent`].
//! - **Frame**: FNV-1a checksum of the composed document plus the layout
//!   snapshot, chained with every previous frame.
//! - **Summary**: total frames and final checksum chain.
//!
//! Traces serialize to JSON lines, one record per line.
//!
//! # Determinism contract
//!
//! Given identical recorded events and the same build, replay **must**
//! produce identical frame checksums. Time only advances through recorded
//! `tick` events, so delayed keyboard reveals fire at the same frame.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Viewport;
use crate::config::{ConfigError, PlaygroundConfig};
use crate::input_parser::HostEvent;
use crate::session::PlaygroundSession;

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "livepen-trace-v1";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_u64(hash: u64, v: u64) -> u64 {
    fnv1a64_bytes(hash, &v.to_le_bytes())
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = FNV_OFFSET_BASIS;
    let hash = fnv1a64_u64(hash, prev);
    fnv1a64_u64(hash, next)
}

/// Checksum of everything a page shows: preview document and layout.
///
/// The layout snapshot is hashed through its JSON form; field order is fixed
/// by the type, so the bytes are stable within a build.
#[must_use]
pub fn checksum_session(session: &PlaygroundSession) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    let document = session.preview().last_document().unwrap_or_default();
    hash = fnv1a64_u64(hash, document.len() as u64);
    hash = fnv1a64_bytes(hash, document.as_bytes());
    let layout = serde_json::to_vec(&session.layout_surface().snapshot()).unwrap_or_default();
    fnv1a64_bytes(hash, &layout)
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema: String,
        config: PlaygroundConfig,
        viewport: Viewport,
    },
    /// A host event at a specific session time.
    Event { ts_ms: u64, event: HostEvent },
    /// Frame checkpoint with checksum.
    Frame {
        frame_idx: u64,
        ts_ms: u64,
        checksum: u64,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_frames: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of frame checkpoints in the trace.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Frame { .. }))
            .count() as u64
    }

    /// Extract the final checksum chain from the summary record.
    #[must_use]
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// One JSON object per line, newline terminated.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse JSON lines. Blank lines are skipped.
    pub fn from_jsonl(text: &str) -> Result<Self, ReplayError> {
        let records = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|source| ReplayError::Json {
                    line: idx + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }
}

/// Records a playground session for deterministic replay.
#[derive(Debug)]
pub struct SessionRecorder {
    session: PlaygroundSession,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    frames: u64,
}

impl SessionRecorder {
    /// Build a session, initialize it with `viewport`, and record the first
    /// frame checkpoint.
    pub fn new(config: PlaygroundConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        let mut session = PlaygroundSession::new(config.clone())?;
        session.init(viewport);
        let mut recorder = Self {
            session,
            records: vec![TraceRecord::Header {
                schema: SCHEMA_VERSION.to_owned(),
                config,
                viewport,
            }],
            checksum_chain: 0,
            frames: 0,
        };
        recorder.record_frame();
        Ok(recorder)
    }

    /// Apply and record one host event, then checkpoint.
    pub fn apply(&mut self, event: HostEvent) {
        self.session.apply(&event);
        self.records.push(TraceRecord::Event {
            ts_ms: millis(self.session.now()),
            event,
        });
        self.record_frame();
    }

    /// Access the recorded session.
    #[must_use]
    pub fn session(&self) -> &PlaygroundSession {
        &self.session
    }

    /// Mutably access the recorded session (for draining host output).
    pub fn session_mut(&mut self) -> &mut PlaygroundSession {
        &mut self.session
    }

    /// Finish recording and return the completed trace.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_frames: self.frames,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    fn record_frame(&mut self) {
        let checksum = checksum_session(&self.session);
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Frame {
            frame_idx: self.frames,
            ts_ms: millis(self.session.now()),
            checksum,
            checksum_chain: chain,
        });
        self.checksum_chain = chain;
        self.frames += 1;
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Total frames replayed.
    pub total_frames: u64,
    /// Final checksum chain from replay.
    pub final_checksum_chain: u64,
    /// First frame where a checksum mismatch was detected, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether the replay produced identical checksums.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }

    /// Turn a mismatch into an error.
    pub fn verified(self) -> Result<Self, ReplayError> {
        match self.first_mismatch {
            Some(mismatch) => Err(ReplayError::ChecksumMismatch(mismatch)),
            None => Ok(self),
        }
    }
}

/// Description of a checksum mismatch during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayMismatch {
    /// Frame index where the mismatch occurred.
    pub frame_idx: u64,
    /// Expected checksum from the trace.
    pub expected: u64,
    /// Actual checksum from replay.
    pub actual: u64,
}

/// Errors that can occur during replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("trace missing header record")]
    MissingHeader,
    #[error("unsupported trace schema: {0}")]
    Schema(String),
    #[error("trace line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("trace configuration rejected: {0}")]
    Config(#[from] ConfigError),
    #[error(
        "frame {} checksum mismatch: expected {:#018x}, got {:#018x}",
        .0.frame_idx,
        .0.expected,
        .0.actual
    )]
    ChecksumMismatch(ReplayMismatch),
}

/// Replay a recorded session trace through a fresh session.
///
/// Event records are applied in order; each frame record is compared against
/// the session state at that point.
pub fn replay(trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let (schema, config, viewport) = trace
        .records
        .first()
        .and_then(|r| match r {
            TraceRecord::Header {
                schema,
                config,
                viewport,
            } => Some((schema, config, *viewport)),
            _ => None,
        })
        .ok_or(ReplayError::MissingHeader)?;
    if schema != SCHEMA_VERSION {
        return Err(ReplayError::Schema(schema.clone()));
    }

    let mut session = PlaygroundSession::new(config.clone())?;
    session.init(viewport);

    let mut frames: u64 = 0;
    let mut checksum_chain: u64 = 0;
    let mut first_mismatch: Option<ReplayMismatch> = None;

    for record in &trace.records {
        match record {
            TraceRecord::Event { event, .. } => session.apply(event),
            TraceRecord::Frame {
                frame_idx,
                checksum: expected,
                ..
            } => {
                let actual = checksum_session(&session);
                checksum_chain = fnv1a64_pair(checksum_chain, actual);
                if actual != *expected && first_mismatch.is_none() {
                    first_mismatch = Some(ReplayMismatch {
                        frame_idx: *frame_idx,
                        expected: *expected,
                        actual,
                    });
                }
                frames += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_frames: frames,
        final_checksum_chain: checksum_chain,
        first_mismatch,
    })
}
