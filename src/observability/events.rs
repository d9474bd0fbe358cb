//! Structured event stream.
//!
//! Discrete, typed events emitted while the runner processes input.
//! Events are written as newline-delimited JSON (JSONL) with a
//! monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// Why the runner stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Input reached EOF.
    EndOfInput,
    /// A shutdown signal arrived.
    Cancelled,
    /// The runner failed on its own I/O.
    Error,
}

/// Counters reported when the runner stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Input lines consumed, including skipped ones.
    pub lines_read: u64,
    /// Readings answered with a `next_phase`.
    pub readings: u64,
    /// Incidents answered with a mitigation.
    pub incidents: u64,
    /// Readings that changed the phase.
    pub transitions: u64,
    /// Lines skipped as malformed.
    pub skipped: u64,
}

/// A discrete event emitted during a run.
///
/// Tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The runner is ready to read input.
    RunnerStarted {
        /// When the runner started.
        timestamp: DateTime<Utc>,
        /// Configuration file in use, if one was loaded.
        config_path: Option<String>,
        /// Whether phase transitions are enabled.
        enabled: bool,
    },

    /// A reading moved the phase.
    PhaseTransitioned {
        /// When the decision was made.
        timestamp: DateTime<Utc>,
        /// Phase before.
        from: String,
        /// Phase after.
        to: String,
        /// Rule that fired.
        rule: String,
        /// Coherence of the reading.
        psi: f64,
        /// Pressure of the reading.
        pe: f64,
    },

    /// An incident produced a recommendation.
    MitigationRecommended {
        /// When the decision was made.
        timestamp: DateTime<Utc>,
        /// Threat label as received.
        threat: Option<String>,
        /// Mitigation kind.
        kind: String,
        /// Target realm, absent for `none`.
        realm: Option<String>,
    },

    /// An input line was skipped.
    EventSkipped {
        /// When the line was skipped.
        timestamp: DateTime<Utc>,
        /// One-based input line number.
        line_number: u64,
        /// Why it was skipped.
        reason: String,
    },

    /// The runner stopped.
    RunnerStopped {
        /// When the runner stopped.
        timestamp: DateTime<Utc>,
        /// Stop reason.
        reason: StopReason,
        /// Final counters.
        summary: RunSummary,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped: observability must never
/// stop the runner.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
