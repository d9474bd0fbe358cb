//! Line-oriented runner.
//!
//! Reads newline-delimited JSON events, answers each with one JSON line,
//! and skips anything malformed. Output order always matches input order.
//!
//! # Edge Cases Handled
//!
//! - Last line without `\n` is still processed.
//! - Blank lines are skipped.
//! - Lines over the size limit are drained and skipped without buffering
//!   them whole.
//! - Invalid UTF-8 or JSON is skipped.

pub mod protocol;

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::advisor::{PhoenixAdvisor, ResiliencePlugin};
use crate::config::loader::env_or;
use crate::error::RunnerError;
use crate::observability::events::{Event, EventEmitter, RunSummary, StopReason};
use crate::observability::metrics;

pub use protocol::{InputEvent, Response, SkipReason, parse_event, parse_line};

/// Default maximum input line size in bytes.
pub const DEFAULT_MAX_LINE_SIZE: usize = 1024 * 1024;

/// Environment variable overriding [`DEFAULT_MAX_LINE_SIZE`].
pub const MAX_LINE_SIZE_ENV: &str = "PHOENIX_MAX_LINE_SIZE";

/// Runner limits.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Maximum input line size in bytes, excluding the newline.
    pub max_line_size: usize,
}

impl RunnerConfig {
    /// Loads limits from the environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PHOENIX_MAX_LINE_SIZE` | 1 MiB |
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_line_size: env_or(MAX_LINE_SIZE_ENV, DEFAULT_MAX_LINE_SIZE),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_line_size: DEFAULT_MAX_LINE_SIZE,
        }
    }
}

/// Outcome of reading one line.
enum LineRead {
    Line(Vec<u8>),
    Oversized,
    Eof,
}

/// Drives the line protocol over any async reader/writer pair.
#[derive(Debug)]
pub struct Runner {
    advisor: PhoenixAdvisor,
    emitter: Arc<EventEmitter>,
    config: RunnerConfig,
    cancel: CancellationToken,
}

impl Runner {
    /// Creates a runner.
    #[must_use]
    pub const fn new(
        advisor: PhoenixAdvisor,
        emitter: Arc<EventEmitter>,
        config: RunnerConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            advisor,
            emitter,
            config,
            cancel,
        }
    }

    /// Processes `reader` line by line until EOF or cancellation.
    ///
    /// Cancellation is checked between lines; a line that has started
    /// processing is always answered and flushed.
    ///
    /// # Errors
    ///
    /// Returns a [`RunnerError`] only when reading from `reader` or
    /// writing to `writer` fails.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<RunSummary, RunnerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = RunSummary::default();
        let result = self.run_inner(&mut reader, &mut writer, &mut summary).await;

        let reason = match &result {
            Ok(reason) => *reason,
            Err(e) => {
                tracing::error!(error = %e, "runner stopped on I/O error");
                StopReason::Error
            }
        };
        tracing::info!(
            ?reason,
            lines = summary.lines_read,
            readings = summary.readings,
            incidents = summary.incidents,
            skipped = summary.skipped,
            "runner stopped"
        );
        self.emitter.emit(Event::RunnerStopped {
            timestamp: Utc::now(),
            reason,
            summary,
        });

        result.map(|_| summary)
    }

    async fn run_inner<R, W>(
        &self,
        reader: &mut R,
        writer: &mut W,
        summary: &mut RunSummary,
    ) -> Result<StopReason, RunnerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let read = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Ok(StopReason::Cancelled),
                read = read_bounded_line(reader, self.config.max_line_size) => {
                    read.map_err(RunnerError::Read)?
                }
            };

            let parsed = match read {
                LineRead::Eof => return Ok(StopReason::EndOfInput),
                LineRead::Oversized => {
                    summary.lines_read += 1;
                    Err(SkipReason::TooLong)
                }
                LineRead::Line(bytes) => {
                    summary.lines_read += 1;
                    std::str::from_utf8(&bytes)
                        .map_err(|_| SkipReason::InvalidUtf8)
                        .and_then(parse_line)
                }
            };

            let response = match parsed {
                Ok(event) => self.handle(event, summary),
                Err(reason) => {
                    self.skip(reason, summary);
                    continue;
                }
            };

            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await.map_err(RunnerError::Write)?;
            writer.flush().await.map_err(RunnerError::Write)?;
        }
    }

    /// Answers one parsed event and records it.
    pub fn handle(&self, event: InputEvent, summary: &mut RunSummary) -> Response {
        match event {
            InputEvent::Reading { phase, reading } => {
                summary.readings += 1;
                metrics::record_reading(phase.as_raw());

                let (next_phase, transition) = self.advisor.advise(phase, reading);
                if let Some(t) = transition {
                    summary.transitions += 1;
                    tracing::info!(
                        from = %t.from,
                        to = %t.to,
                        rule = t.rule.name(),
                        reason = %t.rule.reason(self.advisor.config(), reading),
                        "phase transition"
                    );
                    metrics::record_phase_transition(t.from, t.to);
                    self.emitter.emit(Event::PhaseTransitioned {
                        timestamp: Utc::now(),
                        from: t.from.to_string(),
                        to: t.to.to_string(),
                        rule: t.rule.name().to_string(),
                        psi: reading.psi,
                        pe: reading.pe,
                    });
                } else {
                    tracing::debug!(phase = %next_phase, psi = reading.psi, pe = reading.pe, "phase unchanged");
                }
                Response::NextPhase { next_phase }
            }
            InputEvent::Incident(incident) => {
                summary.incidents += 1;
                let mitigation = self.advisor.on_incident(&incident);
                tracing::info!(
                    threat = incident.threat.as_deref().unwrap_or("<none>"),
                    realm = %incident.realm,
                    kind = mitigation.kind(),
                    "mitigation recommended"
                );
                metrics::record_mitigation(mitigation.kind());
                self.emitter.emit(Event::MitigationRecommended {
                    timestamp: Utc::now(),
                    threat: incident.threat.clone(),
                    kind: mitigation.kind().to_string(),
                    realm: mitigation.realm().map(str::to_string),
                });
                Response::Mitigation(mitigation)
            }
        }
    }

    fn skip(&self, reason: SkipReason, summary: &mut RunSummary) {
        if reason == SkipReason::Blank {
            return;
        }
        summary.skipped += 1;
        tracing::debug!(line = summary.lines_read, %reason, "skipping malformed event");
        metrics::record_skipped(reason.as_str());
        self.emitter.emit(Event::EventSkipped {
            timestamp: Utc::now(),
            line_number: summary.lines_read,
            reason: reason.as_str().to_string(),
        });
    }
}

/// Reads one line of at most `limit` bytes.
///
/// Bytes past the limit are consumed but not kept, so an unterminated
/// flood cannot exhaust memory.
async fn read_bounded_line<R>(reader: &mut R, limit: usize) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf: Vec<u8> = Vec::new();
    let mut overflowed = false;
    let mut saw_any = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }
        saw_any = true;

        let (chunk, consumed, done) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (&available[..pos], pos + 1, true),
            None => (available, available.len(), false),
        };

        if !overflowed {
            let remaining = limit.saturating_sub(buf.len());
            if chunk.len() > remaining {
                overflowed = true;
                buf.clear();
            } else {
                buf.extend_from_slice(chunk);
            }
        }

        reader.consume(consumed);
        if done {
            break;
        }
    }

    if !saw_any {
        return Ok(LineRead::Eof);
    }
    if overflowed {
        return Ok(LineRead::Oversized);
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(LineRead::Line(buf))
}
