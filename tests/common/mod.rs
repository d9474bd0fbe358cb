//! Shared integration-test harness for spawning `phoenix-resilience` as a
//! child process and talking to it over the NDJSON line protocol.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// Default timeout for reading a single response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const BIN: &str = env!("CARGO_BIN_EXE_phoenix-resilience");

/// A running `phoenix-resilience run` process.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
#[allow(clippy::missing_panics_doc)]
pub struct PhoenixProcess {
    child: Child,
    stdin: Option<tokio::process::ChildStdin>,
    reader: BufReader<tokio::process::ChildStdout>,
}

impl PhoenixProcess {
    /// Spawns `run` with the given configuration file.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(config_path: &std::path::Path) -> Self {
        Self::spawn_run(&[
            "--config",
            config_path.to_str().expect("non-UTF-8 config path"),
        ])
    }

    /// Spawns `run` with extra arguments.
    pub fn spawn_run(extra: &[&str]) -> Self {
        Self::spawn_run_with_env(extra, &[])
    }

    /// Spawns `run` with extra arguments and environment variables.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_run_with_env(extra: &[&str], envs: &[(&str, &str)]) -> Self {
        let mut child = Command::new(BIN)
            .arg("--quiet")
            .arg("run")
            .args(extra)
            .env_remove("PHOENIX_CONFIG")
            .envs(envs.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn phoenix-resilience");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        Self {
            child,
            stdin: Some(stdin),
            reader: BufReader::new(stdout),
        }
    }

    /// Writes one raw line (a newline is appended).
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_line(&mut self, line: &str) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("failed to write to stdin");
        stdin.flush().await.expect("failed to flush stdin");
    }

    /// Sends one JSON event and returns the response line.
    pub async fn request(&mut self, event: &Value) -> Value {
        self.send_line(&event.to_string()).await;
        self.read_message(DEFAULT_TIMEOUT).await
    }

    /// Reads one response from stdout.
    ///
    /// Panics on EOF, I/O error, or if nothing arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_message(&mut self, timeout: Duration) -> Value {
        let mut line = String::new();
        let n = tokio::time::timeout(timeout, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for response")
            .expect("read_line I/O error");
        assert!(n > 0, "unexpected EOF from runner");
        serde_json::from_str(line.trim())
            .unwrap_or_else(|e| panic!("invalid JSON from runner: {e}\nline: {line}"))
    }

    /// Closes stdin and reads every remaining response until EOF.
    #[allow(clippy::missing_panics_doc)]
    pub async fn finish(mut self) -> (Vec<Value>, ExitStatus) {
        drop(self.stdin.take());

        let mut responses = Vec::new();
        let mut lines = self.reader.lines();
        while let Some(line) = tokio::time::timeout(DEFAULT_TIMEOUT, lines.next_line())
            .await
            .expect("timed out draining stdout")
            .expect("read error")
        {
            responses.push(serde_json::from_str(&line).expect("invalid JSON from runner"));
        }

        let status = tokio::time::timeout(DEFAULT_TIMEOUT, self.child.wait())
            .await
            .expect("runner did not exit after EOF")
            .expect("wait failed");
        (responses, status)
    }

    /// Runs a one-shot command to completion.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        std::process::Command::new(BIN)
            .args(args)
            .env_remove("PHOENIX_CONFIG")
            .env_remove("PHOENIX_LOG_LEVEL")
            .output()
            .expect("failed to run phoenix-resilience")
    }

    /// Returns the path to a test fixture.
    #[must_use]
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}
