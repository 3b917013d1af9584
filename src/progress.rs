//! Run progress reporting.
//!
//! Reports observable progress during `dxi run` so users see how far the
//! enrichment stage has come. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;
use std::path::PathBuf;

/// A single progress event for a run.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// Reading and decoding the input collection.
    Loading { path: PathBuf },
    /// n records enriched out of total.
    Enriching { n: u64, total: u64 },
    /// Staged artifacts are being moved into place.
    Publishing { artifacts: usize },
}

/// Reports run progress. Called from rayon workers, hence `Send + Sync`.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "run  enriching  1,234 / 5,000 diseases".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Loading { path } => format!("run  loading {}\n", path.display()),
            ProgressEvent::Enriching { n, total } => format!(
                "run  enriching  {} / {} diseases\n",
                format_number(*n),
                format_number(*total)
            ),
            ProgressEvent::Publishing { artifacts } => {
                format!("run  publishing {} artifacts\n", artifacts)
            }
        };
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Loading { path } => serde_json::json!({
                "event": "progress",
                "phase": "loading",
                "path": path.display().to_string()
            }),
            ProgressEvent::Enriching { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "enriching",
                "n": n,
                "total": total
            }),
            ProgressEvent::Publishing { artifacts } => serde_json::json!({
                "event": "progress",
                "phase": "publishing",
                "artifacts": artifacts
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// How often `Enriching` is reported: roughly every percent, never less than once per record.
pub fn report_step(total: u64) -> u64 {
    (total / 100).max(1)
}

pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
