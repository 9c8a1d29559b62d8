//! JSON-lines event log: session header, one record per frame, run summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::model::TrackedObject;
use crate::pool::UpdatePolicy;
use crate::tracker::TrackerKind;

#[derive(Serialize)]
pub struct SessionLog {
    pub event: &'static str,
    pub timestamp: String,
    pub input: String,
    pub seed_file: String,
    pub tracker: TrackerKind,
    pub update_policy: UpdatePolicy,
    pub output: String,
    pub objects: usize,
}

#[derive(Serialize)]
pub struct FrameLog<'a> {
    pub event: &'static str,
    pub timestamp: String,
    pub frame_index: u64,
    pub ground_truth: bool,
    pub fps: Option<f64>,
    pub degraded: bool,
    pub objects: &'a [TrackedObject],
}

#[derive(Serialize)]
pub struct SummaryLog {
    pub event: &'static str,
    pub timestamp: String,
    pub frames: u64,
    pub degraded_frames: u64,
    pub mean_fps: u64,
    pub cancelled: bool,
    pub elapsed_seconds: f64,
}

pub struct JsonLogger<W: Write = BufWriter<File>> {
    writer: W,
}

impl JsonLogger {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl<W: Write> JsonLogger<W> {
    pub fn from_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}
