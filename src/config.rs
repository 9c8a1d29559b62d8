//! Command line configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};
use crate::pool::UpdatePolicy;
use crate::tracker::TrackerKind;

/// Output frame rate used when the source does not report one.
pub const FALLBACK_FPS: f64 = 24.0;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "playertrack",
    about = "Track seeded players through a video and write an annotated copy"
)]
pub struct Args {
    /// Input video (.mkv, .avi, .mp4 or .mov)
    #[arg(short, long, value_name = "PATH", default_value = "Inputs/input.mkv")]
    pub input: PathBuf,

    /// Ground-truth boxes for the first frame
    #[arg(
        short = 'j',
        long,
        value_name = "PATH",
        default_value = "Inputs/initial_conditions.json"
    )]
    pub json_file: PathBuf,

    #[arg(short, long, value_enum, default_value_t = TrackerKind::Kcf)]
    pub tracker: TrackerKind,

    /// How a lost tracker affects the frame output
    #[arg(long, value_enum, default_value_t = UpdatePolicy::Grouped)]
    pub update_policy: UpdatePolicy,

    #[arg(long, value_name = "DIR", default_value = "Output")]
    pub output_dir: PathBuf,

    /// Four-character codec code for the output video
    #[arg(long, default_value = "DIVX")]
    pub fourcc: String,

    /// Output frame rate (defaults to the input's own rate)
    #[arg(long)]
    pub output_fps: Option<f64>,

    /// Output width in pixels (defaults to the input width)
    #[arg(long, requires = "output_height")]
    pub output_width: Option<u32>,

    /// Output height in pixels (defaults to the input height)
    #[arg(long, requires = "output_width")]
    pub output_height: Option<u32>,

    /// No preview window; the run only stops at end of stream
    #[arg(long)]
    pub headless: bool,

    /// Write a JSON-lines event log with per-frame object boxes
    #[arg(long, value_name = "PATH")]
    pub log_json: Option<PathBuf>,
}

/// Encoder settings resolved against the opened input.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub path: PathBuf,
    pub fourcc: [char; 4],
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        self.fourcc_chars()?;
        if let Some(fps) = self.output_fps {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(Error::Config(format!(
                    "output fps must be positive, got {}",
                    fps
                )));
            }
        }
        if self.output_width == Some(0) || self.output_height == Some(0) {
            return Err(Error::Config("output size must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn fourcc_chars(&self) -> Result<[char; 4]> {
        let chars: Vec<char> = self.fourcc.chars().collect();
        match chars.as_slice() {
            [a, b, c, d] if chars.iter().all(|ch| ch.is_ascii()) => Ok([*a, *b, *c, *d]),
            _ => Err(Error::Config(format!(
                "fourcc must be four ASCII characters, got {:?}",
                self.fourcc
            ))),
        }
    }

    /// `<output_dir>/output_<TRACKER>.mkv`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("output_{}.mkv", self.tracker.name()))
    }

    /// Fills unset rate and size from the input stream.
    pub fn resolve_output(
        &self,
        source_fps: Option<f64>,
        source_size: (u32, u32),
    ) -> Result<OutputSettings> {
        let fps = self
            .output_fps
            .or(source_fps.filter(|fps| fps.is_finite() && *fps > 0.0))
            .unwrap_or(FALLBACK_FPS);
        let (width, height) = match (self.output_width, self.output_height) {
            (Some(width), Some(height)) => (width, height),
            _ => source_size,
        };
        Ok(OutputSettings {
            path: self.output_path(),
            fourcc: self.fourcc_chars()?,
            fps,
            width,
            height,
        })
    }
}
