//! Seeded multi-object tracking over video.
//!
//! The first frame's objects come from a ground-truth seed list; every later
//! frame advances one single-object tracker per seeded identity. Each frame is
//! annotated with boxes, identity labels and a caption before it is written.
//!
//! The OpenCV trackers and video I/O live in [`video`] behind the `opencv`
//! feature. Everything else runs against the traits in [`tracker`],
//! [`annotate`] and [`pipeline`]. The `playertrack` binary needs
//! `--features opencv`.

pub mod annotate;
pub mod config;
pub mod error;
pub mod event_log;
pub mod fps;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod pool;
pub mod tracker;

#[cfg(feature = "opencv")]
pub mod video;

pub use annotate::{AnnotationStyle, Annotator, Bgr, Canvas, Stroke, TextStyle};
pub use config::{Args, OutputSettings};
pub use error::{Error, Result};
pub use event_log::JsonLogger;
pub use fps::FpsMeter;
pub use input::{check_video_extension, load_seed_file};
pub use model::{BoundingBox, SeedEntry, TrackedObject};
pub use pipeline::{
    CancelSignal, Clock, FrameSink, FrameSource, NeverCancel, RunState, RunSummary,
    SystemClock, TrackingPipeline,
};
pub use pool::{PoolUpdate, TrackerPool, UpdatePolicy};
pub use tracker::{SingleObjectTracker, TrackerFactory, TrackerKind};
