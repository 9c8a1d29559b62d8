//! Single-object tracker capability consumed by the tracker pool.

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;
use crate::model::BoundingBox;

/// Visual tracker algorithm, fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackerKind {
    /// Discriminative correlation filter with channel and spatial reliability
    Csrt,
    /// Kernelized correlation filter, faster than CSRT
    #[default]
    Kcf,
}

impl TrackerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TrackerKind::Csrt => "CSRT",
            TrackerKind::Kcf => "KCF",
        }
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One visual tracker following one object.
///
/// `step` returns `Ok(None)` when the tracker lost its target; `Err` is
/// reserved for backend failures.
pub trait SingleObjectTracker<F> {
    fn init(&mut self, frame: &F, bbox: BoundingBox) -> Result<()>;

    fn step(&mut self, frame: &F) -> Result<Option<BoundingBox>>;
}

/// Creates trackers of the requested kind for frames of type `F`.
pub trait TrackerFactory<F> {
    type Tracker: SingleObjectTracker<F>;

    fn create(&self, kind: TrackerKind) -> Result<Self::Tracker>;
}
