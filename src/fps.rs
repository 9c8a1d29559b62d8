use std::time::Instant;

/// Loop frame-rate meter.
///
/// The first tick only records the baseline, so there is no outlier sample
/// measured against an unset previous timestamp.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    previous: Option<Instant>,
    samples: Vec<f64>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame boundary at `now` and returns the instantaneous rate.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        let previous = self.previous.replace(now)?;
        let delta = now.saturating_duration_since(previous).as_secs_f64();
        if delta <= 0.0 {
            tracing::debug!("Zero frame interval, skipping fps sample");
            return None;
        }
        let fps = 1.0 / delta;
        self.samples.push(fps);
        Some(fps)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Rounded mean of all samples, 0 before the second tick.
    pub fn summary(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        mean.round() as u64
    }
}
