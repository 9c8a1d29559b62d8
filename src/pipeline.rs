//! Frame loop: seed on the first frame, track on the rest, annotate and write.

use std::io::Write;
use std::time::{Duration, Instant};

use crate::annotate::{Annotator, Canvas};
use crate::error::{Error, Result};
use crate::event_log::{timestamp_now, FrameLog, JsonLogger, SummaryLog};
use crate::fps::FpsMeter;
use crate::model::{SeedEntry, TrackedObject};
use crate::pool::{TrackerPool, UpdatePolicy};
use crate::tracker::{TrackerFactory, TrackerKind};

/// Sequential frame reader. `Ok(None)` means end of stream.
pub trait FrameSource {
    type Frame;

    fn read(&mut self) -> Result<Option<Self::Frame>>;

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Receives one annotated frame per loop iteration.
pub trait FrameSink<F> {
    fn write(&mut self, frame: F) -> Result<()>;

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Non-blocking stop request, polled once per frame.
pub trait CancelSignal {
    fn is_cancelled(&mut self) -> bool;
}

impl<G: FnMut() -> bool> CancelSignal for G {
    fn is_cancelled(&mut self) -> bool {
        self()
    }
}

/// Runs until the source is exhausted.
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

/// Time source for frame-rate measurement.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Tracking,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    /// Frames where at least one tracker lost its target
    pub degraded_frames: u64,
    pub mean_fps: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

#[derive(Default)]
struct LoopCounters {
    frames: u64,
    degraded_frames: u64,
    cancelled: bool,
}

/// Drives a tracker pool over a frame source, once.
pub struct TrackingPipeline<F, K: TrackerFactory<F>> {
    pool: TrackerPool<F, K>,
    annotator: Annotator,
    seeds: Vec<SeedEntry>,
    fps: FpsMeter,
    state: RunState,
    clock: Box<dyn Clock>,
    event_log: Option<JsonLogger<Box<dyn Write>>>,
}

impl<F: Canvas, K: TrackerFactory<F>> TrackingPipeline<F, K> {
    pub fn new(factory: K, kind: TrackerKind, seeds: Vec<SeedEntry>) -> Self {
        Self {
            pool: TrackerPool::new(factory, kind),
            annotator: Annotator::new(kind),
            seeds,
            fps: FpsMeter::new(),
            state: RunState::Init,
            clock: Box::new(SystemClock),
            event_log: None,
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.pool = self.pool.with_policy(policy);
        self
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_event_log<W: Write + 'static>(mut self, logger: JsonLogger<W>) -> Self {
        let writer: Box<dyn Write> = Box::new(logger.into_inner());
        self.event_log = Some(JsonLogger::from_writer(writer));
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn pool(&self) -> &TrackerPool<F, K> {
        &self.pool
    }

    pub fn fps(&self) -> &FpsMeter {
        &self.fps
    }

    /// Runs the whole stream. Source and sink are released on every exit path.
    pub fn run<S, O, C>(
        &mut self,
        source: &mut S,
        sink: &mut O,
        cancel: &mut C,
    ) -> Result<RunSummary>
    where
        S: FrameSource<Frame = F>,
        O: FrameSink<F>,
        C: CancelSignal,
    {
        if self.state != RunState::Init {
            return Err(Error::AlreadyRun);
        }

        let started = self.clock.now();
        let outcome = self.drive(source, sink, cancel);
        self.state = RunState::Done;

        let source_released = source.release();
        let sink_released = sink.release();

        let counters = outcome?;
        source_released?;
        sink_released?;

        let summary = RunSummary {
            frames: counters.frames,
            degraded_frames: counters.degraded_frames,
            mean_fps: self.fps.summary(),
            cancelled: counters.cancelled,
            elapsed: self.clock.now().saturating_duration_since(started),
        };

        if let Some(log) = self.event_log.as_mut() {
            log.write_event(&SummaryLog {
                event: "summary",
                timestamp: timestamp_now(),
                frames: summary.frames,
                degraded_frames: summary.degraded_frames,
                mean_fps: summary.mean_fps,
                cancelled: summary.cancelled,
                elapsed_seconds: summary.elapsed.as_secs_f64(),
            })?;
            log.flush()?;
        }
        Ok(summary)
    }

    fn drive<S, O, C>(
        &mut self,
        source: &mut S,
        sink: &mut O,
        cancel: &mut C,
    ) -> Result<LoopCounters>
    where
        S: FrameSource<Frame = F>,
        O: FrameSink<F>,
        C: CancelSignal,
    {
        let mut counters = LoopCounters::default();

        loop {
            let Some(mut frame) = source.read()? else {
                tracing::info!("Video finished after {} frames", counters.frames);
                break;
            };

            let is_seed_frame = self.state == RunState::Init;
            let (objects, degraded): (Vec<TrackedObject>, bool) = if is_seed_frame {
                self.pool.seed(&frame, &self.seeds)?;
                tracing::info!(
                    "Initialized {} {} trackers from ground truth",
                    self.pool.len(),
                    self.pool.kind()
                );
                (self.pool.objects().to_vec(), false)
            } else {
                let update = self.pool.advance(&frame)?;
                let degraded = update.is_degraded();
                (update.objects, degraded)
            };

            self.annotator.render(&mut frame, &objects, is_seed_frame)?;
            sink.write(frame)?;
            let fps = self.fps.tick(self.clock.now());

            if is_seed_frame {
                self.state = RunState::Tracking;
            }
            if degraded {
                counters.degraded_frames += 1;
            }

            if let Some(log) = self.event_log.as_mut() {
                log.write_event(&FrameLog {
                    event: "frame",
                    timestamp: timestamp_now(),
                    frame_index: counters.frames,
                    ground_truth: is_seed_frame,
                    fps,
                    degraded,
                    objects: &objects,
                })?;
            }
            counters.frames += 1;

            if cancel.is_cancelled() {
                tracing::info!("Cancelled after {} frames", counters.frames);
                counters.cancelled = true;
                break;
            }
        }

        Ok(counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{Stroke, TextStyle};
    use crate::model::BoundingBox;
    use crate::tracker::SingleObjectTracker;

    #[derive(Default)]
    struct Blank {
        texts: Vec<String>,
    }

    impl Canvas for Blank {
        fn draw_rectangle(&mut self, _: (i32, i32), _: (i32, i32), _: Stroke) -> Result<()> {
            Ok(())
        }

        fn draw_text(&mut self, text: &str, _: (i32, i32), _: TextStyle) -> Result<()> {
            self.texts.push(text.to_string());
            Ok(())
        }
    }

    struct Still(BoundingBox);

    impl SingleObjectTracker<Blank> for Still {
        fn init(&mut self, _frame: &Blank, bbox: BoundingBox) -> Result<()> {
            self.0 = bbox;
            Ok(())
        }

        fn step(&mut self, _frame: &Blank) -> Result<Option<BoundingBox>> {
            Ok(Some(self.0))
        }
    }

    struct StillFactory;

    impl TrackerFactory<Blank> for StillFactory {
        type Tracker = Still;

        fn create(&self, _kind: TrackerKind) -> Result<Still> {
            Ok(Still(BoundingBox::default()))
        }
    }

    struct Frames(usize);

    impl FrameSource for Frames {
        type Frame = Blank;

        fn read(&mut self) -> Result<Option<Blank>> {
            if self.0 == 0 {
                return Ok(None);
            }
            self.0 -= 1;
            Ok(Some(Blank::default()))
        }
    }

    #[derive(Default)]
    struct Collect(Vec<Blank>);

    impl FrameSink<Blank> for Collect {
        fn write(&mut self, frame: Blank) -> Result<()> {
            self.0.push(frame);
            Ok(())
        }
    }

    fn seeds() -> Vec<SeedEntry> {
        vec![SeedEntry::new(
            "player",
            serde_json::json!("A"),
            [10.0, 10.0, 20.0, 20.0],
        )]
    }

    #[test]
    fn test_state_transitions() {
        let mut pipeline: TrackingPipeline<Blank, _> =
            TrackingPipeline::new(StillFactory, TrackerKind::Kcf, seeds());
        assert_eq!(pipeline.state(), RunState::Init);

        let summary = pipeline
            .run(&mut Frames(2), &mut Collect::default(), &mut NeverCancel)
            .unwrap();
        assert_eq!(pipeline.state(), RunState::Done);
        assert_eq!(summary.frames, 2);
        assert!(!summary.cancelled);

        let again = pipeline.run(&mut Frames(1), &mut Collect::default(), &mut NeverCancel);
        assert!(matches!(again, Err(Error::AlreadyRun)));
    }

    #[test]
    fn test_empty_source() {
        let mut pipeline: TrackingPipeline<Blank, _> =
            TrackingPipeline::new(StillFactory, TrackerKind::Kcf, seeds());
        let mut sink = Collect::default();
        let summary = pipeline
            .run(&mut Frames(0), &mut sink, &mut NeverCancel)
            .unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.mean_fps, 0);
        assert!(sink.0.is_empty());
        assert!(!pipeline.pool().is_seeded());
    }

    #[test]
    fn test_closure_cancel() {
        let mut pipeline: TrackingPipeline<Blank, _> =
            TrackingPipeline::new(StillFactory, TrackerKind::Csrt, seeds());
        let mut sink = Collect::default();
        let mut polls = 0;
        let mut cancel = || {
            polls += 1;
            polls >= 2
        };
        let summary = pipeline.run(&mut Frames(10), &mut sink, &mut cancel).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.frames, 2);
        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[1].texts.last().unwrap(), "Tracking players:CSRT");
    }
}
