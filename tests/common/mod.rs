#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use playertrack::{
    BoundingBox, Canvas, Clock, Error, FrameSink, FrameSource, Result, SingleObjectTracker,
    Stroke, TextStyle, TrackerFactory, TrackerKind,
};

/// What the annotator drew on a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect((i32, i32), (i32, i32)),
    Text(String, (i32, i32)),
}

/// Frame stand-in that records draw calls.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFrame {
    pub index: usize,
    pub ops: Vec<DrawOp>,
}

impl SyntheticFrame {
    pub fn rects(&self) -> Vec<((i32, i32), (i32, i32))> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect(a, b) => Some((*a, *b)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(text, _) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter(|t| t.starts_with("Player id:"))
            .collect()
    }

    pub fn captions(&self) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter(|t| !t.starts_with("Player id:"))
            .collect()
    }
}

impl Canvas for SyntheticFrame {
    fn draw_rectangle(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        _stroke: Stroke,
    ) -> Result<()> {
        self.ops.push(DrawOp::Rect(top_left, bottom_right));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: (i32, i32), _style: TextStyle) -> Result<()> {
        self.ops.push(DrawOp::Text(text.to_string(), origin));
        Ok(())
    }
}

/// Tracker that keeps reporting its seed box, or replays a script first.
pub struct StubTracker {
    bbox: BoundingBox,
    script: VecDeque<Option<BoundingBox>>,
}

impl SingleObjectTracker<SyntheticFrame> for StubTracker {
    fn init(&mut self, _frame: &SyntheticFrame, bbox: BoundingBox) -> Result<()> {
        self.bbox = bbox;
        Ok(())
    }

    fn step(&mut self, _frame: &SyntheticFrame) -> Result<Option<BoundingBox>> {
        match self.script.pop_front() {
            Some(Some(bbox)) => {
                self.bbox = bbox;
                Ok(Some(bbox))
            }
            Some(None) => Ok(None),
            None => Ok(Some(self.bbox)),
        }
    }
}

#[derive(Default)]
pub struct StubFactory {
    scripts: RefCell<VecDeque<Vec<Option<BoundingBox>>>>,
    pub created: RefCell<Vec<TrackerKind>>,
    pub fail_at: Option<usize>,
}

impl StubFactory {
    /// Tracker `i` replays `scripts[i]` before holding its last box.
    pub fn scripted(scripts: Vec<Vec<Option<BoundingBox>>>) -> Self {
        Self {
            scripts: RefCell::new(scripts.into()),
            ..Self::default()
        }
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }
}

impl TrackerFactory<SyntheticFrame> for StubFactory {
    type Tracker = StubTracker;

    fn create(&self, kind: TrackerKind) -> Result<StubTracker> {
        let index = self.created.borrow().len();
        if self.fail_at == Some(index) {
            return Err(Error::backend("tracker unavailable"));
        }
        self.created.borrow_mut().push(kind);
        let script = self.scripts.borrow_mut().pop_front().unwrap_or_default();
        Ok(StubTracker {
            bbox: BoundingBox::default(),
            script: script.into(),
        })
    }
}

/// In-memory source of blank frames.
pub struct VecSource {
    remaining: usize,
    next_index: usize,
    pub reads: usize,
    pub released: bool,
}

impl VecSource {
    pub fn new(frames: usize) -> Self {
        Self {
            remaining: frames,
            next_index: 0,
            reads: 0,
            released: false,
        }
    }
}

impl FrameSource for VecSource {
    type Frame = SyntheticFrame;

    fn read(&mut self) -> Result<Option<SyntheticFrame>> {
        self.reads += 1;
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let frame = SyntheticFrame {
            index: self.next_index,
            ops: Vec::new(),
        };
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct VecSink {
    pub frames: Vec<SyntheticFrame>,
    pub released: bool,
}

impl FrameSink<SyntheticFrame> for VecSink {
    fn write(&mut self, frame: SyntheticFrame) -> Result<()> {
        self.frames.push(frame);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}

/// Clock that advances a fixed step on every reading.
pub struct ManualClock {
    now: Instant,
    step: Duration,
}

impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Instant::now(),
            step,
        }
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Instant {
        let now = self.now;
        self.now += self.step;
        now
    }
}

/// Writer whose bytes stay readable after being boxed away.
#[derive(Clone, Default)]
pub struct SharedBuf(pub Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.borrow();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json line"))
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Collects formatted `tracing` output for assertions.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish()
    }

    pub fn warnings(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains("WARN"))
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn player(id: serde_json::Value, coordinates: [f64; 4]) -> playertrack::SeedEntry {
    playertrack::SeedEntry::new("player", id, coordinates)
}
