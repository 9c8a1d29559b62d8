//! OpenCV backend: CSRT/KCF trackers, file capture, encoder and preview.

use std::path::Path;

use opencv::{
    core::{Mat, Point, Ptr, Rect, Scalar, Size},
    highgui, imgproc,
    prelude::*,
    tracking::{TrackerCSRT, TrackerCSRT_Params, TrackerKCF, TrackerKCF_Params},
    videoio::{self, VideoCapture, VideoWriter},
};

use crate::annotate::{Bgr, Canvas, Stroke, TextStyle};
use crate::config::OutputSettings;
use crate::error::{Error, Result};
use crate::input::check_video_extension;
use crate::model::BoundingBox;
use crate::pipeline::{CancelSignal, FrameSink, FrameSource};
use crate::tracker::{SingleObjectTracker, TrackerFactory, TrackerKind};

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::backend(format!("Path is not valid UTF-8: {}", path.display())))
}

fn to_rect(bbox: BoundingBox) -> Rect {
    let ((x, y), (x2, y2)) = bbox.pixel_corners();
    Rect::new(x, y, x2.saturating_sub(x), y2.saturating_sub(y))
}

fn to_scalar(color: Bgr) -> Scalar {
    Scalar::new(color.0 as f64, color.1 as f64, color.2 as f64, 0.0)
}

/// OpenCV tracker of either supported kind.
pub enum OpencvTracker {
    Csrt(Ptr<TrackerCSRT>),
    Kcf(Ptr<TrackerKCF>),
}

impl SingleObjectTracker<Mat> for OpencvTracker {
    fn init(&mut self, frame: &Mat, bbox: BoundingBox) -> Result<()> {
        let rect = to_rect(bbox);
        match self {
            OpencvTracker::Csrt(tracker) => tracker.init(frame, rect)?,
            OpencvTracker::Kcf(tracker) => tracker.init(frame, rect)?,
        }
        Ok(())
    }

    fn step(&mut self, frame: &Mat) -> Result<Option<BoundingBox>> {
        let mut rect = Rect::default();
        let found = match self {
            OpencvTracker::Csrt(tracker) => tracker.update(frame, &mut rect)?,
            OpencvTracker::Kcf(tracker) => tracker.update(frame, &mut rect)?,
        };
        Ok(found.then(|| {
            BoundingBox::new(
                rect.x as f64,
                rect.y as f64,
                rect.width as f64,
                rect.height as f64,
            )
        }))
    }
}

/// Creates OpenCV trackers with default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpencvTrackerFactory;

impl TrackerFactory<Mat> for OpencvTrackerFactory {
    type Tracker = OpencvTracker;

    fn create(&self, kind: TrackerKind) -> Result<OpencvTracker> {
        let tracker = match kind {
            TrackerKind::Csrt => {
                let params = TrackerCSRT_Params::default()?;
                OpencvTracker::Csrt(TrackerCSRT::create(&params)?)
            }
            TrackerKind::Kcf => {
                let params = TrackerKCF_Params::default()?;
                OpencvTracker::Kcf(TrackerKCF::create(params)?)
            }
        };
        Ok(tracker)
    }
}

impl Canvas for Mat {
    fn draw_rectangle(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        stroke: Stroke,
    ) -> Result<()> {
        imgproc::rectangle_points(
            self,
            Point::new(top_left.0, top_left.1),
            Point::new(bottom_right.0, bottom_right.1),
            to_scalar(stroke.color),
            stroke.thickness,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: (i32, i32), style: TextStyle) -> Result<()> {
        imgproc::put_text(
            self,
            text,
            Point::new(origin.0, origin.1),
            imgproc::FONT_HERSHEY_SIMPLEX,
            style.scale,
            to_scalar(style.color),
            style.thickness,
            imgproc::LINE_8,
            false,
        )?;
        Ok(())
    }
}

/// Decoded frames from a video file.
pub struct VideoSource {
    capture: VideoCapture,
    fps: Option<f64>,
    frame_size: (u32, u32),
}

impl VideoSource {
    /// Opens `path` after checking its container extension.
    pub fn open(path: &Path) -> Result<Self> {
        check_video_extension(path)?;
        let capture = VideoCapture::from_file(path_str(path)?, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::backend(format!(
                "Failed to open input source: {}",
                path.display()
            )));
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)?;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?;
        Ok(Self {
            capture,
            fps: (fps.is_finite() && fps > 0.0).then_some(fps),
            frame_size: (width.max(0.0) as u32, height.max(0.0) as u32),
        })
    }

    /// Native frame rate, if the container reports one.
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }
}

impl FrameSource for VideoSource {
    type Frame = Mat;

    fn read(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn release(&mut self) -> Result<()> {
        self.capture.release()?;
        Ok(())
    }
}

/// Encodes annotated frames, optionally mirroring them to a preview window.
pub struct VideoSink {
    writer: VideoWriter,
    frame_size: Size,
    preview: Option<String>,
}

impl VideoSink {
    pub fn create(settings: &OutputSettings) -> Result<Self> {
        let [a, b, c, d] = settings.fourcc;
        let fourcc = VideoWriter::fourcc(a, b, c, d)?;
        let frame_size = Size::new(settings.width as i32, settings.height as i32);
        let writer = VideoWriter::new(
            path_str(&settings.path)?,
            fourcc,
            settings.fps,
            frame_size,
            true,
        )?;
        if !writer.is_opened()? {
            return Err(Error::backend(format!(
                "Failed to open video writer: {}",
                settings.path.display()
            )));
        }
        Ok(Self {
            writer,
            frame_size,
            preview: None,
        })
    }

    /// Shows every written frame in a window named `window`.
    pub fn enable_preview(&mut self, window: &str) -> Result<()> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
        self.preview = Some(window.to_string());
        Ok(())
    }
}

impl FrameSink<Mat> for VideoSink {
    fn write(&mut self, frame: Mat) -> Result<()> {
        // The encoder drops frames whose size differs from the one it was opened with
        let frame = if frame.size()? != self.frame_size {
            let mut resized = Mat::default();
            imgproc::resize(
                &frame,
                &mut resized,
                self.frame_size,
                0.0,
                0.0,
                imgproc::INTER_LINEAR,
            )?;
            resized
        } else {
            frame
        };

        if let Some(window) = &self.preview {
            highgui::imshow(window, &frame)?;
        }
        self.writer.write(&frame)?;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.writer.release()?;
        if let Some(window) = self.preview.take() {
            highgui::destroy_window(&window)?;
        }
        Ok(())
    }
}

/// Stops the run on `q` or Esc in the preview window.
pub struct KeyCancel;

impl CancelSignal for KeyCancel {
    fn is_cancelled(&mut self) -> bool {
        match highgui::wait_key(1) {
            Ok(key) => key == 27 || key == 113,
            Err(err) => {
                tracing::warn!("Key poll failed: {}", err);
                false
            }
        }
    }
}
