//! Overlay of tracked boxes, identity labels and a frame caption.

use crate::error::Result;
use crate::model::TrackedObject;
use crate::tracker::TrackerKind;

/// Colour in OpenCV channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bgr(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Bgr,
    pub thickness: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Bgr,
    pub scale: f64,
    pub thickness: i32,
}

/// Drawing surface the annotator renders onto.
pub trait Canvas {
    fn draw_rectangle(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        stroke: Stroke,
    ) -> Result<()>;

    /// Draws `text` with its baseline starting at `origin`.
    fn draw_text(&mut self, text: &str, origin: (i32, i32), style: TextStyle) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStyle {
    pub box_stroke: Stroke,
    pub label: TextStyle,
    /// Pixels between the label baseline and the top edge of its box
    pub label_offset: i32,
    pub ground_truth_caption: TextStyle,
    pub tracking_caption: TextStyle,
    pub caption_origin: (i32, i32),
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        let red = Bgr(0, 0, 255);
        Self {
            box_stroke: Stroke {
                color: Bgr(225, 0, 0),
                thickness: 3,
            },
            label: TextStyle {
                color: red,
                scale: 0.7,
                thickness: 2,
            },
            label_offset: 10,
            ground_truth_caption: TextStyle {
                color: red,
                scale: 0.7,
                thickness: 2,
            },
            tracking_caption: TextStyle {
                color: Bgr(0, 225, 0),
                scale: 0.7,
                thickness: 2,
            },
            caption_origin: (75, 75),
        }
    }
}

pub struct Annotator {
    kind: TrackerKind,
    style: AnnotationStyle,
}

impl Annotator {
    pub fn new(kind: TrackerKind) -> Self {
        Self {
            kind,
            style: AnnotationStyle::default(),
        }
    }

    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }

    pub fn caption(&self, is_seed_frame: bool) -> String {
        if is_seed_frame {
            "Ground truth".to_string()
        } else {
            format!("Tracking players:{}", self.kind)
        }
    }

    pub fn label(object: &TrackedObject) -> String {
        format!("Player id:{}", object.identity)
    }

    /// Draws every object's box and label plus one frame caption.
    ///
    /// `objects` is only read; the frame is returned for chaining.
    pub fn render<'a, C: Canvas>(
        &self,
        frame: &'a mut C,
        objects: &[TrackedObject],
        is_seed_frame: bool,
    ) -> Result<&'a mut C> {
        for object in objects {
            let (top_left, bottom_right) = object.bbox.pixel_corners();
            frame.draw_rectangle(top_left, bottom_right, self.style.box_stroke)?;
            let origin = (
                top_left.0,
                top_left.1.saturating_sub(self.style.label_offset),
            );
            frame.draw_text(&Self::label(object), origin, self.style.label)?;
        }

        let caption_style = if is_seed_frame {
            self.style.ground_truth_caption
        } else {
            self.style.tracking_caption
        };
        frame.draw_text(
            &self.caption(is_seed_frame),
            self.style.caption_origin,
            caption_style,
        )?;
        Ok(frame)
    }
}
