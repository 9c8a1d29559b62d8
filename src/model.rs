use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel units: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_coordinates(coordinates: [f64; 4]) -> Self {
        let [x, y, width, height] = coordinates;
        Self::new(x, y, width, height)
    }

    pub fn to_coordinates(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Integer drawing corners `(x, y)` and `(x + w, y + h)`.
    ///
    /// Every component is truncated toward zero before the addition, so a
    /// sub-pixel tracker output never rounds up into the next pixel. Corners
    /// past `i32::MAX` clamp there.
    pub fn pixel_corners(&self) -> ((i32, i32), (i32, i32)) {
        let x = self.x as i32;
        let y = self.y as i32;
        let w = self.width as i32;
        let h = self.height as i32;
        ((x, y), (x.saturating_add(w), y.saturating_add(h)))
    }

    pub fn is_finite(&self) -> bool {
        self.to_coordinates().iter().all(|v| v.is_finite())
    }

    pub fn is_non_negative(&self) -> bool {
        self.to_coordinates().iter().all(|v| *v >= 0.0)
    }
}

/// One ground-truth record from the seed file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedEntry {
    pub object: String,
    /// Kept for diagnostics only. Output identities are positional.
    #[serde(default)]
    pub id: serde_json::Value,
    pub coordinates: [f64; 4],
}

impl SeedEntry {
    pub fn new(object: impl Into<String>, id: serde_json::Value, coordinates: [f64; 4]) -> Self {
        Self {
            object: object.into(),
            id,
            coordinates,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_coordinates(self.coordinates)
    }
}

/// Current state of one tracked identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedObject {
    pub identity: usize,
    pub label: String,
    #[serde(flatten)]
    pub bbox: BoundingBox,
}

impl TrackedObject {
    pub fn new(identity: usize, label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            identity,
            label: label.into(),
            bbox,
        }
    }

    /// Same identity and label, new box.
    pub fn with_bbox(&self, bbox: BoundingBox) -> Self {
        Self {
            identity: self.identity,
            label: self.label.clone(),
            bbox,
        }
    }
}
