/// A detector-reported face: axis-aligned box in pixel coordinates of the
/// decoded image plus the detection confidence in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

/// Integer pixel bounds guaranteed to lie inside an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Build from `[x1, y1, x2, y2]` corners.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1, confidence)
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection over union; used by the detector's NMS.
    pub fn iou(&self, other: &FaceRegion) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }

    /// Square region centered on this one with side `max(width, height) * scale`.
    ///
    /// Not clamped; callers clamp when they cut pixels.
    pub fn square_around(&self, scale: f64) -> FaceRegion {
        let side = self.width.max(self.height) * scale;
        let cx = self.x + self.width / 2.0;
        let cy = self.y + self.height / 2.0;
        FaceRegion::new(cx - side / 2.0, cy - side / 2.0, side, side, self.confidence)
    }

    /// Clamp to an image of `image_width` × `image_height`, rounding outward.
    ///
    /// A region entirely outside the image yields zero width or height.
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> PixelBounds {
        let x1 = self.x.floor().clamp(0.0, image_width as f64) as u32;
        let y1 = self.y.floor().clamp(0.0, image_height as f64) as u32;
        let x2 = (self.x + self.width).ceil().clamp(0.0, image_width as f64) as u32;
        let y2 = (self.y + self.height).ceil().clamp(0.0, image_height as f64) as u32;
        PixelBounds {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    }
}
