/// Axis-aligned image-space bounding box of a detected instance.
///
/// Stored in TLWH form (top-left x, top-left y, width, height). Degenerate
/// boxes with non-positive extent have zero area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// The overlapping region of two boxes, or `None` if they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 > x1 && y2 > y1 {
            Some(Rect::from_tlbr(x1, y1, x2, y2))
        } else {
            None
        }
    }

    /// Intersection area divided by the area of the smaller box.
    ///
    /// A box fully contained in the other scores 1.0, disjoint boxes 0.0.
    pub fn overlap_ratio(&self, other: &Rect) -> f32 {
        let min_area = self.area().min(other.area());
        if min_area <= 0.0 {
            return 0.0;
        }
        self.intersection(other)
            .map(|inter| (inter.area() / min_area).min(1.0))
            .unwrap_or(0.0)
    }
}
