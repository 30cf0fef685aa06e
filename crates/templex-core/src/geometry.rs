//! Rectangles and detected document frames.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its top-left corner and size.
///
/// Decoding regions use relative coordinates in `[0, 1]`; OCR trees use
/// pixel coordinates of the dewarped region image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole unit square.
    pub const fn unit() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Check that the rectangle is non-empty and lies within the unit square.
    pub fn is_relative(&self) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());

        finite
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.right() <= 1.0 + f32::EPSILON
            && self.bottom() <= 1.0 + f32::EPSILON
    }

    /// Map a relative rectangle into `outer` (both in the same units as `outer`).
    pub fn relative_to(&self, outer: &Rect) -> Rect {
        Rect {
            x: outer.x + self.x * outer.width,
            y: outer.y + self.y * outer.height,
            width: self.width * outer.width,
            height: self.height * outer.height,
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Detected document outline in pixel coordinates of the input image.
///
/// Corners are stored clockwise from the top-left corner as
/// `(x1, y1, x2, y2, x3, y3, x4, y4)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentFrame {
    pub corners: [f32; 8],
}

impl DocumentFrame {
    /// Frame covering a whole image of the given size.
    pub fn full(width: u32, height: u32) -> Self {
        Self::from_rect(Rect::new(0.0, 0.0, width as f32, height as f32))
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            corners: [
                rect.x,
                rect.y,
                rect.right(),
                rect.y,
                rect.right(),
                rect.bottom(),
                rect.x,
                rect.bottom(),
            ],
        }
    }

    /// Axis-aligned bounding rectangle of the quadrilateral.
    pub fn bounding_rect(&self) -> Rect {
        let xs = [self.corners[0], self.corners[2], self.corners[4], self.corners[6]];
        let ys = [self.corners[1], self.corners[3], self.corners[5], self.corners[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_bounds() {
        assert!(Rect::new(0.247, 0.056, 0.459, 0.148).is_relative());
        assert!(Rect::unit().is_relative());
        assert!(!Rect::new(0.8, 0.0, 0.3, 0.5).is_relative());
        assert!(!Rect::new(-0.1, 0.0, 0.3, 0.5).is_relative());
        assert!(!Rect::new(0.1, 0.1, 0.0, 0.5).is_relative());
        assert!(!Rect::new(f32::NAN, 0.1, 0.2, 0.5).is_relative());
    }

    #[test]
    fn test_relative_to() {
        let outer = Rect::new(100.0, 50.0, 850.0, 540.0);
        let inner = Rect::new(0.5, 0.5, 0.5, 0.25).relative_to(&outer);
        assert_eq!(inner, Rect::new(525.0, 320.0, 425.0, 135.0));
    }

    #[test]
    fn test_frame_bounding_rect() {
        let frame = DocumentFrame {
            corners: [10.0, 12.0, 110.0, 10.0, 112.0, 70.0, 8.0, 72.0],
        };
        assert_eq!(frame.bounding_rect(), Rect::new(8.0, 10.0, 104.0, 62.0));
        assert_eq!(
            DocumentFrame::full(85, 54).bounding_rect(),
            Rect::new(0.0, 0.0, 85.0, 54.0)
        );
    }
}
