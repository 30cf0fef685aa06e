//! Raw frame buffers handed over by the capture layer and the detected document image.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::geometry::DocumentFrame;

/// Pixel layout of a raw frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 4 bytes per pixel, blue first.
    Bgra,
    /// 3 bytes per pixel, blue first.
    Bgr,
    /// 1 byte per pixel.
    Gray8,
    /// Full resolution luma plane followed by interleaved half resolution VU.
    Nv21,
}

impl PixelFormat {
    /// Bytes per pixel of the first plane.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Bgra => 4,
            PixelFormat::Bgr => 3,
            PixelFormat::Gray8 | PixelFormat::Nv21 => 1,
        }
    }
}

/// Borrowed raw frame with explicit row stride.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    /// Bytes per row of the first plane.
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> RawImage<'a> {
    pub fn new(format: PixelFormat, width: u32, height: u32, stride: usize, data: &'a [u8]) -> Self {
        Self {
            format,
            width,
            height,
            stride,
            data,
        }
    }

    fn validate(&self) -> Result<(), OcrError> {
        if self.width == 0 || self.height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "empty image {}x{}",
                self.width, self.height
            )));
        }

        let row_bytes = self.width as usize * self.format.bytes_per_pixel();
        if self.stride < row_bytes {
            return Err(OcrError::InvalidImage(format!(
                "stride {} smaller than row size {}",
                self.stride, row_bytes
            )));
        }

        let plane = self.stride * (self.height as usize - 1) + row_bytes;
        let required = match self.format {
            // Chroma plane is half height, same stride.
            PixelFormat::Nv21 => plane + self.stride * (self.height as usize).div_ceil(2),
            _ => plane,
        };
        if self.data.len() < required {
            return Err(OcrError::InvalidImage(format!(
                "buffer holds {} bytes, {} required",
                self.data.len(),
                required
            )));
        }

        Ok(())
    }

    fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * self.format.bytes_per_pixel()]
    }

    /// Convert into an owned image. NV21 frames keep only their luma plane.
    pub fn to_dynamic(&self) -> Result<DynamicImage, OcrError> {
        self.validate()?;

        let image = match self.format {
            PixelFormat::Bgra => {
                let mut out = RgbaImage::new(self.width, self.height);
                for y in 0..self.height {
                    for (x, px) in self.row(y).chunks_exact(4).enumerate() {
                        out.put_pixel(x as u32, y, image::Rgba([px[2], px[1], px[0], px[3]]));
                    }
                }
                DynamicImage::ImageRgba8(out)
            }
            PixelFormat::Bgr => {
                let mut out = RgbImage::new(self.width, self.height);
                for y in 0..self.height {
                    for (x, px) in self.row(y).chunks_exact(3).enumerate() {
                        out.put_pixel(x as u32, y, image::Rgb([px[2], px[1], px[0]]));
                    }
                }
                DynamicImage::ImageRgb8(out)
            }
            PixelFormat::Gray8 | PixelFormat::Nv21 => {
                let mut out = GrayImage::new(self.width, self.height);
                for y in 0..self.height {
                    for (x, value) in self.row(y).iter().enumerate() {
                        out.put_pixel(x as u32, y, image::Luma([*value]));
                    }
                }
                DynamicImage::ImageLuma8(out)
            }
        };

        Ok(image)
    }
}

/// Input image together with the frame of the detected document.
#[derive(Debug, Clone)]
pub struct DocumentImage {
    pub image: DynamicImage,
    pub frame: DocumentFrame,
}

impl DocumentImage {
    pub fn new(image: DynamicImage, frame: DocumentFrame) -> Self {
        Self { image, frame }
    }

    /// Treat the whole image as the document.
    pub fn whole(image: DynamicImage) -> Self {
        let frame = DocumentFrame::full(image.width(), image.height());
        Self { image, frame }
    }

    /// Blank grayscale canvas, used when OCR output is replayed from a recording.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::whole(DynamicImage::new_luma8(width.max(1), height.max(1)))
    }

    pub fn from_raw(raw: &RawImage<'_>, frame: DocumentFrame) -> Result<Self, OcrError> {
        Ok(Self::new(raw.to_dynamic()?, frame))
    }
}
