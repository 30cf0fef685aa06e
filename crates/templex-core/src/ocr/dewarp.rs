//! Cutting decoding regions out of a detected document.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::input::DocumentImage;
use crate::template::DecodingRegion;

/// Produces the upright, fixed-height image of a region for OCR.
pub trait Dewarper: Send + Sync {
    fn dewarp(
        &self,
        document: &DocumentImage,
        region: &DecodingRegion,
    ) -> Result<DynamicImage, OcrError>;
}

/// Resampling filter used when scaling regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Dewarper for documents that are already upright.
///
/// Crops the region out of the frame's bounding box and scales it to the
/// region's dewarp height, keeping the aspect ratio. Perspective distortion
/// is not corrected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CropDewarper {
    filter: ResizeFilter,
}

impl CropDewarper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Width that keeps the aspect ratio of `width`x`height` at `target_height`.
    fn target_width(width: u32, height: u32, target_height: u32) -> u32 {
        let scale = target_height as f32 / height.max(1) as f32;
        ((width as f32 * scale).round() as u32).max(1)
    }
}

impl Dewarper for CropDewarper {
    fn dewarp(
        &self,
        document: &DocumentImage,
        region: &DecodingRegion,
    ) -> Result<DynamicImage, OcrError> {
        let (image_width, image_height) = document.image.dimensions();
        let area = region.position.relative_to(&document.frame.bounding_rect());

        let min_x = area.x.max(0.0).round() as u32;
        let min_y = area.y.max(0.0).round() as u32;
        let max_x = area.right().min(image_width as f32).max(0.0).round() as u32;
        let max_y = area.bottom().min(image_height as f32).max(0.0).round() as u32;

        if max_x <= min_x || max_y <= min_y {
            return Err(OcrError::Dewarp(format!(
                "region {} lies outside the {}x{} image",
                region.name, image_width, image_height
            )));
        }

        let width = max_x - min_x;
        let height = max_y - min_y;
        let cropped = document.image.crop_imm(min_x, min_y, width, height);

        let target_height = region.dewarp_height;
        let target_width = Self::target_width(width, height, target_height);

        Ok(cropped.resize_exact(target_width, target_height, self.filter.into()))
    }
}
