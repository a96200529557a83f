use image::{GrayImage, ImageBuffer, Pixel};

use super::{DistanceMetric, TScore, PERFECT_SCORE};

/// Binary region of interest over frames of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    selected: Vec<bool>,
    selected_count: usize,
}

impl Mask {
    /// Grayscale mask pixels at or above this luma are part of the region.
    pub const THRESHOLD: u8 = 128;

    pub fn from_image(image: &GrayImage) -> Mask {
        Mask::from_fn(image.width(), image.height(), |x, y| {
            image.get_pixel(x, y)[0] >= Mask::THRESHOLD
        })
    }

    pub fn from_fn(width: u32, height: u32, is_selected: impl Fn(u32, u32) -> bool) -> Mask {
        let mut selected = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                selected.push(is_selected(x, y));
            }
        }
        let selected_count = selected.iter().filter(|&&s| s).count();
        Mask {
            width,
            height,
            selected,
            selected_count,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn selected_count(&self) -> usize {
        self.selected_count
    }

    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.selected[(y * self.width + x) as usize]
    }
}

/// Counts pixels that differ between two frames of the same resolution.
#[derive(Debug, Clone)]
pub struct PixelCountMetric {
    normalize: bool,
    mask: Option<Mask>,
}

impl PixelCountMetric {
    pub fn new(normalize: bool) -> PixelCountMetric {
        PixelCountMetric { normalize, mask: None }
    }

    pub fn with_mask(mut self, mask: Option<Mask>) -> PixelCountMetric {
        self.mask = mask;
        self
    }
}

impl Default for PixelCountMetric {
    fn default() -> Self {
        PixelCountMetric::new(true)
    }
}

impl<P: Pixel + PartialEq> DistanceMetric<ImageBuffer<P, Vec<P::Subpixel>>> for PixelCountMetric {
    fn score(&self, a: &ImageBuffer<P, Vec<P::Subpixel>>, b: &ImageBuffer<P, Vec<P::Subpixel>>) -> TScore {
        debug_assert_eq!(a.dimensions(), b.dimensions());
        let pixels = a.pixels().zip(b.pixels());
        let (differing, compared) = match &self.mask {
            None => (pixels.filter(|(p, q)| p != q).count(), a.pixels().len()),
            Some(mask) => {
                debug_assert_eq!(mask.dimensions(), a.dimensions());
                let differing = pixels
                    .zip(&mask.selected)
                    .filter(|&((p, q), &selected)| selected && p != q)
                    .count();
                (differing, mask.selected_count)
            }
        };
        if compared == 0 || differing == 0 {
            return PERFECT_SCORE;
        }
        if self.normalize {
            -(differing as TScore / compared as TScore)
        } else {
            -(differing as TScore)
        }
    }
}
