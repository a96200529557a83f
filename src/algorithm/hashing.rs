use std::hash::{Hash, Hasher};

use image::{ImageBuffer, Pixel};
use xxhash_rust::{xxh3::Xxh3, xxh64::Xxh64};

/// Cheap content hash of an element. Equal elements always have equal
/// fingerprints; equal fingerprints only suggest that elements are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

pub trait ContentHasher<T> {
    fn fingerprint(&self, element: &T) -> Fingerprint;
}

impl<T, H: ContentHasher<T> + ?Sized> ContentHasher<T> for &H {
    fn fingerprint(&self, element: &T) -> Fingerprint {
        (**self).fingerprint(element)
    }
}

/// Hashes anything with a `Hash` implementation (symbols, interned lines, integers).
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolHasher;

impl<T: Hash> ContentHasher<T> for SymbolHasher {
    fn fingerprint(&self, element: &T) -> Fingerprint {
        let mut hasher = Xxh3::new();
        element.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}

/// Hashes the dimensions and an evenly strided sample of pixels, so the cost
/// does not grow with the resolution.
#[derive(Debug, Clone, Copy)]
pub struct SampledFrameHasher {
    samples: usize,
}

impl SampledFrameHasher {
    pub const DEFAULT_SAMPLES: usize = 1024;

    pub fn new(samples: usize) -> SampledFrameHasher {
        SampledFrameHasher {
            samples: samples.max(1),
        }
    }
}

impl Default for SampledFrameHasher {
    fn default() -> Self {
        SampledFrameHasher::new(SampledFrameHasher::DEFAULT_SAMPLES)
    }
}

impl<P: Pixel<Subpixel = u8>> ContentHasher<ImageBuffer<P, Vec<u8>>> for SampledFrameHasher {
    fn fingerprint(&self, frame: &ImageBuffer<P, Vec<u8>>) -> Fingerprint {
        let mut hasher = Xxh64::new(0);
        hasher.update(&frame.width().to_le_bytes());
        hasher.update(&frame.height().to_le_bytes());
        let channels = P::CHANNEL_COUNT as usize;
        let raw: &[u8] = frame.as_raw();
        let pixel_count = raw.len() / channels;
        let stride = (pixel_count / self.samples).max(1);
        for pixel in (0..pixel_count).step_by(stride).take(self.samples) {
            hasher.update(&raw[pixel * channels..(pixel + 1) * channels]);
        }
        Fingerprint(hasher.digest())
    }
}

/// Hashes every byte of the frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullFrameHasher;

impl<P: Pixel<Subpixel = u8>> ContentHasher<ImageBuffer<P, Vec<u8>>> for FullFrameHasher {
    fn fingerprint(&self, frame: &ImageBuffer<P, Vec<u8>>) -> Fingerprint {
        let mut hasher = Xxh3::new();
        hasher.update(&frame.width().to_le_bytes());
        hasher.update(&frame.height().to_le_bytes());
        hasher.update(frame.as_raw());
        Fingerprint(hasher.digest())
    }
}
