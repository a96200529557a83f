use image::{ImageFormat, RgbImage};
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};
use thiserror::Error;

use crate::algorithm::scoring::Mask;

pub type LineInterner = StringInterner<DefaultBackend>;

#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("frame {index} of the {side} sequence is {}x{}, expected {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    DimensionMismatch {
        side: &'static str,
        index: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("mask is {}x{}, but the frames are {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    MaskDimensionMismatch { expected: (u32, u32), actual: (u32, u32) },
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("cannot read directory {path:?}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode image {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

/// Paths of all files in `dir` with an extension the `image` crate can decode
/// in this build, sorted by file name.
pub fn list_frame_files(dir: &Path) -> Result<Vec<PathBuf>, FrameError> {
    let read_dir_error = |source| FrameError::ReadDir {
        path: dir.to_owned(),
        source,
    };
    let mut paths = vec![];
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        if path.is_file() && ImageFormat::from_path(&path).map_or(false, |format| format.reading_enabled()) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn decode(path: &Path) -> Result<image::DynamicImage, FrameError> {
    image::open(path).map_err(|source| FrameError::Decode {
        path: path.to_owned(),
        source,
    })
}

pub fn load_frames(dir: &Path) -> Result<Vec<RgbImage>, FrameError> {
    let paths = list_frame_files(dir)?;
    let frames = paths
        .par_iter()
        .map(|path| decode(path).map(|image| image.to_rgb8()))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Loaded {} frames from {}", frames.len(), dir.display());
    Ok(frames)
}

pub fn load_mask(path: &Path) -> Result<Mask, FrameError> {
    let mask = Mask::from_image(&decode(path)?.to_luma8());
    debug!(
        "Mask {} selects {} of {} pixels",
        path.display(),
        mask.selected_count(),
        mask.dimensions().0 as usize * mask.dimensions().1 as usize
    );
    Ok(mask)
}

/// All frames of both sequences, and the mask if any, must have one resolution.
/// The first frame found fixes it.
pub fn check_preconditions(a: &[RgbImage], b: &[RgbImage], mask: Option<&Mask>) -> Result<(), PreconditionError> {
    let Some(expected) = a.iter().chain(b).next().map(RgbImage::dimensions) else {
        return Ok(());
    };
    for (side, frames) in [("first", a), ("second", b)] {
        for (index, frame) in frames.iter().enumerate() {
            let actual = frame.dimensions();
            if actual != expected {
                return Err(PreconditionError::DimensionMismatch {
                    side,
                    index,
                    expected,
                    actual,
                });
            }
        }
    }
    if let Some(mask) = mask {
        let actual = mask.dimensions();
        if actual != expected {
            return Err(PreconditionError::MaskDimensionMismatch { expected, actual });
        }
    }
    Ok(())
}

/// Interns the lines of both texts in one interner, so equal lines get equal symbols.
pub fn intern_lines(texts: [&str; 2]) -> (LineInterner, [Vec<DefaultSymbol>; 2]) {
    let mut interner = LineInterner::new();
    let symbols = texts.map(|text| text.lines().map(|line| interner.get_or_intern(line)).collect());
    (interner, symbols)
}
