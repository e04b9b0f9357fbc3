//! Color histogram descriptors
//!
//! Both extractors quantize 8-bit channel values with integer floor division,
//! `bin = bins * value / 256`, and normalize counts by the pixel count so that
//! descriptors of differently sized images stay comparable.

use std::fmt;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, GrayImage};
use serde::{Deserialize, Serialize};

use crate::error::{CbirError, Result};
use crate::vector::Descriptor;

/// Which histogram to extract, with its bin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistogramMethod {
    /// Gray-level histogram with `bins` buckets.
    Gray { bins: usize },
    /// Joint RGB histogram, flattened with `(r * g_bins + g) * b_bins + b`.
    Rgb {
        r_bins: usize,
        g_bins: usize,
        b_bins: usize,
    },
}

impl HistogramMethod {
    /// Method name as used in descriptor file names.
    pub fn name(&self) -> &'static str {
        match self {
            HistogramMethod::Gray { .. } => "HIST_GREY",
            HistogramMethod::Rgb { .. } => "HIST_RGB",
        }
    }

    /// Bin configuration label: `N` for gray, `RxGxB` for rgb.
    pub fn bins_label(&self) -> String {
        match self {
            HistogramMethod::Gray { bins } => bins.to_string(),
            HistogramMethod::Rgb {
                r_bins,
                g_bins,
                b_bins,
            } => format!("{}x{}x{}", r_bins, g_bins, b_bins),
        }
    }

    /// Length of the descriptors this method produces.
    pub fn vector_len(&self) -> Result<usize> {
        match *self {
            HistogramMethod::Gray { bins } => {
                check_bins("bins", bins)?;
                Ok(bins)
            }
            HistogramMethod::Rgb {
                r_bins,
                g_bins,
                b_bins,
            } => {
                check_bins("r_bins", r_bins)?;
                check_bins("g_bins", g_bins)?;
                check_bins("b_bins", b_bins)?;
                r_bins
                    .checked_mul(g_bins)
                    .and_then(|n| n.checked_mul(b_bins))
                    .ok_or_else(|| {
                        CbirError::InvalidConfig(format!(
                            "histogram of {}x{}x{} bins is too large",
                            r_bins, g_bins, b_bins
                        ))
                    })
            }
        }
    }

    /// Extract this histogram from a decoded image.
    pub fn extract(&self, image: &DynamicImage) -> Result<Descriptor> {
        match *self {
            HistogramMethod::Gray { bins } => compute_gray_histogram(image, bins),
            HistogramMethod::Rgb {
                r_bins,
                g_bins,
                b_bins,
            } => compute_rgb_histogram(image, r_bins, g_bins, b_bins),
        }
    }
}

impl fmt::Display for HistogramMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name(), self.bins_label())
    }
}

/// A decoded image ready for descriptor extraction.
pub struct ColorDescriptor {
    image: DynamicImage,
    source: PathBuf,
}

impl ColorDescriptor {
    /// Decode the image stored at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| CbirError::invalid_image(path.display().to_string(), e.to_string()))?;
        Ok(Self {
            image,
            source: path.to_path_buf(),
        })
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            source: PathBuf::from("<memory>"),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn compute_gray_level_histogram(&self, bins: usize) -> Result<Descriptor> {
        self.compute(HistogramMethod::Gray { bins })
    }

    pub fn compute_rgb_histogram(
        &self,
        r_bins: usize,
        g_bins: usize,
        b_bins: usize,
    ) -> Result<Descriptor> {
        self.compute(HistogramMethod::Rgb {
            r_bins,
            g_bins,
            b_bins,
        })
    }

    /// Extract `method` from this image, naming the source file in errors.
    pub fn compute(&self, method: HistogramMethod) -> Result<Descriptor> {
        method.extract(&self.image).map_err(|e| match e {
            CbirError::InvalidImage { reason, .. } => {
                CbirError::invalid_image(self.source.display().to_string(), reason)
            }
            other => other,
        })
    }
}

/// Compute the normalized gray-level histogram of `image`.
///
/// Color images are converted to luminance first.
pub fn compute_gray_histogram(image: &DynamicImage, bins: usize) -> Result<Descriptor> {
    check_bins("bins", bins)?;
    let pixel_count = pixel_count(image)?;

    let gray = to_luminance(image);
    let mut counts = vec![0usize; bins];
    for pixel in gray.pixels() {
        counts[quantize(pixel.0[0], bins)] += 1;
    }

    Ok(normalize(counts, pixel_count))
}

/// Compute the normalized joint RGB histogram of `image`.
pub fn compute_rgb_histogram(
    image: &DynamicImage,
    r_bins: usize,
    g_bins: usize,
    b_bins: usize,
) -> Result<Descriptor> {
    let len = HistogramMethod::Rgb {
        r_bins,
        g_bins,
        b_bins,
    }
    .vector_len()?;
    let pixel_count = pixel_count(image)?;

    let rgb = image.to_rgb8();
    let mut counts = vec![0usize; len];
    for pixel in rgb.pixels() {
        let [r, g, b] = pixel.0;
        let r = quantize(r, r_bins);
        let g = quantize(g, g_bins);
        let b = quantize(b, b_bins);
        counts[(r * g_bins + g) * b_bins + b] += 1;
    }

    Ok(normalize(counts, pixel_count))
}

/// Map an 8-bit value to its bucket: `floor(bins * value / 256)`, clamped.
#[inline]
fn quantize(value: u8, bins: usize) -> usize {
    (bins * value as usize / 256).min(bins - 1)
}

/// ITU-R 601-2 luma with the same fixed-point rounding as common imaging
/// libraries, so descriptors match index files they produced.
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

fn to_luminance(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => {
            let rgb = other.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                image::Luma([luma(r, g, b)])
            })
        }
    }
}

fn pixel_count(image: &DynamicImage) -> Result<usize> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CbirError::invalid_image(
            "<memory>",
            format!("image has zero area ({}x{})", width, height),
        ));
    }
    Ok(width as usize * height as usize)
}

fn normalize(counts: Vec<usize>, pixel_count: usize) -> Descriptor {
    let total = pixel_count as f64;
    Descriptor::new(counts.into_iter().map(|c| c as f64 / total).collect())
}

fn check_bins(name: &str, bins: usize) -> Result<()> {
    if bins == 0 {
        return Err(CbirError::InvalidConfig(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(())
}
