//! Silhouette extraction from flat-background sprites.
//!
//! The sprite is reduced to luma, an Otsu threshold is computed over its
//! histogram and then clamped from below by `floor`. Polarity decides which
//! side of the threshold counts as foreground.

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{PoseMaskError, Result};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Dark,
    Light,
}

impl Background {
    pub fn from_is_dark(is_dark: bool) -> Self {
        if is_dark {
            Background::Dark
        } else {
            Background::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Background::Dark
    }

    /// Guess polarity from the mean luma of the four corner pixels.
    pub fn detect(sprite: &RgbImage) -> Result<Self> {
        let (w, h) = non_empty(sprite)?;
        let luma = image::imageops::grayscale(sprite);
        let corners = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)];
        let sum: u32 = corners.iter().map(|&(x, y)| luma.get_pixel(x, y).0[0] as u32).sum();
        Ok(Self::from_is_dark(sum / 4 < 128))
    }
}

/// Caller-facing polarity choice; `Auto` defers to [`Background::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    #[default]
    Dark,
    Light,
    Auto,
}

impl BackgroundMode {
    pub fn resolve(self, sprite: &RgbImage) -> Result<Background> {
        match self {
            BackgroundMode::Dark => Ok(Background::Dark),
            BackgroundMode::Light => Ok(Background::Light),
            BackgroundMode::Auto => Background::detect(sprite),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilhouetteParams {
    /// Lower clamp on the Otsu threshold; keeps near-black noise out of the mask.
    ///
    /// The clamp is applied to the threshold, not to a polarity-relative level,
    /// so on a dark background every luma at or below `floor` is background.
    /// A near-white light-background sprite and its inverse are therefore not
    /// interchangeable when the inverse's figure sits under the floor.
    pub floor: u8,
    pub background: BackgroundMode,
}

impl Default for SilhouetteParams {
    fn default() -> Self {
        Self { floor: 20, background: BackgroundMode::Dark }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskWarning {
    /// No pixel was classified as foreground.
    EmptyMask,
}

#[derive(Debug, Clone)]
pub struct Silhouette {
    pub mask: GrayImage,
    /// Effective threshold after the floor clamp; `None` for uniform input.
    pub threshold: Option<u8>,
    pub warning: Option<MaskWarning>,
}

impl Silhouette {
    pub fn is_empty(&self) -> bool {
        self.warning == Some(MaskWarning::EmptyMask)
    }

    /// Fraction of foreground pixels.
    pub fn coverage(&self) -> f32 {
        coverage(&self.mask)
    }
}

pub fn coverage(mask: &GrayImage) -> f32 {
    let total = mask.width() as usize * mask.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let fg = mask.pixels().filter(|p| p.0[0] != BACKGROUND).count();
    fg as f32 / total as f32
}

fn non_empty(img: &RgbImage) -> Result<(u32, u32)> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(PoseMaskError::InvalidParameter(format!("sprite has no pixels ({w}x{h})")));
    }
    Ok((w, h))
}

fn histogram(luma: &GrayImage) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for p in luma.pixels() {
        hist[p.0[0] as usize] += 1;
    }
    hist
}

/// Otsu's method over a 256-bin histogram. The first level reaching the
/// maximum between-class variance wins; `None` if fewer than two levels occur.
pub fn otsu_threshold(hist: &[u64; 256]) -> Option<u8> {
    let total: u64 = hist.iter().sum();
    if hist.iter().filter(|&&c| c > 0).count() < 2 {
        return None;
    }
    let total_f = total as f64;
    let sum_all: f64 = hist.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();

    let mut weight_lo = 0u64;
    let mut sum_lo = 0f64;
    let mut best = (0u8, f64::MIN);
    for (level, &count) in hist.iter().enumerate() {
        weight_lo += count;
        sum_lo += level as f64 * count as f64;
        let weight_hi = total - weight_lo;
        if weight_lo == 0 || weight_hi == 0 {
            continue;
        }
        let mean_lo = sum_lo / weight_lo as f64;
        let mean_hi = (sum_all - sum_lo) / weight_hi as f64;
        let q = weight_lo as f64 / total_f;
        let variance = q * (1.0 - q) * (mean_lo - mean_hi).powi(2);
        if variance > best.1 {
            best = (level as u8, variance);
        }
    }
    Some(best.0)
}

/// Binary foreground mask of a flat-background sprite.
pub fn extract_silhouette(sprite: &RgbImage, background: Background, floor: u8) -> Result<Silhouette> {
    let (w, h) = non_empty(sprite)?;
    let luma = image::imageops::grayscale(sprite);

    let Some(otsu) = otsu_threshold(&histogram(&luma)) else {
        tracing::warn!(width = w, height = h, "uniform sprite, silhouette mask is empty");
        return Ok(Silhouette {
            mask: GrayImage::new(w, h),
            threshold: None,
            warning: Some(MaskWarning::EmptyMask),
        });
    };
    let threshold = otsu.max(floor);

    let mask = GrayImage::from_fn(w, h, |x, y| {
        let v = luma.get_pixel(x, y).0[0];
        let fg = match background {
            Background::Dark => v > threshold,
            Background::Light => v <= threshold,
        };
        Luma([if fg { FOREGROUND } else { BACKGROUND }])
    });

    let warning = mask.pixels().all(|p| p.0[0] == BACKGROUND).then_some(MaskWarning::EmptyMask);
    if warning.is_some() {
        tracing::warn!(otsu, threshold, ?background, "silhouette mask is empty");
    } else {
        tracing::debug!(otsu, threshold, ?background, "extracted silhouette");
    }
    Ok(Silhouette { mask, threshold: Some(threshold), warning })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sprite_with_rect(bg: u8, fg: u8) -> RgbImage {
        RgbImage::from_fn(40, 30, |x, y| {
            let inside = (10..25).contains(&x) && (8..20).contains(&y);
            Rgb([if inside { fg } else { bg }; 3])
        })
    }

    fn in_rect(x: u32, y: u32) -> bool {
        (10..25).contains(&x) && (8..20).contains(&y)
    }

    #[test]
    fn light_background_marks_dark_rectangle() {
        let sil = extract_silhouette(&sprite_with_rect(230, 30), Background::Light, 20).unwrap();
        assert_eq!(sil.mask.dimensions(), (40, 30));
        for (x, y, p) in sil.mask.enumerate_pixels() {
            assert_eq!(p.0[0] == FOREGROUND, in_rect(x, y), "pixel {x},{y}");
        }
        assert!(sil.warning.is_none());
    }

    #[test]
    fn polarity_is_symmetric_under_inversion() {
        let sprite = sprite_with_rect(230, 30);
        let mut inverted = sprite.clone();
        image::imageops::invert(&mut inverted);

        let light = extract_silhouette(&sprite, Background::Light, 20).unwrap();
        let dark = extract_silhouette(&inverted, Background::Dark, 20).unwrap();
        assert_eq!(light.mask.as_raw(), dark.mask.as_raw());
    }

    #[test]
    fn uniform_gray_gives_empty_mask_without_error() {
        let sprite = RgbImage::from_pixel(16, 16, Rgb([128, 128, 128]));
        for bg in [Background::Dark, Background::Light] {
            let sil = extract_silhouette(&sprite, bg, 20).unwrap();
            assert!(sil.mask.pixels().all(|p| p.0[0] == 0));
            assert!(sil.is_empty());
            assert_eq!(sil.threshold, None);
        }
    }

    #[test]
    fn floor_clamps_otsu_threshold() {
        // Otsu alone would split 5 from 15; the floor pushes both below the cut.
        let sil = extract_silhouette(&sprite_with_rect(5, 15), Background::Dark, 20).unwrap();
        assert_eq!(sil.threshold, Some(20));
        assert!(sil.is_empty());
        assert_eq!(sil.coverage(), 0.0);

        // With a floor under Otsu's pick the computed threshold is kept.
        let sil = extract_silhouette(&sprite_with_rect(5, 15), Background::Dark, 0).unwrap();
        assert_eq!(sil.threshold, Some(5));
        assert!(sil.coverage() > 0.0);
    }

    #[test]
    fn floor_only_guards_dark_side() {
        // Near-white sprite: the light-background cut at Otsu's 240 finds the figure.
        let sprite = sprite_with_rect(250, 240);
        let light = extract_silhouette(&sprite, Background::Light, 20).unwrap();
        assert_eq!(light.threshold, Some(240));
        assert!(!light.is_empty());

        // Its inverse (5 on 15) falls entirely under the floor on a dark background.
        let mut inverted = sprite.clone();
        image::imageops::invert(&mut inverted);
        let dark = extract_silhouette(&inverted, Background::Dark, 20).unwrap();
        assert_eq!(dark.threshold, Some(20));
        assert!(dark.is_empty());
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let mut hist = [0u64; 256];
        hist[40] = 100;
        hist[200] = 100;
        assert_eq!(otsu_threshold(&hist), Some(40));
        hist[200] = 0;
        assert_eq!(otsu_threshold(&hist), None);
    }

    #[test]
    fn detects_background_from_corners() {
        assert_eq!(Background::detect(&sprite_with_rect(230, 30)).unwrap(), Background::Light);
        assert_eq!(Background::detect(&sprite_with_rect(10, 200)).unwrap(), Background::Dark);
        assert_eq!(BackgroundMode::Light.resolve(&sprite_with_rect(10, 200)).unwrap(), Background::Light);
    }

    #[test]
    fn empty_sprite_is_invalid() {
        let err = extract_silhouette(&RgbImage::new(0, 4), Background::Dark, 20).unwrap_err();
        assert!(matches!(err, PoseMaskError::InvalidParameter(_)));
    }
}
