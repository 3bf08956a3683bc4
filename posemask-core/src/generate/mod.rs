//! Seam for the external image model that turns a pose control image into a sprite.

use std::path::PathBuf;

use anyhow::Context;
use image::RgbImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub prompt: String,
    pub negative_prompt: String,
    pub conditioning_scale: f32,
    /// Fraction of the denoising schedule after which the control image stops guiding.
    pub guidance_end: f32,
    pub steps: u32,
    pub guidance_scale: f32,
    pub seed: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            prompt: "full body concept art of a medieval npc villager, neutral pose, \
                     movie concept, 8k, sharp focus, highly detailed texture, \
                     front view, transparent background"
                .to_string(),
            negative_prompt: "text, watermark, blurry, duplicate limbs, bad anatomy".to_string(),
            conditioning_scale: 0.7,
            guidance_end: 0.8,
            steps: 30,
            guidance_scale: 3.5,
            seed: 42,
        }
    }
}

pub struct GenerationRequest<'a> {
    pub params: &'a GenerationParams,
    pub control_image: &'a RgbImage,
    pub width: u32,
    pub height: u32,
}

impl<'a> GenerationRequest<'a> {
    /// Request a sprite the same size as the control image.
    pub fn new(params: &'a GenerationParams, control_image: &'a RgbImage) -> Self {
        let (width, height) = control_image.dimensions();
        Self { params, control_image, width, height }
    }
}

pub trait SpriteGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> anyhow::Result<RgbImage>;
}

impl<G: SpriteGenerator + ?Sized> SpriteGenerator for &G {
    fn generate(&self, request: &GenerationRequest<'_>) -> anyhow::Result<RgbImage> {
        (**self).generate(request)
    }
}

impl<G: SpriteGenerator + ?Sized> SpriteGenerator for Box<G> {
    fn generate(&self, request: &GenerationRequest<'_>) -> anyhow::Result<RgbImage> {
        (**self).generate(request)
    }
}

/// Returns a sprite that was produced ahead of time by an out-of-process model.
#[derive(Debug, Clone)]
pub struct FileSpriteGenerator {
    pub path: PathBuf,
}

impl FileSpriteGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SpriteGenerator for FileSpriteGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> anyhow::Result<RgbImage> {
        let sprite = image::open(&self.path)
            .with_context(|| format!("failed to open sprite {}", self.path.display()))?
            .to_rgb8();
        if sprite.dimensions() != (request.width, request.height) {
            tracing::debug!(
                expected_w = request.width,
                expected_h = request.height,
                actual_w = sprite.width(),
                actual_h = sprite.height(),
                "sprite size differs from control image"
            );
        }
        tracing::info!(path = %self.path.display(), seed = request.params.seed, "loaded pre-generated sprite");
        Ok(sprite)
    }
}
