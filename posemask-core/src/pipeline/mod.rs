//! End-to-end run: pose raster -> sprite generator -> silhouette -> rig mask.
//!
//! Each stage is a pure function over the previous stage's output; the runner
//! only sequences them and writes every artifact into one output directory.

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::{PoseMaskError, Result};
use crate::export::{self, RigMeta};
use crate::generate::{GenerationRequest, SpriteGenerator};
use crate::render::{self, Background, MaskWarning};

pub const POSE_FILE: &str = "pose.png";
pub const SPRITE_FILE: &str = "npc_sprite.png";
pub const MASK_FILE: &str = "npc_mask.png";
pub const RIG_MASK_FILE: &str = "rig_mask.png";
pub const RIG_META_FILE: &str = "rig_meta.json";

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub pose: PathBuf,
    pub sprite: PathBuf,
    pub mask: PathBuf,
    pub rig_mask: PathBuf,
    pub rig_meta: PathBuf,
    pub background: Background,
    pub warning: Option<MaskWarning>,
}

pub struct Pipeline<G> {
    config: PipelineConfig,
    generator: G,
}

impl<G: SpriteGenerator> Pipeline<G> {
    pub fn new(config: PipelineConfig, generator: G) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run<P: AsRef<Path>>(&self, out_dir: P) -> Result<PipelineReport> {
        let out_dir = out_dir.as_ref();
        std::fs::create_dir_all(out_dir)?;
        let skeleton = self.config.skeleton();

        let pose = render::rasterize_with(&skeleton, &self.config.pose)?;
        let pose_path = out_dir.join(POSE_FILE);
        export::save_pose(&pose, &pose_path)?;

        let request = GenerationRequest::new(&self.config.generation, &pose);
        let sprite = self
            .generator
            .generate(&request)
            .map_err(|e| PoseMaskError::Generation(format!("{e:#}")))?;
        if sprite.width() == 0 || sprite.height() == 0 {
            return Err(PoseMaskError::Generation("generator returned an empty image".into()));
        }
        let sprite_path = out_dir.join(SPRITE_FILE);
        export::save_sprite(&sprite, &sprite_path)?;

        let background = self.config.silhouette.background.resolve(&sprite)?;
        let silhouette = render::extract_silhouette(&sprite, background, self.config.silhouette.floor)?;
        let mask_path = out_dir.join(MASK_FILE);
        export::save_mask(&silhouette.mask, &mask_path)?;

        let rig = render::compose_rig_mask(&silhouette.mask, &skeleton, &self.config.rig)?;
        let rig_path = out_dir.join(RIG_MASK_FILE);
        export::save_rig_mask(&rig, &rig_path)?;
        let meta_path = out_dir.join(RIG_META_FILE);
        RigMeta::new(&silhouette.mask, &skeleton, &self.config.rig).save(&meta_path)?;

        Ok(PipelineReport {
            pose: pose_path,
            sprite: sprite_path,
            mask: mask_path,
            rig_mask: rig_path,
            rig_meta: meta_path,
            background,
            warning: silhouette.warning,
        })
    }
}
