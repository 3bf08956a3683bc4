//! Pose rasterizer: renders a skeleton into an openpose-style RGB control image.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use super::draw;
use crate::error::{require_positive, Result};
use crate::skeleton::Skeleton;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseStyle {
    pub resolution: u32,
    pub bone_width: u32,
    pub joint_radius: u32,
    pub bone_color: [u8; 3],
    pub joint_color: [u8; 3],
}

impl Default for PoseStyle {
    fn default() -> Self {
        Self {
            resolution: 1024,
            bone_width: 6,
            joint_radius: 12,
            bone_color: [0, 0, 255],
            joint_color: [0, 255, 0],
        }
    }
}

/// Rasterize with the default style at `resolution` x `resolution`.
pub fn rasterize(skeleton: &Skeleton, resolution: u32) -> Result<RgbImage> {
    rasterize_with(skeleton, &PoseStyle { resolution, ..PoseStyle::default() })
}

/// Bones first, then joints on top so disks are never covered by strokes.
pub fn rasterize_with(skeleton: &Skeleton, style: &PoseStyle) -> Result<RgbImage> {
    let res = require_positive("resolution", style.resolution)?;
    let bone_width = require_positive("bone_width", style.bone_width)?;
    let joint_radius = require_positive("joint_radius", style.joint_radius)?;
    skeleton.validate()?;

    let mut canvas = RgbImage::new(res, res);
    draw::draw_bones(&mut canvas, skeleton, bone_width, Rgb(style.bone_color))?;
    draw::draw_joints(&mut canvas, skeleton, joint_radius, Rgb(style.joint_color));
    tracing::debug!(
        resolution = res,
        joints = skeleton.joints().len(),
        bones = skeleton.bones().len(),
        "rasterized pose"
    );
    Ok(canvas)
}
