//! Rig-mask composition: silhouette in R, joint disks in G, bone strokes in B.

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use super::draw;
use crate::error::{require_positive, PoseMaskError, Result};
use crate::skeleton::Skeleton;

const MARK: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigMaskParams {
    pub joint_radius: u32,
    pub bone_width: u32,
}

impl Default for RigMaskParams {
    fn default() -> Self {
        Self { joint_radius: 10, bone_width: 6 }
    }
}

/// Merge `mask` with the skeleton drawn at the mask's own pixel size.
/// The mask is copied into R untouched; the skeleton is re-validated first.
pub fn compose_rig_mask(mask: &GrayImage, skeleton: &Skeleton, params: &RigMaskParams) -> Result<RgbImage> {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return Err(PoseMaskError::InvalidParameter(format!("mask has no pixels ({w}x{h})")));
    }
    let joint_radius = require_positive("joint_radius", params.joint_radius)?;
    let bone_width = require_positive("bone_width", params.bone_width)?;
    skeleton.validate()?;

    let mut joints = GrayImage::new(w, h);
    draw::draw_joints(&mut joints, skeleton, joint_radius, MARK);
    let mut bones = GrayImage::new(w, h);
    draw::draw_bones(&mut bones, skeleton, bone_width, MARK)?;

    let rig = RgbImage::from_fn(w, h, |x, y| {
        Rgb([mask.get_pixel(x, y).0[0], joints.get_pixel(x, y).0[0], bones.get_pixel(x, y).0[0]])
    });
    tracing::debug!(width = w, height = h, joint_radius, bone_width, "composed rig mask");
    Ok(rig)
}
