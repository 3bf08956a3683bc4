//! Export utilities: PNG artifacts plus a JSON sidecar describing the rig mask.

use std::path::Path;

use image::{GrayImage, RgbImage};

use crate::error::Result;
use crate::render::draw::to_pixel;
use crate::render::silhouette::coverage;
use crate::render::RigMaskParams;
use crate::skeleton::{JointId, Skeleton};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn save_rgb(img: &RgbImage, path: &Path, what: &str) -> Result<()> {
    ensure_parent(path)?;
    img.save(path)?;
    tracing::info!(path = %path.display(), width = img.width(), height = img.height(), "wrote {}", what);
    Ok(())
}

/// Pose control image consumed by the image model.
pub fn save_pose<P: AsRef<Path>>(img: &RgbImage, path: P) -> Result<()> {
    save_rgb(img, path.as_ref(), "pose control image")
}

pub fn save_sprite<P: AsRef<Path>>(img: &RgbImage, path: P) -> Result<()> {
    save_rgb(img, path.as_ref(), "sprite")
}

/// Single-channel 8-bit PNG holding 0/255 values.
pub fn save_mask<P: AsRef<Path>>(mask: &GrayImage, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    mask.save(path)?;
    tracing::info!(path = %path.display(), coverage = coverage(mask), "wrote binary mask");
    Ok(())
}

pub fn save_rig_mask<P: AsRef<Path>>(img: &RgbImage, path: P) -> Result<()> {
    save_rgb(img, path.as_ref(), "rig mask")
}

/// Load a mask written by [`save_mask`] (any format `image` can decode is accepted).
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    Ok(image::open(path)?.to_luma8())
}

/// Sidecar describing how the rig mask channels were drawn.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RigMeta {
    pub width: u32,
    pub height: u32,
    pub channels: [String; 3],
    pub joint_radius: u32,
    pub bone_width: u32,
    /// Joint centers in pixel space, by joint id.
    pub joints_px: Vec<(JointId, [i32; 2])>,
    pub bones: Vec<[JointId; 2]>,
    /// Foreground fraction of the silhouette channel.
    pub coverage: f32,
}

impl RigMeta {
    pub fn new(mask: &GrayImage, skeleton: &Skeleton, params: &RigMaskParams) -> Self {
        let (width, height) = mask.dimensions();
        Self {
            width,
            height,
            channels: ["silhouette".into(), "joints".into(), "bones".into()],
            joint_radius: params.joint_radius,
            bone_width: params.bone_width,
            joints_px: skeleton
                .joints()
                .iter()
                .map(|(&id, &p)| (id, to_pixel(p, width, height).to_array()))
                .collect(),
            bones: skeleton.bones().iter().map(|b| [b.parent, b.child]).collect(),
            coverage: coverage(mask),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!(path = %path.display(), "wrote rig metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::default_skeleton;
    use image::Luma;

    #[test]
    fn mask_survives_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/mask.png");
        let mask = GrayImage::from_fn(10, 6, |x, _| Luma([if x < 4 { 255 } else { 0 }]));
        save_mask(&mask, &path).unwrap();
        assert_eq!(load_mask(&path).unwrap(), mask);
    }

    #[test]
    fn meta_lists_joint_pixels() {
        let mask = GrayImage::from_pixel(200, 100, Luma([255]));
        let meta = RigMeta::new(&mask, &default_skeleton(), &RigMaskParams::default());
        assert_eq!((meta.width, meta.height), (200, 100));
        assert_eq!(meta.joints_px[0], (0, [100, 8]));
        assert_eq!(meta.bones.len(), 12);
        assert_eq!(meta.coverage, 1.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig_meta.json");
        meta.save(&path).unwrap();
        let back: RigMeta = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, meta);
    }
}
