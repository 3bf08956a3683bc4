//! Control-image synthesis: pose raster, silhouette mask and rig mask.

pub mod draw;
pub mod pose;
pub mod rig_mask;
pub mod silhouette;

pub use pose::{rasterize, rasterize_with, PoseStyle};
pub use rig_mask::{compose_rig_mask, RigMaskParams};
pub use silhouette::{extract_silhouette, Background, BackgroundMode, MaskWarning, Silhouette, SilhouetteParams};
