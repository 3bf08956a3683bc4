//! Skeleton model: normalized 2D joints plus bone connectivity.
//!
//! Joint positions live in the unit square, `(0, 0)` top-left and `(1, 1)`
//! bottom-right, so the same skeleton can be drawn onto canvases of any size.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{PoseMaskError, Result};

pub type JointId = u32;

/// A rigid link drawn from `parent` to `child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bone {
    pub parent: JointId,
    pub child: JointId,
}

impl Bone {
    pub const fn new(parent: JointId, child: JointId) -> Self {
        Self { parent, child }
    }
}

/// Validated, immutable skeleton. Construct with [`Skeleton::new`] or
/// [`Skeleton::default`]; deserialization runs the same validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SkeletonDef", into = "SkeletonDef")]
pub struct Skeleton {
    joints: BTreeMap<JointId, Vec2>,
    bones: Vec<Bone>,
}

// Frontal humanoid: head, neck, pelvis, 3-joint arms, 2-joint legs.
const TEMPLATE_JOINTS: [(JointId, [f32; 2]); 13] = [
    (0, [0.50, 0.08]),
    (1, [0.50, 0.20]),
    (8, [0.50, 0.52]),
    (2, [0.32, 0.20]),
    (3, [0.25, 0.35]),
    (4, [0.20, 0.50]),
    (5, [0.68, 0.20]),
    (6, [0.75, 0.35]),
    (7, [0.80, 0.50]),
    (9, [0.39, 0.70]),
    (10, [0.36, 0.93]),
    (11, [0.61, 0.70]),
    (12, [0.64, 0.93]),
];

const TEMPLATE_BONES: [Bone; 12] = [
    // spine
    Bone::new(0, 1),
    Bone::new(1, 8),
    // left arm
    Bone::new(1, 2),
    Bone::new(2, 3),
    Bone::new(3, 4),
    // right arm
    Bone::new(1, 5),
    Bone::new(5, 6),
    Bone::new(6, 7),
    // left leg
    Bone::new(8, 9),
    Bone::new(9, 10),
    // right leg
    Bone::new(8, 11),
    Bone::new(11, 12),
];

impl Default for Skeleton {
    fn default() -> Self {
        let joints = TEMPLATE_JOINTS.iter().map(|&(id, [x, y])| (id, Vec2::new(x, y))).collect();
        Self { joints, bones: TEMPLATE_BONES.to_vec() }
    }
}

impl Skeleton {
    /// Build a custom skeleton, rejecting out-of-range coordinates and
    /// bones that reference unknown joints. Nothing is clamped.
    pub fn new(joints: BTreeMap<JointId, Vec2>, bones: Vec<Bone>) -> Result<Self> {
        let skeleton = Self { joints, bones };
        skeleton.validate()?;
        Ok(skeleton)
    }

    pub fn joints(&self) -> &BTreeMap<JointId, Vec2> {
        &self.joints
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn joint(&self, id: JointId) -> Option<Vec2> {
        self.joints.get(&id).copied()
    }

    /// Both endpoints of a bone, or `InvalidSkeleton` if either is missing.
    pub fn endpoints(&self, bone: Bone) -> Result<(Vec2, Vec2)> {
        let lookup = |id| {
            self.joint(id).ok_or_else(|| {
                PoseMaskError::InvalidSkeleton(format!(
                    "bone {}->{} references missing joint {}",
                    bone.parent, bone.child, id
                ))
            })
        };
        Ok((lookup(bone.parent)?, lookup(bone.child)?))
    }

    pub fn validate(&self) -> Result<()> {
        for (&id, p) in &self.joints {
            let in_range = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
            if !in_range(p.x) || !in_range(p.y) {
                return Err(PoseMaskError::InvalidSkeleton(format!(
                    "joint {} at ({}, {}) lies outside [0,1]x[0,1]",
                    id, p.x, p.y
                )));
            }
        }
        for &bone in &self.bones {
            self.endpoints(bone)?;
        }
        Ok(())
    }
}

/// The 13-joint frontal template used when no skeleton is supplied.
pub fn default_skeleton() -> Skeleton {
    Skeleton::default()
}

/// Convenience constructor taking plain `[x, y]` pairs and `[parent, child]` bones.
pub fn custom_skeleton<J>(joints: J, bones: &[[JointId; 2]]) -> Result<Skeleton>
where
    J: IntoIterator<Item = (JointId, [f32; 2])>,
{
    let joints = joints.into_iter().map(|(id, [x, y])| (id, Vec2::new(x, y))).collect();
    let bones = bones.iter().map(|&[a, b]| Bone::new(a, b)).collect();
    Skeleton::new(joints, bones)
}

/// On-disk shape: `{ joints: {id: [x, y]}, bones: [[a, b], ...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SkeletonDef {
    joints: BTreeMap<JointId, [f32; 2]>,
    #[serde(default)]
    bones: Vec<[JointId; 2]>,
}

impl TryFrom<SkeletonDef> for Skeleton {
    type Error = PoseMaskError;

    fn try_from(def: SkeletonDef) -> Result<Self> {
        custom_skeleton(def.joints, &def.bones)
    }
}

impl From<Skeleton> for SkeletonDef {
    fn from(s: Skeleton) -> Self {
        Self {
            joints: s.joints.iter().map(|(&id, p)| (id, [p.x, p.y])).collect(),
            bones: s.bones.iter().map(|b| [b.parent, b.child]).collect(),
        }
    }
}

pub fn load_from_yaml_str(s: &str) -> Result<Skeleton> {
    Ok(serde_yaml::from_str(s)?)
}

/// Load a skeleton file; `.json` is parsed as JSON, anything else as YAML.
pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Skeleton> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        Ok(serde_json::from_str(&data)?)
    } else {
        load_from_yaml_str(&data)
    }
}
