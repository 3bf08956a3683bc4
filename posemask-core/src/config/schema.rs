use serde::{Deserialize, Serialize};

use crate::generate::GenerationParams;
use crate::render::{PoseStyle, RigMaskParams, SilhouetteParams};
use crate::skeleton::Skeleton;

/// Everything a pipeline run needs; every section may be omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pose: PoseStyle,
    pub silhouette: SilhouetteParams,
    pub rig: RigMaskParams,
    pub generation: GenerationParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<Skeleton>,
}

impl PipelineConfig {
    /// The configured skeleton, or the default template.
    pub fn skeleton(&self) -> Skeleton {
        self.skeleton.clone().unwrap_or_default()
    }
}
