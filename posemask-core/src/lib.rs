pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod pipeline;
pub mod render;
pub mod skeleton;

pub use error::{PoseMaskError, Result};
pub use skeleton::{Bone, JointId, Skeleton};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
