pub mod schema;

use crate::error::Result;
pub use schema::PipelineConfig;

pub fn load_from_yaml_str(s: &str) -> Result<PipelineConfig> {
    let config: PipelineConfig = serde_yaml::from_str(s)?;
    Ok(config)
}

pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<PipelineConfig> {
    let data = std::fs::read_to_string(path)?;
    load_from_yaml_str(&data)
}
