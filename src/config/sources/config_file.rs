//! Explicit config file source (TOML, YAML or JSON by extension).

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::File;
use std::path::Path;
use tracing::debug;

use crate::error::LoadError;

/// Add the config file at `path` to the builder. The file must exist.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::InvalidPath(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    let canonical = dunce::canonicalize(path)?;
    debug!(config_path = %canonical.display(), "Adding config file source");
    Ok(builder.add_source(File::from(canonical).required(true)))
}
