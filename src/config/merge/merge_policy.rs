//! Merge rules: defaults first, then the config file, then the environment.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with every default layer applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.color", true)?
        .set_default("render.indent", "  ")?
        .set_default("render.branch_marker", "'-")?
        .set_default("render.key_mode", "str")?
        .set_default("render.value_mode", "type")?
        .set_default("walk.follow_symlinks", false)?
        .set_default("walk.normalize_unicode", true)
}
