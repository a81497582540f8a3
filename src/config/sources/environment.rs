//! Environment overrides: `STRATA__RENDER__INDENT="    "` sets `render.indent`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "STRATA";

/// Separator between prefix and nested keys
pub const ENV_SEPARATOR: &str = "__";

/// Add `STRATA__*` environment overrides to the builder.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("walk.ignore_patterns"),
    )
}
