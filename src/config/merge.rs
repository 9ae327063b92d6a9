//! Merge rules: built-in defaults and the override order of sources.

use crate::component::DEFAULT_LIBRARY_VERSION;
use crate::validation::density::{MIN_COMPONENTS, MIN_DATA_COMPONENTS};
use crate::validation::structural::MAX_FRAME_CHARS;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with the built-in defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generation.library_version", DEFAULT_LIBRARY_VERSION)?
        .set_default("generation.min_components", MIN_COMPONENTS as i64)?
        .set_default("generation.min_data_components", MIN_DATA_COMPONENTS as i64)?
        .set_default("generation.max_frame_chars", MAX_FRAME_CHARS as i64)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
