//! CLI output: error mapping from domain errors to the CLI surface.

use crate::error::ApiError;

/// Map domain errors to a string for CLI output, with a hint where one helps.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProviderNotConfigured(_) => format!(
            "{}\nDefine a provider under [providers.<name>] in config/config.toml \
             (or ~/.config/kcl-compose/config.toml) and pass --provider or set \
             generation.default_provider.",
            e
        ),
        ApiError::ProviderAuthFailed(_) => format!(
            "{}\nCheck the provider's api_key, or OPENAI_API_KEY / ANTHROPIC_API_KEY.",
            e
        ),
        _ => e.to_string(),
    }
}
