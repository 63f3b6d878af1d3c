use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by `assist-core`.
///
/// Patching, previewing and finalizing never fail; only configuration loading does.
pub enum AssistError {
    #[error("invalid options: {0}")]
    /// The TOML options document could not be parsed.
    Options(#[from] toml::de::Error),

    #[error("invalid option '{field}': {message}")]
    /// An option parsed but holds an unusable value.
    InvalidOption {
        /// Kebab-case option name.
        field: &'static str,
        /// What is wrong with the value.
        message: String,
    },
}
