//! Kernel configuration.
//!
//! Options can be built in code (`AssistOptions::default()` plus field updates) or loaded from a
//! TOML table using kebab-case keys:
//!
//! ```toml
//! reveal-steps = 120
//! reveal-interval-ms = 10
//! envelope-types = ["code_edit"]
//! ```

use crate::error::AssistError;
use crate::reveal::DEFAULT_REVEAL_STEPS;
use serde::Deserialize;
use std::time::Duration;

/// Placeholder shown while an envelope has started but nothing readable was captured yet.
pub const DEFAULT_GENERATING_PLACEHOLDER: &str = "Generating…";

/// Options controlling previews, envelope recognition and reveal pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AssistOptions {
    /// Upper bound on reveal ticks, independent of text length.
    pub reveal_steps: usize,
    /// Delay between reveal ticks, in milliseconds.
    pub reveal_interval_ms: u64,
    /// `type` values that identify an edit envelope.
    pub envelope_types: Vec<String>,
    /// Preview text shown before anything readable has arrived.
    pub generating_placeholder: String,
    /// Fence tag used when the active document's language is unknown.
    pub default_fence_tag: String,
}

impl Default for AssistOptions {
    fn default() -> Self {
        Self {
            reveal_steps: DEFAULT_REVEAL_STEPS,
            reveal_interval_ms: 16,
            envelope_types: vec![
                "code_edit".to_string(),
                "edit".to_string(),
                "code_change".to_string(),
            ],
            generating_placeholder: DEFAULT_GENERATING_PLACEHOLDER.to_string(),
            default_fence_tag: "text".to_string(),
        }
    }
}

impl AssistOptions {
    /// Parse options from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, AssistError> {
        let options: Self = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values the kernel cannot work with.
    pub fn validate(&self) -> Result<(), AssistError> {
        if self.reveal_steps == 0 {
            return Err(AssistError::InvalidOption {
                field: "reveal-steps",
                message: "must be at least 1".to_string(),
            });
        }
        if self.envelope_types.iter().all(|t| t.trim().is_empty()) {
            return Err(AssistError::InvalidOption {
                field: "envelope-types",
                message: "at least one envelope type is required".to_string(),
            });
        }
        Ok(())
    }

    /// Reveal tick interval as a [`Duration`].
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = AssistOptions::from_toml_str("reveal-steps = 50\n").unwrap();
        assert_eq!(options.reveal_steps, 50);
        assert_eq!(options.reveal_interval_ms, 16);
        assert_eq!(options.envelope_types, AssistOptions::default().envelope_types);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            AssistOptions::from_toml_str("reveal-steps = 0"),
            Err(AssistError::InvalidOption { field: "reveal-steps", .. })
        ));
        assert!(matches!(
            AssistOptions::from_toml_str("envelope-types = []"),
            Err(AssistError::InvalidOption { field: "envelope-types", .. })
        ));
        assert!(matches!(
            AssistOptions::from_toml_str("reveal-steps = \"many\""),
            Err(AssistError::Options(_))
        ));
    }
}
