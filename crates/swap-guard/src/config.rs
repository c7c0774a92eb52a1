//! Guard configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields the stock "cancel swap request" guard.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matcher::{DEFAULT_MARKER, HrefMatcher, MatchMode};

pub const DEFAULT_PROMPT: &str = "Are you sure you want to cancel this swap request?";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("marker must not be empty")]
    EmptyMarker,
    #[error("prompt must not be empty")]
    EmptyPrompt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Literal looked for in each link's `href`.
    pub marker: String,
    pub match_mode: MatchMode,
    /// Text of the confirmation dialog.
    pub prompt: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_owned(),
            match_mode: MatchMode::default(),
            prompt: DEFAULT_PROMPT.to_owned(),
        }
    }
}

impl GuardConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        if self.prompt.trim().is_empty() {
            return Err(ConfigError::EmptyPrompt);
        }
        Ok(())
    }

    pub fn matcher(&self) -> HrefMatcher {
        HrefMatcher::new(self.marker.clone(), self.match_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = GuardConfig::from_toml_str("").unwrap();
        assert_eq!(config, GuardConfig::default());
        assert_eq!(config.marker, "delete_swap");
        assert_eq!(config.match_mode, MatchMode::Substring);
        assert_eq!(
            config.prompt,
            "Are you sure you want to cancel this swap request?"
        );
    }

    #[test]
    fn parses_all_fields() {
        let config = GuardConfig::from_toml_str(
            r#"
            marker = "delete_swap"
            match_mode = "path-segment"
            prompt = "Really cancel?"
            "#,
        )
        .unwrap();
        assert_eq!(config.match_mode, MatchMode::PathSegment);
        assert_eq!(config.prompt, "Really cancel?");
        assert!(config.matcher().matches("/swap/9/delete_swap"));
        assert!(!config.matcher().matches("/swap/9/delete_swapXYZ"));
    }

    #[test]
    fn rejects_empty_marker_and_prompt() {
        assert!(matches!(
            GuardConfig::from_toml_str(r#"marker = """#),
            Err(ConfigError::EmptyMarker)
        ));
        assert!(matches!(
            GuardConfig::from_toml_str(r#"prompt = "   ""#),
            Err(ConfigError::EmptyPrompt)
        ));
    }

    #[test]
    fn rejects_unknown_keys_and_modes() {
        assert!(matches!(
            GuardConfig::from_toml_str(r#"selector = "a""#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GuardConfig::from_toml_str(r#"match_mode = "fuzzy""#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let error = GuardConfig::load("/definitely/not/here/guard.toml").unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.to_string().contains("guard.toml"));
    }
}
