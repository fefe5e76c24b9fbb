//! Match configuration: which model plays which mark.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::service::DEFAULT_MODEL;

/// One player's agent selection.
///
/// The model identifier is a free-form string handed to the completion
/// service; unrecognized identifiers are the service's error to surface.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Display name for this agent.
    #[serde(default)]
    name: Option<String>,

    /// Model identifier (e.g. "gpt-4", "gpt-3.5-turbo").
    #[serde(default = "default_model")]
    model: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl AgentSpec {
    /// Creates an agent spec for the given model.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            name: None,
            model: model.into(),
        }
    }

    /// The agent's display name: the explicit name, or the model id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.model)
    }
}

impl Default for AgentSpec {
    fn default() -> Self {
        Self::for_model(default_model())
    }
}

/// Configuration for a match between two agents.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Agent playing X.
    #[serde(default)]
    player_x: AgentSpec,

    /// Agent playing O.
    #[serde(default)]
    player_o: AgentSpec,
}

impl MatchConfig {
    /// Creates a match config from two agent specs.
    pub fn new(player_x: AgentSpec, player_o: AgentSpec) -> Self {
        Self { player_x, player_o }
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading match config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            player_x = config.player_x.display_name(),
            player_o = config.player_o.display_name(),
            "Match config loaded"
        );
        Ok(config)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error was created.
    pub line: u32,
    /// Source file where the error was created.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.player_x().model(), DEFAULT_MODEL);
        assert_eq!(config.player_o().model(), DEFAULT_MODEL);
        assert_eq!(config.player_x().display_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[player_x]
name = "Veteran"
model = "gpt-4"

[player_o]
model = "gpt-3.5-turbo"
"#
        )
        .unwrap();

        let config = MatchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.player_x().model(), "gpt-4");
        assert_eq!(config.player_x().display_name(), "Veteran");
        assert_eq!(config.player_o().model(), "gpt-3.5-turbo");
        assert_eq!(config.player_o().display_name(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_from_file_missing() {
        let result = MatchConfig::from_file("/nonexistent/match.toml");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }
}
