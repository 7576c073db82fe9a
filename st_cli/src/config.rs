//! CLI configuration management.
//!
//! Consolidates environment variable reads and command-line overrides into a
//! validated configuration.

use swiss_tournament::db::DatabaseConfig;
use swiss_tournament::tournament::{Scope, TournamentId};

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Complete CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Scope every command operates on
    pub scope: Scope,
    /// Output format
    pub output: OutputFormat,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `tournament_override` - Optional tournament tag override (from CLI args)
    /// * `json` - Print JSON instead of text
    ///
    /// # Errors
    ///
    /// Returns error if `TOURNAMENT_ID` is set but not a number
    pub fn from_env(
        database_url_override: Option<String>,
        tournament_override: Option<TournamentId>,
        json: bool,
    ) -> Result<Self, ConfigError> {
        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database = database.with_url(url);
        }

        let tournament = match tournament_override {
            Some(id) => Some(id),
            None => match std::env::var("TOURNAMENT_ID") {
                Ok(raw) if !raw.trim().is_empty() => {
                    Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                        var: "TOURNAMENT_ID".to_string(),
                        reason: format!("Not an integer: {raw}"),
                    })?)
                }
                _ => None,
            },
        };

        Ok(CliConfig {
            database,
            scope: Scope::from(tournament),
            output: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_scope()?;
        self.validate_database()
    }

    /// Validate the tournament tag
    pub fn validate_scope(&self) -> Result<(), ConfigError> {
        self.scope.validate().map_err(|_| ConfigError::Invalid {
            var: "TOURNAMENT_ID".to_string(),
            reason: "Must be greater than 0".to_string(),
        })?;
        Ok(())
    }

    /// Validate the settings only storage-backed commands use
    pub fn validate_database(&self) -> Result<(), ConfigError> {
        let url = &self.database.database_url;
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason: "Must be a postgres:// or postgresql:// URL".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(scope: Scope) -> CliConfig {
        CliConfig {
            database: DatabaseConfig::development(),
            scope,
            output: OutputFormat::Text,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "TOURNAMENT_ID".to_string(),
            reason: "Must be greater than 0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TOURNAMENT_ID"));
        assert!(msg.contains("greater than 0"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = CliConfig::from_env(Some("postgres://cli/db".to_string()), Some(9), true)
            .unwrap();
        assert_eq!(config.database.database_url, "postgres://cli/db");
        assert_eq!(config.scope, Scope::Tournament(9));
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_non_positive_tournament() {
        let err = config(Scope::Tournament(0)).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "TOURNAMENT_ID"));
        assert!(config(Scope::Ungrouped).validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_non_postgres_url() {
        let mut config = config(Scope::Ungrouped);
        config.database = config.database.with_url("mysql://localhost/db");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DATABASE_URL"));
    }

    #[test]
    fn test_scope_validation_ignores_database() {
        let mut config = config(Scope::Tournament(3));
        config.database = config.database.with_url("sqlite::memory:");
        assert!(config.validate_scope().is_ok());
        assert!(config.validate_database().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_inverted_pool_bounds() {
        let mut config = config(Scope::Ungrouped);
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }
}
