//! Charter Graph Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults suitable for local development.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Graph database connection
    pub database: DatabaseConfig,

    /// Extraction rule vocabularies
    pub rules: RulesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env();
        Ok(self)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.surrealdb_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database.surrealdb_url".to_string()));
        }
        if let Some(name) = self
            .rules
            .canonical_names
            .iter()
            .find(|n| n.canonical.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                key: "rules.canonical_names.canonical".to_string(),
                value: format!("{:?} (variants {:?})", name.canonical, name.variants),
            });
        }

        // a canonical form must not itself be rewritten
        let variants: HashMap<&str, &str> = self
            .rules
            .canonical_names
            .iter()
            .flat_map(|n| {
                n.variants
                    .iter()
                    .filter(move |v| **v != n.canonical)
                    .map(move |v| (v.as_str(), n.canonical.as_str()))
            })
            .collect();
        if let Some((canonical, target)) = self
            .rules
            .canonical_names
            .iter()
            .find_map(|n| variants.get(n.canonical.as_str()).map(|t| (&n.canonical, *t)))
        {
            return Err(ConfigError::InvalidValue {
                key: "rules.canonical_names.canonical".to_string(),
                value: format!("{canonical:?} is a variant of {target:?}"),
            });
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        // SurrealDB
        if let Ok(url) = std::env::var("SURREALDB_URL") {
            self.database.surrealdb_url = url;
        }
        if let Ok(user) = std::env::var("SURREALDB_USER") {
            self.database.surrealdb_user = user;
        }
        if let Ok(pass) = std::env::var("SURREALDB_PASS") {
            self.database.surrealdb_pass = pass;
        }
        if let Ok(ns) = std::env::var("SURREALDB_NAMESPACE") {
            self.database.surrealdb_namespace = ns;
        }
        if let Ok(db) = std::env::var("SURREALDB_DATABASE") {
            self.database.surrealdb_database = db;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

/// Graph database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SurrealDB WebSocket URL
    pub surrealdb_url: String,

    /// SurrealDB username
    pub surrealdb_user: String,

    /// SurrealDB password
    pub surrealdb_pass: String,

    /// SurrealDB namespace
    pub surrealdb_namespace: String,

    /// SurrealDB database name
    pub surrealdb_database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            surrealdb_url: "ws://localhost:8000".to_string(),
            surrealdb_user: "root".to_string(),
            surrealdb_pass: "root".to_string(),
            surrealdb_namespace: "charters".to_string(),
            surrealdb_database: "crm".to_string(),
        }
    }
}

/// Spelling variants normalized to one canonical name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalName {
    pub canonical: String,
    pub variants: Vec<String>,
}

/// Vocabularies driving the dependency-pattern heuristic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Prepositions marking the indirect object as a place
    pub locative_prepositions: Vec<String>,

    /// Prepositions marking the indirect object as a right
    pub right_prepositions: Vec<String>,

    /// Institution names with their spelling variants
    pub canonical_names: Vec<CanonicalName>,

    /// Lemma overrides for known lemmatizer mistakes
    pub lemma_corrections: BTreeMap<String, String>,

    /// Reflexive pronouns resolved to the subject
    pub reflexive_markers: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            locative_prepositions: owned(&[
                "im",
                "zu",
                "gegenüber",
                "in",
                "neben",
                "beim",
                "bei",
                "samt",
            ]),
            right_prepositions: owned(&["durch", "auf", "von", "über", "um"]),
            canonical_names: vec![CanonicalName {
                canonical: "St. Katharinenspital".to_string(),
                variants: owned(&["Spital", "St.-Katharinenspital", "Katharinenspital"]),
            }],
            // the German model lemmatizes "verstiftet" to itself
            lemma_corrections: BTreeMap::from([(
                "verstiftet".to_string(),
                "verstiften".to_string(),
            )]),
            reflexive_markers: owned(&["sich"]),
        }
    }
}

impl RulesConfig {
    /// Prepositions listed in both the locative and the right vocabulary
    pub fn overlapping_prepositions(&self) -> Vec<&str> {
        self.locative_prepositions
            .iter()
            .filter(|p| self.right_prepositions.contains(*p))
            .map(String::as_str)
            .collect()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
