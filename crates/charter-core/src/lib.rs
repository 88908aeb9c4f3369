//! Charter Core - Domain models, ontology vocabulary, and shared types
//!
//! This crate defines the abstractions shared by the charter graph workspace:
//! - Parsed sentence model (tokens with dependency annotations)
//! - CIDOC-CRM vocabulary (classes, properties, nodes, links)
//! - Common error types
//! - Configuration management

pub mod config;
pub mod crm;
pub mod sentence;

pub use config::{
    AppConfig, CanonicalName, ConfigError, DatabaseConfig, LoggingConfig, RulesConfig,
};
pub use crm::{CrmClass, CrmLink, CrmNode, CrmProperty, GraphPlan, NodeKey};
pub use sentence::{DepRole, ParsedCharter, PartOfSpeech, Sentence, Token, TokenRef};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for charter graph operations
#[derive(Error, Debug)]
pub enum CharterError {
    #[error("Invalid sentence: {0}")]
    InvalidSentence(String),

    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CharterError>;
