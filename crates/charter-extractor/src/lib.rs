//! Charter Extractor - Relation extraction from parsed charter abstracts
//!
//! Implements the dependency-pattern heuristic that turns a parsed sentence
//! into a `(subject, verb, direct object, indirect object)` tuple, and the
//! loader that maps such tuples onto CIDOC-CRM nodes and links.

use serde::{Deserialize, Serialize};

use charter_core::{CrmClass, Sentence};

pub mod loader;
pub mod pattern;
pub mod preposition;
pub mod rules;
pub mod subject;

pub use loader::{sample_graph, CharterGraphLoader};
pub use pattern::DependencyPatternExtractor;
pub use rules::{PrepositionClass, RuleTable};

/// Indirect object, optionally qualified by its governing preposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IndirectObject {
    /// No qualifying preposition recognized
    PlainText(String),
    /// A place within a governing place, e.g. `Gut` in `Teingen`
    PlaceLink { primary: String, secondary: String },
    /// A right (`E30Right`) named by the object
    RightTag { category: CrmClass, value: String },
}

impl IndirectObject {
    /// Tag a value as an `E30Right`
    pub fn right(value: impl Into<String>) -> Self {
        Self::RightTag {
            category: CrmClass::E30Right,
            value: value.into(),
        }
    }

    /// Link a place to the place it lies in
    pub fn place(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self::PlaceLink {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// Relation tuple extracted from one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// No subject/verb pair found; the sentence should not be graphed
    Empty,
    Pair {
        subject: String,
        verb: String,
    },
    Triple {
        subject: String,
        verb: String,
        direct_object: String,
    },
    Quadruple {
        subject: String,
        verb: String,
        direct_object: String,
        indirect_object: IndirectObject,
    },
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of filled slots (0, 2, 3 or 4)
    pub fn arity(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Pair { .. } => 2,
            Self::Triple { .. } => 3,
            Self::Quadruple { .. } => 4,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Pair { subject, .. }
            | Self::Triple { subject, .. }
            | Self::Quadruple { subject, .. } => Some(subject.as_str()),
        }
    }

    pub fn verb(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Pair { verb, .. } | Self::Triple { verb, .. } | Self::Quadruple { verb, .. } => {
                Some(verb.as_str())
            }
        }
    }

    pub fn direct_object(&self) -> Option<&str> {
        match self {
            Self::Triple { direct_object, .. } | Self::Quadruple { direct_object, .. } => {
                Some(direct_object.as_str())
            }
            _ => None,
        }
    }

    pub fn indirect_object(&self) -> Option<&IndirectObject> {
        match self {
            Self::Quadruple {
                indirect_object, ..
            } => Some(indirect_object),
            _ => None,
        }
    }
}

/// Trait for relation extractors working on parsed sentences
pub trait RelationExtractor: Send + Sync {
    fn extract(&self, sentence: &Sentence) -> ExtractionResult;
}
