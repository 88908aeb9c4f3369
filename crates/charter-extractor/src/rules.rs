//! Rule table for the dependency-pattern heuristic
//!
//! Every vocabulary the heuristic consults (preposition classes, spelling
//! variants, lemma fixes, reflexive pronouns) is looked up here, so growing a
//! vocabulary is a configuration change rather than a code change.

use std::collections::{HashMap, HashSet};

use charter_core::RulesConfig;

/// Class of a preposition governing an indirect object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrepositionClass {
    /// The object is a place (`in`, `zu`, `bei`, ...)
    Locative,
    /// The object is a right (`durch`, `auf`, `von`, ...)
    Right,
}

/// Compiled lookup tables built from [`RulesConfig`]
#[derive(Debug, Clone)]
pub struct RuleTable {
    locative: HashSet<String>,
    right: HashSet<String>,
    /// variant -> canonical name
    canonical: HashMap<String, String>,
    lemma_corrections: HashMap<String, String>,
    reflexive: HashSet<String>,
}

impl RuleTable {
    /// Build lookup tables from configuration
    pub fn from_config(config: &RulesConfig) -> Self {
        let mut canonical = HashMap::new();
        for name in &config.canonical_names {
            for variant in &name.variants {
                if *variant != name.canonical {
                    canonical.insert(variant.clone(), name.canonical.clone());
                }
            }
        }

        Self {
            locative: config.locative_prepositions.iter().cloned().collect(),
            right: config.right_prepositions.iter().cloned().collect(),
            canonical,
            lemma_corrections: config
                .lemma_corrections
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            reflexive: config.reflexive_markers.iter().cloned().collect(),
        }
    }

    /// Rewrite a known spelling variant to its canonical form
    pub fn canonicalize(&self, name: &str) -> String {
        self.canonical
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Apply lemma overrides for known lemmatizer mistakes
    pub fn correct_lemma(&self, lemma: &str) -> String {
        self.lemma_corrections
            .get(lemma)
            .cloned()
            .unwrap_or_else(|| lemma.to_string())
    }

    pub fn is_reflexive(&self, text: &str) -> bool {
        self.reflexive.contains(text)
    }

    /// Classify a preposition by its surface form.
    ///
    /// Locative membership is checked first, so a preposition configured in
    /// both vocabularies is treated as locative.
    pub fn preposition_class(&self, preposition: &str) -> Option<PrepositionClass> {
        if self.locative.contains(preposition) {
            Some(PrepositionClass::Locative)
        } else if self.right.contains(preposition) {
            Some(PrepositionClass::Right)
        } else {
            None
        }
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}
