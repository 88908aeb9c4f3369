//! Dependency-pattern extraction
//!
//! Walks a parsed charter abstract once, left to right, and fills the slots
//! of a `(subject, verb, direct object, indirect object)` tuple from the
//! dependency roles of the tokens.
//!
//! Charter abstracts are short and formulaic ("X verkauft dem Spital sein Gut
//! in Y"), so role order is taken as a proxy for grammatical function: a
//! single counter is advanced on every role-bearing token, whatever its role,
//! and each slot only accepts the token at its position. Irregular sentences
//! yield wrong or partial tuples; that is accepted, not reported.

use tracing::debug;

use charter_core::{DepRole, PartOfSpeech, RulesConfig, Sentence};

use crate::preposition::classify_trigger;
use crate::rules::RuleTable;
use crate::subject::merge_subject;
use crate::{ExtractionResult, IndirectObject, RelationExtractor};

/// Slots filled during the scan
#[derive(Debug, Default)]
struct RoleSlots {
    subject: Option<String>,
    verb: Option<String>,
    direct_object: Option<String>,
    indirect_object: Option<IndirectObject>,
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Rule-based extractor over TIGER dependency parses
#[derive(Debug, Clone, Default)]
pub struct DependencyPatternExtractor {
    rules: RuleTable,
}

impl DependencyPatternExtractor {
    /// Create an extractor with the default vocabularies
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom vocabularies
    pub fn with_rules(config: &RulesConfig) -> Self {
        Self {
            rules: RuleTable::from_config(config),
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn scan(&self, sentence: &Sentence) -> RoleSlots {
        let mut slots = RoleSlots::default();
        let mut index = 0usize;

        for token in sentence.iter().filter(|t| t.dep.is_role_bearing()) {
            let head = token.head();
            debug!(
                index,
                dep = %token.dep,
                text = %token.text,
                head_pos = %head.pos,
                "role-bearing token"
            );

            if index == 0 && token.dep == DepRole::Subject {
                slots.subject = non_empty(self.rules.canonicalize(&token.text));
                if head.pos == PartOfSpeech::Verb {
                    slots.verb = non_empty(self.rules.correct_lemma(&head.lemma));
                }
            }

            if index == 1 && token.dep.is_object() && head.pos == PartOfSpeech::Verb {
                let object = self.rules.canonicalize(&token.text);
                slots.direct_object = if self.rules.is_reflexive(&object) {
                    slots.subject.clone()
                } else {
                    non_empty(object)
                };
            }

            if index == 2 && token.dep == DepRole::AccusativeObject {
                slots.indirect_object = non_empty(token.text.clone()).map(IndirectObject::PlainText);
            }

            if token.dep == DepRole::ObliqueNominal {
                if let Some(IndirectObject::PlainText(candidate)) = &slots.indirect_object {
                    if head.text == *candidate {
                        let classified = classify_trigger(&token, candidate, &self.rules);
                        slots.indirect_object = Some(classified);
                    }
                }
            }

            index += 1;
        }

        slots
    }

    fn assemble(slots: RoleSlots, sentence: &Sentence) -> ExtractionResult {
        match slots {
            RoleSlots {
                subject: Some(subject),
                verb: Some(verb),
                direct_object: Some(direct_object),
                indirect_object: Some(indirect_object),
            } => ExtractionResult::Quadruple {
                subject: merge_subject(&subject, sentence),
                verb,
                direct_object,
                indirect_object,
            },
            RoleSlots {
                subject: Some(subject),
                verb: Some(verb),
                direct_object: Some(direct_object),
                indirect_object: None,
            } => ExtractionResult::Triple {
                subject: merge_subject(&subject, sentence),
                verb,
                direct_object,
            },
            RoleSlots {
                subject: Some(subject),
                verb: Some(verb),
                ..
            } => ExtractionResult::Pair {
                subject: merge_subject(&subject, sentence),
                verb,
            },
            _ => ExtractionResult::Empty,
        }
    }
}

impl RelationExtractor for DependencyPatternExtractor {
    fn extract(&self, sentence: &Sentence) -> ExtractionResult {
        let slots = self.scan(sentence);
        let result = Self::assemble(slots, sentence);
        debug!(arity = result.arity(), ?result, "extracted tuple");
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
