//! Preposition-driven classification of indirect objects
//!
//! An oblique nominal modifier attached to the indirect object (e.g. `in` in
//! "sein Gut in Teingen") decides whether the object names a place inside
//! another place or a right.

use charter_core::{CrmClass, TokenRef};

use crate::rules::{PrepositionClass, RuleTable};
use crate::IndirectObject;

/// Classify `candidate` using the preposition `trigger` that modifies it.
///
/// The anchor is the lemma of the first nominal child of the trigger; without
/// one the candidate stays plain text.
pub fn classify_trigger(
    trigger: &TokenRef<'_>,
    candidate: &str,
    rules: &RuleTable,
) -> IndirectObject {
    let anchor = trigger.children().find(|child| child.pos.is_nominal());
    classify(
        &trigger.text,
        anchor.as_ref().map(|a| a.lemma.as_str()),
        candidate,
        rules,
    )
}

/// Classify by preposition surface text and anchor lemma
pub fn classify(
    preposition: &str,
    anchor: Option<&str>,
    candidate: &str,
    rules: &RuleTable,
) -> IndirectObject {
    let Some(anchor) = anchor else {
        return IndirectObject::PlainText(candidate.to_string());
    };

    match rules.preposition_class(preposition) {
        Some(PrepositionClass::Locative) => IndirectObject::PlaceLink {
            primary: candidate.to_string(),
            secondary: anchor.to_string(),
        },
        Some(PrepositionClass::Right) => IndirectObject::RightTag {
            category: CrmClass::E30Right,
            value: candidate.to_string(),
        },
        None => IndirectObject::PlainText(candidate.to_string()),
    }
}
