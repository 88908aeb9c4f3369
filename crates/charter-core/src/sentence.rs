//! Parsed sentence model
//!
//! A charter abstract arrives here already tokenized, tagged and
//! dependency-parsed by an external linguistic pipeline. The model only keeps
//! what the extraction heuristic reads: surface text, lemma, coarse
//! part-of-speech, dependency label and the index of the governing token.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::{CharterError, Result};

// ============================================================================
// Tags and labels
// ============================================================================

/// Coarse part-of-speech tag (Universal POS)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartOfSpeech {
    Verb,
    Noun,
    ProperNoun,
    Determiner,
    /// Any tag the extractor does not inspect
    Other(String),
}

impl PartOfSpeech {
    /// Get the tag as produced by the tagger
    pub fn as_str(&self) -> &str {
        match self {
            Self::Verb => "VERB",
            Self::Noun => "NOUN",
            Self::ProperNoun => "PROPN",
            Self::Determiner => "DET",
            Self::Other(tag) => tag,
        }
    }

    /// Nouns and proper nouns
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun)
    }
}

impl From<&str> for PartOfSpeech {
    fn from(tag: &str) -> Self {
        match tag {
            "VERB" => Self::Verb,
            "NOUN" => Self::Noun,
            "PROPN" => Self::ProperNoun,
            "DET" => Self::Determiner,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PartOfSpeech {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<PartOfSpeech> for String {
    fn from(pos: PartOfSpeech) -> Self {
        pos.as_str().to_string()
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dependency role of a token relative to its head.
///
/// Labels follow the TIGER scheme used by German dependency models. Only the
/// four roles below drive extraction; every other label is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepRole {
    /// `sb`
    Subject,
    /// `oa`
    AccusativeObject,
    /// `da`
    DativeObject,
    /// `mnr`, a postnominal modifier introduced by a preposition
    ObliqueNominal,
    Other(String),
}

impl DepRole {
    /// Get the TIGER label
    pub fn as_str(&self) -> &str {
        match self {
            Self::Subject => "sb",
            Self::AccusativeObject => "oa",
            Self::DativeObject => "da",
            Self::ObliqueNominal => "mnr",
            Self::Other(label) => label,
        }
    }

    /// Whether the role takes part in the positional scan
    pub fn is_role_bearing(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Accusative or dative object
    pub fn is_object(&self) -> bool {
        matches!(self, Self::AccusativeObject | Self::DativeObject)
    }
}

impl From<&str> for DepRole {
    fn from(label: &str) -> Self {
        match label {
            "sb" => Self::Subject,
            "oa" => Self::AccusativeObject,
            "da" => Self::DativeObject,
            "mnr" => Self::ObliqueNominal,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for DepRole {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<DepRole> for String {
    fn from(role: DepRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for DepRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// A single token of a parsed sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface string
    pub text: String,

    /// Canonical base form
    pub lemma: String,

    /// Coarse part-of-speech tag
    pub pos: PartOfSpeech,

    /// Dependency label
    pub dep: DepRole,

    /// Index of the governing token; a root points at itself
    pub head: usize,
}

impl Token {
    /// Create a new token
    pub fn new(
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<PartOfSpeech>,
        dep: impl Into<DepRole>,
        head: usize,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            dep: dep.into(),
            head,
        }
    }
}

/// A token viewed in the context of its sentence.
///
/// Gives access to the head and children relations without the tokens owning
/// each other.
#[derive(Debug, Clone, Copy)]
pub struct TokenRef<'a> {
    sentence: &'a Sentence,
    index: usize,
}

impl<'a> TokenRef<'a> {
    /// Position in the sentence
    pub fn index(&self) -> usize {
        self.index
    }

    /// The governing token
    pub fn head(&self) -> TokenRef<'a> {
        TokenRef {
            sentence: self.sentence,
            index: self.sentence.tokens[self.index].head,
        }
    }

    /// Tokens governed by this token, in sentence order
    pub fn children(&self) -> impl Iterator<Item = TokenRef<'a>> + 'a {
        let sentence = self.sentence;
        let index = self.index;
        sentence
            .tokens
            .iter()
            .enumerate()
            .filter(move |(i, t)| t.head == index && *i != index)
            .map(move |(i, _)| TokenRef { sentence, index: i })
    }
}

impl Deref for TokenRef<'_> {
    type Target = Token;

    fn deref(&self) -> &Token {
        &self.sentence.tokens[self.index]
    }
}

// ============================================================================
// Sentence
// ============================================================================

/// An ordered, validated sequence of tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSentence")]
pub struct Sentence {
    tokens: Vec<Token>,
}

#[derive(Deserialize)]
struct RawSentence {
    tokens: Vec<Token>,
}

impl TryFrom<RawSentence> for Sentence {
    type Error = CharterError;

    fn try_from(raw: RawSentence) -> Result<Self> {
        Self::new(raw.tokens)
    }
}

impl Sentence {
    /// Build a sentence, checking that every head index points into it
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        if let Some((i, token)) = tokens
            .iter()
            .enumerate()
            .find(|(_, t)| t.head >= tokens.len())
        {
            return Err(CharterError::InvalidSentence(format!(
                "token {i} ({:?}) has head {} outside of {} tokens",
                token.text,
                token.head,
                tokens.len()
            )));
        }

        Ok(Self { tokens })
    }

    /// Parse a sentence from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index` together with its relations
    pub fn get(&self, index: usize) -> Option<TokenRef<'_>> {
        (index < self.tokens.len()).then_some(TokenRef {
            sentence: self,
            index,
        })
    }

    /// Iterate tokens left to right
    pub fn iter(&self) -> impl Iterator<Item = TokenRef<'_>> {
        (0..self.tokens.len()).map(move |index| TokenRef {
            sentence: self,
            index,
        })
    }
}

/// A charter abstract together with its dependency parse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCharter {
    /// Archive signature used as the charter node name (e.g. "SpAR Urk. 2101")
    pub charter_id: String,

    /// The abstract as plain text
    #[serde(rename = "abstract", default)]
    pub summary: String,

    /// Archive id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch_id: Option<String>,

    /// Monasterium id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mom_id: Option<String>,

    /// Name of a related file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,

    pub sentence: Sentence,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sentence {
        // "Konrad verkauft einen Hof zu Regensburg"
        Sentence::new(vec![
            Token::new("Konrad", "Konrad", "PROPN", "sb", 1),
            Token::new("verkauft", "verkaufen", "VERB", "ROOT", 1),
            Token::new("einen", "ein", "DET", "nk", 3),
            Token::new("Hof", "Hof", "NOUN", "oa", 1),
            Token::new("zu", "zu", "ADP", "mnr", 3),
            Token::new("Regensburg", "Regensburg", "PROPN", "nk", 4),
        ])
        .unwrap()
    }

    #[test]
    fn test_labels_parse() {
        assert_eq!(DepRole::from("sb"), DepRole::Subject);
        assert_eq!(DepRole::from("mnr"), DepRole::ObliqueNominal);
        assert_eq!(DepRole::from("nk"), DepRole::Other("nk".to_string()));
        assert!(!DepRole::from("ROOT").is_role_bearing());
        assert_eq!(PartOfSpeech::from("PROPN"), PartOfSpeech::ProperNoun);
        assert_eq!(PartOfSpeech::from("ADP").as_str(), "ADP");
    }

    #[test]
    fn test_head_and_children() {
        let sentence = sample();
        let hof = sentence.get(3).unwrap();
        assert_eq!(hof.head().text, "verkauft");

        let children: Vec<_> = hof.children().map(|t| t.text.clone()).collect();
        assert_eq!(children, vec!["einen", "zu"]);

        // the root governs itself but is not its own child
        let root = sentence.get(1).unwrap();
        assert_eq!(root.head().index(), 1);
        assert!(root.children().all(|t| t.index() != 1));
    }

    #[test]
    fn test_rejects_dangling_head() {
        let result = Sentence::new(vec![Token::new("Spital", "Spital", "NOUN", "sb", 4)]);
        assert!(matches!(result, Err(CharterError::InvalidSentence(_))));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"tokens": [
            {"text": "Spital", "lemma": "Spital", "pos": "NOUN", "dep": "sb", "head": 1},
            {"text": "kauft", "lemma": "kaufen", "pos": "VERB", "dep": "ROOT", "head": 1}
        ]}"#;
        let sentence = Sentence::from_json(json).unwrap();
        assert_eq!(sentence.len(), 2);
        assert_eq!(sentence.tokens()[0].dep, DepRole::Subject);
        assert_eq!(sentence.tokens()[1].pos, PartOfSpeech::Verb);

        let bad = r#"{"tokens": [{"text": "x", "lemma": "x", "pos": "X", "dep": "sb", "head": 7}]}"#;
        assert!(Sentence::from_json(bad).is_err());
    }

    #[test]
    fn test_parsed_charter_json() {
        let json = r#"{
            "charter_id": "SpAR Urk. 1",
            "abstract": "Spital kauft.",
            "sentence": {"tokens": []}
        }"#;
        let charter: ParsedCharter = serde_json::from_str(json).unwrap();
        assert_eq!(charter.summary, "Spital kauft.");
        assert!(charter.sentence.is_empty());
        assert!(charter.mom_id.is_none());
    }
}
