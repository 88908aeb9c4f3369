//! Subject merging
//!
//! Names such as "Rudger der Mulnar" are parsed as a proper noun followed by
//! a determiner and a noun. When the sentence opens with that shape, the
//! three tokens become the subject. The lookahead is fixed at three tokens.

use charter_core::{PartOfSpeech, Sentence};

/// Merge a sentence-initial `X DET NOUN` span into one subject name
pub fn merge_subject(subject: &str, sentence: &Sentence) -> String {
    match sentence.tokens() {
        [first, second, third, ..]
            if second.pos == PartOfSpeech::Determiner && third.pos == PartOfSpeech::Noun =>
        {
            format!("{} {} {}", first.text, second.text, third.text)
        }
        _ => subject.to_string(),
    }
}
