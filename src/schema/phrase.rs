//! Noun-phrase trees produced by the semantic-role parser
//!
//! A node without specifiers denotes a class (a generic concept); a node
//! with specifiers denotes an instance of that class, refined by them.
//!
//! The parser emits JSON in this shape:
//!
//! ```json
//! {
//!   "value": "cheile",
//!   "lemma": "cheie",
//!   "specifiers": [
//!     { "value": "mele", "lemma": "meu", "specifiers": [], "question": "whose" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relation a specifier holds to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecifierTag {
    /// Descriptive: "which" / "what kind of"
    #[serde(rename = "which/what-kind")]
    WhichKind,
    /// Possessive: "whose"
    #[serde(rename = "whose")]
    Whose,
}

impl SpecifierTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecifierTag::WhichKind => "which/what-kind",
            SpecifierTag::Whose => "whose",
        }
    }

    /// Parse a relation-question tag.
    ///
    /// Besides the canonical tags this accepts the Romanian dependency
    /// labels the parser model was trained with. Anything else is `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "which/what-kind" | "care" | "ce fel de" => Some(SpecifierTag::WhichKind),
            "whose" | "al cui" => Some(SpecifierTag::Whose),
            _ => None,
        }
    }
}

impl fmt::Display for SpecifierTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A noun phrase with its ordered specifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounPhrase {
    /// Surface text
    pub value: String,
    /// Canonical form; empty when the parser did not lemmatize
    #[serde(default)]
    pub lemma: String,
    /// Order-significant refinements
    #[serde(default)]
    pub specifiers: Vec<Specifier>,
}

/// A child noun phrase together with the question it answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifier {
    /// Raw relation-question tag, validated at compile time
    #[serde(alias = "relation_question", alias = "relation-question")]
    pub question: String,
    #[serde(flatten)]
    pub phrase: NounPhrase,
}

impl NounPhrase {
    /// Create a class-denoting phrase whose lemma equals its surface text
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            lemma: String::new(),
            specifiers: Vec::new(),
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = lemma.into();
        self
    }

    /// Append a specifier under a known tag
    pub fn with_specifier(self, tag: SpecifierTag, phrase: NounPhrase) -> Self {
        self.with_tagged_specifier(tag.as_str(), phrase)
    }

    /// Append a specifier under a raw tag, exactly as the parser would
    pub fn with_tagged_specifier(mut self, question: impl Into<String>, phrase: NounPhrase) -> Self {
        self.specifiers.push(Specifier {
            question: question.into(),
            phrase,
        });
        self
    }

    /// Canonical form, falling back to the surface text
    pub fn lemma(&self) -> &str {
        if self.lemma.trim().is_empty() {
            &self.value
        } else {
            &self.lemma
        }
    }

    pub fn is_class(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Parse a phrase from the parser's JSON output
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Specifier {
    pub fn tag(&self) -> Option<SpecifierTag> {
        SpecifierTag::parse(&self.question)
    }
}
