//! Memory graph schema
//!
//! This module defines the vocabulary shared by the compiler and the stores:
//! the info-kind taxonomy, node labels and relation types, and the
//! noun-phrase trees the semantic-role parser hands us.

pub mod info_kind;
pub mod phrase;
pub mod relation;

pub use info_kind::{AttachStrategy, InfoKind};
pub use phrase::{NounPhrase, Specifier, SpecifierTag};
pub use relation::{NodeLabel, Relation};
