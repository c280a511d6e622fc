// Versification data and reference parsing
//
// This module holds the bundled canon tables and the parser that turns a
// textual reference into book, chapter and verse numbers.

pub mod canon_table;
pub mod osis_ref;

pub use canon_table::{BookInfo, Canon, CanonScheme, Testament};
pub use osis_ref::{ParsedReference, step_lemma, verse_key};
