//! Loaded SWORD module: conf, blobs and position table.
//!
//! A [`SwordModule`] is built once by the loader and never mutated. Blobs
//! and indexes sit behind `Arc`, so cloning a module or sharing it between
//! threads copies no text.
//!
//! # Examples
//!
//! ```no_run
//! use sword::readers::{load_module_file, ModuleType};
//!
//! # fn main() -> sword::Result<()> {
//! let kjv = load_module_file("KJV.zip", ModuleType::Bible)?;
//! for (reference, text) in kjv.render_text("John.3:16-17")? {
//!     println!("{}: {}", reference, text);
//! }
//!
//! let strongs = load_module_file("StrongsGreek.zip", ModuleType::Dictionary)?;
//! let entry = strongs.render_text("G0026")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::text_retriever::TextRetriever;
use crate::canon::{Canon, ParsedReference, Testament};
use crate::storage::{decode_bytes_to_string, Driver, ModuleConf, PositionTable};
use crate::utils::CompressionMethod;
use crate::{Result, SwordError};

/// What a module holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Bible,
    Dictionary,
    Morphology,
}

impl ModuleType {
    /// Dictionaries and morphologies are addressed by headword, not by reference.
    pub fn is_keyed(&self) -> bool {
        !matches!(self, ModuleType::Bible)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Bible => "bible",
            ModuleType::Dictionary => "dictionary",
            ModuleType::Morphology => "morphology",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = SwordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bible" => Ok(ModuleType::Bible),
            "dictionary" => Ok(ModuleType::Dictionary),
            "morphology" => Ok(ModuleType::Morphology),
            _ => Err(SwordError::invalid_parameter(format!("Unknown module type: {}", s))),
        }
    }
}

/// Chapter → verse → occurrence count.
pub type ChapterReferences = IndexMap<u32, IndexMap<u32, u64>>;

/// Lemma → book → chapter → verse → occurrence count.
pub type ReferenceOverlay = IndexMap<String, IndexMap<String, ChapterReferences>>;

/// How [`SwordModule::search_dictionary`] matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Headwords starting with the query
    #[default]
    Prefix,
    /// Headwords or entry text containing the query
    Substring,
}

/// Raw text blobs of a module.
#[derive(Debug, Clone, Default)]
pub struct ModuleBlobs {
    pub ot: Option<Arc<[u8]>>,
    pub nt: Option<Arc<[u8]>>,
    pub dict: Option<Arc<[u8]>>,
}

impl ModuleBlobs {
    pub fn testament(&self, testament: Testament) -> Option<&Arc<[u8]>> {
        match testament {
            Testament::Ot => self.ot.as_ref(),
            Testament::Nt => self.nt.as_ref(),
        }
    }
}

/// Serializable summary of a loaded module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub modname: String,
    pub module_type: ModuleType,
    pub driver: Driver,
    pub description: Option<String>,
    pub versification: String,
    pub encoding: String,
    /// Books (compressed), verses (raw) or headwords (dictionary) indexed
    pub entries: usize,
    pub has_references: bool,
}

/// An immutable, loaded module.
#[derive(Debug, Clone)]
pub struct SwordModule {
    pub modname: String,
    pub module_type: ModuleType,
    pub conf: ModuleConf,
    pub driver: Driver,
    pub blobs: ModuleBlobs,
    pub positions: Arc<PositionTable>,
    pub encoding: &'static Encoding,
    pub compression: CompressionMethod,
    /// Lower-cased versification scheme name
    pub versification: String,
    pub references: Option<Arc<ReferenceOverlay>>,
}

/// Module handle shared across threads.
pub type SharedModule = Arc<SwordModule>;

impl SwordModule {
    pub fn info(&self) -> ModuleInfo {
        ModuleInfo {
            modname: self.modname.clone(),
            module_type: self.module_type,
            driver: self.driver,
            description: self.conf.description().map(str::to_string),
            versification: self.versification.clone(),
            encoding: self.encoding.name().to_string(),
            entries: self.positions.len(),
            has_references: self.references.is_some(),
        }
    }

    /// A copy of this module carrying a reference overlay.
    pub fn with_references(&self, references: ReferenceOverlay) -> Self {
        Self {
            references: Some(Arc::new(references)),
            ..self.clone()
        }
    }

    /// Text for one reference (bibles) or one headword (dictionaries).
    ///
    /// Results are keyed `Book.Chapter:Verse` in the order the verses were
    /// requested; dictionary results are keyed by the literal headword.
    ///
    /// # Errors
    ///
    /// Reference parsing errors, `ReferenceNotFound`, `ChapterNotFound`, or
    /// `DecompressionError` when the chapter's block is corrupt.
    pub fn render_text(&self, reference: &str) -> Result<IndexMap<String, String>> {
        self.render_texts(&[reference])
    }

    /// Text for a batch of references or headwords.
    ///
    /// Each compressed block is inflated at most once per call, however many
    /// of its chapters are requested.
    pub fn render_texts<S: AsRef<str>>(&self, references: &[S]) -> Result<IndexMap<String, String>> {
        let mut retriever = TextRetriever::new(self);
        let mut texts = IndexMap::new();
        for reference in references {
            let reference = reference.as_ref();
            if self.module_type.is_keyed() {
                retriever.dict_text(reference, &mut texts)?;
            } else {
                let parsed = ParsedReference::parse(reference, &self.versification)?;
                retriever.bible_text(&parsed, &mut texts)?;
            }
        }
        Ok(texts)
    }

    /// Scans a dictionary's headwords (and, for substring searches, entry
    /// text) case-insensitively. Matches keep index order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for modules without a flat dictionary index.
    pub fn search_dictionary(&self, query: &str, mode: SearchMode) -> Result<IndexMap<String, String>> {
        let (entries, data) = match (self.positions.dict_entries(), self.blobs.dict.as_ref()) {
            (Some(entries), Some(data)) => (entries, data),
            _ => {
                return Err(SwordError::invalid_parameter(format!(
                    "{} is not a dictionary module",
                    self.modname
                )));
            }
        };
        let query = query.to_lowercase();
        let mut results = IndexMap::new();
        for (key, entry) in entries {
            let Some(bytes) = entry.slice(data) else {
                continue;
            };
            let key_matches = match mode {
                SearchMode::Prefix => key.to_lowercase().starts_with(&query),
                SearchMode::Substring => key.to_lowercase().contains(&query),
            };
            if key_matches {
                results.insert(key.clone(), decode_bytes_to_string(bytes, self.encoding));
            } else if mode == SearchMode::Substring {
                let text = decode_bytes_to_string(bytes, self.encoding);
                if text.to_lowercase().contains(&query) {
                    results.insert(key.clone(), text);
                }
            }
        }
        Ok(results)
    }

    /// Books referencing a lemma, in canon order of this module's versification.
    ///
    /// Books the versification does not know come last. `None` without an
    /// overlay or for an unlisted lemma.
    pub fn lemma_references(&self, lemma: &str) -> Option<Vec<(&str, &ChapterReferences)>> {
        let books = self.references.as_ref()?.get(lemma)?;
        let mut sorted: Vec<(&str, &ChapterReferences)> =
            books.iter().map(|(book, chapters)| (book.as_str(), chapters)).collect();
        sorted.sort_by_key(|(book, _)| {
            Canon::book_index(&self.versification, book)
                .ok()
                .flatten()
                .unwrap_or(usize::MAX)
        });
        Some(sorted)
    }
}
