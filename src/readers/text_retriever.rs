//! Slicing and decoding text out of a module's blobs.
//!
//! Compressed modules store a book's chapters in blocks; a chapter is read by
//! inflating its block, then slicing each verse relative to the chapter's
//! offset inside the inflated block. Raw and dictionary modules slice the
//! blob directly.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use super::sword_module::SwordModule;
use crate::canon::{verse_key, Canon, ParsedReference, Testament};
use crate::storage::{decode_bytes_to_string, ChapterIndexEntry, PositionTable};
use crate::utils::{get_decompressor, Decompressor};
use crate::{Result, SwordError};

/// Retrieves text for one batch of requests.
///
/// Inflated blocks are cached for the lifetime of the retriever, so chapters
/// sharing a block in one batch inflate it once.
pub(crate) struct TextRetriever<'a> {
    module: &'a SwordModule,
    decompressor: Box<dyn Decompressor>,
    blocks: HashMap<(Testament, u64), Vec<u8>>,
}

impl<'a> TextRetriever<'a> {
    pub(crate) fn new(module: &'a SwordModule) -> Self {
        Self {
            module,
            decompressor: get_decompressor(module.compression),
            blocks: HashMap::new(),
        }
    }

    /// Appends the text of every requested verse, keyed `Book.Chapter:Verse`.
    pub(crate) fn bible_text(&mut self, reference: &ParsedReference, texts: &mut IndexMap<String, String>) -> Result<()> {
        match self.module.positions.as_ref() {
            PositionTable::Compressed { .. } => self.compressed_text(reference, texts),
            PositionTable::RawVerse { .. } => self.raw_verse_text(reference, texts),
            PositionTable::FlatDict { .. } => Err(SwordError::invalid_parameter(format!(
                "{} is a dictionary, look up headwords instead of {}.{}",
                self.module.modname, reference.book, reference.chapter
            ))),
        }
    }

    /// Appends the entry for a headword; absent headwords add nothing.
    pub(crate) fn dict_text(&self, key: &str, texts: &mut IndexMap<String, String>) -> Result<()> {
        let (Some(entries), Some(data)) = (self.module.positions.dict_entries(), self.module.blobs.dict.as_ref()) else {
            return Err(SwordError::invalid_parameter(format!(
                "{} has no dictionary index",
                self.module.modname
            )));
        };
        if let Some(bytes) = entries.get(key).and_then(|entry| entry.slice(data)) {
            texts.insert(key.to_string(), decode_bytes_to_string(bytes, self.module.encoding));
        }
        Ok(())
    }

    fn compressed_text(&mut self, reference: &ParsedReference, texts: &mut IndexMap<String, String>) -> Result<()> {
        let module = self.module;
        let book = reference.book.as_str();
        let (testament, chapters) = module
            .positions
            .book_chapters(book)
            .ok_or_else(|| SwordError::reference_not_found(format!("{}.{}", book, reference.chapter)))?;
        let chapter = chapter_slot(&module.versification, book, reference.chapter)
            .and_then(|slot| chapters.get(slot))
            .ok_or_else(|| SwordError::chapter_not_found(book, reference.chapter))?;

        let inflated = self.inflated_block(testament, chapter, book, reference.chapter)?;
        for &verse in &reference.verses {
            // verses past what the module encodes resolve to empty text
            let position = chapter.verse(verse).copied().unwrap_or_default();
            let start = chapter.offset + position.offset;
            let text = slice_window(inflated, start, position.length)
                .map(|bytes| decode_bytes_to_string(bytes, module.encoding))
                .ok_or_else(|| {
                    SwordError::decompression_error(format!(
                        "{}.{}:{} lies outside its {}-byte inflated block",
                        book,
                        reference.chapter,
                        verse,
                        inflated.len()
                    ))
                })?;
            texts.insert(verse_key(book, reference.chapter, verse), text);
        }
        Ok(())
    }

    fn inflated_block(
        &mut self,
        testament: Testament,
        chapter: &ChapterIndexEntry,
        book: &str,
        chapter_number: u32,
    ) -> Result<&[u8]> {
        let module = self.module;
        let inflated = match self.blocks.entry((testament, chapter.block_start)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let blob = module.blobs.testament(testament).ok_or_else(|| {
                    SwordError::incomplete_module(format!("{} has no {} text blob", module.modname, testament))
                })?;
                let window = slice_window(blob, chapter.block_start, chapter.block_length).ok_or_else(|| {
                    SwordError::decompression_error(format!(
                        "{}.{}: block {}+{} lies outside the {}-byte {} blob",
                        book,
                        chapter_number,
                        chapter.block_start,
                        chapter.block_length,
                        blob.len(),
                        testament
                    ))
                })?;
                let inflated = self
                    .decompressor
                    .decompress(window, chapter.block_uncompressed_length as usize)?;
                debug!(
                    "{} {}: inflated block at {} to {} bytes",
                    module.modname,
                    testament,
                    chapter.block_start,
                    inflated.len()
                );
                entry.insert(inflated)
            }
        };
        Ok(inflated.as_slice())
    }

    fn raw_verse_text(&self, reference: &ParsedReference, texts: &mut IndexMap<String, String>) -> Result<()> {
        let module = self.module;
        let mut found = 0usize;
        for &verse in &reference.verses {
            let key = reference.verse_key(verse);
            let Some((testament, entry)) = module.positions.verse_entry(&key) else {
                continue;
            };
            let blob = module.blobs.testament(testament).ok_or_else(|| {
                SwordError::incomplete_module(format!("{} has no {} text blob", module.modname, testament))
            })?;
            let bytes = entry.slice(blob).ok_or_else(|| {
                SwordError::corrupt_index(format!(
                    "{}: {}+{} lies outside the {}-byte {} blob",
                    key,
                    entry.start,
                    entry.length,
                    blob.len(),
                    testament
                ))
            })?;
            texts.insert(key, decode_bytes_to_string(bytes, module.encoding));
            found += 1;
        }
        if found == 0 && !module.positions.has_book(&reference.book) {
            return Err(SwordError::reference_not_found(format!("{}.{}", reference.book, reference.chapter)));
        }
        Ok(())
    }
}

/// Position of a chapter in a book's chapter index.
///
/// Chapters with no verses in the versification have no index entry, so the
/// slot is the count of populated chapters before it.
fn chapter_slot(versification: &str, book: &str, chapter: u32) -> Option<usize> {
    let index = chapter.checked_sub(1)? as usize;
    match Canon::book_info(versification, book) {
        Ok(info) => {
            let counts = info.max_verses.get(..=index)?;
            if counts[index] == 0 {
                return None;
            }
            Some(counts[..index].iter().filter(|&&count| count > 0).count())
        }
        Err(_) => Some(index),
    }
}

fn slice_window(data: &[u8], start: u64, length: u64) -> Option<&[u8]> {
    let start = usize::try_from(start).ok()?;
    let end = start.checked_add(usize::try_from(length).ok()?)?;
    data.get(start..end)
}
