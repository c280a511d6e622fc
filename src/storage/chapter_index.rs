//! Chapter index for compressed (zText/zCom) modules.
//!
//! A compressed testament ships three files:
//! - `*.bzs`/`*.czs`: one 12-byte record per compressed block
//!   (int32 start, int32 compressed length, 4 bytes uncompressed length)
//! - `*.bzv`/`*.czv`: a 40-byte header, then 10-byte verse records
//!   (uint16 block number, 2 reserved bytes, uint32 start, uint16 length)
//!   walked book-major, chapter-major, verse-minor, with a 10-byte pad after
//!   each chapter and after each book
//! - `*.bzz`/`*.czz`: the compressed blocks themselves
//!
//! The verse table is walked in lockstep with the versification's verse
//! counts; each chapter records which block holds it, where it starts inside
//! the inflated block and the span of each verse.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::canon::{Canon, Testament};
use crate::storage::reader_helper::IndexCursor;
use crate::Result;

const BLOCK_RECORD_SIZE: u64 = 12;
const VERSE_TABLE_HEADER_SIZE: u64 = 40;
const VERSE_TABLE_PAD_SIZE: u64 = 10;

/// One compressed block as listed by the block table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockPosition {
    pub start: i32,
    pub length: i32,
    pub uncompressed_length: u32,
}

/// Span of one verse inside its chapter's inflated text.
///
/// `{0, 0}` marks a slot with no text written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersePosition {
    pub offset: u64,
    pub length: u64,
}

impl VersePosition {
    pub fn is_empty_slot(&self) -> bool {
        self.offset == 0 && self.length == 0
    }
}

/// Where one chapter lives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChapterIndexEntry {
    /// Absolute start of the compressed block holding the chapter
    pub block_start: u64,
    /// Compressed length of that block
    pub block_length: u64,
    /// Inflated length of that block, as recorded by the block table
    pub block_uncompressed_length: u64,
    /// Offset of the chapter's first verse inside the inflated block
    pub offset: u64,
    /// Bytes from the chapter's first verse to the end of its last one
    pub length: u64,
    /// One entry per verse of the chapter, relative to `offset`
    pub verses: Vec<VersePosition>,
}

impl ChapterIndexEntry {
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Verse span by 1-based verse number; out-of-range numbers have no span.
    pub fn verse(&self, verse: u32) -> Option<&VersePosition> {
        let index = verse.checked_sub(1)?;
        self.verses.get(index as usize)
    }
}

/// Book abbreviation → chapters, in canon order.
pub type BookChapterIndex = IndexMap<String, Vec<ChapterIndexEntry>>;

/// Reads every 12-byte record of a block table.
///
/// A trailing partial record is ignored.
pub fn read_block_positions(data: &[u8]) -> Result<Vec<BlockPosition>> {
    let mut reader = IndexCursor::new(data, "block table");
    let mut blocks = Vec::with_capacity((data.len() as u64 / BLOCK_RECORD_SIZE) as usize);
    while reader.remaining() >= BLOCK_RECORD_SIZE {
        let start = reader.read_i32()?;
        let length = reader.read_i32()?;
        let uncompressed_length = reader.read_u32()?;
        blocks.push(BlockPosition { start, length, uncompressed_length });
    }
    Ok(blocks)
}

/// Builds the chapter index of one testament.
///
/// Chapters whose verse count is 0 produce no entry and consume nothing from
/// the verse table. A book whose chapters are all empty is left out. A verse
/// recorded before its chapter's first verse is kept as an empty slot.
///
/// # Errors
///
/// - `CanonNotFound` if the scheme has no such testament
/// - `CorruptIndex` if the verse table ends before the canon does
pub fn build_chapter_index(
    verse_table: &[u8],
    blocks: &[BlockPosition],
    testament: Testament,
    versification: &str,
) -> Result<BookChapterIndex> {
    let book_infos = Canon::book_infos(versification, testament)?;
    let mut reader = IndexCursor::at(verse_table, "verse table", VERSE_TABLE_HEADER_SIZE);
    let mut index = BookChapterIndex::new();

    for (book, book_info) in book_infos {
        let mut chapters = Vec::with_capacity(book_info.max_chapter as usize);
        for &verse_max in &book_info.max_verses {
            if verse_max == 0 {
                continue;
            }
            chapters.push(read_chapter(&mut reader, blocks, verse_max, book)?);
            reader.skip(VERSE_TABLE_PAD_SIZE);
        }
        reader.skip(VERSE_TABLE_PAD_SIZE);

        if chapters.iter().all(ChapterIndexEntry::is_empty) {
            debug!("{} {}: no text, book dropped", testament, book);
            continue;
        }
        index.insert(book.clone(), chapters);
    }
    Ok(index)
}

fn read_chapter(
    reader: &mut IndexCursor,
    blocks: &[BlockPosition],
    verse_max: u32,
    book: &str,
) -> Result<ChapterIndexEntry> {
    let mut entry = ChapterIndexEntry {
        verses: Vec::with_capacity(verse_max as usize),
        ..Default::default()
    };
    let mut chapter_start = 0u64;
    let mut last_non_zero_start = 0u64;
    let mut length = 0u64;

    for verse in 0..verse_max {
        let block_number = reader.read_u16()?;
        reader.skip(2);
        let start = reader.read_u32()? as u64;
        length = reader.read_u16()? as u64;
        if start != 0 {
            last_non_zero_start = start;
        }

        if verse == 0 {
            chapter_start = start;
            entry.offset = start;
            if let Some(block) = blocks.get(block_number as usize) {
                entry.block_start = block.start.max(0) as u64;
                entry.block_length = block.length.max(0) as u64;
                entry.block_uncompressed_length = block.uncompressed_length as u64;
            }
        }

        if block_number == 0 && start == 0 && length == 0 {
            entry.verses.push(VersePosition::default());
        } else if let Some(offset) = start.checked_sub(chapter_start) {
            entry.verses.push(VersePosition { offset, length });
        } else {
            debug!(
                "verse table: {} verse {} starts at {} before its chapter start {}, left empty",
                book,
                verse + 1,
                start,
                chapter_start
            );
            entry.verses.push(VersePosition::default());
        }
    }

    entry.length = last_non_zero_start.saturating_sub(chapter_start) + length;
    Ok(entry)
}
