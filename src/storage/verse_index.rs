//! Per-verse index for raw (RawCom/RawText) modules.
//!
//! A raw testament ships a `.vss` table and the uncompressed text blob. The
//! table holds one record per canon slot: a two-record header, one record
//! before each book, one record before each chapter (zero-verse chapters
//! included), then one record per verse. Each record is a uint32 start into
//! the blob followed by a uint16 length (uint32 for the `4` drivers).

use log::debug;

use crate::canon::{verse_key, Canon, Testament};
use crate::storage::dict_index::{DictIndexEntry, KeyedIndex, LengthWidth};
use crate::storage::reader_helper::IndexCursor;
use crate::Result;

/// Builds the `Book.Chapter:Verse` keyed index of one testament.
///
/// Verses with a zero length are left out.
///
/// # Errors
///
/// - `CanonNotFound` if the scheme has no such testament
/// - `CorruptIndex` if the table ends before the canon does
pub fn build_verse_index(
    verse_table: &[u8],
    testament: Testament,
    versification: &str,
    width: LengthWidth,
) -> Result<KeyedIndex> {
    let record_size = width.record_size();
    let book_infos = Canon::book_infos(versification, testament)?;
    let mut reader = IndexCursor::at(verse_table, "verse table", record_size * 2);
    let mut index = KeyedIndex::new();

    for (book, book_info) in book_infos {
        reader.skip(record_size);
        for (chapter, &verse_max) in (1u32..).zip(&book_info.max_verses) {
            reader.skip(record_size);
            for verse in 1..=verse_max {
                let start = reader.read_u32()? as u64;
                let length = width.read_length(&mut reader)?;
                if length == 0 {
                    continue;
                }
                let key = verse_key(book, chapter, verse);
                index.insert(key.clone(), DictIndexEntry { start, length, key });
            }
        }
    }
    debug!("{} verse table: {} verses with text", testament, index.len());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SwordError;

    /// Short-record table for a whole testament; `record(book, chapter, verse)` gives each verse.
    fn verse_table<F>(testament: Testament, mut record: F) -> Vec<u8>
    where
        F: FnMut(&str, u32, u32) -> (u32, u16),
    {
        let mut table = vec![0u8; 12];
        for (book, info) in Canon::book_infos("kjv", testament).unwrap() {
            table.extend([0u8; 6]);
            for (chapter, &verse_max) in (1u32..).zip(&info.max_verses) {
                table.extend([0u8; 6]);
                for verse in 1..=verse_max {
                    let (start, length) = record(book.as_str(), chapter, verse);
                    table.extend(start.to_le_bytes());
                    table.extend(length.to_le_bytes());
                }
            }
        }
        table
    }

    #[test]
    fn test_only_verses_with_text_are_keyed() {
        let table = verse_table(Testament::Nt, |book, chapter, verse| match (book, chapter, verse) {
            ("John", 3, 16) => (0, 25),
            ("John", 3, 17) => (25, 0),
            ("Rev", 22, 21) => (25, 40),
            _ => (0, 0),
        });
        let index = build_verse_index(&table, Testament::Nt, "kjv", LengthWidth::Short).unwrap();

        assert_eq!(index.len(), 2);
        let entry = &index["John.3:16"];
        assert_eq!((entry.start, entry.length), (0, 25));
        assert_eq!(entry.key, "John.3:16");
        assert!(!index.contains_key("John.3:17"));
        assert_eq!(index["Rev.22:21"].start, 25);
    }

    #[test]
    fn test_long_records() {
        let mut table = vec![0u8; 16];
        for (_, info) in Canon::book_infos("kjv", Testament::Nt).unwrap() {
            table.extend([0u8; 8]);
            for &verse_max in &info.max_verses {
                table.extend([0u8; 8]);
                for _ in 0..verse_max {
                    table.extend(7u32.to_le_bytes());
                    table.extend(70_000u32.to_le_bytes());
                }
            }
        }
        let index = build_verse_index(&table, Testament::Nt, "kjv", LengthWidth::Long).unwrap();
        assert_eq!(index.len(), 7957);
        assert_eq!(index["Matt.1:1"].length, 70_000);
    }

    #[test]
    fn test_truncated_table_is_corrupt() {
        let table = verse_table(Testament::Nt, |_, _, _| (0, 1));
        let err = build_verse_index(&table[..table.len() - 3], Testament::Nt, "kjv", LengthWidth::Short)
            .unwrap_err();
        assert!(matches!(err, SwordError::CorruptIndex { .. }));
    }
}
