//! Keyed index for flat dictionaries (RawLD/RawLD4).
//!
//! The `.idx` file is a flat run of fixed-size records pointing into the
//! `.dat` blob. Each pointed-to region starts with the entry's headword on
//! its own line; the entry text follows the line terminator.

use encoding_rs::Encoding;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::storage::reader_helper::{decode_bytes_to_string, IndexCursor};
use crate::Result;

/// Byte window of one keyed entry inside a blob.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DictIndexEntry {
    pub start: u64,
    pub length: u64,
    /// `Book.Chapter:Verse` for per-verse commentaries, the headword for dictionaries
    pub key: String,
}

impl DictIndexEntry {
    /// The entry's bytes, `None` if the window lies outside `blob`.
    pub fn slice<'a>(&self, blob: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.start).ok()?;
        let end = start.checked_add(usize::try_from(self.length).ok()?)?;
        blob.get(start..end)
    }
}

/// Key → entry, in index order.
pub type KeyedIndex = IndexMap<String, DictIndexEntry>;

/// Width of the length field in a raw index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthWidth {
    /// uint16 length: 6-byte records (RawLD, RawCom, RawText)
    Short,
    /// uint32 length: 8-byte records (RawLD4, RawCom4, RawText4)
    #[default]
    Long,
}

impl LengthWidth {
    pub fn record_size(&self) -> u64 {
        match self {
            LengthWidth::Short => 6,
            LengthWidth::Long => 8,
        }
    }

    pub(crate) fn read_length(&self, reader: &mut IndexCursor) -> Result<u64> {
        match self {
            LengthWidth::Short => Ok(reader.read_u16()? as u64),
            LengthWidth::Long => Ok(reader.read_u32()? as u64),
        }
    }
}

/// Builds the headword index of a flat dictionary.
///
/// Records whose window does not fit inside `data`, whose text has no line
/// terminator, or whose headword is blank are skipped. A later record with
/// the same headword replaces an earlier one.
pub fn build_dict_index(
    index_table: &[u8],
    data: &[u8],
    width: LengthWidth,
    encoding: &'static Encoding,
) -> Result<KeyedIndex> {
    let mut reader = IndexCursor::new(index_table, "dictionary index");
    let mut index = KeyedIndex::new();
    let mut skipped = 0usize;

    while reader.remaining() >= width.record_size() {
        let start = reader.read_u32()? as u64;
        let length = width.read_length(&mut reader)?;
        let window = DictIndexEntry { start, length, key: String::new() };
        let Some(bytes) = window.slice(data) else {
            skipped += 1;
            continue;
        };
        let Some((key, key_line_length)) = split_key_line(bytes, encoding) else {
            skipped += 1;
            continue;
        };
        index.insert(
            key.clone(),
            DictIndexEntry {
                start: start + key_line_length,
                length: length - key_line_length,
                key,
            },
        );
    }
    if skipped > 0 {
        debug!("dictionary index: skipped {} records without a keyed entry", skipped);
    }
    Ok(index)
}

/// Splits the first line off an entry: the trimmed key and the byte length of
/// the key line including its `\n`, `\r` or `\r\n` terminator.
fn split_key_line(bytes: &[u8], encoding: &'static Encoding) -> Option<(String, u64)> {
    let end = bytes.iter().position(|&b| b == b'\r' || b == b'\n')?;
    let terminator = if bytes[end] == b'\r' && bytes.get(end + 1) == Some(&b'\n') { 2 } else { 1 };
    let key = decode_bytes_to_string(&bytes[..end], encoding).trim().to_string();
    if key.is_empty() {
        return None;
    }
    Some((key, (end + terminator) as u64))
}
