//! Driver selection and the per-driver position table.
//!
//! A module's `ModDrv` picks one of three on-disk layouts. The layout is
//! resolved once at load time into a [`Driver`] and the matching
//! [`PositionTable`] variant, so retrieval never has to sniff which index it
//! was given.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canon::Testament;
use crate::readers::ModuleType;
use crate::storage::chapter_index::{BookChapterIndex, ChapterIndexEntry};
use crate::storage::dict_index::{DictIndexEntry, KeyedIndex, LengthWidth};
use crate::{Result, SwordError};

/// Module drivers this crate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Driver {
    ZText,
    ZCom,
    RawText,
    RawCom,
    RawText4,
    RawCom4,
    RawLD,
    RawLD4,
}

impl Driver {
    /// Resolves a conf `ModDrv` for a module of the given type.
    ///
    /// Dictionaries and morphologies without a `ModDrv` are read as `RawLD4`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedDriver` for unknown drivers, for a bible without a
    /// driver and for a driver that does not fit the module type.
    pub fn for_module(mod_drv: Option<&str>, module_type: ModuleType) -> Result<Self> {
        let driver = match mod_drv.map(str::trim) {
            None | Some("") if module_type.is_keyed() => return Ok(Driver::RawLD4),
            None | Some("") => return Err(SwordError::unsupported_driver("<none>")),
            Some(name) => Self::from_name(name)?,
        };
        if driver.is_flat_dict() != module_type.is_keyed() {
            return Err(SwordError::unsupported_driver(format!(
                "{} for a {} module",
                driver, module_type
            )));
        }
        Ok(driver)
    }

    /// Driver by its conf name, compared case-insensitively.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "ztext" => Ok(Driver::ZText),
            "zcom" => Ok(Driver::ZCom),
            "rawtext" => Ok(Driver::RawText),
            "rawcom" => Ok(Driver::RawCom),
            "rawtext4" => Ok(Driver::RawText4),
            "rawcom4" => Ok(Driver::RawCom4),
            "rawld" => Ok(Driver::RawLD),
            "rawld4" => Ok(Driver::RawLD4),
            _ => Err(SwordError::unsupported_driver(name)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::ZText => "zText",
            Driver::ZCom => "zCom",
            Driver::RawText => "RawText",
            Driver::RawCom => "RawCom",
            Driver::RawText4 => "RawText4",
            Driver::RawCom4 => "RawCom4",
            Driver::RawLD => "RawLD",
            Driver::RawLD4 => "RawLD4",
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Driver::ZText | Driver::ZCom)
    }

    pub fn is_raw_verse(&self) -> bool {
        matches!(self, Driver::RawText | Driver::RawCom | Driver::RawText4 | Driver::RawCom4)
    }

    pub fn is_flat_dict(&self) -> bool {
        matches!(self, Driver::RawLD | Driver::RawLD4)
    }

    /// Width of the length field in raw index records.
    pub fn length_width(&self) -> LengthWidth {
        match self {
            Driver::RawText | Driver::RawCom | Driver::RawLD => LengthWidth::Short,
            _ => LengthWidth::Long,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built index of a module, one variant per driver family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionTable {
    /// zText/zCom: book → chapters, per testament
    Compressed { ot: BookChapterIndex, nt: BookChapterIndex },
    /// RawCom/RawText: `Book.Chapter:Verse` → window, per testament
    RawVerse { ot: KeyedIndex, nt: KeyedIndex },
    /// RawLD/RawLD4: headword → window
    FlatDict { entries: KeyedIndex },
}

impl PositionTable {
    /// The chapters of a book and the testament holding them, new testament first.
    pub fn book_chapters(&self, book: &str) -> Option<(Testament, &[ChapterIndexEntry])> {
        match self {
            PositionTable::Compressed { ot, nt } => nt
                .get(book)
                .map(|chapters| (Testament::Nt, chapters.as_slice()))
                .or_else(|| ot.get(book).map(|chapters| (Testament::Ot, chapters.as_slice()))),
            _ => None,
        }
    }

    /// A per-verse entry and the testament holding it.
    pub fn verse_entry(&self, key: &str) -> Option<(Testament, &DictIndexEntry)> {
        match self {
            PositionTable::RawVerse { ot, nt } => nt
                .get(key)
                .map(|entry| (Testament::Nt, entry))
                .or_else(|| ot.get(key).map(|entry| (Testament::Ot, entry))),
            _ => None,
        }
    }

    /// Whether any testament of a verse-keyed table has the book.
    pub fn has_book(&self, book: &str) -> bool {
        match self {
            PositionTable::Compressed { ot, nt } => nt.contains_key(book) || ot.contains_key(book),
            PositionTable::RawVerse { ot, nt } => {
                let prefix = format!("{}.", book);
                nt.keys().chain(ot.keys()).any(|key| key.starts_with(&prefix))
            }
            PositionTable::FlatDict { .. } => false,
        }
    }

    pub fn dict_entries(&self) -> Option<&KeyedIndex> {
        match self {
            PositionTable::FlatDict { entries } => Some(entries),
            _ => None,
        }
    }

    /// Books (compressed), verses (raw) or headwords (dictionary) indexed.
    pub fn len(&self) -> usize {
        match self {
            PositionTable::Compressed { ot, nt } => ot.len() + nt.len(),
            PositionTable::RawVerse { ot, nt } => ot.len() + nt.len(),
            PositionTable::FlatDict { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_resolution() {
        assert_eq!(Driver::for_module(Some("zText"), ModuleType::Bible).unwrap(), Driver::ZText);
        assert_eq!(Driver::for_module(Some("RawCom4"), ModuleType::Bible).unwrap(), Driver::RawCom4);
        assert_eq!(Driver::for_module(None, ModuleType::Dictionary).unwrap(), Driver::RawLD4);
        assert_eq!(Driver::for_module(Some("RawLD"), ModuleType::Morphology).unwrap(), Driver::RawLD);
        assert_eq!(Driver::RawLD.length_width(), LengthWidth::Short);
        assert_eq!(Driver::RawCom4.length_width(), LengthWidth::Long);

        for (mod_drv, module_type) in [
            (Some("zLD"), ModuleType::Dictionary),
            (Some("HREFCom"), ModuleType::Bible),
            (None, ModuleType::Bible),
            (Some("RawLD4"), ModuleType::Bible),
            (Some("zCom"), ModuleType::Dictionary),
        ] {
            let err = Driver::for_module(mod_drv, module_type).unwrap_err();
            assert!(matches!(err, SwordError::UnsupportedDriver { .. }), "{:?}", mod_drv);
        }
    }

    #[test]
    fn test_new_testament_is_checked_first() {
        let mut ot = KeyedIndex::new();
        ot.insert("Gen.1:1".into(), DictIndexEntry { start: 0, length: 3, key: "Gen.1:1".into() });
        let table = PositionTable::RawVerse { ot, nt: KeyedIndex::new() };
        assert_eq!(table.verse_entry("Gen.1:1").map(|(t, _)| t), Some(Testament::Ot));
        assert!(table.verse_entry("Gen.1:2").is_none());
        assert!(table.has_book("Gen"));
        assert!(!table.has_book("Ge"));
        assert_eq!(table.len(), 1);

        let mut nt = BookChapterIndex::new();
        nt.insert("Jude".into(), vec![ChapterIndexEntry::default()]);
        let table = PositionTable::Compressed { ot: BookChapterIndex::new(), nt };
        assert_eq!(table.book_chapters("Jude").map(|(t, c)| (t, c.len())), Some((Testament::Nt, 1)));
        assert!(table.dict_entries().is_none());
    }
}
