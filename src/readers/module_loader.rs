//! Loading module archives.
//!
//! A SWORD module is distributed as a zip archive holding one `.conf`
//! descriptor plus the index tables and text blobs of its driver. Entries
//! are classified by file name, the conf picks the driver, and the matching
//! position table is built eagerly. Text blocks are not inflated until they
//! are read.
//!
//! | Driver                  | Entries                                  |
//! |-------------------------|------------------------------------------|
//! | zText, zCom             | `ot.bzs` `ot.bzv` `ot.bzz` (and `nt.*`; `c` for commentaries) |
//! | RawText, RawCom (and 4) | `ot.vss` `ot` (and `nt.*`)               |
//! | RawLD, RawLD4           | `*.idx` `*.dat`                          |

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use zip::result::ZipError;
use zip::ZipArchive;

use super::sword_module::{ModuleBlobs, ModuleType, ReferenceOverlay, SwordModule};
use crate::canon::Testament;
use crate::storage::{
    build_chapter_index, build_dict_index, build_verse_index, read_block_positions, resolve_encoding,
    BookChapterIndex, Driver, KeyedIndex, ModuleConf, PositionTable,
};
use crate::utils::compression::preallocation;
use crate::utils::{bytes_from_file, windows_path_to_unix_path, CompressionMethod};
use crate::{Result, SwordError};

static COMPRESSED_TABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(nt|ot)\.[bc]z([sv])$").expect("static pattern compiles"));
static COMPRESSED_BLOB_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(nt|ot)\.\w+$").expect("static pattern compiles"));
static RAW_TABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(nt|ot)\.vss$").expect("static pattern compiles"));
static RAW_BLOB_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(nt|ot)$").expect("static pattern compiles"));
static DICT_INDEX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.idx$").expect("static pattern compiles"));
static DICT_DATA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.dat$").expect("static pattern compiles"));
static OVERLAY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\.json$").expect("static pattern compiles"));

/// What an archive entry is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EntryRole {
    BlockTable(Testament),
    VerseTable(Testament),
    TestamentBlob(Testament),
    DictIndex,
    DictData,
}

/// Archive entries sorted into the roles a driver needs.
#[derive(Debug, Default)]
struct ClassifiedEntries {
    entries: IndexMap<EntryRole, Vec<u8>>,
}

impl ClassifiedEntries {
    fn classify(files: IndexMap<String, Vec<u8>>, driver: Driver) -> Self {
        let mut classified = Self::default();
        for (name, bytes) in files {
            let file_name = name.rsplit('/').next().unwrap_or(&name);
            match classify_entry(file_name, driver) {
                Some(role) => {
                    debug!("{}: {:?}", name, role);
                    if classified.entries.insert(role, bytes).is_some() {
                        warn!("{}: another entry already had role {:?}, using the later one", name, role);
                    }
                }
                None => debug!("{}: ignored", name),
            }
        }
        classified
    }

    fn take(&mut self, role: EntryRole) -> Option<Vec<u8>> {
        self.entries.shift_remove(&role)
    }
}

fn testament_of(name: &str) -> Testament {
    if name[..2].eq_ignore_ascii_case("nt") {
        Testament::Nt
    } else {
        Testament::Ot
    }
}

fn classify_entry(file_name: &str, driver: Driver) -> Option<EntryRole> {
    if driver.is_compressed() {
        if let Some(captures) = COMPRESSED_TABLE_PATTERN.captures(file_name) {
            let testament = testament_of(&captures[1]);
            return Some(if captures[2].eq_ignore_ascii_case("s") {
                EntryRole::BlockTable(testament)
            } else {
                EntryRole::VerseTable(testament)
            });
        }
        COMPRESSED_BLOB_PATTERN
            .captures(file_name)
            .map(|captures| EntryRole::TestamentBlob(testament_of(&captures[1])))
    } else if driver.is_raw_verse() {
        if let Some(captures) = RAW_TABLE_PATTERN.captures(file_name) {
            return Some(EntryRole::VerseTable(testament_of(&captures[1])));
        }
        RAW_BLOB_PATTERN
            .captures(file_name)
            .map(|captures| EntryRole::TestamentBlob(testament_of(&captures[1])))
    } else if DICT_INDEX_PATTERN.is_match(file_name) {
        Some(EntryRole::DictIndex)
    } else if DICT_DATA_PATTERN.is_match(file_name) {
        Some(EntryRole::DictData)
    } else {
        None
    }
}

/// Reads every file entry of a zip archive, keyed by its `/`-separated name.
fn unzip_entries(archive: &[u8]) -> Result<IndexMap<String, Vec<u8>>> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let mut files = IndexMap::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = windows_path_to_unix_path(entry.name());
        let mut bytes = Vec::with_capacity(preallocation(entry.compressed_size() as usize, entry.size()));
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| SwordError::from(ZipError::Io(e)))?;
        files.insert(name, bytes);
    }
    Ok(files)
}

/// Loads a module from the bytes of its zip archive.
///
/// # Errors
///
/// - `Archive` if the bytes are not a readable zip
/// - `ConfNotFound`, `ModuleNameMissing` or `MalformedConf` for a bad descriptor
/// - `UnsupportedDriver` for drivers or block compressions this crate cannot read
/// - `IncompleteModule` if a file the driver needs is missing
/// - `CanonNotFound` or `CorruptIndex` if an index cannot be built
pub fn load_module(archive: &[u8], module_type: ModuleType) -> Result<SwordModule> {
    let mut files = unzip_entries(archive)?;

    let conf_names: Vec<String> = files.keys().filter(|name| name.contains(".conf")).cloned().collect();
    let conf_name = conf_names.first().ok_or_else(SwordError::conf_not_found)?;
    if conf_names.len() > 1 {
        warn!("Archive has {} conf files, using {}", conf_names.len(), conf_name);
    }
    let conf_bytes = files.shift_remove(conf_name).unwrap_or_default();
    let (modname, conf) = ModuleConf::parse_bytes(&conf_bytes)?;
    let modname = modname.ok_or_else(SwordError::module_name_missing)?;
    files.retain(|name, _| !name.contains(".conf"));

    let driver = Driver::for_module(conf.mod_drv(), module_type)?;
    let encoding = resolve_encoding(conf.encoding());
    let versification = conf.versification();
    let compression = if driver.is_compressed() {
        CompressionMethod::from_conf_label(conf.compress_type())?
    } else {
        CompressionMethod::default()
    };
    debug!("{}: driver {}, encoding {}, versification {}", modname, driver, encoding.name(), versification);

    let mut entries = ClassifiedEntries::classify(files, driver);
    let mut blobs = ModuleBlobs::default();
    let positions = if driver.is_flat_dict() {
        let index = entries
            .take(EntryRole::DictIndex)
            .ok_or_else(|| SwordError::incomplete_module(format!("{}: no .idx index", modname)))?;
        let data = entries
            .take(EntryRole::DictData)
            .ok_or_else(|| SwordError::incomplete_module(format!("{}: no .dat blob", modname)))?;
        let dict_entries = build_dict_index(&index, &data, driver.length_width(), encoding)?;
        blobs.dict = Some(Arc::from(data));
        PositionTable::FlatDict { entries: dict_entries }
    } else if driver.is_compressed() {
        let ot = build_compressed_testament(&mut entries, Testament::Ot, &versification, &modname)?;
        let nt = build_compressed_testament(&mut entries, Testament::Nt, &versification, &modname)?;
        if ot.is_none() && nt.is_none() {
            return Err(SwordError::incomplete_module(format!("{}: no verse table for either testament", modname)));
        }
        PositionTable::Compressed {
            ot: keep_blob(ot, &mut blobs.ot),
            nt: keep_blob(nt, &mut blobs.nt),
        }
    } else {
        let ot = build_raw_testament(&mut entries, driver, Testament::Ot, &versification, &modname)?;
        let nt = build_raw_testament(&mut entries, driver, Testament::Nt, &versification, &modname)?;
        if ot.is_none() && nt.is_none() {
            return Err(SwordError::incomplete_module(format!("{}: no verse table for either testament", modname)));
        }
        PositionTable::RawVerse {
            ot: keep_blob(ot, &mut blobs.ot),
            nt: keep_blob(nt, &mut blobs.nt),
        }
    };

    info!("Loaded {} module {} ({}, {} entries)", module_type, modname, driver, positions.len());
    Ok(SwordModule {
        modname,
        module_type,
        conf,
        driver,
        blobs,
        positions: Arc::new(positions),
        encoding,
        compression,
        versification,
        references: None,
    })
}

/// Moves a testament's blob into the module and returns its index.
fn keep_blob<T: Default>(built: Option<(T, Vec<u8>)>, slot: &mut Option<Arc<[u8]>>) -> T {
    match built {
        Some((index, blob)) => {
            *slot = Some(Arc::from(blob));
            index
        }
        None => T::default(),
    }
}

fn incomplete(modname: &str, testament: Testament, what: &str) -> SwordError {
    SwordError::incomplete_module(format!("{}: {} has no {}", modname, testament, what))
}

/// Builds one compressed testament; `None` if the archive does not carry it.
fn build_compressed_testament(
    entries: &mut ClassifiedEntries,
    testament: Testament,
    versification: &str,
    modname: &str,
) -> Result<Option<(BookChapterIndex, Vec<u8>)>> {
    let verse_table = entries.take(EntryRole::VerseTable(testament));
    let block_table = entries.take(EntryRole::BlockTable(testament));
    if verse_table.is_none() && block_table.is_none() {
        return Ok(None);
    }
    let verse_table = verse_table.ok_or_else(|| incomplete(modname, testament, "verse table"))?;
    let block_table = block_table.ok_or_else(|| incomplete(modname, testament, "block table"))?;
    let blob = entries
        .take(EntryRole::TestamentBlob(testament))
        .ok_or_else(|| incomplete(modname, testament, "text blob"))?;
    let blocks = read_block_positions(&block_table)?;
    let index = build_chapter_index(&verse_table, &blocks, testament, versification)?;
    Ok(Some((index, blob)))
}

/// Builds one raw per-verse testament; `None` if the archive does not carry it.
fn build_raw_testament(
    entries: &mut ClassifiedEntries,
    driver: Driver,
    testament: Testament,
    versification: &str,
    modname: &str,
) -> Result<Option<(KeyedIndex, Vec<u8>)>> {
    let Some(verse_table) = entries.take(EntryRole::VerseTable(testament)) else {
        return Ok(None);
    };
    let blob = entries
        .take(EntryRole::TestamentBlob(testament))
        .ok_or_else(|| incomplete(modname, testament, "text blob"))?;
    let index = build_verse_index(&verse_table, testament, versification, driver.length_width())?;
    Ok(Some((index, blob)))
}

/// Reads a module archive from disk and loads it.
pub fn load_module_file<P: AsRef<Path>>(path: P, module_type: ModuleType) -> Result<SwordModule> {
    let path = path.as_ref();
    debug!("Loading {} module from {}", module_type, path.display());
    let archive = bytes_from_file(path)?;
    load_module(&archive, module_type)
}

/// Returns a copy of `module` carrying the lemma cross references stored in
/// an overlay archive.
///
/// The overlay is the first top-level `<name>.json` entry, shaped
/// lemma → book → chapter → verse → count.
///
/// # Errors
///
/// `Archive` for an unreadable zip, `IncompleteModule` without a JSON entry,
/// `ParserError` if the JSON does not have that shape.
pub fn load_reference_overlay(module: &SwordModule, archive: &[u8]) -> Result<SwordModule> {
    let files = unzip_entries(archive)?;
    let (name, json) = files
        .iter()
        .find(|(name, _)| OVERLAY_PATTERN.is_match(name))
        .ok_or_else(|| SwordError::incomplete_module("reference overlay has no top-level .json entry"))?;
    let overlay: ReferenceOverlay = serde_json::from_slice(json)?;
    info!("{}: {} lemmas from overlay {}", module.modname, overlay.len(), name);
    Ok(module.with_references(overlay))
}
