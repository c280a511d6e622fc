// Conf parsing and position tables
//
// This module parses module descriptors and builds the in-memory indexes
// that map references and headwords to byte windows in a module's blobs.

pub mod conf;
pub mod reader_helper;
pub mod chapter_index;
pub mod verse_index;
pub mod dict_index;
pub mod position_table;

pub use conf::{ConfValue, ModuleConf};
pub use reader_helper::{IndexCursor, decode_bytes_to_string, resolve_encoding};
pub use chapter_index::{BlockPosition, BookChapterIndex, ChapterIndexEntry, VersePosition, build_chapter_index, read_block_positions};
pub use verse_index::build_verse_index;
pub use dict_index::{DictIndexEntry, KeyedIndex, LengthWidth, build_dict_index};
pub use position_table::{Driver, PositionTable};
