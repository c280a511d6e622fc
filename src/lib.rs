//! # sword - SWORD Bible and Dictionary Module Reader
//!
//! This crate reads SWORD modules: zipped Bibles, commentaries, dictionaries
//! and morphology lexicons made of a `.conf` descriptor, binary index tables
//! and (optionally compressed) text blobs.
//!
//! ## Features
//!
//! - **Compressed texts**: zText/zCom modules with ZIP, BZIP2 or XZ blocks
//! - **Raw texts**: RawText/RawCom per-verse modules, 2- and 4-byte lengths
//! - **Dictionaries**: RawLD/RawLD4 headword lookup and search
//! - **Versification**: bundled KJV and NRSV canon tables and reference parsing
//! - **Libraries**: scan directories of archives into a module set
//!
//! ## Quick Start
//!
//! ```no_run
//! use sword::{load_module_file, ModuleType};
//!
//! # fn main() -> sword::Result<()> {
//! let kjv = load_module_file("KJV.zip", ModuleType::Bible)?;
//! for (reference, text) in kjv.render_text("Gen.1:1-3")? {
//!     println!("{}: {}", reference, text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Canon**: [`canon`] versification tables and reference parsing
//! - **Storage & index tables**: [`storage`] conf parsing and position-table builders
//! - **Reader modules**: [`readers`] archive loading and text retrieval
//! - **Libraries**: [`library`] directory scanning and configuration
//! - **Utilities**: [`utils`] decompression, I/O and progress reporting
//!
//! ## Error Handling
//!
//! All fallible operations return a [`Result<T>`] type, where errors are represented by
//! [`SwordError`]. The crate uses the `snafu` library for ergonomic error handling with
//! context and backtraces.
//!
//! ```
//! use sword::{Result, SwordError};
//!
//! fn example() -> Result<String> {
//!     Err(SwordError::malformed_reference("Gen"))
//! }
//! assert!(example().unwrap_err().is_reference_error());
//! ```

pub mod canon;
pub mod error;
pub mod library;
pub mod readers;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use canon::{Canon, ParsedReference, Testament};
pub use library::{LibraryConfig, ModuleLibrary};
pub use readers::{
    load_module, load_module_file, load_reference_overlay, ModuleInfo, ModuleType, SearchMode, SharedModule,
    SwordModule,
};
pub use storage::{Driver, ModuleConf, PositionTable};

// Re-export error types for convenience
pub use error::{SwordError, Result, snafu};
