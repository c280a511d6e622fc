// Module libraries
//
// This module scans configured directories for module archives and keeps
// the loaded modules by name.

pub mod library_config;
pub mod module_library;

pub use library_config::{DEFAULT_FILE_PATTERN, LibraryConfig};
pub use module_library::ModuleLibrary;
