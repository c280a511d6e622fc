//! A set of loaded modules, keyed by module name.
//!
//! # Examples
//!
//! ```no_run
//! use sword::library::{LibraryConfig, ModuleLibrary};
//!
//! # fn main() -> sword::Result<()> {
//! let config = LibraryConfig::from_json_file("library.json")?;
//! let library = ModuleLibrary::load(&config, None)?;
//! if let Some(kjv) = library.get("KJV") {
//!     println!("{:?}", kjv.render_text("Ps.23:1")?);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use log::{info, warn};

use super::library_config::LibraryConfig;
use crate::readers::{load_module_file, ModuleInfo, ModuleType, SharedModule};
use crate::utils::{scan_dir, ProgressReportFn, ProgressState};
use crate::{Result, SwordError};

/// Loaded modules in load order.
#[derive(Debug, Clone, Default)]
pub struct ModuleLibrary {
    modules: IndexMap<String, SharedModule>,
}

impl ModuleLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every archive found in the configured directories.
    ///
    /// An archive that fails to load is logged and skipped. A module name
    /// seen twice keeps the later archive.
    ///
    /// # Errors
    ///
    /// Fails if a directory cannot be walked, the file pattern does not
    /// compile, or the progress callback cancels the scan (`UserInterrupted`).
    pub fn load(config: &LibraryConfig, prog_rpt: Option<ProgressReportFn>) -> Result<Self> {
        let pattern = config.file_regex()?;
        let mut archives: Vec<(PathBuf, ModuleType)> = Vec::new();
        for (dir, module_type) in config.dirs() {
            for path in scan_dir(dir, &pattern, config.recursive)? {
                archives.push((path, module_type));
            }
        }

        let mut library = Self::new();
        let mut progress_state = ProgressState::new("ModuleLibrary::load", archives.len() as u64, 10, prog_rpt);
        for (i, (path, module_type)) in archives.iter().enumerate() {
            if let Err(e) = library.load_file(path, *module_type) {
                warn!("Skipping {}: {}", path.display(), e);
                progress_state.error_msg = e.to_string();
            }
            if progress_state.report(i as u64) {
                info!("Module library load cancelled by user");
                return Err(SwordError::user_interrupted());
            }
        }
        info!("Module library: {} modules from {} archives", library.len(), archives.len());
        Ok(library)
    }

    /// Loads one archive and adds it, returning the shared module.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P, module_type: ModuleType) -> Result<SharedModule> {
        let module = Arc::new(load_module_file(path, module_type)?);
        self.insert(module.clone());
        Ok(module)
    }

    /// Adds a module, replacing any module with the same name.
    pub fn insert(&mut self, module: SharedModule) -> Option<SharedModule> {
        let replaced = self.modules.insert(module.modname.clone(), module);
        if let Some(old) = &replaced {
            warn!("Module {} replaced", old.modname);
        }
        replaced
    }

    pub fn get(&self, modname: &str) -> Option<&SharedModule> {
        self.modules.get(modname)
    }

    pub fn remove(&mut self, modname: &str) -> Option<SharedModule> {
        self.modules.shift_remove(modname)
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    /// Modules of one type, in load order.
    pub fn of_type(&self, module_type: ModuleType) -> impl Iterator<Item = &SharedModule> {
        self.modules.values().filter(move |module| module.module_type == module_type)
    }

    pub fn infos(&self) -> Vec<ModuleInfo> {
        self.modules.values().map(|module| module.info()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
