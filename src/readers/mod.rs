// Module loading and text retrieval
//
// This module turns a module archive into an immutable `SwordModule` and
// reads verse and entry text out of it.

pub mod module_loader;
pub mod sword_module;
mod text_retriever;

pub use module_loader::{load_module, load_module_file, load_reference_overlay};
pub use sword_module::{
    ChapterReferences, ModuleBlobs, ModuleInfo, ModuleType, ReferenceOverlay, SearchMode, SharedModule, SwordModule,
};
