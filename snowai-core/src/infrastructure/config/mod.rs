// snowai-core/src/infrastructure/config/mod.rs

pub mod document;
pub mod loader;

pub use document::ConfigDocument;
pub use loader::{
    BUNDLED_DOCUMENT, ConfigOrigin, LoadOptions, LoadedDocument, discover, load_dir, load_file,
    load_str,
};
