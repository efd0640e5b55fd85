//! clean-folder - sort a messy folder into category subfolders
//!
//! This library classifies files by extension into five fixed categories,
//! normalizes their names (transliteration plus character sanitization),
//! removes directories left empty and unpacks archives where they land.

pub mod archive;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod normalize;
pub mod output;
pub mod sorter;

pub use archive::{ArchiveUnpacker, UnpackOutcome, Unpacker};
pub use config::{CollisionPolicy, ConfigError, SortConfig};
pub use error::{SortError, SortResult};
pub use file_category::{Category, CategoryTable};
pub use normalize::normalize;
pub use sorter::{SortReport, Sorter, sort_folder};

pub use cli::{CleanCommand, run_cli};
