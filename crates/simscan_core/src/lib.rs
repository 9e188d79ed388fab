pub mod cache;
pub mod dbpf;
pub mod error;
pub mod reader;
pub mod refpack;
pub mod savegame;
pub mod sgi;
pub mod tray;
pub mod varint;
pub mod wire;

pub use cache::AnalysisCache;
pub use dbpf::ArchiveEntry;
pub use error::{CoreError, CoreErrorCode};
pub use savegame::{SaveAnalysis, SimRecord, analyze, analyze_with_cache};
pub use tray::TrayIndex;
pub use wire::{FieldMap, FieldValue};
