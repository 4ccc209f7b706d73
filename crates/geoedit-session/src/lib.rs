//! Editing session for geoedit: the document store every view binds to,
//! its persistence, the toolbar commands and the view projections.

pub mod commands;
pub mod storage;
mod store;
pub mod views;

pub use commands::{ImportError, ImportSummary};
pub use storage::{default_data_dir, FileStore, KeyValueStore, MemoryStore, PERSISTENCE_KEY};
pub use store::{DocumentStore, Snapshot, StoreEvent, TextState};
