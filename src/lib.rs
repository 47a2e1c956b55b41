//! Card organizer library
//!
//! This library provides typed note cards filed into folders, the query engine
//! that derives the visible card list for a view, slot-based local persistence,
//! and document export for single cards.

mod card;
mod cli;
mod config;
mod errors;
mod export;
mod folder;
mod helper;
mod host;
mod library;
mod query;
mod storage;
mod types;

// Re-export key components
pub use card::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use export::*;
pub use folder::*;
pub use helper::*;
pub use host::*;
pub use library::*;
pub use query::*;
pub use storage::*;
pub use types::*;
