//! Error types for the cardos application.
//!
//! This module defines custom error types that categorize the failures
//! that can occur while managing cards and folders.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the cardos application.
#[derive(Error, Debug)]
pub enum CardError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Card was not found when performing an operation.
    #[error("Card not found: {id}")]
    CardNotFound { id: String },

    /// Folder was not found when performing an operation.
    #[error("Folder not found: {id}")]
    FolderNotFound { id: String },

    /// A card cannot be saved without a title.
    #[error("Card title cannot be empty")]
    EmptyTitle,

    /// A folder cannot be created or renamed to an empty name.
    #[error("Folder name cannot be empty")]
    EmptyFolderName,

    /// Unknown card type name.
    #[error("Invalid card type: {name}")]
    InvalidCardType { name: String },

    /// Invalid theme value.
    #[error("Invalid theme: {value} (expected 'light' or 'dark')")]
    InvalidTheme { value: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },

    /// Clipboard, share or print facility failed.
    #[error("{facility} failed: {message}")]
    HostFacility { facility: String, message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
