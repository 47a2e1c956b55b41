//! Shared types for the cardos application.
//!
//! This module contains the Result alias, operation summaries, the theme
//! preference and the command-line subcommand definitions.
use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Args, Subcommand};

use crate::{CardError, CardType};

/// A specialized Result type for cardos operations.
pub type Result<T> = std::result::Result<T, CardError>;

/// Whether a save created a new card or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Summary of a folder deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderDeletion {
    /// Whether the folder entry still existed and was removed
    pub folder_removed: bool,
    /// Number of cards moved back to the Inbox
    pub cards_unfiled: usize,
    /// Whether the active scope pointed at the folder and went back to Inbox
    pub scope_reset: bool,
}

/// Card totals shown in the type sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardCounts {
    pub total: usize,
    pub by_type: Vec<(CardType, usize)>,
}

impl CardCounts {
    pub fn count(&self, card_type: CardType) -> usize {
        self.by_type
            .iter()
            .find(|(t, _)| *t == card_type)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Color theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = CardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CardError::InvalidTheme {
                value: other.to_string(),
            }),
        }
    }
}

/// Export document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Front-matter header followed by the raw content
    Markdown,
    /// Title heading followed by the content rendered to HTML
    Html,
}

/// Options for listing cards
#[derive(Args, Debug, Default)]
pub struct ListCardsOptions {
    /// Show cards filed into this folder (id or name) instead of the current scope
    #[clap(short, long, conflicts_with = "inbox")]
    pub folder: Option<String>,

    /// Show unfiled cards instead of the current scope
    #[clap(short, long)]
    pub inbox: bool,

    /// Only cards of this type ('all' for every type)
    #[clap(short = 't', long = "type")]
    pub card_type: Option<String>,

    /// Search text matched against title, content and tags
    #[clap(short, long)]
    pub search: Option<String>,

    /// Limit the number of cards shown (0 for no limit)
    #[clap(short = 'n', long, default_value_t = 0)]
    pub limit: usize,

    /// Format output as JSON
    #[clap(short, long)]
    pub json: bool,

    /// Show full content instead of a preview
    #[clap(short, long)]
    pub detailed: bool,
}

/// Options for editing a card
#[derive(Args, Debug, Default)]
pub struct EditCardOptions {
    /// ID of the card to edit
    pub id: String,

    /// New title for the card
    #[clap(short = 'T', long)]
    pub title: Option<String>,

    /// New content for the card
    #[clap(short, long)]
    pub content: Option<String>,

    /// Path to a file containing the new content
    #[clap(short, long)]
    pub file: Option<PathBuf>,

    /// Open the content in an editor
    #[clap(short, long)]
    pub edit: bool,

    /// New card type
    #[clap(long = "type", value_enum)]
    pub card_type: Option<CardType>,

    /// Tags to add (comma-separated)
    #[clap(long)]
    pub add_tags: Option<String>,

    /// Tags to remove (comma-separated)
    #[clap(long)]
    pub remove_tags: Option<String>,
}

/// Folder subcommands
#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    /// Create a new folder
    Create {
        /// Name of the folder
        name: String,
    },

    /// List folders with their card counts
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Rename a folder
    Rename {
        /// Folder id or current name
        folder: String,

        /// New name
        name: String,
    },

    /// Delete a folder; its cards move to the Inbox
    Delete {
        /// Folder id or name
        folder: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },
}

/// Available subcommands for the cardos application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new card
    New {
        /// Title of the card
        #[clap(short = 'T', long)]
        title: String,

        /// Content of the card, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Card type
        #[clap(short = 'y', long = "type", value_enum, default_value_t = CardType::Basic)]
        card_type: CardType,

        /// Tags to attach (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Folder (id or name) to file the card into; Inbox when omitted
        #[clap(short = 'F', long)]
        folder: Option<String>,

        /// Path to a file containing the card's content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// View a card by ID
    View {
        /// ID of the card to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List the cards of the current view
    List(ListCardsOptions),

    /// Edit an existing card
    Edit(EditCardOptions),

    /// Delete a card by ID
    Delete {
        /// ID of the card to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Tag operations (add, remove, list)
    Tag {
        /// ID of the card to modify
        id: String,

        /// Tags to add (comma-separated)
        #[clap(short, long)]
        add: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(short, long)]
        remove: Option<String>,

        /// List all tags of the card
        #[clap(short, long)]
        list: bool,
    },

    /// File a card into a folder, or back into the Inbox when no folder is given
    Move {
        /// ID of the card to move
        id: String,

        /// Destination folder id or name
        folder: Option<String>,
    },

    /// Folder management
    #[clap(subcommand)]
    Folder(FolderCommands),

    /// Select the folder scope (Inbox when no folder is given)
    Scope {
        /// Folder id or name
        folder: Option<String>,
    },

    /// Select the card type filter
    Filter {
        /// Card type, or 'all'
        card_type: String,
    },

    /// Export a card to a document file
    Export {
        /// ID of the card to export
        id: String,

        /// Directory to write the document into (current directory by default)
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Document format
        #[clap(short, long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
    },

    /// Print a card through the configured print command
    Print {
        /// ID of the card to print
        id: String,
    },

    /// Share a card's text, or copy it to the clipboard
    Share {
        /// ID of the card to share
        id: String,
    },

    /// Show or change the color theme
    Theme {
        /// 'light' or 'dark'
        value: Option<String>,

        /// Switch to the other theme
        #[clap(short, long, conflicts_with = "value")]
        toggle: bool,
    },

    /// List cards whose folder no longer exists
    Orphans {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
