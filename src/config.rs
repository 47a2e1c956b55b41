use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{CardError, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the card, folder, theme and view slots
    pub data_dir: PathBuf,

    /// Default editor command
    pub editor_command: Option<String>,

    /// Command that receives the printable document path as its last argument
    pub print_command: Option<String>,

    /// Command that receives the shared text on stdin; clipboard is used when unset
    pub share_command: Option<String>,

    /// How long the "Copied!" confirmation stays on screen, in milliseconds
    pub share_confirmation_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".cardos"));

        Self {
            data_dir,
            editor_command: None,
            print_command: None,
            share_command: None,
            share_confirmation_ms: 2000,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cardos")
}

impl Config {
    /// Location of the config file when `--config` is not given.
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("cardos.json"))
    }

    /// Loads the config file, falling back to defaults when it is missing or unreadable.
    pub fn load(path: &Path) -> Config {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Config::default();
        }

        match fs::read_to_string(path)
            .map_err(CardError::from)
            .and_then(|raw| serde_json::from_str::<Config>(&raw).map_err(CardError::from))
        {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable config file {}: {}",
                    path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|_| CardError::DirectoryError {
                    path: parent.to_path_buf(),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| CardError::ConfigError {
            message: format!("cannot write {}: {}", path.display(), e),
        })?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            // Try common Linux editors
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }

    /// Print command with the platform default as fallback.
    pub fn get_print_command(&self) -> String {
        if let Some(command) = &self.print_command {
            return command.clone();
        }

        if cfg!(windows) {
            "notepad /p".to_string()
        } else {
            "lpr".to_string()
        }
    }
}
