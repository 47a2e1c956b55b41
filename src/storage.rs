//! Keyed slot persistence for cards, folders, the theme and the last view.
//!
//! Each slot is a single file under the data directory, always rewritten whole.
//! Loading is best-effort: a missing or malformed slot reads as its default.
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, info, trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{Card, CardError, Folder, Library, Result, Theme, ViewState};

/// The independently persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Cards,
    Folders,
    Theme,
    View,
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Cards => "cardos_data",
            Slot::Folders => "cardos_folders",
            Slot::Theme => "cardos_theme",
            Slot::View => "cardos_view",
        }
    }

    fn file_name(&self) -> String {
        match self {
            Slot::Theme => self.key().to_string(),
            _ => format!("{}.json", self.key()),
        }
    }
}

/// Manages the on-disk slots of the card library.
#[derive(Debug, Clone)]
pub struct CardStore {
    data_dir: PathBuf,
}

impl CardStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing a slot
    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.data_dir.join(slot.file_name())
    }

    /// Reads a slot's raw text; `None` when the file is absent or unreadable.
    fn read_slot(&self, slot: Slot) -> Option<String> {
        let path = self.slot_path(slot);
        if !path.exists() {
            debug!("Slot {} not found at {}", slot.key(), path.display());
            return None;
        }

        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) => {
                error!("Failed to read slot {}: {}", path.display(), e);
                None
            }
        }
    }

    fn load_json<T: DeserializeOwned + Default>(&self, slot: Slot) -> T {
        let Some(raw) = self.read_slot(slot) else {
            return T::default();
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                trace!("Loaded slot {}", slot.key());
                value
            }
            Err(e) => {
                error!(
                    "Slot {} holds malformed data, treating it as empty: {}",
                    slot.key(),
                    e
                );
                T::default()
            }
        }
    }

    /// Decodes a list slot entry by entry, so one bad entry costs only itself.
    fn load_entries<T: DeserializeOwned>(&self, slot: Slot) -> Vec<T> {
        let entries: Vec<serde_json::Value> = self.load_json(slot);
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping entry {} of slot {}: {}", index, slot.key(), e);
                    None
                }
            })
            .collect()
    }

    pub fn load_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.load_entries(Slot::Cards);
        for card in cards.iter_mut().filter(|c| c.created_at == 0) {
            card.created_at = card.updated_at;
        }
        debug!("Loaded {} cards", cards.len());
        cards
    }

    pub fn load_folders(&self) -> Vec<Folder> {
        let folders: Vec<Folder> = self.load_entries(Slot::Folders);
        debug!("Loaded {} folders", folders.len());
        folders
    }

    pub fn load_view(&self) -> ViewState {
        self.load_json(Slot::View)
    }

    pub fn load_theme(&self) -> Theme {
        match self.read_slot(Slot::Theme) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }),
            None => Theme::default(),
        }
    }

    /// Loads every slot into a library.
    pub fn load_library(&self) -> Library {
        Library::new(self.load_cards(), self.load_folders(), self.load_view())
    }

    /// Replaces a slot's content with an atomic rename, so an interrupted write
    /// leaves the previous value intact.
    fn write_slot(&self, slot: Slot, contents: &str) -> Result<()> {
        if !self.data_dir.exists() {
            debug!("Creating data directory: {}", self.data_dir.display());
            fs::create_dir_all(&self.data_dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                CardError::DirectoryError {
                    path: self.data_dir.clone(),
                }
            })?;
        }

        let file_path = self.slot_path(slot);
        let mut temp_file = NamedTempFile::new_in(&self.data_dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            CardError::Io(e)
        })?;

        temp_file.write_all(contents.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            CardError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            CardError::Io(e)
        })?;

        temp_file.persist(&file_path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                file_path.display(),
                e.error
            );
            CardError::Io(e.error)
        })?;

        trace!("Slot {} written to {}", slot.key(), file_path.display());
        Ok(())
    }

    fn save_json<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            error!("Failed to serialize slot {}: {}", slot.key(), e);
            CardError::Serialization(e)
        })?;
        self.write_slot(slot, &json)
    }

    pub fn save_cards(&self, cards: &[Card]) -> Result<()> {
        self.save_json(Slot::Cards, cards)?;
        debug!("Saved {} cards", cards.len());
        Ok(())
    }

    pub fn save_folders(&self, folders: &[Folder]) -> Result<()> {
        self.save_json(Slot::Folders, folders)?;
        debug!("Saved {} folders", folders.len());
        Ok(())
    }

    pub fn save_view(&self, view: &ViewState) -> Result<()> {
        self.save_json(Slot::View, view)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.write_slot(Slot::Theme, &theme.to_string())?;
        info!("Theme set to {}", theme);
        Ok(())
    }

    /// Writes the cards, folders and view of a library, in that order.
    ///
    /// Cards go first: if the folder write is lost after a folder deletion, the
    /// folder merely reappears empty and deleting it again converges.
    pub fn save_library(&self, library: &Library) -> Result<()> {
        self.save_cards(library.cards())?;
        self.save_folders(library.folders())?;
        self.save_view(library.view())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{CardType, Scope, TypeFilter};

    fn store() -> (TempDir, CardStore) {
        let dir = TempDir::new().unwrap();
        let store = CardStore::new(dir.path().join("data"));
        (dir, store)
    }

    #[test]
    fn empty_store_loads_defaults() {
        let (_dir, store) = store();
        assert!(store.load_cards().is_empty());
        assert!(store.load_folders().is_empty());
        assert_eq!(store.load_theme(), Theme::Light);
        assert_eq!(store.load_view(), ViewState::default());
    }

    #[test]
    fn malformed_slots_read_as_empty() {
        let (_dir, store) = store();
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(store.slot_path(Slot::Cards), "[{\"id\": ").unwrap();
        fs::write(store.slot_path(Slot::Folders), "42").unwrap();
        fs::write(store.slot_path(Slot::Theme), "purple").unwrap();

        assert!(store.load_cards().is_empty());
        assert!(store.load_folders().is_empty());
        assert_eq!(store.load_theme(), Theme::Light);
    }

    #[test]
    fn library_survives_save_and_load() {
        let (_dir, store) = store();
        let mut library = Library::default();
        let folder = library.create_folder("Reading").unwrap();
        let card = Card::new("Hello".into(), "body".into(), CardType::Quote, vec!["a".into()])
            .with_folder(Some(folder.id.clone()));
        library.save_card(card.clone()).unwrap();
        library.select_scope(Scope::Folder(folder.id.clone())).unwrap();
        library.set_type_filter(TypeFilter::Only(CardType::Quote));
        library.set_search("not persisted");

        store.save_library(&library).unwrap();
        let loaded = store.load_library();

        assert_eq!(loaded.folders(), library.folders());
        assert_eq!(loaded.cards(), library.cards());
        assert_eq!(loaded.view().scope, Scope::Folder(folder.id));
        assert_eq!(loaded.view().type_filter, TypeFilter::Only(CardType::Quote));
        assert!(loaded.view().search.is_empty());
    }

    #[test]
    fn bad_card_entry_costs_only_itself() {
        let (_dir, store) = store();
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(
            store.slot_path(Slot::Cards),
            r#"[
                {"id": "1", "title": "Kept", "type": "Quote", "createdAt": 5, "updatedAt": 7},
                {"id": "2", "title": "No times", "type": "Basic"},
                {"id": "3", "title": "Only updated", "updatedAt": 9},
                {"title": 42}
            ]"#,
        )
        .unwrap();

        let cards = store.load_cards();
        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(cards[0].created_at, 5);
        assert_eq!(cards[1].created_at, 0);
        assert_eq!(cards[2].created_at, 9);
        assert_eq!(cards[2].card_type, CardType::Basic);
    }

    #[test]
    fn theme_is_stored_as_plain_text() {
        let (_dir, store) = store();
        store.save_theme(Theme::Dark).unwrap();
        assert_eq!(
            fs::read_to_string(store.slot_path(Slot::Theme)).unwrap(),
            "dark"
        );
        assert_eq!(store.load_theme(), Theme::Dark);
    }

    #[test]
    fn cards_written_in_stored_shape() {
        let (_dir, store) = store();
        let mut card = Card::new("T".into(), String::new(), CardType::Basic, Vec::new());
        card.id = "202501011200".into();
        store.save_cards(&[card]).unwrap();

        let raw = fs::read_to_string(store.slot_path(Slot::Cards)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], "202501011200");
        assert_eq!(value[0]["type"], "Basic");
        assert!(value[0]["createdAt"].is_i64());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (_dir, store) = store();
        store.save_cards(&[]).unwrap();
        store.save_folders(&[]).unwrap();

        for entry in fs::read_dir(store.data_dir()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(name.starts_with("cardos_"), "unexpected file {}", name);
        }
    }
}
