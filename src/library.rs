//! In-memory card library: the card and folder collections plus the active view.
//!
//! All mutations go through here so the folder-reference invariant holds: a card's
//! `folder_id` names a live folder or is absent. Persisting the result is the
//! caller's job; see [`CardStore::save_library`](crate::CardStore::save_library).
use chrono::Utc;
use log::{debug, info, warn};

use crate::{
    add_unique_tags, validate_title, visible_cards, Card, CardCounts, CardError, CardType,
    Folder, FolderDeletion, Result, Scope, TypeFilter, UpsertOutcome, ViewState,
};

#[derive(Debug, Clone, Default)]
pub struct Library {
    cards: Vec<Card>,
    folders: Vec<Folder>,
    view: ViewState,
}

impl Library {
    /// Builds a library from loaded collections.
    ///
    /// A view whose scope names a folder that no longer exists is reset to Inbox.
    pub fn new(cards: Vec<Card>, folders: Vec<Folder>, view: ViewState) -> Self {
        let mut library = Self {
            cards,
            folders,
            view,
        };

        if let Scope::Folder(id) = &library.view.scope {
            if library.folder(id).is_none() {
                warn!("Stored scope points at missing folder {}, using Inbox", id);
                library.view.scope = Scope::Inbox;
            }
        }

        library
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Cards visible under the current view.
    pub fn visible(&self) -> Vec<&Card> {
        visible_cards(&self.cards, &self.view)
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Looks a folder up by id first, then by exact name.
    pub fn resolve_folder(&self, reference: &str) -> Option<&Folder> {
        self.folder(reference)
            .or_else(|| self.folders.iter().find(|f| f.name == reference))
    }

    /// Switches the active scope. Selecting a folder that does not exist is refused.
    pub fn select_scope(&mut self, scope: Scope) -> Result<()> {
        if let Scope::Folder(id) = &scope {
            if self.folder(id).is_none() {
                return Err(CardError::FolderNotFound { id: id.clone() });
            }
        }
        debug!("Selecting scope {:?}", scope);
        self.view.scope = scope;
        Ok(())
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        self.view.type_filter = filter;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.view.search = search.into();
    }

    /// Saves a card: replaces the entry with the same id, or inserts it at the front.
    ///
    /// Refuses a blank title without touching the collection. A new card is
    /// stamped with the current time; on edit the stored `created_at` wins over
    /// the incoming value. `updated_at` is always refreshed.
    pub fn save_card(&mut self, mut card: Card) -> Result<UpsertOutcome> {
        validate_title(&card.title)?;

        let now = Utc::now().timestamp_millis();
        card.updated_at = now;
        if card.folder_id.as_deref() == Some("") {
            card.folder_id = None;
        }

        match self.cards.iter().position(|c| c.id == card.id) {
            Some(index) => {
                card.created_at = self.cards[index].created_at;
                debug!("Replacing card {}", card.id);
                self.cards[index] = card;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                card.created_at = now;
                info!("Adding card {}", card.id);
                self.cards.insert(0, card);
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// Removes a card for good. Returns whether anything was removed.
    pub fn delete_card(&mut self, id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        let removed = self.cards.len() != before;
        if removed {
            info!("Deleted card {}", id);
        } else {
            debug!("No card {} to delete", id);
        }
        removed
    }

    /// Files a card into a folder, or back into the Inbox with `None`.
    pub fn move_card(&mut self, id: &str, folder_id: Option<String>) -> Result<()> {
        if let Some(folder_id) = &folder_id {
            if self.folder(folder_id).is_none() {
                return Err(CardError::FolderNotFound {
                    id: folder_id.clone(),
                });
            }
        }

        let mut card = self
            .card(id)
            .cloned()
            .ok_or_else(|| CardError::CardNotFound { id: id.to_string() })?;
        card.folder_id = folder_id;
        self.save_card(card).map(|_| ())
    }

    /// Adds tags not already present and drops the ones listed in `remove`.
    pub fn retag_card(&mut self, id: &str, add: &[String], remove: &[String]) -> Result<Card> {
        let mut card = self
            .card(id)
            .cloned()
            .ok_or_else(|| CardError::CardNotFound { id: id.to_string() })?;

        add_unique_tags(&mut card.tags, add);
        card.tags.retain(|tag| !remove.contains(tag));

        self.save_card(card.clone())?;
        Ok(card)
    }

    pub fn create_folder(&mut self, name: &str) -> Result<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CardError::EmptyFolderName);
        }

        let folder = Folder::new(name.to_string());
        info!("Created folder {} ({})", folder.name, folder.id);
        self.folders.push(folder.clone());
        Ok(folder)
    }

    pub fn rename_folder(&mut self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CardError::EmptyFolderName);
        }

        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| CardError::FolderNotFound { id: id.to_string() })?;
        folder.name = name.to_string();
        Ok(())
    }

    /// Clears the folder reference of every card filed into `folder_id`.
    ///
    /// Idempotent; returns how many cards were moved to the Inbox.
    pub fn unfile_cards(&mut self, folder_id: &str) -> usize {
        let mut count = 0;
        for card in self
            .cards
            .iter_mut()
            .filter(|c| c.folder_id.as_deref() == Some(folder_id))
        {
            card.folder_id = None;
            count += 1;
        }
        count
    }

    /// Drops the folder entry itself. Idempotent; returns whether it existed.
    pub fn remove_folder(&mut self, folder_id: &str) -> bool {
        let before = self.folders.len();
        self.folders.retain(|f| f.id != folder_id);
        self.folders.len() != before
    }

    /// Deletes a folder, moving its cards to the Inbox and resetting the scope
    /// if it pointed at the folder.
    ///
    /// Safe to repeat after a partial failure: every step converges.
    pub fn delete_folder(&mut self, folder_id: &str) -> FolderDeletion {
        let cards_unfiled = self.unfile_cards(folder_id);
        let folder_removed = self.remove_folder(folder_id);

        let scope_reset = self.view.scope.folder_id() == Some(folder_id);
        if scope_reset {
            self.view.scope = Scope::Inbox;
        }

        info!(
            "Deleted folder {} (removed: {}, cards moved to Inbox: {})",
            folder_id, folder_removed, cards_unfiled
        );

        FolderDeletion {
            folder_removed,
            cards_unfiled,
            scope_reset,
        }
    }

    /// Cards whose folder reference names no existing folder.
    ///
    /// These stay unreachable through normal navigation; they are reported, not repaired.
    pub fn orphaned_cards(&self) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|c| match c.folder_id.as_deref() {
                Some(id) if !id.is_empty() => self.folder(id).is_none(),
                _ => false,
            })
            .collect()
    }

    /// Total card count plus per-type counts over the whole collection.
    pub fn card_counts(&self) -> CardCounts {
        let by_type = CardType::ALL
            .into_iter()
            .map(|t| (t, self.cards.iter().filter(|c| c.card_type == t).count()))
            .collect();

        CardCounts {
            total: self.cards.len(),
            by_type,
        }
    }
}
