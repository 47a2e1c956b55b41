//! The card: a single typed note in the organizer.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Local, TimeZone, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::CardError;

/// The closed set of card categories.
///
/// Serialized with the display names the stored collections have always used,
/// so `NewKnowledge` round-trips as `"New Knowledge"`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum CardType {
    Person,
    Term,
    Event,
    #[default]
    Basic,
    #[serde(rename = "New Knowledge")]
    NewKnowledge,
    Action,
    Quote,
    Free,
}

impl CardType {
    /// Every card type, in sidebar order.
    pub const ALL: [CardType; 8] = [
        CardType::Person,
        CardType::Term,
        CardType::Event,
        CardType::Basic,
        CardType::NewKnowledge,
        CardType::Action,
        CardType::Quote,
        CardType::Free,
    ];

    /// Stored name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Person => "Person",
            CardType::Term => "Term",
            CardType::Event => "Event",
            CardType::Basic => "Basic",
            CardType::NewKnowledge => "New Knowledge",
            CardType::Action => "Action",
            CardType::Quote => "Quote",
            CardType::Free => "Free",
        }
    }

    /// Short label shown next to cards in listings.
    pub fn label(&self) -> &'static str {
        match self {
            CardType::Person => "人物卡",
            CardType::Term => "术语卡",
            CardType::Event => "事件卡",
            CardType::Basic => "基础卡",
            CardType::NewKnowledge => "新知卡",
            CardType::Action => "行动卡",
            CardType::Quote => "金句卡",
            CardType::Free => "自由卡",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = CardError;

    /// Accepts the stored name ("New Knowledge") or the CLI token ("new-knowledge"),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        CardType::ALL
            .into_iter()
            .find(|t| t.as_str().to_lowercase() == normalized)
            .ok_or_else(|| CardError::InvalidCardType {
                name: s.to_string(),
            })
    }
}

/// Represents a single card in our system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Minute-resolution timestamp id (`YYYYMMDDHHmm`)
    pub id: String,
    pub title: String,
    /// Markdown-flavored body
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub card_type: CardType,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Absent means the card sits in the Inbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Epoch milliseconds, fixed at creation; a stored entry without it takes `updated_at`
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds, refreshed on every save
    #[serde(default)]
    pub updated_at: i64,
}

impl Card {
    /// Creates a new, unsaved card stamped with the current time.
    pub fn new(title: String, content: String, card_type: CardType, tags: Vec<String>) -> Self {
        let now = Utc::now().timestamp_millis();

        Card {
            id: generate_card_id(),
            title,
            content,
            card_type,
            tags,
            folder_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the folder the card is filed into; `None` or an empty id means Inbox.
    pub fn with_folder(mut self, folder_id: Option<String>) -> Self {
        self.folder_id = folder_id.filter(|id| !id.is_empty());
        self
    }

    /// Whether the card has no folder reference.
    pub fn is_unfiled(&self) -> bool {
        self.folder_id.as_deref().map_or(true, str::is_empty)
    }

    /// Creation time as a local date-time, for display.
    pub fn created_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.created_at).single()
    }
}

/// Generates a card id from the current local time at minute granularity.
///
/// Two cards created within the same minute receive the same id.
pub fn generate_card_id() -> String {
    card_id_at(&Local::now())
}

/// Formats the card id for a given instant.
pub fn card_id_at<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    instant.format("%Y%m%d%H%M").to_string()
}
