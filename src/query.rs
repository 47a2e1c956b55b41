//! Card query engine.
//!
//! Reduces the full card collection to the ordered set visible for a given
//! navigational state. The folder scope and the type filter always both apply;
//! choosing "all types" never widens the folder scope.
use std::{fmt, str::FromStr};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{Card, CardError, CardType};

/// The active folder selection.
///
/// Inbox and the individual folders partition the collection: every card is
/// visible under exactly one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Scope {
    /// Cards without a folder reference
    #[default]
    Inbox,
    /// Cards filed into the folder with this id
    Folder(String),
}

impl Scope {
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            Scope::Inbox => None,
            Scope::Folder(id) => Some(id),
        }
    }

    /// Whether a card falls inside this scope.
    pub fn contains(&self, card: &Card) -> bool {
        match self {
            Scope::Inbox => card.is_unfiled(),
            Scope::Folder(id) if id.is_empty() => card.is_unfiled(),
            Scope::Folder(id) => card.folder_id.as_deref() == Some(id.as_str()),
        }
    }
}

impl From<Option<String>> for Scope {
    fn from(folder_id: Option<String>) -> Self {
        match folder_id {
            Some(id) if !id.is_empty() => Scope::Folder(id),
            _ => Scope::Inbox,
        }
    }
}

impl From<Scope> for Option<String> {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Inbox => None,
            Scope::Folder(id) => Some(id),
        }
    }
}

/// Type filter of the sidebar: everything, or one card type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeFilter {
    #[default]
    All,
    Only(CardType),
}

impl TypeFilter {
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(card_type) => card.card_type == *card_type,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("ALL"),
            TypeFilter::Only(card_type) => write!(f, "{}", card_type),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(TypeFilter::All)
        } else {
            s.parse().map(TypeFilter::Only)
        }
    }
}

impl TryFrom<String> for TypeFilter {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeFilter> for String {
    fn from(filter: TypeFilter) -> Self {
        filter.to_string()
    }
}

/// Everything the query engine needs besides the cards themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(rename = "currentFolderId", default)]
    pub scope: Scope,
    #[serde(default)]
    pub type_filter: TypeFilter,
    /// Free text; never persisted
    #[serde(skip)]
    pub search: String,
}

impl ViewState {
    pub fn new(scope: Scope, type_filter: TypeFilter, search: impl Into<String>) -> Self {
        Self {
            scope,
            type_filter,
            search: search.into(),
        }
    }
}

/// Case-insensitive whole-needle substring match against title, content or any tag.
///
/// A query that is empty after trimming matches every card. The needle itself is
/// not trimmed, so surrounding spaces take part in the match.
pub fn matches_search(card: &Card, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }

    let needle = query.to_lowercase();
    card.title.to_lowercase().contains(&needle)
        || card.content.to_lowercase().contains(&needle)
        || card
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Computes the visible cards for a view, newest first.
///
/// Pure and total: the input is never modified and an empty collection yields an
/// empty result. Cards sharing a `created_at` come out in unspecified order.
pub fn visible_cards<'a>(cards: &'a [Card], view: &ViewState) -> Vec<&'a Card> {
    let mut result: Vec<&Card> = cards
        .iter()
        .filter(|card| view.scope.contains(card))
        .filter(|card| view.type_filter.matches(card))
        .filter(|card| matches_search(card, &view.search))
        .collect();

    result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    trace!(
        "Query {:?}/{}/{:?} selected {} of {} cards",
        view.scope,
        view.type_filter,
        view.search,
        result.len(),
        cards.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn card(id: &str, card_type: CardType, folder: Option<&str>, created_at: i64) -> Card {
        Card {
            id: id.to_string(),
            title: format!("Card {}", id),
            content: String::new(),
            card_type,
            tags: Vec::new(),
            folder_id: folder.map(str::to_string),
            created_at,
            updated_at: created_at,
        }
    }

    fn ids(cards: &[&Card]) -> Vec<String> {
        cards.iter().map(|c| c.id.clone()).collect()
    }

    fn scenario() -> Vec<Card> {
        vec![
            card("A", CardType::Basic, None, 100),
            card("B", CardType::Person, Some("f1"), 200),
            card("C", CardType::Basic, None, 300),
        ]
    }

    fn mixed() -> Vec<Card> {
        let mut cards = scenario();
        cards.push(card("D", CardType::Quote, Some("f2"), 150));
        cards.push(card("E", CardType::Basic, Some("f1"), 250));
        cards.push(card("F", CardType::Person, Some(""), 50));
        cards.push(card("G", CardType::Free, Some("gone"), 400));
        cards
    }

    #[test]
    fn inbox_lists_unfiled_cards_newest_first() {
        let cards = scenario();
        let view = ViewState::default();
        assert_eq!(ids(&visible_cards(&cards, &view)), vec!["C", "A"]);
    }

    #[test]
    fn type_filter_applies_inside_folder_scope() {
        let cards = scenario();

        let basic = ViewState::new(Scope::Inbox, TypeFilter::Only(CardType::Basic), "");
        assert_eq!(ids(&visible_cards(&cards, &basic)), vec!["C", "A"]);

        let person = ViewState::new(Scope::Inbox, TypeFilter::Only(CardType::Person), "");
        assert!(visible_cards(&cards, &person).is_empty());
    }

    #[test]
    fn folder_scope_selects_filed_cards() {
        let cards = scenario();
        let view = ViewState::new(Scope::Folder("f1".into()), TypeFilter::All, "");
        assert_eq!(ids(&visible_cards(&cards, &view)), vec!["B"]);
    }

    #[test]
    fn search_matches_title_content_and_tags() {
        let mut hello = card("H", CardType::Basic, None, 1);
        hello.title = "Hello".into();
        let mut world = card("W", CardType::Basic, None, 2);
        world.title = "Note".into();
        world.content = "world".into();
        let mut tagged = card("T", CardType::Basic, None, 3);
        tagged.title = "Plain".into();
        tagged.tags = vec!["Spelling".into()];

        assert!(matches_search(&hello, "ell"));
        assert!(matches_search(&hello, "HELLO"));
        assert!(!matches_search(&world, "ell"));
        assert!(matches_search(&world, "WOR"));
        assert!(matches_search(&tagged, "ell"));
    }

    #[test]
    fn blank_search_is_a_no_op() {
        let cards = scenario();
        let view = ViewState::new(Scope::Inbox, TypeFilter::All, "   ");
        assert_eq!(ids(&visible_cards(&cards, &view)), vec!["C", "A"]);
    }

    #[test]
    fn search_needle_keeps_surrounding_spaces() {
        let mut hello = card("H", CardType::Basic, None, 1);
        hello.title = "Hello".into();
        assert!(!matches_search(&hello, " ell"));
    }

    #[test]
    fn scopes_partition_the_collection() {
        let cards = mixed();
        let mut scopes = vec![Scope::Inbox];
        scopes.extend(["f1", "f2", "gone"].map(|id| Scope::Folder(id.to_string())));

        let mut seen = HashSet::new();
        for scope in scopes {
            let view = ViewState::new(scope, TypeFilter::All, "");
            for card in visible_cards(&cards, &view) {
                assert!(seen.insert(card.id.clone()), "{} seen twice", card.id);
            }
        }
        let all: HashSet<String> = cards.iter().map(|c| c.id.clone()).collect();
        assert_eq!(seen, all);
    }

    #[test]
    fn blank_folder_scope_is_the_inbox() {
        let cards = mixed();
        let inbox = visible_cards(&cards, &ViewState::new(Scope::Inbox, TypeFilter::All, ""));
        let blank = visible_cards(&cards, &ViewState::new(Scope::Folder(String::new()), TypeFilter::All, ""));

        assert!(ids(&inbox).contains(&"F".to_string()));
        assert_eq!(ids(&blank), ids(&inbox));
        assert_eq!(Scope::from(Some(String::new())), Scope::Inbox);
    }

    #[test]
    fn type_and_folder_filters_commute() {
        let cards = mixed();
        for scope in [Scope::Inbox, Scope::Folder("f1".into())] {
            for card_type in CardType::ALL {
                let filter = TypeFilter::Only(card_type);
                let scope_first: HashSet<&str> = cards
                    .iter()
                    .filter(|c| scope.contains(c))
                    .filter(|c| filter.matches(c))
                    .map(|c| c.id.as_str())
                    .collect();
                let type_first: HashSet<&str> = cards
                    .iter()
                    .filter(|c| filter.matches(c))
                    .filter(|c| scope.contains(c))
                    .map(|c| c.id.as_str())
                    .collect();
                assert_eq!(scope_first, type_first);

                let view = ViewState::new(scope.clone(), filter, "");
                let engine: HashSet<&str> = visible_cards(&cards, &view)
                    .into_iter()
                    .map(|c| c.id.as_str())
                    .collect();
                assert_eq!(engine, scope_first);
            }
        }
    }

    #[test]
    fn longer_query_narrows_results() {
        let mut cards = Vec::new();
        for (i, title) in ["Hello", "Help", "shell", "hex", "other"].iter().enumerate() {
            let mut c = card(&i.to_string(), CardType::Basic, None, i as i64);
            c.title = title.to_string();
            cards.push(c);
        }

        let chain = ["", "h", "he", "hel", "hell", "hello"];
        for pair in chain.windows(2) {
            let wide: HashSet<&str> = visible_cards(&cards, &ViewState::new(Scope::Inbox, TypeFilter::All, pair[0]))
                .into_iter()
                .map(|c| c.id.as_str())
                .collect();
            let narrow: HashSet<&str> = visible_cards(&cards, &ViewState::new(Scope::Inbox, TypeFilter::All, pair[1]))
                .into_iter()
                .map(|c| c.id.as_str())
                .collect();
            assert!(narrow.is_subset(&wide), "{:?} not within {:?}", pair[1], pair[0]);
        }
    }

    #[test]
    fn output_is_sorted_by_creation_descending() {
        let mut cards = mixed();
        cards.push(card("X", CardType::Basic, None, 300));
        cards.push(card("Y", CardType::Basic, None, 5));

        let result = visible_cards(&cards, &ViewState::default());
        assert!(!result.is_empty());
        for pair in result.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn orphaned_card_is_not_in_inbox() {
        let cards = mixed();
        let inbox = visible_cards(&cards, &ViewState::default());
        assert!(inbox.iter().all(|c| c.id != "G"));
    }

    #[test]
    fn empty_collection_yields_nothing() {
        let view = ViewState::new(Scope::Folder("f1".into()), TypeFilter::Only(CardType::Term), "x");
        assert!(visible_cards(&[], &view).is_empty());
    }

    #[test]
    fn view_state_round_trips_without_search() {
        let view = ViewState::new(
            Scope::Folder("17".into()),
            TypeFilter::Only(CardType::NewKnowledge),
            "secret",
        );
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"currentFolderId\":\"17\""));
        assert!(json.contains("\"typeFilter\":\"New Knowledge\""));
        assert!(!json.contains("secret"));

        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scope, view.scope);
        assert_eq!(back.type_filter, view.type_filter);
        assert!(back.search.is_empty());

        let inbox: ViewState =
            serde_json::from_str(r#"{"currentFolderId":null,"typeFilter":"ALL"}"#).unwrap();
        assert_eq!(inbox.scope, Scope::Inbox);
        assert_eq!(inbox.type_filter, TypeFilter::All);
    }
}
