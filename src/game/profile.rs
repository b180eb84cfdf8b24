use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cards::{CardId, CollectionId};

pub type UserId = Uuid;
pub type EntryId = Uuid;

/// Source tag with a once-per-UTC-day limit.
pub const DAILY_SOURCE: &str = "daily";
/// Source tag recorded for cards bought with dust.
pub const CRAFT_SOURCE: &str = "craft";

/// Permanent per-user game state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Profile {
    pub user: UserId,
    pub cards: BTreeSet<CardId>,
    pub collections: BTreeSet<CollectionId>,
    pub dust: u32,
}

impl Profile {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            cards: BTreeSet::new(),
            collections: BTreeSet::new(),
            dust: 0,
        }
    }

    pub fn owns(&self, card: CardId) -> bool {
        self.cards.contains(&card)
    }
}

/// A card a user has drawn but not yet committed to their profile. Entries
/// are consumed by either committing or disenchanting them.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CardEntry {
    pub id: EntryId,
    pub user: UserId,
    pub card: CardId,
    pub source: String,
    pub acquired: DateTime<Utc>,
}

impl CardEntry {
    pub fn new(user: UserId, card: CardId, source: &str, acquired: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            card,
            source: source.to_string(),
            acquired,
        }
    }

    pub fn is_daily(&self) -> bool {
        self.source == DAILY_SOURCE
    }
}
