use std::str::FromStr;

use crate::{
    cards::{normalise_search, Card, CardId, CollectionId, Rarity},
    error::{GameError, Res},
};

use super::{CardEntry, EntryId, Game, UserId};

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct CollectionProgress {
    pub acquired: Vec<CardId>,
    pub not_acquired: Vec<CardId>,
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct UserStatistics {
    pub owned_cards: usize,
    pub completed_collections: usize,
    pub total_cards: usize,
    pub total_collections: usize,
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct BulkCard {
    pub card: Card,

    /// False if the user already owns the card.
    pub addable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkOrdering {
    /// Epics first, then rares, then commons.
    Rarity,
}

impl FromStr for BulkOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rarity" => Ok(BulkOrdering::Rarity),
            _ => Err(format!("Unknown ordering: {s}")),
        }
    }
}

fn rarity_rank(rarity: Rarity) -> u8 {
    match rarity {
        Rarity::Epic => 0,
        Rarity::Rare => 1,
        Rarity::Common => 2,
    }
}

impl Game {
    /// Split a collection's cards into those the user owns and those they
    /// do not, in the collection's order.
    pub async fn collection_progress(
        &self,
        user: UserId,
        collection: CollectionId,
    ) -> Res<CollectionProgress> {
        let Some(collection) = self.catalogue.collection(collection) else {
            return Err(GameError::CollectionNotFound(collection));
        };
        let profile = self.store.profile(user).await?;

        let (acquired, not_acquired): (Vec<CardId>, Vec<CardId>) = collection
            .cards
            .iter()
            .partition(|card| profile.owns(**card));
        Ok(CollectionProgress {
            acquired,
            not_acquired,
        })
    }

    pub async fn user_statistics(&self, user: UserId) -> Res<UserStatistics> {
        let profile = self.store.profile(user).await?;
        Ok(UserStatistics {
            owned_cards: profile.cards.len(),
            completed_collections: profile.collections.len(),
            total_cards: self.catalogue.card_count(),
            total_collections: self.catalogue.collection_count(),
        })
    }

    /// Whether committing this entry would currently succeed.
    pub async fn is_addable(&self, user: UserId, entry: EntryId) -> Res<bool> {
        let profile = self.store.profile(user).await?;
        let Some(entry) = self.store.entry(entry) else {
            return Err(GameError::EntryNotFound(entry));
        };
        if entry.user != user {
            return Err(GameError::EntryOwnerMismatch(entry.id));
        }
        Ok(!profile.owns(entry.card))
    }

    /// The user's pending entries, ordered by card name. A search keeps only
    /// entries whose card name or short description contains it.
    pub async fn pending_entries(
        &self,
        user: UserId,
        search: Option<&str>,
    ) -> Res<Vec<CardEntry>> {
        self.store.profile(user).await?;

        let mut entries = self.store.pending_entries(user);
        if let Some(needle) = normalise_search(search) {
            entries.retain(|entry| {
                self.catalogue
                    .card(entry.card)
                    .is_some_and(|card| card.matches(&needle))
            });
        }
        entries.sort_by(|a, b| {
            let name = |entry: &CardEntry| self.catalogue.card(entry.card).map(Card::name);
            name(a).cmp(&name(b)).then(a.acquired.cmp(&b.acquired))
        });
        Ok(entries)
    }

    /// Every entry ever created for the user, including crafts, oldest first.
    pub async fn history(&self, user: UserId) -> Res<Vec<CardEntry>> {
        self.store.profile(user).await?;
        Ok(self.store.history(user))
    }

    /// Look up a list of cards, flagging the ones the user could still add.
    pub async fn cards_bulk(
        &self,
        user: UserId,
        cards: &[CardId],
        ordering: Option<BulkOrdering>,
    ) -> Res<Vec<BulkCard>> {
        let profile = self.store.profile(user).await?;

        let mut results = cards
            .iter()
            .map(|&id| {
                let card = self.card(id)?.clone();
                Ok(BulkCard {
                    addable: !profile.owns(card.id),
                    card,
                })
            })
            .collect::<Res<Vec<_>>>()?;

        if let Some(BulkOrdering::Rarity) = ordering {
            // Stable, so request order is kept within a rarity.
            results.sort_by_key(|c| rarity_rank(c.card.rarity));
        }
        Ok(results)
    }
}
