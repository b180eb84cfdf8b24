use crate::{
    cards::{Card, CardId, Collection, CollectionId},
    error::{GameError, Res},
};

use super::{EntryId, Game, Profile, UserId};

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct Committed {
    pub card: Card,

    /// Collections completed by this card.
    pub completed: Vec<CollectionId>,
}

/// Mark the collection completed if the profile owns every member card.
/// Returns true only if the collection was not already marked. Completed
/// collections are never unmarked.
pub fn check_and_mark_completion(profile: &mut Profile, collection: &Collection) -> bool {
    let complete = collection.cards.iter().all(|card| profile.owns(*card));
    complete && profile.collections.insert(collection.id)
}

impl Game {
    /// Add a card to a profile and mark any collections it completes. The
    /// caller has already checked the card is not owned.
    pub(super) fn add_to_profile(&self, profile: &mut Profile, card: CardId) -> Vec<CollectionId> {
        profile.cards.insert(card);

        let mut completed = Vec::new();
        for &id in self.catalogue.collections_containing(card) {
            if let Some(collection) = self.catalogue.collection(id) {
                if check_and_mark_completion(profile, collection) {
                    tracing::debug!(
                        "User {} completed collection {}.",
                        profile.user,
                        collection.name()
                    );
                    completed.push(id);
                }
            }
        }
        completed
    }

    /// Move a pending entry's card into the user's profile and consume the
    /// entry. A duplicate leaves the entry in place.
    pub async fn commit(&self, user: UserId, entry: EntryId) -> Res<Committed> {
        let mut tx = self.store.begin(user).await?;
        let entry = self.owned_entry(&tx, entry)?;

        if tx.profile.owns(entry.card) {
            tracing::warn!("User {user} already owns card {}.", entry.card);
            return Err(GameError::DuplicateCard(entry.card));
        }

        let card = self.card(entry.card)?.clone();
        let completed = self.add_to_profile(&mut tx.profile, card.id);
        tx.remove_entry(entry.id);
        tx.commit();

        tracing::debug!("User {user} committed card {} from entry {}.", card.id, entry.id);
        Ok(Committed { card, completed })
    }
}
