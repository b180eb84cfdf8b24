use crate::{
    cards::{Card, CardId, CollectionId},
    error::{GameError, Res},
};

use super::{CardEntry, EntryId, Game, UserId, CRAFT_SOURCE};

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct Crafted {
    pub card: Card,
    pub dust: u32,

    /// History record of the craft. It is never pending.
    pub entry: CardEntry,
    pub completed: Vec<CollectionId>,
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct Disenchanted {
    pub card: Card,
    pub dust: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Craftability {
    AlreadyOwned,
    InsufficientDust,
    Craftable,
}

impl Game {
    /// Spend dust to add a card straight to the user's profile.
    pub async fn craft(&self, user: UserId, card: CardId) -> Res<Crafted> {
        let card = self.card(card)?.clone();
        let mut tx = self.store.begin(user).await?;

        let Some(dust) = tx.profile.dust.checked_sub(card.craft_cost) else {
            tracing::warn!(
                "User {user} cannot afford card {} ({} < {}).",
                card.id,
                tx.profile.dust,
                card.craft_cost
            );
            return Err(GameError::InsufficientDust {
                have: tx.profile.dust,
                need: card.craft_cost,
            });
        };
        if tx.profile.owns(card.id) {
            tracing::warn!("User {user} tried to craft owned card {}.", card.id);
            return Err(GameError::AlreadyOwned(card.id));
        }

        tx.profile.dust = dust;
        let completed = self.add_to_profile(&mut tx.profile, card.id);
        let entry = CardEntry::new(user, card.id, CRAFT_SOURCE, self.clock.now());
        tx.record(entry.clone());
        tx.commit();

        tracing::debug!(
            "User {user} crafted card {} for {} dust, {dust} remaining.",
            card.id,
            card.craft_cost
        );
        Ok(Crafted {
            card,
            dust,
            entry,
            completed,
        })
    }

    /// Turn a pending entry into dust instead of committing it.
    pub async fn disenchant(&self, user: UserId, entry: EntryId) -> Res<Disenchanted> {
        let mut tx = self.store.begin(user).await?;
        let entry = self.owned_entry(&tx, entry)?;
        let card = self.card(entry.card)?.clone();

        let Some(dust) = tx.profile.dust.checked_add(card.disenchant_value) else {
            tracing::warn!(
                "User {user} cannot hold {} more dust on top of {}.",
                card.disenchant_value,
                tx.profile.dust
            );
            return Err(GameError::DustOverflow {
                have: tx.profile.dust,
                adding: card.disenchant_value,
            });
        };
        tx.profile.dust = dust;
        tx.remove_entry(entry.id);
        tx.commit();

        tracing::debug!(
            "User {user} disenchanted entry {} for {} dust, {dust} total.",
            entry.id,
            card.disenchant_value
        );
        Ok(Disenchanted { card, dust })
    }

    /// Whether crafting would currently succeed, and if not, why.
    pub async fn is_craftable(&self, user: UserId, card: CardId) -> Res<Craftability> {
        let card = self.card(card)?;
        let profile = self.store.profile(user).await?;

        Ok(if profile.owns(card.id) {
            Craftability::AlreadyOwned
        } else if profile.dust < card.craft_cost {
            Craftability::InsufficientDust
        } else {
            Craftability::Craftable
        })
    }

    #[cfg(test)]
    pub(super) async fn grant_dust(&self, user: UserId, amount: u32) -> Res<()> {
        let mut tx = self.store.begin(user).await?;
        tx.profile.dust += amount;
        tx.commit();
        Ok(())
    }
}
