use std::sync::{Arc, Mutex};

use rand::RngCore;

use crate::{
    cards::{Card, CardDatabase, CardId},
    error::{GameError, Res},
};

pub use clock::{Clock, SystemClock};
pub use profile::{CardEntry, EntryId, Profile, UserId, CRAFT_SOURCE, DAILY_SOURCE};

use pool::CardPool;
use store::{Store, Transaction};

mod acquire;
pub mod clock;
mod commit;
mod dust;
pub mod handlers;
mod pool;
mod profile;
mod progress;
mod store;

pub use progress::BulkOrdering;

/// The card acquisition and collection engine. One instance serves every
/// user; per-user serialisation happens inside the store.
pub struct Game {
    catalogue: Arc<CardDatabase>,
    pool: CardPool,
    store: Store,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Game {
    pub fn new<R: RngCore + Send + 'static>(
        catalogue: Arc<CardDatabase>,
        clock: Arc<dyn Clock>,
        rng: R,
    ) -> Self {
        let pool = CardPool::new(&catalogue);
        tracing::debug!("Built card pool: {pool:?}");
        Self {
            catalogue,
            pool,
            store: Store::new(),
            clock,
            rng: Mutex::new(Box::new(rng)),
        }
    }

    pub fn catalogue(&self) -> &CardDatabase {
        &self.catalogue
    }

    /// Create the user's profile if this is the first time we have seen them.
    /// Called by the sign up flow.
    pub async fn ensure_profile(&self, user: UserId) -> Res<Profile> {
        if self.store.ensure_profile(user) {
            tracing::debug!("Created profile for user {user}.");
        }
        self.store.profile(user).await
    }

    pub async fn profile(&self, user: UserId) -> Res<Profile> {
        self.store.profile(user).await
    }

    fn card(&self, id: CardId) -> Res<&Card> {
        self.catalogue.card(id).ok_or(GameError::CardNotFound(id))
    }

    /// Roll a rarity and draw a card of it.
    fn roll_card(&self) -> Res<CardId> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        self.pool.roll(&mut **rng).inspect_err(|e| {
            tracing::error!("Card pool misconfigured, cannot draw a card: {e}");
        })
    }

    /// Fetch a pending entry inside a transaction, checking that it belongs to
    /// the user the transaction is for.
    fn owned_entry(&self, tx: &Transaction<'_>, id: EntryId) -> Res<CardEntry> {
        let Some(entry) = tx.entry(id) else {
            return Err(GameError::EntryNotFound(id));
        };
        if entry.user != tx.profile.user {
            tracing::warn!(
                "User {} attempted to use entry {id} owned by {}.",
                tx.profile.user,
                entry.user
            );
            return Err(GameError::EntryOwnerMismatch(id));
        }
        Ok(entry)
    }
}
