use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;

use crate::error::{GameError, Res};

use super::profile::{CardEntry, EntryId, Profile, UserId};

type ProfileCell = Arc<tokio::sync::Mutex<Profile>>;

#[derive(Default)]
struct Tables {
    /// Entries waiting to be committed or disenchanted.
    pending: HashMap<EntryId, CardEntry>,

    /// Every entry ever created for each user, in creation order. Never
    /// shrinks.
    history: HashMap<UserId, Vec<CardEntry>>,
}

/// In-memory profile and card entry storage. All writes go through a
/// [`Transaction`], which holds the profile's lock for its whole lifetime.
#[derive(Default)]
pub struct Store {
    profiles: Mutex<HashMap<UserId, ProfileCell>>,
    tables: Mutex<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn profiles(&self) -> MutexGuard<'_, HashMap<UserId, ProfileCell>> {
        self.profiles.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cell(&self, user: UserId) -> Res<ProfileCell> {
        self.profiles()
            .get(&user)
            .cloned()
            .ok_or(GameError::ProfileNotFound(user))
    }

    /// Create the profile for a user if it does not exist yet. Returns true if
    /// a profile was created.
    pub fn ensure_profile(&self, user: UserId) -> bool {
        let mut profiles = self.profiles();
        if profiles.contains_key(&user) {
            false
        } else {
            profiles.insert(user, Arc::new(tokio::sync::Mutex::new(Profile::new(user))));
            true
        }
    }

    /// Snapshot of a profile. Waits for any running transaction on it.
    pub async fn profile(&self, user: UserId) -> Res<Profile> {
        let cell = self.cell(user)?;
        let profile = cell.lock().await;
        Ok(profile.clone())
    }

    /// Start a transaction scoped to one user's profile. Only one transaction
    /// per profile runs at a time; others wait here.
    pub async fn begin(&self, user: UserId) -> Res<Transaction<'_>> {
        let guard = self.cell(user)?.lock_owned().await;
        Ok(Transaction {
            store: self,
            profile: guard.clone(),
            guard,
            inserted: Vec::new(),
            recorded: Vec::new(),
            removed: Vec::new(),
        })
    }

    pub fn entry(&self, id: EntryId) -> Option<CardEntry> {
        self.tables().pending.get(&id).cloned()
    }

    pub fn pending_entries(&self, user: UserId) -> Vec<CardEntry> {
        self.tables()
            .pending
            .values()
            .filter(|entry| entry.user == user)
            .cloned()
            .collect()
    }

    pub fn history(&self, user: UserId) -> Vec<CardEntry> {
        self.tables()
            .history
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    /// Acquisition time of the user's latest daily entry, whether or not it
    /// is still pending.
    pub fn latest_daily(&self, user: UserId) -> Option<DateTime<Utc>> {
        self.tables()
            .history
            .get(&user)?
            .iter()
            .filter(|entry| entry.is_daily())
            .map(|entry| entry.acquired)
            .max()
    }
}

/// Staged changes to one profile and that user's entries. Nothing is visible
/// to other callers until [`Transaction::commit`]; dropping the transaction
/// discards every staged change.
pub struct Transaction<'a> {
    store: &'a Store,
    guard: OwnedMutexGuard<Profile>,

    /// Working copy of the locked profile.
    pub profile: Profile,

    inserted: Vec<CardEntry>,
    recorded: Vec<CardEntry>,
    removed: Vec<EntryId>,
}

impl Transaction<'_> {
    /// Look up a pending entry as this transaction sees it.
    pub fn entry(&self, id: EntryId) -> Option<CardEntry> {
        if self.removed.contains(&id) {
            return None;
        }
        self.inserted
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .or_else(|| self.store.entry(id))
    }

    pub fn latest_daily(&self) -> Option<DateTime<Utc>> {
        let staged = self
            .inserted
            .iter()
            .chain(self.recorded.iter())
            .filter(|entry| entry.is_daily())
            .map(|entry| entry.acquired)
            .max();
        staged.max(self.store.latest_daily(self.profile.user))
    }

    /// Stage a new pending entry. It is also appended to the user's history.
    pub fn insert_entry(&mut self, entry: CardEntry) {
        debug_assert!(entry.user == self.profile.user);

        self.inserted.push(entry);
    }

    /// Stage a history-only entry that is never pending.
    pub fn record(&mut self, entry: CardEntry) {
        debug_assert!(entry.user == self.profile.user);

        self.recorded.push(entry);
    }

    pub fn remove_entry(&mut self, id: EntryId) {
        self.removed.push(id);
    }

    pub fn commit(mut self) {
        let mut tables = self.store.tables();

        for entry in self.inserted.iter().chain(self.recorded.iter()) {
            tables
                .history
                .entry(entry.user)
                .or_default()
                .push(entry.clone());
        }
        for entry in self.inserted.drain(..) {
            tables.pending.insert(entry.id, entry);
        }
        for id in &self.removed {
            tables.pending.remove(id);
        }

        *self.guard = self.profile;
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::{
        error::GameError,
        game::profile::{CardEntry, CRAFT_SOURCE, DAILY_SOURCE},
    };

    use super::Store;

    #[tokio::test]
    async fn test_missing_profile() {
        let store = Store::new();
        let user = Uuid::new_v4();
        assert!(matches!(
            store.begin(user).await,
            Err(GameError::ProfileNotFound(u)) if u == user
        ));
        assert_eq!(
            store.profile(user).await,
            Err(GameError::ProfileNotFound(user))
        );
    }

    #[tokio::test]
    async fn test_ensure_profile_idempotent() {
        let store = Store::new();
        let user = Uuid::new_v4();
        assert!(store.ensure_profile(user));

        let mut tx = store.begin(user).await.unwrap();
        tx.profile.dust = 30;
        tx.commit();

        assert!(!store.ensure_profile(user));
        assert_eq!(store.profile(user).await.unwrap().dust, 30);
    }

    #[tokio::test]
    async fn test_commit_applies_staged_changes() {
        let store = Store::new();
        let user = Uuid::new_v4();
        store.ensure_profile(user);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let pending = CardEntry::new(user, 1, DAILY_SOURCE, now);
        let crafted = CardEntry::new(user, 2, CRAFT_SOURCE, now);

        let mut tx = store.begin(user).await.unwrap();
        tx.insert_entry(pending.clone());
        tx.record(crafted.clone());
        tx.profile.cards.insert(2);
        assert_eq!(tx.entry(pending.id), Some(pending.clone()));
        assert_eq!(tx.latest_daily(), Some(now));

        // Nothing visible before commit.
        assert!(store.entry(pending.id).is_none());
        tx.commit();

        assert_eq!(store.entry(pending.id), Some(pending.clone()));
        assert!(store.entry(crafted.id).is_none());
        assert_eq!(store.history(user), vec![pending.clone(), crafted]);
        assert_eq!(store.latest_daily(user), Some(now));
        assert!(store.profile(user).await.unwrap().owns(2));

        // Removing the pending entry keeps it in history.
        let mut tx = store.begin(user).await.unwrap();
        tx.remove_entry(pending.id);
        assert!(tx.entry(pending.id).is_none());
        tx.commit();
        assert!(store.pending_entries(user).is_empty());
        assert_eq!(store.latest_daily(user), Some(now));
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let store = Store::new();
        let user = Uuid::new_v4();
        store.ensure_profile(user);

        {
            let mut tx = store.begin(user).await.unwrap();
            tx.profile.dust = 100;
            tx.profile.cards.insert(7);
            tx.insert_entry(CardEntry::new(user, 7, "event", Utc::now()));
        }

        let profile = store.profile(user).await.unwrap();
        assert_eq!(profile.dust, 0);
        assert!(profile.cards.is_empty());
        assert!(store.pending_entries(user).is_empty());
        assert!(store.history(user).is_empty());
    }
}
