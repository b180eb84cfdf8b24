use chrono::{DateTime, Utc};

use crate::error::{GameError, Res};

use super::{CardEntry, Game, UserId, DAILY_SOURCE};

/// Whether the last daily claim fell on the same UTC calendar day as `now`.
fn claimed_today(last_daily: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_daily.is_some_and(|last| last.date_naive() == now.date_naive())
}

impl Game {
    /// Draw a random card for the user and hold it as a pending entry. Daily
    /// draws are limited to one per UTC day.
    pub async fn acquire(&self, user: UserId, source: &str) -> Res<CardEntry> {
        if source.trim().is_empty() {
            return Err(GameError::MissingSource);
        }

        let mut tx = self.store.begin(user).await?;
        let now = self.clock.now();
        if source == DAILY_SOURCE && claimed_today(tx.latest_daily(), now) {
            tracing::warn!("User {user} already claimed a daily card today.");
            return Err(GameError::DailyAlreadyClaimed);
        }

        let card = self.roll_card()?;
        let entry = CardEntry::new(user, card, source, now);
        tx.insert_entry(entry.clone());
        tx.commit();

        tracing::debug!(
            "User {user} acquired card {card} from {source} as entry {}.",
            entry.id
        );
        Ok(entry)
    }

    /// Whether a daily draw would currently be allowed.
    pub async fn is_daily_available(&self, user: UserId) -> Res<bool> {
        // Waits out any running acquisition so the answer is current.
        self.store.profile(user).await?;
        Ok(!claimed_today(
            self.store.latest_daily(user),
            self.clock.now(),
        ))
    }
}
