use std::fmt::Debug;

use rand::{seq::SliceRandom, Rng};

use crate::{
    cards::{CardDatabase, CardId, Rarity},
    error::{GameError, Res},
};

/// Highest roll that produces a common card.
const COMMON_MAX: u32 = 70;
/// Highest roll that produces a rare card. Everything above is epic.
const RARE_MAX: u32 = 90;
const ROLL_MAX: u32 = 100;

/// Map a roll in 1..=100 to a rarity: 1-70 common, 71-90 rare, 91-100 epic.
pub fn rarity_for_roll(roll: u32) -> Rarity {
    debug_assert!((1..=ROLL_MAX).contains(&roll));

    if roll <= COMMON_MAX {
        Rarity::Common
    } else if roll <= RARE_MAX {
        Rarity::Rare
    } else {
        Rarity::Epic
    }
}

pub fn roll_rarity<R: Rng + ?Sized>(rng: &mut R) -> Rarity {
    rarity_for_roll(rng.gen_range(1..=ROLL_MAX))
}

/// Every card in the catalogue, bucketed by rarity for uniform selection.
#[derive(Clone, Default)]
pub struct CardPool {
    commons: Vec<CardId>,
    rares: Vec<CardId>,
    epics: Vec<CardId>,
}

impl CardPool {
    pub fn new(database: &CardDatabase) -> Self {
        let mut pool = Self::default();
        for card in database.cards() {
            pool.add(card.id, card.rarity);
        }
        pool
    }

    fn add(&mut self, card: CardId, rarity: Rarity) {
        match rarity {
            Rarity::Common => self.commons.push(card),
            Rarity::Rare => self.rares.push(card),
            Rarity::Epic => self.epics.push(card),
        }
    }

    fn cards_of(&self, rarity: Rarity) -> &[CardId] {
        match rarity {
            Rarity::Common => &self.commons,
            Rarity::Rare => &self.rares,
            Rarity::Epic => &self.epics,
        }
    }

    /// Pick a card of the given rarity uniformly at random. An empty tier is a
    /// seeding problem and is never retried with another rarity.
    pub fn choose<R: Rng + ?Sized>(&self, rarity: Rarity, rng: &mut R) -> Res<CardId> {
        match self.cards_of(rarity).choose(rng) {
            Some(&card) => Ok(card),
            None => Err(GameError::EmptyPool(rarity)),
        }
    }

    /// Roll a rarity and pick a card from it.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Res<CardId> {
        let rarity = roll_rarity(rng);
        self.choose(rarity, rng)
    }
}

impl Debug for CardPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CardPool {{ commons: {}, rares: {}, epics: {} }}",
            self.commons.len(),
            self.rares.len(),
            self.epics.len()
        )
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use rand::{rngs::StdRng, SeedableRng};

    use crate::{
        cards::{Card, CardDatabase, Rarity},
        error::GameError,
    };

    use super::{rarity_for_roll, roll_rarity, CardPool};

    #[test]
    fn test_roll_boundaries() {
        assert_eq!(rarity_for_roll(1), Rarity::Common);
        assert_eq!(rarity_for_roll(70), Rarity::Common);
        assert_eq!(rarity_for_roll(71), Rarity::Rare);
        assert_eq!(rarity_for_roll(90), Rarity::Rare);
        assert_eq!(rarity_for_roll(91), Rarity::Epic);
        assert_eq!(rarity_for_roll(100), Rarity::Epic);
    }

    #[test]
    fn test_roll_distribution() {
        const ROLLS: usize = 100_000;

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts: HashMap<Rarity, usize> = HashMap::new();
        for _ in 0..ROLLS {
            *counts.entry(roll_rarity(&mut rng)).or_default() += 1;
        }

        // Standard deviation of each share is below 0.0015 at this sample size.
        let share = |rarity| counts.get(&rarity).copied().unwrap_or(0) as f64 / ROLLS as f64;
        assert!((share(Rarity::Common) - 0.70).abs() < 0.01);
        assert!((share(Rarity::Rare) - 0.20).abs() < 0.01);
        assert!((share(Rarity::Epic) - 0.10).abs() < 0.01);
    }

    #[test]
    fn test_choose_uniform_within_rarity() {
        let mut db = CardDatabase::new();
        let commons: Vec<Card> = (0..4).map(|_| Card::sample(Rarity::Common)).collect();
        for card in &commons {
            db.add_card(card.clone());
        }
        db.add_card(Card::sample(Rarity::Rare));
        let pool = CardPool::new(&db);

        let mut rng = StdRng::seed_from_u64(7);
        let mut seen: HashMap<u32, usize> = HashMap::new();
        for _ in 0..4_000 {
            let card = pool.choose(Rarity::Common, &mut rng).unwrap();
            *seen.entry(card).or_default() += 1;
        }

        assert_eq!(seen.len(), commons.len());
        assert!(seen.values().all(|&n| n > 800 && n < 1200));
    }

    #[test]
    fn test_empty_pool() {
        let mut db = CardDatabase::new();
        db.add_card(Card::sample(Rarity::Common));
        let pool = CardPool::new(&db);

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            pool.choose(Rarity::Epic, &mut rng),
            Err(GameError::EmptyPool(Rarity::Epic))
        );
        assert!(pool.choose(Rarity::Common, &mut rng).is_ok());
    }
}
