use thiserror::Error;

use crate::{
    cards::{CardId, CollectionId, Rarity},
    game::{EntryId, UserId},
};

pub type Res<T> = Result<T, GameError>;

/// Broad classes of failure. Handlers map these onto status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Permission,
    Conflict,
    InsufficientResource,
    /// The deployment itself is broken, e.g. no cards seeded for a rarity.
    Configuration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("a source is required to acquire a card")]
    MissingSource,

    #[error("no card entry with id {0}")]
    EntryNotFound(EntryId),

    #[error("no card with id {0}")]
    CardNotFound(CardId),

    #[error("no collection with id {0}")]
    CollectionNotFound(CollectionId),

    #[error("no profile for user {0}")]
    ProfileNotFound(UserId),

    #[error("card entry {0} belongs to another user")]
    EntryOwnerMismatch(EntryId),

    #[error("card {0} is already in the collection")]
    DuplicateCard(CardId),

    #[error("card {0} is already owned")]
    AlreadyOwned(CardId),

    #[error("daily card already claimed today")]
    DailyAlreadyClaimed,

    #[error("not enough dust: have {have}, need {need}")]
    InsufficientDust { have: u32, need: u32 },

    #[error("dust balance {have} cannot take {adding} more")]
    DustOverflow { have: u32, adding: u32 },

    #[error("invalid page {0}")]
    InvalidPage(usize),

    #[error("no {0} cards in the card pool")]
    EmptyPool(Rarity),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::MissingSource => ErrorKind::Validation,
            GameError::EntryNotFound(_)
            | GameError::CardNotFound(_)
            | GameError::CollectionNotFound(_)
            | GameError::ProfileNotFound(_)
            | GameError::InvalidPage(_) => ErrorKind::NotFound,
            GameError::EntryOwnerMismatch(_) => ErrorKind::Permission,
            GameError::DuplicateCard(_)
            | GameError::AlreadyOwned(_)
            | GameError::DailyAlreadyClaimed
            | GameError::DustOverflow { .. } => ErrorKind::Conflict,
            GameError::InsufficientDust { .. } => ErrorKind::InsufficientResource,
            GameError::EmptyPool(_) => ErrorKind::Configuration,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::cards::Rarity;

    use super::{ErrorKind, GameError};

    #[test]
    fn test_kinds() {
        assert_eq!(GameError::MissingSource.kind(), ErrorKind::Validation);
        assert_eq!(GameError::CardNotFound(3).kind(), ErrorKind::NotFound);
        assert_eq!(GameError::DailyAlreadyClaimed.kind(), ErrorKind::Conflict);
        assert_eq!(
            GameError::DustOverflow { have: 1, adding: 2 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(GameError::InvalidPage(4).kind(), ErrorKind::NotFound);
        assert_eq!(
            GameError::InsufficientDust { have: 15, need: 20 }.kind(),
            ErrorKind::InsufficientResource
        );
        assert_eq!(
            GameError::EmptyPool(Rarity::Epic).kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            GameError::InsufficientDust { have: 15, need: 20 }.to_string(),
            "not enough dust: have 15, need 20"
        );
        assert_eq!(
            GameError::EmptyPool(Rarity::Rare).to_string(),
            "no rare cards in the card pool"
        );
    }
}
