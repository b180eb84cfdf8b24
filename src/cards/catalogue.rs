use std::{collections::HashSet, path::Path};

use bytes::Buf;
use serde::de::DeserializeOwned;

use crate::cards::{Card, CardDatabase, CardId, Collection, CollectionId, Rarity};

const CATALOGUE_FILE: &str = "catalogue.json";

fn decode_json<T: DeserializeOwned>(bytes: bytes::Bytes) -> Result<T, String> {
    serde_json::de::from_reader(bytes.reader()).map_err(|e| e.to_string())
}

fn default_craft_cost() -> u32 {
    20
}

fn default_disenchant_value() -> u32 {
    10
}

#[derive(serde::Deserialize, Debug)]
struct CatalogueCard {
    id: CardId,

    /// Unique card name. Compared case-insensitively.
    name: String,

    #[serde(default)]
    short_description: String,

    /// Rarity string, common, rare or epic.
    rarity: String,

    #[serde(default = "default_craft_cost")]
    craft_cost: u32,

    #[serde(default = "default_disenchant_value")]
    disenchant_value: u32,

    #[serde(default)]
    collection: Option<CollectionId>,
}

impl CatalogueCard {
    fn to_card(self) -> Result<Card, String> {
        let rarity = match self.rarity.to_ascii_lowercase().as_str() {
            "common" => Rarity::Common,
            "rare" => Rarity::Rare,
            "epic" => Rarity::Epic,
            other => return Err(format!("Card {} has unknown rarity: {other}", self.id)),
        };

        if self.craft_cost == 0 {
            return Err(format!("Card {} must have a positive craft cost.", self.id));
        }

        Ok(Card::new(
            self.id,
            self.name,
            self.short_description,
            rarity,
            self.craft_cost,
            self.disenchant_value,
            self.collection,
        ))
    }
}

#[derive(serde::Deserialize, Debug)]
struct CatalogueCollection {
    id: CollectionId,
    name: String,

    #[serde(default)]
    short_description: String,

    /// Member card ids. This list decides what counts towards completion.
    cards: Vec<CardId>,
}

#[derive(serde::Deserialize, Debug)]
struct Catalogue {
    cards: Vec<CatalogueCard>,

    #[serde(default)]
    collections: Vec<CatalogueCollection>,
}

/// Build a database from raw catalogue JSON, checking that ids and names are
/// unique and that every reference between cards and collections resolves.
pub fn parse_catalogue(raw: bytes::Bytes) -> Result<CardDatabase, String> {
    let catalogue: Catalogue = decode_json(raw)?;
    let mut database = CardDatabase::new();

    let mut names = HashSet::new();
    let mut collection_refs = Vec::new();
    for entry in catalogue.cards {
        let card = entry.to_card()?;
        if database.card(card.id).is_some() {
            return Err(format!("Duplicate card id: {}", card.id));
        }
        if !names.insert(card.name().to_ascii_lowercase()) {
            return Err(format!("Duplicate card name: {}", card.name()));
        }
        if let Some(collection) = card.collection {
            collection_refs.push((card.id, collection));
        }
        database.add_card(card);
    }

    names.clear();
    for entry in catalogue.collections {
        if database.collection(entry.id).is_some() {
            return Err(format!("Duplicate collection id: {}", entry.id));
        }
        if !names.insert(entry.name.to_ascii_lowercase()) {
            return Err(format!("Duplicate collection name: {}", entry.name));
        }
        if let Some(missing) = entry.cards.iter().find(|id| database.card(**id).is_none()) {
            return Err(format!(
                "Collection {} lists unknown card {missing}.",
                entry.name
            ));
        }
        database.add_collection(Collection::new(
            entry.id,
            entry.name,
            entry.short_description,
            entry.cards,
        ));
    }

    for (card, collection) in collection_refs {
        if database.collection(collection).is_none() {
            return Err(format!(
                "Card {card} refers to unknown collection {collection}."
            ));
        }
    }

    Ok(database)
}

pub async fn load_catalogue(data: &Path) -> Result<CardDatabase, String> {
    let file = data.join(CATALOGUE_FILE);
    tracing::debug!("Loading card catalogue from {}.", file.display());

    let raw = tokio::fs::read(&file)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    tracing::debug!("Read catalogue from disk. Parsing JSON.");
    parse_catalogue(bytes::Bytes::from(raw))
}
