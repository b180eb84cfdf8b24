use std::collections::{BTreeMap, HashMap};

pub mod catalogue;

pub type CardId = u32;
pub type CollectionId = u32;

/// Lowercase a free-text search. Blank searches match everything and come
/// back as None.
pub fn normalise_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn text_matches(needle: &str, name: &str, description: &str) -> bool {
    name.to_lowercase().contains(needle) || description.to_lowercase().contains(needle)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Card {
    pub id: CardId,
    name: String,
    short_description: String,
    pub rarity: Rarity,
    pub craft_cost: u32,
    pub disenchant_value: u32,

    /// Collection this card was defined for. Completion is decided by the
    /// collection's own member list, not by this field.
    pub collection: Option<CollectionId>,
}

impl Card {
    pub fn new(
        id: CardId,
        name: String,
        short_description: String,
        rarity: Rarity,
        craft_cost: u32,
        disenchant_value: u32,
        collection: Option<CollectionId>,
    ) -> Self {
        Self {
            id,
            name,
            short_description,
            rarity,
            craft_cost,
            disenchant_value,
            collection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a normalised search occurs in the name or short description.
    pub fn matches(&self, needle: &str) -> bool {
        text_matches(needle, &self.name, &self.short_description)
    }

    #[cfg(test)]
    pub fn sample(rarity: Rarity) -> Self {
        static ID: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(1000);

        let id = ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Self {
            id,
            name: format!("Card {id}"),
            short_description: format!("Text for test card {id}."),
            rarity,
            craft_cost: 20,
            disenchant_value: 10,
            collection: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Collection {
    pub id: CollectionId,
    name: String,
    short_description: String,
    pub cards: Vec<CardId>,
}

impl Collection {
    pub fn new(id: CollectionId, name: String, short_description: String, cards: Vec<CardId>) -> Self {
        Self {
            id,
            name,
            short_description,
            cards,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, needle: &str) -> bool {
        text_matches(needle, &self.name, &self.short_description)
    }
}

/// Immutable card and collection definitions, shared by every request.
#[derive(Default)]
pub struct CardDatabase {
    cards: BTreeMap<CardId, Card>,
    collections: BTreeMap<CollectionId, Collection>,

    /// Map from card to every collection that lists it as a member.
    containing: HashMap<CardId, Vec<CollectionId>>,
}

impl CardDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.insert(card.id, card);
    }

    pub fn add_collection(&mut self, collection: Collection) {
        for &card in &collection.cards {
            let ids = self.containing.entry(card).or_default();
            if !ids.contains(&collection.id) {
                ids.push(collection.id);
            }
        }
        self.collections.insert(collection.id, collection);
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn collection(&self, id: CollectionId) -> Option<&Collection> {
        self.collections.get(&id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    /// Cards whose name or short description contains the search, in id
    /// order.
    pub fn search_cards(&self, search: Option<&str>) -> Vec<&Card> {
        match normalise_search(search) {
            Some(needle) => self.cards().filter(|card| card.matches(&needle)).collect(),
            None => self.cards().collect(),
        }
    }

    pub fn search_collections(&self, search: Option<&str>) -> Vec<&Collection> {
        match normalise_search(search) {
            Some(needle) => self
                .collections()
                .filter(|collection| collection.matches(&needle))
                .collect(),
            None => self.collections().collect(),
        }
    }

    /// Collections that count this card towards completion.
    pub fn collections_containing(&self, card: CardId) -> &[CollectionId] {
        self.containing.get(&card).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }
}

impl std::fmt::Debug for CardDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CardDatabase {{ cards: {}, collections: {} }}",
            self.cards.len(),
            self.collections.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::{Card, CardDatabase, Collection, Rarity};

    #[test]
    fn test_collections_containing() {
        let a = Card::sample(Rarity::Common);
        let b = Card::sample(Rarity::Rare);
        let loose = Card::sample(Rarity::Epic);

        let mut db = CardDatabase::new();
        db.add_card(a.clone());
        db.add_card(b.clone());
        db.add_card(loose.clone());
        db.add_collection(Collection::new(1, "First".into(), String::new(), vec![a.id, b.id]));
        db.add_collection(Collection::new(2, "Second".into(), String::new(), vec![b.id]));

        assert_eq!(db.collections_containing(a.id), &[1]);
        assert_eq!(db.collections_containing(b.id), &[1, 2]);
        assert!(db.collections_containing(loose.id).is_empty());
        assert_eq!(db.card_count(), 3);
        assert_eq!(db.collection_count(), 2);
    }

    #[test]
    fn test_search() {
        let mut db = CardDatabase::new();
        db.add_card(Card::new(
            1,
            "Lantern".into(),
            "Lights the way.".into(),
            Rarity::Common,
            20,
            10,
            None,
        ));
        db.add_card(Card::new(
            2,
            "Beacon".into(),
            "A brighter lantern.".into(),
            Rarity::Epic,
            30,
            15,
            None,
        ));
        db.add_card(Card::new(3, "Anchor".into(), String::new(), Rarity::Rare, 20, 10, None));
        db.add_collection(Collection::new(1, "Lights".into(), "Shiny".into(), vec![1, 2]));
        db.add_collection(Collection::new(2, "Harbour".into(), String::new(), vec![3]));

        let ids = |cards: Vec<&Card>| cards.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(db.search_cards(Some("LANTERN"))), vec![1, 2]);
        assert_eq!(ids(db.search_cards(Some("anch"))), vec![3]);
        assert!(db.search_cards(Some("kraken")).is_empty());
        assert_eq!(ids(db.search_cards(Some("  "))), vec![1, 2, 3]);
        assert_eq!(ids(db.search_cards(None)), vec![1, 2, 3]);

        let found = db.search_collections(Some("shiny"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
        assert_eq!(db.search_collections(None).len(), 2);
    }

    #[test]
    fn test_rarity_serde() {
        assert_eq!(serde_json::to_string(&Rarity::Epic).unwrap(), "\"epic\"");
        let rarity: Rarity = serde_json::from_str("\"common\"").unwrap();
        assert_eq!(rarity, Rarity::Common);
        assert_eq!(Rarity::Rare.to_string(), "rare");
    }
}
