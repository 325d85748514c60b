//! Card catalog: id-keyed storage of card records.
//!
//! The catalog is an external collaborator from the engine's point of
//! view: hosts build one up front and hand it to the game. The engine
//! only ever reads from it.

use rustc_hash::FxHashMap;

use super::descriptor::{CardDescriptor, CardId};

/// All card records known to a game.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, CardDescriptor>,
}

impl CardCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card record. Panics on a duplicate id — catalogs are
    /// built once, before play, and a collision is a data bug.
    pub fn register(&mut self, card: CardDescriptor) {
        let id = card.id;
        let prev = self.cards.insert(id, card);
        assert!(prev.is_none(), "duplicate card id {id}");
    }

    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDescriptor> {
        self.cards.get(&id)
    }

    /// Fetch a card that must exist. Panics on an unknown id.
    #[must_use]
    pub fn get_unchecked(&self, id: CardId) -> &CardDescriptor {
        self.cards
            .get(&id)
            .unwrap_or_else(|| panic!("unknown card id {id}"))
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardDescriptor> {
        self.cards.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut catalog = CardCatalog::new();
        catalog.register(CardDescriptor::new(CardId(1), "River Drake").creature(2, 1));

        assert!(catalog.contains(CardId(1)));
        assert_eq!(catalog.get(CardId(1)).unwrap().name, "River Drake");
        assert!(catalog.get(CardId(9)).is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    #[should_panic(expected = "duplicate card id")]
    fn test_duplicate_registration_panics() {
        let mut catalog = CardCatalog::new();
        catalog.register(CardDescriptor::new(CardId(1), "A"));
        catalog.register(CardDescriptor::new(CardId(1), "B"));
    }

    #[test]
    #[should_panic(expected = "unknown card id")]
    fn test_get_unchecked_panics_on_missing() {
        let catalog = CardCatalog::new();
        let _ = catalog.get_unchecked(CardId(3));
    }
}
