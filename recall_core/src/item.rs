//! Typed list entries for presentation layers.

use crate::{Card, Deck};

/// Something a list widget can display and filter
#[derive(Clone, Copy, Debug)]
pub enum ListItem<'a> {
    Deck(&'a Deck),
    Card(&'a Card),
}

impl<'a> ListItem<'a> {
    pub fn title(&self) -> &'a str {
        match self {
            ListItem::Deck(deck) => deck.name(),
            ListItem::Card(card) => &card.front,
        }
    }

    pub fn subtitle(&self) -> String {
        match self {
            ListItem::Deck(deck) => {
                let counts = deck.counts();
                format!(
                    "New: {} | Learning: {} | Review: {}",
                    counts.new, counts.learning, counts.review
                )
            }
            ListItem::Card(card) => card.back.clone(),
        }
    }

    /// Text matched against a list filter
    pub fn filter_value(&self) -> &'a str {
        self.title()
    }

    /// Case-insensitive substring match on `filter_value`
    pub fn matches(&self, query: &str) -> bool {
        self.filter_value()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

impl<'a> From<&'a Deck> for ListItem<'a> {
    fn from(deck: &'a Deck) -> Self {
        ListItem::Deck(deck)
    }
}

impl<'a> From<&'a Card> for ListItem<'a> {
    fn from(card: &'a Card) -> Self {
        ListItem::Card(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_item() {
        let card = Card::new("¿Qué tal?", "How are you?");
        let item = ListItem::from(&card);
        assert_eq!(item.title(), "¿Qué tal?");
        assert_eq!(item.subtitle(), "How are you?");
        assert!(item.matches("qué"));
        assert!(!item.matches("how"));
    }

    #[test]
    fn test_deck_item() {
        let deck = Deck::new("Spanish", "spanish", vec![Card::new("a", "b")]);
        let item = ListItem::from(&deck);
        assert_eq!(item.title(), "Spanish");
        assert_eq!(item.subtitle(), "New: 1 | Learning: 0 | Review: 0");
        assert_eq!(item.filter_value(), "Spanish");
    }
}
