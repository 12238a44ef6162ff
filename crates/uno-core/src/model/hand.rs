use crate::model::card::{Card, TopCard};
use crate::model::color::Color;

/// Our own hand, kept sorted so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(mut cards: Vec<Card>) -> Self {
        cards.sort();
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn add(&mut self, card: Card) {
        let at = self.cards.partition_point(|held| *held <= card);
        self.cards.insert(at, card);
    }

    /// Removes one copy of `card`. Returns false if the hand holds none.
    pub fn remove(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|held| *held == card) {
            Some(at) => {
                self.cards.remove(at);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn count_of(&self, card: Card) -> usize {
        self.cards.iter().filter(|held| **held == card).count()
    }

    /// Colored cards of the given color, wilds excluded.
    pub fn color_count(&self, color: Color) -> usize {
        self.cards
            .iter()
            .filter(|card| card.color() == Some(color))
            .count()
    }

    /// Cards legal to play against the given top.
    pub fn legal_plays(&self, top: &TopCard) -> Vec<Card> {
        self.cards
            .iter()
            .copied()
            .filter(|card| card.matches(top))
            .collect()
    }

    /// Cards in `seen` that this hand does not account for, as a multiset
    /// difference. Used to pick up draws the dealer never itemized.
    pub fn multiset_new(&self, seen: &[Card]) -> Vec<Card> {
        let mut remaining = self.cards.clone();
        let mut fresh = Vec::new();
        for card in seen {
            match remaining.iter().position(|held| held == card) {
                Some(at) => {
                    remaining.remove(at);
                }
                None => fresh.push(*card),
            }
        }
        fresh
    }

    /// Replaces the hand wholesale, resorting.
    pub fn replace(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.cards.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::{Card, TopCard};
    use crate::model::color::Color;
    use crate::model::kind::WildKind;
    use crate::model::rank::Rank;

    #[test]
    fn remove_takes_one_copy() {
        let card = Card::numeral(Color::Red, Rank::Five);
        let mut hand = Hand::from_cards(vec![card, card]);
        assert!(hand.remove(card));
        assert_eq!(hand.count_of(card), 1);
        assert!(hand.remove(card));
        assert!(!hand.remove(card));
    }

    #[test]
    fn legal_plays_filters_by_top() {
        let hand = Hand::from_cards(vec![
            Card::numeral(Color::Red, Rank::Five),
            Card::numeral(Color::Blue, Rank::Five),
            Card::Wild(WildKind::Wild),
        ]);
        let top = TopCard::colored(Card::numeral(Color::Red, Rank::Seven));
        let legal = hand.legal_plays(&top);
        assert_eq!(
            legal,
            vec![
                Card::numeral(Color::Red, Rank::Five),
                Card::Wild(WildKind::Wild),
            ]
        );
    }

    #[test]
    fn multiset_new_spots_extra_copies() {
        let card = Card::numeral(Color::Green, Rank::Nine);
        let hand = Hand::from_cards(vec![card]);
        let fresh = hand.multiset_new(&[card, card, Card::Wild(WildKind::Wild)]);
        assert_eq!(fresh, vec![card, Card::Wild(WildKind::Wild)]);
    }
}
