//! Board generation
//!
//! A board is `2 * pairs` cards holding exactly two copies of each of the
//! first `pairs` palette symbols, in shuffled order.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Card face symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Star,
    Balloon,
    Palette,
    Target,
    CircusTent,
    Masks,
    Guitar,
    Trumpet,
    Basketball,
    Soccer,
    Rainbow,
    Hibiscus,
    Pizza,
    Burger,
    Rocket,
    Ufo,
}

/// Fixed palette, dealt in order (level 1 uses the first two)
pub const PALETTE: [Symbol; 16] = [
    Symbol::Star,
    Symbol::Balloon,
    Symbol::Palette,
    Symbol::Target,
    Symbol::CircusTent,
    Symbol::Masks,
    Symbol::Guitar,
    Symbol::Trumpet,
    Symbol::Basketball,
    Symbol::Soccer,
    Symbol::Rainbow,
    Symbol::Hibiscus,
    Symbol::Pizza,
    Symbol::Burger,
    Symbol::Rocket,
    Symbol::Ufo,
];

impl Symbol {
    /// Glyph shown on the card face
    pub fn glyph(&self) -> &'static str {
        match self {
            Symbol::Star => "⭐",
            Symbol::Balloon => "🎈",
            Symbol::Palette => "🎨",
            Symbol::Target => "🎯",
            Symbol::CircusTent => "🎪",
            Symbol::Masks => "🎭",
            Symbol::Guitar => "🎸",
            Symbol::Trumpet => "🎺",
            Symbol::Basketball => "🏀",
            Symbol::Soccer => "⚽",
            Symbol::Rainbow => "🌈",
            Symbol::Hibiscus => "🌺",
            Symbol::Pizza => "🍕",
            Symbol::Burger => "🍔",
            Symbol::Rocket => "🚀",
            Symbol::Ufo => "🛸",
        }
    }
}

/// A single card on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Position index on the board
    pub id: usize,
    pub symbol: Symbol,
    pub is_matched: bool,
}

/// The dealt cards for one level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Build a board from symbols in deal order
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        let cards = symbols
            .iter()
            .enumerate()
            .map(|(id, &symbol)| Card {
                id,
                symbol,
                is_matched: false,
            })
            .collect();
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: usize) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of distinct pairs dealt
    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    /// Number of pairs already matched
    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.is_matched).count() / 2
    }

    /// True once every card is matched
    pub fn is_cleared(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.is_matched)
    }

    /// Mark a card matched; returns false for an unknown id
    pub fn mark_matched(&mut self, id: usize) -> bool {
        match self.cards.get_mut(id) {
            Some(card) => {
                card.is_matched = true;
                true
            }
            None => false,
        }
    }
}

/// Shuffle symbols in place (uniform Fisher-Yates)
pub fn shuffle_symbols<R: Rng + ?Sized>(symbols: &mut [Symbol], rng: &mut R) {
    symbols.shuffle(rng);
}

/// Deal a shuffled board of `pairs` pairs
///
/// `pairs` is capped at the palette size.
pub fn generate_board<R: Rng + ?Sized>(pairs: usize, rng: &mut R) -> Board {
    let pairs = pairs.min(PALETTE.len());
    let selected = &PALETTE[..pairs];

    let mut symbols: Vec<Symbol> = Vec::with_capacity(pairs * 2);
    symbols.extend_from_slice(selected);
    symbols.extend_from_slice(selected);
    shuffle_symbols(&mut symbols, rng);

    Board::from_symbols(&symbols)
}
