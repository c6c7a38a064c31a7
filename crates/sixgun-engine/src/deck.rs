//! Draw pile and discard pile of one game.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use sixgun_protocol::{Card, CardId};

use crate::CardDef;

/// The two shared piles. The front of the draw pile is the lowest
/// position and is always drawn first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    draw_pile: VecDeque<Card>,
    discard_pile: Vec<Card>,
}

impl Deck {
    /// Expands every definition into `copies` instances. Ids start at 1
    /// and follow catalogue order.
    pub fn build(defs: &[CardDef]) -> Self {
        let mut draw_pile = VecDeque::new();
        let mut next_id = 1;
        for def in defs {
            for _ in 0..def.copies {
                draw_pile.push_back(Card {
                    id: CardId(next_id),
                    name: def.name.clone(),
                    kind: def.kind,
                });
                next_id += 1;
            }
        }
        Self {
            draw_pile,
            discard_pile: Vec::new(),
        }
    }

    /// Removes the lowest-position card, or `None` when the pile is empty.
    pub fn draw(&mut self) -> Option<Card> {
        self.draw_pile.pop_front()
    }

    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    /// Pulls a specific card back out of the discard pile.
    pub fn take_discarded(&mut self, id: CardId) -> Option<Card> {
        let pos = self.discard_pile.iter().position(|c| c.id == id)?;
        Some(self.discard_pile.remove(pos))
    }

    /// Moves the whole discard pile under the draw pile in a fresh random
    /// order. Returns the new draw pile size.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut pile = std::mem::take(&mut self.discard_pile);
        pile.shuffle(rng);
        self.draw_pile.extend(pile);
        self.draw_pile.len()
    }

    /// Randomizes the draw pile in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.draw_pile.make_contiguous().shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_pile.is_empty()
    }

    pub fn discard_len(&self) -> usize {
        self.discard_pile.len()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    /// Cards in draw order.
    pub fn draw_pile(&self) -> impl Iterator<Item = &Card> {
        self.draw_pile.iter()
    }
}
