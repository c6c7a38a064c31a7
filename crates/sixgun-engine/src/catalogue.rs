//! Static game content: cards, roles, and characters.

use serde::{Deserialize, Serialize};
use sixgun_protocol::CardKind;

pub const BANG: &str = "Bang!";
pub const MISSED: &str = "Missed!";
pub const BEER: &str = "Beer";
pub const JAIL: &str = "Jail";
pub const DYNAMITE: &str = "Dynamite";
pub const BARREL: &str = "Barrel";

/// The one role whose holder is public and starts with an extra life point.
pub const SHERIFF: &str = "Sheriff";

/// A card as printed: how many copies go into a fresh deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDef {
    pub name: String,
    pub kind: CardKind,
    pub copies: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDef {
    pub id: u32,
    pub name: String,
    pub description: String,
}

impl RoleDef {
    pub fn is_sheriff(&self) -> bool {
        self.name == SHERIFF
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDef {
    pub name: String,
    pub description: String,
    /// Starting health before the Sheriff bonus.
    pub health: u32,
}

/// Everything a game is dealt from.
///
/// Role order matters: a game with `n` players uses the first `n` roles,
/// so the classic table always contains a Sheriff, a Renegade and two
/// Outlaws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    pub cards: Vec<CardDef>,
    pub roles: Vec<RoleDef>,
    pub characters: Vec<CharacterDef>,
}

impl Catalogue {
    /// The stock card set, the seven-player role table, and the sixteen
    /// base-game characters.
    pub fn classic() -> Self {
        let cards = vec![
            card(BANG, CardKind::Action, 25, "Shoot a player; they lose one life point unless they dodge."),
            card(MISSED, CardKind::Action, 12, "Cancels a Bang! aimed at you."),
            card(BEER, CardKind::Action, 6, "Regain one life point."),
            card(JAIL, CardKind::Status, 3, "Put another player in jail."),
            card(DYNAMITE, CardKind::Status, 1, "May explode for three damage, otherwise passes to the left."),
            card(BARREL, CardKind::Action, 2, "A fifty-fifty chance to dodge."),
        ];

        let roles = [
            (SHERIFF, "Kill all the Outlaws and the Renegade."),
            ("Renegade", "Be the last one standing."),
            ("Outlaw", "Kill the Sheriff."),
            ("Outlaw", "Kill the Sheriff."),
            ("Deputy", "Protect the Sheriff."),
            ("Outlaw", "Kill the Sheriff."),
            ("Deputy", "Protect the Sheriff."),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, description))| RoleDef {
            id: i as u32 + 1,
            name: name.into(),
            description: description.into(),
        })
        .collect();

        let characters = [
            ("Bart Cassidy", "Draws a card each time he is hit.", 4),
            ("Black Jack", "Shows his second draw; draws again on hearts or diamonds.", 4),
            ("Calamity Janet", "Uses Bang! and Missed! interchangeably.", 4),
            ("El Gringo", "Draws from the hand of whoever hits him.", 3),
            ("Jesse Jones", "May draw his first card from another player's hand.", 4),
            ("Jourdonnais", "Always counts as having a Barrel in play.", 4),
            ("Kit Carlson", "Looks at three cards and keeps two.", 4),
            ("Lucky Duke", "Flips two cards for every draw! and picks one.", 4),
            ("Paul Regret", "Others see him at one more distance.", 3),
            ("Pedro Ramirez", "May draw his first card from the discard pile.", 4),
            ("Rose Doolan", "Sees everyone at one less distance.", 4),
            ("Sid Ketchum", "Discards two cards to regain one life point.", 4),
            ("Slab the Killer", "Needs two Missed! to cancel his Bang!.", 4),
            ("Suzy Lafayette", "Draws a card when her hand is empty.", 4),
            ("Vulture Sam", "Takes the cards of every eliminated player.", 4),
            ("Willy the Kid", "Plays any number of Bang! cards.", 4),
        ]
        .into_iter()
        .map(|(name, description, health)| CharacterDef {
            name: name.into(),
            description: description.into(),
            health,
        })
        .collect();

        Self {
            cards,
            roles,
            characters,
        }
    }

    /// Number of card instances a fresh deck contains.
    pub fn total_copies(&self) -> usize {
        self.cards.iter().map(|c| c.copies as usize).sum()
    }

    pub fn card(&self, name: &str) -> Option<&CardDef> {
        self.cards.iter().find(|c| c.name == name)
    }
}

fn card(name: &str, kind: CardKind, copies: u32, description: &str) -> CardDef {
    CardDef {
        name: name.into(),
        kind,
        copies,
        description: description.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_classic_card_copies() {
        let cat = Catalogue::classic();
        assert_eq!(cat.card(BANG).map(|c| c.copies), Some(25));
        assert_eq!(cat.card(MISSED).map(|c| c.copies), Some(12));
        assert_eq!(cat.card(BEER).map(|c| c.copies), Some(6));
        assert_eq!(cat.total_copies(), 49);
    }

    #[test]
    fn test_classic_roles_start_with_sheriff() {
        let cat = Catalogue::classic();
        assert_eq!(cat.roles.len(), 7);
        assert!(cat.roles[0].is_sheriff());
        assert_eq!(cat.roles.iter().filter(|r| r.is_sheriff()).count(), 1);
    }

    #[test]
    fn test_classic_role_ids_are_distinct() {
        let cat = Catalogue::classic();
        let ids: HashSet<u32> = cat.roles.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), cat.roles.len());
    }

    #[test]
    fn test_classic_characters_are_unique() {
        let cat = Catalogue::classic();
        let names: HashSet<&str> = cat.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 16);
        assert!(cat.characters.iter().all(|c| c.health == 3 || c.health == 4));
    }
}
