use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

use super::constants::{DECK_SIZE, MAX_NAME_LENGTH};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Suit {
    Spade,
    Club,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Club, Suit::Diamond, Suit::Heart];

    pub fn code(self) -> char {
        match self {
            Self::Spade => 'S',
            Self::Club => 'C',
            Self::Diamond => 'D',
            Self::Heart => 'H',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|suit| suit.code() == c)
    }
}

/// Card ranks in deck order. `Jack` doubles as the joker trigger.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn code(self) -> char {
        match self {
            Self::Ace => 'A',
            Self::Two => '2',
            Self::Three => '3',
            Self::Four => '4',
            Self::Five => '5',
            Self::Six => '6',
            Self::Seven => '7',
            Self::Eight => '8',
            Self::Nine => '9',
            Self::Ten => 'T',
            Self::Jack => 'J',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.code() == c)
    }
}

/// A face card, sent over the wire as a two character code such as `"TH"`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn is_joker(&self) -> bool {
        self.rank == Rank::Jack
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.code(), self.suit.code())
    }
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("invalid card code {0:?}")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(rank), Some(suit), None) => Rank::from_code(rank).zip(Suit::from_code(suit)),
            _ => None,
        };
        parsed
            .map(|(rank, suit)| Card::new(rank, suit))
            .ok_or_else(|| ParseCardError(s.to_string()))
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Splits the deck into exactly `hands` contiguous chunks of equal size.
    /// Cards left over when the deck doesn't divide evenly are not dealt, so a
    /// deck shorter than `hands` yields empty hands.
    pub fn deal(self, hands: usize) -> Vec<Vec<Card>> {
        let per_hand = self.cards.len().checked_div(hands).unwrap_or(0);
        (0..hands)
            .map(|i| self.cards[i * per_hand..(i + 1) * per_hand].to_vec())
            .collect()
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for rank in Rank::ALL {
            for suit in Suit::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }
}

/// A pre-arranged deck, dealt without shuffling.
impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

/// Opaque session identity of a seated player.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let name: String = s
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .take(MAX_NAME_LENGTH)
            .collect();
        Self(name)
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for PlayerName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One seat at the table.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    /// Drawn from the back.
    pub draw_deck: Vec<Card>,
    pub used_stack: Vec<Card>,
    pub active_card: Option<Card>,
}

impl Player {
    pub fn new(id: PlayerId, name: PlayerName) -> Self {
        Self {
            id,
            name,
            draw_deck: vec![],
            used_stack: vec![],
            active_card: None,
        }
    }

    pub fn reset(&mut self, draw_deck: Vec<Card>) {
        self.draw_deck = draw_deck;
        self.used_stack.clear();
        self.active_card = None;
    }

    /// Puts `cards` underneath the draw deck, keeping their order, so they
    /// are drawn only after everything already in the deck.
    pub fn prepend_to_deck(&mut self, cards: Vec<Card>) {
        self.draw_deck.splice(0..0, cards);
    }

    /// Total cards this player is still holding, face-up card included.
    pub fn card_count(&self) -> usize {
        self.draw_deck.len() + self.used_stack.len() + usize::from(self.active_card.is_some())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Playing => "playing",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}
