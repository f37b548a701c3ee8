use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::constants::{
    DECK_SIZE, MAX_HAND_SIZE, MAX_NAME_LENGTH, NUMBER_COPIES, POWER_COPIES, WILD_COPIES,
    WILD_DRAW_FOUR_COPIES,
};

/// Card colours. `Wild` is the colour wild cards carry while they sit in a
/// hand or in the deck; it matches every other colour during legality
/// checks. The first choosable colour (red) is the default when a wild is
/// played without a colour choice.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Colour {
    Red,
    Blue,
    Green,
    Yellow,
    Wild,
}

impl Colour {
    /// Colours a player may choose when playing a wild card, in wire-code
    /// order (codes 1 through 4).
    pub const CHOOSABLE: [Self; 4] = [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    /// Map a wire colour code (1-4) to a colour. Code 0 means
    /// "unspecified" and is handled by the move parser.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Red),
            2 => Some(Self::Blue),
            3 => Some(Self::Green),
            4 => Some(Self::Yellow),
            _ => None,
        }
    }

    /// The wire code for this colour. `Wild` has no code and maps to 0.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Red => 1,
            Self::Blue => 2,
            Self::Green => 3,
            Self::Yellow => 4,
            Self::Wild => 0,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Wild => "wild",
        };
        write!(f, "{repr}")
    }
}

/// What a card does. Number cards carry their digit so a digit can only
/// exist on a number card.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Kind {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

/// A card. Compared by attributes only; two red fives are
/// interchangeable.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card {
    pub colour: Colour,
    pub kind: Kind,
}

impl Card {
    #[must_use]
    pub const fn new(colour: Colour, kind: Kind) -> Self {
        Self { colour, kind }
    }

    #[must_use]
    pub const fn wild() -> Self {
        Self::new(Colour::Wild, Kind::Wild)
    }

    #[must_use]
    pub const fn wild_draw_four() -> Self {
        Self::new(Colour::Wild, Kind::WildDrawFour)
    }

    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(self.kind, Kind::Number(_))
    }

    /// Legality of playing `self` on top of `top`. An OR of four
    /// independent rules: matching digits, matching colours (a
    /// wild-coloured top matches everything), matching non-number kinds,
    /// or `self` being a wild. No rule takes precedence and there are no
    /// extra house rules.
    #[must_use]
    pub fn is_playable_on(self, top: Self) -> bool {
        let digits_match =
            matches!((self.kind, top.kind), (Kind::Number(a), Kind::Number(b)) if a == b);
        let colours_match = self.colour == top.colour || top.colour == Colour::Wild;
        let kinds_match = !self.is_number() && !top.is_number() && self.kind == top.kind;
        let always_playable = matches!(self.kind, Kind::Wild | Kind::WildDrawFour);
        digits_match || colours_match || kinds_match || always_playable
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Number(digit) => write!(f, "{} {digit}", self.colour),
            Kind::Skip => write!(f, "{} skip", self.colour),
            Kind::Reverse => write!(f, "{} reverse", self.colour),
            Kind::DrawTwo => write!(f, "{} draw-two", self.colour),
            Kind::Wild if self.colour == Colour::Wild => write!(f, "wild"),
            Kind::Wild => write!(f, "wild ({})", self.colour),
            Kind::WildDrawFour if self.colour == Colour::Wild => write!(f, "wild draw-four"),
            Kind::WildDrawFour => write!(f, "wild draw-four ({})", self.colour),
        }
    }
}

/// A circular deck of cards with a draw cursor. Drawing past the end
/// reshuffles the backing array in place and wraps around, so drawing
/// never fails; cards are never removed from the deck.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    pub cursor: usize,
}

impl Deck {
    /// Deal the card under the cursor, reshuffling first if the cursor
    /// has reached the end of the deck.
    pub fn draw(&mut self) -> Card {
        if self.cursor == self.cards.len() {
            self.shuffle();
        }
        let card = self.cards[self.cursor];
        self.cursor += 1;
        card
    }

    /// Uniform in-place permutation of the whole backing array; resets
    /// the cursor.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.cursor = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[cfg(test)]
    fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    /// The fixed 208-card composition: per colour, four copies of each
    /// digit 0-9 and three copies each of skip/reverse/draw-two, plus
    /// four wilds and eight wild-draw-fours.
    fn default() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for colour in Colour::CHOOSABLE {
            for digit in 0..10 {
                for _ in 0..NUMBER_COPIES {
                    cards.push(Card::new(colour, Kind::Number(digit)));
                }
            }
            for kind in [Kind::Skip, Kind::Reverse, Kind::DrawTwo] {
                for _ in 0..POWER_COPIES {
                    cards.push(Card::new(colour, kind));
                }
            }
        }
        for _ in 0..WILD_COPIES {
            cards.push(Card::wild());
        }
        for _ in 0..WILD_DRAW_FOUR_COPIES {
            cards.push(Card::wild_draw_four());
        }
        Self { cards, cursor: 0 }
    }
}

/// The pile of played cards. Seeded with a starting card at match setup
/// and never emptied, so `top` is always present. Only the top card is
/// consulted for legality.
#[derive(Clone, Debug)]
pub struct DiscardPile {
    cards: Vec<Card>,
}

impl DiscardPile {
    #[must_use]
    pub fn new(first: Card) -> Self {
        Self { cards: vec![first] }
    }

    #[must_use]
    pub fn top(&self) -> Card {
        self.cards[self.cards.len() - 1]
    }

    pub fn play(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Overwrite the top card's colour. Used when a wild is played: the
    /// card keeps its identity but takes the chosen colour for future
    /// legality checks.
    pub fn recolour_top(&mut self, colour: Colour) {
        let last = self.cards.len() - 1;
        self.cards[last].colour = colour;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Type alias for seat positions at the table.
pub type SeatIndex = usize;

/// Direction of play around the table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Direction {
    Clockwise,
    Anticlockwise,
}

impl Direction {
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Clockwise => Self::Anticlockwise,
            Self::Anticlockwise => Self::Clockwise,
        }
    }

    /// The seat one step from `seat` in this direction at a table of
    /// `seats` seats.
    #[must_use]
    pub fn step(self, seat: SeatIndex, seats: usize) -> SeatIndex {
        match self {
            Self::Clockwise => (seat + 1) % seats,
            Self::Anticlockwise => (seat + seats - 1) % seats,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Clockwise => "clockwise",
            Self::Anticlockwise => "anti-clockwise",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        username.truncate(MAX_NAME_LENGTH);
        Self(username)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// A seat at the table. The hand is a multiset; its order carries no
/// meaning to the rules, only to on-screen display.
#[derive(Clone, Debug)]
pub struct Player {
    pub name: Username,
    pub seat: SeatIndex,
    pub hand: Vec<Card>,
    pub is_active: bool,
}

impl Player {
    #[must_use]
    pub fn new(name: Username, seat: SeatIndex) -> Self {
        Self {
            name,
            seat,
            hand: Vec::with_capacity(MAX_HAND_SIZE),
            is_active: true,
        }
    }

    /// Append a card to the hand. Silently capped at `MAX_HAND_SIZE`;
    /// the cap is a defensive bound, not a game rule, and is unreachable
    /// under normal play.
    pub fn add_card(&mut self, card: Card) {
        if self.hand.len() < MAX_HAND_SIZE {
            self.hand.push(card);
        }
    }

    /// Remove the card at `index`, compacting by swapping with the last
    /// card. Callers validate the index first.
    pub fn remove_card(&mut self, index: usize) -> Card {
        self.hand.swap_remove(index)
    }

    #[must_use]
    pub fn is_hand_empty(&self) -> bool {
        self.hand.is_empty()
    }
}

/// A single turn's worth of intent. Parsed from the text wire form at
/// the boundary (`"DRAW"` or `"MOVE <1-based-index> <colour-code>"`)
/// so the engine never sees raw text; `index` is 0-based internally.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Move {
    Draw,
    Play {
        index: usize,
        colour: Option<Colour>,
    },
}

#[derive(Debug, Eq, Error, PartialEq)]
pub enum ParseMoveError {
    #[error("empty move")]
    Empty,
    #[error("unknown move verb: {0}")]
    UnknownVerb(String),
    #[error("hand index must be a number of at least 1")]
    BadIndex,
    #[error("colour code must be 0 (unspecified) through 4")]
    BadColour,
    #[error("trailing input after move")]
    TrailingInput,
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let parsed = match parts.next() {
            None => return Err(ParseMoveError::Empty),
            Some("DRAW") => Self::Draw,
            Some("MOVE") => {
                let index: usize = parts
                    .next()
                    .and_then(|t| t.parse().ok())
                    .filter(|&i| i >= 1)
                    .ok_or(ParseMoveError::BadIndex)?;
                let code: u8 = parts
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or(ParseMoveError::BadColour)?;
                let colour = match code {
                    0 => None,
                    c => Some(Colour::from_code(c).ok_or(ParseMoveError::BadColour)?),
                };
                Self::Play {
                    index: index - 1,
                    colour,
                }
            }
            Some(other) => return Err(ParseMoveError::UnknownVerb(other.to_string())),
        };
        if parts.next().is_some() {
            return Err(ParseMoveError::TrailingInput);
        }
        Ok(parsed)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draw => write!(f, "DRAW"),
            Self::Play { index, colour } => {
                write!(f, "MOVE {} {}", index + 1, colour.map_or(0, Colour::code))
            }
        }
    }
}

/// What one seat is shown after a state change: its own hand, the
/// public card counts of every seat, and the turn context.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeatView {
    pub name: Username,
    pub cards_remaining: usize,
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameView {
    pub top_card: Card,
    pub hand: Vec<Card>,
    pub seats: Vec<SeatView>,
    pub current_player: Username,
    pub direction: Direction,
}
