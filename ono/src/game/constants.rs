//! Game-wide constants.

/// Fewest seats a match can start with.
pub const MIN_SEATS: usize = 2;

/// Most seats a match can start with.
pub const MAX_SEATS: usize = 5;

/// Copies of each number card (0-9) per colour.
pub const NUMBER_COPIES: usize = 4;

/// Copies of each of skip/reverse/draw-two per colour.
pub const POWER_COPIES: usize = 3;

/// Copies of the plain wild card in the deck.
pub const WILD_COPIES: usize = 4;

/// Copies of the wild-draw-four card in the deck.
pub const WILD_DRAW_FOUR_COPIES: usize = 8;

/// Total deck size. The deck is circular (reshuffled in place when the
/// cursor reaches the end), so this is also the number of draws between
/// reshuffles.
pub const DECK_SIZE: usize =
    4 * (10 * NUMBER_COPIES + 3 * POWER_COPIES) + WILD_COPIES + WILD_DRAW_FOUR_COPIES;

/// Defensive cap on hand size. Unreachable under normal play; `add_card`
/// silently drops cards beyond it.
pub const MAX_HAND_SIZE: usize = 64;

/// Cards dealt to each seat at the start of a match.
pub const DEFAULT_STARTING_HAND_SIZE: usize = 8;

/// Usernames are truncated to this many characters.
pub const MAX_NAME_LENGTH: usize = 50;
