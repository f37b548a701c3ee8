//! The turn engine: a single mutable aggregate owning the deck, hands,
//! discard pile and turn order, advanced one validated move at a time.
//!
//! The engine itself is synchronous and single-threaded; exclusive
//! ownership across connected players is the room actor's job.

use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};
use thiserror::Error;

use super::constants::{DEFAULT_STARTING_HAND_SIZE, MAX_SEATS, MIN_SEATS};
use super::entities::{
    Card, Colour, Deck, Direction, DiscardPile, GameView, Kind, Move, Player, SeatIndex, SeatView,
    Username,
};

/// Errors a submitted move can be rejected with. None of these end the
/// match.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum UserError {
    #[error("hand position out of range")]
    InvalidIndex,
    #[error("that card can't be played on the discard pile")]
    NotPlayable,
    #[error("not your turn")]
    OutOfTurn,
    #[error("the game is already over")]
    GameAlreadyOver,
    #[error("a match needs 2 to 5 seated players")]
    InvalidSeatCount,
}

/// Events that occur during gameplay. Their display strings are shown
/// to every connected player and appended to the journal.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameEvent {
    Played(Username, Card),
    Drew(Username),
    ForcedDraw(Username, usize),
    PenaltyDraw(Username),
    TurnSkipped(Username),
    DirectionReversed(Direction),
    ColourChosen(Username, Colour),
    OneCardLeft(Username),
    Won(Username),
    SeatDeactivated(Username),
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Played(username, card) => format!("{username} plays {card}"),
            Self::Drew(username) => format!("{username} draws a card"),
            Self::ForcedDraw(username, count) => {
                format!("{username} draws {count} cards and is skipped")
            }
            Self::PenaltyDraw(username) => format!("{username} draws a penalty card"),
            Self::TurnSkipped(username) => format!("{username} is skipped"),
            Self::DirectionReversed(direction) => format!("play direction is now {direction}"),
            Self::ColourChosen(username, colour) => format!("{username} chooses {colour}"),
            Self::OneCardLeft(username) => format!("{username} has one card left!"),
            Self::Won(username) => format!("{username} wins the game"),
            Self::SeatDeactivated(username) => format!("{username} left the game"),
        };
        write!(f, "{repr}")
    }
}

/// Game configuration settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub starting_hand_size: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_hand_size: DEFAULT_STARTING_HAND_SIZE,
        }
    }
}

/// The shared game state: deck, discard pile, seats, and turn order.
/// Every mutation happens through [`GameState::apply_move`] or
/// [`GameState::deactivate`], both driven by the room actor.
#[derive(Debug)]
pub struct GameState {
    deck: Deck,
    discard: DiscardPile,
    players: Vec<Player>,
    current_player: SeatIndex,
    direction: Direction,
    winner: Option<SeatIndex>,
    game_over: bool,
    events: VecDeque<GameEvent>,
}

impl GameState {
    /// Deal a fresh match for the given seats, in join order. The
    /// starting discard is redrawn (reshuffling the rejected card back
    /// in) until it is a number card, so the first top card never
    /// carries an effect.
    pub fn new(names: Vec<Username>, settings: &GameSettings) -> Result<Self, UserError> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&names.len()) {
            return Err(UserError::InvalidSeatCount);
        }
        let mut deck = Deck::default();
        deck.shuffle();
        let mut players: Vec<Player> = names
            .into_iter()
            .enumerate()
            .map(|(seat, name)| Player::new(name, seat))
            .collect();
        for _ in 0..settings.starting_hand_size {
            for player in &mut players {
                player.add_card(deck.draw());
            }
        }
        let first = loop {
            let card = deck.draw();
            if card.is_number() {
                break card;
            }
            deck.shuffle();
        };
        Ok(Self {
            deck,
            discard: DiscardPile::new(first),
            players,
            current_player: 0,
            direction: Direction::Clockwise,
            winner: None,
            game_over: false,
            events: VecDeque::new(),
        })
    }

    #[must_use]
    pub fn current_player(&self) -> SeatIndex {
        self.current_player
    }

    #[must_use]
    pub fn current_username(&self) -> &Username {
        &self.players[self.current_player].name
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn top_card(&self) -> Card {
        self.discard.top()
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|seat| &self.players[seat])
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active).count()
    }

    pub fn drain_events(&mut self) -> VecDeque<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The state as seen from one seat: the seat's own hand plus the
    /// public card counts of everyone else.
    #[must_use]
    pub fn view_for(&self, seat: SeatIndex) -> GameView {
        GameView {
            top_card: self.discard.top(),
            hand: self.players[seat].hand.clone(),
            seats: self
                .players
                .iter()
                .map(|p| SeatView {
                    name: p.name.clone(),
                    cards_remaining: p.hand.len(),
                    is_active: p.is_active,
                })
                .collect(),
            current_player: self.players[self.current_player].name.clone(),
            direction: self.direction,
        }
    }

    /// Validate and apply one move from `seat`.
    ///
    /// A draw is always legal and consumes the turn. A play must name a
    /// card in the hand (an out-of-range position costs the submitter a
    /// penalty draw) and that card must be legal on the discard top.
    /// Rejected moves leave the turn with the submitter so they can
    /// resubmit. An emptied hand wins immediately, superseding any turn
    /// advance.
    pub fn apply_move(&mut self, seat: SeatIndex, mv: Move) -> Result<(), UserError> {
        if self.game_over {
            return Err(UserError::GameAlreadyOver);
        }
        if seat != self.current_player {
            return Err(UserError::OutOfTurn);
        }
        match mv {
            Move::Draw => {
                let card = self.deck.draw();
                self.players[seat].add_card(card);
                let name = self.players[seat].name.clone();
                self.events.push_back(GameEvent::Drew(name));
                self.advance(1);
            }
            Move::Play { index, colour } => {
                if index >= self.players[seat].hand.len() {
                    let card = self.deck.draw();
                    self.players[seat].add_card(card);
                    let name = self.players[seat].name.clone();
                    self.events.push_back(GameEvent::PenaltyDraw(name));
                    return Err(UserError::InvalidIndex);
                }
                if !self.players[seat].hand[index].is_playable_on(self.discard.top()) {
                    return Err(UserError::NotPlayable);
                }
                let card = self.players[seat].remove_card(index);
                self.discard.play(card);
                let name = self.players[seat].name.clone();
                self.events.push_back(GameEvent::Played(name.clone(), card));
                if matches!(card.kind, Kind::Wild | Kind::WildDrawFour) {
                    let chosen = colour
                        .filter(|c| Colour::CHOOSABLE.contains(c))
                        .unwrap_or(Colour::Red);
                    self.discard.recolour_top(chosen);
                    self.events
                        .push_back(GameEvent::ColourChosen(name.clone(), chosen));
                }
                if self.players[seat].is_hand_empty() {
                    self.declare_winner(seat);
                    return Ok(());
                }
                if self.players[seat].hand.len() == 1 {
                    self.events.push_back(GameEvent::OneCardLeft(name));
                }
                self.resolve_effect(card);
            }
        }
        Ok(())
    }

    /// Take `seat` out of the rotation (disconnect). If it was their
    /// turn the rotation advances past them; if only one active seat
    /// remains the match ends with that seat as winner, since the
    /// rotation can no longer continue.
    pub fn deactivate(&mut self, seat: SeatIndex) {
        if self.game_over || !self.players[seat].is_active {
            return;
        }
        self.players[seat].is_active = false;
        let name = self.players[seat].name.clone();
        self.events.push_back(GameEvent::SeatDeactivated(name));
        if self.active_count() == 1 {
            if let Some(last) = self.players.iter().position(|p| p.is_active) {
                self.declare_winner(last);
            }
        } else if seat == self.current_player {
            self.advance(1);
        }
    }

    fn resolve_effect(&mut self, card: Card) {
        match card.kind {
            Kind::Number(_) | Kind::Wild => self.advance(1),
            Kind::Skip => {
                let victim = self.nth_active(1);
                let name = self.players[victim].name.clone();
                self.events.push_back(GameEvent::TurnSkipped(name));
                self.advance(2);
            }
            Kind::Reverse => {
                self.direction = self.direction.flip();
                self.events
                    .push_back(GameEvent::DirectionReversed(self.direction));
                // With two active seats a reverse comes straight back
                // around: the same player acts again, like a skip.
                if self.active_count() > 2 {
                    self.advance(1);
                }
            }
            Kind::DrawTwo => self.forced_draw(2),
            Kind::WildDrawFour => self.forced_draw(4),
        }
    }

    fn forced_draw(&mut self, count: usize) {
        let victim = self.nth_active(1);
        for _ in 0..count {
            let card = self.deck.draw();
            self.players[victim].add_card(card);
        }
        let name = self.players[victim].name.clone();
        self.events.push_back(GameEvent::ForcedDraw(name, count));
        self.advance(2);
    }

    /// The seat `steps` active seats away from the current player along
    /// the play direction. Inactive seats are skipped, so the turn
    /// rotation only ever visits connected players. Callers keep at
    /// least two seats active.
    fn nth_active(&self, steps: usize) -> SeatIndex {
        let seats = self.players.len();
        let mut seat = self.current_player;
        let mut remaining = steps;
        while remaining > 0 {
            seat = self.direction.step(seat, seats);
            if self.players[seat].is_active {
                remaining -= 1;
            }
        }
        seat
    }

    fn advance(&mut self, steps: usize) {
        self.current_player = self.nth_active(steps);
    }

    fn declare_winner(&mut self, seat: SeatIndex) {
        self.winner = Some(seat);
        self.game_over = true;
        let name = self.players[seat].name.clone();
        self.events.push_back(GameEvent::Won(name));
    }
}
