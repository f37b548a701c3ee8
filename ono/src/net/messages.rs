use serde::{Deserialize, Serialize};
use std::fmt;

use super::super::game::{
    GameEvent, UserError,
    entities::{Card, GameView, Move, Username},
};

/// Errors due to the client's interaction with the server itself,
/// rather than from a move the user made.
#[derive(Clone, Debug, Deserialize, Eq, thiserror::Error, PartialEq, Serialize)]
pub enum ClientError {
    #[error("username already taken")]
    AlreadyTaken,
    #[error("expected a connect handshake")]
    InvalidHandshake,
}

/// A user command.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum UserCommand {
    /// A new user wants to join the lobby.
    Connect,
    /// User is leaving. This is really just a friendly courtesy;
    /// dropping the connection has the same effect.
    Disconnect,
    /// User submits the move for their turn.
    TakeTurn(Move),
}

impl fmt::Display for UserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Connect => "connected".to_string(),
            Self::Disconnect => "disconnected".to_string(),
            Self::TakeTurn(mv) => format!("submitted {mv}"),
        };
        write!(f, "{repr}")
    }
}

/// A message from a game client to the game server.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClientMessage {
    /// User the message is from.
    pub username: Username,
    /// Command the user is issuing.
    pub command: UserCommand,
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.username, self.command)
    }
}

/// A message from the game server to a game client.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum ServerMessage {
    /// An acknowledgement of a client message, signaling that the
    /// client's command was accepted.
    Ack(ClientMessage),
    /// An indication that the client caused a protocol-level error.
    ClientError(ClientError),
    /// A game event shared with all connected players.
    Event(GameEvent),
    /// The game state as viewed from the receiving seat.
    GameView(GameView),
    /// It is the receiving seat's turn; carries the discard top for
    /// choosing a legal card.
    TurnSignal(Card),
    /// The client's move was read properly but rejected by the engine.
    UserError(UserError),
    /// The match is over.
    GameOver(Username),
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Ack(msg) => msg.to_string(),
            Self::ClientError(error) => error.to_string(),
            Self::Event(event) => event.to_string(),
            Self::GameView(_) => "game view".to_string(),
            Self::TurnSignal(top) => format!("your turn (top card: {top})"),
            Self::UserError(error) => error.to_string(),
            Self::GameOver(winner) => format!("game over, {winner} wins"),
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Colour, Kind};
    use crate::net::utils;
    use std::io::Cursor;

    fn roundtrip<T: Serialize + serde::de::DeserializeOwned>(value: &T) -> T {
        let mut buf = Vec::new();
        utils::write_prefixed(&mut buf, value).unwrap();
        utils::read_prefixed(&mut Cursor::new(buf)).unwrap()
    }

    #[test]
    fn client_message_round_trips() {
        let msg = ClientMessage {
            username: Username::new("alice"),
            command: UserCommand::TakeTurn(Move::Play {
                index: 3,
                colour: Some(Colour::Blue),
            }),
        };
        assert_eq!(roundtrip(&msg), msg);
    }

    #[test]
    fn draw_command_round_trips() {
        let msg = ClientMessage {
            username: Username::new("bob"),
            command: UserCommand::TakeTurn(Move::Draw),
        };
        assert_eq!(roundtrip(&msg), msg);
    }

    #[test]
    fn server_messages_round_trip() {
        let card = Card::new(Colour::Red, Kind::Number(5));
        let turn: ServerMessage = roundtrip(&ServerMessage::TurnSignal(card));
        assert!(matches!(turn, ServerMessage::TurnSignal(c) if c == card));

        let over: ServerMessage = roundtrip(&ServerMessage::GameOver(Username::new("carol")));
        assert!(matches!(over, ServerMessage::GameOver(w) if w == Username::new("carol")));

        let event: ServerMessage =
            roundtrip(&ServerMessage::Event(GameEvent::Drew(Username::new("dan"))));
        assert!(matches!(event, ServerMessage::Event(GameEvent::Drew(_))));
    }

    #[test]
    fn user_error_round_trips() {
        let msg: ServerMessage = roundtrip(&ServerMessage::UserError(UserError::NotPlayable));
        assert!(matches!(
            msg,
            ServerMessage::UserError(UserError::NotPlayable)
        ));
    }

    #[test]
    fn command_display_strings() {
        assert_eq!(UserCommand::Connect.to_string(), "connected");
        assert_eq!(UserCommand::Disconnect.to_string(), "disconnected");
        assert_eq!(
            UserCommand::TakeTurn(Move::Draw).to_string(),
            "submitted DRAW"
        );
        let msg = ClientMessage {
            username: Username::new("alice"),
            command: UserCommand::Connect,
        };
        assert_eq!(msg.to_string(), "alice connected");
    }
}
