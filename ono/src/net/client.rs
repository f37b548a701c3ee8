//! A low-level blocking TCP game client.
//!
//! Used by the terminal client and as a testing utility against a
//! running server.

use anyhow::{Error, bail};
use std::{
    net::{SocketAddr, TcpStream},
    thread,
    time::Duration,
};

use super::{
    super::game::{
        GameEvent, UserError,
        entities::{Card, GameView, Move, Username},
    },
    messages::{ClientError, ClientMessage, ServerMessage, UserCommand},
    utils,
};

/// Default timeout for reading from the server.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for writing to the server.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// A blocking TCP client for connecting to a game server.
///
/// Provides a synchronous interface for submitting moves and receiving
/// updates from the server.
pub struct Client {
    /// The username associated with this client.
    pub username: Username,
    /// The underlying TCP stream.
    pub stream: TcpStream,
}

impl Client {
    /// Connect to a game server and register for a seat.
    ///
    /// Attempts to connect with backoff, trying three times with
    /// decreasing timeouts (1s, 500ms, 100ms). The returned client has
    /// been acknowledged by the lobby; the first game view arrives once
    /// the match starts.
    ///
    /// # Errors
    ///
    /// Returns an error if unable to connect or if the lobby rejects
    /// the registration (e.g. the username is already taken).
    pub fn connect(username: Username, addr: &SocketAddr) -> Result<Self, Error> {
        let mut connect_timeouts = vec![
            Duration::from_secs(1),
            Duration::from_millis(500),
            Duration::from_millis(100),
        ];
        while let Some(connect_timeout) = connect_timeouts.pop() {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(mut stream) => {
                    stream.set_read_timeout(Some(READ_TIMEOUT))?;
                    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
                    let msg = ClientMessage {
                        username: username.clone(),
                        command: UserCommand::Connect,
                    };
                    utils::write_prefixed(&mut stream, &msg)?;
                    Self::recv_ack(&mut stream)?;
                    return Ok(Self { username, stream });
                }
                _ => thread::sleep(connect_timeout),
            }
        }
        bail!("couldn't connect to {addr} as {username}")
    }

    /// Submit the move for this turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent to the server.
    pub fn take_turn(&mut self, mv: Move) -> Result<(), Error> {
        let msg = ClientMessage {
            username: self.username.clone(),
            command: UserCommand::TakeTurn(mv),
        };
        utils::write_prefixed(&mut self.stream, &msg)?;
        Ok(())
    }

    /// Tell the server this client is leaving. A courtesy; dropping the
    /// connection has the same effect.
    pub fn disconnect(&mut self) -> Result<(), Error> {
        let msg = ClientMessage {
            username: self.username.clone(),
            command: UserCommand::Disconnect,
        };
        utils::write_prefixed(&mut self.stream, &msg)?;
        Ok(())
    }

    pub fn recv(&mut self) -> Result<ServerMessage, Error> {
        match utils::read_prefixed::<ServerMessage, TcpStream>(&mut self.stream) {
            Ok(ServerMessage::ClientError(error)) => bail!(error),
            Ok(ServerMessage::UserError(error)) => bail!(error),
            Ok(msg) => Ok(msg),
            Err(error) => bail!(error),
        }
    }

    pub fn recv_ack(stream: &mut TcpStream) -> Result<(), Error> {
        match utils::read_prefixed::<ServerMessage, TcpStream>(stream) {
            Ok(ServerMessage::Ack(_)) => Ok(()),
            Ok(ServerMessage::ClientError(error)) => bail!(error),
            Ok(ServerMessage::UserError(error)) => bail!(error),
            Ok(response) => {
                bail!("invalid server response: {response}")
            }
            Err(error) => bail!(error),
        }
    }

    pub fn recv_client_error(stream: &mut TcpStream) -> Result<ClientError, Error> {
        match utils::read_prefixed::<ServerMessage, TcpStream>(stream) {
            Ok(ServerMessage::ClientError(error)) => Ok(error),
            Ok(response) => {
                bail!("invalid server response: {response}")
            }
            Err(error) => bail!(error),
        }
    }

    pub fn recv_event(stream: &mut TcpStream) -> Result<GameEvent, Error> {
        match utils::read_prefixed::<ServerMessage, TcpStream>(stream) {
            Ok(ServerMessage::Event(event)) => Ok(event),
            Ok(response) => {
                bail!("invalid server response: {response}")
            }
            Err(error) => bail!(error),
        }
    }

    pub fn recv_user_error(stream: &mut TcpStream) -> Result<UserError, Error> {
        match utils::read_prefixed::<ServerMessage, TcpStream>(stream) {
            Ok(ServerMessage::UserError(error)) => Ok(error),
            Ok(response) => {
                bail!("invalid server response: {response}")
            }
            Err(error) => bail!(error),
        }
    }

    pub fn recv_view(stream: &mut TcpStream) -> Result<GameView, Error> {
        match utils::read_prefixed::<ServerMessage, TcpStream>(stream) {
            Ok(ServerMessage::ClientError(error)) => bail!(error),
            Ok(ServerMessage::GameView(view)) => Ok(view),
            Ok(ServerMessage::UserError(error)) => bail!(error),
            Ok(response) => {
                bail!("invalid server response: {response}")
            }
            Err(error) => bail!(error),
        }
    }

    pub fn recv_turn_signal(stream: &mut TcpStream) -> Result<Card, Error> {
        match utils::read_prefixed::<ServerMessage, TcpStream>(stream) {
            Ok(ServerMessage::TurnSignal(top)) => Ok(top),
            Ok(ServerMessage::ClientError(error)) => bail!(error),
            Ok(ServerMessage::UserError(error)) => bail!(error),
            Ok(response) => {
                bail!("invalid server response: {response}")
            }
            Err(error) => bail!(error),
        }
    }
}
