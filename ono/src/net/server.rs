//! The authority process: lobby registration, per-player session
//! relays, and the room actor that owns the match.
//!
//! One task per concern: the actor exclusively mutates game state, a
//! reader task per seat parses inbound frames into room messages, and a
//! writer task per seat drains that seat's notice channel onto the
//! socket. No task ever blocks another seat's input.

use anyhow::{Error, bail};
use std::net::SocketAddr;
use tokio::{
    net::{TcpListener, TcpStream, tcp::OwnedReadHalf},
    sync::mpsc,
    time::{Duration, Instant, timeout},
};

use crate::{
    game::{
        GameState,
        constants::{MAX_SEATS, MIN_SEATS},
        entities::{SeatIndex, Username},
    },
    journal::Journal,
    net::{
        messages::{ClientError, ClientMessage, ServerMessage, UserCommand},
        utils::{read_prefixed_async, write_prefixed_async},
    },
    room::{RoomActor, RoomConfig, RoomHandle, RoomResponse},
};

/// How long a fresh connection has to present its connect handshake.
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(5);

/// How long writers get to flush their final notices at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

struct LobbySeat {
    username: Username,
    stream: TcpStream,
}

/// Host one match at `addr`: run the lobby, play the game, return when
/// it ends.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the socket can't
/// be bound, or the lobby closes with fewer than two seated players.
pub fn run(addr: SocketAddr, config: RoomConfig) -> Result<(), Error> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(addr, config))
}

async fn serve(addr: SocketAddr, config: RoomConfig) -> Result<(), Error> {
    config.validate().map_err(Error::msg)?;

    let journal = match &config.journal_path {
        Some(path) => Some(Journal::spawn(path)?),
        None => None,
    };
    if let Some(journal) = &journal {
        journal.record("Server started, waiting for players to join.");
    }

    let listener = TcpListener::bind(addr).await?;
    log::info!(
        "lobby open at {addr} for {}s",
        config.lobby_countdown_secs
    );

    let seats = lobby(&listener, &config, journal.as_ref()).await;
    drop(listener);

    if seats.len() < MIN_SEATS {
        if let Some(journal) = &journal {
            journal.record("Server shutting down.");
        }
        bail!(
            "number of players must be between {MIN_SEATS} and {MAX_SEATS}, got {}",
            seats.len()
        );
    }

    let names: Vec<Username> = seats.iter().map(|seat| seat.username.clone()).collect();
    log::info!("game starting with {} players", names.len());
    if let Some(journal) = &journal {
        journal.record(format!("Game starting with {} players.", names.len()));
    }
    let state = GameState::new(names, &config.settings)?;

    // Split each connection: the writer task drains the seat's notice
    // channel, the reader task relays inbound frames to the actor.
    let mut outboxes = Vec::with_capacity(seats.len());
    let mut relays = Vec::with_capacity(seats.len());
    let mut writers = Vec::with_capacity(seats.len());
    for (seat, lobby_seat) in seats.into_iter().enumerate() {
        let LobbySeat { username, stream } = lobby_seat;
        let (read_half, mut write_half) = stream.into_split();
        let (sender, mut receiver) = mpsc::unbounded_channel::<ServerMessage>();
        outboxes.push(sender.clone());
        writers.push(tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                if write_prefixed_async(&mut write_half, &message).await.is_err() {
                    break;
                }
            }
        }));
        relays.push((seat, username, read_half, sender));
    }

    let (actor, handle) = RoomActor::new(state, outboxes, journal.clone());
    for (seat, username, read_half, outbox) in relays {
        tokio::spawn(relay_moves(
            seat,
            username,
            read_half,
            outbox,
            handle.clone(),
            journal.clone(),
        ));
    }
    actor.run().await;

    // The final notices are still draining onto the sockets; give the
    // writers a bounded window before the runtime is torn down.
    for writer in writers {
        let _ = timeout(SHUTDOWN_GRACE, writer).await;
    }

    if let Some(journal) = &journal {
        journal.record("Server shutting down.");
    }
    log::info!("match finished, server shutting down");
    Ok(())
}

/// Accept and register players until the countdown expires or every
/// seat fills.
async fn lobby(
    listener: &TcpListener,
    config: &RoomConfig,
    journal: Option<&Journal>,
) -> Vec<LobbySeat> {
    let mut seats: Vec<LobbySeat> = Vec::with_capacity(MAX_SEATS);
    let deadline = Instant::now() + Duration::from_secs(config.lobby_countdown_secs);
    while seats.len() < MAX_SEATS {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let stream = match timeout(remaining, listener.accept()).await {
            Err(_) => break,
            Ok(Err(error)) => {
                log::warn!("accept failed: {error}");
                continue;
            }
            Ok(Ok((stream, peer))) => {
                log::debug!("connection from {peer}");
                stream
            }
        };
        if let Some(seat) = register(stream, &seats).await {
            log::info!(
                "{} joined the lobby ({}/{MAX_SEATS})",
                seat.username,
                seats.len() + 1
            );
            if let Some(journal) = journal {
                journal.record(format!("Player joined: {}", seat.username));
            }
            seats.push(seat);
        }
    }
    seats
}

/// Read the connect handshake off a fresh connection and claim a seat
/// for it, or reject it.
async fn register(mut stream: TcpStream, seats: &[LobbySeat]) -> Option<LobbySeat> {
    let handshake = timeout(
        REGISTRATION_TIMEOUT,
        read_prefixed_async::<ClientMessage, _>(&mut stream),
    );
    let message = match handshake.await {
        Ok(Ok(message)) => message,
        _ => return None,
    };
    if !matches!(message.command, UserCommand::Connect) {
        let rejection = ServerMessage::ClientError(ClientError::InvalidHandshake);
        let _ = write_prefixed_async(&mut stream, &rejection).await;
        return None;
    }
    if seats.iter().any(|seat| seat.username == message.username) {
        let rejection = ServerMessage::ClientError(ClientError::AlreadyTaken);
        let _ = write_prefixed_async(&mut stream, &rejection).await;
        return None;
    }
    let ack = ServerMessage::Ack(message.clone());
    if write_prefixed_async(&mut stream, &ack).await.is_err() {
        return None;
    }
    Some(LobbySeat {
        username: message.username,
        stream,
    })
}

/// One seat's inbound relay: parse frames into room submissions until
/// the player leaves or the stream ends.
async fn relay_moves(
    seat: SeatIndex,
    username: Username,
    mut read_half: OwnedReadHalf,
    outbox: mpsc::UnboundedSender<ServerMessage>,
    handle: RoomHandle,
    journal: Option<Journal>,
) {
    loop {
        match read_prefixed_async::<ClientMessage, _>(&mut read_half).await {
            Ok(message) => match message.command {
                UserCommand::TakeTurn(mv) => {
                    if let RoomResponse::Rejected(error) = handle.submit_move(seat, mv).await {
                        let _ = outbox.send(ServerMessage::UserError(error));
                    }
                }
                UserCommand::Disconnect => {
                    if let Some(journal) = &journal {
                        journal.record(format!(
                            "DISCONNECT: Player {username} (seat {seat}) left."
                        ));
                    }
                    handle.disconnect(seat).await;
                    break;
                }
                // Already seated; a stray handshake is harmless.
                UserCommand::Connect => {}
            },
            Err(error) => {
                log::debug!("{username} (seat {seat}) read ended: {error}");
                if let Some(journal) = &journal {
                    journal.record(format!(
                        "DISCONNECT: Player {username} (seat {seat}) left."
                    ));
                }
                handle.disconnect(seat).await;
                break;
            }
        }
    }
}
