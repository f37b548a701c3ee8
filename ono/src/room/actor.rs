//! Room actor implementation with async message handling.
//!
//! Exactly one move is in flight at any time: the actor owns the game
//! state outright and processes its inbox one message at a time, so
//! every mutation is serialized without a lock.

use tokio::sync::{mpsc, oneshot};

use crate::{
    game::{
        GameState, UserError,
        entities::{Move, SeatIndex},
    },
    journal::Journal,
    net::messages::ServerMessage,
};

use super::messages::{RoomMessage, RoomResponse};

const INBOX_CAPACITY: usize = 64;

/// Room actor handle for submitting moves and disconnects.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
}

impl RoomHandle {
    /// Submit a move for `seat` and wait for the verdict. Returns a
    /// rejection if the room has already shut down.
    pub async fn submit_move(&self, seat: SeatIndex, mv: Move) -> RoomResponse {
        let (response, receiver) = oneshot::channel();
        let message = RoomMessage::SubmitMove { seat, mv, response };
        if self.sender.send(message).await.is_err() {
            return RoomResponse::Rejected(UserError::GameAlreadyOver);
        }
        receiver
            .await
            .unwrap_or(RoomResponse::Rejected(UserError::GameAlreadyOver))
    }

    /// Take `seat` out of the rotation. Fire-and-forget.
    pub async fn disconnect(&self, seat: SeatIndex) {
        let _ = self.sender.send(RoomMessage::Disconnect { seat }).await;
    }
}

/// The authority for a single match: exclusive owner of the game state.
pub struct RoomActor {
    /// Game state; no other task may touch it.
    state: GameState,

    /// Message inbox.
    inbox: mpsc::Receiver<RoomMessage>,

    /// Per-seat outbound notice channels, indexed by seat.
    outboxes: Vec<mpsc::UnboundedSender<ServerMessage>>,

    /// Match journal, if one is configured.
    journal: Option<Journal>,
}

impl RoomActor {
    /// Create a room actor over a dealt game. `outboxes` must carry one
    /// sender per seat, in seat order.
    pub fn new(
        state: GameState,
        outboxes: Vec<mpsc::UnboundedSender<ServerMessage>>,
        journal: Option<Journal>,
    ) -> (Self, RoomHandle) {
        debug_assert_eq!(state.players().len(), outboxes.len());
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let actor = Self {
            state,
            inbox,
            outboxes,
            journal,
        };
        (actor, RoomHandle { sender })
    }

    /// Run the match to completion: announce the opening state, then
    /// sleep on the inbox until the expected seat's move arrives, apply
    /// it, publish the outcome, and signal the next turn.
    pub async fn run(mut self) {
        log::info!(
            "match starting with {} seats, {} first to act",
            self.state.players().len(),
            self.state.current_username(),
        );
        self.broadcast_views();
        self.signal_turn();

        while let Some(message) = self.inbox.recv().await {
            match message {
                RoomMessage::SubmitMove { seat, mv, response } => {
                    let result = self.state.apply_move(seat, mv);
                    let reply = match &result {
                        Ok(()) => RoomResponse::Accepted,
                        Err(error) => RoomResponse::Rejected(error.clone()),
                    };
                    let _ = response.send(reply);
                    // A rejected play leaves the state untouched, with
                    // one exception: the out-of-range penalty draw.
                    let state_changed = matches!(result, Ok(()) | Err(UserError::InvalidIndex));
                    if state_changed {
                        self.flush_events();
                        self.broadcast_views();
                        if !self.state.is_over() {
                            self.signal_turn();
                        }
                    }
                }
                RoomMessage::Disconnect { seat } => {
                    let acting_seat = self.state.current_player();
                    self.state.deactivate(seat);
                    self.flush_events();
                    if !self.state.is_over() {
                        self.broadcast_views();
                        // Only signal if the turn moved; the seat that
                        // already holds a turn signal keeps it.
                        if self.state.current_player() != acting_seat {
                            self.signal_turn();
                        }
                    }
                }
            }

            if self.state.is_over() {
                break;
            }
        }

        self.finish();
    }

    fn finish(&mut self) {
        if let Some(winner) = self.state.winner() {
            let name = winner.name.clone();
            log::info!("match over, {name} wins");
            if let Some(journal) = &self.journal {
                journal.record(format!("Game over: {name} wins."));
            }
            self.broadcast(ServerMessage::GameOver(name));
        } else {
            log::info!("match ended without a winner");
        }
    }

    /// Drain engine events into the journal and out to every seat.
    fn flush_events(&mut self) {
        for event in self.state.drain_events() {
            if let Some(journal) = &self.journal {
                journal.record(&event);
            }
            self.broadcast(ServerMessage::Event(event));
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        // Sends to hung-up seats fail silently; their disconnects are
        // already queued behind this message.
        for outbox in &self.outboxes {
            let _ = outbox.send(message.clone());
        }
    }

    fn broadcast_views(&self) {
        for (seat, outbox) in self.outboxes.iter().enumerate() {
            if !self.state.players()[seat].is_active {
                continue;
            }
            let _ = outbox.send(ServerMessage::GameView(self.state.view_for(seat)));
        }
    }

    fn signal_turn(&self) {
        let seat = self.state.current_player();
        let _ = self.outboxes[seat].send(ServerMessage::TurnSignal(self.state.top_card()));
    }
}
