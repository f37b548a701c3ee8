//! Room actor message types.

use tokio::sync::oneshot;

use crate::game::{
    UserError,
    entities::{Move, SeatIndex},
};

/// Messages that can be sent to a [`super::RoomActor`].
#[derive(Debug)]
pub enum RoomMessage {
    /// A seat submits the move for its turn.
    SubmitMove {
        seat: SeatIndex,
        mv: Move,
        response: oneshot::Sender<RoomResponse>,
    },

    /// A seat's connection ended; take it out of the rotation.
    Disconnect { seat: SeatIndex },
}

/// Response to a submitted move.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoomResponse {
    /// The move was applied.
    Accepted,

    /// The move was rejected and not applied. The submitter keeps the
    /// turn and may resubmit.
    Rejected(UserError),
}

impl RoomResponse {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}
