//! Readability bookkeeping.

/// Outcome of waiting on the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Bytes are waiting to be read.
    Readable,
    /// The peer closed the connection or it was shut down locally.
    Closed,
}

/// One-shot registration for readable events.
///
/// Each event consumes the registration; whoever handles the event must arm
/// it again or no further events are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadinessTrigger {
    armed: bool,
}

impl ReadinessTrigger {
    /// Registers interest in the next readable event.
    pub const fn arm(&mut self) {
        self.armed = true;
    }

    /// Withdraws interest.
    pub const fn disarm(&mut self) {
        self.armed = false;
    }

    /// Consumes the registration, returning whether it was armed.
    pub const fn fire(&mut self) -> bool {
        let was_armed = self.armed;
        self.armed = false;
        was_armed
    }

    /// Whether the next readable event will be delivered.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        self.armed
    }
}
