//! Transport-facing contracts of the processing core.
//!
//! Adapters implement [`DataReceiver`] and [`DataSender`]; nothing in the
//! core names a concrete transport.

mod error;

use std::time::Duration;

pub use error::{ReceiveError, SendError};

/// An undecoded payload as it travels over the transport.
pub type RawMessage = Vec<u8>;

pub trait DataReceiver: Send {
    /// Wait up to `timeout` for one message. `Ok(None)` means nothing arrived.
    fn receive(&mut self, timeout: Duration) -> Result<Option<RawMessage>, ReceiveError>;
}

pub trait DataSender: Send {
    /// Attempt delivery of one payload, at most once. No buffering, no retry.
    fn send(&mut self, payload: RawMessage) -> Result<(), SendError>;
}

impl<R: DataReceiver + ?Sized> DataReceiver for Box<R> {
    fn receive(&mut self, timeout: Duration) -> Result<Option<RawMessage>, ReceiveError> {
        (**self).receive(timeout)
    }
}

impl<S: DataSender + ?Sized> DataSender for Box<S> {
    fn send(&mut self, payload: RawMessage) -> Result<(), SendError> {
        (**self).send(payload)
    }
}
