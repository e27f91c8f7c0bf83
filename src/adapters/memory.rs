//! In-process adapters backed by `std::sync::mpsc` channels.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::ports::{DataReceiver, DataSender, RawMessage, ReceiveError, SendError};

/// Producer side of a [`MemoryReceiver`].
#[derive(Clone)]
pub struct MemoryFeed {
    tx: Sender<RawMessage>,
}

impl MemoryFeed {
    pub fn push(&self, payload: RawMessage) -> Result<(), SendError> {
        self.tx
            .send(payload)
            .map_err(|_| SendError::Unrecoverable("memory receiver dropped".into()))
    }
}

pub struct MemoryReceiver {
    rx: Receiver<RawMessage>,
}

impl DataReceiver for MemoryReceiver {
    fn receive(&mut self, timeout: Duration) -> Result<Option<RawMessage>, ReceiveError> {
        match self.rx.recv_timeout(timeout) {
            Ok(payload) => Ok(Some(payload)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(ReceiveError::Unrecoverable("memory feed closed".into()))
            }
        }
    }
}

pub struct MemorySender {
    tx: Sender<RawMessage>,
}

impl DataSender for MemorySender {
    fn send(&mut self, payload: RawMessage) -> Result<(), SendError> {
        self.tx
            .send(payload)
            .map_err(|_| SendError::Unrecoverable("memory sink dropped".into()))
    }
}

/// Consumer side of a [`MemorySender`].
pub struct MemorySink {
    rx: Receiver<RawMessage>,
}

impl MemorySink {
    /// Take everything sent so far without blocking.
    pub fn drain(&self) -> Vec<RawMessage> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(payload) => out.push(payload),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return out,
            }
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<RawMessage> {
        self.rx.recv_timeout(timeout).ok()
    }
}

pub fn receiver() -> (MemoryFeed, MemoryReceiver) {
    let (tx, rx) = mpsc::channel();
    (MemoryFeed { tx }, MemoryReceiver { rx })
}

pub fn sender() -> (MemorySender, MemorySink) {
    let (tx, rx) = mpsc::channel();
    (MemorySender { tx }, MemorySink { rx })
}
