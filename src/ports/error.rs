use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("receive failed: {0}")]
    Transport(String),
    #[error("receiver connection unrecoverable: {0}")]
    Unrecoverable(String),
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("send failed: {0}")]
    Transport(String),
    #[error("sender connection unrecoverable: {0}")]
    Unrecoverable(String),
}

impl ReceiveError {
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, ReceiveError::Unrecoverable(_))
    }
}

impl SendError {
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, SendError::Unrecoverable(_))
    }
}

fn is_connection_lost(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotConnected
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::BrokenPipe
    )
}

impl From<io::Error> for ReceiveError {
    fn from(err: io::Error) -> Self {
        if is_connection_lost(&err) {
            ReceiveError::Unrecoverable(err.to_string())
        } else {
            ReceiveError::Transport(err.to_string())
        }
    }
}

impl From<io::Error> for SendError {
    fn from(err: io::Error) -> Self {
        if is_connection_lost(&err) {
            SendError::Unrecoverable(err.to_string())
        } else {
            SendError::Transport(err.to_string())
        }
    }
}
