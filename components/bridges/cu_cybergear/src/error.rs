use cu_cybergear_lib::{CodecError, CommandMode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("serial I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not open serial port: {0}")]
    Serial(#[from] serialport::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("motor {0:#04x} did not reply")]
    NoReply(u8),
    #[error("no motor answered the id search")]
    NoDevice,
    #[error("expected a {expected:?} reply, got command mode {found}")]
    UnexpectedReply { expected: CommandMode, found: u8 },
}

pub type SessionResult<T> = Result<T, SessionError>;
