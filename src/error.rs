use derive_more::From;
use thiserror::Error;

use crate::action::LutAddressError;
use crate::hw::TransportError;
use crate::protocol::frame::FrameError;

/// Errors returned when parsing fake transport fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("the fake response script is empty")]
    EmptyScript,
    #[error("fake response frames must be hexadecimal byte strings")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Errors returned by telemetry initialisation.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("failed to install tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Top-level protocol errors wrapping module-specific error types.
#[derive(Debug, Error, From)]
pub enum ProtocolError {
    /// The session has no transport; the operation performed no I/O.
    #[error("the session is not open")]
    SessionClosed,
    #[error(transparent)]
    #[from(TransportError, Box<TransportError>)]
    Transport(Box<TransportError>),
    #[error(transparent)]
    #[from(FrameError, Box<FrameError>)]
    Frame(Box<FrameError>),
    #[error(transparent)]
    #[from(LutAddressError, Box<LutAddressError>)]
    Address(Box<LutAddressError>),
}
