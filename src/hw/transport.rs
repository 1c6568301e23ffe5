use std::time::Duration;

use thiserror::Error;

use crate::protocol::USB_VENDOR_ID;

/// Read timeout applied to every response wait unless overridden on the
/// session.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Errors raised by a transport carrier.
///
/// Transport failures are surfaced verbatim to the caller; this layer never
/// retries an exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("USB HID operation failed")]
    Hid(#[from] hidapi::HidError),
    #[error("no PFx Brick found on USB (vendor 0x{vendor_id:04X})", vendor_id = USB_VENDOR_ID)]
    DeviceNotFound,
    #[error("no PFx Brick with serial number `{serial_number}` found on USB")]
    SerialNotFound { serial_number: String },
    #[error("no response from the device within {timeout:?}")]
    Timeout { timeout: Duration },
}

/// One synchronous request/response carrier to a single brick.
///
/// A transport carries raw frames only; frame layout and validation live in
/// the codec above it. The device is released when the transport is dropped.
pub trait Transport {
    /// Carrier description for logs.
    fn description(&self) -> String;

    /// Sends one complete command frame.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the carrier write fails.
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Blocks for one complete response frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] when no frame arrives within
    /// `timeout`, or another [`TransportError`] when the carrier read fails.
    fn read_frame(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError>;
}
