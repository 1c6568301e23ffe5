//! Session lifecycle and the synchronous device operations.
//!
//! A session is `Closed` until a transport is installed by [`DeviceSession::open`]
//! and `Closed` again after [`DeviceSession::close`] or drop. While open, the
//! session owns the transport exclusively and every operation is one blocking
//! write followed by one blocking read. Operations on a closed session fail
//! with [`ProtocolError::SessionClosed`] before any transport I/O.

use std::time::Duration;

use tracing::{debug, info, instrument};

use super::transport::{DEFAULT_READ_TIMEOUT, Transport};
use crate::action::{Action, LutAddress};
use crate::config::Configuration;
use crate::error::ProtocolError;
use crate::protocol::CommandOpcode;
use crate::protocol::frame::{DeviceIdentity, FrameCodec, StatusReport};

/// A synchronous command session with one brick.
///
/// The brick is the sole source of truth; the session caches the identity,
/// the last configuration read, and the last name read purely as
/// conveniences for display.
pub struct DeviceSession {
    transport: Option<Box<dyn Transport>>,
    read_timeout: Duration,
    identity: Option<DeviceIdentity>,
    config: Option<Configuration>,
    name: Option<String>,
}

impl Default for DeviceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSession {
    /// Creates a closed session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            identity: None,
            config: None,
            name: None,
        }
    }

    /// Overrides the per-operation response timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Last identity read from the device, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.identity.as_ref()
    }

    /// Last configuration read from the device, if any.
    #[must_use]
    pub fn cached_config(&self) -> Option<&Configuration> {
        self.config.as_ref()
    }

    /// Last name read from the device, if any.
    #[must_use]
    pub fn cached_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Opens the session over `transport` and reads the status report once
    /// to populate the cached identity.
    ///
    /// The transport is released on every failure path; a session is either
    /// fully open or fully closed.
    ///
    /// # Errors
    ///
    /// Fails when the status exchange fails or its response is malformed.
    #[instrument(skip(self, transport), level = "info", fields(carrier = %transport.description()))]
    pub fn open(&mut self, mut transport: Box<dyn Transport>) -> Result<StatusReport, ProtocolError> {
        let report = Self::exchange_status(transport.as_mut(), self.read_timeout)?;
        info!(
            product = %report.identity.product_desc,
            serial_number = %report.identity.serial_number,
            "session opened"
        );
        self.identity = Some(report.identity.clone());
        self.transport = Some(transport);
        Ok(report)
    }

    /// Closes the session, releasing the transport and clearing caches.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            debug!("session closed");
        }
        self.identity = None;
        self.config = None;
        self.name = None;
    }

    /// Reads the device status report and refreshes the cached identity.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed response.
    #[instrument(skip(self), level = "debug")]
    pub fn get_status(&mut self) -> Result<StatusReport, ProtocolError> {
        let timeout = self.read_timeout;
        let transport = self.transport()?;
        let report = Self::exchange_status(transport, timeout)?;
        self.identity = Some(report.identity.clone());
        Ok(report)
    }

    /// Reads the ICD revision the firmware implements, as `major.minor`.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed response.
    #[instrument(skip(self), level = "debug")]
    pub fn get_icd_revision(&mut self) -> Result<String, ProtocolError> {
        let raw = self.exchange(&FrameCodec::icd_revision_request())?;
        Ok(FrameCodec::parse_icd_revision_response(&raw)?)
    }

    /// Reads the configuration record and refreshes the cache.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed response.
    #[instrument(skip(self), level = "debug")]
    pub fn get_config(&mut self) -> Result<Configuration, ProtocolError> {
        let raw = self.exchange(&FrameCodec::config_request())?;
        let config = FrameCodec::parse_config_response(&raw)?;
        self.config = Some(config.clone());
        Ok(config)
    }

    /// Writes the full configuration record.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed
    /// acknowledgement.
    #[instrument(skip(self, config), level = "debug")]
    pub fn set_config(&mut self, config: &Configuration) -> Result<(), ProtocolError> {
        let raw = self.exchange(&FrameCodec::set_config_request(config))?;
        FrameCodec::parse_ack_response(CommandOpcode::SetConfig, &raw)?;
        self.config = Some(config.clone());
        Ok(())
    }

    /// Reads the device name and refreshes the cache.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed response.
    #[instrument(skip(self), level = "debug")]
    pub fn get_name(&mut self) -> Result<String, ProtocolError> {
        let raw = self.exchange(&FrameCodec::name_request())?;
        let name = FrameCodec::parse_name_response(&raw)?;
        self.name = Some(name.clone());
        Ok(name)
    }

    /// Writes the device name.
    ///
    /// # Errors
    ///
    /// Fails when the name exceeds the wire field, on a closed session,
    /// transport failure, or malformed acknowledgement.
    #[instrument(skip(self), level = "debug")]
    pub fn set_name(&mut self, name: &str) -> Result<(), ProtocolError> {
        let frame = FrameCodec::set_name_request(name)?;
        let raw = self.exchange(&frame)?;
        FrameCodec::parse_ack_response(CommandOpcode::SetName, &raw)?;
        self.name = Some(name.to_owned());
        Ok(())
    }

    /// Reads the action record stored at one event LUT slot.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed response.
    #[instrument(skip(self), level = "debug", fields(address = %address))]
    pub fn get_action(&mut self, address: LutAddress) -> Result<Action, ProtocolError> {
        let raw = self.exchange(&FrameCodec::event_action_request(address))?;
        Ok(FrameCodec::parse_action_response(&raw)?)
    }

    /// Stores an action record at one event LUT slot.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed
    /// acknowledgement.
    #[instrument(skip(self, action), level = "debug", fields(address = %address))]
    pub fn set_action(&mut self, address: LutAddress, action: &Action) -> Result<(), ProtocolError> {
        let raw = self.exchange(&FrameCodec::set_event_action_request(address, action))?;
        FrameCodec::parse_ack_response(CommandOpcode::SetEventAction, &raw)?;
        Ok(())
    }

    /// Executes an action record immediately without storing it.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed
    /// acknowledgement.
    #[instrument(skip(self, action), level = "debug")]
    pub fn test_action(&mut self, action: &Action) -> Result<(), ProtocolError> {
        let raw = self.exchange(&FrameCodec::test_action_request(action))?;
        FrameCodec::parse_ack_response(CommandOpcode::TestAction, &raw)?;
        Ok(())
    }

    /// Restores factory default configuration.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed
    /// acknowledgement.
    #[instrument(skip(self), level = "info")]
    pub fn factory_reset(&mut self) -> Result<(), ProtocolError> {
        let raw = self.exchange(&FrameCodec::factory_reset_frame())?;
        FrameCodec::parse_ack_response(CommandOpcode::SetFactoryDefaults, &raw)?;
        self.config = None;
        self.name = None;
        Ok(())
    }

    /// Erases the device's non-volatile settings memory.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed
    /// acknowledgement.
    #[instrument(skip(self), level = "info")]
    pub fn erase_nvram(&mut self) -> Result<(), ProtocolError> {
        let raw = self.exchange(&FrameCodec::erase_nvram_frame())?;
        FrameCodec::parse_ack_response(CommandOpcode::EraseNvram, &raw)?;
        self.config = None;
        self.name = None;
        Ok(())
    }

    /// Reboots the device and closes the session.
    ///
    /// The device restarts as soon as it receives the frame, so no
    /// acknowledgement is read.
    ///
    /// # Errors
    ///
    /// Fails on a closed session or transport write failure.
    #[instrument(skip(self), level = "info")]
    pub fn reboot(&mut self) -> Result<(), ProtocolError> {
        let transport = self.transport()?;
        transport.write_frame(&FrameCodec::reboot_frame())?;
        self.close();
        Ok(())
    }

    /// Formats the audio file system.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed
    /// acknowledgement.
    #[instrument(skip(self), level = "info")]
    pub fn format_filesystem(&mut self) -> Result<(), ProtocolError> {
        let raw = self.exchange(&FrameCodec::format_fs_request())?;
        FrameCodec::parse_ack_response(CommandOpcode::FileFormatFs, &raw)?;
        Ok(())
    }

    /// Writes a new serial number into device NVRAM.
    ///
    /// # Errors
    ///
    /// Fails on a closed session, transport failure, or malformed
    /// acknowledgement.
    #[instrument(skip(self), level = "info")]
    pub fn write_serial_number(&mut self, serial_number: u32) -> Result<(), ProtocolError> {
        let raw = self.exchange(&FrameCodec::write_serial_number_request(serial_number))?;
        FrameCodec::parse_ack_response(CommandOpcode::WriteSerialNumber, &raw)?;
        Ok(())
    }

    fn transport(&mut self) -> Result<&mut (dyn Transport + 'static), ProtocolError> {
        self.transport
            .as_deref_mut()
            .ok_or(ProtocolError::SessionClosed)
    }

    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        let timeout = self.read_timeout;
        let transport = self.transport()?;
        transport.write_frame(frame)?;
        Ok(transport.read_frame(timeout)?)
    }

    fn exchange_status(
        transport: &mut dyn Transport,
        timeout: Duration,
    ) -> Result<StatusReport, ProtocolError> {
        transport.write_frame(&FrameCodec::status_request())?;
        let raw = transport.read_frame(timeout)?;
        Ok(FrameCodec::parse_status_response(&raw)?)
    }
}
