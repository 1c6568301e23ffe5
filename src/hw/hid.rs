//! USB HID carrier.
//!
//! The brick exchanges 64-byte HID reports on interrupt endpoints. Outbound
//! reports are prefixed with the zero report ID and zero-padded to the full
//! report length; inbound reports are returned as read, trailing padding
//! included, since the codec validates lengths per opcode.

use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use tracing::debug;

use super::transport::{Transport, TransportError};
use crate::protocol::{USB_PRODUCT_ID, USB_PRODUCT_ID_LEGACY, USB_VENDOR_ID};

const REPORT_LEN: usize = 64;

/// A USB HID connection to one brick.
pub struct HidTransport {
    device: HidDevice,
    product_id: u16,
    serial_number: Option<String>,
}

impl HidTransport {
    /// Opens the first brick on the bus, preferring current production
    /// hardware over the legacy product ID.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::DeviceNotFound`] when no brick is attached,
    /// or a HID error when the device cannot be opened.
    pub fn open() -> Result<Self, TransportError> {
        let api = HidApi::new()?;
        for product_id in [USB_PRODUCT_ID, USB_PRODUCT_ID_LEGACY] {
            let Some(info) = api
                .device_list()
                .find(|info| info.vendor_id() == USB_VENDOR_ID && info.product_id() == product_id)
            else {
                continue;
            };
            let serial_number = info.serial_number().map(str::to_owned);
            let device = info.open_device(&api)?;
            debug!(product_id, "opened USB HID device");
            return Ok(Self {
                device,
                product_id,
                serial_number,
            });
        }
        Err(TransportError::DeviceNotFound)
    }

    /// Opens the brick with a specific USB serial number.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::SerialNotFound`] when no attached brick
    /// reports that serial number.
    pub fn open_serial(serial_number: &str) -> Result<Self, TransportError> {
        let api = HidApi::new()?;
        let Some(info) = api.device_list().find(|info| {
            info.vendor_id() == USB_VENDOR_ID
                && (info.product_id() == USB_PRODUCT_ID
                    || info.product_id() == USB_PRODUCT_ID_LEGACY)
                && info.serial_number() == Some(serial_number)
        }) else {
            return Err(TransportError::SerialNotFound {
                serial_number: serial_number.to_owned(),
            });
        };
        let product_id = info.product_id();
        let device = info.open_device(&api)?;
        Ok(Self {
            device,
            product_id,
            serial_number: Some(serial_number.to_owned()),
        })
    }
}

impl Transport for HidTransport {
    fn description(&self) -> String {
        match &self.serial_number {
            Some(serial_number) => format!(
                "usb hid {USB_VENDOR_ID:04X}:{:04X} sn {serial_number}",
                self.product_id
            ),
            None => format!("usb hid {USB_VENDOR_ID:04X}:{:04X}", self.product_id),
        }
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        debug_assert!(
            frame.len() <= REPORT_LEN,
            "frame exceeds the {REPORT_LEN}-byte report"
        );
        // Byte 0 is the HID report ID (always 0); the frame follows,
        // zero-padded to the fixed report length.
        let mut report = [0u8; 1 + REPORT_LEN];
        let len = frame.len().min(REPORT_LEN);
        report[1..=len].copy_from_slice(&frame[..len]);
        self.device.write(&report)?;
        Ok(())
    }

    fn read_frame(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let mut report = [0u8; REPORT_LEN];
        let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let read = self.device.read_timeout(&mut report, millis)?;
        if read == 0 {
            return Err(TransportError::Timeout { timeout });
        }
        Ok(report[..read].to_vec())
    }
}
