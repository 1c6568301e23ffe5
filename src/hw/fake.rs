//! Scripted fixture transport used in tests and non-hardware environments.
//!
//! The fake serves responses from an explicit script first. When the script
//! is exhausted and simulation is enabled it answers each written frame
//! with a plausible canned response, so a full session can run without
//! hardware. Every written frame is recorded for assertions.

use std::time::Duration;

use bon::Builder;

use super::transport::{Transport, TransportError};
use crate::config::{Configuration, VersionWord};
use crate::protocol::frame::{ACTION_RESPONSE_LEN, NAME_RESPONSE_LEN, STATUS_RESPONSE_LEN};
use crate::protocol::{CommandOpcode, defaults, magic};

const FAKE_PRODUCT_ID: [u8; 2] = [0xA2, 0x16];
const FAKE_SERIAL_NUMBER: [u8; 4] = [0x01, 0x23, 0x45, 0x67];
const FAKE_PRODUCT_DESC: &[u8] = b"PFx Brick 16 MB";
const FAKE_FIRMWARE_VERSION: [u8; 2] = [0x01, 0x51];
const FAKE_FIRMWARE_BUILD: [u8; 2] = [0x05, 0x24];
const FAKE_ICD_VERSION: [u8; 2] = [0x03, 0x36];

/// Fake transport backend.
#[derive(Debug, Builder)]
pub struct FakeTransport {
    /// Scripted responses, served in order ahead of simulated replies.
    #[builder(default)]
    responses: Vec<Vec<u8>>,
    /// When false, an exhausted script times out instead of simulating.
    #[builder(default = true)]
    simulate: bool,
    #[builder(skip)]
    cursor: usize,
    #[builder(skip)]
    writes: Vec<Vec<u8>>,
    #[builder(skip)]
    pending: Option<Vec<u8>>,
}

impl FakeTransport {
    /// Creates a fake that simulates a factory-fresh brick.
    #[must_use]
    pub fn canned() -> Self {
        Self::builder().build()
    }

    /// All frames written so far, in order.
    #[must_use]
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    fn simulated_reply(frame: &[u8]) -> Option<Vec<u8>> {
        if frame == magic::FACTORY_RESET_FRAME {
            return Some(vec![CommandOpcode::SetFactoryDefaults.as_u8(), 0x00, 0x00]);
        }
        if frame == magic::ERASE_NVRAM_FRAME {
            return Some(vec![CommandOpcode::EraseNvram.as_u8(), 0x00, 0x00]);
        }
        if frame == magic::REBOOT_FRAME {
            // The real device restarts without answering.
            return None;
        }

        let opcode = *frame.first()?;
        let reply = match opcode {
            _ if opcode == CommandOpcode::GetStatus.as_u8() => canned_status_response(),
            _ if opcode == CommandOpcode::GetIcdRev.as_u8() => {
                vec![opcode, FAKE_ICD_VERSION[0], FAKE_ICD_VERSION[1]]
            }
            _ if opcode == CommandOpcode::GetConfig.as_u8() => canned_config_response(),
            _ if opcode == CommandOpcode::GetName.as_u8() => canned_name_response(),
            _ if opcode == CommandOpcode::GetEventAction.as_u8() => {
                // Empty LUT slot: echo followed by an all-zero record.
                let mut reply = vec![0u8; ACTION_RESPONSE_LEN];
                reply[0] = opcode;
                reply
            }
            _ => vec![opcode, 0x00, 0x00],
        };
        Some(reply)
    }
}

impl Transport for FakeTransport {
    fn description(&self) -> String {
        "fake fixture transport".to_owned()
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.writes.push(frame.to_vec());
        if self.simulate {
            self.pending = Self::simulated_reply(frame);
        }
        Ok(())
    }

    fn read_frame(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if let Some(response) = self.responses.get(self.cursor) {
            self.cursor += 1;
            return Ok(response.clone());
        }
        self.pending
            .take()
            .ok_or(TransportError::Timeout { timeout })
    }
}

fn canned_status_response() -> Vec<u8> {
    let mut raw = vec![0u8; STATUS_RESPONSE_LEN];
    raw[0] = CommandOpcode::GetStatus.as_u8();
    raw[7..9].copy_from_slice(&FAKE_PRODUCT_ID);
    raw[9..13].copy_from_slice(&FAKE_SERIAL_NUMBER);
    raw[13..13 + FAKE_PRODUCT_DESC.len()].copy_from_slice(FAKE_PRODUCT_DESC);
    raw[37..39].copy_from_slice(&FAKE_FIRMWARE_VERSION);
    raw[39..41].copy_from_slice(&FAKE_FIRMWARE_BUILD);
    raw
}

fn canned_config_response() -> Vec<u8> {
    let config = Configuration {
        firmware_version: VersionWord::from(u16::from_be_bytes(FAKE_FIRMWARE_VERSION)),
        icd_version: VersionWord::from(u16::from_be_bytes(FAKE_ICD_VERSION)),
        ..Configuration::default()
    };
    let mut raw = Vec::with_capacity(1 + Configuration::RECORD_LEN);
    raw.push(CommandOpcode::GetConfig.as_u8());
    raw.extend_from_slice(&config.to_record());
    raw
}

fn canned_name_response() -> Vec<u8> {
    let mut raw = vec![0u8; NAME_RESPONSE_LEN];
    raw[0] = CommandOpcode::GetName.as_u8();
    raw[1..=defaults::NAME.len()].copy_from_slice(defaults::NAME.as_bytes());
    raw
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[test]
    fn scripted_responses_are_served_in_order() {
        let mut fake = FakeTransport::builder()
            .responses(vec![vec![0x01], vec![0x03]])
            .build();

        fake.write_frame(&[0xAA]).expect("fake writes never fail");
        assert_eq!(vec![0x01], fake.read_frame(TIMEOUT).expect("first scripted response"));
        assert_eq!(vec![0x03], fake.read_frame(TIMEOUT).expect("second scripted response"));
    }

    #[test]
    fn exhausted_script_without_simulation_times_out() {
        let mut fake = FakeTransport::builder().simulate(false).build();
        fake.write_frame(&[0x01]).expect("fake writes never fail");
        assert_matches!(
            fake.read_frame(TIMEOUT),
            Err(TransportError::Timeout { .. })
        );
    }

    #[test]
    fn simulated_status_reply_echoes_the_opcode() {
        let mut fake = FakeTransport::canned();
        fake.write_frame(&[0x01]).expect("fake writes never fail");
        let reply = fake.read_frame(TIMEOUT).expect("simulated status reply");
        assert_eq!(STATUS_RESPONSE_LEN, reply.len());
        assert_eq!(0x01, reply[0]);
    }

    #[test]
    fn reboot_frame_gets_no_simulated_reply() {
        let mut fake = FakeTransport::canned();
        fake.write_frame(&magic::REBOOT_FRAME)
            .expect("fake writes never fail");
        assert_matches!(
            fake.read_frame(TIMEOUT),
            Err(TransportError::Timeout { .. })
        );
    }

    #[test]
    fn written_frames_are_recorded() {
        let mut fake = FakeTransport::canned();
        fake.write_frame(&[0x07]).expect("fake writes never fail");
        fake.write_frame(&[0x03]).expect("fake writes never fail");
        assert_eq!(
            &[vec![0x07], vec![0x03]],
            fake.writes()
        );
    }
}
