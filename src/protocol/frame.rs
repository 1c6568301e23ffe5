//! Builds outbound command frames and parses inbound response frames.
//!
//! Every frame shape is fixed per opcode. Builders emit the opcode at
//! byte 0 followed by the payload at fixed offsets; the administrative
//! magic frames are emitted verbatim with no opcode prefix. Parsers
//! validate the echo byte and minimum length before extracting fields, so
//! a truncated response always fails instead of yielding a silently
//! truncated value.

use thiserror::Error;

use super::magic;
use super::{CommandOpcode, ErrorCode, StatusCode, cfg};
use crate::action::{Action, LutAddress};
use crate::config::Configuration;

/// Errors raised while building a request or parsing a response.
///
/// Any parse-side variant means the host and firmware disagree about the
/// frame layout (desynchronization or version mismatch); the operation is
/// surfaced as failed and never retried here.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FrameError {
    /// The response buffer is shorter than the opcode's fixed layout requires.
    #[error("malformed `{opcode}` response: expected at least {expected} bytes, got {actual}")]
    ResponseTooShort {
        opcode: CommandOpcode,
        expected: usize,
        actual: usize,
    },
    /// Byte 0 of the response does not echo the request opcode.
    #[error(
        "malformed `{opcode}` response: echo byte 0x{actual:02X} does not match 0x{expected:02X}",
        expected = opcode.as_u8()
    )]
    EchoMismatch { opcode: CommandOpcode, actual: u8 },
    /// A device name exceeds the 24-byte wire field.
    #[error("device name is {actual} bytes; the wire field holds at most {max}", max = cfg::NAME_MAX)]
    NameTooLong { actual: usize },
}

/// Status response length: echo, status, error, reserved, identity fields.
pub const STATUS_RESPONSE_LEN: usize = 41;
/// Name response length: echo plus the 24-byte padded name.
pub const NAME_RESPONSE_LEN: usize = 1 + cfg::NAME_MAX;
/// Action response length: echo plus the 16 record bytes.
pub const ACTION_RESPONSE_LEN: usize = 1 + Action::RECORD_LEN;
/// Config response length: echo plus the packed record.
pub const CONFIG_RESPONSE_LEN: usize = 1 + Configuration::RECORD_LEN;
/// ICD revision response length: echo plus the version word.
pub const ICD_REV_RESPONSE_LEN: usize = 3;

/// Identity strings reported by the brick in its status response.
///
/// Each field is a positional concatenation of `%02X`-formatted bytes;
/// the device decorates its identifiers BCD-style, so the hex digits read
/// as decimal. No binary arithmetic is applied.
#[derive(Debug, Clone, Default, Eq, PartialEq, serde::Serialize)]
pub struct DeviceIdentity {
    pub product_id: String,
    pub serial_number: String,
    pub product_desc: String,
    pub firmware_version: String,
    pub firmware_build: String,
}

/// Parsed status response.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: StatusCode,
    pub error: ErrorCode,
    pub identity: DeviceIdentity,
}

/// Encodes and decodes brick command frames.
pub struct FrameCodec;

impl FrameCodec {
    /// Builds a status request: the opcode followed by its fixed magic payload.
    ///
    /// ```
    /// use pfx::FrameCodec;
    ///
    /// let frame = FrameCodec::status_request();
    /// assert_eq!(vec![0x01, 0xA5, 0x5A, 0x6E, 0x40, 0x54, 0xA4, 0xE5], frame);
    /// ```
    #[must_use]
    pub fn status_request() -> Vec<u8> {
        with_payload(CommandOpcode::GetStatus, &magic::STATUS_PAYLOAD)
    }

    /// Builds an ICD revision request.
    #[must_use]
    pub fn icd_revision_request() -> Vec<u8> {
        with_payload(CommandOpcode::GetIcdRev, &magic::ICD_REV_PAYLOAD)
    }

    /// Builds a configuration read request.
    #[must_use]
    pub fn config_request() -> Vec<u8> {
        vec![CommandOpcode::GetConfig.as_u8()]
    }

    /// Builds a full-record configuration write. The record is always
    /// reconstructed in full; no partial masked update exists at this layer.
    #[must_use]
    pub fn set_config_request(config: &Configuration) -> Vec<u8> {
        with_payload(CommandOpcode::SetConfig, &config.to_record())
    }

    /// Builds a name read request.
    #[must_use]
    pub fn name_request() -> Vec<u8> {
        vec![CommandOpcode::GetName.as_u8()]
    }

    /// Builds a name write request with the UTF-8 name NUL-padded to 24 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NameTooLong`] when the name encodes to more
    /// than 24 bytes.
    pub fn set_name_request(name: &str) -> Result<Vec<u8>, FrameError> {
        let raw = name.as_bytes();
        if raw.len() > cfg::NAME_MAX {
            return Err(FrameError::NameTooLong { actual: raw.len() });
        }

        let mut frame = vec![0u8; 1 + cfg::NAME_MAX];
        frame[0] = CommandOpcode::SetName.as_u8();
        frame[1..=raw.len()].copy_from_slice(raw);
        Ok(frame)
    }

    /// Builds an event/action read request for one LUT address.
    #[must_use]
    pub fn event_action_request(address: LutAddress) -> Vec<u8> {
        vec![
            CommandOpcode::GetEventAction.as_u8(),
            address.event_id(),
            address.channel(),
        ]
    }

    /// Builds an event/action write request.
    #[must_use]
    pub fn set_event_action_request(address: LutAddress, action: &Action) -> Vec<u8> {
        let mut frame = Vec::with_capacity(3 + Action::RECORD_LEN);
        frame.push(CommandOpcode::SetEventAction.as_u8());
        frame.push(address.event_id());
        frame.push(address.channel());
        frame.extend_from_slice(&action.to_record());
        frame
    }

    /// Builds a request executing an action record immediately, without
    /// storing it in the LUT.
    #[must_use]
    pub fn test_action_request(action: &Action) -> Vec<u8> {
        with_payload(CommandOpcode::TestAction, &action.to_record())
    }

    /// Returns the verbatim factory reset frame. The magic sequence is the
    /// whole frame; no caller input is consulted.
    ///
    /// ```
    /// use pfx::FrameCodec;
    ///
    /// assert_eq!([0xAA, 0x55, 0xDE, 0xAD, 0xBE, 0xEF, 0x02], FrameCodec::factory_reset_frame());
    /// ```
    #[must_use]
    pub fn factory_reset_frame() -> [u8; 7] {
        magic::FACTORY_RESET_FRAME
    }

    /// Returns the verbatim reboot frame.
    ///
    /// ```
    /// use pfx::FrameCodec;
    ///
    /// assert_eq!([0x5A, 0xA5, 0xD0, 0xBE, 0xB0, 0x04, 0x77], FrameCodec::reboot_frame());
    /// ```
    #[must_use]
    pub fn reboot_frame() -> [u8; 7] {
        magic::REBOOT_FRAME
    }

    /// Returns the verbatim erase-NVRAM frame.
    #[must_use]
    pub fn erase_nvram_frame() -> [u8; 7] {
        magic::ERASE_NVRAM_FRAME
    }

    /// Builds a file-system format request.
    #[must_use]
    pub fn format_fs_request() -> Vec<u8> {
        with_payload(CommandOpcode::FileFormatFs, &magic::FORMAT_FS_PAYLOAD)
    }

    /// Builds a serial number write request: opcode, magic payload, then the
    /// four serial number bytes most significant first.
    #[must_use]
    pub fn write_serial_number_request(serial_number: u32) -> Vec<u8> {
        let mut frame = with_payload(CommandOpcode::WriteSerialNumber, &magic::WRITE_SERIAL_PAYLOAD);
        frame.extend_from_slice(&serial_number.to_be_bytes());
        frame
    }

    /// Parses a status response into the typed report.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is shorter than the status layout or the echo
    /// byte mismatches.
    pub fn parse_status_response(raw: &[u8]) -> Result<StatusReport, FrameError> {
        let raw = checked(CommandOpcode::GetStatus, raw, STATUS_RESPONSE_LEN)?;

        Ok(StatusReport {
            status: StatusCode::from_raw(raw[1]),
            error: ErrorCode::from_raw(raw[2]),
            identity: DeviceIdentity {
                product_id: bcd_string(&raw[7..9]),
                serial_number: bcd_string(&raw[9..13]),
                product_desc: padded_utf8(&raw[13..37]),
                firmware_version: bcd_string(&raw[37..39]),
                firmware_build: bcd_string(&raw[39..41]),
            },
        })
    }

    /// Parses a configuration response into the structured record.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is shorter than the config layout or the echo
    /// byte mismatches.
    pub fn parse_config_response(raw: &[u8]) -> Result<Configuration, FrameError> {
        let raw = checked(CommandOpcode::GetConfig, raw, CONFIG_RESPONSE_LEN)?;
        let record: &[u8; Configuration::RECORD_LEN] = raw[1..CONFIG_RESPONSE_LEN]
            .try_into()
            .expect("slice length is validated above");
        Ok(Configuration::from_record(record))
    }

    /// Parses a name response into the trimmed UTF-8 name.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is shorter than the name layout or the echo
    /// byte mismatches.
    pub fn parse_name_response(raw: &[u8]) -> Result<String, FrameError> {
        let raw = checked(CommandOpcode::GetName, raw, NAME_RESPONSE_LEN)?;
        Ok(padded_utf8(&raw[1..NAME_RESPONSE_LEN]))
    }

    /// Parses an event/action response into the 16-byte record.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is shorter than the action layout or the echo
    /// byte mismatches.
    pub fn parse_action_response(raw: &[u8]) -> Result<Action, FrameError> {
        let raw = checked(CommandOpcode::GetEventAction, raw, ACTION_RESPONSE_LEN)?;
        let record: &[u8; Action::RECORD_LEN] = raw[1..ACTION_RESPONSE_LEN]
            .try_into()
            .expect("slice length is validated above");
        Ok(Action::from_record(record))
    }

    /// Parses an ICD revision response into a `major.minor` string.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is shorter than the layout or the echo byte
    /// mismatches.
    pub fn parse_icd_revision_response(raw: &[u8]) -> Result<String, FrameError> {
        let raw = checked(CommandOpcode::GetIcdRev, raw, ICD_REV_RESPONSE_LEN)?;
        Ok(format!("{:X}.{:02X}", raw[1], raw[2]))
    }

    /// Validates a bare acknowledgement response for `opcode`.
    ///
    /// # Errors
    ///
    /// Fails when the response is empty or the echo byte mismatches.
    pub fn parse_ack_response(opcode: CommandOpcode, raw: &[u8]) -> Result<(), FrameError> {
        checked(opcode, raw, 1).map(|_| ())
    }
}

fn with_payload(opcode: CommandOpcode, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(1 + payload.len());
    frame.push(opcode.as_u8());
    frame.extend_from_slice(payload);
    frame
}

fn checked(opcode: CommandOpcode, raw: &[u8], expected: usize) -> Result<&[u8], FrameError> {
    if raw.len() < expected {
        return Err(FrameError::ResponseTooShort {
            opcode,
            expected,
            actual: raw.len(),
        });
    }
    if raw[0] != opcode.as_u8() {
        return Err(FrameError::EchoMismatch {
            opcode,
            actual: raw[0],
        });
    }
    Ok(raw)
}

/// Concatenates bytes positionally as two hex digits each, producing the
/// device's BCD-styled identifier strings.
fn bcd_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

fn padded_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn status_response() -> Vec<u8> {
        let mut raw = vec![0u8; STATUS_RESPONSE_LEN];
        raw[0] = 0x01;
        raw[1] = 0x00;
        raw[2] = 0x05;
        raw[7] = 0xA2;
        raw[8] = 0x16;
        raw[9..13].copy_from_slice(&[0x01, 0x23, 0x45, 0x67]);
        raw[13..25].copy_from_slice(b"PFx Brick 16");
        raw[37] = 0x01;
        raw[38] = 0x51;
        raw[39] = 0x05;
        raw[40] = 0x24;
        raw
    }

    #[test]
    fn status_response_parses_identity_strings() {
        let report = FrameCodec::parse_status_response(&status_response())
            .expect("well-formed status response should parse");

        assert_eq!(StatusCode::Normal, report.status);
        assert_eq!(ErrorCode::TransferFileNotFound, report.error);
        assert_eq!("A216", report.identity.product_id);
        assert_eq!("01234567", report.identity.serial_number);
        assert_eq!("PFx Brick 16", report.identity.product_desc);
        assert_eq!("0151", report.identity.firmware_version);
        assert_eq!("0524", report.identity.firmware_build);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(STATUS_RESPONSE_LEN - 1)]
    fn short_status_response_is_malformed(#[case] len: usize) {
        let raw = status_response()[..len].to_vec();
        let result = FrameCodec::parse_status_response(&raw);
        assert_matches!(
            result,
            Err(FrameError::ResponseTooShort {
                opcode: CommandOpcode::GetStatus,
                expected: STATUS_RESPONSE_LEN,
                actual,
            }) if actual == len
        );
    }

    #[test]
    fn mismatched_echo_byte_is_malformed() {
        let mut raw = status_response();
        raw[0] = 0x03;
        let result = FrameCodec::parse_status_response(&raw);
        assert_matches!(
            result,
            Err(FrameError::EchoMismatch {
                opcode: CommandOpcode::GetStatus,
                actual: 0x03,
            })
        );
    }

    #[test]
    fn reboot_frame_is_verbatim_magic() {
        assert_eq!(
            [0x5A, 0xA5, 0xD0, 0xBE, 0xB0, 0x04, 0x77],
            FrameCodec::reboot_frame()
        );
    }

    #[test]
    fn factory_reset_frame_is_verbatim_magic() {
        assert_eq!(
            [0xAA, 0x55, 0xDE, 0xAD, 0xBE, 0xEF, 0x02],
            FrameCodec::factory_reset_frame()
        );
    }

    #[test]
    fn erase_nvram_frame_is_verbatim_magic() {
        assert_eq!(
            [0xEE, 0x4A, 0x5E, 0xEE, 0x4A, 0x5E, 0x35],
            FrameCodec::erase_nvram_frame()
        );
    }

    #[test]
    fn format_fs_request_carries_the_magic_payload() {
        assert_eq!(vec![0x47, 0xEA, 0x5E, 0x88], FrameCodec::format_fs_request());
    }

    #[test]
    fn request_frames_fit_one_hid_report() {
        let address = LutAddress::new(0x1F, 3).expect("address should be in range");
        let action = Action::builder().build();
        let name = "a".repeat(cfg::NAME_MAX);
        let frames = [
            FrameCodec::status_request(),
            FrameCodec::icd_revision_request(),
            FrameCodec::set_config_request(&Configuration::default()),
            FrameCodec::set_name_request(&name).expect("max-length name should encode"),
            FrameCodec::set_event_action_request(address, &action),
            FrameCodec::test_action_request(&action),
            FrameCodec::format_fs_request(),
            FrameCodec::write_serial_number_request(u32::MAX),
        ];
        for frame in frames {
            assert!(frame.len() <= 64, "{} byte frame", frame.len());
        }
    }

    #[test]
    fn set_name_pads_with_nuls() {
        let frame = FrameCodec::set_name_request("Bricky").expect("short name should encode");
        assert_eq!(1 + cfg::NAME_MAX, frame.len());
        assert_eq!(0x09, frame[0]);
        assert_eq!(b"Bricky", &frame[1..7]);
        assert!(frame[7..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn set_name_rejects_oversized_name() {
        let result = FrameCodec::set_name_request("a name well beyond twenty-four bytes");
        assert_matches!(result, Err(FrameError::NameTooLong { actual: 36 }));
    }

    #[test]
    fn name_response_trims_padding() {
        let mut raw = vec![0u8; NAME_RESPONSE_LEN];
        raw[0] = 0x07;
        raw[1..13].copy_from_slice(b"My PFx Brick");
        let name = FrameCodec::parse_name_response(&raw).expect("padded name should parse");
        assert_eq!("My PFx Brick", name);
    }

    #[test]
    fn event_action_request_places_address_bytes() {
        let address = LutAddress::new(0x0D, 2).expect("EV3 beacon address is in range");
        assert_eq!(
            vec![0x11, 0x0D, 0x02],
            FrameCodec::event_action_request(address)
        );
    }

    #[test]
    fn write_serial_number_appends_sn_after_magic() {
        let frame = FrameCodec::write_serial_number_request(0x0123_4567);
        assert_eq!(0x38, frame[0]);
        assert_eq!([0x5E, 0x45, 0x5E, 0x41, 0xA1, 0x10, 0x70], frame[1..8]);
        assert_eq!([0x01, 0x23, 0x45, 0x67], frame[8..12]);
    }

    #[test]
    fn icd_revision_formats_major_minor() {
        let revision = FrameCodec::parse_icd_revision_response(&[0x08, 0x03, 0x36])
            .expect("revision response should parse");
        assert_eq!("3.36", revision);
    }
}
