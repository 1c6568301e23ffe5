pub(crate) mod effects;
pub(crate) mod frame;

use strum_macros::{Display, EnumIter};

/// USB vendor ID assigned to the brick.
pub const USB_VENDOR_ID: u16 = 0x04D8;
/// USB product ID of current production hardware.
pub const USB_PRODUCT_ID: u16 = 0xEF74;
/// USB product ID of pre-production hardware.
pub const USB_PRODUCT_ID_LEGACY: u16 = 0x00F8;

/// GATT UART service carrying the command stream over BLE.
pub const BLE_UART_SERVICE_UUID: &str = "49535343-fe7d-4ae5-8fa9-9fafd205e455";
/// UART RX characteristic (host to brick).
pub const BLE_UART_RX_UUID: &str = "49535343-1e4d-4bd9-ba61-23c647249616";
/// UART TX characteristic (brick to host).
pub const BLE_UART_TX_UUID: &str = "49535343-8841-43f4-a8d4-ecbe34729bb3";
/// UART TX response characteristic.
pub const BLE_UART_TX_RESPONSE_UUID: &str = "49535343-a4c8-39b3-2f49-511cff073b7e";

/// Command frames on the BLE carrier are wrapped in fixed delimiters not
/// present on the USB carrier.
pub const BLE_PRE_DELIMITER: [u8; 3] = [0x5B, 0x5B, 0x5B];
pub const BLE_POST_DELIMITER: [u8; 3] = [0x5D, 0x5D, 0x5D];

/// Wraps a command frame for the BLE UART carrier.
#[must_use]
pub fn wrap_ble_frame(frame: &[u8]) -> Vec<u8> {
    let mut wrapped = Vec::with_capacity(frame.len() + 6);
    wrapped.extend_from_slice(&BLE_PRE_DELIMITER);
    wrapped.extend_from_slice(frame);
    wrapped.extend_from_slice(&BLE_POST_DELIMITER);
    wrapped
}

/// Strips BLE delimiters from a received frame, if both are present.
#[must_use]
pub fn unwrap_ble_frame(wrapped: &[u8]) -> Option<&[u8]> {
    let body = wrapped.strip_prefix(BLE_PRE_DELIMITER.as_slice())?;
    body.strip_suffix(BLE_POST_DELIMITER.as_slice())
}

/// Command bytes defined by the brick's interface control document.
///
/// Each opcode has exactly one fixed request-frame shape and one fixed
/// response-frame shape; nothing is negotiated at run time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum CommandOpcode {
    // Operation and configuration
    #[strum(to_string = "get_status")]
    GetStatus = 0x01,
    #[strum(to_string = "set_factory_defaults")]
    SetFactoryDefaults = 0x02,
    #[strum(to_string = "get_config")]
    GetConfig = 0x03,
    #[strum(to_string = "set_config")]
    SetConfig = 0x04,
    #[strum(to_string = "verify_config")]
    VerifyConfig = 0x05,
    #[strum(to_string = "get_current_state")]
    GetCurrentState = 0x06,
    #[strum(to_string = "get_name")]
    GetName = 0x07,
    #[strum(to_string = "get_icd_rev")]
    GetIcdRev = 0x08,
    #[strum(to_string = "set_name")]
    SetName = 0x09,
    // Event/action LUT
    #[strum(to_string = "verify_event_lut")]
    VerifyEventLut = 0x10,
    #[strum(to_string = "get_event_action")]
    GetEventAction = 0x11,
    #[strum(to_string = "set_event_action")]
    SetEventAction = 0x12,
    #[strum(to_string = "test_action")]
    TestAction = 0x13,
    #[strum(to_string = "get_last_ir_msg")]
    GetLastIrMsg = 0x14,
    #[strum(to_string = "send_event")]
    SendEvent = 0x15,
    // Audio
    #[strum(to_string = "inc_volume")]
    IncVolume = 0x20,
    #[strum(to_string = "dec_volume")]
    DecVolume = 0x21,
    #[strum(to_string = "get_audio_lut_entry")]
    GetAudioLutEntry = 0x22,
    #[strum(to_string = "get_audio_capacity")]
    GetAudioCapacity = 0x23,
    #[strum(to_string = "erase_audio_lut")]
    EraseAudioLut = 0x24,
    #[strum(to_string = "add_audio_file")]
    AddAudioFile = 0x25,
    #[strum(to_string = "add_audio_data")]
    AddAudioData = 0x26,
    #[strum(to_string = "add_audio_done")]
    AddAudioDone = 0x27,
    #[strum(to_string = "get_audio_file")]
    GetAudioFile = 0x28,
    #[strum(to_string = "get_audio_data")]
    GetAudioData = 0x29,
    #[strum(to_string = "set_audio_eq")]
    SetAudioEq = 0x2A,
    // Service
    #[strum(to_string = "load_firmware_file")]
    LoadFirmwareFile = 0x30,
    #[strum(to_string = "load_firmware_data")]
    LoadFirmwareData = 0x31,
    #[strum(to_string = "load_firmware_done")]
    LoadFirmwareDone = 0x32,
    #[strum(to_string = "read_nvram")]
    ReadNvram = 0x33,
    #[strum(to_string = "read_boot_config")]
    ReadBootConfig = 0x34,
    #[strum(to_string = "erase_nvram")]
    EraseNvram = 0x35,
    #[strum(to_string = "compute_crc32")]
    ComputeCrc32 = 0x36,
    #[strum(to_string = "reboot")]
    Reboot = 0x37,
    #[strum(to_string = "write_serial_number")]
    WriteSerialNumber = 0x38,
    #[strum(to_string = "read_serial_number")]
    ReadSerialNumber = 0x39,
    // File system
    #[strum(to_string = "file_open")]
    FileOpen = 0x40,
    #[strum(to_string = "file_close")]
    FileClose = 0x41,
    #[strum(to_string = "file_read")]
    FileRead = 0x42,
    #[strum(to_string = "file_write")]
    FileWrite = 0x43,
    #[strum(to_string = "file_seek")]
    FileSeek = 0x44,
    #[strum(to_string = "file_dir")]
    FileDir = 0x45,
    #[strum(to_string = "file_remove")]
    FileRemove = 0x46,
    #[strum(to_string = "file_format_fs")]
    FileFormatFs = 0x47,
    #[strum(to_string = "file_get_fs_state")]
    FileGetFsState = 0x48,
    #[strum(to_string = "get_flash_sector_map")]
    GetFlashSectorMap = 0x49,
    #[strum(to_string = "get_flash_dir_entry")]
    GetFlashDirEntry = 0x4A,
    // Bluetooth interface
    #[strum(to_string = "get_bt_status")]
    GetBtStatus = 0x50,
    #[strum(to_string = "set_bt_power")]
    SetBtPower = 0x51,
    #[strum(to_string = "send_bt_uart")]
    SendBtUart = 0x52,
    #[strum(to_string = "receive_bt_uart")]
    ReceiveBtUart = 0x53,
    // Notifications
    #[strum(to_string = "set_notifications")]
    SetNotifications = 0x60,
    #[strum(to_string = "notification")]
    Notification = 0x61,
    // Test/debug
    #[strum(to_string = "status_led")]
    StatusLed = 0x70,
    #[strum(to_string = "diag_led")]
    DiagLed = 0x71,
    #[strum(to_string = "write_spi")]
    WriteSpi = 0x72,
    #[strum(to_string = "read_spi")]
    ReadSpi = 0x73,
    #[strum(to_string = "write_i2c")]
    WriteI2c = 0x74,
    #[strum(to_string = "read_i2c")]
    ReadI2c = 0x75,
    #[strum(to_string = "read_flash")]
    ReadFlash = 0x76,
    #[strum(to_string = "get_ir_rx_status")]
    GetIrRxStatus = 0x77,
}

impl CommandOpcode {
    /// Returns the raw command byte placed at offset 0 of a request frame.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Device operational status reported in byte 1 of every response.
///
/// Firmware may introduce codes this host does not know; those are carried
/// as [`StatusCode::Unknown`] rather than rejected.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StatusCode {
    Normal,
    NormalPending,
    ServicePending,
    Service,
    ServiceBusy,
    Unknown(u8),
}

impl StatusCode {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Normal,
            0x33 => Self::NormalPending,
            0x53 => Self::ServicePending,
            0x55 => Self::Service,
            0x5B => Self::ServiceBusy,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Normal => 0x00,
            Self::NormalPending => 0x33,
            Self::ServicePending => 0x53,
            Self::Service => 0x55,
            Self::ServiceBusy => 0x5B,
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable status description.
    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Normal => "Normal".to_owned(),
            Self::NormalPending => "Normal, pending power down".to_owned(),
            Self::ServicePending => "Service mode pending".to_owned(),
            Self::Service => "Service mode".to_owned(),
            Self::ServiceBusy => "Service mode, busy".to_owned(),
            Self::Unknown(raw) => format!("unknown (0x{raw:02X})"),
        }
    }
}

/// Device error codes reported in byte 2 of every response.
///
/// These are data handed back to the caller, never a control-flow failure
/// of the protocol layer itself.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorCode {
    None,
    VerifyFail,
    TransferFileExists,
    TransferTooBig,
    TransferInvalid,
    TransferFileNotFound,
    TransferCrcMismatch,
    TransferBusyWait,
    TransferLutFull,
    TransferComplete,
    BrownoutReset,
    BleFault,
    TrapConflict,
    TrapIllegalOpcode,
    TrapConfigMismatch,
    UpgradeFail,
    FileSystem,
    FileInvalid,
    FileOutOfRange,
    FileReadOnly,
    FileTooBig,
    FileNotFound,
    FileNotUnique,
    FileLockedBusy,
    FileSystemFull,
    FileSystemTimeout,
    FileInvalidAddress,
    FileNextSector,
    FileAccessDenied,
    TransferError,
    Unknown(u8),
}

impl ErrorCode {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::None,
            0x01 => Self::VerifyFail,
            0x02 => Self::TransferFileExists,
            0x03 => Self::TransferTooBig,
            0x04 => Self::TransferInvalid,
            0x05 => Self::TransferFileNotFound,
            0x06 => Self::TransferCrcMismatch,
            0x07 => Self::TransferBusyWait,
            0x08 => Self::TransferLutFull,
            0x09 => Self::TransferComplete,
            0x0A => Self::BrownoutReset,
            0x0B => Self::BleFault,
            0x10 => Self::TrapConflict,
            0x20 => Self::TrapIllegalOpcode,
            0x40 => Self::TrapConfigMismatch,
            0x80 => Self::UpgradeFail,
            0xF0 => Self::FileSystem,
            0xF1 => Self::FileInvalid,
            0xF2 => Self::FileOutOfRange,
            0xF3 => Self::FileReadOnly,
            0xF4 => Self::FileTooBig,
            0xF5 => Self::FileNotFound,
            0xF6 => Self::FileNotUnique,
            0xF7 => Self::FileLockedBusy,
            0xF8 => Self::FileSystemFull,
            0xF9 => Self::FileSystemTimeout,
            0xFA => Self::FileInvalidAddress,
            0xFB => Self::FileNextSector,
            0xFC => Self::FileAccessDenied,
            0xFF => Self::TransferError,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::VerifyFail => 0x01,
            Self::TransferFileExists => 0x02,
            Self::TransferTooBig => 0x03,
            Self::TransferInvalid => 0x04,
            Self::TransferFileNotFound => 0x05,
            Self::TransferCrcMismatch => 0x06,
            Self::TransferBusyWait => 0x07,
            Self::TransferLutFull => 0x08,
            Self::TransferComplete => 0x09,
            Self::BrownoutReset => 0x0A,
            Self::BleFault => 0x0B,
            Self::TrapConflict => 0x10,
            Self::TrapIllegalOpcode => 0x20,
            Self::TrapConfigMismatch => 0x40,
            Self::UpgradeFail => 0x80,
            Self::FileSystem => 0xF0,
            Self::FileInvalid => 0xF1,
            Self::FileOutOfRange => 0xF2,
            Self::FileReadOnly => 0xF3,
            Self::FileTooBig => 0xF4,
            Self::FileNotFound => 0xF5,
            Self::FileNotUnique => 0xF6,
            Self::FileLockedBusy => 0xF7,
            Self::FileSystemFull => 0xF8,
            Self::FileSystemTimeout => 0xF9,
            Self::FileInvalidAddress => 0xFA,
            Self::FileNextSector => 0xFB,
            Self::FileAccessDenied => 0xFC,
            Self::TransferError => 0xFF,
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable error description.
    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::None => "None".to_owned(),
            Self::VerifyFail => "Verify failed".to_owned(),
            Self::TransferFileExists => "Transfer: file already exists".to_owned(),
            Self::TransferTooBig => "Transfer: file too big".to_owned(),
            Self::TransferInvalid => "Transfer: invalid request".to_owned(),
            Self::TransferFileNotFound => "Transfer: file not found".to_owned(),
            Self::TransferCrcMismatch => "Transfer: CRC mismatch".to_owned(),
            Self::TransferBusyWait => "Transfer: busy, wait".to_owned(),
            Self::TransferLutFull => "Transfer: LUT is full".to_owned(),
            Self::TransferComplete => "Transfer complete".to_owned(),
            Self::BrownoutReset => "Brown-out reset trap".to_owned(),
            Self::BleFault => "Bluetooth module fault".to_owned(),
            Self::TrapConflict => "Resource conflict trap".to_owned(),
            Self::TrapIllegalOpcode => "Illegal opcode trap".to_owned(),
            Self::TrapConfigMismatch => "Configuration mismatch trap".to_owned(),
            Self::UpgradeFail => "Firmware upgrade failed".to_owned(),
            Self::FileSystem => "File system error".to_owned(),
            Self::FileInvalid => "File is invalid".to_owned(),
            Self::FileOutOfRange => "File access out of range".to_owned(),
            Self::FileReadOnly => "File is read only".to_owned(),
            Self::FileTooBig => "File is too big".to_owned(),
            Self::FileNotFound => "File not found".to_owned(),
            Self::FileNotUnique => "File ID is not unique".to_owned(),
            Self::FileLockedBusy => "File is locked or busy".to_owned(),
            Self::FileSystemFull => "File system is full".to_owned(),
            Self::FileSystemTimeout => "File system timeout".to_owned(),
            Self::FileInvalidAddress => "Invalid file address".to_owned(),
            Self::FileNextSector => "Next sector required".to_owned(),
            Self::FileAccessDenied => "File access denied".to_owned(),
            Self::TransferError => "Transfer error".to_owned(),
            Self::Unknown(raw) => format!("unknown (0x{raw:02X})"),
        }
    }
}

/// Bit masks of the packed configuration record.
pub mod cfg {
    pub const STATUS_LED_MASK: u8 = 0x01;
    pub const VOLUME_BEEP_MASK: u8 = 0x02;
    pub const POWER_SAVE_MASK: u8 = 0x0C;
    pub const LOCKOUT_MODE_MASK: u8 = 0x30;
    pub const AUDIO_DRC_MASK: u8 = 0x40;

    pub const MOTOR_INVERT_MASK: u8 = 0x01;
    pub const MOTOR_TORQUE_COMP_MASK: u8 = 0x02;
    pub const MOTOR_TOGGLE_MODE_MASK: u8 = 0x04;

    pub const VERSION_MAJOR_MASK: u16 = 0xFF00;
    pub const VERSION_MINOR_MASK: u16 = 0x00FF;

    /// Maximum device name length in bytes (NUL-padded on the wire).
    pub const NAME_MAX: usize = 24;
    pub const MOTOR_CHANNELS_MAX: usize = 4;
}

/// Factory default values.
pub mod defaults {
    pub const NAME: &str = "My PFx Brick";
    pub const BRIGHTNESS: u8 = 0xC0;
    pub const VOLUME: u8 = 0xA0;
    pub const BASS: i8 = 0;
    pub const TREBLE: i8 = 0;
}

/// Event/action lookup-table constants.
pub mod evt {
    /// Highest legal LUT index; the device table has exactly 0x80 entries.
    pub const LUT_INDEX_MAX: u8 = 0x7F;
    /// Highest event ID accepted by the address check.
    pub const EVENT_ID_MAX: u8 = 0x20;
    /// Highest IR channel index.
    pub const CHANNEL_MAX: u8 = 0x03;
    /// Combination-effect select bit of the light effect ID byte.
    pub const LIGHT_COMBO_MASK: u8 = 0x80;
    /// Effect index bits of the light effect ID byte.
    pub const LIGHT_ID_MASK: u8 = 0x7F;
    /// Motor action kind bits of the motor action byte.
    pub const MOTOR_ACTION_ID_MASK: u8 = 0xF0;
    /// Motor output channel bits of the motor action byte.
    pub const MOTOR_OUTPUT_MASK: u8 = 0x0F;
}

/// Administrative magic byte sequences.
///
/// These exact sequences are part of the wire contract; they guard
/// destructive commands against accidental execution by malformed or
/// truncated frames and must be copied verbatim, never derived.
pub mod magic {
    /// Complete factory reset frame (no opcode prefix).
    pub const FACTORY_RESET_FRAME: [u8; 7] = [0xAA, 0x55, 0xDE, 0xAD, 0xBE, 0xEF, 0x02];
    /// Complete reboot frame (no opcode prefix).
    pub const REBOOT_FRAME: [u8; 7] = [0x5A, 0xA5, 0xD0, 0xBE, 0xB0, 0x04, 0x77];
    /// Complete erase-NVRAM frame (no opcode prefix).
    pub const ERASE_NVRAM_FRAME: [u8; 7] = [0xEE, 0x4A, 0x5E, 0xEE, 0x4A, 0x5E, 0x35];
    /// Payload following the `get_status` opcode.
    pub const STATUS_PAYLOAD: [u8; 7] = [0xA5, 0x5A, 0x6E, 0x40, 0x54, 0xA4, 0xE5];
    /// Payload following the `get_icd_rev` opcode.
    pub const ICD_REV_PAYLOAD: [u8; 3] = [0x60, 0x0D, 0x01];
    /// Payload following the `file_format_fs` opcode.
    pub const FORMAT_FS_PAYLOAD: [u8; 3] = [0xEA, 0x5E, 0x88];
    /// Payload following the `write_serial_number` opcode, ahead of the
    /// serial number bytes.
    pub const WRITE_SERIAL_PAYLOAD: [u8; 7] = [0x5E, 0x45, 0x5E, 0x41, 0xA1, 0x10, 0x70];
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn opcodes_are_unique() {
        let raw: HashSet<u8> = CommandOpcode::iter().map(CommandOpcode::as_u8).collect();
        assert_eq!(CommandOpcode::iter().count(), raw.len());
    }

    #[rstest]
    #[case(0x00, StatusCode::Normal)]
    #[case(0x33, StatusCode::NormalPending)]
    #[case(0x55, StatusCode::Service)]
    #[case(0x5B, StatusCode::ServiceBusy)]
    #[case(0x99, StatusCode::Unknown(0x99))]
    fn status_codes_round_trip(#[case] raw: u8, #[case] expected: StatusCode) {
        let code = StatusCode::from_raw(raw);
        assert_eq!(expected, code);
        assert_eq!(raw, code.raw());
    }

    #[test]
    fn unknown_codes_render_hex() {
        assert_eq!("unknown (0x99)", StatusCode::Unknown(0x99).description());
        assert_eq!("unknown (0xE1)", ErrorCode::from_raw(0xE1).description());
    }

    #[test]
    fn error_codes_round_trip_through_raw() {
        for raw in 0x00..=0x0B {
            assert_eq!(raw, ErrorCode::from_raw(raw).raw());
        }
        for raw in 0xF0..=0xFC {
            assert_eq!(raw, ErrorCode::from_raw(raw).raw());
        }
    }

    #[test]
    fn ble_wrapping_round_trips() {
        let frame = [0x01, 0xA5, 0x5A];
        let wrapped = wrap_ble_frame(&frame);
        assert_eq!([0x5B, 0x5B, 0x5B], wrapped[..3]);
        assert_eq!([0x5D, 0x5D, 0x5D], wrapped[wrapped.len() - 3..]);
        assert_eq!(Some(frame.as_slice()), unwrap_ble_frame(&wrapped));
    }

    #[test]
    fn ble_unwrap_rejects_missing_delimiters() {
        assert_eq!(None, unwrap_ble_frame(&[0x5B, 0x5B, 0x01, 0x5D, 0x5D]));
    }
}
