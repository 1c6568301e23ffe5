//! Structured model of the brick's packed configuration record.
//!
//! The wire record is a fixed byte sequence; each logical field occupies a
//! specific byte or specific bits within one byte, and fields never
//! overlap. Decoding applies the documented masks; encoding is the exact
//! inverse and always reconstructs the full record. The brick is the sole
//! source of truth: mutating a [`Configuration`] locally changes nothing
//! until it is written back.

use std::fmt;

use crate::protocol::{cfg, defaults};

// Record byte offsets. The record starts after the response echo byte.
const OFS_FIRMWARE_VERSION: usize = 0;
const OFS_ICD_VERSION: usize = 2;
const OFS_SETTINGS: usize = 4;
const OFS_IR_AUTO_OFF: usize = 5;
const OFS_BLE_AUTO_OFF: usize = 6;
const OFS_BLE_MOTOR_DISCONNECT: usize = 7;
const OFS_BLE_ADV_POWER: usize = 8;
const OFS_BLE_SESSION_POWER: usize = 9;
const OFS_BASS: usize = 10;
const OFS_TREBLE: usize = 11;
const OFS_BRIGHTNESS: usize = 12;
const OFS_VOLUME: usize = 13;
const OFS_MOTORS: usize = 14;

/// Status LED behaviour while the brick is idle.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum StatusLedMode {
    /// LED lit during normal operation.
    #[default]
    On,
    /// LED off during normal operation.
    Off,
}

impl StatusLedMode {
    const fn from_settings(settings: u8) -> Self {
        if settings & cfg::STATUS_LED_MASK != 0 {
            Self::Off
        } else {
            Self::On
        }
    }

    const fn settings_bits(self) -> u8 {
        match self {
            Self::On => 0x00,
            Self::Off => cfg::STATUS_LED_MASK,
        }
    }
}

/// Idle interval after which the brick powers itself down.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum PowerSaveMode {
    #[default]
    Off,
    After30Minutes,
    After60Minutes,
    After3Hours,
}

impl PowerSaveMode {
    const fn from_settings(settings: u8) -> Self {
        match settings & cfg::POWER_SAVE_MASK {
            0x04 => Self::After30Minutes,
            0x08 => Self::After60Minutes,
            0x0C => Self::After3Hours,
            _ => Self::Off,
        }
    }

    const fn settings_bits(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::After30Minutes => 0x04,
            Self::After60Minutes => 0x08,
            Self::After3Hours => 0x0C,
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Off => "Never".to_owned(),
            Self::After30Minutes => "After 30 minutes".to_owned(),
            Self::After60Minutes => "After 60 minutes".to_owned(),
            Self::After3Hours => "After 3 hours".to_owned(),
        }
    }
}

/// IR remote lockout scope.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum LockoutMode {
    /// Lockout inhibited.
    #[default]
    Inhibit,
    /// Lockout applies to channel 1 only.
    Channel1,
    /// Lockout applies to all channels.
    AllChannels,
    /// Reserved encoding kept verbatim for round-tripping.
    Unknown(u8),
}

impl LockoutMode {
    const fn from_settings(settings: u8) -> Self {
        match settings & cfg::LOCKOUT_MODE_MASK {
            0x00 => Self::Inhibit,
            0x10 => Self::Channel1,
            0x20 => Self::AllChannels,
            other => Self::Unknown(other),
        }
    }

    const fn settings_bits(self) -> u8 {
        match self {
            Self::Inhibit => 0x00,
            Self::Channel1 => 0x10,
            Self::AllChannels => 0x20,
            Self::Unknown(bits) => bits & cfg::LOCKOUT_MODE_MASK,
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Inhibit => "Inhibited".to_owned(),
            Self::Channel1 => "Channel 1".to_owned(),
            Self::AllChannels => "All channels".to_owned(),
            Self::Unknown(bits) => format!("unknown (0x{bits:02X})"),
        }
    }
}

/// Automatic radio power-off interval, used for both the IR receiver and
/// the BLE radio.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum AutoOffMode {
    #[default]
    Never,
    After1Minute,
    After5Minutes,
    Immediate,
    /// Firmware may add codes; they are preserved, not rejected.
    Unknown(u8),
}

impl AutoOffMode {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Never,
            0x01 => Self::After1Minute,
            0x02 => Self::After5Minutes,
            0x03 => Self::Immediate,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Never => 0x00,
            Self::After1Minute => 0x01,
            Self::After5Minutes => 0x02,
            Self::Immediate => 0x03,
            Self::Unknown(raw) => raw,
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Never => "Never".to_owned(),
            Self::After1Minute => "After 1 minute".to_owned(),
            Self::After5Minutes => "After 5 minutes".to_owned(),
            Self::Immediate => "Immediately".to_owned(),
            Self::Unknown(raw) => format!("unknown (0x{raw:02X})"),
        }
    }
}

/// Motor policy when the BLE link drops mid-session.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum MotorOnDisconnect {
    #[default]
    Continue,
    Stop,
    Unknown(u8),
}

impl MotorOnDisconnect {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Continue,
            0x01 => Self::Stop,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Continue => 0x00,
            Self::Stop => 0x01,
            Self::Unknown(raw) => raw,
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Continue => "Continue running".to_owned(),
            Self::Stop => "Stop all motors".to_owned(),
            Self::Unknown(raw) => format!("unknown (0x{raw:02X})"),
        }
    }
}

/// BLE transmit power class. `0` is maximum, `5` minimum; intermediate and
/// future codes are preserved verbatim.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, derive_more::Into)]
pub struct BleTxPower(u8);

impl BleTxPower {
    pub const MAX: Self = Self(0x00);
    pub const MIN: Self = Self(0x05);

    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn description(self) -> String {
        match self.0 {
            0x00 => "Maximum".to_owned(),
            0x05 => "Minimum".to_owned(),
            raw => format!("class {raw}"),
        }
    }
}

/// Per-channel motor output flags, one packed byte each on the wire.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct MotorChannelConfig {
    /// Reverse the output polarity.
    pub invert: bool,
    /// Low-frequency PWM at low speeds for extra torque.
    pub torque_compensation: bool,
    /// Treat speed commands as on/off toggles.
    pub toggle_mode: bool,
}

impl MotorChannelConfig {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            invert: raw & cfg::MOTOR_INVERT_MASK != 0,
            torque_compensation: raw & cfg::MOTOR_TORQUE_COMP_MASK != 0,
            toggle_mode: raw & cfg::MOTOR_TOGGLE_MODE_MASK != 0,
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        let mut raw = 0u8;
        if self.invert {
            raw |= cfg::MOTOR_INVERT_MASK;
        }
        if self.torque_compensation {
            raw |= cfg::MOTOR_TORQUE_COMP_MASK;
        }
        if self.toggle_mode {
            raw |= cfg::MOTOR_TOGGLE_MODE_MASK;
        }
        raw
    }
}

/// A 16-bit version word with the major number in the high byte and the
/// minor number in the low byte.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, derive_more::From, derive_more::Into)]
pub struct VersionWord(u16);

impl VersionWord {
    #[must_use]
    pub const fn major(self) -> u8 {
        ((self.0 & cfg::VERSION_MAJOR_MASK) >> 8) as u8
    }

    #[must_use]
    pub const fn minor(self) -> u8 {
        (self.0 & cfg::VERSION_MINOR_MASK) as u8
    }
}

impl fmt::Display for VersionWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}.{:02X}", self.major(), self.minor())
    }
}

/// The brick's structured configuration record.
///
/// Constructed empty with factory defaults, populated by decoding a
/// `get_config` response, mutated locally, then re-encoded in full for a
/// `set_config` write.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub firmware_version: VersionWord,
    pub icd_version: VersionWord,
    pub status_led: StatusLedMode,
    pub volume_beep: bool,
    pub power_save: PowerSaveMode,
    pub lockout_mode: LockoutMode,
    pub audio_drc: bool,
    pub ir_auto_off: AutoOffMode,
    pub ble_auto_off: AutoOffMode,
    pub ble_motor_disconnect: MotorOnDisconnect,
    pub ble_adv_power: BleTxPower,
    pub ble_session_power: BleTxPower,
    pub bass: i8,
    pub treble: i8,
    pub default_brightness: u8,
    pub default_volume: u8,
    pub motors: [MotorChannelConfig; cfg::MOTOR_CHANNELS_MAX],
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            firmware_version: VersionWord::default(),
            icd_version: VersionWord::default(),
            status_led: StatusLedMode::default(),
            volume_beep: false,
            power_save: PowerSaveMode::default(),
            lockout_mode: LockoutMode::default(),
            audio_drc: false,
            ir_auto_off: AutoOffMode::default(),
            ble_auto_off: AutoOffMode::default(),
            ble_motor_disconnect: MotorOnDisconnect::default(),
            ble_adv_power: BleTxPower::MAX,
            ble_session_power: BleTxPower::MAX,
            bass: defaults::BASS,
            treble: defaults::TREBLE,
            default_brightness: defaults::BRIGHTNESS,
            default_volume: defaults::VOLUME,
            motors: [MotorChannelConfig::default(); cfg::MOTOR_CHANNELS_MAX],
        }
    }
}

impl Configuration {
    /// Packed record length on the wire.
    pub const RECORD_LEN: usize = OFS_MOTORS + cfg::MOTOR_CHANNELS_MAX;

    /// Decodes the packed wire record.
    #[must_use]
    pub fn from_record(record: &[u8; Self::RECORD_LEN]) -> Self {
        let settings = record[OFS_SETTINGS];
        let mut motors = [MotorChannelConfig::default(); cfg::MOTOR_CHANNELS_MAX];
        for (channel, motor) in motors.iter_mut().enumerate() {
            *motor = MotorChannelConfig::from_raw(record[OFS_MOTORS + channel]);
        }

        Self {
            firmware_version: VersionWord::from(u16::from_be_bytes([
                record[OFS_FIRMWARE_VERSION],
                record[OFS_FIRMWARE_VERSION + 1],
            ])),
            icd_version: VersionWord::from(u16::from_be_bytes([
                record[OFS_ICD_VERSION],
                record[OFS_ICD_VERSION + 1],
            ])),
            status_led: StatusLedMode::from_settings(settings),
            volume_beep: settings & cfg::VOLUME_BEEP_MASK != 0,
            power_save: PowerSaveMode::from_settings(settings),
            lockout_mode: LockoutMode::from_settings(settings),
            audio_drc: settings & cfg::AUDIO_DRC_MASK != 0,
            ir_auto_off: AutoOffMode::from_raw(record[OFS_IR_AUTO_OFF]),
            ble_auto_off: AutoOffMode::from_raw(record[OFS_BLE_AUTO_OFF]),
            ble_motor_disconnect: MotorOnDisconnect::from_raw(record[OFS_BLE_MOTOR_DISCONNECT]),
            ble_adv_power: BleTxPower::from_raw(record[OFS_BLE_ADV_POWER]),
            ble_session_power: BleTxPower::from_raw(record[OFS_BLE_SESSION_POWER]),
            bass: record[OFS_BASS] as i8,
            treble: record[OFS_TREBLE] as i8,
            default_brightness: record[OFS_BRIGHTNESS],
            default_volume: record[OFS_VOLUME],
            motors,
        }
    }

    /// Re-packs the configuration into the full wire record.
    #[must_use]
    pub fn to_record(&self) -> [u8; Self::RECORD_LEN] {
        let mut record = [0u8; Self::RECORD_LEN];
        record[OFS_FIRMWARE_VERSION..OFS_FIRMWARE_VERSION + 2]
            .copy_from_slice(&u16::from(self.firmware_version).to_be_bytes());
        record[OFS_ICD_VERSION..OFS_ICD_VERSION + 2]
            .copy_from_slice(&u16::from(self.icd_version).to_be_bytes());

        let mut settings = self.status_led.settings_bits()
            | self.power_save.settings_bits()
            | self.lockout_mode.settings_bits();
        if self.volume_beep {
            settings |= cfg::VOLUME_BEEP_MASK;
        }
        if self.audio_drc {
            settings |= cfg::AUDIO_DRC_MASK;
        }
        record[OFS_SETTINGS] = settings;

        record[OFS_IR_AUTO_OFF] = self.ir_auto_off.raw();
        record[OFS_BLE_AUTO_OFF] = self.ble_auto_off.raw();
        record[OFS_BLE_MOTOR_DISCONNECT] = self.ble_motor_disconnect.raw();
        record[OFS_BLE_ADV_POWER] = self.ble_adv_power.raw();
        record[OFS_BLE_SESSION_POWER] = self.ble_session_power.raw();
        record[OFS_BASS] = self.bass as u8;
        record[OFS_TREBLE] = self.treble as u8;
        record[OFS_BRIGHTNESS] = self.default_brightness;
        record[OFS_VOLUME] = self.default_volume;
        for (channel, motor) in self.motors.iter().enumerate() {
            record[OFS_MOTORS + channel] = motor.raw();
        }
        record
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Firmware version  : {}", self.firmware_version)?;
        writeln!(f, "ICD version       : {}", self.icd_version)?;
        writeln!(f, "Status LED        : {:?}", self.status_led)?;
        writeln!(f, "Volume beep       : {}", on_off(self.volume_beep))?;
        writeln!(f, "Power save        : {}", self.power_save.description())?;
        writeln!(f, "IR lockout        : {}", self.lockout_mode.description())?;
        writeln!(f, "Audio DRC         : {}", on_off(self.audio_drc))?;
        writeln!(f, "IR auto power off : {}", self.ir_auto_off.description())?;
        writeln!(f, "BLE auto power off: {}", self.ble_auto_off.description())?;
        writeln!(
            f,
            "BLE on disconnect : {}",
            self.ble_motor_disconnect.description()
        )?;
        writeln!(f, "BLE adv TX power  : {}", self.ble_adv_power.description())?;
        writeln!(
            f,
            "BLE sess TX power : {}",
            self.ble_session_power.description()
        )?;
        writeln!(f, "Bass              : {:+}", self.bass)?;
        writeln!(f, "Treble            : {:+}", self.treble)?;
        writeln!(f, "Brightness        : 0x{:02X}", self.default_brightness)?;
        writeln!(f, "Volume            : 0x{:02X}", self.default_volume)?;
        for (channel, motor) in self.motors.iter().enumerate() {
            writeln!(
                f,
                "Motor channel {}   : [{:02X}] invert={} trqcomp={} toggle={}",
                (b'A' + channel as u8) as char,
                motor.raw(),
                motor.invert,
                motor.torque_compensation,
                motor.toggle_mode,
            )?;
        }
        Ok(())
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "On" } else { "Off" }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn sample() -> Configuration {
        Configuration {
            firmware_version: VersionWord::from(0x0151),
            icd_version: VersionWord::from(0x0336),
            status_led: StatusLedMode::Off,
            volume_beep: true,
            power_save: PowerSaveMode::After60Minutes,
            lockout_mode: LockoutMode::AllChannels,
            audio_drc: true,
            ir_auto_off: AutoOffMode::After5Minutes,
            ble_auto_off: AutoOffMode::Immediate,
            ble_motor_disconnect: MotorOnDisconnect::Stop,
            ble_adv_power: BleTxPower::from_raw(0x02),
            ble_session_power: BleTxPower::MIN,
            bass: -4,
            treble: 7,
            default_brightness: 0xC0,
            default_volume: 0xA0,
            motors: [
                MotorChannelConfig {
                    invert: true,
                    torque_compensation: false,
                    toggle_mode: true,
                },
                MotorChannelConfig::default(),
                MotorChannelConfig {
                    invert: false,
                    torque_compensation: true,
                    toggle_mode: false,
                },
                MotorChannelConfig::default(),
            ],
        }
    }

    #[test]
    fn record_round_trips() {
        let config = sample();
        let decoded = Configuration::from_record(&config.to_record());
        assert_eq!(config, decoded);
    }

    #[test]
    fn default_record_round_trips() {
        let config = Configuration::default();
        let decoded = Configuration::from_record(&config.to_record());
        assert_eq!(config, decoded);
    }

    #[test]
    fn settings_byte_packs_documented_masks() {
        let record = sample().to_record();
        // LED off (0x01) | beep (0x02) | 60 min power save (0x08)
        // | all-channel lockout (0x20) | DRC (0x40)
        assert_eq!(0x6B, record[OFS_SETTINGS]);
    }

    #[test]
    fn unknown_auto_off_code_is_preserved() {
        let mut record = sample().to_record();
        record[OFS_IR_AUTO_OFF] = 0x09;
        let config = Configuration::from_record(&record);
        assert_eq!(AutoOffMode::Unknown(0x09), config.ir_auto_off);
        assert_eq!(record, config.to_record());
        assert_eq!("unknown (0x09)", config.ir_auto_off.description());
    }

    #[test]
    fn reserved_lockout_bits_are_preserved() {
        let mut record = sample().to_record();
        record[OFS_SETTINGS] = (record[OFS_SETTINGS] & !0x30) | 0x30;
        let config = Configuration::from_record(&record);
        assert_eq!(LockoutMode::Unknown(0x30), config.lockout_mode);
        assert_eq!(record, config.to_record());
    }

    #[rstest]
    #[case(0x0151, 1, 0x51, "1.51")]
    #[case(0x0336, 3, 0x36, "3.36")]
    #[case(0x0000, 0, 0, "0.00")]
    fn version_word_splits_major_minor(
        #[case] word: u16,
        #[case] major: u8,
        #[case] minor: u8,
        #[case] rendered: &str,
    ) {
        let version = VersionWord::from(word);
        assert_eq!(major, version.major());
        assert_eq!(minor, version.minor());
        assert_eq!(rendered, version.to_string());
    }

    #[test]
    fn negative_trim_survives_the_wire() {
        let mut config = Configuration::default();
        config.bass = -8;
        config.treble = -1;
        let decoded = Configuration::from_record(&config.to_record());
        assert_eq!(-8, decoded.bass);
        assert_eq!(-1, decoded.treble);
    }
}
