//! The 16-byte event/action record and the LUT addressing scheme.
//!
//! Every slot of the brick's event lookup table holds one fixed-size action
//! record describing a motor action, a light effect, and a sound effect
//! that fire together. The record is positional; this module keeps each
//! byte addressable by name and round-trips unmodeled values untouched.

use std::fmt;

use bon::Builder;
use thiserror::Error;

use crate::protocol::effects::{ActionCommand, LightEffect, MotorAction, SoundAction};
use crate::protocol::evt;

/// Errors raised while forming an event LUT address.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum LutAddressError {
    /// The IR channel is outside the four supported channels.
    #[error("IR channel {channel} is out of range; channels run 0 to {max}", max = evt::CHANNEL_MAX)]
    ChannelOutOfRange { channel: u8 },
    /// The event ID is outside the ID space.
    #[error("event ID 0x{event_id:02X} is out of range; IDs run to 0x{max:02X}", max = evt::EVENT_ID_MAX)]
    EventIdOutOfRange { event_id: u8 },
    /// The packed index falls beyond the last LUT entry.
    #[error(
        "event 0x{event_id:02X} channel {channel} packs to LUT index 0x{index:02X}, past the last entry 0x{max:02X}",
        max = evt::LUT_INDEX_MAX
    )]
    IndexOutOfRange {
        event_id: u8,
        channel: u8,
        index: u8,
    },
}

/// A validated slot address in the event LUT.
///
/// The packed index is the event ID shifted left twice with the channel in
/// the low two bits. Construction is the only place bounds are enforced;
/// holding a `LutAddress` means the slot exists.
///
/// ```
/// use pfx::LutAddress;
///
/// let address = LutAddress::new(0x0D, 2)?;
/// assert_eq!(0x36, address.index());
/// # Ok::<(), pfx::LutAddressError>(())
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LutAddress {
    event_id: u8,
    channel: u8,
}

impl LutAddress {
    /// Validates and packs an event ID / channel pair.
    ///
    /// # Errors
    ///
    /// Fails when the channel or event ID is out of range, or when the
    /// packed index would land past the last LUT entry.
    pub const fn new(event_id: u8, channel: u8) -> Result<Self, LutAddressError> {
        if channel > evt::CHANNEL_MAX {
            return Err(LutAddressError::ChannelOutOfRange { channel });
        }
        if event_id > evt::EVENT_ID_MAX {
            return Err(LutAddressError::EventIdOutOfRange { event_id });
        }
        let index = (event_id << 2) | channel;
        if index > evt::LUT_INDEX_MAX {
            return Err(LutAddressError::IndexOutOfRange {
                event_id,
                channel,
                index,
            });
        }
        Ok(Self { event_id, channel })
    }

    #[must_use]
    pub const fn event_id(self) -> u8 {
        self.event_id
    }

    #[must_use]
    pub const fn channel(self) -> u8 {
        self.channel
    }

    /// The packed LUT slot index.
    #[must_use]
    pub const fn index(self) -> u8 {
        (self.event_id << 2) | self.channel
    }
}

impl fmt::Display for LutAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event 0x{:02X} / channel {} (index 0x{:02X})",
            self.event_id,
            self.channel,
            self.index()
        )
    }
}

/// One event/action record, byte for byte.
///
/// Fields mirror the wire record positionally. All byte values are legal;
/// validation belongs to the device, and an unknown code decodes, prints
/// as unknown, and re-encodes unchanged.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Builder)]
pub struct Action {
    /// Standalone command, byte 0.
    #[builder(default)]
    pub command: u8,
    /// Motor action kind (high nibble) and output mask (low nibble), byte 1.
    #[builder(default)]
    pub motor_action_id: u8,
    #[builder(default)]
    pub motor_param1: u8,
    #[builder(default)]
    pub motor_param2: u8,
    /// Light effect ID, byte 4. Bit `0x80` selects the combination table.
    #[builder(default)]
    pub lightfx_id: u8,
    /// Brick light output mask, byte 5.
    #[builder(default)]
    pub light_output_mask: u8,
    /// Power Functions channel output mask, byte 6.
    #[builder(default)]
    pub light_pf_output_mask: u8,
    #[builder(default)]
    pub light_param1: u8,
    #[builder(default)]
    pub light_param2: u8,
    #[builder(default)]
    pub light_param3: u8,
    #[builder(default)]
    pub light_param4: u8,
    #[builder(default)]
    pub light_param5: u8,
    /// Sound effect ID, byte 12.
    #[builder(default)]
    pub soundfx_id: u8,
    /// Audio file slot the sound effect plays, byte 13.
    #[builder(default)]
    pub sound_file_id: u8,
    #[builder(default)]
    pub sound_param1: u8,
    #[builder(default)]
    pub sound_param2: u8,
}

impl Action {
    /// Packed record length on the wire.
    pub const RECORD_LEN: usize = 16;

    /// Decodes the positional wire record.
    #[must_use]
    pub const fn from_record(record: &[u8; Self::RECORD_LEN]) -> Self {
        Self {
            command: record[0],
            motor_action_id: record[1],
            motor_param1: record[2],
            motor_param2: record[3],
            lightfx_id: record[4],
            light_output_mask: record[5],
            light_pf_output_mask: record[6],
            light_param1: record[7],
            light_param2: record[8],
            light_param3: record[9],
            light_param4: record[10],
            light_param5: record[11],
            soundfx_id: record[12],
            sound_file_id: record[13],
            sound_param1: record[14],
            sound_param2: record[15],
        }
    }

    /// Re-packs the record for the wire.
    #[must_use]
    pub const fn to_record(&self) -> [u8; Self::RECORD_LEN] {
        [
            self.command,
            self.motor_action_id,
            self.motor_param1,
            self.motor_param2,
            self.lightfx_id,
            self.light_output_mask,
            self.light_pf_output_mask,
            self.light_param1,
            self.light_param2,
            self.light_param3,
            self.light_param4,
            self.light_param5,
            self.soundfx_id,
            self.sound_file_id,
            self.sound_param1,
            self.sound_param2,
        ]
    }

    /// True when every byte is zero: the slot does nothing when fired.
    #[must_use]
    pub fn is_no_action(&self) -> bool {
        self.to_record().iter().all(|&byte| byte == 0)
    }

    /// Motor output channels addressed by the action's low mask nibble.
    #[must_use]
    pub const fn motor_outputs(&self) -> u8 {
        self.motor_action_id & evt::MOTOR_OUTPUT_MASK
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_action() {
            return write!(f, "No action");
        }

        writeln!(
            f,
            "Command : {}",
            ActionCommand::from_raw(self.command).description()
        )?;
        writeln!(
            f,
            "Motor   : {} on outputs 0x{:X} [param1=0x{:02X} param2=0x{:02X}]",
            MotorAction::from_raw(self.motor_action_id).description(),
            self.motor_outputs(),
            self.motor_param1,
            self.motor_param2,
        )?;
        writeln!(
            f,
            "Light   : {} mask=0x{:02X} pf=0x{:02X} [{:02X} {:02X} {:02X} {:02X} {:02X}]",
            LightEffect::from_raw(self.lightfx_id).description(),
            self.light_output_mask,
            self.light_pf_output_mask,
            self.light_param1,
            self.light_param2,
            self.light_param3,
            self.light_param4,
            self.light_param5,
        )?;
        write!(
            f,
            "Sound   : {} file=0x{:02X} [param1=0x{:02X} param2=0x{:02X}]",
            SoundAction::from_raw(self.soundfx_id).description(),
            self.sound_file_id,
            self.sound_param1,
            self.sound_param2,
        )
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0x00, 0, 0x00)]
    #[case(0x0D, 2, 0x36)]
    #[case(0x1F, 3, 0x7F)]
    fn address_packs_event_and_channel(#[case] event_id: u8, #[case] channel: u8, #[case] index: u8) {
        let address = LutAddress::new(event_id, channel).expect("address should be in range");
        assert_eq!(index, address.index());
        assert_eq!(event_id, address.event_id());
        assert_eq!(channel, address.channel());
    }

    #[test]
    fn channel_above_three_is_rejected() {
        assert_matches!(
            LutAddress::new(0x01, 4),
            Err(LutAddressError::ChannelOutOfRange { channel: 4 })
        );
    }

    #[test]
    fn event_id_above_id_space_is_rejected() {
        assert_matches!(
            LutAddress::new(0x21, 0),
            Err(LutAddressError::EventIdOutOfRange { event_id: 0x21 })
        );
    }

    #[test]
    fn last_event_id_overflows_the_lut() {
        // 0x20 << 2 == 0x80, one past the last slot
        assert_matches!(
            LutAddress::new(0x20, 0),
            Err(LutAddressError::IndexOutOfRange {
                event_id: 0x20,
                channel: 0,
                index: 0x80,
            })
        );
    }

    #[test]
    fn record_round_trips_positionally() {
        let record: [u8; Action::RECORD_LEN] = [
            0x00, 0x71, 0x40, 0x00, 0x83, 0x0F, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x04, 0x07,
            0x00, 0x00,
        ];
        let action = Action::from_record(&record);
        assert_eq!(0x71, action.motor_action_id);
        assert_eq!(0x01, action.motor_outputs());
        assert_eq!(0x83, action.lightfx_id);
        assert_eq!(record, action.to_record());
    }

    #[test]
    fn zero_record_is_no_action() {
        let action = Action::default();
        assert!(action.is_no_action());
        assert_eq!("No action", action.to_string());
    }

    #[test]
    fn builder_defaults_unset_fields_to_zero() {
        let action = Action::builder()
            .soundfx_id(0x04)
            .sound_file_id(0x02)
            .build();
        assert!(!action.is_no_action());
        assert_eq!(0x00, action.command);
        assert_eq!(0x04, action.soundfx_id);
    }

    #[test]
    fn summary_names_the_combination_light_table() {
        let action = Action::builder()
            .lightfx_id(0x83)
            .light_output_mask(0xFF)
            .build();
        let summary = action.to_string();
        assert!(summary.contains("Knight Rider scanner"), "{summary}");
    }
}
