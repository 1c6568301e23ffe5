//! Enumerated effect tables for the fields of an event/action record.
//!
//! Each table maps a raw field value to a display name. Decoding never
//! rejects a value outside the table; unknown codes are carried through and
//! rendered as `unknown (0xNN)`.

use super::evt;

/// Action command byte (byte 0 of an action record).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ActionCommand {
    None,
    AllOff,
    IrLockoutOn,
    IrLockoutOff,
    IrLockToggle,
    AllMotorsOff,
    AllLightsOff,
    AllAudioOff,
    Restart,
    Unknown(u8),
}

impl ActionCommand {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::None,
            0x01 => Self::AllOff,
            0x02 => Self::IrLockoutOn,
            0x03 => Self::IrLockoutOff,
            0x04 => Self::IrLockToggle,
            0x05 => Self::AllMotorsOff,
            0x06 => Self::AllLightsOff,
            0x07 => Self::AllAudioOff,
            0x08 => Self::Restart,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::None => "None".to_owned(),
            Self::AllOff => "Everything off".to_owned(),
            Self::IrLockoutOn => "IR lockout on".to_owned(),
            Self::IrLockoutOff => "IR lockout off".to_owned(),
            Self::IrLockToggle => "Toggle IR lockout".to_owned(),
            Self::AllMotorsOff => "All motors off".to_owned(),
            Self::AllLightsOff => "All lights off".to_owned(),
            Self::AllAudioOff => "All audio off".to_owned(),
            Self::Restart => "Restart action".to_owned(),
            Self::Unknown(raw) => format!("unknown (0x{raw:02X})"),
        }
    }
}

/// Motor action kind held in the high nibble of action byte 1.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MotorAction {
    EmergencyStop,
    Stop,
    IncreaseSpeed,
    DecreaseSpeed,
    IncreaseSpeedBidirectional,
    DecreaseSpeedBidirectional,
    ChangeDirection,
    SetSpeed,
    SetSpeedTimed,
    Oscillate,
    OscillateBidirectional,
    OscillateBidirectionalWait,
    Random,
    RandomBidirectional,
    SoundModulated,
    Unknown(u8),
}

impl MotorAction {
    /// Decodes the kind from a full motor action byte; the low output-mask
    /// nibble is ignored.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw & evt::MOTOR_ACTION_ID_MASK {
            0x00 => Self::EmergencyStop,
            0x10 => Self::Stop,
            0x20 => Self::IncreaseSpeed,
            0x30 => Self::DecreaseSpeed,
            0x40 => Self::IncreaseSpeedBidirectional,
            0x50 => Self::DecreaseSpeedBidirectional,
            0x60 => Self::ChangeDirection,
            0x70 => Self::SetSpeed,
            0x80 => Self::SetSpeedTimed,
            0x90 => Self::Oscillate,
            0xA0 => Self::OscillateBidirectional,
            0xB0 => Self::OscillateBidirectionalWait,
            0xC0 => Self::Random,
            0xD0 => Self::RandomBidirectional,
            0xE0 => Self::SoundModulated,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::EmergencyStop => "Emergency stop".to_owned(),
            Self::Stop => "Stop".to_owned(),
            Self::IncreaseSpeed => "Increase speed".to_owned(),
            Self::DecreaseSpeed => "Decrease speed".to_owned(),
            Self::IncreaseSpeedBidirectional => "Increase speed (bi-dir)".to_owned(),
            Self::DecreaseSpeedBidirectional => "Decrease speed (bi-dir)".to_owned(),
            Self::ChangeDirection => "Change direction".to_owned(),
            Self::SetSpeed => "Set speed".to_owned(),
            Self::SetSpeedTimed => "Set speed with duration".to_owned(),
            Self::Oscillate => "Oscillate".to_owned(),
            Self::OscillateBidirectional => "Oscillate (bi-dir)".to_owned(),
            Self::OscillateBidirectionalWait => "Oscillate (bi-dir with wait)".to_owned(),
            Self::Random => "Random".to_owned(),
            Self::RandomBidirectional => "Random (bi-dir)".to_owned(),
            Self::SoundModulated => "Sound modulated".to_owned(),
            Self::Unknown(raw) => format!("unknown (0x{raw:02X})"),
        }
    }
}

/// Light effect referenced by action byte 4.
///
/// Bit `0x80` selects between two disjoint tables: clear means the
/// individual-output table, set means the combination table. The same
/// 7-bit index therefore names a different effect depending on that bit.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LightEffect {
    Individual(IndividualLightEffect),
    Combination(CombinationLightEffect),
}

impl LightEffect {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        let index = raw & evt::LIGHT_ID_MASK;
        if raw & evt::LIGHT_COMBO_MASK != 0 {
            Self::Combination(CombinationLightEffect::from_index(index))
        } else {
            Self::Individual(IndividualLightEffect::from_index(index))
        }
    }

    /// Re-packs the effect into the raw ID byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Individual(effect) => effect.index(),
            Self::Combination(effect) => effect.index() | evt::LIGHT_COMBO_MASK,
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::Individual(effect) => effect.description(),
            Self::Combination(effect) => effect.description(),
        }
    }
}

/// Effects applied independently per light output.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IndividualLightEffect {
    None,
    OnOffToggle,
    IncreaseBrightness,
    DecreaseBrightness,
    SetBrightness,
    Flash50Positive,
    Flash50Negative,
    StrobePositive,
    StrobeNegative,
    GyralitePositive,
    GyraliteNegative,
    Flicker,
    RandomBlink,
    PhotonTorpedo,
    LaserPulse,
    EngineGlow,
    Lighthouse,
    BrokenLight,
    StatusIndicator,
    SoundModulated,
    MotorModulated,
    Unknown(u8),
}

impl IndividualLightEffect {
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0x00 => Self::None,
            0x01 => Self::OnOffToggle,
            0x02 => Self::IncreaseBrightness,
            0x03 => Self::DecreaseBrightness,
            0x04 => Self::SetBrightness,
            0x05 => Self::Flash50Positive,
            0x06 => Self::Flash50Negative,
            0x07 => Self::StrobePositive,
            0x08 => Self::StrobeNegative,
            0x09 => Self::GyralitePositive,
            0x0A => Self::GyraliteNegative,
            0x0B => Self::Flicker,
            0x0C => Self::RandomBlink,
            0x0D => Self::PhotonTorpedo,
            0x0E => Self::LaserPulse,
            0x0F => Self::EngineGlow,
            0x10 => Self::Lighthouse,
            0x11 => Self::BrokenLight,
            0x12 => Self::StatusIndicator,
            0x13 => Self::SoundModulated,
            0x14 => Self::MotorModulated,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::OnOffToggle => 0x01,
            Self::IncreaseBrightness => 0x02,
            Self::DecreaseBrightness => 0x03,
            Self::SetBrightness => 0x04,
            Self::Flash50Positive => 0x05,
            Self::Flash50Negative => 0x06,
            Self::StrobePositive => 0x07,
            Self::StrobeNegative => 0x08,
            Self::GyralitePositive => 0x09,
            Self::GyraliteNegative => 0x0A,
            Self::Flicker => 0x0B,
            Self::RandomBlink => 0x0C,
            Self::PhotonTorpedo => 0x0D,
            Self::LaserPulse => 0x0E,
            Self::EngineGlow => 0x0F,
            Self::Lighthouse => 0x10,
            Self::BrokenLight => 0x11,
            Self::StatusIndicator => 0x12,
            Self::SoundModulated => 0x13,
            Self::MotorModulated => 0x14,
            Self::Unknown(index) => index,
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::None => "None".to_owned(),
            Self::OnOffToggle => "On/off toggle".to_owned(),
            Self::IncreaseBrightness => "Increase brightness".to_owned(),
            Self::DecreaseBrightness => "Decrease brightness".to_owned(),
            Self::SetBrightness => "Set brightness".to_owned(),
            Self::Flash50Positive => "Flash 50% duty (positive)".to_owned(),
            Self::Flash50Negative => "Flash 50% duty (negative)".to_owned(),
            Self::StrobePositive => "Strobe (positive)".to_owned(),
            Self::StrobeNegative => "Strobe (negative)".to_owned(),
            Self::GyralitePositive => "Gyralite (positive)".to_owned(),
            Self::GyraliteNegative => "Gyralite (negative)".to_owned(),
            Self::Flicker => "Flicker".to_owned(),
            Self::RandomBlink => "Random blink".to_owned(),
            Self::PhotonTorpedo => "Photon torpedo".to_owned(),
            Self::LaserPulse => "Laser pulse".to_owned(),
            Self::EngineGlow => "Engine glow".to_owned(),
            Self::Lighthouse => "Lighthouse".to_owned(),
            Self::BrokenLight => "Broken light".to_owned(),
            Self::StatusIndicator => "Status indicator".to_owned(),
            Self::SoundModulated => "Sound modulated".to_owned(),
            Self::MotorModulated => "Motor modulated".to_owned(),
            Self::Unknown(index) => format!("unknown (0x{index:02X})"),
        }
    }
}

/// Effects coordinating several light outputs at once.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CombinationLightEffect {
    None,
    LinearSweep,
    Bargraph,
    KnightRider,
    EmergencyTwinsonic,
    EmergencyWhelen,
    TimesSquare,
    Noise,
    TwinkleStar,
    TrafficSignal,
    SoundBar,
    AlternatingFlash,
    LavaLamp,
    LaserCannon,
    Unknown(u8),
}

impl CombinationLightEffect {
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0x00 => Self::None,
            0x01 => Self::LinearSweep,
            0x02 => Self::Bargraph,
            0x03 => Self::KnightRider,
            0x04 => Self::EmergencyTwinsonic,
            0x05 => Self::EmergencyWhelen,
            0x06 => Self::TimesSquare,
            0x07 => Self::Noise,
            0x08 => Self::TwinkleStar,
            0x09 => Self::TrafficSignal,
            0x0A => Self::SoundBar,
            0x0B => Self::AlternatingFlash,
            0x0C => Self::LavaLamp,
            0x0D => Self::LaserCannon,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::LinearSweep => 0x01,
            Self::Bargraph => 0x02,
            Self::KnightRider => 0x03,
            Self::EmergencyTwinsonic => 0x04,
            Self::EmergencyWhelen => 0x05,
            Self::TimesSquare => 0x06,
            Self::Noise => 0x07,
            Self::TwinkleStar => 0x08,
            Self::TrafficSignal => 0x09,
            Self::SoundBar => 0x0A,
            Self::AlternatingFlash => 0x0B,
            Self::LavaLamp => 0x0C,
            Self::LaserCannon => 0x0D,
            Self::Unknown(index) => index,
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::None => "None".to_owned(),
            Self::LinearSweep => "Linear sweep".to_owned(),
            Self::Bargraph => "Bargraph".to_owned(),
            Self::KnightRider => "Knight Rider scanner".to_owned(),
            Self::EmergencyTwinsonic => "Emergency lights (Twinsonic)".to_owned(),
            Self::EmergencyWhelen => "Emergency lights (Whelen)".to_owned(),
            Self::TimesSquare => "Times Square".to_owned(),
            Self::Noise => "Noise".to_owned(),
            Self::TwinkleStar => "Twinkling stars".to_owned(),
            Self::TrafficSignal => "Traffic signal".to_owned(),
            Self::SoundBar => "Sound bar".to_owned(),
            Self::AlternatingFlash => "Alternating flashers".to_owned(),
            Self::LavaLamp => "Lava lamp".to_owned(),
            Self::LaserCannon => "Laser cannon".to_owned(),
            Self::Unknown(index) => format!("unknown (0x{index:02X})"),
        }
    }
}

/// Sound effect kind held in action byte 12.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SoundAction {
    None,
    IncreaseVolume,
    DecreaseVolume,
    SetVolume,
    PlayOnce,
    PlayContinuous,
    PlayNTimes,
    PlayForDuration,
    PlayPitched,
    PlayGated,
    PlayAmplitudeModulated,
    Stop,
    PlayIndexedMotor,
    PlayRandom,
    Unknown(u8),
}

impl SoundAction {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::None,
            0x01 => Self::IncreaseVolume,
            0x02 => Self::DecreaseVolume,
            0x03 => Self::SetVolume,
            0x04 => Self::PlayOnce,
            0x05 => Self::PlayContinuous,
            0x06 => Self::PlayNTimes,
            0x07 => Self::PlayForDuration,
            0x08 => Self::PlayPitched,
            0x09 => Self::PlayGated,
            0x0A => Self::PlayAmplitudeModulated,
            0x0B => Self::Stop,
            0x0C => Self::PlayIndexedMotor,
            0x0D => Self::PlayRandom,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::None => "None".to_owned(),
            Self::IncreaseVolume => "Increase volume".to_owned(),
            Self::DecreaseVolume => "Decrease volume".to_owned(),
            Self::SetVolume => "Set volume".to_owned(),
            Self::PlayOnce => "Play once".to_owned(),
            Self::PlayContinuous => "Play continuously".to_owned(),
            Self::PlayNTimes => "Play n times".to_owned(),
            Self::PlayForDuration => "Play for duration".to_owned(),
            Self::PlayPitched => "Play with pitch".to_owned(),
            Self::PlayGated => "Play gated".to_owned(),
            Self::PlayAmplitudeModulated => "Play amplitude modulated".to_owned(),
            Self::Stop => "Stop playback".to_owned(),
            Self::PlayIndexedMotor => "Play indexed to motor speed".to_owned(),
            Self::PlayRandom => "Play at random intervals".to_owned(),
            Self::Unknown(raw) => format!("unknown (0x{raw:02X})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0x80 | 0x03, LightEffect::Combination(CombinationLightEffect::KnightRider))]
    #[case(0x03, LightEffect::Individual(IndividualLightEffect::DecreaseBrightness))]
    fn combo_bit_selects_table(#[case] raw: u8, #[case] expected: LightEffect) {
        assert_eq!(expected, LightEffect::from_raw(raw));
    }

    #[rstest]
    #[case(0x00)]
    #[case(0x14)]
    #[case(0x42)]
    #[case(0x83)]
    #[case(0xFF)]
    fn light_effect_raw_round_trips(#[case] raw: u8) {
        assert_eq!(raw, LightEffect::from_raw(raw).raw());
    }

    #[test]
    fn motor_action_ignores_output_nibble() {
        assert_eq!(MotorAction::SetSpeed, MotorAction::from_raw(0x7F));
        assert_eq!(MotorAction::SetSpeed, MotorAction::from_raw(0x70));
    }

    #[test]
    fn unknown_effects_render_hex() {
        assert_eq!(
            "unknown (0x42)",
            IndividualLightEffect::from_index(0x42).description()
        );
        assert_eq!("unknown (0x0E)", SoundAction::from_raw(0x0E).description());
    }
}
