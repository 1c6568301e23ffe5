mod action;
mod app;
mod cli;
mod config;
mod error;
mod hw;
mod protocol;
mod telemetry;

pub use action::{Action, LutAddress, LutAddressError};
pub use app::{fake_transport, run, transport_for, usb_transport};
pub use cli::{
    ActionSubcommand, Args, Command, NameCommand, OutputFormat, ResponseScript, TransportSelection,
};
pub use config::{
    AutoOffMode, BleTxPower, Configuration, LockoutMode, MotorChannelConfig, MotorOnDisconnect,
    PowerSaveMode, StatusLedMode, VersionWord,
};
pub use error::{FixtureError, ProtocolError};
pub use hw::{
    DEFAULT_READ_TIMEOUT, DeviceSession, FakeTransport, HidTransport, Transport, TransportError,
};
pub use protocol::effects::{
    ActionCommand, CombinationLightEffect, IndividualLightEffect, LightEffect, MotorAction,
    SoundAction,
};
pub use protocol::frame::{DeviceIdentity, FrameCodec, FrameError, StatusReport};
pub use protocol::{
    CommandOpcode, ErrorCode, StatusCode, unwrap_ble_frame, wrap_ble_frame,
};
