use std::io;

use anyhow::{Context, Result, ensure};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::instrument;

use crate::action::{Action, LutAddress};
use crate::cli::{ActionSubcommand, Command, NameCommand, OutputFormat, TransportSelection};
use crate::error::ProtocolError;
use crate::hw::{DeviceSession, FakeTransport, HidTransport, Transport, TransportError};
use crate::protocol::frame::DeviceIdentity;
use crate::telemetry;

/// Creates a fake fixture transport, optionally pre-loaded with scripted
/// responses.
#[must_use]
pub fn fake_transport(responses: Vec<Vec<u8>>) -> Box<dyn Transport> {
    Box::new(FakeTransport::builder().responses(responses).build())
}

/// Opens the USB HID transport, pinned to one serial number when given.
///
/// # Errors
///
/// Returns a [`TransportError`] when no matching brick is attached or the
/// device cannot be opened.
pub fn usb_transport(serial: Option<&str>) -> Result<Box<dyn Transport>, TransportError> {
    let transport = match serial {
        Some(serial) => HidTransport::open_serial(serial)?,
        None => HidTransport::open()?,
    };
    Ok(Box::new(transport))
}

/// Builds the transport selected on the command line.
///
/// # Errors
///
/// Returns a [`TransportError`] when the USB device cannot be opened.
pub fn transport_for(selection: TransportSelection) -> Result<Box<dyn Transport>, TransportError> {
    match selection {
        TransportSelection::Fake { responses } => Ok(fake_transport(responses)),
        TransportSelection::Usb { serial } => usb_transport(serial.as_deref()),
    }
}

/// JSON document emitted by a command run.
#[derive(Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum CommandResult {
    Status {
        status: String,
        error: String,
        identity: DeviceIdentity,
    },
    Icd {
        revision: String,
    },
    Config {
        firmware_version: String,
        icd_version: String,
        record: String,
    },
    Name {
        name: String,
    },
    Action {
        event: u8,
        channel: u8,
        record: String,
        summary: String,
    },
    Ack {
        acknowledged: String,
    },
}

/// Runs one CLI command over the given transport.
///
/// ```
/// use clap::Parser;
/// use pfx::{Args, OutputFormat};
///
/// # fn demo() -> anyhow::Result<()> {
/// let args = Args::try_parse_from(["pfx", "--fake", "status"])?;
/// let (command, selection) = args.into_command_and_transport();
/// let transport = pfx::transport_for(selection)?;
/// let mut out = Vec::new();
/// pfx::run(command, &mut out, transport, OutputFormat::Json)?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation, the device exchange, or
/// output writing fails.
#[instrument(skip(out, transport), level = "info", fields(command = command_name(&command)))]
pub fn run<W>(
    command: Command,
    out: &mut W,
    transport: Box<dyn Transport>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    telemetry::initialise_tracing(true)?;

    let mut session = DeviceSession::new();
    session.open(transport)?;

    let result = match command {
        Command::Status => {
            let report = session.get_status()?;
            CommandResult::Status {
                status: report.status.description(),
                error: report.error.description(),
                identity: report.identity,
            }
        }
        Command::Icd => CommandResult::Icd {
            revision: session.get_icd_revision()?,
        },
        Command::Config => {
            let config = session.get_config()?;
            CommandResult::Config {
                firmware_version: config.firmware_version.to_string(),
                icd_version: config.icd_version.to_string(),
                record: hex::encode_upper(config.to_record()),
            }
        }
        Command::Name { action } => match action {
            NameCommand::Get => CommandResult::Name {
                name: session.get_name()?,
            },
            NameCommand::Set { name } => {
                session.set_name(&name)?;
                CommandResult::Name { name }
            }
        },
        Command::Action { action } => match action {
            ActionSubcommand::Get { event, channel } => {
                let address = LutAddress::new(event, channel).map_err(ProtocolError::from)?;
                let record = session.get_action(address)?;
                CommandResult::Action {
                    event,
                    channel,
                    record: hex::encode_upper(record.to_record()),
                    summary: record.to_string(),
                }
            }
            ActionSubcommand::Set {
                event,
                channel,
                record,
            } => {
                let address = LutAddress::new(event, channel).map_err(ProtocolError::from)?;
                let action = parse_action_record(&record)?;
                session.set_action(address, &action)?;
                CommandResult::Action {
                    event,
                    channel,
                    record: hex::encode_upper(action.to_record()),
                    summary: action.to_string(),
                }
            }
            ActionSubcommand::Test { record } => {
                let action = parse_action_record(&record)?;
                session.test_action(&action)?;
                CommandResult::Ack {
                    acknowledged: "test_action".to_owned(),
                }
            }
        },
        Command::Reboot => {
            session.reboot()?;
            CommandResult::Ack {
                acknowledged: "reboot".to_owned(),
            }
        }
        Command::FactoryReset => {
            session.factory_reset()?;
            CommandResult::Ack {
                acknowledged: "set_factory_defaults".to_owned(),
            }
        }
        Command::EraseNvram => {
            session.erase_nvram()?;
            CommandResult::Ack {
                acknowledged: "erase_nvram".to_owned(),
            }
        }
        Command::FormatFs => {
            session.format_filesystem()?;
            CommandResult::Ack {
                acknowledged: "file_format_fs".to_owned(),
            }
        }
    };

    match output_format {
        OutputFormat::Pretty => render_pretty(out, &result, &session)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &result).context("failed to serialise result")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn parse_action_record(record: &str) -> Result<Action> {
    let cleaned: String = record.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(cleaned).context("action record must be hexadecimal bytes")?;
    ensure!(
        bytes.len() == Action::RECORD_LEN,
        "action record must be exactly {} bytes, got {}",
        Action::RECORD_LEN,
        bytes.len()
    );
    let mut raw = [0u8; Action::RECORD_LEN];
    raw.copy_from_slice(&bytes);
    Ok(Action::from_record(&raw))
}

fn render_pretty<W>(out: &mut W, result: &CommandResult, session: &DeviceSession) -> Result<()>
where
    W: io::Write,
{
    match result {
        CommandResult::Status {
            status,
            error,
            identity,
        } => {
            writeln!(out, "{}", "PFx Brick status".bold())?;
            writeln!(out, "  Status      : {status}")?;
            writeln!(out, "  Last error  : {error}")?;
            writeln!(out, "  Product     : {} ({})", identity.product_desc, identity.product_id)?;
            writeln!(out, "  Serial      : {}", identity.serial_number)?;
            writeln!(
                out,
                "  Firmware    : v{} build {}",
                identity.firmware_version, identity.firmware_build
            )?;
        }
        CommandResult::Icd { revision } => {
            writeln!(out, "ICD revision {revision}")?;
        }
        CommandResult::Config { record, .. } => {
            writeln!(out, "{}", "PFx Brick configuration".bold())?;
            if let Some(config) = session.cached_config() {
                write!(out, "{config}")?;
            }
            writeln!(out, "Record            : {record}")?;
        }
        CommandResult::Name { name } => {
            writeln!(out, "Device name: {name}")?;
        }
        CommandResult::Action {
            event,
            channel,
            record,
            summary,
        } => {
            writeln!(
                out,
                "{} event 0x{event:02X} channel {channel}",
                "Action".bold()
            )?;
            writeln!(out, "{summary}")?;
            writeln!(out, "Record  : {record}")?;
        }
        CommandResult::Ack { acknowledged } => {
            writeln!(out, "{} {acknowledged}", "✓".green())?;
        }
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Status => "status",
        Command::Icd => "icd",
        Command::Config => "config",
        Command::Name { .. } => "name",
        Command::Action { .. } => "action",
        Command::Reboot => "reboot",
        Command::FactoryReset => "factory-reset",
        Command::EraseNvram => "erase-nvram",
        Command::FormatFs => "format-fs",
    }
}
