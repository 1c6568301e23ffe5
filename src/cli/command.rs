use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::FixtureError;

/// Command-line options for the PFx Brick tool.
#[derive(Debug, Parser)]
#[command(name = "pfx", about = "Interact with a PFx Brick over USB.")]
pub struct Args {
    /// Uses the fake fixture transport instead of USB hardware.
    #[arg(long, global = true)]
    fake: bool,
    /// Scripted fake responses as comma-separated hexadecimal frames.
    #[arg(long, global = true, requires = "fake")]
    fake_responses: Option<ResponseScript>,
    /// Opens the brick with this USB serial number.
    #[arg(long, global = true, conflicts_with = "fake")]
    serial: Option<String>,
    /// Output format; defaults to pretty on a terminal, JSON otherwise.
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Args {
    /// Returns the explicit output-format override, if one was given.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
    }

    /// Splits parsed CLI arguments into the command and the transport selection.
    #[must_use]
    pub fn into_command_and_transport(self) -> (Command, TransportSelection) {
        let Args {
            fake,
            fake_responses,
            serial,
            output: _,
            command,
        } = self;

        let selection = if fake {
            TransportSelection::Fake {
                responses: fake_responses.map(Into::into).unwrap_or_default(),
            }
        } else {
            TransportSelection::Usb { serial }
        };

        (command, selection)
    }
}

/// Transport backend selected on the command line.
#[derive(Debug)]
pub enum TransportSelection {
    /// Fake fixture transport, optionally with scripted responses.
    Fake { responses: Vec<Vec<u8>> },
    /// Real USB HID transport, optionally pinned to one serial number.
    Usb { serial: Option<String> },
}

/// Parsed comma-separated hexadecimal response frames.
#[derive(Debug, Clone, derive_more::Into)]
pub struct ResponseScript {
    responses: Vec<Vec<u8>>,
}

impl FromStr for ResponseScript {
    type Err = FixtureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err(FixtureError::EmptyScript);
        }
        let responses = value
            .split(',')
            .map(|frame| {
                let cleaned: String = frame.chars().filter(|c| !c.is_whitespace()).collect();
                Ok(hex::decode(cleaned)?)
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;
        Ok(Self { responses })
    }
}

/// Rendering target for command results.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colourised output.
    Pretty,
    /// One JSON document on stdout.
    Json,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the device status report and identity.
    Status,
    /// Print the ICD revision implemented by the firmware.
    Icd,
    /// Read and print the configuration record.
    Config,
    /// Read or change the device name.
    Name {
        #[command(subcommand)]
        action: NameCommand,
    },
    /// Read, store, or test event action records.
    Action {
        #[command(subcommand)]
        action: ActionSubcommand,
    },
    /// Reboot the brick.
    Reboot,
    /// Restore factory default configuration.
    FactoryReset,
    /// Erase non-volatile settings memory.
    EraseNvram,
    /// Format the audio file system.
    FormatFs,
}

/// `name` subcommands.
#[derive(Debug, Subcommand)]
pub enum NameCommand {
    /// Print the device name.
    Get,
    /// Set the device name (up to 24 UTF-8 bytes).
    Set { name: String },
}

/// `action` subcommands.
#[derive(Debug, Subcommand)]
pub enum ActionSubcommand {
    /// Print the action stored for an event/channel pair.
    Get {
        #[arg(value_parser = parse_byte)]
        event: u8,
        #[arg(value_parser = parse_byte)]
        channel: u8,
    },
    /// Store an action record for an event/channel pair.
    Set {
        #[arg(value_parser = parse_byte)]
        event: u8,
        #[arg(value_parser = parse_byte)]
        channel: u8,
        /// The 16 record bytes as a hexadecimal string.
        record: String,
    },
    /// Execute an action record immediately without storing it.
    Test {
        /// The 16 record bytes as a hexadecimal string.
        record: String,
    },
}

/// Parses a byte value, accepting `0x`-prefixed hexadecimal.
fn parse_byte(value: &str) -> Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex_digits) => u8::from_str_radix(hex_digits, 16),
        None => value.parse(),
    };
    parsed.map_err(|error| error.to_string())
}
