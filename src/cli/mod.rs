pub(crate) mod command;

pub use self::command::{
    ActionSubcommand, Args, Command, NameCommand, OutputFormat, ResponseScript, TransportSelection,
};
