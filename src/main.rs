use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use pfx::{Args, OutputFormat, run, transport_for};

fn main() -> ExitCode {
    let args = Args::parse();
    let mut stdout = std::io::stdout();

    let run_result = (|| {
        let output_format = args.output_format().unwrap_or(if stdout.is_terminal() {
            OutputFormat::Pretty
        } else {
            OutputFormat::Json
        });
        let (command, selection) = args.into_command_and_transport();
        let transport = transport_for(selection)?;
        run(command, &mut stdout, transport, output_format)
    })();

    match run_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
