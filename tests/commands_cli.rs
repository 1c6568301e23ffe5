use assert_matches::assert_matches;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::Value;

fn run_with_argv<const N: usize>(argv: [&str; N]) -> anyhow::Result<String> {
    let args = pfx::Args::try_parse_from(argv)?;
    let output_format = args.output_format().unwrap_or(pfx::OutputFormat::Json);
    let (command, selection) = args.into_command_and_transport();
    let transport = pfx::transport_for(selection)?;

    let mut output = Vec::new();
    pfx::run(command, &mut output, transport, output_format)?;
    Ok(String::from_utf8(output)?)
}

fn run_json<const N: usize>(argv: [&str; N]) -> anyhow::Result<Value> {
    let stdout = run_with_argv(argv)?;
    Ok(serde_json::from_str(&stdout)?)
}

#[test]
fn status_command_reports_the_canned_identity() -> anyhow::Result<()> {
    let value = run_json(["pfx", "--fake", "status"])?;

    assert_eq!("status", value["command"]);
    assert_eq!("Normal", value["status"]);
    assert_eq!("PFx Brick 16 MB", value["identity"]["product_desc"]);
    assert_eq!("01234567", value["identity"]["serial_number"]);
    Ok(())
}

#[test]
fn icd_command_prints_the_revision() -> anyhow::Result<()> {
    let value = run_json(["pfx", "--fake", "icd"])?;

    assert_eq!("icd", value["command"]);
    assert_eq!("3.36", value["revision"]);
    Ok(())
}

#[test]
fn config_command_renders_version_words() -> anyhow::Result<()> {
    let value = run_json(["pfx", "--fake", "config"])?;

    assert_eq!("1.51", value["firmware_version"]);
    assert_eq!("3.36", value["icd_version"]);
    Ok(())
}

#[test]
fn name_set_round_trips_through_the_fake() -> anyhow::Result<()> {
    let value = run_json(["pfx", "--fake", "name", "set", "Shunting Brick"])?;

    assert_eq!("name", value["command"]);
    assert_eq!("Shunting Brick", value["name"]);
    Ok(())
}

#[test]
fn action_get_prints_an_empty_slot() -> anyhow::Result<()> {
    let value = run_json(["pfx", "--fake", "action", "get", "0x0D", "2"])?;

    assert_eq!("action", value["command"]);
    assert_eq!("No action", value["summary"]);
    assert_eq!(32, value["record"].as_str().map_or(0, str::len));
    Ok(())
}

#[test]
fn action_get_rejects_an_out_of_range_channel() {
    let result = run_with_argv(["pfx", "--fake", "action", "get", "1", "4"]);

    let error = result.expect_err("channel 4 should be out of range");
    assert!(error.to_string().contains("out of range"), "{error}");
    assert_matches!(
        error.downcast_ref::<pfx::ProtocolError>(),
        Some(pfx::ProtocolError::Address(_))
    );
}

#[test]
fn action_set_rejects_a_short_record() {
    let result = run_with_argv(["pfx", "--fake", "action", "set", "1", "0", "0071"]);

    let error = result.expect_err("a 2-byte record should be rejected");
    assert!(error.to_string().contains("16 bytes"), "{error}");
}

#[test]
fn reboot_command_acknowledges() -> anyhow::Result<()> {
    let value = run_json(["pfx", "--fake", "reboot"])?;

    assert_eq!("ack", value["command"]);
    assert_eq!("reboot", value["acknowledged"]);
    Ok(())
}

#[test]
fn pretty_output_renders_status_headings() -> anyhow::Result<()> {
    let stdout = run_with_argv(["pfx", "--fake", "--output", "pretty", "status"])?;

    assert!(stdout.contains("PFx Brick status"), "{stdout}");
    assert!(stdout.contains("Serial"), "{stdout}");
    Ok(())
}
