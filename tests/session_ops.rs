use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;

use pfx::{
    Action, Configuration, DeviceSession, FakeTransport, FrameCodec, FrameError, LutAddress,
    ProtocolError, StatusCode, Transport, TransportError, fake_transport,
};

fn open_session() -> DeviceSession {
    let mut session = DeviceSession::new();
    session
        .open(Box::new(FakeTransport::canned()))
        .expect("canned fake should open");
    session
}

#[test]
fn open_reads_status_and_caches_identity() {
    let mut session = DeviceSession::new();
    let report = session
        .open(Box::new(FakeTransport::canned()))
        .expect("canned fake should open");

    assert!(session.is_open());
    assert_eq!(StatusCode::Normal, report.status);
    assert_eq!("PFx Brick 16 MB", report.identity.product_desc);
    assert_eq!("01234567", report.identity.serial_number);
    assert_eq!(
        Some("PFx Brick 16 MB"),
        session.identity().map(|identity| identity.product_desc.as_str())
    );
}

#[test]
fn open_failure_releases_the_transport_and_stays_closed() {
    // Short status response: the open parse fails.
    let transport = fake_transport(vec![vec![0x01, 0x00]]);

    let mut session = DeviceSession::new();
    let error = session.open(transport).expect_err("short status should fail");

    assert_matches!(
        error,
        ProtocolError::Frame(frame) if matches!(*frame, FrameError::ResponseTooShort { .. })
    );
    assert!(!session.is_open());
    assert_eq!(None, session.identity());
}

#[rstest]
#[case::get_status(|session: &mut DeviceSession| session.get_status().map(|_| ()))]
#[case::get_config(|session: &mut DeviceSession| session.get_config().map(|_| ()))]
#[case::get_name(|session: &mut DeviceSession| session.get_name().map(|_| ()))]
#[case::set_name(|session: &mut DeviceSession| session.set_name("Bricky"))]
#[case::reboot(|session: &mut DeviceSession| session.reboot())]
fn closed_session_rejects_operations(
    #[case] operation: fn(&mut DeviceSession) -> Result<(), ProtocolError>,
) {
    let mut session = DeviceSession::new();
    let error = operation(&mut session).expect_err("closed session should reject the operation");
    assert_matches!(error, ProtocolError::SessionClosed);
}

#[test]
fn operations_after_close_fail_without_io() {
    let mut session = open_session();
    session.close();

    // The transport was released on close; nothing is left to write to.
    assert!(!session.is_open());
    assert_matches!(session.get_status(), Err(ProtocolError::SessionClosed));
    assert_matches!(session.set_name("Bricky"), Err(ProtocolError::SessionClosed));
}

#[test]
fn configuration_round_trips_through_the_session() {
    let mut session = open_session();

    let mut config = session.get_config().expect("canned config should parse");
    assert_eq!("1.51", config.firmware_version.to_string());
    assert_eq!("3.36", config.icd_version.to_string());

    config.default_volume = 0x80;
    config.motors[0].invert = true;
    session
        .set_config(&config)
        .expect("set_config should be acknowledged");
    assert_eq!(Some(&config), session.cached_config());
}

#[test]
fn name_operations_update_the_cache() {
    let mut session = open_session();

    let name = session.get_name().expect("canned name should parse");
    assert_eq!("My PFx Brick", name);

    session
        .set_name("Shunting Brick")
        .expect("set_name should be acknowledged");
    assert_eq!(Some("Shunting Brick"), session.cached_name());
}

#[test]
fn oversized_name_fails_before_any_exchange() {
    let mut session = open_session();

    let error = session
        .set_name("a device name well beyond the wire field")
        .expect_err("oversized name should fail");
    assert_matches!(
        error,
        ProtocolError::Frame(frame) if matches!(*frame, FrameError::NameTooLong { .. })
    );
}

#[test]
fn action_read_returns_the_empty_slot() {
    let mut session = open_session();
    let address = LutAddress::new(0x0D, 2).expect("address should be in range");

    let action = session.get_action(address).expect("canned slot should parse");
    assert!(action.is_no_action());
}

#[test]
fn action_write_sends_address_and_record() {
    let mut session = open_session();
    let address = LutAddress::new(0x01, 0).expect("address should be in range");
    let action = Action::builder().soundfx_id(0x04).sound_file_id(0x02).build();

    session
        .set_action(address, &action)
        .expect("set_action should be acknowledged");
}

#[test]
fn reboot_is_write_only_and_closes_the_session() {
    let mut session = open_session();
    session.reboot().expect("reboot write should succeed");
    assert!(!session.is_open());

    // A second reboot fails with no I/O.
    assert_matches!(session.reboot(), Err(ProtocolError::SessionClosed));
}

#[test]
fn factory_reset_clears_cached_state() {
    let mut session = open_session();
    session.get_config().expect("canned config should parse");
    session.get_name().expect("canned name should parse");

    session
        .factory_reset()
        .expect("factory reset should be acknowledged");
    assert_eq!(None, session.cached_config());
    assert_eq!(None, session.cached_name());
    assert!(session.is_open());
}

#[test]
fn erase_nvram_is_acknowledged() {
    let mut session = open_session();
    session
        .erase_nvram()
        .expect("erase should be acknowledged");
    assert!(session.is_open());
}

#[test]
fn format_filesystem_is_acknowledged() {
    let mut session = open_session();
    session
        .format_filesystem()
        .expect("format should be acknowledged");
    assert!(session.is_open());
}

#[test]
fn write_serial_number_is_acknowledged() {
    let mut session = open_session();
    session
        .write_serial_number(0x0123_4567)
        .expect("serial write should be acknowledged");
    assert!(session.is_open());
}

#[test]
fn admin_requests_put_the_magic_payloads_on_the_wire() {
    let mut fake = FakeTransport::canned();
    fake.write_frame(&FrameCodec::format_fs_request())
        .expect("fake accepts every write");
    fake.write_frame(&FrameCodec::write_serial_number_request(0x0123_4567))
        .expect("fake accepts every write");

    assert_eq!(vec![0x47, 0xEA, 0x5E, 0x88], fake.writes()[0]);
    assert_eq!(
        vec![0x38, 0x5E, 0x45, 0x5E, 0x41, 0xA1, 0x10, 0x70, 0x01, 0x23, 0x45, 0x67],
        fake.writes()[1]
    );
}

#[test]
fn icd_revision_renders_major_minor() {
    let mut session = open_session();
    let revision = session
        .get_icd_revision()
        .expect("canned revision should parse");
    assert_eq!("3.36", revision);
}

#[test]
fn scripted_echo_mismatch_is_malformed() {
    // A scripted status for open, then one response with the wrong echo byte.
    let transport = FakeTransport::builder()
        .responses(vec![canned_status(), vec![0x55, 0x00, 0x00]])
        .simulate(false)
        .build();

    let mut session = DeviceSession::new();
    session
        .open(Box::new(transport))
        .expect("scripted status should open");
    let error = session
        .get_name()
        .expect_err("wrong echo byte should fail");
    assert_matches!(
        error,
        ProtocolError::Frame(frame) if matches!(*frame, FrameError::EchoMismatch { actual: 0x55, .. })
    );
}

#[test]
fn timeout_surfaces_as_transport_error() {
    let transport = FakeTransport::builder()
        .responses(vec![canned_status()])
        .simulate(false)
        .build();

    let mut session = DeviceSession::new().with_read_timeout(std::time::Duration::from_millis(5));
    session
        .open(Box::new(transport))
        .expect("scripted status should open");

    let error = session.get_config().expect_err("exhausted script should time out");
    assert_matches!(
        error,
        ProtocolError::Transport(transport) if matches!(*transport, TransportError::Timeout { .. })
    );
}

#[test]
fn default_configuration_encodes_factory_values() {
    let config = Configuration::default();
    let record = config.to_record();
    assert_eq!(0xC0, record[12]);
    assert_eq!(0xA0, record[13]);
}

fn canned_status() -> Vec<u8> {
    let mut raw = vec![0u8; 41];
    raw[0] = 0x01;
    raw[13..25].copy_from_slice(b"PFx Brick 16");
    raw
}
