pub(crate) mod fake;
pub(crate) mod hid;
pub(crate) mod session;
pub(crate) mod transport;

pub use self::fake::FakeTransport;
pub use self::hid::HidTransport;
pub use self::session::DeviceSession;
pub use self::transport::{DEFAULT_READ_TIMEOUT, Transport, TransportError};
