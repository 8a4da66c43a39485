//! Dev server detection.
//!
//! Probes a port range for a listening hot-reload server and builds the
//! URL assets are served from while it runs.

pub mod probe;
pub mod url;

pub use probe::{active_dev_server_port, Connector, DevServerProbe, ProbeResult, TcpConnector};
pub use url::{dev_server_url, resolve_dev_server_url};
