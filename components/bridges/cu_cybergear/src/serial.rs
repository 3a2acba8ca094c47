//! Serial transport for the AT adapter.

use crate::config::BridgeConfig;
use crate::error::SessionResult;
use crate::session::DeviceSession;
use log::info;
use serialport::SerialPort;

/// Open the adapter's port with the configured rate and read timeout.
pub fn open_port(config: &BridgeConfig) -> SessionResult<Box<dyn SerialPort>> {
    let port = serialport::new(&config.device, config.baud_rate)
        .timeout(config.timeout())
        .open()?;
    info!(
        "opened {} at {} baud, timeout {} ms",
        config.device, config.baud_rate, config.timeout_ms
    );
    Ok(port)
}

impl DeviceSession<Box<dyn SerialPort>> {
    /// Open the configured port and switch the adapter into AT mode.
    pub fn open(config: &BridgeConfig) -> SessionResult<Self> {
        let port = open_port(config)?;
        let mut session = DeviceSession::new(port, config.host_id);
        session.enter_at_mode()?;
        Ok(session)
    }
}
