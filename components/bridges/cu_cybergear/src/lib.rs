//! Host-side bridge to Xiaomi CyberGear motors on an AT serial-to-CAN adapter.
//!
//! Frames are built and parsed by `cu-cybergear-lib`; this crate owns the
//! port, the request/reply pairing and the link configuration.
//!
//! ```no_run
//! use cu_cybergear::{BridgeConfig, DeviceSession};
//! use cu_cybergear_lib::RunMode;
//!
//! let config = BridgeConfig::load("bridge.json".as_ref())?;
//! let mut motor = DeviceSession::open(&config)?;
//! let id = motor.search_id()?;
//! motor.set_run_mode(id, RunMode::Speed)?;
//! motor.enable(id)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod messages;
pub mod serial;
pub mod session;

pub use config::BridgeConfig;
pub use error::{SessionError, SessionResult};
pub use messages::Reply;
pub use serial::open_port;
pub use session::DeviceSession;
