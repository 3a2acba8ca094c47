//! Bridge link configuration.
//!
//! Stored as JSON so a rig can keep one file per adapter:
//!
//! ```json
//! { "device": "/dev/ttyUSB0", "baud_rate": 921600, "timeout_ms": 1000, "host_id": 253 }
//! ```
//!
//! Missing keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";
/// The AT adapter only runs at this rate.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;
/// Host id used on the CAN side; the motor answers to it.
pub const DEFAULT_HOST_ID: u8 = 0xFD;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub device: String,
    pub baud_rate: u32,
    /// Read timeout; a motor that stays silent this long gave no reply.
    pub timeout_ms: u64,
    pub host_id: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            host_id: DEFAULT_HOST_ID,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::other(format!("bad bridge config JSON: {e}")))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
