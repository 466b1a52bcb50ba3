use crate::error::{DaikinError, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// UDP port the scanner listens on
pub const DEFAULT_LOCAL_PORT: u16 = 30000;

/// UDP port units listen on for the discovery beacon
pub const DEFAULT_DISCOVERY_PORT: u16 = 30050;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for a [`NetworkScanner`](crate::NetworkScanner)
///
/// All fields have defaults, so a config can be deserialized from a
/// partial document:
///
/// | field | default |
/// |---|---|
/// | `interface` | all qualifying interfaces |
/// | `address` | none (discover) |
/// | `token` | none |
/// | `poll_interval` | 1 s |
/// | `poll_count` | 1 |
/// | `local_port` | 30000 |
/// | `discovery_port` | 30050 |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Only scan on this interface
    pub interface: Option<String>,

    /// Use the unit at this IPv4 address instead of discovering.
    ///
    /// Setting an address disables polling.
    pub address: Option<String>,

    /// Bearer token for the unit at `address`
    pub token: Option<String>,

    /// How long to wait for replies after each beacon
    pub poll_interval: Duration,

    /// Number of beacons sent per broadcast address
    pub poll_count: u32,

    /// Local UDP port to bind; 0 picks an ephemeral port
    pub local_port: u16,

    /// Destination UDP port of the beacon
    pub discovery_port: u16,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interface: None,
            address: None,
            token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_count: 1,
            local_port: DEFAULT_LOCAL_PORT,
            discovery_port: DEFAULT_DISCOVERY_PORT,
        }
    }
}

impl ScannerConfig {
    /// Restrict scanning to one interface
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Skip discovery and use the unit at `address`
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Skip discovery and use the unit at `address` with a bearer token
    pub fn with_address_token(
        mut self,
        address: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.token = Some(token.into());
        self
    }

    /// Set the poll count and interval
    pub fn with_polling(mut self, count: u32, interval: Duration) -> Self {
        self.poll_count = count;
        self.poll_interval = interval;
        self
    }

    /// Check the settings for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(interface) = &self.interface {
            if interface.trim().is_empty() {
                return Err(DaikinError::InvalidConfig(
                    "interface name is empty".to_string(),
                ));
            }
        }

        if let Some(address) = &self.address {
            address.parse::<Ipv4Addr>().map_err(|_| {
                DaikinError::InvalidConfig(format!("address {:?} is not an IPv4 address", address))
            })?;
        } else if self.token.is_some() {
            return Err(DaikinError::InvalidConfig(
                "token given without an address".to_string(),
            ));
        }

        if self.address.is_none() && self.poll_count > 0 && self.poll_interval.is_zero() {
            return Err(DaikinError::InvalidConfig(
                "poll_interval must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Settings for a [`DeviceClient`](crate::DeviceClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScannerConfig::default();
        assert_eq!(config.poll_count, 1);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.local_port, 30000);
        assert_eq!(config.discovery_port, 30050);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_non_ipv4_address() {
        let config = ScannerConfig::default().with_address("fe80::1");
        assert!(matches!(config.validate(), Err(DaikinError::InvalidConfig(_))));

        let config = ScannerConfig::default().with_address("aircon.local");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_token_without_address() {
        let config = ScannerConfig {
            token: Some("secret".to_string()),
            ..ScannerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ScannerConfig::default().with_address_token("192.168.1.7", "secret");
        config.validate().unwrap();
    }

    #[test]
    fn rejects_zero_interval_when_polling() {
        let config = ScannerConfig::default().with_polling(3, Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ScannerConfig::default().with_polling(0, Duration::ZERO);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_blank_interface() {
        let config = ScannerConfig::default().with_interface(" ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_partial_document() {
        let config: ScannerConfig =
            serde_json::from_str(r#"{"interface":"eth0","poll_count":3}"#).unwrap();
        assert_eq!(config.interface.as_deref(), Some("eth0"));
        assert_eq!(config.poll_count, 3);
        assert_eq!(config.discovery_port, DEFAULT_DISCOVERY_PORT);

        let client: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(client, ClientConfig::default());
    }
}
