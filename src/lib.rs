//! Rust library for discovering and controlling Daikin Wifi air conditioners
//!
//! Units with a Daikin Wifi adapter (e.g. BRP072A42) answer a UDP beacon on
//! port 30050 and expose an HTTP API that speaks single-line
//! `key=value,...` records. This library provides:
//!
//! - Discovery by concurrent UDP broadcast on every local IPv4 interface
//! - Typed control settings (power, mode, fan speed, louvres, set points)
//! - Sensor readings (indoor/outdoor temperature, humidity)
//! - Fetching and pushing settings over the HTTP control protocol
//!
//! # Quick Start
//!
//! ```no_run
//! use daikin_net::{DeviceClient, Mode, NetworkScanner, Power, ScannerConfig, Temperature};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Broadcast on every qualifying interface and collect replies
//!     let mut scanner = NetworkScanner::new(ScannerConfig::default())?;
//!     scanner.discover().await?;
//!
//!     let client = DeviceClient::new()?;
//!     for device in scanner.devices_mut().values_mut() {
//!         // One unit failing does not stop the others
//!         if let Err(e) = client.refresh(device).await {
//!             eprintln!("{}: {}", device.address, e);
//!             continue;
//!         }
//!         println!("{}", device);
//!
//!         if let Some(control) = device.control.as_mut() {
//!             control.power = Power::On;
//!             control.mode = Mode::Heat;
//!             control.temperature = Temperature(21.5);
//!         }
//!         client.push_control_info(device).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Direct Connection
//!
//! If you know the IP address of a unit, skip discovery:
//!
//! ```no_run
//! use daikin_net::{DeviceClient, NetworkScanner, ScannerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScannerConfig::default().with_address("192.168.1.50");
//!     let mut scanner = NetworkScanner::new(config)?;
//!     scanner.discover().await?; // no-op, the address is already registered
//!
//!     let client = DeviceClient::new()?;
//!     for device in scanner.devices_mut().values_mut() {
//!         client.fetch_sensor_info(device).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Discovery**: interface enumeration, broadcast arithmetic and UDP pollers
//! - **Client**: HTTP requests against the unit's fixed paths
//! - **Device**: control/sensor groups and their field mapping
//! - **Protocol**: response framing and path constants
//! - **Types**: wire codecs for every parameter

mod client;
mod config;
mod device;
mod discovery;
mod error;
mod interface;
pub mod protocol;
mod types;

// Public exports
pub use client::DeviceClient;
pub use config::{ClientConfig, ScannerConfig, DEFAULT_DISCOVERY_PORT, DEFAULT_LOCAL_PORT};
pub use device::{BasicInfo, ControlInfo, Device, SensorInfo};
pub use discovery::{NetworkScanner, DISCOVERY_PAYLOAD};
pub use error::{DaikinError, Result};
pub use interface::{broadcast_address, broadcast_addresses, local_interfaces, Interface, LinkFlags};
pub use types::{Fan, FanDir, Humidity, Mode, Name, Parameter, Power, Temperature};
