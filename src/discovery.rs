use crate::config::ScannerConfig;
use crate::device::Device;
use crate::error::Result;
use crate::interface::{broadcast_addresses, local_interfaces};
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Beacon payload units answer to
pub const DISCOVERY_PAYLOAD: &[u8] = b"DAIKIN_UDP/common/basic_info";

const RECV_BUFFER_SIZE: usize = 2048;

/// Discovers Daikin units on the local networks
///
/// The scanner keeps a registry of devices keyed by address. Entries are
/// added by [`discover`](Self::discover) or seeded from
/// [`ScannerConfig::address`] and are never removed.
///
/// # Example
///
/// ```no_run
/// use daikin_net::{DeviceClient, NetworkScanner, ScannerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut scanner = NetworkScanner::new(ScannerConfig::default())?;
///     scanner.discover().await?;
///
///     let client = DeviceClient::new()?;
///     for device in scanner.devices_mut().values_mut() {
///         if let Err(e) = client.refresh(device).await {
///             eprintln!("{}: {}", device.address, e);
///             continue;
///         }
///         println!("{}", device);
///     }
///     Ok(())
/// }
/// ```
pub struct NetworkScanner {
    config: ScannerConfig,
    devices: BTreeMap<String, Device>,
}

impl NetworkScanner {
    /// Create a scanner from a validated config.
    ///
    /// A configured address is added to the registry straight away and
    /// turns discovery off.
    pub fn new(mut config: ScannerConfig) -> Result<Self> {
        config.validate()?;

        let mut devices = BTreeMap::new();
        if let Some(address) = &config.address {
            let device = Device {
                token: config.token.clone(),
                ..Device::new(address.clone())
            };
            devices.insert(address.clone(), device);
            config.poll_count = 0;
        }

        Ok(Self { config, devices })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Devices found so far, keyed by address
    pub fn devices(&self) -> &BTreeMap<String, Device> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut BTreeMap<String, Device> {
        &mut self.devices
    }

    /// Take the registry out of the scanner
    pub fn into_devices(self) -> BTreeMap<String, Device> {
        self.devices
    }

    /// Add a device unless its address is already known.
    ///
    /// Returns `true` if the device was new.
    pub fn register(&mut self, device: Device) -> bool {
        if self.devices.contains_key(&device.address) {
            return false;
        }
        self.devices.insert(device.address.clone(), device);
        true
    }

    /// Run one discovery cycle over every qualifying interface
    ///
    /// Does nothing when `poll_count` is zero.
    pub async fn discover(&mut self) -> Result<()> {
        if self.config.poll_count < 1 {
            tracing::debug!("Polling disabled, skipping discovery");
            return Ok(());
        }

        tracing::info!(
            "Starting discovery on {}, {} polls",
            self.config.interface.as_deref().unwrap_or("all interfaces"),
            self.config.poll_count
        );
        let interfaces = local_interfaces();
        let broadcasts = broadcast_addresses(&interfaces, self.config.interface.as_deref())?;
        self.discover_on(&broadcasts).await
    }

    /// Run one discovery cycle against explicit broadcast addresses
    ///
    /// Binds the scan socket, runs one poller per address and returns
    /// once every poller has finished.
    pub async fn discover_on(&mut self, broadcasts: &[Ipv4Addr]) -> Result<()> {
        if self.config.poll_count < 1 || broadcasts.is_empty() {
            return Ok(());
        }

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, self.config.local_port)).await?;
        socket.set_broadcast(true)?;
        let socket = Arc::new(socket);

        let (found_tx, mut found_rx) = mpsc::unbounded_channel();
        let handles: Vec<_> = broadcasts
            .iter()
            .map(|&broadcast| {
                let poller = Poller {
                    socket: socket.clone(),
                    target: SocketAddrV4::new(broadcast, self.config.discovery_port),
                    count: self.config.poll_count,
                    interval: self.config.poll_interval,
                    found: found_tx.clone(),
                };
                tokio::spawn(poller.run())
            })
            .collect();
        drop(found_tx);

        // The channel closes once every poller has dropped its sender
        while let Some(ip) = found_rx.recv().await {
            let address = ip.to_string();
            if self.register(Device::new(address.clone())) {
                tracing::info!("Found device at {}", address);
            }
        }

        for result in join_all(handles).await {
            if let Err(e) = result {
                tracing::error!("Poller failed: {}", e);
            }
        }

        Ok(())
    }
}

/// Sends beacons to one broadcast address and reports who answers
struct Poller {
    socket: Arc<UdpSocket>,
    target: SocketAddrV4,
    count: u32,
    interval: Duration,
    found: mpsc::UnboundedSender<Ipv4Addr>,
}

impl Poller {
    async fn run(self) {
        tracing::info!("Start polling to: {}", self.target);

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        for _ in 0..self.count {
            if let Err(e) = self.socket.send_to(DISCOVERY_PAYLOAD, self.target).await {
                tracing::error!("write to {}: {}", self.target, e);
                continue;
            }

            // Each read gets its own deadline; expiry ends this round
            loop {
                let read = timeout(self.interval, self.socket.recv_from(&mut buf)).await;
                let (len, from) = match read {
                    Err(_) => break,
                    Ok(Err(e)) => {
                        tracing::error!("read err: {}", e);
                        continue;
                    }
                    Ok(Ok(received)) => received,
                };

                tracing::debug!(
                    "{} bytes from {}: {}",
                    len,
                    from,
                    String::from_utf8_lossy(&buf[..len])
                );

                match from {
                    SocketAddr::V4(from) => {
                        // Only fails once the scanner stopped listening
                        let _ = self.found.send(*from.ip());
                    }
                    SocketAddr::V6(from) => {
                        tracing::debug!("Ignoring reply from non-v4 address {}", from);
                    }
                }
            }
        }
    }
}
