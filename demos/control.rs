//! Query and control Daikin units from the command line.
//!
//! ```text
//! cargo run --example control -- --interface eth0
//! cargo run --example control -- --address 192.168.1.50 --on --heat --temp 21.5
//! ```

use clap::Parser;
use daikin_net::{
    DaikinError, Device, DeviceClient, Fan, FanDir, Mode, NetworkScanner, Power, ScannerConfig,
    Temperature,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Query and control Daikin air conditioners")]
struct Args {
    /// Interface to scan on
    #[arg(long, env = "DAIKIN_INTERFACE")]
    interface: Option<String>,

    /// Use device at specific address
    #[arg(long, env = "DAIKIN_ADDRESS")]
    address: Option<String>,

    /// Bearer token for the device at --address
    #[arg(long, env = "DAIKIN_TOKEN", requires = "address")]
    token: Option<String>,

    /// Number of discovery beacons per interface
    #[arg(long, default_value_t = 1)]
    poll_count: u32,

    /// Seconds to wait for replies after each beacon
    #[arg(long, default_value_t = 1)]
    poll_interval: u64,

    /// Turn unit on
    #[arg(long, conflicts_with = "off")]
    on: bool,

    /// Turn unit off
    #[arg(long)]
    off: bool,

    /// Set to heating mode
    #[arg(long, conflicts_with_all = ["cool", "fan"])]
    heat: bool,

    /// Set to cooling mode
    #[arg(long, conflicts_with = "fan")]
    cool: bool,

    /// Set to fan mode
    #[arg(long)]
    fan: bool,

    /// Fan speed (A, B, 1, 2, 3, 4, 5)
    #[arg(long, value_parser = parse_fan)]
    speed: Option<Fan>,

    /// Sweep louvres vertically
    #[arg(long)]
    vertical: bool,

    /// Sweep louvres horizontally
    #[arg(long)]
    horizontal: bool,

    /// Temperature to set to
    #[arg(long, default_value_t = 22.0)]
    temp: f64,
}

fn parse_fan(s: &str) -> Result<Fan, String> {
    match s {
        "A" | "a" => Ok(Fan::Auto),
        "B" | "b" => Ok(Fan::Silent),
        other => Fan::from_label(other).ok_or_else(|| format!("unsupported fan rate: {}", other)),
    }
}

impl Args {
    fn scanner_config(&self) -> ScannerConfig {
        let mut config = ScannerConfig::default()
            .with_polling(self.poll_count, Duration::from_secs(self.poll_interval));
        if let Some(interface) = &self.interface {
            config = config.with_interface(interface.clone());
        }
        match (&self.address, &self.token) {
            (Some(address), Some(token)) => {
                config.with_address_token(address.clone(), token.clone())
            }
            (Some(address), None) => config.with_address(address.clone()),
            _ => config,
        }
    }

    fn changes_power(&self) -> bool {
        self.on || self.off
    }

    fn apply(&self, device: &mut Device) {
        let Some(control) = device.control.as_mut() else {
            return;
        };

        control.power = if self.on { Power::On } else { Power::Off };
        if self.heat {
            control.mode = Mode::Heat;
        }
        if self.cool {
            control.mode = Mode::Cool;
        }
        if self.fan {
            control.mode = Mode::Fan;
        }
        if let Some(speed) = self.speed {
            control.fan = speed;
        }
        control.fan_dir = FanDir::from_sweep(self.vertical, self.horizontal);
        if self.temp > 0.0 {
            control.temperature = Temperature(self.temp);
        }
    }
}

async fn update(
    client: &DeviceClient,
    args: &Args,
    device: &mut Device,
) -> Result<(), DaikinError> {
    args.apply(device);
    println!("Setting to new values:\n{}\n", device);

    client.push_control_info(device).await?;
    client.refresh(device).await?;
    println!("New values {}:\n{}\n", device.address, device);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut scanner = NetworkScanner::new(args.scanner_config())?;
    scanner.discover().await?;

    let client = DeviceClient::new()?;

    println!("Devices:");
    for (address, device) in scanner.devices_mut() {
        if let Err(e) = client.fetch_basic_info(device).await {
            tracing::warn!("{}: basic info unavailable: {}", address, e);
        }
        if let Err(e) = client.refresh(device).await {
            tracing::error!("{}: {}", address, e);
            continue;
        }
        println!("Current {}:\n{}\n", address, device);

        if args.changes_power() {
            if let Err(e) = update(&client, &args, device).await {
                tracing::error!("Error updating {}: {}", address, e);
            }
        }
    }

    Ok(())
}
