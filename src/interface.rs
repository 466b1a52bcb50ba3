use crate::error::{DaikinError, Result};
use ipnetwork::IpNetwork;
use std::net::Ipv4Addr;
use std::ops::BitOr;

/// Link state flags of a network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkFlags(u8);

impl LinkFlags {
    pub const UP: Self = Self(1);
    pub const BROADCAST: Self = Self(1 << 1);
    pub const MULTICAST: Self = Self(1 << 2);
    pub const LOOPBACK: Self = Self(1 << 3);

    /// Flags an interface must have to take part in discovery
    pub const REQUIRED: Self = Self(Self::UP.0 | Self::BROADCAST.0 | Self::MULTICAST.0);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LinkFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A local network interface and its configured networks
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub flags: LinkFlags,
    pub networks: Vec<IpNetwork>,
}

impl From<&pnet_datalink::NetworkInterface> for Interface {
    fn from(iface: &pnet_datalink::NetworkInterface) -> Self {
        let mut flags = LinkFlags::empty();
        for (set, flag) in [
            (iface.is_up(), LinkFlags::UP),
            (iface.is_broadcast(), LinkFlags::BROADCAST),
            (iface.is_multicast(), LinkFlags::MULTICAST),
            (iface.is_loopback(), LinkFlags::LOOPBACK),
        ] {
            if set {
                flags = flags | flag;
            }
        }
        Self {
            name: iface.name.clone(),
            flags,
            networks: iface.ips.clone(),
        }
    }
}

/// Enumerate the host's network interfaces
pub fn local_interfaces() -> Vec<Interface> {
    pnet_datalink::interfaces().iter().map(Interface::from).collect()
}

/// Highest address of the subnet `ip` belongs to
pub fn broadcast_address(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    let (ip, mask) = (ip.octets(), mask.octets());
    let octets: [u8; 4] = std::array::from_fn(|i| (ip[i] & mask[i]) | (0xff - mask[i]));
    Ipv4Addr::from(octets)
}

/// Broadcast addresses of every qualifying interface.
///
/// Interfaces lacking [`LinkFlags::REQUIRED`] are skipped, as are all but
/// `only` when given. IPv6 networks are skipped. Fails with
/// [`DaikinError::NoInterface`] if `only` names an interface that yields
/// no IPv4 broadcast address.
pub fn broadcast_addresses(interfaces: &[Interface], only: Option<&str>) -> Result<Vec<Ipv4Addr>> {
    let mut broadcasts = Vec::new();

    for iface in interfaces {
        if !iface.flags.contains(LinkFlags::REQUIRED) {
            continue;
        }
        if only.is_some_and(|name| name != iface.name) {
            continue;
        }

        for network in &iface.networks {
            match network {
                IpNetwork::V4(net) => {
                    let broadcast = broadcast_address(net.ip(), net.mask());
                    if !broadcasts.contains(&broadcast) {
                        broadcasts.push(broadcast);
                    }
                }
                IpNetwork::V6(net) => {
                    tracing::debug!("{}: {}: Skipping non-v4 address", iface.name, net.ip());
                }
            }
        }
    }

    if broadcasts.is_empty() {
        if let Some(name) = only {
            return Err(DaikinError::NoInterface(name.to_string()));
        }
        tracing::warn!("No interface with an IPv4 broadcast address");
    }

    tracing::info!("Broadcast addresses: {:?}", broadcasts);
    Ok(broadcasts)
}
