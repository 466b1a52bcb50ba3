// Discovery tests against a fake unit on the loopback interface.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;

use daikin_net::{DaikinError, Device, NetworkScanner, ScannerConfig, DISCOVERY_PAYLOAD};

// ── Helpers ─────────────────────────────────────────────────────────

/// A fake unit that answers every beacon with `replies` datagrams.
async fn spawn_unit(replies: usize) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = [0u8; 256];
        while let Ok((len, from)) = socket.recv_from(&mut buf).await {
            if &buf[..len] != DISCOVERY_PAYLOAD {
                continue;
            }
            for _ in 0..replies {
                let _ = socket
                    .send_to(b"ret=OK,type=aircon,reg=eu,port=30050", from)
                    .await;
            }
        }
    });

    addr
}

fn config_for(unit: SocketAddr, poll_count: u32) -> ScannerConfig {
    ScannerConfig {
        local_port: 0,
        discovery_port: unit.port(),
        ..ScannerConfig::default()
    }
    .with_polling(poll_count, Duration::from_millis(200))
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_duplicate_replies_register_once() {
    let unit = spawn_unit(2).await;
    let mut scanner = NetworkScanner::new(config_for(unit, 2)).unwrap();

    scanner.discover_on(&[Ipv4Addr::LOCALHOST]).await.unwrap();

    let devices = scanner.devices();
    assert_eq!(devices.len(), 1);
    assert!(devices.contains_key("127.0.0.1"));
    assert!(devices["127.0.0.1"].control.is_none());
}

#[tokio::test]
async fn test_concurrent_pollers_share_registry() {
    let unit = spawn_unit(1).await;
    let mut scanner = NetworkScanner::new(config_for(unit, 1)).unwrap();
    scanner.register(Device::new("10.0.0.9"));

    scanner
        .discover_on(&[Ipv4Addr::LOCALHOST, Ipv4Addr::new(127, 0, 0, 1)])
        .await
        .unwrap();

    let addresses: Vec<_> = scanner.devices().keys().cloned().collect();
    assert_eq!(addresses, vec!["10.0.0.9".to_string(), "127.0.0.1".to_string()]);
}

#[tokio::test]
async fn test_silent_network_waits_for_every_round() {
    // Bound but never answers
    let quiet = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut scanner = NetworkScanner::new(config_for(quiet.local_addr().unwrap(), 3)).unwrap();

    let started = Instant::now();
    scanner.discover_on(&[Ipv4Addr::LOCALHOST]).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(600));
    assert!(scanner.devices().is_empty());
}

#[tokio::test]
async fn test_bind_failure_aborts_discovery() {
    let taken = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
    let port = taken.local_addr().unwrap().port();

    let config = ScannerConfig {
        local_port: port,
        ..ScannerConfig::default()
    };
    let mut scanner = NetworkScanner::new(config).unwrap();

    let err = scanner
        .discover_on(&[Ipv4Addr::LOCALHOST])
        .await
        .unwrap_err();

    assert!(matches!(err, DaikinError::Io(_)));
    assert!(scanner.devices().is_empty());
}
