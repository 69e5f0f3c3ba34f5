//! Discovery against a fake SSDP responder on the loopback interface
//!
//! The responder answers the M-SEARCH with a mix of Roku, duplicate and
//! unrelated replies, so filtering and deduplication run end to end without
//! real devices on the network.

use std::net::UdpSocket;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use rstest::rstest;
use roku_discovery::{Discovery, DiscoveredDevice};

fn roku_reply(ip: &str, serial: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Cache-Control: max-age=3600\r\n\
         ST: roku:ecp\r\n\
         USN: uuid:roku:ecp:{}\r\n\
         Ext: \r\n\
         Server: Roku/11.5.0 UPnP/1.0 Roku/11.5.0\r\n\
         LOCATION: http://{}:8060/\r\n\
         \r\n",
        serial, ip
    )
}

const SONOS_REPLY: &str = "HTTP/1.1 200 OK\r\n\
    LOCATION: http://192.168.1.100:1400/xml/device_description.xml\r\n\
    ST: urn:schemas-upnp-org:device:ZonePlayer:1\r\n\
    USN: uuid:RINCON_000E58A0123456::urn:schemas-upnp-org:device:ZonePlayer:1\r\n\
    SERVER: Linux UPnP/1.0 Sonos/70.3-88200 (ZPS9)\r\n\
    \r\n";

/// Spawn a responder that answers the first request with `replies` and
/// reports the request text it saw.
fn spawn_responder(replies: Vec<String>) -> (String, mpsc::Receiver<String>) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let addr = socket.local_addr().unwrap().to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut buffer = [0u8; 2048];
        let Ok((size, sender)) = socket.recv_from(&mut buffer) else {
            return;
        };
        let request = String::from_utf8_lossy(&buffer[..size]).to_string();
        for reply in &replies {
            let _ = socket.send_to(reply.as_bytes(), sender);
        }
        let _ = tx.send(request);
    });

    (addr, rx)
}

fn discover(destination: &str, window: Duration) -> Vec<DiscoveredDevice> {
    Discovery::new(window)
        .destination(destination)
        .run()
        .expect("search should start on loopback")
}

#[test]
fn test_sends_roku_search_request() {
    let (addr, requests) = spawn_responder(vec![]);
    discover(&addr, Duration::from_millis(300));

    let request = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
    assert!(request.contains("ST: roku:ecp\r\n"));
    assert!(request.contains("MAN: \"ssdp:discover\"\r\n"));
    assert!(request.contains("MX: 2\r\n"));
}

#[test]
fn test_filters_and_deduplicates() {
    let (addr, _requests) = spawn_responder(vec![
        roku_reply("192.168.1.134", "YN00H5123456"),
        SONOS_REPLY.to_string(),
        roku_reply("192.168.1.134", "YN00H5123456"),
        "garbage".to_string(),
        roku_reply("192.168.1.135", "X00200000001"),
    ]);

    let devices = discover(&addr, Duration::from_millis(500));

    let addresses: Vec<String> = devices.iter().map(|d| d.address.to_string()).collect();
    assert_eq!(addresses, vec!["192.168.1.134", "192.168.1.135"]);
    assert_eq!(devices[0].location, "http://192.168.1.134:8060/");
    assert_eq!(devices[1].usn, "uuid:roku:ecp:X00200000001");
}

#[rstest]
#[case(Duration::from_millis(200))]
#[case(Duration::from_millis(600))]
fn test_search_ends_at_window(#[case] window: Duration) {
    let (addr, _requests) = spawn_responder(vec![]);

    let started = Instant::now();
    let devices = discover(&addr, window);
    let elapsed = started.elapsed();

    assert!(devices.is_empty());
    assert!(elapsed >= window, "returned after {:?}", elapsed);
    assert!(elapsed < window + Duration::from_secs(2), "returned after {:?}", elapsed);
}

#[test]
fn test_iterator_yields_first_device_early() {
    let (addr, _requests) = spawn_responder(vec![roku_reply("10.0.0.5", "P0A070000001")]);

    let started = Instant::now();
    let first = Discovery::new(Duration::from_secs(5))
        .destination(addr)
        .iter()
        .unwrap()
        .next()
        .expect("one device should be found");

    assert_eq!(first.address.to_string(), "10.0.0.5");
    assert!(started.elapsed() < Duration::from_secs(4));
}
