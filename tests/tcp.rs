use iotlink::config::{Config, Credentials};
use iotlink::indicator::{IndicatorDriver, Led};
use iotlink::lifecycle::{Connection, State};
use iotlink::network::application::mqtt::MqttSession;
use iotlink::network::error::Error;
use iotlink::network::tcp::{TcpConnector, TcpSocket};
use iotlink::network::{Close, Connect, NetworkLink, Read, ReadInterest, Write};
use iotlink::sensor::{Reading, SensorKind, Sensors};
use std::io::{Read as StdRead, Write as StdWrite};
use std::net::{SocketAddr, TcpListener};
use std::thread;

fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    (listener, address)
}

#[test]
fn test_echo() {
    let (listener, address) = listener();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).unwrap();
        stream.write_all(&buf).unwrap();
    });

    let mut socket = TcpConnector::new(1000, 1000).connect(&address).unwrap();
    assert_eq!(socket.write(b"hello").unwrap(), 5);
    socket.flush().unwrap();

    let mut buf = [0u8; 16];
    let mut got = 0;
    while got < 5 {
        got += socket.read(&mut buf[got..]).unwrap();
    }
    assert_eq!(&buf[..5], b"hello");

    server.join().unwrap();
    // Peer is gone: the next read sees end of stream.
    assert_eq!(socket.read(&mut buf).unwrap(), 0);
    socket.close().unwrap();
}

#[test]
fn test_read_timeout() {
    let (listener, address) = listener();
    let mut socket = TcpConnector::new(1000, 50).connect(&address).unwrap();
    let (_peer, _) = listener.accept().unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(socket.read(&mut buf), Err(Error::Timeout));
}

#[test]
fn test_connect_refused() {
    let (listener, address) = listener();
    drop(listener);
    assert!(TcpConnector::new(500, 500).connect(&address).is_err());
}

#[test]
fn test_invalid_address() {
    assert_eq!(
        TcpConnector::new(500, 500).connect("not an address").err(),
        Some(Error::InvalidAddress)
    );
}

struct Board {
    connector: TcpConnector,
    watched: Option<SocketAddr>,
}

impl Connect for Board {
    type Connection = TcpSocket;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<TcpSocket, Error> {
        self.connector.connect(remote)
    }
}

impl ReadInterest for Board {
    fn register(&mut self, socket: &TcpSocket) {
        self.watched = socket.stream().peer_addr().ok();
    }

    fn unregister(&mut self, _socket: &TcpSocket) {
        self.watched = None;
    }
}

impl NetworkLink for Board {
    fn is_reachable(&self) -> bool {
        true
    }
    fn reconnect(&mut self) {}
    fn apply_credentials(&mut self, _credentials: &Credentials) {}
}

impl Sensors for Board {
    fn read(&mut self, kind: SensorKind) -> Option<Reading> {
        match kind {
            SensorKind::Temperature => Some(Reading::Scalar(22.0)),
            _ => None,
        }
    }
    fn unix_time(&self) -> u64 {
        0
    }
}

impl IndicatorDriver for Board {
    fn set(&mut self, _led: Led, _on: bool) {}
}

#[test]
fn test_login_against_local_broker() {
    let (listener, address) = listener();
    let broker = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        // CONNECT with a one-byte remaining length.
        let mut head = [0u8; 2];
        stream.read_exact(&mut head).unwrap();
        assert_eq!(head[0], 0x10);
        let mut body = vec![0u8; head[1] as usize];
        stream.read_exact(&mut body).unwrap();
        assert_eq!(&body[..6], b"\x00\x04MQTT");

        stream.write_all(&[0x20, 0x02, 0x00, 0x00]).unwrap();

        // SUBSCRIBE, then the first telemetry PUBLISH.
        let mut kind = [0u8; 2];
        stream.read_exact(&mut kind).unwrap();
        assert_eq!(kind[0], 0x82);
        let mut rest = vec![0u8; kind[1] as usize];
        stream.read_exact(&mut rest).unwrap();
        stream.read_exact(&mut kind).unwrap();
        assert_eq!(kind[0], 0x30);
    });

    let mut config = Config::default();
    config.remote = heapless::String::try_from(address.as_str()).unwrap();
    let board = Board {
        connector: TcpConnector::new(config.connect_timeout_ms, config.io_timeout_ms),
        watched: None,
    };
    let mut device: Connection<Board, MqttSession> = Connection::new(config, board);

    device.start(0);
    assert_eq!(device.state(), State::SessionHandshake);
    assert_eq!(device.platform().watched.map(|a| a.to_string()), Some(address));
    assert!(device.socket().is_some());

    // The CONNACK may arrive in pieces.
    for now_ms in 10..20 {
        if device.state() != State::SessionHandshake {
            break;
        }
        device.on_readable(now_ms);
    }
    assert_eq!(device.state(), State::Active);

    broker.join().unwrap();
}
