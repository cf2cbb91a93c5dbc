#![allow(dead_code)]

use iotlink::config::Credentials;
use iotlink::indicator::{IndicatorDriver, Led};
use iotlink::network::application::tlv::varint;
use iotlink::network::error::Error;
use iotlink::network::*;
use iotlink::sensor::{Reading, SensorKind, Sensors};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// What the next `read` on the socket returns.
#[derive(Debug, Clone)]
pub enum Inbound {
    Data(Vec<u8>),
    Closed,
    Fail,
}

/// Both ends of the mock socket, shared between the test and the socket.
#[derive(Debug, Default)]
pub struct Wire {
    pub inbound: VecDeque<Inbound>,
    pub outbound: Vec<u8>,
    pub fail_writes: bool,
    pub short_writes: bool,
    pub closed: usize,
}

#[derive(Debug)]
pub struct MockSocket {
    wire: Rc<RefCell<Wire>>,
}

impl Read for MockSocket {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        match wire.inbound.pop_front() {
            Some(Inbound::Data(data)) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                if len < data.len() {
                    wire.inbound.push_front(Inbound::Data(data[len..].to_vec()));
                }
                Ok(len)
            }
            Some(Inbound::Closed) => Ok(0),
            Some(Inbound::Fail) => Err(Error::ReadError),
            None => Err(Error::Timeout),
        }
    }
}

impl Write for MockSocket {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_writes {
            return Err(Error::WriteError);
        }
        if wire.short_writes {
            let half = buf.len() / 2;
            wire.outbound.extend_from_slice(&buf[..half]);
            return Ok(half);
        }
        wire.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockSocket {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().closed += 1;
        Ok(())
    }
}

impl Connection for MockSocket {}

/// A board with scripted network, sensors and LEDs.
#[derive(Debug)]
pub struct MockBoard {
    pub wire: Rc<RefCell<Wire>>,
    pub reachable: bool,
    pub refuse_connect: bool,
    pub connects: usize,
    pub reconnects: usize,
    pub registered: usize,
    pub unregistered: usize,
    pub applied: Vec<Credentials>,
    pub leds: [bool; 3],
    pub led_writes: usize,
    pub readings: [Option<Reading>; 4],
    pub time: u64,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            wire: Rc::new(RefCell::new(Wire::default())),
            reachable: true,
            refuse_connect: false,
            connects: 0,
            reconnects: 0,
            registered: 0,
            unregistered: 0,
            applied: Vec::new(),
            leds: [false; 3],
            led_writes: 0,
            readings: [
                Some(Reading::Vector(0.0, 0.5, 9.81)),
                Some(Reading::Scalar(21.5)),
                Some(Reading::Scalar(40.0)),
                Some(Reading::Scalar(1013.0)),
            ],
            time: 1_700_000_000,
        }
    }

    pub fn push(&self, inbound: Inbound) {
        self.wire.borrow_mut().inbound.push_back(inbound);
    }

    /// Everything written since the last call.
    pub fn take_outbound(&self) -> Vec<u8> {
        std::mem::take(&mut self.wire.borrow_mut().outbound)
    }

    pub fn closed(&self) -> usize {
        self.wire.borrow().closed
    }

    /// Whether a socket is registered for read readiness.
    pub fn watching(&self) -> bool {
        self.registered > self.unregistered
    }
}

impl Connect for MockBoard {
    type Connection = MockSocket;
    type Error = Error;

    fn connect(&mut self, _remote: &str) -> Result<MockSocket, Error> {
        self.connects += 1;
        if self.refuse_connect {
            return Err(Error::ConnectionRefused);
        }
        Ok(MockSocket {
            wire: Rc::clone(&self.wire),
        })
    }
}

impl ReadInterest for MockBoard {
    fn register(&mut self, _socket: &MockSocket) {
        assert!(!self.watching(), "socket registered twice");
        self.registered += 1;
    }

    fn unregister(&mut self, _socket: &MockSocket) {
        assert!(self.watching(), "unregistered without a registration");
        self.unregistered += 1;
    }
}

impl NetworkLink for MockBoard {
    fn is_reachable(&self) -> bool {
        self.reachable
    }

    fn reconnect(&mut self) {
        self.reconnects += 1;
    }

    fn apply_credentials(&mut self, credentials: &Credentials) {
        self.applied.push(credentials.clone());
    }
}

impl Sensors for MockBoard {
    fn read(&mut self, kind: SensorKind) -> Option<Reading> {
        let index = SensorKind::ALL.iter().position(|k| *k == kind)?;
        self.readings[index]
    }

    fn unix_time(&self) -> u64 {
        self.time
    }
}

impl IndicatorDriver for MockBoard {
    fn set(&mut self, led: Led, on: bool) {
        let index = Led::ALL.iter().position(|l| *l == led).unwrap();
        self.leds[index] = on;
        self.led_writes += 1;
    }
}

/// One MQTT control packet: type byte and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttPacket {
    pub kind: u8,
    pub body: Vec<u8>,
}

/// Split a byte stream into MQTT control packets.
pub fn mqtt_packets(mut bytes: &[u8]) -> Vec<MqttPacket> {
    let mut packets = Vec::new();
    while !bytes.is_empty() {
        let (len, used) = varint::decode(&bytes[1..]).unwrap();
        let start = 1 + used;
        let end = start + len as usize;
        packets.push(MqttPacket {
            kind: bytes[0],
            body: bytes[start..end].to_vec(),
        });
        bytes = &bytes[end..];
    }
    packets
}

/// TLV payloads of every PUBLISH in a byte stream.
pub fn published(bytes: &[u8]) -> Vec<Vec<u8>> {
    mqtt_packets(bytes)
        .into_iter()
        .filter(|p| p.kind & 0xF0 == 0x30)
        .map(|p| {
            let topic_len = u16::from_be_bytes([p.body[0], p.body[1]]) as usize;
            p.body[2 + topic_len..].to_vec()
        })
        .collect()
}

pub fn connack(code: u8) -> Vec<u8> {
    vec![0x20, 0x02, 0x00, code]
}

/// A QoS 0 PUBLISH on the command topic carrying `payload`.
pub fn publish(payload: &[u8]) -> Vec<u8> {
    let topic = b"iot/down";
    let mut len = [0u8; 4];
    let used = varint::encode((2 + topic.len() + payload.len()) as u32, &mut len).unwrap();

    let mut frame = vec![0x30];
    frame.extend_from_slice(&len[..used]);
    frame.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    frame.extend_from_slice(topic);
    frame.extend_from_slice(payload);
    frame
}
