//! MQTT 3.1.1 session carrying TLV packets.
//!
//! Login is a CONNECT packet with the configured client id, user name and
//! secret; the CONNACK return code is the handshake result. Once accepted the
//! session subscribes to the downlink topic. Every TLV packet travels as the
//! payload of a QoS 0 PUBLISH.

use super::{
    CONNACK, CONNECT, PINGREQ, PINGRESP, PROTOCOL_LEVEL, PROTOCOL_NAME, PUBLISH, SUBACK,
    SUBSCRIBE,
};
use crate::config::Config;
use crate::network::application::session::{Session, SessionError, SessionEvent, Transmit};
use crate::network::application::tlv::{self, varint, Packet};
use heapless::{String, Vec};

/// Capacity of the receive buffer. A single downlink packet larger than this
/// is rejected.
pub const RX_CAPACITY: usize = 1024;

const CLEAN_SESSION: u8 = 0x02;
const PASSWORD_FLAG: u8 = 0x40;
const USER_NAME_FLAG: u8 = 0x80;

/// Fixed header plus remaining length, at most five bytes.
type FixedHeader = Vec<u8, 5>;

fn fixed_header(kind: u8, remaining: usize) -> Result<FixedHeader, SessionError> {
    let remaining = u32::try_from(remaining).map_err(|_| SessionError::Overflow)?;
    let mut header = FixedHeader::new();
    let mut len = [0u8; varint::MAX_LEN];
    let used = varint::encode(remaining, &mut len).map_err(|_| SessionError::Overflow)?;
    header.push(kind).map_err(|_| SessionError::Overflow)?;
    header
        .extend_from_slice(&len[..used])
        .map_err(|_| SessionError::Overflow)?;
    Ok(header)
}

/// Length-prefixed UTF-8 string as used throughout MQTT.
fn put_str<const N: usize>(buf: &mut Vec<u8, N>, s: &[u8]) -> Result<(), SessionError> {
    let len = u16::try_from(s.len()).map_err(|_| SessionError::Overflow)?;
    buf.extend_from_slice(&len.to_be_bytes())
        .map_err(|_| SessionError::Overflow)?;
    buf.extend_from_slice(s).map_err(|_| SessionError::Overflow)
}

/// An MQTT session bound to one socket.
#[derive(Debug)]
pub struct MqttSession {
    client_id: String<64>,
    user_name: String<32>,
    secret: String<64>,
    publish_topic: String<64>,
    subscribe_topic: String<64>,
    keep_alive_s: u16,
    rx: Vec<u8, RX_CAPACITY>,
    request_id: u32,
    packet_id: u16,
    last_tx_ms: u64,
    accepted: bool,
}

impl MqttSession {
    /// Whether the endpoint accepted the login.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    fn transmit<T: Transmit>(
        &mut self,
        chunks: &[&[u8]],
        now_ms: u64,
        tx: &mut T,
    ) -> Result<(), SessionError> {
        tx.transmit(chunks)?;
        self.last_tx_ms = now_ms;
        Ok(())
    }

    fn subscribe<T: Transmit>(&mut self, now_ms: u64, tx: &mut T) -> Result<(), SessionError> {
        self.packet_id = self.packet_id.wrapping_add(1).max(1);

        let mut body: Vec<u8, 128> = Vec::new();
        body.extend_from_slice(&self.packet_id.to_be_bytes())
            .map_err(|_| SessionError::Overflow)?;
        put_str(&mut body, self.subscribe_topic.as_bytes())?;
        // Requested QoS 0.
        body.push(0).map_err(|_| SessionError::Overflow)?;

        let header = fixed_header(SUBSCRIBE, body.len())?;
        self.transmit(&[&header, &body], now_ms, tx)
    }

    /// Handle every complete packet at the front of the receive buffer.
    fn drain<T: Transmit>(
        &mut self,
        now_ms: u64,
        tx: &mut T,
        on_event: &mut dyn FnMut(SessionEvent<'_>),
    ) -> Result<(), SessionError> {
        loop {
            let Some(&kind) = self.rx.first() else {
                return Ok(());
            };
            let (remaining, len_bytes) = match varint::decode(&self.rx[1..]) {
                Ok(decoded) => decoded,
                // Wait for the rest of the length field.
                Err(tlv::Error::Truncated) => return Ok(()),
                Err(_) => return Err(SessionError::Malformed),
            };
            let body_start = 1 + len_bytes;
            let total = body_start + remaining as usize;
            if total > RX_CAPACITY {
                return Err(SessionError::Overflow);
            }
            if self.rx.len() < total {
                return Ok(());
            }

            match kind & 0xF0 {
                CONNACK => {
                    if remaining != 2 {
                        return Err(SessionError::Malformed);
                    }
                    let code = self.rx[body_start + 1];
                    self.accepted = code == 0;
                    on_event(SessionEvent::LoginResult(code));
                    if self.accepted {
                        self.subscribe(now_ms, tx)?;
                    }
                }
                PUBLISH => {
                    let body = &self.rx[body_start..total];
                    if body.len() < 2 {
                        return Err(SessionError::Malformed);
                    }
                    let topic_len = usize::from(u16::from_be_bytes([body[0], body[1]]));
                    let mut payload_start = 2 + topic_len;
                    // QoS 1 and 2 carry a packet identifier after the topic.
                    if (kind >> 1) & 0x03 != 0 {
                        payload_start += 2;
                    }
                    let payload = body.get(payload_start..).ok_or(SessionError::Malformed)?;

                    let packet = Packet::parse(payload)?;
                    for record in packet.records() {
                        on_event(SessionEvent::Message {
                            header: packet.header,
                            record: record?,
                        });
                    }
                }
                SUBACK | PINGRESP => {}
                other => log::trace!("mqtt: ignoring packet type {:#04x}", other),
            }

            self.consume(total);
        }
    }

    /// Drop the first `consumed` bytes of the receive buffer.
    fn consume(&mut self, consumed: usize) {
        let len = self.rx.len();
        self.rx.copy_within(consumed..len, 0);
        self.rx.truncate(len - consumed);
    }
}

impl Session for MqttSession {
    fn open(config: &Config) -> Self {
        Self {
            client_id: config.client_id.clone(),
            user_name: config.user_name.clone(),
            secret: config.secret.clone(),
            publish_topic: config.publish_topic.clone(),
            subscribe_topic: config.subscribe_topic.clone(),
            keep_alive_s: config.keep_alive_s,
            rx: Vec::new(),
            request_id: 0,
            packet_id: 0,
            last_tx_ms: 0,
            accepted: false,
        }
    }

    fn login<T: Transmit>(&mut self, now_ms: u64, tx: &mut T) -> Result<(), SessionError> {
        let mut flags = CLEAN_SESSION;
        if !self.user_name.is_empty() {
            flags |= USER_NAME_FLAG;
        }
        if !self.secret.is_empty() {
            flags |= PASSWORD_FLAG;
        }

        // --- Variable Header + Payload ---
        let mut body: Vec<u8, 256> = Vec::new();
        put_str(&mut body, PROTOCOL_NAME)?;
        body.push(PROTOCOL_LEVEL).map_err(|_| SessionError::Overflow)?;
        body.push(flags).map_err(|_| SessionError::Overflow)?;
        body.extend_from_slice(&self.keep_alive_s.to_be_bytes())
            .map_err(|_| SessionError::Overflow)?;
        put_str(&mut body, self.client_id.as_bytes())?;
        if flags & USER_NAME_FLAG != 0 {
            put_str(&mut body, self.user_name.as_bytes())?;
        }
        if flags & PASSWORD_FLAG != 0 {
            put_str(&mut body, self.secret.as_bytes())?;
        }

        // --- Fixed Header ---
        let header = fixed_header(CONNECT, body.len())?;
        log::debug!("mqtt: CONNECT as {}", self.client_id.as_str());
        self.transmit(&[&header, &body], now_ms, tx)
    }

    fn input<T: Transmit>(
        &mut self,
        mut bytes: &[u8],
        now_ms: u64,
        tx: &mut T,
        on_event: &mut dyn FnMut(SessionEvent<'_>),
    ) -> Result<(), SessionError> {
        loop {
            let room = RX_CAPACITY - self.rx.len();
            // `drain` never leaves a full buffer behind unless a packet is
            // larger than the buffer.
            if room == 0 {
                return Err(SessionError::Overflow);
            }
            let (head, rest) = bytes.split_at(room.min(bytes.len()));
            self.rx
                .extend_from_slice(head)
                .map_err(|_| SessionError::Overflow)?;
            bytes = rest;

            self.drain(now_ms, tx, on_event)?;
            if bytes.is_empty() {
                return Ok(());
            }
        }
    }

    fn send<T: Transmit>(
        &mut self,
        packet: &[u8],
        now_ms: u64,
        tx: &mut T,
    ) -> Result<(), SessionError> {
        let topic_len = u16::try_from(self.publish_topic.len())
            .map_err(|_| SessionError::Overflow)?
            .to_be_bytes();
        let header = fixed_header(PUBLISH, 2 + self.publish_topic.len() + packet.len())?;
        let topic = self.publish_topic.clone();
        self.transmit(&[&header, &topic_len, topic.as_bytes(), packet], now_ms, tx)
    }

    fn tick<T: Transmit>(&mut self, now_ms: u64, tx: &mut T) -> Result<(), SessionError> {
        if self.keep_alive_s == 0 {
            return Ok(());
        }
        let period_ms = u64::from(self.keep_alive_s) * 1000;
        if now_ms.saturating_sub(self.last_tx_ms) >= period_ms {
            log::trace!("mqtt: PINGREQ");
            self.transmit(&[&[PINGREQ, 0x00]], now_ms, tx)?;
        }
        Ok(())
    }

    fn next_request_id(&mut self) -> u32 {
        self.request_id = self.request_id.wrapping_add(1);
        self.request_id
    }
}
