//! MQTT 3.1.1 transport for TLV packets.
//!
//! Only the subset the device needs is spoken: CONNECT/CONNACK for the login
//! handshake, one SUBSCRIBE for the command topic, QoS 0 PUBLISH in both
//! directions and PINGREQ as keep-alive.
//!
//! ```rust
//! use iotlink::config::Config;
//! use iotlink::network::application::mqtt::MqttSession;
//! use iotlink::network::application::session::{Session, Transmit};
//! use iotlink::network::error::Error;
//!
//! struct Sink(usize);
//! impl Transmit for Sink {
//!     fn transmit(&mut self, chunks: &[&[u8]]) -> Result<(), Error> {
//!         self.0 += chunks.iter().map(|c| c.len()).sum::<usize>();
//!         Ok(())
//!     }
//! }
//!
//! let mut session = MqttSession::open(&Config::default());
//! let mut sink = Sink(0);
//! session.login(0, &mut sink).unwrap();
//! assert!(sink.0 > 0);
//! ```

mod session;

pub use session::{MqttSession, RX_CAPACITY};

// Control packet types, MQTT 3.1.1 section 2.2.1
const CONNECT: u8 = 0x10;
const CONNACK: u8 = 0x20;
const PUBLISH: u8 = 0x30;
// SUBSCRIBE carries the mandatory 0b0010 flags
const SUBSCRIBE: u8 = 0x82;
const SUBACK: u8 = 0x90;
const PINGREQ: u8 = 0xC0;
const PINGRESP: u8 = 0xD0;

const PROTOCOL_NAME: &[u8] = b"MQTT";
const PROTOCOL_LEVEL: u8 = 4; // MQTT 3.1.1
