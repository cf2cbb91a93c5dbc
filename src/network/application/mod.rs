//! # Application Layer Protocols
//!
//! Everything spoken above a raw [`Connection`](crate::network::Connection):
//!
//! - **[`tlv`]**: the tag-length-value data point codec
//! - **[`session`]**: the seam between the lifecycle and a session protocol
//! - **[`mqtt`]**: the MQTT session that carries TLV packets

/// MQTT session carrying TLV packets.
pub mod mqtt;

/// Session layer traits.
pub mod session;

/// Tag-length-value data point codec.
pub mod tlv;
