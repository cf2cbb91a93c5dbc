//! Uplink packet contents.

use crate::config::Credentials;
use crate::network::application::tlv::{self, tags, OutgoingBuffer};
use crate::sensor::{Reading, SensorKind, Sensors};
use core::fmt::Write;
use heapless::String;

/// Append one record per available sensor, then the timestamp.
///
/// A failed sensor read is left out. An encode failure poisons the buffer and
/// is returned.
pub(crate) fn snapshot<S: Sensors, const N: usize>(
    sensors: &mut S,
    buffer: &mut OutgoingBuffer<N>,
) -> Result<(), tlv::Error> {
    for kind in SensorKind::ALL {
        let Some(reading) = sensors.read(kind) else {
            log::debug!("telemetry: {:?} unavailable", kind);
            continue;
        };
        match reading {
            Reading::Vector(x, y, z) => {
                let mut text: String<128> = String::new();
                if write!(text, "{:.2} {:.2} {:.2}", x, y, z).is_err() {
                    log::warn!("telemetry: {:?} does not format", kind);
                    continue;
                }
                buffer.append_string(kind.tag(), &text)?;
            }
            Reading::Scalar(value) => buffer.append_double(kind.tag(), f64::from(value))?,
        }
    }

    let mut timestamp: String<20> = String::new();
    // u64::MAX is 20 digits
    let _ = write!(timestamp, "{}", sensors.unix_time());
    buffer.append_string(tags::TIMESTAMP, &timestamp)
}

/// Echo the credentials the network manager is using.
pub(crate) fn credentials<const N: usize>(
    credentials: &Credentials,
    buffer: &mut OutgoingBuffer<N>,
) -> Result<(), tlv::Error> {
    buffer.append_string(tags::WIFI_SSID, &credentials.ssid)?;
    buffer.append_string(tags::WIFI_PASSWORD, &credentials.password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::application::tlv::{Flags, Packet, Value};

    struct Bench {
        temperature: Option<f32>,
    }

    impl Sensors for Bench {
        fn read(&mut self, kind: SensorKind) -> Option<Reading> {
            match kind {
                SensorKind::Acceleration => Some(Reading::Vector(0.1, -0.256, 9.81)),
                SensorKind::Temperature => self.temperature.map(Reading::Scalar),
                _ => None,
            }
        }

        fn unix_time(&self) -> u64 {
            1_700_000_000
        }
    }

    #[test]
    fn test_snapshot_skips_missing_sensors() {
        let mut buffer: OutgoingBuffer = OutgoingBuffer::new();
        buffer.start(Flags::REQUEST, 1);
        snapshot(&mut Bench { temperature: None }, &mut buffer).unwrap();

        let packet = Packet::parse(buffer.bytes().unwrap()).unwrap();
        let mut records = packet.records().map(|r| r.unwrap());

        let accel = records.next().unwrap();
        assert_eq!(accel.tag_id, tags::ACCELERATION);
        assert_eq!(accel.value(), Ok(Value::String("0.10 -0.26 9.81")));

        let time = records.next().unwrap();
        assert_eq!(time.tag_id, tags::TIMESTAMP);
        assert_eq!(time.value(), Ok(Value::String("1700000000")));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_snapshot_scalar_is_double() {
        let mut buffer: OutgoingBuffer = OutgoingBuffer::new();
        buffer.start(Flags::REQUEST, 1);
        snapshot(&mut Bench { temperature: Some(21.5) }, &mut buffer).unwrap();

        let packet = Packet::parse(buffer.bytes().unwrap()).unwrap();
        let temperature = packet
            .records()
            .map(|r| r.unwrap())
            .find(|r| r.tag_id == tags::TEMPERATURE)
            .unwrap();
        assert_eq!(temperature.value(), Ok(Value::Double(21.5)));
    }

    #[test]
    fn test_snapshot_overflow_is_reported() {
        let mut buffer: OutgoingBuffer<24> = OutgoingBuffer::new();
        buffer.start(Flags::REQUEST, 1);
        assert_eq!(
            snapshot(&mut Bench { temperature: Some(1.0) }, &mut buffer),
            Err(tlv::Error::BufferTooSmall)
        );
        assert_eq!(buffer.bytes(), Err(tlv::Error::Unusable));
    }
}
