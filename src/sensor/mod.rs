//! Sensor sources sampled by the telemetry tick.
//!
//! The hardware drivers live with the board support code. They only need to
//! answer "what is the value right now", or `None` when a read fails; a
//! failed source is simply left out of that tick's packet.

use crate::network::application::tlv::tags;

/// The sensor sources reported in telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Three-axis accelerometer.
    Acceleration,
    /// Temperature in degrees Celsius.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// Barometric pressure.
    Barometer,
}

impl SensorKind {
    /// Every source, in the order they appear in a telemetry packet.
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Acceleration,
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Barometer,
    ];

    /// Tag the reading is reported under.
    pub fn tag(self) -> u32 {
        match self {
            SensorKind::Acceleration => tags::ACCELERATION,
            SensorKind::Temperature => tags::TEMPERATURE,
            SensorKind::Humidity => tags::HUMIDITY,
            SensorKind::Barometer => tags::BAROMETER,
        }
    }
}

/// One sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Three axes.
    Vector(f32, f32, f32),
    /// A single value.
    Scalar(f32),
}

/// Access to the board's sensors and wall clock.
pub trait Sensors {
    /// Sample one source. `None` if the read failed.
    fn read(&mut self, kind: SensorKind) -> Option<Reading>;

    /// Seconds since the Unix epoch.
    fn unix_time(&self) -> u64;
}
