//! Data point tags understood by the endpoint.

/// Downlink: first LED on/off (Bool).
pub const LED_1: u32 = 210_112;
/// Downlink: third LED on/off (Bool).
pub const LED_3: u32 = 210_114;
/// Downlink: second LED on/off (Bool).
pub const LED_2: u32 = 210_115;

/// Uplink: acceleration as `"x y z"` with two decimals each (String).
pub const ACCELERATION: u32 = 210_116;
/// Uplink: temperature in degrees Celsius (Double).
pub const TEMPERATURE: u32 = 210_117;
/// Uplink: relative humidity in percent (Double).
pub const HUMIDITY: u32 = 210_118;
/// Uplink: barometric pressure (Double).
pub const BAROMETER: u32 = 210_119;

/// Uplink: second button state (Bool).
pub const BUTTON_1: u32 = 210_120;
/// Uplink: first button state (Bool).
pub const BUTTON_0: u32 = 210_121;
/// Uplink: third button state (Bool).
pub const BUTTON_2: u32 = 210_122;

/// Both directions: Wi-Fi SSID (String).
pub const WIFI_SSID: u32 = 210_125;
/// Both directions: Wi-Fi password (String).
pub const WIFI_PASSWORD: u32 = 210_126;
/// Downlink: apply the staged Wi-Fi credentials.
pub const WIFI_APPLY: u32 = 210_127;

/// Uplink: Unix time in seconds, decimal (String).
pub const TIMESTAMP: u32 = 210_130;
