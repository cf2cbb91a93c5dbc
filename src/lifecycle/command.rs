//! Downlink commands.

use crate::config::Credentials;
use crate::indicator::{IndicatorDriver, Led};
use crate::network::application::tlv::{tags, Record, Value};
use crate::network::NetworkLink;
use heapless::String;

/// Act on one downlink record.
///
/// SSID and password are only staged; they take effect when the apply tag
/// arrives and both are non-empty. Unknown tags are ignored.
pub(crate) fn dispatch<P: IndicatorDriver + NetworkLink>(
    record: &Record<'_>,
    platform: &mut P,
    staged: &mut Credentials,
    credentials: &mut Credentials,
) {
    match record.tag_id {
        tags::LED_1 => set_led(record, platform, Led::First),
        tags::LED_2 => set_led(record, platform, Led::Second),
        tags::LED_3 => set_led(record, platform, Led::Third),
        tags::WIFI_SSID => {
            if let Some(ssid) = text(record) {
                stage(&mut staged.ssid, ssid);
            }
        }
        tags::WIFI_PASSWORD => {
            if let Some(password) = text(record) {
                stage(&mut staged.password, password);
            }
        }
        tags::WIFI_APPLY => {
            if !staged.is_complete() {
                log::info!("command: credentials incomplete, not applied");
                return;
            }
            *credentials = staged.clone();
            log::info!("command: joining network {}", credentials.ssid.as_str());
            platform.apply_credentials(credentials);
        }
        other => log::trace!("command: ignoring tag {}", other),
    }
}

fn set_led<P: IndicatorDriver>(record: &Record<'_>, platform: &mut P, led: Led) {
    match record.value() {
        Ok(Value::Bool(on)) => platform.set(led, on),
        _ => log::warn!("command: tag {} expects a bool", record.tag_id),
    }
}

fn text<'a>(record: &Record<'a>) -> Option<&'a str> {
    match record.value() {
        Ok(Value::String(s)) | Ok(Value::Enum(s)) => Some(s),
        _ => {
            log::warn!("command: tag {} expects a string", record.tag_id);
            None
        }
    }
}

fn stage<const N: usize>(slot: &mut String<N>, value: &str) {
    match String::try_from(value) {
        Ok(value) => *slot = value,
        Err(_) => log::warn!("command: value longer than {} bytes ignored", N),
    }
}
