use alloc::format;
use core::fmt::Write;

use embassy_time::Duration;
use heapless::String;

use super::query::Url;
use super::{check_connected, deliver, Method, Network, Request, SinkOutcome, SkipReason};
use crate::config::Config;
use crate::constants::{HTTP_TIMEOUT_SECS, LINE_PROTOCOL_CAPACITY, URL_CAPACITY};
use crate::log_buffer::LogBuffer;
use crate::readings::{Derived, Readings};

const MEASUREMENT: &str = "weather";

/// InfluxDB v2 write endpoint for the configured bucket.
pub fn write_url(config: &Config) -> Result<Url<URL_CAPACITY>, super::query::Error> {
    let mut base: String<URL_CAPACITY> = String::new();
    write!(base, "{}/api/v2/write", config.influxdb_url)
        .map_err(|_| super::query::Error::Capacity)?;

    let mut url = Url::new(&base)?;
    url.param("bucket", config.influxdb_bucket)?
        .param("precision", "ns")?;
    Ok(url)
}

/// Single line protocol record. Absent values are left out rather than
/// written as placeholders; `None` when there is no field at all.
pub fn line_protocol(
    readings: &Readings,
    derived: &Derived,
) -> Result<Option<String<LINE_PROTOCOL_CAPACITY>>, core::fmt::Error> {
    let fields: [(&str, Option<f32>, usize); 7] = [
        ("temperature", readings.temperature, 2),
        ("humidity", readings.humidity, 1),
        ("pressure", readings.pressure, 2),
        ("illumination", readings.illumination, 1),
        ("dew_point", derived.dew_point, 1),
        ("battery_voltage", readings.battery_voltage, 2),
        ("solar_panel_voltage", readings.solar_panel_voltage, 2),
    ];

    let mut line: String<LINE_PROTOCOL_CAPACITY> = String::new();
    write!(line, "{}", MEASUREMENT)?;
    let mut first = true;
    for (key, value, precision) in fields {
        let Some(value) = value else { continue };
        let separator = if first { ' ' } else { ',' };
        write!(line, "{}{}={:.*}", separator, key, precision, value)?;
        first = false;
    }

    Ok(if first { None } else { Some(line) })
}

pub async fn send<N: Network>(
    network: &mut N,
    config: &Config,
    readings: &Readings,
    derived: &Derived,
    log: &mut LogBuffer,
) -> SinkOutcome {
    if let Err(skipped) = check_connected(network, log) {
        return skipped;
    }

    let payload = match line_protocol(readings, derived) {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            log.warn(format_args!("No readings to send to InfluxDB"));
            return SinkOutcome::Skipped(SkipReason::MissingReadings);
        }
        Err(_) => {
            log.error(format_args!("InfluxDB payload does not fit the buffer"));
            return SinkOutcome::Failed(super::TransportError::OutOfMemory);
        }
    };
    let url = match write_url(config) {
        Ok(url) => url,
        Err(e) => {
            log.error(format_args!("InfluxDB URL too long: {:?}", e));
            return SinkOutcome::Failed(super::TransportError::OutOfMemory);
        }
    };

    log.info(format_args!("Sending data to InfluxDB..."));
    log.info(format_args!("{}", payload));

    let authorization = format!("Token {}", config.influxdb_api_token);
    let headers = [
        ("Authorization", authorization.as_str()),
        ("Content-Type", "text/plain; charset=utf-8"),
        ("Accept", "application/json"),
    ];
    let request = Request {
        method: Method::Post,
        url: url.as_str(),
        headers: &headers,
        body: payload.as_bytes(),
        timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
    };

    deliver(network, &request, log).await
}
