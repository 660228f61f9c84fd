use core::fmt::Write;

use embassy_time::Duration;
use heapless::String;

use super::query::{Error, Url};
use super::{
    check_connected, deliver, Method, Network, Request, SinkOutcome, SkipReason, TransportError,
};
use crate::config::Config;
use crate::constants::{HTTP_TIMEOUT_SECS, URL_CAPACITY};
use crate::log_buffer::LogBuffer;
use crate::readings::{Derived, Readings};

/// Query URL for the self-hosted weather API, `None` when not configured.
pub fn request_url(
    config: &Config,
    readings: &Readings,
    derived: &Derived,
) -> Option<Result<Url<URL_CAPACITY>, Error>> {
    let (host, port) = match (config.legacy_host, config.legacy_port) {
        (Some(host), Some(port)) => (host, port),
        _ => return None,
    };

    Some(build(host, port, readings, derived))
}

fn build(
    host: &str,
    port: u16,
    readings: &Readings,
    derived: &Derived,
) -> Result<Url<URL_CAPACITY>, Error> {
    let mut base: String<URL_CAPACITY> = String::new();
    write!(base, "{}:{}/api/weather", host, port).map_err(|_| Error::Capacity)?;

    let mut url = Url::new(&base)?;
    url.param_fixed("temperature", readings.temperature, 2)?
        .param_fixed("dew_point", derived.dew_point, 2)?
        .param_fixed("humidity", readings.humidity, 1)?
        .param_fixed("illumination", readings.illumination, 1)?
        .param_fixed("pressure", readings.pressure, 2)?
        .param_fixed("battery_voltage", readings.battery_voltage, 2)?
        .param_fixed("solar_panel_voltage", readings.solar_panel_voltage, 2)?;
    Ok(url)
}

pub async fn send<N: Network>(
    network: &mut N,
    config: &Config,
    readings: &Readings,
    derived: &Derived,
    log: &mut LogBuffer,
) -> SinkOutcome {
    let url = match request_url(config, readings, derived) {
        None => return SinkOutcome::Skipped(SkipReason::Disabled),
        Some(Ok(url)) => url,
        Some(Err(e)) => {
            log.error(format_args!("Legacy URL too long: {:?}", e));
            return SinkOutcome::Failed(TransportError::OutOfMemory);
        }
    };

    if let Err(skipped) = check_connected(network, log) {
        return skipped;
    }

    log.info(format_args!("Sending to: {}", url.as_str()));
    let request = Request {
        method: Method::Get,
        url: url.as_str(),
        headers: &[],
        body: &[],
        timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
    };

    deliver(network, &request, log).await
}
