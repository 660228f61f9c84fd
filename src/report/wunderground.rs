use embassy_time::Duration;

use super::query::{Error, Url};
use super::{
    check_connected, deliver, Method, Network, Request, SinkOutcome, SkipReason, TransportError,
};
use crate::config::Config;
use crate::constants::{HTTP_TIMEOUT_SECS, URL_CAPACITY, WUNDERGROUND_URL};
use crate::log_buffer::LogBuffer;
use crate::readings::{Derived, Readings};

/// Weather Underground upload protocol URL. The service wants imperial units
/// and an integer humidity. Absent values are left out.
pub fn update_url(
    config: &Config,
    readings: &Readings,
    derived: &Derived,
) -> Result<Url<URL_CAPACITY>, Error> {
    let mut url = Url::new(WUNDERGROUND_URL)?;
    url.param("ID", config.wunderground_station_id)?
        .param("PASSWORD", config.wunderground_api_key)?
        .param("dateutc", "now")?
        .param_fixed("tempf", derived.temperature_f, 2)?
        .param_fixed("dewptf", derived.dew_point_f, 2)?;
    if let Some(humidity) = readings.humidity {
        url.param("humidity", humidity as i32)?;
    }
    url.param_fixed("baromin", derived.pressure_inhg, 2)?
        .param("action", "updateraw")?;
    Ok(url)
}

pub async fn send<N: Network>(
    network: &mut N,
    config: &Config,
    readings: &Readings,
    derived: &Derived,
    log: &mut LogBuffer,
) -> SinkOutcome {
    if !cfg!(feature = "wunderground") {
        return SinkOutcome::Skipped(SkipReason::Disabled);
    }

    if derived.temperature_f.is_none()
        && readings.humidity.is_none()
        && derived.pressure_inhg.is_none()
    {
        log.warn(format_args!("Can not send data to WeatherUnderground"));
        return SinkOutcome::Skipped(SkipReason::MissingReadings);
    }

    if let Err(skipped) = check_connected(network, log) {
        return skipped;
    }

    let url = match update_url(config, readings, derived) {
        Ok(url) => url,
        Err(e) => {
            log.error(format_args!("Weather Underground URL too long: {:?}", e));
            return SinkOutcome::Failed(TransportError::OutOfMemory);
        }
    };

    // The query carries the station key, keep it out of the log
    log.info(format_args!(
        "Sending data to Weather Underground station {}",
        config.wunderground_station_id
    ));
    let request = Request {
        method: Method::Get,
        url: url.as_str(),
        headers: &[],
        body: &[],
        timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
    };

    deliver(network, &request, log).await
}
