//! Best-effort delivery of one cycle's readings.
//!
//! Every sink runs on its own: a skipped or failed sink never affects the
//! ones after it. Each returns a [`SinkOutcome`] which is collected into the
//! cycle's [`CycleReport`].

use core::fmt;

use embassy_time::Duration;

use crate::config::Config;
use crate::log_buffer::LogBuffer;
use crate::readings::{Derived, Readings};

pub mod influx;
pub mod legacy;
pub mod log_sink;
pub mod query;
pub mod wunderground;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    Get,
    Post,
}

pub struct Request<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub body: &'a [u8],
    pub timeout: Duration,
}

/// Transport level failures, numbered like the ESP-IDF HTTP client codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportError {
    Dns,
    ConnectionRefused,
    Tls,
    SendFailed,
    NotConnected,
    ConnectionLost,
    OutOfMemory,
    Encoding,
    ReadTimeout,
}

impl TransportError {
    pub fn code(&self) -> i16 {
        match self {
            TransportError::Dns | TransportError::ConnectionRefused | TransportError::Tls => -1,
            TransportError::SendFailed => -2,
            TransportError::NotConnected => -4,
            TransportError::ConnectionLost => -5,
            TransportError::OutOfMemory => -8,
            TransportError::Encoding => -9,
            TransportError::ReadTimeout => -11,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TransportError::Dns => "dns lookup failed",
            TransportError::ConnectionRefused => "connection refused",
            TransportError::Tls => "tls handshake failed",
            TransportError::SendFailed => "send failed",
            TransportError::NotConnected => "not connected",
            TransportError::ConnectionLost => "connection lost",
            TransportError::OutOfMemory => "too less ram",
            TransportError::Encoding => "transfer encoding error",
            TransportError::ReadTimeout => "read timeout",
        };
        write!(f, "{} ({})", self.code(), text)
    }
}

/// What the reporting code needs from the network stack.
pub trait Network {
    /// Station is associated and has an address
    fn is_connected(&self) -> bool;

    /// Issue one request and return the HTTP status. The body is discarded.
    async fn send(&mut self, request: &Request<'_>) -> Result<u16, TransportError>;

    /// Open a TCP connection, write `parts` in order and close without
    /// reading a response.
    async fn send_raw(
        &mut self,
        host: &str,
        port: u16,
        parts: &[&[u8]],
    ) -> Result<(), TransportError>;
}

/// Stand-in used when the radio could not be brought up at all.
pub struct Offline;

impl Network for Offline {
    fn is_connected(&self) -> bool {
        false
    }

    async fn send(&mut self, _request: &Request<'_>) -> Result<u16, TransportError> {
        Err(TransportError::NotConnected)
    }

    async fn send_raw(
        &mut self,
        _host: &str,
        _port: u16,
        _parts: &[&[u8]],
    ) -> Result<(), TransportError> {
        Err(TransportError::NotConnected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sink {
    Telemetry,
    Legacy,
    Aggregation,
    LogCollector,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    NotConnected,
    Disabled,
    MissingReadings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SinkOutcome {
    /// Server answered with this status
    Delivered(u16),
    /// Written to a raw socket, no answer expected
    Sent,
    Failed(TransportError),
    Skipped(SkipReason),
}

impl SinkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SinkOutcome::Delivered(_) | SinkOutcome::Sent)
    }
}

/// Outcomes in the order the sinks ran.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    entries: heapless::Vec<(Sink, SinkOutcome), 4>,
}

impl CycleReport {
    pub fn record(&mut self, sink: Sink, outcome: SinkOutcome) {
        // One slot per sink
        let _ = self.entries.push((sink, outcome));
    }

    pub fn outcome(&self, sink: Sink) -> Option<SinkOutcome> {
        self.entries
            .iter()
            .find(|(s, _)| *s == sink)
            .map(|(_, outcome)| *outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Sink, SinkOutcome)> {
        self.entries.iter()
    }

    pub fn successes(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_success()).count()
    }
}

/// Run every sink in order: telemetry, legacy, aggregation, log flush.
pub async fn report_all<N: Network>(
    network: &mut N,
    config: &Config,
    readings: &Readings,
    derived: &Derived,
    log: &mut LogBuffer,
) -> CycleReport {
    let mut report = CycleReport::default();

    let outcome = influx::send(network, config, readings, derived, log).await;
    report.record(Sink::Telemetry, outcome);

    let outcome = legacy::send(network, config, readings, derived, log).await;
    report.record(Sink::Legacy, outcome);

    let outcome = wunderground::send(network, config, readings, derived, log).await;
    report.record(Sink::Aggregation, outcome);

    let outcome = log_sink::flush(network, config, log).await;
    report.record(Sink::LogCollector, outcome);

    report
}

fn check_connected<N: Network>(network: &N, log: &mut LogBuffer) -> Result<(), SinkOutcome> {
    if network.is_connected() {
        Ok(())
    } else {
        log.warn(format_args!("WiFi not connected"));
        Err(SinkOutcome::Skipped(SkipReason::NotConnected))
    }
}

/// Issue an HTTP request and log the result.
async fn deliver<N: Network>(
    network: &mut N,
    request: &Request<'_>,
    log: &mut LogBuffer,
) -> SinkOutcome {
    match network.send(request).await {
        Ok(status) => {
            log.info(format_args!("HTTP Response Code: {}", status));
            SinkOutcome::Delivered(status)
        }
        Err(e) => {
            log.error(format_args!("Error in HTTP request: {}", e));
            SinkOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use alloc::collections::VecDeque;
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Recorded {
        pub method: Method,
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
        pub timeout: Duration,
    }

    impl Recorded {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }

        pub fn body_str(&self) -> &str {
            core::str::from_utf8(&self.body).unwrap()
        }
    }

    /// Records every request; HTTP answers come from a queue and default to 204.
    pub struct FakeNetwork {
        pub connected: bool,
        pub requests: Vec<Recorded>,
        pub raw: Vec<(String, u16, Vec<u8>)>,
        pub answers: VecDeque<Result<u16, TransportError>>,
        pub raw_answer: Result<(), TransportError>,
    }

    impl FakeNetwork {
        pub fn connected() -> Self {
            Self {
                connected: true,
                requests: Vec::new(),
                raw: Vec::new(),
                answers: VecDeque::new(),
                raw_answer: Ok(()),
            }
        }

        pub fn offline() -> Self {
            Self {
                connected: false,
                ..Self::connected()
            }
        }

        pub fn answer(mut self, result: Result<u16, TransportError>) -> Self {
            self.answers.push_back(result);
            self
        }

        pub fn attempts(&self) -> usize {
            self.requests.len() + self.raw.len()
        }
    }

    impl Network for FakeNetwork {
        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn send(&mut self, request: &Request<'_>) -> Result<u16, TransportError> {
            self.requests.push(Recorded {
                method: request.method,
                url: request.url.into(),
                headers: request
                    .headers
                    .iter()
                    .map(|(n, v)| (String::from(*n), String::from(*v)))
                    .collect(),
                body: request.body.to_vec(),
                timeout: request.timeout,
            });
            self.answers.pop_front().unwrap_or(Ok(204))
        }

        async fn send_raw(
            &mut self,
            host: &str,
            port: u16,
            parts: &[&[u8]],
        ) -> Result<(), TransportError> {
            let bytes = parts.iter().flat_map(|p| p.iter().copied()).collect();
            self.raw.push((host.into(), port, bytes));
            self.raw_answer
        }
    }

    pub fn config() -> Config {
        Config {
            wifi_ssid: "ssid",
            wifi_psk: "psk",
            hostname: "weather-station",
            cycle_time_seconds: 600,
            wifi_connect_timeout_seconds: 20,
            influxdb_url: "https://influx.example.com",
            influxdb_bucket: "weather",
            influxdb_api_token: "secret-token",
            legacy_host: Some("http://192.168.1.10"),
            legacy_port: Some(8080),
            wunderground_station_id: "KSTATION1",
            wunderground_api_key: "p@ss word",
            log_server_host: "192.168.1.20",
            log_server_port: 5000,
            log_server_path: "/log",
        }
    }

    pub fn readings() -> Readings {
        Readings {
            temperature: Some(22.5),
            humidity: Some(55.0),
            pressure: Some(1013.25),
            illumination: Some(320.0),
            battery_voltage: Some(4.1),
            solar_panel_voltage: Some(5.6),
        }
    }
}
