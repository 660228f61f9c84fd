/// Current firmware version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the heap in DRAM (internal memory)
pub const HEAP_SIZE: usize = 72 * 1024;

/// Size of the TCP socket receive buffer
pub const RX_BUFFER_SIZE: usize = 4096;
/// Size of the TCP socket transmit buffer
pub const TX_BUFFER_SIZE: usize = 4096;

/// TLS record buffers, embedded-tls needs 16 KiB for reads
pub const TLS_READ_BUFFER_SIZE: usize = 16640;
pub const TLS_WRITE_BUFFER_SIZE: usize = 4096;

/// Buffer for the HTTP response head (body is never read)
pub const HTTP_RESPONSE_BUFFER_SIZE: usize = 1024;

/// Capacity of request URLs built for the GET sinks
pub const URL_CAPACITY: usize = 384;
/// Capacity of the InfluxDB line protocol payload
pub const LINE_PROTOCOL_CAPACITY: usize = 256;

/// Timeout for a single HTTP request
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Timeout for the raw log connection
pub const LOG_SOCKET_TIMEOUT_SECS: u64 = 10;
/// Delay between writing the log and closing the socket
pub const LOG_FLUSH_DELAY_MS: u64 = 10;

/// Settling time after powering the sensor bus
pub const SENSOR_POWER_UP_DELAY_MS: u64 = 1000;
/// Interval between Wi-Fi/DHCP state polls
pub const WIFI_POLL_INTERVAL_MS: u64 = 500;

/// 12-bit ADC full scale code
pub const ADC_MAX_CODE: f32 = 4095.0;
/// ADC reference voltage with 11 dB attenuation
pub const ADC_REFERENCE_VOLTAGE: f32 = 3.3;
/// Ratio of the battery and solar panel voltage dividers
pub const VOLTAGE_DIVIDER_MULTIPLIER: f32 = 3.2;

/// Weather Underground upload endpoint
pub const WUNDERGROUND_URL: &str =
    "http://weatherstation.wunderground.com/weatherstation/updateweatherstation.php";
