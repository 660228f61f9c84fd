pub struct Config {
    // Wi-Fi SSID to connect to
    pub wifi_ssid: &'static str,

    // Wi-Fi pre-shared key (password)
    pub wifi_psk: &'static str,

    // DHCP hostname
    pub hostname: &'static str,

    // Wake-to-wake period in seconds
    pub cycle_time_seconds: u32,

    // Upper bound on Wi-Fi association and DHCP in seconds
    pub wifi_connect_timeout_seconds: u32,

    // InfluxDB base URL (scheme and host, no trailing slash)
    pub influxdb_url: &'static str,

    // InfluxDB bucket to write to
    pub influxdb_bucket: &'static str,

    // InfluxDB API token
    pub influxdb_api_token: &'static str,

    // Legacy weather API host including scheme (optional)
    pub legacy_host: Option<&'static str>,

    // Legacy weather API port (optional)
    pub legacy_port: Option<u16>,

    // Weather Underground station ID
    pub wunderground_station_id: &'static str,

    // Weather Underground station key
    pub wunderground_api_key: &'static str,

    // Log collector hostname or IP address
    pub log_server_host: &'static str,

    // Log collector TCP port
    pub log_server_port: u16,

    // Log collector request path
    pub log_server_path: &'static str,
}

// config values are generated at compile time
include!(concat!(env!("OUT_DIR"), "/config.rs"));
