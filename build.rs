use std::{env, error::Error, fs, path::Path};

use serde::Deserialize;

#[derive(Deserialize)]
struct RawConfig {
    wifi_ssid: String,
    wifi_psk: String,
    hostname: String,
    cycle_time_seconds: u32,
    wifi_connect_timeout_seconds: u32,
    influxdb_url: String,
    influxdb_bucket: String,
    influxdb_api_token: String,
    legacy_host: Option<String>,
    legacy_port: Option<u16>,
    wunderground_station_id: String,
    wunderground_api_key: String,
    log_server_host: String,
    log_server_port: u16,
    log_server_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Tell Cargo to rerun if toml changes
    println!("cargo:rerun-if-changed=cfg.toml");
    println!("cargo:rerun-if-changed=cfg.toml.example");

    // Host builds (tests) fall back to the example file
    let path = if Path::new("cfg.toml").exists() {
        "cfg.toml"
    } else {
        println!("cargo:warning=cfg.toml not found, using cfg.toml.example");
        "cfg.toml.example"
    };

    // Read and parse
    let toml_str = fs::read_to_string(path)?;
    let raw: RawConfig = toml::from_str(&toml_str)?;

    if raw.cycle_time_seconds == 0 {
        return Err("cycle_time_seconds must be greater than zero".into());
    }

    // Generate Rust code
    let code = format!(
        r#"
        pub const CONFIG: Config = Config {{
            wifi_ssid: {ssid:?},
            wifi_psk: {psk:?},
            hostname: {host:?},
            cycle_time_seconds: {cycle},
            wifi_connect_timeout_seconds: {wifi_timeout},
            influxdb_url: {iurl:?},
            influxdb_bucket: {ibucket:?},
            influxdb_api_token: {itoken:?},
            legacy_host: {lhost:?},
            legacy_port: {lport:?},
            wunderground_station_id: {wid:?},
            wunderground_api_key: {wkey:?},
            log_server_host: {lsh:?},
            log_server_port: {lsp},
            log_server_path: {lspath:?},
        }};
    "#,
        ssid = raw.wifi_ssid,
        psk = raw.wifi_psk,
        host = raw.hostname,
        cycle = raw.cycle_time_seconds,
        wifi_timeout = raw.wifi_connect_timeout_seconds,
        iurl = raw.influxdb_url.trim_end_matches('/'),
        ibucket = raw.influxdb_bucket,
        itoken = raw.influxdb_api_token,
        lhost = raw.legacy_host,
        lport = raw.legacy_port,
        wid = raw.wunderground_station_id,
        wkey = raw.wunderground_api_key,
        lsh = raw.log_server_host,
        lsp = raw.log_server_port,
        lspath = raw.log_server_path,
    );

    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");
    fs::write(dest_path, code)?;
    Ok(())
}
