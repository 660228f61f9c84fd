use alloc::format;
use alloc::string::String;

use super::{check_connected, Network, SinkOutcome};
use crate::config::Config;
use crate::log_buffer::LogBuffer;

/// Request line and headers for a log upload of `length` bytes.
pub fn request_head(config: &Config, length: usize) -> String {
    format!(
        "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        config.log_server_path, config.log_server_host, length
    )
}

/// Ship everything logged so far to the log server and clear the buffer.
/// The connection is closed without waiting for an answer.
pub async fn flush<N: Network>(
    network: &mut N,
    config: &Config,
    log: &mut LogBuffer,
) -> SinkOutcome {
    if let Err(skipped) = check_connected(network, log) {
        return skipped;
    }

    let body = log.take();
    let head = request_head(config, body.len());

    match network
        .send_raw(
            config.log_server_host,
            config.log_server_port,
            &[head.as_bytes(), body.as_bytes()],
        )
        .await
    {
        Ok(()) => {
            log.info(format_args!("Log sent synchronously (no response expected)."));
            SinkOutcome::Sent
        }
        Err(e) => {
            log.error(format_args!("Failed to connect to the log server. {}", e));
            SinkOutcome::Failed(e)
        }
    }
}
