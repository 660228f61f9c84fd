use embassy_net::dns::{DnsQueryType, DnsSocket};
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration, Timer};
use embedded_io_async::Write;
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::request::RequestBuilder;

use solar_weather_station::constants::*;
use solar_weather_station::report::{Method, Network, Request, TransportError};

/// HTTP(S) and raw TCP access over the embassy-net stack.
pub struct Transport {
    stack: Stack<'static>,
    seed: u64,
    client_state: TcpClientState<1, RX_BUFFER_SIZE, TX_BUFFER_SIZE>,
    tls_read_buffer: [u8; TLS_READ_BUFFER_SIZE],
    tls_write_buffer: [u8; TLS_WRITE_BUFFER_SIZE],
    response_buffer: [u8; HTTP_RESPONSE_BUFFER_SIZE],
    rx_buffer: [u8; RX_BUFFER_SIZE],
    tx_buffer: [u8; TX_BUFFER_SIZE],
}

impl Transport {
    pub fn new(stack: Stack<'static>, seed: u64) -> Self {
        Self {
            stack,
            seed,
            client_state: TcpClientState::new(),
            tls_read_buffer: [0; TLS_READ_BUFFER_SIZE],
            tls_write_buffer: [0; TLS_WRITE_BUFFER_SIZE],
            response_buffer: [0; HTTP_RESPONSE_BUFFER_SIZE],
            rx_buffer: [0; RX_BUFFER_SIZE],
            tx_buffer: [0; TX_BUFFER_SIZE],
        }
    }

    async fn request(&mut self, request: &Request<'_>) -> Result<u16, TransportError> {
        let tcp_client = TcpClient::new(self.stack, &self.client_state);
        let dns_client = DnsSocket::new(self.stack);
        // No CA store on the device: the server certificate is not verified,
        // so the InfluxDB token is only as safe as the network path.
        let tls_config = TlsConfig::new(
            self.seed,
            &mut self.tls_read_buffer,
            &mut self.tls_write_buffer,
            TlsVerify::None,
        );
        let mut client = HttpClient::new_with_tls(&tcp_client, &dns_client, tls_config);

        let method = match request.method {
            Method::Get => reqwless::request::Method::GET,
            Method::Post => reqwless::request::Method::POST,
        };

        let mut handle = client
            .request(method, request.url)
            .await
            .map_err(map_error)?
            .headers(request.headers);

        let status = if request.body.is_empty() {
            handle
                .send(&mut self.response_buffer)
                .await
                .map_err(map_error)?
                .status
        } else {
            handle
                .body(request.body)
                .send(&mut self.response_buffer)
                .await
                .map_err(map_error)?
                .status
        };

        Ok(status.0)
    }
}

impl Network for Transport {
    fn is_connected(&self) -> bool {
        self.stack.is_link_up() && self.stack.config_v4().is_some()
    }

    async fn send(&mut self, request: &Request<'_>) -> Result<u16, TransportError> {
        let timeout = request.timeout;
        with_timeout(timeout, self.request(request))
            .await
            .map_err(|_| TransportError::ReadTimeout)?
    }

    async fn send_raw(
        &mut self,
        host: &str,
        port: u16,
        parts: &[&[u8]],
    ) -> Result<(), TransportError> {
        let address = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|_| TransportError::Dns)?
            .first()
            .copied()
            .ok_or(TransportError::Dns)?;

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(LOG_SOCKET_TIMEOUT_SECS)));

        socket
            .connect((address, port))
            .await
            .map_err(|_| TransportError::ConnectionRefused)?;

        for part in parts {
            socket
                .write_all(part)
                .await
                .map_err(|_| TransportError::SendFailed)?;
        }
        socket.flush().await.map_err(|_| TransportError::SendFailed)?;

        // Let the stack drain the send buffer before closing
        Timer::after(Duration::from_millis(LOG_FLUSH_DELAY_MS)).await;
        socket.close();

        Ok(())
    }
}

fn map_error(e: reqwless::Error) -> TransportError {
    match e {
        reqwless::Error::Dns => TransportError::Dns,
        reqwless::Error::Network(_) => TransportError::ConnectionRefused,
        reqwless::Error::Tls(_) => TransportError::Tls,
        reqwless::Error::BufferTooSmall => TransportError::OutOfMemory,
        reqwless::Error::Codec => TransportError::Encoding,
        reqwless::Error::ConnectionAborted => TransportError::ConnectionLost,
        _ => TransportError::SendFailed,
    }
}
