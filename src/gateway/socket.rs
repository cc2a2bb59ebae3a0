use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::{Message as WsMessage, WebSocketConfig};
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};

use crate::error::{ClientError, Result};

/// Applied to the connect and to every receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect-time settings for the gateway socket.
///
/// Certificates are always verified against the platform's native roots.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub timeout: Duration,
    /// Largest accepted frame; `None` keeps tungstenite's default.
    pub max_frame_size: Option<usize>,
    /// Largest accepted message after reassembling fragments.
    pub max_message_size: Option<usize>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_frame_size: None,
            max_message_size: None,
        }
    }
}

impl GatewayOptions {
    pub fn websocket_config(&self) -> WebSocketConfig {
        let mut config = WebSocketConfig::default();
        if let Some(size) = self.max_frame_size {
            config = config.max_frame_size(Some(size));
        }
        if let Some(size) = self.max_message_size {
            config = config.max_message_size(Some(size));
        }
        config
    }
}

/// A connected, text-framed gateway socket.
#[async_trait]
pub trait GatewaySocket: Send {
    async fn send(&mut self, text: String) -> Result<()>;

    /// Next text frame. Control frames are skipped; a close is an error.
    async fn receive(&mut self) -> Result<String>;
}

#[async_trait]
pub trait GatewayConnector: Send + Sync {
    async fn connect(&self, url: &str, options: &GatewayOptions) -> Result<Box<dyn GatewaySocket>>;
}

/// Connects with tokio-tungstenite over rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl GatewayConnector for TungsteniteConnector {
    async fn connect(&self, url: &str, options: &GatewayOptions) -> Result<Box<dyn GatewaySocket>> {
        crate::http::install_crypto_provider();
        debug!("connecting to {}", url);
        let connect = connect_async_with_config(url, Some(options.websocket_config()), false);
        let (stream, _) = tokio::time::timeout(options.timeout, connect)
            .await
            .map_err(|_| ClientError::gateway(format!("Timed out connecting to {}", url)))??;
        Ok(Box::new(TungsteniteSocket {
            stream,
            timeout: options.timeout,
        }))
    }
}

struct TungsteniteSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    timeout: Duration,
}

#[async_trait]
impl GatewaySocket for TungsteniteSocket {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream.send(WsMessage::Text(text.into())).await?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<String> {
        loop {
            let next = tokio::time::timeout(self.timeout, self.stream.next())
                .await
                .map_err(|_| ClientError::gateway("Timed out waiting for the gateway"))?;
            match next {
                Some(Ok(WsMessage::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(WsMessage::Close(frame))) => {
                    return Err(ClientError::gateway_with_payload(
                        "Gateway connection closed",
                        format!("{:?}", frame),
                    ))
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ClientError::gateway("Gateway connection closed")),
            }
        }
    }
}
