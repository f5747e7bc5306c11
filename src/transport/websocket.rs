//! WebSocket transport over tokio-tungstenite

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use super::{FrameSink, FrameSource, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Sending half of a WebSocket connection
pub struct WsSink {
    inner: SplitSink<WsStream, Message>,
    closed: bool,
}

/// Receiving half of a WebSocket connection
pub struct WsSource {
    inner: SplitStream<WsStream>,
}

/// Connect to `url` (`ws://` or `wss://`) and split the stream.
pub async fn connect(url: &str) -> Result<(WsSink, WsSource), TransportError> {
    let (stream, _response) = connect_async(url).await?;
    info!("Connected to {}", url);
    let (sink, source) = stream.split();
    Ok((
        WsSink {
            inner: sink,
            closed: false,
        },
        WsSource { inner: source },
    ))
}

fn map_ws_error(e: WsError) -> TransportError {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
        other => TransportError::WebSocket(other),
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.inner
            .send(Message::Text(frame))
            .await
            .map_err(map_ws_error)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.inner.close().await {
            Ok(()) => Ok(()),
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                debug!("close on an already closed socket");
                Ok(())
            }
            Err(e) => Err(TransportError::WebSocket(e)),
        }
    }
}

#[async_trait]
impl FrameSource for WsSource {
    async fn recv(&mut self) -> Result<String, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => return Ok(text),
                    Err(_) => debug!("dropping non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                // Ping/Pong are answered by tungstenite itself
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(map_ws_error(e)),
            }
        }
    }
}
