//! Frame transport
//!
//! The session only needs reliable, ordered, message-framed send/receive
//! with a "closed" signal. The two halves are separate so the receive
//! loop and the input loop can own one each.

mod memory;
mod websocket;

pub use memory::{memory_pair, MemorySink, MemorySource, RemoteEnd};
pub use websocket::{connect, WsSink, WsSource};

use async_trait::async_trait;

use crate::protocol::ClientRequest;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl TransportError {
    pub fn is_closed(&self) -> bool {
        matches!(self, TransportError::Closed)
    }
}

/// Outbound half of a channel
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text frame
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Close the channel. Closing an already closed channel is a no-op.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a channel
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next text frame. `Err(Closed)` once the peer is gone.
    async fn recv(&mut self) -> Result<String, TransportError>;
}

/// Serialize and send a request.
pub async fn send_request<S>(sink: &mut S, request: &ClientRequest) -> Result<(), TransportError>
where
    S: FrameSink + ?Sized,
{
    tracing::debug!("-> {}", request.action());
    sink.send(request.to_frame()).await
}
