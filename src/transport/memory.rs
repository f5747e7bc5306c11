//! In-process channel pair, used by tests and offline demos

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{FrameSink, FrameSource, TransportError};

/// Client-side sending half backed by an mpsc channel
pub struct MemorySink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

/// Client-side receiving half backed by an mpsc channel
pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<String>,
}

/// The "server" end of a memory pair
pub struct RemoteEnd {
    /// Frames the client sent, in order. Yields `None` once the client closed.
    pub sent: mpsc::UnboundedReceiver<String>,
    /// Push a frame to the client. Dropping this closes the client's source.
    pub deliver: mpsc::UnboundedSender<String>,
}

impl RemoteEnd {
    /// Queue a frame for the client; ignored if the client is gone.
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.deliver.send(frame.into());
    }

    /// Drain everything the client has sent so far without waiting.
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.sent.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

/// Create a connected sink/source pair plus the remote end driving it.
pub fn memory_pair() -> (MemorySink, MemorySource, RemoteEnd) {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    (
        MemorySink { tx: Some(out_tx) },
        MemorySource { rx: in_rx },
        RemoteEnd {
            sent: out_rx,
            deliver: in_tx,
        },
    )
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        match &self.tx {
            Some(tx) => tx.send(frame).map_err(|_| TransportError::Closed),
            None => Err(TransportError::Closed),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx = None;
        Ok(())
    }
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn recv(&mut self) -> Result<String, TransportError> {
        self.rx.recv().await.ok_or(TransportError::Closed)
    }
}
