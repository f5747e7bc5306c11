//! Receive loop: inbound frames into the shared chat state

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{clock_timestamp, MessageRecord};
use crate::protocol::decode_frame;
use crate::transport::FrameSource;
use crate::tui::ChatState;

/// Decode frames from `source` until it closes or a frame is malformed.
///
/// Each frame becomes one record pushed under the state lock, in receipt
/// order. The loop ends the session with one synthetic record and returns
/// the reason.
pub async fn receive_loop<R>(mut source: R, state: Arc<Mutex<ChatState>>) -> String
where
    R: FrameSource,
{
    loop {
        let text = match source.recv().await {
            Ok(text) => text,
            Err(e) if e.is_closed() => {
                info!("Server closed the connection");
                let reason = "connection to server lost".to_string();
                state
                    .lock()
                    .await
                    .end_session(MessageRecord::connection_lost(clock_timestamp()), &reason);
                return reason;
            }
            Err(e) => {
                warn!("Receive failed: {}", e);
                let reason = e.to_string();
                state
                    .lock()
                    .await
                    .end_session(MessageRecord::failure(clock_timestamp(), &reason), &reason);
                return reason;
            }
        };

        match decode_frame(&text) {
            Ok(event) => {
                debug!("<- {:?}", event);
                let record = MessageRecord::from_event(&event, clock_timestamp());
                state.lock().await.push(record);
            }
            Err(e) => {
                let preview: String = text.chars().take(100).collect();
                warn!("Undecodable frame {:?}: {}", preview, e);
                let reason = e.to_string();
                state
                    .lock()
                    .await
                    .end_session(MessageRecord::failure(clock_timestamp(), &reason), &reason);
                return reason;
            }
        }
    }
}
