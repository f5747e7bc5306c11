//! Wire protocol for the chat service
//!
//! Every frame is one JSON text message. Client requests carry an `action`
//! tag with an optional `data` payload; server pushes carry a `type` tag.
//! Handshake replies are untagged `{success, nickname}` / `{error}` objects.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Request sent from the client to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum ClientRequest {
    Login {
        username: String,
        /// sha256 hex digest, never the plaintext
        password: String,
    },
    Register {
        username: String,
        nickname: String,
        password: String,
    },
    Message {
        text: String,
    },
    GetOnlineUsers,
}

impl ClientRequest {
    pub fn login(username: &str, secret: &str) -> Self {
        ClientRequest::Login {
            username: username.to_string(),
            password: hash_secret(secret),
        }
    }

    pub fn register(username: &str, nickname: &str, secret: &str) -> Self {
        ClientRequest::Register {
            username: username.to_string(),
            nickname: nickname.to_string(),
            password: hash_secret(secret),
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        ClientRequest::Message { text: text.into() }
    }

    /// Short name used in logs
    pub fn action(&self) -> &'static str {
        match self {
            ClientRequest::Login { .. } => actions::LOGIN,
            ClientRequest::Register { .. } => actions::REGISTER,
            ClientRequest::Message { .. } => actions::MESSAGE,
            ClientRequest::GetOnlineUsers => actions::GET_ONLINE_USERS,
        }
    }

    pub fn to_frame(&self) -> String {
        // Serializing these plain string structs cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Client request actions
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const REGISTER: &str = "register";
    pub const MESSAGE: &str = "message";
    pub const GET_ONLINE_USERS: &str = "get_online_users";
}

/// Raw server push, as tagged on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    /// "sender|body"
    Message(String),
    OnlineUsers(Vec<String>),
    /// "sender|action"
    System(String),
}

/// Presence change carried by a `system` frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemAction {
    Connected,
    Disconnected,
    Other(String),
}

impl SystemAction {
    fn parse(action: &str) -> Self {
        match action {
            "connected" => SystemAction::Connected,
            "disconnected" => SystemAction::Disconnected,
            other => SystemAction::Other(other.to_string()),
        }
    }
}

/// A decoded server push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Chat { sender: String, body: String },
    Roster(Vec<String>),
    System {
        sender: String,
        action: SystemAction,
        /// The untouched "sender|action" payload
        raw: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} frame without '|' separator: {data:?}")]
    MissingSeparator { kind: &'static str, data: String },
}

/// Decode one inbound text frame.
pub fn decode_frame(text: &str) -> Result<InboundEvent, DecodeError> {
    let frame: ServerFrame = serde_json::from_str(text)?;
    match frame {
        ServerFrame::Message(data) => {
            let (sender, body) = split_pair("message", &data)?;
            Ok(InboundEvent::Chat {
                sender: sender.trim().to_string(),
                body: body.trim().to_string(),
            })
        }
        ServerFrame::OnlineUsers(names) => Ok(InboundEvent::Roster(names)),
        ServerFrame::System(data) => {
            let (sender, action) = split_pair("system", &data)?;
            Ok(InboundEvent::System {
                sender: sender.trim().to_string(),
                action: SystemAction::parse(action.trim()),
                raw: data.clone(),
            })
        }
    }
}

fn split_pair<'a>(kind: &'static str, data: &'a str) -> Result<(&'a str, &'a str), DecodeError> {
    data.split_once('|')
        .ok_or_else(|| DecodeError::MissingSeparator {
            kind,
            data: data.to_string(),
        })
}

/// Reply to a `login` or `register` request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Frame text exactly as received
    #[serde(skip)]
    pub raw: String,
}

impl AuthReply {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let mut reply: AuthReply = serde_json::from_str(text)?;
        reply.raw = text.to_string();
        Ok(reply)
    }

    /// True when the server accepted the request and reported no error.
    pub fn is_accepted(&self) -> bool {
        self.success && self.error.is_none()
    }

    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "request rejected by server".to_string())
    }
}

/// True for frames carrying a `type` tag. The server broadcasts these to
/// every socket, including ones still in the handshake.
pub fn is_server_push(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|value| value.get("type").is_some())
        .unwrap_or(false)
}

/// One-way digest sent in place of the secret: sha256, lowercase hex.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_hash_secret_is_sha256_hex() {
        let digest = hash_secret("s3cret");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(
            hash_secret(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_login_frame_shape() {
        let frame = ClientRequest::login("alice", "s3cret").to_frame();
        let parsed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["action"], "login");
        assert_eq!(parsed["data"]["username"], "alice");
        assert_eq!(parsed["data"]["password"], hash_secret("s3cret"));
    }

    #[test]
    fn test_register_frame_uses_nickname_key() {
        let frame = ClientRequest::register("alice", "Alice", "pw").to_frame();
        let parsed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["action"], "register");
        assert_eq!(parsed["data"]["nickname"], "Alice");
        assert_ne!(parsed["data"]["password"], "pw");
    }

    #[test]
    fn test_get_online_users_has_no_payload() {
        let frame = ClientRequest::GetOnlineUsers.to_frame();
        assert_eq!(frame, r#"{"action":"get_online_users"}"#);
    }

    #[test]
    fn test_message_frame() {
        let frame = ClientRequest::message("hello world").to_frame();
        assert_eq!(frame, r#"{"action":"message","data":{"text":"hello world"}}"#);
    }

    #[test]
    fn test_decode_chat_splits_on_first_pipe() {
        let event = decode_frame(r#"{"type":"message","data":"bob | a|b "}"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::Chat {
                sender: "bob".to_string(),
                body: "a|b".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_system_actions() {
        let joined = decode_frame(r#"{"type":"system","data":"carol|connected"}"#).unwrap();
        assert!(matches!(
            joined,
            InboundEvent::System { action: SystemAction::Connected, .. }
        ));

        let other = decode_frame(r#"{"type":"system","data":"carol|renamed"}"#).unwrap();
        match other {
            InboundEvent::System { action, raw, .. } => {
                assert_eq!(action, SystemAction::Other("renamed".to_string()));
                assert_eq!(raw, "carol|renamed");
            }
            _ => panic!("expected system event"),
        }
    }

    #[test]
    fn test_decode_roster() {
        let event = decode_frame(r#"{"type":"online_users","data":["a","b"]}"#).unwrap();
        assert_eq!(event, InboundEvent::Roster(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_decode_failures() {
        assert!(decode_frame("not json").is_err());
        assert!(decode_frame(r#"{"type":"unknown","data":1}"#).is_err());
        assert!(matches!(
            decode_frame(r#"{"type":"message","data":"no separator"}"#),
            Err(DecodeError::MissingSeparator { kind: "message", .. })
        ));
    }

    #[test]
    fn test_auth_reply_keeps_raw_text() {
        let text = r#"{"success":true,"nickname":"Alice"}"#;
        let reply = AuthReply::parse(text).unwrap();
        assert!(reply.is_accepted());
        assert_eq!(reply.nickname.as_deref(), Some("Alice"));
        assert_eq!(reply.raw, text);

        let rejected = AuthReply::parse(r#"{"error":"Invalid credentials"}"#).unwrap();
        assert!(!rejected.is_accepted());
        assert_eq!(rejected.error_message(), "Invalid credentials");
    }

    #[test]
    fn test_server_push_detection() {
        assert!(is_server_push(r#"{"type":"system","data":"carol|connected"}"#));
        assert!(is_server_push(r#"{"type":"online_users","data":[]}"#));
        assert!(!is_server_push(r#"{"success":true,"nickname":"Alice"}"#));
        assert!(!is_server_push(r#"{"error":"Username exists"}"#));
        assert!(!is_server_push("not json"));
    }
}
