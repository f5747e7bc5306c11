//! Login / registration handshake
//!
//! Runs once on a fresh channel before the chat session starts. Each step
//! sends one request and waits for exactly one reply; there are no
//! timeouts.
//!
//! ```text
//! TryLogin --no or corrupt credentials--> Register --form--> Confirm
//!    |  ^                                    ^                  |
//!    |  +--------registered and saved--------+------------------+
//!    |                                       +--mismatch/error--+
//!    +--accepted--> Done
//! ```

use std::io;

use tracing::{debug, info, warn};

use crate::credentials::{CredentialError, CredentialStore, Credentials};
use crate::protocol::{is_server_push, AuthReply, ClientRequest};
use crate::session::SessionIdentity;
use crate::transport::{send_request, FrameSink, FrameSource, TransportError};

/// Fields collected by the registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub nickname: String,
    pub secret: String,
    pub confirmation: String,
}

/// Interactive source of registration details
pub trait RegistrationPrompt {
    /// Ask for a new account. `Ok(None)` when the user cancels.
    fn collect(&mut self) -> io::Result<Option<RegistrationForm>>;

    /// Show a message and wait for acknowledgement.
    fn notify(&mut self, message: &str) -> io::Result<()>;
}

/// Result of the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated {
        identity: SessionIdentity,
        /// The login reply exactly as the server sent it
        reply: AuthReply,
    },
    Failed {
        reason: String,
    },
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated { .. })
    }
}

enum AuthState {
    TryLogin,
    Register,
    Confirm(RegistrationForm),
    Done(AuthReply),
    Failed(String),
}

impl AuthState {
    fn name(&self) -> &'static str {
        match self {
            AuthState::TryLogin => "try_login",
            AuthState::Register => "register",
            AuthState::Confirm(_) => "confirm",
            AuthState::Done(_) => "done",
            AuthState::Failed(_) => "failed",
        }
    }
}

pub struct Authenticator<C, P> {
    store: C,
    prompt: P,
    max_attempts: Option<usize>,
}

impl<C, P> Authenticator<C, P>
where
    C: CredentialStore,
    P: RegistrationPrompt,
{
    pub fn new(store: C, prompt: P) -> Self {
        Self {
            store,
            prompt,
            max_attempts: None,
        }
    }

    /// Give up after `attempts` registration forms.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn into_parts(self) -> (C, P) {
        (self.store, self.prompt)
    }

    pub async fn authenticate<S, R>(&mut self, sink: &mut S, source: &mut R) -> AuthOutcome
    where
        S: FrameSink + ?Sized,
        R: FrameSource + ?Sized,
    {
        let mut state = AuthState::TryLogin;
        // Credentials from a registration in this run; used even if saving failed.
        let mut fresh: Option<Credentials> = None;
        // Only one rejected login is answered with a new registration.
        let mut retried = false;
        let mut attempts = 0usize;

        loop {
            debug!("auth state: {}", state.name());
            state = match state {
                AuthState::TryLogin => match self.stored_credentials(fresh.take()) {
                    Err(reason) => AuthState::Failed(reason),
                    Ok(None) => AuthState::Register,
                    Ok(Some(creds)) => match login(sink, source, &creds).await {
                        Ok(reply) if reply.is_accepted() && !has_nickname(&reply) => {
                            AuthState::Failed("login reply carried no nickname".to_string())
                        }
                        Ok(reply) if reply.is_accepted() => AuthState::Done(reply),
                        Ok(reply) if retried => AuthState::Failed(reply.error_message()),
                        Ok(reply) => {
                            info!("Stored login rejected: {}", reply.error_message());
                            retried = true;
                            AuthState::Register
                        }
                        Err(reason) => AuthState::Failed(reason),
                    },
                },

                AuthState::Register => {
                    if self.max_attempts.is_some_and(|max| attempts >= max) {
                        AuthState::Failed("too many registration attempts".to_string())
                    } else {
                        attempts += 1;
                        match self.prompt.collect() {
                            Ok(Some(form)) => AuthState::Confirm(form),
                            Ok(None) => AuthState::Failed("registration cancelled".to_string()),
                            Err(e) => AuthState::Failed(e.to_string()),
                        }
                    }
                }

                AuthState::Confirm(form) => {
                    if form.secret != form.confirmation {
                        self.notify("Passwords don't match. Please try again.");
                        AuthState::Register
                    } else {
                        match register(sink, source, &form).await {
                            Ok(None) => {
                                let creds = Credentials::new(form.username, form.secret);
                                if let Err(e) = self.store.save(&creds) {
                                    warn!("Failed to save credentials: {}", e);
                                }
                                fresh = Some(creds);
                                retried = true;
                                AuthState::TryLogin
                            }
                            Ok(Some(error)) => {
                                self.notify(&format!("Error: {}", error));
                                AuthState::Register
                            }
                            Err(reason) => AuthState::Failed(reason),
                        }
                    }
                }

                AuthState::Done(reply) => {
                    let name = reply.nickname.clone().unwrap_or_default();
                    info!("Authenticated as {}", name);
                    return AuthOutcome::Authenticated {
                        identity: SessionIdentity::new(name),
                        reply,
                    };
                }

                AuthState::Failed(reason) => {
                    warn!("Authentication failed: {}", reason);
                    return AuthOutcome::Failed { reason };
                }
            };
        }
    }

    /// Credentials to try next: a fresh registration first, then the store.
    /// Corrupt stored credentials are deleted and treated as absent.
    fn stored_credentials(&self, fresh: Option<Credentials>) -> Result<Option<Credentials>, String> {
        if fresh.is_some() {
            return Ok(fresh);
        }
        match self.store.load() {
            Ok(creds) => Ok(creds),
            Err(CredentialError::Corrupt(reason)) => {
                warn!("Discarding stored credentials: {}", reason);
                if let Err(e) = self.store.remove() {
                    warn!("Failed to remove stored credentials: {}", e);
                }
                Ok(None)
            }
            Err(e) => Err(e.to_string()),
        }
    }

    fn notify(&mut self, message: &str) {
        if let Err(e) = self.prompt.notify(message) {
            warn!("Failed to show notice: {}", e);
        }
    }
}

async fn login<S, R>(
    sink: &mut S,
    source: &mut R,
    creds: &Credentials,
) -> Result<AuthReply, String>
where
    S: FrameSink + ?Sized,
    R: FrameSource + ?Sized,
{
    let request = ClientRequest::login(&creds.username, &creds.secret);
    let text = exchange(sink, source, &request).await?;
    AuthReply::parse(&text).map_err(|e| format!("unexpected login reply: {}", e))
}

/// `Ok(None)` when the server accepted the account, `Ok(Some(error))`
/// when it refused it.
async fn register<S, R>(
    sink: &mut S,
    source: &mut R,
    form: &RegistrationForm,
) -> Result<Option<String>, String>
where
    S: FrameSink + ?Sized,
    R: FrameSource + ?Sized,
{
    let request = ClientRequest::register(&form.username, &form.nickname, &form.secret);
    let text = exchange(sink, source, &request).await?;
    let reply =
        AuthReply::parse(&text).map_err(|e| format!("unexpected register reply: {}", e))?;
    Ok(reply.error)
}

fn has_nickname(reply: &AuthReply) -> bool {
    reply.nickname.as_deref().is_some_and(|name| !name.trim().is_empty())
}

/// Send one request and wait for its reply. Server pushes that arrive
/// first are not replies and are skipped.
async fn exchange<S, R>(sink: &mut S, source: &mut R, request: &ClientRequest) -> Result<String, String>
where
    S: FrameSink + ?Sized,
    R: FrameSource + ?Sized,
{
    send_request(sink, request).await.map_err(describe)?;
    loop {
        let text = source.recv().await.map_err(describe)?;
        if is_server_push(&text) {
            debug!("Skipping server push during {}: {}", request.action(), text);
            continue;
        }
        return Ok(text);
    }
}

fn describe(e: TransportError) -> String {
    if e.is_closed() {
        "connection closed during authentication".to_string()
    } else {
        e.to_string()
    }
}
