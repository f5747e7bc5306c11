//! Main TUI application
//!
//! `ChatSession` holds everything the input side of a session needs: the
//! identity, the edit buffer, the outbound half of the channel and the
//! shared state. `App` drives it from terminal events, runs the receive
//! loop as a background task and redraws through the `Renderer`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::backend::Backend;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::input::{InputAction, InputState};
use super::renderer::{ChatFrame, Renderer};
use super::slash_commands::{parse_command, ChatCommand};
use super::state::ChatState;
use crate::protocol::ClientRequest;
use crate::session::{
    clock_timestamp, receive_loop, MessageRecord, SessionEnd, SessionIdentity, Tone,
};
use crate::transport::{send_request, FrameSink, FrameSource};

/// What the event loop should do after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The user asked to leave
    Quit,
    /// The session had already ended and a key was pressed
    Disconnected,
}

pub struct ChatSession<S: FrameSink> {
    identity: SessionIdentity,
    state: Arc<Mutex<ChatState>>,
    sink: S,
    input: InputState,
    sink_closed: bool,
}

impl<S: FrameSink> ChatSession<S> {
    pub fn new(identity: SessionIdentity, state: Arc<Mutex<ChatState>>, sink: S) -> Self {
        Self {
            identity,
            state,
            sink,
            input: InputState::new(),
            sink_closed: false,
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn state(&self) -> &Arc<Mutex<ChatState>> {
        &self.state
    }

    /// Push the banner and ask for the roster.
    pub async fn start(&mut self) -> Flow {
        {
            let mut state = self.state.lock().await;
            for record in banner(&self.identity.display_name) {
                state.push(record);
            }
        }
        self.send(&ClientRequest::GetOnlineUsers).await
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if self.state.lock().await.is_ended() {
            return Flow::Disconnected;
        }
        let action = self.input.handle_key(key);
        self.apply(action).await
    }

    async fn apply(&mut self, action: InputAction) -> Flow {
        match action {
            InputAction::None => Flow::Continue,
            InputAction::Edited => {
                self.state.lock().await.mark_dirty();
                Flow::Continue
            }
            InputAction::Scroll(command) => {
                self.state.lock().await.scroll(command);
                Flow::Continue
            }
            InputAction::Quit => Flow::Quit,
            InputAction::Submit(line) => self.submit(line).await,
        }
    }

    /// Handle a submitted line: a command, or a chat message echoed locally
    /// before it is sent.
    pub async fn submit(&mut self, line: String) -> Flow {
        match parse_command(&line) {
            Some(ChatCommand::Quit) => {
                info!("Quit requested");
                Flow::Quit
            }
            Some(ChatCommand::Online) => {
                self.state.lock().await.mark_dirty();
                self.send(&ClientRequest::GetOnlineUsers).await
            }
            None => {
                let echo = MessageRecord::chat(
                    clock_timestamp(),
                    &self.identity.display_name,
                    &line,
                    Tone::OwnNick,
                );
                self.state.lock().await.push(echo);
                self.send(&ClientRequest::message(line)).await
            }
        }
    }

    async fn send(&mut self, request: &ClientRequest) -> Flow {
        if let Err(e) = send_request(&mut self.sink, request).await {
            warn!("Send failed: {}", e);
            self.state
                .lock()
                .await
                .end_session(MessageRecord::connection_lost(clock_timestamp()), &e.to_string());
        }
        Flow::Continue
    }

    /// Close the outbound half once.
    pub async fn close(&mut self) {
        if self.sink_closed {
            return;
        }
        self.sink_closed = true;
        if let Err(e) = self.sink.close().await {
            debug!("Close failed: {}", e);
        }
    }
}

/// Records shown at the top of every session
fn banner(nickname: &str) -> Vec<MessageRecord> {
    let mut records = vec![
        MessageRecord::banner(
            format!("termchat v{}", env!("CARGO_PKG_VERSION")),
            Tone::Highlight,
        ),
        MessageRecord::banner("", Tone::Normal),
        MessageRecord::banner(format!("[+] Welcome to the chat, {}!", nickname), Tone::Timestamp),
        MessageRecord::banner("", Tone::Normal),
    ];
    for command in ChatCommand::all() {
        records.push(MessageRecord::banner(
            format!("{} - {}", command, command.description()),
            Tone::Timestamp,
        ));
    }
    records.push(MessageRecord::banner("-".repeat(47), Tone::Normal));
    records
}

pub struct App<B: Backend, S: FrameSink> {
    renderer: Renderer<B>,
    session: ChatSession<S>,
    poll_interval: Duration,
}

impl<B: Backend, S: FrameSink> App<B, S> {
    pub fn new(renderer: Renderer<B>, session: ChatSession<S>, poll_interval: Duration) -> Self {
        Self {
            renderer,
            session,
            poll_interval,
        }
    }

    /// Run the session until the user quits or the channel ends.
    pub async fn run<R>(mut self, source: R) -> io::Result<SessionEnd>
    where
        R: FrameSource + 'static,
    {
        let receiver = self.spawn_receiver(source);
        let result = self.event_loop().await;
        self.shutdown(&receiver).await;
        result
    }

    fn spawn_receiver<R>(&self, source: R) -> JoinHandle<String>
    where
        R: FrameSource + 'static,
    {
        tokio::spawn(receive_loop(source, self.session.state().clone()))
    }

    /// Stop the receive loop and close the channel.
    async fn shutdown(&mut self, receiver: &JoinHandle<String>) {
        receiver.abort();
        self.session.close().await;
    }

    async fn event_loop(&mut self) -> io::Result<SessionEnd> {
        // Drain anything queued while the auth screen was up
        while event::poll(Duration::from_millis(0))? {
            let _ = event::read()?;
        }

        self.session.start().await;

        loop {
            self.tick().await?;

            if !event::poll(self.poll_interval)? {
                continue;
            }
            let key = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                // Resizes are picked up by the size check on the next tick
                _ => continue,
            };

            match self.session.handle_key(key).await {
                Flow::Continue => {}
                Flow::Quit => return Ok(SessionEnd::Quit),
                Flow::Disconnected => {
                    let reason = self
                        .session
                        .state()
                        .lock()
                        .await
                        .end_reason()
                        .unwrap_or("disconnected")
                        .to_string();
                    return Ok(SessionEnd::Closed(reason));
                }
            }
        }
    }

    /// One tick: follow terminal resizes, then redraw if needed. Returns
    /// whether a frame was drawn.
    async fn tick(&mut self) -> io::Result<bool> {
        let (width, height) = self.renderer.viewport()?;
        let mut state = self.session.state.lock().await;
        let force = state.resize(width, height);
        if force {
            debug!("Viewport resized to {}x{}", width, height);
        }
        let frame = ChatFrame {
            nickname: &self.session.identity.display_name,
            input: &self.session.input,
        };
        self.renderer.render(&mut state, &frame, force)
    }
}
