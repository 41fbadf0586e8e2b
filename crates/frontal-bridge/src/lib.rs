//! Communication bridge between frontend and backend.
//!
//! This crate defines the types and protocols used to connect a frontend
//! (the console in `frontal-frontend`, or any other presentation layer)
//! with the asynchronous backend that owns the relaxation media session, the
//! authentication state, the progress store and the chat conversation.
//!
//! The flow is unidirectional on each side:
//! - The frontend sends commands (select a track, toggle playback, sign in,
//!   send a chat message).
//! - The backend pushes events (session snapshots, auth changes, chat
//!   history, notifications).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`].

pub mod auth;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod navigation;
pub mod notification;
pub mod progress;
pub mod session;

use tokio::sync::mpsc::{self, Receiver, Sender};

/// Messages emitted by the backend to inform the frontend of state updates.
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// Generic message for all notifications in the application.
    NotificationMessage(notification::NotificationMessage),
    /// Response to the configuration request from the frontend.
    ConfigurationResponse(config::Config),
    /// A new view of the relaxation session. Sent on every change while the
    /// session is open.
    SessionStateUpdate(session::SessionSnapshot),
    /// The relaxation session was torn down and all handles were released.
    SessionClosed,
    /// The signed-in user changed. `None` means signed out.
    AuthStateChanged(Option<auth::User>),
    /// Full conversation after a change, plus whether a reply is pending.
    ChatHistoryUpdate {
        messages: Vec<chat::ChatMessage>,
        pending: bool,
    },
    /// Progress records matching the last query.
    ProgressResponse(Vec<progress::ProgressRecord>),
    /// The route the frontend should display.
    NavigationResponse(navigation::Route),
}

/// Commands issued by the frontend to control or query the backend.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Mount the relaxation screen and create a new media session.
    OpenRelaxSession,
    /// Unmount the relaxation screen, releasing every media handle.
    CloseRelaxSession,
    /// Select a category by id. Also selects its first video.
    SelectCategory(String),
    /// Select a video track of the current category by id.
    SelectVideo(String),
    /// Select an audio track by id.
    SelectAudio(String),
    TogglePlayback,
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
    },
    ResetPassword {
        email: String,
    },
    SignOut,
    /// Store today's progress for the signed-in user.
    SaveProgress(progress::ProgressInput),
    ProgressForDateRequest(chrono::NaiveDate),
    ProgressHistoryRequest,
    SendChatMessage(String),
    Navigate(navigation::Route),
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// frontend and backend.
pub struct BridgeChannels {
    /// Receiver used by the frontend to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the frontend to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the frontend.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the frontend.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
