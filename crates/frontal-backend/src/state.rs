use std::sync::Arc;

use frontal_bridge::{config::Config, navigation::Route};
use frontal_media::{
    HttpUriResolver, MediaBackend, MediaSession, UriResolver, headless::HeadlessBackend,
};
use tokio::task::JoinHandle;

use crate::conversation::Conversation;
use crate::providers::{
    auth::{AuthProvider, FirebaseAuth},
    chat::{ChatCompletion, OpenAiChat},
    store::{ProgressStore, SupabaseStore},
};

/// External systems the services delegate to.
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn ProgressStore>,
    pub chat: Arc<dyn ChatCompletion>,
    /// Creates audio and video handles for relaxation sessions.
    pub media_backend: Arc<dyn MediaBackend>,
    pub resolver: Arc<dyn UriResolver>,
}

impl Collaborators {
    /// Builds the hosted providers from configuration, sharing one pooled
    /// HTTP client.
    pub fn from_config(config: &Config, request_client: reqwest::Client) -> Self {
        Self {
            auth: Arc::new(FirebaseAuth::new(request_client.clone(), config.auth.clone())),
            store: Arc::new(SupabaseStore::new(request_client.clone(), config.store.clone())),
            chat: Arc::new(OpenAiChat::new(request_client.clone(), config.chat.clone())),
            media_backend: Arc::new(HeadlessBackend::default()),
            resolver: Arc::new(HttpUriResolver::new(request_client)),
        }
    }
}

/// A mounted relaxation screen.
pub struct RelaxSession {
    pub session: Arc<MediaSession>,
    /// Task forwarding session snapshots to the frontend.
    pub forwarder: JoinHandle<()>,
}

/// The core application state shared by every service handler.
pub struct State {
    /// The loaded application configuration.
    pub config: Config,
    pub collaborators: Collaborators,
    /// Present while the relaxation screen is shown.
    pub relax: Option<RelaxSession>,
    pub conversation: Conversation,
    /// Screen the frontend currently shows.
    pub route: Route,
}

impl State {
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
            relax: None,
            conversation: Conversation::default(),
            route: Route::Home,
        }
    }
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
pub type SharedState = Arc<tokio::sync::RwLock<State>>;
