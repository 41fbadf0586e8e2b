//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, shared state, and the message
//! dispatch loop that listens to frontend bridge requests.

use std::{sync::Arc, thread};

use frontal_bridge::{MessageFromBackend, MessageToBackend, config::Config};
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::app::AppContext;
use crate::state::{Collaborators, State};

/// Initialize backend state and start processing frontend messages.
async fn setup_backend(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    let config = match crate::config::load_config().await {
        Ok(config) => config,
        Err(error) => {
            log::error!("Failed to load config, using defaults: {error}");
            Config::default()
        }
    };

    let request_client = reqwest::Client::new();
    let collaborators = Collaborators::from_config(&config, request_client);
    let state = Arc::new(RwLock::new(State::new(config, collaborators)));

    let context = Arc::new(AppContext { state, tx });
    let auth_listener = tokio::spawn(crate::services::auth_service::forward_auth_state(
        context.clone(),
    ));

    context.consume_bridge_messages(rx).await;

    // the frontend is gone, release media before the runtime shuts down
    auth_listener.abort();
    crate::services::media_service::handle_close_session(context).await;
}

/// Spawn the backend runtime and begin processing bridge messages.
///
/// Returns the handle of the backend thread, which finishes once the
/// frontend drops its sender.
pub fn run(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(error) => {
                log::error!("Failed to build the backend runtime: {error}");
                return;
            }
        };
        runtime.block_on(async { setup_backend(rx, tx).await });
    })
}
