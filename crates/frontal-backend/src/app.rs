//! Application context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! responses and notifications back to the frontend bridge.

use std::sync::Arc;

use frontal_bridge::{
    MessageFromBackend, MessageToBackend,
    notification::{NotificationMessage, NotificationType},
};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::services;
use crate::state::SharedState;

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Mutable runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the frontend bridge.
    pub tx: Sender<MessageFromBackend>,
}

impl AppContext {
    /// Read and dispatch messages from the frontend bridge until it closes.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a frontend message: {}", describe(&message));
            self.dispatch_message(message).await;
        }
        log::info!("Frontend bridge closed");
    }

    /// Dispatches the received message from frontend down to individual
    /// service handlers.
    ///
    /// Track selections are ordered here and then load on their own tasks,
    /// so a slow resolution never blocks the loop and overlapping
    /// selections really overlap. Chat completions run on their own tasks.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        use services::{
            auth_service, chat_service, config_service, media_service, navigation_service,
            progress_service,
        };

        match message {
            MessageToBackend::ConfigurationRequest => {
                config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::OpenRelaxSession => {
                media_service::handle_open_session(self.clone()).await;
            }
            MessageToBackend::CloseRelaxSession => {
                media_service::handle_close_session(self.clone()).await;
            }
            // selections take their place in line here, loading continues
            // on spawned tasks
            MessageToBackend::SelectCategory(id) => {
                media_service::handle_select_category(self.clone(), id).await;
            }
            MessageToBackend::SelectVideo(id) => {
                media_service::handle_select_video(self.clone(), id).await;
            }
            MessageToBackend::SelectAudio(id) => {
                media_service::handle_select_audio(self.clone(), id).await;
            }
            MessageToBackend::TogglePlayback => {
                media_service::handle_toggle_playback(self.clone()).await;
            }
            MessageToBackend::SignIn { email, password } => {
                auth_service::handle_sign_in(self.clone(), email, password).await;
            }
            MessageToBackend::SignUp { email, password } => {
                auth_service::handle_sign_up(self.clone(), email, password).await;
            }
            MessageToBackend::ResetPassword { email } => {
                auth_service::handle_reset_password(self.clone(), email).await;
            }
            MessageToBackend::SignOut => {
                auth_service::handle_sign_out(self.clone()).await;
            }
            MessageToBackend::SaveProgress(input) => {
                progress_service::handle_save_progress(self.clone(), input).await;
            }
            MessageToBackend::ProgressForDateRequest(date) => {
                progress_service::handle_progress_for_date(self.clone(), date).await;
            }
            MessageToBackend::ProgressHistoryRequest => {
                progress_service::handle_progress_history(self.clone()).await;
            }
            MessageToBackend::SendChatMessage(text) => {
                tokio::spawn(chat_service::handle_send_message(self.clone(), text));
            }
            MessageToBackend::Navigate(route) => {
                navigation_service::handle_navigate(self.clone(), route).await;
            }
        }
    }

    /// Send a message to the frontend bridge.
    pub async fn send(&self, message: MessageFromBackend) {
        if self.tx.send(message).await.is_err() {
            log::warn!("Frontend is gone, dropping a backend message");
        }
    }

    /// Send a notification message to the frontend bridge.
    pub async fn send_notification(
        &self,
        notification_type: NotificationType,
        content: impl Into<String>,
    ) {
        self.send(MessageFromBackend::NotificationMessage(
            NotificationMessage::new(notification_type, content),
        ))
        .await;
    }
}

/// Debug view of a frontend message with credentials masked.
fn describe(message: &MessageToBackend) -> String {
    match message {
        MessageToBackend::SignIn { email, .. } => format!("SignIn {{ email: {email:?}, .. }}"),
        MessageToBackend::SignUp { email, .. } => format!("SignUp {{ email: {email:?}, .. }}"),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::services::test_support::Harness;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_last_dispatched_selection_wins() {
        for _ in 0..50 {
            let harness = Harness::new();
            let context = harness.context.clone();
            context.dispatch_message(MessageToBackend::OpenRelaxSession).await;
            context
                .dispatch_message(MessageToBackend::SelectAudio("ocean".into()))
                .await;
            context
                .dispatch_message(MessageToBackend::SelectAudio("piano".into()))
                .await;

            let session = {
                let state = context.state.read().await;
                state.relax.as_ref().unwrap().session.clone()
            };
            let snapshot = session
                .subscribe()
                .wait_for(|snapshot| !snapshot.is_loading)
                .await
                .unwrap()
                .clone();
            assert_eq!(snapshot.selected_audio.unwrap().id, "piano");
            assert!(snapshot.audio_uri.unwrap().contains("piano"));
        }
    }

    #[test]
    fn test_passwords_are_not_logged() {
        let line = describe(&MessageToBackend::SignIn {
            email: "calm@frontal.app".into(),
            password: "hunter22".into(),
        });
        assert!(line.contains("calm@frontal.app"));
        assert!(!line.contains("hunter22"));
    }
}
