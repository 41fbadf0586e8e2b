use std::sync::Arc;

use frontal_bridge::{
    MessageFromBackend, notification::NotificationType, session::SessionSnapshot,
};
use frontal_media::{MediaSession, PendingSwitch, SessionOptions};
use tokio::{
    sync::{mpsc::Sender, watch},
    task::JoinHandle,
};

use crate::state::RelaxSession;

const NO_SESSION_TEXT: &str = "Open the relaxation screen first.";

/// Forwards every snapshot of a session to the frontend, starting with the
/// current one.
async fn forward_snapshots(
    mut snapshots: watch::Receiver<SessionSnapshot>,
    tx: Sender<MessageFromBackend>,
) {
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        if tx
            .send(MessageFromBackend::SessionStateUpdate(snapshot))
            .await
            .is_err()
        {
            break;
        }
        if snapshots.changed().await.is_err() {
            break;
        }
    }
    log::debug!("Session snapshot forwarder stopped");
}

async fn current_session(context: &super::AppContextHandle) -> Option<Arc<MediaSession>> {
    let session = {
        let state = context.state.read().await;
        state.relax.as_ref().map(|relax| relax.session.clone())
    };
    if session.is_none() {
        context
            .send_notification(NotificationType::Warning, NO_SESSION_TEXT)
            .await;
    }
    session
}

/// Handles [`frontal_bridge::MessageToBackend::OpenRelaxSession`]: creates a
/// media session from the configured catalog and loads its default tracks.
pub async fn handle_open_session(context: super::AppContextHandle) {
    let session = {
        let mut state = context.state.write().await;
        if let Some(relax) = state.relax.as_ref() {
            log::debug!("Relaxation session is already open");
            let snapshot = relax.session.snapshot();
            drop(state);
            context
                .send(MessageFromBackend::SessionStateUpdate(snapshot))
                .await;
            return;
        }

        let media = &state.config.media;
        let session = Arc::new(MediaSession::new(
            media.catalog.clone(),
            state.collaborators.media_backend.clone(),
            state.collaborators.resolver.clone(),
            SessionOptions::from(media),
        ));
        let forwarder = tokio::spawn(forward_snapshots(session.subscribe(), context.tx.clone()));
        state.relax = Some(RelaxSession {
            session: session.clone(),
            forwarder,
        });
        session
    };

    if session.catalog().is_empty() {
        context
            .send_notification(NotificationType::Warning, "The media catalog is empty.")
            .await;
    }

    // tokens are taken here so selections dispatched after this message
    // always supersede the default tracks
    for switch in session.begin_mount() {
        spawn_switch(session.clone(), switch);
    }
}

/// Runs the slow part of a begun switch on its own task. Closing the
/// screen meanwhile leaves nothing behind, the session discards switches
/// that outlive it.
fn spawn_switch(session: Arc<MediaSession>, switch: PendingSwitch) -> JoinHandle<()> {
    tokio::spawn(async move { session.complete(switch).await })
}

/// Handles [`frontal_bridge::MessageToBackend::CloseRelaxSession`].
pub async fn handle_close_session(context: super::AppContextHandle) {
    let relax = {
        let mut state = context.state.write().await;
        state.relax.take()
    };
    let Some(relax) = relax else {
        log::debug!("No relaxation session to close");
        return;
    };

    relax.forwarder.abort();
    relax.session.teardown().await;
    context.send(MessageFromBackend::SessionClosed).await;
}

/// Selects a category and its first video. The selection takes effect in
/// message order, and loading continues on the returned task.
pub async fn handle_select_category(
    context: super::AppContextHandle,
    id: String,
) -> Option<JoinHandle<()>> {
    let session = current_session(&context).await?;
    let Some(category) = session.catalog().category(&id) else {
        context
            .send_notification(
                NotificationType::Warning,
                format!("Unknown category \"{id}\"."),
            )
            .await;
        return None;
    };
    let switch = session.begin_category(category)?;
    Some(spawn_switch(session, switch))
}

/// Selects a video of the currently selected category.
pub async fn handle_select_video(
    context: super::AppContextHandle,
    id: String,
) -> Option<JoinHandle<()>> {
    let session = current_session(&context).await?;
    let track = session
        .snapshot()
        .selected_category
        .and_then(|category| session.catalog().category(&category))
        .and_then(|category| category.video(&id))
        .cloned();
    let Some(track) = track else {
        context
            .send_notification(
                NotificationType::Warning,
                format!("No video \"{id}\" in the selected category."),
            )
            .await;
        return None;
    };
    let switch = session.begin_video(track)?;
    Some(spawn_switch(session, switch))
}

pub async fn handle_select_audio(
    context: super::AppContextHandle,
    id: String,
) -> Option<JoinHandle<()>> {
    let session = current_session(&context).await?;
    let Some(track) = session.catalog().audio_track(&id).cloned() else {
        context
            .send_notification(
                NotificationType::Warning,
                format!("Unknown audio track \"{id}\"."),
            )
            .await;
        return None;
    };
    let switch = session.begin_audio(track)?;
    Some(spawn_switch(session, switch))
}

pub async fn handle_toggle_playback(context: super::AppContextHandle) {
    let Some(session) = current_session(&context).await else {
        return;
    };
    if !session.toggle_play_pause().await {
        context
            .send_notification(NotificationType::Info, "Media is still loading.")
            .await;
    }
}
