use std::fmt::Write;

use frontal_bridge::{
    MessageFromBackend,
    chat::{ChatMessage, ChatRole},
    config::Config,
    progress::ProgressRecord,
    session::SessionSnapshot,
};

fn track_label(track: Option<&frontal_bridge::catalog::Track>) -> &str {
    track.map(|track| track.title.as_str()).unwrap_or("none")
}

/// One-line summary of a session, followed by any fallback messages.
pub fn format_snapshot(snapshot: &SessionSnapshot) -> String {
    let state = if snapshot.is_loading {
        "loading"
    } else if snapshot.is_playing {
        "playing"
    } else {
        "paused"
    };

    let mut out = format!(
        "[relax] {state} | category: {} | scene: {} | audio: {}",
        snapshot.selected_category.as_deref().unwrap_or("none"),
        track_label(snapshot.selected_video.as_ref()),
        track_label(snapshot.selected_audio.as_ref()),
    );
    for message in snapshot.unavailable_messages() {
        let _ = write!(out, "\n  ! {message}");
    }
    out
}

pub fn format_progress(records: &[ProgressRecord]) -> String {
    if records.is_empty() {
        return "[progress] no records".to_string();
    }

    let mut out = String::from("[progress]");
    for record in records {
        let _ = write!(
            out,
            "\n  {}  {:>6} steps  {:>4.1} h  {}",
            record.date, record.steps, record.hours_slept, record.sleep_quality
        );
    }
    out
}

/// Only the newest message is shown, the rest was printed before.
pub fn format_chat(messages: &[ChatMessage], pending: bool) -> Option<String> {
    if pending {
        return Some("[chat] typing...".to_string());
    }
    let message = messages.last()?;
    let speaker = match message.role {
        ChatRole::Assistant => "friend",
        ChatRole::User => "you",
        ChatRole::System => return None,
    };
    Some(format!("[chat] {speaker}: {}", message.content))
}

pub fn format_config(config: &Config) -> String {
    let mut out = String::from("[config]");
    let _ = write!(
        out,
        "\n  resolve timeout: {} ms\n  pause on scene change: {}",
        config.media.resolve_timeout_ms, config.media.pause_on_video_change
    );
    for category in &config.media.catalog.categories {
        let videos: Vec<&str> = category.videos.iter().map(|video| video.id.as_str()).collect();
        let _ = write!(out, "\n  category {}: {}", category.id, videos.join(", "));
    }
    let audio: Vec<&str> = config
        .media
        .catalog
        .audio_tracks
        .iter()
        .map(|track| track.id.as_str())
        .collect();
    let _ = write!(out, "\n  audio: {}", audio.join(", "));
    let _ = write!(
        out,
        "\n  auth: {}\n  store: {}\n  chat model: {}",
        configured(config.auth.api_key.is_some()),
        configured(config.store.url.is_some()),
        config.chat.model
    );
    out
}

fn configured(value: bool) -> &'static str {
    if value { "configured" } else { "not configured" }
}

/// Renders a backend event for the console.
pub fn format_message(message: &MessageFromBackend) -> Option<String> {
    match message {
        MessageFromBackend::NotificationMessage(notification) => Some(notification.to_string()),
        MessageFromBackend::ConfigurationResponse(config) => Some(format_config(config)),
        MessageFromBackend::SessionStateUpdate(snapshot) => Some(format_snapshot(snapshot)),
        MessageFromBackend::SessionClosed => Some("[relax] closed".to_string()),
        MessageFromBackend::AuthStateChanged(Some(user)) => {
            Some(format!("[auth] signed in as {}", user.email))
        }
        MessageFromBackend::AuthStateChanged(None) => Some("[auth] signed out".to_string()),
        MessageFromBackend::ChatHistoryUpdate { messages, pending } => {
            format_chat(messages, *pending)
        }
        MessageFromBackend::ProgressResponse(records) => Some(format_progress(records)),
        MessageFromBackend::NavigationResponse(route) => Some(format!("[screen] {route}")),
    }
}
