use crate::catalog::Track;

/// Shown in place of the video when its track could not be resolved.
pub const VIDEO_UNAVAILABLE_TEXT: &str =
    "Scene unavailable: unable to load remote video. Try a different scene.";
/// Shown under the audio list when the selected track could not be resolved.
pub const AUDIO_UNAVAILABLE_TEXT: &str =
    "Audio unavailable: unable to load remote track. Try a different track.";

/// The two kinds of media a session plays at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => formatter.write_str("audio"),
            MediaKind::Video => formatter.write_str("video"),
        }
    }
}

/// Point-in-time view of a relaxation session, as rendered by the frontend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Id of the selected category.
    pub selected_category: Option<String>,
    pub selected_video: Option<Track>,
    pub selected_audio: Option<Track>,
    pub is_playing: bool,
    /// A resolution or load/unload sequence is in flight. Play/pause is
    /// disabled while this is set.
    pub is_loading: bool,
    /// Resolved location of the active video, if any.
    pub video_uri: Option<String>,
    pub video_unavailable: bool,
    /// Resolved location of the active audio track, if any.
    pub audio_uri: Option<String>,
    pub audio_unavailable: bool,
}

impl SessionSnapshot {
    /// Whether the play/pause control should accept input.
    pub fn can_toggle(&self) -> bool {
        !self.is_loading
    }

    /// User-facing fallback texts for every unavailable media kind.
    pub fn unavailable_messages(&self) -> Vec<&'static str> {
        let mut messages = Vec::new();
        if self.video_unavailable {
            messages.push(VIDEO_UNAVAILABLE_TEXT);
        }
        if self.audio_unavailable {
            messages.push(AUDIO_UNAVAILABLE_TEXT);
        }
        messages
    }
}
