//! The media session controller.
//!
//! A [`MediaSession`] lives for one visit of the relaxation screen. Every
//! track switch follows the same sequence:
//!
//! 1. Issue a new generation token for the media kind and mark it loading.
//! 2. Release the current handle of that kind.
//! 3. Resolve the new track's location (bounded by a timeout).
//! 4. If the token is still the latest one, load and install the new handle.
//!    Otherwise drop the result.
//!
//! Step 1 is synchronous ([`MediaSession::begin_video`] and friends), so a
//! caller that begins selections in the order the user made them gets that
//! order, even when the remaining steps run on different tasks.
//!
//! The handle slot of each kind sits behind an async mutex that is held
//! across release and load, so two handles of the same kind are never
//! loaded at the same time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use frontal_bridge::{
    catalog::{Category, MediaCatalog, Track},
    config::MediaConfig,
    session::{MediaKind, SessionSnapshot},
};
use tokio::sync::watch;

use crate::handle::{
    AudioLoadOptions, HandleSlot, MediaBackend, VideoLoadOptions, release_handle,
};
use crate::resolver::{UriResolver, resolve_uri};

/// Tunables of a session, usually taken from [`MediaConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Upper bound for a single location resolution.
    pub resolve_timeout: Duration,
    /// Pause playback whenever the video scene changes.
    pub pause_on_video_change: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_millis(3000),
            pause_on_video_change: false,
        }
    }
}

impl From<&MediaConfig> for SessionOptions {
    fn from(config: &MediaConfig) -> Self {
        Self {
            resolve_timeout: Duration::from_millis(config.resolve_timeout_ms),
            pause_on_video_change: config.pause_on_video_change,
        }
    }
}

/// A selection that holds its generation token but has not been loaded.
#[derive(Debug)]
#[must_use = "a begun switch does nothing until it is completed"]
pub struct PendingSwitch {
    kind: MediaKind,
    generation: u64,
    track: Track,
    /// Play intent was dropped by the selection and must reach the handles.
    pause_first: bool,
}

impl PendingSwitch {
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn track(&self) -> &Track {
        &self.track
    }
}

/// Per-kind progress of the latest switch.
#[derive(Debug, Default)]
struct MediaProgress {
    /// Token of the latest switch. Results carrying an older token are stale.
    generation: u64,
    loading: bool,
    resolved_uri: Option<String>,
    unavailable: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    selected_category: Option<String>,
    selected_video: Option<Track>,
    selected_audio: Option<Track>,
    is_playing: bool,
    video: MediaProgress,
    audio: MediaProgress,
    closed: bool,
}

impl SessionState {
    fn media(&mut self, kind: MediaKind) -> &mut MediaProgress {
        match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        }
    }

    fn is_current(&self, kind: MediaKind, generation: u64) -> bool {
        let media = match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        };
        !self.closed && media.generation == generation
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            selected_category: self.selected_category.clone(),
            selected_video: self.selected_video.clone(),
            selected_audio: self.selected_audio.clone(),
            is_playing: self.is_playing,
            is_loading: self.video.loading || self.audio.loading,
            video_uri: self.video.resolved_uri.clone(),
            video_unavailable: self.video.unavailable,
            audio_uri: self.audio.resolved_uri.clone(),
            audio_unavailable: self.audio.unavailable,
        }
    }
}

/// Owns one audio handle and one video handle and keeps them in line with
/// the user's selection and play intent.
pub struct MediaSession {
    catalog: MediaCatalog,
    backend: Arc<dyn MediaBackend>,
    resolver: Arc<dyn UriResolver>,
    options: SessionOptions,
    state: Mutex<SessionState>,
    audio: tokio::sync::Mutex<HandleSlot>,
    video: tokio::sync::Mutex<HandleSlot>,
    /// Play intent observed by video renderers.
    playing: watch::Sender<bool>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl MediaSession {
    /// Creates a session selecting the first category, its first video and
    /// the first audio track. Nothing is loaded until [`MediaSession::mount`].
    pub fn new(
        catalog: MediaCatalog,
        backend: Arc<dyn MediaBackend>,
        resolver: Arc<dyn UriResolver>,
        options: SessionOptions,
    ) -> Self {
        let first_category = catalog.categories.first();
        let state = SessionState {
            selected_category: first_category.map(|category| category.id.clone()),
            selected_video: first_category
                .and_then(Category::first_video)
                .cloned(),
            selected_audio: catalog.audio_tracks.first().cloned(),
            ..SessionState::default()
        };
        let (snapshots, _) = watch::channel(state.snapshot());
        let (playing, _) = watch::channel(false);

        Self {
            catalog,
            backend,
            resolver,
            options,
            state: Mutex::new(state),
            audio: tokio::sync::Mutex::new(HandleSlot::new(MediaKind::Audio)),
            video: tokio::sync::Mutex::new(HandleSlot::new(MediaKind::Video)),
            playing,
            snapshots,
        }
    }

    /// Resolves and loads the initially selected video and audio track.
    pub async fn mount(&self) {
        let switches = self.begin_mount();
        futures_util::future::join_all(switches.into_iter().map(|switch| self.complete(switch)))
            .await;
    }

    /// Takes the generation tokens for the initial video and audio track.
    /// Complete the returned switches with [`MediaSession::complete`].
    pub fn begin_mount(&self) -> Vec<PendingSwitch> {
        let (video, audio) = {
            let state = self.lock_state();
            (state.selected_video.clone(), state.selected_audio.clone())
        };
        log::info!(
            "Mounting media session with video {:?} and audio {:?}",
            video.as_ref().map(|track| &track.id),
            audio.as_ref().map(|track| &track.id),
        );

        let video = video.and_then(|video| self.begin_video(video));
        let audio = audio.and_then(|audio| self.begin_audio(audio));
        video.into_iter().chain(audio).collect()
    }

    pub fn catalog(&self) -> &MediaCatalog {
        &self.catalog
    }

    /// Current view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    /// Receives a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// Switches the background scene.
    pub async fn select_video(&self, track: Track) {
        if let Some(switch) = self.begin_video(track) {
            self.complete(switch).await;
        }
    }

    /// Switches the audio track. Playback continues in the new track when the
    /// session was playing.
    pub async fn select_audio(&self, track: Track) {
        if let Some(switch) = self.begin_audio(track) {
            self.complete(switch).await;
        }
    }

    /// Selects a category and, when it has any, its first video.
    pub async fn select_category(&self, category: &Category) {
        if let Some(switch) = self.begin_category(category) {
            self.complete(switch).await;
        }
    }

    /// Records a video selection and takes its generation token without
    /// waiting for anything. Selections begun later always win over this
    /// one, whatever order their switches complete in.
    pub fn begin_video(&self, track: Track) -> Option<PendingSwitch> {
        let pause_on_change = self.options.pause_on_video_change;
        let (generation, pause_first) = self.begin_switch(MediaKind::Video, |state| {
            state.selected_video = Some(track.clone());
            let paused = pause_on_change && state.is_playing;
            if paused {
                state.is_playing = false;
            }
            paused
        })?;
        log::info!("Selecting video {} (generation {generation})", track.id);

        Some(PendingSwitch {
            kind: MediaKind::Video,
            generation,
            track,
            pause_first,
        })
    }

    /// Audio counterpart of [`MediaSession::begin_video`].
    pub fn begin_audio(&self, track: Track) -> Option<PendingSwitch> {
        let (generation, ()) = self.begin_switch(MediaKind::Audio, |state| {
            state.selected_audio = Some(track.clone());
        })?;
        log::info!("Selecting audio {} (generation {generation})", track.id);

        Some(PendingSwitch {
            kind: MediaKind::Audio,
            generation,
            track,
            pause_first: false,
        })
    }

    /// Records the category and begins a switch to its first video. Returns
    /// `None` when the session is closed or the category has no videos.
    pub fn begin_category(&self, category: &Category) -> Option<PendingSwitch> {
        {
            let mut state = self.lock_state();
            if state.closed {
                log::debug!("Ignoring category {} on a closed session", category.id);
                return None;
            }
            state.selected_category = Some(category.id.clone());
            self.publish(&state);
        }

        match category.first_video() {
            Some(video) => self.begin_video(video.clone()),
            None => {
                log::debug!("Category {} has no videos", category.id);
                None
            }
        }
    }

    /// Releases, resolves and loads for a begun switch. A switch that has
    /// been superseded in the meantime changes nothing.
    pub async fn complete(&self, switch: PendingSwitch) {
        if switch.pause_first {
            self.apply_play_intent(false).await;
        }
        self.switch(switch.kind, switch.generation, &switch.track).await;
    }

    /// Flips the play intent. Returns `false` without doing anything while a
    /// switch is loading or after teardown.
    pub async fn toggle_play_pause(&self) -> bool {
        let playing = {
            let mut state = self.lock_state();
            let snapshot = state.snapshot();
            if state.closed || snapshot.is_loading {
                log::debug!("Ignoring play/pause while loading or closed");
                return false;
            }
            state.is_playing = !state.is_playing;
            self.publish(&state);
            state.is_playing
        };

        self.apply_play_intent(playing).await;
        true
    }

    /// Stops and releases both handles. Safe to call any number of times.
    pub async fn teardown(&self) {
        {
            let mut state = self.lock_state();
            if !state.closed {
                log::info!("Tearing down media session");
            }
            state.closed = true;
            state.is_playing = false;
            for kind in [MediaKind::Audio, MediaKind::Video] {
                let media = state.media(kind);
                // invalidates every switch still in flight
                media.generation += 1;
                media.loading = false;
            }
            self.publish(&state);
        }
        self.playing.send_replace(false);

        let (mut video, mut audio) =
            futures_util::future::join(self.video.lock(), self.audio.lock()).await;
        futures_util::future::join(video.release(), audio.release()).await;
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn is_playing(&self) -> bool {
        self.lock_state().is_playing
    }

    fn slot(&self, kind: MediaKind) -> &tokio::sync::Mutex<HandleSlot> {
        match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        }
    }

    /// Issues a new generation token for `kind`, applies the selection
    /// change and marks the kind as loading. Returns `None` once the session
    /// is closed.
    fn begin_switch<R>(
        &self,
        kind: MediaKind,
        select: impl FnOnce(&mut SessionState) -> R,
    ) -> Option<(u64, R)> {
        let mut state = self.lock_state();
        if state.closed {
            log::debug!("Ignoring {kind} selection on a closed session");
            return None;
        }

        let selected = select(&mut state);
        let media = state.media(kind);
        media.generation += 1;
        media.loading = true;
        media.resolved_uri = None;
        media.unavailable = false;
        let generation = media.generation;
        self.publish(&state);
        Some((generation, selected))
    }

    /// Records the outcome of a switch. Returns `false` and changes nothing
    /// if the switch is no longer the latest one.
    fn finish_switch(&self, kind: MediaKind, generation: u64, resolved: Option<String>) -> bool {
        let mut state = self.lock_state();
        if !state.is_current(kind, generation) {
            return false;
        }

        let media = state.media(kind);
        media.loading = false;
        media.unavailable = resolved.is_none();
        media.resolved_uri = resolved;
        self.publish(&state);
        true
    }

    async fn switch(&self, kind: MediaKind, generation: u64, track: &Track) {
        {
            let mut slot = self.slot(kind).lock().await;
            // a superseded switch must not release the newer switch's handle
            if !self.lock_state().is_current(kind, generation) {
                log::debug!("Skipping superseded {kind} switch to {}", track.id);
                return;
            }
            slot.release().await;
        }

        let resolved = resolve_uri(
            self.resolver.as_ref(),
            &track.uri,
            self.options.resolve_timeout,
            None,
        )
        .await;

        let mut slot = self.slot(kind).lock().await;
        if !self.lock_state().is_current(kind, generation) {
            log::debug!("Dropping stale {kind} resolution for {}", track.id);
            return;
        }

        let Some(uri) = resolved else {
            log::warn!("{kind} track {} is unavailable", track.id);
            self.finish_switch(kind, generation, None);
            return;
        };

        let should_play = self.is_playing();
        let loaded = match kind {
            MediaKind::Audio => {
                let options = AudioLoadOptions {
                    looping: true,
                    should_play,
                };
                self.backend.load_audio(&uri, options).await
            }
            MediaKind::Video => {
                let options = VideoLoadOptions {
                    looping: true,
                    muted: true,
                    playing: self.playing.subscribe(),
                };
                self.backend.load_video(&uri, options).await
            }
        };

        let mut handle = match loaded {
            Ok(handle) => handle,
            Err(error) => {
                log::error!("Failed to load {kind} track {}: {error}", track.id);
                self.finish_switch(kind, generation, None);
                return;
            }
        };

        if !self.finish_switch(kind, generation, Some(uri)) {
            log::debug!("Discarding stale {kind} handle for {}", track.id);
            release_handle(kind, handle).await;
            return;
        }

        // play intent may have changed while the handle was loading
        if kind == MediaKind::Audio {
            let playing = self.is_playing();
            if playing != should_play {
                let synced = if playing {
                    handle.play().await
                } else {
                    handle.pause().await
                };
                if let Err(error) = synced {
                    log::error!("Failed to sync play state of {}: {error}", track.id);
                }
            }
        }

        if let Err(rejected) = slot.install(handle) {
            log::error!("{kind} slot was occupied, releasing the new handle");
            release_handle(kind, rejected).await;
        }
    }

    /// Publishes the play intent to video renderers and applies it to the
    /// live audio handle.
    async fn apply_play_intent(&self, playing: bool) {
        self.playing.send_replace(playing);

        let mut slot = self.audio.lock().await;
        let Some(handle) = slot.handle_mut() else {
            return;
        };
        let result = if playing {
            handle.play().await
        } else {
            handle.pause().await
        };
        if let Err(error) = result {
            log::error!("Failed to apply play state to {}: {error}", handle.uri());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::future::Future;
    use std::pin::Pin;

    use async_trait::async_trait;
    use tokio::sync::{Notify, mpsc};

    use crate::headless::HeadlessBackend;
    use crate::resolver::ResolveError;

    /// Resolver with scripted answers: gated locations wait for a release,
    /// unreachable ones never answer, delayed ones sleep first.
    #[derive(Default)]
    struct ScriptedResolver {
        gates: HashMap<String, Arc<Notify>>,
        unreachable: HashSet<String>,
        delays: HashMap<String, Duration>,
        probes: Option<mpsc::UnboundedSender<String>>,
    }

    impl ScriptedResolver {
        fn gate(mut self, uri: &str) -> Self {
            self.gates.insert(uri.into(), Arc::new(Notify::new()));
            self
        }

        fn unreachable(mut self, uri: &str) -> Self {
            self.unreachable.insert(uri.into());
            self
        }

        fn delay(mut self, uri: &str, millis: u64) -> Self {
            self.delays.insert(uri.into(), Duration::from_millis(millis));
            self
        }

        fn reporting(mut self) -> (Self, mpsc::UnboundedReceiver<String>) {
            let (tx, rx) = mpsc::unbounded_channel();
            self.probes = Some(tx);
            (self, rx)
        }

        fn release(&self, uri: &str) {
            self.gates[uri].notify_one();
        }
    }

    #[async_trait]
    impl UriResolver for ScriptedResolver {
        async fn probe(&self, candidate: &str) -> Result<String, ResolveError> {
            if let Some(probes) = &self.probes {
                let _ = probes.send(candidate.to_string());
            }
            if self.unreachable.contains(candidate) {
                std::future::pending::<()>().await;
            }
            if let Some(delay) = self.delays.get(candidate) {
                tokio::time::sleep(*delay).await;
            }
            if let Some(gate) = self.gates.get(candidate) {
                gate.notified().await;
            }
            Ok(candidate.to_string())
        }
    }

    fn catalog() -> MediaCatalog {
        MediaCatalog {
            categories: vec![
                Category {
                    id: "nature".into(),
                    label: "Nature".into(),
                    videos: vec![
                        Track::new("beach", "Beach", "https://cdn.test/beach.mp4"),
                        Track::new("forest", "Forest", "https://cdn.test/forest.mp4"),
                    ],
                },
                Category {
                    id: "empty".into(),
                    label: "Empty".into(),
                    videos: Vec::new(),
                },
            ],
            audio_tracks: vec![
                Track::new("rain", "Rain", "https://cdn.test/rain.mp3"),
                Track::new("silence", "Silence", "https://cdn.test/silence.mp3"),
            ],
        }
    }

    fn track(id: &str) -> Track {
        let catalog = catalog();
        catalog
            .video(id)
            .or_else(|| catalog.audio_track(id))
            .cloned()
            .unwrap()
    }

    fn session(backend: &HeadlessBackend, resolver: ScriptedResolver) -> Arc<MediaSession> {
        Arc::new(MediaSession::new(
            catalog(),
            Arc::new(backend.clone()),
            Arc::new(resolver),
            SessionOptions::default(),
        ))
    }

    #[tokio::test]
    async fn test_mount_loads_first_video_and_audio() {
        let backend = HeadlessBackend::default();
        let session = session(&backend, ScriptedResolver::default());
        session.mount().await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.selected_category.as_deref(), Some("nature"));
        assert_eq!(snapshot.video_uri.as_deref(), Some("https://cdn.test/beach.mp4"));
        assert_eq!(snapshot.audio_uri.as_deref(), Some("https://cdn.test/rain.mp3"));
        assert!(!snapshot.is_loading);
        assert!(!snapshot.is_playing);
        assert_eq!(backend.live(MediaKind::Video), vec!["https://cdn.test/beach.mp4"]);
        assert_eq!(backend.live(MediaKind::Audio), vec!["https://cdn.test/rain.mp3"]);
        assert!(backend.playing().is_empty());
    }

    #[tokio::test]
    async fn test_audio_switch_keeps_playing() {
        let backend = HeadlessBackend::default();
        let session = session(&backend, ScriptedResolver::default());
        session.mount().await;
        assert!(session.toggle_play_pause().await);
        assert!(backend.playing().contains(&"https://cdn.test/rain.mp3".to_string()));

        session.select_audio(track("silence")).await;

        let snapshot = session.snapshot();
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.selected_audio.unwrap().id, "silence");
        assert_eq!(backend.live(MediaKind::Audio), vec!["https://cdn.test/silence.mp3"]);
        let playing = backend.playing();
        assert!(playing.contains(&"https://cdn.test/silence.mp3".to_string()));
        assert!(!playing.contains(&"https://cdn.test/rain.mp3".to_string()));
        assert!(backend.peak(MediaKind::Audio) <= 1);
    }

    #[tokio::test]
    async fn test_video_switch_keeps_intent_and_releases_old_scene() {
        let backend = HeadlessBackend::default();
        let session = session(&backend, ScriptedResolver::default());
        session.mount().await;
        session.toggle_play_pause().await;

        session.select_video(track("forest")).await;

        assert!(session.snapshot().is_playing);
        assert_eq!(backend.live(MediaKind::Video), vec!["https://cdn.test/forest.mp4"]);
        assert!(!backend.playing().contains(&"https://cdn.test/beach.mp4".to_string()));
        assert!(backend.playing().contains(&"https://cdn.test/forest.mp4".to_string()));
    }

    #[tokio::test]
    async fn test_video_switch_can_pause_playback() {
        let backend = HeadlessBackend::default();
        let session = Arc::new(MediaSession::new(
            catalog(),
            Arc::new(backend.clone()),
            Arc::new(ScriptedResolver::default()),
            SessionOptions {
                pause_on_video_change: true,
                ..SessionOptions::default()
            },
        ));
        session.mount().await;
        session.toggle_play_pause().await;

        session.select_video(track("forest")).await;

        assert!(!session.snapshot().is_playing);
        assert!(backend.playing().is_empty());
    }

    #[tokio::test]
    async fn test_late_video_resolution_is_discarded() {
        let (resolver, mut probes) = ScriptedResolver::default()
            .gate("https://cdn.test/forest.mp4")
            .gate("https://cdn.test/beach.mp4")
            .reporting();
        let resolver = Arc::new(resolver);
        let backend = HeadlessBackend::default();
        let session = Arc::new(MediaSession::new(
            catalog(),
            Arc::new(backend.clone()),
            resolver.clone(),
            SessionOptions::default(),
        ));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.select_video(track("forest")).await }
        });
        assert_eq!(probes.recv().await.unwrap(), "https://cdn.test/forest.mp4");

        let second = tokio::spawn({
            let session = session.clone();
            async move { session.select_video(track("beach")).await }
        });
        assert_eq!(probes.recv().await.unwrap(), "https://cdn.test/beach.mp4");
        assert!(session.snapshot().is_loading);

        // the older selection answers last
        resolver.release("https://cdn.test/beach.mp4");
        second.await.unwrap();
        resolver.release("https://cdn.test/forest.mp4");
        first.await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.selected_video.unwrap().id, "beach");
        assert_eq!(snapshot.video_uri.as_deref(), Some("https://cdn.test/beach.mp4"));
        assert!(!snapshot.is_loading);
        assert_eq!(backend.live(MediaKind::Video), vec!["https://cdn.test/beach.mp4"]);
        assert!(backend.peak(MediaKind::Video) <= 1);
    }

    #[tokio::test]
    async fn test_stale_resolution_answering_first_is_discarded() {
        let (resolver, mut probes) = ScriptedResolver::default()
            .gate("https://cdn.test/forest.mp4")
            .gate("https://cdn.test/beach.mp4")
            .reporting();
        let resolver = Arc::new(resolver);
        let backend = HeadlessBackend::default();
        let session = Arc::new(MediaSession::new(
            catalog(),
            Arc::new(backend.clone()),
            resolver.clone(),
            SessionOptions::default(),
        ));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.select_video(track("forest")).await }
        });
        probes.recv().await.unwrap();
        let second = tokio::spawn({
            let session = session.clone();
            async move { session.select_video(track("beach")).await }
        });
        probes.recv().await.unwrap();

        resolver.release("https://cdn.test/forest.mp4");
        first.await.unwrap();
        assert!(backend.live(MediaKind::Video).is_empty());
        assert!(session.snapshot().video_uri.is_none());

        resolver.release("https://cdn.test/beach.mp4");
        second.await.unwrap();
        assert_eq!(
            session.snapshot().video_uri.as_deref(),
            Some("https://cdn.test/beach.mp4")
        );
        assert_eq!(backend.live(MediaKind::Video), vec!["https://cdn.test/beach.mp4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_video_is_marked_unavailable() {
        let backend = HeadlessBackend::default();
        let session = session(
            &backend,
            ScriptedResolver::default().unreachable("https://cdn.test/beach.mp4"),
        );
        session.mount().await;

        let snapshot = session.snapshot();
        assert!(snapshot.video_unavailable);
        assert!(snapshot.video_uri.is_none());
        assert!(!snapshot.is_loading);
        assert!(backend.live(MediaKind::Video).is_empty());
        assert_eq!(snapshot.unavailable_messages().len(), 1);

        assert!(session.toggle_play_pause().await);
        assert!(session.snapshot().is_playing);
        assert!(backend.playing().contains(&"https://cdn.test/rain.mp3".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_audio_leaves_no_handle() {
        let backend = HeadlessBackend::default();
        let session = session(
            &backend,
            ScriptedResolver::default().unreachable("https://cdn.test/silence.mp3"),
        );
        session.mount().await;

        session.select_audio(track("silence")).await;

        let snapshot = session.snapshot();
        assert!(snapshot.audio_unavailable);
        assert!(backend.live(MediaKind::Audio).is_empty());

        // a later explicit selection retries
        session.select_audio(track("rain")).await;
        assert!(!session.snapshot().audio_unavailable);
        assert_eq!(backend.live(MediaKind::Audio), vec!["https://cdn.test/rain.mp3"]);
    }

    #[tokio::test]
    async fn test_toggle_is_ignored_while_loading() {
        let (resolver, mut probes) = ScriptedResolver::default()
            .gate("https://cdn.test/silence.mp3")
            .reporting();
        let resolver = Arc::new(resolver);
        let backend = HeadlessBackend::default();
        let session = Arc::new(MediaSession::new(
            catalog(),
            Arc::new(backend.clone()),
            resolver.clone(),
            SessionOptions::default(),
        ));

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.select_audio(track("silence")).await }
        });
        probes.recv().await.unwrap();

        assert!(!session.toggle_play_pause().await);
        assert!(!session.snapshot().is_playing);

        resolver.release("https://cdn.test/silence.mp3");
        pending.await.unwrap();
        assert!(session.toggle_play_pause().await);
    }

    #[tokio::test]
    async fn test_category_selects_first_video() {
        let backend = HeadlessBackend::default();
        let session = session(&backend, ScriptedResolver::default());
        session.mount().await;
        session.select_video(track("forest")).await;

        let nature = session.catalog().category("nature").cloned().unwrap();
        session.select_category(&nature).await;
        assert_eq!(session.snapshot().selected_video.unwrap().id, "beach");

        let empty = session.catalog().category("empty").cloned().unwrap();
        session.select_category(&empty).await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.selected_category.as_deref(), Some("empty"));
        assert_eq!(snapshot.selected_video.unwrap().id, "beach");
        assert_eq!(backend.live(MediaKind::Video), vec!["https://cdn.test/beach.mp4"]);
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent() {
        let backend = HeadlessBackend::default();
        let session = session(&backend, ScriptedResolver::default());
        session.mount().await;
        session.toggle_play_pause().await;

        session.teardown().await;
        session.teardown().await;
        session.teardown().await;

        assert!(session.is_closed());
        assert!(backend.live(MediaKind::Audio).is_empty());
        assert!(backend.live(MediaKind::Video).is_empty());

        // nothing can be loaded after teardown
        session.select_audio(track("silence")).await;
        assert!(!session.toggle_play_pause().await);
        assert!(backend.live(MediaKind::Audio).is_empty());
    }

    #[tokio::test]
    async fn test_teardown_discards_in_flight_switch() {
        let (resolver, mut probes) = ScriptedResolver::default()
            .gate("https://cdn.test/forest.mp4")
            .reporting();
        let resolver = Arc::new(resolver);
        let backend = HeadlessBackend::default();
        let session = Arc::new(MediaSession::new(
            catalog(),
            Arc::new(backend.clone()),
            resolver.clone(),
            SessionOptions::default(),
        ));

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.select_video(track("forest")).await }
        });
        probes.recv().await.unwrap();
        session.teardown().await;

        resolver.release("https://cdn.test/forest.mp4");
        pending.await.unwrap();
        assert!(backend.live(MediaKind::Video).is_empty());
        assert!(session.snapshot().video_uri.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_switches_never_hold_two_handles() {
        let resolver = ScriptedResolver::default()
            .delay("https://cdn.test/beach.mp4", 7)
            .delay("https://cdn.test/forest.mp4", 2)
            .delay("https://cdn.test/rain.mp3", 5)
            .delay("https://cdn.test/silence.mp3", 1);
        let backend = HeadlessBackend::default();
        let session = session(&backend, resolver);
        session.mount().await;

        let mut switches: Vec<Pin<Box<dyn Future<Output = ()> + '_>>> = Vec::new();
        for id in ["forest", "beach", "forest", "beach", "forest"] {
            switches.push(Box::pin(session.select_video(track(id))));
        }
        for id in ["silence", "rain", "silence", "rain"] {
            switches.push(Box::pin(session.select_audio(track(id))));
        }
        futures_util::future::join_all(switches).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.video_uri.as_deref(), Some("https://cdn.test/forest.mp4"));
        assert_eq!(snapshot.audio_uri.as_deref(), Some("https://cdn.test/rain.mp3"));
        assert_eq!(backend.live(MediaKind::Video), vec!["https://cdn.test/forest.mp4"]);
        assert_eq!(backend.live(MediaKind::Audio), vec!["https://cdn.test/rain.mp3"]);
        assert_eq!(backend.peak(MediaKind::Video), 1);
        assert_eq!(backend.peak(MediaKind::Audio), 1);
    }

    #[tokio::test]
    async fn test_begin_order_decides_the_winner() {
        let backend = HeadlessBackend::default();
        let session = session(&backend, ScriptedResolver::default());
        session.mount().await;

        let earlier = session.begin_audio(track("rain")).unwrap();
        let later = session.begin_audio(track("silence")).unwrap();
        assert_eq!(later.track().id, "silence");

        // the later selection finishes first, the earlier one must not undo it
        session.complete(later).await;
        session.complete(earlier).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.selected_audio.unwrap().id, "silence");
        assert_eq!(snapshot.audio_uri.as_deref(), Some("https://cdn.test/silence.mp3"));
        assert_eq!(backend.live(MediaKind::Audio), vec!["https://cdn.test/silence.mp3"]);
    }

    #[tokio::test]
    async fn test_selection_begun_during_mount_wins() {
        let backend = HeadlessBackend::default();
        let session = session(&backend, ScriptedResolver::default());

        let mount = session.begin_mount();
        assert_eq!(mount.len(), 2);
        let choice = session.begin_audio(track("silence")).unwrap();

        session.complete(choice).await;
        for switch in mount {
            session.complete(switch).await;
        }

        assert_eq!(backend.live(MediaKind::Audio), vec!["https://cdn.test/silence.mp3"]);
        assert_eq!(backend.live(MediaKind::Video), vec!["https://cdn.test/beach.mp4"]);
        assert!(!session.snapshot().is_loading);
    }
}
