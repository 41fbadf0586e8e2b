//! A media backend that keeps no decoder or output device and only tracks
//! what would be playing. Used by the console frontend and by tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use frontal_bridge::session::MediaKind;
use tokio::sync::watch;

use crate::handle::{AudioLoadOptions, HandleError, MediaBackend, MediaHandle, VideoLoadOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug)]
struct Entry {
    id: u64,
    kind: MediaKind,
    uri: String,
    status: Status,
    /// Present for videos, which follow the session's play intent.
    intent: Option<watch::Receiver<bool>>,
}

impl Entry {
    fn is_playing(&self) -> bool {
        match &self.intent {
            Some(intent) => self.status != Status::Stopped && *intent.borrow(),
            None => self.status == Status::Playing,
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
    peak_audio: usize,
    peak_video: usize,
}

impl Registry {
    fn count(&self, kind: MediaKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    fn insert(
        &mut self,
        kind: MediaKind,
        uri: &str,
        status: Status,
        intent: Option<watch::Receiver<bool>>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(Entry {
            id,
            kind,
            uri: uri.to_string(),
            status,
            intent,
        });

        let live = self.count(kind);
        let peak = match kind {
            MediaKind::Audio => &mut self.peak_audio,
            MediaKind::Video => &mut self.peak_video,
        };
        *peak = (*peak).max(live);
        id
    }

    fn entry(&mut self, id: u64) -> Result<&mut Entry, HandleError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(HandleError::NotLoaded)
    }
}

/// Backend whose handles only record their state transitions.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    registry: Arc<Mutex<Registry>>,
}

impl HeadlessBackend {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locations of every loaded handle of `kind`.
    pub fn live(&self, kind: MediaKind) -> Vec<String> {
        self.registry()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.uri.clone())
            .collect()
    }

    /// Locations of every handle currently producing sound or picture.
    pub fn playing(&self) -> Vec<String> {
        self.registry()
            .entries
            .iter()
            .filter(|entry| entry.is_playing())
            .map(|entry| entry.uri.clone())
            .collect()
    }

    /// Highest number of simultaneously loaded handles of `kind` so far.
    pub fn peak(&self, kind: MediaKind) -> usize {
        let registry = self.registry();
        match kind {
            MediaKind::Audio => registry.peak_audio,
            MediaKind::Video => registry.peak_video,
        }
    }
}

#[async_trait]
impl MediaBackend for HeadlessBackend {
    async fn load_audio(
        &self,
        uri: &str,
        options: AudioLoadOptions,
    ) -> Result<Box<dyn MediaHandle>, HandleError> {
        let status = if options.should_play {
            Status::Playing
        } else {
            Status::Paused
        };
        let id = self.registry().insert(MediaKind::Audio, uri, status, None);
        log::info!("Loaded audio {uri} (looping: {}, status: {status:?})", options.looping);

        Ok(Box::new(HeadlessHandle {
            id,
            kind: MediaKind::Audio,
            uri: uri.to_string(),
            registry: self.registry.clone(),
        }))
    }

    async fn load_video(
        &self,
        uri: &str,
        options: VideoLoadOptions,
    ) -> Result<Box<dyn MediaHandle>, HandleError> {
        let playing = *options.playing.borrow();
        let id = self
            .registry()
            .insert(MediaKind::Video, uri, Status::Playing, Some(options.playing));
        log::info!("Loaded video {uri} (muted: {}, rendering: {playing})", options.muted);

        Ok(Box::new(HeadlessHandle {
            id,
            kind: MediaKind::Video,
            uri: uri.to_string(),
            registry: self.registry.clone(),
        }))
    }
}

struct HeadlessHandle {
    id: u64,
    kind: MediaKind,
    uri: String,
    registry: Arc<Mutex<Registry>>,
}

impl HeadlessHandle {
    fn set_status(&self, status: Status) -> Result<(), HandleError> {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = registry.entry(self.id)?;
        if status == Status::Stopped && entry.status == Status::Stopped {
            return Err(HandleError::AlreadyStopped);
        }
        entry.status = status;
        log::debug!("{} {} is now {status:?}", self.kind, self.uri);
        Ok(())
    }
}

#[async_trait]
impl MediaHandle for HeadlessHandle {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn play(&mut self) -> Result<(), HandleError> {
        self.set_status(Status::Playing)
    }

    async fn pause(&mut self) -> Result<(), HandleError> {
        self.set_status(Status::Paused)
    }

    async fn stop(&mut self) -> Result<(), HandleError> {
        self.set_status(Status::Stopped)
    }

    async fn unload(&mut self) -> Result<(), HandleError> {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let before = registry.entries.len();
        registry.entries.retain(|entry| entry.id != self.id);
        if registry.entries.len() == before {
            return Err(HandleError::NotLoaded);
        }
        log::info!("Unloaded {} {}", self.kind, self.uri);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_video_follows_play_intent() {
        let backend = HeadlessBackend::default();
        let (intent, playing) = watch::channel(false);
        let options = VideoLoadOptions {
            looping: true,
            muted: true,
            playing,
        };
        let mut video = backend.load_video("scene.mp4", options).await.unwrap();
        assert!(backend.playing().is_empty());

        intent.send_replace(true);
        assert_eq!(backend.playing(), vec!["scene.mp4"]);

        video.stop().await.unwrap();
        assert!(backend.playing().is_empty());
    }

    #[tokio::test]
    async fn test_released_handle_reports_errors() {
        let backend = HeadlessBackend::default();
        let options = AudioLoadOptions {
            looping: true,
            should_play: true,
        };
        let mut audio = backend.load_audio("rain.mp3", options).await.unwrap();
        assert_eq!(backend.playing(), vec!["rain.mp3"]);

        audio.stop().await.unwrap();
        assert!(matches!(audio.stop().await, Err(HandleError::AlreadyStopped)));
        audio.unload().await.unwrap();
        assert!(matches!(audio.unload().await, Err(HandleError::NotLoaded)));
        assert!(matches!(audio.play().await, Err(HandleError::NotLoaded)));
        assert!(backend.live(MediaKind::Audio).is_empty());
        assert_eq!(backend.peak(MediaKind::Audio), 1);
    }
}
