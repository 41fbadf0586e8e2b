use async_trait::async_trait;
use frontal_bridge::session::MediaKind;
use tokio::sync::watch;

/// Errors reported by a media backend or one of its handles.
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// The handle was already unloaded.
    #[error("media is not loaded")]
    NotLoaded,
    /// `stop` was called on a handle that is not playing or paused.
    #[error("media is already stopped")]
    AlreadyStopped,
    /// The backend could not create a handle for the given location.
    #[error("failed to load media from {uri}: {reason}")]
    Load { uri: String, reason: String },
    #[error("media backend failed: {0}")]
    Backend(String),
}

impl HandleError {
    /// Errors that only mean "there is nothing left to release".
    pub fn is_already_released(&self) -> bool {
        matches!(self, HandleError::NotLoaded | HandleError::AlreadyStopped)
    }
}

/// An opaque live resource representing a loaded, playable media asset.
#[async_trait]
pub trait MediaHandle: Send + Sync {
    /// Resolved location the handle was loaded from.
    fn uri(&self) -> &str;

    async fn play(&mut self) -> Result<(), HandleError>;

    async fn pause(&mut self) -> Result<(), HandleError>;

    async fn stop(&mut self) -> Result<(), HandleError>;

    /// Frees the underlying resource. The handle must not be used afterwards.
    async fn unload(&mut self) -> Result<(), HandleError>;
}

/// Options for creating an audio handle.
#[derive(Debug, Clone, Copy)]
pub struct AudioLoadOptions {
    pub looping: bool,
    /// Start playing as soon as the handle is loaded.
    pub should_play: bool,
}

/// Options for creating a video handle.
///
/// Videos are not played or paused imperatively. The renderer follows the
/// play intent published on `playing` for as long as the handle lives.
#[derive(Debug, Clone)]
pub struct VideoLoadOptions {
    pub looping: bool,
    pub muted: bool,
    pub playing: watch::Receiver<bool>,
}

/// Creates media handles from resolved locations.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    async fn load_audio(
        &self,
        uri: &str,
        options: AudioLoadOptions,
    ) -> Result<Box<dyn MediaHandle>, HandleError>;

    async fn load_video(
        &self,
        uri: &str,
        options: VideoLoadOptions,
    ) -> Result<Box<dyn MediaHandle>, HandleError>;
}

/// Stops and unloads a handle, logging and swallowing every failure.
pub async fn release_handle(kind: MediaKind, mut handle: Box<dyn MediaHandle>) {
    match handle.stop().await {
        Ok(()) => {}
        Err(error) if error.is_already_released() => {
            log::debug!("Stopping {kind} handle {}: {error}", handle.uri());
        }
        Err(error) => log::warn!("Failed to stop {kind} handle {}: {error}", handle.uri()),
    }

    match handle.unload().await {
        Ok(()) => log::debug!("Released {kind} handle {}", handle.uri()),
        Err(error) if error.is_already_released() => {
            log::debug!("Unloading {kind} handle {}: {error}", handle.uri());
        }
        Err(error) => log::warn!("Failed to unload {kind} handle {}: {error}", handle.uri()),
    }
}

/// The single place a session keeps its live handle for one media kind.
///
/// The slot never holds more than one handle: a new handle can only be
/// installed once the previous one has been released.
pub struct HandleSlot {
    kind: MediaKind,
    handle: Option<Box<dyn MediaHandle>>,
}

impl HandleSlot {
    pub fn new(kind: MediaKind) -> Self {
        Self { kind, handle: None }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    pub fn uri(&self) -> Option<&str> {
        self.handle.as_deref().map(|handle| handle.uri())
    }

    pub fn handle_mut(&mut self) -> Option<&mut (dyn MediaHandle + 'static)> {
        self.handle.as_deref_mut()
    }

    /// Places a freshly loaded handle into an empty slot. An occupied slot
    /// rejects the handle and gives it back to the caller.
    pub fn install(&mut self, handle: Box<dyn MediaHandle>) -> Result<(), Box<dyn MediaHandle>> {
        if self.handle.is_some() {
            return Err(handle);
        }
        self.handle = Some(handle);
        Ok(())
    }

    /// Takes the current handle out and releases it. Returns `false` when the
    /// slot was already empty.
    pub async fn release(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                release_handle(self.kind, handle).await;
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for HandleSlot {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HandleSlot")
            .field("kind", &self.kind)
            .field("uri", &self.uri())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Handle whose `stop` and `unload` always fail.
    struct StubbornHandle {
        uri: String,
        unloads: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl MediaHandle for StubbornHandle {
        fn uri(&self) -> &str {
            &self.uri
        }

        async fn play(&mut self) -> Result<(), HandleError> {
            Ok(())
        }

        async fn pause(&mut self) -> Result<(), HandleError> {
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), HandleError> {
            Err(HandleError::AlreadyStopped)
        }

        async fn unload(&mut self) -> Result<(), HandleError> {
            *self.unloads.lock().unwrap() += 1;
            Err(HandleError::Backend("device went away".into()))
        }
    }

    fn stubborn(uri: &str, unloads: &Arc<Mutex<u32>>) -> Box<dyn MediaHandle> {
        Box::new(StubbornHandle {
            uri: uri.into(),
            unloads: unloads.clone(),
        })
    }

    #[test]
    fn test_install_rejects_second_handle() {
        let unloads = Arc::new(Mutex::new(0));
        let mut slot = HandleSlot::new(MediaKind::Audio);

        assert!(slot.install(stubborn("first", &unloads)).is_ok());
        let rejected = slot.install(stubborn("second", &unloads)).unwrap_err();

        assert_eq!(rejected.uri(), "second");
        assert_eq!(slot.uri(), Some("first"));
    }

    #[tokio::test]
    async fn test_release_swallows_errors_and_empties_slot() {
        let unloads = Arc::new(Mutex::new(0));
        let mut slot = HandleSlot::new(MediaKind::Video);
        assert!(slot.install(stubborn("scene", &unloads)).is_ok());

        assert!(slot.release().await);
        assert!(!slot.is_loaded());
        assert!(!slot.release().await);
        assert_eq!(*unloads.lock().unwrap(), 1);
    }
}
