//! Static media catalog: the categories of background scenes and the list of
//! audio tracks offered on the relaxation screen.
//!
//! The catalog is read from configuration at startup and never changes
//! while the application runs.

use serde::{Deserialize, Serialize};

/// A named reference to a remote media asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    /// Candidate location of the asset. It is resolved before every load.
    pub uri: String,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// A group of video tracks shown together.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    /// Ordered list of videos. May be empty.
    #[serde(default)]
    pub videos: Vec<Track>,
}

impl Category {
    /// The video selected when the category itself is selected.
    pub fn first_video(&self) -> Option<&Track> {
        self.videos.first()
    }

    pub fn video(&self, id: &str) -> Option<&Track> {
        self.videos.iter().find(|video| video.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MediaCatalog {
    pub categories: Vec<Category>,
    pub audio_tracks: Vec<Track>,
}

impl MediaCatalog {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn audio_track(&self, id: &str) -> Option<&Track> {
        self.audio_tracks.iter().find(|track| track.id == id)
    }

    /// Looks a video up across every category.
    pub fn video(&self, id: &str) -> Option<&Track> {
        self.categories
            .iter()
            .find_map(|category| category.video(id))
    }

    /// Returns `true` when there is nothing to select on mount.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.audio_tracks.is_empty()
    }
}

const MEDIA_BASE_URL: &str = "https://media.frontalfriend.app";

fn video_track(id: &str, title: &str) -> Track {
    Track::new(id, title, format!("{MEDIA_BASE_URL}/videos/{id}.mp4"))
}

fn audio_track(id: &str, title: &str) -> Track {
    Track::new(id, title, format!("{MEDIA_BASE_URL}/audio/{id}.mp3"))
}

impl Default for MediaCatalog {
    fn default() -> Self {
        Self {
            categories: vec![
                Category {
                    id: "nature".into(),
                    label: "Nature".into(),
                    videos: vec![
                        video_track("beach", "Beach"),
                        video_track("forest", "Forest"),
                        video_track("waterfall", "Waterfall"),
                    ],
                },
                Category {
                    id: "space".into(),
                    label: "Space".into(),
                    videos: vec![
                        video_track("galaxy", "Galaxy"),
                        video_track("aurora", "Aurora"),
                    ],
                },
                Category {
                    id: "abstract".into(),
                    label: "Abstract".into(),
                    videos: vec![video_track("waves", "Soft Waves")],
                },
            ],
            audio_tracks: vec![
                audio_track("rain", "Rain"),
                audio_track("ocean", "Ocean"),
                audio_track("piano", "Calm Piano"),
                audio_track("silence", "Silence"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_across_categories() {
        let catalog = MediaCatalog::default();
        assert_eq!(catalog.video("aurora").unwrap().title, "Aurora");
        assert!(catalog.video("rain").is_none());
        assert_eq!(catalog.audio_track("rain").unwrap().id, "rain");
        assert_eq!(
            catalog.category("nature").and_then(Category::first_video).map(|v| v.id.as_str()),
            Some("beach")
        );
    }

    #[test]
    fn test_category_without_videos_deserializes() {
        let catalog: MediaCatalog = toml::from_str(
            r#"
            audio_tracks = []

            [[categories]]
            id = "empty"
            label = "Empty"
            "#,
        )
        .unwrap();
        assert!(catalog.categories[0].first_video().is_none());
    }
}
