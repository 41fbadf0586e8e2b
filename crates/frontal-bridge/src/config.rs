use serde::{Deserialize, Serialize};

use crate::catalog::MediaCatalog;

/// Configuration of the relaxation media player.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    /// How long a remote track may take to answer the reachability check
    /// before it is reported unavailable, in milliseconds.
    pub resolve_timeout_ms: u64,
    /// Whether switching the video scene also pauses playback. Audio
    /// switches always keep the current play state.
    pub pause_on_video_change: bool,
    /// Categories and audio tracks offered to the user.
    pub catalog: MediaCatalog,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: 3000,
            pause_on_video_change: false,
            catalog: MediaCatalog::default(),
        }
    }
}

/// Settings of the identity provider (Firebase Identity Toolkit).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Web API key of the Firebase project.
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://identitytoolkit.googleapis.com/v1".into(),
        }
    }
}

/// Settings of the remote table store (Supabase REST).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: Option<String>,
    pub anon_key: Option<String>,
    /// Table that receives the daily progress records.
    pub progress_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            progress_table: "progress".into(),
        }
    }
}

/// Settings of the chat completion provider (OpenAI).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// API key. When absent, the `OPENAI_API_KEY` environment variable is
    /// used instead.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub media: MediaConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub chat: ChatConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [media]
            resolve_timeout_ms = 1500

            [chat]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.media.resolve_timeout_ms, 1500);
        assert!(!config.media.pause_on_video_change);
        assert_eq!(config.media.catalog, MediaCatalog::default());
        assert_eq!(config.chat.model, "gpt-4o-mini");
        assert_eq!(config.chat.max_tokens, 500);
        assert_eq!(config.store.progress_table, "progress");
        assert!(config.auth.api_key.is_none());
    }
}
