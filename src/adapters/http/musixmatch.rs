use super::{build_endpoint, escape, fetch_json, ProviderFailure};
use crate::config::toml_config::IdentityConfig;
use crate::domain::model::IdentityMatch;
use crate::domain::ports::{IdentityProvider, LyricsProvider};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    message: SearchMessage,
}

#[derive(Debug, Deserialize)]
struct SearchMessage {
    body: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    track_list: Vec<TrackWrapper>,
}

#[derive(Debug, Deserialize)]
struct TrackWrapper {
    track: Track,
}

#[derive(Debug, Deserialize)]
struct Track {
    commontrack_id: i64,
    track_share_url: String,
    track_name: String,
    artist_name: String,
}

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    message: LyricsMessage,
}

#[derive(Debug, Deserialize)]
struct LyricsMessage {
    body: LyricsBody,
}

#[derive(Debug, Deserialize)]
struct LyricsBody {
    lyrics: Lyrics,
}

#[derive(Debug, Deserialize)]
struct Lyrics {
    lyrics_body: String,
}

/// Musixmatch 客戶端：曲目搜尋 (Identity) 與歌詞 (Lyrics) 共用金鑰
#[derive(Debug, Clone)]
pub struct MusixmatchClient {
    client: Client,
    base_url: String,
    search_path: String,
    lyrics_path: String,
    api_key: String,
}

impl MusixmatchClient {
    pub fn new(config: &IdentityConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &IdentityConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            search_path: config.search_path.clone(),
            lyrics_path: config.lyrics_path.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn search_track(
        &self,
        group_name: &str,
        song_name: &str,
    ) -> std::result::Result<IdentityMatch, ProviderFailure> {
        let artist = escape(group_name);
        let track = escape(song_name);
        let api_key = escape(&self.api_key);
        let endpoint = build_endpoint(
            &self.base_url,
            &self.search_path,
            &[
                ("artist", artist.as_str()),
                ("track", track.as_str()),
                ("api_key", api_key.as_str()),
            ],
        )?;

        let response: SearchResponse = fetch_json(self.client.get(&endpoint)).await?;

        // 只取第一筆，與 provider 的相關度排序一致
        let track = response
            .message
            .body
            .track_list
            .into_iter()
            .next()
            .ok_or(ProviderFailure::Empty)?
            .track;

        Ok(IdentityMatch {
            track_id: track.commontrack_id.to_string(),
            link: track.track_share_url,
            track_name: track.track_name,
            artist_name: track.artist_name,
        })
    }

    async fn lyrics_body(&self, track_id: &str) -> std::result::Result<String, ProviderFailure> {
        let track_id = escape(track_id);
        let api_key = escape(&self.api_key);
        let endpoint = build_endpoint(
            &self.base_url,
            &self.lyrics_path,
            &[("track_id", track_id.as_str()), ("api_key", api_key.as_str())],
        )?;

        let response: LyricsResponse = fetch_json(self.client.get(&endpoint)).await?;
        Ok(response.message.body.lyrics.lyrics_body)
    }
}

#[async_trait]
impl IdentityProvider for MusixmatchClient {
    async fn fetch(&self, group_name: &str, song_name: &str) -> Result<IdentityMatch> {
        tracing::debug!(group = group_name, song = song_name, "Searching Musixmatch track");

        match self.search_track(group_name, song_name).await {
            Ok(found) => {
                tracing::debug!(
                    track_id = %found.track_id,
                    link = %found.link,
                    "Musixmatch track resolved"
                );
                Ok(found)
            }
            Err(e) => {
                tracing::error!(group = group_name, song = song_name, error = %e, "Musixmatch track search failed");
                Err(CatalogError::ErrorGetSongData)
            }
        }
    }
}

#[async_trait]
impl LyricsProvider for MusixmatchClient {
    async fn fetch(&self, track_id: &str) -> Result<String> {
        tracing::debug!(track_id, "Fetching Musixmatch lyrics");

        self.lyrics_body(track_id).await.map_err(|e| {
            tracing::error!(track_id, error = %e, "Musixmatch lyrics fetch failed");
            CatalogError::ErrorGetSongLyrics
        })
    }
}
