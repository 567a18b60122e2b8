use super::{build_endpoint, escape, fetch_json, ProviderFailure};
use crate::config::toml_config::ReleaseDateConfig;
use crate::domain::ports::ReleaseDateProvider;
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: HitResult,
}

#[derive(Debug, Deserialize)]
struct HitResult {
    release_date_components: Option<ReleaseDateComponents>,
}

/// Genius 對未知的年/月/日回傳 null
#[derive(Debug, Deserialize)]
struct ReleaseDateComponents {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl ReleaseDateComponents {
    fn to_date(&self) -> std::result::Result<NaiveDate, ProviderFailure> {
        match (self.year, self.month, self.day) {
            (Some(year), Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| ProviderFailure::InvalidDate(format!("{}-{}-{}", year, month, day))),
            _ => Err(ProviderFailure::InvalidDate(format!("{:?}", self))),
        }
    }
}

/// Genius 客戶端，只用於查發行日期
#[derive(Debug, Clone)]
pub struct GeniusClient {
    client: Client,
    base_url: String,
    search_path: String,
    authorization: String,
}

impl GeniusClient {
    pub fn new(config: &ReleaseDateConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ReleaseDateConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            search_path: config.search_path.clone(),
            authorization: config.authorization.clone(),
        }
    }

    async fn search_release_date(
        &self,
        group_name: &str,
        song_name: &str,
    ) -> std::result::Result<NaiveDate, ProviderFailure> {
        let track = escape(song_name);
        let artist = escape(group_name);
        let endpoint = build_endpoint(
            &self.base_url,
            &self.search_path,
            &[("track", track.as_str()), ("artist", artist.as_str())],
        )?;

        let request = self
            .client
            .get(&endpoint)
            .header(header::AUTHORIZATION, &self.authorization);
        let response: SearchResponse = fetch_json(request).await?;

        let hit = response
            .response
            .hits
            .into_iter()
            .next()
            .ok_or(ProviderFailure::Empty)?;

        match hit.result.release_date_components {
            Some(components) => components.to_date(),
            None => Err(ProviderFailure::InvalidDate("missing components".to_string())),
        }
    }
}

#[async_trait]
impl ReleaseDateProvider for GeniusClient {
    async fn fetch(&self, group_name: &str, song_name: &str) -> Result<NaiveDate> {
        tracing::debug!(group = group_name, song = song_name, "Searching Genius release date");

        self.search_release_date(group_name, song_name)
            .await
            .map_err(|e| {
                tracing::error!(group = group_name, song = song_name, error = %e, "Genius release date lookup failed");
                CatalogError::ErrorGetSongData
            })
    }
}
