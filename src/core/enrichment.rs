use crate::core::lyrics::{canonical_lyrics, VERSE_SEPARATOR};
use crate::domain::model::EnrichmentResult;
use crate::domain::ports::{IdentityProvider, LyricsProvider, ReleaseDateProvider};
use crate::utils::error::{CatalogError, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 併發查詢 Identity 與 ReleaseDate，再依曲目 id 取歌詞
///
/// Identity 與 Lyrics 為必要分支，失敗即整體失敗；ReleaseDate 失敗時只記錄並視為未知。
/// 整個流程共用一個 deadline 與呼叫端的 `CancellationToken`，取消時不回傳部分結果。
#[derive(Clone)]
pub struct EnrichmentCoordinator {
    identity: Arc<dyn IdentityProvider>,
    release_date: Arc<dyn ReleaseDateProvider>,
    lyrics: Arc<dyn LyricsProvider>,
    timeout: Duration,
}

impl EnrichmentCoordinator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        release_date: Arc<dyn ReleaseDateProvider>,
        lyrics: Arc<dyn LyricsProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            identity,
            release_date,
            lyrics,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn enrich(
        &self,
        cancel: &CancellationToken,
        group_name: &str,
        song_name: &str,
    ) -> Result<EnrichmentResult> {
        tracing::info!(group = group_name, song = song_name, "🔎 Enriching song");

        let work = tokio::time::timeout(self.timeout, self.run(group_name, song_name));

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(group = group_name, song = song_name, "Enrichment cancelled");
                return Err(CatalogError::Cancelled);
            }
            outcome = work => outcome,
        };

        match result {
            Ok(enriched) => enriched,
            Err(_) => {
                tracing::warn!(
                    group = group_name,
                    song = song_name,
                    timeout = ?self.timeout,
                    "Enrichment deadline exceeded"
                );
                Err(CatalogError::DeadlineExceeded(self.timeout))
            }
        }
    }

    async fn run(&self, group_name: &str, song_name: &str) -> Result<EnrichmentResult> {
        // Identity 失敗時 try_join! 直接返回並丟棄尚未完成的 ReleaseDate 分支
        let (identity, release_date) = tokio::try_join!(
            self.identity.fetch(group_name, song_name),
            self.optional_release_date(group_name, song_name),
        )?;

        let raw_lyrics = self.lyrics.fetch(&identity.track_id).await?;
        let lyrics = canonical_lyrics(&raw_lyrics);

        tracing::info!(
            track_id = %identity.track_id,
            has_release_date = release_date.is_some(),
            verses = lyrics.split(VERSE_SEPARATOR).count(),
            "✅ Enrichment completed"
        );

        Ok(EnrichmentResult {
            external_track_id: identity.track_id,
            canonical_link: identity.link,
            canonical_track_name: identity.track_name.to_lowercase(),
            canonical_artist_name: identity.artist_name.to_lowercase(),
            release_date,
            lyrics,
        })
    }

    async fn optional_release_date(
        &self,
        group_name: &str,
        song_name: &str,
    ) -> Result<Option<NaiveDate>> {
        match self.release_date.fetch(group_name, song_name).await {
            Ok(date) => Ok(Some(date)),
            Err(e) => {
                tracing::warn!(
                    group = group_name,
                    song = song_name,
                    error = %e,
                    "Release date unavailable, continuing without it"
                );
                Ok(None)
            }
        }
    }
}
